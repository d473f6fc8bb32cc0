//! Common geometry types shared by the packers.
//!
//! Everything in here is measured in centimeters (lengths) and kilograms (weights).

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Global numerical tolerance for floating-point comparisons.
pub const EPSILON_GENERAL: f64 = 1e-6;

/// Tolerance for matching a top face against a bottom face when stacking.
pub const EPSILON_HEIGHT: f64 = 1e-3;

/// A 3D vector or point in space.
///
/// Used for positions, dimensions and corner calculations.
///
/// # Examples
/// ```
/// use parcel_planner::types::Vec3;
///
/// let position = Vec3::new(1.0, 2.0, 3.0);
/// let dims = Vec3::new(10.0, 20.0, 30.0);
/// assert_eq!((position + dims).z, 33.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The origin.
    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline]
    pub const fn as_tuple(&self) -> (f64, f64, f64) {
        (self.x, self.y, self.z)
    }

    /// Product of all components. Useful for dimension vectors.
    #[inline]
    pub fn volume(&self) -> f64 {
        self.x * self.y * self.z
    }

    /// X × Y product.
    #[inline]
    pub fn base_area(&self) -> f64 {
        self.x * self.y
    }
}

impl Add for Vec3 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// An Axis-Aligned Bounding Box (AABB).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner (position)
    pub min: Vec3,
    /// Maximum corner (position + dimensions)
    pub max: Vec3,
}

impl BoundingBox {
    #[inline]
    pub fn from_position_and_dims(position: Vec3, dims: Vec3) -> Self {
        Self {
            min: position,
            max: position + dims,
        }
    }

    /// Checks if two bounding boxes share a positive volume.
    ///
    /// Touching faces do not count as an intersection.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.max.x <= other.min.x
            || other.max.x <= self.min.x
            || self.max.y <= other.min.y
            || other.max.y <= self.min.y
            || self.max.z <= other.min.z
            || other.max.z <= self.min.z)
    }

    #[inline]
    fn overlap_1d(a_min: f64, a_max: f64, b_min: f64, b_max: f64) -> f64 {
        (a_max.min(b_max) - a_min.max(b_min)).max(0.0)
    }

    /// Overlap area of the two footprints in the XY plane.
    #[inline]
    pub fn overlap_area_xy(&self, other: &Self) -> f64 {
        let overlap_x = Self::overlap_1d(self.min.x, self.max.x, other.min.x, other.max.x);
        let overlap_y = Self::overlap_1d(self.min.y, self.max.y, other.min.y, other.max.y);
        overlap_x * overlap_y
    }

    /// Checks if `other` lies fully inside this box, with tolerance.
    #[inline]
    pub fn contains_box(&self, other: &Self, tolerance: f64) -> bool {
        other.min.x >= self.min.x - tolerance
            && other.min.y >= self.min.y - tolerance
            && other.min.z >= self.min.z - tolerance
            && other.max.x <= self.max.x + tolerance
            && other.max.y <= self.max.y + tolerance
            && other.max.z <= self.max.z + tolerance
    }

    #[inline]
    pub fn top_z(&self) -> f64 {
        self.max.z
    }

    #[inline]
    pub fn dimensions(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Validation helpers shared by the model and request layers.
pub mod validation {

    /// Validates a single positive, finite length.
    pub fn validate_dimension(value: f64, name: &str) -> Result<(), String> {
        if value.is_nan() {
            return Err(format!("{} must not be NaN", name));
        }
        if value.is_infinite() {
            return Err(format!("{} must not be infinite", name));
        }
        if value <= 0.0 {
            return Err(format!("{} must be positive, got: {}", name, value));
        }
        Ok(())
    }

    /// Validates a positive, finite weight.
    pub fn validate_weight(value: f64) -> Result<(), String> {
        if value.is_nan() {
            return Err("Weight must not be NaN".to_string());
        }
        if value.is_infinite() {
            return Err("Weight must not be infinite".to_string());
        }
        if value <= 0.0 {
            return Err(format!("Weight must be positive, got: {}", value));
        }
        Ok(())
    }

    /// Validates all three dimensions of a 3D object.
    pub fn validate_dimensions_3d(dims: (f64, f64, f64)) -> Result<(), String> {
        validate_dimension(dims.0, "Width")?;
        validate_dimension(dims.1, "Depth")?;
        validate_dimension(dims.2, "Height")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);

        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vec3::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn test_vec3_volume_and_area() {
        let dims = Vec3::new(10.0, 20.0, 30.0);
        assert!((dims.volume() - 6000.0).abs() < EPSILON_GENERAL);
        assert!((dims.base_area() - 200.0).abs() < EPSILON_GENERAL);
    }

    #[test]
    fn test_bounding_box_touching_faces_do_not_intersect() {
        let a = BoundingBox::from_position_and_dims(Vec3::zero(), Vec3::new(10.0, 10.0, 10.0));
        let touching = BoundingBox::from_position_and_dims(
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(10.0, 10.0, 10.0),
        );
        let overlapping = BoundingBox::from_position_and_dims(
            Vec3::new(5.0, 5.0, 5.0),
            Vec3::new(10.0, 10.0, 10.0),
        );

        assert!(!a.intersects(&touching));
        assert!(a.intersects(&overlapping));
    }

    #[test]
    fn test_bounding_box_overlap_area() {
        let a = BoundingBox::from_position_and_dims(Vec3::zero(), Vec3::new(10.0, 10.0, 10.0));
        let b = BoundingBox::from_position_and_dims(
            Vec3::new(5.0, 5.0, 0.0),
            Vec3::new(10.0, 10.0, 10.0),
        );

        let overlap = a.overlap_area_xy(&b);
        assert!((overlap - 25.0).abs() < EPSILON_GENERAL); // 5x5 overlap
    }

    #[test]
    fn test_bounding_box_containment() {
        let outer = BoundingBox::from_position_and_dims(Vec3::zero(), Vec3::new(10.0, 10.0, 10.0));
        let inner = BoundingBox::from_position_and_dims(
            Vec3::new(2.0, 2.0, 2.0),
            Vec3::new(8.0, 8.0, 8.0),
        );
        let poking_out = BoundingBox::from_position_and_dims(
            Vec3::new(2.0, 2.0, 2.0),
            Vec3::new(9.0, 8.0, 8.0),
        );

        assert!(outer.contains_box(&inner, EPSILON_GENERAL));
        assert!(!outer.contains_box(&poking_out, EPSILON_GENERAL));
    }

    #[test]
    fn test_validation_dimension() {
        assert!(validation::validate_dimension(10.0, "Width").is_ok());
        assert!(validation::validate_dimension(0.0, "Width").is_err());
        assert!(validation::validate_dimension(-1.0, "Width").is_err());
        assert!(validation::validate_dimension(f64::NAN, "Width").is_err());
        assert!(validation::validate_dimension(f64::INFINITY, "Width").is_err());
    }

    #[test]
    fn test_validation_weight() {
        assert!(validation::validate_weight(10.0).is_ok());
        assert!(validation::validate_weight(0.0).is_err());
        assert!(validation::validate_weight(-1.0).is_err());
    }
}
