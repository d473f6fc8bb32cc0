//! Data models for parcel planning.
//!
//! - `Product`: a catalog item with native dimensions and weight
//! - `TransportBox`: a shipping carton with outer dimensions and a weight limit
//! - `PlacedItem`: a product at its position inside a box, in the orientation used

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::{BoundingBox, Vec3, validation};

/// Validation error for catalog data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("Invalid weight: {0}")]
    InvalidWeight(String),
}

/// Ordered triple (width, depth, height) in centimeters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Dimensions {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
}

impl Dimensions {
    pub const fn new(width: f64, depth: f64, height: f64) -> Self {
        Self {
            width,
            depth,
            height,
        }
    }

    /// Creates dimensions after checking every axis is positive and finite.
    pub fn validated(width: f64, depth: f64, height: f64) -> Result<Self, ValidationError> {
        validation::validate_dimensions_3d((width, depth, height))
            .map_err(ValidationError::InvalidDimension)?;
        Ok(Self::new(width, depth, height))
    }

    pub fn volume(&self) -> f64 {
        self.width * self.depth * self.height
    }

    pub fn footprint_area(&self) -> f64 {
        self.width * self.depth
    }

    /// The six axis permutations, native order first.
    ///
    /// Order: (w,d,h), (d,w,h), (w,h,d), (d,h,w), (h,w,d), (h,d,w).
    pub fn permutations(&self) -> [Dimensions; 6] {
        let Dimensions {
            width: w,
            depth: d,
            height: h,
        } = *self;
        [
            Dimensions::new(w, d, h),
            Dimensions::new(d, w, h),
            Dimensions::new(w, h, d),
            Dimensions::new(d, h, w),
            Dimensions::new(h, w, d),
            Dimensions::new(h, d, w),
        ]
    }

    /// Width and depth swapped, height kept vertical.
    pub fn swapped_footprint(&self) -> Dimensions {
        Dimensions::new(self.depth, self.width, self.height)
    }

    #[inline]
    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.width, self.depth, self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} × {} × {} cm", self.width, self.depth, self.height)
    }
}

/// Product sizes offered by the catalog.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum ProductSize {
    #[serde(rename = "S")]
    S,
    #[serde(rename = "S-long")]
    SLong,
    #[serde(rename = "L")]
    L,
    #[serde(rename = "L-long")]
    LLong,
    #[serde(rename = "LL")]
    LL,
}

impl ProductSize {
    pub const ALL: [ProductSize; 5] = [
        ProductSize::S,
        ProductSize::SLong,
        ProductSize::L,
        ProductSize::LLong,
        ProductSize::LL,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProductSize::S => "S",
            ProductSize::SLong => "S-long",
            ProductSize::L => "L",
            ProductSize::LLong => "L-long",
            ProductSize::LL => "LL",
        }
    }
}

impl fmt::Display for ProductSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProductSize {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        ProductSize::ALL
            .into_iter()
            .find(|size| size.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| trimmed.to_string())
    }
}

/// A catalog product: a size label, native dimensions and unit weight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, ToSchema)]
pub struct Product {
    pub size: ProductSize,
    pub dims: Dimensions,
    pub weight: f64,
}

impl Product {
    /// Creates a product with validated dimensions and weight.
    ///
    /// # Examples
    /// ```
    /// use parcel_planner::model::{Dimensions, Product, ProductSize};
    ///
    /// let ok = Product::new(ProductSize::S, Dimensions::new(6.5, 6.5, 6.5), 0.073);
    /// assert!(ok.is_ok());
    ///
    /// let bad = Product::new(ProductSize::S, Dimensions::new(-6.5, 6.5, 6.5), 0.073);
    /// assert!(bad.is_err());
    /// ```
    pub fn new(size: ProductSize, dims: Dimensions, weight: f64) -> Result<Self, ValidationError> {
        let dims = Dimensions::validated(dims.width, dims.depth, dims.height)?;
        validation::validate_weight(weight).map_err(ValidationError::InvalidWeight)?;
        Ok(Self { size, dims, weight })
    }
}

/// Identifier of a transport box ("No.1", "No.15", ...).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct BoxId(pub String);

impl BoxId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BoxId {
    fn from(raw: &str) -> Self {
        BoxId(raw.to_string())
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A shipping carton.
///
/// The inner space loses 1 cm of wall on every side, so each inner axis is
/// `outer - 2` clamped at zero.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct TransportBox {
    pub id: BoxId,
    pub outer: Dimensions,
    pub max_weight: f64,
}

impl TransportBox {
    pub const WALL_ALLOWANCE: f64 = 2.0;

    pub fn new(
        id: impl Into<BoxId>,
        outer: Dimensions,
        max_weight: f64,
    ) -> Result<Self, ValidationError> {
        let outer = Dimensions::validated(outer.width, outer.depth, outer.height)?;
        validation::validate_weight(max_weight).map_err(ValidationError::InvalidWeight)?;
        Ok(Self {
            id: id.into(),
            outer,
            max_weight,
        })
    }

    pub fn inner(&self) -> Dimensions {
        Dimensions::new(
            (self.outer.width - Self::WALL_ALLOWANCE).max(0.0),
            (self.outer.depth - Self::WALL_ALLOWANCE).max(0.0),
            (self.outer.height - Self::WALL_ALLOWANCE).max(0.0),
        )
    }

    pub fn inner_volume(&self) -> f64 {
        self.inner().volume()
    }

    /// Outer volume, used to order candidates smallest first.
    pub fn volume(&self) -> f64 {
        self.outer.volume()
    }

    pub fn can_fit_weight(&self, weight: f64) -> bool {
        weight <= self.max_weight
    }

    pub fn can_fit_volume(&self, volume: f64) -> bool {
        volume <= self.inner_volume()
    }

    /// The usable interior as a bounding box anchored at the origin.
    pub fn inner_bounds(&self) -> BoundingBox {
        BoundingBox::from_position_and_dims(Vec3::zero(), self.inner().as_vec3())
    }
}

/// A product placed inside a box.
///
/// `position` is the minimum corner; `dims` are the oriented dimensions
/// actually occupied, which may be a permutation of the product's native ones.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlacedItem {
    pub product: Product,
    pub position: Vec3,
    pub dims: Dimensions,
    pub rotated: bool,
}

impl PlacedItem {
    pub fn new(product: Product, position: Vec3, dims: Dimensions) -> Self {
        let rotated = dims.width != product.dims.width || dims.depth != product.dims.depth;
        Self {
            product,
            position,
            dims,
            rotated,
        }
    }

    pub fn top_z(&self) -> f64 {
        self.position.z + self.dims.height
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_position_and_dims(self.position, self.dims.as_vec3())
    }
}
