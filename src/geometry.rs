//! Geometric predicates for placed items: collision, containment and support.
//!
//! All checks treat items as axis-aligned boxes. Touching faces are never a
//! collision.

use crate::model::{Dimensions, PlacedItem};
use crate::types::{BoundingBox, Vec3};

/// Checks whether two placed items share a positive volume.
///
/// # Examples
/// ```
/// use parcel_planner::geometry::intersects;
/// use parcel_planner::model::{Dimensions, PlacedItem, Product, ProductSize};
/// use parcel_planner::types::Vec3;
///
/// let cube = Product::new(ProductSize::L, Dimensions::new(9.7, 9.7, 9.7), 0.169).unwrap();
/// let a = PlacedItem::new(cube, Vec3::zero(), cube.dims);
/// let b = PlacedItem::new(cube, Vec3::new(9.7, 0.0, 0.0), cube.dims);
/// assert!(!intersects(&a, &b));
/// ```
pub fn intersects(a: &PlacedItem, b: &PlacedItem) -> bool {
    a.bounding_box().intersects(&b.bounding_box())
}

/// Like [`intersects`], but overlaps thinner than `tolerance` on any axis are
/// treated as touching. Placements built by adding lengths accumulate
/// rounding error, so packers compare with this.
pub fn collides(a: &PlacedItem, b: &PlacedItem, tolerance: f64) -> bool {
    let (ab, bb) = (a.bounding_box(), b.bounding_box());
    overlap_1d(ab.min.x, ab.max.x, bb.min.x, bb.max.x) > tolerance
        && overlap_1d(ab.min.y, ab.max.y, bb.min.y, bb.max.y) > tolerance
        && overlap_1d(ab.min.z, ab.max.z, bb.min.z, bb.max.z) > tolerance
}

/// Length of the overlap of two intervals, at least 0.0.
pub fn overlap_1d(a1: f64, a2: f64, b1: f64, b2: f64) -> f64 {
    (a2.min(b2) - a1.max(b1)).max(0.0)
}

/// Checks that an item lies within `[0, inner_w] × [0, inner_d] × [0, inner_h]`.
pub fn is_within(item: &PlacedItem, inner: &Dimensions, tolerance: f64) -> bool {
    let bounds = BoundingBox::from_position_and_dims(Vec3::zero(), inner.as_vec3());
    bounds.contains_box(&item.bounding_box(), tolerance)
}

/// Finds the items directly underneath `candidate`.
///
/// An item supports the candidate if its top face is at the candidate's
/// bottom (within `height_epsilon`) and their footprints overlap. Returns
/// `(index into placed, overlap area)` for each supporter, in placement order.
pub fn supporters(
    candidate: &BoundingBox,
    placed: &[PlacedItem],
    height_epsilon: f64,
) -> Vec<(usize, f64)> {
    placed
        .iter()
        .enumerate()
        .filter_map(|(idx, p)| {
            let bb = p.bounding_box();
            if (candidate.min.z - bb.top_z()).abs() > height_epsilon {
                return None;
            }
            let area = candidate.overlap_area_xy(&bb);
            (area > 0.0).then_some((idx, area))
        })
        .collect()
}

/// Share of the candidate's footprint resting on the given supporters.
pub fn support_ratio(candidate: &BoundingBox, supporters: &[(usize, f64)]) -> f64 {
    let base = candidate.dimensions().base_area();
    if base <= 0.0 {
        return 0.0;
    }
    supporters.iter().map(|(_, area)| area).sum::<f64>() / base
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Product, ProductSize};

    fn cube(size: f64) -> Product {
        Product::new(ProductSize::L, Dimensions::new(size, size, size), 1.0).unwrap()
    }

    fn place(p: Product, x: f64, y: f64, z: f64) -> PlacedItem {
        PlacedItem::new(p, Vec3::new(x, y, z), p.dims)
    }

    #[test]
    fn overlap_1d_handles_disjoint_and_nested() {
        assert_eq!(overlap_1d(0.0, 5.0, 3.0, 8.0), 2.0);
        assert_eq!(overlap_1d(0.0, 5.0, 5.0, 8.0), 0.0);
        assert_eq!(overlap_1d(0.0, 10.0, 2.0, 3.0), 1.0);
    }

    #[test]
    fn detects_collision_but_not_contact() {
        let c = cube(10.0);
        let a = place(c, 0.0, 0.0, 0.0);
        assert!(intersects(&a, &place(c, 5.0, 5.0, 5.0)));
        assert!(!intersects(&a, &place(c, 0.0, 0.0, 10.0)));
        let above = place(c, 5.0, 0.0, 10.0).bounding_box();
        assert!((a.bounding_box().overlap_area_xy(&above) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn collides_ignores_rounding_slivers() {
        let c = cube(10.0);
        let a = place(c, 0.0, 0.0, 0.0);
        let sliver = place(c, 10.0 - 1e-12, 0.0, 0.0);
        assert!(intersects(&a, &sliver));
        assert!(!collides(&a, &sliver, 1e-6));
        assert!(collides(&a, &place(c, 9.0, 9.0, 9.0), 1e-6));
    }

    #[test]
    fn containment_respects_inner_bounds() {
        let c = cube(10.0);
        let inner = Dimensions::new(20.0, 20.0, 10.0);
        assert!(is_within(&place(c, 10.0, 10.0, 0.0), &inner, 1e-6));
        assert!(!is_within(&place(c, 10.5, 0.0, 0.0), &inner, 1e-6));
        assert!(!is_within(&place(c, 0.0, 0.0, 0.5), &inner, 1e-6));
    }

    #[test]
    fn supporters_only_counts_matching_top_faces() {
        let c = cube(10.0);
        let placed = vec![
            place(c, 0.0, 0.0, 0.0),
            place(c, 10.0, 0.0, 0.0),
            place(cube(5.0), 20.0, 0.0, 0.0),
        ];
        let candidate = place(c, 5.0, 0.0, 10.0).bounding_box();
        let found = supporters(&candidate, &placed, 1e-3);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, 0);
        assert_eq!(found[1].0, 1);
        assert!((support_ratio(&candidate, &found) - 1.0).abs() < 1e-9);

        let overhang = place(c, 15.0, 0.0, 10.0).bounding_box();
        let found = supporters(&overhang, &placed, 1e-3);
        assert_eq!(found.len(), 1);
        assert!((support_ratio(&overhang, &found) - 0.5).abs() < 1e-9);
    }
}
