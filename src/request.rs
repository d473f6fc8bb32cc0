//! Validated shipment requests and candidate box filtering.

use std::collections::BTreeMap;

use log::debug;

use crate::catalog::{BoxCatalog, ProductCatalog};
use crate::error::RequestError;
use crate::model::{Product, ProductSize, TransportBox};

/// Maximum units of a single size in one request.
pub const MAX_QUANTITY_PER_SIZE: u32 = 1000;
/// Maximum units across all sizes in one request.
pub const MAX_TOTAL_ITEMS: u32 = 5000;

/// A validated multiset of products.
///
/// Lines are kept in size order, so iteration is deterministic regardless of
/// how the caller listed them. Every line has a quantity of at least one.
#[derive(Clone, Debug, PartialEq)]
pub struct ShipmentRequest {
    lines: BTreeMap<ProductSize, (Product, u32)>,
}

impl ShipmentRequest {
    /// Validates `(label, quantity)` pairs against the product catalog.
    ///
    /// Zero quantities are dropped. Repeated labels are summed.
    pub fn from_labels<'a>(
        catalog: &ProductCatalog,
        quantities: impl IntoIterator<Item = (&'a str, i64)>,
    ) -> Result<Self, RequestError> {
        let mut lines: BTreeMap<ProductSize, (Product, u32)> = BTreeMap::new();
        let mut total: u64 = 0;

        for (label, quantity) in quantities {
            let product = catalog
                .lookup(label)
                .copied()
                .ok_or_else(|| RequestError::UnknownSize(label.to_string()))?;
            if quantity < 0 {
                return Err(RequestError::NegativeQuantity {
                    label: label.to_string(),
                    quantity,
                });
            }
            if quantity > i64::from(MAX_QUANTITY_PER_SIZE) {
                return Err(RequestError::QuantityTooLarge {
                    label: label.to_string(),
                    quantity,
                    max: MAX_QUANTITY_PER_SIZE,
                });
            }
            if quantity == 0 {
                continue;
            }

            // bounded by MAX_QUANTITY_PER_SIZE above
            let quantity = quantity as u32;
            total += u64::from(quantity);
            let entry = lines.entry(product.size).or_insert((product, 0));
            entry.1 += quantity;
            if entry.1 > MAX_QUANTITY_PER_SIZE {
                return Err(RequestError::QuantityTooLarge {
                    label: label.to_string(),
                    quantity: i64::from(entry.1),
                    max: MAX_QUANTITY_PER_SIZE,
                });
            }
        }

        if total == 0 {
            return Err(RequestError::EmptyRequest);
        }
        if total > u64::from(MAX_TOTAL_ITEMS) {
            return Err(RequestError::TooManyItems {
                total,
                max: MAX_TOTAL_ITEMS,
            });
        }

        Ok(Self { lines })
    }

    /// Builds a request from catalog products directly.
    pub fn from_products(
        items: impl IntoIterator<Item = (Product, u32)>,
    ) -> Result<Self, RequestError> {
        let mut lines: BTreeMap<ProductSize, (Product, u32)> = BTreeMap::new();
        for (product, quantity) in items.into_iter().filter(|(_, q)| *q > 0) {
            lines.entry(product.size).or_insert((product, 0)).1 += quantity;
        }
        if lines.is_empty() {
            return Err(RequestError::EmptyRequest);
        }
        Ok(Self { lines })
    }

    /// `(product, quantity)` lines in size order.
    pub fn lines(&self) -> impl Iterator<Item = (&Product, u32)> {
        self.lines.values().map(|(p, q)| (p, *q))
    }

    pub fn quantities(&self) -> BTreeMap<ProductSize, u32> {
        self.lines.iter().map(|(size, (_, q))| (*size, *q)).collect()
    }

    pub fn total_units(&self) -> u32 {
        self.lines.values().map(|(_, q)| q).sum()
    }

    pub fn total_volume(&self) -> f64 {
        self.lines
            .values()
            .map(|(p, q)| p.dims.volume() * f64::from(*q))
            .sum()
    }

    pub fn total_weight(&self) -> f64 {
        self.lines
            .values()
            .map(|(p, q)| p.weight * f64::from(*q))
            .sum()
    }

    /// One entry per unit, in size order.
    pub fn expand_units(&self) -> Vec<Product> {
        self.lines
            .values()
            .flat_map(|(p, q)| std::iter::repeat_n(*p, *q as usize))
            .collect()
    }
}

/// Boxes whose inner volume and weight limit can theoretically hold the request.
///
/// Ordered by ascending outer volume; ties keep catalog order. An empty
/// result means the load cannot ship in any available box.
pub fn find_candidate_boxes<'a>(
    boxes: &'a BoxCatalog,
    request: &ShipmentRequest,
) -> Vec<&'a TransportBox> {
    let total_volume = request.total_volume();
    let total_weight = request.total_weight();

    let mut candidates: Vec<&TransportBox> = boxes
        .all()
        .iter()
        .filter(|b| b.can_fit_volume(total_volume) && b.can_fit_weight(total_weight))
        .collect();
    candidates.sort_by(|a, b| a.volume().total_cmp(&b.volume()));

    debug!(
        "Total volume {:.2} cm³, total weight {:.3} kg, {} candidate boxes: {:?}",
        total_volume,
        total_weight,
        candidates.len(),
        candidates.iter().map(|b| b.id.as_str()).collect::<Vec<_>>()
    );
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn products() -> ProductCatalog {
        ProductCatalog::builtin().unwrap()
    }

    #[test]
    fn merges_and_orders_lines() {
        let req =
            ShipmentRequest::from_labels(&products(), [("LL", 2), ("S", 3), ("s", 1), ("L", 0)])
                .unwrap();
        let q = req.quantities();
        assert_eq!(q.len(), 2);
        assert_eq!(q[&ProductSize::S], 4);
        assert_eq!(q[&ProductSize::LL], 2);
        assert_eq!(req.total_units(), 6);
        let sizes: Vec<_> = req.lines().map(|(p, _)| p.size).collect();
        assert_eq!(sizes, vec![ProductSize::S, ProductSize::LL]);
        assert_eq!(req.expand_units().len(), 6);
    }

    #[test_case(&[], RequestError::EmptyRequest; "empty")]
    #[test_case(&[("S", 0)], RequestError::EmptyRequest; "all zero")]
    #[test_case(&[("XL", 1)], RequestError::UnknownSize("XL".into()); "unknown size")]
    #[test_case(
        &[("S", -1)],
        RequestError::NegativeQuantity { label: "S".into(), quantity: -1 };
        "negative"
    )]
    #[test_case(
        &[("L", 1001)],
        RequestError::QuantityTooLarge { label: "L".into(), quantity: 1001, max: 1000 };
        "too many of one size"
    )]
    #[test_case(
        &[("S", 1000), ("S-long", 1000), ("L", 1000), ("L-long", 1000), ("LL", 1000), ("s", 1)],
        RequestError::QuantityTooLarge { label: "s".into(), quantity: 1001, max: 1000 };
        "repeated label exceeds per-size limit"
    )]
    fn rejects_invalid_input(items: &[(&str, i64)], expected: RequestError) {
        let err = ShipmentRequest::from_labels(&products(), items.iter().copied()).unwrap_err();
        assert_eq!(err, expected);
    }

    #[test]
    fn accepts_requests_at_the_limits() {
        let items = [
            ("S", 1000),
            ("S-long", 1000),
            ("L", 1000),
            ("L-long", 1000),
            ("LL", 1000),
        ];
        let req = ShipmentRequest::from_labels(&products(), items).unwrap();
        assert_eq!(req.total_units(), MAX_TOTAL_ITEMS);
    }

    #[test]
    fn from_products_drops_zero_lines() {
        let catalog = products();
        let s = *catalog.get(ProductSize::S).unwrap();
        let l = *catalog.get(ProductSize::L).unwrap();
        let req = ShipmentRequest::from_products([(s, 2), (l, 0)]).unwrap();
        assert_eq!(req.quantities().len(), 1);
        assert_eq!(
            ShipmentRequest::from_products([(l, 0)]),
            Err(RequestError::EmptyRequest)
        );
    }

    #[test]
    fn candidates_respect_volume_and_weight() {
        let boxes = BoxCatalog::builtin().unwrap();
        let req = ShipmentRequest::from_labels(&products(), [("L", 30)]).unwrap();
        let candidates = find_candidate_boxes(&boxes, &req);
        assert!(!candidates.is_empty());
        for b in &candidates {
            assert!(b.inner_volume() >= req.total_volume());
            assert!(b.max_weight >= req.total_weight());
        }
        let volumes: Vec<f64> = candidates.iter().map(|b| b.volume()).collect();
        assert!(volumes.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn overweight_request_has_no_candidates() {
        let boxes = BoxCatalog::builtin().unwrap();
        // 100 × 0.308 kg = 30.8 kg, above every box limit
        let req = ShipmentRequest::from_labels(&products(), [("LL", 100)]).unwrap();
        assert!(find_candidate_boxes(&boxes, &req).is_empty());
    }
}
