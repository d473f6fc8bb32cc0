//! Physical stability bookkeeping for stacked items.
//!
//! Every item resting above the floor records which items carry it and in
//! what share. When a new item is added its weight flows down through that
//! graph, split by overlap area, so each item knows the total load it bears
//! directly and transitively.

use crate::geometry::{support_ratio, supporters};
use crate::model::PlacedItem;
use crate::packing::PackingConfig;

/// Why a placement would be unstable.
#[derive(Clone, Debug, PartialEq)]
pub enum Instability {
    /// Less of the footprint is supported than the configured ratio.
    InsufficientSupport { ratio: f64 },
    /// An item underneath would carry more than the configured load.
    Overloaded { index: usize, load: f64 },
}

/// Outcome of a successful stability evaluation, ready to be committed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Support {
    /// `(supporter index, share of the weight)`; shares sum to 1 unless grounded.
    shares: Vec<(usize, f64)>,
    /// Extra load each affected item would carry.
    deltas: Vec<(usize, f64)>,
}

impl Support {
    pub fn is_grounded(&self) -> bool {
        self.shares.is_empty()
    }
}

/// Support relations and accumulated loads, indexed like the placement list.
#[derive(Clone, Debug, Default)]
pub struct SupportGraph {
    supporters: Vec<Vec<(usize, f64)>>,
    loads: Vec<f64>,
}

impl SupportGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            supporters: Vec::with_capacity(capacity),
            loads: Vec::with_capacity(capacity),
        }
    }

    /// Load in kg carried by the item at `index`.
    pub fn load_on(&self, index: usize) -> f64 {
        self.loads.get(index).copied().unwrap_or(0.0)
    }

    /// Checks whether `candidate` can rest on `placed` without toppling or
    /// overloading anything beneath it.
    ///
    /// `placed` must be the same list this graph was built from.
    pub fn evaluate(
        &self,
        placed: &[PlacedItem],
        candidate: &PlacedItem,
        config: &PackingConfig,
    ) -> Result<Support, Instability> {
        debug_assert_eq!(placed.len(), self.loads.len());

        if candidate.position.z <= config.height_epsilon {
            return Ok(Support::default());
        }

        let bb = candidate.bounding_box();
        let found = supporters(&bb, placed, config.height_epsilon);
        let ratio = support_ratio(&bb, &found);
        if ratio + config.general_epsilon < config.support_ratio || found.is_empty() {
            return Err(Instability::InsufficientSupport { ratio });
        }

        let total_area: f64 = found.iter().map(|(_, area)| area).sum();
        let shares: Vec<(usize, f64)> = found
            .into_iter()
            .map(|(idx, area)| (idx, area / total_area))
            .collect();

        // supporters always sit earlier in the list, so one backwards sweep
        // pushes every delta all the way to the floor
        let mut delta = vec![0.0; placed.len()];
        for &(idx, share) in &shares {
            delta[idx] += candidate.product.weight * share;
        }
        for idx in (0..placed.len()).rev() {
            if delta[idx] <= 0.0 {
                continue;
            }
            let carried = delta[idx];
            for &(below, share) in &self.supporters[idx] {
                delta[below] += carried * share;
            }
        }

        let mut deltas = Vec::new();
        for (idx, extra) in delta.into_iter().enumerate() {
            if extra <= 0.0 {
                continue;
            }
            let load = self.loads[idx] + extra;
            if load > config.max_support_load + config.general_epsilon {
                return Err(Instability::Overloaded { index: idx, load });
            }
            deltas.push((idx, extra));
        }

        Ok(Support { shares, deltas })
    }

    /// Records a placement that `evaluate` accepted. Call right after pushing
    /// the item onto the placement list.
    pub fn commit(&mut self, support: Support) {
        for (idx, extra) in support.deltas {
            self.loads[idx] += extra;
        }
        self.supporters.push(support.shares);
        self.loads.push(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dimensions, Product, ProductSize};
    use crate::types::Vec3;

    fn slab(weight: f64) -> Product {
        Product::new(ProductSize::LL, Dimensions::new(10.0, 10.0, 5.0), weight).unwrap()
    }

    fn at(p: Product, x: f64, y: f64, z: f64) -> PlacedItem {
        PlacedItem::new(p, Vec3::new(x, y, z), p.dims)
    }

    fn push(
        graph: &mut SupportGraph,
        placed: &mut Vec<PlacedItem>,
        item: PlacedItem,
        config: &PackingConfig,
    ) -> Result<(), Instability> {
        let support = graph.evaluate(placed, &item, config)?;
        placed.push(item);
        graph.commit(support);
        Ok(())
    }

    #[test]
    fn floor_items_are_always_stable() {
        let config = PackingConfig::default();
        let graph = SupportGraph::new();
        let support = graph.evaluate(&[], &at(slab(80.0), 0.0, 0.0, 0.0), &config).unwrap();
        assert!(support.is_grounded());
    }

    #[test]
    fn floating_and_overhanging_items_are_rejected() {
        let config = PackingConfig::default();
        let mut graph = SupportGraph::new();
        let mut placed = Vec::new();
        push(&mut graph, &mut placed, at(slab(1.0), 0.0, 0.0, 0.0), &config).unwrap();

        let floating = at(slab(1.0), 20.0, 0.0, 5.0);
        assert!(matches!(
            graph.evaluate(&placed, &floating, &config),
            Err(Instability::InsufficientSupport { .. })
        ));

        // 4 of 10 cm resting on the slab below
        let overhang = at(slab(1.0), 6.0, 0.0, 5.0);
        assert!(matches!(
            graph.evaluate(&placed, &overhang, &config),
            Err(Instability::InsufficientSupport { ratio }) if (ratio - 0.4).abs() < 1e-9
        ));

        // exactly half is enough
        let half = at(slab(1.0), 5.0, 0.0, 5.0);
        assert!(graph.evaluate(&placed, &half, &config).is_ok());
    }

    #[test]
    fn load_propagates_transitively() {
        let config = PackingConfig::default();
        let mut graph = SupportGraph::new();
        let mut placed = Vec::new();
        push(&mut graph, &mut placed, at(slab(1.0), 0.0, 0.0, 0.0), &config).unwrap();
        push(&mut graph, &mut placed, at(slab(1.0), 10.0, 0.0, 0.0), &config).unwrap();
        // bridges both bottom slabs evenly
        push(&mut graph, &mut placed, at(slab(2.0), 5.0, 0.0, 5.0), &config).unwrap();
        push(&mut graph, &mut placed, at(slab(4.0), 5.0, 0.0, 10.0), &config).unwrap();

        assert!((graph.load_on(2) - 4.0).abs() < 1e-9);
        assert!((graph.load_on(0) - 3.0).abs() < 1e-9);
        assert!((graph.load_on(1) - 3.0).abs() < 1e-9);
        assert_eq!(graph.load_on(3), 0.0);
    }

    #[test]
    fn rejects_stack_exceeding_load_limit() {
        let config = PackingConfig::builder().max_support_load(10.0).build();
        let mut graph = SupportGraph::new();
        let mut placed = Vec::new();
        push(&mut graph, &mut placed, at(slab(1.0), 0.0, 0.0, 0.0), &config).unwrap();
        push(&mut graph, &mut placed, at(slab(6.0), 0.0, 0.0, 5.0), &config).unwrap();

        // bottom slab would carry 6 + 5 = 11 kg
        let result = graph.evaluate(&placed, &at(slab(5.0), 0.0, 0.0, 10.0), &config);
        assert!(matches!(
            result,
            Err(Instability::Overloaded { index: 0, load }) if (load - 11.0).abs() < 1e-9
        ));
        assert!(
            graph
                .evaluate(&placed, &at(slab(4.0), 0.0, 0.0, 10.0), &config)
                .is_ok()
        );
    }
}
