//! Collision-aware bottom-left-fill packer.
//!
//! Keeps a frontier of insertion points ordered lowest, then back, then left.
//! Units go in largest first; each one takes the first frontier point where
//! it stays inside the box, hits nothing and rests stably. Every placement
//! opens three new points at its right, front and top.

use std::cmp::Ordering;
use std::time::Instant;

use log::{debug, warn};

use crate::geometry::collides;
use crate::model::{Dimensions, PlacedItem, Product, TransportBox};
use crate::packing::{Packer, PackingConfig, PackingStrategy};
use crate::request::ShipmentRequest;
use crate::stability::{Support, SupportGraph};
use crate::types::{BoundingBox, Vec3};

/// Greedy bottom-left-fill packer with stability and load checks.
///
/// Items keep their vertical axis; only a quarter turn about it is tried.
#[derive(Clone, Debug, Default)]
pub struct BlfPacker {
    config: PackingConfig,
}

/// Mutable state of one box attempt.
struct Attempt<'a> {
    config: &'a PackingConfig,
    bounds: BoundingBox,
    frontier: Vec<Vec3>,
    placed: Vec<PlacedItem>,
    graph: SupportGraph,
}

impl<'a> Attempt<'a> {
    fn new(config: &'a PackingConfig, bounds: BoundingBox, capacity: usize) -> Self {
        Self {
            config,
            bounds,
            frontier: vec![Vec3::zero()],
            placed: Vec::with_capacity(capacity),
            graph: SupportGraph::with_capacity(capacity),
        }
    }

    /// First `(frontier index, item, support)` that accepts `product`.
    fn find_slot(&self, product: &Product) -> Option<(usize, PlacedItem, Support)> {
        for dims in orientations(&product.dims) {
            for (idx, point) in self.frontier.iter().enumerate() {
                let candidate = PlacedItem::new(*product, *point, dims);
                if !self
                    .bounds
                    .contains_box(&candidate.bounding_box(), self.config.general_epsilon)
                {
                    continue;
                }
                if self
                    .placed
                    .iter()
                    .any(|p| collides(p, &candidate, self.config.general_epsilon))
                {
                    continue;
                }
                if let Ok(support) = self.graph.evaluate(&self.placed, &candidate, self.config) {
                    return Some((idx, candidate, support));
                }
            }
        }
        None
    }

    fn commit(&mut self, frontier_idx: usize, item: PlacedItem, support: Support) {
        self.frontier.remove(frontier_idx);

        let Vec3 { x, y, z } = item.position;
        let Dimensions {
            width,
            depth,
            height,
        } = item.dims;
        let occupied = item.bounding_box();

        self.placed.push(item);
        self.graph.commit(support);

        let eps = self.config.general_epsilon;
        let bounds = self.bounds;
        self.frontier
            .retain(|p| !starts_inside(&occupied, p, eps) && opens_space(&bounds, p, eps));

        for point in [
            Vec3::new(x + width, y, z),
            Vec3::new(x, y + depth, z),
            Vec3::new(x, y, z + height),
        ] {
            if !opens_space(&bounds, &point, eps) {
                continue;
            }
            if self.frontier.iter().any(|p| same_point(p, &point, eps)) {
                continue;
            }
            self.frontier.push(point);
        }
        self.frontier.sort_by(bottom_back_left);
    }
}

impl BlfPacker {
    pub fn new(config: PackingConfig) -> Self {
        Self { config }
    }
}

impl Packer for BlfPacker {
    fn strategy(&self) -> PackingStrategy {
        PackingStrategy::CollisionAware
    }

    fn config(&self) -> &PackingConfig {
        &self.config
    }

    fn place(&self, target: &TransportBox, request: &ShipmentRequest) -> Option<Vec<PlacedItem>> {
        let deadline = self.config.attempt_budget.map(|budget| Instant::now() + budget);

        // stable sort keeps size order among equal volumes
        let mut units = request.expand_units();
        units.sort_by(|a, b| b.dims.volume().total_cmp(&a.dims.volume()));

        let mut attempt = Attempt::new(&self.config, target.inner_bounds(), units.len());
        for (n, product) in units.iter().enumerate() {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                warn!(
                    "⏱️ Box {}: time budget exhausted after {} of {} items",
                    target.id,
                    n,
                    units.len()
                );
                return None;
            }

            let Some((idx, item, support)) = attempt.find_slot(product) else {
                debug!(
                    "Box {}: no stable slot for {} ({} of {} placed)",
                    target.id,
                    product.size,
                    n,
                    units.len()
                );
                return None;
            };
            attempt.commit(idx, item, support);
        }

        Some(attempt.placed)
    }
}

/// Native orientation, then the quarter turn about the vertical axis.
fn orientations(native: &Dimensions) -> Vec<Dimensions> {
    let swapped = native.swapped_footprint();
    if swapped == *native {
        vec![*native]
    } else {
        vec![*native, swapped]
    }
}

/// Any item starting at `p` would overlap `occupied`.
fn starts_inside(occupied: &BoundingBox, p: &Vec3, eps: f64) -> bool {
    p.x >= occupied.min.x - eps
        && p.x < occupied.max.x - eps
        && p.y >= occupied.min.y - eps
        && p.y < occupied.max.y - eps
        && p.z >= occupied.min.z - eps
        && p.z < occupied.max.z - eps
}

/// Whether an item of positive size could still start at `p`.
fn opens_space(bounds: &BoundingBox, p: &Vec3, eps: f64) -> bool {
    p.x < bounds.max.x - eps && p.y < bounds.max.y - eps && p.z < bounds.max.z - eps
}

fn same_point(a: &Vec3, b: &Vec3, eps: f64) -> bool {
    (a.x - b.x).abs() <= eps && (a.y - b.y).abs() <= eps && (a.z - b.z).abs() <= eps
}

fn bottom_back_left(a: &Vec3, b: &Vec3) -> Ordering {
    a.z.partial_cmp(&b.z)
        .unwrap_or(Ordering::Equal)
        .then(a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal))
        .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
}
