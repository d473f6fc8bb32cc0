//! Grid packer: dense rectangular layers, one product type at a time.
//!
//! Product lines go in by descending unit volume, ties in size order. For each
//! line the packer picks the axis permutation that fits the most units into the
//! footprint and the height still free, then fills that block row by row
//! (x fastest, then y, then z). The next line starts on top of the layers the
//! previous one used.

use log::debug;

use crate::model::{Dimensions, PlacedItem, TransportBox};
use crate::packing::{Packer, PackingConfig, PackingStrategy};
use crate::request::ShipmentRequest;
use crate::types::Vec3;

/// Fast discrete packer. Never splits a product line across orientations.
#[derive(Clone, Debug, Default)]
pub struct GridPacker {
    config: PackingConfig,
}

/// Orientation chosen for one product line.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Layout {
    dims: Dimensions,
    per_row: u64,
    per_layer: u64,
    capacity: u64,
}

impl GridPacker {
    pub fn new(config: PackingConfig) -> Self {
        Self { config }
    }

    fn slots(&self, space: f64, length: f64) -> u64 {
        if length <= 0.0 || space <= 0.0 {
            return 0;
        }
        // float-to-int casts saturate, and the epsilon keeps exact fits exact
        ((space + self.config.general_epsilon) / length).floor() as u64
    }

    /// Best orientation for `quantity` units in the space above `floor_z`.
    ///
    /// Capacity is capped at `quantity`, so the first permutation that can
    /// take the whole line wins over a later one that could take more.
    fn layout(
        &self,
        inner: &Dimensions,
        floor_z: f64,
        native: &Dimensions,
        quantity: u32,
    ) -> Option<Layout> {
        let remaining_h = inner.height - floor_z;
        let mut best: Option<Layout> = None;

        for dims in native.permutations() {
            let per_row = self.slots(inner.width, dims.width);
            let per_layer = per_row * self.slots(inner.depth, dims.depth);
            let capacity = (per_layer * self.slots(remaining_h, dims.height)).min(u64::from(quantity));
            if capacity > best.map_or(0, |b| b.capacity) {
                best = Some(Layout {
                    dims,
                    per_row,
                    per_layer,
                    capacity,
                });
            }
        }
        best
    }
}

impl Packer for GridPacker {
    fn strategy(&self) -> PackingStrategy {
        PackingStrategy::Grid
    }

    fn config(&self) -> &PackingConfig {
        &self.config
    }

    fn place(&self, target: &TransportBox, request: &ShipmentRequest) -> Option<Vec<PlacedItem>> {
        let inner = target.inner();
        let mut placed = Vec::with_capacity(request.total_units() as usize);
        let mut floor_z = 0.0;

        // stable sort keeps size order among equal volumes
        let mut lines: Vec<_> = request.lines().collect();
        lines.sort_by(|(a, _), (b, _)| b.dims.volume().total_cmp(&a.dims.volume()));

        for (product, quantity) in lines {
            let Some(layout) = self.layout(&inner, floor_z, &product.dims, quantity) else {
                debug!("Box {}: no orientation fits {}", target.id, product.size);
                return None;
            };
            if layout.capacity < u64::from(quantity) {
                debug!(
                    "Box {}: only {} of {} × {} fit",
                    target.id, layout.capacity, quantity, product.size
                );
                return None;
            }

            let Layout {
                dims,
                per_row,
                per_layer,
                ..
            } = layout;
            for n in 0..u64::from(quantity) {
                let layer = n / per_layer;
                let in_layer = n % per_layer;
                let position = Vec3::new(
                    (in_layer % per_row) as f64 * dims.width,
                    (in_layer / per_row) as f64 * dims.depth,
                    floor_z + layer as f64 * dims.height,
                );
                placed.push(PlacedItem::new(*product, position, dims));
            }

            let layers = u64::from(quantity).div_ceil(per_layer);
            floor_z += layers as f64 * dims.height;
        }

        Some(placed)
    }
}
