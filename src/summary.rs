//! Human-oriented views of a packing result: key figures and loading steps.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::model::{BoxId, Dimensions, PlacedItem, ProductSize};
use crate::packing::PackingResult;

/// Height of one loading step in centimeters.
pub const STEP_BAND_CM: u32 = 10;

/// Key figures of one packed box.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PackingSummary {
    pub box_id: BoxId,
    pub outer: Dimensions,
    pub inner: Dimensions,
    pub max_weight: f64,
    pub total_items: usize,
    pub total_weight: f64,
    pub utilization_rate: f64,
    pub packing_efficiency: f64,
    /// Highest top face in cm
    pub height_used: f64,
    /// `height_used` ÷ inner height, in percent
    pub height_efficiency: f64,
    /// Weight in kg resting at each whole-centimeter height
    pub weight_per_layer: BTreeMap<u32, f64>,
    pub item_count_by_size: BTreeMap<ProductSize, u32>,
}

impl PackingSummary {
    pub fn new(result: &PackingResult) -> Self {
        let inner = result.target.inner();
        let height_used = result.max_height_used();
        let height_efficiency = if inner.height > 0.0 {
            height_used / inner.height * 100.0
        } else {
            0.0
        };

        let mut weight_per_layer = BTreeMap::new();
        for item in &result.placed {
            *weight_per_layer.entry(whole_cm(item.position.z)).or_insert(0.0) +=
                item.product.weight;
        }

        Self {
            box_id: result.target.id.clone(),
            outer: result.target.outer,
            inner,
            max_weight: result.target.max_weight,
            total_items: result.placed.len(),
            total_weight: result.total_weight,
            utilization_rate: result.utilization_rate,
            packing_efficiency: result.packing_efficiency,
            height_used,
            height_efficiency,
            weight_per_layer,
            item_count_by_size: count_by_size(&result.placed),
        }
    }
}

/// One loading step: everything that starts within a 10 cm height band.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PackingStep {
    /// 1-based
    pub step: usize,
    /// Lower edge of the band in cm
    pub band_start: u32,
    pub counts: BTreeMap<ProductSize, u32>,
    pub item_count: usize,
}

impl fmt::Display for PackingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.band_start == 0 {
            write!(f, "Bottom layer: ")?;
        } else {
            write!(f, "Around {} cm: ", self.band_start)?;
        }
        let parts: Vec<String> = self
            .counts
            .iter()
            .map(|(size, count)| match count {
                1 => size.to_string(),
                n => format!("{} × {}", size, n),
            })
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// Groups placed items into loading steps, lowest band first.
pub fn packing_steps(result: &PackingResult) -> Vec<PackingStep> {
    let mut bands: BTreeMap<u32, Vec<&PlacedItem>> = BTreeMap::new();
    for item in &result.placed {
        let band = whole_cm(item.position.z) / STEP_BAND_CM * STEP_BAND_CM;
        bands.entry(band).or_default().push(item);
    }

    bands
        .into_iter()
        .enumerate()
        .map(|(idx, (band_start, items))| PackingStep {
            step: idx + 1,
            band_start,
            counts: count_by_size(items.iter().copied()),
            item_count: items.len(),
        })
        .collect()
}

fn whole_cm(z: f64) -> u32 {
    // positions are never negative; the cast saturates anyway
    z.max(0.0) as u32
}

fn count_by_size<'a>(items: impl IntoIterator<Item = &'a PlacedItem>) -> BTreeMap<ProductSize, u32> {
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(item.product.size).or_insert(0) += 1;
    }
    counts
}
