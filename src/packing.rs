//! Packing strategies, their shared configuration and the packing result.
//!
//! Two independent heuristics fill a single candidate box:
//! - [`GridPacker`](crate::grid::GridPacker): dense rectangular layers per product type
//! - [`BlfPacker`](crate::blf::BlfPacker): bottom-left-fill with collision and stability checks
//!
//! Both go through [`Packer::pack`], which turns a placement list into a
//! [`PackingResult`] and only returns it if every requested unit was placed
//! and the placement passes the physical checks.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::blf::BlfPacker;
use crate::geometry::{collides, is_within};
use crate::grid::GridPacker;
use crate::model::{PlacedItem, ProductSize, TransportBox};
use crate::request::ShipmentRequest;
use crate::stability::SupportGraph;
use crate::types::{EPSILON_GENERAL, EPSILON_HEIGHT};

/// Tolerances and physical limits for packing.
#[derive(Copy, Clone, Debug)]
pub struct PackingConfig {
    /// Minimum share of the footprint that must rest on items below (0.0 to 1.0)
    pub support_ratio: f64,
    /// Maximum load in kg any single item may carry, directly or transitively
    pub max_support_load: f64,
    /// Tolerance for matching top and bottom faces
    pub height_epsilon: f64,
    /// General numerical tolerance
    pub general_epsilon: f64,
    /// Wall-clock budget for one box attempt; exceeding it fails the attempt
    pub attempt_budget: Option<Duration>,
}

impl PackingConfig {
    pub const DEFAULT_SUPPORT_RATIO: f64 = 0.5;
    pub const DEFAULT_MAX_SUPPORT_LOAD: f64 = 50.0;
    pub const DEFAULT_HEIGHT_EPSILON: f64 = EPSILON_HEIGHT;
    pub const DEFAULT_GENERAL_EPSILON: f64 = EPSILON_GENERAL;

    pub fn builder() -> PackingConfigBuilder {
        PackingConfigBuilder::default()
    }
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            support_ratio: Self::DEFAULT_SUPPORT_RATIO,
            max_support_load: Self::DEFAULT_MAX_SUPPORT_LOAD,
            height_epsilon: Self::DEFAULT_HEIGHT_EPSILON,
            general_epsilon: Self::DEFAULT_GENERAL_EPSILON,
            attempt_budget: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PackingConfigBuilder {
    config: PackingConfig,
}

impl PackingConfigBuilder {
    pub fn support_ratio(mut self, ratio: f64) -> Self {
        self.config.support_ratio = ratio;
        self
    }

    pub fn max_support_load(mut self, kg: f64) -> Self {
        self.config.max_support_load = kg;
        self
    }

    pub fn height_epsilon(mut self, epsilon: f64) -> Self {
        self.config.height_epsilon = epsilon;
        self
    }

    pub fn general_epsilon(mut self, epsilon: f64) -> Self {
        self.config.general_epsilon = epsilon;
        self
    }

    pub fn attempt_budget(mut self, budget: Option<Duration>) -> Self {
        self.config.attempt_budget = budget;
        self
    }

    pub fn build(self) -> PackingConfig {
        self.config
    }
}

/// Which heuristic fills a box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PackingStrategy {
    Grid,
    #[default]
    CollisionAware,
}

impl PackingStrategy {
    pub fn code(&self) -> &'static str {
        match self {
            PackingStrategy::Grid => "grid",
            PackingStrategy::CollisionAware => "collision_aware",
        }
    }
}

impl fmt::Display for PackingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PackingStrategy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(PackingStrategy::Grid),
            "collision_aware" | "blf" => Ok(PackingStrategy::CollisionAware),
            other => Err(other.to_string()),
        }
    }
}

/// A placement heuristic for a single box.
pub trait Packer {
    fn strategy(&self) -> PackingStrategy;

    fn config(&self) -> &PackingConfig;

    /// Places every requested unit, or returns `None` if any unit does not fit.
    fn place(&self, target: &TransportBox, request: &ShipmentRequest) -> Option<Vec<PlacedItem>>;

    /// Packs the request into `target` and verifies the outcome.
    fn pack(&self, target: &TransportBox, request: &ShipmentRequest) -> Option<PackingResult> {
        if !target.can_fit_weight(request.total_weight()) {
            debug!("Box {} rejected: weight limit", target.id);
            return None;
        }

        let placed = match self.place(target, request) {
            Some(placed) => placed,
            None => {
                debug!("Box {} rejected by {} packer", target.id, self.strategy());
                return None;
            }
        };

        let result =
            PackingResult::from_placements(target, request, placed, self.strategy(), self.config());
        if !result.is_feasible {
            debug!(
                "Box {} rejected: {} placement failed verification",
                target.id,
                self.strategy()
            );
            return None;
        }
        Some(result)
    }
}

/// Packs `request` into `target` with the chosen strategy.
///
/// Returns `None` when the box cannot hold every requested unit.
pub fn pack(
    target: &TransportBox,
    request: &ShipmentRequest,
    strategy: PackingStrategy,
    config: &PackingConfig,
) -> Option<PackingResult> {
    match strategy {
        PackingStrategy::Grid => GridPacker::new(*config).pack(target, request),
        PackingStrategy::CollisionAware => BlfPacker::new(*config).pack(target, request),
    }
}

/// Result of packing one request into one box.
#[derive(Clone, Debug, Serialize)]
pub struct PackingResult {
    #[serde(rename = "box")]
    pub target: TransportBox,
    pub requested: BTreeMap<ProductSize, u32>,
    pub placed: Vec<PlacedItem>,
    pub strategy: PackingStrategy,
    pub total_weight: f64,
    /// Sum of the placed items' volumes in cm³
    pub total_volume: f64,
    /// Placed volume ÷ inner volume, in percent
    pub utilization_rate: f64,
    /// Placed volume ÷ (inner footprint × highest point used), in percent
    pub packing_efficiency: f64,
    pub is_feasible: bool,
}

impl PackingResult {
    /// Builds the result and its metrics from a placement list.
    ///
    /// The result is feasible only if every requested unit was placed, the
    /// weight limit holds, and each item is contained, collision-free and
    /// stably supported.
    pub fn from_placements(
        target: &TransportBox,
        request: &ShipmentRequest,
        placed: Vec<PlacedItem>,
        strategy: PackingStrategy,
        config: &PackingConfig,
    ) -> Self {
        let inner = target.inner();
        let total_weight: f64 = placed.iter().map(|p| p.product.weight).sum();
        let total_volume: f64 = placed.iter().map(|p| p.dims.volume()).sum();
        let max_height_used = placed.iter().map(|p| p.top_z()).fold(0.0, f64::max);

        let inner_volume = inner.volume();
        let utilization_rate = if inner_volume > 0.0 {
            total_volume / inner_volume * 100.0
        } else {
            0.0
        };
        let used_space = inner.footprint_area() * max_height_used;
        let packing_efficiency = if used_space > 0.0 {
            total_volume / used_space * 100.0
        } else {
            0.0
        };

        let all_placed = count_by_size(&placed) == request.quantities();
        let is_feasible = all_placed
            && target.can_fit_weight(total_weight)
            && placements_are_valid(target, &placed, config);

        Self {
            target: target.clone(),
            requested: request.quantities(),
            placed,
            strategy,
            total_weight,
            total_volume,
            utilization_rate,
            packing_efficiency,
            is_feasible,
        }
    }

    pub fn max_height_used(&self) -> f64 {
        self.placed.iter().map(|p| p.top_z()).fold(0.0, f64::max)
    }

    pub fn item_count(&self) -> usize {
        self.placed.len()
    }
}

fn count_by_size(placed: &[PlacedItem]) -> BTreeMap<ProductSize, u32> {
    let mut counts = BTreeMap::new();
    for p in placed {
        *counts.entry(p.product.size).or_insert(0) += 1;
    }
    counts
}

/// Containment, pairwise collision and stability over a full placement list.
fn placements_are_valid(target: &TransportBox, placed: &[PlacedItem], config: &PackingConfig) -> bool {
    let inner = target.inner();
    if !placed
        .iter()
        .all(|p| is_within(p, &inner, config.general_epsilon))
    {
        return false;
    }

    for (i, a) in placed.iter().enumerate() {
        if placed[i + 1..]
            .iter()
            .any(|b| collides(a, b, config.general_epsilon))
        {
            return false;
        }
    }

    // replay bottom-up so supporters always come first
    let mut order: Vec<&PlacedItem> = placed.iter().collect();
    order.sort_by(|a, b| {
        a.position
            .z
            .partial_cmp(&b.position.z)
            .unwrap_or(Ordering::Equal)
    });
    let mut graph = SupportGraph::with_capacity(placed.len());
    let mut replayed: Vec<PlacedItem> = Vec::with_capacity(placed.len());
    for item in order {
        match graph.evaluate(&replayed, item, config) {
            Ok(support) => {
                replayed.push(item.clone());
                graph.commit(support);
            }
            Err(_) => return false,
        }
    }
    true
}

/// Picks the box to recommend from feasible results in generation order.
///
/// First result with packing efficiency ≥ 60 %, else the first with
/// utilization ≥ 50 %, else the one with the highest efficiency.
pub fn recommend(results: &[PackingResult]) -> Option<&PackingResult> {
    const MIN_EFFICIENCY: f64 = 60.0;
    const MIN_UTILIZATION: f64 = 50.0;

    results
        .iter()
        .find(|r| r.packing_efficiency >= MIN_EFFICIENCY)
        .or_else(|| results.iter().find(|r| r.utilization_rate >= MIN_UTILIZATION))
        .or_else(|| {
            results.iter().reduce(|best, r| {
                if r.packing_efficiency > best.packing_efficiency {
                    r
                } else {
                    best
                }
            })
        })
}
