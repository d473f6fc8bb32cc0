//! Carrier option ranking.
//!
//! Joins feasible packing results with the rate, service and surcharge
//! tables, prices every applicable (box, carrier, service) combination and
//! orders them by a weighted score over cost, speed, service quality and box
//! utilization.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{Days, Local, NaiveDate};
use log::{debug, warn};
use serde::Serialize;

use crate::catalog::{
    Addon, CarrierService, Catalogs, DeliveryTime, RateTable, ServiceTable, ShippingRate,
    SurchargeTable,
};
use crate::packing::PackingResult;

/// Relative weight of each sub-score. The built-in weights sum to 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreWeights {
    pub cost: f64,
    pub speed: f64,
    pub quality: f64,
    pub utilization: f64,
}

impl ScoreWeights {
    pub const DEFAULT_COST: f64 = 0.4;
    pub const DEFAULT_SPEED: f64 = 0.3;
    pub const DEFAULT_QUALITY: f64 = 0.2;
    pub const DEFAULT_UTILIZATION: f64 = 0.1;

    pub fn sum(&self) -> f64 {
        self.cost + self.speed + self.quality + self.utilization
    }

    /// Scales the weights to sum to 1, so scores stay within `0.0..=1.0`.
    ///
    /// Negative weights count as zero. If nothing positive is left, the
    /// defaults apply.
    pub fn normalized(self) -> Self {
        let clamped = Self {
            cost: self.cost.max(0.0),
            speed: self.speed.max(0.0),
            quality: self.quality.max(0.0),
            utilization: self.utilization.max(0.0),
        };
        let sum = clamped.sum();
        if !sum.is_finite() || sum <= 0.0 {
            return Self::default();
        }
        if (sum - 1.0).abs() <= 1e-9 {
            return clamped;
        }
        Self {
            cost: clamped.cost / sum,
            speed: clamped.speed / sum,
            quality: clamped.quality / sum,
            utilization: clamped.utilization / sum,
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            cost: Self::DEFAULT_COST,
            speed: Self::DEFAULT_SPEED,
            quality: Self::DEFAULT_QUALITY,
            utilization: Self::DEFAULT_UTILIZATION,
        }
    }
}

/// One priced way of shipping one packed box.
#[derive(Clone, Debug, Serialize)]
pub struct ShippingOption<'a> {
    pub packing: &'a PackingResult,
    pub rate: ShippingRate,
    pub service: &'a CarrierService,
    /// Base rate plus enabled add-on surcharges, in yen
    pub total_cost: u32,
    pub estimated_delivery: NaiveDate,
    /// Extra cost over the cheapest option in the same ranking
    pub savings: u32,
    pub recommendation_score: f64,
}

/// Prices and scores shipping options against a set of reference tables.
#[derive(Clone, Copy, Debug)]
pub struct Ranker<'c> {
    rates: &'c RateTable,
    services: &'c ServiceTable,
    surcharges: &'c SurchargeTable,
    weights: ScoreWeights,
}

impl<'c> Ranker<'c> {
    pub fn new(catalogs: &'c Catalogs, weights: ScoreWeights) -> Self {
        Self::from_tables(
            &catalogs.rates,
            &catalogs.services,
            &catalogs.surcharges,
            weights,
        )
    }

    /// Weights are normalized, see [`ScoreWeights::normalized`].
    pub fn from_tables(
        rates: &'c RateTable,
        services: &'c ServiceTable,
        surcharges: &'c SurchargeTable,
        weights: ScoreWeights,
    ) -> Self {
        Self {
            rates,
            services,
            surcharges,
            weights: weights.normalized(),
        }
    }

    /// Ranks options with delivery dates counted from today.
    pub fn rank_options<'a>(
        &self,
        results: &'a [PackingResult],
        addons: &BTreeMap<Addon, bool>,
    ) -> Vec<ShippingOption<'a>>
    where
        'c: 'a,
    {
        self.rank_options_on(results, addons, Local::now().date_naive())
    }

    /// Ranks options with delivery dates counted from `today`.
    ///
    /// Best score first; equal scores put the cheaper option first. Services
    /// whose applicability rule rejects a box are skipped for that box.
    pub fn rank_options_on<'a>(
        &self,
        results: &'a [PackingResult],
        addons: &BTreeMap<Addon, bool>,
        today: NaiveDate,
    ) -> Vec<ShippingOption<'a>>
    where
        'c: 'a,
    {
        let services: &'a ServiceTable = self.services;
        let mut options = Vec::new();

        for packing in results {
            let target = &packing.target;
            for carrier in services.carriers() {
                let (rate, fallback) = self.rates.rate_or_default(carrier, &target.id);
                if fallback {
                    warn!(
                        "⚠️ No {} rate for box {}, using default ¥{}",
                        carrier, target.id, rate.price
                    );
                }
                let extras = self.surcharges.total_for(carrier, addons);

                for service in services.for_carrier(carrier) {
                    if !service.applicability.allows(target) {
                        debug!("{} not available for box {}", service.name, target.id);
                        continue;
                    }
                    options.push(ShippingOption {
                        packing,
                        rate: rate.clone(),
                        service,
                        total_cost: rate.price.saturating_add(extras),
                        estimated_delivery: estimate_delivery(today, &service.delivery),
                        savings: 0,
                        recommendation_score: 0.0,
                    });
                }
            }
        }

        self.score(&mut options);

        if let Some(min_cost) = options.iter().map(|o| o.total_cost).min() {
            for option in &mut options {
                option.savings = option.total_cost - min_cost;
            }
        }

        options.sort_by(|a, b| {
            b.recommendation_score
                .partial_cmp(&a.recommendation_score)
                .unwrap_or(Ordering::Equal)
                .then(a.total_cost.cmp(&b.total_cost))
        });
        options
    }

    fn score(&self, options: &mut [ShippingOption<'_>]) {
        let (Some(min_cost), Some(max_cost)) = (
            options.iter().map(|o| o.total_cost).min(),
            options.iter().map(|o| o.total_cost).max(),
        ) else {
            return;
        };
        let cost_range = f64::from(max_cost - min_cost);

        for option in options.iter_mut() {
            let cost = if cost_range > 0.0 {
                1.0 - f64::from(option.total_cost - min_cost) / cost_range
            } else {
                1.0
            };
            let utilization = (option.packing.utilization_rate / 100.0).min(1.0);

            option.recommendation_score = cost * self.weights.cost
                + speed_score(&option.service.delivery) * self.weights.speed
                + quality_score(option.service) * self.weights.quality
                + utilization * self.weights.utilization;
        }
    }
}

/// The option with the lowest total cost; the better-ranked one on ties.
pub fn cheapest_option<'r, 'a>(options: &'r [ShippingOption<'a>]) -> Option<&'r ShippingOption<'a>> {
    options.iter().min_by_key(|o| o.total_cost)
}

/// Days from dispatch until delivery for a nominal delivery bucket.
pub fn delivery_offset_days(delivery: &DeliveryTime) -> u64 {
    match delivery {
        DeliveryTime::NextDay => 1,
        DeliveryTime::NextOrSecondDay => 2,
        DeliveryTime::Days { min, max } => (u64::from(*min) + u64::from(*max)) / 2,
        DeliveryTime::Unspecified => 2,
    }
}

pub fn estimate_delivery(today: NaiveDate, delivery: &DeliveryTime) -> NaiveDate {
    today
        .checked_add_days(Days::new(delivery_offset_days(delivery)))
        .unwrap_or(NaiveDate::MAX)
}

fn speed_score(delivery: &DeliveryTime) -> f64 {
    match delivery {
        DeliveryTime::NextDay => 1.0,
        DeliveryTime::NextOrSecondDay => 0.8,
        _ => 0.6,
    }
}

fn quality_score(service: &CarrierService) -> f64 {
    let mut score = 0.0;
    if service.tracking {
        score += 0.3;
    }
    if service.insurance {
        score += 0.3;
    }
    score += 0.1 * service.features.len() as f64;
    score.min(1.0)
}
