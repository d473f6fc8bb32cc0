//! End-to-end planning: validation, candidate filtering, per-box packing,
//! box recommendation and carrier ranking.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::NaiveDate;
use log::info;
use rayon::prelude::*;

use crate::catalog::{Addon, Catalogs};
use crate::error::Result;
use crate::model::TransportBox;
use crate::packing::{self, PackingConfig, PackingResult, PackingStrategy};
use crate::ranker::{Ranker, ScoreWeights, ShippingOption};
use crate::request::{self, ShipmentRequest};

/// Packing outcome for one request across all candidate boxes.
#[derive(Clone, Debug)]
pub struct PackingPlan {
    pub request: ShipmentRequest,
    /// Candidates in ascending volume order, whether they worked or not
    pub candidates: Vec<TransportBox>,
    /// Feasible results, in candidate order
    pub results: Vec<PackingResult>,
}

impl PackingPlan {
    pub fn recommended(&self) -> Option<&PackingResult> {
        packing::recommend(&self.results)
    }

    /// No candidate box could hold the load.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Holds the reference data and policy for planning shipments.
#[derive(Clone, Debug)]
pub struct ShipmentPlanner {
    catalogs: Catalogs,
    packing: PackingConfig,
    strategy: PackingStrategy,
    parallel: bool,
    weights: ScoreWeights,
}

impl ShipmentPlanner {
    pub fn new(catalogs: Catalogs) -> Self {
        Self {
            catalogs,
            packing: PackingConfig::default(),
            strategy: PackingStrategy::default(),
            parallel: true,
            weights: ScoreWeights::default(),
        }
    }

    /// Planner over the built-in catalogs with default policy.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(Catalogs::builtin()?))
    }

    pub fn with_packing_config(mut self, config: PackingConfig) -> Self {
        self.packing = config;
        self
    }

    pub fn with_strategy(mut self, strategy: PackingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn default_strategy(&self) -> PackingStrategy {
        self.strategy
    }

    /// Turns `(size label, quantity)` pairs into a request, or rejects them.
    pub fn validate<'a>(
        &self,
        items: impl IntoIterator<Item = (&'a str, i64)>,
    ) -> Result<ShipmentRequest> {
        Ok(ShipmentRequest::from_labels(&self.catalogs.products, items)?)
    }

    pub fn candidate_boxes(&self, request: &ShipmentRequest) -> Vec<&TransportBox> {
        request::find_candidate_boxes(&self.catalogs.boxes, request)
    }

    pub fn pack_box(
        &self,
        target: &TransportBox,
        request: &ShipmentRequest,
        strategy: PackingStrategy,
    ) -> Option<PackingResult> {
        packing::pack(target, request, strategy, &self.packing)
    }

    /// Packs the request into every candidate box.
    ///
    /// Boxes are attempted independently and, if enabled, in parallel; the
    /// output always follows candidate order.
    pub fn pack_all(
        &self,
        request: ShipmentRequest,
        strategy: Option<PackingStrategy>,
    ) -> PackingPlan {
        let strategy = strategy.unwrap_or(self.strategy);
        let started = Instant::now();
        let candidates: Vec<TransportBox> =
            self.candidate_boxes(&request).into_iter().cloned().collect();

        let attempts: Vec<Option<PackingResult>> = if self.parallel {
            candidates
                .par_iter()
                .map(|target| self.pack_box(target, &request, strategy))
                .collect()
        } else {
            candidates
                .iter()
                .map(|target| self.pack_box(target, &request, strategy))
                .collect()
        };
        let results: Vec<PackingResult> = attempts.into_iter().flatten().collect();

        info!(
            "📦 {} units: {} of {} candidate boxes feasible with {} packer ({:.1} ms)",
            request.total_units(),
            results.len(),
            candidates.len(),
            strategy,
            started.elapsed().as_secs_f64() * 1000.0
        );

        PackingPlan {
            request,
            candidates,
            results,
        }
    }

    /// Ranks shipping options for packed boxes, dated from today.
    pub fn rank<'a>(
        &'a self,
        results: &'a [PackingResult],
        addons: &BTreeMap<Addon, bool>,
    ) -> Vec<ShippingOption<'a>> {
        self.ranker().rank_options(results, addons)
    }

    pub fn rank_on<'a>(
        &'a self,
        results: &'a [PackingResult],
        addons: &BTreeMap<Addon, bool>,
        today: NaiveDate,
    ) -> Vec<ShippingOption<'a>> {
        self.ranker().rank_options_on(results, addons, today)
    }

    pub fn ranker(&self) -> Ranker<'_> {
        Ranker::new(&self.catalogs, self.weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PlannerError, RequestError};
    use crate::model::Dimensions;

    fn planner() -> ShipmentPlanner {
        ShipmentPlanner::builtin().unwrap()
    }

    #[test]
    fn bad_catalog_data_is_a_catalog_error() {
        let err: PlannerError = Dimensions::validated(-1.0, 10.0, 10.0).unwrap_err().into();
        assert!(matches!(err, PlannerError::Catalog(_)));
        assert!(err.to_string().starts_with("invalid catalog data"));
    }

    #[test]
    fn small_order_is_packed_and_recommended() {
        let planner = planner();
        let request = planner.validate([("S", 50)]).unwrap();
        let plan = planner.pack_all(request, None);

        assert!(!plan.is_empty());
        assert_eq!(plan.candidates.len(), 5);
        let recommended = plan.recommended().unwrap();
        assert!(plan.results.iter().any(|r| r.target.id == recommended.target.id));
        for result in &plan.results {
            assert!(result.is_feasible);
            assert_eq!(result.strategy, PackingStrategy::CollisionAware);
            let expected = 50.0 * 274.625 / result.target.inner_volume() * 100.0;
            assert!((result.utilization_rate - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn overweight_order_has_no_candidates_and_no_results() {
        let planner = planner();
        let request = planner.validate([("LL", 100)]).unwrap();
        let plan = planner.pack_all(request, None);

        assert!(plan.candidates.is_empty());
        assert!(plan.is_empty());
        assert!(plan.recommended().is_none());
        assert!(planner.rank(&plan.results, &BTreeMap::new()).is_empty());
    }

    #[test]
    fn invalid_input_is_rejected_before_packing() {
        let err = planner().validate([("S", -2)]).unwrap_err();
        assert!(matches!(
            err,
            PlannerError::InvalidInput(RequestError::NegativeQuantity { .. })
        ));
    }

    #[test]
    fn parallel_and_sequential_runs_agree() {
        let parallel = planner();
        let sequential = planner().with_parallel(false);
        let items = [("S", 30), ("L", 10), ("LL", 3)];

        let a = parallel.pack_all(parallel.validate(items).unwrap(), None);
        let b = sequential.pack_all(sequential.validate(items).unwrap(), None);

        let ids = |plan: &PackingPlan| -> Vec<String> {
            plan.results.iter().map(|r| r.target.id.to_string()).collect()
        };
        assert_eq!(ids(&a), ids(&b));
        for (x, y) in a.results.iter().zip(&b.results) {
            assert_eq!(x.placed, y.placed);
        }
    }

    #[test]
    fn strategy_can_be_chosen_per_request() {
        let planner = planner().with_strategy(PackingStrategy::CollisionAware);
        let request = planner.validate([("L", 8)]).unwrap();
        let plan = planner.pack_all(request, Some(PackingStrategy::Grid));
        assert!(plan.results.iter().all(|r| r.strategy == PackingStrategy::Grid));
        assert!(!plan.is_empty());
    }

    #[test]
    fn grid_ships_a_small_mixed_order_in_every_box() {
        let planner = planner();
        let request = planner.validate([("S", 1), ("LL", 1)]).unwrap();
        let plan = planner.pack_all(request, Some(PackingStrategy::Grid));

        assert_eq!(plan.candidates.len(), 5);
        assert_eq!(plan.results.len(), plan.candidates.len());
        assert!(plan.results.iter().all(|r| r.is_feasible));
    }

    #[test]
    fn ranking_uses_planner_weights() {
        let planner = planner().with_weights(ScoreWeights {
            cost: 1.0,
            speed: 0.0,
            quality: 0.0,
            utilization: 0.0,
        });
        let request = planner.validate([("S", 10)]).unwrap();
        let plan = planner.pack_all(request, None);
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let options = planner.rank_on(&plan.results, &BTreeMap::new(), today);

        assert!(!options.is_empty());
        // pure cost weighting puts the cheapest option on top
        assert_eq!(options[0].savings, 0);
        assert_eq!(options[0].recommendation_score, 1.0);
    }
}
