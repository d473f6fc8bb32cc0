use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use log::{info, warn};

use crate::packing::{PackingConfig, PackingStrategy};
use crate::ranker::ScoreWeights;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub optimizer: OptimizerConfig,
    pub ranking: RankingConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            optimizer: OptimizerConfig::from_env(),
            ranking: RankingConfig::from_env(),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
}

impl ApiConfig {
    const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
    const DEFAULT_PORT: u16 = 8080;
    const HOST_VAR: &'static str = "PARCEL_PLANNER_API_HOST";
    const PORT_VAR: &'static str = "PARCEL_PLANNER_API_PORT";

    fn from_env() -> Self {
        let (bind_ip, display_host) = match env_string(Self::HOST_VAR) {
            Some(raw) => match raw.parse::<IpAddr>() {
                Ok(ip) => (ip, raw),
                Err(err) => {
                    warn!(
                        "⚠️ Could not parse {} ('{}'): {}. Using {}.",
                        Self::HOST_VAR,
                        raw,
                        err,
                        Self::DEFAULT_HOST
                    );
                    (Self::DEFAULT_HOST, Self::DEFAULT_HOST.to_string())
                }
            },
            None => (Self::DEFAULT_HOST, Self::DEFAULT_HOST.to_string()),
        };

        let port = match env_string(Self::PORT_VAR) {
            Some(raw) => match raw.parse::<u16>() {
                Ok(value) if value != 0 => value,
                Ok(_) => {
                    warn!(
                        "⚠️ {} must not be 0. Using {}.",
                        Self::PORT_VAR,
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
                Err(err) => {
                    warn!(
                        "⚠️ Could not parse {} ('{}'): {}. Using {}.",
                        Self::PORT_VAR,
                        raw,
                        err,
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
            },
            None => Self::DEFAULT_PORT,
        };

        Self {
            bind_ip,
            display_host,
            port,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }
}

/// Packing tolerances, stability limits and strategy selection.
#[derive(Clone, Debug)]
pub struct OptimizerConfig {
    packing: PackingConfig,
    strategy: PackingStrategy,
    parallel: bool,
}

impl OptimizerConfig {
    const SUPPORT_RATIO_VAR: &'static str = "PARCEL_PLANNER_SUPPORT_RATIO";
    const MAX_SUPPORT_LOAD_VAR: &'static str = "PARCEL_PLANNER_MAX_SUPPORT_LOAD";
    const HEIGHT_EPSILON_VAR: &'static str = "PARCEL_PLANNER_HEIGHT_EPSILON";
    const GENERAL_EPSILON_VAR: &'static str = "PARCEL_PLANNER_GENERAL_EPSILON";
    const STRATEGY_VAR: &'static str = "PARCEL_PLANNER_STRATEGY";
    const PARALLEL_VAR: &'static str = "PARCEL_PLANNER_PARALLEL";
    const ATTEMPT_BUDGET_VAR: &'static str = "PARCEL_PLANNER_ATTEMPT_BUDGET_MS";

    fn from_env() -> Self {
        let support_ratio = load_f64_with_warning(
            Self::SUPPORT_RATIO_VAR,
            PackingConfig::DEFAULT_SUPPORT_RATIO,
            |value| (0.0..=1.0).contains(&value),
            "must be between 0 and 1",
            "Adjusted minimum support may lead to unstable stacks",
        );

        let max_support_load = load_f64_with_warning(
            Self::MAX_SUPPORT_LOAD_VAR,
            PackingConfig::DEFAULT_MAX_SUPPORT_LOAD,
            |value| value > 0.0,
            "must be greater than 0",
            "Adjusted load limit changes how high heavy items may be stacked",
        );

        let height_epsilon = load_f64_with_warning(
            Self::HEIGHT_EPSILON_VAR,
            PackingConfig::DEFAULT_HEIGHT_EPSILON,
            |value| value > 0.0,
            "must be greater than 0",
            "Adjusted height tolerance may cause unexpected placements",
        );

        let general_epsilon = load_f64_with_warning(
            Self::GENERAL_EPSILON_VAR,
            PackingConfig::DEFAULT_GENERAL_EPSILON,
            |value| value > 0.0,
            "must be greater than 0",
            "Adjusted tolerances may cause numerical instabilities",
        );

        let attempt_budget = env_string(Self::ATTEMPT_BUDGET_VAR).and_then(|raw| {
            match raw.parse::<u64>() {
                Ok(0) => {
                    warn!(
                        "⚠️ {} must be greater than 0. Running without a time budget.",
                        Self::ATTEMPT_BUDGET_VAR
                    );
                    None
                }
                Ok(ms) => Some(Duration::from_millis(ms)),
                Err(err) => {
                    warn!(
                        "⚠️ Could not parse {} ('{}'): {}. Running without a time budget.",
                        Self::ATTEMPT_BUDGET_VAR,
                        raw,
                        err
                    );
                    None
                }
            }
        });

        let strategy = env_string(Self::STRATEGY_VAR)
            .and_then(|raw| match raw.parse::<PackingStrategy>() {
                Ok(strategy) => Some(strategy),
                Err(other) => {
                    warn!(
                        "⚠️ Unknown packing strategy in {} ('{}'). Using {}.",
                        Self::STRATEGY_VAR,
                        other,
                        PackingStrategy::default()
                    );
                    None
                }
            })
            .unwrap_or_default();

        let parallel = env_string(Self::PARALLEL_VAR)
            .and_then(|raw| parse_bool(&raw, Self::PARALLEL_VAR))
            .unwrap_or(true);

        let packing = PackingConfig::builder()
            .support_ratio(support_ratio)
            .max_support_load(max_support_load)
            .height_epsilon(height_epsilon)
            .general_epsilon(general_epsilon)
            .attempt_budget(attempt_budget)
            .build();

        Self {
            packing,
            strategy,
            parallel,
        }
    }

    pub fn packing_config(&self) -> PackingConfig {
        self.packing
    }

    pub fn strategy(&self) -> PackingStrategy {
        self.strategy
    }

    /// Whether candidate boxes are packed on a thread pool.
    pub fn parallel(&self) -> bool {
        self.parallel
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            packing: PackingConfig::default(),
            strategy: PackingStrategy::default(),
            parallel: true,
        }
    }
}

/// Weights of the shipping option score.
#[derive(Clone, Debug, Default)]
pub struct RankingConfig {
    weights: ScoreWeights,
}

impl RankingConfig {
    const COST_VAR: &'static str = "PARCEL_PLANNER_WEIGHT_COST";
    const SPEED_VAR: &'static str = "PARCEL_PLANNER_WEIGHT_SPEED";
    const QUALITY_VAR: &'static str = "PARCEL_PLANNER_WEIGHT_QUALITY";
    const UTILIZATION_VAR: &'static str = "PARCEL_PLANNER_WEIGHT_UTILIZATION";

    fn from_env() -> Self {
        let load = |var: &str, default: f64| {
            load_f64_with_warning(
                var,
                default,
                |value| (0.0..=1.0).contains(&value),
                "must be between 0 and 1",
                "Adjusted score weight changes which shipping option is recommended",
            )
        };

        let weights = ScoreWeights {
            cost: load(Self::COST_VAR, ScoreWeights::DEFAULT_COST),
            speed: load(Self::SPEED_VAR, ScoreWeights::DEFAULT_SPEED),
            quality: load(Self::QUALITY_VAR, ScoreWeights::DEFAULT_QUALITY),
            utilization: load(Self::UTILIZATION_VAR, ScoreWeights::DEFAULT_UTILIZATION),
        };

        Self::with_weights(weights)
    }

    fn with_weights(weights: ScoreWeights) -> Self {
        let sum = weights.sum();
        if sum <= 0.0 {
            warn!("⚠️ All score weights are zero. Using the default weights.");
        } else if (sum - 1.0).abs() > 1e-9 {
            warn!("⚠️ Score weights sum to {:.3}. Scaling them to sum to 1.", sum);
        }

        Self {
            weights: weights.normalized(),
        }
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(
                "⚠️ Access to {} failed: {}. Using default value.",
                name, err
            );
            None
        }
    }
}

fn parse_bool(raw: &str, var_name: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        other => {
            warn!(
                "⚠️ Could not interpret {} ('{}') as boolean value. Using default value.",
                var_name, other
            );
            None
        }
    }
}

fn parse_f64_value(
    var_name: &str,
    raw: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    warning: &str,
) -> f64 {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && validator(value) => {
            let tolerance = (default.abs().max(1.0)) * 1e-9;
            if (value - default).abs() > tolerance {
                info!("⚠️ {} ({} = {}).", warning, var_name, value);
            }
            value
        }
        Ok(_) => {
            warn!(
                "⚠️ {} contains invalid value '{}': {}. Using {}.",
                var_name, raw, invalid_hint, default
            );
            default
        }
        Err(err) => {
            warn!(
                "⚠️ Could not parse {} ('{}') as number: {}. Using {}.",
                var_name, raw, err, default
            );
            default
        }
    }
}

fn load_f64_with_warning(
    var_name: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    warning: &str,
) -> f64 {
    match env_string(var_name) {
        Some(raw) => parse_f64_value(var_name, &raw, default, validator, invalid_hint, warning),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("1"; "one")]
    #[test_case("true"; "word true")]
    #[test_case("yes"; "yes")]
    #[test_case("y"; "y")]
    #[test_case("on"; "on")]
    #[test_case("TRUE"; "uppercase")]
    #[test_case("Yes"; "mixed case")]
    #[test_case(" true "; "padded")]
    #[test_case("  1  "; "padded one")]
    fn parse_bool_true_values(raw: &str) {
        assert_eq!(parse_bool(raw, "TEST_VAR"), Some(true));
    }

    #[test_case("0"; "zero")]
    #[test_case("false"; "word false")]
    #[test_case("no"; "no")]
    #[test_case("n"; "n")]
    #[test_case("off"; "off")]
    #[test_case("FALSE"; "uppercase")]
    #[test_case("OFF"; "uppercase off")]
    #[test_case(" false "; "padded")]
    fn parse_bool_false_values(raw: &str) {
        assert_eq!(parse_bool(raw, "TEST_VAR"), Some(false));
    }

    #[test_case("invalid"; "word")]
    #[test_case("2"; "number")]
    #[test_case("maybe"; "maybe")]
    #[test_case(""; "empty")]
    #[test_case("  "; "blank")]
    fn parse_bool_invalid_values(raw: &str) {
        assert_eq!(parse_bool(raw, "TEST_VAR"), None);
    }

    #[test]
    fn numbers_outside_range_fall_back_to_default() {
        let ratio = |raw: &str| {
            parse_f64_value(
                "TEST_VAR",
                raw,
                0.5,
                |v| (0.0..=1.0).contains(&v),
                "must be between 0 and 1",
                "changed",
            )
        };
        assert_eq!(ratio("0.75"), 0.75);
        assert_eq!(ratio("1.5"), 0.5);
        assert_eq!(ratio("-0.1"), 0.5);
        assert_eq!(ratio("NaN"), 0.5);
        assert_eq!(ratio("half"), 0.5);
    }

    #[test]
    fn defaults_match_core_defaults() {
        let optimizer = OptimizerConfig::default();
        assert_eq!(optimizer.strategy(), PackingStrategy::CollisionAware);
        assert!(optimizer.parallel());
        assert_eq!(
            optimizer.packing_config().support_ratio,
            PackingConfig::DEFAULT_SUPPORT_RATIO
        );
        assert_eq!(RankingConfig::default().weights(), ScoreWeights::default());
    }

    #[test]
    fn ranking_weights_are_scaled_to_one() {
        let config = RankingConfig::with_weights(ScoreWeights {
            cost: 1.0,
            speed: 1.0,
            quality: 0.0,
            utilization: 0.0,
        });
        let weights = config.weights();
        assert_eq!(weights.cost, 0.5);
        assert_eq!(weights.speed, 0.5);
        assert_eq!(weights.sum(), 1.0);
    }
}
