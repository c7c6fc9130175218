use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Order in which LNS considers the removable assignments of an incumbent, keyed on the owning
/// professor's average preference weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CandidateOrder {
    Ascending,
    Descending,
}

impl CandidateOrder {
    pub fn reversed(self) -> Self {
        match self {
            CandidateOrder::Ascending => CandidateOrder::Descending,
            CandidateOrder::Descending => CandidateOrder::Ascending,
        }
    }
}

/// Parameters of the multi-start GRASP construction.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraspConfig {
    pub trials: usize,
    pub alpha_min: f64,
    pub alpha_max: f64,
    /// Degree-bonus weight `K` of the first trial; favours coverage.
    pub amplification_min: f64,
    /// Degree-bonus weight `K` of the last trial; favours load balance.
    pub amplification_max: f64,
    pub time_limit_secs: Option<f64>,
}

impl Default for GraspConfig {
    fn default() -> Self {
        GraspConfig {
            trials: 10,
            alpha_min: 0.5,
            alpha_max: 0.9,
            amplification_min: 1.0,
            amplification_max: 9.0,
            time_limit_secs: None,
        }
    }
}

impl GraspConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trials == 0 {
            return Err(ConfigError::NoTrials);
        }
        let alpha_ok = (0.0..=1.0).contains(&self.alpha_min)
            && (0.0..=1.0).contains(&self.alpha_max)
            && self.alpha_min <= self.alpha_max;
        if !alpha_ok {
            return Err(ConfigError::AlphaOutOfRange {
                min: self.alpha_min,
                max: self.alpha_max,
            });
        }
        let amplification_ok = self.amplification_min.is_finite()
            && self.amplification_max.is_finite()
            && self.amplification_min >= 0.0
            && self.amplification_min <= self.amplification_max;
        if !amplification_ok {
            return Err(ConfigError::AmplificationOutOfRange {
                min: self.amplification_min,
                max: self.amplification_max,
            });
        }
        if let Some(secs) = self.time_limit_secs {
            check_time_limit(secs)?;
        }
        Ok(())
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs.map(Duration::from_secs_f64)
    }
}

/// Switch for the deterministic preference-first constructor run alongside GRASP.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GreedyConfig {
    pub enabled: bool,
}

impl Default for GreedyConfig {
    fn default() -> Self {
        GreedyConfig { enabled: true }
    }
}

/// Parameters of the destroy-and-rebuild neighborhood search.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LnsConfig {
    pub enabled: bool,
    pub rounds: usize,
    pub destroy_fraction: f64,
    pub order: CandidateOrder,
    pub time_limit_secs: f64,
    pub node_limit: Option<u32>,
    pub tolerance: f64,
}

impl Default for LnsConfig {
    fn default() -> Self {
        LnsConfig {
            enabled: true,
            rounds: 5,
            destroy_fraction: 0.3,
            order: CandidateOrder::Descending,
            time_limit_secs: 30.0,
            node_limit: None,
            tolerance: 1e-6,
        }
    }
}

impl LnsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.destroy_fraction) {
            return Err(ConfigError::DestroyFractionOutOfRange(self.destroy_fraction));
        }
        check_time_limit(self.time_limit_secs)?;
        if !(self.tolerance >= 0.0) {
            return Err(ConfigError::NegativeTolerance(self.tolerance));
        }
        Ok(())
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_secs_f64(self.time_limit_secs)
    }
}

fn check_time_limit(secs: f64) -> Result<(), ConfigError> {
    if secs.is_finite() && secs > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveTimeLimit(secs))
    }
}

/// Everything the heuristic core is parameterised with. Supplied by the caller, never read
/// from disk by the core itself.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeuristicConfig {
    pub seed: u64,
    pub grasp: GraspConfig,
    pub greedy: GreedyConfig,
    pub lns: LnsConfig,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        HeuristicConfig {
            seed: 1234,
            grasp: GraspConfig::default(),
            greedy: GreedyConfig::default(),
            lns: LnsConfig::default(),
        }
    }
}

impl HeuristicConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grasp.validate()?;
        self.lns.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(HeuristicConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_negative_destroy_fraction_is_rejected() {
        let mut config = HeuristicConfig::default();
        config.lns.destroy_fraction = -0.1;
        assert_eq!(
            config.validate(),
            Err(ConfigError::DestroyFractionOutOfRange(-0.1))
        );
    }

    #[test]
    fn test_alpha_range_is_checked() {
        let mut config = GraspConfig::default();
        config.alpha_min = 0.95;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::AlphaOutOfRange { .. })
        ));
        config.alpha_min = 0.0;
        config.alpha_max = 1.2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_trials_and_bad_limits_are_rejected() {
        let mut grasp = GraspConfig::default();
        grasp.trials = 0;
        assert_eq!(grasp.validate(), Err(ConfigError::NoTrials));

        let mut lns = LnsConfig::default();
        lns.time_limit_secs = 0.0;
        assert_eq!(lns.validate(), Err(ConfigError::NonPositiveTimeLimit(0.0)));
        lns.time_limit_secs = 1.0;
        lns.tolerance = f64::NAN;
        assert!(lns.validate().is_err());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: HeuristicConfig = serde_json::from_str(
            r#"{"seed": 7, "greedy": {"enabled": false}, "lns": {"order": "ascending"}}"#,
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert!(!config.greedy.enabled);
        assert_eq!(config.lns.order, CandidateOrder::Ascending);
        assert_eq!(config.lns.destroy_fraction, 0.3);
        assert_eq!(config.grasp, GraspConfig::default());
    }
}
