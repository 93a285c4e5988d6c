//! Strategy configuration.

use std::path::Path;

use impetus_signals::UpMinusDownConfig;
use impetus_traits::{ImpetusError, RebalanceRule, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parameters of an Up Minus Down momentum strategy.
///
/// Missing keys take their defaults when deserialized:
///
/// ```json
/// {
///   "momentum_window": 252,
///   "ranking_gap": 22,
///   "top_n_pct": 50.0,
///   "rebalance_rule": "month-end",
///   "per_share_commission": 0.005
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Rows from the start of the ranking window to the decision date
    pub momentum_window: usize,

    /// Most recent rows excluded from the ranking window
    pub ranking_gap: usize,

    /// Percent of ranked securities held on each side, in `(0, 50]`
    pub top_n_pct: f64,

    /// Calendar period at whose end positions are refreshed
    pub rebalance_rule: RebalanceRule,

    /// Commission per share traded, for downstream cost models
    pub per_share_commission: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            momentum_window: 252,
            ranking_gap: 22,
            top_n_pct: 50.0,
            rebalance_rule: RebalanceRule::MonthEnd,
            per_share_commission: 0.005,
        }
    }
}

impl StrategyConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ImpetusError::Json`] for malformed input, including unknown
    /// rebalance tokens, and [`ImpetusError::Configuration`] for invalid
    /// parameter combinations.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// As [`StrategyConfig::from_json_str`], plus [`ImpetusError::Io`] if the
    /// file cannot be read.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading strategy config");
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ImpetusError::Configuration`] if the signal parameters are
    /// inconsistent or the commission is negative or not finite.
    pub fn validate(&self) -> Result<()> {
        self.signal_config().validate()?;
        if !(self.per_share_commission.is_finite() && self.per_share_commission >= 0.0) {
            return Err(ImpetusError::Configuration(format!(
                "per_share_commission must be a non-negative number, got {}",
                self.per_share_commission
            )));
        }
        Ok(())
    }

    /// The signal generator's share of the configuration.
    pub fn signal_config(&self) -> UpMinusDownConfig {
        UpMinusDownConfig {
            momentum_window: self.momentum_window,
            ranking_gap: self.ranking_gap,
            top_n_pct: self.top_n_pct,
            rebalance_rule: self.rebalance_rule,
        }
    }
}
