//! Cross-sectional momentum: long recent winners, short recent losers.

use impetus_traits::{
    ImpetusError, Panel, PriceField, PricePanel, RankOrder, RebalanceRule, Result, SignalGenerator,
    SignalPanel,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the up-minus-down momentum signal.
///
/// The score of a security on date `t` is its return from `t - momentum_window`
/// to `t - ranking_gap` (in rows of the price index). The gap leaves out the
/// most recent weeks, where short-term reversal dominates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpMinusDownConfig {
    /// Rows between the start of the ranking window and `t` (default: 252 ≈ 12 months)
    pub momentum_window: usize,

    /// Most recent rows excluded from the ranking window (default: 22 ≈ 1 month)
    pub ranking_gap: usize,

    /// Percent of ranked securities held on each side, in `(0, 50]` (default: 50)
    pub top_n_pct: f64,

    /// Calendar period at whose end the signal is refreshed (default: month-end)
    pub rebalance_rule: RebalanceRule,
}

impl Default for UpMinusDownConfig {
    fn default() -> Self {
        Self {
            momentum_window: 252,
            ranking_gap: 22,
            top_n_pct: 50.0,
            rebalance_rule: RebalanceRule::MonthEnd,
        }
    }
}

impl UpMinusDownConfig {
    /// Checks the parameter combination.
    ///
    /// # Errors
    ///
    /// Returns [`ImpetusError::Configuration`] unless
    /// `momentum_window > ranking_gap`, `momentum_window > 0` and
    /// `0 < top_n_pct <= 50`.
    pub fn validate(&self) -> Result<()> {
        if self.momentum_window == 0 {
            return Err(ImpetusError::Configuration(
                "momentum_window must be positive".to_string(),
            ));
        }
        if self.momentum_window <= self.ranking_gap {
            return Err(ImpetusError::Configuration(format!(
                "momentum_window ({}) must exceed ranking_gap ({})",
                self.momentum_window, self.ranking_gap
            )));
        }
        if !(self.top_n_pct > 0.0 && self.top_n_pct <= 50.0) {
            return Err(ImpetusError::Configuration(format!(
                "top_n_pct must be in (0, 50], got {}",
                self.top_n_pct
            )));
        }
        Ok(())
    }
}

/// Up-minus-down momentum signal generator.
///
/// On every date, securities are ranked by their lagged momentum score. The
/// best `top_n_pct` percent (by descending percentile rank) are long (`+1`),
/// the worst `top_n_pct` percent (by ascending percentile rank) are short
/// (`-1`), everything else, including securities without a score, is flat.
/// Should a security qualify for both sides, long wins.
///
/// Daily signals are then sampled at the last date of each rebalance period
/// and held until the next period's last date. Dates before the first
/// rebalance carry no signal.
///
/// # Example
///
/// ```ignore
/// use impetus_signals::momentum::{UpMinusDown, UpMinusDownConfig};
///
/// // Default: 12-month momentum skipping the last month, monthly rebalance
/// let umd = UpMinusDown::default();
/// let signals = umd.prices_to_signals(&prices)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct UpMinusDown {
    config: UpMinusDownConfig,
}

impl UpMinusDown {
    /// Creates a generator after validating `config`.
    ///
    /// # Errors
    ///
    /// See [`UpMinusDownConfig::validate`].
    pub fn new(config: UpMinusDownConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &UpMinusDownConfig {
        &self.config
    }

    /// Effective length of the ranking window in rows.
    #[must_use]
    pub const fn effective_lookback(&self) -> usize {
        self.config.momentum_window - self.config.ranking_gap
    }

    /// Lagged momentum score `close[t - gap] / close[t - window] - 1`.
    ///
    /// Missing for the first `momentum_window` rows, wherever either price is
    /// missing, and where the ratio is not finite.
    ///
    /// # Errors
    ///
    /// Returns [`ImpetusError::MissingField`] without a `Close` field.
    pub fn scores(&self, prices: &PricePanel) -> Result<Panel<f64>> {
        let closes = prices.field(PriceField::Close)?;
        let recent = closes.shift(self.config.ranking_gap);
        let past = closes.shift(self.config.momentum_window);
        recent.zip_with(&past, |recent, past| {
            let change = recent? / past? - 1.0;
            change.is_finite().then_some(change)
        })
    }

    /// Daily signals before rebalance sampling.
    fn daily_signals(&self, scores: &Panel<f64>) -> Result<SignalPanel> {
        let threshold = self.config.top_n_pct / 100.0;
        let top = scores.rank_pct(RankOrder::Descending);
        let bottom = scores.rank_pct(RankOrder::Ascending);
        top.zip_with(&bottom, |top, bottom| Some(classify(top, bottom, threshold)))
    }
}

/// Long if in the top bucket, short if in the bottom bucket, long first.
fn classify(top_rank: Option<f64>, bottom_rank: Option<f64>, threshold: f64) -> i8 {
    if top_rank.is_some_and(|r| r <= threshold) {
        1
    } else if bottom_rank.is_some_and(|r| r <= threshold) {
        -1
    } else {
        0
    }
}

impl SignalGenerator for UpMinusDown {
    fn name(&self) -> &str {
        "up_minus_down"
    }

    fn prices_to_signals(&self, prices: &PricePanel) -> Result<SignalPanel> {
        let scores = self.scores(prices)?;
        let daily = self.daily_signals(&scores)?;

        let sampled = daily.resample_last(self.config.rebalance_rule);
        let signals = sampled.reindex_ffill(scores.index())?;

        debug!(
            generator = self.name(),
            dates = signals.len(),
            securities = signals.columns().len(),
            rebalances = sampled.len(),
            rule = %self.config.rebalance_rule,
            "computed momentum signals"
        );
        Ok(signals)
    }

    fn lookback(&self) -> usize {
        self.config.momentum_window
    }

    fn required_fields(&self) -> &[PriceField] {
        &[PriceField::Close]
    }
}
