//! Position models: when target weights become held positions.

use impetus_traits::{ImpetusError, PositionModel, PositionPanel, PricePanel, Result, WeightPanel};
use tracing::debug;

/// Enters target weights one period after they are decided.
///
/// `position[t] == weight[t - 1]`; the first row is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NextPeriodEntry;

impl PositionModel for NextPeriodEntry {
    fn name(&self) -> &str {
        "next_period_entry"
    }

    fn target_weights_to_positions(&self, weights: &WeightPanel, _prices: &PricePanel) -> Result<PositionPanel> {
        debug!(model = self.name(), dates = weights.len(), "lagged weights into positions");
        Ok(weights.shift(1))
    }
}

/// Enters target weights after a fixed number of periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayedEntry {
    periods: usize,
}

impl DelayedEntry {
    /// Create a model delaying entry by `periods` rows.
    ///
    /// # Errors
    ///
    /// Returns [`ImpetusError::Configuration`] if `periods` is zero, which
    /// would trade on the same bar the decision was made.
    pub fn new(periods: usize) -> Result<Self> {
        if periods == 0 {
            return Err(ImpetusError::Configuration(
                "entry delay must be at least one period".to_string(),
            ));
        }
        Ok(Self { periods })
    }

    /// Number of periods between decision and entry.
    pub const fn periods(&self) -> usize {
        self.periods
    }
}

impl PositionModel for DelayedEntry {
    fn name(&self) -> &str {
        "delayed_entry"
    }

    fn target_weights_to_positions(&self, weights: &WeightPanel, _prices: &PricePanel) -> Result<PositionPanel> {
        debug!(
            model = self.name(),
            periods = self.periods,
            dates = weights.len(),
            "lagged weights into positions"
        );
        Ok(weights.shift(self.periods))
    }
}
