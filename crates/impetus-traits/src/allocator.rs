//! Weight allocator trait, the second pipeline stage.
//!
//! Allocators decide how much capital each signal receives. They are the
//! main substitution point of a strategy: equal weighting, volatility scaling
//! and similar rules all fit behind [`WeightAllocator`] without touching the
//! signal or execution stages.

use crate::{PricePanel, Result, SignalPanel, WeightPanel};

/// Tolerance used when checking that a side's weights sum to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Second stage of a strategy: signals to target weights.
///
/// Weights are fractions of total strategy capital, negative for shorts.
/// On every row with active signals, the absolute long weights sum to one and
/// the absolute short weights sum to one; a side with no active signal
/// carries no weight.
///
/// # Example
///
/// ```no_run
/// use impetus_traits::{PricePanel, Result, SignalPanel, WeightAllocator, WeightPanel};
///
/// struct LongOnlyFlat;
///
/// impl WeightAllocator for LongOnlyFlat {
///     fn name(&self) -> &str {
///         "long_only_flat"
///     }
///
///     fn signals_to_target_weights(
///         &self,
///         signals: &SignalPanel,
///         _prices: &PricePanel,
///     ) -> Result<WeightPanel> {
///         Ok(signals.map(|_| Some(0.0)))
///     }
/// }
/// ```
pub trait WeightAllocator: Send + Sync {
    /// Name of this allocation rule.
    fn name(&self) -> &str;

    /// Maps a signal panel, and optionally prices, to a weight panel of the
    /// same shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the price panel lacks a field the rule needs or is
    /// not aligned with `signals`.
    fn signals_to_target_weights(&self, signals: &SignalPanel, prices: &PricePanel) -> Result<WeightPanel>;
}

/// Per-row `(long sum, absolute short sum)` of a weight panel.
///
/// Useful for checking the side-sum contract of an allocator.
pub fn side_sums(weights: &WeightPanel) -> Vec<(f64, f64)> {
    weights
        .values()
        .rows()
        .into_iter()
        .map(|row| {
            row.iter().flatten().fold((0.0, 0.0), |(long, short), w| {
                if *w > 0.0 {
                    (long + w, short)
                } else {
                    (long, short - w)
                }
            })
        })
        .collect()
}
