//! Signal generator trait, the first pipeline stage.
//!
//! A signal generator turns a price panel into a discrete long/flat/short
//! panel (`+1`, `0`, `-1`) aligned with the price index.

use crate::{PriceField, PricePanel, Result, SignalPanel};

/// First stage of a strategy: prices to signals.
///
/// Implementations should be thread-safe (`Send + Sync`) so that independent
/// backtests can run in parallel, and must be causal: the signal on date `t`
/// may only depend on prices observed on or before `t`.
///
/// # Example
///
/// ```no_run
/// use impetus_traits::{PriceField, PricePanel, Result, SignalGenerator, SignalPanel};
///
/// struct AlwaysLong;
///
/// impl SignalGenerator for AlwaysLong {
///     fn name(&self) -> &str {
///         "always_long"
///     }
///
///     fn prices_to_signals(&self, prices: &PricePanel) -> Result<SignalPanel> {
///         Ok(prices.field(PriceField::Close)?.map(|_| Some(1)))
///     }
///
///     fn lookback(&self) -> usize {
///         0
///     }
///
///     fn required_fields(&self) -> &[PriceField] {
///         &[PriceField::Close]
///     }
/// }
/// ```
pub trait SignalGenerator: Send + Sync {
    /// Returns the name of this generator.
    ///
    /// Used to identify the strategy in logs and results.
    fn name(&self) -> &str;

    /// Computes the signal panel.
    ///
    /// # Errors
    ///
    /// Returns an error if a required price field is missing or the
    /// generator's configuration is invalid.
    fn prices_to_signals(&self, prices: &PricePanel) -> Result<SignalPanel>;

    /// Number of rows of history consumed before the first defined score.
    fn lookback(&self) -> usize;

    /// Price fields this generator reads.
    fn required_fields(&self) -> &[PriceField];
}
