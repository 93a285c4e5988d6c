//! Return models: what held positions earn.

use impetus_traits::{PositionPanel, PriceField, PricePanel, Result, ReturnModel, ReturnPanel};
use tracing::debug;

/// Open-to-open gross returns.
///
/// The return on date `t` is `position[t - 1] * (open[t] / open[t - 1] - 1)`:
/// a position held on `t - 1` earns the move from that day's open to the
/// next. Combined with [`NextPeriodEntry`](crate::NextPeriodEntry), a weight
/// decided on the close of `t - 2` earns the `t - 1 -> t` open move.
///
/// Missing on either side yields a missing return.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenToOpenReturns;

impl ReturnModel for OpenToOpenReturns {
    fn name(&self) -> &str {
        "open_to_open"
    }

    fn positions_to_gross_returns(&self, positions: &PositionPanel, prices: &PricePanel) -> Result<ReturnPanel> {
        let open = prices.field(PriceField::Open)?;
        open.ensure_aligned(positions, "open-to-open returns")?;

        let held = positions.shift(1);
        let returns = open
            .pct_change()
            .zip_with(&held, |change, position| {
                // Flat positions earn +0.0, never -0.0
                let r = change? * position?;
                Some(if r == 0.0 { 0.0 } else { r })
            })?;

        debug!(model = self.name(), dates = returns.len(), "computed gross returns");
        Ok(returns)
    }

    fn required_fields(&self) -> &[PriceField] {
        &[PriceField::Open]
    }
}
