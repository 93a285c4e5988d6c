//! Execution-side traits: when positions are held and what they earn.
//!
//! [`PositionModel`] turns target weights into held positions (modelling the
//! delay between decision and entry, or partial fills). [`ReturnModel`] turns
//! held positions into per-security gross returns.

use crate::{PositionPanel, PriceField, PricePanel, Result, ReturnPanel, WeightPanel};

/// Third stage of a strategy: target weights to held positions.
pub trait PositionModel: Send + Sync {
    /// Name of this position model.
    fn name(&self) -> &str;

    /// Computes the positions held on each date.
    ///
    /// The position on date `t` may only depend on weights from dates `<= t`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model's configuration is invalid.
    fn target_weights_to_positions(&self, weights: &WeightPanel, prices: &PricePanel) -> Result<PositionPanel>;
}

/// Fourth stage of a strategy: held positions to gross returns.
pub trait ReturnModel: Send + Sync {
    /// Name of this return model.
    fn name(&self) -> &str;

    /// Computes per-security gross returns before costs.
    ///
    /// # Errors
    ///
    /// Returns an error if a required price field is missing or `positions`
    /// is not aligned with `prices`.
    fn positions_to_gross_returns(&self, positions: &PositionPanel, prices: &PricePanel) -> Result<ReturnPanel>;

    /// Price fields this model reads.
    fn required_fields(&self) -> &[PriceField];
}
