#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/impetus/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # impetus
//!
//! impetus is an umbrella crate that re-exports all impetus sub-crates and
//! assembles the default Up Minus Down strategy.
//!
//! ## Quick Start
//!
//! ```ignore
//! use impetus::{PricePanel, StrategyConfig, up_minus_down};
//!
//! # fn main() -> impetus::Result<()> {
//! let prices = PricePanel::from_market_frame(&frame)?;
//! let backtest = up_minus_down(&StrategyConfig::default())?;
//! let result = backtest.run(&prices)?;
//!
//! for (date, ret) in result.index().iter().zip(result.aggregate_returns()) {
//!     println!("{date}: {ret:?}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Panels, calendar, errors and the four stage traits
//! - [`signals`] - Signal generators
//! - [`allocate`] - Weight allocators
//! - [`eval`] - Position models, return models and [`Backtest`]
//!
//! ## Architecture
//!
//! A strategy is four stages, each a trait object:
//!
//! 1. **Signal generator**: prices to `+1` / `0` / `-1` signals
//! 2. **Weight allocator**: signals to target weights
//! 3. **Position model**: target weights to held positions
//! 4. **Return model**: held positions to per-security gross returns

mod config;

pub use config::StrategyConfig;

/// Version information for the impetus crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Traits
// ============================================================================

/// Core types and trait definitions.
///
/// - [`SignalGenerator`] - Prices to signals
/// - [`WeightAllocator`] - Signals to target weights
/// - [`PositionModel`] - Target weights to positions
/// - [`ReturnModel`] - Positions to gross returns
pub mod traits {
    pub use impetus_traits::*;
}

pub use impetus_traits::{
    Date, ImpetusError, Panel, PositionModel, PositionPanel, PriceField, PricePanel, RebalanceRule,
    Result, ReturnModel, ReturnPanel, SignalGenerator, SignalPanel, Symbol, WeightAllocator,
    WeightPanel,
};

// ============================================================================
// Stages
// ============================================================================

/// Signal generators.
///
/// - **UpMinusDown**: long the top, short the bottom percentile of lagged
///   momentum, sampled at rebalance dates
pub mod signals {
    pub use impetus_signals::*;
}

/// Weight allocators.
///
/// - **EqualWeightAllocator**: `+1/L` per long, `-1/S` per short
/// - **VolScaledAllocator**: inverse trailing volatility within each side
pub mod allocate {
    pub use impetus_allocate::*;
}

/// Position models, return models and backtest composition.
///
/// - **NextPeriodEntry** / **DelayedEntry**: when weights are entered
/// - **OpenToOpenReturns**: what positions earn
/// - **Backtest**: the four stages chained over one price panel
pub mod eval {
    pub use impetus_eval::*;
}

pub use impetus_eval::{Backtest, BacktestResult};

/// Builds the default Up Minus Down pipeline from `config`.
///
/// The stages are [`UpMinusDown`](signals::UpMinusDown),
/// [`EqualWeightAllocator`](allocate::EqualWeightAllocator),
/// [`NextPeriodEntry`](eval::NextPeriodEntry) and
/// [`OpenToOpenReturns`](eval::OpenToOpenReturns).
///
/// # Errors
///
/// Returns [`ImpetusError::Configuration`] if `config` is invalid.
pub fn up_minus_down(config: &StrategyConfig) -> Result<Backtest> {
    config.validate()?;
    let generator = impetus_signals::UpMinusDown::new(config.signal_config())?;
    Ok(Backtest::builder()
        .signals(generator)
        .allocator(impetus_allocate::EqualWeightAllocator::new())
        .positions(impetus_eval::NextPeriodEntry)
        .returns(impetus_eval::OpenToOpenReturns)
        .build())
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use impetus::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Backtest, BacktestResult, Date, ImpetusError, Panel, PositionModel, PriceField, PricePanel,
        RebalanceRule, Result, ReturnModel, SignalGenerator, StrategyConfig, WeightAllocator,
        up_minus_down,
    };
}
