#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/impetus/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core trait definitions for the Impetus momentum framework.
//!
//! This crate provides the panel abstraction shared by every pipeline stage and
//! the four stage traits a strategy is assembled from.

/// The version of the impetus-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod allocator;
pub mod calendar;
pub mod error;
pub mod execution;
pub mod panel;
pub mod signal;
pub mod stats;
pub mod types;

// Re-exports
pub use allocator::WeightAllocator;
pub use calendar::RebalanceRule;
pub use error::{ImpetusError, Result};
pub use execution::{PositionModel, ReturnModel};
pub use panel::Panel;
pub use signal::SignalGenerator;
pub use stats::RankOrder;
pub use types::{
    CE_TO_UNIX_EPOCH_DAYS, Date, PositionPanel, PriceField, PricePanel, ReturnPanel, SignalPanel,
    Symbol, WeightPanel,
};
