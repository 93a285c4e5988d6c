//! Position models, return models and backtest composition for impetus.
//!
//! This crate provides the execution half of a strategy:
//! - Position models that delay target weights into held positions
//! - Return models that turn held positions into gross returns
//! - [`Backtest`], which chains the four stages over a price panel
//!
//! # Example
//!
//! ```rust,ignore
//! use impetus_eval::{Backtest, NextPeriodEntry, OpenToOpenReturns};
//! use impetus_allocate::EqualWeightAllocator;
//! use impetus_signals::UpMinusDown;
//!
//! let backtest = Backtest::builder()
//!     .signals(UpMinusDown::default())
//!     .allocator(EqualWeightAllocator::new())
//!     .positions(NextPeriodEntry)
//!     .returns(OpenToOpenReturns)
//!     .build();
//! let result = backtest.run(&prices)?;
//! println!("{:?}", result.aggregate_returns());
//! ```

pub mod backtest;
pub mod positions;
pub mod returns;

// Re-export main types
pub use backtest::{Backtest, BacktestBuilder, BacktestResult};
pub use positions::{DelayedEntry, NextPeriodEntry};
pub use returns::OpenToOpenReturns;
