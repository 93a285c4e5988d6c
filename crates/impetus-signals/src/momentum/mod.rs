//! Momentum signals based on lagged historical returns.
//!
//! The cross-sectional "up minus down" (UMD) generator ranks securities by
//! their return over a long lookback window that skips the most recent
//! weeks, going long the winners and short the losers at each rebalance.

mod up_minus_down;

pub use up_minus_down::{UpMinusDown, UpMinusDownConfig};
