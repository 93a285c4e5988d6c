//! Signal generators for impetus strategies.
//!
//! This crate provides the generators that turn a price panel into a
//! long/flat/short signal panel:
//! - Momentum: cross-sectional "up minus down" ranking on lagged returns
//!
//! # Example
//!
//! ```ignore
//! use impetus_signals::momentum::UpMinusDown;
//! use impetus_signals::registry::create_generator;
//!
//! // Create a generator with default configuration
//! let umd = UpMinusDown::default();
//!
//! // Or look one up by name
//! let generator = create_generator("umd")?;
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod momentum;
pub mod registry;

// Re-export key types
pub use momentum::{UpMinusDown, UpMinusDownConfig};
pub use registry::{GeneratorInfo, available_generators, create_generator};
