//! Weight allocation policies for impetus strategies.
//!
//! An allocator maps a long/flat/short signal panel to target weights,
//! expressed as fractions of total strategy capital. Every policy here
//! allocates 100% of long capital across the active longs and 100% of short
//! capital across the active shorts on each date.
//!
//! # Examples
//!
//! ```rust,ignore
//! use impetus_allocate::{EqualWeightAllocator, WeightAllocator};
//!
//! let allocator = EqualWeightAllocator::default();
//! let weights = allocator.signals_to_target_weights(&signals, &prices)?;
//! ```

mod equal_weight;
mod vol_scale;

// Re-export main types
pub use equal_weight::EqualWeightAllocator;
pub use impetus_traits::WeightAllocator;
pub use vol_scale::{VolScaledAllocator, VolScaledConfig};
