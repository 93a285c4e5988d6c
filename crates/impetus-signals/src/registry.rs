//! Generator registry for discovering and constructing signal generators.
//!
//! This module provides metadata and name-based construction for all
//! generators in the impetus-signals library.

use impetus_traits::{ImpetusError, PriceField, Result, SignalGenerator};
use serde::Serialize;

use crate::momentum::UpMinusDown;

/// Metadata about a signal generator.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratorInfo {
    /// Unique identifier for the generator
    pub name: &'static str,

    /// Alternative names accepted by [`create_generator`]
    pub aliases: &'static [&'static str],

    /// Human-readable description
    pub description: &'static str,

    /// Rows of history needed under the default configuration
    pub typical_lookback: usize,

    /// Price fields read by the generator
    pub required_fields: &'static [PriceField],
}

/// Get information about all available generators.
#[must_use]
pub fn available_generators() -> Vec<GeneratorInfo> {
    vec![GeneratorInfo {
        name: "up_minus_down",
        aliases: &["umd", "momentum_12_1"],
        description: "Long the top and short the bottom percentile of 12-month returns skipping the last month",
        typical_lookback: 252,
        required_fields: &[PriceField::Close],
    }]
}

/// Get information about a specific generator by name or alias.
#[must_use]
pub fn get_generator_info(name: &str) -> Option<GeneratorInfo> {
    available_generators()
        .into_iter()
        .find(|info| info.name == name || info.aliases.contains(&name))
}

/// Create a generator with its default configuration by name or alias.
///
/// # Errors
///
/// Returns [`ImpetusError::Configuration`] for an unknown name.
pub fn create_generator(name: &str) -> Result<Box<dyn SignalGenerator>> {
    match get_generator_info(name).map(|info| info.name) {
        Some("up_minus_down") => Ok(Box::new(UpMinusDown::default())),
        _ => Err(ImpetusError::Configuration(format!(
            "unknown signal generator: '{}'",
            name
        ))),
    }
}
