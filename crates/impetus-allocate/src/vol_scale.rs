//! Inverse-volatility allocation across each side of the book.

use impetus_traits::stats::{MIN_STD_THRESHOLD, sample_std};
use impetus_traits::{
    ImpetusError, Panel, PriceField, PricePanel, Result, SignalPanel, WeightAllocator, WeightPanel,
};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::equal_weight::equal_weights_row;

/// Configuration for volatility-scaled allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolScaledConfig {
    /// Rows of daily returns in the trailing volatility window (default: 63 ≈ 3 months)
    pub lookback: usize,

    /// Price field the returns are computed from (default: Close)
    pub field: PriceField,
}

impl Default for VolScaledConfig {
    fn default() -> Self {
        Self {
            lookback: 63,
            field: PriceField::Close,
        }
    }
}

/// Volatility-scaled allocator.
///
/// Each active security receives a weight proportional to the inverse of its
/// trailing return volatility, normalised so that longs sum to `+1` and shorts
/// to `-1`. The volatility on date `t` uses returns up to and including `t`
/// only. When any member of a side has no usable estimate (too little
/// history, or zero variance), that side falls back to equal weights.
///
/// # Examples
///
/// ```rust,ignore
/// use impetus_allocate::{VolScaledAllocator, VolScaledConfig, WeightAllocator};
///
/// let allocator = VolScaledAllocator::new(VolScaledConfig { lookback: 21, ..Default::default() })?;
/// let weights = allocator.signals_to_target_weights(&signals, &prices)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct VolScaledAllocator {
    config: VolScaledConfig,
}

impl VolScaledAllocator {
    /// Create a new volatility-scaled allocator.
    ///
    /// # Errors
    ///
    /// Returns [`ImpetusError::Configuration`] if `lookback < 2`.
    pub fn new(config: VolScaledConfig) -> Result<Self> {
        if config.lookback < 2 {
            return Err(ImpetusError::Configuration(format!(
                "volatility lookback must be at least 2, got {}",
                config.lookback
            )));
        }
        Ok(Self { config })
    }

    /// Trailing volatility of period returns, `None` where not estimable.
    ///
    /// # Errors
    ///
    /// Propagates panel construction errors.
    pub fn trailing_volatility(&self, prices: &Panel<f64>) -> Result<Panel<f64>> {
        let returns = prices.pct_change();
        let lookback = self.config.lookback;

        let values = Array2::from_shape_fn(returns.shape(), |(r, c)| {
            let start = (r + 1).saturating_sub(lookback);
            let window: Vec<f64> = (start..=r).filter_map(|k| returns.get(k, c)).collect();
            sample_std(&window).filter(|std| *std > MIN_STD_THRESHOLD)
        });
        Panel::new(returns.index().to_vec(), returns.columns().to_vec(), values)
    }

    /// Inverse-volatility weights for one side, or `None` to fall back.
    fn side_weights(members: &[(usize, Option<f64>)]) -> Option<Vec<(usize, f64)>> {
        let inverse: Vec<(usize, f64)> = members
            .iter()
            .map(|(c, vol)| vol.map(|v| (*c, 1.0 / v)))
            .collect::<Option<_>>()?;
        let total: f64 = inverse.iter().map(|(_, w)| w).sum();
        (total > 0.0).then(|| inverse.into_iter().map(|(c, w)| (c, w / total)).collect())
    }
}

impl WeightAllocator for VolScaledAllocator {
    fn name(&self) -> &str {
        "vol_scaled"
    }

    fn signals_to_target_weights(&self, signals: &SignalPanel, prices: &PricePanel) -> Result<WeightPanel> {
        let series = prices.field(self.config.field)?;
        series.ensure_aligned(signals, "vol_scaled allocation")?;
        let vols = self.trailing_volatility(series)?;

        let (rows, cols) = signals.shape();
        let mut values = Array2::from_elem((rows, cols), Some(0.0));
        let mut fallbacks = 0usize;

        for r in 0..rows {
            let row = signals.row(r);
            let equal = equal_weights_row(row);
            for side in [1i8, -1] {
                let members: Vec<(usize, Option<f64>)> = row
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| **s == Some(side))
                    .map(|(c, _)| (c, vols.get(r, c)))
                    .collect();
                if members.is_empty() {
                    continue;
                }
                match Self::side_weights(&members) {
                    Some(weights) => {
                        for (c, w) in weights {
                            values[[r, c]] = Some(f64::from(side) * w);
                        }
                    }
                    None => {
                        fallbacks += 1;
                        for (c, _) in members {
                            values[[r, c]] = Some(equal[c]);
                        }
                    }
                }
            }
        }

        debug!(
            allocator = self.name(),
            dates = rows,
            securities = cols,
            fallbacks,
            "allocated weights"
        );
        Panel::new(signals.index().to_vec(), signals.columns().to_vec(), values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use impetus_traits::{Date, allocator::side_sums};

    fn index(n: usize) -> Vec<Date> {
        Date::from_ymd_opt(2024, 1, 1).unwrap().iter_days().take(n).collect()
    }

    /// Alternating moves of +/- `amp` percent.
    fn choppy(amp: f64, n: usize) -> Vec<Option<f64>> {
        let mut price = 100.0;
        (0..n)
            .map(|i| {
                if i > 0 {
                    price *= if i % 2 == 0 { 1.0 + amp } else { 1.0 - amp };
                }
                Some(price)
            })
            .collect()
    }

    fn prices(n: usize) -> PricePanel {
        let close = Panel::from_columns(
            index(n),
            vec![
                ("CALM".to_string(), choppy(0.01, n)),
                ("WILD".to_string(), choppy(0.03, n)),
                ("SHORT".to_string(), choppy(0.02, n)),
            ],
        )
        .unwrap();
        PricePanel::new().with_field(PriceField::Close, close).unwrap()
    }

    fn signals(n: usize, row: [i8; 3]) -> SignalPanel {
        let series = ["CALM", "WILD", "SHORT"]
            .iter()
            .enumerate()
            .map(|(c, s)| (s.to_string(), vec![Some(row[c]); n]))
            .collect();
        Panel::from_columns(index(n), series).unwrap()
    }

    #[test]
    fn test_lookback_must_cover_two_returns() {
        let err = VolScaledAllocator::new(VolScaledConfig {
            lookback: 1,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ImpetusError::Configuration(_)));
    }

    #[test]
    fn test_inverse_vol_favours_calm_names() {
        let n = 30;
        let allocator = VolScaledAllocator::new(VolScaledConfig {
            lookback: 10,
            ..Default::default()
        })
        .unwrap();
        let weights = allocator
            .signals_to_target_weights(&signals(n, [1, 1, -1]), &prices(n))
            .unwrap();

        let last = n - 1;
        let calm = weights.get(last, 0).unwrap();
        let wild = weights.get(last, 1).unwrap();
        assert!(calm > wild);
        assert_relative_eq!(calm + wild, 1.0, epsilon = 1e-12);
        assert_relative_eq!(weights.get(last, 2).unwrap(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_falls_back_to_equal_without_history() {
        let n = 5;
        let allocator = VolScaledAllocator::default();
        let weights = allocator
            .signals_to_target_weights(&signals(n, [1, 1, -1]), &prices(n))
            .unwrap();

        // First row has no returns at all
        assert_eq!(weights.row(0).to_vec(), vec![Some(0.5), Some(0.5), Some(-1.0)]);
        for (long, short) in side_sums(&weights) {
            assert_relative_eq!(long, 1.0, epsilon = 1e-12);
            assert_relative_eq!(short, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_volatility_is_causal() {
        let n = 20;
        let allocator = VolScaledAllocator::new(VolScaledConfig {
            lookback: 5,
            ..Default::default()
        })
        .unwrap();
        let base = prices(n);
        let close = base.field(PriceField::Close).unwrap();
        let mut cells = close.values().clone();
        cells[[n - 1, 0]] = Some(1_000.0);
        let bumped = Panel::new(close.index().to_vec(), close.columns().to_vec(), cells).unwrap();

        let before = allocator.trailing_volatility(close).unwrap();
        let after = allocator.trailing_volatility(&bumped).unwrap();
        for r in 0..n - 1 {
            assert_eq!(before.get(r, 0), after.get(r, 0));
        }
        assert_ne!(before.get(n - 1, 0), after.get(n - 1, 0));
    }

    #[test]
    fn test_misaligned_prices_are_rejected() {
        let allocator = VolScaledAllocator::default();
        let err = allocator
            .signals_to_target_weights(&signals(4, [1, 0, -1]), &prices(5))
            .unwrap_err();
        assert!(matches!(err, ImpetusError::Alignment(_)));
    }
}
