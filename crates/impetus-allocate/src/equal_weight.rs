//! Equal-weighted allocation across each side of the book.

use impetus_traits::{Panel, PricePanel, Result, SignalPanel, WeightAllocator, WeightPanel};
use ndarray::{Array2, ArrayView1};
use tracing::debug;

/// Equal-weight allocator.
///
/// On each date with `L` long and `S` short signals, every long receives
/// `+1/L` and every short `-1/S`. Flat securities, and dates before the
/// first signal, receive zero. Prices are not consulted.
///
/// # Examples
///
/// ```rust,ignore
/// use impetus_allocate::{EqualWeightAllocator, WeightAllocator};
///
/// // Signals [+1, +1, 0, -1] allocate [0.5, 0.5, 0.0, -1.0]
/// let weights = EqualWeightAllocator::default().signals_to_target_weights(&signals, &prices)?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualWeightAllocator;

impl EqualWeightAllocator {
    /// Create a new equal-weight allocator.
    pub const fn new() -> Self {
        Self
    }
}

/// Equal weights for one cross-section of signals.
pub(crate) fn equal_weights_row(signals: ArrayView1<'_, Option<i8>>) -> Vec<f64> {
    let longs = signals.iter().filter(|s| **s == Some(1)).count();
    let shorts = signals.iter().filter(|s| **s == Some(-1)).count();

    signals
        .iter()
        .map(|signal| match signal {
            Some(1) => 1.0 / longs as f64,
            Some(-1) => -1.0 / shorts as f64,
            _ => 0.0,
        })
        .collect()
}

impl WeightAllocator for EqualWeightAllocator {
    fn name(&self) -> &str {
        "equal_weight"
    }

    fn signals_to_target_weights(&self, signals: &SignalPanel, _prices: &PricePanel) -> Result<WeightPanel> {
        let (rows, cols) = signals.shape();
        let mut values = Array2::from_elem((rows, cols), Some(0.0));
        for (r, mut out) in values.rows_mut().into_iter().enumerate() {
            for (slot, w) in out.iter_mut().zip(equal_weights_row(signals.row(r))) {
                *slot = Some(w);
            }
        }

        debug!(allocator = self.name(), dates = rows, securities = cols, "allocated weights");
        Panel::new(signals.index().to_vec(), signals.columns().to_vec(), values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use impetus_traits::{Date, allocator::side_sums};

    fn signals(rows: Vec<Vec<Option<i8>>>) -> SignalPanel {
        let start = Date::from_ymd_opt(2024, 1, 1).unwrap();
        let index: Vec<Date> = start.iter_days().take(rows.len()).collect();
        let cols = rows[0].len();
        let series = (0..cols)
            .map(|c| (format!("S{c}"), rows.iter().map(|row| row[c]).collect()))
            .collect();
        Panel::from_columns(index, series).unwrap()
    }

    #[test]
    fn test_equal_weight_basic() {
        let panel = signals(vec![vec![Some(1), Some(1), Some(0), Some(-1)]]);
        let weights = EqualWeightAllocator::new()
            .signals_to_target_weights(&panel, &PricePanel::new())
            .unwrap();

        assert_relative_eq!(weights.get(0, 0).unwrap(), 0.5);
        assert_relative_eq!(weights.get(0, 1).unwrap(), 0.5);
        assert_relative_eq!(weights.get(0, 2).unwrap(), 0.0);
        assert_relative_eq!(weights.get(0, 3).unwrap(), -1.0);
    }

    #[test]
    fn test_empty_sides_get_no_weight() {
        let panel = signals(vec![
            vec![Some(1), Some(0), Some(0)],
            vec![Some(0), Some(0), Some(0)],
            vec![None, None, None],
        ]);
        let weights = EqualWeightAllocator::default()
            .signals_to_target_weights(&panel, &PricePanel::new())
            .unwrap();

        assert_eq!(weights.row(0).to_vec(), vec![Some(1.0), Some(0.0), Some(0.0)]);
        assert_eq!(weights.row(1).to_vec(), vec![Some(0.0); 3]);
        assert_eq!(weights.row(2).to_vec(), vec![Some(0.0); 3]);
    }

    #[test]
    fn test_side_sums_are_zero_or_one() {
        let panel = signals(vec![
            vec![Some(1), Some(1), Some(1), Some(-1), Some(-1), Some(0)],
            vec![Some(-1), Some(0), Some(0), Some(0), Some(0), Some(0)],
            vec![Some(1), Some(-1), Some(-1), Some(-1), Some(1), Some(1)],
        ]);
        let weights = EqualWeightAllocator::default()
            .signals_to_target_weights(&panel, &PricePanel::new())
            .unwrap();

        let sums = side_sums(&weights);
        assert_relative_eq!(sums[0].0, 1.0, epsilon = 1e-12);
        assert_relative_eq!(sums[0].1, 1.0, epsilon = 1e-12);
        assert_relative_eq!(sums[1].0, 0.0);
        assert_relative_eq!(sums[1].1, 1.0, epsilon = 1e-12);
        assert_relative_eq!(sums[2].0, 1.0, epsilon = 1e-12);
        assert_relative_eq!(sums[2].1, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_weights_keep_signal_axes() {
        let panel = signals(vec![vec![Some(1), Some(-1)], vec![Some(0), Some(1)]]);
        let weights = EqualWeightAllocator::default()
            .signals_to_target_weights(&panel, &PricePanel::new())
            .unwrap();
        assert!(weights.is_aligned_with(&panel));
    }
}
