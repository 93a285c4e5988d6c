//! Backtest composition.
//!
//! A [`Backtest`] chains the four strategy stages over one price panel:
//! signals, target weights, held positions and gross returns. Each stage is a
//! boxed policy, so any of them can be swapped without touching the others.

use impetus_allocate::EqualWeightAllocator;
use impetus_signals::UpMinusDown;
use impetus_traits::{
    Date, ImpetusError, Panel, PositionModel, PositionPanel, PricePanel, Result, ReturnModel,
    ReturnPanel, SignalGenerator, SignalPanel, WeightAllocator, WeightPanel,
};
use tracing::info;

use crate::{NextPeriodEntry, OpenToOpenReturns};

/// Every intermediate panel of a backtest run.
#[derive(Debug, Clone)]
pub struct BacktestResult {
    /// Held signal per date, forward-filled between rebalances
    pub signals: SignalPanel,
    /// Target weights decided on each date
    pub weights: WeightPanel,
    /// Positions held on each date
    pub positions: PositionPanel,
    /// Per-security gross returns before costs
    pub gross_returns: ReturnPanel,
}

impl BacktestResult {
    /// Dates shared by every panel of the result.
    pub fn index(&self) -> &[Date] {
        self.gross_returns.index()
    }

    /// Strategy gross return per date: the sum of defined per-security
    /// returns, `None` on dates where no security has one.
    pub fn aggregate_returns(&self) -> Vec<Option<f64>> {
        self.gross_returns.row_sums()
    }

    /// Compounded growth of one unit of capital, treating missing dates as flat.
    pub fn cumulative_returns(&self) -> Vec<f64> {
        self.aggregate_returns()
            .into_iter()
            .scan(0.0, |cum, r| {
                *cum = (1.0 + *cum) * (1.0 + r.unwrap_or(0.0)) - 1.0;
                Some(*cum)
            })
            .collect()
    }
}

/// Backtesting engine.
pub struct Backtest {
    signals: Box<dyn SignalGenerator>,
    allocator: Box<dyn WeightAllocator>,
    positions: Box<dyn PositionModel>,
    returns: Box<dyn ReturnModel>,
}

impl std::fmt::Debug for Backtest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backtest")
            .field("signals", &self.signals.name())
            .field("allocator", &self.allocator.name())
            .field("positions", &self.positions.name())
            .field("returns", &self.returns.name())
            .finish()
    }
}

impl Default for Backtest {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Backtest {
    /// Create a backtest from its four stages.
    pub fn new(
        signals: Box<dyn SignalGenerator>,
        allocator: Box<dyn WeightAllocator>,
        positions: Box<dyn PositionModel>,
        returns: Box<dyn ReturnModel>,
    ) -> Self {
        Self {
            signals,
            allocator,
            positions,
            returns,
        }
    }

    /// Start a builder preloaded with the default stages.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use impetus_eval::{Backtest, DelayedEntry};
    ///
    /// let backtest = Backtest::builder().positions(DelayedEntry::new(2)?).build();
    /// ```
    pub fn builder() -> BacktestBuilder {
        BacktestBuilder::default()
    }

    /// Name of each stage, in pipeline order.
    pub fn stage_names(&self) -> [&str; 4] {
        [
            self.signals.name(),
            self.allocator.name(),
            self.positions.name(),
            self.returns.name(),
        ]
    }

    /// Run the backtest.
    ///
    /// Every stage output is checked against the price panel's axes before
    /// it is passed on.
    ///
    /// # Errors
    ///
    /// Returns [`ImpetusError::MissingField`] before any stage runs if a field
    /// read by the generator or the return model is absent, propagates stage errors, and returns [`ImpetusError::Alignment`] if a
    /// stage emits a panel that does not match the prices.
    pub fn run(&self, prices: &PricePanel) -> Result<BacktestResult> {
        prices.require(self.signals.required_fields())?;
        prices.require(self.returns.required_fields())?;
        let signals = self.signals.prices_to_signals(prices)?;
        check_axes(&signals, prices, self.signals.name())?;

        let weights = self.allocator.signals_to_target_weights(&signals, prices)?;
        check_axes(&weights, prices, self.allocator.name())?;

        let positions = self.positions.target_weights_to_positions(&weights, prices)?;
        check_axes(&positions, prices, self.positions.name())?;

        let gross_returns = self.returns.positions_to_gross_returns(&positions, prices)?;
        check_axes(&gross_returns, prices, self.returns.name())?;

        info!(
            signals = self.signals.name(),
            allocator = self.allocator.name(),
            dates = prices.index().len(),
            securities = prices.columns().len(),
            "backtest complete"
        );

        Ok(BacktestResult {
            signals,
            weights,
            positions,
            gross_returns,
        })
    }
}

fn check_axes<T>(panel: &Panel<T>, prices: &PricePanel, stage: &str) -> Result<()> {
    if panel.index() != prices.index() || panel.columns() != prices.columns() {
        return Err(ImpetusError::Alignment(format!(
            "stage '{}' produced a {}x{} panel for {}x{} prices",
            stage,
            panel.index().len(),
            panel.columns().len(),
            prices.index().len(),
            prices.columns().len()
        )));
    }
    Ok(())
}

/// Builder for [`Backtest`].
///
/// Defaults to the Up Minus Down generator, equal weights, next-period entry
/// and open-to-open returns.
pub struct BacktestBuilder {
    signals: Box<dyn SignalGenerator>,
    allocator: Box<dyn WeightAllocator>,
    positions: Box<dyn PositionModel>,
    returns: Box<dyn ReturnModel>,
}

impl Default for BacktestBuilder {
    fn default() -> Self {
        Self {
            signals: Box::new(UpMinusDown::default()),
            allocator: Box::new(EqualWeightAllocator::new()),
            positions: Box::new(NextPeriodEntry),
            returns: Box::new(OpenToOpenReturns),
        }
    }
}

impl std::fmt::Debug for BacktestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BacktestBuilder")
            .field("signals", &self.signals.name())
            .field("allocator", &self.allocator.name())
            .finish_non_exhaustive()
    }
}

impl BacktestBuilder {
    /// Set the signal generator.
    pub fn signals(mut self, generator: impl SignalGenerator + 'static) -> Self {
        self.signals = Box::new(generator);
        self
    }

    /// Set a boxed signal generator, e.g. one from the registry.
    pub fn boxed_signals(mut self, generator: Box<dyn SignalGenerator>) -> Self {
        self.signals = generator;
        self
    }

    /// Set the weight allocator.
    pub fn allocator(mut self, allocator: impl WeightAllocator + 'static) -> Self {
        self.allocator = Box::new(allocator);
        self
    }

    /// Set the position model.
    pub fn positions(mut self, model: impl PositionModel + 'static) -> Self {
        self.positions = Box::new(model);
        self
    }

    /// Set the return model.
    pub fn returns(mut self, model: impl ReturnModel + 'static) -> Self {
        self.returns = Box::new(model);
        self
    }

    /// Finish building.
    pub fn build(self) -> Backtest {
        Backtest::new(self.signals, self.allocator, self.positions, self.returns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use impetus_signals::UpMinusDownConfig;
    use impetus_traits::{PriceField, RebalanceRule};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn index(n: usize) -> Vec<Date> {
        Date::from_ymd_opt(2024, 1, 1).unwrap().iter_days().take(n).collect()
    }

    /// Three securities trending up, flat and down.
    fn prices(n: usize) -> PricePanel {
        let series = |growth: f64| -> Vec<Option<f64>> {
            (0..n).map(|i| Some(100.0 * growth.powi(i as i32))).collect()
        };
        let panel = Panel::from_columns(
            index(n),
            vec![
                ("UP".to_string(), series(1.01)),
                ("FLAT".to_string(), series(1.0)),
                ("DOWN".to_string(), series(0.99)),
            ],
        )
        .unwrap();
        PricePanel::new()
            .with_field(PriceField::Open, panel.clone())
            .unwrap()
            .with_field(PriceField::Close, panel)
            .unwrap()
    }

    fn daily_backtest() -> Backtest {
        let config = UpMinusDownConfig {
            momentum_window: 5,
            ranking_gap: 1,
            top_n_pct: 34.0,
            rebalance_rule: RebalanceRule::Daily,
        };
        Backtest::builder()
            .signals(UpMinusDown::new(config).unwrap())
            .build()
    }

    #[test]
    fn test_default_stages() {
        let backtest = Backtest::default();
        assert_eq!(
            backtest.stage_names(),
            ["up_minus_down", "equal_weight", "next_period_entry", "open_to_open"]
        );
    }

    #[test]
    fn test_run_chains_stages() {
        let n = 12;
        let result = daily_backtest().run(&prices(n)).unwrap();

        assert_eq!(result.index().len(), n);
        // First score at row 5, weights lag once, returns lag once more
        assert_eq!(result.signals.get(5, 0), Some(1));
        assert_eq!(result.signals.get(5, 2), Some(-1));
        assert_eq!(result.positions.get(6, 0), Some(1.0));
        assert_relative_eq!(result.gross_returns.get(7, 0).unwrap(), 0.01, epsilon = 1e-12);
        assert_relative_eq!(result.gross_returns.get(7, 2).unwrap(), 0.01, epsilon = 1e-12);

        let aggregate = result.aggregate_returns();
        assert_eq!(aggregate[0], None);
        assert_relative_eq!(aggregate[n - 1].unwrap(), 0.02, epsilon = 1e-12);
        assert_eq!(result.cumulative_returns().len(), n);
    }

    #[test]
    fn test_runs_are_idempotent() {
        let backtest = daily_backtest();
        let prices = prices(15);
        let first = backtest.run(&prices).unwrap();
        let second = backtest.run(&prices).unwrap();
        assert_eq!(first.gross_returns, second.gross_returns);
        assert_eq!(first.signals, second.signals);
    }

    /// Counts how often the signal stage is invoked.
    struct CountingSignals {
        inner: UpMinusDown,
        calls: Arc<AtomicUsize>,
    }

    impl SignalGenerator for CountingSignals {
        fn name(&self) -> &str {
            "counting"
        }

        fn prices_to_signals(&self, prices: &PricePanel) -> Result<SignalPanel> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.prices_to_signals(prices)
        }

        fn lookback(&self) -> usize {
            self.inner.lookback()
        }

        fn required_fields(&self) -> &[PriceField] {
            self.inner.required_fields()
        }
    }

    #[test]
    fn test_missing_open_is_reported_before_any_stage() {
        let close = prices(10).field(PriceField::Close).unwrap().clone();
        let prices = PricePanel::new().with_field(PriceField::Close, close).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let backtest = Backtest::builder()
            .signals(CountingSignals {
                inner: UpMinusDown::default(),
                calls: Arc::clone(&calls),
            })
            .build();

        let err = backtest.run(&prices).unwrap_err();
        assert!(matches!(err, ImpetusError::MissingField(PriceField::Open)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_return_model_fields() {
        assert_eq!(OpenToOpenReturns.required_fields(), &[PriceField::Open]);
    }

    struct Truncating;

    impl PositionModel for Truncating {
        fn name(&self) -> &str {
            "truncating"
        }

        fn target_weights_to_positions(&self, weights: &WeightPanel, _prices: &PricePanel) -> Result<PositionPanel> {
            Panel::filled(weights.index()[1..].to_vec(), weights.columns().to_vec(), Some(0.0))
        }
    }

    #[test]
    fn test_misaligned_stage_output_is_rejected() {
        let backtest = Backtest::builder().positions(Truncating).build();
        let err = backtest.run(&prices(10)).unwrap_err();
        assert!(matches!(err, ImpetusError::Alignment(_)));
    }
}
