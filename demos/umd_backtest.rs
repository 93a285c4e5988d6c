//! Up Minus Down backtest on a synthetic universe.
//!
//! This demo:
//! - Generates daily open/close prices for a drifting random-walk universe
//! - Runs the default four-stage pipeline (optionally from a JSON config)
//! - Prints the strategy's gross performance before costs
//!
//! Usage: `umd_backtest [config.json]`. Set `RUST_LOG=debug` for stage logs.

use anyhow::Context;
use chrono::Datelike;
use impetus::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Synthetic universe.
const UNIVERSE: &[&str] = &[
    "ALFA", "BRVO", "CHRL", "DLTA", "ECHO", "FXTR", "GOLF", "HTEL", "INDA", "JLET",
];

/// Trading days simulated (about three years).
const TRADING_DAYS: usize = 760;

/// First simulated date.
const START: (i32, u32, u32) = (2021, 1, 4);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => StrategyConfig::from_json_file(&path).with_context(|| format!("loading {path}"))?,
        None => StrategyConfig::default(),
    };
    info!(?config, "strategy configuration");

    let prices = synthetic_prices()?;
    let result = up_minus_down(&config)?.run(&prices)?;

    let returns: Vec<(Date, f64)> = result
        .index()
        .iter()
        .zip(result.aggregate_returns())
        .filter_map(|(date, r)| r.map(|r| (*date, r)))
        .skip_while(|(_, r)| *r == 0.0)
        .collect();
    print_results(&compute_stats(&returns));
    Ok(())
}

/// Weekday prices with a per-security drift, so momentum has something to find.
fn synthetic_prices() -> anyhow::Result<PricePanel> {
    let start = Date::from_ymd_opt(START.0, START.1, START.2).context("invalid start date")?;
    let index: Vec<Date> = start
        .iter_days()
        .filter(|d| d.weekday().number_from_monday() <= 5)
        .take(TRADING_DAYS)
        .collect();

    let mut state: u64 = 0x5eed;
    let mut uniform = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (state >> 11) as f64 / (1_u64 << 53) as f64
    };

    let mut opens = Vec::with_capacity(UNIVERSE.len());
    let mut closes = Vec::with_capacity(UNIVERSE.len());
    for (c, symbol) in UNIVERSE.iter().enumerate() {
        let drift = (c as f64 - UNIVERSE.len() as f64 / 2.0) * 1e-4;
        let mut price = 40.0 + 5.0 * c as f64;
        let mut open = Vec::with_capacity(TRADING_DAYS);
        let mut close = Vec::with_capacity(TRADING_DAYS);
        for _ in 0..TRADING_DAYS {
            open.push(Some(price * (1.0 + 0.004 * (uniform() - 0.5))));
            price *= 1.0 + drift + 0.025 * (uniform() - 0.5);
            close.push(Some(price));
        }
        opens.push((symbol.to_string(), open));
        closes.push((symbol.to_string(), close));
    }

    Ok(PricePanel::new()
        .with_field(PriceField::Open, Panel::from_columns(index.clone(), opens)?)?
        .with_field(PriceField::Close, Panel::from_columns(index, closes)?)?)
}

/// Performance statistics.
#[derive(Debug)]
struct PerformanceStats {
    total_return: f64,
    sharpe_ratio: f64,
    max_drawdown: f64,
    win_rate: f64,
    period: Option<(Date, Date)>,
}

/// Compute performance statistics from daily gross returns.
fn compute_stats(returns: &[(Date, f64)]) -> PerformanceStats {
    let values: Vec<f64> = returns.iter().map(|(_, r)| *r).collect();
    let period = returns.first().zip(returns.last()).map(|(a, b)| (a.0, b.0));
    if values.is_empty() {
        return PerformanceStats {
            total_return: 0.0,
            sharpe_ratio: 0.0,
            max_drawdown: 0.0,
            win_rate: 0.0,
            period,
        };
    }

    let total_return = values.iter().map(|r| 1.0 + r).product::<f64>() - 1.0;

    // Annualized
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / values.len() as f64;
    let std = variance.sqrt();
    let sharpe_ratio = if std > 0.0 { mean / std * 252.0_f64.sqrt() } else { 0.0 };

    let mut cumulative = 1.0;
    let mut peak = 1.0;
    let mut max_drawdown = 0.0_f64;
    for r in &values {
        cumulative *= 1.0 + r;
        peak = f64::max(peak, cumulative);
        max_drawdown = max_drawdown.max((peak - cumulative) / peak);
    }

    let wins = values.iter().filter(|r| **r > 0.0).count();
    PerformanceStats {
        total_return,
        sharpe_ratio,
        max_drawdown,
        win_rate: wins as f64 / values.len() as f64,
        period,
    }
}

/// Print performance results.
fn print_results(stats: &PerformanceStats) {
    println!("\nUp Minus Down (12-1 momentum)");
    println!("═════════════════════════════");
    match stats.period {
        Some((start, end)) => println!("Period:     {start} to {end}"),
        None => println!("Period:     no invested days"),
    }
    println!("Universe:   {} securities", UNIVERSE.len());
    println!();
    println!("Gross performance:");
    println!("  Total Return:    {:+.1}%", stats.total_return * 100.0);
    println!("  Sharpe Ratio:    {:.2}", stats.sharpe_ratio);
    println!("  Max Drawdown:    {:.1}%", stats.max_drawdown * 100.0);
    println!("  Win Rate:        {:.0}%", stats.win_rate * 100.0);
}
