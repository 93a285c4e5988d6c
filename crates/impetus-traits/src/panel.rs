//! Time x security panels.
//!
//! A [`Panel`] is an ordered date index crossed with a set of security columns.
//! Every cell is an `Option<T>`; `None` marks a missing observation and is kept
//! distinct from any numeric value (a missing price is never zero).
//!
//! Operations come in two flavours and are named accordingly:
//!
//! - time-series (per column, along the date axis): [`Panel::shift`],
//!   [`Panel::pct_change`], [`Panel::resample_last`], [`Panel::reindex_ffill`]
//! - cross-sectional (per row, across securities): [`Panel::rank_pct`]
//!
//! No time-series operation reads a row later than the one it writes.

use std::collections::HashSet;

use chrono::Datelike;
use ndarray::{Array2, ArrayView1, Zip};
use polars::prelude::*;

use crate::calendar::RebalanceRule;
use crate::error::{ImpetusError, Result};
use crate::stats::{self, RankOrder};
use crate::types::{CE_TO_UNIX_EPOCH_DAYS, Date, Symbol};

/// Name of the date column in wide panel frames.
pub const DATE_COLUMN: &str = "date";

/// A two-dimensional table indexed by date (rows) and security (columns).
#[derive(Debug, Clone, PartialEq)]
pub struct Panel<T> {
    index: Vec<Date>,
    columns: Vec<Symbol>,
    values: Array2<Option<T>>,
}

impl<T: Copy> Panel<T> {
    /// Creates a panel, validating its axes.
    ///
    /// # Errors
    ///
    /// Returns [`ImpetusError::InvalidData`] if the index is not strictly
    /// increasing, a column name repeats, or `values` does not have shape
    /// `(index.len(), columns.len())`.
    pub fn new(index: Vec<Date>, columns: Vec<Symbol>, values: Array2<Option<T>>) -> Result<Self> {
        validate_index(&index)?;
        validate_columns(&columns)?;
        if values.dim() != (index.len(), columns.len()) {
            return Err(ImpetusError::InvalidData(format!(
                "panel values have shape {:?}, expected ({}, {})",
                values.dim(),
                index.len(),
                columns.len()
            )));
        }
        Ok(Self {
            index,
            columns,
            values,
        })
    }

    /// Creates a panel with every cell set to `value`.
    ///
    /// # Errors
    ///
    /// Fails under the same axis rules as [`Panel::new`].
    pub fn filled(index: Vec<Date>, columns: Vec<Symbol>, value: Option<T>) -> Result<Self> {
        let values = Array2::from_elem((index.len(), columns.len()), value);
        Self::new(index, columns, values)
    }

    /// Creates a panel from per-security series.
    ///
    /// # Errors
    ///
    /// Fails if a series length differs from the index length, or under the
    /// axis rules of [`Panel::new`].
    pub fn from_columns(index: Vec<Date>, series: Vec<(Symbol, Vec<Option<T>>)>) -> Result<Self> {
        if let Some((symbol, cells)) = series.iter().find(|(_, cells)| cells.len() != index.len()) {
            return Err(ImpetusError::InvalidData(format!(
                "series for {} has {} observations, expected {}",
                symbol,
                cells.len(),
                index.len()
            )));
        }
        let values = Array2::from_shape_fn((index.len(), series.len()), |(r, c)| series[c].1[r]);
        let columns = series.into_iter().map(|(symbol, _)| symbol).collect();
        Self::new(index, columns, values)
    }
}

impl<T> Panel<T> {
    /// Returns the date index.
    pub fn index(&self) -> &[Date] {
        &self.index
    }

    /// Returns the security columns.
    pub fn columns(&self) -> &[Symbol] {
        &self.columns
    }

    /// Returns the underlying cell array, rows are dates.
    pub const fn values(&self) -> &Array2<Option<T>> {
        &self.values
    }

    /// Returns `(dates, securities)`.
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Returns the number of dates.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns whether the panel has no dates.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Position of a security in the column axis.
    pub fn column_position(&self, symbol: &str) -> Option<usize> {
        self.columns.iter().position(|s| s == symbol)
    }

    /// Position of a date in the index.
    pub fn row_position(&self, date: Date) -> Option<usize> {
        self.index.binary_search(&date).ok()
    }

    /// Time series of one security.
    pub fn column(&self, symbol: &str) -> Option<ArrayView1<'_, Option<T>>> {
        self.column_position(symbol)
            .map(|c| self.values.column(c))
    }

    /// Cross-section at one row.
    pub fn row(&self, row: usize) -> ArrayView1<'_, Option<T>> {
        self.values.row(row)
    }

    /// Returns whether both panels share the same index and columns.
    pub fn is_aligned_with<U>(&self, other: &Panel<U>) -> bool {
        self.index == other.index && self.columns == other.columns
    }

    /// Fails with [`ImpetusError::Alignment`] unless both panels share axes.
    ///
    /// Panels are never silently re-aligned.
    pub fn ensure_aligned<U>(&self, other: &Panel<U>, context: &str) -> Result<()> {
        if self.index != other.index {
            return Err(ImpetusError::Alignment(format!(
                "{}: time axes differ ({} vs {} dates)",
                context,
                self.index.len(),
                other.index.len()
            )));
        }
        if self.columns != other.columns {
            return Err(ImpetusError::Alignment(format!(
                "{}: security columns differ ({:?} vs {:?})",
                context, self.columns, other.columns
            )));
        }
        Ok(())
    }
}

impl<T: Copy> Panel<T> {
    /// Returns the cell at `(row, col)`, `None` if missing or out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        self.values.get((row, col)).copied().flatten()
    }

    /// Returns the cell for a date and security.
    pub fn at(&self, date: Date, symbol: &str) -> Option<T> {
        let row = self.row_position(date)?;
        let col = self.column_position(symbol)?;
        self.get(row, col)
    }

    /// Applies `f` to every cell.
    pub fn map<U, F>(&self, f: F) -> Panel<U>
    where
        F: Fn(Option<T>) -> Option<U>,
    {
        Panel {
            index: self.index.clone(),
            columns: self.columns.clone(),
            values: self.values.map(|cell| f(*cell)),
        }
    }

    /// Combines two aligned panels cell by cell.
    ///
    /// # Errors
    ///
    /// Returns [`ImpetusError::Alignment`] if the panels' axes differ.
    pub fn zip_with<U, V, F>(&self, other: &Panel<U>, f: F) -> Result<Panel<V>>
    where
        U: Copy,
        F: Fn(Option<T>, Option<U>) -> Option<V>,
    {
        self.ensure_aligned(other, "zip_with")?;
        let values = Zip::from(&self.values)
            .and(&other.values)
            .map_collect(|a, b| f(*a, *b));
        Ok(Panel {
            index: self.index.clone(),
            columns: self.columns.clone(),
            values,
        })
    }

    /// Replaces missing cells with `value`.
    pub fn fill_missing(&self, value: T) -> Self {
        self.map(|cell| Some(cell.unwrap_or(value)))
    }

    /// Shifts every column forward in time by `periods` rows.
    ///
    /// Row `t` of the result holds row `t - periods` of `self`; the first
    /// `periods` rows are missing.
    pub fn shift(&self, periods: usize) -> Self {
        let (rows, cols) = self.shape();
        let mut values = Array2::from_elem((rows, cols), None);
        for row in periods..rows {
            values.row_mut(row).assign(&self.values.row(row - periods));
        }
        Self {
            index: self.index.clone(),
            columns: self.columns.clone(),
            values,
        }
    }

    /// Keeps the last observation of each calendar period.
    ///
    /// Rows are grouped by [`RebalanceRule::period_end`]. For every column the
    /// result holds the last non-missing value inside the period, and the row
    /// is labelled with the period's calendar end date (which need not be a
    /// date of `self`).
    pub fn resample_last(&self, rule: RebalanceRule) -> Self {
        let cols = self.columns.len();
        let mut labels: Vec<Date> = Vec::new();
        let mut rows: Vec<Vec<Option<T>>> = Vec::new();

        for (r, date) in self.index.iter().enumerate() {
            let label = rule.period_end(*date);
            if labels.last() != Some(&label) {
                labels.push(label);
                rows.push(vec![None; cols]);
            }
            if let Some(current) = rows.last_mut() {
                for (slot, cell) in current.iter_mut().zip(self.values.row(r)) {
                    if cell.is_some() {
                        *slot = *cell;
                    }
                }
            }
        }

        let values = Array2::from_shape_fn((labels.len(), cols), |(r, c)| rows[r][c]);
        Self {
            index: labels,
            columns: self.columns.clone(),
            values,
        }
    }

    /// Projects the panel onto another date index, carrying rows forward.
    ///
    /// Each target date takes the row of the latest date in `self` that is on
    /// or before it. Target dates earlier than the first row are missing.
    ///
    /// # Errors
    ///
    /// Returns [`ImpetusError::InvalidData`] if `target` is not strictly
    /// increasing.
    pub fn reindex_ffill(&self, target: &[Date]) -> Result<Self> {
        validate_index(target)?;
        let cols = self.columns.len();
        let mut values = Array2::from_elem((target.len(), cols), None);

        let mut source: Option<usize> = None;
        for (r, date) in target.iter().enumerate() {
            while self
                .index
                .get(source.map_or(0, |s| s + 1))
                .is_some_and(|next| next <= date)
            {
                source = Some(source.map_or(0, |s| s + 1));
            }
            if let Some(s) = source {
                values.row_mut(r).assign(&self.values.row(s));
            }
        }

        Ok(Self {
            index: target.to_vec(),
            columns: self.columns.clone(),
            values,
        })
    }
}

impl Panel<f64> {
    /// Cross-sectional percentile rank of every row.
    ///
    /// Ranks lie in `(0, 1]`: the rank position divided by the number of
    /// securities with a value in that row. Ties share the average of the
    /// positions they occupy. Missing or non-finite cells are left out of the
    /// row's ranking and stay missing. Rows are ranked in parallel.
    pub fn rank_pct(&self, order: RankOrder) -> Self {
        let mut ranked = Array2::from_elem(self.values.dim(), None);
        Zip::from(ranked.rows_mut())
            .and(self.values.rows())
            .par_for_each(|mut out, row| {
                let cells: Vec<Option<f64>> = row.iter().copied().collect();
                for (slot, rank) in out.iter_mut().zip(stats::rank_pct(&cells, order)) {
                    *slot = rank;
                }
            });
        Self {
            index: self.index.clone(),
            columns: self.columns.clone(),
            values: ranked,
        }
    }

    /// Period-over-period percentage change, `x[t] / x[t-1] - 1`.
    ///
    /// Missing if either observation is missing. Gaps are not bridged.
    pub fn pct_change(&self) -> Self {
        let previous = self.shift(1);
        let values = Zip::from(&self.values)
            .and(&previous.values)
            .map_collect(|current, prior| ratio(*current, *prior).map(|r| r - 1.0));
        Self {
            index: self.index.clone(),
            columns: self.columns.clone(),
            values,
        }
    }

    /// Sum of the defined cells of each row, `None` for rows with none.
    pub fn row_sums(&self) -> Vec<Option<f64>> {
        self.values
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .flatten()
                    .fold(None, |acc: Option<f64>, v| Some(acc.unwrap_or(0.0) + v))
            })
            .collect()
    }

    /// Builds a panel from a wide frame: a `date` column plus one numeric
    /// column per security. Nulls become missing cells.
    ///
    /// # Errors
    ///
    /// Fails if the `date` column is absent or not a date, a security column
    /// cannot be cast to `f64`, or the axes are invalid.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let index = frame_dates(df.column(DATE_COLUMN)?)?;
        let mut series = Vec::with_capacity(df.width().saturating_sub(1));
        for column in df.get_columns() {
            if column.name().as_str() == DATE_COLUMN {
                continue;
            }
            let cast = column.as_materialized_series().cast(&DataType::Float64)?;
            let cells: Vec<Option<f64>> = cast.f64()?.into_iter().collect();
            series.push((column.name().to_string(), cells));
        }
        Self::from_columns(index, series)
    }

    /// Converts the panel into a wide frame, missing cells become nulls.
    ///
    /// # Errors
    ///
    /// Propagates Polars construction errors.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let days: Vec<i32> = self
            .index
            .iter()
            .map(|d| d.num_days_from_ce() - CE_TO_UNIX_EPOCH_DAYS)
            .collect();

        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(Column::new(DATE_COLUMN.into(), days).cast(&DataType::Date)?);
        for (c, symbol) in self.columns.iter().enumerate() {
            let cells: Vec<Option<f64>> = self.values.column(c).to_vec();
            columns.push(Column::new(symbol.as_str().into(), cells));
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// `a / b`, or `None` when either side is missing or the quotient is not finite.
pub(crate) fn ratio(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    let q = a? / b?;
    q.is_finite().then_some(q)
}

/// Reads a polars date column into calendar dates.
pub(crate) fn frame_dates(column: &Column) -> Result<Vec<Date>> {
    let series = column.as_materialized_series();
    if series.dtype() != &DataType::Date {
        return Err(ImpetusError::InvalidData(format!(
            "column '{}' must be a date, found {}",
            series.name(),
            series.dtype()
        )));
    }
    let days = series.cast(&DataType::Int32)?;
    days.i32()?
        .into_iter()
        .map(|d: Option<i32>| {
            d.and_then(|d| Date::from_num_days_from_ce_opt(d + CE_TO_UNIX_EPOCH_DAYS))
                .ok_or_else(|| ImpetusError::InvalidData("null or out-of-range date".to_string()))
        })
        .collect()
}

fn validate_index(index: &[Date]) -> Result<()> {
    match index.windows(2).find(|w| w[0] >= w[1]) {
        Some(w) => Err(ImpetusError::InvalidData(format!(
            "date index must be strictly increasing, found {} followed by {}",
            w[0], w[1]
        ))),
        None => Ok(()),
    }
}

fn validate_columns(columns: &[Symbol]) -> Result<()> {
    let mut seen = HashSet::with_capacity(columns.len());
    match columns.iter().find(|c| !seen.insert(c.as_str())) {
        Some(dup) => Err(ImpetusError::InvalidData(format!(
            "duplicate security column: {}",
            dup
        ))),
        None => Ok(()),
    }
}
