//! Common types used throughout the Impetus framework.
//!
//! This module defines the price fields, the multi-field price panel, and the
//! panel aliases each pipeline stage produces.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ImpetusError, Result};
use crate::panel::{Panel, frame_dates};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A market symbol identifier, typically a ticker like "AAPL".
pub type Symbol = String;

/// Days between 0001-01-01 and the Unix epoch, the offset between chrono's
/// day count and polars' `Date` physical representation.
pub const CE_TO_UNIX_EPOCH_DAYS: i32 = 719_163;

/// Long/flat/short signal panel: `+1`, `0`, `-1`.
pub type SignalPanel = Panel<i8>;

/// Target fraction of strategy capital per security, negative for shorts.
pub type WeightPanel = Panel<f64>;

/// Weights actually held on each date.
pub type PositionPanel = Panel<f64>;

/// Per-security gross percentage return before costs.
pub type ReturnPanel = Panel<f64>;

/// Price field tag of a [`PricePanel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriceField {
    /// Opening price
    Open,
    /// Session high
    High,
    /// Session low
    Low,
    /// Closing price
    Close,
    /// Traded volume
    Volume,
}

impl PriceField {
    /// All fields, in panel order.
    pub const ALL: [Self; 5] = [Self::Open, Self::High, Self::Low, Self::Close, Self::Volume];

    /// Column name used for this field in long market frames.
    pub const fn column_name(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::Volume => "volume",
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "Open",
            Self::High => "High",
            Self::Low => "Low",
            Self::Close => "Close",
            Self::Volume => "Volume",
        };
        f.write_str(name)
    }
}

impl FromStr for PriceField {
    type Err = ImpetusError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.column_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ImpetusError::InvalidData(format!("unknown price field: {}", s)))
    }
}

/// Prices keyed by field, every field sharing one date index and one set of
/// securities.
///
/// # Example
///
/// ```no_run
/// use impetus_traits::{Date, Panel, PriceField, PricePanel};
///
/// let index = vec![Date::from_ymd_opt(2024, 1, 2).unwrap()];
/// let close = Panel::from_columns(index, vec![("AAPL".to_string(), vec![Some(185.6)])]).unwrap();
/// let prices = PricePanel::new().with_field(PriceField::Close, close).unwrap();
/// assert!(prices.has_field(PriceField::Close));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricePanel {
    fields: BTreeMap<PriceField, Panel<f64>>,
}

impl PricePanel {
    /// Creates an empty price panel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) one field.
    ///
    /// # Errors
    ///
    /// Returns [`ImpetusError::Alignment`] if `panel` does not share the axes
    /// of the fields already present.
    pub fn with_field(mut self, field: PriceField, panel: Panel<f64>) -> Result<Self> {
        if let Some(existing) = self.fields.values().next() {
            existing.ensure_aligned(&panel, &format!("price field {}", field))?;
        }
        self.fields.insert(field, panel);
        Ok(self)
    }

    /// Returns the panel for `field`.
    ///
    /// # Errors
    ///
    /// Returns [`ImpetusError::MissingField`] if the field is absent.
    pub fn field(&self, field: PriceField) -> Result<&Panel<f64>> {
        self.fields
            .get(&field)
            .ok_or(ImpetusError::MissingField(field))
    }

    /// Checks if a field exists.
    pub fn has_field(&self, field: PriceField) -> bool {
        self.fields.contains_key(&field)
    }

    /// Fails on the first of `fields` that is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ImpetusError::MissingField`].
    pub fn require(&self, fields: &[PriceField]) -> Result<()> {
        match fields.iter().find(|f| !self.has_field(**f)) {
            Some(missing) => Err(ImpetusError::MissingField(*missing)),
            None => Ok(()),
        }
    }

    /// Fields present, in [`PriceField`] order.
    pub fn fields(&self) -> impl Iterator<Item = PriceField> + '_ {
        self.fields.keys().copied()
    }

    /// Shared date index, empty when no field is present.
    pub fn index(&self) -> &[Date] {
        self.fields.values().next().map(|p| p.index()).unwrap_or_default()
    }

    /// Shared security columns, empty when no field is present.
    pub fn columns(&self) -> &[Symbol] {
        self.fields.values().next().map(|p| p.columns()).unwrap_or_default()
    }

    /// Pivots a long market frame into a price panel.
    ///
    /// The frame must contain `symbol` (string) and `date` (date) columns plus
    /// any of `open`, `high`, `low`, `close`, `volume`. The panel index is the
    /// sorted union of dates, the columns the sorted union of symbols; a
    /// (date, symbol) pair absent from the frame is a missing cell.
    ///
    /// # Errors
    ///
    /// Fails if required columns are missing, no price column is present,
    /// or a (date, symbol) pair appears twice.
    pub fn from_market_frame(df: &DataFrame) -> Result<Self> {
        let symbols: Vec<Option<String>> = df
            .column("symbol")?
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|s: Option<&str>| s.map(|s| s.to_string()))
            .collect();
        let dates = frame_dates(df.column("date")?)?;

        let symbols: Vec<Symbol> = symbols
            .into_iter()
            .map(|s| s.ok_or_else(|| ImpetusError::InvalidData("null symbol".to_string())))
            .collect::<Result<_>>()?;

        let index: Vec<Date> = dates.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let columns: Vec<Symbol> = symbols.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();
        let row_of: HashMap<Date, usize> = index.iter().enumerate().map(|(i, d)| (*d, i)).collect();
        let col_of: HashMap<&str, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, s)| (s.as_str(), i))
            .collect();

        let cells: Vec<(usize, usize)> = dates
            .iter()
            .zip(&symbols)
            .map(|(d, s)| (row_of[d], col_of[s.as_str()]))
            .collect();
        let mut seen = vec![false; index.len() * columns.len()];
        for (r, c) in &cells {
            let slot = &mut seen[r * columns.len() + c];
            if *slot {
                return Err(ImpetusError::InvalidData(format!(
                    "duplicate observation for {} on {}",
                    columns[*c], index[*r]
                )));
            }
            *slot = true;
        }

        let mut prices = Self::new();
        for field in PriceField::ALL {
            let Ok(column) = df.column(field.column_name()) else {
                continue;
            };
            let cast = column.as_materialized_series().cast(&DataType::Float64)?;
            let mut values = Array2::from_elem((index.len(), columns.len()), None);
            for ((r, c), value) in cells.iter().zip(cast.f64()?.into_iter()) {
                values[[*r, *c]] = value;
            }
            prices = prices.with_field(field, Panel::new(index.clone(), columns.clone(), values)?)?;
        }

        if prices.fields.is_empty() {
            return Err(ImpetusError::InvalidData(
                "market frame has no price columns".to_string(),
            ));
        }
        Ok(prices)
    }
}
