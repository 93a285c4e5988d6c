//! Calendar periods used for rebalancing.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days};
use serde::{Deserialize, Serialize};

use crate::error::{ImpetusError, Result};
use crate::types::Date;

/// Calendar period at whose end a strategy re-evaluates its holdings.
///
/// Periods are labelled by their calendar end date, which may fall on a
/// non-trading day. Weeks end on Sunday.
///
/// Parsed from tokens such as `"M"`, `"ME"` or `"month-end"`:
///
/// ```
/// use impetus_traits::RebalanceRule;
///
/// let rule: RebalanceRule = "month-end".parse().unwrap();
/// assert_eq!(rule, RebalanceRule::MonthEnd);
/// assert_eq!(rule.to_string(), "month-end");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RebalanceRule {
    /// Every observation is its own period
    Daily,
    /// Weeks ending Sunday
    WeekEnd,
    /// Calendar months
    #[default]
    MonthEnd,
    /// Calendar quarters ending March, June, September, December
    QuarterEnd,
    /// Calendar years
    YearEnd,
}

impl RebalanceRule {
    /// Canonical token for this rule.
    pub const fn token(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::WeekEnd => "week-end",
            Self::MonthEnd => "month-end",
            Self::QuarterEnd => "quarter-end",
            Self::YearEnd => "year-end",
        }
    }

    /// Calendar end date of the period containing `date`.
    pub fn period_end(&self, date: Date) -> Date {
        match self {
            Self::Daily => date,
            Self::WeekEnd => {
                let to_sunday = (7 - date.weekday().num_days_from_sunday()) % 7;
                date.checked_add_days(Days::new(u64::from(to_sunday)))
                    .unwrap_or(Date::MAX)
            }
            Self::MonthEnd => month_end(date.year(), date.month()),
            Self::QuarterEnd => month_end(date.year(), date.month().div_ceil(3) * 3),
            Self::YearEnd => month_end(date.year(), 12),
        }
    }
}

fn month_end(year: i32, month: u32) -> Date {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    Date::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(Date::MAX)
}

impl fmt::Display for RebalanceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for RebalanceRule {
    type Err = ImpetusError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d" | "b" | "daily" => Ok(Self::Daily),
            "w" | "w-sun" | "week-end" | "weekly" => Ok(Self::WeekEnd),
            "m" | "me" | "month-end" | "monthly" => Ok(Self::MonthEnd),
            "q" | "qe" | "q-dec" | "quarter-end" | "quarterly" => Ok(Self::QuarterEnd),
            "a" | "y" | "ye" | "a-dec" | "year-end" | "yearly" | "annual" => Ok(Self::YearEnd),
            _ => Err(ImpetusError::Configuration(format!(
                "unknown rebalance rule: {:?}",
                s
            ))),
        }
    }
}

impl TryFrom<String> for RebalanceRule {
    type Error = ImpetusError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RebalanceRule> for String {
    fn from(rule: RebalanceRule) -> Self {
        rule.token().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!("M".parse::<RebalanceRule>().unwrap(), RebalanceRule::MonthEnd);
        assert_eq!("ME".parse::<RebalanceRule>().unwrap(), RebalanceRule::MonthEnd);
        assert_eq!("W".parse::<RebalanceRule>().unwrap(), RebalanceRule::WeekEnd);
        assert_eq!("Q".parse::<RebalanceRule>().unwrap(), RebalanceRule::QuarterEnd);
        assert_eq!("A".parse::<RebalanceRule>().unwrap(), RebalanceRule::YearEnd);
        assert_eq!("D".parse::<RebalanceRule>().unwrap(), RebalanceRule::Daily);

        let err = "fortnightly".parse::<RebalanceRule>().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_month_end() {
        let rule = RebalanceRule::MonthEnd;
        assert_eq!(rule.period_end(d(2024, 2, 5)), d(2024, 2, 29));
        assert_eq!(rule.period_end(d(2023, 2, 5)), d(2023, 2, 28));
        assert_eq!(rule.period_end(d(2023, 12, 31)), d(2023, 12, 31));
    }

    #[test]
    fn test_week_end_is_sunday() {
        let rule = RebalanceRule::WeekEnd;
        // 2024-01-03 is a Wednesday
        assert_eq!(rule.period_end(d(2024, 1, 3)), d(2024, 1, 7));
        assert_eq!(rule.period_end(d(2024, 1, 7)), d(2024, 1, 7));
        assert_eq!(rule.period_end(d(2024, 1, 8)), d(2024, 1, 14));
    }

    #[test]
    fn test_quarter_and_year_end() {
        assert_eq!(RebalanceRule::QuarterEnd.period_end(d(2024, 5, 17)), d(2024, 6, 30));
        assert_eq!(RebalanceRule::QuarterEnd.period_end(d(2024, 1, 1)), d(2024, 3, 31));
        assert_eq!(RebalanceRule::YearEnd.period_end(d(2024, 5, 17)), d(2024, 12, 31));
        assert_eq!(RebalanceRule::Daily.period_end(d(2024, 5, 17)), d(2024, 5, 17));
    }

    #[test]
    fn test_serde_uses_tokens() {
        let json = serde_json::to_string(&RebalanceRule::QuarterEnd).unwrap();
        assert_eq!(json, "\"quarter-end\"");
        let rule: RebalanceRule = serde_json::from_str("\"M\"").unwrap();
        assert_eq!(rule, RebalanceRule::MonthEnd);
        assert!(serde_json::from_str::<RebalanceRule>("\"hourly\"").is_err());
    }
}
