//! Analysis window calculation

use chrono::{Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lookback period for the price history window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lookback {
    /// Calendar days before the end date
    Days(u32),
    /// Calendar quarters (3 months each) before the end date
    Quarters(u32),
}

impl Default for Lookback {
    fn default() -> Self {
        Self::Days(365)
    }
}

/// Start of the analysis window for an end date and lookback period
///
/// Quarter lookbacks subtract calendar months, clamping to the last day of
/// the month when the source day does not exist (e.g. May 31 minus one
/// quarter is the end of February).
pub fn window_start(end: NaiveDate, lookback: Lookback) -> NaiveDate {
    match lookback {
        Lookback::Days(days) => end
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN),
        Lookback::Quarters(quarters) => end
            .checked_sub_months(Months::new(quarters.saturating_mul(3)))
            .unwrap_or(NaiveDate::MIN),
    }
}

/// Resolve an optional end date to a concrete one, defaulting to today (UTC)
pub fn resolve_end_date(end: Option<NaiveDate>) -> NaiveDate {
    end.unwrap_or_else(|| Utc::now().date_naive())
}
