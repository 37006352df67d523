use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Date format used in query parameters
const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Today,
    Week,
    #[default]
    Month,
    Year,
    Custom,
}

impl PeriodType {
    pub const ALL: [PeriodType; 5] = [
        PeriodType::Today,
        PeriodType::Week,
        PeriodType::Month,
        PeriodType::Year,
        PeriodType::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Today => "today",
            PeriodType::Week => "week",
            PeriodType::Month => "month",
            PeriodType::Year => "year",
            PeriodType::Custom => "custom",
        }
    }
}

impl std::fmt::Display for PeriodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PeriodType::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown period '{}', expected one of: today, week, month, year, custom",
                    s
                )
            })
    }
}

/// Period filter for the dashboard. Starts on the current month with no
/// custom bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct DashboardPeriod {
    pub selected: PeriodType,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl DashboardPeriod {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch period. Custom bounds are kept so flipping back to `Custom`
    /// restores them.
    pub fn set_selected(&mut self, period: PeriodType) {
        self.selected = period;
    }

    pub fn set_date_from(&mut self, date: Option<NaiveDate>) {
        self.date_from = date;
    }

    pub fn set_date_to(&mut self, date: Option<NaiveDate>) {
        self.date_to = date;
    }

    pub fn is_custom_period(&self) -> bool {
        self.selected == PeriodType::Custom
    }

    /// Inclusive date range covered by the selection, relative to `today`.
    ///
    /// Fixed periods run from the start of the current calendar day, ISO
    /// week, month or year up to `today`. A custom period needs both bounds
    /// and is normalized so the earlier date comes first.
    pub fn date_range(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self.selected {
            PeriodType::Today => Some((today, today)),
            PeriodType::Week => {
                let offset = i64::from(today.weekday().num_days_from_monday());
                Some((today - Duration::days(offset), today))
            }
            PeriodType::Month => Some((today.with_day(1)?, today)),
            PeriodType::Year => Some((NaiveDate::from_ymd_opt(today.year(), 1, 1)?, today)),
            PeriodType::Custom => {
                let (from, to) = (self.date_from?, self.date_to?);
                Some((from.min(to), from.max(to)))
            }
        }
    }

    /// Query parameters describing the selection for API requests.
    pub fn query_pairs(&self, today: NaiveDate) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("period", self.selected.to_string())];
        if let Some((from, to)) = self.date_range(today) {
            pairs.push(("date_from", from.format(QUERY_DATE_FORMAT).to_string()));
            pairs.push(("date_to", to.format(QUERY_DATE_FORMAT).to_string()));
        }
        pairs
    }
}
