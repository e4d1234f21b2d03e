//! Fixed chart intervals and lookback windows.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::AggregationError;

/// Chart granularity and change lookback, from widest to narrowest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum TimeInterval {
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "4h")]
    FourHours,
    #[default]
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "5m")]
    FiveMinutes,
}

impl TimeInterval {
    pub const ALL: [TimeInterval; 5] = [
        TimeInterval::OneWeek,
        TimeInterval::OneDay,
        TimeInterval::FourHours,
        TimeInterval::FifteenMinutes,
        TimeInterval::FiveMinutes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeInterval::OneWeek => "1w",
            TimeInterval::OneDay => "1d",
            TimeInterval::FourHours => "4h",
            TimeInterval::FifteenMinutes => "15m",
            TimeInterval::FiveMinutes => "5m",
        }
    }

    pub fn seconds(self) -> i64 {
        match self {
            TimeInterval::OneWeek => 604_800,
            TimeInterval::OneDay => 86_400,
            TimeInterval::FourHours => 14_400,
            TimeInterval::FifteenMinutes => 900,
            TimeInterval::FiveMinutes => 300,
        }
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeInterval {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeInterval::ALL
            .into_iter()
            .find(|interval| interval.as_str() == s)
            .ok_or_else(|| AggregationError::UnknownInterval(s.to_string()))
    }
}

/// Named duration used to slice snapshot history for percentage changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookbackWindow {
    pub name: String,
    pub width_secs: i64,
}

impl LookbackWindow {
    pub fn new(name: impl Into<String>, width_secs: i64) -> Self {
        Self {
            name: name.into(),
            width_secs,
        }
    }

    /// The windows reported on collection overviews: 1w, 1d, 4h, 15m, 5m.
    pub fn defaults() -> Vec<LookbackWindow> {
        TimeInterval::ALL.into_iter().map(LookbackWindow::from).collect()
    }
}

impl From<TimeInterval> for LookbackWindow {
    fn from(interval: TimeInterval) -> Self {
        Self::new(interval.as_str(), interval.seconds())
    }
}
