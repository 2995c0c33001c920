//! The singleton user settings record and its monitoring windows.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::WatchError;

/// Default serialized monitoring windows seeded into a fresh database.
pub const DEFAULT_MONITORING_INTERVALS: &str = "08:00-09:00,18:00-19:00";

/// The one settings row. Read and replace only; never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserSettings {
    /// Minutes needed to get ready before leaving.
    pub preparation_minutes: i32,
    /// Minutes between monitoring ticks.
    pub query_frequency_minutes: i32,
    /// Comma-separated `HH:MM-HH:MM` windows.
    pub monitoring_intervals: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last replace timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Default for UserSettings {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            preparation_minutes: 15,
            query_frequency_minutes: 5,
            monitoring_intervals: DEFAULT_MONITORING_INTERVALS.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl UserSettings {
    /// Period between monitoring ticks, or `None` if the stored value is
    /// not a positive number of minutes.
    #[must_use]
    pub fn query_period(&self) -> Option<Duration> {
        u64::try_from(self.query_frequency_minutes)
            .ok()
            .filter(|m| *m > 0)
            .map(|m| Duration::from_secs(m * 60))
    }

    /// Parses the stored monitoring windows.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidIntervals`] if the stored string is
    /// malformed.
    pub fn windows(&self) -> Result<Vec<MonitoringWindow>, WatchError> {
        parse_windows(&self.monitoring_intervals)
    }
}

/// Replacement values for the settings row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsUpdate {
    /// Minutes needed to get ready before leaving (0..=120).
    pub preparation_minutes: i32,
    /// Minutes between monitoring ticks (1..=60).
    pub query_frequency_minutes: i32,
    /// Comma-separated `HH:MM-HH:MM` windows.
    pub monitoring_intervals: String,
}

impl SettingsUpdate {
    /// Checks value ranges and that the window list parses.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidRequest`] for out-of-range minutes and
    /// [`WatchError::InvalidIntervals`] for a malformed window list.
    pub fn validate(&self) -> Result<(), WatchError> {
        if !(0..=120).contains(&self.preparation_minutes) {
            return Err(WatchError::InvalidRequest(
                "preparationMinutes must be between 0 and 120".to_string(),
            ));
        }
        if !(1..=60).contains(&self.query_frequency_minutes) {
            return Err(WatchError::InvalidRequest(
                "queryFrequencyMinutes must be between 1 and 60".to_string(),
            ));
        }
        parse_windows(&self.monitoring_intervals).map(|_| ())
    }
}

/// A daily `HH:MM-HH:MM` time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitoringWindow {
    /// Inclusive start.
    pub start: NaiveTime,
    /// Exclusive end, strictly after `start`.
    pub end: NaiveTime,
}

impl FromStr for MonitoringWindow {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| WatchError::InvalidIntervals(format!("{s:?} is not HH:MM-HH:MM")))?;
        let start = parse_clock(start)?;
        let end = parse_clock(end)?;
        if start >= end {
            return Err(WatchError::InvalidIntervals(format!(
                "{s:?} ends before it starts"
            )));
        }
        Ok(Self { start, end })
    }
}

impl fmt::Display for MonitoringWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

fn parse_clock(raw: &str) -> Result<NaiveTime, WatchError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| WatchError::InvalidIntervals(format!("{:?} is not HH:MM", raw.trim())))
}

/// Parses a comma-separated window list. Blank entries are ignored, so an
/// empty string yields no windows.
///
/// # Errors
///
/// Returns [`WatchError::InvalidIntervals`] for the first malformed entry.
pub fn parse_windows(raw: &str) -> Result<Vec<MonitoringWindow>, WatchError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn update(prep: i32, freq: i32, intervals: &str) -> SettingsUpdate {
        SettingsUpdate {
            preparation_minutes: prep,
            query_frequency_minutes: freq,
            monitoring_intervals: intervals.to_string(),
        }
    }

    #[test]
    fn parses_default_windows() {
        let Ok(windows) = parse_windows(DEFAULT_MONITORING_INTERVALS) else {
            panic!("defaults must parse");
        };
        assert_eq!(windows.len(), 2);
        let rendered: Vec<String> = windows.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["08:00-09:00", "18:00-19:00"]);
    }

    #[test]
    fn tolerates_whitespace_and_empty_lists() {
        assert_eq!(parse_windows(" 07:30 - 08:15 , ").map(|w| w.len()).ok(), Some(1));
        assert_eq!(parse_windows("").map(|w| w.len()).ok(), Some(0));
    }

    #[test]
    fn rejects_malformed_windows() {
        assert!(parse_windows("08:00").is_err());
        assert!(parse_windows("25:00-26:00").is_err());
        assert!(parse_windows("09:00-08:00").is_err());
    }

    #[test]
    fn validates_ranges() {
        assert!(update(15, 5, DEFAULT_MONITORING_INTERVALS).validate().is_ok());
        assert!(update(-1, 5, "").validate().is_err());
        assert!(update(15, 0, "").validate().is_err());
        assert!(update(15, 61, "").validate().is_err());
        assert!(update(15, 5, "nope").validate().is_err());
    }

    #[test]
    fn query_period_follows_frequency() {
        let mut settings = UserSettings::default();
        assert_eq!(settings.query_period(), Some(Duration::from_secs(300)));
        settings.query_frequency_minutes = 0;
        assert_eq!(settings.query_period(), None);
    }
}
