//! Period filtering for session records
//!
//! Reports can be narrowed to a time window relative to "now". Calendar
//! windows (`today`, `yesterday`) are anchored at local midnight of the
//! configured timezone, rolling windows (`week`, `month`) are measured back
//! from the current instant.
//!
//! # Examples
//!
//! ```
//! use clawcost_core::filters::{Period, PeriodFilter};
//! use clawcost_core::timezone::TimezoneConfig;
//! use clawcost_core::types::SessionRecord;
//! use chrono::{TimeZone, Utc};
//!
//! let now = Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap();
//! let filter = PeriodFilter::new(Some(Period::Today), now, TimezoneConfig::utc());
//!
//! let sessions = vec![
//!     SessionRecord::new("s1", "urza").with_started_at(Utc.with_ymd_and_hms(2026, 2, 10, 8, 0, 0).unwrap()),
//!     SessionRecord::new("s2", "urza").with_started_at(Utc.with_ymd_and_hms(2026, 2, 9, 8, 0, 0).unwrap()),
//!     SessionRecord::new("s3", "urza"),
//! ];
//!
//! let kept = filter.apply(&sessions);
//! assert_eq!(kept.len(), 1);
//! assert_eq!(kept[0].id.as_str(), "s1");
//! ```

use crate::error::ClawcostError;
use crate::timezone::TimezoneConfig;
use crate::types::SessionRecord;
use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reporting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Every session, including those with an unknown start time
    All,
    /// Since local midnight
    Today,
    /// The previous local calendar day
    Yesterday,
    /// The last seven days
    Week,
    /// The last calendar month
    Month,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Today => write!(f, "today"),
            Self::Yesterday => write!(f, "yesterday"),
            Self::Week => write!(f, "week"),
            Self::Month => write!(f, "month"),
        }
    }
}

impl FromStr for Period {
    type Err = ClawcostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "yesterday" => Ok(Self::Yesterday),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(ClawcostError::InvalidPeriod(s.to_string())),
        }
    }
}

/// Half-open time window `[since, until)`; `until` may be unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub since: DateTime<Utc>,
    pub until: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Check if a timestamp falls inside the window
    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        if *ts < self.since {
            return false;
        }
        match self.until {
            Some(until) => *ts < until,
            None => true,
        }
    }
}

/// Filter narrowing sessions to a reporting period
///
/// The window is resolved once, at construction, from the supplied `now`.
#[derive(Debug, Clone, Copy)]
pub struct PeriodFilter {
    window: Option<TimeWindow>,
}

impl PeriodFilter {
    /// Resolve `period` against `now` in the given timezone
    ///
    /// `None` and `Some(Period::All)` keep every session.
    pub fn new(period: Option<Period>, now: DateTime<Utc>, timezone: TimezoneConfig) -> Self {
        let window = match period {
            None | Some(Period::All) => None,
            Some(Period::Today) => Some(TimeWindow {
                since: timezone.local_midnight(timezone.local_date(&now)),
                until: None,
            }),
            Some(Period::Yesterday) => {
                let today = timezone.local_date(&now);
                let yesterday = today.pred_opt().unwrap_or(today);
                Some(TimeWindow {
                    since: timezone.local_midnight(yesterday),
                    until: Some(timezone.local_midnight(today)),
                })
            }
            Some(Period::Week) => Some(TimeWindow {
                since: now - TimeDelta::days(7),
                until: None,
            }),
            Some(Period::Month) => {
                // Month arithmetic runs on the wall clock so DST shifts between
                // the two dates do not move the window. Day-of-month overflow
                // clamps to the last day (Mar 31 -> Feb 28).
                let since = now
                    .with_timezone(&timezone.tz)
                    .naive_local()
                    .checked_sub_months(Months::new(1))
                    .and_then(|local| timezone.resolve_local(local))
                    .unwrap_or(now - TimeDelta::days(30));
                Some(TimeWindow { since, until: None })
            }
        };

        Self { window }
    }

    /// The resolved window, `None` when no filtering applies
    pub fn window(&self) -> Option<&TimeWindow> {
        self.window.as_ref()
    }

    /// Check if a session passes the filter
    pub fn matches(&self, session: &SessionRecord) -> bool {
        match &self.window {
            None => true,
            Some(window) => session
                .started_at
                .as_ref()
                .is_some_and(|ts| window.contains(ts)),
        }
    }

    /// Keep matching sessions, preserving input order
    pub fn apply<'a>(&self, sessions: &'a [SessionRecord]) -> Vec<&'a SessionRecord> {
        sessions.iter().filter(|s| self.matches(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session_at(id: &str, ts: DateTime<Utc>) -> SessionRecord {
        SessionRecord::new(id, "urza").with_started_at(ts)
    }

    fn ids(sessions: &[&SessionRecord]) -> Vec<String> {
        sessions.iter().map(|s| s.id.to_string()).collect()
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("today".parse::<Period>().unwrap(), Period::Today);
        assert_eq!("yesterday".parse::<Period>().unwrap(), Period::Yesterday);
        assert_eq!("week".parse::<Period>().unwrap(), Period::Week);
        assert_eq!("month".parse::<Period>().unwrap(), Period::Month);
        assert_eq!("all".parse::<Period>().unwrap(), Period::All);
        assert!(matches!(
            "fortnight".parse::<Period>(),
            Err(ClawcostError::InvalidPeriod(_))
        ));
        assert!("Today".parse::<Period>().is_err());
        assert_eq!(Period::Yesterday.to_string(), "yesterday");
    }

    #[test]
    fn test_all_keeps_unknown_start_times() {
        let now = Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap();
        let sessions = vec![
            SessionRecord::new("unknown", "urza"),
            session_at("old", Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
        ];

        for period in [None, Some(Period::All)] {
            let filter = PeriodFilter::new(period, now, TimezoneConfig::utc());
            assert!(filter.window().is_none());
            assert_eq!(ids(&filter.apply(&sessions)), vec!["unknown", "old"]);
        }
    }

    #[test]
    fn test_concrete_periods_drop_unknown_start_times() {
        let now = Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap();
        let unknown = SessionRecord::new("unknown", "urza");
        for period in [Period::Today, Period::Yesterday, Period::Week, Period::Month] {
            let filter = PeriodFilter::new(Some(period), now, TimezoneConfig::utc());
            assert!(!filter.matches(&unknown), "{period} kept an unknown start time");
        }
    }

    #[test]
    fn test_today_boundaries() {
        let now = Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap();
        let filter = PeriodFilter::new(Some(Period::Today), now, TimezoneConfig::utc());

        let midnight = session_at("midnight", Utc.with_ymd_and_hms(2026, 2, 10, 0, 0, 0).unwrap());
        let late_yesterday = session_at(
            "late",
            Utc.with_ymd_and_hms(2026, 2, 9, 23, 59, 59).unwrap(),
        );
        let future = session_at("future", Utc.with_ymd_and_hms(2026, 2, 12, 9, 0, 0).unwrap());

        assert!(filter.matches(&midnight));
        assert!(!filter.matches(&late_yesterday));
        // No upper bound for today
        assert!(filter.matches(&future));
    }

    #[test]
    fn test_yesterday_is_closed_open() {
        let now = Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap();
        let filter = PeriodFilter::new(Some(Period::Yesterday), now, TimezoneConfig::utc());

        let start = session_at("start", Utc.with_ymd_and_hms(2026, 2, 9, 0, 0, 0).unwrap());
        let late = session_at("late", Utc.with_ymd_and_hms(2026, 2, 9, 23, 59, 59).unwrap());
        let today = session_at("today", Utc.with_ymd_and_hms(2026, 2, 10, 0, 0, 0).unwrap());
        let before = session_at(
            "before",
            Utc.with_ymd_and_hms(2026, 2, 8, 23, 59, 59).unwrap(),
        );

        assert!(filter.matches(&start));
        assert!(filter.matches(&late));
        assert!(!filter.matches(&today));
        assert!(!filter.matches(&before));
    }

    #[test]
    fn test_today_uses_local_midnight() {
        let tz = TimezoneConfig::from_cli(Some("America/New_York"), false).unwrap();
        // 03:00 UTC on Feb 10 is still Feb 9 in New York
        let now = Utc.with_ymd_and_hms(2026, 2, 10, 3, 0, 0).unwrap();
        let filter = PeriodFilter::new(Some(Period::Today), now, tz);

        let window = filter.window().unwrap();
        assert_eq!(window.since, Utc.with_ymd_and_hms(2026, 2, 9, 5, 0, 0).unwrap());
        assert!(filter.matches(&session_at(
            "evening",
            Utc.with_ymd_and_hms(2026, 2, 9, 23, 0, 0).unwrap()
        )));
    }

    #[test]
    fn test_week_is_rolling() {
        let now = Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap();
        let filter = PeriodFilter::new(Some(Period::Week), now, TimezoneConfig::utc());

        let edge = session_at("edge", Utc.with_ymd_and_hms(2026, 2, 3, 12, 0, 0).unwrap());
        let before = session_at("before", Utc.with_ymd_and_hms(2026, 2, 3, 11, 59, 59).unwrap());

        assert!(filter.matches(&edge));
        assert!(!filter.matches(&before));
    }

    #[test]
    fn test_month_is_calendar_month_back() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let filter = PeriodFilter::new(Some(Period::Month), now, TimezoneConfig::utc());
        assert_eq!(
            filter.window().unwrap().since,
            Utc.with_ymd_and_hms(2026, 2, 15, 12, 0, 0).unwrap()
        );

        // End-of-month clamps rather than overflowing into the current month
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap();
        let filter = PeriodFilter::new(Some(Period::Month), now, TimezoneConfig::utc());
        assert_eq!(
            filter.window().unwrap().since,
            Utc.with_ymd_and_hms(2026, 2, 28, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_apply_preserves_order() {
        let now = Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap();
        let filter = PeriodFilter::new(Some(Period::Week), now, TimezoneConfig::utc());
        let sessions = vec![
            session_at("c", Utc.with_ymd_and_hms(2026, 2, 9, 0, 0, 0).unwrap()),
            session_at("old", Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
            session_at("a", Utc.with_ymd_and_hms(2026, 2, 5, 0, 0, 0).unwrap()),
        ];
        assert_eq!(ids(&filter.apply(&sessions)), vec!["c", "a"]);
    }

    #[test]
    fn test_month_start_in_spring_forward_gap() {
        let tz = TimezoneConfig::from_cli(Some("America/New_York"), false).unwrap();
        // 02:30 EDT on Apr 8; 02:30 on Mar 8 was skipped by the DST change
        let now = Utc.with_ymd_and_hms(2026, 4, 8, 6, 30, 0).unwrap();
        let filter = PeriodFilter::new(Some(Period::Month), now, tz);

        assert_eq!(
            filter.window().unwrap().since,
            Utc.with_ymd_and_hms(2026, 3, 8, 7, 30, 0).unwrap()
        );
        // Noon EDT on Mar 8
        let noon = session_at("noon", Utc.with_ymd_and_hms(2026, 3, 8, 16, 0, 0).unwrap());
        assert!(filter.matches(&noon));
    }

    #[test]
    fn test_month_start_in_fall_back_overlap() {
        let tz = TimezoneConfig::from_cli(Some("America/New_York"), false).unwrap();
        // 01:30 EST on Dec 1; 01:30 on Nov 1 happened twice
        let now = Utc.with_ymd_and_hms(2026, 12, 1, 6, 30, 0).unwrap();
        let filter = PeriodFilter::new(Some(Period::Month), now, tz);

        // The earlier (EDT) reading starts the window
        assert_eq!(
            filter.window().unwrap().since,
            Utc.with_ymd_and_hms(2026, 11, 1, 5, 30, 0).unwrap()
        );
    }
}
