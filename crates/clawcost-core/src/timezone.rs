//! Timezone utilities for date handling
//!
//! Reports bucket sessions by calendar day and resolve "today" and
//! "yesterday" against local midnight. This module detects the system's
//! local timezone, parses timezone strings from user input and performs
//! those local-day conversions.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

/// Configuration for timezone handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneConfig {
    /// The timezone to use for date operations
    pub tz: Tz,
    /// Whether the timezone is UTC
    pub is_utc: bool,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        let tz = get_local_timezone();
        Self {
            is_utc: tz == Tz::UTC,
            tz,
        }
    }
}

impl TimezoneConfig {
    /// A fixed UTC configuration
    pub fn utc() -> Self {
        Self {
            tz: Tz::UTC,
            is_utc: true,
        }
    }

    /// Create a new timezone configuration from CLI arguments
    pub fn from_cli(timezone_str: Option<&str>, use_utc: bool) -> crate::error::Result<Self> {
        if use_utc {
            return Ok(Self::utc());
        }

        if let Some(tz_str) = timezone_str {
            let tz = Tz::from_str(tz_str).map_err(|_| {
                crate::error::ClawcostError::InvalidTimezone(format!(
                    "'{tz_str}'. Use format like 'America/New_York', 'Asia/Tokyo', or 'UTC'"
                ))
            })?;
            Ok(Self {
                tz,
                is_utc: tz == Tz::UTC,
            })
        } else {
            Ok(Self::default())
        }
    }

    /// Get the display name for the configured timezone
    pub fn display_name(&self) -> &str {
        if self.is_utc { "UTC" } else { self.tz.name() }
    }

    /// Calendar date of a timestamp in the configured timezone
    pub fn local_date(&self, ts: &DateTime<Utc>) -> NaiveDate {
        ts.with_timezone(&self.tz).date_naive()
    }

    /// First instant of `date` in the configured timezone
    ///
    /// Midnight can be ambiguous (clocks fall back) or skipped (clocks spring
    /// forward) around DST transitions; see [`TimezoneConfig::resolve_local`].
    pub fn local_midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        let local = date.and_time(chrono::NaiveTime::MIN);
        // No timezone skips a whole day of wall-clock time
        self.resolve_local(local)
            .unwrap_or_else(|| Utc.from_utc_datetime(&local))
    }

    /// Map a wall-clock time in the configured timezone to an instant
    ///
    /// An ambiguous time takes its earliest mapping. A time skipped by a DST
    /// transition moves forward an hour at a time until it exists. Returns
    /// `None` only if no valid time is found within a day.
    pub fn resolve_local(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        let mut local = local;
        for _ in 0..24 {
            if let Some(dt) = self.tz.from_local_datetime(&local).earliest() {
                return Some(dt.with_timezone(&Utc));
            }
            local = local.checked_add_signed(chrono::TimeDelta::hours(1))?;
        }
        None
    }
}

/// Detect the system's local timezone
///
/// This function attempts to detect the local timezone from the system.
/// If detection fails, it falls back to UTC.
pub fn get_local_timezone() -> Tz {
    // The TZ environment variable wins over the system setting
    if let Ok(tz_str) = std::env::var("TZ")
        && let Ok(tz) = Tz::from_str(&tz_str)
    {
        debug!("Using timezone from TZ environment variable: {}", tz_str);
        return tz;
    }

    match iana_time_zone::get_timezone() {
        Ok(tz_str) => match Tz::from_str(&tz_str) {
            Ok(tz) => {
                debug!("Using system timezone from iana-time-zone: {}", tz_str);
                tz
            }
            Err(_) => {
                debug!(
                    "Could not parse timezone from iana-time-zone: '{}', falling back to UTC",
                    tz_str
                );
                Tz::UTC
            }
        },
        Err(e) => {
            debug!(
                "Could not detect local timezone via iana-time-zone: {:?}, falling back to UTC",
                e
            );
            Tz::UTC
        }
    }
}
