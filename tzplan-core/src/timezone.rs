//! Conversion between wall-clock readings in an IANA zone and absolute instants.
//!
//! Instants are always `DateTime<Utc>`. A wall-clock reading only becomes an
//! instant once it is paired with a zone, and an instant only becomes
//! readable again once it is projected into a zone.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::TimeError;

/// Zones offered when creating profiles and events.
pub const SUPPORTED_TIMEZONES: &[&str] = &[
    "America/New_York",
    "America/Chicago",
    "America/Denver",
    "America/Los_Angeles",
    "Europe/London",
    "Europe/Paris",
    "Europe/Berlin",
    "Asia/Tokyo",
    "Asia/Shanghai",
    "Asia/Kolkata",
    "Asia/Dubai",
    "Australia/Sydney",
    "Pacific/Auckland",
    "UTC",
];

/// Zone used when no profile is selected.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Display pattern, e.g. `Dec 31, 2023 07:00 PM`.
pub const DISPLAY_FORMAT: &str = "%b %d, %Y %I:%M %p";

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Upper bound when searching for the end of a DST gap. Real gaps are at most
/// a day long (Pacific/Apia skipped 2011-12-30 entirely).
const MAX_GAP_MINUTES: i64 = 48 * 60;

/// A calendar date and time of day as read by a person in some zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WallClock {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl WallClock {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        WallClock { date, time }
    }

    /// `YYYY-MM-DD`, the format date inputs use.
    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// `HH:MM`, the format time inputs use.
    pub fn time_string(&self) -> String {
        self.time.format(TIME_FORMAT).to_string()
    }
}

/// Resolve an IANA zone id.
pub fn parse_zone(zone: &str) -> Result<Tz, TimeError> {
    zone.parse::<Tz>()
        .map_err(|_| TimeError::InvalidZone(zone.to_string()))
}

pub fn is_supported(zone: &str) -> bool {
    SUPPORTED_TIMEZONES.contains(&zone)
}

/// Interpret `date` + `time` as local time in `zone`.
///
/// A reading inside a spring-forward gap resolves to the first valid instant
/// after the gap. A reading inside a fall-back overlap resolves to the
/// earlier of the two instants.
pub fn to_absolute_instant(
    date: NaiveDate,
    time: NaiveTime,
    zone: &str,
) -> Result<DateTime<Utc>, TimeError> {
    let tz = parse_zone(zone)?;
    let naive = date.and_time(time);

    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return Ok(dt.with_timezone(&Utc));
    }

    resolve_after_gap(&tz, naive).ok_or_else(|| {
        TimeError::InvalidDateTime(format!("{} does not exist in {}", naive, zone))
    })
}

/// Walk forward minute by minute until the local clock exists again.
fn resolve_after_gap(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    let start = naive.with_second(0)?.with_nanosecond(0)?;

    (1..=MAX_GAP_MINUTES)
        .map(|m| start + Duration::minutes(m))
        .find_map(|candidate| tz.from_local_datetime(&candidate).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse the `YYYY-MM-DD` and `HH:MM` (or `HH:MM:SS`) strings that forms
/// collect.
pub fn parse_wall_clock(date: &str, time: &str) -> Result<WallClock, TimeError> {
    let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|_| TimeError::InvalidDateTime(format!("'{}' is not a valid date", date)))?;

    let time_str = time.trim();
    let time = NaiveTime::parse_from_str(time_str, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(time_str, "%H:%M:%S"))
        .map_err(|_| TimeError::InvalidDateTime(format!("'{}' is not a valid time", time)))?;

    Ok(WallClock { date, time })
}

/// Parse form strings and convert them to an instant in one step.
pub fn local_to_instant(date: &str, time: &str, zone: &str) -> Result<DateTime<Utc>, TimeError> {
    let wall = parse_wall_clock(date, time)?;
    to_absolute_instant(wall.date, wall.time, zone)
}

/// Read `instant` on a wall clock in `zone`.
pub fn project_to_zone(instant: DateTime<Utc>, zone: &str) -> Result<WallClock, TimeError> {
    let tz = parse_zone(zone)?;
    let local = instant.with_timezone(&tz).naive_local();
    Ok(WallClock {
        date: local.date(),
        time: local.time(),
    })
}

/// Format `instant` in `zone` using a strftime-style `pattern`.
pub fn format_in_zone(
    instant: DateTime<Utc>,
    zone: &str,
    pattern: &str,
) -> Result<String, TimeError> {
    let tz = parse_zone(zone)?;
    Ok(instant.with_timezone(&tz).format(pattern).to_string())
}

/// Format `instant` in `zone` with [`DISPLAY_FORMAT`].
pub fn display_in_zone(instant: DateTime<Utc>, zone: &str) -> Result<String, TimeError> {
    format_in_zone(instant, zone, DISPLAY_FORMAT)
}

/// Re-express a wall-clock reading taken in `from` as read in `to`.
pub fn convert_to_zone(
    date: &str,
    time: &str,
    from: &str,
    to: &str,
) -> Result<WallClock, TimeError> {
    let instant = local_to_instant(date, time, from)?;
    project_to_zone(instant, to)
}

/// The current time in `zone`, formatted for display.
pub fn current_time(zone: &str) -> Result<String, TimeError> {
    display_in_zone(Utc::now(), zone)
}

/// Midnight of `date` in `zone`, used to bound "today onwards" listings.
pub fn start_of_day(date: NaiveDate, zone: &str) -> Result<DateTime<Utc>, TimeError> {
    to_absolute_instant(date, NaiveTime::MIN, zone)
}
