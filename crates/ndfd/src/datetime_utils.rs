//! Timezone normalization for forecast timestamps.
//!
//! Timestamps handed to the forecast tools are either "ostensibly local"
//! (no zone attached) or already zone-aware. Everything that resolves a
//! forecast cycle works on UTC, so the helpers here attach a zone to naive
//! values and convert to UTC, refusing ambiguous or conflicting intent.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;

/// IANA zone names whose offset is UTC by identity, not just at some instant.
const UTC_ZONE_NAMES: [&str; 8] = [
    "UTC",
    "Etc/UTC",
    "UCT",
    "Etc/UCT",
    "Universal",
    "Etc/Universal",
    "Zulu",
    "Etc/Zulu",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("unknown timezone: {0}")]
    InvalidTimezone(String),
    #[error("a timezone must be provided for naive datetime values when converting to utc")]
    MissingTimezone,
    #[error("timezone {0} should not be provided for timezone aware datetime values")]
    ConflictingTimezone(String),
    #[error("local time {0} does not exist in timezone {1}")]
    NonexistentLocalTime(NaiveDateTime, String),
    #[error("datetime must be in utc timezone: {0}")]
    NotUtc(String),
    #[error("unable to parse datetime: {0}")]
    Parse(String),
}

/// An instant with an optional zone identity.
#[derive(Debug, Clone, PartialEq)]
pub enum Timestamp {
    /// Wall-clock time with no zone, only valid as local input.
    Naive(NaiveDateTime),
    /// Fixed UTC offset, as published in RFC 3339 strings.
    Fixed(DateTime<FixedOffset>),
    /// Named IANA zone.
    Zoned(DateTime<Tz>),
    Utc(DateTime<Utc>),
}

impl Timestamp {
    pub fn has_zone(&self) -> bool {
        !matches!(self, Timestamp::Naive(_))
    }

    /// Wall-clock fields in the timestamp's own zone.
    pub fn naive_local(&self) -> NaiveDateTime {
        match self {
            Timestamp::Naive(dt) => *dt,
            Timestamp::Fixed(dt) => dt.naive_local(),
            Timestamp::Zoned(dt) => dt.naive_local(),
            Timestamp::Utc(dt) => dt.naive_utc(),
        }
    }

    pub fn hour(&self) -> u32 {
        self.naive_local().hour()
    }

    pub fn date_naive(&self) -> NaiveDate {
        self.naive_local().date()
    }

    /// The instant in UTC, `None` for naive values.
    pub fn as_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::Naive(_) => None,
            Timestamp::Fixed(dt) => Some(dt.with_timezone(&Utc)),
            Timestamp::Zoned(dt) => Some(dt.with_timezone(&Utc)),
            Timestamp::Utc(dt) => Some(*dt),
        }
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        Timestamp::Naive(value)
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Timestamp::Fixed(value)
    }
}

impl From<DateTime<Tz>> for Timestamp {
    fn from(value: DateTime<Tz>) -> Self {
        Timestamp::Zoned(value)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Timestamp::Utc(value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Naive(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            Timestamp::Fixed(dt) => write!(f, "{}", dt.to_rfc3339()),
            Timestamp::Zoned(dt) => write!(f, "{}[{}]", dt.to_rfc3339(), dt.timezone().name()),
            Timestamp::Utc(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

/// Accepts RFC 3339 (zone-aware) or ISO-like local date-times (naive).
impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Timestamp::Fixed(dt));
        }
        for format in NAIVE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(Timestamp::Naive(dt));
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(|date| Timestamp::Naive(date.and_time(Default::default())))
            .map_err(|_| Error::Parse(s.to_string()))
    }
}

pub fn parse_timezone(zone_name: &str) -> Result<Tz, Error> {
    zone_name
        .parse::<Tz>()
        .map_err(|_| Error::InvalidTimezone(zone_name.to_string()))
}

/// Current instant in the named zone.
pub fn now_in(zone_name: &str) -> Result<Timestamp, Error> {
    let tz = parse_timezone(zone_name)?;
    Ok(Timestamp::Zoned(Utc::now().with_timezone(&tz)))
}

pub fn has_zone(ts: &Timestamp) -> bool {
    ts.has_zone()
}

/// Attach `zone_name` to a naive timestamp; zone-aware values pass through.
///
/// Ambiguous local times (clocks falling back) resolve to the earlier
/// instant. Local times skipped by a DST jump are rejected.
pub fn with_zone_if_absent(ts: &Timestamp, zone_name: &str) -> Result<Timestamp, Error> {
    let Timestamp::Naive(naive) = ts else {
        return Ok(ts.clone());
    };

    let tz = parse_timezone(zone_name)?;
    tz.from_local_datetime(naive)
        .earliest()
        .map(Timestamp::Zoned)
        .ok_or_else(|| Error::NonexistentLocalTime(*naive, zone_name.to_string()))
}

/// Convert to UTC.
///
/// A naive timestamp requires `zone_name`; a zone-aware one must not get
/// one, since it would conflict with the zone already attached.
pub fn to_utc(ts: &Timestamp, zone_name: Option<&str>) -> Result<Timestamp, Error> {
    let zoned = match (ts.has_zone(), zone_name) {
        (false, None) => return Err(Error::MissingTimezone),
        (true, Some(zone)) => return Err(Error::ConflictingTimezone(zone.to_string())),
        (false, Some(zone)) => with_zone_if_absent(ts, zone)?,
        (true, None) => ts.clone(),
    };

    zoned
        .as_utc()
        .map(Timestamp::Utc)
        .ok_or(Error::MissingTimezone)
}

/// True only when the zone is UTC by identity.
pub fn is_utc(ts: &Timestamp) -> bool {
    match ts {
        Timestamp::Naive(_) => false,
        Timestamp::Utc(_) => true,
        Timestamp::Fixed(dt) => dt.offset().local_minus_utc() == 0,
        Timestamp::Zoned(dt) => UTC_ZONE_NAMES.contains(&dt.timezone().name()),
    }
}

/// Forecast date for daily NDFD values: the day after the local date.
pub fn daily_forecast_date(local_date: NaiveDate) -> NaiveDate {
    local_date + Duration::days(1)
}

pub fn daily_forecast_date_for_utc(utc_ts: &Timestamp, zone_name: &str) -> Result<NaiveDate, Error> {
    if !is_utc(utc_ts) {
        return Err(Error::NotUtc(utc_ts.to_string()));
    }
    let tz = parse_timezone(zone_name)?;
    let utc = utc_ts
        .as_utc()
        .ok_or_else(|| Error::NotUtc(utc_ts.to_string()))?;
    Ok(daily_forecast_date(utc.with_timezone(&tz).date_naive()))
}
