//! Timestamp values and their literal grammar.
//!
//! Dates and datetimes follow the YAML 1.1 timestamp form
//! (`2001-12-14t21:59:43.10-05:00`, `2001-12-14 21:59:43.10`, `2002-12-14`),
//! plus a bare time of day (`21:59:43`). Documents spell them with
//! `!timestamp`; untagged scalars are never read as timestamps.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt;

static DATETIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?P<year>[0-9]{4})-(?P<month>[0-9]{1,2})-(?P<day>[0-9]{1,2})",
        r"(?:(?:[Tt]|[\x20\t]+)",
        r"(?P<hour>[0-9]{1,2}):(?P<minute>[0-9]{2}):(?P<second>[0-9]{2})",
        r"(?:\.(?P<fraction>[0-9]*))?",
        r"(?:[\x20\t]*(?P<tz>Z|(?P<tz_sign>[-+])(?P<tz_hour>[0-9]{1,2})(?::?(?P<tz_minute>[0-9]{2}))?))?",
        r")?$",
    ))
    .expect("valid timestamp regex")
});

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<hour>[0-9]{1,2}):(?P<minute>[0-9]{2}):(?P<second>[0-9]{2})(?:\.(?P<fraction>[0-9]*))?$",
    )
    .expect("valid time regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timestamp {
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
}

impl Timestamp {
    /// Parse any timestamp form. Returns `None` for text that does not match
    /// the grammar or names an impossible date/time.
    pub fn parse(text: &str) -> Option<Timestamp> {
        let text = text.trim();
        if let Some(caps) = DATETIME_RE.captures(text) {
            return parse_datetime(&caps);
        }
        let caps = TIME_RE.captures(text)?;
        time_of_day(&caps).map(Timestamp::Time)
    }
}

fn number(caps: &Captures<'_>, name: &str) -> Option<u32> {
    caps.name(name)?.as_str().parse().ok()
}

fn nanos(caps: &Captures<'_>) -> u32 {
    let Some(fraction) = caps.name("fraction") else {
        return 0;
    };
    let digits: String = fraction.as_str().chars().chain(std::iter::repeat('0')).take(9).collect();
    digits.parse().unwrap_or(0)
}

fn time_of_day(caps: &Captures<'_>) -> Option<NaiveTime> {
    NaiveTime::from_hms_nano_opt(
        number(caps, "hour")?,
        number(caps, "minute")?,
        number(caps, "second")?,
        nanos(caps),
    )
}

fn parse_datetime(caps: &Captures<'_>) -> Option<Timestamp> {
    let year: i32 = caps.name("year")?.as_str().parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, number(caps, "month")?, number(caps, "day")?)?;
    if caps.name("hour").is_none() {
        return Some(Timestamp::Date(date));
    }

    let naive = date.and_time(time_of_day(caps)?);
    let Some(tz) = caps.name("tz") else {
        return Some(Timestamp::DateTime(naive));
    };

    let offset_seconds = if tz.as_str() == "Z" {
        0
    } else {
        let hours = number(caps, "tz_hour")? as i32;
        let minutes = caps.name("tz_minute").map_or(Some(0), |_| number(caps, "tz_minute"))? as i32;
        let sign = if caps.name("tz_sign").map(|m| m.as_str()) == Some("-") { -1 } else { 1 };
        sign * (hours * 3600 + minutes * 60)
    };
    let offset = FixedOffset::east_opt(offset_seconds)?;
    offset.from_local_datetime(&naive).single().map(Timestamp::Zoned)
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Timestamp::Time(time) => write!(f, "{}", time.format("%H:%M:%S%.f")),
            Timestamp::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f")),
            Timestamp::Zoned(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f%:z")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dates() {
        let expected = NaiveDate::from_ymd_opt(2016, 12, 11).expect("date");
        assert_eq!(Timestamp::parse("2016-12-11"), Some(Timestamp::Date(expected)));
    }

    #[test]
    fn parses_space_separated_datetime_with_fraction() {
        let ts = Timestamp::parse("2001-12-14 21:59:43.10").expect("timestamp");
        let Timestamp::DateTime(dt) = ts else {
            panic!("expected naive datetime, got {ts:?}");
        };
        assert_eq!(dt.format("%H:%M:%S%.3f").to_string(), "21:59:43.100");
    }

    #[test]
    fn parses_offsets() {
        let ts = Timestamp::parse("2001-12-14t21:59:43.10-05:00").expect("timestamp");
        let Timestamp::Zoned(dt) = ts else {
            panic!("expected zoned datetime, got {ts:?}");
        };
        assert_eq!(dt.offset().local_minus_utc(), -5 * 3600);

        let utc = Timestamp::parse("2001-12-15T02:59:43.1Z").expect("timestamp");
        assert!(matches!(utc, Timestamp::Zoned(dt) if dt.offset().local_minus_utc() == 0));
    }

    #[test]
    fn parses_time_of_day() {
        assert!(matches!(Timestamp::parse("21:59:43"), Some(Timestamp::Time(_))));
    }

    #[test]
    fn rejects_impossible_dates() {
        assert_eq!(Timestamp::parse("2016-13-45"), None);
        assert_eq!(Timestamp::parse("hallo"), None);
    }

    #[test]
    fn display_parses_back() {
        for text in ["2017-01-01", "2017-01-01 10:30:00.5", "2017-01-01 10:30:00+02:00"] {
            let ts = Timestamp::parse(text).expect("timestamp");
            assert_eq!(Timestamp::parse(&ts.to_string()), Some(ts));
        }
    }
}
