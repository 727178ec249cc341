//! Timestamp cell values.
//!
//! A timestamp is an instant as seconds plus nanoseconds since the Unix
//! epoch, with no retained timezone. Text forms accept RFC 3339-style
//! literals (`2024-05-01T12:00:00.250Z`, optional fraction, `Z` or `±hh:mm`
//! offset normalized to UTC); formatting always renders UTC.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use thiserror::Error;

static RFC3339_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{4})-(\d{2})-(\d{2})[T ](\d{2}):(\d{2}):(\d{2})(?:\.(\d{1,9}))?(Z|z|[+-]\d{2}:\d{2})?$",
    )
    .unwrap()
});

const SECONDS_PER_DAY: i64 = 86_400;
const NANOS_PER_SECOND: u32 = 1_000_000_000;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid timestamp literal `{0}`")]
pub struct TimestampParseError(pub String);

/// An instant: seconds and nanoseconds since 1970-01-01T00:00:00Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp {
    epoch_second: i64,
    nano: u32,
}

impl Timestamp {
    /// Nanosecond overflow carries into the seconds part.
    pub fn new(epoch_second: i64, nano: u32) -> Self {
        Timestamp {
            epoch_second: epoch_second + i64::from(nano / NANOS_PER_SECOND),
            nano: nano % NANOS_PER_SECOND,
        }
    }

    pub fn epoch_second(&self) -> i64 {
        self.epoch_second
    }

    pub fn nano(&self) -> u32 {
        self.nano
    }

    /// Parse an RFC 3339-style literal. A missing offset is read as UTC.
    pub fn parse(text: &str) -> Result<Self, TimestampParseError> {
        let invalid = || TimestampParseError(text.to_string());
        let captures = RFC3339_REGEX.captures(text).ok_or_else(invalid)?;

        let field = |i: usize| -> i64 { captures.get(i).unwrap().as_str().parse().unwrap() };
        let (year, month, day) = (field(1), field(2), field(3));
        let (hour, minute, second) = (field(4), field(5), field(6));

        if !(1..=12).contains(&month) || day < 1 || day > days_in_month(year, month) {
            return Err(invalid());
        }
        if hour > 23 || minute > 59 || second > 59 {
            return Err(invalid());
        }

        let nano = match captures.get(7) {
            Some(fraction) => {
                // pad right to nanosecond precision
                let digits = fraction.as_str();
                let padded = format!("{:0<9}", digits);
                padded.parse::<u32>().map_err(|_| invalid())?
            }
            None => 0,
        };

        let offset_seconds = match captures.get(8).map(|m| m.as_str()) {
            None | Some("Z") | Some("z") => 0,
            Some(offset) => {
                let sign = if offset.starts_with('-') { -1 } else { 1 };
                let hours: i64 = offset[1..3].parse().map_err(|_| invalid())?;
                let minutes: i64 = offset[4..6].parse().map_err(|_| invalid())?;
                sign * (hours * 3600 + minutes * 60)
            }
        };

        let days = days_from_civil(year, month, day);
        let epoch_second = days * SECONDS_PER_DAY + hour * 3600 + minute * 60 + second
            - offset_seconds;

        Ok(Timestamp { epoch_second, nano })
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self.epoch_second.div_euclid(SECONDS_PER_DAY);
        let second_of_day = self.epoch_second.rem_euclid(SECONDS_PER_DAY);
        let (year, month, day) = civil_from_days(days);
        let (hour, minute, second) = (
            second_of_day / 3600,
            second_of_day % 3600 / 60,
            second_of_day % 60,
        );

        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            year, month, day, hour, minute, second
        )?;
        if self.nano != 0 {
            if self.nano % 1_000_000 == 0 {
                write!(f, ".{:03}", self.nano / 1_000_000)?;
            } else if self.nano % 1_000 == 0 {
                write!(f, ".{:06}", self.nano / 1_000)?;
            } else {
                write!(f, ".{:09}", self.nano)?;
            }
        }
        f.write_str("Z")
    }
}

fn is_leap_year(year: i64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn days_in_month(year: i64, month: i64) -> i64 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        _ => 28,
    }
}

// Civil-calendar day arithmetic over 400-year eras (146097 days each);
// day 0 is 1970-01-01.
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let year_of_era = y - era * 400;
    let day_of_year = (153 * (if month > 2 { month - 3 } else { month + 9 }) + 2) / 5 + day - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * 146_097 + day_of_era - 719_468
}

fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let day_of_era = z - era * 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let mp = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = year_of_era + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_origin() {
        let ts = Timestamp::parse("1970-01-01T00:00:00Z").unwrap();
        assert_eq!(ts.epoch_second(), 0);
        assert_eq!(ts.nano(), 0);
        assert_eq!(ts.to_string(), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_known_instants() {
        assert_eq!(
            Timestamp::parse("2000-01-01T00:00:00Z").unwrap().epoch_second(),
            946_684_800
        );
        // leap day
        assert_eq!(
            Timestamp::parse("2024-02-29T00:00:00Z").unwrap().epoch_second(),
            1_709_164_800
        );
    }

    #[test]
    fn test_offset_normalized_to_utc() {
        let ts = Timestamp::parse("1970-01-01T09:00:00+09:00").unwrap();
        assert_eq!(ts.epoch_second(), 0);

        let ts = Timestamp::parse("1969-12-31T19:00:00-05:00").unwrap();
        assert_eq!(ts.epoch_second(), 0);
    }

    #[test]
    fn test_fractional_seconds() {
        let ts = Timestamp::parse("2024-05-01T12:34:56.25Z").unwrap();
        assert_eq!(ts.nano(), 250_000_000);
        assert_eq!(ts.to_string(), "2024-05-01T12:34:56.250Z");

        let ts = Timestamp::parse("2024-05-01T12:34:56.123456789Z").unwrap();
        assert_eq!(ts.nano(), 123_456_789);
        assert_eq!(ts.to_string(), "2024-05-01T12:34:56.123456789Z");
    }

    #[test]
    fn test_space_separator_accepted() {
        let ts = Timestamp::parse("2024-05-01 12:00:00").unwrap();
        assert_eq!(ts.to_string(), "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_before_epoch() {
        let ts = Timestamp::parse("1969-12-31T23:59:59Z").unwrap();
        assert_eq!(ts.epoch_second(), -1);
        assert_eq!(ts.to_string(), "1969-12-31T23:59:59Z");
    }

    #[test]
    fn test_round_trip() {
        for text in [
            "1999-12-31T23:59:59Z",
            "2024-02-29T06:07:08.009Z",
            "1970-01-01T00:00:00.000000001Z",
        ] {
            let ts = Timestamp::parse(text).unwrap();
            assert_eq!(ts.to_string(), *text);
        }
    }

    #[test]
    fn test_rejects_garbage() {
        for text in [
            "not a time",
            "2024-13-01T00:00:00Z",
            "2023-02-29T00:00:00Z",
            "2024-05-01T24:00:00Z",
            "2024-05-01",
            "",
        ] {
            assert!(Timestamp::parse(text).is_err(), "accepted {:?}", text);
        }
    }

    #[test]
    fn test_nano_carry() {
        let ts = Timestamp::new(10, 2_500_000_000);
        assert_eq!(ts.epoch_second(), 12);
        assert_eq!(ts.nano(), 500_000_000);
    }
}
