//! Date/Time/DateTime/Timestamp value objects (spec.md §4.2), grounded on
//! `original_source/drizzled/field/date.cc`, `temporal.cc`, and the
//! `DateDecoder`/`DateTimeDecoder`/`TimestampDecoder` binary layouts this
//! workspace's column decoders were built from.

use std::fmt;

/// Result of constructing or comparing a temporal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalResult {
    Ok,
    /// Calendar-impossible date/time text (e.g. month 13), rejected outright.
    Invalid,
    /// Zero components (`month==0`/`day==0`) accepted only under fuzzy-date mode.
    ZeroComponent,
}

/// The canonical "zero date" sentinel: `year=month=day=0`, distinct from an
/// invalid date (spec.md §4.2).
pub const ZERO_DATE: Date = Date { year: 0, month: 0, day: 0 };

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time {
    pub negative: bool,
    pub hour: i32,
    pub minute: u8,
    pub second: u8,
    pub micros: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime {
    pub date: Date,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub micros: u32,
}

/// A `Timestamp` plus microsecond or nanosecond sub-second precision, per
/// SPEC_FULL.md §4.2's supplement: both pack as the 4-byte epoch-seconds
/// form followed by a variable-length fractional suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub epoch_seconds: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MicroTimestamp {
    pub epoch_seconds: u32,
    pub micros: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NanoTimestamp {
    pub epoch_seconds: u32,
    pub nanos: u32,
}

fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

impl Date {
    pub fn is_zero(&self) -> bool {
        self.year == 0 && self.month == 0 && self.day == 0
    }

    /// Calendar validity; a zero date or a fuzzy date is never "valid"
    /// (spec.md §4.2: callers must check when strictness is in effect).
    pub fn is_valid(&self) -> bool {
        if self.is_zero() {
            return false;
        }
        self.month >= 1 && self.month <= 12 && self.day >= 1 && self.day <= days_in_month(self.year, self.month)
    }

    /// Parses `YYYY-MM-DD` or `YYYYMMDD`, first match wins (spec.md §4.2).
    /// `fuzzy` allows `month==0`/`day==0` for legacy compatibility.
    pub fn parse(s: &str, fuzzy: bool) -> Result<Date, TemporalResult> {
        let s = s.trim();
        let (y, m, d) = if let Some((y, m, d)) = split_dashed(s) {
            (y, m, d)
        } else if s.len() == 8 && s.chars().all(|c| c.is_ascii_digit()) {
            let y: u16 = s[0..4].parse().map_err(|_| TemporalResult::Invalid)?;
            let m: u8 = s[4..6].parse().map_err(|_| TemporalResult::Invalid)?;
            let d: u8 = s[6..8].parse().map_err(|_| TemporalResult::Invalid)?;
            (y, m, d)
        } else {
            return Err(TemporalResult::Invalid);
        };

        Date::from_parts(y, m, d, fuzzy)
    }

    fn from_parts(year: u16, month: u8, day: u8, fuzzy: bool) -> Result<Date, TemporalResult> {
        if year == 0 && month == 0 && day == 0 {
            return Ok(ZERO_DATE);
        }
        if month > 12 || day > 31 {
            return Err(TemporalResult::Invalid);
        }
        if month == 0 || day == 0 {
            return if fuzzy {
                Ok(Date { year, month, day })
            } else {
                Err(TemporalResult::ZeroComponent)
            };
        }
        if day > days_in_month(year, month) {
            return Err(TemporalResult::Invalid);
        }
        Ok(Date { year, month, day })
    }

    /// Construction from an integer, per spec.md §4.2's heuristic dispatch.
    pub fn from_int(mut value: i64, fuzzy: bool) -> Result<Date, TemporalResult> {
        if value < 0 {
            return Err(TemporalResult::Invalid);
        }
        if value != 0 && value < 100 {
            return Err(TemporalResult::Invalid);
        }
        if value == 0 {
            return Ok(ZERO_DATE);
        }
        if value < 1_000_000 {
            let yy = (value / 10000) as u16;
            let year = if (70..=99).contains(&yy) {
                1900 + yy
            } else {
                2000 + yy
            };
            value %= 10000;
            let month = (value / 100) as u8;
            let day = (value % 100) as u8;
            return Date::from_parts(year, month, day, fuzzy);
        }
        let year = (value / 10000) as u16;
        value %= 10000;
        let month = (value / 100) as u8;
        let day = (value % 100) as u8;
        Date::from_parts(year, month, day, fuzzy)
    }

    /// Julian Day Number, the comparison key per spec.md §4.2.
    pub fn to_julian_day(&self) -> i64 {
        let (y, m) = if self.month <= 2 {
            (self.year as i64 - 1, self.month as i64 + 12)
        } else {
            (self.year as i64, self.month as i64)
        };
        let a = y / 100;
        let b = 2 - a + a / 4;
        (365.25 * (y as f64 + 4716.0)).floor() as i64 + (30.6001 * (m as f64 + 1.0)).floor() as i64
            + self.day as i64
            + b
            - 1524
    }

    /// Inverse of `to_julian_day`, supplemented from `field/date.cc`
    /// (SPEC_FULL.md §4.2).
    pub fn from_julian_day(jd: i64) -> Date {
        let a = jd + 32044;
        let b = (4 * a + 3) / 146097;
        let c = a - (146097 * b) / 4;
        let d = (4 * c + 3) / 1461;
        let e = c - (1461 * d) / 4;
        let m = (5 * e + 2) / 153;

        let day = (e - (153 * m + 2) / 5 + 1) as u8;
        let month = (m + 3 - 12 * (m / 10)) as u8;
        let year = (100 * b + d - 4800 + m / 10) as u16;
        Date { year, month, day }
    }

    pub fn compare(&self, other: &Date) -> std::cmp::Ordering {
        self.to_julian_day().cmp(&other.to_julian_day())
    }

    pub fn add_days(&self, days: i64) -> Date {
        Date::from_julian_day(self.to_julian_day() + days)
    }

    /// Packs to 3 bytes as `(year*16 + month)*32 + day` (spec.md §6).
    pub fn pack(&self) -> [u8; 3] {
        let value: u32 = ((self.year as u32 * 16 + self.month as u32) * 32) + self.day as u32;
        [value as u8, (value >> 8) as u8, (value >> 16) as u8]
    }

    pub fn unpack(bytes: [u8; 3]) -> Date {
        let value = bytes[0] as u32 | (bytes[1] as u32) << 8 | (bytes[2] as u32) << 16;
        let day = value % 32;
        let month = (value >> 5) % 16;
        let year = value >> 9;
        Date {
            year: year as u16,
            month: month as u8,
            day: day as u8,
        }
    }
}

fn split_dashed(s: &str) -> Option<(u16, u8, u8)> {
    let parts: Vec<&str> = s.split('-').collect();
    if parts.len() != 3 {
        return None;
    }
    let y: u16 = parts[0].parse().ok()?;
    let m: u8 = parts[1].parse().ok()?;
    let d: u8 = parts[2].parse().ok()?;
    Some((y, m, d))
}

impl Time {
    /// Elapsed seconds since midnight (may exceed a day; TIME is an interval
    /// type), used as the comparison key (spec.md §4.2). Does not allow
    /// second==60/61 (REDESIGN FLAGS open question: the Time branch
    /// disallows the leap-second value that DateTime tolerates).
    pub fn elapsed_seconds(&self) -> i64 {
        let magnitude =
            self.hour as i64 * 3600 + self.minute as i64 * 60 + self.second as i64;
        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }

    pub fn compare(&self, other: &Time) -> std::cmp::Ordering {
        self.elapsed_seconds()
            .cmp(&other.elapsed_seconds())
            .then(self.micros.cmp(&other.micros))
    }

    /// Parses `HH:MM:SS[.ffffff]`, optionally signed.
    pub fn parse(s: &str) -> Result<Time, TemporalResult> {
        let s = s.trim();
        let (negative, s) = if let Some(rest) = s.strip_prefix('-') {
            (true, rest)
        } else {
            (false, s)
        };
        let (main, frac) = match s.split_once('.') {
            Some((m, f)) => (m, f),
            None => (s, ""),
        };
        let parts: Vec<&str> = main.split(':').collect();
        if parts.len() != 3 {
            return Err(TemporalResult::Invalid);
        }
        let hour: i32 = parts[0].parse().map_err(|_| TemporalResult::Invalid)?;
        let minute: u8 = parts[1].parse().map_err(|_| TemporalResult::Invalid)?;
        let second: u8 = parts[2].parse().map_err(|_| TemporalResult::Invalid)?;
        if minute > 59 || second > 59 {
            return Err(TemporalResult::Invalid);
        }
        let micros = parse_fraction_micros(frac);
        Ok(Time {
            negative,
            hour,
            minute,
            second,
            micros,
        })
    }
}

fn parse_fraction_micros(frac: &str) -> u32 {
    if frac.is_empty() {
        return 0;
    }
    let mut padded = frac.to_string();
    padded.truncate(6);
    while padded.len() < 6 {
        padded.push('0');
    }
    padded.parse().unwrap_or(0)
}

impl DateTime {
    pub fn is_zero(&self) -> bool {
        self.date.is_zero() && self.hour == 0 && self.minute == 0 && self.second == 0
    }

    pub fn is_valid(&self) -> bool {
        self.date.is_valid() && self.minute <= 59 && self.second <= 61
    }

    /// Parses `YYYY-MM-DD HH:MM:SS[.ffffff]` or `YYYY-MM-DD` (time defaults
    /// to midnight), per spec.md §4.2's ordered format-template list.
    pub fn parse(s: &str, fuzzy: bool) -> Result<DateTime, TemporalResult> {
        let s = s.trim();
        if let Some((date_part, time_part)) = s.split_once(' ') {
            let date = Date::parse(date_part, fuzzy)?;
            let time = Time::parse(time_part).map_err(|_| TemporalResult::Invalid)?;
            if time.negative || time.hour > 23 {
                return Err(TemporalResult::Invalid);
            }
            return Ok(DateTime {
                date,
                hour: time.hour as u8,
                minute: time.minute,
                second: time.second,
                micros: time.micros,
            });
        }
        if s.len() == 14 && s.chars().all(|c| c.is_ascii_digit()) {
            let year: u16 = s[0..4].parse().map_err(|_| TemporalResult::Invalid)?;
            let month: u8 = s[4..6].parse().map_err(|_| TemporalResult::Invalid)?;
            let day: u8 = s[6..8].parse().map_err(|_| TemporalResult::Invalid)?;
            let hour: u8 = s[8..10].parse().map_err(|_| TemporalResult::Invalid)?;
            let minute: u8 = s[10..12].parse().map_err(|_| TemporalResult::Invalid)?;
            let second: u8 = s[12..14].parse().map_err(|_| TemporalResult::Invalid)?;
            let date = Date::from_parts(year, month, day, fuzzy)?;
            return Ok(DateTime {
                date,
                hour,
                minute,
                second,
                micros: 0,
            });
        }
        let date = Date::parse(s, fuzzy)?;
        Ok(DateTime {
            date,
            hour: 0,
            minute: 0,
            second: 0,
            micros: 0,
        })
    }

    fn day_seconds(&self) -> i64 {
        self.hour as i64 * 3600 + self.minute as i64 * 60 + self.second as i64
    }

    pub fn compare(&self, other: &DateTime) -> std::cmp::Ordering {
        self.date
            .compare(&other.date)
            .then(self.day_seconds().cmp(&other.day_seconds()))
            .then(self.micros.cmp(&other.micros))
    }

    /// `DateTime - Time -> DateTime`, underflowing seconds borrow from days
    /// (spec.md §4.2, Scenario D).
    pub fn sub_time(&self, t: &Time) -> DateTime {
        let total = self.date.to_julian_day() * 86_400 + self.day_seconds() - t.elapsed_seconds();
        let micros = self.micros as i64 - t.micros as i64;
        datetime_from_total_seconds(total, micros)
    }

    pub fn add_time(&self, t: &Time) -> DateTime {
        let total = self.date.to_julian_day() * 86_400 + self.day_seconds() + t.elapsed_seconds();
        let micros = self.micros as i64 + t.micros as i64;
        datetime_from_total_seconds(total, micros)
    }

    pub fn sub_datetime(&self, other: &DateTime) -> Time {
        let self_total = self.date.to_julian_day() * 86_400 + self.day_seconds();
        let other_total = other.date.to_julian_day() * 86_400 + other.day_seconds();
        let mut diff = self_total - other_total;
        let mut micros = self.micros as i64 - other.micros as i64;
        if micros < 0 {
            micros += 1_000_000;
            diff -= 1;
        }
        let negative = diff < 0;
        let magnitude = diff.unsigned_abs() as i64;
        Time {
            negative,
            hour: (magnitude / 3600) as i32,
            minute: ((magnitude / 60) % 60) as u8,
            second: (magnitude % 60) as u8,
            micros: micros as u32,
        }
    }

    /// Packs to 8 bytes as signed `YYYYMMDDHHMMSS` (spec.md §6).
    pub fn pack(&self) -> [u8; 8] {
        let value: i64 = (self.date.year as i64) * 1_00_00_00_00_00
            + (self.date.month as i64) * 1_00_00_00_00
            + (self.date.day as i64) * 1_00_00_00
            + (self.hour as i64) * 1_00_00
            + (self.minute as i64) * 100
            + self.second as i64;
        value.to_le_bytes()
    }

    pub fn unpack(bytes: [u8; 8]) -> DateTime {
        let mut value = i64::from_le_bytes(bytes);
        let second = (value % 100) as u8;
        value /= 100;
        let minute = (value % 100) as u8;
        value /= 100;
        let hour = (value % 100) as u8;
        value /= 100;
        let day = (value % 100) as u8;
        value /= 100;
        let month = (value % 100) as u8;
        value /= 100;
        let year = value as u16;
        DateTime {
            date: Date { year, month, day },
            hour,
            minute,
            second,
            micros: 0,
        }
    }
}

fn datetime_from_total_seconds(total_seconds: i64, mut micros: i64) -> DateTime {
    let mut total_seconds = total_seconds;
    if micros < 0 {
        micros += 1_000_000;
        total_seconds -= 1;
    } else if micros >= 1_000_000 {
        micros -= 1_000_000;
        total_seconds += 1;
    }
    let days = total_seconds.div_euclid(86_400);
    let secs_of_day = total_seconds.rem_euclid(86_400);
    let date = Date::from_julian_day(days);
    DateTime {
        date,
        hour: (secs_of_day / 3600) as u8,
        minute: ((secs_of_day / 60) % 60) as u8,
        second: (secs_of_day % 60) as u8,
        micros: micros as u32,
    }
}

impl Timestamp {
    pub fn pack(&self) -> [u8; 4] {
        self.epoch_seconds.to_le_bytes()
    }

    pub fn unpack(bytes: [u8; 4]) -> Timestamp {
        Timestamp {
            epoch_seconds: u32::from_le_bytes(bytes),
        }
    }
}

impl MicroTimestamp {
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = self.epoch_seconds.to_le_bytes().to_vec();
        buf.extend_from_slice(&self.micros.to_be_bytes()[1..]);
        buf
    }
}

impl NanoTimestamp {
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = self.epoch_seconds.to_le_bytes().to_vec();
        buf.extend_from_slice(&self.nanos.to_be_bytes());
        buf
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02}:{:02}:{:02}",
            self.date, self.hour, self.minute, self.second
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn date_packs_per_spec_formula() {
        let d = Date { year: 2024, month: 3, day: 5 };
        let packed = d.pack();
        assert_eq!(Date::unpack(packed), d);
    }

    #[test]
    fn date_parses_dashed_and_compact() {
        assert_eq!(Date::parse("2024-03-05", false).unwrap(), Date { year: 2024, month: 3, day: 5 });
        assert_eq!(Date::parse("20240305", false).unwrap(), Date { year: 2024, month: 3, day: 5 });
    }

    #[test]
    fn zero_date_is_accepted_as_sentinel() {
        let d = Date::parse("0000-00-00", true).unwrap();
        assert!(d.is_zero());
        assert!(!d.is_valid());
    }

    #[test]
    fn fuzzy_mode_allows_zero_month() {
        assert!(Date::parse("2024-00-05", true).is_ok());
        assert!(Date::parse("2024-00-05", false).is_err());
    }

    #[test]
    fn julian_day_round_trips() {
        let d = Date { year: 1999, month: 12, day: 31 };
        let jd = d.to_julian_day();
        assert_eq!(Date::from_julian_day(jd), d);
    }

    #[test]
    fn date_compares_via_julian_day() {
        let a = Date { year: 2020, month: 1, day: 1 };
        let b = Date { year: 2020, month: 1, day: 2 };
        assert_eq!(a.compare(&b), std::cmp::Ordering::Less);
    }

    #[test]
    fn scenario_d_datetime_minus_time() {
        let dt = DateTime::parse("2007-06-09 09:30:00", false).unwrap();
        let t = Time::parse("16:30:00").unwrap();
        let result = dt.sub_time(&t);
        assert_eq!(result.to_string(), "2007-06-08 17:00:00");
    }

    #[test]
    fn datetime_roundtrips_through_string() {
        let dt = DateTime::parse("2024-03-05 01:02:03", false).unwrap();
        assert_eq!(DateTime::parse(&dt.to_string(), false).unwrap(), dt);
    }

    #[test]
    fn datetime_packs_as_signed_yyyymmddhhmmss() {
        let dt = DateTime::parse("2024-03-05 01:02:03", false).unwrap();
        let packed = dt.pack();
        let back = DateTime::unpack(packed);
        assert_eq!(back.date, dt.date);
        assert_eq!((back.hour, back.minute, back.second), (dt.hour, dt.minute, dt.second));
    }

    #[test]
    fn add_then_subtract_is_identity() {
        let dt = DateTime::parse("2024-03-05 01:02:03", false).unwrap();
        let t = Time::parse("02:30:00").unwrap();
        let added = dt.add_time(&t);
        let back = added.sub_time(&t);
        assert_eq!(back, dt);
    }
}
