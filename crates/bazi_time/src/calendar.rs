//! Calendar helpers: Julian day numbers, fractional Julian dates and
//! parsing of civil birth timestamps.
//!
//! All dates are proleptic Gregorian, so day counts stay continuous across
//! the 1582 reform and into negative years.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, Timelike};

use crate::error::TimeError;

/// Offset between chrono's day count from 0001-01-01 (day 1) and the
/// Julian day number.
const JDN_CE_OFFSET: i64 = 1_721_425;

/// Julian day number of a calendar date (noon-based integer count).
///
/// 2000-01-01 is JDN 2451545.
pub fn julian_day_number(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) + JDN_CE_OFFSET
}

/// Fractional Julian date of a civil instant, read on the UT scale.
pub fn julian_date(dt: NaiveDateTime) -> f64 {
    let jdn = julian_day_number(dt.date()) as f64;
    let secs = f64::from(dt.num_seconds_from_midnight()) + f64::from(dt.nanosecond()) * 1e-9;
    jdn - 0.5 + secs / 86_400.0
}

/// Civil instant for a fractional Julian date, rounded to the millisecond.
pub fn from_julian_date(jd: f64) -> Result<NaiveDateTime, TimeError> {
    if !jd.is_finite() {
        return Err(TimeError::OutOfRange("julian date is not finite"));
    }
    let shifted = jd + 0.5;
    let day = shifted.floor();
    let millis = ((shifted - day) * 86_400_000.0).round() as i64;
    let days_from_ce = i32::try_from(day as i64 - JDN_CE_OFFSET)
        .map_err(|_| TimeError::OutOfRange("julian date beyond calendar range"))?;
    let date = NaiveDate::from_num_days_from_ce_opt(days_from_ce)
        .ok_or(TimeError::OutOfRange("julian date beyond calendar range"))?;
    date.and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.checked_add_signed(Duration::milliseconds(millis)))
        .ok_or(TimeError::OutOfRange("julian date beyond calendar range"))
}

/// 1-based day of the year (Jan 1 = 1).
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// Build a civil instant from calendar fields, rejecting impossible dates.
pub fn civil_datetime(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Result<NaiveDateTime, TimeError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or_else(|| {
            TimeError::InvalidDate(format!(
                "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
            ))
        })
}

/// Parse a civil birth timestamp.
///
/// Accepts RFC 3339 with an explicit offset (`1990-05-15T14:30:00+08:00`)
/// or a local time without offset (`1990-05-15T14:30`, `1990-05-15 14:30:00`).
/// A bare date is rejected: the hour pillar needs a time of day.
pub fn parse_civil(s: &str) -> Result<(NaiveDateTime, Option<FixedOffset>), TimeError> {
    let t = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Ok((dt.naive_local(), Some(*dt.offset())));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(t, fmt) {
            return Ok((dt, None));
        }
    }
    if NaiveDate::parse_from_str(t, "%Y-%m-%d").is_ok() {
        return Err(TimeError::InvalidDate(format!(
            "{t:?} has no time of day"
        )));
    }
    Err(TimeError::InvalidDate(format!("unrecognised timestamp {t:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn jdn_reference_points() {
        assert_eq!(julian_day_number(date(2000, 1, 1)), 2_451_545);
        assert_eq!(julian_day_number(date(1949, 10, 1)), 2_433_191);
        assert_eq!(julian_day_number(date(1, 1, 1)), 1_721_426);
    }

    #[test]
    fn julian_date_at_noon_and_midnight() {
        let noon = date(2000, 1, 1).and_hms_opt(12, 0, 0).unwrap();
        assert!((julian_date(noon) - 2_451_545.0).abs() < 1e-9);
        let midnight = date(2000, 1, 1).and_hms_opt(0, 0, 0).unwrap();
        assert!((julian_date(midnight) - 2_451_544.5).abs() < 1e-9);
    }

    #[test]
    fn julian_date_round_trip() {
        let dt = date(1990, 5, 15).and_hms_opt(14, 30, 15).unwrap();
        let back = from_julian_date(julian_date(dt)).unwrap();
        assert_eq!(back, dt);
    }

    #[test]
    fn day_of_year_counts_from_one() {
        assert_eq!(day_of_year(date(1990, 5, 15)), 135);
        assert_eq!(day_of_year(date(2024, 12, 31)), 366);
    }

    #[test]
    fn civil_datetime_rejects_impossible() {
        assert!(civil_datetime(2023, 2, 29, 0, 0, 0).is_err());
        assert!(civil_datetime(2024, 2, 29, 23, 59, 59).is_ok());
        assert!(civil_datetime(2024, 1, 1, 24, 0, 0).is_err());
    }

    #[test]
    fn parse_variants() {
        let (dt, off) = parse_civil("1990-05-15T14:30").unwrap();
        assert_eq!(dt, date(1990, 5, 15).and_hms_opt(14, 30, 0).unwrap());
        assert!(off.is_none());

        let (dt, off) = parse_civil("1990-05-15T14:30:00+08:00").unwrap();
        assert_eq!(dt.hour(), 14);
        assert_eq!(off.unwrap().local_minus_utc(), 8 * 3600);

        assert!(parse_civil("1990-05-15 14:30:45").is_ok());
        assert!(matches!(parse_civil("1990-05-15"), Err(TimeError::InvalidDate(_))));
        assert!(parse_civil("15/05/1990").is_err());
    }
}
