//! Conversion between dates and spreadsheet serial numbers (1900 date system)
//!
//! Serial 1 is 1900-01-01. The 1900 system counts a non-existent 1900-02-29 as
//! serial 60, so serials before 61 are one day off the real calendar.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::MIN)
}

/// Convert a serial number to a date-time, rounding to the millisecond
///
/// Returns `None` for non-finite or out-of-range serials.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let mut days = serial.floor();
    let fraction = serial - days;
    if days < 61.0 {
        days += 1.0;
    }
    let millis = (fraction * MILLIS_PER_DAY).round() as i64;
    epoch()
        .checked_add_signed(Duration::try_days(days as i64)?)?
        .checked_add_signed(Duration::milliseconds(millis))
}

/// Convert a date-time to its serial number
pub fn datetime_to_serial(value: &NaiveDateTime) -> f64 {
    let mut days = (value.date() - epoch().date()).num_days() as f64;
    if days < 61.0 {
        days -= 1.0;
    }
    let time = value.time();
    let millis = time.num_seconds_from_midnight() as f64 * 1000.0
        + (time.nanosecond() / 1_000_000) as f64;
    days + millis / MILLIS_PER_DAY
}

/// Convert a date to its serial number
pub fn date_to_serial(value: &NaiveDate) -> f64 {
    datetime_to_serial(&value.and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_known_serials() {
        assert_eq!(date_to_serial(&ymd(1900, 1, 1)), 1.0);
        assert_eq!(date_to_serial(&ymd(1900, 2, 28)), 59.0);
        assert_eq!(date_to_serial(&ymd(1900, 3, 1)), 61.0);
        assert_eq!(date_to_serial(&ymd(2023, 2, 1)), 44958.0);
    }

    #[test]
    fn test_serial_to_datetime() {
        assert_eq!(serial_to_datetime(44958.0).unwrap().date(), ymd(2023, 2, 1));
        assert_eq!(serial_to_datetime(1.0).unwrap().date(), ymd(1900, 1, 1));
        assert_eq!(serial_to_datetime(61.0).unwrap().date(), ymd(1900, 3, 1));

        let noon = serial_to_datetime(44958.5).unwrap();
        assert_eq!(noon, ymd(2023, 2, 1).and_hms_opt(12, 0, 0).unwrap());
        assert!(serial_to_datetime(f64::NAN).is_none());
    }

    #[test]
    fn test_time_round_trip_to_millis() {
        let dt = ymd(2024, 7, 15).and_hms_milli_opt(9, 30, 15, 250).unwrap();
        assert_eq!(serial_to_datetime(datetime_to_serial(&dt)), Some(dt));
    }
}
