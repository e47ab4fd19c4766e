use crate::error::GeomagError;
use chrono::{Datelike, NaiveDate, NaiveDateTime};

type Result<T> = std::result::Result<T, GeomagError>;

fn start_of_year(year: i32) -> Result<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| GeomagError::InvalidDate(format!("Year {year} cannot be represented")))
}

/// Converts a timestamp into a decimal year, where the fractional part is the elapsed
/// fraction of that calendar year. Order and time differences within a year are preserved.
pub fn decimal_year(time: NaiveDateTime) -> Result<f64> {
    let year = time.year();
    let boy = start_of_year(year)?;
    let eoy = start_of_year(year + 1)?;
    let elapsed = (time - boy).num_milliseconds() as f64;
    let length = (eoy - boy).num_milliseconds() as f64;
    Ok(year as f64 + elapsed / length)
}

/// Converts a calendar date into a decimal year as `year + day_of_year / days_in_year`, with
/// January 1st as day 1.
pub fn decimal_year_from_calendar(year: i32, month: u32, day: u32) -> Result<f64> {
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        GeomagError::InvalidDate(format!("{year:04}-{month:02}-{day:02} is not a valid date"))
    })?;
    let days_in_year = NaiveDate::from_ymd_opt(year, 12, 31)
        .map(|d| d.ordinal())
        .ok_or_else(|| GeomagError::InvalidDate(format!("Year {year} cannot be represented")))?;
    Ok(year as f64 + date.ordinal() as f64 / days_in_year as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[test]
    fn start_of_year_is_integral() {
        let t = NaiveDate::from_ymd_opt(2010, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(decimal_year(t).unwrap(), 2010.0);
    }

    #[test]
    fn mid_year_fraction() {
        // 2010 is not a leap year, July 2nd 12:00 is exactly half way through
        let t = NaiveDate::from_ymd_opt(2010, 7, 2)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert!(is_close!(decimal_year(t).unwrap(), 2010.5));
    }

    #[test]
    fn calendar_rule_counts_from_day_one() {
        assert!(is_close!(
            decimal_year_from_calendar(2000, 1, 1).unwrap(),
            2000.0 + 1.0 / 366.0
        ));
        assert!(is_close!(
            decimal_year_from_calendar(2001, 3, 1).unwrap(),
            2001.0 + 60.0 / 365.0
        ));
        assert!(is_close!(
            decimal_year_from_calendar(2004, 3, 1).unwrap(),
            2004.0 + 61.0 / 366.0
        ));
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(matches!(
            decimal_year_from_calendar(2001, 2, 29),
            Err(GeomagError::InvalidDate(_))
        ));
        assert!(matches!(
            decimal_year_from_calendar(2001, 13, 1),
            Err(GeomagError::InvalidDate(_))
        ));
    }
}
