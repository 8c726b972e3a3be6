//! Resampling periods and their calendar buckets.
//!
//! Every bucket is labelled by its last calendar day: weeks end on Sunday,
//! months, quarters and years on their final day.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("unknown period '{0}'. Valid: D, W, M, Q, Y")]
pub struct PeriodParseError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Period {
    pub fn label(&self) -> &'static str {
        match self {
            Period::Daily => "D",
            Period::Weekly => "W",
            Period::Monthly => "M",
            Period::Quarterly => "Q",
            Period::Yearly => "Y",
        }
    }

    /// Last calendar day of the bucket containing `date`.
    pub fn bucket_end(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Daily => date,
            Period::Weekly => {
                let days_to_sunday = 7 - date.weekday().number_from_monday();
                date + Duration::days(i64::from(days_to_sunday))
            }
            Period::Monthly => month_end(date.year(), date.month()),
            Period::Quarterly => month_end(date.year(), date.month0() / 3 * 3 + 3),
            Period::Yearly => month_end(date.year(), 12),
        }
    }

    /// End of the bucket that follows the one ending on `end`.
    pub fn next_bucket_end(&self, end: NaiveDate) -> Option<NaiveDate> {
        end.succ_opt().map(|d| self.bucket_end(d))
    }
}

fn month_end(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Period {
    type Err = PeriodParseError;

    /// Accepts pandas-style aliases (`W`, `W-SUN`, `ME`, `A`, ...) and plain words.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "D" | "1D" | "DAY" | "DAILY" => Ok(Period::Daily),
            "W" | "1W" | "W-SUN" | "WEEK" | "WEEKLY" => Ok(Period::Weekly),
            "M" | "ME" | "1M" | "MONTH" | "MONTHLY" => Ok(Period::Monthly),
            "Q" | "QE" | "Q-DEC" | "QUARTER" | "QUARTERLY" => Ok(Period::Quarterly),
            "Y" | "YE" | "A" | "A-DEC" | "YEAR" | "YEARLY" | "ANNUAL" => Ok(Period::Yearly),
            _ => Err(PeriodParseError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Period {
    type Error = PeriodParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn weekly_buckets_end_on_sunday() {
        // 2024-01-01 is a Monday
        assert_eq!(Period::Weekly.bucket_end(d("2024-01-01")), d("2024-01-07"));
        assert_eq!(Period::Weekly.bucket_end(d("2024-01-06")), d("2024-01-07"));
        assert_eq!(Period::Weekly.bucket_end(d("2024-01-07")), d("2024-01-07"));
        assert_eq!(Period::Weekly.bucket_end(d("2024-01-08")), d("2024-01-14"));
    }

    #[test]
    fn calendar_bucket_ends() {
        assert_eq!(Period::Monthly.bucket_end(d("2024-02-10")), d("2024-02-29"));
        assert_eq!(Period::Monthly.bucket_end(d("2023-12-31")), d("2023-12-31"));
        assert_eq!(Period::Quarterly.bucket_end(d("2024-05-15")), d("2024-06-30"));
        assert_eq!(Period::Quarterly.bucket_end(d("2024-12-01")), d("2024-12-31"));
        assert_eq!(Period::Yearly.bucket_end(d("2015-01-01")), d("2015-12-31"));
        assert_eq!(Period::Daily.bucket_end(d("2015-01-01")), d("2015-01-01"));
    }

    #[test]
    fn next_bucket_steps_one_period() {
        assert_eq!(Period::Weekly.next_bucket_end(d("2024-01-07")), Some(d("2024-01-14")));
        assert_eq!(Period::Monthly.next_bucket_end(d("2024-01-31")), Some(d("2024-02-29")));
        assert_eq!(Period::Yearly.next_bucket_end(d("2024-12-31")), Some(d("2025-12-31")));
    }

    #[test]
    fn parses_aliases() {
        assert_eq!("W".parse::<Period>().unwrap(), Period::Weekly);
        assert_eq!("w-sun".parse::<Period>().unwrap(), Period::Weekly);
        assert_eq!("ME".parse::<Period>().unwrap(), Period::Monthly);
        assert_eq!("A".parse::<Period>().unwrap(), Period::Yearly);
        assert_eq!(
            "fortnight".parse::<Period>(),
            Err(PeriodParseError("fortnight".into()))
        );
    }
}
