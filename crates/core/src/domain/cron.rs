//! Cron expression parsing and evaluation.
//!
//! Standard 5-field expressions, evaluated in UTC at minute granularity:
//! ```text
//! ┌───────────── minute (0-59)
//! │ ┌───────────── hour (0-23)
//! │ │ ┌───────────── day of month (1-31)
//! │ │ │ ┌───────────── month (1-12 or jan-dec)
//! │ │ │ │ ┌───────────── day of week (0-7 or sun-sat, 0 and 7 = Sunday)
//! │ │ │ │ │
//! * * * * *
//! ```
//!
//! Each field is a comma list of `*`, `N`, `N-M` or `N`, optionally with a
//! `/step` suffix. All five fields must match for a minute to fire.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How far ahead `next_after` searches before giving up
const SEARCH_YEARS: i32 = 5;

/// Errors that can occur when parsing cron expressions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CronParseError {
    #[error("expected 5 fields (minute hour day-of-month month day-of-week), got {0}")]
    InvalidFieldCount(usize),

    #[error("invalid {field} field '{value}': {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("value {value} is out of range [{min}, {max}] for {field}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("invalid range {start}-{end} for {field}")]
    InvalidRange {
        field: &'static str,
        start: u32,
        end: u32,
    },

    #[error("invalid step '{step}' for {field}")]
    InvalidStep { field: &'static str, step: String },
}

struct FieldSpec {
    name: &'static str,
    min: u32,
    max: u32,
    /// Symbolic names, `names[i]` stands for `min + i`
    names: &'static [&'static str],
}

const MINUTE: FieldSpec = FieldSpec {
    name: "minute",
    min: 0,
    max: 59,
    names: &[],
};

const HOUR: FieldSpec = FieldSpec {
    name: "hour",
    min: 0,
    max: 23,
    names: &[],
};

const DAY_OF_MONTH: FieldSpec = FieldSpec {
    name: "day-of-month",
    min: 1,
    max: 31,
    names: &[],
};

const MONTH: FieldSpec = FieldSpec {
    name: "month",
    min: 1,
    max: 12,
    names: &[
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ],
};

const DAY_OF_WEEK: FieldSpec = FieldSpec {
    name: "day-of-week",
    min: 0,
    max: 7,
    names: &["sun", "mon", "tue", "wed", "thu", "fri", "sat"],
};

/// Set of allowed values for one field, one bit per value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CronField(u64);

impl CronField {
    fn parse(spec: &FieldSpec, text: &str) -> Result<Self, CronParseError> {
        let mut bits = 0u64;
        for part in text.split(',') {
            bits |= Self::parse_part(spec, part)?;
        }
        Ok(Self(bits))
    }

    fn parse_part(spec: &FieldSpec, part: &str) -> Result<u64, CronParseError> {
        if part.is_empty() {
            return Err(CronParseError::InvalidField {
                field: spec.name,
                value: part.to_string(),
                reason: "empty list element",
            });
        }

        let (range, step) = match part.split_once('/') {
            Some((range, step_text)) => {
                let step = step_text
                    .parse::<u32>()
                    .ok()
                    .filter(|step| *step > 0)
                    .ok_or_else(|| CronParseError::InvalidStep {
                        field: spec.name,
                        step: step_text.to_string(),
                    })?;
                (range, Some(step))
            }
            None => (part, None),
        };

        let (start, end) = if range == "*" {
            (spec.min, spec.max)
        } else if let Some((lo, hi)) = range.split_once('-') {
            let start = parse_value(spec, lo)?;
            let end = parse_value(spec, hi)?;
            if start > end {
                return Err(CronParseError::InvalidRange {
                    field: spec.name,
                    start,
                    end,
                });
            }
            (start, end)
        } else {
            let value = parse_value(spec, range)?;
            // `N/step` runs from N to the end of the field
            match step {
                Some(_) => (value, spec.max),
                None => (value, value),
            }
        };

        let step = step.unwrap_or(1);
        let mut bits = 0u64;
        let mut value = start;
        while value <= end {
            bits |= 1 << value;
            // Steps wider than the field stop after one value
            match value.checked_add(step) {
                Some(next) => value = next,
                None => break,
            }
        }
        Ok(bits)
    }

    fn contains(self, value: u32) -> bool {
        value < 64 && self.0 & (1 << value) != 0
    }
}

fn parse_value(spec: &FieldSpec, text: &str) -> Result<u32, CronParseError> {
    if let Some(index) = spec
        .names
        .iter()
        .position(|name| name.eq_ignore_ascii_case(text))
    {
        return Ok(spec.min + index as u32);
    }

    let value = text
        .parse::<u32>()
        .map_err(|_| CronParseError::InvalidField {
            field: spec.name,
            value: text.to_string(),
            reason: "not a number",
        })?;

    if value < spec.min || value > spec.max {
        return Err(CronParseError::OutOfRange {
            field: spec.name,
            value,
            min: spec.min,
            max: spec.max,
        });
    }
    Ok(value)
}

/// A parsed cron expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpr {
    source: String,
    minute: CronField,
    hour: CronField,
    day_of_month: CronField,
    month: CronField,
    day_of_week: CronField,
}

impl CronExpr {
    /// Parse a cron expression string.
    pub fn parse(expr: &str) -> Result<Self, CronParseError> {
        let parts: Vec<&str> = expr.split_whitespace().collect();
        if parts.len() != 5 {
            return Err(CronParseError::InvalidFieldCount(parts.len()));
        }

        let mut day_of_week = CronField::parse(&DAY_OF_WEEK, parts[4])?;
        // 7 is an alias for Sunday
        if day_of_week.contains(7) {
            day_of_week = CronField((day_of_week.0 | 1) & !(1 << 7));
        }

        Ok(Self {
            source: expr.to_string(),
            minute: CronField::parse(&MINUTE, parts[0])?,
            hour: CronField::parse(&HOUR, parts[1])?,
            day_of_month: CronField::parse(&DAY_OF_MONTH, parts[2])?,
            month: CronField::parse(&MONTH, parts[3])?,
            day_of_week,
        })
    }

    /// The expression text as submitted
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check if a datetime falls in a matching minute.
    pub fn matches(&self, dt: &DateTime<Utc>) -> bool {
        self.minute.contains(dt.minute())
            && self.hour.contains(dt.hour())
            && self.day_of_month.contains(dt.day())
            && self.month.contains(dt.month())
            && self.day_of_week.contains(dt.weekday().num_days_from_sunday())
    }

    /// First matching whole minute strictly after `after`.
    ///
    /// Returns `None` when nothing matches within the search horizon
    /// (e.g. `0 0 31 2 *`).
    pub fn next_after(&self, after: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut current = after.with_second(0)?.with_nanosecond(0)? + Duration::minutes(1);
        let last_year = after.year() + SEARCH_YEARS;

        while current.year() <= last_year {
            if !self.month.contains(current.month()) {
                let (year, month) = if current.month() == 12 {
                    (current.year() + 1, 1)
                } else {
                    (current.year(), current.month() + 1)
                };
                current = NaiveDate::from_ymd_opt(year, month, 1)?
                    .and_hms_opt(0, 0, 0)?
                    .and_utc();
                continue;
            }

            if !self.day_of_month.contains(current.day())
                || !self
                    .day_of_week
                    .contains(current.weekday().num_days_from_sunday())
            {
                current = current
                    .date_naive()
                    .succ_opt()?
                    .and_hms_opt(0, 0, 0)?
                    .and_utc();
                continue;
            }

            if !self.hour.contains(current.hour()) {
                current = current.with_minute(0)? + Duration::hours(1);
                continue;
            }

            if !self.minute.contains(current.minute()) {
                current += Duration::minutes(1);
                continue;
            }

            return Some(current);
        }

        None
    }
}

impl fmt::Display for CronExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for CronExpr {
    type Err = CronParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CronExpr::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_parse_default_schedule() {
        let expr = CronExpr::parse("0 2 * * *").unwrap();
        assert!(expr.matches(&at(2024, 1, 15, 2, 0, 0)));
        assert!(!expr.matches(&at(2024, 1, 15, 3, 0, 0)));
        assert_eq!(expr.as_str(), "0 2 * * *");
    }

    #[test]
    fn test_parse_steps_lists_and_ranges() {
        let expr = CronExpr::parse("*/15 9-17 * * 1-5").unwrap();
        assert!(expr.minute.contains(0));
        assert!(expr.minute.contains(45));
        assert!(!expr.minute.contains(50));
        assert!(expr.hour.contains(9));
        assert!(expr.hour.contains(17));
        assert!(!expr.hour.contains(8));
        assert!(!expr.day_of_week.contains(0));

        let list = CronExpr::parse("0,30 * * * *").unwrap();
        assert!(list.minute.contains(30));
        assert!(!list.minute.contains(15));

        let offset = CronExpr::parse("5/20 * * * *").unwrap();
        assert!(offset.minute.contains(5));
        assert!(offset.minute.contains(25));
        assert!(offset.minute.contains(45));
        assert!(!offset.minute.contains(0));
    }

    #[test]
    fn test_names_and_sunday_alias() {
        let expr = CronExpr::parse("0 0 * JAN,dec sun").unwrap();
        assert!(expr.month.contains(1));
        assert!(expr.month.contains(12));
        assert!(expr.day_of_week.contains(0));

        let seven = CronExpr::parse("0 0 * * 7").unwrap();
        assert!(seven.day_of_week.contains(0));
        assert!(!seven.day_of_week.contains(7));
    }

    #[test]
    fn test_huge_step_selects_only_start() {
        let cron = CronExpr::parse("10/4294967290 * * * *").unwrap();
        let at = |minute| Utc.with_ymd_and_hms(2024, 1, 15, 2, minute, 0).unwrap();

        assert!(cron.matches(&at(10)));
        assert!(!cron.matches(&at(11)));
        assert!(!cron.matches(&at(14)));
    }

    #[test]
    fn test_invalid_expressions() {
        assert_eq!(
            CronExpr::parse("* *"),
            Err(CronParseError::InvalidFieldCount(2))
        );
        assert!(matches!(
            CronExpr::parse("60 * * * *"),
            Err(CronParseError::OutOfRange { field: "minute", .. })
        ));
        assert!(matches!(
            CronExpr::parse("* 25 * * *"),
            Err(CronParseError::OutOfRange { field: "hour", .. })
        ));
        assert!(matches!(
            CronExpr::parse("*/0 * * * *"),
            Err(CronParseError::InvalidStep { .. })
        ));
        assert!(matches!(
            CronExpr::parse("30-10 * * * *"),
            Err(CronParseError::InvalidRange { .. })
        ));
        assert!(matches!(
            CronExpr::parse("a b c d e"),
            Err(CronParseError::InvalidField { .. })
        ));
        assert!(CronExpr::parse("1,,2 * * * *").is_err());
        assert!(matches!(
            CronExpr::parse("*/4294967296 * * * *"),
            Err(CronParseError::InvalidStep { .. })
        ));
        assert!(CronExpr::parse("").is_err());
        assert!(CronExpr::parse("* * * * * *").is_err());
    }

    #[test]
    fn test_next_after_every_five_minutes() {
        let expr = CronExpr::parse("*/5 * * * *").unwrap();
        let next = expr.next_after(&at(2024, 1, 15, 2, 1, 30)).unwrap();
        assert_eq!(next, at(2024, 1, 15, 2, 5, 0));

        // Strictly after: a fire time is never returned for itself
        let next = expr.next_after(&at(2024, 1, 15, 2, 5, 0)).unwrap();
        assert_eq!(next, at(2024, 1, 15, 2, 10, 0));
    }

    #[test]
    fn test_next_after_daily_rolls_over() {
        let expr = CronExpr::parse("0 2 * * *").unwrap();
        let next = expr.next_after(&at(2024, 12, 31, 14, 30, 0)).unwrap();
        assert_eq!(next, at(2025, 1, 1, 2, 0, 0));
    }

    #[test]
    fn test_next_after_leap_day() {
        let expr = CronExpr::parse("0 0 29 2 *").unwrap();
        let next = expr.next_after(&at(2023, 3, 1, 0, 0, 0)).unwrap();
        assert_eq!(next, at(2024, 2, 29, 0, 0, 0));
    }

    #[test]
    fn test_day_fields_must_both_match() {
        // Friday the 13th
        let expr = CronExpr::parse("0 0 13 * 5").unwrap();
        let next = expr.next_after(&at(2024, 1, 1, 0, 0, 0)).unwrap();
        assert_eq!(next, at(2024, 9, 13, 0, 0, 0));
    }

    #[test]
    fn test_next_after_never_matches() {
        let expr = CronExpr::parse("0 0 31 2 *").unwrap();
        assert_eq!(expr.next_after(&at(2024, 1, 1, 0, 0, 0)), None);
    }
}
