use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const DAYS_PER_YEAR: f64 = 365.25;
const HOURS_PER_YEAR: f64 = 8_760.0;
const MINUTES_PER_YEAR: f64 = 525_600.0;
const SECONDS_PER_YEAR: f64 = 31_536_000.0;

/// Speaker age, either parsed from a `P<Y>Y<M>M<D>D[T<H>H<M>M<S>S]` duration
/// or taken as a raw number of years.
///
/// `decimal` is the only field used for comparisons. The components are
/// `None` when the age was built from a decimal.
#[derive(Clone, Debug, PartialEq)]
pub struct Age {
    pub years: Option<u32>,
    pub months: Option<u32>,
    pub days: Option<u32>,
    pub hours: Option<u32>,
    pub minutes: Option<u32>,
    pub seconds: Option<u32>,
    pub decimal: f64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AgeParseError {
    #[error("age {0:?} does not start with 'P'")]
    MissingPrefix(String),
    #[error("age {0:?} has no years field")]
    MissingYears(String),
    #[error("invalid number {value:?} in age {raw:?}")]
    InvalidNumber { raw: String, value: String },
    #[error("unexpected {rest:?} in age {raw:?}")]
    Trailing { raw: String, rest: String },
}

impl Age {
    /// Parse a duration string. Blank or absent sub-fields count as zero;
    /// the years field is mandatory.
    pub fn parse(raw: &str) -> Result<Self, AgeParseError> {
        let trimmed = raw.trim();
        let body = trimmed
            .strip_prefix('P')
            .ok_or_else(|| AgeParseError::MissingPrefix(raw.to_string()))?;
        let (date, time) = match body.split_once('T') {
            Some((date, time)) => (date, time),
            None => (body, ""),
        };

        let (years, rest) = match take_field(raw, date, 'Y')? {
            (Some(years), rest) => (years, rest),
            (None, _) => return Err(AgeParseError::MissingYears(raw.to_string())),
        };
        let (months, rest) = take_field(raw, rest, 'M')?;
        let (days, rest) = take_field(raw, rest, 'D')?;
        ensure_consumed(raw, rest)?;

        let (hours, rest) = take_field(raw, time, 'H')?;
        let (minutes, rest) = take_field(raw, rest, 'M')?;
        let (seconds, rest) = take_field(raw, rest, 'S')?;
        ensure_consumed(raw, rest)?;

        Ok(Self::from_components(
            years,
            months.unwrap_or(0),
            days.unwrap_or(0),
            hours.unwrap_or(0),
            minutes.unwrap_or(0),
            seconds.unwrap_or(0),
        ))
    }

    pub fn from_components(
        years: u32,
        months: u32,
        days: u32,
        hours: u32,
        minutes: u32,
        seconds: u32,
    ) -> Self {
        let decimal = f64::from(years)
            + f64::from(months) / 12.0
            + f64::from(days) / DAYS_PER_YEAR
            + f64::from(hours) / HOURS_PER_YEAR
            + f64::from(minutes) / MINUTES_PER_YEAR
            + f64::from(seconds) / SECONDS_PER_YEAR;
        Self {
            years: Some(years),
            months: Some(months),
            days: Some(days),
            hours: Some(hours),
            minutes: Some(minutes),
            seconds: Some(seconds),
            decimal,
        }
    }

    /// Wrap a raw number of years.
    pub fn from_decimal(decimal: f64) -> Self {
        Self {
            years: None,
            months: None,
            days: None,
            hours: None,
            minutes: None,
            seconds: None,
            decimal,
        }
    }

    /// Age in months, rounded to a millionth of a month so bin edges are
    /// not at the mercy of float error.
    pub fn months(&self) -> f64 {
        (self.decimal * 12.0 * 1e6).round() / 1e6
    }

    /// The full duration form, when every component is known.
    pub fn to_duration(&self) -> Option<String> {
        Some(format!(
            "P{}Y{}M{}DT{}H{}M{}S",
            self.years?, self.months?, self.days?, self.hours?, self.minutes?, self.seconds?
        ))
    }
}

impl FromStr for Age {
    type Err = AgeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Age::parse(s)
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_duration() {
            Some(duration) => f.write_str(&duration),
            None => write!(f, "{}", self.decimal),
        }
    }
}

/// Consume `<digits><designator>` from the front of `part`.
///
/// Returns `None` when the designator is absent; blank digits read as zero.
fn take_field<'a>(
    raw: &str,
    part: &'a str,
    designator: char,
) -> Result<(Option<u32>, &'a str), AgeParseError> {
    let Some((digits, rest)) = part.split_once(designator) else {
        return Ok((None, part));
    };
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        // The designator belongs to a later field.
        return Ok((None, part));
    }
    if digits.is_empty() {
        return Ok((Some(0), rest));
    }
    let value = digits
        .parse::<u32>()
        .map_err(|_| AgeParseError::InvalidNumber {
            raw: raw.to_string(),
            value: digits.to_string(),
        })?;
    Ok((Some(value), rest))
}

fn ensure_consumed(raw: &str, rest: &str) -> Result<(), AgeParseError> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(AgeParseError::Trailing {
            raw: raw.to_string(),
            rest: rest.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_duration() {
        let age = Age::parse("P25Y0M0DT0H0M0S").unwrap();
        assert_eq!(age.years, Some(25));
        assert_eq!(age.months, Some(0));
        assert_eq!(age.days, Some(0));
        assert_eq!(age.hours, Some(0));
        assert_eq!(age.minutes, Some(0));
        assert_eq!(age.seconds, Some(0));
        assert_eq!(age.decimal, 25.0);
    }

    #[test]
    fn time_component_is_optional() {
        let age = Age::parse("P7Y6M").unwrap();
        assert_eq!(age.hours, Some(0));
        assert_eq!(age.minutes, Some(0));
        assert_eq!(age.seconds, Some(0));
        assert_eq!(age.days, Some(0));
        assert!((age.decimal - 7.5).abs() < 1e-9);
    }

    #[test]
    fn blank_sub_fields_default_to_zero() {
        let age = Age::parse("P2Y3MD").unwrap();
        assert_eq!(age.days, Some(0));
        assert!((age.decimal - 2.25).abs() < 1e-9);
    }

    #[test]
    fn days_and_seconds_contribute() {
        let age = Age::parse("P1Y0M73DT0H0M0S").unwrap();
        assert!((age.decimal - (1.0 + 73.0 / 365.25)).abs() < 1e-9);
        let age = Age::parse("P0Y0M0DT0H0M31536000S").unwrap();
        assert!((age.decimal - 1.0).abs() < 1e-9);
    }

    #[test]
    fn years_are_mandatory() {
        assert!(matches!(
            Age::parse("P6M"),
            Err(AgeParseError::MissingYears(_))
        ));
        assert!(matches!(
            Age::parse("7Y6M"),
            Err(AgeParseError::MissingPrefix(_))
        ));
        assert!(matches!(
            Age::parse("P7Y6Mxx"),
            Err(AgeParseError::Trailing { .. })
        ));
    }

    #[test]
    fn decimal_ages_have_no_components() {
        let age = Age::from_decimal(999.0);
        assert_eq!(age.years, None);
        assert_eq!(age.to_duration(), None);
        assert_eq!(age.to_string(), "999");
    }

    #[test]
    fn months_are_stable_at_bin_edges() {
        let age = Age::parse("P2Y1M").unwrap();
        assert_eq!(age.months(), 25.0);
        assert_eq!(age.to_duration().as_deref(), Some("P2Y1M0DT0H0M0S"));
    }
}
