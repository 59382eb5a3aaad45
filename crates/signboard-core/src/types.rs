use crate::error::SignError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Reason
// ---------------------------------------------------------------------------

/// Why the counter was last reset. Each reason has its own checkbox on the
/// sign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reason {
    #[default]
    Change,
    Deploy,
    Missed,
}

impl Reason {
    pub fn all() -> &'static [Reason] {
        &[Reason::Change, Reason::Deploy, Reason::Missed]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Reason::Change => "Change",
            Reason::Deploy => "Deploy",
            Reason::Missed => "Missed",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Reason {
    type Err = SignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "change" => Ok(Reason::Change),
            "deploy" => Ok(Reason::Deploy),
            "missed" => Ok(Reason::Missed),
            _ => Err(SignError::InvalidReason(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Parse an ISO date. Full ISO datetimes are accepted too; only the calendar
/// date is kept.
pub fn parse_date(s: &str) -> Result<NaiveDate, SignError> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    Err(SignError::InvalidDate(s.to_string()))
}

/// Whole calendar days from `from` to `to`; negative when `to` is earlier.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_parses_case_insensitively() {
        assert_eq!("deploy".parse::<Reason>().unwrap(), Reason::Deploy);
        assert_eq!("Missed".parse::<Reason>().unwrap(), Reason::Missed);
        assert_eq!(" CHANGE ".parse::<Reason>().unwrap(), Reason::Change);
        assert!("outage".parse::<Reason>().is_err());
    }

    #[test]
    fn reason_serializes_capitalized() {
        let json = serde_json::to_string(&Reason::Deploy).unwrap();
        assert_eq!(json, "\"Deploy\"");
    }

    #[test]
    fn parse_date_accepts_plain_and_datetime() {
        let expected = NaiveDate::from_ymd_opt(2025, 10, 3).unwrap();
        assert_eq!(parse_date("2025-10-03").unwrap(), expected);
        assert_eq!(parse_date("2025-10-03T14:22:01.123456").unwrap(), expected);
        assert_eq!(parse_date("2025-10-03T14:22:01+02:00").unwrap(), expected);
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(matches!(
            parse_date("03/10/2025"),
            Err(SignError::InvalidDate(_))
        ));
        assert!(parse_date("").is_err());
    }

    #[test]
    fn days_between_counts_calendar_days() {
        let a = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2025, 10, 3).unwrap();
        assert_eq!(days_between(a, b), 2);
        assert_eq!(days_between(b, a), -2);
        assert_eq!(days_between(a, a), 0);
    }
}
