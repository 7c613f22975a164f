//! Calendar year-month keys.
//!
//! A [`PeriodKey`] identifies the month a set of expenses belongs to. It is
//! rendered as `YYYY-MM`, so sorting the string form gives the same order as
//! sorting the keys themselves.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{EngineError, ResultEngine};

const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodKey {
    year: i32,
    month: u32,
}

impl PeriodKey {
    /// Builds a key, checking `year` is in `1..=9999` and `month` in `1..=12`.
    pub fn new(year: i32, month: u32) -> ResultEngine<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) || !(1..=12).contains(&month) {
            return Err(EngineError::InvalidPeriod(format!("{year:04}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    /// The period containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year().clamp(MIN_YEAR, MAX_YEAR),
            month: date.month(),
        }
    }

    /// The period of today's date on the local clock.
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    /// Moves the key by `delta` months in either direction.
    ///
    /// Month overflow and underflow roll the year. Fails with
    /// [`EngineError::InvalidPeriod`] only when the result leaves years
    /// `1..=9999`.
    pub fn shift(self, delta: i32) -> ResultEngine<Self> {
        let index = i64::from(self.year) * 12 + i64::from(self.month - 1) + i64::from(delta);
        let year = index.div_euclid(12);
        let month = index.rem_euclid(12) + 1;

        let out_of_range = || EngineError::InvalidPeriod(format!("{self} shifted by {delta}"));
        let year = i32::try_from(year).map_err(|_| out_of_range())?;
        let month = u32::try_from(month).map_err(|_| out_of_range())?;
        Self::new(year, month).map_err(|_| out_of_range())
    }

    /// Human label, e.g. `March 2024`.
    pub fn label(self) -> String {
        // month is always in 1..=12
        let name = MONTH_NAMES[(self.month - 1) as usize];
        format!("{name} {}", self.year)
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = EngineError;

    /// Parses exactly `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidPeriod(s.to_string());

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4
            || month.len() != 2
            || !year.chars().chain(month.chars()).all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for PeriodKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeriodKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> PeriodKey {
        raw.parse().unwrap()
    }

    #[test]
    fn shift_rolls_the_year() {
        assert_eq!(key("2024-01").shift(-1).unwrap(), key("2023-12"));
        assert_eq!(key("2024-12").shift(1).unwrap(), key("2025-01"));
        assert_eq!(key("2024-06").shift(0).unwrap(), key("2024-06"));
    }

    #[test]
    fn shift_handles_large_deltas() {
        assert_eq!(key("2024-03").shift(25).unwrap(), key("2026-04"));
        assert_eq!(key("2024-03").shift(-27).unwrap(), key("2021-12"));
        assert_eq!(key("2024-01").shift(-12).unwrap(), key("2023-01"));
        assert_eq!(key("2024-01").shift(-13).unwrap(), key("2022-12"));
    }

    #[test]
    fn shift_out_of_calendar_range_is_invalid() {
        assert!(matches!(
            key("0001-01").shift(-1),
            Err(EngineError::InvalidPeriod(_))
        ));
        assert!(matches!(
            key("9999-12").shift(1),
            Err(EngineError::InvalidPeriod(_))
        ));
        assert!(key("2024-01").shift(i32::MAX).is_err());
        assert!(key("2024-01").shift(i32::MIN).is_err());
    }

    #[test]
    fn parse_rejects_malformed_keys() {
        for raw in ["", "2024", "2024-1", "2024-13", "2024-00", "24-01", "2024/01", "abcd-ef"] {
            assert_eq!(
                raw.parse::<PeriodKey>(),
                Err(EngineError::InvalidPeriod(raw.to_string())),
                "{raw}"
            );
        }
    }

    #[test]
    fn string_order_matches_chronological_order() {
        let mut keys = vec![key("2024-10"), key("2023-12"), key("2024-02")];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
        let mut sorted = rendered.clone();
        sorted.sort();
        assert_eq!(rendered, sorted);
        assert_eq!(rendered, ["2023-12", "2024-02", "2024-10"]);
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&key("2024-03")).unwrap();
        assert_eq!(json, "\"2024-03\"");
        let back: PeriodKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key("2024-03"));
        assert!(serde_json::from_str::<PeriodKey>("\"2024-3\"").is_err());
    }

    #[test]
    fn label_names_the_month() {
        assert_eq!(key("2024-03").label(), "March 2024");
        assert_eq!(
            PeriodKey::from_date(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()),
            key("2025-12")
        );
    }
}
