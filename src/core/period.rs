use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

/// A calendar bucket that observations are keyed by.
///
/// Implementors must order chronologically and `succ` must step to the
/// immediately following bucket, so a timeline can be generated by repeated
/// stepping from the minimum to the maximum period.
pub trait Period: Copy + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Bucket a full date into this period.
    fn from_date(date: NaiveDate) -> Self;

    /// The next period.
    fn succ(self) -> Self;
}

/// A (year, month) pair. Ordering is lexicographic on (year, month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarMonth {
    year: i32,
    month: u32,
}

impl CalendarMonth {
    /// Returns `None` when `month` is outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Canonical `MM/YYYY` label.
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// First day of the month.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl Period for CalendarMonth {
    fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    fn succ(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:04}", self.month, self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid period label '{0}'")]
pub struct InvalidPeriodLabel(pub String);

impl FromStr for CalendarMonth {
    type Err = InvalidPeriodLabel;

    /// Parses `MM/YYYY`. Older pages emitted unpadded months (`3/2021`), so a
    /// single-digit month is accepted as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidPeriodLabel(s.to_string());
        let (month, year) = s.trim().split_once('/').ok_or_else(invalid)?;
        let month: u32 = month.trim().parse().map_err(|_| invalid())?;
        let year: i32 = year.trim().parse().map_err(|_| invalid())?;
        CalendarMonth::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for CalendarMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A single calendar day, used for daily timelines (exchange rates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl Period for CalendarDay {
    fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    fn succ(self) -> Self {
        // NaiveDate::MAX has no successor; saturate rather than panic.
        Self(self.0.succ_opt().unwrap_or(self.0))
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%d/%m/%Y"))
    }
}

impl FromStr for CalendarDay {
    type Err = InvalidPeriodLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%d/%m/%Y")
            .map(CalendarDay)
            .map_err(|_| InvalidPeriodLabel(s.to_string()))
    }
}

impl Serialize for CalendarDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
