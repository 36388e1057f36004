//! Date normalization.
//!
//! Source spreadsheets mix several encodings for the same column across
//! vintages: spreadsheet serial numbers, `dd/mm/yyyy`, ISO `yyyy-mm-dd`,
//! `mm/dd/yyyy` (the FX history export), and month-name + year pairs.
//! Everything here resolves to a `NaiveDate` first and is bucketed into a
//! [`Period`] afterwards, so the day-of-month only survives for daily timelines.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::period::{CalendarMonth, Period};
use crate::models::Cell;

/// Field order of a three-part numeric date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// Four-digit first component means year/month/day, anything else
    /// day/month/year.
    #[default]
    Auto,
    DayMonthYear,
    MonthDayYear,
    YearMonthDay,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    #[error("empty date")]
    Empty,
    #[error("unrecognised date '{0}'")]
    Unrecognised(String),
    #[error("date out of range '{0}'")]
    OutOfRange(String),
}

/// A resolved date plus whether the field order had to be guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDate {
    pub date: NaiveDate,
    /// True when `DateOrder::Auto` picked day/month/year for a triple whose
    /// first two components could each be a month.
    pub ambiguous: bool,
}

impl ParsedDate {
    fn exact(date: NaiveDate) -> Self {
        Self {
            date,
            ambiguous: false,
        }
    }
}

const MONTH_NAMES: [(&str, u32); 24] = [
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sep", 9),
    ("sept", 9),
    ("october", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

/// Largest serial a spreadsheet can hold (31/12/9999).
const MAX_SERIAL: f64 = 2_958_465.0;

/// Parse a cell into a calendar month.
pub fn parse_date(raw: &Cell, order: DateOrder) -> Result<CalendarMonth, ParseFailure> {
    parse_period(raw, order)
}

/// Parse a cell into any period granularity.
pub fn parse_period<P: Period>(raw: &Cell, order: DateOrder) -> Result<P, ParseFailure> {
    resolve_date(raw, order).map(|parsed| P::from_date(parsed.date))
}

/// Resolve a cell to a full date, reporting order ambiguity.
pub fn resolve_date(raw: &Cell, order: DateOrder) -> Result<ParsedDate, ParseFailure> {
    match raw {
        Cell::Empty => Err(ParseFailure::Empty),
        Cell::Date(d) => Ok(ParsedDate::exact(*d)),
        Cell::Number(n) => from_serial(*n).map(ParsedDate::exact),
        Cell::Text(s) => parse_text(s, order),
    }
}

/// Convert a spreadsheet serial day count (epoch 1899-12-30). The fractional
/// part is time of day and is dropped.
pub fn from_serial(serial: f64) -> Result<NaiveDate, ParseFailure> {
    if !serial.is_finite() || serial < 0.0 || serial > MAX_SERIAL {
        return Err(ParseFailure::OutOfRange(serial.to_string()));
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .ok_or_else(|| ParseFailure::OutOfRange(serial.to_string()))?;
    epoch
        .checked_add_days(Days::new(serial.floor() as u64))
        .ok_or_else(|| ParseFailure::OutOfRange(serial.to_string()))
}

/// Case-insensitive month name or abbreviation to 1..=12.
pub fn month_number(name: &str) -> Option<u32> {
    let clean = name.trim().trim_end_matches('.').to_lowercase();
    if clean.is_empty() {
        return None;
    }
    MONTH_NAMES
        .iter()
        .find(|(n, _)| *n == clean)
        .map(|(_, m)| *m)
}

/// Resolve separate month and year columns (monthly survey sheets).
/// The month may be a name (`"March"`, `"mar"`) or a number (`3`, `"03"`).
pub fn resolve_month_year(month: &Cell, year: &Cell) -> Result<NaiveDate, ParseFailure> {
    let month_num = match month {
        Cell::Number(n) if n.fract() == 0.0 => *n as u32,
        Cell::Text(s) => match month_number(s) {
            Some(m) => m,
            None => s
                .trim()
                .parse::<u32>()
                .map_err(|_| ParseFailure::Unrecognised(s.clone()))?,
        },
        Cell::Empty => return Err(ParseFailure::Empty),
        other => return Err(ParseFailure::Unrecognised(format!("{other:?}"))),
    };

    let year_num = match year {
        Cell::Number(n) if n.fract() == 0.0 => *n as i32,
        Cell::Text(s) => s
            .trim()
            .parse::<i32>()
            .map_err(|_| ParseFailure::Unrecognised(s.clone()))?,
        Cell::Empty => return Err(ParseFailure::Empty),
        other => return Err(ParseFailure::Unrecognised(format!("{other:?}"))),
    };

    NaiveDate::from_ymd_opt(year_num, month_num, 1)
        .ok_or_else(|| ParseFailure::OutOfRange(format!("{month_num}/{year_num}")))
}

pub fn parse_month_year<P: Period>(month: &Cell, year: &Cell) -> Result<P, ParseFailure> {
    resolve_month_year(month, year).map(P::from_date)
}

fn parse_text(raw: &str, order: DateOrder) -> Result<ParsedDate, ParseFailure> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(ParseFailure::Empty);
    }

    // Serial numbers sometimes arrive as text from CSV exports.
    if let Ok(serial) = s.parse::<f64>() {
        return from_serial(serial).map(ParsedDate::exact);
    }

    // Drop a trailing time component ("2021-03-15T10:00:00Z", "15/03/2021 09:30").
    let date_part = s
        .split(|c: char| c == 'T' || c.is_whitespace())
        .next()
        .unwrap_or(s);
    if let Some(parsed) = parse_triple(date_part, order)? {
        return Ok(parsed);
    }
    if let Some(date) = parse_year_month(date_part)? {
        return Ok(ParsedDate::exact(date));
    }

    parse_named_month(s)
}

/// `2021-03` or `2021/3`: four-digit year first, day taken as the 1st.
fn parse_year_month(s: &str) -> Result<Option<NaiveDate>, ParseFailure> {
    let Some((year, month)) = s.split_once(['-', '/']) else {
        return Ok(None);
    };
    let digits = |p: &str| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit());
    if year.len() != 4 || month.len() > 2 || !digits(year) || !digits(month) {
        return Ok(None);
    }

    let out_of_range = || ParseFailure::OutOfRange(s.to_string());
    let year = year.parse::<i32>().map_err(|_| out_of_range())?;
    let month = month.parse::<u32>().map_err(|_| out_of_range())?;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(out_of_range).map(Some)
}

/// `a/b/c` or `a-b-c` with all-numeric parts. `Ok(None)` when the input is
/// not shaped like a triple at all.
fn parse_triple(s: &str, order: DateOrder) -> Result<Option<ParsedDate>, ParseFailure> {
    let parts: Vec<&str> = s.split(['/', '-']).collect();
    if parts.len() != 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
    {
        return Ok(None);
    }

    let out_of_range = || ParseFailure::OutOfRange(s.to_string());
    let nums: Vec<u32> = parts
        .iter()
        .map(|p| p.parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|_| out_of_range())?;

    let resolved = match order {
        DateOrder::Auto if parts[0].len() == 4 => DateOrder::YearMonthDay,
        DateOrder::Auto => DateOrder::DayMonthYear,
        explicit => explicit,
    };

    let (year, month, day) = match resolved {
        DateOrder::YearMonthDay => (nums[0], nums[1], nums[2]),
        DateOrder::MonthDayYear => (nums[2], nums[0], nums[1]),
        DateOrder::DayMonthYear | DateOrder::Auto => (nums[2], nums[1], nums[0]),
    };

    let ambiguous = order == DateOrder::Auto
        && resolved == DateOrder::DayMonthYear
        && nums[0] <= 12
        && nums[1] <= 12
        && nums[0] != nums[1];

    let year = expand_year(year).ok_or_else(out_of_range)?;
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(out_of_range)?;
    Ok(Some(ParsedDate { date, ambiguous }))
}

/// "March 2021", "mar-2021", "15 March 2021", "March 15, 2021".
fn parse_named_month(s: &str) -> Result<ParsedDate, ParseFailure> {
    let unrecognised = || ParseFailure::Unrecognised(s.to_string());
    let tokens: Vec<&str> = s
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '-' | '/'))
        .filter(|t| !t.is_empty())
        .collect();

    let month = tokens
        .iter()
        .find_map(|t| month_number(t))
        .ok_or_else(unrecognised)?;

    let numbers: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|t| t.chars().all(|c| c.is_ascii_digit()))
        .collect();

    let year = numbers
        .iter()
        .find(|t| t.len() == 4)
        .and_then(|t| t.parse::<i32>().ok())
        .ok_or_else(unrecognised)?;

    let day = numbers
        .iter()
        .find(|t| t.len() <= 2)
        .and_then(|t| t.parse::<u32>().ok())
        .unwrap_or(1);

    NaiveDate::from_ymd_opt(year, month, day)
        .map(ParsedDate::exact)
        .ok_or_else(|| ParseFailure::OutOfRange(s.to_string()))
}

/// Two-digit years are read as 20xx.
fn expand_year(year: u32) -> Option<i32> {
    match year {
        0..=99 => Some(2000 + year as i32),
        100..=9999 => Some(year as i32),
        _ => None,
    }
}
