use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::period::{CalendarMonth, Period};

/// One cell of a tabular row, as handed over by a row source.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    /// Empty cells and whitespace-only text count as absent.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) | Cell::Date(_) => false,
        }
    }

    /// Textual rendering of the cell, used for labels and identifiers.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Cell::Number(n) => Some(n.to_string()),
            Cell::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Cell::Date(value)
    }
}

/// A row of named cells. Column order is preserved because the numeric
/// fallback scan walks fields in the order the source exposed them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    fields: Vec<(String, Cell)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy in tests and in-memory sources.
    pub fn with(mut self, name: impl Into<String>, cell: impl Into<Cell>) -> Self {
        self.push(name, cell);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, cell: impl Into<Cell>) {
        self.fields.push((name.into(), cell.into()));
    }

    /// Looks up a column by exact name. Blank cells are reported as absent.
    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
            .filter(|v| !v.is_blank())
    }

    /// First candidate column that is present and non-blank.
    pub fn first_present<'a, S: AsRef<str>>(&'a self, candidates: &[S]) -> Option<(&'a str, &'a Cell)> {
        candidates.iter().find_map(|name| {
            let name = name.as_ref();
            self.fields
                .iter()
                .find(|(k, v)| k == name && !v.is_blank())
                .map(|(k, v)| (k.as_str(), v))
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Cell>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// A single extracted fact. Consumed by the period reducer right away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawObservation<P = CalendarMonth> {
    pub period: P,
    pub value: f64,
}

/// A labelled series with at most one value per period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSeries<P: Period = CalendarMonth> {
    pub label: String,
    pub values: BTreeMap<P, f64>,
}

impl<P: Period> NamedSeries<P> {
    pub fn new(label: impl Into<String>, values: BTreeMap<P, f64>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }

    pub fn get(&self, period: &P) -> Option<f64> {
        self.values.get(period).copied()
    }

    pub fn first_period(&self) -> Option<P> {
        self.values.keys().next().copied()
    }

    pub fn last_period(&self) -> Option<P> {
        self.values.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A series laid over a timeline. `values[i]` belongs to `timeline[i]`;
/// `None` marks "no data" and is never the same thing as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedSeries {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

impl AlignedSeries {
    pub fn new(label: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Count of positions carrying a value.
    pub fn observed(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// What the rendering layer consumes: period labels plus parallel series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub series: Vec<AlignedSeries>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_cells_are_absent() {
        let row = Row::new()
            .with("Date", "  ")
            .with("Rate", Cell::Empty)
            .with("Tenor", 91.0);
        assert!(row.get("Date").is_none());
        assert!(row.get("Rate").is_none());
        assert_eq!(row.get("Tenor"), Some(&Cell::Number(91.0)));
    }

    #[test]
    fn test_first_present_respects_candidate_order() {
        let row = Row::new().with("Date", "01/02/2021").with("Issue Date", "15/03/2021");
        let (name, cell) = row.first_present(&["Issue Date", "Date"]).unwrap();
        assert_eq!(name, "Issue Date");
        assert_eq!(cell, &Cell::from("15/03/2021"));
    }

    #[test]
    fn test_fields_preserve_insertion_order() {
        let row: Row = vec![("b", "1"), ("a", "2"), ("c", "3")].into_iter().collect();
        let names: Vec<&str> = row.fields().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_aligned_series_serializes_no_data_as_null() {
        let s = AlignedSeries::new("X", vec![None, Some(7.0)]);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["values"], serde_json::json!([null, 7.0]));
        assert_eq!(s.observed(), 1);
    }
}
