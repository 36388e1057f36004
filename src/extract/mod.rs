//! Row → observation extraction.
//!
//! Every source goes through the same loop; what differs between sources
//! (accepted column names, date layout, label derivation, identifier filter)
//! lives in a [`SourceProfile`].
//!
//! Row-level problems never fail the extraction: the row is skipped and the
//! reason counted in the [`ExtractionReport`].

pub mod profiles;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::dates::{parse_month_year, resolve_date, DateOrder};
use crate::core::numeric::{cell_number, extract_candidates, scan_row, Extracted};
use crate::core::period::{CalendarMonth, Period};
use crate::core::reducer::{reduce, ReducePolicy};
use crate::models::{Cell, RawObservation, Row};

/// Where a row's date comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateColumns {
    /// One column holding a full date, first present candidate wins.
    Single {
        candidates: Vec<String>,
        #[serde(default)]
        order: DateOrder,
    },
    /// A month-name column plus a year column.
    MonthYear { month: String, year: String },
}

/// How the series label for a value is formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LabelRule {
    Fixed { label: String },
    /// `"<tenor><suffix>"`, e.g. `"91 Day Bill"`. The tenor must be an integer.
    Tenor { candidates: Vec<String>, suffix: String },
    /// The label is the text of another column (a currency code, say).
    Keyed { candidates: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueColumn {
    pub label: LabelRule,
    /// Accepted value column names, in priority order.
    pub candidates: Vec<String>,
}

/// Keep only rows whose identifier starts with `prefix`. Rows without the
/// identifier pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixFilter {
    pub candidates: Vec<String>,
    pub prefix: String,
}

impl PrefixFilter {
    pub fn accepts(&self, row: &Row) -> bool {
        match row.first_present(&self.candidates).and_then(|(_, cell)| cell.to_text()) {
            Some(id) => id.trim().starts_with(&self.prefix),
            None => true,
        }
    }
}

/// Everything the shared extraction step needs to know about one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceProfile {
    pub id: String,
    /// Files whose rows are concatenated, in order.
    pub files: Vec<String>,
    /// Column names for files without a header row.
    #[serde(default)]
    pub headers: Option<Vec<String>>,
    pub date: DateColumns,
    pub columns: Vec<ValueColumn>,
    #[serde(default)]
    pub filter: Option<PrefixFilter>,
    #[serde(default)]
    pub reduce: ReducePolicy,
    /// Allow the whole-row numeric scan when no value candidate matches.
    #[serde(default)]
    pub fallback_scan: bool,
    #[serde(default)]
    pub on_collision: Collision,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// What registration does when a label already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collision {
    /// Drop the earlier series.
    #[default]
    Replace,
    /// Keep the earlier series and add only the periods it lacks.
    FillGaps,
}

impl SourceProfile {
    /// Every column name the profile refers to. The whole-row scan never
    /// reads these, so a date, tenor or sibling rate cannot be mistaken for
    /// the missing value.
    pub fn known_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        match &self.date {
            DateColumns::Single { candidates, .. } => fields.extend(candidates.iter().map(String::as_str)),
            DateColumns::MonthYear { month, year } => fields.extend([month.as_str(), year.as_str()]),
        }
        for column in &self.columns {
            match &column.label {
                LabelRule::Fixed { .. } => {}
                LabelRule::Tenor { candidates, .. } | LabelRule::Keyed { candidates } => {
                    fields.extend(candidates.iter().map(String::as_str))
                }
            }
            fields.extend(column.candidates.iter().map(String::as_str));
        }
        if let Some(filter) = &self.filter {
            fields.extend(filter.candidates.iter().map(String::as_str));
        }
        fields
    }
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Identifier present but without the required prefix.
    Filtered,
    BadDate,
    /// Tenor or key column absent, or a tenor that is not an integer.
    MissingLabel,
    /// No value column produced a number.
    NoValue,
}

/// A value that came from the whole-row scan instead of a named column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackHit {
    pub row: usize,
    pub label: String,
    pub field: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub source_id: String,
    pub rows_read: usize,
    pub rows_used: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
    /// 1-based row numbers whose day/month order had to be guessed.
    pub ambiguous_rows: Vec<usize>,
    pub fallback_hits: Vec<FallbackHit>,
    /// Observation count per label, before reduction.
    pub observations: BTreeMap<String, usize>,
}

impl ExtractionReport {
    fn new(source_id: &str) -> Self {
        Self {
            source_id: source_id.to_string(),
            ..Self::default()
        }
    }

    fn skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_default() += 1;
    }

    pub fn rows_skipped(&self) -> usize {
        self.skipped.values().sum()
    }
}

/// Observations grouped by label, plus what happened along the way.
#[derive(Debug, Clone)]
pub struct Extraction<P: Period = CalendarMonth> {
    pub observations: BTreeMap<String, Vec<RawObservation<P>>>,
    pub report: ExtractionReport,
}

impl<P: Period> Extraction<P> {
    /// Reduce every label to one value per period.
    pub fn into_series(self, policy: ReducePolicy) -> (BTreeMap<String, BTreeMap<P, f64>>, ExtractionReport) {
        let series = self
            .observations
            .into_iter()
            .map(|(label, obs)| (label, reduce(&obs, policy)))
            .filter(|(_, values)| !values.is_empty())
            .collect();
        (series, self.report)
    }
}

/// Run one source's rows through its profile.
pub fn extract_observations<P: Period>(profile: &SourceProfile, rows: &[Row]) -> Extraction<P> {
    let mut report = ExtractionReport::new(&profile.id);
    let mut observations: BTreeMap<String, Vec<RawObservation<P>>> = BTreeMap::new();
    let known_fields = profile.known_fields();

    for (idx, row) in rows.iter().enumerate() {
        let line = idx + 1;
        report.rows_read += 1;

        if let Some(filter) = &profile.filter {
            if !filter.accepts(row) {
                report.skip(SkipReason::Filtered);
                continue;
            }
        }

        let period = match row_period::<P>(&profile.date, row) {
            Some((period, ambiguous)) => {
                if ambiguous {
                    tracing::debug!(source = %profile.id, row = line, "ambiguous day/month order, read as day first");
                    report.ambiguous_rows.push(line);
                }
                period
            }
            None => {
                report.skip(SkipReason::BadDate);
                continue;
            }
        };

        let mut produced = 0usize;
        let mut missing_label = false;
        for column in &profile.columns {
            let Some(label) = resolve_label(&column.label, row) else {
                missing_label = true;
                continue;
            };

            let found: Option<Extracted> = extract_candidates(row, &column.candidates).or_else(|| {
                if profile.fallback_scan {
                    scan_row(row, &known_fields)
                } else {
                    None
                }
            });
            let Some(found) = found else { continue };

            if found.via_fallback {
                tracing::warn!(
                    source = %profile.id,
                    row = line,
                    field = %found.field,
                    label = %label,
                    "no named value column, took first numeric field"
                );
                report.fallback_hits.push(FallbackHit {
                    row: line,
                    label: label.clone(),
                    field: found.field.to_string(),
                    value: found.value,
                });
            }

            *report.observations.entry(label.clone()).or_default() += 1;
            observations.entry(label).or_default().push(RawObservation {
                period,
                value: found.value,
            });
            produced += 1;
        }

        if produced > 0 {
            report.rows_used += 1;
        } else if missing_label {
            report.skip(SkipReason::MissingLabel);
        } else {
            report.skip(SkipReason::NoValue);
        }
    }

    Extraction { observations, report }
}

fn row_period<P: Period>(date: &DateColumns, row: &Row) -> Option<(P, bool)> {
    match date {
        DateColumns::Single { candidates, order } => {
            let (_, cell) = row.first_present(candidates)?;
            let parsed = resolve_date(cell, *order).ok()?;
            Some((P::from_date(parsed.date), parsed.ambiguous))
        }
        DateColumns::MonthYear { month, year } => {
            let month = row.get(month).unwrap_or(&Cell::Empty);
            let year = row.get(year).unwrap_or(&Cell::Empty);
            parse_month_year::<P>(month, year).ok().map(|p| (p, false))
        }
    }
}

fn resolve_label(rule: &LabelRule, row: &Row) -> Option<String> {
    match rule {
        LabelRule::Fixed { label } => Some(label.clone()),
        LabelRule::Tenor { candidates, suffix } => {
            let (_, cell) = row.first_present(candidates)?;
            let tenor = cell_number(cell)?;
            if tenor.fract() != 0.0 || tenor <= 0.0 {
                return None;
            }
            Some(format!("{}{}", tenor as i64, suffix))
        }
        LabelRule::Keyed { candidates } => {
            let (_, cell) = row.first_present(candidates)?;
            let key = cell.to_text()?;
            let key = key.trim();
            if key.is_empty() {
                None
            } else {
                Some(key.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, month: u32) -> CalendarMonth {
        CalendarMonth::new(year, month).unwrap()
    }

    fn bills() -> SourceProfile {
        profiles::find("tbills").unwrap()
    }

    #[test]
    fn test_tenor_labels_and_grouping() {
        let rows = vec![
            Row::new().with("Issue Date", "04/01/2021").with("Tenor", "91").with("Weighted Average Rate", "6.9"),
            Row::new().with("Issue Date", "11/01/2021").with("Tenor", 91.0).with("Weighted Average Rate", 7.1),
            Row::new().with("Date", "2021-01-18").with("Tenor", "364").with("WeightedAverageRate", "9.0"),
        ];
        let ex = extract_observations::<CalendarMonth>(&bills(), &rows);
        let (series, report) = ex.into_series(ReducePolicy::Mean);

        assert_eq!(report.rows_used, 3);
        let bill91 = &series["91 Day Bill"];
        assert!((bill91[&month(2021, 1)] - 7.0).abs() < 1e-9);
        assert_eq!(series["364 Day Bill"][&month(2021, 1)], 9.0);
    }

    #[test]
    fn test_non_integer_tenor_skipped() {
        let rows = vec![Row::new().with("Issue Date", "2021-01-04").with("Tenor", "91.5").with("Weighted Average Rate", "6.9")];
        let ex = extract_observations::<CalendarMonth>(&bills(), &rows);
        assert!(ex.observations.is_empty());
        assert_eq!(ex.report.skipped.get(&SkipReason::MissingLabel), Some(&1));
    }

    #[test]
    fn test_bad_date_skipped() {
        let rows = vec![
            Row::new().with("Issue Date", "not a date").with("Tenor", "91").with("Weighted Average Rate", "6.9"),
            Row::new().with("Tenor", "91").with("Weighted Average Rate", "6.9"),
        ];
        let ex = extract_observations::<CalendarMonth>(&bills(), &rows);
        assert_eq!(ex.report.skipped.get(&SkipReason::BadDate), Some(&2));
        assert_eq!(ex.report.rows_used, 0);
    }

    #[test]
    fn test_bond_prefix_filter() {
        let bonds = profiles::find("tbonds").unwrap();
        let rows = vec![
            Row::new().with("Issue No", "FXD1/2021/5").with("Issue Date", "2021-03-01").with("Tenor", "5").with("Coupon Rate", "11.3"),
            Row::new().with("Issue No", "IFB1/2021/16").with("Issue Date", "2021-03-01").with("Tenor", "16").with("Coupon Rate", "12.0"),
            Row::new().with("Issue Date", "2021-03-02").with("Tenor", "5").with("Coupon", "11.5"),
        ];
        let ex = extract_observations::<CalendarMonth>(&bonds, &rows);
        assert_eq!(ex.report.skipped.get(&SkipReason::Filtered), Some(&1));
        assert_eq!(ex.report.observations.get("5 Year Bond"), Some(&2));
        assert!(!ex.observations.contains_key("16 Year Bond"));
    }

    #[test]
    fn test_dual_columns_each_optional() {
        let repo = profiles::find("repo").unwrap();
        let rows = vec![
            Row::new().with("Date", "2021-02-01").with("Repo", "7.0").with("Reverse Repo", "5.0"),
            Row::new().with("DATE", "2021-02-03").with("ReverseRepo", "5.5"),
        ];
        let (series, report) = extract_observations::<CalendarMonth>(&repo, &rows).into_series(ReducePolicy::Mean);
        assert_eq!(report.rows_used, 2);
        assert_eq!(series["Repo Rate"][&month(2021, 2)], 7.0);
        assert!((series["Reverse Repo Rate"][&month(2021, 2)] - 5.25).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_hit_is_reported() {
        let cbr = profiles::find("cbr").unwrap();
        let rows = vec![Row::new().with("Date", "2021-03-15").with("Central Bank Rate %", "7.00%")];
        let ex = extract_observations::<CalendarMonth>(&cbr, &rows);
        assert_eq!(ex.report.fallback_hits.len(), 1);
        let hit = &ex.report.fallback_hits[0];
        assert_eq!(hit.field, "Central Bank Rate %");
        assert_eq!(hit.label, "Central Bank Rate");
        assert_eq!(hit.value, 7.0);
    }

    #[test]
    fn test_fallback_never_reads_sibling_columns() {
        let repo = profiles::find("repo").unwrap();
        let rows = vec![Row::new().with("Date", "2021-02-01").with("Reverse Repo", "5.0")];
        let ex = extract_observations::<CalendarMonth>(&repo, &rows);
        assert!(!ex.observations.contains_key("Repo Rate"));
        assert!(ex.report.fallback_hits.is_empty());
    }

    #[test]
    fn test_fallback_disabled() {
        let mut cbr = profiles::find("cbr").unwrap();
        cbr.fallback_scan = false;
        let rows = vec![Row::new().with("Date", "2021-03-15").with("Central Bank Rate %", "7.00%")];
        let ex = extract_observations::<CalendarMonth>(&cbr, &rows);
        assert!(ex.report.fallback_hits.is_empty());
        assert_eq!(ex.report.skipped.get(&SkipReason::NoValue), Some(&1));
    }

    #[test]
    fn test_month_year_rows() {
        let cbwar = profiles::find("cbwar").unwrap();
        let rows = vec![Row::new()
            .with("Year", 2021.0)
            .with("Month", "September ")
            .with("Deposit", "6.5")
            .with("Savings", "2.6")
            .with("Lending", "12.1")
            .with("Overdraft", "11.9")];
        let (series, _) = extract_observations::<CalendarMonth>(&cbwar, &rows).into_series(ReducePolicy::Mean);
        assert_eq!(series.len(), 4);
        assert_eq!(series["Lending"][&month(2021, 9)], 12.1);
    }

    #[test]
    fn test_keyed_labels() {
        let fx = profiles::find("fx_history").unwrap();
        let rows = vec![
            Row::new().with("Date", "03/15/2021").with("Currency", "US DOLLAR").with("Mean", "109.5"),
            Row::new().with("Date", "03/16/2021").with("Currency", "EURO").with("Mean", "130.1"),
            Row::new().with("Date", "03/17/2021").with("Currency", "").with("Mean", "1.0"),
        ];
        let ex = extract_observations::<CalendarMonth>(&fx, &rows);
        assert_eq!(ex.observations.len(), 2);
        assert!(ex.observations.contains_key("US DOLLAR"));
        assert_eq!(ex.report.skipped.get(&SkipReason::MissingLabel), Some(&1));
    }

    #[test]
    fn test_ambiguous_rows_recorded() {
        let cbr = profiles::find("cbr").unwrap();
        let rows = vec![
            Row::new().with("Date", "03/04/2021").with("Rate", "7.0"),
            Row::new().with("Date", "15/04/2021").with("Rate", "7.0"),
        ];
        let ex = extract_observations::<CalendarMonth>(&cbr, &rows);
        assert_eq!(ex.report.ambiguous_rows, vec![1]);
        assert_eq!(ex.observations["Central Bank Rate"][0].period, month(2021, 4));
    }
}
