use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::core::period::{CalendarMonth, Period};
use crate::models::NamedSeries;

/// Label → reduced series.
///
/// Registering a label that already exists replaces the earlier series
/// entirely (no merging of periods): the last registration wins. Loaders rely
/// on this to let a later, more authoritative source supersede an earlier one.
/// [`SeriesRegistry::fill_gaps`] is the one exception, for sources that
/// continue an existing series rather than supersede it.
#[derive(Debug, Clone)]
pub struct SeriesRegistry<P: Period = CalendarMonth> {
    series: HashMap<String, NamedSeries<P>>,
}

impl<P: Period> Default for SeriesRegistry<P> {
    fn default() -> Self {
        Self {
            series: HashMap::new(),
        }
    }
}

impl<P: Period> SeriesRegistry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. Returns the series that was replaced, if any.
    pub fn register(&mut self, label: impl Into<String>, values: BTreeMap<P, f64>) -> Option<NamedSeries<P>> {
        let label = label.into();
        let replaced = self
            .series
            .insert(label.clone(), NamedSeries::new(label.clone(), values));
        if let Some(old) = &replaced {
            tracing::debug!(label = %label, previous_periods = old.len(), "registry: label overwritten");
        }
        replaced
    }

    /// Add only the periods the existing series lacks; values already present
    /// are kept. Registers the series outright when the label is new.
    /// Returns how many periods were added.
    pub fn fill_gaps(&mut self, label: impl Into<String>, values: BTreeMap<P, f64>) -> usize {
        let label = label.into();
        match self.series.get_mut(&label) {
            Some(existing) => {
                let before = existing.len();
                for (period, value) in values {
                    existing.values.entry(period).or_insert(value);
                }
                let added = existing.len() - before;
                tracing::debug!(label = %label, added, "registry: gaps filled");
                added
            }
            None => {
                let added = values.len();
                self.series.insert(label.clone(), NamedSeries::new(label, values));
                added
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&NamedSeries<P>> {
        self.series.get(label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.series.contains_key(label)
    }

    /// All labels, sorted.
    pub fn labels(&self) -> BTreeSet<&str> {
        self.series.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedSeries<P>> {
        self.series.values()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Earliest and latest period across every registered series.
    pub fn period_bounds(&self) -> Option<(P, P)> {
        let min = self.iter().filter_map(NamedSeries::first_period).min()?;
        let max = self.iter().filter_map(NamedSeries::last_period).max()?;
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, month: u32) -> CalendarMonth {
        CalendarMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_second_registration_replaces_first() {
        let mut reg = SeriesRegistry::new();
        reg.register("X", BTreeMap::from([(month(2021, 1), 1.0), (month(2021, 2), 2.0)]));
        let replaced = reg.register("X", BTreeMap::from([(month(2022, 6), 9.0)]));

        assert_eq!(replaced.map(|s| s.len()), Some(2));
        let x = reg.get("X").unwrap();
        assert_eq!(x.len(), 1);
        assert_eq!(x.get(&month(2022, 6)), Some(9.0));
        assert_eq!(x.get(&month(2021, 1)), None);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_fill_gaps_keeps_existing_values() {
        let mut reg = SeriesRegistry::new();
        reg.register("USD", BTreeMap::from([(month(2020, 1), 101.0), (month(2020, 6), 103.0)]));
        let added = reg.fill_gaps("USD", BTreeMap::from([(month(2020, 6), 999.0), (month(2021, 1), 110.0)]));

        assert_eq!(added, 1);
        let usd = reg.get("USD").unwrap();
        assert_eq!(usd.len(), 3);
        assert_eq!(usd.get(&month(2020, 1)), Some(101.0));
        assert_eq!(usd.get(&month(2020, 6)), Some(103.0));
        assert_eq!(usd.get(&month(2021, 1)), Some(110.0));

        assert_eq!(reg.fill_gaps("EUR", BTreeMap::from([(month(2021, 1), 120.0)])), 1);
        assert!(reg.contains("EUR"));
    }

    #[test]
    fn test_labels_and_lookup() {
        let mut reg: SeriesRegistry = SeriesRegistry::new();
        assert!(reg.is_empty());
        assert!(reg.get("Central Bank Rate").is_none());

        reg.register("Central Bank Rate", BTreeMap::from([(month(2021, 1), 7.0)]));
        reg.register("91 Day Bill", BTreeMap::from([(month(2021, 1), 6.9)]));
        let labels: Vec<&str> = reg.labels().into_iter().collect();
        assert_eq!(labels, vec!["91 Day Bill", "Central Bank Rate"]);
        assert!(reg.contains("91 Day Bill"));
    }

    #[test]
    fn test_period_bounds_span_all_series() {
        let mut reg = SeriesRegistry::new();
        assert_eq!(reg.period_bounds(), None);
        reg.register("empty", BTreeMap::new());
        assert_eq!(reg.period_bounds(), None);

        reg.register("a", BTreeMap::from([(month(2021, 2), 1.0)]));
        reg.register("b", BTreeMap::from([(month(2020, 11), 1.0), (month(2020, 12), 1.0)]));
        assert_eq!(reg.period_bounds(), Some((month(2020, 11), month(2021, 2))));
    }
}
