use crate::core::period::{CalendarMonth, Period};
use crate::core::series_registry::SeriesRegistry;
use crate::error::{Error, Result};
use crate::models::{AlignedSeries, NamedSeries};

/// Contiguous run of periods from the earliest to the latest period found in
/// a registry. Every period in between is present, whether or not any series
/// has data for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline<P: Period = CalendarMonth> {
    periods: Vec<P>,
}

impl<P: Period> Timeline<P> {
    /// Scan every registered series and lay out `min..=max`.
    /// An empty registry, or one with only empty series, gives an empty timeline.
    pub fn build(registry: &SeriesRegistry<P>) -> Self {
        match registry.period_bounds() {
            Some((start, end)) => Self::span(start, end),
            None => Self { periods: Vec::new() },
        }
    }

    /// Inclusive run of periods. Empty when `end < start`.
    pub fn span(start: P, end: P) -> Self {
        let mut periods = Vec::new();
        let mut current = start;
        while current <= end {
            periods.push(current);
            let next = current.succ();
            if next == current {
                break;
            }
            current = next;
        }
        Self { periods }
    }

    pub fn periods(&self) -> &[P] {
        &self.periods
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn first(&self) -> Option<P> {
        self.periods.first().copied()
    }

    pub fn last(&self) -> Option<P> {
        self.periods.last().copied()
    }

    pub fn index_of(&self, period: P) -> Option<usize> {
        self.periods.binary_search(&period).ok()
    }

    /// Canonical labels, one per period.
    pub fn labels(&self) -> Vec<String> {
        self.periods.iter().map(ToString::to_string).collect()
    }
}

/// Lay a sparse series over the timeline.
///
/// A period with its own value emits it. A missing period before the first
/// observation emits `None`; a missing period after it repeats the most
/// recent value (forward fill).
pub fn align<P: Period>(series: &NamedSeries<P>, timeline: &Timeline<P>) -> AlignedSeries {
    let mut last: Option<f64> = None;
    let values = timeline
        .periods()
        .iter()
        .map(|period| {
            if let Some(v) = series.get(period) {
                last = Some(v);
            }
            last
        })
        .collect();

    AlignedSeries::new(series.label.clone(), values)
}

/// Pointwise `a - b` over two aligned series labelled `"<a> minus <b>"`.
pub fn diff(a: &AlignedSeries, b: &AlignedSeries) -> Result<AlignedSeries> {
    diff_labeled(a, b, format!("{} minus {}", a.label, b.label))
}

/// Pointwise `a - b` with an explicit label. `None` wherever either side is
/// `None`; nothing is re-filled.
pub fn diff_labeled(a: &AlignedSeries, b: &AlignedSeries, label: impl Into<String>) -> Result<AlignedSeries> {
    if a.len() != b.len() {
        return Err(Error::ShapeMismatch {
            left: a.label.clone(),
            left_len: a.len(),
            right: b.label.clone(),
            right_len: b.len(),
        });
    }

    let values = a
        .values
        .iter()
        .zip(&b.values)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some(x - y),
            _ => None,
        })
        .collect();

    Ok(AlignedSeries::new(label, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn month(year: i32, month: u32) -> CalendarMonth {
        CalendarMonth::new(year, month).unwrap()
    }

    fn series(label: &str, points: &[((i32, u32), f64)]) -> NamedSeries {
        NamedSeries::new(
            label,
            points.iter().map(|((y, m), v)| (month(*y, *m), *v)).collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn test_timeline_is_contiguous_across_year_end() {
        let mut reg = SeriesRegistry::new();
        reg.register("a", series("a", &[((2020, 11), 1.0)]).values);
        reg.register("b", series("b", &[((2021, 2), 2.0)]).values);

        let timeline = Timeline::build(&reg);
        assert_eq!(timeline.labels(), vec!["11/2020", "12/2020", "01/2021", "02/2021"]);
        assert_eq!(timeline.index_of(month(2021, 1)), Some(2));
        assert_eq!(timeline.index_of(month(2022, 1)), None);
    }

    #[test]
    fn test_timeline_empty_registry() {
        let reg: SeriesRegistry = SeriesRegistry::new();
        let timeline = Timeline::build(&reg);
        assert!(timeline.is_empty());
        assert!(timeline.labels().is_empty());
    }

    #[test]
    fn test_timeline_single_period() {
        let mut reg = SeriesRegistry::new();
        reg.register("a", series("a", &[((2021, 7), 1.0)]).values);
        assert_eq!(Timeline::build(&reg).labels(), vec!["07/2021"]);
    }

    #[test]
    fn test_span_reversed_bounds_is_empty() {
        assert!(Timeline::span(month(2021, 2), month(2021, 1)).is_empty());
    }

    #[test]
    fn test_align_leading_gap_is_no_data() {
        let s = series("X", &[((2021, 2), 7.0), ((2021, 4), 7.5)]);
        let timeline = Timeline::span(month(2021, 1), month(2021, 5));
        let aligned = align(&s, &timeline);
        assert_eq!(aligned.values, vec![None, Some(7.0), Some(7.0), Some(7.5), Some(7.5)]);
        assert_eq!(aligned.label, "X");
    }

    #[test]
    fn test_align_interior_gap_forward_fills() {
        let s = series("X", &[((2021, 1), 3.0), ((2021, 5), 4.0)]);
        let timeline = Timeline::span(month(2021, 1), month(2021, 5));
        let aligned = align(&s, &timeline);
        assert_eq!(aligned.values, vec![Some(3.0), Some(3.0), Some(3.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_align_series_outside_timeline_has_no_data() {
        let s = series("late", &[((2022, 1), 1.0)]);
        let timeline = Timeline::span(month(2021, 1), month(2021, 3));
        assert_eq!(align(&s, &timeline).values, vec![None, None, None]);
    }

    #[test]
    fn test_zero_is_a_value() {
        let s = series("zero", &[((2021, 2), 0.0)]);
        let timeline = Timeline::span(month(2021, 1), month(2021, 3));
        assert_eq!(align(&s, &timeline).values, vec![None, Some(0.0), Some(0.0)]);
    }

    #[test]
    fn test_diff_propagates_no_data() {
        let a = AlignedSeries::new("a", vec![Some(1.0), None, Some(3.0)]);
        let b = AlignedSeries::new("b", vec![Some(0.5), Some(0.5), None]);
        let d = diff(&a, &b).unwrap();
        assert_eq!(d.values, vec![Some(0.5), None, None]);
        assert_eq!(d.label, "a minus b");
    }

    #[test]
    fn test_diff_shape_mismatch() {
        let a = AlignedSeries::new("a", vec![Some(1.0)]);
        let b = AlignedSeries::new("b", vec![Some(1.0), Some(2.0)]);
        match diff(&a, &b) {
            Err(Error::ShapeMismatch { left_len, right_len, .. }) => {
                assert_eq!((left_len, right_len), (1, 2));
            }
            other => panic!("expected shape mismatch, got {other:?}"),
        }
    }
}
