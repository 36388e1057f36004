use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::period::Period;
use crate::models::RawObservation;

/// How several observations in one period collapse to a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReducePolicy {
    /// Arithmetic mean of every observation in the period.
    #[default]
    Mean,
    /// The observation that arrived last, in input order.
    Last,
}

/// Group observations by period and reduce each group.
///
/// Non-finite values are dropped before grouping; a period left with no
/// values is absent from the output rather than zero.
pub fn reduce<P: Period>(observations: &[RawObservation<P>], policy: ReducePolicy) -> BTreeMap<P, f64> {
    let mut groups: BTreeMap<P, Vec<f64>> = BTreeMap::new();
    for obs in observations.iter().filter(|o| o.value.is_finite()) {
        groups.entry(obs.period).or_default().push(obs.value);
    }

    groups
        .into_iter()
        .filter_map(|(period, values)| {
            let value = match policy {
                ReducePolicy::Mean => mean(&values)?,
                ReducePolicy::Last => *values.last()?,
            };
            Some((period, value))
        })
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
