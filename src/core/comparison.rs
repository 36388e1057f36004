use serde::{Deserialize, Serialize};

use crate::core::period::{CalendarMonth, Period};
use crate::core::series_registry::SeriesRegistry;
use crate::core::timeseries::{align, Timeline};
use crate::error::{Error, Result};
use crate::indicators::catalogue::Catalogue;
use crate::indicators::DerivedIndicator;
use crate::models::{AlignedSeries, ChartData};

/// What a caller wants drawn: series by slug or label, spreads by slug or name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub series: Vec<String>,
    #[serde(default)]
    pub spreads: Vec<String>,
}

/// The query side: a frozen registry plus the timeline built from it.
///
/// Construction consumes the registry, so nothing can be registered after the
/// timeline exists.
#[derive(Debug, Clone)]
pub struct Comparison<P: Period = CalendarMonth> {
    registry: SeriesRegistry<P>,
    timeline: Timeline<P>,
}

impl<P: Period> Comparison<P> {
    pub fn new(registry: SeriesRegistry<P>) -> Self {
        let timeline = Timeline::build(&registry);
        match (timeline.first(), timeline.last()) {
            (Some(first), Some(last)) => tracing::info!(
                series = registry.len(),
                periods = timeline.len(),
                "timeline {} .. {}",
                first,
                last
            ),
            _ => tracing::info!(series = registry.len(), "timeline is empty"),
        }
        Self { registry, timeline }
    }

    pub fn timeline(&self) -> &Timeline<P> {
        &self.timeline
    }

    pub fn registry(&self) -> &SeriesRegistry<P> {
        &self.registry
    }

    /// The registered series laid over the timeline, or `None` if the label
    /// was never registered.
    pub fn aligned(&self, label: &str) -> Option<AlignedSeries> {
        self.registry.get(label).map(|s| align(s, &self.timeline))
    }

    /// `None` when any required input is not registered.
    pub fn derived(&self, indicator: &dyn DerivedIndicator) -> Result<Option<AlignedSeries>> {
        let inputs: Option<Vec<AlignedSeries>> = indicator
            .required_inputs()
            .into_iter()
            .map(|label| self.aligned(label))
            .collect();
        match inputs {
            Some(inputs) => indicator.calculate(&inputs).map(Some),
            None => Ok(None),
        }
    }

    /// Series first, in selection order, then spreads. Unregistered series and
    /// spreads missing a leg are left out; an unknown spread name is an error.
    pub fn chart(&self, selection: &Selection) -> Result<ChartData> {
        let mut series = Vec::new();

        for key in &selection.series {
            let label = Catalogue::resolve_label(key);
            match self.aligned(label) {
                Some(aligned) => series.push(aligned),
                None => tracing::info!(series = %label, "not registered, skipped"),
            }
        }

        for key in &selection.spreads {
            let indicator = Catalogue::get_calculator(key).ok_or_else(|| Error::UnknownSeries(key.clone()))?;
            match self.derived(indicator.as_ref())? {
                Some(aligned) => series.push(aligned),
                None => tracing::info!(spread = %indicator.name(), "missing a leg, skipped"),
            }
        }

        Ok(ChartData {
            labels: self.timeline.labels(),
            series,
        })
    }
}
