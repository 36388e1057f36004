use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::{Id, JoinSet};

use crate::core::period::{CalendarMonth, Period};
use crate::core::series_registry::SeriesRegistry;
use crate::error::Error;
use crate::extract::{extract_observations, Collision, ExtractionReport, SourceProfile};
use crate::fetcher::RowSource;
use crate::models::Row;

/// One series as this source produced it, before any later source touched
/// the same label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisteredSeries {
    pub label: String,
    pub periods: usize,
    pub first: Option<String>,
    pub last: Option<String>,
    /// Periods that reached the registry. Lower than `periods` only when the
    /// source fills gaps in a series registered earlier.
    pub added: usize,
}

/// What happened to one source during a load.
#[derive(Debug, Clone, Serialize)]
pub struct SourceOutcome {
    pub source_id: String,
    /// One entry per file that could not be fetched or parsed.
    pub load_errors: Vec<String>,
    pub extraction: ExtractionReport,
    /// Series this source registered, in registration order.
    pub registered: Vec<RegisteredSeries>,
}

impl SourceOutcome {
    pub fn labels(&self) -> Vec<&str> {
        self.registered.iter().map(|s| s.label.as_str()).collect()
    }
}

/// A fully populated registry plus per-source diagnostics.
#[derive(Debug)]
pub struct LoadOutcome<P: Period = CalendarMonth> {
    pub registry: SeriesRegistry<P>,
    pub sources: Vec<SourceOutcome>,
}

type FileResult = (usize, usize, anyhow::Result<Vec<Row>>);

/// Load every enabled profile and populate a registry.
///
/// All files are fetched concurrently. A file that fails contributes no rows;
/// the rest of its source and every other source carry on. Registration only
/// starts once every fetch has finished, and then runs in profile order, so
/// on a label collision the outcome never depends on which fetch finished
/// first.
pub async fn load_all<P: Period>(source: Arc<dyn RowSource>, profiles: &[SourceProfile]) -> LoadOutcome<P> {
    let enabled: Vec<&SourceProfile> = profiles.iter().filter(|p| p.enabled).collect();

    let mut tasks: JoinSet<FileResult> = JoinSet::new();
    let mut task_files: HashMap<Id, (usize, usize)> = HashMap::new();
    for (pi, profile) in enabled.iter().enumerate() {
        for (fi, file) in profile.files.iter().enumerate() {
            let source = Arc::clone(&source);
            let file = file.clone();
            let headers = profile.headers.clone();
            let handle = tasks.spawn(async move {
                let rows = source.fetch_rows(&file, headers.as_deref()).await;
                (pi, fi, rows)
            });
            task_files.insert(handle.id(), (pi, fi));
        }
    }

    // [profile][file] -> rows
    let mut fetched: Vec<Vec<Option<Vec<Row>>>> = enabled.iter().map(|p| vec![None; p.files.len()]).collect();
    let mut errors: Vec<Vec<String>> = vec![Vec::new(); enabled.len()];

    while let Some(joined) = tasks.join_next().await {
        let (pi, fi, failure) = match joined {
            Ok((pi, fi, Ok(rows))) => {
                tracing::info!(source = %enabled[pi].id, file = %enabled[pi].files[fi], rows = rows.len(), "loaded");
                fetched[pi][fi] = Some(rows);
                continue;
            }
            Ok((pi, fi, Err(e))) => (pi, fi, format!("{:#}", e)),
            Err(e) => match task_files.get(&e.id()) {
                Some(&(pi, fi)) => (pi, fi, format!("load task failed: {}", e)),
                None => {
                    tracing::warn!(error = %e, "load task failed");
                    continue;
                }
            },
        };
        let err = Error::SourceLoad {
            source_id: enabled[pi].id.clone(),
            message: format!("{}: {}", enabled[pi].files[fi], failure),
        };
        tracing::warn!("{}", err);
        errors[pi].push(err.to_string());
    }

    let mut registry = SeriesRegistry::new();
    let mut sources = Vec::with_capacity(enabled.len());

    for ((profile, files), load_errors) in enabled.iter().zip(fetched).zip(errors) {
        let rows: Vec<Row> = files.into_iter().flatten().flatten().collect();
        let (series, extraction) = extract_observations::<P>(profile, &rows).into_series(profile.reduce);

        let mut registered = Vec::with_capacity(series.len());
        for (label, values) in series {
            let periods = values.len();
            let first = values.keys().next().map(P::to_string);
            let last = values.keys().next_back().map(P::to_string);
            let added = match profile.on_collision {
                Collision::Replace => {
                    registry.register(label.clone(), values);
                    periods
                }
                Collision::FillGaps => registry.fill_gaps(label.clone(), values),
            };
            registered.push(RegisteredSeries {
                label,
                periods,
                first,
                last,
                added,
            });
        }

        tracing::info!(
            source = %profile.id,
            rows_read = extraction.rows_read,
            rows_used = extraction.rows_used,
            skipped = extraction.rows_skipped(),
            fallback_hits = extraction.fallback_hits.len(),
            series = registered.len(),
            "registered"
        );

        sources.push(SourceOutcome {
            source_id: profile.id.clone(),
            load_errors,
            extraction,
            registered,
        });
    }

    LoadOutcome { registry, sources }
}
