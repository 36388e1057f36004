use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

use crate::indicators::yield_curve::YieldSpread;
use crate::indicators::DerivedIndicator;

// ============================================================================
// ENUMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    PolicyRates,          // CBR, repo, interbank
    GovernmentSecurities, // T-bills & T-bonds
    BankRates,            // commercial bank weighted averages
    Inflation,
}

// ============================================================================
// METADATA STRUCT
// ============================================================================

/// A selectable series: the short slug a caller asks for and the registry
/// label it resolves to.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesMetadata {
    pub slug: String,
    pub label: String,
    pub category: Category,
    pub source_id: String,
}

macro_rules! series {
    ($slug:expr, $label:expr, $cat:expr, $source:expr) => {
        SeriesMetadata {
            slug: $slug.to_string(),
            label: $label.to_string(),
            category: $cat,
            source_id: $source.to_string(),
        }
    };
}

// ============================================================================
// STATIC CATALOGUE (Lazy initialization, O(1) lookup)
// ============================================================================

static SERIES: Lazy<Vec<SeriesMetadata>> = Lazy::new(|| {
    use Category::*;
    vec![
        series!("cbk-benchmark", "Central Bank Rate", PolicyRates, "cbr"),
        series!("repo", "Repo Rate", PolicyRates, "repo"),
        series!("reverse-repo", "Reverse Repo Rate", PolicyRates, "repo"),
        series!("kesonia", "KESONIA (monthly avg)", PolicyRates, "kesonia"),
        series!("lending", "Lending", BankRates, "cbwar"),
        series!("overdraft", "Overdraft", BankRates, "cbwar"),
        series!("savings", "Savings", BankRates, "cbwar"),
        series!("deposit", "Deposit", BankRates, "cbwar"),
        series!("cpi-yoy", "12-Month Inflation", Inflation, "inflation"),
        series!("cpi-annual", "Annual Average Inflation", Inflation, "inflation"),
        series!("3-month", "91 Day Bill", GovernmentSecurities, "tbills"),
        series!("6-month", "182 Day Bill", GovernmentSecurities, "tbills"),
        series!("1-year", "364 Day Bill", GovernmentSecurities, "tbills"),
        series!("2-year", "2 Year Bond", GovernmentSecurities, "tbonds"),
        series!("3-year", "3 Year Bond", GovernmentSecurities, "tbonds"),
        series!("5-year", "5 Year Bond", GovernmentSecurities, "tbonds"),
        series!("10-year", "10 Year Bond", GovernmentSecurities, "tbonds"),
        series!("15-year", "15 Year Bond", GovernmentSecurities, "tbonds"),
        series!("20-year", "20 Year Bond", GovernmentSecurities, "tbonds"),
        series!("25-year", "25 Year Bond", GovernmentSecurities, "tbonds"),
    ]
});

static SERIES_MAP: Lazy<HashMap<String, usize>> = Lazy::new(|| {
    SERIES
        .iter()
        .enumerate()
        .map(|(idx, s)| (s.slug.clone(), idx))
        .collect()
});

static SPREADS: [YieldSpread; 6] = [
    YieldSpread::new("yield-10y-2y", "10Y - 2Y", "10 Year Bond", "2 Year Bond"),
    YieldSpread::new("yield-20y-2y", "20Y - 2Y", "20 Year Bond", "2 Year Bond"),
    YieldSpread::new("yield-15y-2y", "15Y - 2Y", "15 Year Bond", "2 Year Bond"),
    YieldSpread::new("yield-10y-3y", "10Y - 3Y", "10 Year Bond", "3 Year Bond"),
    YieldSpread::new("yield-20y-3y", "20Y - 3Y", "20 Year Bond", "3 Year Bond"),
    YieldSpread::new("yield-15y-3y", "15Y - 3Y", "15 Year Bond", "3 Year Bond"),
];

// ============================================================================
// CATALOGUE STRUCT & IMPL
// ============================================================================

pub struct Catalogue;

impl Catalogue {
    /// Every selectable series, in presentation order.
    pub fn get_all_series() -> &'static [SeriesMetadata] {
        &SERIES
    }

    pub fn get_by_category(category: Category) -> Vec<SeriesMetadata> {
        SERIES.iter().filter(|s| s.category == category).cloned().collect()
    }

    /// O(1) lookup by slug
    pub fn get_metadata(slug: &str) -> Option<&'static SeriesMetadata> {
        SERIES_MAP.get(slug).and_then(|&idx| SERIES.get(idx))
    }

    /// Map a slug to its registry label. Anything that is not a known slug is
    /// taken as a label already (currency codes, for instance).
    pub fn resolve_label(slug_or_label: &str) -> &str {
        match Self::get_metadata(slug_or_label) {
            Some(meta) => &meta.label,
            None => slug_or_label,
        }
    }

    pub fn spreads() -> &'static [YieldSpread] {
        &SPREADS
    }

    /// Look a spread up by slug or by its display name.
    pub fn get_spread(key: &str) -> Option<&'static YieldSpread> {
        SPREADS.iter().find(|s| s.slug == key || s.name == key)
    }

    /// Get calculator for derived series
    pub fn get_calculator(key: &str) -> Option<Box<dyn DerivedIndicator + Send + Sync>> {
        Self::get_spread(key).map(|s| Box::new(*s) as Box<dyn DerivedIndicator + Send + Sync>)
    }
}
