//! Built-in source profiles for the Central Bank data exports.
//!
//! Order matters: sources register in this order, so on a label collision the
//! later profile wins. The trade-weighted FX file is the exception: it
//! continues the history file's currencies, filling only the months history
//! lacks.

use once_cell::sync::Lazy;

use super::{Collision, DateColumns, LabelRule, PrefixFilter, SourceProfile, ValueColumn};
use crate::core::dates::DateOrder;
use crate::core::reducer::ReducePolicy;

/// Column layout of the header-less FX history export.
pub const FX_HISTORY_HEADERS: [&str; 5] = ["Date", "Currency", "Mean", "Buy", "Sell"];

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn fixed(label: &str, candidates: &[&str]) -> ValueColumn {
    ValueColumn {
        label: LabelRule::Fixed {
            label: label.to_string(),
        },
        candidates: names(candidates),
    }
}

fn dated(candidates: &[&str], order: DateOrder) -> DateColumns {
    DateColumns::Single {
        candidates: names(candidates),
        order,
    }
}

fn profile(id: &str, files: &[&str], date: DateColumns, columns: Vec<ValueColumn>) -> SourceProfile {
    SourceProfile {
        id: id.to_string(),
        files: names(files),
        headers: None,
        date,
        columns,
        filter: None,
        reduce: ReducePolicy::Mean,
        fallback_scan: false,
        on_collision: Collision::Replace,
        enabled: true,
    }
}

static PROFILES: Lazy<Vec<SourceProfile>> = Lazy::new(|| {
    let issue_date = ["Issue Date", "Date"];
    let plain_date = ["Date", "DATE"];

    vec![
        SourceProfile {
            fallback_scan: true,
            ..profile(
                "tbills",
                &["Treasury Bills Average Rates.csv"],
                dated(&issue_date, DateOrder::Auto),
                vec![ValueColumn {
                    label: LabelRule::Tenor {
                        candidates: names(&["Tenor"]),
                        suffix: " Day Bill".to_string(),
                    },
                    candidates: names(&["Weighted Average Rate", "WeightedAverageRate", "Weighted Avg Rate"]),
                }],
            )
        },
        SourceProfile {
            fallback_scan: true,
            filter: Some(PrefixFilter {
                candidates: names(&["Issue No", "IssueNo", "Issue_Number"]),
                prefix: "FXD".to_string(),
            }),
            ..profile(
                "tbonds",
                &["Issues of Treasury Bonds.csv"],
                dated(&issue_date, DateOrder::Auto),
                vec![ValueColumn {
                    label: LabelRule::Tenor {
                        candidates: names(&["Tenor"]),
                        suffix: " Year Bond".to_string(),
                    },
                    candidates: names(&["Coupon Rate", "CouponRate", "Coupon"]),
                }],
            )
        },
        SourceProfile {
            fallback_scan: true,
            ..profile(
                "repo",
                &["Repo and Reverse Repo.csv"],
                dated(&plain_date, DateOrder::Auto),
                vec![
                    fixed("Repo Rate", &["Repo"]),
                    fixed("Reverse Repo Rate", &["Reverse Repo", "ReverseRepo"]),
                ],
            )
        },
        SourceProfile {
            fallback_scan: true,
            ..profile(
                "kesonia",
                &["Interbank Rates.csv", "KESONIA.csv"],
                dated(&plain_date, DateOrder::Auto),
                vec![fixed("KESONIA (monthly avg)", &["Rate", "KESONIA"])],
            )
        },
        SourceProfile {
            fallback_scan: true,
            ..profile(
                "cbr",
                &["Central Bank Rate (CBR).csv"],
                dated(&plain_date, DateOrder::Auto),
                vec![fixed("Central Bank Rate", &["Rate", "CBR"])],
            )
        },
        profile(
            "inflation",
            &["Inflation Rates.csv"],
            DateColumns::MonthYear {
                month: "Month".to_string(),
                year: "Year".to_string(),
            },
            vec![
                fixed("12-Month Inflation", &["12-Month Inflation"]),
                fixed("Annual Average Inflation", &["Annual Average Inflation"]),
            ],
        ),
        profile(
            "cbwar",
            &["Commercial Banks Weighted Average Rates.csv"],
            DateColumns::MonthYear {
                month: "Month".to_string(),
                year: "Year".to_string(),
            },
            vec![
                fixed("Deposit", &["Deposit"]),
                fixed("Savings", &["Savings"]),
                fixed("Lending", &["Lending"]),
                fixed("Overdraft", &["Overdraft"]),
            ],
        ),
        SourceProfile {
            headers: Some(names(&FX_HISTORY_HEADERS)),
            ..profile(
                "fx_history",
                &["historical_data.csv"],
                dated(&["Date"], DateOrder::MonthDayYear),
                vec![ValueColumn {
                    label: LabelRule::Keyed {
                        candidates: names(&["Currency"]),
                    },
                    candidates: names(&["Mean"]),
                }],
            )
        },
        SourceProfile {
            on_collision: Collision::FillGaps,
            ..profile(
                "fx_trade_weighted",
                &["TRADE WEIGHTED AVERAGE INDICATIVE RATES.csv"],
                dated(&["Date"], DateOrder::DayMonthYear),
                vec![ValueColumn {
                    label: LabelRule::Keyed {
                        candidates: names(&["Currency"]),
                    },
                    candidates: names(&["EXCHANGE RATE"]),
                }],
            )
        },
    ]
});

/// The full built-in catalogue, in registration order.
pub fn builtin() -> Vec<SourceProfile> {
    PROFILES.clone()
}

/// One built-in profile by id.
pub fn find(id: &str) -> Option<SourceProfile> {
    PROFILES.iter().find(|p| p.id == id).cloned()
}
