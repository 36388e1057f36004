//! Configuration.
//!
//! Settings are layered, highest priority first:
//!
//! 1. Command-line flags
//! 2. Environment variables (`RATES_CONFIG`, `RATES_DATA_DIR`, `RATES_BASE_URL`),
//!    including a `.env` file in the working directory
//! 3. TOML configuration file
//! 4. Built-in defaults
//!
//! Flags and environment are merged by clap; the file is read afterwards and
//! only fills what neither supplied.

use clap::{Args, ValueEnum};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::comparison::Selection;
use crate::core::dates::DateOrder;
use crate::core::reducer::ReducePolicy;
use crate::error::{Error, Result};
use crate::extract::{profiles, Collision, DateColumns, SourceProfile};
use crate::indicators::catalogue::Catalogue;
use crate::indicators::DerivedIndicator;

/// Looked for in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "rates.toml";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_DECIMALS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Month,
    Day,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

/// Where to find the data. Shared by every binary.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// TOML configuration file
    #[arg(long, env = "RATES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the CSV exports
    #[arg(long, env = "RATES_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Fetch files from this URL instead of the data directory
    #[arg(long, env = "RATES_BASE_URL")]
    pub base_url: Option<String>,

    /// Timeline bucket size
    #[arg(long, value_enum)]
    pub granularity: Option<Granularity>,
}

/// What to print.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Series slug or label (repeatable), e.g. `cbk-benchmark`, `10-year`, `USD`
    #[arg(long = "series")]
    pub series: Vec<String>,

    /// Yield spread slug or name (repeatable), e.g. `yield-10y-2y`
    #[arg(long = "spread")]
    pub spreads: Vec<String>,

    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Decimal places in table output
    #[arg(long)]
    pub decimals: Option<usize>,
}

/// Per-source adjustments to a built-in profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceOverride {
    pub date_order: Option<DateOrder>,
    pub reduce: Option<ReducePolicy>,
    pub fallback_scan: Option<bool>,
    pub files: Option<Vec<String>>,
    pub on_collision: Option<Collision>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    pub format: Option<OutputFormat>,
    pub decimals: Option<usize>,
}

/// The TOML file as written. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub data_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub granularity: Option<Granularity>,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub selection: Selection,
    /// Keyed by source id (`tbills`, `cbr`, ...).
    #[serde(default)]
    pub sources: BTreeMap<String, SourceOverride>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&text)
    }

    /// An explicit path must exist; otherwise `rates.toml` is used if present.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub base_url: Option<String>,
    pub granularity: Granularity,
    pub format: OutputFormat,
    pub decimals: usize,
    pub selection: Selection,
    pub profiles: Vec<SourceProfile>,
}

impl AppConfig {
    /// Read the config file named by `source` (if any) and merge.
    pub fn load(source: &SourceArgs, output: &OutputArgs) -> Result<Self> {
        let file = FileConfig::discover(source.config.as_deref())?;
        Self::resolve(file, source, output)
    }

    pub fn resolve(file: FileConfig, source: &SourceArgs, output: &OutputArgs) -> Result<Self> {
        let selection = if output.series.is_empty() && output.spreads.is_empty() {
            if file.selection == Selection::default() {
                default_selection()
            } else {
                file.selection
            }
        } else {
            Selection {
                series: output.series.clone(),
                spreads: output.spreads.clone(),
            }
        };

        Ok(Self {
            data_dir: source
                .data_dir
                .clone()
                .or(file.data_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            base_url: source.base_url.clone().or(file.base_url),
            granularity: source.granularity.or(file.granularity).unwrap_or_default(),
            format: output.format.or(file.output.format).unwrap_or_default(),
            decimals: output.decimals.or(file.output.decimals).unwrap_or(DEFAULT_DECIMALS),
            selection,
            profiles: apply_overrides(profiles::builtin(), &file.sources)?,
        })
    }
}

/// Every catalogued series and every spread.
pub fn default_selection() -> Selection {
    Selection {
        series: Catalogue::get_all_series().iter().map(|s| s.slug.clone()).collect(),
        spreads: Catalogue::spreads().iter().map(|s| s.slug().to_string()).collect(),
    }
}

/// Apply per-source overrides. An override naming an unknown source is an
/// error rather than silently ignored.
pub fn apply_overrides(
    mut profiles: Vec<SourceProfile>,
    overrides: &BTreeMap<String, SourceOverride>,
) -> Result<Vec<SourceProfile>> {
    for (id, o) in overrides {
        let profile = profiles
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| Error::Config(format!("unknown source '{}'", id)))?;

        if let Some(new_order) = o.date_order {
            match &mut profile.date {
                DateColumns::Single { order, .. } => *order = new_order,
                DateColumns::MonthYear { .. } => {
                    return Err(Error::Config(format!(
                        "source '{}' uses month/year columns; date_order does not apply",
                        id
                    )))
                }
            }
        }
        if let Some(reduce) = o.reduce {
            profile.reduce = reduce;
        }
        if let Some(fallback) = o.fallback_scan {
            profile.fallback_scan = fallback;
        }
        if let Some(files) = &o.files {
            if files.is_empty() {
                return Err(Error::Config(format!("source '{}': files must not be empty", id)));
            }
            profile.files = files.clone();
        }
        if let Some(collision) = o.on_collision {
            profile.on_collision = collision;
        }
        if let Some(enabled) = o.enabled {
            profile.enabled = enabled;
        }
    }
    Ok(profiles)
}
