pub mod comparison;
pub mod dates;
pub mod numeric;
pub mod orchestrator;
pub mod period;
pub mod reducer;
pub mod series_registry;
pub mod timeseries;
