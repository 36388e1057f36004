use crate::error::Result;
use crate::models::AlignedSeries;

pub mod catalogue;
pub mod yield_curve;

/// A series computed from other, already aligned series.
pub trait DerivedIndicator {
    /// Returns the unique slug (e.g., "yield-10y-2y")
    fn slug(&self) -> &str;

    /// Returns the display name, also used as the output label
    fn name(&self) -> &str;

    /// Labels of the registered series this indicator reads, in the order
    /// `calculate` expects them.
    fn required_inputs(&self) -> Vec<&str>;

    /// Calculate over inputs laid on one shared timeline.
    fn calculate(&self, inputs: &[AlignedSeries]) -> Result<AlignedSeries>;
}
