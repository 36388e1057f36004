use super::DerivedIndicator;
use crate::core::timeseries::diff_labeled;
use crate::error::{Error, Result};
use crate::models::AlignedSeries;

/// Difference between two bond tenors (long leg minus short leg).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YieldSpread {
    pub slug: &'static str,
    pub name: &'static str,
    pub long_leg: &'static str,
    pub short_leg: &'static str,
}

impl YieldSpread {
    pub const fn new(slug: &'static str, name: &'static str, long_leg: &'static str, short_leg: &'static str) -> Self {
        Self {
            slug,
            name,
            long_leg,
            short_leg,
        }
    }
}

impl DerivedIndicator for YieldSpread {
    fn slug(&self) -> &str {
        self.slug
    }
    fn name(&self) -> &str {
        self.name
    }
    fn required_inputs(&self) -> Vec<&str> {
        vec![self.long_leg, self.short_leg]
    }
    fn calculate(&self, inputs: &[AlignedSeries]) -> Result<AlignedSeries> {
        calculate_spread(inputs, self.name)
    }
}

/// Spread between two aligned series (A - B). No data on either side gives
/// no data in the result.
fn calculate_spread(inputs: &[AlignedSeries], label: &str) -> Result<AlignedSeries> {
    match inputs {
        [a, b] => diff_labeled(a, b, label),
        _ => Err(Error::Config(format!(
            "spread '{}' requires 2 inputs, got {}",
            label,
            inputs.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEN_TWO: YieldSpread = YieldSpread::new("yield-10y-2y", "10Y - 2Y", "10 Year Bond", "2 Year Bond");

    #[test]
    fn test_spread_is_long_minus_short() {
        let long = AlignedSeries::new("10 Year Bond", vec![None, Some(13.5), Some(14.0)]);
        let short = AlignedSeries::new("2 Year Bond", vec![Some(9.0), Some(10.0), None]);
        let out = TEN_TWO.calculate(&[long, short]).unwrap();

        assert_eq!(out.label, "10Y - 2Y");
        assert_eq!(out.values[0], None);
        assert!((out.values[1].unwrap() - 3.5).abs() < 1e-9);
        assert_eq!(out.values[2], None);
    }

    #[test]
    fn test_spread_inputs_in_leg_order() {
        assert_eq!(TEN_TWO.required_inputs(), vec!["10 Year Bond", "2 Year Bond"]);
        assert_eq!(TEN_TWO.slug(), "yield-10y-2y");
    }

    #[test]
    fn test_spread_wrong_arity() {
        let only = AlignedSeries::new("10 Year Bond", vec![Some(1.0)]);
        assert!(TEN_TWO.calculate(&[only]).is_err());
    }
}
