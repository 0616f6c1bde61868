// 📈 Market Price Forecast - Ordered predictions + percentage change
//
// Formula:
//   percent_change = round(100 * (last - first) / first, 2)
//
// The series must have at least two points and a non-zero first price,
// otherwise the change is undefined and we return InvalidSeriesError.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

/// Errors raised when a forecast series cannot produce a percentage change
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvalidSeriesError {
    #[error("forecast series needs at least 2 points, got {len}")]
    InsufficientData { len: usize },

    #[error("forecast series starts at a zero price, percentage change is undefined")]
    ZeroBaseline,

    #[error("forecast price at index {index} is not a finite number")]
    NonFinite { index: usize },

    #[error("percentage change overflows the f64 range")]
    Overflow,
}

// ============================================================================
// FORECAST POINT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Relative month label (e.g. "M+1")
    pub month_label: String,

    pub predicted_price: f64,
}

impl ForecastPoint {
    pub fn new(month_label: &str, predicted_price: f64) -> Self {
        ForecastPoint {
            month_label: month_label.to_string(),
            predicted_price,
        }
    }
}

// ============================================================================
// TREND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Upward,
    Downward,
    Flat,
}

impl Trend {
    pub fn from_change(percent_change: f64) -> Self {
        if percent_change > 0.0 {
            Trend::Upward
        } else if percent_change < 0.0 {
            Trend::Downward
        } else {
            Trend::Flat
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Upward => "Upward",
            Trend::Downward => "Downward",
            Trend::Flat => "Flat",
        }
    }

    /// KPI delta text, e.g. "Upward trend"
    pub fn label(&self) -> String {
        format!("{} trend", self.as_str())
    }
}

// ============================================================================
// FORECAST SERIES
// ============================================================================

/// Chronologically ordered forecast points
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastSeries {
    pub points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    pub fn new(points: Vec<ForecastPoint>) -> Self {
        ForecastSeries { points }
    }

    /// Build a series from parallel label/price slices (extra entries are ignored)
    pub fn from_pairs(labels: &[&str], prices: &[f64]) -> Self {
        let points = labels
            .iter()
            .zip(prices.iter())
            .map(|(label, price)| ForecastPoint::new(label, *price))
            .collect();

        ForecastSeries { points }
    }

    /// Reference market price forecast for the next five months
    pub fn reference() -> Self {
        ForecastSeries::from_pairs(
            &["M+1", "M+2", "M+3", "M+4", "M+5"],
            &[145.2, 147.8, 150.5, 152.1, 154.0],
        )
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&ForecastPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&ForecastPoint> {
        self.points.last()
    }

    pub fn percent_change(&self) -> Result<f64, InvalidSeriesError> {
        compute_percent_change(self)
    }

    pub fn trend(&self) -> Result<Trend, InvalidSeriesError> {
        self.percent_change().map(Trend::from_change)
    }
}

// ============================================================================
// METRIC
// ============================================================================

/// Percentage change from the first to the last forecast price, rounded to 2 decimals
///
/// Example:
/// ```
/// use sme_analytics::{compute_percent_change, ForecastSeries};
///
/// let series = ForecastSeries::reference();
/// assert_eq!(compute_percent_change(&series).unwrap(), 6.06);
/// ```
pub fn compute_percent_change(series: &ForecastSeries) -> Result<f64, InvalidSeriesError> {
    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) if series.len() >= 2 => (first, last),
        _ => return Err(InvalidSeriesError::InsufficientData { len: series.len() }),
    };

    if let Some(index) = series
        .points
        .iter()
        .position(|p| !p.predicted_price.is_finite())
    {
        return Err(InvalidSeriesError::NonFinite { index });
    }

    if first.predicted_price == 0.0 {
        return Err(InvalidSeriesError::ZeroBaseline);
    }

    let change = (last.predicted_price - first.predicted_price) / first.predicted_price * 100.0;
    if !change.is_finite() {
        return Err(InvalidSeriesError::Overflow);
    }

    let rounded = round2(change);
    if !rounded.is_finite() {
        return Err(InvalidSeriesError::Overflow);
    }

    Ok(rounded)
}

/// Round to 2 decimal places, exact ties go to the even digit (0.125 -> 0.12)
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reference_series_change() {
        let series = ForecastSeries::reference();
        assert_eq!(series.len(), 5);
        assert_eq!(compute_percent_change(&series), Ok(6.06));
    }

    #[test]
    fn test_single_point_is_rejected() {
        let series = ForecastSeries::from_pairs(&["M+1"], &[145.2]);
        assert_eq!(
            compute_percent_change(&series),
            Err(InvalidSeriesError::InsufficientData { len: 1 })
        );
    }

    #[test]
    fn test_empty_series_is_rejected() {
        let series = ForecastSeries::default();
        assert_eq!(
            compute_percent_change(&series),
            Err(InvalidSeriesError::InsufficientData { len: 0 })
        );
    }

    #[test]
    fn test_zero_baseline_is_rejected() {
        let series = ForecastSeries::from_pairs(&["M+1", "M+2"], &[0.0, 10.0]);
        assert_eq!(
            compute_percent_change(&series),
            Err(InvalidSeriesError::ZeroBaseline)
        );
    }

    #[test]
    fn test_non_finite_price_is_rejected() {
        let series = ForecastSeries::from_pairs(&["M+1", "M+2", "M+3"], &[10.0, f64::NAN, 12.0]);
        assert_eq!(
            compute_percent_change(&series),
            Err(InvalidSeriesError::NonFinite { index: 1 })
        );
    }

    #[test]
    fn test_tiny_baseline_overflow_is_rejected() {
        let series = ForecastSeries::from_pairs(&["M+1", "M+2"], &[1e-308, 1e10]);
        assert_eq!(
            compute_percent_change(&series),
            Err(InvalidSeriesError::Overflow)
        );
    }

    #[test]
    fn test_huge_last_price_overflow_is_rejected() {
        let series = ForecastSeries::from_pairs(&["M+1", "M+2"], &[1.0, 1e307]);
        assert_eq!(
            compute_percent_change(&series),
            Err(InvalidSeriesError::Overflow)
        );
    }

    #[test]
    fn test_exact_tie_rounds_to_even() {
        let series = ForecastSeries::from_pairs(&["M+1", "M+2"], &[800.0, 801.0]);
        assert_eq!(compute_percent_change(&series), Ok(0.12));

        let series = ForecastSeries::from_pairs(&["M+1", "M+2"], &[800.0, 799.0]);
        assert_eq!(compute_percent_change(&series), Ok(-0.12));
    }

    #[test]
    fn test_downward_change_is_negative() {
        let series = ForecastSeries::from_pairs(&["M+1", "M+2"], &[200.0, 150.0]);
        assert_eq!(series.percent_change(), Ok(-25.0));
        assert_eq!(series.trend(), Ok(Trend::Downward));
    }

    #[test]
    fn test_trend_labels() {
        assert_eq!(ForecastSeries::reference().trend(), Ok(Trend::Upward));
        assert_eq!(Trend::Upward.label(), "Upward trend");
        assert_eq!(Trend::from_change(0.0), Trend::Flat);
    }

    #[test]
    fn test_idempotent() {
        let series = ForecastSeries::reference();
        let a = compute_percent_change(&series);
        let b = compute_percent_change(&series);
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_change_is_finite_and_two_decimals(
            first in 0.01f64..10_000.0,
            rest in proptest::collection::vec(0.0f64..10_000.0, 1..12),
        ) {
            let mut prices = vec![first];
            prices.extend(rest);
            let labels: Vec<String> = (1..=prices.len()).map(|i| format!("M+{}", i)).collect();
            let label_refs: Vec<&str> = labels.iter().map(|s| s.as_str()).collect();
            let series = ForecastSeries::from_pairs(&label_refs, &prices);

            let change = compute_percent_change(&series).unwrap();
            prop_assert!(change.is_finite());
            prop_assert_eq!(round2(change), change);
            prop_assert_eq!(compute_percent_change(&series).unwrap(), change);
        }

        #[test]
        fn prop_extreme_prices_never_yield_non_finite(
            first in proptest::num::f64::NORMAL | proptest::num::f64::SUBNORMAL,
            last in proptest::num::f64::NORMAL | proptest::num::f64::SUBNORMAL | proptest::num::f64::ZERO,
        ) {
            let series = ForecastSeries::from_pairs(&["M+1", "M+2"], &[first, last]);
            match compute_percent_change(&series) {
                Ok(change) => prop_assert!(change.is_finite()),
                Err(e) => prop_assert_eq!(e, InvalidSeriesError::Overflow),
            }
        }

        #[test]
        fn prop_sign_follows_direction(first in 1.0f64..1_000.0, last in 1.0f64..1_000.0) {
            let series = ForecastSeries::from_pairs(&["M+1", "M+2"], &[first, last]);
            let change = compute_percent_change(&series).unwrap();
            if last > first {
                prop_assert!(change >= 0.0);
            } else {
                prop_assert!(change <= 0.0);
            }
        }
    }
}
