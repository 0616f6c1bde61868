// 🎯 KPI Tiles - Label / value / delta triples for the top row
//
// The three disbursement tiles are presentational literals and are NOT
// derived from the branch or monthly series. Only the price tile is
// computed (from the forecast series).

use crate::forecast::{ForecastSeries, InvalidSeriesError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeltaDirection {
    Up,
    Down,
    Neutral,
}

impl DeltaDirection {
    /// Infer direction from a delta string ("14.79% ↑", "-26.21% ↓", "Upward trend")
    pub fn infer(delta: &str) -> Self {
        let trimmed = delta.trim();
        if trimmed.starts_with('-') || trimmed.contains('↓') || trimmed.starts_with("Downward") {
            DeltaDirection::Down
        } else if trimmed.contains('↑') || trimmed.starts_with("Upward") || trimmed.starts_with('+') {
            DeltaDirection::Up
        } else {
            DeltaDirection::Neutral
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiTile {
    pub label: String,
    pub value: String,
    pub delta: String,
    pub direction: DeltaDirection,
}

impl KpiTile {
    pub fn new(label: &str, value: &str, delta: &str) -> Self {
        KpiTile {
            label: label.to_string(),
            value: value.to_string(),
            delta: delta.to_string(),
            direction: DeltaDirection::infer(delta),
        }
    }
}

/// The four KPI tiles shown in one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSnapshot {
    pub year: KpiTile,
    pub quarter: KpiTile,
    pub month: KpiTile,
    pub price_change: KpiTile,
}

impl KpiSnapshot {
    /// Reference tiles; the price tile is computed from `forecast`
    pub fn reference(forecast: &ForecastSeries) -> Result<Self, InvalidSeriesError> {
        Ok(KpiSnapshot {
            year: KpiTile::new("Total Disbursement (Year)", "KES 180k", "14.79% ↑"),
            quarter: KpiTile::new("Total Disbursement (Quarter)", "Ksh 134,906", "-26.21% ↓"),
            month: KpiTile::new("Total Disbursement (Month)", "Ksh 159,244", "23.36% ↑"),
            price_change: price_change_tile(forecast)?,
        })
    }

    /// Replace the price tile with one recomputed from `forecast`
    pub fn with_forecast(mut self, forecast: &ForecastSeries) -> Result<Self, InvalidSeriesError> {
        self.price_change = price_change_tile(forecast)?;
        Ok(self)
    }

    /// Tiles in display order
    pub fn tiles(&self) -> [&KpiTile; 4] {
        [&self.year, &self.quarter, &self.month, &self.price_change]
    }
}

/// "Expected Price Change (N Months)" tile, e.g. value "6.06%" and delta "Upward trend"
pub fn price_change_tile(forecast: &ForecastSeries) -> Result<KpiTile, InvalidSeriesError> {
    let change = forecast.percent_change()?;
    let trend = forecast.trend()?;

    Ok(KpiTile::new(
        &format!("Expected Price Change ({} Months)", forecast.len()),
        &format_percent(change),
        &trend.label(),
    ))
}

/// Percent text with whole numbers keeping one decimal ("10.0%", "6.06%")
pub fn format_percent(change: f64) -> String {
    if change.fract() == 0.0 {
        format!("{:.1}%", change)
    } else {
        format!("{}%", change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_snapshot() {
        let kpis = KpiSnapshot::reference(&ForecastSeries::reference()).unwrap();

        assert_eq!(kpis.year.value, "KES 180k");
        assert_eq!(kpis.quarter.direction, DeltaDirection::Down);
        assert_eq!(kpis.month.direction, DeltaDirection::Up);
        assert_eq!(kpis.price_change.label, "Expected Price Change (5 Months)");
        assert_eq!(kpis.price_change.value, "6.06%");
        assert_eq!(kpis.price_change.delta, "Upward trend");
        assert_eq!(kpis.price_change.direction, DeltaDirection::Up);
        assert_eq!(kpis.tiles().len(), 4);
    }

    #[test]
    fn test_invalid_forecast_propagates() {
        let forecast = ForecastSeries::from_pairs(&["M+1"], &[1.0]);
        assert!(KpiSnapshot::reference(&forecast).is_err());
    }

    #[test]
    fn test_with_forecast_recomputes_price_tile() {
        let kpis = KpiSnapshot::reference(&ForecastSeries::reference()).unwrap();
        let falling = ForecastSeries::from_pairs(&["M+1", "M+2", "M+3"], &[100.0, 90.0, 80.0]);
        let kpis = kpis.with_forecast(&falling).unwrap();

        assert_eq!(kpis.price_change.label, "Expected Price Change (3 Months)");
        assert_eq!(kpis.price_change.value, "-20.0%");
        assert_eq!(kpis.price_change.delta, "Downward trend");
        assert_eq!(kpis.price_change.direction, DeltaDirection::Down);
        assert_eq!(kpis.year.value, "KES 180k");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(6.06), "6.06%");
        assert_eq!(format_percent(10.0), "10.0%");
        assert_eq!(format_percent(-20.0), "-20.0%");
        assert_eq!(format_percent(0.0), "0.0%");
        assert_eq!(format_percent(-0.5), "-0.5%");
    }

    #[test]
    fn test_infer_direction() {
        assert_eq!(DeltaDirection::infer("14.79% ↑"), DeltaDirection::Up);
        assert_eq!(DeltaDirection::infer("-26.21% ↓"), DeltaDirection::Down);
        assert_eq!(DeltaDirection::infer("Flat trend"), DeltaDirection::Neutral);
    }
}
