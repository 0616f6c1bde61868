// 📊 Dashboard Data - Everything one render needs, built fresh per load
//
// Sources:
// - StaticSource: reference literals (optionally with a seeded mock matrix)
// - JsonFileSource: a DashboardData-shaped JSON document on disk
//
// Hosts (TUI, HTTP) only ever see DashboardData through DashboardSource,
// so the literals can be swapped for a real feed without touching them.

use crate::config::{Config, MatrixMode, SourceKind};
use crate::disbursement::{sort_descending, BranchDisbursement, MonthlySeries, StatusMatrix};
use crate::forecast::{ForecastSeries, InvalidSeriesError};
use crate::insights::Insights;
use crate::kpi::KpiSnapshot;
use crate::validation;
use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub forecast: ForecastSeries,
    pub branches: Vec<BranchDisbursement>,
    pub status_matrix: StatusMatrix,
    pub monthly_series: MonthlySeries,
    pub kpis: KpiSnapshot,
    #[serde(default)]
    pub insights: Insights,
}

impl DashboardData {
    /// Percentage change of the forecast series
    pub fn price_change(&self) -> Result<f64, InvalidSeriesError> {
        self.forecast.percent_change()
    }
}

/// Reference dashboard: all literal datasets plus the computed price tile
pub fn load_dashboard_data() -> Result<DashboardData, InvalidSeriesError> {
    build_reference(StatusMatrix::reference())
}

fn build_reference(status_matrix: StatusMatrix) -> Result<DashboardData, InvalidSeriesError> {
    let forecast = ForecastSeries::reference();
    let kpis = KpiSnapshot::reference(&forecast)?;

    Ok(DashboardData {
        forecast,
        branches: BranchDisbursement::reference(),
        status_matrix,
        monthly_series: MonthlySeries::reference(),
        kpis,
        insights: Insights::reference(),
    })
}

// ============================================================================
// SOURCES
// ============================================================================

/// Anything that can produce a fresh DashboardData per render
pub trait DashboardSource: Send + Sync {
    fn name(&self) -> &str;

    fn load(&self) -> Result<DashboardData>;
}

/// Reference literals
pub struct StaticSource {
    /// Seed for a generated mock matrix; None keeps the literal table
    matrix_seed: Option<u64>,
}

impl StaticSource {
    pub fn new() -> Self {
        StaticSource { matrix_seed: None }
    }

    pub fn with_seeded_matrix(seed: u64) -> Self {
        StaticSource {
            matrix_seed: Some(seed),
        }
    }
}

impl Default for StaticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    fn load(&self) -> Result<DashboardData> {
        let matrix = match self.matrix_seed {
            Some(seed) => StatusMatrix::generate(&mut StdRng::seed_from_u64(seed)),
            None => StatusMatrix::reference(),
        };

        Ok(build_reference(matrix)?)
    }
}

/// DashboardData read from a JSON file on every load
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        JsonFileSource { path: path.into() }
    }
}

impl DashboardSource for JsonFileSource {
    fn name(&self) -> &str {
        "json"
    }

    fn load(&self) -> Result<DashboardData> {
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read dashboard data {}", self.path.display()))?;

        let data: DashboardData = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid dashboard JSON in {}", self.path.display()))?;

        // The price tile always reflects the file's own forecast
        let kpis = data.kpis.clone().with_forecast(&data.forecast)?;
        let mut data = DashboardData { kpis, ..data };

        // Branch bars render in descending order whatever order the feed uses
        sort_descending(&mut data.branches);

        let report = validation::validate(&data);
        for failure in report.failures() {
            tracing::warn!(rule = %failure.rule, "{}", failure.message);
        }
        if report.has_critical() {
            bail!(
                "Dashboard data in {} failed validation: {}",
                self.path.display(),
                report.summary()
            );
        }

        Ok(data)
    }
}

/// Build the source selected by configuration
pub fn source_from_config(config: &Config) -> Result<Box<dyn DashboardSource>> {
    match config.data.source {
        SourceKind::Static => Ok(match config.data.status_matrix.mode {
            MatrixMode::Literal => Box::new(StaticSource::new()),
            MatrixMode::Seeded => {
                Box::new(StaticSource::with_seeded_matrix(config.data.status_matrix.seed))
            }
        }),
        SourceKind::Json => {
            let path = config
                .data
                .path
                .clone()
                .context("data.path is required when data.source = \"json\"")?;
            Ok(Box::new(JsonFileSource::new(path)))
        }
    }
}

/// Write a DashboardData as pretty JSON (input format of JsonFileSource)
pub fn write_json(data: &DashboardData, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MatrixConfig, SourceKind};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sme_analytics_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_load_dashboard_data() {
        let data = load_dashboard_data().unwrap();

        assert_eq!(data.forecast.len(), 5);
        assert_eq!(data.branches.len(), 9);
        assert_eq!(data.status_matrix.cells().len(), 16);
        assert_eq!(data.monthly_series.len(), 11);
        assert_eq!(data.kpis.price_change.value, "6.06%");
        assert_eq!(data.price_change(), Ok(6.06));
    }

    #[test]
    fn test_static_source_matches_reference() {
        let data = StaticSource::new().load().unwrap();
        assert_eq!(data, load_dashboard_data().unwrap());
    }

    #[test]
    fn test_seeded_source_is_reproducible() {
        let a = StaticSource::with_seeded_matrix(7).load().unwrap();
        let b = StaticSource::with_seeded_matrix(7).load().unwrap();
        assert_eq!(a.status_matrix, b.status_matrix);
        assert_ne!(a.status_matrix, StatusMatrix::reference());
    }

    #[test]
    fn test_json_source_round_trip() {
        let path = temp_path("round_trip.json");
        let data = load_dashboard_data().unwrap();
        write_json(&data, &path).unwrap();

        let loaded = JsonFileSource::new(&path).load().unwrap();
        assert_eq!(loaded, data);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_json_source_recomputes_price_tile() {
        let path = temp_path("recompute.json");
        let mut data = load_dashboard_data().unwrap();
        data.forecast = ForecastSeries::from_pairs(&["M+1", "M+2"], &[100.0, 110.0]);
        write_json(&data, &path).unwrap();

        let loaded = JsonFileSource::new(&path).load().unwrap();
        assert_eq!(loaded.kpis.price_change.value, "10.0%");
        assert_eq!(loaded.kpis.price_change.label, "Expected Price Change (2 Months)");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_json_source_sorts_branches() {
        let path = temp_path("unsorted.json");
        let mut data = load_dashboard_data().unwrap();
        data.branches.reverse();
        write_json(&data, &path).unwrap();

        let loaded = JsonFileSource::new(&path).load().unwrap();
        assert_eq!(loaded.branches, BranchDisbursement::reference());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_json_source_rejects_invalid_forecast() {
        let path = temp_path("invalid.json");
        let mut data = load_dashboard_data().unwrap();
        data.forecast = ForecastSeries::from_pairs(&["M+1", "M+2"], &[0.0, 110.0]);
        write_json(&data, &path).unwrap();

        let err = JsonFileSource::new(&path).load().unwrap_err();
        assert!(err.downcast_ref::<InvalidSeriesError>().is_some());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_json_source_missing_file() {
        let result = JsonFileSource::new(temp_path("missing.json")).load();
        assert!(result.is_err());
    }

    #[test]
    fn test_source_from_config() {
        let mut config = Config::default();
        assert_eq!(source_from_config(&config).unwrap().name(), "static");

        config.data.status_matrix = MatrixConfig {
            mode: MatrixMode::Seeded,
            seed: 1,
        };
        assert_eq!(source_from_config(&config).unwrap().name(), "static");

        config.data.source = SourceKind::Json;
        assert_eq!(source_from_config(&config).unwrap().name(), "json");

        config.data.path = None;
        assert!(source_from_config(&config).is_err());
    }
}
