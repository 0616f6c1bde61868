// SME Analytics - Core Library
// Data model, forecast metric and view models shared by the TUI, API server and tests

pub mod forecast;
pub mod disbursement;
pub mod kpi;
pub mod insights;
pub mod dashboard;
pub mod validation;
pub mod charts;
pub mod export;
pub mod config;
pub mod logging;

// Only compile the HTTP layer when the server feature is enabled
#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use forecast::{
    ForecastPoint, ForecastSeries, InvalidSeriesError, Trend,
    compute_percent_change,
};
pub use disbursement::{
    BranchDisbursement, MonthlyDisbursement, MonthlySeries,
    StatusMatrix, StatusCell, EmploymentStatus, MaritalStatus,
    branch_total,
};
pub use kpi::{KpiSnapshot, KpiTile, DeltaDirection};
pub use insights::{Insights, RecommendedAction, ActionLevel};
pub use dashboard::{
    DashboardData, DashboardSource, StaticSource, JsonFileSource,
    load_dashboard_data, source_from_config,
};
pub use validation::{validate, ValidationReport, CheckResult, Severity};
pub use charts::{DashboardView, ChartKind, ChartView};
pub use export::export_all;
pub use config::{Config, load_config};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
