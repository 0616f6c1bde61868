// ✅ Data Contract Validation - checks a DashboardData before it is rendered
//
// Every rule produces a CheckResult; a report with any Critical failure
// must not be rendered.

use crate::dashboard::DashboardData;
use crate::disbursement::{STATUS_AMOUNT_MAX, STATUS_AMOUNT_MIN};
use crate::forecast::compute_percent_change;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Critical, // Data cannot be rendered correctly
    Warning,  // Data renders but looks wrong
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub rule: String,
    pub passed: bool,
    pub severity: Severity,
    pub message: String,
}

impl CheckResult {
    fn pass(rule: &str, message: String) -> Self {
        CheckResult {
            rule: rule.to_string(),
            passed: true,
            severity: Severity::Warning,
            message,
        }
    }

    fn fail(rule: &str, severity: Severity, message: String) -> Self {
        CheckResult {
            rule: rule.to_string(),
            passed: false,
            severity,
            message,
        }
    }

    fn check(rule: &str, ok: bool, severity: Severity, pass_msg: String, fail_msg: String) -> Self {
        if ok {
            CheckResult::pass(rule, pass_msg)
        } else {
            CheckResult::fail(rule, severity, fail_msg)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub checks: Vec<CheckResult>,
}

impl ValidationReport {
    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }

    pub fn has_critical(&self) -> bool {
        self.failures().any(|c| c.severity == Severity::Critical)
    }

    pub fn is_clean(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn summary(&self) -> String {
        let failed: Vec<&str> = self.failures().map(|c| c.rule.as_str()).collect();
        if failed.is_empty() {
            format!("{} checks passed", self.checks.len())
        } else {
            format!(
                "{}/{} checks failed ({})",
                failed.len(),
                self.checks.len(),
                failed.join(", ")
            )
        }
    }
}

/// Run every data contract rule against `data`
pub fn validate(data: &DashboardData) -> ValidationReport {
    let checks = vec![
        check_forecast(data),
        check_branches_present(data),
        check_branches_non_negative(data),
        check_branches_descending(data),
        check_monthly_present(data),
        check_monthly_consecutive(data),
        check_matrix_range(data),
        check_kpi_tiles(data),
    ];

    ValidationReport { checks }
}

fn check_forecast(data: &DashboardData) -> CheckResult {
    match compute_percent_change(&data.forecast) {
        Ok(change) => CheckResult::pass(
            "forecast_computable",
            format!("{} points, change {}%", data.forecast.len(), change),
        ),
        Err(e) => CheckResult::fail("forecast_computable", Severity::Critical, e.to_string()),
    }
}

fn check_branches_present(data: &DashboardData) -> CheckResult {
    CheckResult::check(
        "branches_present",
        !data.branches.is_empty(),
        Severity::Critical,
        format!("{} branches", data.branches.len()),
        "No branch disbursement entries".to_string(),
    )
}

fn check_branches_non_negative(data: &DashboardData) -> CheckResult {
    let bad: Vec<&str> = data
        .branches
        .iter()
        .filter(|b| !b.amount_millions.is_finite() || b.amount_millions < 0.0)
        .map(|b| b.branch_name.as_str())
        .collect();

    CheckResult::check(
        "branches_non_negative",
        bad.is_empty(),
        Severity::Critical,
        "All branch amounts are non-negative".to_string(),
        format!("Invalid amounts for: {}", bad.join(", ")),
    )
}

fn check_branches_descending(data: &DashboardData) -> CheckResult {
    let descending = data
        .branches
        .windows(2)
        .all(|w| w[0].amount_millions >= w[1].amount_millions);

    CheckResult::check(
        "branches_descending",
        descending,
        Severity::Warning,
        "Branches are in descending order".to_string(),
        "Branches are not sorted by amount (descending)".to_string(),
    )
}

fn check_monthly_present(data: &DashboardData) -> CheckResult {
    CheckResult::check(
        "monthly_present",
        !data.monthly_series.is_empty(),
        Severity::Critical,
        format!("{} months", data.monthly_series.len()),
        "Monthly series is empty".to_string(),
    )
}

fn check_monthly_consecutive(data: &DashboardData) -> CheckResult {
    let labels_match = data
        .monthly_series
        .entries
        .iter()
        .all(|e| e.month_label == crate::disbursement::month_label(e.month));

    CheckResult::check(
        "monthly_consecutive",
        data.monthly_series.is_consecutive() && labels_match,
        Severity::Critical,
        "Months are consecutive and correctly labelled".to_string(),
        "Monthly series has gaps, is out of order, or has mismatched labels".to_string(),
    )
}

fn check_matrix_range(data: &DashboardData) -> CheckResult {
    let out_of_range = data
        .status_matrix
        .cells()
        .iter()
        .filter(|c| c.amount < STATUS_AMOUNT_MIN || c.amount >= STATUS_AMOUNT_MAX)
        .count();

    CheckResult::check(
        "status_matrix_range",
        out_of_range == 0,
        Severity::Warning,
        format!("All cells within [{}, {})", STATUS_AMOUNT_MIN, STATUS_AMOUNT_MAX),
        format!("{} cells outside [{}, {})", out_of_range, STATUS_AMOUNT_MIN, STATUS_AMOUNT_MAX),
    )
}

fn check_kpi_tiles(data: &DashboardData) -> CheckResult {
    let empty = data
        .kpis
        .tiles()
        .iter()
        .filter(|t| t.label.trim().is_empty() || t.value.trim().is_empty())
        .count();

    CheckResult::check(
        "kpi_tiles",
        empty == 0,
        Severity::Warning,
        "Four KPI tiles with labels and values".to_string(),
        format!("{} KPI tiles are missing a label or value", empty),
    )
}
