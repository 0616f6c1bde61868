// 📉 Chart View Models - renderer-agnostic chart/table descriptions
//
// The TUI draws these with ratatui widgets; the web page draws the same JSON
// on a canvas. Neither host reads DashboardData directly for drawing.

use crate::dashboard::DashboardData;
use crate::disbursement::{EmploymentStatus, MaritalStatus};
use crate::forecast::ForecastSeries;
use crate::kpi::KpiTile;
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

/// Horizontal bar chart, bars in display order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartView {
    pub title: String,
    pub value_axis: String,
    pub bars: Vec<Bar>,
}

impl BarChartView {
    pub fn max_value(&self) -> f64 {
        self.bars.iter().map(|b| b.value).fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChartView {
    pub title: String,
    pub x_axis: String,
    pub y_axis: String,
    pub points: Vec<LinePoint>,
}

impl LineChartView {
    /// (min, max) of the y values, None for an empty chart
    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        let mut values = self.points.iter().map(|p| p.value);
        let first = values.next()?;
        Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

/// Grouped bars: one group per category, one bar per series inside each group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedBarChartView {
    pub title: String,
    pub category_axis: String,
    pub value_axis: String,
    pub legend_title: String,
    pub categories: Vec<String>,

    /// Sum over all series, one per category
    pub category_totals: Vec<f64>,
    pub series: Vec<Series>,
}

impl GroupedBarChartView {
    pub fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Every widget of the dashboard page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub title: String,
    pub kpis: Vec<KpiTile>,
    pub branches: BarChartView,
    pub forecast: LineChartView,
    pub monthly: LineChartView,
    pub status: GroupedBarChartView,
    pub forecast_table: TableView,
}

impl DashboardView {
    pub fn build(data: &DashboardData) -> Self {
        DashboardView {
            title: "Analytics".to_string(),
            kpis: data.kpis.tiles().iter().map(|t| (*t).clone()).collect(),
            branches: branch_bar_chart(data),
            forecast: forecast_line_chart(&data.forecast),
            monthly: monthly_line_chart(data),
            status: status_grouped_bar_chart(data),
            forecast_table: forecast_table(&data.forecast),
        }
    }
}

// ============================================================================
// BUILDERS
// ============================================================================

pub fn branch_bar_chart(data: &DashboardData) -> BarChartView {
    BarChartView {
        title: "Disbursement per Branch".to_string(),
        value_axis: "Sum of Disbursed Amount (M)".to_string(),
        bars: data
            .branches
            .iter()
            .map(|b| Bar {
                label: b.branch_name.clone(),
                value: b.amount_millions,
            })
            .collect(),
    }
}

pub fn forecast_line_chart(forecast: &ForecastSeries) -> LineChartView {
    LineChartView {
        title: "Market Price Forecast".to_string(),
        x_axis: "Time".to_string(),
        y_axis: "Market Price".to_string(),
        points: forecast
            .points
            .iter()
            .map(|p| LinePoint {
                label: p.month_label.clone(),
                value: p.predicted_price,
            })
            .collect(),
    }
}

pub fn monthly_line_chart(data: &DashboardData) -> LineChartView {
    LineChartView {
        title: "Disbursed Amt by Disbursement Date: Month".to_string(),
        x_axis: "Month".to_string(),
        y_axis: "Disbursed Amount".to_string(),
        points: data
            .monthly_series
            .entries
            .iter()
            .map(|e| LinePoint {
                label: e.month_label.clone(),
                value: e.disbursed_amount as f64,
            })
            .collect(),
    }
}

pub fn status_grouped_bar_chart(data: &DashboardData) -> GroupedBarChartView {
    let series = MaritalStatus::ALL
        .iter()
        .map(|marital| Series {
            name: marital.as_str().to_string(),
            values: EmploymentStatus::ALL
                .iter()
                .map(|employment| data.status_matrix.get(*employment, *marital) as f64)
                .collect(),
        })
        .collect();

    GroupedBarChartView {
        title: "Disbursement by Employment & Marital Status".to_string(),
        category_axis: "Employment Status".to_string(),
        value_axis: "Disbursed Amount".to_string(),
        legend_title: "Marital Status".to_string(),
        categories: EmploymentStatus::ALL
            .iter()
            .map(|e| e.as_str().to_string())
            .collect(),
        category_totals: EmploymentStatus::ALL
            .iter()
            .map(|e| data.status_matrix.row_total(*e) as f64)
            .collect(),
        series,
    }
}

pub fn forecast_table(forecast: &ForecastSeries) -> TableView {
    TableView {
        title: "Price Forecast Table".to_string(),
        columns: vec!["Month".to_string(), "Predicted Price".to_string()],
        rows: forecast
            .points
            .iter()
            .map(|p| vec![p.month_label.clone(), format!("{:.1}", p.predicted_price)])
            .collect(),
    }
}

// ============================================================================
// LOOKUP BY NAME
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Branches,
    Forecast,
    Monthly,
    Status,
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "branches" => Ok(ChartKind::Branches),
            "forecast" => Ok(ChartKind::Forecast),
            "monthly" => Ok(ChartKind::Monthly),
            "status" => Ok(ChartKind::Status),
            other => Err(format!("Unknown chart: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartView {
    Bar(BarChartView),
    Line(LineChartView),
    GroupedBar(GroupedBarChartView),
}

pub fn chart(data: &DashboardData, kind: ChartKind) -> ChartView {
    match kind {
        ChartKind::Branches => ChartView::Bar(branch_bar_chart(data)),
        ChartKind::Forecast => ChartView::Line(forecast_line_chart(&data.forecast)),
        ChartKind::Monthly => ChartView::Line(monthly_line_chart(data)),
        ChartKind::Status => ChartView::GroupedBar(status_grouped_bar_chart(data)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::load_dashboard_data;

    #[test]
    fn test_branch_chart_keeps_order_and_total() {
        let data = load_dashboard_data().unwrap();
        let chart = branch_bar_chart(&data);

        assert_eq!(chart.bars.len(), 9);
        assert_eq!(chart.bars[0].label, "Matthewton");
        assert_eq!(chart.max_value(), 456.5);
        let total: f64 = chart.bars.iter().map(|b| b.value).sum();
        assert!((total - 3140.6).abs() < 1e-9);
    }

    #[test]
    fn test_forecast_chart_and_table() {
        let forecast = ForecastSeries::reference();
        let chart = forecast_line_chart(&forecast);
        assert_eq!(chart.points.len(), 5);
        assert_eq!(chart.y_bounds(), Some((145.2, 154.0)));

        let table = forecast_table(&forecast);
        assert_eq!(table.columns, vec!["Month", "Predicted Price"]);
        assert_eq!(table.rows[0], vec!["M+1", "145.2"]);
        assert_eq!(table.rows[4], vec!["M+5", "154.0"]);
    }

    #[test]
    fn test_monthly_chart_labels() {
        let data = load_dashboard_data().unwrap();
        let chart = monthly_line_chart(&data);
        assert_eq!(chart.points.len(), 11);
        assert_eq!(chart.points[0].label, "January 2025");
        assert_eq!(chart.points[0].value, 90_000_000.0);
    }

    #[test]
    fn test_status_chart_is_grouped_by_employment() {
        let data = load_dashboard_data().unwrap();
        let chart = status_grouped_bar_chart(&data);

        assert_eq!(chart.categories, vec!["Employed", "Self-Employed", "Student", "Unemployed"]);
        assert_eq!(chart.series.len(), 4);
        assert_eq!(chart.series[1].name, "Married");
        let employed_sum: f64 = chart.series.iter().map(|s| s.values[0]).sum();
        assert_eq!(chart.category_totals[0], employed_sum);
        assert_eq!(
            chart.category_totals[2],
            data.status_matrix.row_total(EmploymentStatus::Student) as f64
        );
        assert_eq!(
            chart.series[1].values[0],
            data.status_matrix.get(EmploymentStatus::Employed, MaritalStatus::Married) as f64
        );
    }

    #[test]
    fn test_empty_line_chart_has_no_bounds() {
        let chart = forecast_line_chart(&ForecastSeries::default());
        assert_eq!(chart.y_bounds(), None);
    }

    #[test]
    fn test_chart_kind_lookup() {
        assert_eq!("Branches".parse::<ChartKind>(), Ok(ChartKind::Branches));
        assert!("pie".parse::<ChartKind>().is_err());

        let data = load_dashboard_data().unwrap();
        let json = serde_json::to_value(chart(&data, ChartKind::Status)).unwrap();
        assert_eq!(json["kind"], "grouped_bar");
        assert_eq!(json["legend_title"], "Marital Status");
    }

    #[test]
    fn test_dashboard_view_has_all_widgets() {
        let view = DashboardView::build(&load_dashboard_data().unwrap());
        assert_eq!(view.kpis.len(), 4);
        assert_eq!(view.kpis[3].value, "6.06%");
        assert_eq!(view.forecast_table.rows.len(), 5);
    }
}
