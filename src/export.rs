// 💾 Export - dashboard tables as CSV + the full dataset as JSON

use crate::dashboard::{write_json, DashboardData};
use crate::disbursement::MaritalStatus;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn write_forecast_csv<W: Write>(data: &DashboardData, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Month", "Predicted Price"])?;
    for point in &data.forecast.points {
        wtr.write_record([point.month_label.clone(), point.predicted_price.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_branches_csv<W: Write>(data: &DashboardData, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Branch", "Disbursed Amount (M)"])?;
    for branch in &data.branches {
        wtr.write_record([branch.branch_name.clone(), branch.amount_millions.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_monthly_csv<W: Write>(data: &DashboardData, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Month", "Disbursed Amount"])?;
    for entry in &data.monthly_series.entries {
        wtr.write_record([entry.month_label.clone(), entry.disbursed_amount.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Wide layout: one row per employment status, one column per marital status
pub fn write_status_matrix_csv<W: Write>(data: &DashboardData, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["Employment Status".to_string()];
    header.extend(MaritalStatus::ALL.iter().map(|m| m.as_str().to_string()));
    wtr.write_record(&header)?;

    for employment in crate::disbursement::EmploymentStatus::ALL {
        let mut record = vec![employment.as_str().to_string()];
        record.extend(
            data.status_matrix
                .row(employment)
                .iter()
                .map(|v| v.to_string()),
        );
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write dashboard.json and one CSV per table into `dir`; returns the files written
pub fn export_all(data: &DashboardData, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;

    let json_path = dir.join("dashboard.json");
    write_json(data, &json_path)?;

    let writers: [(&str, fn(&DashboardData, std::fs::File) -> Result<()>); 4] = [
        ("forecast.csv", write_forecast_csv),
        ("branches.csv", write_branches_csv),
        ("monthly.csv", write_monthly_csv),
        ("status_matrix.csv", write_status_matrix_csv),
    ];

    let mut written = vec![json_path];
    for (name, write) in writers {
        let path = dir.join(name);
        let file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write(data, file)?;
        tracing::debug!(path = %path.display(), "exported table");
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::load_dashboard_data;

    #[test]
    fn test_forecast_csv() {
        let data = load_dashboard_data().unwrap();
        let mut buf = Vec::new();
        write_forecast_csv(&data, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Month,Predicted Price");
        assert_eq!(lines[1], "M+1,145.2");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_status_matrix_csv_layout() {
        let data = load_dashboard_data().unwrap();
        let mut buf = Vec::new();
        write_status_matrix_csv(&data, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Employment Status,Divorced,Married,Single,Widowed");
        assert!(lines[2].starts_with("Self-Employed,"));
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_export_all_writes_every_file() {
        let dir = std::env::temp_dir().join(format!("sme_analytics_export_{}", std::process::id()));
        let data = load_dashboard_data().unwrap();

        let files = export_all(&data, &dir).unwrap();
        assert_eq!(files.len(), 5);
        assert!(files.iter().all(|f| f.exists()));

        std::fs::remove_dir_all(&dir).ok();
    }
}
