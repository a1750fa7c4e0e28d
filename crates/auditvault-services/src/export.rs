//! CSV and plain-text report export of inspection records.

use std::path::Path;
use std::str::FromStr;

use auditvault_core::models::{InspectionRecord, InspectionStatus};
use auditvault_core::AppError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

pub const CSV_HEADERS: [&str; 7] = [
    "Site ID",
    "Location",
    "Compliance Score",
    "Status",
    "Inspector",
    "Date",
    "Transaction Hash",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Report,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Report => "txt",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "report" | "pdf" | "txt" => Ok(ExportFormat::Report),
            other => Err(AppError::Validation(format!(
                "Unknown export format: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSummary {
    pub total_records: usize,
    pub approved: usize,
    pub pending: usize,
    pub rejected: usize,
    pub average_score: f64,
    pub critical_issues: usize,
}

fn csv_cell(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        format!("{}", score)
    }
}

pub fn to_csv(records: &[InspectionRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADERS.join(","));
    for r in records {
        let cells = [
            csv_cell(&r.site_id),
            csv_cell(&r.location),
            format_score(r.compliance_score),
            r.status.to_string(),
            csv_cell(&r.inspector_address),
            r.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            csv_cell(r.transaction_hash.as_deref().unwrap_or("N/A")),
        ];
        lines.push(cells.join(","));
    }
    lines.join("\n")
}

pub fn to_report(records: &[InspectionRecord], generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str("COMPLIANCE REPORT\n");
    out.push_str(&format!(
        "Generated: {}\n\n",
        generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    ));
    out.push_str(&format!("Total Records: {}\n", records.len()));
    for r in records {
        out.push_str(&format!(
            "\nSite: {}\nScore: {}/10\nStatus: {}\n---\n",
            r.location,
            format_score(r.compliance_score),
            r.status
        ));
    }
    out
}

pub fn summary(records: &[InspectionRecord]) -> ExportSummary {
    let count = |status: InspectionStatus| records.iter().filter(|r| r.status == status).count();
    let total: f64 = records.iter().map(|r| r.compliance_score).sum();

    ExportSummary {
        total_records: records.len(),
        approved: count(InspectionStatus::Approved),
        pending: count(InspectionStatus::Pending),
        rejected: count(InspectionStatus::Rejected),
        average_score: total / records.len().max(1) as f64,
        critical_issues: records.iter().filter(|r| r.is_critical()).count(),
    }
}

/// Render `records` in `format` and write them to `path`.
pub fn write_export(
    path: &Path,
    format: ExportFormat,
    records: &[InspectionRecord],
) -> Result<(), AppError> {
    let body = match format {
        ExportFormat::Csv => to_csv(records),
        ExportFormat::Report => to_report(records, Utc::now()),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, body)?;
    tracing::info!(path = %path.display(), records = records.len(), "Export written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(site: &str, location: &str, score: f64, status: InspectionStatus) -> InspectionRecord {
        InspectionRecord {
            id: site.to_lowercase(),
            site_id: site.to_string(),
            location: location.to_string(),
            inspector_address: "0x1234".to_string(),
            inspector_name: "John Inspector".to_string(),
            compliance_score: score,
            status,
            warnings: vec![],
            critical_issues: vec![],
            recommendations: vec![],
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            ipfs_hash: None,
            transaction_hash: None,
            manager_approval: None,
            auditor_approval: None,
        }
    }

    #[test]
    fn csv_quotes_cells_with_commas() {
        let mut r = record("SITE-001", "Building A, Floor 3", 8.5, InspectionStatus::Approved);
        r.transaction_hash = Some("0xfeed".into());
        let other = record("SITE-002", "Warehouse", 7.0, InspectionStatus::Pending);

        let csv = to_csv(&[r, other]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "Site ID,Location,Compliance Score,Status,Inspector,Date,Transaction Hash"
        );
        assert_eq!(
            lines[1],
            "SITE-001,\"Building A, Floor 3\",8.5,approved,0x1234,2024-01-15T10:00:00.000Z,0xfeed"
        );
        assert!(lines[2].ends_with(",N/A"));
        assert!(lines[2].contains(",7,pending,"));
    }

    #[test]
    fn report_lists_each_record() {
        let records = vec![
            record("SITE-001", "Building A", 8.5, InspectionStatus::Approved),
            record("SITE-002", "Warehouse", 5.0, InspectionStatus::Rejected),
        ];
        let at = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        let report = to_report(&records, at);
        assert!(report.starts_with("COMPLIANCE REPORT\nGenerated: 2024-02-01T00:00:00.000Z"));
        assert!(report.contains("Total Records: 2"));
        assert!(report.contains("Site: Warehouse\nScore: 5/10\nStatus: rejected\n---"));
    }

    #[test]
    fn summary_counts_and_average() {
        let records = vec![
            record("A", "a", 9.0, InspectionStatus::Approved),
            record("B", "b", 5.0, InspectionStatus::Pending),
            record("C", "c", 4.0, InspectionStatus::Rejected),
        ];
        let s = summary(&records);
        assert_eq!(s.total_records, 3);
        assert_eq!((s.approved, s.pending, s.rejected), (1, 1, 1));
        assert_eq!(s.critical_issues, 2);
        assert!((s.average_score - 6.0).abs() < 1e-9);

        assert_eq!(summary(&[]).average_score, 0.0);
    }

    #[test]
    fn write_export_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("records.csv");
        write_export(&path, ExportFormat::Csv, &[]).unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        assert_eq!(body, CSV_HEADERS.join(","));
    }
}
