//! Export rendering for persisted submissions.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fieldops_timesheet::{format_clock_time, DayHours, TimesheetWeek};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::capture::SubmissionSnapshot;
use crate::error::{Result, SubmissionError};

/// Output formats a renderer may be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Excel,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ExportFormat::Pdf => "PDF",
            ExportFormat::Excel => "Excel",
            ExportFormat::Csv => "CSV",
        })
    }
}

/// Handle to a rendered export file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportHandle {
    pub path: PathBuf,
    pub format: ExportFormat,
}

/// Renders a snapshot to a file in the requested format.
#[async_trait]
pub trait ExportRenderer: Send + Sync {
    async fn render(
        &self,
        snapshot: &SubmissionSnapshot,
        format: ExportFormat,
    ) -> Result<ExportHandle>;
}

/// Writes `<form_type>-<id>.csv` files into an output directory.
///
/// Field rows come first as `field,value`; timesheet submissions follow with
/// one row per day and a closing total row.
#[derive(Debug, Clone)]
pub struct CsvRenderer {
    out_dir: PathBuf,
}

impl CsvRenderer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    fn export_path(&self, snapshot: &SubmissionSnapshot) -> PathBuf {
        self.out_dir.join(format!(
            "{}-{}.{}",
            snapshot.form_type,
            snapshot.id,
            ExportFormat::Csv.extension()
        ))
    }
}

#[async_trait]
impl ExportRenderer for CsvRenderer {
    async fn render(
        &self,
        snapshot: &SubmissionSnapshot,
        format: ExportFormat,
    ) -> Result<ExportHandle> {
        if format != ExportFormat::Csv {
            return Err(SubmissionError::render(format!(
                "{format} export is not supported by the CSV renderer"
            )));
        }

        fs::create_dir_all(&self.out_dir).await?;
        let path = self.export_path(snapshot);
        fs::write(&path, render_csv(snapshot)).await?;
        debug!(id = %snapshot.id, path = %path.display(), "rendered CSV export");

        Ok(ExportHandle { path, format })
    }
}

/// Render a snapshot as CSV text.
pub fn render_csv(snapshot: &SubmissionSnapshot) -> String {
    let mut out = String::new();
    push_row(&mut out, ["field", "value"]);
    for (name, value) in &snapshot.values {
        push_row(&mut out, [name.as_str(), value.as_str()]);
    }

    if let Some(week) = &snapshot.timesheet {
        out.push('\n');
        push_timesheet(&mut out, week);
    }
    out
}

fn push_timesheet(out: &mut String, week: &TimesheetWeek) {
    push_row(
        out,
        [
            "date",
            "clockIn",
            "clockOut",
            "totalHours",
            "regularHours",
            "overtimeHours",
            "absent",
            "activities",
            "notes",
        ],
    );
    for entry in week.entries() {
        let date = entry.date.to_string();
        let clock_in = entry.clock_in_time().map(format_clock_time).unwrap_or_default();
        let clock_out = entry.clock_out_time().map(format_clock_time).unwrap_or_default();
        let [total, regular, overtime] = hour_cells(entry.hours());
        let activities = entry.activities.join("; ");
        push_row(
            out,
            [
                date.as_str(),
                clock_in.as_str(),
                clock_out.as_str(),
                total.as_str(),
                regular.as_str(),
                overtime.as_str(),
                if entry.is_absent() { "true" } else { "false" },
                activities.as_str(),
                entry.notes.as_deref().unwrap_or_default(),
            ],
        );
    }
    let [total, regular, overtime] = hour_cells(week.summary());
    push_row(
        out,
        [
            "total",
            "",
            "",
            total.as_str(),
            regular.as_str(),
            overtime.as_str(),
            "",
            "",
            "",
        ],
    );
}

fn hour_cells(hours: DayHours) -> [String; 3] {
    [
        format!("{:.2}", hours.total_hours),
        format!("{:.2}", hours.regular_hours),
        format!("{:.2}", hours.overtime_hours),
    ]
}

fn push_row<'a>(out: &mut String, cells: impl IntoIterator<Item = &'a str>) {
    for (i, cell) in cells.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape_cell(cell));
    }
    out.push('\n');
}

fn escape_cell(cell: &str) -> std::borrow::Cow<'_, str> {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\"")).into()
    } else {
        cell.into()
    }
}
