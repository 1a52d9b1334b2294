//! Spreadsheet output
//!
//! Writes one sheet per project table, an `Overall Summary` sheet and,
//! optionally, a `Scan Status` sheet listing every outcome of the run.

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

use crate::census::{ranked, LanguageStats, ProjectTable, ScanReport};
use crate::error::ReportError;
use crate::utils::format_duration;

pub const OVERALL_SHEET: &str = "Overall Summary";
pub const STATUS_SHEET: &str = "Scan Status";

const MAX_SHEET_NAME: usize = 31;
const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;
const PERCENT_FORMAT: &str = "0.00";

/// Writes a [`ScanReport`] as an `.xlsx` workbook
#[derive(Debug, Clone)]
pub struct WorkbookWriter {
    status_sheet: bool,
}

impl WorkbookWriter {
    pub fn new() -> Self {
        Self { status_sheet: true }
    }

    pub fn with_status_sheet(mut self, enabled: bool) -> Self {
        self.status_sheet = enabled;
        self
    }

    /// Write the workbook to `path`, replacing any existing file
    pub fn write(&self, report: &ScanReport, path: &Path) -> Result<(), ReportError> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        let percent = Format::new().set_num_format(PERCENT_FORMAT);
        let mut names = SheetNames::new();

        for table in &report.tables {
            let name = names.claim(table.key());
            debug!(project = table.key(), sheet = %name, "Writing project sheet");
            write_project_sheet(workbook.add_worksheet(), &name, table, &header, &percent)?;
        }

        write_overall_sheet(workbook.add_worksheet(), &report.overall, &header, &percent)?;

        if self.status_sheet {
            write_status_sheet(workbook.add_worksheet(), report, &header)?;
        }

        workbook.save(path)?;
        info!(path = %path.display(), sheets = report.tables.len(), "Workbook written");
        Ok(())
    }
}

impl Default for WorkbookWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn write_project_sheet(
    sheet: &mut Worksheet,
    name: &str,
    table: &ProjectTable,
    header: &Format,
    percent: &Format,
) -> Result<(), ReportError> {
    let grid = table.tabulate();
    check_size(name, grid.rows.len() + 1, grid.languages.len() + 1)?;

    sheet.set_name(name)?;
    sheet.write_string_with_format(0, 0, "Repository", header)?;
    for (col, language) in grid.languages.iter().enumerate() {
        sheet.write_string_with_format(0, column(col + 1), language, header)?;
    }

    for (index, row) in grid.rows.iter().enumerate() {
        let r = row_index(index + 1);
        sheet.write_string(r, 0, &row.repository)?;
        for (col, value) in row.values.iter().enumerate() {
            sheet.write_number_with_format(r, column(col + 1), *value, percent)?;
        }
    }

    sheet.set_freeze_panes(1, 1)?;
    sheet.autofit();
    Ok(())
}

fn write_overall_sheet(
    sheet: &mut Worksheet,
    overall: &LanguageStats,
    header: &Format,
    percent: &Format,
) -> Result<(), ReportError> {
    check_size(OVERALL_SHEET, overall.len() + 1, 2)?;

    sheet.set_name(OVERALL_SHEET)?;
    sheet.write_string_with_format(0, 0, "Language", header)?;
    sheet.write_string_with_format(0, 1, "Percentage", header)?;

    for (index, (language, share)) in ranked(overall).into_iter().enumerate() {
        let r = row_index(index + 1);
        sheet.write_string(r, 0, language)?;
        sheet.write_number_with_format(r, 1, share, percent)?;
    }

    sheet.set_freeze_panes(1, 0)?;
    sheet.autofit();
    Ok(())
}

fn write_status_sheet(
    sheet: &mut Worksheet,
    report: &ScanReport,
    header: &Format,
) -> Result<(), ReportError> {
    let mut rows: Vec<[&str; 4]> = Vec::new();
    for project in &report.projects {
        let repositories: Vec<_> = report
            .repositories
            .iter()
            .filter(|r| r.project == project.project)
            .collect();

        if repositories.is_empty() {
            rows.push([
                project.project.as_str(),
                "",
                project.status.label(),
                project.status.detail().unwrap_or(""),
            ]);
        }
        for outcome in repositories {
            rows.push([
                outcome.project.as_str(),
                outcome.slug.as_str(),
                outcome.status.label(),
                outcome.status.detail().unwrap_or(""),
            ]);
        }
    }

    let started = report.started_at.format("%Y-%m-%d %H:%M:%S %:z").to_string();
    let duration = format_duration(report.duration);
    let mut footer: Vec<[&str; 2]> = vec![
        ["Workspace", report.workspace.as_str()],
        ["Started", started.as_str()],
        ["Duration", duration.as_str()],
    ];
    for warning in &report.warnings {
        footer.push(["Warning", warning.as_str()]);
    }

    check_size(STATUS_SHEET, rows.len() + footer.len() + 2, 4)?;

    sheet.set_name(STATUS_SHEET)?;
    for (col, title) in ["Project", "Repository", "Status", "Detail"].iter().enumerate() {
        sheet.write_string_with_format(0, column(col), *title, header)?;
    }
    for (index, cells) in rows.iter().enumerate() {
        for (col, text) in cells.iter().enumerate() {
            sheet.write_string(row_index(index + 1), column(col), *text)?;
        }
    }

    // One blank row between the outcomes and the run details.
    let offset = rows.len() + 2;
    for (index, [label, value]) in footer.iter().enumerate() {
        let r = row_index(offset + index);
        sheet.write_string_with_format(r, 0, *label, header)?;
        sheet.write_string(r, 1, *value)?;
    }

    sheet.set_freeze_panes(1, 0)?;
    sheet.autofit();
    Ok(())
}

fn check_size(sheet: &str, rows: usize, columns: usize) -> Result<(), ReportError> {
    if columns > MAX_COLUMNS {
        return Err(ReportError::TooManyColumns {
            sheet: sheet.to_string(),
            columns,
        });
    }
    if rows > MAX_ROWS {
        return Err(ReportError::TooManyRows {
            sheet: sheet.to_string(),
            rows,
        });
    }
    Ok(())
}

// Both conversions are bounded by `check_size` before any cell is written.
fn row_index(index: usize) -> u32 {
    index as u32
}

fn column(index: usize) -> u16 {
    index as u16
}

/// Turn an arbitrary project key into a valid worksheet name.
///
/// `[ ] : * ? / \` become `_`, surrounding apostrophes are dropped, the
/// result is cut to 31 characters and a blank name becomes `Sheet`.
pub fn sanitize_sheet_name(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let truncated: String = replaced
        .trim_matches('\'')
        .chars()
        .take(MAX_SHEET_NAME)
        .collect();
    let name = truncated.trim_end_matches('\'');

    if name.trim().is_empty() {
        "Sheet".to_string()
    } else {
        name.to_string()
    }
}

/// Hands out unique sheet names; Excel compares them case-insensitively
struct SheetNames {
    taken: HashSet<String>,
}

impl SheetNames {
    fn new() -> Self {
        let taken = [OVERALL_SHEET, STATUS_SHEET, "History"]
            .iter()
            .map(|name| name.to_lowercase())
            .collect();
        Self { taken }
    }

    fn claim(&mut self, raw: &str) -> String {
        let base = sanitize_sheet_name(raw);
        let mut candidate = base.clone();
        let mut n = 2;

        while self.taken.contains(&candidate.to_lowercase()) {
            let suffix = format!("~{}", n);
            let stem: String = base
                .chars()
                .take(MAX_SHEET_NAME - suffix.chars().count())
                .collect();
            candidate = format!("{}{}", stem, suffix);
            n += 1;
        }

        self.taken.insert(candidate.to_lowercase());
        candidate
    }
}
