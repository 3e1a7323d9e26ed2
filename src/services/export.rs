//! CSV export of report rows

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::{
    dates::{format_date, format_days, ABSENT_MARKER},
    error::{AppError, AppResult},
    models::report::ReportRow,
};

/// Column headers, in export order
pub const CSV_HEADER: [&str; 9] = [
    "First name",
    "Last name",
    "Grade",
    "Major",
    "Loan date",
    "Return date",
    "Planned days",
    "Days until return",
    "Delay days",
];

/// Result of an export request
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    /// Nothing matched; no file is produced
    Empty,
    Csv {
        filename: String,
        content: String,
        rows: usize,
    },
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| ABSENT_MARKER.to_string())
}

/// The nine exported cells of a row
pub fn row_fields(row: &ReportRow) -> [String; 9] {
    [
        text(&row.first_name),
        text(&row.last_name),
        text(&row.grade),
        text(&row.major),
        format_date(row.loan_date),
        format_date(row.return_date),
        format_days(row.planned_days),
        format_days(row.duration_until_return_days),
        format_days(row.delay_days),
    ]
}

/// Serialize rows as CSV: every cell quoted, quotes doubled, CRLF line endings
pub fn to_csv(rows: &[ReportRow]) -> AppResult<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    let csv_error = |e: csv::Error| AppError::Internal(format!("Failed to write CSV: {}", e));

    writer.write_record(CSV_HEADER).map_err(csv_error)?;
    for row in rows {
        writer.write_record(row_fields(row)).map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush CSV: {}", e)))?;

    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV is not UTF-8: {}", e)))
}

/// Export rows under `filename`; an empty row set produces no file
pub fn export_rows(rows: &[ReportRow], filename: &str) -> AppResult<ExportOutcome> {
    if rows.is_empty() {
        tracing::info!("Export requested with no matching rows");
        return Ok(ExportOutcome::Empty);
    }

    let content = to_csv(rows)?;
    tracing::info!("Exported {} report rows to {}", rows.len(), filename);

    Ok(ExportOutcome::Csv {
        filename: filename.to_string(),
        content,
        rows: rows.len(),
    })
}
