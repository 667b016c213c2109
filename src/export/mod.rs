/// Exporters for the filtered view: CSV, XLSX, and a paginated PDF table.
///
/// All three take a materialized [`Dataset`](crate::data::model::Dataset)
/// (the filtered view) and write it with the header row first and no index
/// column, matching what the table widget shows.
pub mod csv;
pub mod pdf;
pub mod xlsx;

use std::path::Path;

use anyhow::Result;

use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Format dispatch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Csv, ExportFormat::Xlsx, ExportFormat::Pdf];

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Xlsx => "Excel",
            ExportFormat::Pdf => "PDF",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }
}

/// Write `view` to `path` in the chosen format.
pub fn export_dataset(view: &Dataset, format: ExportFormat, path: &Path) -> Result<()> {
    match format {
        ExportFormat::Csv => csv::write_csv(view, path),
        ExportFormat::Xlsx => xlsx::write_xlsx(view, path),
        ExportFormat::Pdf => pdf::write_pdf(view, path),
    }
}

/// Stringified cell values of one record, aligned with `Dataset::header()`.
pub(crate) fn row_values(record: &crate::data::model::Record) -> Vec<String> {
    let mut values = vec![
        record.name.clone(),
        record.competition.clone(),
        record.year.to_string(),
        record.total_time.to_string(),
    ];
    values.extend(record.splits.iter().map(|v| v.to_string()));
    values
}
