use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;

use crate::data::model::Dataset;

/// Write the view as a single-sheet XLSX workbook: sheet name `Sheet1`,
/// header row, no index column. Numeric columns stay numeric cells.
pub fn write_xlsx(view: &Dataset, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Sheet1").context("naming sheet")?;

    for (col, title) in view.header().iter().enumerate() {
        sheet
            .write_string(0, col as u16, title)
            .context("writing header")?;
    }

    for (i, record) in view.records.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &record.name)?;
        sheet.write_string(row, 1, &record.competition)?;
        sheet.write_number(row, 2, record.year as f64)?;
        sheet.write_number(row, 3, record.total_time)?;
        for (c, &split) in record.splits.iter().enumerate() {
            sheet.write_number(row, (c + 4) as u16, split)?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("saving {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_file;
    use crate::data::model::tests::record;

    #[test]
    fn xlsx_export_reload_round_trip() {
        let view = Dataset::new(
            vec!["H1".to_string(), "H2".to_string()],
            vec![
                record("Anna", "DM", 2023, 55.2, &[6.1, 4.25]),
                record("Berit", "EM", 2024, 54.8, &[6.0, 4.1]),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filtered_data.xlsx");
        write_xlsx(&view, &path).unwrap();

        let reloaded = load_file(&path).unwrap();
        assert_eq!(reloaded.segments, view.segments);
        assert_eq!(reloaded.len(), view.len());
        for (a, b) in reloaded.records.iter().zip(view.records.iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.year, b.year);
            assert!((a.total_time - b.total_time).abs() < 1e-9);
            for (x, y) in a.splits.iter().zip(b.splits.iter()) {
                assert!((x - y).abs() < 1e-9);
            }
        }
    }
}
