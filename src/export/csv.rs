use std::path::Path;

use anyhow::{Context, Result};

use crate::data::model::Dataset;

/// Write the view as UTF-8 CSV: header row, one line per record, no index
/// column.
pub fn write_csv(view: &Dataset, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer
        .write_record(view.header())
        .context("writing CSV header")?;
    for record in &view.records {
        writer
            .write_record(super::row_values(record))
            .context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_file;
    use crate::data::model::tests::record;

    #[test]
    fn csv_export_reload_round_trip() {
        let view = Dataset::new(
            vec!["H1".to_string(), "H2".to_string()],
            vec![
                record("Anna", "DM", 2023, 55.2, &[6.1, 4.25]),
                record("Berit", "EM", 2024, 54.8, &[6.0, 4.1]),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filtered_data.csv");
        write_csv(&view, &path).unwrap();

        // Same schema and cell values after re-parsing.
        let reloaded = load_file(&path).unwrap();
        assert_eq!(reloaded, view);
    }
}
