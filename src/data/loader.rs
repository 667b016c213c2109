use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray, StringArray,
};
use arrow::datatypes::DataType;
use calamine::{open_workbook_auto, Data, Range, Reader, Xlsx};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dataset, Record, COL_COMPETITION, COL_NAME, COL_TIME, COL_YEAR};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a timing dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xls` / `.ods` – spreadsheet, first sheet (the native format)
/// * `.csv`     – header row + one record per line
/// * `.json`    – `[{ "Name": ..., "Wettkampf": ..., "Jahr": ..., "Zeit": ..., ...splits }, ...]`
/// * `.parquet` – flat table with scalar columns
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xls" | "ods" => load_spreadsheet(path),
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Fetch an XLSX dataset from a bearer-token-protected URL.
///
/// `token_env` names the environment variable holding the credential; a
/// missing variable or a non-200 response is a plain error, never a panic.
pub fn load_remote(url: &str, token_env: &str) -> Result<Dataset> {
    let token = std::env::var(token_env)
        .with_context(|| format!("missing credential: ${token_env} is not set"))?;

    let response = reqwest::blocking::Client::new()
        .get(url)
        .bearer_auth(token)
        .send()
        .with_context(|| format!("fetching {url}"))?;

    if !response.status().is_success() {
        bail!("fetching {url}: HTTP {}", response.status());
    }

    let bytes = response.bytes().context("reading response body")?;
    let mut workbook =
        Xlsx::new(Cursor::new(bytes.to_vec())).context("parsing remote spreadsheet")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("remote spreadsheet has no sheets")?
        .context("reading remote sheet")?;
    dataset_from_range(&range)
}

// ---------------------------------------------------------------------------
// Single-slot dataset cache
// ---------------------------------------------------------------------------

/// Where the dataset comes from; remembered so an explicit reload can
/// re-fetch the same source.
#[derive(Debug, Clone)]
pub enum DataSource {
    File(PathBuf),
    Remote { url: String, token_env: String },
}

impl DataSource {
    fn load(&self) -> Result<Dataset> {
        match self {
            DataSource::File(path) => load_file(path),
            DataSource::Remote { url, token_env } => load_remote(url, token_env),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DataSource::File(path) => path.display().to_string(),
            DataSource::Remote { url, .. } => url.clone(),
        }
    }
}

/// One process-wide slot for the loaded dataset. Replaced wholesale by
/// `open` or `reload`, never partially mutated.
#[derive(Debug, Default)]
pub struct DatasetCache {
    source: Option<DataSource>,
    dataset: Option<Dataset>,
}

impl DatasetCache {
    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// Load from a new source and make it the cached dataset.
    pub fn open(&mut self, source: DataSource) -> Result<&Dataset> {
        let dataset = source.load()?;
        self.source = Some(source);
        self.dataset = Some(dataset);
        Ok(self.dataset.as_ref().unwrap())
    }

    /// Drop the cached dataset and forget the source.
    pub fn clear(&mut self) {
        self.source = None;
        self.dataset = None;
    }

    /// Re-load from the current source, keeping the old dataset on failure.
    pub fn reload(&mut self) -> Result<&Dataset> {
        let source = self
            .source
            .clone()
            .context("nothing loaded yet, open a file first")?;
        let dataset = source.load()?;
        self.dataset = Some(dataset);
        Ok(self.dataset.as_ref().unwrap())
    }
}

// ---------------------------------------------------------------------------
// Column layout: required columns by name, everything else is a segment
// ---------------------------------------------------------------------------

struct ColumnLayout {
    name: usize,
    competition: usize,
    year: usize,
    time: usize,
    /// (column index, column name) of the segment columns, in header order.
    segments: Vec<(usize, String)>,
}

impl ColumnLayout {
    fn from_header(headers: &[String]) -> Result<Self> {
        let find = |wanted: &str| headers.iter().position(|h| h == wanted);

        let missing: Vec<&str> = [COL_NAME, COL_COMPETITION, COL_YEAR, COL_TIME]
            .into_iter()
            .filter(|c| find(c).is_none())
            .collect();
        if !missing.is_empty() {
            bail!("missing required column(s): {}", missing.join(", "));
        }

        let name = find(COL_NAME).unwrap();
        let competition = find(COL_COMPETITION).unwrap();
        let year = find(COL_YEAR).unwrap();
        let time = find(COL_TIME).unwrap();

        let segments = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| ![name, competition, year, time].contains(i))
            .map(|(i, h)| (i, h.clone()))
            .collect();

        Ok(ColumnLayout {
            name,
            competition,
            year,
            time,
            segments,
        })
    }

    fn segment_names(&self) -> Vec<String> {
        self.segments.iter().map(|(_, n)| n.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader (calamine)
// ---------------------------------------------------------------------------

fn load_spreadsheet(path: &Path) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path).context("opening spreadsheet")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("spreadsheet has no sheets")?
        .context("reading first sheet")?;
    dataset_from_range(&range)
}

fn dataset_from_range(range: &Range<Data>) -> Result<Dataset> {
    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .context("spreadsheet is empty")?
        .iter()
        .map(cell_to_string)
        .collect();
    let layout = ColumnLayout::from_header(&headers)?;

    static EMPTY_CELL: Data = Data::Empty;

    let mut records = Vec::new();
    for (row_no, row) in rows.enumerate() {
        // Trailing blank rows are common in hand-edited sheets.
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let get = |i: usize| row.get(i).unwrap_or(&EMPTY_CELL);

        let record = Record {
            name: cell_to_string(get(layout.name)),
            competition: cell_to_string(get(layout.competition)),
            year: cell_to_i32(get(layout.year))
                .with_context(|| format!("row {}: '{}' is not a year", row_no + 2, COL_YEAR))?,
            total_time: cell_to_f64(get(layout.time))
                .with_context(|| format!("row {}: '{}' is not a number", row_no + 2, COL_TIME))?,
            splits: layout
                .segments
                .iter()
                .map(|(i, name)| {
                    cell_to_f64(get(*i))
                        .with_context(|| format!("row {}: '{name}' is not a number", row_no + 2))
                })
                .collect::<Result<_>>()?,
        };
        records.push(record);
    }

    Dataset::new(layout.segment_names(), records)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn cell_to_f64(cell: &Data) -> Result<f64> {
    match cell {
        Data::Float(f) => Ok(*f),
        Data::Int(i) => Ok(*i as f64),
        Data::String(s) => s
            .trim()
            .parse::<f64>()
            .with_context(|| format!("'{s}' is not a number")),
        other => bail!("unexpected cell {other:?}"),
    }
}

fn cell_to_i32(cell: &Data) -> Result<i32> {
    match cell {
        Data::Int(i) => Ok(*i as i32),
        // Excel stores integers as floats.
        Data::Float(f) if f.fract() == 0.0 => Ok(*f as i32),
        Data::String(s) => s
            .trim()
            .parse::<i32>()
            .with_context(|| format!("'{s}' is not an integer")),
        other => bail!("unexpected cell {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let layout = ColumnLayout::from_header(&headers)?;

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        let get = |i: usize| row.get(i).unwrap_or("").trim();

        let record = Record {
            name: get(layout.name).to_string(),
            competition: get(layout.competition).to_string(),
            year: get(layout.year)
                .parse::<i32>()
                .with_context(|| format!("CSV row {row_no}: '{}' is not a year", COL_YEAR))?,
            total_time: get(layout.time)
                .parse::<f64>()
                .with_context(|| format!("CSV row {row_no}: '{}' is not a number", COL_TIME))?,
            splits: layout
                .segments
                .iter()
                .map(|(i, name)| {
                    get(*i)
                        .parse::<f64>()
                        .with_context(|| format!("CSV row {row_no}: '{name}' is not a number"))
                })
                .collect::<Result<_>>()?,
        };
        records.push(record);
    }

    Dataset::new(layout.segment_names(), records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (the default `df.to_json(orient='records')`).
/// Segment order follows the key order of the first record.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    let rows = root.as_array().context("expected top-level JSON array")?;

    // Header order from the first record's keys.
    let headers: Vec<String> = match rows.first() {
        Some(first) => first
            .as_object()
            .context("row 0 is not a JSON object")?
            .keys()
            .cloned()
            .collect(),
        None => bail!("JSON dataset is empty"),
    };
    let layout = ColumnLayout::from_header(&headers)?;

    let mut records = Vec::with_capacity(rows.len());
    for (row_no, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("row {row_no} is not a JSON object"))?;

        let str_field = |key: &str| -> Result<String> {
            obj.get(key)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .with_context(|| format!("row {row_no}: missing or non-string '{key}'"))
        };
        let num_field = |key: &str| -> Result<f64> {
            obj.get(key)
                .and_then(|v| v.as_f64())
                .with_context(|| format!("row {row_no}: missing or non-numeric '{key}'"))
        };

        let record = Record {
            name: str_field(COL_NAME)?,
            competition: str_field(COL_COMPETITION)?,
            year: obj
                .get(COL_YEAR)
                .and_then(|v| v.as_i64())
                .with_context(|| format!("row {row_no}: missing or non-integer '{COL_YEAR}'"))?
                as i32,
            total_time: num_field(COL_TIME)?,
            splits: layout
                .segments
                .iter()
                .map(|(_, name)| num_field(name))
                .collect::<Result<_>>()?,
        };
        records.push(record);
    }

    Dataset::new(layout.segment_names(), records)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Flat parquet table: `Name`/`Wettkampf` as Utf8, `Jahr` as Int32/Int64,
/// `Zeit` and the segment columns as Float32/Float64.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut segments: Option<Vec<String>> = None;
    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let headers: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
        let layout = ColumnLayout::from_header(&headers)?;
        if segments.is_none() {
            segments = Some(layout.segment_names());
        }

        for row in 0..batch.num_rows() {
            let record = Record {
                name: extract_string(batch.column(layout.name), row)
                    .with_context(|| format!("row {row}: reading '{COL_NAME}'"))?,
                competition: extract_string(batch.column(layout.competition), row)
                    .with_context(|| format!("row {row}: reading '{COL_COMPETITION}'"))?,
                year: extract_i32(batch.column(layout.year), row)
                    .with_context(|| format!("row {row}: reading '{COL_YEAR}'"))?,
                total_time: extract_f64(batch.column(layout.time), row)
                    .with_context(|| format!("row {row}: reading '{COL_TIME}'"))?,
                splits: layout
                    .segments
                    .iter()
                    .map(|(i, name)| {
                        extract_f64(batch.column(*i), row)
                            .with_context(|| format!("row {row}: reading '{name}'"))
                    })
                    .collect::<Result<_>>()?,
            };
            records.push(record);
        }
    }

    Dataset::new(segments.context("parquet file has no batches")?, records)
}

// -- Arrow scalar helpers --

fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<LargeStringArray>()
                .context("expected LargeStringArray")?;
            Ok(arr.value(row).to_string())
        }
        other => bail!("expected a string column, got {other:?}"),
    }
}

fn extract_i32(col: &Arc<dyn Array>, row: usize) -> Result<i32> {
    match col.data_type() {
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            Ok(arr.value(row))
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            Ok(arr.value(row) as i32)
        }
        other => bail!("expected an integer column, got {other:?}"),
    }
}

fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    match col.data_type() {
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            Ok(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            Ok(arr.value(row) as f64)
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            Ok(arr.value(row) as f64)
        }
        other => bail!("expected a float column, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn csv_load_keeps_segment_order() {
        let (_dir, path) = write_temp(
            "runs.csv",
            "Name,Wettkampf,Jahr,Zeit,H1,H2,H3\n\
             Anna,DM,2023,55.2,6.1,4.2,4.3\n\
             Berit,DM,2023,54.8,6.0,4.1,4.2\n",
        );
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.segments, ["H1", "H2", "H3"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].name, "Anna");
        assert_eq!(ds.records[1].total_time, 54.8);
        assert_eq!(ds.records[1].splits, vec![6.0, 4.1, 4.2]);
    }

    #[test]
    fn csv_missing_required_column_is_an_error() {
        let (_dir, path) = write_temp("runs.csv", "Name,Jahr,Zeit,H1\nAnna,2023,55.2,6.1\n");
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains("Wettkampf"), "{err:#}");
    }

    #[test]
    fn csv_non_numeric_split_is_an_error() {
        let (_dir, path) = write_temp(
            "runs.csv",
            "Name,Wettkampf,Jahr,Zeit,H1\nAnna,DM,2023,55.2,fast\n",
        );
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn json_load_matches_csv_load() {
        let (_dir, json_path) = write_temp(
            "runs.json",
            r#"[
                {"Name":"Anna","Wettkampf":"DM","Jahr":2023,"Zeit":55.2,"H1":6.1,"H2":4.2},
                {"Name":"Berit","Wettkampf":"DM","Jahr":2023,"Zeit":54.8,"H1":6.0,"H2":4.1}
            ]"#,
        );
        let ds = load_file(&json_path).unwrap();
        assert_eq!(ds.segments, ["H1", "H2"]);
        assert_eq!(ds.records[1].splits, vec![6.0, 4.1]);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("runs.pkl")).unwrap_err();
        assert!(err.to_string().contains("Unsupported"));
    }

    #[test]
    fn cache_reload_requires_a_source() {
        let mut cache = DatasetCache::default();
        assert!(cache.dataset().is_none());
        assert!(cache.reload().is_err());
    }

    #[test]
    fn cache_open_and_reload_replace_the_slot() {
        let (_dir, path) = write_temp(
            "runs.csv",
            "Name,Wettkampf,Jahr,Zeit,H1\nAnna,DM,2023,55.2,6.1\n",
        );
        let mut cache = DatasetCache::default();
        cache.open(DataSource::File(path.clone())).unwrap();
        assert_eq!(cache.dataset().unwrap().len(), 1);

        std::fs::write(
            &path,
            "Name,Wettkampf,Jahr,Zeit,H1\nAnna,DM,2023,55.2,6.1\nBerit,DM,2023,54.8,6.0\n",
        )
        .unwrap();
        cache.reload().unwrap();
        assert_eq!(cache.dataset().unwrap().len(), 2);
    }
}
