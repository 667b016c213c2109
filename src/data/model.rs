use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Required column names (as they appear in the source spreadsheets)
// ---------------------------------------------------------------------------

pub const COL_NAME: &str = "Name";
pub const COL_COMPETITION: &str = "Wettkampf";
pub const COL_YEAR: &str = "Jahr";
pub const COL_TIME: &str = "Zeit";

pub const REQUIRED_COLUMNS: [&str; 4] = [COL_NAME, COL_COMPETITION, COL_YEAR, COL_TIME];

// ---------------------------------------------------------------------------
// Record – one row of the timing table
// ---------------------------------------------------------------------------

/// One athlete's run in one competition: identity columns plus the ordered
/// split times. `splits` is aligned with [`Dataset::segments`].
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub competition: String,
    pub year: i32,
    /// Total time in seconds.
    pub total_time: f64,
    /// Per-segment split times, one per segment column.
    pub splits: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset. Segment column order is significant: it is the
/// order the columns appeared in the source file and drives the chart x-axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// All runs (rows), in source order.
    pub records: Vec<Record>,
    /// Ordered segment column names (everything except the four required
    /// columns).
    pub segments: Vec<String>,
}

impl Dataset {
    /// Build a dataset, checking the split/segment alignment invariant.
    pub fn new(segments: Vec<String>, records: Vec<Record>) -> anyhow::Result<Self> {
        for (i, rec) in records.iter().enumerate() {
            if rec.splits.len() != segments.len() {
                anyhow::bail!(
                    "row {i}: {} split values but {} segment columns",
                    rec.splits.len(),
                    segments.len()
                );
            }
        }
        Ok(Dataset { records, segments })
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Full header row: required columns first, then segments in order.
    pub fn header(&self) -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .map(|s| s.to_string())
            .chain(self.segments.iter().cloned())
            .collect()
    }

    /// Sorted unique athlete names.
    pub fn unique_names(&self) -> BTreeSet<String> {
        self.records.iter().map(|r| r.name.clone()).collect()
    }

    /// Sorted unique competition names.
    pub fn unique_competitions(&self) -> BTreeSet<String> {
        self.records.iter().map(|r| r.competition.clone()).collect()
    }

    /// Sorted unique years.
    pub fn unique_years(&self) -> BTreeSet<i32> {
        self.records.iter().map(|r| r.year).collect()
    }

    /// (min, max) of the total-time column, or `None` when empty.
    pub fn time_bounds(&self) -> Option<(f64, f64)> {
        let mut it = self.records.iter().map(|r| r.total_time);
        let first = it.next()?;
        let (min, max) = it.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        Some((min, max))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(name: &str, comp: &str, year: i32, time: f64, splits: &[f64]) -> Record {
        Record {
            name: name.to_string(),
            competition: comp.to_string(),
            year,
            total_time: time,
            splits: splits.to_vec(),
        }
    }

    #[test]
    fn new_rejects_misaligned_splits() {
        let segs = vec!["H1".to_string(), "H2".to_string()];
        let recs = vec![record("A", "X", 2023, 55.2, &[6.1])];
        assert!(Dataset::new(segs, recs).is_err());
    }

    #[test]
    fn header_keeps_segment_order() {
        let ds = Dataset::new(
            vec!["H2".to_string(), "H1".to_string()],
            vec![record("A", "X", 2023, 55.2, &[6.1, 6.2])],
        )
        .unwrap();
        assert_eq!(ds.header(), ["Name", "Wettkampf", "Jahr", "Zeit", "H2", "H1"]);
    }

    #[test]
    fn time_bounds_span_all_records() {
        let ds = Dataset::new(
            vec![],
            vec![
                record("A", "X", 2023, 55.2, &[]),
                record("B", "X", 2023, 54.8, &[]),
                record("C", "Y", 2024, 56.0, &[]),
            ],
        )
        .unwrap();
        assert_eq!(ds.time_bounds(), Some((54.8, 56.0)));
        assert!(Dataset::default().time_bounds().is_none());
    }
}
