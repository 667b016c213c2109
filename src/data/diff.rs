use serde::Deserialize;

use super::model::Dataset;
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Difference policy
// ---------------------------------------------------------------------------

/// How the difference table is derived from a filtered view.
///
/// Columns are excluded by *name*, not by position: the original tooling
/// dropped the first and last table columns by index, which silently breaks
/// as soon as the sheet layout changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiffPolicy {
    /// Segment columns left out of the difference computation.
    pub exclude: Vec<String>,
    /// Keep the reference row in the output (as an all-zero row).
    pub include_reference: bool,
}

impl Default for DiffPolicy {
    fn default() -> Self {
        DiffPolicy {
            exclude: Vec::new(),
            include_reference: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Difference table
// ---------------------------------------------------------------------------

/// Per-segment deltas of every row relative to one reference row.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffTable {
    /// Selected segment columns, in view order.
    pub segments: Vec<String>,
    pub rows: Vec<DiffRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiffRow {
    pub name: String,
    pub competition: String,
    /// `row[c] - reference[c]`, aligned with [`DiffTable::segments`].
    pub deltas: Vec<f64>,
    pub is_reference: bool,
}

impl DiffRow {
    /// Composite chart series label, `"Name - Wettkampf"`. Recomputed per
    /// call; never stored as a column.
    pub fn series_label(&self) -> String {
        format!("{} - {}", self.name, self.competition)
    }
}

// ---------------------------------------------------------------------------
// Difference engine
// ---------------------------------------------------------------------------

/// Compute per-segment differences of every record in `view` against the
/// record at `reference`. Purely functional: `view` is not mutated.
///
/// Fails with [`DashboardError::InvalidSelection`] when the view is empty or
/// the index is out of range; enforcing that the *user* picked exactly one
/// row is the caller's job.
pub fn compute_differences(
    view: &Dataset,
    reference: usize,
    policy: &DiffPolicy,
) -> Result<DiffTable> {
    if view.is_empty() || reference >= view.len() {
        return Err(DashboardError::InvalidSelection {
            selected: if view.is_empty() { 0 } else { reference },
        });
    }

    // Selected columns: segment order preserved, named exclusions dropped.
    let selected: Vec<usize> = view
        .segments
        .iter()
        .enumerate()
        .filter(|(_, name)| !policy.exclude.iter().any(|ex| ex == *name))
        .map(|(i, _)| i)
        .collect();

    let segments: Vec<String> = selected.iter().map(|&i| view.segments[i].clone()).collect();
    let ref_rec = &view.records[reference];

    let rows = view
        .records
        .iter()
        .enumerate()
        .filter(|(i, _)| policy.include_reference || *i != reference)
        .map(|(i, rec)| DiffRow {
            name: rec.name.clone(),
            competition: rec.competition.clone(),
            deltas: selected
                .iter()
                .map(|&c| rec.splits[c] - ref_rec.splits[c])
                .collect(),
            is_reference: i == reference,
        })
        .collect();

    Ok(DiffTable { segments, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn view() -> Dataset {
        Dataset::new(
            vec!["H1".to_string(), "H2".to_string(), "H3".to_string()],
            vec![
                record("A", "X", 2023, 55.2, &[55.2, 6.4, 6.6]),
                record("B", "X", 2023, 54.8, &[54.8, 6.2, 6.5]),
                record("C", "Y", 2024, 56.0, &[56.0, 6.8, 6.9]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn reference_row_is_all_zeros_and_included_by_default() {
        let table = compute_differences(&view(), 0, &DiffPolicy::default()).unwrap();
        assert_eq!(table.rows.len(), 3);
        let reference = &table.rows[0];
        assert!(reference.is_reference);
        assert!(reference.deltas.iter().all(|&d| d == 0.0));
    }

    #[test]
    fn delta_is_row_minus_reference() {
        // B's H1 value 54.8 against reference A's 55.2 → -0.4.
        let table = compute_differences(&view(), 0, &DiffPolicy::default()).unwrap();
        let b = &table.rows[1];
        assert_eq!(b.name, "B");
        assert!((b.deltas[0] - (54.8 - 55.2)).abs() < 1e-12);
    }

    #[test]
    fn translation_consistency_between_reference_rows() {
        // diff(V,i)[k][c] - diff(V,i)[j][c] == diff(V,j)[k][c]
        let v = view();
        let di = compute_differences(&v, 0, &DiffPolicy::default()).unwrap();
        let dj = compute_differences(&v, 1, &DiffPolicy::default()).unwrap();
        for k in 0..v.len() {
            for c in 0..di.segments.len() {
                let lhs = di.rows[k].deltas[c] - di.rows[1].deltas[c];
                assert!((lhs - dj.rows[k].deltas[c]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn named_exclusions_drop_columns_but_keep_order() {
        let policy = DiffPolicy {
            exclude: vec!["H2".to_string()],
            include_reference: true,
        };
        let table = compute_differences(&view(), 0, &policy).unwrap();
        assert_eq!(table.segments, ["H1", "H3"]);
        assert_eq!(table.rows[1].deltas.len(), 2);
    }

    #[test]
    fn exclude_reference_policy_drops_the_zero_row() {
        let policy = DiffPolicy {
            exclude: Vec::new(),
            include_reference: false,
        };
        let table = compute_differences(&view(), 1, &policy).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert!(table.rows.iter().all(|r| !r.is_reference));
        assert!(table.rows.iter().all(|r| r.name != "B"));
    }

    #[test]
    fn out_of_range_reference_is_invalid_selection() {
        let err = compute_differences(&view(), 7, &DiffPolicy::default()).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidSelection { .. }));

        let empty = Dataset::new(vec!["H1".to_string()], vec![]).unwrap();
        let err = compute_differences(&empty, 0, &DiffPolicy::default()).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidSelection { selected: 0 }));
    }
}
