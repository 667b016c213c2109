use super::diff::DiffTable;
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Wide → long reshaping for the chart
// ---------------------------------------------------------------------------

/// One row per (series, segment) pair. `segment_order` is the categorical
/// x-axis order and equals the input column order verbatim; it must never be
/// resorted alphabetically.
#[derive(Debug, Clone, PartialEq)]
pub struct LongForm {
    pub segment_order: Vec<String>,
    pub points: Vec<LongPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LongPoint {
    /// Composite series label ("Name - Wettkampf").
    pub series: String,
    pub segment: String,
    pub value: f64,
}

/// Unpivot a difference table into chart input: `rows × segments` points.
///
/// A chart needs at least two segment columns and one row; anything less is
/// [`DashboardError::InsufficientChartData`], which the caller handles by
/// skipping the chart instead of rendering a degenerate one.
pub fn to_long_form(table: &DiffTable) -> Result<LongForm> {
    if table.segments.len() < 2 || table.rows.is_empty() {
        return Err(DashboardError::InsufficientChartData);
    }

    let mut points = Vec::with_capacity(table.rows.len() * table.segments.len());
    for row in &table.rows {
        let series = row.series_label();
        for (segment, &value) in table.segments.iter().zip(row.deltas.iter()) {
            points.push(LongPoint {
                series: series.clone(),
                segment: segment.clone(),
                value,
            });
        }
    }

    Ok(LongForm {
        segment_order: table.segments.clone(),
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::diff::DiffRow;

    fn table(segments: &[&str], rows: &[(&str, &[f64])]) -> DiffTable {
        DiffTable {
            segments: segments.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|(name, deltas)| DiffRow {
                    name: name.to_string(),
                    competition: "X".to_string(),
                    deltas: deltas.to_vec(),
                    is_reference: false,
                })
                .collect(),
        }
    }

    #[test]
    fn produces_rows_times_segments_points() {
        let t = table(
            &["H3", "H1", "H2"],
            &[("A", &[0.0, 0.1, 0.2]), ("B", &[-0.1, 0.0, 0.3])],
        );
        let long = to_long_form(&t).unwrap();
        assert_eq!(long.points.len(), 2 * 3);
        assert_eq!(long.points[0].series, "A - X");
        assert_eq!(long.points[0].segment, "H3");
        assert_eq!(long.points[4].segment, "H1");
        assert_eq!(long.points[5].value, 0.3);
    }

    #[test]
    fn segment_order_is_input_order_verbatim() {
        // Deliberately non-alphabetical input order.
        let t = table(&["H3", "H1", "H2"], &[("A", &[1.0, 2.0, 3.0])]);
        let long = to_long_form(&t).unwrap();
        assert_eq!(long.segment_order, ["H3", "H1", "H2"]);
    }

    #[test]
    fn too_few_segments_is_insufficient_data() {
        let t = table(&["H1"], &[("A", &[1.0])]);
        assert!(matches!(
            to_long_form(&t).unwrap_err(),
            DashboardError::InsufficientChartData
        ));
    }

    #[test]
    fn zero_rows_is_insufficient_data() {
        let t = table(&["H1", "H2"], &[]);
        assert!(matches!(
            to_long_form(&t).unwrap_err(),
            DashboardError::InsufficientChartData
        ));
    }
}
