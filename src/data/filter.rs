use std::collections::BTreeSet;

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Filter criteria: conjunction of set membership and a time range
// ---------------------------------------------------------------------------

/// A snapshot of the filter widgets, built fresh per interaction and
/// consumed once. An empty allowed-set for any categorical criterion means
/// "match nothing" (the UI supplies all values as the default, so there is
/// no implicit "all" fallback here).
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub names: BTreeSet<String>,
    pub competitions: BTreeSet<String>,
    pub years: BTreeSet<i32>,
    /// Inclusive lower bound on the total time, seconds.
    pub min_time: f64,
    /// Inclusive upper bound on the total time, seconds.
    pub max_time: f64,
}

impl FilterCriteria {
    /// Criteria matching every record of `dataset` (the UI's starting state).
    pub fn all_of(dataset: &Dataset) -> Self {
        let (min_time, max_time) = dataset.time_bounds().unwrap_or((0.0, 0.0));
        FilterCriteria {
            names: dataset.unique_names(),
            competitions: dataset.unique_competitions(),
            years: dataset.unique_years(),
            min_time,
            max_time,
        }
    }

    /// All four conjuncts. Time bounds are inclusive on both ends;
    /// `min_time > max_time` simply matches nothing.
    pub fn matches(&self, record: &Record) -> bool {
        self.names.contains(&record.name)
            && self.competitions.contains(&record.competition)
            && self.years.contains(&record.year)
            && record.total_time >= self.min_time
            && record.total_time <= self.max_time
    }
}

// ---------------------------------------------------------------------------
// Row filter
// ---------------------------------------------------------------------------

/// Indices of records matching the criteria, in dataset order (stable).
pub fn filtered_indices(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// Materialize the filtered view as a new dataset with the same schema.
/// Used for the difference engine and the exporters; the table widget works
/// off [`filtered_indices`] instead.
pub fn apply(dataset: &Dataset, criteria: &FilterCriteria) -> Dataset {
    Dataset {
        records: dataset
            .records
            .iter()
            .filter(|rec| criteria.matches(rec))
            .cloned()
            .collect(),
        segments: dataset.segments.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn sample() -> Dataset {
        Dataset::new(
            vec!["H1".to_string()],
            vec![
                record("A", "X", 2023, 55.2, &[6.1]),
                record("B", "X", 2023, 54.8, &[6.0]),
                record("A", "Y", 2024, 56.3, &[6.3]),
                record("C", "X", 2023, 55.0, &[6.2]),
            ],
        )
        .unwrap()
    }

    fn criteria(names: &[&str], comps: &[&str], years: &[i32], min: f64, max: f64) -> FilterCriteria {
        FilterCriteria {
            names: names.iter().map(|s| s.to_string()).collect(),
            competitions: comps.iter().map(|s| s.to_string()).collect(),
            years: years.iter().copied().collect(),
            min_time: min,
            max_time: max,
        }
    }

    #[test]
    fn matches_all_four_conjuncts_and_keeps_order() {
        let ds = sample();
        let crit = criteria(&["A", "B"], &["X"], &[2023], 50.0, 60.0);
        let idx = filtered_indices(&ds, &crit);
        // Both 2023 "X" records of A and B, original relative order.
        assert_eq!(idx, vec![0, 1]);
        // Soundness: everything returned satisfies the predicate.
        for &i in &idx {
            assert!(crit.matches(&ds.records[i]));
        }
        // Completeness: nothing satisfying the predicate was dropped.
        for (i, rec) in ds.records.iter().enumerate() {
            assert_eq!(idx.contains(&i), crit.matches(rec));
        }
    }

    #[test]
    fn time_bounds_are_inclusive() {
        let ds = sample();
        // Exactly at the lower bound: included.
        let crit = criteria(&["A", "B", "C"], &["X", "Y"], &[2023, 2024], 55.0, 55.2);
        let idx = filtered_indices(&ds, &crit);
        assert_eq!(idx, vec![0, 3]); // 55.2 and 55.0, both inclusive
    }

    #[test]
    fn narrow_window_yields_empty_result() {
        let ds = sample();
        let crit = criteria(&["A", "B"], &["X"], &[2023], 55.0, 55.1);
        // Neither 55.2 nor 54.8 lies in [55.0, 55.1].
        assert!(filtered_indices(&ds, &crit).is_empty());
    }

    #[test]
    fn empty_allowed_set_matches_nothing() {
        let ds = sample();
        let crit = criteria(&[], &["X", "Y"], &[2023, 2024], 0.0, 100.0);
        assert!(filtered_indices(&ds, &crit).is_empty());
    }

    #[test]
    fn inverted_time_range_is_empty_not_an_error() {
        let ds = sample();
        let crit = criteria(&["A", "B", "C"], &["X", "Y"], &[2023, 2024], 60.0, 50.0);
        assert!(filtered_indices(&ds, &crit).is_empty());
    }

    #[test]
    fn apply_preserves_schema_and_values() {
        let ds = sample();
        let crit = criteria(&["B"], &["X"], &[2023], 50.0, 60.0);
        let view = apply(&ds, &crit);
        assert_eq!(view.segments, ds.segments);
        assert_eq!(view.records, vec![ds.records[1].clone()]);
    }

    #[test]
    fn all_of_matches_every_record() {
        let ds = sample();
        let crit = FilterCriteria::all_of(&ds);
        assert_eq!(filtered_indices(&ds, &crit).len(), ds.len());
    }
}
