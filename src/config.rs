use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::diff::DiffPolicy;
use crate::data::model::Dataset;
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Optional JSON config file (`hurdleboard.json` in the working directory).
/// Everything has a default so the app also runs with no config at all.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Dataset to open on startup.
    pub data_path: Option<PathBuf>,

    /// Remote source used when `data_path` is absent.
    pub remote: Option<RemoteSource>,

    /// Segment columns the dashboard expects. When set, the loaded schema is
    /// checked against this list and a missing column fails the load with a
    /// schema-mismatch message instead of silently charting the wrong thing.
    pub expected_segments: Option<Vec<String>>,

    /// How the difference table is derived (named column exclusions,
    /// reference-row policy).
    pub diff: DiffPolicy,
}

/// Bearer-token-protected HTTP source. The token itself stays out of the
/// config file; only the environment variable name is stored.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSource {
    pub url: String,
    pub token_env: String,
}

pub const CONFIG_FILE: &str = "hurdleboard.json";

impl DashboardConfig {
    /// Read the config file if present, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(DashboardConfig::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Check a freshly loaded dataset against `expected_segments`.
    pub fn validate_schema(
        &self,
        dataset: &Dataset,
    ) -> std::result::Result<(), DashboardError> {
        let Some(expected) = &self.expected_segments else {
            return Ok(());
        };
        let missing: Vec<String> = expected
            .iter()
            .filter(|col| !dataset.segments.contains(col))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DashboardError::SchemaMismatch { missing })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn dataset() -> Dataset {
        Dataset::new(
            vec!["H1".to_string(), "H2".to_string()],
            vec![record("A", "X", 2023, 55.2, &[6.1, 4.2])],
        )
        .unwrap()
    }

    #[test]
    fn missing_config_file_means_defaults() {
        let cfg = DashboardConfig::load_or_default(Path::new("does-not-exist.json")).unwrap();
        assert!(cfg.data_path.is_none());
        assert!(cfg.expected_segments.is_none());
        assert!(cfg.diff.include_reference);
    }

    #[test]
    fn config_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            r#"{
                "data_path": "data/Analyse10.xlsx",
                "expected_segments": ["H1", "H2"],
                "diff": { "exclude": ["H2"], "include_reference": false }
            }"#,
        )
        .unwrap();
        let cfg = DashboardConfig::load_or_default(&path).unwrap();
        assert_eq!(cfg.data_path.unwrap(), PathBuf::from("data/Analyse10.xlsx"));
        assert_eq!(cfg.diff.exclude, ["H2"]);
        assert!(!cfg.diff.include_reference);
    }

    #[test]
    fn schema_validation_names_the_missing_columns() {
        let cfg = DashboardConfig {
            expected_segments: Some(vec!["H1".to_string(), "H9".to_string()]),
            ..Default::default()
        };
        let err = cfg.validate_schema(&dataset()).unwrap_err();
        match err {
            DashboardError::SchemaMismatch { missing } => assert_eq!(missing, ["H9"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn no_expected_segments_accepts_any_schema() {
        assert!(DashboardConfig::default().validate_schema(&dataset()).is_ok());
    }
}
