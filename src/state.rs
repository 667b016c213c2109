use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::{DashboardConfig, CONFIG_FILE};
use crate::data::diff::compute_differences;
use crate::data::filter::{self, FilterCriteria};
use crate::data::loader::{DataSource, DatasetCache};
use crate::data::model::Dataset;
use crate::data::reshape::{to_long_form, LongForm};
use crate::error::DashboardError;
use crate::export::{export_dataset, ExportFormat};

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Filter widget state
// ---------------------------------------------------------------------------

/// Raw widget state the criteria snapshot is built from. Time bounds are
/// free text so the user can type; invalid text falls back to the dataset's
/// own bounds when the criteria are built.
#[derive(Debug, Clone, Default)]
pub struct FilterWidgets {
    pub names: BTreeSet<String>,
    pub competitions: BTreeSet<String>,
    pub years: BTreeSet<i32>,
    pub min_time_text: String,
    pub max_time_text: String,
}

impl FilterWidgets {
    /// Everything selected, time texts at the dataset bounds.
    fn all_of(dataset: &Dataset) -> Self {
        let criteria = FilterCriteria::all_of(dataset);
        FilterWidgets {
            names: criteria.names,
            competitions: criteria.competitions,
            years: criteria.years,
            min_time_text: format!("{:.2}", criteria.min_time),
            max_time_text: format!("{:.2}", criteria.max_time),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. The pipeline itself lives in
/// `data::{filter, diff, reshape}`; this struct only wires widget state into
/// those pure functions and caches the results the widgets read back.
pub struct AppState {
    pub config: DashboardConfig,
    /// Single-slot dataset cache; replaced by open/reload, never mutated.
    pub cache: DatasetCache,
    pub filters: FilterWidgets,
    /// Indices (into the full dataset) of rows passing the current filters.
    pub visible_indices: Vec<usize>,
    /// Reference row for the difference chart, as an index into the full
    /// dataset. At most one row is selectable in the table.
    pub selected_row: Option<usize>,
    /// Status / error message shown in the top bar.
    pub status: Option<StatusMessage>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            config: DashboardConfig::default(),
            cache: DatasetCache::default(),
            filters: FilterWidgets::default(),
            visible_indices: Vec::new(),
            selected_row: None,
            status: None,
        }
    }
}

impl AppState {
    /// Read the config file and open the configured source, if any.
    /// Load failures leave the dashboard empty, never abort startup.
    pub fn from_config_file() -> Self {
        let mut state = AppState::default();
        match DashboardConfig::load_or_default(Path::new(CONFIG_FILE)) {
            Ok(config) => state.config = config,
            Err(e) => {
                log::error!("Bad config file: {e:#}");
                state.set_status(StatusLevel::Error, format!("Config error: {e:#}"));
                return state;
            }
        }

        let startup = match (&state.config.data_path, &state.config.remote) {
            (Some(path), _) => Some(DataSource::File(path.clone())),
            (None, Some(remote)) => Some(DataSource::Remote {
                url: remote.url.clone(),
                token_env: remote.token_env.clone(),
            }),
            (None, None) => None,
        };
        if let Some(source) = startup {
            state.open_source(source);
        }
        state
    }

    pub fn set_status(&mut self, level: StatusLevel, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            level,
            text: text.into(),
        });
    }

    // -- loading ------------------------------------------------------------

    /// Open a file path as the new dataset.
    pub fn open_path(&mut self, path: PathBuf) {
        self.open_source(DataSource::File(path));
    }

    /// Load from `source`, validate the schema, and reset filters/selection.
    pub fn open_source(&mut self, source: DataSource) {
        let description = source.describe();
        match self.cache.open(source) {
            Ok(dataset) => {
                if let Err(e) = self.config.validate_schema(dataset) {
                    log::error!("Schema mismatch in {description}: {e}");
                    self.cache.clear();
                    self.reset_views();
                    self.set_status(StatusLevel::Error, e.to_string());
                    return;
                }
                log::info!(
                    "Loaded {} runs with {} segment columns from {description}",
                    dataset.len(),
                    dataset.segments.len()
                );
                self.filters = FilterWidgets::all_of(dataset);
                self.selected_row = None;
                self.status = None;
                self.refilter();
            }
            Err(e) => {
                log::error!("Failed to load {description}: {e:#}");
                self.set_status(
                    StatusLevel::Error,
                    DashboardError::DataUnavailable(format!("{e:#}")).to_string(),
                );
            }
        }
    }

    /// Explicit reload of the current source; the only way the cache slot is
    /// refreshed.
    pub fn reload(&mut self) {
        match self.cache.reload() {
            Ok(dataset) => {
                log::info!("Reloaded: {} runs", dataset.len());
                self.filters = FilterWidgets::all_of(dataset);
                self.selected_row = None;
                self.status = None;
                self.refilter();
            }
            Err(e) => {
                log::error!("Reload failed: {e:#}");
                self.set_status(
                    StatusLevel::Error,
                    DashboardError::DataUnavailable(format!("{e:#}")).to_string(),
                );
            }
        }
    }

    fn reset_views(&mut self) {
        self.filters = FilterWidgets::default();
        self.visible_indices.clear();
        self.selected_row = None;
    }

    // -- filtering ----------------------------------------------------------

    /// Build the criteria snapshot from the widgets. Unparseable time text
    /// substitutes the dataset's own bound; the second return value carries
    /// the warning to show in that case.
    pub fn criteria(&self) -> Option<(FilterCriteria, Option<DashboardError>)> {
        let dataset = self.cache.dataset()?;
        let (ds_min, ds_max) = dataset.time_bounds().unwrap_or((0.0, 0.0));

        let mut warning = None;
        let mut parse = |text: &str, fallback: f64| match text.trim().parse::<f64>() {
            Ok(v) => v,
            Err(_) => {
                warning = Some(DashboardError::InvalidNumericInput {
                    input: text.trim().to_string(),
                });
                fallback
            }
        };

        let criteria = FilterCriteria {
            names: self.filters.names.clone(),
            competitions: self.filters.competitions.clone(),
            years: self.filters.years.clone(),
            min_time: parse(&self.filters.min_time_text, ds_min),
            max_time: parse(&self.filters.max_time_text, ds_max),
        };
        Some((criteria, warning))
    }

    /// Recompute `visible_indices` after any widget change.
    pub fn refilter(&mut self) {
        let Some((criteria, warning)) = self.criteria() else {
            self.visible_indices.clear();
            return;
        };
        let dataset = self.cache.dataset().unwrap();
        self.visible_indices = filter::filtered_indices(dataset, &criteria);

        // A reference row that got filtered away is no selection anymore.
        if let Some(sel) = self.selected_row {
            if !self.visible_indices.contains(&sel) {
                self.selected_row = None;
            }
        }

        if let Some(w) = warning {
            log::warn!("{w}");
            self.set_status(StatusLevel::Warning, w.to_string());
        } else if matches!(
            self.status,
            Some(StatusMessage {
                level: StatusLevel::Warning,
                ..
            })
        ) {
            self.status = None;
        }
    }

    /// Click on a table row: select it as the reference, or deselect.
    pub fn toggle_row_selection(&mut self, dataset_index: usize) {
        self.selected_row = if self.selected_row == Some(dataset_index) {
            None
        } else {
            Some(dataset_index)
        };
    }

    /// The filtered view as a standalone dataset (for diffing and export).
    pub fn filtered_view(&self) -> Option<Dataset> {
        let dataset = self.cache.dataset()?;
        let (criteria, _) = self.criteria()?;
        Some(filter::apply(dataset, &criteria))
    }

    // -- chart --------------------------------------------------------------

    /// Long-form chart input: split differences of every visible row against
    /// the selected reference row.
    pub fn chart_data(&self) -> Result<LongForm, DashboardError> {
        let selected = self
            .selected_row
            .ok_or(DashboardError::InvalidSelection { selected: 0 })?;
        let position = self
            .visible_indices
            .iter()
            .position(|&i| i == selected)
            .ok_or(DashboardError::InvalidSelection { selected: 0 })?;

        let view = self
            .filtered_view()
            .ok_or(DashboardError::InsufficientChartData)?;
        let table = compute_differences(&view, position, &self.config.diff)?;
        to_long_form(&table)
    }

    // -- export -------------------------------------------------------------

    /// Export the filtered view; outcome lands in the status line.
    pub fn export(&mut self, format: ExportFormat, path: &Path) {
        let Some(view) = self.filtered_view() else {
            self.set_status(StatusLevel::Warning, "Nothing to export, load data first");
            return;
        };
        match export_dataset(&view, format, path) {
            Ok(()) => {
                log::info!("Exported {} rows to {}", view.len(), path.display());
                self.set_status(
                    StatusLevel::Info,
                    format!("Exported {} rows to {}", view.len(), path.display()),
                );
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.set_status(StatusLevel::Error, format!("Export failed: {e:#}"));
            }
        }
    }
}
