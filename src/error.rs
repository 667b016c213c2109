use thiserror::Error;

// ---------------------------------------------------------------------------
// Domain errors
// ---------------------------------------------------------------------------

/// Errors surfaced to the user. None of these terminate the session: load
/// failures leave the dashboard empty, everything else is recovered locally.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The dataset could not be loaded (missing file, bad credential,
    /// non-200 response, malformed spreadsheet).
    #[error("dataset unavailable: {0}")]
    DataUnavailable(String),

    /// A configured segment column is missing from the loaded schema.
    #[error("schema mismatch: missing column(s) {missing:?}")]
    SchemaMismatch { missing: Vec<String> },

    /// Min/max time text was not parseable as a number. The caller falls
    /// back to the dataset's own bounds.
    #[error("'{input}' is not a valid time in seconds")]
    InvalidNumericInput { input: String },

    /// Zero or more than one reference row designated for the difference
    /// computation, or an index outside the filtered view.
    #[error("select exactly one reference row ({selected} selected)")]
    InvalidSelection { selected: usize },

    /// Fewer than two segment columns or zero rows available for a chart.
    #[error("not enough data for a split chart")]
    InsufficientChartData,
}

pub type Result<T> = std::result::Result<T, DashboardError>;
