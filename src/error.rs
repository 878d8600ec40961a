use thiserror::Error;

/// Top-level error type for the layout engine.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Array(#[from] ArrayError),

    #[error("failed to serialize export payload: {0}")]
    Export(serde_json::Error),
}

/// Errors raised while validating building or obstruction outlines.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("outline edges {first} and {second} cross each other")]
    SelfIntersecting { first: usize, second: usize },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors related to engine configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{parameter} must be positive, got {value}")]
    NonPositive { parameter: &'static str, value: f64 },

    #[error("{parameter} must not be negative, got {value}")]
    Negative { parameter: &'static str, value: f64 },

    #[error("east-west system requires {0}")]
    MissingEastWest(&'static str),

    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors related to array and panel lookups.
#[derive(Debug, Error)]
pub enum ArrayError {
    #[error("array not found")]
    ArrayNotFound,

    #[error("no panel at row {row}, col {col}")]
    PanelNotFound { row: usize, col: usize },

    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    CellOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("extent of {requested} panels exceeds the limit of {max}")]
    ExtentTooLarge { requested: usize, max: usize },

    #[error("cell ({row}, {col}) is not selectable")]
    NotSelectable { row: usize, col: usize },
}

/// Convenience type alias for results using [`LayoutError`].
pub type Result<T> = std::result::Result<T, LayoutError>;
