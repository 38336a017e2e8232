use thiserror::Error;

/// Top-level error type for the lineweight engine.
#[derive(Debug, Error)]
pub enum LineweightError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Layer(#[from] LayerError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors that invalidate a whole run before any segment is processed.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("no geometry selected")]
    EmptySelection,

    #[error("no viewpoint to project from")]
    MissingViewpoint,

    #[error("invalid viewpoint: {0}")]
    InvalidViewpoint(String),

    #[error("tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),

    #[error("invalid weight policy: {0}")]
    InvalidWeightPolicy(String),
}

/// Failures reported by an external collaborator.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("projection failed: {0}")]
    Projection(String),

    #[error("intersection failed: {0}")]
    Intersection(String),

    #[error("concavity sample unavailable: {0}")]
    Concavity(String),
}

/// Errors raised by a layer repository.
#[derive(Debug, Error)]
pub enum LayerError {
    #[error("layer `{0}` exists but cannot hold drawing geometry")]
    Conflict(String),

    #[error("parent layer not found for `{0}`")]
    MissingParent(String),

    #[error("layer not found: {0}")]
    NotFound(String),
}

/// Convenience type alias for results using [`LineweightError`].
pub type Result<T> = std::result::Result<T, LineweightError>;
