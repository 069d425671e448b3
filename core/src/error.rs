use thiserror::Error;

/// Failure to obtain an external resource such as a texture file.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// The resource does not exist at the requested path.
    #[error("resource not found: {path}")]
    Missing {
        /// Requested path.
        path: String,
    },
    /// The resource exists but could not be decoded or read.
    #[error("failed to read resource {path}: {reason}")]
    Unreadable {
        /// Requested path.
        path: String,
        /// Backend-provided description of the failure.
        reason: String,
    },
}

impl ResourceError {
    /// Path of the resource that failed to load.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Missing { path } | Self::Unreadable { path, .. } => path,
        }
    }
}

/// Top-level error kinds surfaced by level construction and the session.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    /// A mandatory resource failed to load.
    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),
    /// The environment could not be set up.
    #[error("initialization failed: {0}")]
    Initialization(String),
    /// An internal invariant did not hold.
    #[error("logic error: {0}")]
    Logic(String),
}

/// Reasons a tower placement request can be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum PlacementError {
    /// The session already ended.
    #[error("the session is over")]
    SessionOver,
    /// The requested cell lies outside the tile map.
    #[error("placement lies outside the map")]
    OutOfBounds,
    /// Towers may only be placed during the preparation phase.
    #[error("cannot place towers after the preparation phase")]
    PrepPhaseOver,
    /// The tower cap has been reached.
    #[error("max towers reached")]
    TowerCapReached,
    /// The requested cell already holds an active tower.
    #[error("cell already holds a tower")]
    Occupied,
}
