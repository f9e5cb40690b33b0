//! Error types for model registration and solving.

use thiserror::Error;

/// Errors that can occur while building or running a form-finding model.
///
/// Everything structurally detectable is reported at registration or at
/// solve setup; only a mid-run geometric collapse aborts an iteration loop.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Geometry leaves a force direction undefined, either because two
    /// reference points merged into one node or because a segment
    /// collapsed during the run.
    #[error("degenerate geometry: {detail}")]
    DegenerateGeometry {
        /// Description of the offending geometry.
        detail: String,
    },

    /// A node referenced by a goal or boundary condition received no mass
    /// from any mass applier.
    #[error("node {node} is referenced but has no mass assigned")]
    UnassignedMass {
        /// Handle of the massless node.
        node: usize,
    },

    /// Registration input rejected: wrong arity, non-finite parameters,
    /// or registration attempted after the solve started.
    #[error("invalid registration: {0}")]
    InvalidRegistration(String),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, ModelError>;
