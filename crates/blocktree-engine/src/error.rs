use crate::tree::Path;

/// Failures raised while addressing or mutating the document tree.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    /// The path no longer resolves, usually because an earlier mutation moved things.
    #[error("stale path: {0} does not resolve")]
    StalePath(Path),
    /// The mutation would break a structural invariant (e.g. leave an element childless).
    #[error("invalid structure at {path}: {reason}")]
    InvalidStructure { path: Path, reason: String },
    /// No drop boundary could be measured for the current drag.
    #[error("no drop boundaries are available")]
    GeometryUnavailable,
    /// A drag call named a session that is not the armed one.
    #[error("drag session {0} is not active")]
    UnknownSession(uuid::Uuid),
}

impl EditError {
    pub(crate) fn invalid(path: &Path, reason: impl Into<String>) -> Self {
        EditError::InvalidStructure {
            path: path.clone(),
            reason: reason.into(),
        }
    }
}
