/// Convenience result type used across Darkroom.
pub type DarkroomResult<T> = Result<T, DarkroomError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum DarkroomError {
    /// A parameter assignment was rejected at the parameter boundary.
    ///
    /// The parameter keeps its previous value.
    #[error("invalid value for parameter '{param}': {reason}")]
    InvalidParameterValue {
        /// Parameter name.
        param: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A transform's compute function failed during a refresh pass.
    ///
    /// The transform keeps its last valid cached output and stays dirty.
    #[error("transform '{transform}' failed to compute: {reason}")]
    Compute {
        /// Identifier of the failing transform.
        transform: String,
        /// Failure description.
        reason: String,
    },

    /// The derived dependency graph contains a cycle. Build-time, fatal.
    #[error("pipeline dependency graph contains a cycle through: {0}")]
    CyclicPipeline(String),

    /// An edge references a transform or window that does not exist.
    /// Build-time, fatal.
    #[error("'{referrer}' references unknown '{reference}'")]
    UnresolvedReference {
        /// Identifier of the declaring transform or window.
        referrer: String,
        /// The identifier that failed to resolve.
        reference: String,
    },

    /// A transform index outside a window's chain was requested.
    #[error("transform index {index} out of range for window with {len} transforms")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of transforms in the window.
        len: usize,
    },

    /// Invalid construction data (empty or duplicate identifiers, zero-sized
    /// frames, malformed parameter specs).
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DarkroomError {
    /// Build a [`DarkroomError::InvalidParameterValue`] value.
    pub fn invalid_param(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameterValue {
            param: param.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`DarkroomError::Compute`] value.
    pub fn compute(transform: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Compute {
            transform: transform.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`DarkroomError::UnresolvedReference`] value.
    pub fn unresolved(referrer: impl Into<String>, reference: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            referrer: referrer.into(),
            reference: reference.into(),
        }
    }

    /// Build a [`DarkroomError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
