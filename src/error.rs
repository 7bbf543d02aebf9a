//! Error types for names and the node tree.

/// Coarse classification of a [`ContractError`].
///
/// Useful when callers only care about *which* contract broke, not about the
/// message or the cause chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// A precondition failed: the caller supplied invalid input.
    IllegalArgument,
    /// A class invariant failed: the object is corrupted.
    InvalidState,
    /// A postcondition failed after an attempted mutation.
    MethodFailed,
    /// A dependent operation failed; the cause is attached.
    ServiceFailure,
}

/// Contract violation raised by [`Name`](crate::Name) and [`Tree`](crate::Tree).
///
/// The four variants mirror the three contract checks (precondition,
/// invariant, postcondition) plus a wrapper for failures that cross a
/// layer boundary. Uses `#[non_exhaustive]` for forward compatibility.
///
/// # Examples
///
/// ```rust
/// use nametree::{ContractError, ErrorKind};
///
/// let cause = ContractError::InvalidState { message: "invalid base name".into() };
/// let err = ContractError::service_failure("base name lookup failed", cause);
///
/// assert_eq!(err.kind(), ErrorKind::ServiceFailure);
/// assert_eq!(err.trigger().map(ContractError::kind), Some(ErrorKind::InvalidState));
/// assert_eq!(err.to_string(), "service failure: base name lookup failed");
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    /// Caller supplied invalid input (out-of-range index, empty component,
    /// malformed delimiter, stale handle). Nothing was mutated.
    #[error("illegal argument: {message}")]
    IllegalArgument {
        /// What was wrong with the input.
        message: String,
    },

    /// A class invariant does not hold on an object that should be well-formed.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Which invariant broke.
        message: String,
    },

    /// A postcondition failed; any tentative change has been rolled back.
    #[error("method failed: {message}")]
    MethodFailed {
        /// Which postcondition broke.
        message: String,
    },

    /// A lower-layer operation failed. The originating error is kept as the
    /// source so callers can inspect it.
    #[error("service failure: {message}")]
    ServiceFailure {
        /// Description of the failed service.
        message: String,
        /// The error that triggered this failure.
        #[source]
        source: Box<ContractError>,
    },
}

impl ContractError {
    /// Wrap `cause` in a [`ContractError::ServiceFailure`].
    ///
    /// If `cause` is itself a service failure, its trigger is re-wrapped
    /// instead, so one fault never produces nested service layers.
    pub fn service_failure(message: impl Into<String>, cause: ContractError) -> Self {
        let trigger = match cause {
            ContractError::ServiceFailure { source, .. } => *source,
            other => other,
        };
        ContractError::ServiceFailure {
            message: message.into(),
            source: Box::new(trigger),
        }
    }

    /// The kind of contract that was violated.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContractError::IllegalArgument { .. } => ErrorKind::IllegalArgument,
            ContractError::InvalidState { .. } => ErrorKind::InvalidState,
            ContractError::MethodFailed { .. } => ErrorKind::MethodFailed,
            ContractError::ServiceFailure { .. } => ErrorKind::ServiceFailure,
        }
    }

    /// The message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            ContractError::IllegalArgument { message }
            | ContractError::InvalidState { message }
            | ContractError::MethodFailed { message }
            | ContractError::ServiceFailure { message, .. } => message,
        }
    }

    /// The error that triggered this one, if any.
    pub fn trigger(&self) -> Option<&ContractError> {
        match self {
            ContractError::ServiceFailure { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The innermost error of the cause chain (`self` when there is no trigger).
    pub fn root_cause(&self) -> &ContractError {
        let mut current = self;
        while let Some(next) = current.trigger() {
            current = next;
        }
        current
    }

    /// Returns `true` for [`ContractError::IllegalArgument`].
    #[inline]
    pub fn is_illegal_argument(&self) -> bool {
        self.kind() == ErrorKind::IllegalArgument
    }

    /// Returns `true` for [`ContractError::InvalidState`].
    #[inline]
    pub fn is_invalid_state(&self) -> bool {
        self.kind() == ErrorKind::InvalidState
    }

    /// Returns `true` for [`ContractError::MethodFailed`].
    #[inline]
    pub fn is_method_failed(&self) -> bool {
        self.kind() == ErrorKind::MethodFailed
    }

    /// Returns `true` for [`ContractError::ServiceFailure`].
    #[inline]
    pub fn is_service_failure(&self) -> bool {
        self.kind() == ErrorKind::ServiceFailure
    }
}
