//! Security error model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::NodeId;

/// Result type used across the security core.
pub type SecurityResult<T> = Result<T, SecurityError>;

/// Numeric classification carried by principal-resolution failures.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum ErrorCode {
    /// Subject exists but was granted no authorities.
    NoAuthorities = 401,
    /// No subject row matched.
    UnknownSubject = 404,
    /// A capability was invoked on a processor that does not implement it.
    Unsupported = 500,
}

impl ErrorCode {
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

impl core::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// Top-level error of the security core.
///
/// Both "unknown subject" and "no authorities" surface as `SubjectNotFound`;
/// only `code` tells them apart. Callers must not expose the code to
/// untrusted parties.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SecurityError {
    #[error("subject '{subject}' not found (code {code})")]
    SubjectNotFound { code: ErrorCode, subject: String },

    #[error("unsupported feature '{feature}' (code {code})")]
    UnsupportedFeature {
        code: ErrorCode,
        feature: &'static str,
    },

    #[error("no strategy found for {0}")]
    NoStrategyFound(String),

    #[error(transparent)]
    TreeBuild(#[from] TreeBuildError),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

impl SecurityError {
    pub fn unknown_subject(subject: impl Into<String>) -> Self {
        Self::SubjectNotFound {
            code: ErrorCode::UnknownSubject,
            subject: subject.into(),
        }
    }

    pub fn no_authorities(subject: impl Into<String>) -> Self {
        Self::SubjectNotFound {
            code: ErrorCode::NoAuthorities,
            subject: subject.into(),
        }
    }

    pub fn unsupported(feature: &'static str) -> Self {
        Self::UnsupportedFeature {
            code: ErrorCode::Unsupported,
            feature,
        }
    }

    pub fn no_strategy(key: impl core::fmt::Display) -> Self {
        Self::NoStrategyFound(key.to_string())
    }

    /// Machine-checkable code, for the variants that carry one.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::SubjectNotFound { code, .. } | Self::UnsupportedFeature { code, .. } => {
                Some(*code)
            }
            _ => None,
        }
    }

    pub fn is_subject_not_found(&self) -> bool {
        matches!(self, Self::SubjectNotFound { .. })
    }
}

/// Malformed input to an authority tree build.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeBuildError {
    #[error("duplicate node id {0}")]
    DuplicateId(NodeId),

    #[error("node {node} references missing parent {parent}")]
    DanglingParent { node: NodeId, parent: NodeId },

    #[error("cycle detected through node {0}")]
    Cycle(NodeId),

    #[error("expected a single root, found {0}")]
    MultipleRoots(usize),

    #[error("expected a single root, found none")]
    MissingRoot,

    #[error("builder does not accept '{0}' nodes")]
    UnsupportedKind(String),

    #[error("node collection mixes '{first}' and '{other}' kinds")]
    MixedKinds { first: String, other: String },
}

/// Failures reported by external collaborators (row source, query catalog).
///
/// These are opaque to the core: propagated as-is, never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("row source failure: {0}")]
    RowSource(String),

    #[error("query '{0}' is not registered in the catalog")]
    MissingQuery(String),

    #[error("column {index}: {reason}")]
    Column { index: usize, reason: String },

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl CollaboratorError {
    pub fn row_source(msg: impl Into<String>) -> Self {
        Self::RowSource(msg.into())
    }

    pub fn column(index: usize, reason: impl Into<String>) -> Self {
        Self::Column {
            index,
            reason: reason.into(),
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_not_found_kinds_differ_only_by_code() {
        let unknown = SecurityError::unknown_subject("bob");
        let powerless = SecurityError::no_authorities("bob");

        assert!(unknown.is_subject_not_found());
        assert!(powerless.is_subject_not_found());
        assert_eq!(unknown.code().map(ErrorCode::as_u16), Some(404));
        assert_eq!(powerless.code().map(ErrorCode::as_u16), Some(401));
    }

    #[test]
    fn unsupported_carries_500() {
        let err = SecurityError::unsupported("groups");
        assert_eq!(err.code(), Some(ErrorCode::Unsupported));
        assert_eq!(err.to_string(), "unsupported feature 'groups' (code 500)");
    }

    #[test]
    fn wrapped_errors_have_no_code() {
        let err: SecurityError = TreeBuildError::Cycle(NodeId::new(3)).into();
        assert_eq!(err.code(), None);
        assert_eq!(err.to_string(), "cycle detected through node 3");

        let err: SecurityError = CollaboratorError::row_source("timeout").into();
        assert_eq!(err.code(), None);
    }
}
