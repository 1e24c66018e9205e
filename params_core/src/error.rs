//! Error payloads for build operations.
//!
//! A failed build produces a structured, aggregated report rather than a
//! bare message: the report tree is isomorphic to the schema nesting, so a
//! failing composite field carries its child node's full report.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// The aggregated error payload of one schema node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "error", content = "payload", rename_all = "snake_case")]
pub enum ErrorReport {
    /// Enforced fields absent from input; short-circuits field evaluation
    RequiredFields(Vec<String>),
    /// Input keys not declared on an authorized-fields-only node
    AuthorizedFields(Vec<String>),
    /// Field pipeline, custom-validator and composite failures (may also
    /// carry domain and dependent-key entries collected in the same pass)
    BadParameters(Vec<ErrorEntry>),
    /// Domain constraint failures only
    DomainParameters(Vec<ErrorEntry>),
    /// Conditional-requirement (`on`) failures only
    DependentKeys(Vec<ErrorEntry>),
}

impl ErrorReport {
    /// The entries of an aggregate variant, if any.
    pub fn entries(&self) -> Option<&[ErrorEntry]> {
        match self {
            ErrorReport::BadParameters(e)
            | ErrorReport::DomainParameters(e)
            | ErrorReport::DependentKeys(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorReport::RequiredFields(names) => {
                write!(f, "required fields missing: [{}]", names.join(", "))
            }
            ErrorReport::AuthorizedFields(names) => {
                write!(f, "unauthorized fields: [{}]", names.join(", "))
            }
            ErrorReport::BadParameters(entries) => {
                write!(f, "bad parameters ({} entries)", entries.len())
            }
            ErrorReport::DomainParameters(entries) => {
                write!(f, "domain parameters ({} entries)", entries.len())
            }
            ErrorReport::DependentKeys(entries) => {
                write!(f, "dependent keys ({} entries)", entries.len())
            }
        }
    }
}

/// One entry in an aggregated report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorEntry {
    /// A leaf field failure with the failing operation's name as `action`
    Leaf {
        field: String,
        action: String,
        message: String,
    },
    /// A domain constraint failure, keyed by owning field and referenced path
    Domain {
        field: String,
        field_path: String,
        message: String,
    },
    /// A composite field failure carrying the child node's full report
    Nested {
        field: String,
        errors: Box<ErrorReport>,
    },
}

impl ErrorEntry {
    /// Creates a leaf entry.
    pub fn leaf(
        field: impl Into<String>,
        action: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ErrorEntry::Leaf {
            field: field.into(),
            action: action.into(),
            message: message.into(),
        }
    }

    /// Creates a domain entry.
    pub fn domain(
        field: impl Into<String>,
        field_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ErrorEntry::Domain {
            field: field.into(),
            field_path: field_path.into(),
            message: message.into(),
        }
    }

    /// Creates a nested composite entry.
    pub fn nested(field: impl Into<String>, errors: ErrorReport) -> Self {
        ErrorEntry::Nested {
            field: field.into(),
            errors: Box::new(errors),
        }
    }

    /// The owning field name of this entry.
    pub fn field(&self) -> &str {
        match self {
            ErrorEntry::Leaf { field, .. }
            | ErrorEntry::Domain { field, .. }
            | ErrorEntry::Nested { field, .. } => field,
        }
    }

    /// The action name of a leaf entry, if this is one.
    pub fn action(&self) -> Option<&str> {
        match self {
            ErrorEntry::Leaf { action, .. } => Some(action),
            _ => None,
        }
    }
}

/// Error type returned by the build entry point.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// The node's aggregated failure, returned as a tagged result
    #[error("build of '{node}' failed: {report}")]
    Invalid {
        /// Diagnostic name of the failing node
        node: String,
        /// The aggregated payload
        report: ErrorReport,
    },

    /// A raise-on-error node failed; the fault aborts enclosing aggregation
    /// immediately and carries the identical payload
    #[error("fault raised by '{node}': {report}")]
    Fault {
        /// Diagnostic name of the faulting node
        node: String,
        /// The aggregated payload
        report: ErrorReport,
    },
}

impl BuildError {
    /// The payload carried by either variant.
    pub fn report(&self) -> &ErrorReport {
        match self {
            BuildError::Invalid { report, .. } | BuildError::Fault { report, .. } => report,
        }
    }

    /// Returns true for a raised fault.
    pub fn is_fault(&self) -> bool {
        matches!(self, BuildError::Fault { .. })
    }
}
