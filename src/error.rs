//! Error types for schema traversal, decoding, and value construction.
//!
//! These errors are internal plumbing: every fallible operation in the crate
//! surfaces to callers as [`Diagnostics`](crate::diag::Diagnostics), with the
//! underlying error text embedded in the diagnostic detail.

use thiserror::Error;

use crate::path::PathStep;
use crate::types::WireType;

/// Failure to construct a typed value from a raw dynamic value.
///
/// A `TypeError` always indicates that the raw value's shape does not conform
/// to the type descriptor it is being constructed against. This is a defect in
/// the code that produced the schema or the raw value, not a data error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    /// The raw value's wire type does not match the expected type.
    #[error("can't use {actual} value as {expected}")]
    Mismatch {
        /// The type the value was being constructed against.
        expected: WireType,
        /// The wire type the raw value actually carries.
        actual: WireType,
    },

    /// A nested element or attribute failed to convert.
    #[error("{key}: {source}")]
    Element {
        /// The element key or attribute name, pre-formatted (`[0]`, `["k"]`, `.name`).
        key: String,
        /// The underlying conversion failure.
        source: Box<TypeError>,
    },
}

impl TypeError {
    /// Wrap an error with the element or attribute it occurred under.
    pub fn in_element(self, key: impl Into<String>) -> Self {
        Self::Element {
            key: key.into(),
            source: Box::new(self),
        }
    }
}

/// Failure to apply an attribute path to a value or schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    /// The step addresses something that does not exist at this location:
    /// a missing attribute or element, or a traversal through a null or
    /// unknown value. Callers typically resolve this to a typed null value
    /// rather than an error.
    #[error("path step {step} does not exist within the value")]
    InvalidStep {
        /// The step that could not be applied.
        step: PathStep,
    },

    /// The step kind cannot apply to the value at this location, e.g. an
    /// integer element key applied to an object.
    #[error("path step {step} cannot be applied to a {ty} value")]
    StepMismatch {
        /// The step that could not be applied.
        step: PathStep,
        /// The wire type of the value the step was applied to.
        ty: WireType,
    },
}

/// Failure to decode a wire-format document against a type descriptor.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The wire bytes are not a well-formed document.
    #[error("invalid wire document: {0}")]
    Json(#[from] serde_json::Error),

    /// The document's shape does not match the type descriptor.
    #[error("expected {expected} value, got {actual}")]
    Shape {
        /// The type the document was decoded against.
        expected: WireType,
        /// The JSON kind actually found.
        actual: &'static str,
    },

    /// An object value carries an attribute the descriptor does not declare.
    #[error("undeclared attribute {name:?} in object value")]
    UndeclaredAttribute {
        /// The undeclared attribute name.
        name: String,
    },

    /// A set value contains the same element more than once.
    #[error("duplicate element in set value")]
    DuplicateSetElement,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_error_display() {
        let err = TypeError::Mismatch {
            expected: WireType::String,
            actual: WireType::Number,
        };
        assert_eq!(format!("{}", err), "can't use number value as string");

        let nested = err.in_element("[1]");
        assert_eq!(
            format!("{}", nested),
            "[1]: can't use number value as string"
        );
    }

    #[test]
    fn test_path_error_display() {
        let err = PathError::InvalidStep {
            step: PathStep::AttributeName("missing".to_string()),
        };
        assert!(format!("{}", err).contains("missing"));

        let err = PathError::StepMismatch {
            step: PathStep::ElementKeyInt(0),
            ty: WireType::Bool,
        };
        assert!(format!("{}", err).contains("bool"));
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::Shape {
            expected: WireType::list(WireType::String),
            actual: "object",
        };
        assert_eq!(format!("{}", err), "expected list(string) value, got object");

        let err = DecodeError::UndeclaredAttribute {
            name: "extra".to_string(),
        };
        assert!(format!("{}", err).contains("extra"));
    }
}
