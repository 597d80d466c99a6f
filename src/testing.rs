//! Testing utilities for schemas and validators.
//!
//! This module provides fixture types and adapters for exercising the
//! validation engine without writing full [`AttrType`] or
//! [`AttributeValidator`] implementations.
//!
//! # Example
//!
//! ```
//! use attrkit::testing::validator_fn;
//! use attrkit::{Attribute, StringType};
//!
//! let attribute = Attribute::of_type(StringType)
//!     .required()
//!     .with_validator(validator_fn("value is not empty", |_ctx, req, resp| {
//!         // inspect req.config, append to resp.diagnostics
//!     }));
//! ```

use crate::context::Context;
use crate::diag::{Diagnostic, Diagnostics};
use crate::error::TypeError;
use crate::path::AttributePath;
use crate::types::{AttrType, StringType, WireType};
use crate::validation::{AttributeValidator, ValidateAttributeRequest, ValidateAttributeResponse};
use crate::value::{AttrValue, RawValue};

/// The fixed error diagnostic produced by [`StringTypeWithValidateError`].
pub fn test_error_diagnostic(path: AttributePath) -> Diagnostic {
    Diagnostic::attribute_error(
        path,
        "Error Diagnostic",
        "This is an error from a test fixture.",
    )
}

/// The fixed warning diagnostic produced by [`StringTypeWithValidateWarning`].
pub fn test_warning_diagnostic(path: AttributePath) -> Diagnostic {
    Diagnostic::attribute_warning(
        path,
        "Warning Diagnostic",
        "This is a warning from a test fixture.",
    )
}

/// A string type whose validate hook always reports
/// [`test_error_diagnostic`].
#[derive(Debug, Clone, Copy)]
pub struct StringTypeWithValidateError;

impl AttrType for StringTypeWithValidateError {
    fn wire_type(&self) -> WireType {
        StringType.wire_type()
    }

    fn value_from_raw(&self, raw: &RawValue) -> Result<AttrValue, TypeError> {
        StringType.value_from_raw(raw)
    }

    fn validate(&self, _raw: &RawValue, path: &AttributePath) -> Diagnostics {
        test_error_diagnostic(path.clone()).into()
    }
}

/// A string type whose validate hook always reports
/// [`test_warning_diagnostic`].
#[derive(Debug, Clone, Copy)]
pub struct StringTypeWithValidateWarning;

impl AttrType for StringTypeWithValidateWarning {
    fn wire_type(&self) -> WireType {
        StringType.wire_type()
    }

    fn value_from_raw(&self, raw: &RawValue) -> Result<AttrValue, TypeError> {
        StringType.value_from_raw(raw)
    }

    fn validate(&self, _raw: &RawValue, path: &AttributePath) -> Diagnostics {
        test_warning_diagnostic(path.clone()).into()
    }
}

/// An [`AttributeValidator`] backed by a closure.
pub struct ValidatorFn<F> {
    description: String,
    f: F,
}

/// Wrap a closure as an [`AttributeValidator`].
pub fn validator_fn<F>(description: impl Into<String>, f: F) -> ValidatorFn<F>
where
    F: Fn(&Context, &ValidateAttributeRequest<'_>, &mut ValidateAttributeResponse) + Send + Sync,
{
    ValidatorFn {
        description: description.into(),
        f,
    }
}

impl<F> std::fmt::Debug for ValidatorFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorFn")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<F> AttributeValidator for ValidatorFn<F>
where
    F: Fn(&Context, &ValidateAttributeRequest<'_>, &mut ValidateAttributeResponse) + Send + Sync,
{
    fn description(&self) -> String {
        self.description.clone()
    }

    fn validate(
        &self,
        ctx: &Context,
        req: &ValidateAttributeRequest<'_>,
        resp: &mut ValidateAttributeResponse,
    ) {
        (self.f)(ctx, req, resp)
    }
}
