//! The recursive validation engine.
//!
//! [`validate_config`] walks a schema tree alongside a [`Config`]'s raw value
//! tree and accumulates path-qualified diagnostics. Per attribute, in order:
//! structural checks, read-at-path, the type's advisory validate hook, typed
//! value construction, the deprecation warning, custom validators, and
//! finally recursion into nested attributes. An attribute's own subtree stops
//! at its first structural or read failure; sibling attributes are always
//! still validated (fail-fast within a node, fail-soft across siblings).

use crate::context::Context;
use crate::data::Config;
use crate::diag::Diagnostics;
use crate::error::PathError;
use crate::path::AttributePath;
use crate::schema::{Attribute, NestedAttributes, NestingMode};
use crate::value::{RawKind, RawValue};

/// The request handed to [`attribute_validate`] and every
/// [`AttributeValidator`]: the configuration under validation and the path of
/// the attribute being validated.
#[derive(Debug, Clone)]
pub struct ValidateAttributeRequest<'a> {
    /// The path of the attribute being validated.
    pub path: AttributePath,
    /// The configuration under validation.
    pub config: &'a Config,
}

/// The shared accumulator every validator appends into. Validators observe
/// diagnostics appended by earlier steps and validators.
#[derive(Debug, Default)]
pub struct ValidateAttributeResponse {
    /// The accumulated diagnostics, in append order.
    pub diagnostics: Diagnostics,
}

/// A custom, per-attribute validation rule.
pub trait AttributeValidator: std::fmt::Debug + Send + Sync {
    /// A plain-text description of what the validator enforces.
    fn description(&self) -> String;

    /// Validate the attribute named by `req.path`, appending findings to
    /// `resp.diagnostics`.
    fn validate(
        &self,
        ctx: &Context,
        req: &ValidateAttributeRequest<'_>,
        resp: &mut ValidateAttributeResponse,
    );
}

const DEFINITION_PROBLEM: &str =
    "This is always a problem with the provider and should be reported to the provider developer.";

/// Validate an entire configuration against its schema, returning all
/// accumulated diagnostics.
pub fn validate_config(ctx: &Context, config: &Config) -> Diagnostics {
    let mut diags = Diagnostics::new();

    if let Some(message) = &config.schema.deprecation_message {
        if !config.raw.is_null() {
            diags.add_warning("Deprecated", message);
        }
    }

    for (name, attribute) in &config.schema.attributes {
        let req = ValidateAttributeRequest {
            path: AttributePath::new().with_attribute_name(name),
            config,
        };
        let mut resp = ValidateAttributeResponse::default();
        attribute_validate(ctx, attribute, &req, &mut resp);
        diags.append(resp.diagnostics);
    }

    diags
}

/// Validate one attribute (and, for branch attributes, its subtree),
/// appending diagnostics to the shared response.
pub fn attribute_validate(
    ctx: &Context,
    attribute: &Attribute,
    req: &ValidateAttributeRequest<'_>,
    resp: &mut ValidateAttributeResponse,
) {
    if ctx.is_cancelled() {
        resp.diagnostics.add_attribute_error(
            req.path.clone(),
            "Validation Cancelled",
            "The request was cancelled before this attribute could be validated.",
        );
        return;
    }

    // structural invariants; each violation is a provider bug and stops this
    // attribute's subtree
    if attribute.attr_type.is_none() && attribute.nested.is_none() {
        resp.diagnostics.add_attribute_error(
            req.path.clone(),
            "Invalid Attribute Definition",
            format!(
                "Attribute must define either Attributes or Type. {}",
                DEFINITION_PROBLEM
            ),
        );
        return;
    }
    if attribute.attr_type.is_some() && attribute.nested.is_some() {
        resp.diagnostics.add_attribute_error(
            req.path.clone(),
            "Invalid Attribute Definition",
            format!(
                "Attribute cannot define both Attributes and Type. {}",
                DEFINITION_PROBLEM
            ),
        );
        return;
    }
    if !attribute.required && !attribute.optional && !attribute.computed {
        resp.diagnostics.add_attribute_error(
            req.path.clone(),
            "Invalid Attribute Definition",
            format!(
                "Attribute missing Required, Optional, or Computed definition. {}",
                DEFINITION_PROBLEM
            ),
        );
        return;
    }

    // one of the two fields is set, so an effective type always exists here
    let Some(attr_type) = attribute.effective_type() else {
        return;
    };

    let raw = match req.config.raw.walk(&req.path) {
        Ok(value) => value.clone(),
        // an absent or unknown ancestor reads as a typed null, not an error
        Err(PathError::InvalidStep { .. }) => RawValue::null(attr_type.wire_type()),
        Err(err) => {
            resp.diagnostics.add_attribute_error(
                req.path.clone(),
                "Configuration Read Error",
                read_error_detail(err),
            );
            return;
        }
    };

    tracing::trace!(path = %req.path, "calling type validate hook");
    let hook_diags = attr_type.validate(&raw, &req.path);
    let hook_errored = hook_diags.has_error();
    resp.diagnostics.append(hook_diags);
    if hook_errored {
        return;
    }

    let value = match attr_type.value_from_raw(&raw) {
        Ok(value) => value,
        Err(err) => {
            resp.diagnostics.add_attribute_error(
                req.path.clone(),
                "Configuration Read Error",
                read_error_detail(err),
            );
            return;
        }
    };

    // null values never warn; unknown values do, the deprecation applies
    // whether or not the value resolves later
    if let Some(message) = &attribute.deprecation_message {
        if !value.is_null() {
            resp.diagnostics.add_attribute_warning(
                req.path.clone(),
                "Attribute Deprecated",
                message,
            );
        }
    }

    for validator in &attribute.validators {
        tracing::debug!(
            path = %req.path,
            validator = %validator.description(),
            "calling provider defined validator"
        );
        validator.validate(ctx, req, resp);
    }

    if let Some(nested) = &attribute.nested {
        nested_validate(ctx, nested, &raw, req, resp);
    }
}

fn nested_validate(
    ctx: &Context,
    nested: &NestedAttributes,
    raw: &RawValue,
    req: &ValidateAttributeRequest<'_>,
    resp: &mut ValidateAttributeResponse,
) {
    // null or unknown containers contribute zero instances, which is not
    // itself a finding
    match (nested.nesting, raw.kind()) {
        (NestingMode::Single, RawKind::Object(_)) => {
            validate_instance(ctx, nested, &req.path, req, resp);
        }
        (NestingMode::List, RawKind::List(elems)) => {
            for index in 0..elems.len() {
                let base = req.path.with_element_key_int(index);
                validate_instance(ctx, nested, &base, req, resp);
            }
        }
        (NestingMode::Set, RawKind::Set(elems)) => {
            for elem in elems {
                let base = req.path.with_element_key_value(elem.clone());
                validate_instance(ctx, nested, &base, req, resp);
            }
        }
        (NestingMode::Map, RawKind::Map(entries)) => {
            for key in entries.keys() {
                let base = req.path.with_element_key_string(key);
                validate_instance(ctx, nested, &base, req, resp);
            }
        }
        _ => {}
    }
}

fn validate_instance(
    ctx: &Context,
    nested: &NestedAttributes,
    base: &AttributePath,
    req: &ValidateAttributeRequest<'_>,
    resp: &mut ValidateAttributeResponse,
) {
    for (name, attribute) in &nested.attributes {
        let child_req = ValidateAttributeRequest {
            path: base.with_attribute_name(name),
            config: req.config,
        };
        attribute_validate(ctx, attribute, &child_req, resp);
    }
}

fn read_error_detail(err: impl std::fmt::Display) -> String {
    format!(
        "An unexpected error was encountered trying to read an attribute from the \
         configuration. This is always an error in the provider. Please report the \
         following to the provider developer:\n\n{}",
        err
    )
}
