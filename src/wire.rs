//! Decoding wire-encoded dynamic values into schema-shaped containers.
//!
//! The transport hands the engine a [`DynamicValue`]: a JSON document whose
//! shape is only trusted after it has been checked against a type descriptor
//! derived from the schema. [`DynamicValue::decode`] performs that check and
//! produces the [`RawValue`] tree everything downstream operates on. The
//! `*_from_wire` constructors wrap decoding with the diagnostic framing
//! callers surface to practitioners.
//!
//! The JSON encoding has no representation for unknown values; unknowns only
//! arise programmatically, never from this decoder.

use std::collections::BTreeMap;

use crate::data::{Config, Plan, State};
use crate::diag::Diagnostics;
use crate::error::DecodeError;
use crate::schema::Schema;
use crate::types::WireType;
use crate::value::RawValue;

/// A wire-format encoded value, opaque until decoded against a [`WireType`].
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicValue(serde_json::Value);

impl DynamicValue {
    /// Wrap an already-parsed document.
    pub fn new(document: serde_json::Value) -> Self {
        DynamicValue(document)
    }

    /// Parse a raw JSON byte payload.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(DynamicValue(serde_json::from_slice(bytes)?))
    }

    /// Check the document against `ty` and produce the conforming value
    /// tree.
    ///
    /// Attributes an object declares but the document omits decode as typed
    /// nulls. Attributes the document carries but the descriptor does not
    /// declare are an error, as are repeated set elements.
    pub fn decode(&self, ty: &WireType) -> Result<RawValue, DecodeError> {
        decode_value(&self.0, ty)
    }
}

fn json_kind(document: &serde_json::Value) -> &'static str {
    match document {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn decode_value(document: &serde_json::Value, ty: &WireType) -> Result<RawValue, DecodeError> {
    if document.is_null() {
        return Ok(RawValue::null(ty.clone()));
    }

    let mismatch = || DecodeError::Shape {
        expected: ty.clone(),
        actual: json_kind(document),
    };

    match ty {
        WireType::String => {
            let s = document.as_str().ok_or_else(mismatch)?;
            Ok(RawValue::string(s))
        }
        WireType::Number => {
            let n = document.as_f64().ok_or_else(mismatch)?;
            Ok(RawValue::number(n))
        }
        WireType::Bool => {
            let b = document.as_bool().ok_or_else(mismatch)?;
            Ok(RawValue::boolean(b))
        }
        WireType::List(elem) => {
            let items = document.as_array().ok_or_else(mismatch)?;
            let elems = items
                .iter()
                .map(|item| decode_value(item, elem))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RawValue::list((**elem).clone(), elems))
        }
        WireType::Set(elem) => {
            let items = document.as_array().ok_or_else(mismatch)?;
            let mut elems = Vec::with_capacity(items.len());
            for item in items {
                let decoded = decode_value(item, elem)?;
                if elems.contains(&decoded) {
                    return Err(DecodeError::DuplicateSetElement);
                }
                elems.push(decoded);
            }
            Ok(RawValue::set((**elem).clone(), elems))
        }
        WireType::Map(elem) => {
            let entries = document.as_object().ok_or_else(mismatch)?;
            let elems = entries
                .iter()
                .map(|(key, item)| Ok((key.clone(), decode_value(item, elem)?)))
                .collect::<Result<BTreeMap<_, _>, DecodeError>>()?;
            Ok(RawValue::map((**elem).clone(), elems))
        }
        WireType::Object(attr_types) => {
            let entries = document.as_object().ok_or_else(mismatch)?;
            if let Some(name) = entries.keys().find(|name| !attr_types.contains_key(*name)) {
                return Err(DecodeError::UndeclaredAttribute { name: name.clone() });
            }
            let attrs = attr_types
                .iter()
                .map(|(name, attr_ty)| {
                    let attr = match entries.get(name) {
                        Some(item) => decode_value(item, attr_ty)?,
                        None => RawValue::null(attr_ty.clone()),
                    };
                    Ok((name.clone(), attr))
                })
                .collect::<Result<BTreeMap<_, _>, DecodeError>>()?;
            Ok(RawValue::object(attrs))
        }
    }
}

fn conversion_error(noun: &str, cause: &str) -> String {
    format!(
        "An unexpected error was encountered when converting the {} from the protocol type. \
         This is always an issue in the provider. Please report the following to the provider \
         developer:\n\n{}",
        noun, cause
    )
}

fn container_from_wire(
    value: Option<&DynamicValue>,
    schema: Option<&Schema>,
    summary: &str,
    noun: &str,
) -> (Option<(RawValue, Schema)>, Diagnostics) {
    let mut diags = Diagnostics::new();

    let Some(value) = value else {
        return (None, diags);
    };
    let Some(schema) = schema else {
        diags.add_error(summary, conversion_error(noun, "Missing schema."));
        return (None, diags);
    };

    match value.decode(&schema.wire_type()) {
        Ok(raw) => (Some((raw, schema.clone())), diags),
        Err(err) => {
            tracing::error!(container = noun, error = %err, "wire decode failed");
            diags.add_error(summary, conversion_error(noun, &err.to_string()));
            (None, diags)
        }
    }
}

/// Decode a wire-encoded configuration against its schema.
///
/// An absent value yields no configuration and no diagnostics. A missing
/// schema or a malformed document is a provider defect.
pub fn config_from_wire(
    value: Option<&DynamicValue>,
    schema: Option<&Schema>,
) -> (Option<Config>, Diagnostics) {
    let (decoded, diags) = container_from_wire(
        value,
        schema,
        "Unable to Convert Configuration",
        "configuration",
    );
    (decoded.map(|(raw, schema)| Config { raw, schema }), diags)
}

/// Decode a wire-encoded plan against its schema.
pub fn plan_from_wire(
    value: Option<&DynamicValue>,
    schema: Option<&Schema>,
) -> (Option<Plan>, Diagnostics) {
    let (decoded, diags) =
        container_from_wire(value, schema, "Unable to Convert Plan", "plan");
    (decoded.map(|(raw, schema)| Plan { raw, schema }), diags)
}

/// Decode a wire-encoded state against its schema.
pub fn state_from_wire(
    value: Option<&DynamicValue>,
    schema: Option<&Schema>,
) -> (Option<State>, Diagnostics) {
    let (decoded, diags) =
        container_from_wire(value, schema, "Unable to Convert State", "state");
    (decoded.map(|(raw, schema)| State { raw, schema }), diags)
}

/// Decode wire-encoded provider metadata.
///
/// No configured schema means provider metadata is unsupported, which is not
/// an error. A configured schema with no supplied value yields a value tree
/// of all-null leaves shaped by the schema.
pub fn provider_meta_from_wire(
    value: Option<&DynamicValue>,
    schema: Option<&Schema>,
) -> (Option<Config>, Diagnostics) {
    let Some(schema) = schema else {
        return (None, Diagnostics::new());
    };

    if value.is_none() {
        let attrs = schema
            .object_type()
            .attr_types
            .iter()
            .map(|(name, ty)| (name.clone(), RawValue::null(ty.wire_type())))
            .collect();
        return (
            Some(Config {
                raw: RawValue::object(attrs),
                schema: schema.clone(),
            }),
            Diagnostics::new(),
        );
    }

    config_from_wire(value, Some(schema))
}
