//! Conversion from [`AttrValue`] into caller-chosen target representations.
//!
//! [`value_as`] is the typed exit door out of the attribute-value world:
//! providers read an [`AttrValue`] from a [`Config`](crate::Config),
//! [`Plan`](crate::Plan), or [`State`](crate::State) and convert it into the
//! representation their logic wants, from the typed wrappers down to plain
//! `String`/`f64`/`bool` and `Option`/`Vec`/`BTreeMap` compositions of them.
//! Every mismatch is reported through [`Diagnostics`]; conversion never
//! panics.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::context::Context;
use crate::diag::Diagnostics;
use crate::path::AttributePath;
use crate::types::WireType;
use crate::value::{
    AttrValue, BoolValue, ListValue, MapValue, NumberValue, ObjectValue, SetValue, StringValue,
    ValueState,
};

/// Why a value could not be converted into the requested target.
#[derive(Debug, Error, PartialEq)]
pub enum ConversionError {
    /// The source is a different concrete typed-value variant than the
    /// target.
    #[error("can't use {actual} as {expected} (schema type {ty})")]
    WrongType {
        /// The source's concrete variant name.
        actual: &'static str,
        /// The target's variant name.
        expected: String,
        /// The source's schema type.
        ty: WireType,
    },
    /// The source's shape is not representable as the target.
    #[error("can't convert {value} into {target}")]
    IncompatibleType {
        /// The dynamic rendering of the source value.
        value: String,
        /// The target's description.
        target: String,
    },
    /// The source is null and the target cannot hold a null.
    #[error("unhandled null value: {target} cannot hold a null")]
    Null {
        /// The target's description.
        target: String,
    },
    /// The source is unknown and the target cannot hold an unknown.
    #[error("unhandled unknown value: {target} cannot hold an unknown")]
    Unknown {
        /// The target's description.
        target: String,
    },
    /// A list, set, map, or object element failed to convert.
    #[error("[{key}]: {source}")]
    Element {
        /// The index or key of the failing element.
        key: String,
        /// The element's failure.
        source: Box<ConversionError>,
    },
}

impl ConversionError {
    fn in_element(self, key: impl Into<String>) -> Self {
        ConversionError::Element {
            key: key.into(),
            source: Box::new(self),
        }
    }
}

/// A target representation an [`AttrValue`] can be converted into.
pub trait FromAttrValue: Sized {
    /// The target's description, used in conversion diagnostics.
    fn target() -> String;

    /// Convert, or explain why the value does not fit the target.
    fn from_attr_value(value: &AttrValue) -> Result<Self, ConversionError>;
}

/// Convert `value` into `T`, reporting any mismatch as a root-path
/// diagnostic.
pub fn value_as<T: FromAttrValue>(ctx: &Context, value: &AttrValue) -> (Option<T>, Diagnostics) {
    value_as_at(ctx, value, &AttributePath::new())
}

/// Convert `value` into `T`, attributing any mismatch to `path`.
pub fn value_as_at<T: FromAttrValue>(
    ctx: &Context,
    value: &AttrValue,
    path: &AttributePath,
) -> (Option<T>, Diagnostics) {
    let mut diags = Diagnostics::new();

    if ctx.is_cancelled() {
        diags.add_attribute_error(
            path.clone(),
            "Conversion Cancelled",
            "The request was cancelled before the value could be converted.",
        );
        return (None, diags);
    }

    match T::from_attr_value(value) {
        Ok(converted) => (Some(converted), diags),
        Err(err) => {
            tracing::debug!(path = %path, target = %T::target(), error = %err, "value conversion failed");
            diags.add_attribute_error(
                path.clone(),
                "Value Conversion Error",
                format!(
                    "An unexpected error was encountered trying to convert the value. This is \
                     always an error in the provider. Please report the following to the \
                     provider developer:\n\n{}",
                    err
                ),
            );
            (None, diags)
        }
    }
}

impl FromAttrValue for AttrValue {
    fn target() -> String {
        "AttrValue".to_string()
    }

    // the generic target accepts anything, including nulls and unknowns
    fn from_attr_value(value: &AttrValue) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

macro_rules! variant_from_attr_value {
    ($wrapper:ty, $variant:ident, $name:literal) => {
        impl FromAttrValue for $wrapper {
            fn target() -> String {
                $name.to_string()
            }

            fn from_attr_value(value: &AttrValue) -> Result<Self, ConversionError> {
                match value {
                    AttrValue::$variant(inner) => Ok(inner.clone()),
                    other => Err(ConversionError::WrongType {
                        actual: other.type_name(),
                        expected: $name.to_string(),
                        ty: other.wire_type(),
                    }),
                }
            }
        }
    };
}

variant_from_attr_value!(StringValue, String, "StringValue");
variant_from_attr_value!(NumberValue, Number, "NumberValue");
variant_from_attr_value!(BoolValue, Bool, "BoolValue");
variant_from_attr_value!(ListValue, List, "ListValue");
variant_from_attr_value!(SetValue, Set, "SetValue");
variant_from_attr_value!(MapValue, Map, "MapValue");
variant_from_attr_value!(ObjectValue, Object, "ObjectValue");

fn state_error<T>(state: &ValueState<T>) -> ConversionError {
    if state.is_null() {
        ConversionError::Null {
            target: String::new(),
        }
    } else {
        ConversionError::Unknown {
            target: String::new(),
        }
    }
}

fn with_target(err: ConversionError, name: &str) -> ConversionError {
    match err {
        ConversionError::Null { .. } => ConversionError::Null {
            target: name.to_string(),
        },
        ConversionError::Unknown { .. } => ConversionError::Unknown {
            target: name.to_string(),
        },
        other => other,
    }
}

impl FromAttrValue for String {
    fn target() -> String {
        "String".to_string()
    }

    fn from_attr_value(value: &AttrValue) -> Result<Self, ConversionError> {
        match value {
            AttrValue::String(StringValue(ValueState::Known(s))) => Ok(s.clone()),
            AttrValue::String(StringValue(state)) => {
                Err(with_target(state_error(state), "String"))
            }
            other => Err(ConversionError::IncompatibleType {
                value: other.to_raw().to_string(),
                target: Self::target(),
            }),
        }
    }
}

impl FromAttrValue for f64 {
    fn target() -> String {
        "f64".to_string()
    }

    fn from_attr_value(value: &AttrValue) -> Result<Self, ConversionError> {
        match value {
            AttrValue::Number(NumberValue(ValueState::Known(n))) => Ok(*n),
            AttrValue::Number(NumberValue(state)) => Err(with_target(state_error(state), "f64")),
            other => Err(ConversionError::IncompatibleType {
                value: other.to_raw().to_string(),
                target: Self::target(),
            }),
        }
    }
}

impl FromAttrValue for bool {
    fn target() -> String {
        "bool".to_string()
    }

    fn from_attr_value(value: &AttrValue) -> Result<Self, ConversionError> {
        match value {
            AttrValue::Bool(BoolValue(ValueState::Known(b))) => Ok(*b),
            AttrValue::Bool(BoolValue(state)) => Err(with_target(state_error(state), "bool")),
            other => Err(ConversionError::IncompatibleType {
                value: other.to_raw().to_string(),
                target: Self::target(),
            }),
        }
    }
}

impl<T: FromAttrValue> FromAttrValue for Option<T> {
    fn target() -> String {
        format!("Option<{}>", T::target())
    }

    // absorbs nulls only; an unknown still fails through the inner target
    fn from_attr_value(value: &AttrValue) -> Result<Self, ConversionError> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_attr_value(value).map(Some)
    }
}

impl<T: FromAttrValue> FromAttrValue for Vec<T> {
    fn target() -> String {
        format!("Vec<{}>", T::target())
    }

    fn from_attr_value(value: &AttrValue) -> Result<Self, ConversionError> {
        let elems = match value {
            AttrValue::List(ListValue { elems, .. }) | AttrValue::Set(SetValue { elems, .. }) => {
                elems
            }
            other => {
                return Err(ConversionError::IncompatibleType {
                    value: other.to_raw().to_string(),
                    target: Self::target(),
                })
            }
        };
        let ValueState::Known(elems) = elems else {
            return Err(with_target(state_error(elems), &Self::target()));
        };
        elems
            .iter()
            .enumerate()
            .map(|(i, elem)| T::from_attr_value(elem).map_err(|err| err.in_element(i.to_string())))
            .collect()
    }
}

impl<T: FromAttrValue> FromAttrValue for BTreeMap<String, T> {
    fn target() -> String {
        format!("BTreeMap<String, {}>", T::target())
    }

    fn from_attr_value(value: &AttrValue) -> Result<Self, ConversionError> {
        let entries = match value {
            AttrValue::Map(MapValue { elems, .. }) => elems,
            AttrValue::Object(ObjectValue { attrs, .. }) => attrs,
            other => {
                return Err(ConversionError::IncompatibleType {
                    value: other.to_raw().to_string(),
                    target: Self::target(),
                })
            }
        };
        let ValueState::Known(entries) = entries else {
            return Err(with_target(state_error(entries), &Self::target()));
        };
        entries
            .iter()
            .map(|(key, elem)| {
                T::from_attr_value(elem)
                    .map(|converted| (key.clone(), converted))
                    .map_err(|err| err.in_element(format!("\"{}\"", key)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known_list(elems: Vec<AttrValue>) -> AttrValue {
        AttrValue::List(ListValue {
            elem_type: WireType::String,
            elems: ValueState::Known(elems),
        })
    }

    #[test]
    fn test_value_as_attr_value_is_identity() {
        let ctx = Context::new();
        let source = AttrValue::known_string("hello, world");
        let (first, diags) = value_as::<AttrValue>(&ctx, &source);
        assert!(diags.is_empty());
        assert_eq!(first, Some(source.clone()));

        // converting the result again yields the same value
        let (second, diags) = value_as::<AttrValue>(&ctx, first.as_ref().unwrap());
        assert!(diags.is_empty());
        assert_eq!(second, Some(source));
    }

    #[test]
    fn test_value_as_attr_value_accepts_null_and_unknown() {
        let ctx = Context::new();
        for source in [
            AttrValue::String(StringValue(ValueState::Null)),
            AttrValue::String(StringValue(ValueState::Unknown)),
        ] {
            let (converted, diags) = value_as::<AttrValue>(&ctx, &source);
            assert!(diags.is_empty());
            assert_eq!(converted, Some(source));
        }
    }

    #[test]
    fn test_value_as_typed_wrapper() {
        let ctx = Context::new();
        let (converted, diags) =
            value_as::<StringValue>(&ctx, &AttrValue::known_string("testvalue"));
        assert!(diags.is_empty());
        assert_eq!(
            converted,
            Some(StringValue(ValueState::Known("testvalue".to_string())))
        );
    }

    #[test]
    fn test_value_as_wrong_wrapper_variant() {
        let ctx = Context::new();
        let (converted, diags) = value_as::<NumberValue>(&ctx, &AttrValue::known_string("nope"));
        assert_eq!(converted, None);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].summary, "Value Conversion Error");
        assert!(diags[0]
            .detail
            .contains("can't use StringValue as NumberValue (schema type string)"));
        assert_eq!(diags[0].path, Some(AttributePath::new()));
    }

    #[test]
    fn test_value_as_primitive() {
        let ctx = Context::new();
        let (converted, diags) = value_as::<String>(&ctx, &AttrValue::known_string("testvalue"));
        assert!(diags.is_empty());
        assert_eq!(converted, Some("testvalue".to_string()));

        let (converted, diags) = value_as::<f64>(&ctx, &AttrValue::known_number(123.0));
        assert!(diags.is_empty());
        assert_eq!(converted, Some(123.0));

        let (converted, diags) = value_as::<bool>(&ctx, &AttrValue::known_bool(true));
        assert!(diags.is_empty());
        assert_eq!(converted, Some(true));
    }

    #[test]
    fn test_value_as_primitive_mismatch() {
        let ctx = Context::new();
        let (converted, diags) = value_as::<f64>(&ctx, &AttrValue::known_string("testvalue"));
        assert_eq!(converted, None);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].detail.contains("can't convert"));
        assert!(diags[0].detail.contains("into f64"));
    }

    #[test]
    fn test_value_as_null_primitive() {
        let ctx = Context::new();
        let source = AttrValue::String(StringValue(ValueState::Null));
        let (converted, diags) = value_as::<String>(&ctx, &source);
        assert_eq!(converted, None);
        assert!(diags[0]
            .detail
            .contains("unhandled null value: String cannot hold a null"));
    }

    #[test]
    fn test_value_as_option_absorbs_null() {
        let ctx = Context::new();
        let source = AttrValue::String(StringValue(ValueState::Null));
        let (converted, diags) = value_as::<Option<String>>(&ctx, &source);
        assert!(diags.is_empty());
        assert_eq!(converted, Some(None));
    }

    #[test]
    fn test_value_as_option_rejects_unknown() {
        let ctx = Context::new();
        let source = AttrValue::String(StringValue(ValueState::Unknown));
        let (converted, diags) = value_as::<Option<String>>(&ctx, &source);
        assert_eq!(converted, None);
        assert!(diags[0].detail.contains("unhandled unknown value"));
    }

    #[test]
    fn test_value_as_vec() {
        let ctx = Context::new();
        let source = known_list(vec![
            AttrValue::known_string("one"),
            AttrValue::known_string("two"),
        ]);
        let (converted, diags) = value_as::<Vec<String>>(&ctx, &source);
        assert!(diags.is_empty());
        assert_eq!(converted, Some(vec!["one".to_string(), "two".to_string()]));
    }

    #[test]
    fn test_value_as_vec_flags_failing_element() {
        let ctx = Context::new();
        let source = known_list(vec![
            AttrValue::known_string("one"),
            AttrValue::known_number(2.0),
        ]);
        let (converted, diags) = value_as::<Vec<String>>(&ctx, &source);
        assert_eq!(converted, None);
        assert!(diags[0].detail.contains("[1]:"));
        assert!(diags[0].detail.contains("into String"));
    }

    #[test]
    fn test_value_as_map() {
        let ctx = Context::new();
        let source = AttrValue::Map(MapValue {
            elem_type: WireType::Number,
            elems: ValueState::Known(BTreeMap::from([
                ("a".to_string(), AttrValue::known_number(1.0)),
                ("b".to_string(), AttrValue::known_number(2.0)),
            ])),
        });
        let (converted, diags) = value_as::<BTreeMap<String, f64>>(&ctx, &source);
        assert!(diags.is_empty());
        assert_eq!(
            converted,
            Some(BTreeMap::from([("a".to_string(), 1.0), ("b".to_string(), 2.0)]))
        );
    }

    #[test]
    fn test_value_as_at_attributes_path() {
        let ctx = Context::new();
        let path = AttributePath::new().with_attribute_name("test");
        let (converted, diags) =
            value_as_at::<bool>(&ctx, &AttrValue::known_string("nope"), &path);
        assert_eq!(converted, None);
        assert_eq!(diags[0].path, Some(path));
    }

    #[test]
    fn test_value_as_cancelled() {
        let ctx = Context::new();
        ctx.cancel();
        let (converted, diags) = value_as::<String>(&ctx, &AttrValue::known_string("x"));
        assert_eq!(converted, None);
        assert_eq!(diags[0].summary, "Conversion Cancelled");
    }
}
