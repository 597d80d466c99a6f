//! The attribute type system: wire-level type descriptors and the capability
//! set every attribute type implements.
//!
//! [`WireType`] is the closed descriptor vocabulary shared with the transport
//! layer. [`AttrType`] is the open capability set: the built-in types here
//! cover the descriptor vocabulary one-to-one, and downstream code may define
//! further types (typically to attach a [`validate`](AttrType::validate)
//! hook) as long as they produce conforming descriptors and values.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::diag::Diagnostics;
use crate::error::TypeError;
use crate::path::{AttributePath, PathStep};
use crate::value::{
    AttrValue, BoolValue, ListValue, MapValue, NumberValue, ObjectValue, RawKind, RawValue,
    SetValue, StringValue, ValueState,
};

/// A wire-level type descriptor.
///
/// This is what schemas hand the transport layer so it can decode dynamic
/// values, and what raw values carry to describe their own shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireType {
    /// A string.
    String,
    /// A number.
    Number,
    /// A boolean.
    Bool,
    /// An ordered sequence of one element type.
    List(Box<WireType>),
    /// An unordered, de-duplicated sequence of one element type.
    Set(Box<WireType>),
    /// A string-keyed mapping of one element type.
    Map(Box<WireType>),
    /// A fixed set of named attributes, each with its own type.
    Object(BTreeMap<String, WireType>),
}

impl WireType {
    /// Create a list descriptor.
    pub fn list(elem: WireType) -> Self {
        Self::List(Box::new(elem))
    }

    /// Create a set descriptor.
    pub fn set(elem: WireType) -> Self {
        Self::Set(Box::new(elem))
    }

    /// Create a map descriptor.
    pub fn map(elem: WireType) -> Self {
        Self::Map(Box::new(elem))
    }

    /// Whether two descriptors have the same outermost constructor, ignoring
    /// element and attribute types.
    pub fn same_kind(&self, other: &WireType) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireType::String => write!(f, "string"),
            WireType::Number => write!(f, "number"),
            WireType::Bool => write!(f, "bool"),
            WireType::List(elem) => write!(f, "list({})", elem),
            WireType::Set(elem) => write!(f, "set({})", elem),
            WireType::Map(elem) => write!(f, "map({})", elem),
            WireType::Object(attrs) => {
                write!(f, "object({{")?;
                for (i, (name, ty)) in attrs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, ty)?;
                }
                write!(f, "}})")
            }
        }
    }
}

/// The capability set of an attribute type.
///
/// An `AttrType` knows its wire descriptor and how to construct a typed value
/// from a conforming raw value. It may additionally gate construction with a
/// [`validate`](Self::validate) hook, and composite types expose path
/// navigation via [`apply_step`](Self::apply_step).
pub trait AttrType: fmt::Debug + Send + Sync {
    /// The wire-level descriptor for this type.
    fn wire_type(&self) -> WireType;

    /// Construct a typed value from a raw value whose shape conforms to
    /// [`wire_type`](Self::wire_type). A mismatch is a defect in the caller,
    /// reported as a [`TypeError`]; no partial value is ever produced.
    fn value_from_raw(&self, raw: &RawValue) -> Result<AttrValue, TypeError>;

    /// Advisory validation hook, invoked by the validation engine with the
    /// raw value before [`value_from_raw`](Self::value_from_raw). The default
    /// implementation returns no diagnostics.
    fn validate(&self, _raw: &RawValue, _path: &AttributePath) -> Diagnostics {
        Diagnostics::new()
    }

    /// Navigate one path step into this type, yielding the type at that
    /// location. Primitive types and mismatched step kinds yield `None`.
    fn apply_step(&self, _step: &PathStep) -> Option<Arc<dyn AttrType>> {
        None
    }

    /// Whether this type equals another. The default compares wire
    /// descriptors.
    fn equal(&self, other: &dyn AttrType) -> bool {
        self.wire_type() == other.wire_type()
    }
}

fn mismatch(expected: WireType, raw: &RawValue) -> TypeError {
    TypeError::Mismatch {
        expected,
        actual: raw.ty().clone(),
    }
}

/// The string attribute type.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

impl AttrType for StringType {
    fn wire_type(&self) -> WireType {
        WireType::String
    }

    fn value_from_raw(&self, raw: &RawValue) -> Result<AttrValue, TypeError> {
        let state = match raw.kind() {
            RawKind::Null if raw.ty() == &WireType::String => ValueState::Null,
            RawKind::Unknown if raw.ty() == &WireType::String => ValueState::Unknown,
            RawKind::String(value) => ValueState::Known(value.clone()),
            _ => return Err(mismatch(WireType::String, raw)),
        };
        Ok(AttrValue::String(StringValue(state)))
    }
}

/// The number attribute type.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberType;

impl AttrType for NumberType {
    fn wire_type(&self) -> WireType {
        WireType::Number
    }

    fn value_from_raw(&self, raw: &RawValue) -> Result<AttrValue, TypeError> {
        let state = match raw.kind() {
            RawKind::Null if raw.ty() == &WireType::Number => ValueState::Null,
            RawKind::Unknown if raw.ty() == &WireType::Number => ValueState::Unknown,
            RawKind::Number(value) => ValueState::Known(*value),
            _ => return Err(mismatch(WireType::Number, raw)),
        };
        Ok(AttrValue::Number(NumberValue(state)))
    }
}

/// The boolean attribute type.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolType;

impl AttrType for BoolType {
    fn wire_type(&self) -> WireType {
        WireType::Bool
    }

    fn value_from_raw(&self, raw: &RawValue) -> Result<AttrValue, TypeError> {
        let state = match raw.kind() {
            RawKind::Null if raw.ty() == &WireType::Bool => ValueState::Null,
            RawKind::Unknown if raw.ty() == &WireType::Bool => ValueState::Unknown,
            RawKind::Bool(value) => ValueState::Known(*value),
            _ => return Err(mismatch(WireType::Bool, raw)),
        };
        Ok(AttrValue::Bool(BoolValue(state)))
    }
}

/// The list attribute type, parameterized by an element type.
#[derive(Debug, Clone)]
pub struct ListType {
    /// The element type.
    pub elem: Arc<dyn AttrType>,
}

impl ListType {
    /// Create a list type over the given element type.
    pub fn of(elem: impl AttrType + 'static) -> Self {
        Self {
            elem: Arc::new(elem),
        }
    }
}

impl AttrType for ListType {
    fn wire_type(&self) -> WireType {
        WireType::list(self.elem.wire_type())
    }

    fn value_from_raw(&self, raw: &RawValue) -> Result<AttrValue, TypeError> {
        let elems = match raw.kind() {
            RawKind::Null if raw.ty().same_kind(&self.wire_type()) => ValueState::Null,
            RawKind::Unknown if raw.ty().same_kind(&self.wire_type()) => ValueState::Unknown,
            RawKind::List(elems) => ValueState::Known(convert_elems(&self.elem, elems)?),
            _ => return Err(mismatch(self.wire_type(), raw)),
        };
        Ok(AttrValue::List(ListValue {
            elem_type: self.elem.wire_type(),
            elems,
        }))
    }

    fn apply_step(&self, step: &PathStep) -> Option<Arc<dyn AttrType>> {
        match step {
            PathStep::ElementKeyInt(_) => Some(Arc::clone(&self.elem)),
            _ => None,
        }
    }
}

/// The set attribute type, parameterized by an element type.
#[derive(Debug, Clone)]
pub struct SetType {
    /// The element type.
    pub elem: Arc<dyn AttrType>,
}

impl SetType {
    /// Create a set type over the given element type.
    pub fn of(elem: impl AttrType + 'static) -> Self {
        Self {
            elem: Arc::new(elem),
        }
    }
}

impl AttrType for SetType {
    fn wire_type(&self) -> WireType {
        WireType::set(self.elem.wire_type())
    }

    fn value_from_raw(&self, raw: &RawValue) -> Result<AttrValue, TypeError> {
        let elems = match raw.kind() {
            RawKind::Null if raw.ty().same_kind(&self.wire_type()) => ValueState::Null,
            RawKind::Unknown if raw.ty().same_kind(&self.wire_type()) => ValueState::Unknown,
            RawKind::Set(elems) => ValueState::Known(convert_elems(&self.elem, elems)?),
            _ => return Err(mismatch(self.wire_type(), raw)),
        };
        Ok(AttrValue::Set(SetValue {
            elem_type: self.elem.wire_type(),
            elems,
        }))
    }

    fn apply_step(&self, step: &PathStep) -> Option<Arc<dyn AttrType>> {
        match step {
            PathStep::ElementKeyValue(_) => Some(Arc::clone(&self.elem)),
            _ => None,
        }
    }
}

/// The map attribute type, parameterized by an element type.
#[derive(Debug, Clone)]
pub struct MapType {
    /// The element type.
    pub elem: Arc<dyn AttrType>,
}

impl MapType {
    /// Create a map type over the given element type.
    pub fn of(elem: impl AttrType + 'static) -> Self {
        Self {
            elem: Arc::new(elem),
        }
    }
}

impl AttrType for MapType {
    fn wire_type(&self) -> WireType {
        WireType::map(self.elem.wire_type())
    }

    fn value_from_raw(&self, raw: &RawValue) -> Result<AttrValue, TypeError> {
        let elems = match raw.kind() {
            RawKind::Null if raw.ty().same_kind(&self.wire_type()) => ValueState::Null,
            RawKind::Unknown if raw.ty().same_kind(&self.wire_type()) => ValueState::Unknown,
            RawKind::Map(entries) => {
                let mut converted = BTreeMap::new();
                for (key, elem) in entries {
                    let value = self
                        .elem
                        .value_from_raw(elem)
                        .map_err(|err| err.in_element(format!("[{:?}]", key)))?;
                    converted.insert(key.clone(), value);
                }
                ValueState::Known(converted)
            }
            _ => return Err(mismatch(self.wire_type(), raw)),
        };
        Ok(AttrValue::Map(MapValue {
            elem_type: self.elem.wire_type(),
            elems,
        }))
    }

    fn apply_step(&self, step: &PathStep) -> Option<Arc<dyn AttrType>> {
        match step {
            PathStep::ElementKeyString(_) => Some(Arc::clone(&self.elem)),
            _ => None,
        }
    }
}

/// The single-object attribute type, parameterized by named attribute types.
#[derive(Debug, Clone, Default)]
pub struct ObjectType {
    /// The attribute types by name.
    pub attr_types: BTreeMap<String, Arc<dyn AttrType>>,
}

impl ObjectType {
    /// Create an empty object type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute type.
    pub fn with_attr(mut self, name: impl Into<String>, ty: impl AttrType + 'static) -> Self {
        self.attr_types.insert(name.into(), Arc::new(ty));
        self
    }
}

impl AttrType for ObjectType {
    fn wire_type(&self) -> WireType {
        WireType::Object(
            self.attr_types
                .iter()
                .map(|(name, ty)| (name.clone(), ty.wire_type()))
                .collect(),
        )
    }

    fn value_from_raw(&self, raw: &RawValue) -> Result<AttrValue, TypeError> {
        let attrs = match raw.kind() {
            RawKind::Null if raw.ty().same_kind(&self.wire_type()) => ValueState::Null,
            RawKind::Unknown if raw.ty().same_kind(&self.wire_type()) => ValueState::Unknown,
            RawKind::Object(raw_attrs) => {
                // attributes absent from the raw object convert to typed
                // nulls; undeclared raw attributes are ignored
                let mut converted = BTreeMap::new();
                for (name, ty) in &self.attr_types {
                    let value = match raw_attrs.get(name) {
                        Some(raw_attr) => ty
                            .value_from_raw(raw_attr)
                            .map_err(|err| err.in_element(format!(".{}", name)))?,
                        None => ty.value_from_raw(&RawValue::null(ty.wire_type()))?,
                    };
                    converted.insert(name.clone(), value);
                }
                ValueState::Known(converted)
            }
            _ => return Err(mismatch(self.wire_type(), raw)),
        };
        Ok(AttrValue::Object(ObjectValue {
            attr_types: self
                .attr_types
                .iter()
                .map(|(name, ty)| (name.clone(), ty.wire_type()))
                .collect(),
            attrs,
        }))
    }

    fn apply_step(&self, step: &PathStep) -> Option<Arc<dyn AttrType>> {
        match step {
            PathStep::AttributeName(name) => self.attr_types.get(name).map(Arc::clone),
            _ => None,
        }
    }
}

fn convert_elems(
    elem_type: &Arc<dyn AttrType>,
    elems: &[RawValue],
) -> Result<Vec<AttrValue>, TypeError> {
    elems
        .iter()
        .enumerate()
        .map(|(i, elem)| {
            elem_type
                .value_from_raw(elem)
                .map_err(|err| err.in_element(format!("[{}]", i)))
        })
        .collect()
}
