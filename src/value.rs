//! Dynamic and typed value trees.
//!
//! [`RawValue`] is the self-describing dynamic value the transport hands the
//! engine: every node carries its [`WireType`] and is one of null, unknown, or
//! a known payload. The distinction between null ("absent") and unknown
//! ("resolvable later") is load-bearing: deprecation warnings and validators
//! treat the two differently.
//!
//! The typed side ([`AttrValue`] and the per-variant wrappers) is what the
//! [type system](crate::types) constructs out of raw values and what the
//! [conversion engine](crate::value_as) reads back out.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PathError;
use crate::path::{AttributePath, PathStep};
use crate::types::WireType;

/// Tri-state wrapper for a value that may be absent or not yet resolvable.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueState<T> {
    /// The value is absent.
    Null,
    /// The value exists but is not yet known.
    Unknown,
    /// The value is known.
    Known(T),
}

impl<T> ValueState<T> {
    /// Whether the state is [`ValueState::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, ValueState::Null)
    }

    /// Whether the state is [`ValueState::Unknown`].
    pub fn is_unknown(&self) -> bool {
        matches!(self, ValueState::Unknown)
    }

    /// The known value, if any.
    pub fn as_known(&self) -> Option<&T> {
        match self {
            ValueState::Known(value) => Some(value),
            _ => None,
        }
    }
}

/// The payload of a [`RawValue`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawKind {
    /// No value.
    Null,
    /// A value that is not yet known.
    Unknown,
    /// A known string.
    String(String),
    /// A known number.
    Number(f64),
    /// A known boolean.
    Bool(bool),
    /// A known ordered sequence.
    List(Vec<RawValue>),
    /// A known unordered, de-duplicated sequence.
    Set(Vec<RawValue>),
    /// A known string-keyed mapping with a single element type.
    Map(BTreeMap<String, RawValue>),
    /// A known fixed-shape mapping of named attributes.
    Object(BTreeMap<String, RawValue>),
}

/// A self-describing dynamic value: a wire type descriptor plus a tri-state
/// payload conforming to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawValue {
    ty: WireType,
    kind: RawKind,
}

impl RawValue {
    /// Create a raw value from a type descriptor and payload. The payload is
    /// trusted to conform; [`decode`](crate::wire::DynamicValue::decode) is
    /// the checked construction path.
    pub fn new(ty: WireType, kind: RawKind) -> Self {
        Self { ty, kind }
    }

    /// A null value of the given type.
    pub fn null(ty: WireType) -> Self {
        Self::new(ty, RawKind::Null)
    }

    /// An unknown value of the given type.
    pub fn unknown(ty: WireType) -> Self {
        Self::new(ty, RawKind::Unknown)
    }

    /// A known string value.
    pub fn string(value: impl Into<String>) -> Self {
        Self::new(WireType::String, RawKind::String(value.into()))
    }

    /// A known number value.
    pub fn number(value: f64) -> Self {
        Self::new(WireType::Number, RawKind::Number(value))
    }

    /// A known boolean value.
    pub fn boolean(value: bool) -> Self {
        Self::new(WireType::Bool, RawKind::Bool(value))
    }

    /// A known list value with the given element type.
    pub fn list(elem: WireType, elems: Vec<RawValue>) -> Self {
        Self::new(WireType::list(elem), RawKind::List(elems))
    }

    /// A known set value with the given element type.
    pub fn set(elem: WireType, elems: Vec<RawValue>) -> Self {
        Self::new(WireType::set(elem), RawKind::Set(elems))
    }

    /// A known map value with the given element type.
    pub fn map(elem: WireType, elems: BTreeMap<String, RawValue>) -> Self {
        Self::new(WireType::map(elem), RawKind::Map(elems))
    }

    /// A known object value; the descriptor is derived from the attributes.
    pub fn object(attrs: BTreeMap<String, RawValue>) -> Self {
        let attr_types = attrs
            .iter()
            .map(|(name, value)| (name.clone(), value.ty.clone()))
            .collect();
        Self::new(WireType::Object(attr_types), RawKind::Object(attrs))
    }

    /// The wire type this value carries.
    pub fn ty(&self) -> &WireType {
        &self.ty
    }

    /// The payload of this value.
    pub fn kind(&self) -> &RawKind {
        &self.kind
    }

    /// Whether the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self.kind, RawKind::Null)
    }

    /// Whether the value is unknown.
    pub fn is_unknown(&self) -> bool {
        matches!(self.kind, RawKind::Unknown)
    }

    /// Resolve the value at `path` within this value tree.
    ///
    /// Traversing through a null or unknown value, or addressing a missing
    /// attribute, element, or key, fails with [`PathError::InvalidStep`];
    /// applying a step kind that cannot apply to the value at that location
    /// (e.g. a list index into an object) fails with
    /// [`PathError::StepMismatch`].
    pub fn walk(&self, path: &AttributePath) -> Result<&RawValue, PathError> {
        let mut current = self;
        for step in path.steps() {
            current = current.apply_step(step)?;
        }
        Ok(current)
    }

    fn apply_step(&self, step: &PathStep) -> Result<&RawValue, PathError> {
        let missing = || PathError::InvalidStep { step: step.clone() };
        match (&self.kind, step) {
            // null and unknown ancestors cannot be stepped into; callers
            // resolve this to a typed null
            (RawKind::Null | RawKind::Unknown, _) => Err(missing()),
            (RawKind::Object(attrs), PathStep::AttributeName(name)) => {
                attrs.get(name).ok_or_else(missing)
            }
            (RawKind::List(elems), PathStep::ElementKeyInt(index)) => {
                elems.get(*index).ok_or_else(missing)
            }
            (RawKind::Map(elems), PathStep::ElementKeyString(key)) => {
                elems.get(key).ok_or_else(missing)
            }
            (RawKind::Set(elems), PathStep::ElementKeyValue(value)) => elems
                .iter()
                .find(|elem| *elem == value.as_ref())
                .ok_or_else(missing),
            _ => Err(PathError::StepMismatch {
                step: step.clone(),
                ty: self.ty.clone(),
            }),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RawKind::Null => write!(f, "null"),
            RawKind::Unknown => write!(f, "unknown"),
            RawKind::String(s) => write!(f, "{:?}", s),
            RawKind::Number(n) => write!(f, "{}", n),
            RawKind::Bool(b) => write!(f, "{}", b),
            RawKind::List(elems) | RawKind::Set(elems) => {
                write!(f, "[")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, "]")
            }
            RawKind::Map(elems) | RawKind::Object(elems) => {
                write!(f, "{{")?;
                for (i, (key, value)) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// A typed string value.
#[derive(Debug, Clone, PartialEq)]
pub struct StringValue(pub ValueState<String>);

/// A typed number value.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberValue(pub ValueState<f64>);

/// A typed boolean value.
#[derive(Debug, Clone, PartialEq)]
pub struct BoolValue(pub ValueState<bool>);

/// A typed list value.
#[derive(Debug, Clone, PartialEq)]
pub struct ListValue {
    /// The element type.
    pub elem_type: WireType,
    /// The elements, if known.
    pub elems: ValueState<Vec<AttrValue>>,
}

/// A typed set value.
#[derive(Debug, Clone, PartialEq)]
pub struct SetValue {
    /// The element type.
    pub elem_type: WireType,
    /// The elements, if known.
    pub elems: ValueState<Vec<AttrValue>>,
}

/// A typed map value.
#[derive(Debug, Clone, PartialEq)]
pub struct MapValue {
    /// The element type.
    pub elem_type: WireType,
    /// The entries, if known.
    pub elems: ValueState<BTreeMap<String, AttrValue>>,
}

/// A typed object value.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
    /// The per-attribute types.
    pub attr_types: BTreeMap<String, WireType>,
    /// The attribute values, if known.
    pub attrs: ValueState<BTreeMap<String, AttrValue>>,
}

/// A strongly-typed attribute value, produced by an
/// [`AttrType`](crate::types::AttrType) from a conforming [`RawValue`].
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// A string value.
    String(StringValue),
    /// A number value.
    Number(NumberValue),
    /// A boolean value.
    Bool(BoolValue),
    /// A list value.
    List(ListValue),
    /// A set value.
    Set(SetValue),
    /// A map value.
    Map(MapValue),
    /// An object value.
    Object(ObjectValue),
}

impl AttrValue {
    /// A known string value.
    pub fn known_string(value: impl Into<String>) -> Self {
        AttrValue::String(StringValue(ValueState::Known(value.into())))
    }

    /// A known number value.
    pub fn known_number(value: f64) -> Self {
        AttrValue::Number(NumberValue(ValueState::Known(value)))
    }

    /// A known boolean value.
    pub fn known_bool(value: bool) -> Self {
        AttrValue::Bool(BoolValue(ValueState::Known(value)))
    }

    /// Whether the value is null.
    pub fn is_null(&self) -> bool {
        match self {
            AttrValue::String(v) => v.0.is_null(),
            AttrValue::Number(v) => v.0.is_null(),
            AttrValue::Bool(v) => v.0.is_null(),
            AttrValue::List(v) => v.elems.is_null(),
            AttrValue::Set(v) => v.elems.is_null(),
            AttrValue::Map(v) => v.elems.is_null(),
            AttrValue::Object(v) => v.attrs.is_null(),
        }
    }

    /// Whether the value is unknown.
    pub fn is_unknown(&self) -> bool {
        match self {
            AttrValue::String(v) => v.0.is_unknown(),
            AttrValue::Number(v) => v.0.is_unknown(),
            AttrValue::Bool(v) => v.0.is_unknown(),
            AttrValue::List(v) => v.elems.is_unknown(),
            AttrValue::Set(v) => v.elems.is_unknown(),
            AttrValue::Map(v) => v.elems.is_unknown(),
            AttrValue::Object(v) => v.attrs.is_unknown(),
        }
    }

    /// The name of the concrete value variant, used in conversion
    /// diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::String(_) => "StringValue",
            AttrValue::Number(_) => "NumberValue",
            AttrValue::Bool(_) => "BoolValue",
            AttrValue::List(_) => "ListValue",
            AttrValue::Set(_) => "SetValue",
            AttrValue::Map(_) => "MapValue",
            AttrValue::Object(_) => "ObjectValue",
        }
    }

    /// The wire type this value conforms to.
    pub fn wire_type(&self) -> WireType {
        match self {
            AttrValue::String(_) => WireType::String,
            AttrValue::Number(_) => WireType::Number,
            AttrValue::Bool(_) => WireType::Bool,
            AttrValue::List(v) => WireType::list(v.elem_type.clone()),
            AttrValue::Set(v) => WireType::set(v.elem_type.clone()),
            AttrValue::Map(v) => WireType::map(v.elem_type.clone()),
            AttrValue::Object(v) => WireType::Object(v.attr_types.clone()),
        }
    }

    /// Convert back into the dynamic representation.
    pub fn to_raw(&self) -> RawValue {
        let ty = self.wire_type();
        let kind = match self {
            AttrValue::String(v) => primitive_kind(&v.0, |s| RawKind::String(s.clone())),
            AttrValue::Number(v) => primitive_kind(&v.0, |n| RawKind::Number(*n)),
            AttrValue::Bool(v) => primitive_kind(&v.0, |b| RawKind::Bool(*b)),
            AttrValue::List(v) => sequence_kind(&v.elems, RawKind::List),
            AttrValue::Set(v) => sequence_kind(&v.elems, RawKind::Set),
            AttrValue::Map(v) => mapping_kind(&v.elems, RawKind::Map),
            AttrValue::Object(v) => mapping_kind(&v.attrs, RawKind::Object),
        };
        RawValue::new(ty, kind)
    }
}

fn primitive_kind<T>(state: &ValueState<T>, known: impl Fn(&T) -> RawKind) -> RawKind {
    match state {
        ValueState::Null => RawKind::Null,
        ValueState::Unknown => RawKind::Unknown,
        ValueState::Known(value) => known(value),
    }
}

fn sequence_kind(
    state: &ValueState<Vec<AttrValue>>,
    known: impl Fn(Vec<RawValue>) -> RawKind,
) -> RawKind {
    match state {
        ValueState::Null => RawKind::Null,
        ValueState::Unknown => RawKind::Unknown,
        ValueState::Known(elems) => known(elems.iter().map(AttrValue::to_raw).collect()),
    }
}

fn mapping_kind(
    state: &ValueState<BTreeMap<String, AttrValue>>,
    known: impl Fn(BTreeMap<String, RawValue>) -> RawKind,
) -> RawKind {
    match state {
        ValueState::Null => RawKind::Null,
        ValueState::Unknown => RawKind::Unknown,
        ValueState::Known(elems) => known(
            elems
                .iter()
                .map(|(key, value)| (key.clone(), value.to_raw()))
                .collect(),
        ),
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network_config() -> RawValue {
        let subnet = |cidr: &str| {
            RawValue::object(BTreeMap::from([(
                "cidr".to_string(),
                RawValue::string(cidr),
            )]))
        };
        RawValue::object(BTreeMap::from([(
            "subnets".to_string(),
            RawValue::list(subnet("10.0.0.0/24").ty().clone(), vec![
                subnet("10.0.0.0/24"),
                subnet("10.0.1.0/24"),
            ]),
        )]))
    }

    #[test]
    fn test_walk_into_list_element() {
        let config = network_config();
        let path = AttributePath::new()
            .with_attribute_name("subnets")
            .with_element_key_int(1)
            .with_attribute_name("cidr");
        let found = config.walk(&path).unwrap();
        assert_eq!(found, &RawValue::string("10.0.1.0/24"));
    }

    #[test]
    fn test_walk_missing_attribute_is_invalid_step() {
        let config = network_config();
        let path = AttributePath::new().with_attribute_name("absent");
        match config.walk(&path) {
            Err(PathError::InvalidStep { .. }) => {}
            other => panic!("expected InvalidStep, got {:?}", other),
        }
    }

    #[test]
    fn test_walk_through_null_ancestor_is_invalid_step() {
        let config = RawValue::object(BTreeMap::from([(
            "parent".to_string(),
            RawValue::null(WireType::Object(BTreeMap::from([(
                "child".to_string(),
                WireType::String,
            )]))),
        )]));
        let path = AttributePath::new()
            .with_attribute_name("parent")
            .with_attribute_name("child");
        match config.walk(&path) {
            Err(PathError::InvalidStep { .. }) => {}
            other => panic!("expected InvalidStep, got {:?}", other),
        }
    }

    #[test]
    fn test_walk_step_mismatch() {
        let config = network_config();
        let path = AttributePath::new().with_element_key_int(0);
        match config.walk(&path) {
            Err(PathError::StepMismatch { .. }) => {}
            other => panic!("expected StepMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_walk_set_by_element_value() {
        let a = RawValue::string("a");
        let b = RawValue::string("b");
        let set = RawValue::set(WireType::String, vec![a.clone(), b.clone()]);
        let path = AttributePath::new().with_element_key_value(b.clone());
        assert_eq!(set.walk(&path).unwrap(), &b);
    }

    #[test]
    fn test_empty_path_resolves_to_root() {
        let config = network_config();
        assert_eq!(config.walk(&AttributePath::new()).unwrap(), &config);
    }

    #[test]
    fn test_attr_value_states() {
        let known = AttrValue::known_string("x");
        assert!(!known.is_null());
        assert!(!known.is_unknown());

        let null = AttrValue::String(StringValue(ValueState::Null));
        assert!(null.is_null());

        let unknown = AttrValue::Number(NumberValue(ValueState::Unknown));
        assert!(unknown.is_unknown());
        assert!(!unknown.is_null());
    }

    #[test]
    fn test_to_raw_round_trip_shapes() {
        let value = AttrValue::List(ListValue {
            elem_type: WireType::String,
            elems: ValueState::Known(vec![
                AttrValue::known_string("a"),
                AttrValue::String(StringValue(ValueState::Null)),
            ]),
        });
        let raw = value.to_raw();
        assert_eq!(raw.ty(), &WireType::list(WireType::String));
        match raw.kind() {
            RawKind::List(elems) => {
                assert_eq!(elems.len(), 2);
                assert!(elems[1].is_null());
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", RawValue::string("hi")), "\"hi\"");
        assert_eq!(format!("{}", RawValue::number(4.0)), "4");
        assert_eq!(format!("{}", RawValue::null(WireType::Bool)), "null");
        assert_eq!(format!("{}", network_config().walk(&AttributePath::new().with_attribute_name("subnets")).unwrap()),
            "[{\"cidr\": \"10.0.0.0/24\"}, {\"cidr\": \"10.0.1.0/24\"}]");
    }
}
