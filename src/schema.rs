//! Schema trees: named attributes, presence flags, and nesting.
//!
//! A [`Schema`] maps attribute names to [`Attribute`] definitions. Each
//! attribute is either a leaf with an attribute type or a branch with
//! [`NestedAttributes`] (a sub-schema wrapped in single/list/set/map
//! container semantics). The builder constructors only produce structurally
//! valid attributes, but the fields stay public so schemas assembled
//! field-by-field or from foreign descriptions are representable; the
//! validation engine reports their contradictions as diagnostics instead of
//! panicking.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::PathError;
use crate::path::AttributePath;
use crate::types::{AttrType, ListType, MapType, ObjectType, SetType, WireType};
use crate::validation::AttributeValidator;

/// How instances of a nested sub-schema are contained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NestingMode {
    /// At most one object-shaped instance.
    #[default]
    Single,
    /// An ordered sequence of instances.
    List,
    /// An unordered, de-duplicated sequence of instances.
    Set,
    /// A string-keyed mapping of instances.
    Map,
}

/// A sub-schema wrapped in container semantics.
#[derive(Debug, Clone, Default)]
pub struct NestedAttributes {
    /// How instances are contained.
    pub nesting: NestingMode,
    /// The inner schema's attributes.
    pub attributes: BTreeMap<String, Attribute>,
}

impl NestedAttributes {
    fn with_mode(nesting: NestingMode) -> Self {
        Self {
            nesting,
            attributes: BTreeMap::new(),
        }
    }

    /// A single object-shaped instance.
    pub fn single() -> Self {
        Self::with_mode(NestingMode::Single)
    }

    /// An ordered sequence of instances.
    pub fn list() -> Self {
        Self::with_mode(NestingMode::List)
    }

    /// An unordered, de-duplicated sequence of instances.
    pub fn set() -> Self {
        Self::with_mode(NestingMode::Set)
    }

    /// A string-keyed mapping of instances.
    pub fn map() -> Self {
        Self::with_mode(NestingMode::Map)
    }

    /// Add an attribute to the inner schema.
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// The object type one instance of the inner schema conforms to.
    pub fn object_type(&self) -> ObjectType {
        ObjectType {
            attr_types: self
                .attributes
                .iter()
                .filter_map(|(name, attr)| {
                    attr.effective_type().map(|ty| (name.clone(), ty))
                })
                .collect(),
        }
    }
}

/// One named attribute definition within a schema.
///
/// Exactly one of `attr_type` and `nested` should be set, and at least one of
/// the presence flags; the validation engine reports violations as
/// "Invalid Attribute Definition" errors.
#[derive(Debug, Clone, Default)]
pub struct Attribute {
    /// The attribute's type, for leaf attributes.
    pub attr_type: Option<Arc<dyn AttrType>>,
    /// The attribute's nested sub-schema, for branch attributes.
    pub nested: Option<NestedAttributes>,
    /// The attribute must be present in configuration.
    pub required: bool,
    /// The attribute may be absent from configuration.
    pub optional: bool,
    /// The attribute is computed by the system (read-only for callers).
    pub computed: bool,
    /// The attribute's value should be hidden from display output.
    pub sensitive: bool,
    /// Human-readable description.
    pub description: Option<String>,
    /// If set, any non-null use of the attribute warns with this message.
    pub deprecation_message: Option<String>,
    /// Custom validators, run in declared order.
    pub validators: Vec<Arc<dyn AttributeValidator>>,
}

impl Attribute {
    /// Create a leaf attribute with the given type. Presence flags start
    /// unset; chain [`required`](Self::required), [`optional`](Self::optional)
    /// or [`computed`](Self::computed).
    pub fn of_type(ty: impl AttrType + 'static) -> Self {
        Self {
            attr_type: Some(Arc::new(ty)),
            ..Self::default()
        }
    }

    /// Create a branch attribute with the given nested sub-schema.
    pub fn nested(nested: NestedAttributes) -> Self {
        Self {
            nested: Some(nested),
            ..Self::default()
        }
    }

    /// Mark the attribute required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the attribute optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Mark the attribute computed.
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    /// Mark the attribute sensitive.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the deprecation message.
    pub fn with_deprecation_message(mut self, message: impl Into<String>) -> Self {
        self.deprecation_message = Some(message.into());
        self
    }

    /// Append a validator. Validators run in the order they were added.
    pub fn with_validator(mut self, validator: impl AttributeValidator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// The type this attribute's values conform to: the declared type for
    /// leaves, or a container-of-object type synthesized from the nested
    /// sub-schema for branches. `None` when neither is defined.
    pub fn effective_type(&self) -> Option<Arc<dyn AttrType>> {
        if let Some(ty) = &self.attr_type {
            return Some(Arc::clone(ty));
        }
        let nested = self.nested.as_ref()?;
        let object = nested.object_type();
        let ty: Arc<dyn AttrType> = match nested.nesting {
            NestingMode::Single => Arc::new(object),
            NestingMode::List => Arc::new(ListType {
                elem: Arc::new(object),
            }),
            NestingMode::Set => Arc::new(SetType {
                elem: Arc::new(object),
            }),
            NestingMode::Map => Arc::new(MapType {
                elem: Arc::new(object),
            }),
        };
        Some(ty)
    }
}

/// A schema: a mapping from attribute name to definition, plus schema-level
/// metadata.
///
/// Attribute enumeration is ordered by name, so diagnostics across sibling
/// attributes come out in a deterministic order.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// The schema version, incremented when the shape changes.
    pub version: u64,
    /// The attribute definitions by name.
    pub attributes: BTreeMap<String, Attribute>,
    /// If set, any non-null use of the whole schema warns with this message.
    pub deprecation_message: Option<String>,
}

impl Schema {
    /// Create a schema with the given version.
    pub fn new(version: u64) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Create a schema at version 0.
    pub fn v0() -> Self {
        Self::new(0)
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Set the schema-level deprecation message.
    pub fn with_deprecation_message(mut self, message: impl Into<String>) -> Self {
        self.deprecation_message = Some(message.into());
        self
    }

    /// The object type a whole value tree for this schema conforms to.
    pub fn object_type(&self) -> ObjectType {
        ObjectType {
            attr_types: self
                .attributes
                .iter()
                .filter_map(|(name, attr)| {
                    attr.effective_type().map(|ty| (name.clone(), ty))
                })
                .collect(),
        }
    }

    /// The wire-level descriptor for a whole value tree of this schema,
    /// handed to the transport layer for decoding.
    pub fn wire_type(&self) -> WireType {
        self.object_type().wire_type()
    }

    /// Resolve the attribute type at `path`.
    pub fn attr_type_at_path(&self, path: &AttributePath) -> Result<Arc<dyn AttrType>, PathError> {
        let mut current: Arc<dyn AttrType> = Arc::new(self.object_type());
        for step in path.steps() {
            current = current
                .apply_step(step)
                .ok_or_else(|| PathError::InvalidStep { step: step.clone() })?;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoolType, NumberType, StringType};

    fn subnet_schema() -> Schema {
        Schema::v0()
            .with_attribute("name", Attribute::of_type(StringType).required())
            .with_attribute(
                "subnets",
                Attribute::nested(
                    NestedAttributes::list()
                        .with_attribute("cidr", Attribute::of_type(StringType).required())
                        .with_attribute("public", Attribute::of_type(BoolType).optional()),
                )
                .optional(),
            )
    }

    #[test]
    fn test_wire_type_derivation() {
        let schema = subnet_schema();
        let subnet_object = WireType::Object(BTreeMap::from([
            ("cidr".to_string(), WireType::String),
            ("public".to_string(), WireType::Bool),
        ]));
        assert_eq!(
            schema.wire_type(),
            WireType::Object(BTreeMap::from([
                ("name".to_string(), WireType::String),
                ("subnets".to_string(), WireType::list(subnet_object)),
            ]))
        );
    }

    #[test]
    fn test_effective_type_per_nesting_mode() {
        let inner = || {
            NestedAttributes::single().with_attribute("x", Attribute::of_type(NumberType).required())
        };
        let object = WireType::Object(BTreeMap::from([("x".to_string(), WireType::Number)]));

        let single = Attribute::nested(inner()).required();
        assert_eq!(single.effective_type().unwrap().wire_type(), object);

        let listed = Attribute::nested(NestedAttributes {
            nesting: NestingMode::List,
            ..inner()
        })
        .required();
        assert_eq!(
            listed.effective_type().unwrap().wire_type(),
            WireType::list(object.clone())
        );

        let mapped = Attribute::nested(NestedAttributes {
            nesting: NestingMode::Map,
            ..inner()
        })
        .required();
        assert_eq!(
            mapped.effective_type().unwrap().wire_type(),
            WireType::map(object.clone())
        );

        let set = Attribute::nested(NestedAttributes {
            nesting: NestingMode::Set,
            ..inner()
        })
        .required();
        assert_eq!(
            set.effective_type().unwrap().wire_type(),
            WireType::set(object)
        );
    }

    #[test]
    fn test_effective_type_none_when_undefined() {
        assert!(Attribute::default().required().effective_type().is_none());
    }

    #[test]
    fn test_attr_type_at_path() {
        let schema = subnet_schema();

        let path = AttributePath::new().with_attribute_name("name");
        let ty = schema.attr_type_at_path(&path).unwrap();
        assert_eq!(ty.wire_type(), WireType::String);

        let path = AttributePath::new()
            .with_attribute_name("subnets")
            .with_element_key_int(2)
            .with_attribute_name("cidr");
        let ty = schema.attr_type_at_path(&path).unwrap();
        assert_eq!(ty.wire_type(), WireType::String);
    }

    #[test]
    fn test_attr_type_at_path_invalid() {
        let schema = subnet_schema();

        let missing = AttributePath::new().with_attribute_name("nope");
        assert!(schema.attr_type_at_path(&missing).is_err());

        // map key step into a list nesting
        let wrong_step = AttributePath::new()
            .with_attribute_name("subnets")
            .with_element_key_string("zero".to_string());
        assert!(schema.attr_type_at_path(&wrong_step).is_err());
    }

    #[test]
    fn test_builder_flags() {
        let attr = Attribute::of_type(StringType)
            .optional()
            .computed()
            .sensitive()
            .with_description("a token")
            .with_deprecation_message("Use credentials instead.");
        assert!(attr.optional && attr.computed && attr.sensitive);
        assert!(!attr.required);
        assert_eq!(attr.description.as_deref(), Some("a token"));
        assert_eq!(
            attr.deprecation_message.as_deref(),
            Some("Use credentials instead.")
        );
    }
}
