//! The three data containers callers validate and read against.
//!
//! [`Config`], [`Plan`], and [`State`] each pair a raw dynamic value tree
//! with the [`Schema`] it conforms to. They are constructed once per request
//! (usually via [`crate::wire`]) and read-only thereafter. Reads resolve a
//! typed value at an attribute path, reporting failures as diagnostics
//! framed per container kind.

use std::sync::Arc;

use crate::context::Context;
use crate::diag::Diagnostics;
use crate::error::PathError;
use crate::path::AttributePath;
use crate::schema::Schema;
use crate::types::AttrType;
use crate::value::{AttrValue, RawValue};

/// A configuration value tree paired with its schema.
#[derive(Debug, Clone)]
pub struct Config {
    /// The raw value tree, shaped per `schema.wire_type()`.
    pub raw: RawValue,
    /// The schema the raw tree conforms to.
    pub schema: Schema,
}

/// A planned value tree paired with its schema.
#[derive(Debug, Clone)]
pub struct Plan {
    /// The raw value tree, shaped per `schema.wire_type()`.
    pub raw: RawValue,
    /// The schema the raw tree conforms to.
    pub schema: Schema,
}

/// A recorded state value tree paired with its schema.
#[derive(Debug, Clone)]
pub struct State {
    /// The raw value tree, shaped per `schema.wire_type()`.
    pub raw: RawValue,
    /// The schema the raw tree conforms to.
    pub schema: Schema,
}

impl Config {
    /// Resolve the typed value at `path`.
    pub fn get_attribute(
        &self,
        ctx: &Context,
        path: &AttributePath,
    ) -> (Option<AttrValue>, Diagnostics) {
        get_attribute_value(ctx, &self.raw, &self.schema, path, ContainerKind::Config)
    }
}

impl Plan {
    /// Resolve the typed value at `path`.
    pub fn get_attribute(
        &self,
        ctx: &Context,
        path: &AttributePath,
    ) -> (Option<AttrValue>, Diagnostics) {
        get_attribute_value(ctx, &self.raw, &self.schema, path, ContainerKind::Plan)
    }
}

impl State {
    /// Resolve the typed value at `path`.
    pub fn get_attribute(
        &self,
        ctx: &Context,
        path: &AttributePath,
    ) -> (Option<AttrValue>, Diagnostics) {
        get_attribute_value(ctx, &self.raw, &self.schema, path, ContainerKind::State)
    }
}

#[derive(Debug, Clone, Copy)]
enum ContainerKind {
    Config,
    Plan,
    State,
}

impl ContainerKind {
    fn read_error_summary(self) -> &'static str {
        match self {
            ContainerKind::Config => "Configuration Read Error",
            ContainerKind::Plan => "Plan Read Error",
            ContainerKind::State => "State Read Error",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            ContainerKind::Config => "configuration",
            ContainerKind::Plan => "plan",
            ContainerKind::State => "state",
        }
    }
}

fn read_error_detail(kind: ContainerKind, err: impl std::fmt::Display) -> String {
    format!(
        "An unexpected error was encountered trying to read an attribute from the {}. \
         This is always an error in the provider. Please report the following to the \
         provider developer:\n\n{}",
        kind.noun(),
        err
    )
}

fn get_attribute_value(
    ctx: &Context,
    raw: &RawValue,
    schema: &Schema,
    path: &AttributePath,
    kind: ContainerKind,
) -> (Option<AttrValue>, Diagnostics) {
    let mut diags = Diagnostics::new();

    if ctx.is_cancelled() {
        diags.add_attribute_error(
            path.clone(),
            "Read Cancelled",
            "The request was cancelled before the attribute could be read.",
        );
        return (None, diags);
    }

    let attr_type: Arc<dyn AttrType> = match schema.attr_type_at_path(path) {
        Ok(ty) => ty,
        Err(err) => {
            diags.add_attribute_error(
                path.clone(),
                kind.read_error_summary(),
                read_error_detail(
                    kind,
                    format_args!("error getting attribute type in schema: {}", err),
                ),
            );
            return (None, diags);
        }
    };

    // a wholly null tree makes every valid attribute read resolve to nothing
    if raw.is_null() {
        return (None, diags);
    }

    let raw_value = match raw.walk(path) {
        Ok(value) => value.clone(),
        // absent intermediate values read as a typed null
        Err(PathError::InvalidStep { .. }) => RawValue::null(attr_type.wire_type()),
        Err(err) => {
            diags.add_attribute_error(
                path.clone(),
                kind.read_error_summary(),
                read_error_detail(kind, err),
            );
            return (None, diags);
        }
    };

    tracing::trace!(path = %path, "calling type validate hook");
    let hook_diags = attr_type.validate(&raw_value, path);
    diags.append(hook_diags);
    if diags.has_error() {
        return (None, diags);
    }

    match attr_type.value_from_raw(&raw_value) {
        Ok(value) => (Some(value), diags),
        Err(err) => {
            diags.add_attribute_error(
                path.clone(),
                kind.read_error_summary(),
                read_error_detail(kind, err),
            );
            (None, diags)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Attribute;
    use crate::testing::{StringTypeWithValidateError, StringTypeWithValidateWarning};
    use crate::types::{NumberType, StringType, WireType};
    use crate::wire::DynamicValue;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn state_for(schema: Schema, document: serde_json::Value) -> State {
        let raw = DynamicValue::new(document).decode(&schema.wire_type()).unwrap();
        State { raw, schema }
    }

    #[test]
    fn test_get_attribute_known() {
        let schema = Schema::v0().with_attribute("name", Attribute::of_type(StringType).required());
        let state = state_for(schema, json!({"name": "web"}));
        let (value, diags) = state.get_attribute(
            &Context::new(),
            &AttributePath::new().with_attribute_name("name"),
        );
        assert!(diags.is_empty());
        assert_eq!(value, Some(AttrValue::known_string("web")));
    }

    #[test]
    fn test_get_attribute_null_root() {
        let schema = Schema::v0().with_attribute("name", Attribute::of_type(StringType).required());
        let state = State {
            raw: RawValue::null(schema.wire_type()),
            schema,
        };
        let (value, diags) = state.get_attribute(
            &Context::new(),
            &AttributePath::new().with_attribute_name("name"),
        );
        assert!(diags.is_empty());
        assert!(value.is_none());
    }

    #[test]
    fn test_get_attribute_absent_is_typed_null() {
        let schema = Schema::v0()
            .with_attribute("name", Attribute::of_type(StringType).required())
            .with_attribute("count", Attribute::of_type(NumberType).optional());
        let state = state_for(schema, json!({"name": "web"}));
        let (value, diags) = state.get_attribute(
            &Context::new(),
            &AttributePath::new().with_attribute_name("count"),
        );
        assert!(diags.is_empty());
        let value = value.unwrap();
        assert!(value.is_null());
        assert_eq!(value.wire_type(), WireType::Number);
    }

    #[test]
    fn test_get_attribute_unknown_schema_path() {
        let schema = Schema::v0().with_attribute("name", Attribute::of_type(StringType).required());
        let state = state_for(schema, json!({"name": "web"}));
        let (value, diags) = state.get_attribute(
            &Context::new(),
            &AttributePath::new().with_attribute_name("missing"),
        );
        assert!(value.is_none());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].summary, "State Read Error");
        assert!(diags[0].detail.contains("error getting attribute type in schema"));
    }

    #[test]
    fn test_get_attribute_hook_error_stops_construction() {
        let schema = Schema::v0().with_attribute(
            "name",
            Attribute::of_type(StringTypeWithValidateError).required(),
        );
        let raw = RawValue::object(BTreeMap::from([(
            "name".to_string(),
            RawValue::string("web"),
        )]));
        let config = Config { raw, schema };
        let (value, diags) = config.get_attribute(
            &Context::new(),
            &AttributePath::new().with_attribute_name("name"),
        );
        assert!(value.is_none());
        assert!(diags.has_error());
    }

    #[test]
    fn test_get_attribute_hook_warning_keeps_value() {
        let schema = Schema::v0().with_attribute(
            "name",
            Attribute::of_type(StringTypeWithValidateWarning).required(),
        );
        let raw = RawValue::object(BTreeMap::from([(
            "name".to_string(),
            RawValue::string("web"),
        )]));
        let config = Config { raw, schema };
        let (value, diags) = config.get_attribute(
            &Context::new(),
            &AttributePath::new().with_attribute_name("name"),
        );
        assert_eq!(value, Some(AttrValue::known_string("web")));
        assert_eq!(diags.len(), 1);
        assert!(!diags.has_error());
    }

    #[test]
    fn test_plan_read_error_framing() {
        let schema = Schema::v0().with_attribute("name", Attribute::of_type(StringType).required());
        let plan = Plan {
            raw: RawValue::object(BTreeMap::from([(
                "name".to_string(),
                RawValue::number(1.0),
            )])),
            schema,
        };
        let (value, diags) = plan.get_attribute(
            &Context::new(),
            &AttributePath::new().with_attribute_name("name"),
        );
        assert!(value.is_none());
        assert_eq!(diags[0].summary, "Plan Read Error");
        assert!(diags[0].detail.contains("can't use number value as string"));
    }
}
