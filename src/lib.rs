//! attrkit
//!
//! This crate provides the schema, validation, and value-conversion core for
//! building configuration providers. It follows the pattern established by
//! [terraform-plugin-framework](https://github.com/hashicorp/terraform-plugin-framework).
//!
//! # Overview
//!
//! The crate provides:
//!
//! - **Schema types**: [`Schema`], [`Attribute`], and [`NestedAttributes`]
//!   for describing an object configuration's shape and presence semantics
//! - **Attribute types**: the open [`AttrType`] capability set with built-in
//!   primitive and composite implementations
//! - **Dynamic values**: the tri-state [`RawValue`] tree and the
//!   strongly-typed [`AttrValue`] built from it
//! - **Validation engine**: [`validate_config`] walks a schema alongside a
//!   configuration, accumulating path-qualified [`Diagnostics`]
//! - **Conversion engine**: [`value_as`] converts attribute values into
//!   caller-chosen representations
//! - **Wire decoding**: [`DynamicValue`] checks transport payloads against a
//!   schema-derived type descriptor
//! - **Logging**: integration with `tracing` for structured logging
//!
//! # Quick Start
//!
//! ```
//! use attrkit::{
//!     config_from_wire, validate_config, Attribute, Context, DynamicValue, Schema, StringType,
//! };
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("name", Attribute::of_type(StringType).required())
//!     .with_attribute(
//!         "region",
//!         Attribute::of_type(StringType)
//!             .optional()
//!             .with_deprecation_message("Configure zone instead."),
//!     );
//!
//! let wire = DynamicValue::new(json!({"name": "web", "region": "us-east-1"}));
//! let (config, diags) = config_from_wire(Some(&wire), Some(&schema));
//! assert!(diags.is_empty());
//!
//! let diags = validate_config(&Context::new(), &config.unwrap());
//! assert_eq!(diags.len(), 1);
//! assert_eq!(diags[0].summary, "Attribute Deprecated");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod data;
pub mod diag;
pub mod error;
pub mod logging;
pub mod path;
pub mod schema;
pub mod testing;
pub mod types;
pub mod validation;
pub mod value;
pub mod value_as;
pub mod wire;

// Re-export main types at crate root
pub use context::Context;
pub use data::{Config, Plan, State};
pub use diag::{Diagnostic, Diagnostics, Severity};
pub use error::{DecodeError, PathError, TypeError};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use path::{AttributePath, PathStep};
pub use schema::{Attribute, NestedAttributes, NestingMode, Schema};
pub use types::{
    AttrType, BoolType, ListType, MapType, NumberType, ObjectType, SetType, StringType, WireType,
};
pub use validation::{
    attribute_validate, validate_config, AttributeValidator, ValidateAttributeRequest,
    ValidateAttributeResponse,
};
pub use value::{AttrValue, RawKind, RawValue, ValueState};
pub use value_as::{value_as, value_as_at, ConversionError, FromAttrValue};
pub use wire::{
    config_from_wire, plan_from_wire, provider_meta_from_wire, state_from_wire, DynamicValue,
};

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
