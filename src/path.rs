//! Attribute paths: ordered addressing sequences into a nested value tree.
//!
//! A path is immutable once constructed. The `with_*` builders append a step
//! to a copy and leave the original untouched, so a path held by one
//! diagnostic can never be mutated by later traversal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::RawValue;

/// One addressing step within an [`AttributePath`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStep {
    /// A named field of an object-shaped value.
    AttributeName(String),
    /// An index into a list value.
    ElementKeyInt(usize),
    /// A key into a map value.
    ElementKeyString(String),
    /// An element of a set value, addressed by the element itself.
    ElementKeyValue(Box<RawValue>),
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::AttributeName(name) => write!(f, ".{}", name),
            PathStep::ElementKeyInt(index) => write!(f, "[{}]", index),
            PathStep::ElementKeyString(key) => write!(f, "[{:?}]", key),
            PathStep::ElementKeyValue(value) => write!(f, "[{}]", value),
        }
    }
}

/// An ordered sequence of [`PathStep`]s locating a value within a nested
/// value tree. The empty path denotes the root.
///
/// # Example
///
/// ```
/// use attrkit::path::AttributePath;
///
/// let root = AttributePath::new();
/// let path = root.with_attribute_name("network").with_element_key_int(0);
///
/// // copy-on-append: the original is unmodified
/// assert!(root.is_root());
/// assert_eq!(path.steps().len(), 2);
/// assert_eq!(format!("{}", path), "network[0]");
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributePath {
    steps: Vec<PathStep>,
}

impl AttributePath {
    /// The empty path, denoting the root of the value tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this path is the root (has no steps).
    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// The steps of this path, in order.
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    fn with_step(&self, step: PathStep) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self { steps }
    }

    /// A copy of this path with a named-field step appended.
    pub fn with_attribute_name(&self, name: impl Into<String>) -> Self {
        self.with_step(PathStep::AttributeName(name.into()))
    }

    /// A copy of this path with a list-index step appended.
    pub fn with_element_key_int(&self, index: usize) -> Self {
        self.with_step(PathStep::ElementKeyInt(index))
    }

    /// A copy of this path with a map-key step appended.
    pub fn with_element_key_string(&self, key: impl Into<String>) -> Self {
        self.with_step(PathStep::ElementKeyString(key.into()))
    }

    /// A copy of this path with a set-element step appended.
    pub fn with_element_key_value(&self, value: RawValue) -> Self {
        self.with_step(PathStep::ElementKeyValue(Box::new(value)))
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                // the leading attribute name has no dot prefix
                PathStep::AttributeName(name) if i == 0 => write!(f, "{}", name)?,
                step => write!(f, "{}", step)?,
            }
        }
        Ok(())
    }
}
