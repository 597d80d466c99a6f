//! Severity-tagged, path-qualified findings and their accumulator.
//!
//! Diagnostics are the sole error-reporting channel for validation and
//! conversion: the engines never panic or unwind on bad data, they append
//! findings here and keep going wherever the algorithm allows.

use serde::{Deserialize, Serialize};

use crate::path::AttributePath;

/// How severe a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A finding that prevents the operation from completing.
    Error,
    /// A finding that should be addressed but does not block the operation.
    Warning,
}

/// One finding: a severity, a short summary, a longer detail, and optionally
/// the attribute path it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity of the finding.
    pub severity: Severity,
    /// A short, title-cased summary.
    pub summary: String,
    /// A detailed, human-readable description.
    pub detail: String,
    /// The path the finding applies to; `None` for request-level findings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<AttributePath>,
}

impl Diagnostic {
    /// Create an error diagnostic with no path.
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            path: None,
        }
    }

    /// Create a warning diagnostic with no path.
    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            path: None,
        }
    }

    /// Create an error diagnostic attributed to a path.
    pub fn attribute_error(
        path: AttributePath,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            path: Some(path),
            ..Self::error(summary, detail)
        }
    }

    /// Create a warning diagnostic attributed to a path.
    pub fn attribute_warning(
        path: AttributePath,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            path: Some(path),
            ..Self::warning(summary, detail)
        }
    }
}

/// An ordered collection of [`Diagnostic`]s.
///
/// Insertion order is preserved and significant: callers comparing engine
/// output against golden fixtures rely on it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    /// Append an error with no path.
    pub fn add_error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Diagnostic::error(summary, detail));
    }

    /// Append a warning with no path.
    pub fn add_warning(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Diagnostic::warning(summary, detail));
    }

    /// Append an error attributed to a path.
    pub fn add_attribute_error(
        &mut self,
        path: AttributePath,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.push(Diagnostic::attribute_error(path, summary, detail));
    }

    /// Append a warning attributed to a path.
    pub fn add_attribute_warning(
        &mut self,
        path: AttributePath,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.push(Diagnostic::attribute_warning(path, summary, detail));
    }

    /// Merge another collection into this one, preserving order.
    pub fn append(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    /// Whether any diagnostic has [`Severity::Error`].
    pub fn has_error(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of diagnostics.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the diagnostics in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }
}

impl std::ops::Deref for Diagnostics {
    type Target = [Diagnostic];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Self(vec![diagnostic])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_error() {
        let mut diags = Diagnostics::new();
        assert!(!diags.has_error());

        diags.add_warning("Deprecated", "Use something else.");
        assert!(!diags.has_error());

        diags.add_error("Invalid Value", "The value is wrong.");
        assert!(diags.has_error());
    }

    #[test]
    fn test_append_preserves_order() {
        let mut first = Diagnostics::new();
        first.add_warning("One", "first");

        let mut second = Diagnostics::new();
        second.add_warning("Two", "second");
        second.add_error("Three", "third");

        first.append(second);
        assert_eq!(first.len(), 3);
        assert_eq!(first[0].summary, "One");
        assert_eq!(first[1].summary, "Two");
        assert_eq!(first[2].summary, "Three");
    }

    #[test]
    fn test_attribute_diagnostics_carry_path() {
        let path = AttributePath::new().with_attribute_name("count");
        let diag = Diagnostic::attribute_error(path.clone(), "Invalid Value", "detail");
        assert_eq!(diag.path, Some(path));
        assert_eq!(diag.severity, Severity::Error);
    }

    #[test]
    fn test_serialization() {
        let diag = Diagnostic::attribute_warning(
            AttributePath::new().with_attribute_name("old"),
            "Attribute Deprecated",
            "Use new instead.",
        );
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["summary"], "Attribute Deprecated");
        assert_eq!(json["path"][0]["attribute_name"], "old");

        let unqualified = Diagnostic::error("Broken", "detail");
        let json = serde_json::to_value(&unqualified).unwrap();
        assert!(json.get("path").is_none());
    }
}
