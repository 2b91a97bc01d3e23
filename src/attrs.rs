//! Attribute descriptors and attribute maps.
//!
//! Each kind declares the attributes its instances may carry as a list of
//! [`Attr`] descriptors. A descriptor either has a default value, is
//! required, or is plain optional (absent values resolve to JSON null).
//! Required and defaulted are mutually exclusive; the contradiction is
//! rejected when the schema is built.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::AttrError;

/// A resolved set of attribute values, keyed by attribute name.
///
/// `BTreeMap` keeps iteration deterministic, which matters for stable
/// diagnostics and test output.
pub type AttrMap = BTreeMap<String, Value>;

/// Declares one named attribute on a node or mark kind.
///
/// # Example
///
/// ```
/// use kindred::Attr;
/// use serde_json::json;
///
/// let level = Attr::new("level").with_default(json!(1));
/// assert_eq!(level.resolve(None).unwrap(), json!(1));
/// assert_eq!(level.resolve(Some(json!(3))).unwrap(), json!(3));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Attr {
    name: String,
    default: Option<Value>,
    required: bool,
}

impl Attr {
    /// Creates an optional attribute with no default.
    ///
    /// Absent values resolve to `Value::Null`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            required: false,
        }
    }

    /// Sets the default value, returning the descriptor for chaining.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Marks the attribute as required.
    ///
    /// A required attribute has no default; construction must supply a
    /// value or fail. Combining this with [`Attr::with_default`] is a
    /// build-time schema error.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared default value, if any.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether the attribute must be supplied at construction.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Resolves a supplied value against this descriptor.
    ///
    /// A supplied value is returned unchanged. An absent value falls back
    /// to the default when one exists, resolves to null when the attribute
    /// is plain optional, and fails with [`AttrError::Missing`] when the
    /// attribute is required.
    pub fn resolve(&self, supplied: Option<Value>) -> Result<Value, AttrError> {
        match supplied {
            Some(value) => Ok(value),
            None => match &self.default {
                Some(default) => Ok(default.clone()),
                None if self.required => Err(AttrError::Missing {
                    attr: self.name.clone(),
                }),
                None => Ok(Value::Null),
            },
        }
    }
}

/// Materializes a full attribute map against a list of descriptors.
///
/// Supplied values win; declared attributes missing from `supplied` are
/// filled from defaults (or null), and a missing required attribute fails.
/// Keys in `supplied` that no descriptor declares pass through unchanged:
/// static rule outputs are checked against declarations at build time, and
/// computed resolvers are trusted to honor the same contract.
pub(crate) fn resolve_all(attrs: &[Attr], supplied: AttrMap) -> Result<AttrMap, AttrError> {
    let mut resolved = supplied;
    for attr in attrs {
        if !resolved.contains_key(attr.name()) {
            let value = attr.resolve(None)?;
            resolved.insert(attr.name().to_string(), value);
        }
    }
    Ok(resolved)
}
