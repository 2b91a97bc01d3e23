//! External markup input surface.
//!
//! This crate never parses raw markup text. The host's markup parser hands
//! over an already-materialized element tree and style declaration list;
//! the types here are the boundary contract for that handoff. Both are
//! plain data and serde-serializable so hosts can ship them across any
//! representation they like.

use serde::{Deserialize, Serialize};

/// One already-parsed markup element: a tag name plus its attributes in
/// document order.
///
/// # Example
///
/// ```
/// use kindred::MarkupElement;
///
/// let el = MarkupElement::new("ol").with_attr("start", "5");
/// assert_eq!(el.tag(), "ol");
/// assert_eq!(el.attr("start"), Some("5"));
/// assert!(!el.has_attr("reversed"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupElement {
    tag: String,
    #[serde(default)]
    attrs: Vec<(String, String)>,
}

impl MarkupElement {
    /// Creates an element with the given tag name and no attributes.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
        }
    }

    /// Appends an attribute, returning the element for chaining.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// The tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Looks up an attribute value by name.
    ///
    /// If the source markup repeated an attribute, the first occurrence
    /// wins, matching how markup parsers deduplicate.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the element carries the named attribute.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(n, _)| n == name)
    }

    /// Iterates attributes in document order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// One already-parsed style declaration: a property name and its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleDeclaration {
    property: String,
    value: String,
}

impl StyleDeclaration {
    /// Creates a declaration from a property name and value.
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }

    /// The property name.
    pub fn property(&self) -> &str {
        &self.property
    }

    /// The declared value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_lookup() {
        let el = MarkupElement::new("img")
            .with_attr("src", "a.png")
            .with_attr("alt", "A");
        assert_eq!(el.attr("src"), Some("a.png"));
        assert_eq!(el.attr("alt"), Some("A"));
        assert_eq!(el.attr("title"), None);
        assert!(el.has_attr("src"));
        assert!(!el.has_attr("title"));
    }

    #[test]
    fn repeated_attr_first_occurrence_wins() {
        let el = MarkupElement::new("a")
            .with_attr("href", "first")
            .with_attr("href", "second");
        assert_eq!(el.attr("href"), Some("first"));
    }

    #[test]
    fn attrs_iterate_in_document_order() {
        let el = MarkupElement::new("img")
            .with_attr("src", "a.png")
            .with_attr("alt", "A");
        let pairs: Vec<_> = el.attrs().collect();
        assert_eq!(pairs, vec![("src", "a.png"), ("alt", "A")]);
    }

    #[test]
    fn element_deserializes_from_host_json() {
        let el: MarkupElement =
            serde_json::from_str(r#"{"tag":"ol","attrs":[["start","5"]]}"#).unwrap();
        assert_eq!(el, MarkupElement::new("ol").with_attr("start", "5"));

        // attrs default to empty when the host omits them
        let el: MarkupElement = serde_json::from_str(r#"{"tag":"p"}"#).unwrap();
        assert_eq!(el, MarkupElement::new("p"));
    }

    #[test]
    fn style_declaration_accessors() {
        let decl = StyleDeclaration::new("font-weight", "bold");
        assert_eq!(decl.property(), "font-weight");
        assert_eq!(decl.value(), "bold");
    }
}
