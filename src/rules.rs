//! Markup import rules: selectors, resolvers, and table resolution.
//!
//! Each kind carries an ordered table of [`Rule`]s mapping external markup
//! onto instances of that kind. A rule pairs a [`Selector`] (what candidate
//! markup it applies to) with a [`Resolver`] (what attributes it produces).
//!
//! Applying one rule yields a [`RuleOutcome`] with three cases, not two:
//! a selector that never applied is distinct from a selector that applied
//! but whose resolver declined the specific value. Declines keep the table
//! scan going; the first `Matched` wins and later rules are never
//! consulted. Priority is strictly declaration order, with no specificity
//! scoring: callers control priority purely by registration order.

use std::fmt;
use std::sync::Arc;

use crate::attrs::AttrMap;
use crate::markup::{MarkupElement, StyleDeclaration};

/// Computed resolver over a matched element.
///
/// Returns `Some(attrs)` to claim the element or `None` to decline it.
pub type ElementResolver = Arc<dyn Fn(&MarkupElement) -> Option<AttrMap> + Send + Sync>;

/// Computed resolver over a matched style declaration's value.
///
/// Returns `Some(attrs)` to claim the declaration or `None` to decline it.
pub type StyleResolver = Arc<dyn Fn(&str) -> Option<AttrMap> + Send + Sync>;

/// What candidate markup a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// An element with this tag name, optionally requiring an attribute to
    /// be present (e.g. `a[href]`).
    Tag {
        name: String,
        with_attr: Option<String>,
    },
    /// A style declaration with this property name.
    Style { property: String },
}

/// How a matched rule produces attributes.
#[derive(Clone)]
pub enum Resolver {
    /// Accept with an empty attribute map.
    Accept,
    /// Accept with a fixed attribute map.
    Attrs(AttrMap),
    /// Compute attributes from the matched element, or decline.
    FromElement(ElementResolver),
    /// Compute attributes from the matched declaration's value, or decline.
    FromStyle(StyleResolver),
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolver::Accept => f.write_str("Accept"),
            Resolver::Attrs(map) => f.debug_tuple("Attrs").field(map).finish(),
            Resolver::FromElement(_) => f.write_str("FromElement(..)"),
            Resolver::FromStyle(_) => f.write_str("FromStyle(..)"),
        }
    }
}

/// The result of applying one rule to one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// Selector applied and the resolver produced attributes.
    Matched(AttrMap),
    /// Selector applied but the resolver declined; scanning continues.
    Declined,
    /// Selector did not apply to this candidate at all.
    NotApplicable,
}

/// One (selector, resolver) pair in a kind's rule table.
///
/// # Example
///
/// ```
/// use kindred::{AttrMap, MarkupElement, Rule, RuleOutcome};
/// use serde_json::json;
///
/// let h2 = Rule::tag("h2").attrs([("level", json!(2))]);
/// assert!(matches!(
///     h2.apply_element(&MarkupElement::new("h2")),
///     RuleOutcome::Matched(_)
/// ));
///
/// let start = Rule::tag("ol").from_element(|el| {
///     let mut attrs = AttrMap::new();
///     if let Some(n) = el.attr("start").and_then(|v| v.parse::<i64>().ok()) {
///         attrs.insert("order".to_string(), json!(n));
///     }
///     Some(attrs)
/// });
/// assert_eq!(
///     start.apply_element(&MarkupElement::new("div")),
///     RuleOutcome::NotApplicable
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Rule {
    selector: Selector,
    resolver: Resolver,
}

impl Rule {
    /// A rule matching elements by tag name, accepting with no attributes.
    pub fn tag(name: impl Into<String>) -> Self {
        Self {
            selector: Selector::Tag {
                name: name.into(),
                with_attr: None,
            },
            resolver: Resolver::Accept,
        }
    }

    /// A rule matching elements by tag name that also carry the named
    /// attribute, accepting with no attributes.
    pub fn tag_with_attr(name: impl Into<String>, attr: impl Into<String>) -> Self {
        Self {
            selector: Selector::Tag {
                name: name.into(),
                with_attr: Some(attr.into()),
            },
            resolver: Resolver::Accept,
        }
    }

    /// A rule matching style declarations by property name, accepting with
    /// no attributes.
    pub fn style(property: impl Into<String>) -> Self {
        Self {
            selector: Selector::Style {
                property: property.into(),
            },
            resolver: Resolver::Accept,
        }
    }

    /// Replaces the resolver with a fixed attribute map.
    pub fn attrs<K, I>(mut self, pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, serde_json::Value)>,
    {
        self.resolver = Resolver::Attrs(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        );
        self
    }

    /// Replaces the resolver with a computed element resolver.
    pub fn from_element<F>(mut self, f: F) -> Self
    where
        F: Fn(&MarkupElement) -> Option<AttrMap> + Send + Sync + 'static,
    {
        self.resolver = Resolver::FromElement(Arc::new(f));
        self
    }

    /// Replaces the resolver with a computed style resolver.
    pub fn from_style<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Option<AttrMap> + Send + Sync + 'static,
    {
        self.resolver = Resolver::FromStyle(Arc::new(f));
        self
    }

    /// The rule's selector.
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// The rule's resolver.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Applies this rule to an element candidate.
    pub fn apply_element(&self, el: &MarkupElement) -> RuleOutcome {
        match &self.selector {
            Selector::Tag { name, with_attr } => {
                if el.tag() != name {
                    return RuleOutcome::NotApplicable;
                }
                if let Some(attr) = with_attr {
                    if !el.has_attr(attr) {
                        return RuleOutcome::NotApplicable;
                    }
                }
                match &self.resolver {
                    Resolver::Accept => RuleOutcome::Matched(AttrMap::new()),
                    Resolver::Attrs(map) => RuleOutcome::Matched(map.clone()),
                    Resolver::FromElement(f) => match f(el) {
                        Some(attrs) => RuleOutcome::Matched(attrs),
                        None => RuleOutcome::Declined,
                    },
                    // A style resolver can never see an element.
                    Resolver::FromStyle(_) => RuleOutcome::NotApplicable,
                }
            }
            Selector::Style { .. } => RuleOutcome::NotApplicable,
        }
    }

    /// Applies this rule to a style declaration candidate.
    pub fn apply_style(&self, decl: &StyleDeclaration) -> RuleOutcome {
        match &self.selector {
            Selector::Style { property } => {
                if decl.property() != property {
                    return RuleOutcome::NotApplicable;
                }
                match &self.resolver {
                    Resolver::Accept => RuleOutcome::Matched(AttrMap::new()),
                    Resolver::Attrs(map) => RuleOutcome::Matched(map.clone()),
                    Resolver::FromStyle(f) => match f(decl.value()) {
                        Some(attrs) => RuleOutcome::Matched(attrs),
                        None => RuleOutcome::Declined,
                    },
                    // An element resolver can never see a declaration.
                    Resolver::FromElement(_) => RuleOutcome::NotApplicable,
                }
            }
            Selector::Tag { .. } => RuleOutcome::NotApplicable,
        }
    }
}

/// Scans a rule table against an element, first match wins.
///
/// Declined rules keep the scan going. Returns `None` when no rule matched
/// or all matching rules declined; the caller treats that as ignorable
/// markup, not an error.
pub fn resolve_element(rules: &[Rule], el: &MarkupElement) -> Option<AttrMap> {
    for rule in rules {
        match rule.apply_element(el) {
            RuleOutcome::Matched(attrs) => return Some(attrs),
            RuleOutcome::Declined | RuleOutcome::NotApplicable => continue,
        }
    }
    None
}

/// Scans a rule table against a style declaration, first match wins.
///
/// Same scan semantics as [`resolve_element`].
pub fn resolve_style(rules: &[Rule], decl: &StyleDeclaration) -> Option<AttrMap> {
    for rule in rules {
        match rule.apply_style(decl) {
            RuleOutcome::Matched(attrs) => return Some(attrs),
            RuleOutcome::Declined | RuleOutcome::NotApplicable => continue,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs_of(pairs: &[(&str, serde_json::Value)]) -> AttrMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    // =========================================================================
    // Single-rule outcomes
    // =========================================================================

    #[test]
    fn tag_selector_mismatch_is_not_applicable() {
        let rule = Rule::tag("h1");
        let el = MarkupElement::new("p");
        assert_eq!(rule.apply_element(&el), RuleOutcome::NotApplicable);
    }

    #[test]
    fn tag_selector_match_accepts_with_empty_attrs() {
        let rule = Rule::tag("p");
        let el = MarkupElement::new("p");
        assert_eq!(rule.apply_element(&el), RuleOutcome::Matched(AttrMap::new()));
    }

    #[test]
    fn static_attrs_are_returned_as_declared() {
        let rule = Rule::tag("h2").attrs([("level", json!(2))]);
        let el = MarkupElement::new("h2");
        assert_eq!(
            rule.apply_element(&el),
            RuleOutcome::Matched(attrs_of(&[("level", json!(2))]))
        );
    }

    #[test]
    fn attr_presence_requirement() {
        let rule = Rule::tag_with_attr("a", "href");
        assert_eq!(
            rule.apply_element(&MarkupElement::new("a")),
            RuleOutcome::NotApplicable
        );
        assert_eq!(
            rule.apply_element(&MarkupElement::new("a").with_attr("href", "#")),
            RuleOutcome::Matched(AttrMap::new())
        );
    }

    #[test]
    fn computed_resolver_can_decline() {
        let rule = Rule::style("font-weight")
            .from_style(|v| (v == "bold").then(AttrMap::new));
        assert_eq!(
            rule.apply_style(&StyleDeclaration::new("font-weight", "bold")),
            RuleOutcome::Matched(AttrMap::new())
        );
        assert_eq!(
            rule.apply_style(&StyleDeclaration::new("font-weight", "normal")),
            RuleOutcome::Declined
        );
        assert_eq!(
            rule.apply_style(&StyleDeclaration::new("font-style", "italic")),
            RuleOutcome::NotApplicable
        );
    }

    #[test]
    fn style_rule_never_applies_to_elements() {
        let rule = Rule::style("font-weight");
        assert_eq!(
            rule.apply_element(&MarkupElement::new("font-weight")),
            RuleOutcome::NotApplicable
        );
    }

    // =========================================================================
    // Table resolution
    // =========================================================================

    #[test]
    fn first_matching_rule_wins() {
        let rules = vec![
            Rule::tag("h1").attrs([("level", json!(1))]),
            Rule::tag("h1").attrs([("level", json!(99))]),
        ];
        let resolved = resolve_element(&rules, &MarkupElement::new("h1")).unwrap();
        assert_eq!(resolved, attrs_of(&[("level", json!(1))]));
    }

    #[test]
    fn decline_falls_through_to_later_rule() {
        let rules = vec![
            Rule::tag("ol").from_element(|el| {
                el.attr("start").map(|s| {
                    attrs_of(&[("order", json!(s.parse::<i64>().unwrap_or(1)))])
                })
            }),
            Rule::tag("ol").attrs([("order", json!(1))]),
        ];

        // First rule declines without a start attribute; second claims it.
        let plain = resolve_element(&rules, &MarkupElement::new("ol")).unwrap();
        assert_eq!(plain, attrs_of(&[("order", json!(1))]));

        let numbered =
            resolve_element(&rules, &MarkupElement::new("ol").with_attr("start", "5")).unwrap();
        assert_eq!(numbered, attrs_of(&[("order", json!(5))]));
    }

    #[test]
    fn all_declining_rules_resolve_to_none() {
        let rules = vec![
            Rule::style("font-weight").from_style(|v| (v == "bold").then(AttrMap::new)),
            Rule::style("font-weight").from_style(|v| (v == "bolder").then(AttrMap::new)),
        ];
        assert_eq!(
            resolve_style(&rules, &StyleDeclaration::new("font-weight", "normal")),
            None
        );
    }

    #[test]
    fn empty_table_resolves_to_none() {
        assert_eq!(resolve_element(&[], &MarkupElement::new("p")), None);
    }

    #[test]
    fn resolver_debug_elides_closures() {
        let rule = Rule::tag("ol").from_element(|_| Some(AttrMap::new()));
        assert_eq!(format!("{:?}", rule.resolver()), "FromElement(..)");
    }
}
