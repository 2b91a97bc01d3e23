//! The kind registry: declarations, build validation, and the sealed schema.
//!
//! A [`Schema`] is built once from declarative [`NodeSpec`] and [`MarkSpec`]
//! values, validating everything up front: identifier uniqueness, attribute
//! contradictions, static rule outputs against declared attributes, and
//! every content expression against the full alphabet of kinds and groups.
//! A successful build seals the registry; from then on every operation is a
//! pure read, so any number of threads may validate children and import
//! markup against a shared `Schema` without coordination.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::{debug, trace};

use crate::attrs::{self, Attr, AttrMap};
use crate::content::ContentExpr;
use crate::error::{AttrError, SchemaError};
use crate::markup::{MarkupElement, StyleDeclaration};
use crate::rules::{self, Resolver, Rule};

/// Declaration of one node kind, consumed by [`Schema::build`].
///
/// # Example
///
/// ```
/// use kindred::{NodeSpec, Rule, Schema};
///
/// let paragraph = NodeSpec::new("paragraph")
///     .content("inline*")
///     .group("block")
///     .rule(Rule::tag("p"));
/// let schema = Schema::build(
///     vec![
///         NodeSpec::new("doc").content("block+"),
///         paragraph,
///         NodeSpec::new("text").group("inline"),
///     ],
///     vec![],
/// )?;
/// assert!(schema.validate_children("doc", &["paragraph"]));
/// # Ok::<(), kindred::SchemaError>(())
/// ```
#[derive(Debug, Clone)]
pub struct NodeSpec {
    name: String,
    content: Option<String>,
    groups: Vec<String>,
    attrs: Vec<Attr>,
    rules: Vec<Rule>,
    code: bool,
    text: bool,
    selectable: bool,
    line_break: bool,
}

impl NodeSpec {
    /// Creates a leaf declaration: no content expression, no groups, no
    /// attributes, no rules, selectable by default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: None,
            groups: Vec::new(),
            attrs: Vec::new(),
            rules: Vec::new(),
            code: false,
            text: false,
            selectable: true,
            line_break: false,
        }
    }

    /// Sets the content expression text.
    ///
    /// An empty string allows no children; not calling this at all
    /// declares a leaf kind.
    pub fn content(mut self, expr: impl Into<String>) -> Self {
        self.content = Some(expr.into());
        self
    }

    /// Adds the kind to a named group.
    pub fn group(mut self, name: impl Into<String>) -> Self {
        self.groups.push(name.into());
        self
    }

    /// Declares an attribute.
    pub fn attr(mut self, attr: Attr) -> Self {
        self.attrs.push(attr);
        self
    }

    /// Appends a rule to the import table. Table order is declaration
    /// order.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Flags the kind as holding code content.
    pub fn code(mut self) -> Self {
        self.code = true;
        self
    }

    /// Flags the kind as the text container.
    pub fn text(mut self) -> Self {
        self.text = true;
        self
    }

    /// Sets whether instances are selectable as leaves.
    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Flags the kind as rendering as a line break.
    pub fn line_break(mut self) -> Self {
        self.line_break = true;
        self
    }
}

/// Declaration of one mark kind, consumed by [`Schema::build`].
///
/// Marks annotate spans of inline content; they have no content tree, so a
/// mark declares only attributes, an import rule table, and the code flag.
#[derive(Debug, Clone)]
pub struct MarkSpec {
    name: String,
    attrs: Vec<Attr>,
    rules: Vec<Rule>,
    code: bool,
}

impl MarkSpec {
    /// Creates an empty mark declaration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            rules: Vec::new(),
            code: false,
        }
    }

    /// Declares an attribute.
    pub fn attr(mut self, attr: Attr) -> Self {
        self.attrs.push(attr);
        self
    }

    /// Appends a rule to the import table.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Flags the mark as code styling.
    pub fn code(mut self) -> Self {
        self.code = true;
        self
    }
}

/// A sealed node kind.
#[derive(Debug)]
pub struct NodeKind {
    name: String,
    content: Option<ContentExpr>,
    groups: Vec<String>,
    attrs: Vec<Attr>,
    rules: Vec<Rule>,
    code: bool,
    text: bool,
    selectable: bool,
    line_break: bool,
}

impl NodeKind {
    /// The kind identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The compiled content expression, or `None` for a leaf kind.
    pub fn content(&self) -> Option<&ContentExpr> {
        self.content.as_ref()
    }

    /// Groups this kind belongs to.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Declared attributes.
    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    /// The import rule table, in priority order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Whether the kind holds code content.
    pub fn is_code(&self) -> bool {
        self.code
    }

    /// Whether the kind is the text container.
    pub fn is_text(&self) -> bool {
        self.text
    }

    /// Whether instances are selectable as leaves.
    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    /// Whether the kind renders as a line break.
    pub fn is_line_break(&self) -> bool {
        self.line_break
    }

    /// Whether the kind forbids children structurally.
    pub fn is_leaf(&self) -> bool {
        self.content.is_none()
    }

    /// Materializes a full attribute map for an instance of this kind.
    ///
    /// Fills defaults for declared attributes missing from `supplied`;
    /// fails with [`AttrError::Missing`] when a required attribute is
    /// neither supplied nor defaulted.
    pub fn resolve_attrs(&self, supplied: AttrMap) -> Result<AttrMap, AttrError> {
        attrs::resolve_all(&self.attrs, supplied)
    }
}

/// A sealed mark kind.
#[derive(Debug)]
pub struct MarkKind {
    name: String,
    attrs: Vec<Attr>,
    rules: Vec<Rule>,
    code: bool,
}

impl MarkKind {
    /// The kind identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared attributes.
    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    /// The import rule table, in priority order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Whether the mark is code styling.
    pub fn is_code(&self) -> bool {
        self.code
    }

    /// Materializes a full attribute map for an instance of this mark.
    pub fn resolve_attrs(&self, supplied: AttrMap) -> Result<AttrMap, AttrError> {
        attrs::resolve_all(&self.attrs, supplied)
    }
}

/// The sealed kind registry.
///
/// Built once at startup; immutable and shareable thereafter. Kinds are
/// stored in registration order because import resolution scans them in
/// that order: the first kind whose rule table claims a candidate wins.
#[derive(Debug)]
pub struct Schema {
    nodes: Vec<NodeKind>,
    marks: Vec<MarkKind>,
    node_index: HashMap<String, usize>,
    mark_index: HashMap<String, usize>,
    groups: BTreeMap<String, BTreeSet<String>>,
}

impl Schema {
    /// Builds and seals a registry from declarations.
    ///
    /// Validation order: identifier uniqueness (nodes, marks, and group
    /// names share one namespace), attribute declarations, static rule
    /// outputs, then content expression compilation. The first violation
    /// aborts the build.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] describing the first violation found; the
    /// registry is unusable and initialization should abort.
    pub fn build(nodes: Vec<NodeSpec>, marks: Vec<MarkSpec>) -> Result<Self, SchemaError> {
        // Identifier uniqueness across nodes and marks.
        let mut seen: BTreeSet<String> = BTreeSet::new();
        for name in nodes
            .iter()
            .map(|n| n.name.as_str())
            .chain(marks.iter().map(|m| m.name.as_str()))
        {
            if !seen.insert(name.to_string()) {
                return Err(SchemaError::DuplicateKind {
                    name: name.to_string(),
                });
            }
        }

        // Group membership, computed once. A group sharing a name with a
        // kind would shadow it inside content expressions.
        let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for spec in &nodes {
            for group in &spec.groups {
                if seen.contains(group.as_str()) {
                    return Err(SchemaError::DuplicateKind {
                        name: group.clone(),
                    });
                }
                groups
                    .entry(group.clone())
                    .or_default()
                    .insert(spec.name.clone());
            }
        }

        for spec in &nodes {
            validate_attrs(&spec.name, &spec.attrs)?;
            validate_rule_outputs(&spec.name, &spec.attrs, &spec.rules)?;
        }
        for spec in &marks {
            validate_attrs(&spec.name, &spec.attrs)?;
            validate_rule_outputs(&spec.name, &spec.attrs, &spec.rules)?;
        }

        // Content expressions range over node kinds only; marks are not
        // part of the content tree.
        let kind_names: BTreeSet<String> = nodes.iter().map(|n| n.name.clone()).collect();

        let mut sealed_nodes = Vec::with_capacity(nodes.len());
        for spec in nodes {
            let content = match &spec.content {
                Some(text) => Some(
                    ContentExpr::compile(text, &kind_names, &groups).map_err(|source| {
                        SchemaError::InvalidGrammar {
                            kind: spec.name.clone(),
                            expr: text.clone(),
                            source,
                        }
                    })?,
                ),
                None => None,
            };
            sealed_nodes.push(NodeKind {
                name: spec.name,
                content,
                groups: spec.groups,
                attrs: spec.attrs,
                rules: spec.rules,
                code: spec.code,
                text: spec.text,
                selectable: spec.selectable,
                line_break: spec.line_break,
            });
        }

        let sealed_marks: Vec<MarkKind> = marks
            .into_iter()
            .map(|spec| MarkKind {
                name: spec.name,
                attrs: spec.attrs,
                rules: spec.rules,
                code: spec.code,
            })
            .collect();

        let node_index = sealed_nodes
            .iter()
            .enumerate()
            .map(|(i, k)| (k.name.clone(), i))
            .collect();
        let mark_index = sealed_marks
            .iter()
            .enumerate()
            .map(|(i, k)| (k.name.clone(), i))
            .collect();

        debug!(
            "sealed schema: {} node kinds, {} mark kinds, {} groups",
            sealed_nodes.len(),
            sealed_marks.len(),
            groups.len()
        );

        Ok(Self {
            nodes: sealed_nodes,
            marks: sealed_marks,
            node_index,
            mark_index,
            groups,
        })
    }

    /// Looks up a node kind by identifier.
    pub fn node(&self, name: &str) -> Option<&NodeKind> {
        self.node_index.get(name).map(|&i| &self.nodes[i])
    }

    /// Looks up a mark kind by identifier.
    pub fn mark(&self, name: &str) -> Option<&MarkKind> {
        self.mark_index.get(name).map(|&i| &self.marks[i])
    }

    /// Node kinds in registration order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeKind> {
        self.nodes.iter()
    }

    /// Mark kinds in registration order.
    pub fn marks(&self) -> impl Iterator<Item = &MarkKind> {
        self.marks.iter()
    }

    /// The member kinds of a named group.
    pub fn group_members(&self, group: &str) -> Option<&BTreeSet<String>> {
        self.groups.get(group)
    }

    /// Whether `children` is a legal immediate-child sequence for `parent`.
    ///
    /// Leaf kinds and kinds with an empty content expression accept only
    /// the empty sequence. An unknown parent validates nothing.
    pub fn validate_children<S: AsRef<str>>(&self, parent: &str, children: &[S]) -> bool {
        match self.node(parent) {
            Some(kind) => match kind.content() {
                Some(expr) => expr.matches(children),
                None => children.is_empty(),
            },
            None => false,
        }
    }

    /// Resolves an external element to a node kind and attribute map.
    ///
    /// Kinds are scanned in registration order, each kind's rule table in
    /// declaration order; the first match wins. `Ok(None)` means no rule
    /// applied — the caller treats the element as ignorable. A matched rule
    /// whose kind then lacks a required attribute fails with
    /// [`AttrError::Missing`].
    pub fn import_element(
        &self,
        el: &MarkupElement,
    ) -> Result<Option<(&NodeKind, AttrMap)>, AttrError> {
        for kind in &self.nodes {
            if let Some(attrs) = rules::resolve_element(&kind.rules, el) {
                trace!("element <{}> resolved to node kind \"{}\"", el.tag(), kind.name);
                let attrs = kind.resolve_attrs(attrs)?;
                return Ok(Some((kind, attrs)));
            }
        }
        trace!("no applicable rule for element <{}>", el.tag());
        Ok(None)
    }

    /// Resolves an external element to a mark kind and attribute map.
    ///
    /// Mark rule tables match both style declarations and elements (an
    /// `<em>` tag and a `font-style: italic` declaration both denote the
    /// em mark); this is the element-side entry point, with the same scan
    /// semantics as [`Schema::import_element`] over mark kinds.
    pub fn import_mark_element(
        &self,
        el: &MarkupElement,
    ) -> Result<Option<(&MarkKind, AttrMap)>, AttrError> {
        for kind in &self.marks {
            if let Some(attrs) = rules::resolve_element(&kind.rules, el) {
                trace!("element <{}> resolved to mark kind \"{}\"", el.tag(), kind.name);
                let attrs = kind.resolve_attrs(attrs)?;
                return Ok(Some((kind, attrs)));
            }
        }
        trace!("no applicable mark rule for element <{}>", el.tag());
        Ok(None)
    }

    /// Resolves an external style declaration to a mark kind and attribute
    /// map.
    ///
    /// Same scan semantics as [`Schema::import_element`], over mark kinds.
    pub fn import_style(
        &self,
        decl: &StyleDeclaration,
    ) -> Result<Option<(&MarkKind, AttrMap)>, AttrError> {
        for kind in &self.marks {
            if let Some(attrs) = rules::resolve_style(&kind.rules, decl) {
                trace!(
                    "style {}: {} resolved to mark kind \"{}\"",
                    decl.property(),
                    decl.value(),
                    kind.name
                );
                let attrs = kind.resolve_attrs(attrs)?;
                return Ok(Some((kind, attrs)));
            }
        }
        trace!("no applicable rule for style {}", decl.property());
        Ok(None)
    }
}

fn validate_attrs(kind: &str, attrs: &[Attr]) -> Result<(), SchemaError> {
    for attr in attrs {
        if attr.is_required() && attr.default_value().is_some() {
            return Err(SchemaError::AttrContradiction {
                kind: kind.to_string(),
                attr: attr.name().to_string(),
            });
        }
        if attr.default_value() == Some(&serde_json::Value::Null) {
            return Err(SchemaError::NullDefault {
                kind: kind.to_string(),
                attr: attr.name().to_string(),
            });
        }
    }
    Ok(())
}

/// Checks static rule outputs against the declared attribute set. Computed
/// resolvers run at import time and cannot be checked here.
fn validate_rule_outputs(kind: &str, attrs: &[Attr], rules: &[Rule]) -> Result<(), SchemaError> {
    for rule in rules {
        if let Resolver::Attrs(map) = rule.resolver() {
            for name in map.keys() {
                if !attrs.iter().any(|a| a.name() == name) {
                    return Err(SchemaError::UndeclaredAttr {
                        kind: kind.to_string(),
                        attr: name.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}
