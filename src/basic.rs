//! A baseline document schema.
//!
//! The flat declarative registration set: the usual block and inline kinds
//! plus the four common marks, wired to the markup elements and style
//! declarations they import from. Hosts wanting a different document model
//! build their own [`NodeSpec`]/[`MarkSpec`] lists; this one is both a
//! usable default and the reference example for declaring kinds.
//!
//! Groups: `block` (top-level content), `inline` (paragraph content),
//! `list` (the two list kinds).

use serde_json::json;

use crate::attrs::{Attr, AttrMap};
use crate::error::SchemaError;
use crate::rules::Rule;
use crate::schema::{MarkSpec, NodeSpec, Schema};

/// Node kind declarations for the baseline schema, in import priority
/// order.
pub fn nodes() -> Vec<NodeSpec> {
    vec![
        NodeSpec::new("doc").content("block+"),
        NodeSpec::new("paragraph")
            .content("inline*")
            .group("block")
            .rule(Rule::tag("p")),
        NodeSpec::new("blockquote")
            .content("block+")
            .group("block")
            .rule(Rule::tag("blockquote")),
        NodeSpec::new("horizontal_rule")
            .group("block")
            .rule(Rule::tag("hr")),
        NodeSpec::new("heading")
            .content("inline*")
            .group("block")
            .attr(Attr::new("level").with_default(json!(1)))
            .rule(Rule::tag("h1").attrs([("level", json!(1))]))
            .rule(Rule::tag("h2").attrs([("level", json!(2))]))
            .rule(Rule::tag("h3").attrs([("level", json!(3))]))
            .rule(Rule::tag("h4").attrs([("level", json!(4))]))
            .rule(Rule::tag("h5").attrs([("level", json!(5))]))
            .rule(Rule::tag("h6").attrs([("level", json!(6))])),
        NodeSpec::new("code_block")
            .content("text*")
            .group("block")
            .code()
            .rule(Rule::tag("pre")),
        NodeSpec::new("ordered_list")
            .content("list_item+")
            .group("block")
            .group("list")
            .attr(Attr::new("order").with_default(json!(1)))
            .rule(Rule::tag("ol").from_element(|el| {
                let mut attrs = AttrMap::new();
                // No start attribute (or an unparsable one) leaves the
                // declared default in charge.
                if let Some(n) = el.attr("start").and_then(|v| v.parse::<i64>().ok()) {
                    attrs.insert("order".to_string(), json!(n));
                }
                Some(attrs)
            })),
        NodeSpec::new("bullet_list")
            .content("list_item+")
            .group("block")
            .group("list")
            .rule(Rule::tag("ul")),
        NodeSpec::new("list_item")
            .content("paragraph block*")
            .rule(Rule::tag("li")),
        NodeSpec::new("text").group("inline").text(),
        NodeSpec::new("image")
            .group("inline")
            .attr(Attr::new("src").required())
            .attr(Attr::new("alt").with_default(json!("")))
            .attr(Attr::new("title"))
            .rule(Rule::tag_with_attr("img", "src").from_element(|el| {
                let mut attrs = AttrMap::new();
                attrs.insert("src".to_string(), json!(el.attr("src")?));
                if let Some(alt) = el.attr("alt") {
                    attrs.insert("alt".to_string(), json!(alt));
                }
                if let Some(title) = el.attr("title") {
                    attrs.insert("title".to_string(), json!(title));
                }
                Some(attrs)
            })),
        NodeSpec::new("hard_break")
            .group("inline")
            .line_break()
            .selectable(false)
            .rule(Rule::tag("br")),
    ]
}

/// Mark kind declarations for the baseline schema, in import priority
/// order.
pub fn marks() -> Vec<MarkSpec> {
    vec![
        MarkSpec::new("link")
            .attr(Attr::new("href").required())
            .attr(Attr::new("title"))
            .rule(Rule::tag_with_attr("a", "href").from_element(|el| {
                let mut attrs = AttrMap::new();
                attrs.insert("href".to_string(), json!(el.attr("href")?));
                if let Some(title) = el.attr("title") {
                    attrs.insert("title".to_string(), json!(title));
                }
                Some(attrs)
            })),
        MarkSpec::new("em")
            .rule(Rule::tag("em"))
            .rule(Rule::tag("i"))
            .rule(
                Rule::style("font-style")
                    .from_style(|value| (value == "italic").then(AttrMap::new)),
            ),
        MarkSpec::new("strong")
            .rule(Rule::tag("strong"))
            .rule(Rule::tag("b"))
            .rule(Rule::style("font-weight").from_style(|value| {
                let bold = value == "bold"
                    || value == "bolder"
                    || value.parse::<u32>().is_ok_and(|n| n >= 600);
                bold.then(AttrMap::new)
            })),
        MarkSpec::new("code").code().rule(Rule::tag("code")),
    ]
}

/// Builds the sealed baseline schema.
pub fn schema() -> Result<Schema, SchemaError> {
    Schema::build(nodes(), marks())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn baseline_schema_builds() {
        let schema = schema().unwrap();
        assert!(schema.node("doc").is_some());
        assert!(schema.mark("strong").is_some());
    }

    #[test]
    fn group_membership_is_computed_at_seal() {
        let schema = schema().unwrap();
        let block = schema.group_members("block").unwrap();
        assert!(block.contains("paragraph"));
        assert!(block.contains("heading"));
        assert!(!block.contains("text"));

        assert_eq!(
            schema.group_members("list"),
            Some(&BTreeSet::from([
                "bullet_list".to_string(),
                "ordered_list".to_string()
            ]))
        );
    }

    #[test]
    fn flags_carry_through() {
        let schema = schema().unwrap();
        assert!(schema.node("code_block").unwrap().is_code());
        assert!(schema.node("hard_break").unwrap().is_line_break());
        assert!(!schema.node("hard_break").unwrap().is_selectable());
        assert!(schema.node("horizontal_rule").unwrap().is_leaf());
        assert!(schema.mark("code").unwrap().is_code());
    }
}
