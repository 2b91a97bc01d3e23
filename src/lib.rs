//! Document schema compiler and markup import rule resolution.
//!
//! This crate answers two questions for a structured document model:
//!
//! - "Is this child sequence valid under this kind's content expression?"
//! - "Given an external markup element or style declaration, which kind
//!   and attributes does it denote, if any?"
//!
//! The pieces:
//!
//! - [`Attr`]: declares one named attribute with default/required
//!   semantics.
//! - [`ContentExpr`]: a grammar over kind and group identifiers, compiled
//!   once and matched against ordered child-kind sequences.
//! - [`Rule`]: a selector/resolver pair in a kind's priority-ordered
//!   import table.
//! - [`Schema`]: the sealed registry of node and mark kinds, built once at
//!   startup and shared read-only thereafter.
//! - [`basic`]: a baseline document schema wired to common markup.
//!
//! The document tree itself, raw markup parsing, rendering, and editing
//! commands all live outside this crate: inputs arrive as already-parsed
//! [`MarkupElement`] and [`StyleDeclaration`] data, and outputs are
//! resolved (kind, attribute map) pairs for the host to materialize.
//!
//! # Example
//!
//! ```
//! use kindred::{basic, MarkupElement};
//! use serde_json::json;
//!
//! let schema = basic::schema()?;
//!
//! let el = MarkupElement::new("h3");
//! let (kind, attrs) = schema.import_element(&el)?.expect("h3 is claimed");
//! assert_eq!(kind.name(), "heading");
//! assert_eq!(attrs["level"], json!(3));
//!
//! assert!(schema.validate_children("doc", &["paragraph", "heading"]));
//! assert!(!schema.validate_children::<&str>("doc", &[]));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod attrs;
pub mod basic;
pub mod content;
pub mod error;
pub mod markup;
pub mod rules;
pub mod schema;

pub use attrs::{Attr, AttrMap};
pub use content::{ContentError, ContentExpr};
pub use error::{AttrError, SchemaError};
pub use markup::{MarkupElement, StyleDeclaration};
pub use rules::{Resolver, Rule, RuleOutcome, Selector};
pub use schema::{MarkKind, MarkSpec, NodeKind, NodeSpec, Schema};
