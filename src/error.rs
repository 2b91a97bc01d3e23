//! Error taxonomy for schema building and attribute resolution.
//!
//! Two families exist:
//!
//! - [`SchemaError`]: fatal, surfaced when a registry is built. A failed
//!   build leaves no usable schema and the caller must abort initialization.
//! - [`AttrError`]: recoverable, returned per call when materializing
//!   attributes for a kind instance.
//!
//! "No applicable rule" during markup import is deliberately *not* an error:
//! the import operations return `Ok(None)` and the caller treats unmatched
//! markup as ignorable.

use thiserror::Error;

use crate::content::ContentError;

/// Error returned when building a [`Schema`](crate::Schema) fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two kinds (or a group and a kind) share an identifier.
    #[error("duplicate kind identifier \"{name}\"")]
    DuplicateKind { name: String },

    /// An attribute is flagged required but also carries a default.
    #[error("attribute \"{attr}\" on \"{kind}\" is required and cannot carry a default")]
    AttrContradiction { kind: String, attr: String },

    /// An attribute declares an explicit null default.
    #[error("attribute \"{attr}\" on \"{kind}\" declares a null default")]
    NullDefault { kind: String, attr: String },

    /// A rule's static attribute map names an attribute the kind does not declare.
    #[error("rule on \"{kind}\" produces undeclared attribute \"{attr}\"")]
    UndeclaredAttr { kind: String, attr: String },

    /// A content expression failed to compile.
    ///
    /// Kept as its own variant (rather than folding into a generic message)
    /// so diagnostics can point at the offending kind and expression text.
    #[error("invalid content expression \"{expr}\" on \"{kind}\": {source}")]
    InvalidGrammar {
        kind: String,
        expr: String,
        #[source]
        source: ContentError,
    },
}

/// Error returned when attribute materialization for a kind instance fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttrError {
    /// A required attribute was neither supplied nor defaulted.
    #[error("missing required attribute \"{attr}\"")]
    Missing { attr: String },
}
