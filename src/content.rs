//! Content expression compilation and matching.
//!
//! A content expression constrains the legal sequences of immediate child
//! kinds for a node kind. The textual form is a whitespace-separated
//! sequence of terms; each term is a kind or group identifier, optionally
//! suffixed with `*` (zero or more) or `+` (one or more). A bare term means
//! exactly one. A group term matches any kind belonging to that group.
//!
//! Expressions are compiled once, when the schema is sealed, against the
//! full alphabet of declared kinds and groups; unknown references are
//! compile errors, so matching never consults the registry. Matching is a
//! subset simulation over term positions: deterministic, total, and
//! allocation-free, since child validation sits on the hot path of every
//! structural edit.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

/// Most terms a single expression may carry.
///
/// The matcher tracks term positions in a fixed-width bit mask (one bit per
/// term plus the accept position), so the count is bounded. Real content
/// models use a handful of terms; hitting this limit is a schema bug.
pub const MAX_TERMS: usize = 127;

/// Error returned when compiling a content expression fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    /// A quantifier with no term, or a term with stacked quantifiers.
    #[error("dangling quantifier in term \"{0}\"")]
    DanglingQuantifier(String),

    /// A term references a name that is neither a declared kind nor a group.
    #[error("unknown kind or group \"{0}\"")]
    UnknownReference(String),

    /// A term contains characters outside identifier syntax.
    #[error("malformed term \"{0}\"")]
    MalformedTerm(String),

    /// The expression exceeds [`MAX_TERMS`] terms.
    #[error("expression has more than {MAX_TERMS} terms")]
    TooManyTerms,
}

/// Repetition count for one term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quantifier {
    One,
    ZeroOrMore,
    OneOrMore,
}

/// One compiled term: the set of kind identifiers it accepts plus its
/// quantifier. Group references are expanded to their member kinds here,
/// so matching is a plain set lookup.
#[derive(Debug, Clone, PartialEq)]
struct Term {
    allowed: BTreeSet<String>,
    quantifier: Quantifier,
}

/// A compiled, immutable content expression.
///
/// The empty expression (no terms) matches only the empty child sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentExpr {
    source: String,
    terms: Vec<Term>,
}

impl ContentExpr {
    /// Compiles expression text against an alphabet of declared kinds and
    /// groups.
    ///
    /// `kinds` is the set of valid kind identifiers; `groups` maps each
    /// group identifier to its member kinds. A term naming a kind matches
    /// exactly that kind; a term naming a group matches any member. Kind
    /// names shadow group names, but the schema builder rejects that
    /// collision before compilation ever sees it.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`] on dangling quantifiers, malformed terms,
    /// references to undeclared names, or too many terms.
    pub fn compile(
        text: &str,
        kinds: &BTreeSet<String>,
        groups: &BTreeMap<String, BTreeSet<String>>,
    ) -> Result<Self, ContentError> {
        let mut terms = Vec::new();

        for token in text.split_whitespace() {
            let (name, quantifier) = match token.strip_suffix('*') {
                Some(rest) => (rest, Quantifier::ZeroOrMore),
                None => match token.strip_suffix('+') {
                    Some(rest) => (rest, Quantifier::OneOrMore),
                    None => (token, Quantifier::One),
                },
            };

            if name.is_empty() || name.ends_with('*') || name.ends_with('+') {
                return Err(ContentError::DanglingQuantifier(token.to_string()));
            }
            if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ContentError::MalformedTerm(token.to_string()));
            }

            let allowed = if kinds.contains(name) {
                BTreeSet::from([name.to_string()])
            } else if let Some(members) = groups.get(name) {
                members.clone()
            } else {
                return Err(ContentError::UnknownReference(name.to_string()));
            };

            terms.push(Term { allowed, quantifier });
        }

        if terms.len() > MAX_TERMS {
            return Err(ContentError::TooManyTerms);
        }

        Ok(Self {
            source: text.to_string(),
            terms,
        })
    }

    /// The original expression text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the expression accepts the given ordered child-kind sequence.
    ///
    /// Matching inspects only kind identifiers, never content or
    /// attributes, and is deterministic: the same expression and sequence
    /// always produce the same answer.
    pub fn matches<S: AsRef<str>>(&self, children: &[S]) -> bool {
        // Bit i set = "ready to match term i"; bit terms.len() = accept.
        let mut states = self.close(1u128);

        for child in children {
            let tag = child.as_ref();
            let mut next = 0u128;
            for (i, term) in self.terms.iter().enumerate() {
                if states & (1u128 << i) == 0 || !term.allowed.contains(tag) {
                    continue;
                }
                match term.quantifier {
                    Quantifier::One => next |= 1u128 << (i + 1),
                    // Once a repeatable term has consumed a symbol it may
                    // either repeat or move on.
                    Quantifier::ZeroOrMore | Quantifier::OneOrMore => {
                        next |= 1u128 << i;
                        next |= 1u128 << (i + 1);
                    }
                }
            }
            if next == 0 {
                return false;
            }
            states = self.close(next);
        }

        states & (1u128 << self.terms.len()) != 0
    }

    /// Epsilon closure: a zero-or-more term may be skipped outright, so
    /// being ready for term i also means being ready for term i + 1.
    /// Ascending order propagates chains of skippable terms.
    fn close(&self, mut states: u128) -> u128 {
        for (i, term) in self.terms.iter().enumerate() {
            if states & (1u128 << i) != 0 && term.quantifier == Quantifier::ZeroOrMore {
                states |= 1u128 << (i + 1);
            }
        }
        states
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alphabet() -> (BTreeMap<String, BTreeSet<String>>, BTreeSet<String>) {
        let kinds: BTreeSet<String> = ["paragraph", "heading", "text", "image", "list_item"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut groups = BTreeMap::new();
        groups.insert(
            "block".to_string(),
            BTreeSet::from(["paragraph".to_string(), "heading".to_string()]),
        );
        groups.insert(
            "inline".to_string(),
            BTreeSet::from(["text".to_string(), "image".to_string()]),
        );
        (groups, kinds)
    }

    fn compile(text: &str) -> ContentExpr {
        let (groups, kinds) = alphabet();
        ContentExpr::compile(text, &kinds, &groups).unwrap()
    }

    // =========================================================================
    // Compilation
    // =========================================================================

    #[test]
    fn compile_rejects_unknown_reference() {
        let (groups, kinds) = alphabet();
        let err = ContentExpr::compile("tabel+", &kinds, &groups).unwrap_err();
        assert_eq!(err, ContentError::UnknownReference("tabel".to_string()));
    }

    #[test]
    fn compile_rejects_dangling_quantifier() {
        let (groups, kinds) = alphabet();
        assert_eq!(
            ContentExpr::compile("block ++", &kinds, &groups).unwrap_err(),
            ContentError::DanglingQuantifier("++".to_string())
        );
        assert_eq!(
            ContentExpr::compile("block*+", &kinds, &groups).unwrap_err(),
            ContentError::DanglingQuantifier("block*+".to_string())
        );
        assert_eq!(
            ContentExpr::compile("*", &kinds, &groups).unwrap_err(),
            ContentError::DanglingQuantifier("*".to_string())
        );
    }

    #[test]
    fn compile_rejects_malformed_term() {
        let (groups, kinds) = alphabet();
        assert_eq!(
            ContentExpr::compile("(block)", &kinds, &groups).unwrap_err(),
            ContentError::MalformedTerm("(block)".to_string())
        );
    }

    #[test]
    fn compile_rejects_too_many_terms() {
        let (groups, kinds) = alphabet();
        let text = vec!["paragraph"; MAX_TERMS + 1].join(" ");
        assert_eq!(
            ContentExpr::compile(&text, &kinds, &groups).unwrap_err(),
            ContentError::TooManyTerms
        );
    }

    #[test]
    fn compile_keeps_source_text() {
        assert_eq!(compile("block+").source(), "block+");
    }

    // =========================================================================
    // Matching
    // =========================================================================

    #[test]
    fn empty_expression_matches_only_empty_sequence() {
        let expr = compile("");
        assert!(expr.matches::<&str>(&[]));
        assert!(!expr.matches(&["paragraph"]));
    }

    #[test]
    fn exactly_one() {
        let expr = compile("paragraph");
        assert!(expr.matches(&["paragraph"]));
        assert!(!expr.matches::<&str>(&[]));
        assert!(!expr.matches(&["paragraph", "paragraph"]));
        assert!(!expr.matches(&["heading"]));
    }

    #[test]
    fn one_or_more_of_group() {
        let expr = compile("block+");
        assert!(expr.matches(&["paragraph"]));
        assert!(expr.matches(&["paragraph", "heading", "paragraph"]));
        assert!(!expr.matches::<&str>(&[]));
        assert!(!expr.matches(&["text"]));
    }

    #[test]
    fn zero_or_more_of_group() {
        let expr = compile("inline*");
        assert!(expr.matches::<&str>(&[]));
        assert!(expr.matches(&["text"]));
        assert!(expr.matches(&["text", "image", "text"]));
        assert!(!expr.matches(&["paragraph"]));
    }

    #[test]
    fn sequence_of_terms() {
        let expr = compile("heading block*");
        assert!(expr.matches(&["heading"]));
        assert!(expr.matches(&["heading", "paragraph"]));
        assert!(expr.matches(&["heading", "paragraph", "heading"]));
        assert!(!expr.matches(&["paragraph"]));
        assert!(!expr.matches::<&str>(&[]));
    }

    #[test]
    fn overlapping_terms_need_no_backtracking() {
        // "block* paragraph": the trailing paragraph must still be
        // reachable even though block also covers paragraph.
        let expr = compile("block* paragraph");
        assert!(expr.matches(&["paragraph"]));
        assert!(expr.matches(&["heading", "paragraph"]));
        assert!(expr.matches(&["paragraph", "paragraph", "paragraph"]));
        assert!(!expr.matches(&["heading"]));
        assert!(!expr.matches::<&str>(&[]));
    }

    #[test]
    fn chained_skippable_terms() {
        let expr = compile("heading* inline* paragraph");
        assert!(expr.matches(&["paragraph"]));
        assert!(expr.matches(&["heading", "text", "paragraph"]));
        assert!(expr.matches(&["text", "image", "paragraph"]));
        assert!(!expr.matches(&["text"]));
    }

    #[test]
    fn matching_is_deterministic() {
        let expr = compile("block+ inline*");
        let seq = ["paragraph", "heading", "text"];
        let first = expr.matches(&seq);
        for _ in 0..10 {
            assert_eq!(expr.matches(&seq), first);
        }
    }
}
