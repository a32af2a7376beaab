//! The pattern pipeline behind `regexsmith`.
//!
//! A raw pattern string is parsed into a concrete syntax tree, lowered to a
//! typed tree, rewritten bottom-up to the smallest equivalent form, and
//! rendered back to pattern syntax. The pipeline runs on every builder call,
//! so parsing is single-lookahead with no backtracking, and the rewrite loop
//! stops at a fixpoint.

use thiserror::Error;

mod ast;
mod optimize;
mod parse;
mod render;

pub use ast::{Anchor, Backreference, CharSet, ClassItem, GroupKind, LookKind, Node};
pub use optimize::optimize_ast;
pub use render::{render, render_embedded};

/// A pattern the parser cannot make sense of. Carries the byte offset of the
/// offending character and what the grammar expected there.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parse error at offset {offset}: expected {expected}, found {}", found_text(.found))]
pub struct ParseError {
    pub offset: usize,
    pub expected: &'static str,
    pub found: Option<char>,
}

fn found_text(found: &Option<char>) -> String {
    match found {
        Some(c) => format!("{c:?}"),
        None => "end of pattern".to_owned(),
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Syntactically recognizable, but the pipeline cannot reason about it.
    /// Surfaced instead of being passed through half-understood.
    #[error("unsupported construct at offset {offset}: {construct}")]
    Unsupported {
        offset: usize,
        construct: &'static str,
    },
    /// A rewrite produced a pattern that fails the sanity re-parse or grew
    /// beyond its input. Fatal: a wrong-but-smaller pattern is worse than an
    /// error.
    #[error("optimizer invariant violation: {0}")]
    Invariant(String),
}

/// Parse a pattern string into its typed tree.
pub fn parse_pattern(pattern: &str) -> Result<Node, Error> {
    let cst = parse::parse(pattern)?;
    Ok(ast::lower(cst))
}

/// Run the full pipeline: parse, optimize, render. The result matches
/// exactly the strings the input matches, is never longer than the input,
/// and re-optimizes to itself.
pub fn optimize(pattern: &str) -> Result<String, Error> {
    let out = run(pattern, render::render)?;
    if out.len() > pattern.len() {
        return Err(Error::Invariant(format!(
            "optimized pattern {out:?} is larger than its input {pattern:?}"
        )));
    }
    Ok(out)
}

/// Like [`optimize`], but the result is safe to splice into a larger
/// pattern: a top-level alternation keeps its non-capturing group. This is
/// the entry point the builder layer uses between composition steps.
pub fn optimize_embedded(pattern: &str) -> Result<String, Error> {
    run(pattern, render::render_embedded)
}

fn run(pattern: &str, render: fn(&Node) -> String) -> Result<String, Error> {
    let tree = optimize_ast(parse_pattern(pattern)?);
    let out = render(&tree);

    // Defensive redundancy on every run, on top of the rewrite pass cap:
    // the rendered pattern must re-parse, and must re-optimize to the tree
    // it was rendered from.
    let reparsed = parse_pattern(&out).map_err(|e| {
        Error::Invariant(format!("optimized pattern {out:?} does not re-parse: {e}"))
    })?;
    if optimize_ast(reparsed) != tree {
        return Err(Error::Invariant(format!(
            "optimized pattern {out:?} is not a fixpoint of the pipeline"
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_offset_and_expectation() {
        let err = optimize("(?:a|b").unwrap_err();
        match err {
            Error::Parse(e) => {
                assert_eq!(e.offset, 6);
                assert_eq!(e.found, None);
                assert!(e.to_string().contains("offset 6"));
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn surfaces_unsupported_constructs() {
        assert!(matches!(
            optimize("(?>a)"),
            Err(Error::Unsupported {
                construct: "atomic group",
                ..
            })
        ));
        assert!(matches!(optimize("(?#note)"), Err(Error::Unsupported { .. })));
        assert!(matches!(optimize("(?i)a"), Err(Error::Unsupported { .. })));
    }

    #[test]
    fn trivial_pattern_is_untouched() {
        assert_eq!(optimize("a").unwrap(), "a");
    }
}
