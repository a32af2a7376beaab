//! Rendering of pattern trees back to pattern syntax, grouping only where
//! precedence demands it.

use std::fmt::Write;

use crate::ast::{Anchor, Backreference, CharSet, ClassItem, GroupKind, LookKind, Node};

/// Where a node is being written; decides whether it needs its own
/// non-capturing group.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Position {
    /// The whole pattern: an alternation may stay bare.
    Root,
    /// Inside a sequence: an alternation must be grouped.
    Sequence,
    /// Operand of a quantifier: anything but a single atom must be grouped.
    Atom,
}

/// Render a tree as a whole pattern.
pub fn render(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, Position::Root, &mut out);
    out
}

/// Render a tree for splicing into a larger pattern: like [`render`], but a
/// top-level alternation keeps its non-capturing group.
pub fn render_embedded(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, Position::Sequence, &mut out);
    out
}

pub(crate) fn rendered_len(node: &Node) -> usize {
    render_embedded(node).len()
}

fn write_node(node: &Node, position: Position, out: &mut String) {
    match node {
        Node::Empty => {
            if position == Position::Atom {
                out.push_str("(?:)");
            }
        }
        Node::Literal(c) => write_literal(*c, out),
        Node::Class(c) => {
            out.push('\\');
            out.push(*c);
        }
        Node::Dot => out.push('.'),
        Node::Anchor(anchor) => out.push_str(anchor_text(*anchor)),
        Node::CharSet(set) => write_class(set, out),
        Node::Backreference(Backreference::Index(index)) => {
            let _ = write!(out, "\\{index}");
        }
        Node::Backreference(Backreference::Name(name)) => {
            let _ = write!(out, "(?P={name})");
        }
        Node::Concat(items) => {
            let grouped = position == Position::Atom;
            if grouped {
                out.push_str("(?:");
            }
            for item in items {
                write_node(item, Position::Sequence, out);
            }
            if grouped {
                out.push(')');
            }
        }
        Node::Alternation(options) => {
            let grouped = position != Position::Root;
            if grouped {
                out.push_str("(?:");
            }
            for (i, option) in options.iter().enumerate() {
                if i > 0 {
                    out.push('|');
                }
                write_node(option, Position::Sequence, out);
            }
            if grouped {
                out.push(')');
            }
        }
        Node::Group { kind, body } => {
            match kind {
                GroupKind::Capturing => out.push('('),
                GroupKind::Named(name) => {
                    let _ = write!(out, "(?P<{name}>");
                }
                GroupKind::NonCapturing => out.push_str("(?:"),
                GroupKind::Mode(flags) => {
                    let _ = write!(out, "(?{flags}:");
                }
            }
            write_node(body, Position::Root, out);
            out.push(')');
        }
        Node::Look { kind, body } => {
            out.push_str(match kind {
                LookKind::Ahead => "(?=",
                LookKind::NegativeAhead => "(?!",
                LookKind::Behind => "(?<=",
                LookKind::NegativeBehind => "(?<!",
            });
            write_node(body, Position::Root, out);
            out.push(')');
        }
        Node::Conditional {
            name,
            then,
            otherwise,
        } => {
            let _ = write!(out, "(?({name})");
            write_node(then, Position::Sequence, out);
            out.push('|');
            write_node(otherwise, Position::Sequence, out);
            out.push(')');
        }
        Node::Quantified {
            node,
            min,
            max,
            lazy,
        } => {
            // a nested quantifier is itself no atom: (?:a+)* not a+*
            let grouped = position == Position::Atom;
            if grouped {
                out.push_str("(?:");
            }
            write_node(node, Position::Atom, out);
            write_quantifier(*min, *max, out);
            if *lazy {
                out.push('?');
            }
            if grouped {
                out.push(')');
            }
        }
    }
}

fn write_quantifier(min: u32, max: Option<u32>, out: &mut String) {
    match (min, max) {
        (0, None) => out.push('*'),
        (1, None) => out.push('+'),
        (0, Some(1)) => out.push('?'),
        (n, Some(m)) if n == m => {
            let _ = write!(out, "{{{n}}}");
        }
        (0, Some(m)) => {
            let _ = write!(out, "{{,{m}}}");
        }
        (n, None) => {
            let _ = write!(out, "{{{n},}}");
        }
        (n, Some(m)) => {
            let _ = write!(out, "{{{n},{m}}}");
        }
    }
}

fn anchor_text(anchor: Anchor) -> &'static str {
    match anchor {
        Anchor::LineStart => "^",
        Anchor::LineEnd => "$",
        Anchor::InputStart => "\\A",
        Anchor::InputEnd => "\\Z",
        Anchor::WordBoundary => "\\b",
        Anchor::NotWordBoundary => "\\B",
    }
}

fn write_literal(c: char, out: &mut String) {
    match c {
        '\\' | '.' | '^' | '$' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | '{' => {
            out.push('\\');
            out.push(c);
        }
        _ => write_plain(c, out),
    }
}

fn write_class(set: &CharSet, out: &mut String) {
    out.push('[');
    if set.negated {
        out.push('^');
    }
    let last = set.items.len().saturating_sub(1);
    for (i, item) in set.items.iter().enumerate() {
        write_class_item(item, i == 0, i == last, set.negated, out);
    }
    out.push(']');
}

fn write_class_item(item: &ClassItem, first: bool, last: bool, negated: bool, out: &mut String) {
    match *item {
        // ']' and '-' are literal without escaping in the leading and
        // trailing slots; the normalized item order pins them there
        ClassItem::Char(']') if first => out.push(']'),
        ClassItem::Char('-') if first || last => out.push('-'),
        // a leading '^' would read as negation
        ClassItem::Char('^') if first && !negated => out.push_str("\\^"),
        ClassItem::Char(c) => write_class_char(c, out),
        ClassItem::Range(from, to) => {
            if from == ']' && first {
                out.push(']');
            } else if from == '-' && first {
                out.push('-');
            } else if from == '^' && first && !negated {
                out.push_str("\\^");
            } else {
                write_class_char(from, out);
            }
            out.push('-');
            write_class_char(to, out);
        }
        ClassItem::Class(c) => {
            out.push('\\');
            out.push(c);
        }
    }
}

fn write_class_char(c: char, out: &mut String) {
    match c {
        '\\' | ']' | '-' => {
            out.push('\\');
            out.push(c);
        }
        _ => write_plain(c, out),
    }
}

fn write_plain(c: char, out: &mut String) {
    match c {
        '\n' => out.push_str("\\n"),
        '\t' => out.push_str("\\t"),
        '\r' => out.push_str("\\r"),
        '\x0B' => out.push_str("\\v"),
        '\x0C' => out.push_str("\\f"),
        '\0' => out.push_str("\\0"),
        c if (c as u32) < 0x20 => {
            let _ = write!(out, "\\x{:02x}", c as u32);
        }
        c => out.push(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{optimize_ast, parse_pattern};

    fn round_trip(pattern: &str) -> String {
        render(&parse_pattern(pattern).unwrap())
    }

    fn optimized(pattern: &str) -> String {
        render(&optimize_ast(parse_pattern(pattern).unwrap()))
    }

    #[test]
    fn grouping_appears_only_where_precedence_needs_it() {
        assert_eq!(optimized("(?:a)"), "a");
        assert_eq!(optimized("(?:ab)+"), "(?:ab)+");
        assert_eq!(optimized("(?:a)+"), "a+");
        assert_eq!(optimized("(?:a|b)c"), "(?:a|b)c");
        assert_eq!(optimized("(?:a|b)"), "a|b");
        assert_eq!(optimized("(?:[abc])+"), "[abc]+");
        assert_eq!(optimized("(?:(?=a))"), "(?=a)");
    }

    #[test]
    fn embedded_rendering_wraps_alternations() {
        let tree = optimize_ast(parse_pattern("a|bc").unwrap());
        assert_eq!(render(&tree), "a|bc");
        assert_eq!(render_embedded(&tree), "(?:a|bc)");
        // anything else needs no wrapper
        let tree = optimize_ast(parse_pattern("ab").unwrap());
        assert_eq!(render_embedded(&tree), "ab");
    }

    #[test]
    fn nested_quantifiers_regroup() {
        assert_eq!(round_trip("(?:a+)*"), "(?:a+)*");
        assert_eq!(round_trip("(?:a{2}){3}"), "(?:a{2}){3}");
    }

    #[test]
    fn quantifiers_pick_their_shortest_spelling() {
        assert_eq!(optimized("a{0,}"), "a*");
        assert_eq!(optimized("a{1,}"), "a+");
        assert_eq!(optimized("a{0,1}"), "a?");
        assert_eq!(optimized("a{2,2}"), "a{2}");
        assert_eq!(optimized("a{2,}?"), "a{2,}?");
        assert_eq!(optimized("a{,5}"), "a{,5}");
    }

    #[test]
    fn metacharacters_escape_outside_classes() {
        assert_eq!(round_trip(r"\.\*\("), r"\.\*\(");
        assert_eq!(round_trip(r"a\|b"), r"a\|b");
        // ']' and '}' carry no meaning outside a class
        assert_eq!(optimized(r"[\]]"), "]");
        assert_eq!(round_trip("}"), "}");
    }

    #[test]
    fn class_spellings_stay_minimal() {
        assert_eq!(optimized("[]a]"), "[]a]");
        assert_eq!(optimized("[a-]"), "[a-]");
        assert_eq!(optimized("[]-a]"), "[]-a]");
        assert_eq!(optimized(r"[a\]]"), "[]a]");
        assert_eq!(optimized("[^a]"), "[^a]");
        assert_eq!(optimized(r"[\^a]"), r"[\^a]");
        assert_eq!(optimized("[a^]"), "[a^]");
    }

    #[test]
    fn control_characters_render_as_escapes() {
        assert_eq!(round_trip(r"\n\t"), r"\n\t");
        assert_eq!(round_trip(r"\x01"), r"\x01");
        assert_eq!(optimized(r"\x41"), "A");
    }
}
