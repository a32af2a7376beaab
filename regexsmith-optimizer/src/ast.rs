//! The typed pattern tree, and the lowering from the concrete syntax tree.

use crate::parse::{Cst, QuantKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    LineStart,
    LineEnd,
    InputStart,
    InputEnd,
    WordBoundary,
    NotWordBoundary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backreference {
    Index(u32),
    Name(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookKind {
    Ahead,
    NegativeAhead,
    Behind,
    NegativeBehind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKind {
    Capturing,
    Named(String),
    NonCapturing,
    /// Inline-flag group `(?i:...)`; the flag letters are kept verbatim.
    Mode(String),
}

/// One member of a character class: a single character, an inclusive range,
/// or a `\d`-style shorthand kept opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassItem {
    Char(char),
    Range(char, char),
    Class(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharSet {
    pub negated: bool,
    pub items: Vec<ClassItem>,
}

/// A node of the pattern tree. The tree is exclusively owned top-down and
/// rewritten functionally; the optimizer and the serializer both match on
/// every variant, so a new node kind cannot be forgotten in either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Matches the empty string.
    Empty,
    Literal(char),
    /// A `\d`-style one-character shorthand.
    Class(char),
    Dot,
    Anchor(Anchor),
    CharSet(CharSet),
    Concat(Vec<Node>),
    Alternation(Vec<Node>),
    Group {
        kind: GroupKind,
        body: Box<Node>,
    },
    Look {
        kind: LookKind,
        body: Box<Node>,
    },
    Quantified {
        node: Box<Node>,
        min: u32,
        /// `None` is unbounded.
        max: Option<u32>,
        lazy: bool,
    },
    Backreference(Backreference),
    Conditional {
        name: String,
        then: Box<Node>,
        otherwise: Box<Node>,
    },
}

impl Node {
    /// True if this subtree defines a capturing group. Dropping such a
    /// subtree would renumber every later group and break backreferences,
    /// so the optimizer never erases one.
    pub fn contains_capture(&self) -> bool {
        match self {
            Node::Group {
                kind: GroupKind::Capturing | GroupKind::Named(_),
                ..
            } => true,
            Node::Group { body, .. } | Node::Look { body, .. } => body.contains_capture(),
            Node::Quantified { node, .. } => node.contains_capture(),
            Node::Concat(items) | Node::Alternation(items) => {
                items.iter().any(Node::contains_capture)
            }
            Node::Conditional {
                then, otherwise, ..
            } => then.contains_capture() || otherwise.contains_capture(),
            _ => false,
        }
    }
}

impl CharSet {
    /// The canonical form of this set's items: duplicates removed, touching
    /// and overlapping entries unified, characters covered by a range
    /// dropped, and a character adjacent to a range widening it. First
    /// appearance keeps its slot, so `[a-z]|[0-9]` merges to `[a-z0-9]`.
    ///
    /// Two deliberate asymmetries keep the rendering minimal: a one- or
    /// two-codepoint range decays into plain characters (`[a-b]` renders
    /// longer than `[ab]`), and characters never pair up into new ranges
    /// (`[abc]` stays `[abc]`).
    pub fn normalized(&self) -> Vec<ClassItem> {
        let mut items: Vec<ClassItem> = Vec::with_capacity(self.items.len());
        for item in &self.items {
            match *item {
                ClassItem::Range(from, to) if from == to => items.push(ClassItem::Char(from)),
                ClassItem::Range(from, to) if to as u32 == from as u32 + 1 => {
                    items.push(ClassItem::Char(from));
                    items.push(ClassItem::Char(to));
                }
                item => items.push(item),
            }
        }

        // Unify pairwise until nothing touches; every step removes an item.
        let mut changed = true;
        while changed {
            changed = false;
            let mut i = 0;
            while i < items.len() {
                let mut j = i + 1;
                while j < items.len() {
                    if let Some(unified) = unify(items[i], items[j]) {
                        items[i] = unified;
                        items.remove(j);
                        changed = true;
                    } else {
                        j += 1;
                    }
                }
                i += 1;
            }
        }

        // `]` is only legal unescaped in the leading slot, and a literal `-`
        // only in the trailing one; pin them there so the rendering can use
        // the bare spellings.
        if let Some(i) = items
            .iter()
            .position(|item| matches!(item, ClassItem::Char(']') | ClassItem::Range(']', _)))
        {
            let item = items.remove(i);
            items.insert(0, item);
        }
        if let Some(i) = items
            .iter()
            .position(|item| matches!(item, ClassItem::Char('-')))
        {
            let item = items.remove(i);
            items.push(item);
        }
        items
    }
}

fn unify(a: ClassItem, b: ClassItem) -> Option<ClassItem> {
    use ClassItem::*;
    match (a, b) {
        (Char(x), Char(y)) if x == y => Some(Char(x)),
        (Class(x), Class(y)) if x == y => Some(Class(x)),
        (Range(from, to), Char(c)) | (Char(c), Range(from, to)) => {
            if c >= from && c <= to {
                Some(Range(from, to))
            } else if (c as u32) + 1 == from as u32 {
                Some(Range(c, to))
            } else if c as u32 == (to as u32) + 1 {
                Some(Range(from, c))
            } else {
                None
            }
        }
        (Range(f1, t1), Range(f2, t2)) => {
            if (f2 as u32) <= (t1 as u32) + 1 && (f1 as u32) <= (t2 as u32) + 1 {
                Some(Range(f1.min(f2), t1.max(t2)))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Lower the concrete syntax tree into the typed tree. Purely structural:
/// one production maps onto one variant, and nothing the pattern matches
/// changes here. The only computation is normalizing the seven quantifier
/// spellings into a `(min, max)` pair.
pub(crate) fn lower(cst: Cst) -> Node {
    match cst {
        Cst::Empty => Node::Empty,
        Cst::Literal(c) => Node::Literal(c),
        Cst::Class(c) => Node::Class(c),
        Cst::Dot => Node::Dot,
        Cst::Anchor(anchor) => Node::Anchor(anchor),
        Cst::CharClass { negated, items } => Node::CharSet(CharSet { negated, items }),
        Cst::Backreference(backreference) => Node::Backreference(backreference),
        Cst::Sequence(items) => Node::Concat(items.into_iter().map(lower).collect()),
        Cst::Alternation(options) => Node::Alternation(options.into_iter().map(lower).collect()),
        Cst::Group { kind, body } => Node::Group {
            kind,
            body: Box::new(lower(*body)),
        },
        Cst::Look { kind, body } => Node::Look {
            kind,
            body: Box::new(lower(*body)),
        },
        Cst::Conditional {
            name,
            then,
            otherwise,
        } => Node::Conditional {
            name,
            then: Box::new(lower(*then)),
            otherwise: Box::new(lower(*otherwise)),
        },
        Cst::Quantified { item, kind, lazy } => {
            let (min, max) = match kind {
                QuantKind::Star => (0, None),
                QuantKind::Plus => (1, None),
                QuantKind::Question => (0, Some(1)),
                QuantKind::Exactly(n) => (n, Some(n)),
                QuantKind::AtLeast(n) => (n, None),
                QuantKind::AtMost(m) => (0, Some(m)),
                QuantKind::Between(n, m) => (n, Some(m)),
            };
            Node::Quantified {
                node: Box::new(lower(*item)),
                min,
                max,
                lazy,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_pattern;

    fn set(items: &[ClassItem]) -> CharSet {
        CharSet {
            negated: false,
            items: items.to_vec(),
        }
    }

    #[test]
    fn quantifier_spellings_lower_to_bounds() {
        let bounds = |pattern: &str| match parse_pattern(pattern).unwrap() {
            Node::Quantified { min, max, lazy, .. } => (min, max, lazy),
            other => panic!("expected a quantifier, got {other:?}"),
        };

        assert_eq!(bounds("a*"), (0, None, false));
        assert_eq!(bounds("a+"), (1, None, false));
        assert_eq!(bounds("a?"), (0, Some(1), false));
        assert_eq!(bounds("a{3}"), (3, Some(3), false));
        assert_eq!(bounds("a{2,}"), (2, None, false));
        assert_eq!(bounds("a{,4}"), (0, Some(4), false));
        assert_eq!(bounds("a{2,5}?"), (2, Some(5), true));
    }

    #[test]
    fn overlapping_ranges_unify() {
        use ClassItem::*;
        assert_eq!(
            set(&[Range('a', 'm'), Range('k', 'z')]).normalized(),
            vec![Range('a', 'z')]
        );
        assert_eq!(
            set(&[Range('a', 'c'), Range('d', 'f')]).normalized(),
            vec![Range('a', 'f')]
        );
        assert_eq!(
            set(&[Range('a', 'z'), Range('0', '9')]).normalized(),
            vec![Range('a', 'z'), Range('0', '9')]
        );
    }

    #[test]
    fn covered_and_adjacent_characters_fold_into_ranges() {
        use ClassItem::*;
        assert_eq!(
            set(&[Range('a', 'z'), Char('q')]).normalized(),
            vec![Range('a', 'z')]
        );
        assert_eq!(
            set(&[Range('a', 'c'), Char('d')]).normalized(),
            vec![Range('a', 'd')]
        );
        // the widened range then swallows the next one over
        assert_eq!(
            set(&[Range('a', 'c'), Range('e', 'g'), Char('d')]).normalized(),
            vec![Range('a', 'g')]
        );
    }

    #[test]
    fn characters_never_pair_into_ranges() {
        use ClassItem::*;
        assert_eq!(
            set(&[Char('a'), Char('b'), Char('c')]).normalized(),
            vec![Char('a'), Char('b'), Char('c')]
        );
        assert_eq!(
            set(&[Range('a', 'b')]).normalized(),
            vec![Char('a'), Char('b')]
        );
        assert_eq!(set(&[Range('a', 'a')]).normalized(), vec![Char('a')]);
    }

    #[test]
    fn duplicates_collapse() {
        use ClassItem::*;
        assert_eq!(
            set(&[Char('a'), Char('a'), Class('d'), Class('d')]).normalized(),
            vec![Char('a'), Class('d')]
        );
    }

    #[test]
    fn bracket_leads_and_dash_trails() {
        use ClassItem::*;
        assert_eq!(
            set(&[Char('a'), Char(']')]).normalized(),
            vec![Char(']'), Char('a')]
        );
        assert_eq!(
            set(&[Char('-'), Char('a')]).normalized(),
            vec![Char('a'), Char('-')]
        );
    }

    #[test]
    fn capture_detection_sees_through_wrappers() {
        assert!(parse_pattern("a(?:x(b))c").unwrap().contains_capture());
        assert!(parse_pattern("(?P<n>a)").unwrap().contains_capture());
        assert!(!parse_pattern("a(?:xb)c").unwrap().contains_capture());
        assert!(!parse_pattern("(?=a)").unwrap().contains_capture());
    }
}
