//! Bottom-up rewriting of the pattern tree to a smaller equivalent form.
//!
//! Every rule is a local equivalence: it may shrink the tree but never
//! changes the set of strings the pattern matches. The driver repeats whole
//! passes until one changes nothing.

use crate::ast::{CharSet, ClassItem, GroupKind, Node};
use crate::render;

/// Defensive bound on rewrite passes. A correct rule set reaches its
/// fixpoint long before this; hitting it means a rule oscillates.
const MAX_PASSES: usize = 32;

/// Rewrite `node` until no rule fires, returning the smallest equivalent
/// tree found.
pub fn optimize_ast(node: Node) -> Node {
    let mut current = node;
    for pass in 1..=MAX_PASSES {
        let next = rewrite(current.clone());
        if next == current {
            log::debug!("fixpoint after {pass} pass(es)");
            return next;
        }
        current = next;
    }
    log::warn!("no fixpoint after {MAX_PASSES} passes, keeping the best form found");
    current
}

fn rewrite(node: Node) -> Node {
    match node {
        Node::CharSet(set) => rewrite_charset(set),
        Node::Concat(items) => rewrite_concat(items.into_iter().map(rewrite).collect()),
        Node::Alternation(options) => {
            rewrite_alternation(options.into_iter().map(rewrite).collect())
        }
        Node::Group { kind, body } => rewrite_group(kind, rewrite(*body)),
        Node::Look { kind, body } => Node::Look {
            kind,
            body: Box::new(rewrite(*body)),
        },
        Node::Quantified {
            node,
            min,
            max,
            lazy,
        } => rewrite_quantified(rewrite(*node), min, max, lazy),
        Node::Conditional {
            name,
            then,
            otherwise,
        } => Node::Conditional {
            name,
            then: Box::new(rewrite(*then)),
            otherwise: Box::new(rewrite(*otherwise)),
        },
        leaf => leaf,
    }
}

// [a-mk-z] => [a-z], [a] => a, [\d] => \d
fn rewrite_charset(set: CharSet) -> Node {
    let items = set.normalized();
    if !set.negated {
        if let [ClassItem::Char(c)] = items[..] {
            return Node::Literal(c);
        }
        if let [ClassItem::Class(c)] = items[..] {
            return Node::Class(c);
        }
    }
    Node::CharSet(CharSet {
        negated: set.negated,
        items,
    })
}

// (?:a) => a; the serializer reintroduces grouping where precedence needs it
fn rewrite_group(kind: GroupKind, body: Node) -> Node {
    match kind {
        GroupKind::NonCapturing => body,
        kind => Node::Group {
            kind,
            body: Box::new(body),
        },
    }
}

fn rewrite_quantified(node: Node, min: u32, max: Option<u32>, lazy: bool) -> Node {
    if node == Node::Empty {
        return Node::Empty;
    }
    match (min, max) {
        // x{1} => x
        (1, Some(1)) => node,
        // x{0} matches only the empty string; erasing a capturing group
        // would renumber the ones after it, so those stay
        (0, Some(0)) if !node.contains_capture() => Node::Empty,
        _ => Node::Quantified {
            node: Box::new(node),
            min,
            max,
            lazy,
        },
    }
}

// ab(?:cd)e stays flat: nested sequences are spliced, empties dropped
fn rewrite_concat(items: Vec<Node>) -> Node {
    let mut flat = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Node::Empty => {}
            Node::Concat(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }
    if flat.len() == 1 {
        flat.remove(0)
    } else if flat.is_empty() {
        Node::Empty
    } else {
        Node::Concat(flat)
    }
}

fn rewrite_alternation(options: Vec<Node>) -> Node {
    // a|(?:b|c) => a|b|c
    let mut flat = Vec::with_capacity(options.len());
    for option in options {
        match option {
            Node::Alternation(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }

    // a|b|a => a|b: a repeated alternative can never win a match the first
    // occurrence would not
    let mut options: Vec<Node> = Vec::with_capacity(flat.len());
    for option in flat {
        if option.contains_capture() || !options.contains(&option) {
            options.push(option);
        }
    }

    let mut options = merge_single_char_runs(options);
    if options.len() == 1 {
        options.remove(0)
    } else {
        Node::Alternation(options)
    }
}

/// The items an alternative contributes to a merged character set, if it is
/// a one-character match that may live inside one. Anchors, dot, negated
/// sets, backreferences and anything multi-character stay out.
fn charset_items(option: &Node) -> Option<Vec<ClassItem>> {
    match option {
        Node::Literal(c) => Some(vec![ClassItem::Char(*c)]),
        Node::Class(c) => Some(vec![ClassItem::Class(*c)]),
        Node::CharSet(set) if !set.negated => Some(set.items.clone()),
        _ => None,
    }
}

/// Merge consecutive runs of single-character alternatives into one set:
/// a|b|c => [abc], [a-z]|[0-9] => [a-z0-9]. Only adjacent alternatives are
/// merged — leftmost-first matching makes reordering around a multi-character
/// alternative observable — and only when the merged set renders no larger
/// than the run it replaces (so a|b survives as-is).
fn merge_single_char_runs(options: Vec<Node>) -> Vec<Node> {
    let mut merged = Vec::with_capacity(options.len());
    let mut run: Vec<(Node, Vec<ClassItem>)> = Vec::new();
    for option in options {
        match charset_items(&option) {
            Some(items) => run.push((option, items)),
            None => {
                flush_run(&mut run, &mut merged);
                merged.push(option);
            }
        }
    }
    flush_run(&mut run, &mut merged);
    merged
}

fn flush_run(run: &mut Vec<(Node, Vec<ClassItem>)>, merged: &mut Vec<Node>) {
    if run.len() < 2 {
        merged.extend(run.drain(..).map(|(option, _)| option));
        return;
    }
    let separate: usize = run
        .iter()
        .map(|(option, _)| render::rendered_len(option))
        .sum::<usize>()
        + run.len()
        - 1;
    let set = CharSet {
        negated: false,
        items: run.iter().flat_map(|(_, items)| items.clone()).collect(),
    };
    let combined = rewrite_charset(set);
    if render::rendered_len(&combined) <= separate {
        log::debug!("merged {} alternatives into {combined:?}", run.len());
        run.clear();
        merged.push(combined);
    } else {
        merged.extend(run.drain(..).map(|(option, _)| option));
    }
}
