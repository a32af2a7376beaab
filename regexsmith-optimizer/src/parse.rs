//! Single-lookahead recursive-descent parser from pattern strings to the
//! concrete syntax tree.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::ast::{Anchor, Backreference, ClassItem, GroupKind, LookKind};
use crate::{Error, ParseError};

/*
 * Reference grammar:
 *
 * pattern     ::= alternation
 * alternation ::= sequence ('|' sequence)*
 * sequence    ::= quantified*
 * quantified  ::= atom ('*' | '+' | '?' | repeat)? '?'?
 * repeat      ::= '{' NUM '}' | '{' NUM ',' '}' | '{,' NUM '}'
 *               | '{' NUM ',' NUM '}'
 * atom        ::= CHAR | '.' | '^' | '$' | escape | class | group
 * class       ::= '[' '^'? class-item+ ']'
 * class-item  ::= class-atom ('-' class-atom)?
 * group       ::= '(' alternation ')'
 *               | '(?:' alternation ')'
 *               | '(?P<' NAME '>' alternation ')'
 *               | '(?P=' NAME ')'
 *               | '(?=' | '(?!' | '(?<=' | '(?<!' alternation ')'
 *               | '(?' FLAGS ':' alternation ')'
 *               | '(?(' NAME ')' sequence '|' sequence ')'
 */

/// Concrete syntax tree, mirroring the grammar productions one to one.
/// Transient: consumed whole by the lowering in [`crate::ast`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Cst {
    Empty,
    Alternation(Vec<Cst>),
    Sequence(Vec<Cst>),
    Quantified {
        item: Box<Cst>,
        kind: QuantKind,
        lazy: bool,
    },
    Group {
        kind: GroupKind,
        body: Box<Cst>,
    },
    Look {
        kind: LookKind,
        body: Box<Cst>,
    },
    Conditional {
        name: String,
        then: Box<Cst>,
        otherwise: Box<Cst>,
    },
    CharClass {
        negated: bool,
        items: Vec<ClassItem>,
    },
    Literal(char),
    Class(char),
    Dot,
    Anchor(Anchor),
    Backreference(Backreference),
}

/// The quantifier exactly as written; lowering folds these into bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QuantKind {
    Star,
    Plus,
    Question,
    Exactly(u32),
    AtLeast(u32),
    AtMost(u32),
    Between(u32, u32),
}

pub(crate) fn parse(pattern: &str) -> Result<Cst, Error> {
    let mut parser = Parser {
        chars: pattern.char_indices().peekable(),
        len: pattern.len(),
    };
    let cst = parser.alternation()?;
    match parser.peek() {
        None => Ok(cst),
        Some(_) => parser.fail("end of pattern"),
    }
}

struct Parser<'a> {
    chars: Peekable<CharIndices<'a>>,
    len: usize,
}

impl Parser<'_> {
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn second(&mut self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next().map(|(_, c)| c)
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.len, |&(i, _)| i)
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| c)
    }

    fn eat(&mut self, expected: char) -> bool {
        self.chars.next_if(|&(_, c)| c == expected).is_some()
    }

    fn fail<T>(&mut self, expected: &'static str) -> Result<T, Error> {
        let offset = self.offset();
        let found = self.peek();
        Err(ParseError {
            offset,
            expected,
            found,
        }
        .into())
    }

    fn unsupported<T>(&mut self, construct: &'static str) -> Result<T, Error> {
        let offset = self.offset();
        Err(Error::Unsupported { offset, construct })
    }

    fn expect(&mut self, c: char, expected: &'static str) -> Result<(), Error> {
        if self.eat(c) {
            Ok(())
        } else {
            self.fail(expected)
        }
    }

    fn alternation(&mut self) -> Result<Cst, Error> {
        let first = self.sequence()?;
        if self.peek() != Some('|') {
            return Ok(first);
        }
        let mut options = vec![first];
        while self.eat('|') {
            options.push(self.sequence()?);
        }
        Ok(Cst::Alternation(options))
    }

    fn sequence(&mut self) -> Result<Cst, Error> {
        let mut items = Vec::new();
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            items.push(self.quantified()?);
        }
        if items.len() == 1 {
            Ok(items.remove(0))
        } else if items.is_empty() {
            Ok(Cst::Empty)
        } else {
            Ok(Cst::Sequence(items))
        }
    }

    fn quantified(&mut self) -> Result<Cst, Error> {
        let item = self.atom()?;
        let kind = match self.peek() {
            Some('*') => {
                self.bump();
                QuantKind::Star
            }
            Some('+') => {
                self.bump();
                QuantKind::Plus
            }
            Some('?') => {
                self.bump();
                QuantKind::Question
            }
            Some('{') => self.repeat()?,
            _ => return Ok(item),
        };
        let lazy = self.eat('?');
        Ok(Cst::Quantified {
            item: Box::new(item),
            kind,
            lazy,
        })
    }

    fn repeat(&mut self) -> Result<QuantKind, Error> {
        self.bump(); // '{'
        if self.eat(',') {
            let max = self.number()?;
            self.expect('}', "'}'")?;
            return Ok(QuantKind::AtMost(max));
        }
        let min = self.number()?;
        if self.eat('}') {
            return Ok(QuantKind::Exactly(min));
        }
        self.expect(',', "',' or '}'")?;
        if self.eat('}') {
            return Ok(QuantKind::AtLeast(min));
        }
        let max = self.number()?;
        if max < min {
            return self.fail("a maximum no smaller than the minimum");
        }
        self.expect('}', "'}'")?;
        Ok(QuantKind::Between(min, max))
    }

    fn number(&mut self) -> Result<u32, Error> {
        let mut value: u32 = 0;
        let mut any = false;
        while let Some(digit) = self.peek().and_then(|c| c.to_digit(10)) {
            self.bump();
            value = value.saturating_mul(10).saturating_add(digit);
            any = true;
        }
        if any {
            Ok(value)
        } else {
            self.fail("a number")
        }
    }

    fn atom(&mut self) -> Result<Cst, Error> {
        match self.peek() {
            Some('(') => self.group(),
            Some('[') => self.class(),
            Some('\\') => self.escape(),
            Some('.') => {
                self.bump();
                Ok(Cst::Dot)
            }
            Some('^') => {
                self.bump();
                Ok(Cst::Anchor(Anchor::LineStart))
            }
            Some('$') => {
                self.bump();
                Ok(Cst::Anchor(Anchor::LineEnd))
            }
            Some('*' | '+' | '?' | '{') => self.fail("an atom, not a quantifier"),
            Some(c) => {
                self.bump();
                Ok(Cst::Literal(c))
            }
            None => self.fail("an atom"),
        }
    }

    fn group(&mut self) -> Result<Cst, Error> {
        self.bump(); // '('
        if !self.eat('?') {
            return self.group_body(GroupKind::Capturing);
        }
        match self.peek() {
            Some(':') => {
                self.bump();
                self.group_body(GroupKind::NonCapturing)
            }
            Some('P') => {
                self.bump();
                self.named()
            }
            Some('=') => {
                self.bump();
                self.look_body(LookKind::Ahead)
            }
            Some('!') => {
                self.bump();
                self.look_body(LookKind::NegativeAhead)
            }
            Some('<') => {
                self.bump();
                match self.peek() {
                    Some('=') => {
                        self.bump();
                        self.look_body(LookKind::Behind)
                    }
                    Some('!') => {
                        self.bump();
                        self.look_body(LookKind::NegativeBehind)
                    }
                    _ => self.fail("'=' or '!'"),
                }
            }
            Some('(') => self.conditional(),
            Some('>') => self.unsupported("atomic group"),
            Some('#') => self.unsupported("inline comment"),
            Some(c) if is_mode_flag(c) => self.mode_group(),
            _ => self.fail("a group kind"),
        }
    }

    fn group_body(&mut self, kind: GroupKind) -> Result<Cst, Error> {
        let body = self.alternation()?;
        self.expect(')', "')'")?;
        Ok(Cst::Group {
            kind,
            body: Box::new(body),
        })
    }

    fn look_body(&mut self, kind: LookKind) -> Result<Cst, Error> {
        let body = self.alternation()?;
        self.expect(')', "')'")?;
        Ok(Cst::Look {
            kind,
            body: Box::new(body),
        })
    }

    fn named(&mut self) -> Result<Cst, Error> {
        if self.eat('<') {
            let name = self.name()?;
            self.expect('>', "'>'")?;
            return self.group_body(GroupKind::Named(name));
        }
        if self.eat('=') {
            let name = self.name()?;
            self.expect(')', "')'")?;
            return Ok(Cst::Backreference(Backreference::Name(name)));
        }
        self.fail("'<' or '='")
    }

    fn mode_group(&mut self) -> Result<Cst, Error> {
        let mut flags = String::new();
        while let Some(c) = self.peek() {
            if is_mode_flag(c) {
                self.bump();
                flags.push(c);
            } else {
                break;
            }
        }
        if self.peek() == Some(')') {
            return self.unsupported("inline flags");
        }
        self.expect(':', "':' after mode flags")?;
        self.group_body(GroupKind::Mode(flags))
    }

    fn conditional(&mut self) -> Result<Cst, Error> {
        self.bump(); // inner '('
        let name = self.name()?;
        self.expect(')', "')'")?;
        let then = self.sequence()?;
        self.expect('|', "'|'")?;
        let otherwise = self.sequence()?;
        self.expect(')', "')'")?;
        Ok(Cst::Conditional {
            name,
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn name(&mut self) -> Result<String, Error> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.bump();
                name.push(c);
            } else {
                break;
            }
        }
        if name.is_empty() {
            return self.fail("a group name");
        }
        Ok(name)
    }

    fn escape(&mut self) -> Result<Cst, Error> {
        self.bump(); // '\\'
        let Some(c) = self.peek() else {
            return self.fail("an escape character");
        };
        match c {
            'd' | 'D' | 'w' | 'W' | 's' | 'S' => {
                self.bump();
                Ok(Cst::Class(c))
            }
            'A' => {
                self.bump();
                Ok(Cst::Anchor(Anchor::InputStart))
            }
            'Z' => {
                self.bump();
                Ok(Cst::Anchor(Anchor::InputEnd))
            }
            'b' => {
                self.bump();
                Ok(Cst::Anchor(Anchor::WordBoundary))
            }
            'B' => {
                self.bump();
                Ok(Cst::Anchor(Anchor::NotWordBoundary))
            }
            '1'..='9' => {
                let index = self.number()?;
                Ok(Cst::Backreference(Backreference::Index(index)))
            }
            'x' => {
                self.bump();
                Ok(Cst::Literal(self.hex_char(2)?))
            }
            'u' => {
                self.bump();
                Ok(Cst::Literal(self.hex_char(4)?))
            }
            'n' | 't' | 'r' | 'f' | 'v' | '0' => {
                self.bump();
                Ok(Cst::Literal(control_char(c)))
            }
            c if c.is_alphanumeric() => self.fail("a known escape"),
            c => {
                self.bump();
                Ok(Cst::Literal(c))
            }
        }
    }

    fn hex_char(&mut self, digits: u32) -> Result<char, Error> {
        let mut value: u32 = 0;
        for _ in 0..digits {
            let Some(digit) = self.peek().and_then(|c| c.to_digit(16)) else {
                return self.fail("a hex digit");
            };
            self.bump();
            value = value * 16 + digit;
        }
        match char::from_u32(value) {
            Some(c) => Ok(c),
            None => self.fail("a valid character code"),
        }
    }

    fn class(&mut self) -> Result<Cst, Error> {
        self.bump(); // '['
        let negated = self.eat('^');
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => return self.fail("']'"),
                // ']' closes the class everywhere but in the leading slot,
                // where it is a literal
                Some(']') if !items.is_empty() => {
                    self.bump();
                    break;
                }
                _ => items.push(self.class_item()?),
            }
        }
        Ok(Cst::CharClass { negated, items })
    }

    fn class_item(&mut self) -> Result<ClassItem, Error> {
        let from = self.class_atom()?;
        // a '-' forms a range unless it trails the class or follows a
        // shorthand like \d
        if matches!(from, ClassItem::Char(_))
            && self.peek() == Some('-')
            && self.second().is_some()
            && self.second() != Some(']')
        {
            self.bump(); // '-'
            let to = self.class_atom()?;
            return match (from, to) {
                (ClassItem::Char(from), ClassItem::Char(to)) => {
                    if from > to {
                        self.fail("an ordered character range")
                    } else {
                        Ok(ClassItem::Range(from, to))
                    }
                }
                _ => self.fail("a plain character as a range endpoint"),
            };
        }
        Ok(from)
    }

    fn class_atom(&mut self) -> Result<ClassItem, Error> {
        match self.peek() {
            None => self.fail("a class item"),
            Some('\\') => self.class_escape(),
            Some(c) => {
                self.bump();
                Ok(ClassItem::Char(c))
            }
        }
    }

    fn class_escape(&mut self) -> Result<ClassItem, Error> {
        self.bump(); // '\\'
        let Some(c) = self.peek() else {
            return self.fail("an escape character");
        };
        match c {
            'd' | 'D' | 'w' | 'W' | 's' | 'S' => {
                self.bump();
                Ok(ClassItem::Class(c))
            }
            // inside a class, \b is the backspace character
            'b' => {
                self.bump();
                Ok(ClassItem::Char('\x08'))
            }
            'x' => {
                self.bump();
                Ok(ClassItem::Char(self.hex_char(2)?))
            }
            'u' => {
                self.bump();
                Ok(ClassItem::Char(self.hex_char(4)?))
            }
            'n' | 't' | 'r' | 'f' | 'v' | '0' => {
                self.bump();
                Ok(ClassItem::Char(control_char(c)))
            }
            c if c.is_alphanumeric() => self.fail("a known class escape"),
            c => {
                self.bump();
                Ok(ClassItem::Char(c))
            }
        }
    }
}

fn is_mode_flag(c: char) -> bool {
    matches!(c, 'a' | 'i' | 'L' | 'm' | 's' | 'u' | 'x')
}

fn control_char(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        'f' => '\x0C',
        'v' => '\x0B',
        _ => '\0',
    }
}
