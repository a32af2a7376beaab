//! The composable builder surface. Each function assembles a raw pattern
//! string, defensively grouped, and hands it to the optimizing pipeline,
//! which takes the redundant grouping back out.

use regexsmith_optimizer::{optimize, optimize_embedded, Error};

/// Pipeline configuration for a [`Builder`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Optimize the result of every builder call (the default). When
    /// disabled, builder calls concatenate raw pattern text and
    /// optimization happens only through an explicit [`Builder::optimize`].
    pub intermediate_optimization: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            intermediate_optimization: true,
        }
    }
}

/// Inline flags accepted by [`Builder::mode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Flags {
    pub unicode: bool,
    pub ascii: bool,
    pub ignore_case: bool,
    pub verbose: bool,
    pub multiline: bool,
    pub locale_dependent: bool,
    pub dot_all: bool,
}

impl Flags {
    fn letters(&self) -> String {
        let mut letters = String::new();
        if self.unicode {
            letters.push('u');
        }
        if self.ascii {
            letters.push('a');
        }
        if self.ignore_case {
            letters.push('i');
        }
        if self.verbose {
            letters.push('x');
        }
        if self.multiline {
            letters.push('m');
        }
        if self.locale_dependent {
            letters.push('L');
        }
        if self.dot_all {
            letters.push('s');
        }
        letters
    }
}

/// Assembles patterns from parts, optimizing as it goes.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    pub fn new() -> Self {
        Builder::default()
    }

    pub fn with_config(config: Config) -> Self {
        Builder { config }
    }

    fn finish(&self, pattern: String) -> Result<String, Error> {
        if self.config.intermediate_optimization {
            optimize_embedded(&pattern)
        } else {
            Ok(pattern)
        }
    }

    /// Fully optimize an assembled pattern, regardless of configuration.
    /// This is the final step when intermediate optimization is disabled.
    pub fn optimize(&self, pattern: &str) -> Result<String, Error> {
        optimize(pattern)
    }

    pub fn must_begin(&self) -> &'static str {
        "^"
    }

    pub fn must_end(&self) -> &'static str {
        "$"
    }

    /// Anchor a pattern at both ends.
    pub fn force_full(&self, pattern: &str) -> Result<String, Error> {
        if pattern.is_empty() {
            return Ok("^$".to_owned());
        }
        self.finish(format!("^{pattern}$"))
    }

    /// Wrap a pattern in a non-capturing group. The group survives
    /// optimization; only its body is rewritten.
    pub fn non_capture(&self, pattern: &str) -> Result<String, Error> {
        if pattern.is_empty() {
            return Ok("(?:)".to_owned());
        }
        let inner = if self.config.intermediate_optimization {
            optimize(pattern)?
        } else {
            pattern.to_owned()
        };
        Ok(format!("(?:{inner})"))
    }

    pub fn optionally(&self, pattern: &str, check_for_empty_first: bool) -> Result<String, Error> {
        if pattern.is_empty() {
            return Ok(String::new());
        }
        let lazy = if check_for_empty_first { "?" } else { "" };
        self.finish(format!("(?:{pattern})?{lazy}"))
    }

    pub fn one_or_more(&self, pattern: &str, greedy: bool) -> Result<String, Error> {
        if pattern.is_empty() {
            return Ok(String::new());
        }
        let lazy = if greedy { "" } else { "?" };
        self.finish(format!("(?:{pattern})+{lazy}"))
    }

    pub fn zero_or_more(&self, pattern: &str, greedy: bool) -> Result<String, Error> {
        if pattern.is_empty() {
            return Ok(String::new());
        }
        let lazy = if greedy { "" } else { "?" };
        self.finish(format!("(?:{pattern})*{lazy}"))
    }

    pub fn at_least(&self, n: u32, pattern: &str, greedy: bool) -> Result<String, Error> {
        if pattern.is_empty() {
            return Ok(String::new());
        }
        match n {
            0 => self.zero_or_more(pattern, greedy),
            1 => self.one_or_more(pattern, greedy),
            n => {
                let lazy = if greedy { "" } else { "?" };
                self.finish(format!("(?:{pattern}){{{n},}}{lazy}"))
            }
        }
    }

    pub fn exactly(&self, n: u32, pattern: &str) -> Result<String, Error> {
        if pattern.is_empty() || n == 0 {
            return Ok(String::new());
        }
        if n == 1 {
            return Ok(pattern.to_owned());
        }
        self.finish(format!("(?:{pattern}){{{n}}}"))
    }

    pub fn between(&self, n: u32, m: u32, pattern: &str, greedy: bool) -> Result<String, Error> {
        if pattern.is_empty() {
            return Ok(String::new());
        }
        if n == m {
            return self.exactly(n, pattern);
        }
        if m == 0 || m < n {
            return Ok(String::new());
        }
        if m == 1 {
            // n can only be 0 here
            return self.optionally(pattern, !greedy);
        }
        let lazy = if greedy { "" } else { "?" };
        self.finish(format!("(?:{pattern}){{{n},{m}}}{lazy}"))
    }

    pub fn at_most(&self, m: u32, pattern: &str, greedy: bool) -> Result<String, Error> {
        self.between(0, m, pattern, greedy)
    }

    /// Match any one of the given alternatives. Adjacent single-character
    /// alternatives fuse into one character set, and the surrounding group
    /// disappears when only that set remains.
    pub fn either(&self, options: &[&str]) -> Result<String, Error> {
        let options: Vec<&str> = options.iter().copied().filter(|o| !o.is_empty()).collect();
        if options.is_empty() {
            return Ok(String::new());
        }
        let body = options
            .iter()
            .map(|option| format!("(?:{option})"))
            .collect::<Vec<_>>()
            .join("|");
        self.finish(format!("(?:{body})"))
    }

    /// Match any one of the given characters.
    pub fn one_of(&self, characters: &str) -> Result<String, Error> {
        if characters.is_empty() {
            return Ok(String::new());
        }
        self.finish(format!("[{characters}]"))
    }

    pub fn lookahead(&self, pattern: &str) -> Result<String, Error> {
        if pattern.is_empty() {
            return Ok(String::new());
        }
        self.finish(format!("(?={pattern})"))
    }

    pub fn negative_lookahead(&self, pattern: &str) -> Result<String, Error> {
        if pattern.is_empty() {
            return Ok(String::new());
        }
        self.finish(format!("(?!{pattern})"))
    }

    pub fn lookbehind(&self, pattern: &str) -> Result<String, Error> {
        if pattern.is_empty() {
            return Ok(String::new());
        }
        self.finish(format!("(?<={pattern})"))
    }

    pub fn negative_lookbehind(&self, pattern: &str) -> Result<String, Error> {
        if pattern.is_empty() {
            return Ok(String::new());
        }
        self.finish(format!("(?<!{pattern})"))
    }

    /// Same as [`Builder::lookahead`].
    pub fn if_followed_by(&self, pattern: &str) -> Result<String, Error> {
        self.lookahead(pattern)
    }

    /// Same as [`Builder::negative_lookahead`].
    pub fn if_not_followed_by(&self, pattern: &str) -> Result<String, Error> {
        self.negative_lookahead(pattern)
    }

    /// Same as [`Builder::lookbehind`].
    pub fn if_preceded_by(&self, pattern: &str) -> Result<String, Error> {
        self.lookbehind(pattern)
    }

    /// Same as [`Builder::negative_lookbehind`].
    pub fn if_not_preceded_by(&self, pattern: &str) -> Result<String, Error> {
        self.negative_lookbehind(pattern)
    }

    /// Wrap a pattern in a numbered capturing group. A redundant
    /// non-capturing wrapper on the input is absorbed.
    pub fn capture(&self, pattern: &str) -> Result<String, Error> {
        self.finish(format!("({pattern})"))
    }

    /// Wrap a pattern in a named capturing group.
    pub fn capture_as(&self, name: &str, pattern: &str) -> Result<String, Error> {
        self.finish(format!("(?P<{name}>{pattern})"))
    }

    /// Match whatever the numbered group matched.
    pub fn match_previous(&self, index: u32) -> Result<String, Error> {
        self.finish(format!("\\{index}"))
    }

    /// Match whatever the named group matched.
    pub fn match_previous_named(&self, name: &str) -> Result<String, Error> {
        self.finish(format!("(?P={name})"))
    }

    /// Apply inline flags to a pattern. Without any flag set the pattern is
    /// returned unchanged.
    pub fn mode(&self, pattern: &str, flags: Flags) -> Result<String, Error> {
        let letters = flags.letters();
        if letters.is_empty() {
            return self.finish(pattern.to_owned());
        }
        self.finish(format!("(?{letters}:{pattern})"))
    }

    /// Match any full input except those matching the given pattern.
    pub fn match_everything_but(&self, pattern: &str) -> Result<String, Error> {
        let guard = self.negative_lookahead(pattern)?;
        self.force_full(&format!("{guard}.*"))
    }

    /// Branch on whether a named group participated in the match.
    pub fn if_group_exists(
        &self,
        name: &str,
        then: &str,
        otherwise: &str,
    ) -> Result<String, Error> {
        self.finish(format!("(?({name})(?:{then})|(?:{otherwise}))"))
    }
}

/// Escape a text so it matches itself literally.
pub fn literally(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii() {
            escaped.push(c);
        } else {
            escaped.push('\\');
            escaped.push(c);
        }
    }
    escaped
}

pub fn digit() -> &'static str {
    r"\d"
}

pub fn letter() -> &'static str {
    "[a-zA-Z]"
}

pub fn whitespace() -> &'static str {
    r"\s"
}

pub fn word_char() -> &'static str {
    r"\w"
}

pub fn anything() -> &'static str {
    "."
}
