//! Assemble regular expressions from composable functions instead of
//! hand-written syntax, and get back patterns at least as small as a
//! hand-optimized equivalent.
//!
//! [`Builder::either`] shows the optimization at work:
//!
//! ```
//! use regexsmith::Builder;
//!
//! let b = Builder::new();
//!
//! // alternatives that stay alternatives keep a non-capturing group
//! assert_eq!(b.either(&["abc", "123", "def"]).unwrap(), "(?:abc|123|def)");
//!
//! // adjacent character sets fuse, and a lone set needs no group at all
//! assert_eq!(b.either(&["[a-z]", "[0-9]", "def"]).unwrap(), "(?:[a-z0-9]|def)");
//! assert_eq!(b.either(&["[a-z]", "[0-9]"]).unwrap(), "[a-z0-9]");
//! assert_eq!(b.either(&["a", "b", "c"]).unwrap(), "[abc]");
//! ```
//!
//! Every builder call runs its result through the optimizing pipeline of the
//! `regexsmith-optimizer` crate, re-exported here in full; [`optimize`] and
//! [`parse_pattern`] work on any pattern in the supported grammar, not just
//! builder output.

mod builder;

pub use builder::{
    anything, digit, letter, literally, whitespace, word_char, Builder, Config, Flags,
};
pub use regexsmith_optimizer::*;
