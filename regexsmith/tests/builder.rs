//! The builder surface, including the documented outputs of every helper.

use regexsmith::{anything, digit, letter, literally, whitespace, word_char};
use regexsmith::{Builder, Config, Flags};

#[ctor::ctor]
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn either_merges_and_unwraps() {
    let b = Builder::new();
    assert_eq!(b.either(&["abc", "123", "def"]).unwrap(), "(?:abc|123|def)");
    assert_eq!(
        b.either(&["[a-z]", "[0-9]", "def"]).unwrap(),
        "(?:[a-z0-9]|def)"
    );
    assert_eq!(b.either(&["[a-z]", "[0-9]"]).unwrap(), "[a-z0-9]");
    assert_eq!(b.either(&["a", "b", "c"]).unwrap(), "[abc]");
    // empty alternatives are skipped, a lone one needs no alternation
    assert_eq!(b.either(&["", "abc", ""]).unwrap(), "abc");
    assert_eq!(b.either(&[]).unwrap(), "");
}

#[test]
fn nested_either_flattens() {
    let b = Builder::new();
    let inner = b.either(&["b", "cd"]).unwrap();
    assert_eq!(b.either(&["a", inner.as_str()]).unwrap(), "(?:a|b|cd)");
}

#[test]
fn quantifiers_group_only_when_needed() {
    let b = Builder::new();
    assert_eq!(b.one_or_more("abc", true).unwrap(), "(?:abc)+");
    assert_eq!(b.one_or_more("a", true).unwrap(), "a+");
    assert_eq!(b.one_or_more("[abc]", false).unwrap(), "[abc]+?");
    assert_eq!(b.zero_or_more("ab", true).unwrap(), "(?:ab)*");
    assert_eq!(b.optionally("(abc)", false).unwrap(), "(abc)?");
    assert_eq!(b.optionally("a", true).unwrap(), "a??");
    assert_eq!(b.exactly(3, "ab").unwrap(), "(?:ab){3}");
    assert_eq!(b.exactly(1, "ab").unwrap(), "ab");
    assert_eq!(b.exactly(0, "ab").unwrap(), "");
    assert_eq!(b.at_least(2, "a", true).unwrap(), "a{2,}");
    assert_eq!(b.at_least(1, "a", true).unwrap(), "a+");
    assert_eq!(b.at_least(0, "a", true).unwrap(), "a*");
    assert_eq!(b.between(2, 4, "a", true).unwrap(), "a{2,4}");
    assert_eq!(b.between(3, 3, "ab", true).unwrap(), "(?:ab){3}");
    assert_eq!(b.at_most(5, "a", true).unwrap(), "a{,5}");
}

#[test]
fn empty_patterns_vanish() {
    let b = Builder::new();
    assert_eq!(b.one_or_more("", true).unwrap(), "");
    assert_eq!(b.optionally("", false).unwrap(), "");
    assert_eq!(b.lookahead("").unwrap(), "");
    assert_eq!(b.non_capture("").unwrap(), "(?:)");
}

#[test]
fn capture_absorbs_redundant_grouping() {
    let b = Builder::new();
    assert_eq!(b.capture("abc").unwrap(), "(abc)");
    assert_eq!(b.capture("(?:abc)").unwrap(), "(abc)");
    assert_eq!(b.capture_as("digits", r"\d+").unwrap(), r"(?P<digits>\d+)");
    assert_eq!(b.match_previous(1).unwrap(), "\\1");
    assert_eq!(b.match_previous_named("digits").unwrap(), "(?P=digits)");
}

#[test]
fn anchors_and_lookarounds() {
    let b = Builder::new();
    assert_eq!(b.must_begin(), "^");
    assert_eq!(b.must_end(), "$");
    assert_eq!(b.force_full("abc").unwrap(), "^abc$");
    assert_eq!(b.force_full("").unwrap(), "^$");
    assert_eq!(b.lookahead("ab").unwrap(), "(?=ab)");
    assert_eq!(b.negative_lookahead("ab").unwrap(), "(?!ab)");
    assert_eq!(b.lookbehind("ab").unwrap(), "(?<=ab)");
    assert_eq!(b.negative_lookbehind("ab").unwrap(), "(?<!ab)");
    assert_eq!(b.if_followed_by("x").unwrap(), "(?=x)");
    assert_eq!(b.match_everything_but("xyz").unwrap(), "^(?!xyz).*$");
}

#[test]
fn one_of_and_mode() {
    let b = Builder::new();
    assert_eq!(b.one_of("abc").unwrap(), "[abc]");
    assert_eq!(b.one_of("a").unwrap(), "a");
    assert_eq!(b.one_of("").unwrap(), "");
    assert_eq!(
        b.mode(
            "abc",
            Flags {
                ignore_case: true,
                ..Flags::default()
            }
        )
        .unwrap(),
        "(?i:abc)"
    );
    assert_eq!(
        b.mode(
            "abc",
            Flags {
                ignore_case: true,
                multiline: true,
                ..Flags::default()
            }
        )
        .unwrap(),
        "(?im:abc)"
    );
    assert_eq!(b.mode("abc", Flags::default()).unwrap(), "abc");
}

#[test]
fn conditional_groups() {
    let b = Builder::new();
    assert_eq!(
        b.if_group_exists("quoted", "a", "b").unwrap(),
        "(?(quoted)a|b)"
    );
    assert_eq!(
        b.if_group_exists("quoted", "x|y", "z").unwrap(),
        "(?(quoted)(?:x|y)|z)"
    );
}

#[test]
fn literal_escaping() {
    assert_eq!(literally("a.b"), r"a\.b");
    assert_eq!(literally("1 + 1"), r"1\ \+\ 1");
    assert_eq!(literally("price[usd]"), r"price\[usd\]");
    assert_eq!(literally("word_1"), "word_1");
}

#[test]
fn character_constants() {
    assert_eq!(digit(), r"\d");
    assert_eq!(letter(), "[a-zA-Z]");
    assert_eq!(whitespace(), r"\s");
    assert_eq!(word_char(), r"\w");
    assert_eq!(anything(), ".");
}

#[test]
fn deferred_optimization() {
    let b = Builder::with_config(Config {
        intermediate_optimization: false,
    });
    // raw assembly, nothing rewritten yet
    let raw = b.either(&["a", "b"]).unwrap();
    assert_eq!(raw, "(?:(?:a)|(?:b))");
    // the explicit final pass catches up
    assert_eq!(b.optimize(&raw).unwrap(), "a|b");

    let eager = Builder::new();
    assert_eq!(eager.either(&["a", "b"]).unwrap(), "(?:a|b)");
}

#[test]
fn builder_output_is_a_pipeline_fixpoint() {
    let b = Builder::new();
    let repeated = b.one_or_more("ab", true).unwrap();
    let assembled = b.either(&["[a-z]", "[0-9]", repeated.as_str()]).unwrap();
    assert_eq!(assembled, "(?:[a-z0-9]|(?:ab)+)");
    // intermediate optimization then final optimization changes nothing
    // beyond unwrapping the root
    assert_eq!(b.optimize(&assembled).unwrap(), "[a-z0-9]|(?:ab)+");
}
