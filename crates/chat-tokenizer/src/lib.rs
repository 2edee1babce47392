//! Chat message normalization: strips links, mention markup and punctuation
//! noise, then splits into lowercase [`Token`]s.
//!
//! The cleaning steps run in a fixed order, each consuming the previous
//! step's output:
//!
//! 1. Lowercase the whole string.
//! 2. Remove URL-like runs (`http` followed by non-whitespace).
//! 3. Remove mention markup such as `<@123>` or `<@!123>`.
//! 4. Remove every character that is not an ASCII letter or digit, whitespace,
//!    or a Latin accented letter in `à..=ú`.
//! 5. Collapse whitespace runs to a single space and trim.
//! 6. Split on spaces.
//!
//! This crate depends only on [`token_core`]; it never fails.

use std::sync::LazyLock;

use regex::Regex;
use token_core::Token;

static URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"http\S+").expect("valid URL pattern"));

static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@.?[0-9]+>").expect("valid mention pattern"));

static NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[^a-z0-9\sà-ú]").expect("valid noise pattern"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Normalize raw message text into a sequence of tokens.
///
/// Returns an empty vector for empty, blank or all-noise input.
///
/// # Examples
///
/// ```
/// use chat_tokenizer::normalize;
///
/// let tokens = normalize("Olá <@42>, see https://example.com NOW!!");
/// let words: Vec<&str> = tokens.iter().map(|t| t.as_str()).collect();
/// assert_eq!(words, vec!["olá", "see", "now"]);
/// ```
pub fn normalize(text: &str) -> Vec<Token> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let lowered = text.to_lowercase();
    let without_urls = URL.replace_all(&lowered, "");
    let without_mentions = MENTION.replace_all(&without_urls, "");
    let cleaned = NOISE.replace_all(&without_mentions, "");
    let collapsed = WHITESPACE.replace_all(&cleaned, " ");

    collapsed
        .trim()
        .split(' ')
        .filter_map(Token::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        normalize(text).into_iter().map(String::from).collect()
    }

    #[test]
    fn lowercases_and_splits() {
        assert_eq!(words("The Cat SAT"), vec!["the", "cat", "sat"]);
    }

    #[test]
    fn strips_urls() {
        assert_eq!(
            words("look at http://example.com/a?b=c and https://x.y"),
            vec!["look", "at", "and"]
        );
    }

    #[test]
    fn strips_mentions() {
        assert_eq!(words("<@1234> hello <@!987> there"), vec!["hello", "there"]);
    }

    #[test]
    fn mention_pattern_allows_single_prefix_char() {
        // "<@&55>" is a role mention; the optional char covers it.
        assert_eq!(words("hi <@&55>"), vec!["hi"]);
    }

    #[test]
    fn removes_punctuation_noise() {
        assert_eq!(words("don't, stop... me!!!"), vec!["dont", "stop", "me"]);
    }

    #[test]
    fn keeps_accented_latin_letters() {
        assert_eq!(words("Você está AÍ?"), vec!["você", "está", "aí"]);
    }

    #[test]
    fn drops_characters_outside_accent_range() {
        // 'ÿ' (U+00FF) lies past 'ú' and is removed; digits stay.
        assert_eq!(words("ÿes 42"), vec!["es", "42"]);
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(words("  a \t\n b   c  "), vec!["a", "b", "c"]);
    }

    #[test]
    fn blank_input_is_empty() {
        assert!(normalize("").is_empty());
        assert!(normalize("   \t ").is_empty());
        assert!(normalize("?!... ---").is_empty());
    }

    #[test]
    fn url_removal_happens_after_lowercasing() {
        assert_eq!(words("HTTP://SHOUTING.COM ok"), vec!["ok"]);
    }

    #[test]
    fn noise_inside_word_joins_fragments() {
        assert_eq!(words("e-mail"), vec!["email"]);
    }
}
