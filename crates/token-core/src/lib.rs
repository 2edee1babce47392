//! Value types shared by the tokenizer, keyword extractor and Markov chain.
//!
//! A [`Token`] is a single normalized word. A [`ContextKey`] is an ordered pair
//! of consecutive tokens and indexes transitions in the chain table.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A normalized word: lowercase, non-empty, no whitespace.
///
/// Construction goes through [`Token::new`], which rejects empty and
/// whitespace-bearing input, so every `Token` in the system upholds the
/// invariant. Normalization itself (lowercasing, stripping noise) is the
/// tokenizer's job, not this type's.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Token(String);

impl Token {
    /// Wrap a word as a token. Returns `None` if it is empty or contains whitespace.
    pub fn new(word: impl Into<String>) -> Option<Self> {
        let word = word.into();
        if word.is_empty() || word.chars().any(char::is_whitespace) {
            return None;
        }
        Some(Token(word))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Token {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<Token> for String {
    fn from(token: Token) -> String {
        token.0
    }
}

impl TryFrom<String> for Token {
    type Error = String;

    fn try_from(word: String) -> Result<Self, Self::Error> {
        Token::new(word.clone()).ok_or_else(|| format!("invalid token: {word:?}"))
    }
}

/// An ordered pair of consecutive tokens.
///
/// Equality is exact pair equality, so `(a, b)` and `(b, a)` are different
/// keys. Serializes as the two tokens joined by a single space, which keeps
/// the key usable as a JSON object key; tokens never contain whitespace, so
/// the form is unambiguous.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContextKey {
    first: Token,
    second: Token,
}

impl ContextKey {
    pub fn new(first: Token, second: Token) -> Self {
        ContextKey { first, second }
    }

    /// Key formed by the first two tokens of a sequence.
    pub fn leading(tokens: &[Token]) -> Option<Self> {
        match tokens {
            [first, second, ..] => Some(ContextKey::new(first.clone(), second.clone())),
            _ => None,
        }
    }

    /// Key formed by the last two tokens of a sequence.
    pub fn trailing(tokens: &[Token]) -> Option<Self> {
        match tokens {
            [.., first, second] => Some(ContextKey::new(first.clone(), second.clone())),
            _ => None,
        }
    }

    #[inline]
    pub fn first(&self) -> &Token {
        &self.first
    }

    #[inline]
    pub fn second(&self) -> &Token {
        &self.second
    }

    /// Slide the window one token forward: `(a, b)` advanced by `c` is `(b, c)`.
    pub fn advance(&self, next: Token) -> Self {
        ContextKey::new(self.second.clone(), next)
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first, self.second)
    }
}

impl From<ContextKey> for String {
    fn from(key: ContextKey) -> String {
        key.to_string()
    }
}

impl TryFrom<String> for ContextKey {
    type Error = String;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        let mut parts = text.split(' ');
        let first = parts.next().and_then(Token::new);
        let second = parts.next().and_then(Token::new);
        match (first, second, parts.next()) {
            (Some(first), Some(second), None) => Ok(ContextKey::new(first, second)),
            _ => Err(format!("invalid context key: {text:?}")),
        }
    }
}
