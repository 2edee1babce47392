//! Two-token context Markov chain for learning and generating short messages.
//!
//! This crate provides [`PairChain`], which maps every [`ContextKey`] (a pair
//! of consecutive tokens) to the bag of tokens observed right after it, and
//! remembers which keys opened a trained message. Generation either continues
//! from a seed phrase ([`PairChain::generate_from_seed`]) or from a randomly
//! drawn message opening ([`PairChain::generate_random`]).
//!
//! Bags keep duplicates, so drawing uniformly from a bag is already
//! frequency-weighted. The same holds for the starting keys.
//!
//! Randomness is always passed in by the caller, so tests can use a seeded
//! generator and assert exact output.

use std::collections::HashMap;

use chat_tokenizer::normalize;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use token_core::{ContextKey, Token};

/// Default successor budget for seeded generation.
pub const DEFAULT_SEED_LENGTH: usize = 25;

/// Default successor budget for random generation.
pub const DEFAULT_RANDOM_LENGTH: usize = 20;

/// Outcome of a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// Space-joined generated tokens.
    Generated(String),
    /// The seed's context was never trained.
    NoContinuationKnown,
    /// The model has not learned any message yet.
    NothingLearned,
}

impl Generation {
    /// The generated text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Generation::Generated(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Generation::Generated(text) => Some(text),
            _ => None,
        }
    }

    #[inline]
    pub fn is_generated(&self) -> bool {
        matches!(self, Generation::Generated(_))
    }
}

/// A second-order Markov chain over normalized tokens.
///
/// Both tables only ever grow: training appends, nothing is evicted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairChain {
    /// Context key → successors observed after it, in training order.
    chain: HashMap<ContextKey, Vec<Token>>,
    /// Opening key of every trained message, duplicates included.
    starting_keys: Vec<ContextKey>,
}

impl PairChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        PairChain::default()
    }

    /// Train on raw message texts.
    ///
    /// Each message is normalized and passed to [`learn`](Self::learn).
    pub fn train<I>(&mut self, messages: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for message in messages {
            self.learn(&normalize(message.as_ref()));
        }
    }

    /// Learn from one token sequence.
    ///
    /// Skips entirely if `tokens.len() < 3`, since no `(key → successor)`
    /// triple can be formed. Otherwise records the opening key and appends
    /// `tokens[i + 2]` to the bag of `(tokens[i], tokens[i + 1])` for every
    /// window.
    pub fn learn(&mut self, tokens: &[Token]) {
        if tokens.len() < 3 {
            return;
        }

        if let Some(start) = ContextKey::leading(tokens) {
            self.starting_keys.push(start);
        }

        for window in tokens.windows(3) {
            let key = ContextKey::new(window[0].clone(), window[1].clone());
            self.chain.entry(key).or_default().push(window[2].clone());
        }
    }

    /// Continue a seed phrase.
    ///
    /// The context is formed from the **last** two tokens of the normalized
    /// seed, so a short keyword phrase acts as an anchor to continue from.
    /// Seeds with fewer than two tokens fall back to
    /// [`generate_random`](Self::generate_random). An untrained context
    /// yields [`Generation::NoContinuationKnown`].
    ///
    /// At most `max_length` successors are appended after the two context
    /// tokens; generation stops early once the current context has no entry.
    pub fn generate_from_seed<R: Rng>(&self, seed: &str, max_length: usize, rng: &mut R) -> Generation {
        let tokens = normalize(seed);
        match ContextKey::trailing(&tokens) {
            Some(key) => self.continue_from(key, max_length, rng),
            None => self.generate_random(max_length, rng),
        }
    }

    /// Continue from a randomly drawn message opening.
    ///
    /// Openings seen more often are proportionally more likely. Returns
    /// [`Generation::NothingLearned`] when no message has been trained yet.
    pub fn generate_random<R: Rng>(&self, max_length: usize, rng: &mut R) -> Generation {
        match self.starting_keys.choose(rng) {
            Some(key) => self.continue_from(key.clone(), max_length, rng),
            None => Generation::NothingLearned,
        }
    }

    fn continue_from<R: Rng>(&self, mut key: ContextKey, max_length: usize, rng: &mut R) -> Generation {
        if !self.chain.contains_key(&key) {
            return Generation::NoContinuationKnown;
        }

        let mut output = key.to_string();

        for _ in 0..max_length {
            let Some(next) = self.chain.get(&key).and_then(|bag| bag.choose(rng)) else {
                break;
            };
            output.push(' ');
            output.push_str(next.as_str());
            key = key.advance(next.clone());
        }

        Generation::Generated(output)
    }

    /// Successor bag for a context key.
    pub fn successors(&self, key: &ContextKey) -> Option<&[Token]> {
        self.chain.get(key).map(Vec::as_slice)
    }

    /// Opening keys of all trained messages, in training order.
    pub fn starting_keys(&self) -> &[ContextKey] {
        &self.starting_keys
    }

    /// Number of distinct context keys.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Iterate over every context key and its successor bag.
    pub fn entries(&self) -> impl Iterator<Item = (&ContextKey, &[Token])> {
        self.chain.iter().map(|(key, bag)| (key, bag.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeSet;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    fn tok(word: &str) -> Token {
        Token::new(word).unwrap()
    }

    fn key(a: &str, b: &str) -> ContextKey {
        ContextKey::new(tok(a), tok(b))
    }

    fn bag(chain: &PairChain, a: &str, b: &str) -> Vec<String> {
        chain
            .successors(&key(a, b))
            .unwrap_or_default()
            .iter()
            .map(|t| t.to_string())
            .collect()
    }

    #[test]
    fn new_chain_is_empty() {
        let chain = PairChain::new();
        assert!(chain.is_empty());
        assert!(chain.starting_keys().is_empty());
    }

    #[test]
    fn train_records_every_triple() {
        let mut chain = PairChain::new();
        chain.train(["the quick brown fox jumps"]);

        assert_eq!(bag(&chain, "the", "quick"), vec!["brown"]);
        assert_eq!(bag(&chain, "quick", "brown"), vec!["fox"]);
        assert_eq!(bag(&chain, "brown", "fox"), vec!["jumps"]);
        assert!(chain.successors(&key("fox", "jumps")).is_none());
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.starting_keys(), &[key("the", "quick")]);
    }

    #[test]
    fn train_skips_short_messages() {
        let mut chain = PairChain::new();
        chain.train(["x y", "solo", "", "  !! "]);
        assert!(chain.is_empty());
        assert!(chain.starting_keys().is_empty());
    }

    #[test]
    fn train_normalizes_messages() {
        let mut chain = PairChain::new();
        chain.train(["Hey <@99>, THE Cat!! sat http://x.io"]);
        assert_eq!(bag(&chain, "hey", "the"), vec!["cat"]);
        assert_eq!(bag(&chain, "the", "cat"), vec!["sat"]);
    }

    #[test]
    fn bags_keep_duplicates() {
        let mut chain = PairChain::new();
        chain.train(["a b c", "a b c", "a b d"]);
        assert_eq!(bag(&chain, "a", "b"), vec!["c", "c", "d"]);
        assert_eq!(chain.starting_keys().len(), 3);
    }

    /// Tally `draws` generations by their text.
    fn tally(draws: usize, mut generate: impl FnMut() -> Generation) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for _ in 0..draws {
            let text = generate().into_text().expect("chain is trained");
            *counts.entry(text).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn successor_draws_follow_multiplicity() {
        let mut chain = PairChain::new();
        chain.train(["a b c", "a b c", "a b c", "a b d"]);

        let mut rng = rng();
        let counts = tally(4000, || chain.generate_from_seed("a b", 1, &mut rng));

        assert_eq!(counts.len(), 2, "{counts:?}");
        let ratio = counts["a b c"] as f64 / counts["a b d"] as f64;
        assert!((2.5..3.5).contains(&ratio), "{counts:?}");
    }

    #[test]
    fn opening_draws_follow_multiplicity() {
        let mut chain = PairChain::new();
        chain.train(["x y z", "x y z", "x y z", "p q r"]);

        let mut rng = rng();
        let counts = tally(4000, || chain.generate_random(1, &mut rng));

        assert_eq!(counts.len(), 2, "{counts:?}");
        let ratio = counts["x y z"] as f64 / counts["p q r"] as f64;
        assert!((2.5..3.5).contains(&ratio), "{counts:?}");
    }

    #[test]
    fn training_accumulates_across_calls() {
        let mut chain = PairChain::new();
        chain.train(["a b c"]);
        chain.train(["a b d"]);
        assert_eq!(bag(&chain, "a", "b"), vec!["c", "d"]);
    }

    #[test]
    fn membership_is_order_independent() {
        let messages = ["a b c d", "b c e", "x a b f", "a b c"];

        let mut forward = PairChain::new();
        forward.train(messages);
        let mut reversed = PairChain::new();
        reversed.train(messages.iter().rev());

        let pairs = |chain: &PairChain| -> BTreeSet<(ContextKey, Token)> {
            chain
                .entries()
                .flat_map(|(k, bag)| bag.iter().map(move |t| (k.clone(), t.clone())))
                .collect()
        };
        assert_eq!(pairs(&forward), pairs(&reversed));

        let starts = |chain: &PairChain| -> BTreeSet<ContextKey> {
            chain.starting_keys().iter().cloned().collect()
        };
        assert_eq!(starts(&forward), starts(&reversed));
    }

    #[test]
    fn seed_continues_deterministic_path() {
        let mut chain = PairChain::new();
        chain.train(["a b c d"]);

        let generation = chain.generate_from_seed("a b", DEFAULT_SEED_LENGTH, &mut rng());
        let text = generation.text().expect("should generate");
        assert!(text.starts_with("a b c"), "got {text:?}");
        assert_eq!(text, "a b c d");
    }

    #[test]
    fn seed_uses_last_two_tokens() {
        let mut chain = PairChain::new();
        chain.train(["x y z w"]);

        let generation = chain.generate_from_seed("whatever else x y", 10, &mut rng());
        assert_eq!(generation, Generation::Generated("x y z w".into()));
    }

    #[test]
    fn unknown_seed_context_is_reported() {
        let mut chain = PairChain::new();
        chain.train(["a b c d"]);

        let mut rng = rng();
        for _ in 0..5 {
            assert_eq!(
                chain.generate_from_seed("never seen", 10, &mut rng),
                Generation::NoContinuationKnown
            );
        }
    }

    #[test]
    fn short_seed_falls_back_to_random() {
        let mut chain = PairChain::new();
        chain.train(["one two three"]);

        let generation = chain.generate_from_seed("one", 10, &mut rng());
        assert_eq!(generation, Generation::Generated("one two three".into()));

        let generation = chain.generate_from_seed("", 10, &mut rng());
        assert_eq!(generation, Generation::Generated("one two three".into()));
    }

    #[test]
    fn short_seed_on_empty_chain_reports_nothing_learned() {
        let chain = PairChain::new();
        assert_eq!(
            chain.generate_from_seed("hi", 10, &mut rng()),
            Generation::NothingLearned
        );
    }

    #[test]
    fn random_on_fresh_chain_reports_nothing_learned() {
        let chain = PairChain::new();
        assert_eq!(
            chain.generate_random(DEFAULT_RANDOM_LENGTH, &mut rng()),
            Generation::NothingLearned
        );
    }

    #[test]
    fn random_generation_starts_with_a_starting_key() {
        let mut chain = PairChain::new();
        chain.train(["good morning everyone", "hello there friend"]);

        let mut rng = rng();
        for _ in 0..20 {
            let generation = chain.generate_random(DEFAULT_RANDOM_LENGTH, &mut rng);
            let text = generation.into_text().expect("should generate");
            assert!(
                text == "good morning everyone" || text == "hello there friend",
                "unexpected {text:?}"
            );
        }
    }

    #[test]
    fn max_length_bounds_successors() {
        let mut chain = PairChain::new();
        // A cycle: "a b" → "a", "b a" → "b", so generation never runs out.
        chain.train(["a b a b a"]);

        let text = chain
            .generate_from_seed("a b", 4, &mut rng())
            .into_text()
            .unwrap();
        assert_eq!(text.split(' ').count(), 2 + 4);

        let text = chain
            .generate_from_seed("a b", 0, &mut rng())
            .into_text()
            .unwrap();
        assert_eq!(text, "a b");
    }

    #[test]
    fn output_has_no_trailing_space() {
        let mut chain = PairChain::new();
        chain.train(["a b c"]);
        let text = chain.generate_from_seed("a b", 25, &mut rng()).into_text().unwrap();
        assert_eq!(text, "a b c");
        assert!(!text.ends_with(' '));
    }

    #[test]
    fn generated_text_only_follows_trained_transitions() {
        let mut chain = PairChain::new();
        chain.train([
            "i like green tea",
            "i like black coffee",
            "you like green apples",
        ]);

        let mut rng = rng();
        for _ in 0..50 {
            let text = chain.generate_random(25, &mut rng).into_text().unwrap();
            let words: Vec<Token> = text.split(' ').map(tok).collect();
            for window in words.windows(3) {
                let k = ContextKey::new(window[0].clone(), window[1].clone());
                let successors = chain.successors(&k).expect("context must be trained");
                assert!(successors.contains(&window[2]), "{text:?}");
            }
        }
    }

    #[test]
    fn same_seed_same_output() {
        let mut chain = PairChain::new();
        chain.train(["i like green tea", "i like black coffee", "i like green apples"]);

        let run = || chain.generate_from_seed("i like", 25, &mut rng());
        assert_eq!(run(), run());
    }

    #[test]
    fn generation_accessors() {
        let generated = Generation::Generated("hi there".into());
        assert!(generated.is_generated());
        assert_eq!(generated.text(), Some("hi there"));
        assert!(!Generation::NothingLearned.is_generated());
        assert_eq!(Generation::NoContinuationKnown.into_text(), None);
    }

    #[test]
    fn chain_serde_roundtrip() {
        let mut chain = PairChain::new();
        chain.train(["a b c d", "a b e"]);

        let json = serde_json::to_string(&chain).unwrap();
        let back: PairChain = serde_json::from_str(&json).unwrap();

        assert_eq!(back.len(), chain.len());
        assert_eq!(back.starting_keys(), chain.starting_keys());
        assert_eq!(bag(&back, "a", "b"), vec!["c", "e"]);
        assert_eq!(bag(&back, "b", "c"), vec!["d"]);
    }
}
