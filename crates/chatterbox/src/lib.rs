//! Chatterbox: a chat bot that answers with per-intent Markov chains.
//!
//! This is the facade crate that wires the lower-level components together:
//! - [`token_core`]: `Token` and `ContextKey` value types
//! - [`chat_tokenizer`]: message normalization
//! - [`tfidf_keywords`]: corpus IDF table and keyword ranking
//! - [`pair_chain`]: two-token Markov chain model
//!
//! and adds the pieces around them: the per-label [`ModelRegistry`], the reply
//! fallback chain, and the collaborator traits for storage
//! ([`MessageStore`]), intent classification ([`IntentClassifier`]) and
//! remote answers ([`KnowledgeResponder`]).
//!
//! # Reply fallback chain
//!
//! For a text and its intent label, [`Chatterbox::compose_reply`]:
//!
//! 1. ranks the text's keywords against the startup IDF table;
//! 2. tries each keyword as a generation seed and keeps the first real
//!    continuation;
//! 3. otherwise generates from a random learned message opening;
//! 4. otherwise answers with the configured apology.
//!
//! The IDF table is built once, from the store's contents at bootstrap, and
//! is not refreshed as new messages arrive. The per-label models keep
//! learning.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use chatterbox::{BotConfig, Chatterbox, ChatMessage, FixedClassifier, MemoryStore};
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = Arc::new(MemoryStore::with_messages(vec![
//!     ChatMessage::new(1, 7, "ana", "the cat sat on the mat"),
//! ]));
//! let bot = Chatterbox::bootstrap(
//!     BotConfig::default(),
//!     Arc::new(FixedClassifier::new("statement")),
//!     store,
//!     SmallRng::seed_from_u64(42),
//! )
//! .await
//! .unwrap();
//!
//! let reply = bot.compose_reply("tell me about the cat", "statement");
//! assert_eq!(reply, "the cat sat on the mat");
//! # });
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod message;
pub mod registry;
pub mod responder;
pub mod store;

use std::collections::BTreeMap;
use std::sync::Arc;

use pair_chain::Generation;
use rand::{Rng, SeedableRng};
use tfidf_keywords::TfIdfModel;

pub use classifier::{FixedClassifier, IntentClassifier, LexiconClassifier};
pub use config::BotConfig;
pub use error::{BotError, ClassifyError, ConfigError, ResponderError, StoreError};
pub use message::{ChatMessage, HistoryTurn, Role};
pub use pair_chain::PairChain;
pub use registry::{LabelModel, ModelHandle, ModelRegistry};
pub use responder::KnowledgeResponder;
pub use store::{JsonlStore, MemoryStore, MessageStore};

/// The chat bot.
///
/// Generic over the PRNG type `R` so tests can pass a seeded generator.
/// The generator given to [`bootstrap`](Self::bootstrap) seeds one generator
/// per label. All methods take `&self`; share the bot across tasks with an
/// `Arc`.
pub struct Chatterbox<R> {
    config: BotConfig,
    /// Static keyword table built from the store at bootstrap.
    keywords: TfIdfModel,
    registry: ModelRegistry<R>,
    classifier: Arc<dyn IntentClassifier>,
    store: Arc<dyn MessageStore>,
    knowledge: Option<Arc<dyn KnowledgeResponder>>,
}

impl<R: Rng + SeedableRng + Send> Chatterbox<R> {
    /// Build a bot from the full contents of `store`.
    ///
    /// Every stored message feeds the IDF table, is classified, and trains
    /// the model for its label. Classification failures fall back to
    /// `config.default_label`.
    pub async fn bootstrap(
        config: BotConfig,
        classifier: Arc<dyn IntentClassifier>,
        store: Arc<dyn MessageStore>,
        rng: R,
    ) -> Result<Self, BotError> {
        config.validate()?;

        let history = store.all().await?;
        let keywords = TfIdfModel::build(history.iter().map(|m| m.content.as_str()));

        let bot = Chatterbox {
            config,
            keywords,
            registry: ModelRegistry::new(rng),
            classifier,
            store,
            knowledge: None,
        };

        let mut by_label: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for message in &history {
            let label = bot.resolve_label(&message.content).await;
            by_label.entry(label).or_default().push(&message.content);
        }
        for (label, messages) in by_label {
            log::info!("training model '{label}' with {} messages", messages.len());
            bot.registry.train(&label, messages);
        }

        Ok(bot)
    }

    /// Route `config.knowledge_label` to a remote responder.
    pub fn with_knowledge(mut self, responder: Arc<dyn KnowledgeResponder>) -> Self {
        self.knowledge = Some(responder);
        self
    }

    /// Process one incoming message.
    ///
    /// The message is stored, classified, and used to train its label's
    /// model. If the bot is `addressed`, a reply is produced, stored as a
    /// bot-authored message and returned. Only a failure to store the
    /// incoming message is an error; everything after it degrades.
    pub async fn handle_message(&self, message: ChatMessage, addressed: bool) -> Result<Option<String>, BotError> {
        self.store.append(&message).await?;
        log::debug!("stored message {} from '{}'", message.id, message.author_username);

        let label = self.resolve_label(&message.content).await;
        self.registry.train(&label, [message.content.as_str()]);
        log::info!("model '{label}' updated with new message");

        if !addressed {
            return Ok(None);
        }

        let reply = self.reply_to(&message.content, &label).await;

        let own = ChatMessage::new(0, self.config.bot_author_id, &self.config.bot_username, reply.clone());
        if let Err(err) = self.store.append(&own).await {
            log::warn!("failed to store own reply: {err}");
        }

        Ok(Some(reply))
    }

    /// Reply to `text` already classified as `label`, without learning from it.
    ///
    /// The knowledge label goes to the remote responder when one is
    /// configured; every other label uses [`compose_reply`](Self::compose_reply).
    pub async fn reply_to(&self, text: &str, label: &str) -> String {
        if label == self.config.knowledge_label
            && let Some(knowledge) = &self.knowledge
        {
            log::debug!("label '{label}' delegated to knowledge responder");
            return self.ask_knowledge(knowledge.as_ref()).await;
        }
        self.compose_reply(text, label)
    }

    /// Run the keyword → random → apology fallback chain against `label`'s model.
    ///
    /// Always returns some text.
    pub fn compose_reply(&self, text: &str, label: &str) -> String {
        let model = self.registry.get_or_create(label);
        let keywords = self.keywords.extract_keywords(text, self.config.top_n);
        let max_length = self.config.max_length;

        let chain = model.read();
        let mut rng = model.rng();

        for keyword in &keywords {
            match chain.generate_from_seed(keyword.as_str(), max_length, &mut *rng) {
                Generation::Generated(reply) => {
                    log::debug!("'{label}' reply seeded by keyword '{keyword}'");
                    return reply;
                }
                Generation::NoContinuationKnown => continue,
                // Random generation below would report the same.
                Generation::NothingLearned => break,
            }
        }

        match chain.generate_random(max_length, &mut *rng) {
            Generation::Generated(reply) => {
                log::debug!("'{label}' reply from a random opening");
                reply
            }
            Generation::NoContinuationKnown | Generation::NothingLearned => {
                log::debug!("'{label}' model has nothing to say");
                self.config.no_reply_text.clone()
            }
        }
    }

    /// Classify `text`, falling back to the default label on failure.
    pub async fn resolve_label(&self, text: &str) -> String {
        match self.classifier.classify(text).await {
            Ok(label) if !label.trim().is_empty() => label,
            Ok(_) => self.config.default_label.clone(),
            Err(err) => {
                log::warn!("intent classification failed, using '{}': {err}", self.config.default_label);
                self.config.default_label.clone()
            }
        }
    }

    async fn ask_knowledge(&self, knowledge: &dyn KnowledgeResponder) -> String {
        let history = match self.store.recent(self.config.history_window).await {
            Ok(history) => history,
            Err(err) => {
                log::warn!("failed to load history for knowledge responder: {err}");
                Vec::new()
            }
        };
        let turns: Vec<HistoryTurn> = history
            .iter()
            .map(|m| HistoryTurn::from_message(m, self.config.bot_author_id))
            .collect();

        match knowledge.respond(&turns).await {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => {
                log::warn!("knowledge responder failed: {}", ResponderError::EmptyReply);
                self.config.knowledge_error_text.clone()
            }
            Err(err) => {
                log::warn!("knowledge responder failed: {err}");
                self.config.knowledge_error_text.clone()
            }
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// The static keyword table.
    pub fn keywords(&self) -> &TfIdfModel {
        &self.keywords
    }

    pub fn registry(&self) -> &ModelRegistry<R> {
        &self.registry
    }
}
