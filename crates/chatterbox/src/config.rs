//! Bot configuration, loadable from TOML.

use std::fs;
use std::path::Path;

use pair_chain::DEFAULT_SEED_LENGTH;
use serde::Deserialize;
use tfidf_keywords::DEFAULT_TOP_N;

use crate::error::ConfigError;

/// Tunables for reply generation and routing.
///
/// Every field has a default, so a config file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BotConfig {
    /// Number of keywords tried as generation seeds.
    pub top_n: usize,
    /// Successor budget for both seeded and random replies.
    pub max_length: usize,
    /// How many recent messages the knowledge responder sees.
    pub history_window: usize,
    /// Label used when the classifier fails.
    pub default_label: String,
    /// Label whose replies come from the knowledge responder.
    pub knowledge_label: String,
    /// Author id stamped on the bot's own messages.
    pub bot_author_id: u64,
    pub bot_username: String,
    /// Reply used when no model can produce anything.
    pub no_reply_text: String,
    /// Reply used when the knowledge responder fails.
    pub knowledge_error_text: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        BotConfig {
            top_n: DEFAULT_TOP_N,
            max_length: DEFAULT_SEED_LENGTH,
            history_window: 20,
            default_label: "statement".into(),
            knowledge_label: "question".into(),
            bot_author_id: 0,
            bot_username: "chatterbox".into(),
            no_reply_text: "I got a little confused, could you try again?".into(),
            knowledge_error_text: "My knowledge source is having trouble right now.".into(),
        }
    }
}

impl BotConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: BotConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject settings that indicate a caller mistake rather than a data condition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_label.trim().is_empty() {
            return Err(ConfigError::Invalid("default_label must not be empty".into()));
        }
        if self.knowledge_label.trim().is_empty() {
            return Err(ConfigError::Invalid("knowledge_label must not be empty".into()));
        }
        if self.history_window == 0 {
            return Err(ConfigError::Invalid("history_window must be at least 1".into()));
        }
        if self.no_reply_text.trim().is_empty() || self.knowledge_error_text.trim().is_empty() {
            return Err(ConfigError::Invalid("fallback replies must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = BotConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.top_n, 3);
        assert_eq!(config.max_length, 25);
        assert_eq!(config.history_window, 20);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = BotConfig::from_toml_str("top_n = 5\nknowledge_label = \"pergunta\"\n").unwrap();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.knowledge_label, "pergunta");
        assert_eq!(config.max_length, 25);
        assert_eq!(config.default_label, "statement");
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(BotConfig::from_toml_str("").unwrap(), BotConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = BotConfig::from_toml_str("top_k = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn negative_numbers_do_not_parse() {
        let err = BotConfig::from_toml_str("max_length = -1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn invalid_values_fail_fast() {
        let err = BotConfig::from_toml_str("history_window = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");

        let err = BotConfig::from_toml_str("default_label = \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");

        let err = BotConfig::from_toml_str("no_reply_text = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn load_reports_missing_file() {
        let err = BotConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }), "{err}");
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.toml");
        fs::write(&path, "max_length = 10\nbot_author_id = 42\n").unwrap();

        let config = BotConfig::load(&path).unwrap();
        assert_eq!(config.max_length, 10);
        assert_eq!(config.bot_author_id, 42);
    }
}
