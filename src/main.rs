//! Chatterbox CLI: interactive chat bot on per-intent Markov chains.
//!
//! Thin wrapper over the `chatterbox` library crate. Every input line is a
//! message addressed to the bot; logs go to stderr, the transcript to stdout.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chatterbox::{
    BotConfig, ChatMessage, Chatterbox, FixedClassifier, IntentClassifier, JsonlStore,
    LexiconClassifier, MemoryStore, MessageStore,
};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Author id used for the person typing at the terminal.
const LOCAL_USER_ID: u64 = 1;

/// Chatterbox: a chat bot that learns from what it is told and answers with
/// two-word Markov chains.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// PRNG seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON Lines message history; created if missing. Without it, history
    /// lives in memory only.
    #[arg(long)]
    history: Option<PathBuf>,

    /// Text file of messages (one per line, `#` comments) added to the
    /// history before startup.
    #[arg(long)]
    train: Option<PathBuf>,

    /// Tab-separated `label<TAB>phrase` intent examples, with a header row.
    #[arg(long)]
    intents: Option<PathBuf>,

    /// Number of keywords tried as seeds.
    #[arg(long)]
    top_n: Option<usize>,

    /// Maximum number of words generated after the seed pair.
    #[arg(long)]
    max_length: Option<usize>,

    /// Log progress to stderr.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let mut config = match &args.config {
        Some(path) => BotConfig::load(path)?,
        None => BotConfig::default(),
    };
    if let Some(top_n) = args.top_n {
        config.top_n = top_n;
    }
    if let Some(max_length) = args.max_length {
        config.max_length = max_length;
    }

    let store: Arc<dyn MessageStore> = match &args.history {
        Some(path) => Arc::new(JsonlStore::new(path)),
        None => Arc::new(MemoryStore::new()),
    };

    if let Some(path) = &args.train {
        let count = seed_history(store.as_ref(), path).await?;
        log::info!("added {count} messages from {}", path.display());
    }
    let mut next_id = next_message_id(store.as_ref()).await?;

    let classifier: Arc<dyn IntentClassifier> = match &args.intents {
        Some(path) => Arc::new(LexiconClassifier::load(path, config.default_label.clone())?),
        None => Arc::new(FixedClassifier::new(config.default_label.clone())),
    };

    let seed = args.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default()
    });
    let rng = SmallRng::seed_from_u64(seed);

    let bot = Chatterbox::bootstrap(config, classifier, store, rng).await?;
    log::info!("ready with models for {:?}", bot.registry().labels());

    // Conversation loop.
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            break;
        }

        let message = ChatMessage::new(next_id, LOCAL_USER_ID, "you", trimmed);
        next_id += 1;

        if let Some(reply) = bot.handle_message(message, true).await? {
            stdout.write_all(format!("Chatterbox: {reply}\n").as_bytes()).await?;
            stdout.flush().await?;
        }
    }

    Ok(())
}

/// One past the highest id already in the log, so ids stay unique across runs.
async fn next_message_id(store: &dyn MessageStore) -> anyhow::Result<u64> {
    let last = store.all().await?.iter().map(|m| m.id).max().unwrap_or(0);
    Ok(last + 1)
}

/// Append every non-comment line of `path` to the store as a user message.
async fn seed_history(store: &dyn MessageStore, path: &Path) -> anyhow::Result<usize> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read training file {}", path.display()))?;

    let mut count = 0;
    for line in content.lines() {
        let trimmed = line.trim();
        // Skip comments and empty lines.
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        store
            .append(&ChatMessage::new(0, LOCAL_USER_ID, "trainer", trimmed))
            .await?;
        count += 1;
    }
    Ok(count)
}
