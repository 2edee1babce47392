//! Remote knowledge responder collaborator.
//!
//! Questions are not answered from the Markov models: they go to an external
//! text generator together with the recent conversation. The bot only knows
//! this trait; transport, credentials and prompt shape belong to the
//! implementation.

use async_trait::async_trait;

use crate::error::ResponderError;
use crate::message::HistoryTurn;

/// Produces a reply from the ordered conversation history, oldest turn first.
#[async_trait]
pub trait KnowledgeResponder: Send + Sync {
    async fn respond(&self, history: &[HistoryTurn]) -> Result<String, ResponderError>;
}
