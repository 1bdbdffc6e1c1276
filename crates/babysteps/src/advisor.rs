//! Parenting advice service boundary.
//!
//! Advice comes from an external model that is currently switched off. The
//! [`Advisor`] trait is the seam where a real client would plug in; until
//! then [`UnavailableAdvisor`] answers every question with an error and
//! [`reply_or_fallback`] turns that into the maintenance notice shown in the
//! chat view.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::model::BabyProfile;

/// Reply shown whenever the advisor cannot answer.
pub const FALLBACK_REPLY: &str = "AI Asistan özelliği şu an bakımda. Yakında tekrar aktif olacak! Bu arada diğer özellikleri kullanmaya devam edebilirsiniz.";

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The parent.
    User,
    /// The advisor.
    Model,
}

/// One message in an advice conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique within the conversation.
    pub id: String,
    /// Author.
    pub role: Role,
    /// Message text.
    pub content: String,
}

/// Something that can answer parenting questions.
#[async_trait]
pub trait Advisor: Send + Sync {
    /// Answer the last message of `history`, with `profile` as context.
    ///
    /// # Errors
    ///
    /// Returns an error if no answer could be produced.
    async fn ask(&self, history: &[ChatMessage], profile: &BabyProfile) -> Result<String>;

    /// Whether [`ask`](Self::ask) can be expected to succeed.
    fn is_available(&self) -> bool;
}

/// The advisor while the external service is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableAdvisor;

#[async_trait]
impl Advisor for UnavailableAdvisor {
    async fn ask(&self, _history: &[ChatMessage], _profile: &BabyProfile) -> Result<String> {
        Err(Error::AdvisorUnavailable(
            "advice service is disabled".to_string(),
        ))
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Ask `advisor`, answering with [`FALLBACK_REPLY`] on any failure.
pub async fn reply_or_fallback(
    advisor: &dyn Advisor,
    history: &[ChatMessage],
    profile: &BabyProfile,
) -> String {
    match advisor.ask(history, profile).await {
        Ok(reply) if !reply.trim().is_empty() => reply,
        Ok(_) => {
            warn!("Advisor returned an empty reply");
            FALLBACK_REPLY.to_string()
        }
        Err(e) => {
            warn!("Advisor failed: {e}");
            FALLBACK_REPLY.to_string()
        }
    }
}
