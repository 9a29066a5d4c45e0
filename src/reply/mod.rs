//! Suggested-reply composition.
//!
//! Replies come from a template table keyed by (category, sub-intent). When
//! the OpenAI backend is selected and a generator is configured, a single
//! remote attempt is made first; any failure falls back to the template.

pub mod entities;
pub mod templates;

pub use entities::{ReplyContext, extract_name, extract_ticket};
pub use templates::render;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Local;
use tracing::{debug, warn};

use crate::config::DEFAULT_SIGNATURE;
use crate::llm::{CapabilityOutcome, ReplyGenerator};
use crate::pipeline::types::{Category, SubIntent};

/// Source text sent to the generator is capped at this many characters.
const MAX_PROMPT_SOURCE_CHARS: usize = 4000;

/// Name used in the generator payload when none was extracted.
const DEFAULT_CUSTOMER_NAME: &str = "Cliente";

const SYSTEM_PROMPT: &str = "Você é um assistente de suporte de banco/fintech. \
    Escreva respostas curtas, claras, em PT-BR, com tom profissional e empático. \
    Se o e-mail for improdutivo, agradeça e encerre.";

/// Which backend drafts the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyBackend {
    #[default]
    Local,
    OpenAi,
}

impl fmt::Display for ReplyBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::OpenAi => f.write_str("openai"),
        }
    }
}

impl FromStr for ReplyBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "openai" => Ok(Self::OpenAi),
            other => Err(format!("unknown reply backend '{other}' (expected local or openai)")),
        }
    }
}

/// System instruction for the remote generator.
pub fn build_system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

/// User payload for the remote generator.
pub fn build_user_prompt(
    text: &str,
    category: Category,
    sub_intent: Option<SubIntent>,
    ctx: &ReplyContext,
) -> String {
    let source: String = text.chars().take(MAX_PROMPT_SOURCE_CHARS).collect();
    format!(
        "Categoria: {category}\nSub-intenção: {sub_intent}\nTicket: {ticket}\nNome: {name}\n\nE-mail:\n{source}",
        sub_intent = sub_intent.map(|s| s.tag()).unwrap_or("nenhuma"),
        ticket = ctx.ticket,
        name = ctx.name.as_deref().unwrap_or(DEFAULT_CUSTOMER_NAME),
    )
}

/// Composes suggested replies. Never fails.
pub struct ReplyComposer {
    signature: String,
    generator: Option<Arc<dyn ReplyGenerator>>,
}

impl ReplyComposer {
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            generator: None,
        }
    }

    /// Attach a remote generator, used only when the caller selects `ReplyBackend::OpenAi`.
    pub fn with_generator(mut self, generator: Arc<dyn ReplyGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Compose a reply for `text`.
    pub async fn compose(
        &self,
        text: &str,
        category: Category,
        sub_intent: Option<SubIntent>,
        backend: ReplyBackend,
    ) -> String {
        let ctx = ReplyContext::extract(text, Local::now(), &self.signature);

        if backend == ReplyBackend::OpenAi {
            if let Some(generated) = self.try_generate(text, category, sub_intent, &ctx).await {
                return generated;
            }
        }

        render(category, sub_intent, &ctx)
    }

    async fn try_generate(
        &self,
        text: &str,
        category: Category,
        sub_intent: Option<SubIntent>,
        ctx: &ReplyContext,
    ) -> Option<String> {
        let Some(generator) = self.generator.as_ref() else {
            debug!("No reply generator configured, using template");
            return None;
        };

        let user = build_user_prompt(text, category, sub_intent, ctx);
        match generator.generate(build_system_prompt(), &user).await {
            CapabilityOutcome::Success(reply) if !reply.trim().is_empty() => {
                debug!(model = generator.model_name(), "Generated reply");
                Some(reply.trim().to_string())
            }
            CapabilityOutcome::Success(_) => {
                warn!(model = generator.model_name(), "Generator returned empty reply, using template");
                None
            }
            CapabilityOutcome::Unavailable => {
                debug!(model = generator.model_name(), "Generator unavailable, using template");
                None
            }
            CapabilityOutcome::Failed(e) => {
                warn!(model = generator.model_name(), error = %e, "Reply generation failed, using template");
                None
            }
        }
    }
}

impl Default for ReplyComposer {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNATURE)
    }
}
