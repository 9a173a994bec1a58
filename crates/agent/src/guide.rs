//! The query-answering guide.
//!
//! [`GuideAgent::answer_user_query`] is total: runtime failures, timeouts,
//! empty output and output that does not match `{answer: string}` all turn
//! into [`FALLBACK_ANSWER`]. Callers that want the cause use
//! [`GuideAgent::try_answer`].

use mayaguide_config::Config;
use mayaguide_content::ContentStore;
use mayaguide_provider::Message;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::prompt::{answer_schema, system_instruction, ARTICLE_ROUTE};
use crate::runtime::{GenerateRequest, LanguageModelRuntime};
use crate::tools::{guide_tools, ToolRegistry};
use crate::{AgentError, Result};

/// Returned whenever no valid answer could be produced
pub const FALLBACK_ANSWER: &str = "I'm sorry, I encountered a problem while trying to find an answer. Please try rephrasing your question.";

/// Opening agent turn shown by chat surfaces
pub const GREETING: &str = "Hello! I am a guide to the world of Mayan medicinal plants. Ask me about a plant, describe your symptoms, or let me know what you'd like to learn about today.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

/// One prior turn, supplied and kept by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            role: Role::Agent,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Turn>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<Turn>) -> Self {
        self.history = history;
        self
    }
}

/// Markdown answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
}

impl Answer {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
        }
    }

    pub fn fallback() -> Self {
        Self::new(FALLBACK_ANSWER)
    }

    pub fn text(&self) -> &str {
        &self.answer
    }

    pub fn is_fallback(&self) -> bool {
        self.answer == FALLBACK_ANSWER
    }
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("runtime produced no output")]
    Missing,

    #[error("output does not match the answer schema: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("answer is empty")]
    EmptyAnswer,
}

/// Check the runtime's output against `{answer: string}`
pub fn validate_output(output: Option<Value>) -> std::result::Result<Answer, ValidationError> {
    let value = output.ok_or(ValidationError::Missing)?;

    #[derive(Deserialize)]
    struct RawAnswer {
        answer: Option<String>,
    }

    let raw: RawAnswer = serde_json::from_value(value)?;
    match raw.answer {
        Some(answer) if !answer.trim().is_empty() => Ok(Answer::new(answer)),
        _ => Err(ValidationError::EmptyAnswer),
    }
}

/// Prior turns as runtime messages, order kept
pub fn map_history(history: &[Turn]) -> Vec<Message> {
    history
        .iter()
        .map(|turn| match turn.role {
            Role::User => Message::user(&turn.text),
            Role::Agent => Message::assistant(&turn.text),
        })
        .collect()
}

fn legacy_article_link() -> &'static Regex {
    static LINK: OnceLock<Regex> = OnceLock::new();
    LINK.get_or_init(|| Regex::new(r"\]\(/blogs/([^)\s]+)\)").expect("article link pattern"))
}

/// Rewrite `[..](/blogs/id)` links to the article route
pub fn normalize_article_links(markdown: &str) -> String {
    legacy_article_link()
        .replace_all(markdown, format!("]({}/$1)", ARTICLE_ROUTE).as_str())
        .into_owned()
}

pub struct GuideAgent {
    runtime: Arc<dyn LanguageModelRuntime>,
    tools: ToolRegistry,
    instruction: String,
    timeout: Option<Duration>,
}

impl GuideAgent {
    pub fn new(runtime: Arc<dyn LanguageModelRuntime>, store: Arc<dyn ContentStore>) -> Self {
        Self {
            runtime,
            tools: guide_tools(store),
            instruction: system_instruction(),
            timeout: None,
        }
    }

    /// Agent with the timeout from the `guide` config section
    pub fn from_config(
        runtime: Arc<dyn LanguageModelRuntime>,
        store: Arc<dyn ContentStore>,
        config: &Config,
    ) -> Self {
        Self::new(runtime, store).with_timeout(config.timeout())
    }

    /// Bound the whole runtime call; expiry yields the fallback answer
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Answer a query; never fails
    pub async fn answer_user_query(&self, query: &Query) -> Answer {
        let request_id = Uuid::new_v4();
        let span = info_span!("answer_user_query", %request_id);

        async {
            match self.try_answer(query).await {
                Ok(answer) => answer,
                Err(AgentError::Validation(e)) => {
                    warn!("unusable model output: {}", e);
                    Answer::fallback()
                }
                Err(e) => {
                    error!("guide failed: {}", e);
                    Answer::fallback()
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Answer a query, reporting why no answer could be produced
    pub async fn try_answer(&self, query: &Query) -> Result<Answer> {
        info!(
            "answering query ({} chars, {} prior turns)",
            query.text.len(),
            query.history.len()
        );

        let history = map_history(&query.history);
        let schema = answer_schema();
        let request = GenerateRequest {
            system_instruction: &self.instruction,
            tools: &self.tools,
            output_schema: &schema,
            query: &query.text,
            history: &history,
        };

        let generation = self.runtime.generate(request);
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, generation)
                .await
                .map_err(|_| AgentError::Timeout(limit))??,
            None => generation.await?,
        };

        let answer = validate_output(output)?;
        debug!("answer has {} chars", answer.answer.len());

        Ok(Answer::new(normalize_article_links(&answer.answer)))
    }
}
