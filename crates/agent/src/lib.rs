//! Guide agent for the Mayan medicinal plant catalog.
//!
//! Answers free-text questions from the plant and article catalog through
//! a tool-calling language model, always returning a Markdown answer.

use std::time::Duration;
use thiserror::Error;

pub mod guide;
pub mod prompt;
pub mod runtime;
pub mod tools;

pub use guide::{
    map_history, normalize_article_links, validate_output, Answer, GuideAgent, Query, Role, Turn,
    ValidationError, FALLBACK_ANSWER, GREETING,
};
pub use runtime::{GenerateRequest, LanguageModelRuntime, RuntimeError, ToolLoopRuntime};
pub use tools::{guide_tools, ToolRegistry, ToolTrait};

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error(transparent)]
    Content(#[from] mayaguide_content::ContentError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("invalid answer: {0}")]
    Validation(#[from] ValidationError),

    #[error("no answer within {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, AgentError>;
