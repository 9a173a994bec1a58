//! Language model runtime: one call in, one structured result out.
//!
//! The guide hands a runtime its instruction, tools, query and history and
//! waits for the final output. Whatever tool calling happens in between is
//! the runtime's business. [`ToolLoopRuntime`] is the implementation backed
//! by a chat-completion [`Provider`]: it keeps calling the model, executing
//! the requested tools and feeding results back until the model answers.

use async_trait::async_trait;
use mayaguide_config::Config;
use mayaguide_provider::{
    ChatParams, Message, Provider, ProviderError, ResponseFormat, ToolCallDef, ToolChoice,
};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::prompt::{build_messages, output_instruction};
use crate::tools::ToolRegistry;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("gave up after {0} model turns")]
    MaxIterations(u32),

    #[error("final output is not JSON: {0}")]
    MalformedOutput(String),

    #[error("{0}")]
    Other(String),
}

/// Everything a runtime needs for one answer
pub struct GenerateRequest<'a> {
    pub system_instruction: &'a str,
    pub tools: &'a ToolRegistry,
    /// Schema the final output must follow
    pub output_schema: &'a Value,
    pub query: &'a str,
    /// Prior turns, already in runtime message form
    pub history: &'a [Message],
}

#[async_trait]
pub trait LanguageModelRuntime: Send + Sync {
    /// Produce the final structured output, or `None` when the model gave nothing
    async fn generate(
        &self,
        request: GenerateRequest<'_>,
    ) -> std::result::Result<Option<Value>, RuntimeError>;
}

/// Tool-calling loop over a chat-completion provider
pub struct ToolLoopRuntime<P: Provider> {
    provider: Arc<P>,
    model: String,
    max_iterations: u32,
    max_tokens: u32,
    temperature: f32,
    json_mode: bool,
}

impl<P: Provider> ToolLoopRuntime<P> {
    pub fn new(provider: P, model: impl Into<String>) -> Self {
        Self {
            provider: Arc::new(provider),
            model: model.into(),
            max_iterations: 20,
            max_tokens: 4096,
            temperature: 0.4,
            json_mode: false,
        }
    }

    /// Model and limits taken from the `guide` config section
    pub fn from_config(provider: P, config: &Config) -> Self {
        Self::new(provider, config.default_model())
            .with_max_iterations(config.guide.max_tool_iterations)
            .with_sampling(config.guide.max_tokens, config.guide.temperature)
            .with_json_mode(config.guide.json_mode)
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_sampling(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    /// Ask the endpoint to enforce a JSON object on every turn; not all
    /// models accept this together with tools
    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P: Provider + 'static> LanguageModelRuntime for ToolLoopRuntime<P> {
    async fn generate(
        &self,
        request: GenerateRequest<'_>,
    ) -> std::result::Result<Option<Value>, RuntimeError> {
        let instruction = format!(
            "{}\n\n{}",
            request.system_instruction,
            output_instruction(request.output_schema)
        );
        let mut messages = build_messages(&instruction, request.history, request.query);
        let tools = request.tools.definitions();
        let mut iteration = 0;

        loop {
            iteration += 1;
            if iteration > self.max_iterations {
                return Err(RuntimeError::MaxIterations(self.max_iterations));
            }

            debug!("model turn {}", iteration);

            let params = ChatParams {
                model: self.model.clone(),
                messages: messages.clone(),
                tools: tools.clone(),
                tool_choice: if iteration == self.max_iterations {
                    ToolChoice::None
                } else {
                    ToolChoice::Auto
                },
                max_tokens: self.max_tokens,
                temperature: self.temperature,
                response_format: if self.json_mode {
                    ResponseFormat::JsonObject
                } else {
                    ResponseFormat::Text
                },
            };

            let response = self.provider.chat(params).await?;

            if !response.has_tool_calls() {
                return parse_final_output(response.content.as_deref());
            }

            let calls: Vec<ToolCallDef> = response.tool_calls.iter().map(ToolCallDef::from).collect();
            messages.push(Message::assistant_tool_calls(response.content.clone(), calls));

            for call in &response.tool_calls {
                debug!("tool call {} {}", call.name, call.arguments);

                let result = match request.tools.execute(&call.name, call.arguments.clone()).await {
                    Ok(output) => output,
                    Err(e) => {
                        warn!("tool {} failed: {}", call.name, e);
                        format!("Error: {}", e)
                    }
                };

                messages.push(Message::tool(&call.id, &call.name, result));
            }
        }
    }
}

/// Parse the model's last message into JSON; blank output is `None`
pub fn parse_final_output(content: Option<&str>) -> std::result::Result<Option<Value>, RuntimeError> {
    let text = match content.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => return Ok(None),
    };

    let json_text = strip_code_fences(text);
    serde_json::from_str(json_text)
        .map(Some)
        .map_err(|e| RuntimeError::MalformedOutput(e.to_string()))
}

/// Drop a surrounding ```json fence some models add despite instructions
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    let body = &trimmed[3..];
    let body = match body.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &body[4..],
        _ => body,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}
