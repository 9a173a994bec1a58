//! OpenRouter / OpenAI-compatible chat completions over HTTP.

use crate::*;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, trace};

const OPENROUTER_BASE: &str = "https://openrouter.ai/api/v1";
const OPENAI_BASE: &str = "https://api.openai.com/v1";
const APP_TITLE: &str = "Mayan Medicine Guide";

pub struct OpenRouterProvider {
    client: Client,
    api_key: String,
    api_base: String,
    default_model: String,
    is_openrouter: bool,
}

impl OpenRouterProvider {
    pub fn new(
        api_key: impl Into<String>,
        api_base: Option<String>,
        default_model: Option<String>,
    ) -> Self {
        let api_key = api_key.into();
        let is_openrouter = api_key.starts_with("sk-or-")
            || api_base
                .as_ref()
                .map(|b| b.contains("openrouter"))
                .unwrap_or(false);

        let api_base = api_base.unwrap_or_else(|| {
            if is_openrouter {
                OPENROUTER_BASE.to_string()
            } else {
                OPENAI_BASE.to_string()
            }
        });

        let default_model = default_model.unwrap_or_else(|| {
            if is_openrouter {
                "google/gemini-2.0-flash-001".to_string()
            } else {
                "gpt-4o-mini".to_string()
            }
        });

        Self {
            client: Client::new(),
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            default_model,
            is_openrouter,
        }
    }

    fn build_request(&self, params: &ChatParams) -> serde_json::Value {
        let model = if params.model.is_empty() {
            self.default_model.clone()
        } else {
            params.model.clone()
        };

        let messages: Vec<serde_json::Value> = params.messages.iter().map(wire_message).collect();

        let mut body = json!({
            "model": model,
            "messages": messages,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
        });

        if params.response_format == ResponseFormat::JsonObject {
            body["response_format"] = json!({"type": "json_object"});
        }

        if !params.tools.is_empty() {
            body["tools"] = json!(params.tools);
            body["tool_choice"] = match &params.tool_choice {
                ToolChoice::Auto => json!("auto"),
                ToolChoice::None => json!("none"),
            };
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<ChatResponse> {
        let choice = json["choices"]
            .get(0)
            .ok_or(ProviderError::InvalidResponse)?;
        let message = &choice["message"];
        let content = message["content"].as_str().map(|s| s.to_string());
        let finish_reason = choice["finish_reason"]
            .as_str()
            .unwrap_or("stop")
            .to_string();

        let tool_calls = message["tool_calls"]
            .as_array()
            .map(|calls| calls.iter().map(parse_tool_call).collect())
            .unwrap_or_default();

        let usage = json["usage"]
            .as_object()
            .map(|usage| {
                let field = |key: &str| usage.get(key).and_then(|v| v.as_u64()).unwrap_or(0) as u32;
                Usage {
                    prompt_tokens: field("prompt_tokens"),
                    completion_tokens: field("completion_tokens"),
                    total_tokens: field("total_tokens"),
                }
            })
            .unwrap_or_default();

        Ok(ChatResponse {
            content,
            tool_calls,
            finish_reason,
            usage,
        })
    }
}

/// Message in wire form; tool-call arguments travel as a JSON string
fn wire_message(m: &Message) -> serde_json::Value {
    let mut obj = json!({ "role": &m.role });
    if let Some(content) = &m.content {
        obj["content"] = json!(content);
    }
    if let Some(tool_calls) = &m.tool_calls {
        let calls: Vec<serde_json::Value> = tool_calls
            .iter()
            .map(|c| {
                json!({
                    "id": &c.id,
                    "type": &c.call_type,
                    "function": {
                        "name": &c.function.name,
                        "arguments": c.function.arguments.to_string(),
                    }
                })
            })
            .collect();
        obj["tool_calls"] = json!(calls);
    }
    if let Some(tool_call_id) = &m.tool_call_id {
        obj["tool_call_id"] = json!(tool_call_id);
    }
    if let Some(name) = &m.name {
        obj["name"] = json!(name);
    }
    obj
}

fn parse_tool_call(call: &serde_json::Value) -> ToolCall {
    let function = &call["function"];
    // arguments usually arrive as a string of JSON, some backends send an object
    let arguments = match &function["arguments"] {
        serde_json::Value::String(raw) => {
            serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.clone()))
        }
        serde_json::Value::Null => json!({}),
        other => other.clone(),
    };

    ToolCall {
        id: call["id"].as_str().unwrap_or_default().to_string(),
        name: function["name"].as_str().unwrap_or_default().to_string(),
        arguments,
    }
}

#[async_trait::async_trait]
impl Provider for OpenRouterProvider {
    async fn chat(&self, params: ChatParams) -> Result<ChatResponse> {
        if !self.is_configured() {
            return Err(ProviderError::NoApiKey);
        }

        trace!("chat completion request to {}", self.api_base);

        let url = format!("{}/chat/completions", self.api_base);
        let body = self.build_request(&params);

        let mut request = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");
        if self.is_openrouter {
            request = request.header("X-Title", APP_TITLE);
        }

        let response = request.json(&body).send().await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ProviderError::RateLimited);
        }

        let json: serde_json::Value = response.json().await?;

        if !status.is_success() {
            let error = json["error"]["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            return Err(ProviderError::Api(error));
        }

        let response = self.parse_response(json)?;
        debug!(
            "completion finished ({}), {} tool calls, {} tokens",
            response.finish_reason,
            response.tool_calls.len(),
            response.usage.total_tokens
        );

        Ok(response)
    }

    fn default_model(&self) -> String {
        self.default_model.clone()
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(messages: Vec<Message>, tools: Vec<Tool>) -> ChatParams {
        ChatParams {
            model: "test/model".to_string(),
            messages,
            tools,
            ..ChatParams::default()
        }
    }

    #[test]
    fn test_new_with_openrouter_key() {
        let provider = OpenRouterProvider::new("sk-or-test123", None, None);
        assert!(provider.is_openrouter);
        assert_eq!(provider.api_base, OPENROUTER_BASE);
        assert_eq!(provider.default_model, "google/gemini-2.0-flash-001");
    }

    #[test]
    fn test_new_with_openai_key() {
        let provider = OpenRouterProvider::new("sk-openai123", None, None);
        assert!(!provider.is_openrouter);
        assert_eq!(provider.api_base, OPENAI_BASE);
        assert_eq!(provider.default_model, "gpt-4o-mini");
    }

    #[test]
    fn test_new_with_custom_openrouter_base() {
        let provider = OpenRouterProvider::new(
            "some-key",
            Some("https://proxy.openrouter.ai/api/".to_string()),
            None,
        );
        assert!(provider.is_openrouter);
        assert_eq!(provider.api_base, "https://proxy.openrouter.ai/api");
    }

    #[test]
    fn test_new_with_custom_model() {
        let provider = OpenRouterProvider::new("sk-or-test", None, Some("custom/model".to_string()));
        assert_eq!(provider.default_model(), "custom/model");
    }

    #[test]
    fn test_is_configured() {
        assert!(OpenRouterProvider::new("key", None, None).is_configured());
        assert!(!OpenRouterProvider::new("", None, None).is_configured());
    }

    #[tokio::test]
    async fn test_chat_without_key_fails_fast() {
        let provider = OpenRouterProvider::new("", None, None);
        let result = provider.chat(ChatParams::default()).await;
        assert!(matches!(result, Err(ProviderError::NoApiKey)));
    }

    #[test]
    fn test_build_request_basic() {
        let provider = OpenRouterProvider::new("sk-test", None, None);
        let request = provider.build_request(&params(vec![Message::user("Hello")], vec![]));

        assert_eq!(request["model"], "test/model");
        assert_eq!(request["max_tokens"], 4096);
        assert!(request.get("tools").is_none());
        assert!(request.get("tool_choice").is_none());
        assert!(request.get("response_format").is_none());

        let messages = request["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "Hello");
    }

    #[test]
    fn test_build_request_empty_model_uses_default() {
        let provider = OpenRouterProvider::new("sk-test", None, Some("fallback/model".to_string()));
        let request = provider.build_request(&ChatParams::default());
        assert_eq!(request["model"], "fallback/model");
    }

    #[test]
    fn test_build_request_json_object_format() {
        let provider = OpenRouterProvider::new("sk-test", None, None);
        let mut p = params(vec![Message::user("Hi")], vec![]);
        p.response_format = ResponseFormat::JsonObject;

        let request = provider.build_request(&p);
        assert_eq!(request["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_build_request_with_tools() {
        let provider = OpenRouterProvider::new("sk-test", None, None);
        let request = provider.build_request(&params(
            vec![Message::user("What plants are there?")],
            vec![Tool::new(
                "listPlants",
                "List all available medicinal plants.",
                json!({"type": "object", "properties": {}}),
            )],
        ));

        let tools = request["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["type"], "function");
        assert_eq!(tools[0]["function"]["name"], "listPlants");
        assert_eq!(request["tool_choice"], "auto");
    }

    #[test]
    fn test_build_request_none_choice() {
        let provider = OpenRouterProvider::new("sk-test", None, None);
        let tools = vec![Tool::new("listPlants", "List", json!({}))];

        let mut p = params(vec![Message::user("Hi")], tools);
        p.tool_choice = ToolChoice::None;
        assert_eq!(provider.build_request(&p)["tool_choice"], "none");
    }

    #[test]
    fn test_build_request_tool_call_arguments_are_strings() {
        let provider = OpenRouterProvider::new("sk-test", None, None);
        let msg = Message::assistant_tool_calls(
            None,
            vec![ToolCallDef::new("call_1", "getPlantDetails", json!({"id": "p1"}))],
        );

        let request = provider.build_request(&params(
            vec![msg, Message::tool("call_1", "getPlantDetails", "{}")],
            vec![],
        ));
        let messages = request["messages"].as_array().unwrap();

        assert!(messages[0].get("content").is_none());
        let arguments = &messages[0]["tool_calls"][0]["function"]["arguments"];
        assert_eq!(arguments, r#"{"id":"p1"}"#);
        assert_eq!(messages[1]["tool_call_id"], "call_1");
        assert_eq!(messages[1]["name"], "getPlantDetails");
    }

    #[test]
    fn test_parse_response_simple() {
        let provider = OpenRouterProvider::new("sk-test", None, None);
        let response = provider
            .parse_response(json!({
                "choices": [{
                    "message": {"content": "Hello!", "role": "assistant"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
            }))
            .unwrap();

        assert_eq!(response.content.as_deref(), Some("Hello!"));
        assert!(response.tool_calls.is_empty());
        assert_eq!(response.usage.total_tokens, 15);
    }

    #[test]
    fn test_parse_response_multiple_tool_calls() {
        let provider = OpenRouterProvider::new("sk-test", None, None);
        let response = provider
            .parse_response(json!({
                "choices": [{
                    "message": {
                        "content": null,
                        "tool_calls": [
                            {"id": "call_1", "function": {"name": "listPlants", "arguments": "{}"}},
                            {"id": "call_2", "function": {"name": "getPlantDetails", "arguments": "{\"id\": \"p1\"}"}}
                        ]
                    },
                    "finish_reason": "tool_calls"
                }]
            }))
            .unwrap();

        assert!(response.content.is_none());
        assert_eq!(response.tool_calls.len(), 2);
        assert_eq!(response.tool_calls[1].name, "getPlantDetails");
        assert_eq!(response.tool_calls[1].arguments, json!({"id": "p1"}));
    }

    #[test]
    fn test_parse_response_arguments_as_object_or_missing() {
        let provider = OpenRouterProvider::new("sk-test", None, None);
        let response = provider
            .parse_response(json!({
                "choices": [{
                    "message": {
                        "tool_calls": [
                            {"id": "a", "function": {"name": "getArticleDetails", "arguments": {"id": "b1"}}},
                            {"id": "b", "function": {"name": "listArticles"}}
                        ]
                    }
                }]
            }))
            .unwrap();

        assert_eq!(response.tool_calls[0].arguments, json!({"id": "b1"}));
        assert_eq!(response.tool_calls[1].arguments, json!({}));
        assert_eq!(response.finish_reason, "stop");
    }

    #[test]
    fn test_parse_response_invalid_argument_json_kept_raw() {
        let provider = OpenRouterProvider::new("sk-test", None, None);
        let response = provider
            .parse_response(json!({
                "choices": [{
                    "message": {
                        "tool_calls": [{"id": "a", "function": {"name": "x", "arguments": "not json"}}]
                    }
                }]
            }))
            .unwrap();

        assert_eq!(response.tool_calls[0].arguments, json!("not json"));
    }

    #[test]
    fn test_parse_response_missing_choices() {
        let provider = OpenRouterProvider::new("sk-test", None, None);
        assert!(matches!(
            provider.parse_response(json!({"choices": []})),
            Err(ProviderError::InvalidResponse)
        ));
        assert!(matches!(
            provider.parse_response(json!({"usage": {}})),
            Err(ProviderError::InvalidResponse)
        ));
    }
}
