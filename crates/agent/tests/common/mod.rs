//! Shared fixtures for guide agent tests

#![allow(dead_code)]

use async_trait::async_trait;
use mayaguide_agent::{GenerateRequest, LanguageModelRuntime, RuntimeError};
use mayaguide_content::{Article, BilingualText, ContentStore, LocalContentStore, Plant};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Chaya and Ruda, plus one article about sleep
pub fn sample_store() -> Arc<dyn ContentStore> {
    let mut chaya = Plant::new(
        "p1",
        BilingualText::new("Chaya", "Chaya"),
        BilingualText::new(
            "A leafy shrub eaten like spinach.",
            "Un arbusto de hojas comestibles.",
        ),
    );
    chaya.scientific_name = Some("Cnidoscolus aconitifolius".to_string());

    let ruda = Plant::new(
        "p2",
        BilingualText::new("Rue", "Ruda"),
        BilingualText::primary("A bitter herb used in limpias."),
    );

    let sleep = Article::new(
        "b1",
        BilingualText::primary("Plants for restful sleep"),
        BilingualText::primary("<p>Tea from the leaves before bed.</p>"),
    );

    Arc::new(LocalContentStore::new(vec![chaya, ruda], vec![sleep]))
}

/// One plant, Chaya, with the given English description
pub fn chaya_store(description: &str) -> Arc<dyn ContentStore> {
    let chaya = Plant::new(
        "p1",
        BilingualText::new("Chaya", "Chaya"),
        BilingualText::primary(description),
    );
    let sleep = Article::new(
        "b1",
        BilingualText::primary("Sleep"),
        BilingualText::primary("<p>Rest.</p>"),
    );
    Arc::new(LocalContentStore::new(vec![chaya], vec![sleep]))
}

/// What a scripted runtime does with each request
#[derive(Clone)]
pub enum Script {
    /// Return this output without touching tools
    Output(Option<Value>),
    /// Look the plant up and describe it, or suggest an article when it is missing
    DescribePlant(String),
    Fail(String),
    /// Wait before answering
    Slow(Duration, Value),
}

/// Stand-in for a language model runtime, driven by a [`Script`]
pub struct ScriptedRuntime {
    script: Script,
    pub seen: Mutex<Vec<Seen>>,
}

/// Snapshot of one request
#[derive(Debug, Clone)]
pub struct Seen {
    pub query: String,
    pub history: Vec<(String, String)>,
    pub tool_names: Vec<String>,
    pub instruction: String,
}

impl ScriptedRuntime {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModelRuntime for ScriptedRuntime {
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<Option<Value>, RuntimeError> {
        self.seen.lock().unwrap().push(Seen {
            query: request.query.to_string(),
            history: request
                .history
                .iter()
                .map(|m| (m.role.clone(), m.content.clone().unwrap_or_default()))
                .collect(),
            tool_names: request.tools.names(),
            instruction: request.system_instruction.to_string(),
        });

        match &self.script {
            Script::Output(output) => Ok(output.clone()),
            Script::Fail(reason) => Err(RuntimeError::Other(reason.clone())),
            Script::Slow(delay, output) => {
                tokio::time::sleep(*delay).await;
                Ok(Some(output.clone()))
            }
            Script::DescribePlant(id) => {
                match request
                    .tools
                    .execute("getPlantDetails", json!({ "id": id }))
                    .await
                {
                    Ok(text) => {
                        let detail: Value = serde_json::from_str(&text)
                            .map_err(|e| RuntimeError::Other(e.to_string()))?;
                        Ok(Some(json!({
                            "answer": format!(
                                "**{}** (*{}*): {}",
                                detail["name"]["en"].as_str().unwrap_or_default(),
                                detail["scientificName"].as_str().unwrap_or_default(),
                                detail["description"]["en"].as_str().unwrap_or_default()
                            )
                        })))
                    }
                    Err(_) => {
                        let list = request
                            .tools
                            .execute("listArticles", json!({}))
                            .await
                            .map_err(|e| RuntimeError::Other(e.to_string()))?;
                        let articles: Value = serde_json::from_str(&list)
                            .map_err(|e| RuntimeError::Other(e.to_string()))?;
                        let first = &articles[0];
                        Ok(Some(json!({
                            "answer": format!(
                                "I don't have information on that plant, but you might find [{}](/blogs/{}) helpful.",
                                first["title"].as_str().unwrap_or_default(),
                                first["id"].as_str().unwrap_or_default()
                            )
                        })))
                    }
                }
            }
        }
    }
}
