//! Lookup tools the model may call while answering

pub mod articles;
pub mod plants;

pub use articles::{GetArticleDetailsTool, ListArticlesTool};
pub use plants::{GetPlantDetailsTool, ListPlantsTool};

use async_trait::async_trait;
use mayaguide_content::ContentStore;
use mayaguide_provider::{object_schema, Tool};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{AgentError, Result};

type BoxedTool = Box<dyn ToolTrait + Send + Sync>;

#[async_trait]
pub trait ToolTrait: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters(&self) -> Value;
    /// Run the tool; the output is the JSON text handed back to the model
    async fn execute(&self, args: Value) -> Result<String>;
}

pub fn to_provider_tool(tool: &dyn ToolTrait) -> Tool {
    Tool::new(tool.name(), tool.description(), tool.parameters())
}

/// Tools by name, declared in registration order
pub struct ToolRegistry {
    tools: HashMap<String, BoxedTool>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn register<T: ToolTrait + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), Box::new(tool)).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&(dyn ToolTrait + Send + Sync)> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn definitions(&self) -> Vec<Tool> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| to_provider_tool(t.as_ref()))
            .collect()
    }

    pub async fn execute(&self, name: &str, args: Value) -> Result<String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))?;
        tool.execute(args).await
    }

    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The four read-only lookups over `store`
pub fn guide_tools(store: Arc<dyn ContentStore>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(ListPlantsTool::new(store.clone()));
    registry.register(GetPlantDetailsTool::new(store.clone()));
    registry.register(ListArticlesTool::new(store.clone()));
    registry.register(GetArticleDetailsTool::new(store));
    registry
}

/// Input of the detail tools
#[derive(Debug, Deserialize)]
pub(crate) struct IdArgs {
    pub id: String,
}

impl IdArgs {
    pub(crate) fn parse(tool: &str, args: Value) -> Result<Self> {
        let parsed: IdArgs =
            serde_json::from_value(args).map_err(|e| AgentError::InvalidArguments {
                tool: tool.to_string(),
                reason: e.to_string(),
            })?;
        if parsed.id.trim().is_empty() {
            return Err(AgentError::InvalidArguments {
                tool: tool.to_string(),
                reason: "id must not be empty".to_string(),
            });
        }
        Ok(parsed)
    }
}

pub(crate) fn id_schema(description: &str) -> Value {
    object_schema(&[("id", description, true)])
}

pub(crate) fn no_args_schema() -> Value {
    object_schema(&[])
}
