//! Article lookups: listArticles and getArticleDetails

use async_trait::async_trait;
use mayaguide_content::ContentStore;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::{id_schema, no_args_schema, IdArgs, ToolTrait};
use crate::Result;

pub struct ListArticlesTool {
    store: Arc<dyn ContentStore>,
}

impl ListArticlesTool {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ToolTrait for ListArticlesTool {
    fn name(&self) -> &str {
        "listArticles"
    }

    fn description(&self) -> &str {
        "List all available articles and educational content."
    }

    fn parameters(&self) -> Value {
        no_args_schema()
    }

    async fn execute(&self, _args: Value) -> Result<String> {
        let articles = self.store.list_articles().await?;
        debug!("listArticles returned {} articles", articles.len());
        Ok(serde_json::to_string(&articles)?)
    }
}

pub struct GetArticleDetailsTool {
    store: Arc<dyn ContentStore>,
}

impl GetArticleDetailsTool {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ToolTrait for GetArticleDetailsTool {
    fn name(&self) -> &str {
        "getArticleDetails"
    }

    fn description(&self) -> &str {
        "Get the full content for a specific article by its ID."
    }

    fn parameters(&self) -> Value {
        id_schema("The article ID, as returned by listArticles")
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let IdArgs { id } = IdArgs::parse(self.name(), args)?;
        debug!("getArticleDetails id={}", id);
        let article = self.store.get_article(&id).await?;
        Ok(serde_json::to_string(&article)?)
    }
}
