//! Content store for the Mayan Medicine Guide
//!
//! The guide only ever reads four projections of the stored plants and
//! articles; [`ContentStore`] is that read surface. The production database
//! lives elsewhere, [`LocalContentStore`] serves a JSON snapshot.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

pub mod model;
pub mod store;

pub use model::{
    Article, ArticleDetail, ArticleSummary, BilingualTag, BilingualText, Language, Plant,
    PlantDetail, PlantSummary,
};
pub use store::{ContentFile, LocalContentStore};

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Plant not found: {0}")]
    PlantNotFound(String),

    #[error("Article not found: {0}")]
    ArticleNotFound(String),

    #[error("content file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid record '{id}': {reason}")]
    Invalid { id: String, reason: String },

    #[error("content I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed content: {0}")]
    Json(#[from] serde_json::Error),
}

impl ContentError {
    /// True when a lookup named an id that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ContentError::PlantNotFound(_) | ContentError::ArticleNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ContentError>;

/// Read access to plants and articles, in store-default order
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn list_plants(&self) -> Result<Vec<PlantSummary>>;
    async fn get_plant(&self, id: &str) -> Result<PlantDetail>;
    async fn list_articles(&self) -> Result<Vec<ArticleSummary>>;
    async fn get_article(&self, id: &str) -> Result<ArticleDetail>;
}
