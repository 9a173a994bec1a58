//! Read-only stores backed by memory or a local JSON file

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

use crate::model::{Article, ArticleDetail, ArticleSummary, Plant, PlantDetail, PlantSummary};
use crate::{ContentError, ContentStore, Result};

/// On-disk layout of the content file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentFile {
    #[serde(default)]
    pub plants: Vec<Plant>,
    #[serde(default)]
    pub articles: Vec<Article>,
}

impl ContentFile {
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ContentError::NotFound(path.to_path_buf()));
        }

        debug!("loading content from {:?}", path);
        let raw = tokio::fs::read_to_string(path).await?;
        let file: ContentFile = serde_json::from_str(&raw)?;
        Ok(file)
    }

    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, raw).await?;
        Ok(())
    }

    /// Reject records the guide cannot ground answers on
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for plant in &self.plants {
            if !seen.insert(("plant", plant.id.as_str())) {
                return Err(invalid(&plant.id, "duplicate plant id"));
            }
            if !plant.name.has_primary() {
                return Err(invalid(&plant.id, "plant name has no English value"));
            }
            if !plant.description.has_primary() {
                return Err(invalid(&plant.id, "plant description has no English value"));
            }
        }
        for article in &self.articles {
            if !seen.insert(("article", article.id.as_str())) {
                return Err(invalid(&article.id, "duplicate article id"));
            }
            if !article.title.has_primary() {
                return Err(invalid(&article.id, "article title has no English value"));
            }
        }
        Ok(())
    }
}

fn invalid(id: &str, reason: &str) -> ContentError {
    ContentError::Invalid {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

/// Immutable snapshot of plants and articles, newest first
#[derive(Debug, Clone, Default)]
pub struct LocalContentStore {
    plants: Vec<Plant>,
    articles: Vec<Article>,
}

impl LocalContentStore {
    pub fn new(mut plants: Vec<Plant>, mut articles: Vec<Article>) -> Self {
        // stable sort: undated records keep file order after dated ones
        plants.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self { plants, articles }
    }

    /// Load and validate a content file
    pub async fn open(path: &Path) -> Result<Self> {
        let file = ContentFile::load_from(path).await?;
        file.validate()?;
        info!(
            "content loaded from {:?}: {} plants, {} articles",
            path,
            file.plants.len(),
            file.articles.len()
        );
        Ok(Self::from(file))
    }

    pub fn plants(&self) -> &[Plant] {
        &self.plants
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }
}

impl From<ContentFile> for LocalContentStore {
    fn from(file: ContentFile) -> Self {
        Self::new(file.plants, file.articles)
    }
}

#[async_trait]
impl ContentStore for LocalContentStore {
    async fn list_plants(&self) -> Result<Vec<PlantSummary>> {
        Ok(self.plants.iter().map(Plant::summary).collect())
    }

    async fn get_plant(&self, id: &str) -> Result<PlantDetail> {
        self.plants
            .iter()
            .find(|p| p.id == id)
            .map(Plant::detail)
            .ok_or_else(|| ContentError::PlantNotFound(id.to_string()))
    }

    async fn list_articles(&self) -> Result<Vec<ArticleSummary>> {
        Ok(self.articles.iter().map(Article::summary).collect())
    }

    async fn get_article(&self, id: &str) -> Result<ArticleDetail> {
        self.articles
            .iter()
            .find(|a| a.id == id)
            .map(Article::detail)
            .ok_or_else(|| ContentError::ArticleNotFound(id.to_string()))
    }
}
