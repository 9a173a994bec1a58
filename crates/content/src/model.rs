//! Plant and article records, and the projections the guide reads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display language; English is primary, Spanish secondary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "es" | "spanish" | "español" => Ok(Language::Es),
            other => Err(format!("unsupported language '{}'", other)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::En => f.write_str("en"),
            Language::Es => f.write_str("es"),
        }
    }
}

/// Text in both site languages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualText {
    pub en: String,
    #[serde(default)]
    pub es: String,
}

impl BilingualText {
    pub fn new(en: impl Into<String>, es: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            es: es.into(),
        }
    }

    /// English-only text
    pub fn primary(en: impl Into<String>) -> Self {
        Self::new(en, String::new())
    }

    /// Text in `lang`, falling back to English when the translation is missing
    pub fn get(&self, lang: Language) -> &str {
        match lang {
            Language::Es if !self.es.trim().is_empty() => &self.es,
            _ => &self.en,
        }
    }

    pub fn has_primary(&self) -> bool {
        !self.en.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualTag {
    pub id: String,
    pub en: String,
    #[serde(default)]
    pub es: String,
}

/// A medicinal plant as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: String,
    pub name: BilingualText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<BilingualText>,
    pub description: BilingualText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BilingualText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<BilingualText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultural_significance: Option<BilingualText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparation_methods: Option<BilingualText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<BilingualText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precautions: Option<BilingualText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ethical_harvesting: Option<BilingualText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub related_blogs: Vec<String>,
}

impl Plant {
    /// Minimal record with only the required fields set
    pub fn new(id: impl Into<String>, name: BilingualText, description: BilingualText) -> Self {
        Self {
            id: id.into(),
            name,
            scientific_name: None,
            family: None,
            description,
            properties: None,
            uses: None,
            cultural_significance: None,
            preparation_methods: None,
            dosage: None,
            precautions: None,
            ethical_harvesting: None,
            image_url: None,
            video_url: None,
            is_locked: false,
            created_at: None,
            tags: Vec::new(),
            related_blogs: Vec::new(),
        }
    }

    pub fn summary(&self) -> PlantSummary {
        PlantSummary {
            id: self.id.clone(),
            name: self.name.en.clone(),
        }
    }

    pub fn detail(&self) -> PlantDetail {
        PlantDetail {
            id: self.id.clone(),
            name: self.name.clone(),
            scientific_name: self.scientific_name.clone(),
            description: self.description.clone(),
        }
    }
}

/// An article (blog post) as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: BilingualText,
    pub content: BilingualText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub related_plants: Vec<String>,
    #[serde(default)]
    pub tags: Vec<BilingualTag>,
}

impl Article {
    pub fn new(id: impl Into<String>, title: BilingualText, content: BilingualText) -> Self {
        Self {
            id: id.into(),
            title,
            content,
            image_url: None,
            is_locked: false,
            created_at: None,
            related_plants: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn summary(&self) -> ArticleSummary {
        ArticleSummary {
            id: self.id.clone(),
            title: self.title.en.clone(),
        }
    }

    pub fn detail(&self) -> ArticleDetail {
        ArticleDetail {
            id: self.id.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
        }
    }
}

/// `{id, name}` pair used when browsing plants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantSummary {
    pub id: String,
    /// Primary-language name
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantDetail {
    pub id: String,
    pub name: BilingualText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    pub description: BilingualText,
}

/// `{id, title}` pair used when browsing articles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: String,
    /// Primary-language title
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDetail {
    pub id: String,
    pub title: BilingualText,
    /// May contain HTML from the rich-text editor
    pub content: BilingualText,
}
