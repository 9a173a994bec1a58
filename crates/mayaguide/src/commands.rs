//! mayaguide command implementations

use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info};

use mayaguide_agent::{GuideAgent, Query, ToolLoopRuntime, Turn, GREETING};
use mayaguide_config::{self, Config, ProviderConfig, OPENROUTER_API_BASE};
use mayaguide_content::{ContentFile, ContentStore, Language, LocalContentStore};
use mayaguide_provider::OpenRouterProvider;

/// Shortest symptom description the recommender accepts
const MIN_SYMPTOMS_CHARS: usize = 10;

const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-001";

/// Read line from stdin
fn read_line() -> Result<String> {
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Read password from stdin (masked input)
fn read_password() -> Result<String> {
    match rpassword::read_password() {
        Ok(key) => Ok(key.trim().to_string()),
        Err(_) => read_line(),
    }
}

/// OpenRouter model response
#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    id: String,
    name: Option<String>,
}

/// Model families that handle tool calling well enough for the guide
const TARGET_MODELS: &[&str] = &["gemini", "claude", "gpt", "mistral"];

/// Fetch available models from OpenRouter
async fn fetch_openrouter_models(api_key: &str) -> Result<Vec<ModelInfo>> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/models", OPENROUTER_API_BASE))
        .header("Authorization", format!("Bearer {}", api_key))
        .send()
        .await?;

    if !response.status().is_success() {
        anyhow::bail!("Failed to fetch models: {}", response.status());
    }

    let models: ModelsResponse = response.json().await?;
    Ok(models.data)
}

fn filter_models(models: Vec<ModelInfo>) -> Vec<ModelInfo> {
    models
        .into_iter()
        .filter(|m| {
            let id_lower = m.id.to_lowercase();
            TARGET_MODELS.iter().any(|target| id_lower.contains(target))
        })
        .collect()
}

/// Interactive setup wizard
pub async fn setup_command() -> Result<()> {
    println!("mayaguide setup");
    println!("----------------------------------------");
    println!();

    println!("Step 1: OpenRouter API Key");
    println!("Get your API key at: https://openrouter.ai/keys");
    println!();

    let (api_key, models) = loop {
        print!("Enter your OpenRouter API key: ");
        std::io::stdout().flush()?;
        let key = read_password()?;

        if key.is_empty() {
            println!("API key cannot be empty. Please try again.");
            continue;
        }

        print!("Validating API key... ");
        std::io::stdout().flush()?;

        match fetch_openrouter_models(&key).await {
            Ok(models) => {
                println!("ok");
                break (key, Some(models));
            }
            Err(e) => {
                debug!("key validation failed: {}", e);
                println!("invalid");
                print!("The API key appears to be invalid. Try again? (Y/n/skip): ");
                std::io::stdout().flush()?;
                let response = read_line()?.to_lowercase();

                if response == "skip" || response == "s" {
                    println!("Keeping the key without validation.");
                    break (key, None);
                } else if response == "n" || response == "no" {
                    anyhow::bail!("Setup cancelled");
                }
            }
        }
    };
    println!();

    println!("Step 2: Select Model");
    println!();

    let model_id = match models.map(filter_models) {
        Some(filtered) if !filtered.is_empty() => {
            println!("Available models:");
            for (i, model) in filtered.iter().take(10).enumerate() {
                let name = model.name.as_ref().unwrap_or(&model.id);
                println!("  {}. {} ({})", i + 1, name, model.id);
            }
            println!();
            println!("Options:");
            println!("  1-10. Select a model from the list above");
            println!("  m.    Enter model ID manually");
            println!("  d.    Use default ({})", DEFAULT_MODEL);
            print!("Your choice: ");
            std::io::stdout().flush()?;

            match read_line()?.as_str() {
                "m" | "M" => {
                    print!("Enter model ID: ");
                    std::io::stdout().flush()?;
                    read_line()?
                }
                "d" | "D" | "" => DEFAULT_MODEL.to_string(),
                num => match num.parse::<usize>() {
                    Ok(idx) if idx > 0 && idx <= filtered.len().min(10) => {
                        filtered[idx - 1].id.clone()
                    }
                    _ => {
                        println!("Invalid selection, using default.");
                        DEFAULT_MODEL.to_string()
                    }
                },
            }
        }
        _ => {
            println!("No model list available. Using default ({}).", DEFAULT_MODEL);
            DEFAULT_MODEL.to_string()
        }
    };
    println!();

    println!("Step 3: Saving Configuration");
    let config_path = mayaguide_config::config_path();
    let mut config = Config::load().await.unwrap_or_default();

    config.providers.openrouter = ProviderConfig {
        api_key,
        api_base: Some(OPENROUTER_API_BASE.to_string()),
    };
    config.guide.model = model_id;
    config.save().await?;
    println!("Saved to {}", config_path.display());

    create_content_file(&config.content_path()).await?;

    println!();
    println!("Setup complete.");
    println!("Next steps:");
    println!("  - Add plants and articles to {}", config.content_path().display());
    println!("  - Ask a question: mayaguide ask -m \"What is Chaya good for?\"");

    Ok(())
}

/// Initialize config and content file
pub async fn init_command() -> Result<()> {
    println!("Initializing mayaguide...");

    let config = mayaguide_config::init().await?;
    create_content_file(&config.content_path()).await?;

    println!("\nmayaguide initialized");
    println!("\nNext steps:");
    println!("  1. Add your API key to {}", mayaguide_config::config_path().display());
    println!("     Get one at: https://openrouter.ai/keys");
    println!(
        "  2. Add plants and articles to {}",
        config.content_path().display()
    );
    println!("  3. Start asking: mayaguide ask -m \"Hello!\"");

    Ok(())
}

async fn create_content_file(path: &std::path::Path) -> Result<()> {
    if !path.exists() {
        ContentFile::default()
            .save_to(path)
            .await
            .with_context(|| format!("Failed to create {}", path.display()))?;
        info!("created {}", path.display());
    }
    Ok(())
}

/// Show status
pub async fn status_command() -> Result<()> {
    let config_path = mayaguide_config::config_path();
    let config = Config::load().await?;
    let content_path = config.content_path();

    println!("mayaguide status");
    println!("----------------------------------------");
    println!(
        "Config:  {} {}",
        config_path.display(),
        if config_path.exists() { "[OK]" } else { "[Missing]" }
    );
    println!(
        "Content: {} {}",
        content_path.display(),
        if content_path.exists() { "[OK]" } else { "[Missing]" }
    );
    println!("Model:   {}", config.default_model());
    println!(
        "API Key: {}",
        if config.has_api_key() { "[Set]" } else { "[Missing]" }
    );
    println!("Timeout: {}s", config.guide.timeout_secs);

    if content_path.exists() {
        let store = open_store(&config).await?;
        println!(
            "Catalog: {} plants, {} articles",
            store.plants().len(),
            store.articles().len()
        );
    }

    Ok(())
}

async fn open_store(config: &Config) -> Result<LocalContentStore> {
    let path = config.content_path();
    LocalContentStore::open(&path)
        .await
        .with_context(|| format!("Failed to load content from {}", path.display()))
}

/// List plants, newest first
pub async fn plants_command(lang: Language) -> Result<()> {
    let config = Config::load().await?;
    let store = open_store(&config).await?;
    let plants = store.list_plants().await?;

    if plants.is_empty() {
        println!("No plants");
        return Ok(());
    }

    for summary in plants {
        let name = match lang {
            Language::En => summary.name,
            Language::Es => store.get_plant(&summary.id).await?.name.get(lang).to_string(),
        };
        println!("  {} - {}", summary.id, name);
    }

    Ok(())
}

/// List articles, newest first
pub async fn articles_command(lang: Language) -> Result<()> {
    let config = Config::load().await?;
    let store = open_store(&config).await?;
    let articles = store.list_articles().await?;

    if articles.is_empty() {
        println!("No articles");
        return Ok(());
    }

    for summary in articles {
        let title = match lang {
            Language::En => summary.title,
            Language::Es => store
                .get_article(&summary.id)
                .await?
                .title
                .get(lang)
                .to_string(),
        };
        println!("  {} - {}", summary.id, title);
    }

    Ok(())
}

async fn build_agent() -> Result<GuideAgent> {
    let config = Config::load().await?;

    let api_key = config.api_key().with_context(|| {
        format!(
            "No API key configured. Run `mayaguide setup` or edit {}",
            mayaguide_config::config_path().display()
        )
    })?;
    let provider = OpenRouterProvider::new(api_key, config.api_base(), Some(config.default_model()));
    let runtime = ToolLoopRuntime::from_config(provider, &config);
    let store = open_store(&config).await?;

    Ok(GuideAgent::from_config(
        Arc::new(runtime),
        Arc::new(store),
        &config,
    ))
}

/// Ask one question, or chat when no message is given
pub async fn ask_command(message: Option<String>) -> Result<()> {
    let agent = build_agent().await?;

    if let Some(msg) = message {
        let answer = agent.answer_user_query(&Query::new(msg)).await;
        println!("\n{}", answer.answer);
        return Ok(());
    }

    println!("Interactive mode (type 'exit' to quit)");
    println!("----------------------------------------");
    println!("\n{}\n", GREETING);

    let mut history = vec![Turn::agent(GREETING)];

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        let query = Query::new(input).with_history(history.clone());
        let answer = agent.answer_user_query(&query).await;
        println!("\n{}\n", answer.answer);

        history.push(Turn::user(input));
        history.push(Turn::agent(answer.answer));
    }

    Ok(())
}

/// Check a symptom description before it reaches the guide
pub fn validate_symptoms(symptoms: &str) -> Result<&str> {
    let trimmed = symptoms.trim();
    if trimmed.chars().count() < MIN_SYMPTOMS_CHARS {
        anyhow::bail!("Please describe your query in at least 10 characters.");
    }
    Ok(trimmed)
}

/// Recommend plants and articles for the described symptoms
pub async fn recommend_command(symptoms: String) -> Result<()> {
    let symptoms = validate_symptoms(&symptoms)?;
    let agent = build_agent().await?;

    let answer = agent.answer_user_query(&Query::new(symptoms)).await;
    println!("\n{}", answer.answer);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_symptoms_too_short() {
        let err = validate_symptoms("  cough  ").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please describe your query in at least 10 characters."
        );
    }

    #[test]
    fn test_validate_symptoms_counts_chars() {
        assert_eq!(validate_symptoms(" dolor de cabeza ").unwrap(), "dolor de cabeza");
        assert!(validate_symptoms("náuseas").is_err());
        assert!(validate_symptoms("náuseas ya").is_ok());
    }

    #[test]
    fn test_filter_models() {
        let models = vec![
            ModelInfo {
                id: "google/gemini-2.0-flash-001".to_string(),
                name: None,
            },
            ModelInfo {
                id: "some/tiny-model".to_string(),
                name: Some("Tiny".to_string()),
            },
        ];
        let filtered = filter_models(models);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "google/gemini-2.0-flash-001");
    }
}
