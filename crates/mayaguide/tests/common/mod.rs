//! Common test utilities for mayaguide integration tests
#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

/// Isolated home directory for one test
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub data_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = tempdir()?;
        let data_dir = temp_dir.path().join(".mayaguide");

        Ok(Self { temp_dir, data_dir })
    }

    pub fn data_file(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Command running against this environment's home directory
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_mayaguide"));
        cmd.env("HOME", self.temp_dir.path());
        cmd.env_remove("RUST_LOG");
        cmd
    }

    pub fn write_config(&self, config: &serde_json::Value) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::write(
            self.data_file("config.json"),
            serde_json::to_string_pretty(config)?,
        )?;
        Ok(())
    }

    /// Content file with two plants and one article
    pub fn write_content(&self) -> anyhow::Result<()> {
        let content = serde_json::json!({
            "plants": [
                {
                    "id": "p1",
                    "name": { "en": "Chaya", "es": "Chaya" },
                    "scientificName": "Cnidoscolus aconitifolius",
                    "description": { "en": "A leafy shrub.", "es": "Un arbusto." },
                    "createdAt": "2024-03-01T00:00:00Z"
                },
                {
                    "id": "p2",
                    "name": { "en": "Rue", "es": "Ruda" },
                    "description": { "en": "A bitter herb.", "es": "Una hierba amarga." },
                    "createdAt": "2024-05-01T00:00:00Z"
                }
            ],
            "articles": [
                {
                    "id": "b1",
                    "title": { "en": "Plants for restful sleep", "es": "Plantas para dormir" },
                    "content": { "en": "<p>Tea.</p>", "es": "<p>Té.</p>" }
                }
            ]
        });
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::write(
            self.data_file("content.json"),
            serde_json::to_string_pretty(&content)?,
        )?;
        Ok(())
    }
}
