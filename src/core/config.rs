use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::services::llm::LlmConfig;

const CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_input")]
    pub input_folder: String,

    #[serde(default = "default_output")]
    pub output_folder: String,

    /// Where the native credential store keeps its file.
    #[serde(default = "default_data")]
    pub data_folder: String,

    #[serde(default)]
    pub unattended: bool,

    /// Language the character descriptions are written in.
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub llm: LlmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_folder: default_input(),
            output_folder: default_output(),
            data_folder: default_data(),
            unattended: false,
            language: default_language(),
            llm: LlmConfig::default(),
        }
    }
}

fn default_input() -> String {
    "input".to_string()
}
fn default_output() -> String {
    "output".to_string()
}
fn default_data() -> String {
    ".character-lock".to_string()
}
fn default_language() -> String {
    "Vietnamese".to_string()
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("{} not found. Please create one.", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn load_or_create() -> Result<Self> {
        let path = Path::new(CONFIG_FILE);
        if !path.exists() {
            log::info!("{} not found, writing defaults", CONFIG_FILE);
            let config = Config::default();
            config.save()?;
            return Ok(config);
        }
        Self::load_from(path)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(content)?)
    }

    pub fn save(&self) -> Result<()> {
        let content = serde_yaml_ng::to_string(self)?;
        fs::write(CONFIG_FILE, content).context("Failed to write config.yml")?;
        Ok(())
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.input_folder)?;
        fs::create_dir_all(&self.output_folder)?;
        fs::create_dir_all(&self.data_folder)?;
        Ok(())
    }

    pub fn export_path(&self) -> String {
        Path::new(&self.output_folder)
            .join(crate::core::lock::EXPORT_FILE_NAME)
            .to_string_lossy()
            .to_string()
    }

    pub fn credential_path(&self) -> String {
        Path::new(&self.data_folder)
            .join(crate::services::credential::CREDENTIAL_KEY)
            .to_string_lossy()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::parse("unattended: true\n").unwrap();
        assert!(config.unattended);
        assert_eq!(config.input_folder, "input");
        assert_eq!(config.output_folder, "output");
        assert_eq!(config.language, "Vietnamese");
        assert_eq!(config.llm.provider, "gemini");
        assert!(config.export_path().ends_with("characters.json"));
        assert!(config.credential_path().ends_with("gemini-api-key"));
    }

    #[test]
    fn test_provider_sections_parse() {
        let yaml = r#"
language: English
llm:
  provider: openai
  openai:
    model: gpt-4o-mini
    base_url: http://localhost:8080/v1
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.language, "English");
        assert_eq!(config.llm.provider, "openai");
        let openai = config.llm.openai.as_ref().unwrap();
        assert_eq!(openai.model, "gpt-4o-mini");
        assert_eq!(openai.base_url.as_deref(), Some("http://localhost:8080/v1"));
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("config.yml")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "output_folder: out\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.output_folder, "out");
    }
}
