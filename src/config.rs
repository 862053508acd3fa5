//! Layered configuration.
//!
//! Priority (highest to lowest):
//! 1. `EXAM_PREP_*` environment variables (`__` separates sections)
//! 2. Explicit `--config` path
//! 3. Project file `./exam-prep.toml`
//! 4. Global file `~/.config/exam-prep/config.toml`
//! 5. Built-in defaults

use crate::ai::client::{ModelConfig, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::db::default_data_dir;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const PROJECT_CONFIG_FILE: &str = "exam-prep.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub database_file: String,
    /// Where exports land when the prompt gets a bare file name.
    pub export_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: "exam-prep.db".to_string(),
            export_dir: PathBuf::from("."),
        }
    }
}

impl StorageConfig {
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl AiConfig {
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            model: self.model.clone(),
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file_name: String,
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file_name: "exam-prep.log".to_string(),
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "password".to_string(),
        }
    }
}

impl AdminConfig {
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub ai: AiConfig,
    pub logging: LoggingConfig,
    pub admin: AdminConfig,
}

impl AppConfig {
    pub fn load(config_path: Option<&Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(global_config_path().as_deref(), Path::new(PROJECT_CONFIG_FILE), config_path)
            .extract()
            .map_err(Box::new)
    }

    fn figment(global: Option<&Path>, project: &Path, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if let Some(global) = global
            && global.exists()
        {
            figment = figment.merge(Toml::file(global));
        }
        if project.exists() {
            figment = figment.merge(Toml::file(project));
        }
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed("EXAM_PREP_").split("__"))
    }
}

pub fn global_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("exam-prep")
            .join("config.toml")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.admin.username, "admin");
        assert!(config.admin.verify("admin", "password"));
        assert!(!config.admin.verify("admin", "Password"));
        assert_eq!(config.ai.model, DEFAULT_MODEL);
        assert!(config.storage.database_path().ends_with("exam-prep.db"));
    }

    #[test]
    fn test_files_override_defaults_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("project.toml");
        let explicit = dir.path().join("explicit.toml");
        std::fs::write(&global, "[admin]\nusername = \"root\"\npassword = \"toor\"\n").unwrap();
        std::fs::write(&project, "[admin]\npassword = \"hunter2\"\n[logging]\nlevel = \"debug\"\n").unwrap();
        std::fs::write(&explicit, "[ai]\nmax_tokens = 512\n").unwrap();

        let config: AppConfig = AppConfig::figment(Some(&global), &project, Some(&explicit))
            .extract()
            .unwrap();
        assert_eq!(config.admin.username, "root");
        assert_eq!(config.admin.password, "hunter2");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.ai.max_tokens, 512);
        assert_eq!(config.ai.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config: AppConfig = AppConfig::figment(
            Some(&dir.path().join("nope.toml")),
            &dir.path().join("also-nope.toml"),
            None,
        )
        .extract()
        .unwrap();
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_model_config_from_ai_section() {
        let ai = AiConfig {
            model: "some/model".to_string(),
            temperature: 0.2,
            max_tokens: 100,
        };
        let model = ai.model_config();
        assert_eq!(model.model, "some/model");
        assert_eq!(model.max_tokens, Some(100));
    }
}
