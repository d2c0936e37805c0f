use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::network::Endpoint;

const BLUEPRINT: &str = include_str!("../moodshelf.toml");

#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    pub gemini_model: String,
    pub api_base_url: String,
    pub gemini_api_key: Option<String>,
    pub prompt_for_api_key: bool,
    pub catalog_path: Option<String>,
    pub log_file: Option<String>,
    pub log_level: String,
}

impl Settings {
    /// Loads the layered configuration.
    pub fn new(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let user_config_path = get_user_config_path();
        let mut settings = Self::load(user_config_path.as_deref(), Some(Path::new("moodshelf.toml")), explicit)?;
        if settings.gemini_api_key.is_none() {
            settings.gemini_api_key = std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());
        }
        Ok(settings)
    }

    fn load(user: Option<&Path>, local: Option<&Path>, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        // 1. Compiled-in defaults.
        let mut builder = Config::builder().add_source(File::from_str(BLUEPRINT, FileFormat::Toml));
        // 2. User config and 3. working-directory override, both optional.
        for path in [user, local].into_iter().flatten() {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }
        // 4. Explicit --config must exist.
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }
        let s = builder
            .add_source(Environment::with_prefix("MOODSHELF"))
            .build()?;
        let settings: Settings = s.try_deserialize()?;
        debug!(model = %settings.gemini_model, "settings loaded");
        Ok(settings)
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            base_url: self.api_base_url.clone(),
            model: self.gemini_model.clone(),
            api_key: self.gemini_api_key.clone(),
        }
    }

    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.catalog_path.as_deref().map(expand)
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_file.as_deref().map(expand).or_else(|| {
            dirs::cache_dir().map(|mut p| {
                p.push("moodshelf");
                p.push("moodshelf.log");
                p
            })
        })
    }

    pub fn needs_api_key_prompt(&self) -> bool {
        self.prompt_for_api_key && self.gemini_api_key.as_deref().is_none_or(str::is_empty)
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Writes the default config to `path` unless a file is already there.
/// Returns whether a file was written.
pub fn create_blueprint_if_missing(path: &Path) -> std::io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, BLUEPRINT)?;
    Ok(true)
}

pub fn get_user_config_path() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".config");
    path.push("moodshelf");
    path.push("moodshelf.toml");
    Some(path)
}

fn update_user_config(key: &str, value: toml::Value) -> Result<(), anyhow::Error> {
    let user_config_path =
        get_user_config_path().ok_or_else(|| anyhow::anyhow!("could not determine home directory"))?;
    update_config_file(&user_config_path, key, value)
}

fn update_config_file(path: &Path, key: &str, value: toml::Value) -> Result<(), anyhow::Error> {
    let config_str = fs::read_to_string(path).unwrap_or_default();
    let mut doc = config_str.parse::<toml::Table>()?;

    doc.insert(key.to_string(), value);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, doc.to_string())?;

    Ok(())
}

pub fn save_api_key(api_key: &str) -> Result<(), anyhow::Error> {
    update_user_config("gemini_api_key", toml::Value::String(api_key.to_string()))
}

pub fn disable_api_key_prompt() -> Result<(), anyhow::Error> {
    update_user_config("prompt_for_api_key", toml::Value::Boolean(false))
}
