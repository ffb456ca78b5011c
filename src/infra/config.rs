use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::domain::entities::record::FieldNames;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sheet: SheetConfig,
    pub google: GoogleConfig,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub name_column: String,
    pub category_column: String,
    pub revenue_column: String,
    pub api_base: String,
    pub public_base: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        let fields = FieldNames::default();
        Self {
            spreadsheet_id: String::new(),
            sheet_name: "Company List".to_string(),
            name_column: fields.name,
            category_column: fields.category,
            revenue_column: fields.revenue,
            api_base: "https://sheets.googleapis.com".to_string(),
            public_base: "https://docs.google.com".to_string(),
        }
    }
}

impl SheetConfig {
    pub fn field_names(&self) -> FieldNames {
        FieldNames {
            name: self.name_column.clone(),
            category: self.category_column.clone(),
            revenue: self.revenue_column.clone(),
        }
    }
}

/// Either a ready bearer token or an OAuth refresh-token triple.
/// Kept out of `config.toml` by convention; prefer the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    pub access_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    pub token_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            client_id: None,
            client_secret: None,
            refresh_token: None,
            token_url: "https://oauth2.googleapis.com/token".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: crate::infra::gemini::client::DEFAULT_MODEL.to_string(),
            api_base: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("com", "hellhbbd", "company-sheet")
        .ok_or_else(|| anyhow!("unable to resolve config directory"))?;
    Ok(project_dirs.config_dir().join("config.toml"))
}

impl AppConfig {
    /// Reads the TOML file (missing file means defaults), then applies the
    /// process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => default_config_path()?,
        };
        let mut config = Self::from_file(&path)?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Blank environment values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(value) = get("SHEET_ID") {
            self.sheet.spreadsheet_id = value;
        }
        if let Some(value) = get("SHEET_NAME") {
            self.sheet.sheet_name = value;
        }
        if let Some(value) = get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY")) {
            self.gemini.api_key = Some(value);
        }
        if let Some(value) = get("GEMINI_MODEL") {
            self.gemini.model = value;
        }
        if let Some(value) = get("GOOGLE_ACCESS_TOKEN") {
            self.google.access_token = Some(value);
        }
        if let Some(value) = get("GOOGLE_OAUTH_CLIENT_ID") {
            self.google.client_id = Some(value);
        }
        if let Some(value) = get("GOOGLE_OAUTH_CLIENT_SECRET") {
            self.google.client_secret = Some(value);
        }
        if let Some(value) = get("GOOGLE_OAUTH_REFRESH_TOKEN") {
            self.google.refresh_token = Some(value);
        }
    }
}
