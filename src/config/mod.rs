//! Application Configuration
//!
//! User settings and preferences stored in TOML format. Azure credentials
//! may come from the config file or from environment variables.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding the configured Azure endpoint.
pub const ENDPOINT_ENV: &str = "MENULENS_AZURE_ENDPOINT";
/// Environment variable overriding the configured Azure API key.
pub const API_KEY_ENV: &str = "MENULENS_AZURE_KEY";

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// OCR service connection
    pub ocr: OcrSettings,
    /// Image preparation before upload
    pub preprocess: PreprocessSettings,
    /// Defaults applied when importing parsed items into the store
    pub import: ImportSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ocr: OcrSettings::default(),
            preprocess: PreprocessSettings::default(),
            import: ImportSettings::default(),
        }
    }
}

/// Azure Document Intelligence connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrSettings {
    /// Resource endpoint, e.g. https://example.cognitiveservices.azure.com
    pub endpoint: String,
    /// API key; prefer the environment variable over storing it here
    pub api_key: Option<String>,
    /// Model to analyze with
    pub model_id: String,
    /// REST API version
    pub api_version: String,
    /// Delay between operation polls in milliseconds
    pub poll_interval_ms: u64,
    /// Overall analysis deadline in seconds
    pub timeout_secs: u64,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            model_id: "prebuilt-layout".to_string(),
            api_version: "2024-11-30".to_string(),
            poll_interval_ms: 750,
            timeout_secs: 60,
        }
    }
}

impl OcrSettings {
    /// Endpoint from the environment, falling back to the config file.
    pub fn resolved_endpoint(&self) -> Option<String> {
        resolve(ENDPOINT_ENV, &self.endpoint)
    }

    /// API key from the environment, falling back to the config file.
    pub fn resolved_api_key(&self) -> Option<String> {
        resolve(API_KEY_ENV, self.api_key.as_deref().unwrap_or(""))
    }
}

fn resolve(env_var: &str, configured: &str) -> Option<String> {
    if let Ok(value) = std::env::var(env_var) {
        if !value.is_empty() {
            return Some(value);
        }
    }
    if configured.is_empty() {
        None
    } else {
        Some(configured.to_string())
    }
}

/// Upload preprocessing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessSettings {
    /// Whether to preprocess at all
    pub enabled: bool,
    /// Images wider than this are downscaled (aspect preserved)
    pub max_width: u32,
    /// Convert to grayscale before upload
    pub grayscale: bool,
    /// JPEG re-encode quality (1 - 100)
    pub jpeg_quality: u8,
}

impl Default for PreprocessSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_width: 1200,
            grayscale: false,
            jpeg_quality: 80,
        }
    }
}

/// Defaults applied when importing parsed items into the menu store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSettings {
    /// Unit assigned to imported items
    pub default_unit: String,
    /// Image URL assigned to imported items
    pub placeholder_image: String,
    /// Items below this confidence are skipped at import time
    pub min_confidence: f32,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            default_unit: "kg".to_string(),
            placeholder_image:
                "https://images.unsplash.com/photo-1504674900247-0877df9cc836?w=400&h=400&fit=crop"
                    .to_string(),
            min_confidence: 0.0,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
