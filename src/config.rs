//! Static request configuration
//!
//! One immutable value handed to the client at construction. It can be
//! built with `SourceConfig::default()` or loaded from TOML; every field
//! has a default so partial files work.

use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::error::{Result, SourceError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Display name, also used as the fallback scanlator
    #[serde(default = "default_source_name")]
    pub source_name: String,
    /// Origin every endpoint and relative image URL is resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept")]
    pub accept: String,
    /// Referer header; `<base_url>/` when unset
    #[serde(default)]
    pub referer: Option<String>,
    /// `limit` sent to the paginated API endpoints
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Upper bound on chapter listing pages fetched for one title
    #[serde(default = "default_max_chapter_pages")]
    pub max_chapter_pages: u32,
    /// Global per-request timeout of the default transport
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_source_name() -> String {
    "Comix".to_string()
}

fn default_base_url() -> String {
    "https://comix.to".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_accept() -> String {
    "application/json, text/html, */*".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_max_chapter_pages() -> u32 {
    500
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            source_name: default_source_name(),
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            accept: default_accept(),
            referer: None,
            page_size: default_page_size(),
            max_chapter_pages: default_max_chapter_pages(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl SourceConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SourceError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SourceError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parsed base origin.
    pub fn base(&self) -> Result<Url> {
        let url = Url::parse(self.base_url.trim())
            .map_err(|e| SourceError::Config(format!("invalid base_url {:?}: {}", self.base_url, e)))?;
        if url.cannot_be_a_base() {
            return Err(SourceError::Config(format!(
                "base_url {:?} cannot be used as a base",
                self.base_url
            )));
        }
        Ok(url)
    }

    /// The fixed header set sent with every request.
    pub fn headers(&self) -> Vec<(String, String)> {
        let referer = self
            .referer
            .clone()
            .unwrap_or_else(|| format!("{}/", self.base_url.trim_end_matches('/')));

        vec![
            ("User-Agent".to_string(), self.user_agent.clone()),
            ("Accept".to_string(), self.accept.clone()),
            ("Referer".to_string(), referer),
        ]
    }
}
