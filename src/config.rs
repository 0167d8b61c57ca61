//! Environment-driven site configuration.

use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

use crate::notion::NotionConfig;
use crate::renderer::RenderOptions;

const DEFAULT_API_URL: &str = "https://api.notion.com/v1";
const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// Everything the binary needs, loaded once at startup.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub notion: NotionConfig,
    pub render: RenderOptions,
    /// Page rendered at `/sobre`.
    pub about_page_id: Option<String>,
    /// Page rendered at `/contato`.
    pub contact_page_id: Option<String>,
    pub port: u16,
}

impl SiteConfig {
    /// Read configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("NOTION_TOKEN").context("NOTION_TOKEN environment variable not set")?;
        let database_id = lookup("NOTION_DATABASE_ID")
            .context("NOTION_DATABASE_ID environment variable not set")?;

        let timeout_secs: u64 = parse_or(&lookup, "FETCH_TIMEOUT_SECS", 10)?;
        let fetch_timeout = Duration::from_secs(timeout_secs);

        let notion = NotionConfig {
            api_url: lookup("NOTION_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            version: lookup("NOTION_VERSION").unwrap_or_else(|| DEFAULT_NOTION_VERSION.to_string()),
            token,
            database_id,
            timeout: fetch_timeout,
        };

        let render = RenderOptions {
            fetch_timeout,
            max_depth: parse_or(&lookup, "RENDER_MAX_DEPTH", RenderOptions::default().max_depth)?,
        };

        Ok(Self {
            notion,
            render,
            about_page_id: lookup("NOTION_SOBRE_PAGE_ID").filter(|v| !v.is_empty()),
            contact_page_id: lookup("NOTION_CONTATO_PAGE_ID").filter(|v| !v.is_empty()),
            port: parse_or(&lookup, "PORT", 3000)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
