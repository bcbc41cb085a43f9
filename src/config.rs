//! Configuration management for Marginalia

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::anchor::{
    RelocatorConfig, DEFAULT_CONTEXT_LENGTH, DEFAULT_MATCH_TIMEOUT_MS, DEFAULT_SNIPPET_LENGTH,
};
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub anchor: AnchorConfig,
    pub limits: LimitsConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnchorConfig {
    /// Characters of context captured on each side of a selection
    pub context_length: usize,
    /// Snippet length used to size the relocation scan window
    pub snippet_length: usize,
    /// Time budget for one relocation, in milliseconds
    pub match_timeout_ms: u64,
    /// Fall back to a normalized quote search when the exact scan misses
    pub quote_fallback: bool,
    /// Relocations run concurrently when placing a page of comments
    pub relocate_concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    pub max_selected_chars: usize,
    pub max_context_chars: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            anchor: AnchorConfig {
                context_length: DEFAULT_CONTEXT_LENGTH,
                snippet_length: DEFAULT_SNIPPET_LENGTH,
                match_timeout_ms: DEFAULT_MATCH_TIMEOUT_MS,
                quote_fallback: false,
                relocate_concurrency: 4,
            },
            limits: LimitsConfig {
                max_selected_chars: 500,
                max_context_chars: 200,
            },
            database: DatabaseConfig {
                url: "sqlite:./marginalia.db".to_string(),
            },
        }
    }
}

impl Config {
    /// Load from the environment, falling back to defaults for unset keys
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let config = Config {
            anchor: AnchorConfig {
                context_length: parse_var(
                    "MARGINALIA_CONTEXT_LENGTH",
                    defaults.anchor.context_length,
                )?,
                snippet_length: parse_var(
                    "MARGINALIA_SNIPPET_LENGTH",
                    defaults.anchor.snippet_length,
                )?,
                match_timeout_ms: parse_var(
                    "MARGINALIA_MATCH_TIMEOUT_MS",
                    defaults.anchor.match_timeout_ms,
                )?,
                quote_fallback: parse_var(
                    "MARGINALIA_QUOTE_FALLBACK",
                    defaults.anchor.quote_fallback,
                )?,
                relocate_concurrency: parse_var(
                    "MARGINALIA_RELOCATE_CONCURRENCY",
                    defaults.anchor.relocate_concurrency,
                )?,
            },
            limits: LimitsConfig {
                max_selected_chars: parse_var(
                    "MARGINALIA_MAX_SELECTED_CHARS",
                    defaults.limits.max_selected_chars,
                )?,
                max_context_chars: parse_var(
                    "MARGINALIA_MAX_CONTEXT_CHARS",
                    defaults.limits.max_context_chars,
                )?,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject combinations that would produce anchors the limits refuse
    pub fn validate(&self) -> Result<()> {
        if self.anchor.context_length > self.limits.max_context_chars {
            return Err(AppError::Config(format!(
                "context length {} exceeds the {} character context limit",
                self.anchor.context_length, self.limits.max_context_chars
            )));
        }
        if self.anchor.relocate_concurrency == 0 {
            return Err(AppError::Config(
                "relocate concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Relocator settings derived from the anchor section
    pub fn relocator(&self) -> RelocatorConfig {
        RelocatorConfig {
            snippet_length: self.anchor.snippet_length,
            timeout: Duration::from_millis(self.anchor.match_timeout_ms),
            quote_fallback: self.anchor.quote_fallback,
        }
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: {:?}", key, raw))),
        Err(_) => Ok(default),
    }
}
