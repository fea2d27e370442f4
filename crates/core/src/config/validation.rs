//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Named groups a `job_pattern` override must define.
pub const JOB_PATTERN_GROUPS: [&str; 3] = ["id", "href", "title"];

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

/// True for a plain SQL identifier: ASCII letter or `_`, then letters,
/// digits or `_`.
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `endpoint` or `news_url` is empty or not http(s)
    /// - `envelope_field` or `user_agent` is empty
    /// - `table` is not a plain SQL identifier
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `news_limit` is 0
    /// - `container_pattern` does not compile
    /// - `job_pattern` does not compile or lacks a required named group
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("endpoint", &self.endpoint), ("news_url", &self.news_url)] {
            if value.trim().is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(invalid(field, "must be an http(s) URL"));
            }
        }

        if self.envelope_field.is_empty() {
            return Err(invalid("envelope_field", "must not be empty"));
        }

        if !is_sql_identifier(&self.table) {
            return Err(invalid("table", "must be a plain SQL identifier"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.news_limit == 0 {
            return Err(invalid("news_limit", "must be greater than 0"));
        }

        if let Some(pattern) = &self.container_pattern {
            regex::Regex::new(pattern).map_err(|e| invalid("container_pattern", e.to_string()))?;
        }

        if let Some(pattern) = &self.job_pattern {
            let re = regex::Regex::new(pattern).map_err(|e| invalid("job_pattern", e.to_string()))?;
            let names: Vec<&str> = re.capture_names().flatten().collect();
            for group in JOB_PATTERN_GROUPS {
                if !names.contains(&group) {
                    return Err(invalid("job_pattern", format!("missing named group `{group}`")));
                }
            }
        }

        Ok(())
    }
}
