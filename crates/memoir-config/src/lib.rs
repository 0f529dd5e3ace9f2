// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for Memoir.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and Elm-style diagnostic
//! error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use memoir_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("publishing to page {:?}", config.notion.page_id);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::MemoirConfig;

use tracing::debug;

/// Placeholder shown instead of secret values.
const REDACTED: &str = "<redacted>";

/// Load configuration from the XDG hierarchy and validate it.
///
/// 1. Loads config from TOML files + env vars via Figment
/// 2. On success: runs post-deserialization validation
/// 3. On Figment error: converts to rich miette diagnostics with typo suggestions
pub fn load_and_validate() -> Result<MemoirConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            debug!(
                history_path = %config.storage.history_path,
                knowledge_dir = %config.storage.knowledge_dir,
                "configuration loaded"
            );
            Ok(config)
        }
        Err(err) => {
            let toml_sources = collect_toml_sources();
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load configuration from a specific TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<MemoirConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![(diagnostic::INLINE_SOURCE.to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Render the effective configuration as TOML with credentials masked.
pub fn render_redacted(config: &MemoirConfig) -> String {
    let mut shown = config.clone();
    for secret in [&mut shown.openai.api_key, &mut shown.notion.token] {
        if secret.is_some() {
            *secret = Some(REDACTED.to_string());
        }
    }
    toml::to_string_pretty(&shown).unwrap_or_else(|e| format!("# failed to render config: {e}\n"))
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut sources = Vec::new();

    if let Ok(content) = std::fs::read_to_string(loader::LOCAL_CONFIG_FILE) {
        let path = std::env::current_dir()
            .map(|d| d.join(loader::LOCAL_CONFIG_FILE).display().to_string())
            .unwrap_or_else(|_| loader::LOCAL_CONFIG_FILE.to_string());
        sources.push((path, content));
    }

    if let Some(path) = loader::user_config_path()
        && let Ok(content) = std::fs::read_to_string(&path)
    {
        sources.push((path.display().to_string(), content));
    }

    let system_path = std::path::Path::new(loader::SYSTEM_CONFIG_PATH);
    if let Ok(content) = std::fs::read_to_string(system_path) {
        sources.push((system_path.display().to_string(), content));
    }

    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacted_render_hides_credentials() {
        let mut config = MemoirConfig::default();
        config.openai.api_key = Some("sk-live-123".into());
        config.notion.token = Some("secret_456".into());
        config.notion.page_id = Some("page-789".into());

        let rendered = render_redacted(&config);
        assert!(!rendered.contains("sk-live-123"));
        assert!(!rendered.contains("secret_456"));
        assert!(rendered.contains("page-789"));
        assert!(rendered.contains(REDACTED));
    }

    #[test]
    fn redacted_render_leaves_absent_secrets_absent() {
        let rendered = render_redacted(&MemoirConfig::default());
        assert!(!rendered.contains(REDACTED));
    }
}
