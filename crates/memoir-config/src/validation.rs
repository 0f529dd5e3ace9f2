// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: required credentials, the target
//! page, non-empty paths, and sane dialogue limits.

use crate::diagnostic::ConfigError;
use crate::model::MemoirConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &MemoirConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    require(&mut errors, "notion.page_id", "PAGE_ID", config.notion.page_id.as_deref());
    require(&mut errors, "notion.token", "NOTION_TOKEN", config.notion.token.as_deref());
    require(&mut errors, "openai.api_key", "OPENAI_API_KEY", config.openai.api_key.as_deref());

    if config.storage.history_path.trim().is_empty() {
        errors.push(invalid("storage.history_path", "must not be empty"));
    }

    if config.storage.knowledge_dir.trim().is_empty() {
        errors.push(invalid("storage.knowledge_dir", "must not be empty"));
    }

    if config.dialogue.trigger_token.trim().is_empty() {
        errors.push(invalid("dialogue.trigger_token", "must not be empty"));
    }

    if config.dialogue.capability_timeout_secs == 0 {
        errors.push(invalid("dialogue.capability_timeout_secs", "must be at least 1"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::Validation {
        key: key.to_string(),
        message: message.to_string(),
    }
}

/// Push a `MissingKey` error when `value` is absent or blank.
fn require(errors: &mut Vec<ConfigError>, key: &str, env_var: &str, value: Option<&str>) {
    if value.is_none_or(|v| v.trim().is_empty()) {
        errors.push(ConfigError::MissingKey {
            key: key.to_string(),
            env_var: env_var.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_config() -> MemoirConfig {
        let mut config = MemoirConfig::default();
        config.notion.page_id = Some("0123abcd".into());
        config.notion.token = Some("secret_abc".into());
        config.openai.api_key = Some("sk-test".into());
        config
    }

    #[test]
    fn complete_config_is_valid() {
        assert!(validate_config(&complete_config()).is_ok());
    }

    #[test]
    fn default_config_reports_every_missing_credential() {
        let errors = validate_config(&MemoirConfig::default()).unwrap_err();
        let keys: Vec<String> = errors
            .iter()
            .filter_map(|e| match e {
                ConfigError::MissingKey { key, .. } => Some(key.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(keys, vec!["notion.page_id", "notion.token", "openai.api_key"]);
    }

    #[test]
    fn blank_page_id_counts_as_missing() {
        let mut config = complete_config();
        config.notion.page_id = Some("   ".into());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], ConfigError::MissingKey { key, .. } if key == "notion.page_id"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut config = complete_config();
        config.dialogue.capability_timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            &errors[0],
            ConfigError::Validation { key, .. } if key == "dialogue.capability_timeout_secs"
        ));
    }

    #[test]
    fn empty_trigger_token_rejected() {
        let mut config = complete_config();
        config.dialogue.trigger_token = String::new();
        assert!(validate_config(&config).is_err());
    }
}
