// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Memoir configuration system.

use figment::Jail;
use memoir_config::diagnostic::ConfigError;
use memoir_config::{load_and_validate, load_and_validate_str, load_config_from_str};

const COMPLETE: &str = r#"
[agent]
log_level = "debug"

[openai]
api_key = "sk-test"
organization = "org-1"
chat_model = "gpt-4o-mini"

[notion]
token = "secret_abc"
page_id = "0123456789abcdef"

[storage]
history_path = "/tmp/memoir/history.json"
knowledge_dir = "/tmp/memoir/index"

[dialogue]
trigger_token = "保存"
retrieval_k = 4
history_window = 0
capability_timeout_secs = 15
include_placeholder = true
"#;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_memoir_config() {
    let config = load_and_validate_str(COMPLETE).expect("valid TOML should deserialize");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.openai.organization.as_deref(), Some("org-1"));
    assert_eq!(config.openai.chat_model, "gpt-4o-mini");
    assert_eq!(config.openai.embedding_model, "text-embedding-ada-002");
    assert_eq!(config.notion.page_id.as_deref(), Some("0123456789abcdef"));
    assert_eq!(config.notion.api_version, "2022-06-28");
    assert_eq!(config.storage.history_path, "/tmp/memoir/history.json");
    assert_eq!(config.storage.knowledge_dir, "/tmp/memoir/index");
    assert_eq!(config.dialogue.trigger_token, "保存");
    assert_eq!(config.dialogue.retrieval_k, 4);
    assert_eq!(config.dialogue.history_window, 0);
    assert_eq!(config.dialogue.capability_timeout_secs, 15);
    assert!(config.dialogue.include_placeholder);
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.log_level, "info");
    assert_eq!(config.openai.chat_model, "gpt-3.5-turbo");
    assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
    assert!(config.openai.max_tokens.is_none());
    assert!(config.notion.page_id.is_none());
    assert_eq!(config.storage.history_path, "memory.json");
    assert_eq!(config.storage.knowledge_dir, "vectorstore_index");
    assert_eq!(config.dialogue.trigger_token, "save");
    assert_eq!(config.dialogue.retrieval_k, 2);
    assert_eq!(config.dialogue.history_window, 20);
    assert_eq!(config.dialogue.capability_timeout_secs, 60);
    assert!(!config.dialogue.include_placeholder);
}

/// A config without a target page never validates.
#[test]
fn missing_page_id_is_missing_key() {
    let toml = r#"
[openai]
api_key = "sk-test"

[notion]
token = "secret_abc"
"#;
    let errors = load_and_validate_str(toml).expect_err("page id is required");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::MissingKey { key, env_var } => {
            assert_eq!(key, "notion.page_id");
            assert_eq!(env_var, "PAGE_ID");
        }
        other => panic!("expected MissingKey, got {other:?}"),
    }
}

/// Unknown field produces an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_field_in_notion_suggests_correction() {
    let toml = r#"
[notion]
page_di = "abc"
"#;
    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            span,
            ..
        } => {
            assert_eq!(key, "page_di");
            assert_eq!(suggestion.as_deref(), Some("page_id"));
            assert!(span.is_some(), "unknown key should point into the source");
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Wrong value type is reported rather than coerced, pointing at the line.
#[test]
fn wrong_type_for_retrieval_k() {
    let toml = r#"
[dialogue]
retrieval_k = "two"
"#;
    let errors = load_and_validate_str(toml).expect_err("string is not a usize");
    match &errors[0] {
        ConfigError::InvalidType {
            key, env_var, span, ..
        } => {
            assert_eq!(key, "dialogue.retrieval_k");
            assert_eq!(env_var, &None);
            let span = span.as_ref().expect("inline source has a span");
            assert_eq!(&toml[span.offset()..span.offset() + span.len()], "retrieval_k");
        }
        other => panic!("expected InvalidType, got {other:?}"),
    }
}

/// A bad `MEMOIR_*` value names the variable instead of a file line.
#[test]
fn wrong_type_from_env_names_variable() {
    Jail::expect_with(|jail| {
        jail.set_env("MEMOIR_DIALOGUE_RETRIEVAL_K", "two");

        let errors = load_and_validate().expect_err("string is not a usize");
        match &errors[0] {
            ConfigError::InvalidType { key, env_var, .. } => {
                assert_eq!(key, "dialogue.retrieval_k");
                assert_eq!(env_var.as_deref(), Some("MEMOIR_DIALOGUE_RETRIEVAL_K"));
            }
            other => panic!("expected InvalidType, got {other:?}"),
        }
        Ok(())
    });
}

/// A misspelled section in a `MEMOIR_*` variable suggests the real one.
#[test]
fn misspelled_env_section_suggests_variable() {
    Jail::expect_with(|jail| {
        jail.set_env("MEMOIR_DIALOG_RETRIEVAL_K", "2");

        let errors = load_and_validate().expect_err("no such section");
        match &errors[0] {
            ConfigError::UnknownEnvVar {
                variable,
                suggestion,
            } => {
                assert_eq!(variable, "MEMOIR_DIALOG_RETRIEVAL_K");
                assert_eq!(suggestion.as_deref(), Some("MEMOIR_DIALOGUE_RETRIEVAL_K"));
            }
            other => panic!("expected UnknownEnvVar, got {other:?}"),
        }
        Ok(())
    });
}

/// Conventional unprefixed variables supply credentials and the page.
#[test]
fn legacy_env_vars_fill_credentials() {
    Jail::expect_with(|jail| {
        jail.set_env("OPENAI_API_KEY", "sk-env");
        jail.set_env("NOTION_TOKEN", "secret_env");
        jail.set_env("PAGE_ID", "page-from-env");

        let config = load_and_validate().expect("env vars complete the config");
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.notion.token.as_deref(), Some("secret_env"));
        assert_eq!(config.notion.page_id.as_deref(), Some("page-from-env"));
        Ok(())
    });
}

/// `MEMOIR_*` variables win over the unprefixed ones and over memoir.toml.
#[test]
fn prefixed_env_overrides_file_and_legacy_env() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "memoir.toml",
            r#"
[notion]
page_id = "page-from-file"
token = "secret_file"

[openai]
api_key = "sk-file"

[dialogue]
retrieval_k = 3
"#,
        )?;
        jail.set_env("PAGE_ID", "page-from-legacy");
        jail.set_env("MEMOIR_NOTION_PAGE_ID", "page-from-prefixed");
        jail.set_env("MEMOIR_DIALOGUE_HISTORY_WINDOW", "5");

        let config = load_and_validate().expect("layered config should validate");
        assert_eq!(config.notion.page_id.as_deref(), Some("page-from-prefixed"));
        assert_eq!(config.notion.token.as_deref(), Some("secret_file"));
        assert_eq!(config.dialogue.retrieval_k, 3);
        assert_eq!(config.dialogue.history_window, 5);
        Ok(())
    });
}
