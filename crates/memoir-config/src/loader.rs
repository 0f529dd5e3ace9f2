// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./memoir.toml` > `~/.config/memoir/memoir.toml` > `/etc/memoir/memoir.toml`
//! with environment variable overrides via the `MEMOIR_` prefix and the
//! conventional unprefixed credential variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    value::Uncased,
    Figment,
};

use crate::model::MemoirConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/memoir/memoir.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "memoir.toml";

/// Unprefixed variables honored for credentials and the target page.
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("OPENAI_API_KEY", "openai.api_key"),
    ("OPENAI_ORGANIZATION_ID", "openai.organization"),
    ("NOTION_TOKEN", "notion.token"),
    ("PAGE_ID", "notion.page_id"),
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/memoir/memoir.toml` (system-wide)
/// 3. `~/.config/memoir/memoir.toml` (user XDG config)
/// 4. `./memoir.toml` (local directory)
/// 5. `OPENAI_API_KEY`, `OPENAI_ORGANIZATION_ID`, `NOTION_TOKEN`, `PAGE_ID`
/// 6. `MEMOIR_*` environment variables
pub fn load_config() -> Result<MemoirConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<MemoirConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MemoirConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MemoirConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MemoirConfig::default()))
        .merge(Toml::file(path))
        .merge(legacy_env_provider())
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MemoirConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(legacy_env_provider())
        .merge(env_provider())
}

/// Path of the per-user config file, if the platform has a config dir.
pub fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("memoir").join(LOCAL_CONFIG_FILE))
}

/// Prefix of the environment variables that override any key.
pub(crate) const ENV_PREFIX: &str = "MEMOIR_";

/// Config sections addressable through `MEMOIR_<SECTION>_<KEY>`.
const ENV_SECTIONS: &[&str] = &["agent", "openai", "notion", "storage", "dialogue"];

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `MEMOIR_NOTION_PAGE_ID` must map to `notion.page_id`, not
/// `notion.page.id`. Figment lowercases keys only after `map` runs, so the
/// mapping sees the variable's original case.
pub(crate) fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| Uncased::from(section_key(key.as_str())))
}

/// Map `NOTION_PAGE_ID` (any case) to `notion.page_id`. Keys outside a known
/// section pass through lowercased so they surface as unknown-key errors.
pub(crate) fn section_key(key: &str) -> String {
    let lower = key.to_ascii_lowercase();
    ENV_SECTIONS
        .iter()
        .find_map(|section| {
            lower
                .strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|rest| format!("{section}.{rest}"))
        })
        .unwrap_or(lower)
}

/// Provider for the unprefixed credential variables.
///
/// Merged before [`env_provider`] so `MEMOIR_*` wins when both are set.
pub(crate) fn legacy_env_provider() -> Env {
    Env::raw()
        .only(&LEGACY_ENV_KEYS.iter().map(|(var, _)| *var).collect::<Vec<_>>())
        .map(|key| {
            let path = LEGACY_ENV_KEYS
                .iter()
                .find(|(var, _)| key.as_str().eq_ignore_ascii_case(var))
                .map(|(_, path)| *path)
                .unwrap_or_else(|| key.as_str());
            Uncased::from(path.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn section_key_maps_upper_case_variables() {
        assert_eq!(section_key("NOTION_PAGE_ID"), "notion.page_id");
        assert_eq!(section_key("DIALOGUE_HISTORY_WINDOW"), "dialogue.history_window");
        assert_eq!(section_key("openai_api_key"), "openai.api_key");
    }

    #[test]
    fn section_key_requires_whole_section_name() {
        assert_eq!(section_key("AGENTS_LOG_LEVEL"), "agents_log_level");
        assert_eq!(section_key("NOTION"), "notion");
    }

    #[test]
    fn prefixed_env_reaches_nested_keys() {
        Jail::expect_with(|jail| {
            jail.set_env("MEMOIR_NOTION_PAGE_ID", "page-env");
            jail.set_env("MEMOIR_STORAGE_HISTORY_PATH", "/tmp/history.json");
            jail.set_env("MEMOIR_DIALOGUE_RETRIEVAL_K", "4");

            let config: MemoirConfig = Figment::new()
                .merge(Serialized::defaults(MemoirConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.notion.page_id.as_deref(), Some("page-env"));
            assert_eq!(config.storage.history_path, "/tmp/history.json");
            assert_eq!(config.dialogue.retrieval_k, 4);
            Ok(())
        });
    }
}
