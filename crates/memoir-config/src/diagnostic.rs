// SPDX-FileCopyrightText: 2026 Memoir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics rendered through miette.
//!
//! Figment errors are traced back to where the bad value came from: a line in
//! `memoir.toml` gets a source span, a `MEMOIR_*` variable gets named with the
//! variable that would have been right.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::loader::ENV_PREFIX;

/// Name under which an in-memory TOML document is registered for spans.
pub const INLINE_SOURCE: &str = "<inline>";

/// Minimum Jaro-Winkler similarity score to suggest a correction.
/// Catches typos like `page_di` -> `page_id` while filtering noise.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A TOML key that no section accepts.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(memoir::config::unknown_key),
        help("{}", format_unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A `MEMOIR_*` variable that maps to no configuration key.
    #[error("unknown environment variable `{variable}`")]
    #[diagnostic(
        code(memoir::config::unknown_env),
        help("{}", format_unknown_env_help(suggestion.as_deref()))
    )]
    UnknownEnvVar {
        variable: String,
        suggestion: Option<String>,
    },

    /// A value that does not deserialize into its field.
    #[error("invalid value for `{key}`: {detail}")]
    #[diagnostic(
        code(memoir::config::invalid_type),
        help("{}", format_invalid_type_help(expected, env_var.as_deref()))
    )]
    InvalidType {
        /// Dotted key, e.g. `dialogue.retrieval_k`.
        key: String,
        detail: String,
        expected: String,
        /// Set when the value came from a `MEMOIR_*` variable.
        env_var: Option<String>,
        #[label("expected {expected}")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A credential or the target page is absent.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(memoir::config::missing_key),
        help("set `{key}` in memoir.toml or export {env_var}")
    )]
    MissingKey {
        key: String,
        /// The unprefixed variable that can supply it.
        env_var: String,
    },

    /// A well-typed value outside its allowed range.
    #[error("invalid value for `{key}`: {message}")]
    #[diagnostic(
        code(memoir::config::validation),
        help("fix `{key}` in memoir.toml or export {}", env_var_name(key))
    )]
    Validation { key: String, message: String },

    /// Malformed TOML and anything else figment reports.
    #[error("could not read configuration: {0}")]
    #[diagnostic(code(memoir::config::parse))]
    Other(String),
}

fn format_unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

fn format_unknown_env_help(suggestion: Option<&str>) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`?"),
        None => format!("variables take the form {ENV_PREFIX}<SECTION>_<KEY>"),
    }
}

fn format_invalid_type_help(expected: &str, env_var: Option<&str>) -> String {
    match env_var {
        Some(var) => format!("{var} must be {expected}"),
        None => format!("expected {expected}"),
    }
}

/// The `MEMOIR_*` variable that sets a dotted key.
pub fn env_var_name(key: &str) -> String {
    format!("{ENV_PREFIX}{}", key.replace('.', "_").to_ascii_uppercase())
}

/// Where the value behind a figment error was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin<'a> {
    File(&'a std::path::Path),
    Inline,
    Env,
    Unknown,
}

fn origin(error: &figment::Error) -> Origin<'_> {
    let Some(metadata) = error.metadata.as_ref() else {
        return Origin::Unknown;
    };
    if let Some(figment::Source::File(path)) = &metadata.source {
        return Origin::File(path);
    }
    if metadata.name.ends_with("environment variable(s)") {
        Origin::Env
    } else if metadata.name.ends_with("source string") {
        Origin::Inline
    } else {
        Origin::Unknown
    }
}

/// Convert a `figment::Error` into one diagnostic per underlying error.
///
/// `toml_sources` pairs each file path (or [`INLINE_SOURCE`]) with its text
/// so file-borne errors can point at the offending line.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.clone();
            match &error.kind {
                Kind::UnknownField(field, expected) if origin(&error) == Origin::Env => {
                    let section = section_of(&path, field);
                    ConfigError::UnknownEnvVar {
                        variable: env_var_name(&join_key(section, field)),
                        suggestion: suggest_env_var(section, field, expected),
                    }
                }
                Kind::UnknownField(field, expected) => {
                    let section = section_of(&path, field);
                    let (span, src) = find_source_span(&error, section, field, toml_sources);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::InvalidType(actual, expected) | Kind::InvalidValue(actual, expected) => {
                    let key = path.join(".");
                    let (section, field) = match path.split_last() {
                        Some((field, section)) => (section, field.as_str()),
                        None => (&path[..0], ""),
                    };
                    let (span, src) = find_source_span(&error, section, field, toml_sources);
                    let env_var = (origin(&error) == Origin::Env).then(|| env_var_name(&key));
                    ConfigError::InvalidType {
                        detail: format!("found {actual}"),
                        expected: expected.clone(),
                        env_var,
                        key,
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// The error path ends with the offending key; the rest is its section.
fn section_of<'a>(path: &'a [String], field: &str) -> &'a [String] {
    match path.split_last() {
        Some((last, section)) if last == field => section,
        _ => path,
    }
}

fn join_key(section: &[String], field: &str) -> String {
    section
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(field))
        .collect::<Vec<_>>()
        .join(".")
}

/// Suggest the variable the user probably meant.
///
/// Inside a section the field is matched against that section's keys. At the
/// top level the variable is split at each `_` and the head matched against
/// section names, so `MEMOIR_DIALOG_RETRIEVAL_K` suggests
/// `MEMOIR_DIALOGUE_RETRIEVAL_K`.
fn suggest_env_var(section: &[String], field: &str, expected: &[&str]) -> Option<String> {
    if !section.is_empty() {
        return suggest_key(field, expected).map(|key| env_var_name(&join_key(section, &key)));
    }
    field
        .match_indices('_')
        .find_map(|(at, _)| {
            let (head, rest) = (&field[..at], &field[at + 1..]);
            suggest_key(head, expected).map(|sec| env_var_name(&format!("{sec}.{rest}")))
        })
}

/// Locate `field` under `section` in the TOML text the error came from.
fn find_source_span(
    error: &figment::Error,
    section: &[String],
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let name = match origin(error) {
        Origin::File(path) => path.display().to_string(),
        Origin::Inline => INLINE_SOURCE.to_string(),
        Origin::Env | Origin::Unknown => return (None, None),
    };

    toml_sources
        .iter()
        .find(|(path, _)| *path == name)
        .and_then(|(path, content)| {
            let offset = find_key_offset(content, section, field)?;
            Some((
                Some(SourceSpan::new(offset.into(), field.len())),
                Some(NamedSource::new(path, content.clone())),
            ))
        })
        .unwrap_or((None, None))
}

/// Find the byte offset of a key in TOML content, relative to a section path.
///
/// For `path = ["notion"]` and `field = "page_di"`, finds the `[notion]` header
/// then searches for `page_di` after it. For top-level fields, searches from start.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    if field.is_empty() {
        return None;
    }
    let search_start = match path.first() {
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header)? + header.len()
        }
        None => 0,
    };

    let mut byte_offset = 0;
    for line in content[search_start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') && byte_offset > 0 && !path.is_empty() {
            break;
        }
        if let Some(after) = trimmed.strip_prefix(field)
            && after.trim_start().starts_with('=')
        {
            return Some(search_start + byte_offset + (line.len() - trimmed.len()));
        }
        byte_offset += line.len();
    }

    None
}

/// Suggest a similar key name using Jaro-Winkler string similarity.
///
/// Returns the best match above the similarity threshold, or `None` if
/// no valid key is close enough to the unknown key.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    let mut best_score = SUGGESTION_THRESHOLD;
    let mut best_match = None;

    for &key in valid_keys {
        let score = strsim::jaro_winkler(unknown, key);
        if score > best_score {
            best_score = score;
            best_match = Some(key.to_string());
        }
    }

    best_match
}

/// Render a list of `ConfigError`s to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}
