//! Typed extraction of the config tree.
//!
//! Both YAML and TOML are read into a `serde_json::Value` first so entries
//! can be either bare strings or `{path, tags}` objects, and so a missing
//! `tags` field stays distinguishable from an empty one.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

use super::{Config, PathEntry, PlatformSection, Shell, SystemPathsDirective, TagSpec};
use crate::{error::ConfigError, tags};

pub(super) fn config_from_value(root: &Value) -> Result<Config, ConfigError> {
    let map = match root {
        Value::Null => return Ok(Config::default()),
        Value::Object(map) => map,
        other => {
            return Err(ConfigError::NotAMapping {
                found: kind(other),
            })
        }
    };

    Ok(Config {
        all: section(map.get("all"), "all")?,
        linux: section(map.get("linux"), "linux")?,
        macos: section(map.get("macos"), "macos")?,
    })
}

fn section(value: Option<&Value>, name: &'static str) -> Result<PlatformSection, ConfigError> {
    let context = format!("{name} section");
    match value {
        None | Some(Value::Null) => Ok(PlatformSection::default()),
        // Older configs list paths directly under the section key.
        Some(Value::Array(items)) => Ok(PlatformSection {
            paths: entries(items, &context)?,
            ..PlatformSection::default()
        }),
        Some(Value::Object(map)) => section_from_map(map, name, &context),
        Some(other) => Err(ConfigError::InvalidSection {
            section: name,
            found: kind(other),
        }),
    }
}

fn section_from_map(
    map: &Map<String, Value>,
    name: &str,
    context: &str,
) -> Result<PlatformSection, ConfigError> {
    let tags = match map.get("tags") {
        None => Vec::new(),
        Some(v) => tag_list(v, &format!("{name} section tags"))?,
    };

    let paths = match map.get("paths") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => entries(items, context)?,
        Some(other) => {
            return Err(ConfigError::PathsNotAList {
                context: context.to_string(),
                found: kind(other),
            })
        }
    };

    let mut shells = BTreeMap::new();
    for (key, value) in map {
        if let Some(shell) = Shell::from_key(key) {
            let directive = directive(value, &format!("{key} settings in {name} section"))?;
            shells.insert(shell, directive);
        }
    }

    Ok(PlatformSection { tags, paths, shells })
}

fn entries(items: &[Value], context: &str) -> Result<Vec<PathEntry>, ConfigError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| entry(item, context, index))
        .collect()
}

fn entry(item: &Value, context: &str, index: usize) -> Result<PathEntry, ConfigError> {
    match item {
        Value::String(path) => Ok(PathEntry::new(path.as_str())),
        Value::Object(map) => {
            let path = map
                .get("path")
                .and_then(Value::as_str)
                .ok_or_else(|| ConfigError::MissingPath {
                    context: context.to_string(),
                    index,
                })?;

            let tags = match map.get("tags") {
                None => TagSpec::Inherit,
                Some(v) => {
                    let ctx = format!("{context} at index {index} (path: {path})");
                    TagSpec::Explicit(tag_list(v, &ctx)?)
                }
            };

            Ok(PathEntry {
                raw_path: path.to_string(),
                tags,
            })
        }
        _ => Err(ConfigError::InvalidEntry {
            context: context.to_string(),
            index,
        }),
    }
}

/// Validates a tag list: strings only, literal grammar, no case-insensitive
/// duplicates.
fn tag_list(value: &Value, context: &str) -> Result<Vec<String>, ConfigError> {
    let Value::Array(items) = value else {
        return Err(ConfigError::TagsNotAList {
            context: context.to_string(),
        });
    };

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let Value::String(tag) = item else {
            return Err(ConfigError::TagNotAString {
                context: context.to_string(),
                found: kind(item),
            });
        };

        if !seen.insert(tag.to_lowercase()) {
            return Err(ConfigError::DuplicateTag {
                tag: tag.clone(),
                context: context.to_string(),
            });
        }
        tags::validate_tag(tag).map_err(|source| ConfigError::InvalidTag {
            context: context.to_string(),
            source,
        })?;

        out.push(tag.clone());
    }
    Ok(out)
}

#[derive(Debug, Deserialize)]
struct RawDirective {
    #[serde(default)]
    include_system_paths: bool,
    #[serde(default)]
    include_system_paths_as: super::InjectedOrigin,
}

fn directive(value: &Value, context: &str) -> Result<SystemPathsDirective, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidDirective {
        context: context.to_string(),
        message,
    };

    let Value::Object(map) = value else {
        return Err(invalid(format!("expected a mapping, found {}", kind(value))));
    };

    let raw: RawDirective =
        serde_json::from_value(value.clone()).map_err(|e| invalid(e.to_string()))?;

    let tags = match map.get("tags") {
        None => TagSpec::Inherit,
        Some(v) => TagSpec::Explicit(tag_list(v, context)?),
    };

    Ok(SystemPathsDirective {
        include_system_paths: raw.include_system_paths,
        origin: raw.include_system_paths_as,
        tags,
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
