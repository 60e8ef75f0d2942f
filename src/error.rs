use std::path::PathBuf;

use thiserror::Error;

use crate::scope::{Prune, Scope};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config file {}: {source}", path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{origin} points to a config file that does not exist: {}", path.display())]
    ConfigNotFound { path: PathBuf, origin: &'static str },

    #[error("failed to parse {format} config: {message}")]
    Syntax {
        format: &'static str,
        message: String,
    },

    #[error("failed to parse config: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid --tags-{side} flag: {source}")]
    Filter {
        side: &'static str,
        #[source]
        source: TagError,
    },

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("failed to render {format} dump: {message}")]
    Dump {
        format: &'static str,
        message: String,
    },
}

/// Tag syntax problems, shared by config parsing and filter parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("invalid tag '{0}': tags must be 3-20 characters, start with a letter, and contain only letters, numbers, and underscores")]
    InvalidLiteral(String),

    #[error("invalid wildcard pattern '{tag}': {message}")]
    InvalidPattern { tag: String, message: String },

    #[error("empty tag in filter '{0}'")]
    EmptyTag(String),

    #[error("invalid tag in filter '{expr}': {source}")]
    InFilter {
        expr: String,
        #[source]
        source: Box<TagError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("expected a mapping at the top level, found {found}")]
    NotAMapping { found: &'static str },

    #[error("invalid {section} section: expected a mapping or a list of paths, found {found}")]
    InvalidSection {
        section: &'static str,
        found: &'static str,
    },

    #[error("invalid 'paths' in {context}: expected a list, found {found}")]
    PathsNotAList {
        context: String,
        found: &'static str,
    },

    #[error("missing 'path' field in {context} at index {index}")]
    MissingPath { context: String, index: usize },

    #[error("invalid path entry in {context} at index {index}: expected string or object")]
    InvalidEntry { context: String, index: usize },

    #[error("invalid tags format in {context}: expected array")]
    TagsNotAList { context: String },

    #[error("invalid tag type in {context}: expected string, found {found}")]
    TagNotAString {
        context: String,
        found: &'static str,
    },

    #[error("duplicate tag '{tag}' in {context}")]
    DuplicateTag { tag: String, context: String },

    #[error("{source} in {context}")]
    InvalidTag {
        context: String,
        #[source]
        source: TagError,
    },

    #[error("invalid {context}: {message}")]
    InvalidDirective { context: String, message: String },
}

/// Rejected before any evaluation happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("unsupported shell '{name}'. Supported shells: {supported}")]
    UnsupportedShell { name: String, supported: String },

    #[error("unsupported OS '{name}'. Supported OSes: {supported}")]
    UnsupportedPlatform { name: String, supported: String },

    #[error("--defer-env requires --scope merged (got --scope {0})")]
    DeferRequiresMerged(Scope),

    #[error("--defer-env cannot be combined with --prune {0}: deferred environment paths are not expanded, so they cannot be pruned")]
    DeferWithEnvironmentPrune(Prune),
}
