//! Scope and prune resolution: combining evaluated config entries with the
//! live search path into one ordered, deduplicated list.

use clap::ValueEnum;
use std::{collections::HashSet, fmt, fs, path::Path};

use crate::{
    evaluate::{Evaluation, PathStatus},
    resolve::clean_path,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Scope {
    /// Only entries from the config file
    #[default]
    #[value(alias = "pathuni")]
    Config,
    /// Only the live PATH (plus system paths injected as environment)
    #[value(alias = "system")]
    Environment,
    /// Config entries first, then the live PATH
    #[value(alias = "full")]
    Merged,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scope::Config => "config",
            Scope::Environment => "environment",
            Scope::Merged => "merged",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Prune {
    /// Keep missing directories from both sources
    #[value(name = "none")]
    KeepAll,
    /// Drop missing config entries
    #[default]
    #[value(name = "config", alias = "pathuni")]
    DropMissingConfig,
    /// Drop missing PATH entries
    #[value(name = "environment", alias = "system")]
    DropMissingEnvironment,
    /// Drop missing entries from both sources
    #[value(name = "all", alias = "both")]
    DropMissingBoth,
}

impl Prune {
    pub fn prunes_config(self) -> bool {
        matches!(self, Prune::DropMissingConfig | Prune::DropMissingBoth)
    }

    pub fn prunes_environment(self) -> bool {
        matches!(self, Prune::DropMissingEnvironment | Prune::DropMissingBoth)
    }
}

impl fmt::Display for Prune {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Prune::KeepAll => "none",
            Prune::DropMissingConfig => "config",
            Prune::DropMissingEnvironment => "environment",
            Prune::DropMissingBoth => "all",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Config,
    Environment,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Origin::Config => "config",
            Origin::Environment => "environment",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: String,
    pub origin: Origin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotFound,
    Tags(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPath {
    pub path: String,
    pub origin: Origin,
    pub reason: SkipReason,
}

/// Inputs for one resolution pass.
#[derive(Debug, Clone, Copy)]
pub struct ScopeOptions {
    pub scope: Scope,
    pub prune: Prune,
    pub defer_env: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub paths: Vec<ResolvedPath>,
    pub skipped: Vec<SkippedPath>,
    /// The rendered value ends with a reference to the runtime PATH.
    pub deferred: bool,
}

impl Resolution {
    pub fn values(&self) -> Vec<String> {
        self.paths.iter().map(|p| p.path.clone()).collect()
    }

    pub fn included_from(&self, origin: Origin) -> usize {
        self.paths.iter().filter(|p| p.origin == origin).count()
    }

    pub fn skipped_from(&self, origin: Origin) -> usize {
        self.skipped.iter().filter(|p| p.origin == origin).count()
    }
}

pub fn dedupe_preserve_order<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        let item = item.into();
        if seen.insert(item.clone()) {
            out.push(item);
        }
    }
    out
}

#[cfg(windows)]
pub const PATH_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const PATH_SEPARATOR: char = ':';

/// Splits a search-path value on the platform separator, dropping empty
/// segments.
pub fn split_path_list(value: &str) -> Vec<String> {
    value
        .split(PATH_SEPARATOR)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Live PATH entries followed by any system paths injected as environment.
/// Live entries are cleaned lexically, like config entries.
pub fn environment_paths(path_var: Option<&str>, injected: &[String]) -> Vec<String> {
    let live = path_var.map(split_path_list).unwrap_or_default();
    dedupe_preserve_order(
        live.iter()
            .map(|p| clean_path(p))
            .chain(injected.iter().cloned()),
    )
}

/// Config entries that make it into the output under `prune`.
///
/// Without config pruning, an entry that passes the filter is kept even when
/// its directory is missing.
pub fn config_paths(statuses: &[PathStatus], prune: Prune) -> Vec<String> {
    let kept = statuses.iter().filter(|s| {
        if prune.prunes_config() {
            s.is_included()
        } else {
            s.passes_filter
        }
    });
    dedupe_preserve_order(kept.map(|s| s.path.clone()))
}

pub fn filter_existing(paths: &[String]) -> Vec<String> {
    paths.iter().filter(|p| is_dir(p)).cloned().collect()
}

pub fn merge(config: &[String], environment: &[String], config_first: bool) -> Vec<String> {
    let (first, second) = if config_first {
        (config, environment)
    } else {
        (environment, config)
    };
    dedupe_preserve_order(first.iter().chain(second).cloned())
}

pub fn resolve(evaluation: &Evaluation, path_var: Option<&str>, opts: ScopeOptions) -> Resolution {
    let mut res = Resolution {
        deferred: opts.defer_env,
        ..Resolution::default()
    };

    let mut config = Vec::new();
    if matches!(opts.scope, Scope::Config | Scope::Merged) {
        config = config_paths(&evaluation.statuses, opts.prune);
        res.skipped.extend(config_skips(&evaluation.statuses, &config));
    }

    let mut environment = Vec::new();
    if matches!(opts.scope, Scope::Environment | Scope::Merged) {
        if opts.defer_env {
            // The live PATH stays symbolic; only injected entries are spelled out.
            environment = dedupe_preserve_order(evaluation.environment_injected.iter().cloned());
        } else {
            environment = environment_paths(path_var, &evaluation.environment_injected);
            if opts.prune.prunes_environment() {
                let existing = filter_existing(&environment);
                res.skipped.extend(
                    environment
                        .iter()
                        .filter(|p| !existing.contains(p))
                        .map(|p| SkippedPath {
                            path: p.clone(),
                            origin: Origin::Environment,
                            reason: SkipReason::NotFound,
                        }),
                );
                environment = existing;
            }
        }
    }

    res.paths = merge(&config, &environment, true)
        .into_iter()
        .map(|path| {
            let origin = if config.contains(&path) {
                Origin::Config
            } else {
                Origin::Environment
            };
            ResolvedPath { path, origin }
        })
        .collect();

    tracing::debug!(
        scope = %opts.scope,
        prune = %opts.prune,
        included = res.paths.len(),
        skipped = res.skipped.len(),
        "resolved search path"
    );
    res
}

fn config_skips<'a>(
    statuses: &'a [PathStatus],
    kept: &'a [String],
) -> impl Iterator<Item = SkippedPath> + 'a {
    statuses
        .iter()
        .filter(move |s| !kept.contains(&s.path))
        .map(|s| SkippedPath {
            path: s.path.clone(),
            origin: Origin::Config,
            reason: match &s.filter_reason {
                Some(reason) if s.exists => SkipReason::Tags(reason.clone()),
                _ => SkipReason::NotFound,
            },
        })
}

fn is_dir(p: &str) -> bool {
    fs::metadata(Path::new(p)).map(|m| m.is_dir()).unwrap_or(false)
}
