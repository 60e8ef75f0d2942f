use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{
    config::{default_config_path, Platform, Shell},
    error::{Error, Result, SelectionError},
    scope::{Prune, Scope, ScopeOptions},
    tags::TagFilter,
};

/// Snapshot of the process environment, taken once per invocation.
#[derive(Debug, Clone)]
pub struct ContextEnv {
    vars: BTreeMap<String, String>,
}

/// Selection flags as given on the command line, before validation.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub shell: Option<String>,
    pub os: Option<String>,
    pub tags_include: Option<String>,
    pub tags_exclude: Option<String>,
    pub scope: Scope,
    pub prune: Prune,
    pub defer_env: bool,
    pub platform_only: bool,
}

impl ContextEnv {
    pub fn from_process() -> Self {
        Self::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(mut vars: BTreeMap<String, String>) -> Self {
        let has_home = vars.get("HOME").is_some_and(|h| !h.trim().is_empty());
        if !has_home {
            if let Some(home) = dirs::home_dir() {
                vars.insert("HOME".to_string(), home.to_string_lossy().into_owned());
            }
        }
        Self { vars }
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Config path precedence:
    /// 1) CLI --config (must exist)
    /// 2) PATHUNI_CONFIG (must exist)
    /// 3) $XDG_CONFIG_HOME/pathuni/my_paths.yaml, else ~/.config/pathuni/my_paths.yaml
    pub fn locate_config(&self, cli_config: Option<&Path>) -> Result<PathBuf> {
        if let Some(p) = cli_config {
            return existing(p.to_path_buf(), "--config");
        }

        if let Some(p) = self.env_path("PATHUNI_CONFIG") {
            return existing(p, "PATHUNI_CONFIG");
        }

        Ok(default_config_path(self.var("XDG_CONFIG_HOME")))
    }

    /// Validates the overrides against this environment.
    pub fn evaluation_context(&self, o: &Overrides) -> Result<EvaluationContext> {
        let (shell, shell_inferred) = match o.shell.as_deref() {
            Some(name) => (parse_shell(name)?, false),
            None => (detect_shell(&self.vars)?, true),
        };

        let (platform, platform_inferred) = match o.os.as_deref() {
            Some(name) => (parse_platform(name)?, false),
            None => {
                let detected = Platform::detect().ok_or_else(|| SelectionError::UnsupportedPlatform {
                    name: std::env::consts::OS.to_string(),
                    supported: Platform::supported_names(),
                })?;
                (detected, true)
            }
        };

        let filter = TagFilter::parse(
            o.tags_include.as_deref().unwrap_or(""),
            o.tags_exclude.as_deref().unwrap_or(""),
        )?;

        let ctx = EvaluationContext::new(platform, shell, self.vars.clone())
            .with_filter(filter)
            .with_platform_only(o.platform_only)
            .with_scope(o.scope, o.prune, o.defer_env)
            .map_err(Error::from)?;

        Ok(EvaluationContext {
            shell_inferred,
            platform_inferred,
            ..ctx
        })
    }

    fn env_path(&self, key: &str) -> Option<PathBuf> {
        self.vars
            .get(key)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    }
}

/// Everything an evaluation needs; immutable once built.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    platform: Platform,
    platform_inferred: bool,
    shell: Shell,
    shell_inferred: bool,
    filter: TagFilter,
    scope: ScopeOptions,
    platform_only: bool,
    system_root: PathBuf,
    vars: BTreeMap<String, String>,
}

impl EvaluationContext {
    pub fn new(platform: Platform, shell: Shell, vars: BTreeMap<String, String>) -> Self {
        Self {
            platform,
            platform_inferred: false,
            shell,
            shell_inferred: false,
            filter: TagFilter::default(),
            scope: ScopeOptions {
                scope: Scope::default(),
                prune: Prune::default(),
                defer_env: false,
            },
            platform_only: false,
            system_root: PathBuf::from("/"),
            vars,
        }
    }

    pub fn with_filter(mut self, filter: TagFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_platform_only(mut self, platform_only: bool) -> Self {
        self.platform_only = platform_only;
        self
    }

    /// Root under which `etc/paths` and `etc/paths.d` are read.
    pub fn with_system_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.system_root = root.into();
        self
    }

    /// Deferring the environment only makes sense when merging, and a
    /// symbolic PATH cannot be pruned.
    pub fn with_scope(
        mut self,
        scope: Scope,
        prune: Prune,
        defer_env: bool,
    ) -> std::result::Result<Self, SelectionError> {
        if defer_env {
            if scope != Scope::Merged {
                return Err(SelectionError::DeferRequiresMerged(scope));
            }
            if prune.prunes_environment() {
                return Err(SelectionError::DeferWithEnvironmentPrune(prune));
            }
        }
        self.scope = ScopeOptions {
            scope,
            prune,
            defer_env,
        };
        Ok(self)
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn platform_inferred(&self) -> bool {
        self.platform_inferred
    }

    pub fn shell(&self) -> Shell {
        self.shell
    }

    pub fn shell_inferred(&self) -> bool {
        self.shell_inferred
    }

    pub fn filter(&self) -> &TagFilter {
        &self.filter
    }

    pub fn scope_options(&self) -> ScopeOptions {
        self.scope
    }

    pub fn platform_only(&self) -> bool {
        self.platform_only
    }

    pub fn system_root(&self) -> &Path {
        &self.system_root
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    pub fn path_var(&self) -> Option<&str> {
        self.vars.get("PATH").map(String::as_str)
    }
}

fn existing(path: PathBuf, origin: &'static str) -> Result<PathBuf> {
    if path.exists() {
        Ok(path)
    } else {
        Err(Error::ConfigNotFound { path, origin })
    }
}

fn parse_shell(name: &str) -> std::result::Result<Shell, SelectionError> {
    Shell::parse(name).ok_or_else(|| SelectionError::UnsupportedShell {
        name: name.trim().to_lowercase(),
        supported: Shell::supported_names(),
    })
}

fn parse_platform(name: &str) -> std::result::Result<Platform, SelectionError> {
    Platform::parse(name).ok_or_else(|| SelectionError::UnsupportedPlatform {
        name: name.to_string(),
        supported: Platform::supported_names(),
    })
}

/// `$SHELL` basename; bash when unset.
fn detect_shell(vars: &BTreeMap<String, String>) -> std::result::Result<Shell, SelectionError> {
    match vars.get("SHELL").map(|s| s.trim()).filter(|s| !s.is_empty()) {
        Some(sh) => {
            let base = Path::new(sh)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| sh.to_string());
            parse_shell(&base)
        }
        None => Ok(Shell::Bash),
    }
}
