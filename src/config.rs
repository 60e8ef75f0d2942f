use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

mod parse;

pub fn default_config_path(xdg_config_home: Option<&str>) -> PathBuf {
    if let Some(xdg) = xdg_config_home.map(str::trim).filter(|s| !s.is_empty()) {
        return PathBuf::from(xdg).join("pathuni").join("my_paths.yaml");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".config").join("pathuni").join("my_paths.yaml");
    }
    PathBuf::from("pathuni/my_paths.yaml")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Shell {
    Bash,
    Zsh,
    Sh,
    Fish,
    Pwsh,
}

impl Shell {
    pub const ALL: [Shell; 5] = [Shell::Bash, Shell::Zsh, Shell::Sh, Shell::Fish, Shell::Pwsh];

    /// Accepts a shell name or a path to one (`/bin/zsh`); `pwsh` is an
    /// alias for `powershell`.
    pub fn parse(s: &str) -> Option<Self> {
        let name = s.trim().rsplit(['/', '\\']).next().unwrap_or("");
        let name = name.to_ascii_lowercase();
        Self::from_key(name.strip_suffix(".exe").unwrap_or(&name))
    }

    /// Exact shell name, as used for directive keys in the config file.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "bash" => Some(Self::Bash),
            "zsh" => Some(Self::Zsh),
            "sh" => Some(Self::Sh),
            "fish" => Some(Self::Fish),
            "powershell" | "pwsh" => Some(Self::Pwsh),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
            Shell::Sh => "sh",
            Shell::Fish => "fish",
            Shell::Pwsh => "powershell",
        }
    }

    pub fn supported_names() -> String {
        let mut names: Vec<&str> = Self::ALL.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        names.join(", ")
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    MacOs,
    Linux,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::MacOs, Platform::Linux];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "macos" | "darwin" => Some(Self::MacOs),
            "linux" => Some(Self::Linux),
            _ => None,
        }
    }

    /// The platform this binary was built for, if it has a config section.
    pub fn detect() -> Option<Self> {
        if cfg!(target_os = "macos") {
            Some(Self::MacOs)
        } else if cfg!(target_os = "linux") {
            Some(Self::Linux)
        } else {
            None
        }
    }

    /// Key of this platform's section in the config file.
    pub fn section_key(self) -> &'static str {
        match self {
            Platform::MacOs => "macos",
            Platform::Linux => "linux",
        }
    }

    pub fn supported_names() -> String {
        Self::ALL
            .iter()
            .map(|p| p.section_key())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::MacOs => f.write_str("macOS"),
            Platform::Linux => f.write_str("Linux"),
        }
    }
}

/// Whether an entry carried its own `tags` field.
///
/// `Explicit(vec![])` is not the same as `Inherit`: it opts the entry out of
/// the section defaults while still subjecting it to filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TagSpec {
    #[default]
    Inherit,
    Explicit(Vec<String>),
}

impl TagSpec {
    pub fn effective<'a>(&'a self, section_defaults: &'a [String]) -> &'a [String] {
        match self {
            TagSpec::Inherit => section_defaults,
            TagSpec::Explicit(tags) => tags,
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, TagSpec::Explicit(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    pub raw_path: String,
    pub tags: TagSpec,
}

impl PathEntry {
    pub fn new(raw_path: impl Into<String>) -> Self {
        Self {
            raw_path: raw_path.into(),
            tags: TagSpec::Inherit,
        }
    }

    pub fn with_tags<I, S>(raw_path: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            raw_path: raw_path.into(),
            tags: TagSpec::Explicit(tags.into_iter().map(Into::into).collect()),
        }
    }
}

/// How paths pulled from the system path-list files are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjectedOrigin {
    /// Merged with the environment paths, never filtered.
    #[default]
    #[serde(alias = "environment")]
    System,
    /// Evaluated like configured entries, tags and all.
    #[serde(alias = "pathuni")]
    Config,
}

/// Per-shell `include_system_paths` settings inside a section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemPathsDirective {
    pub include_system_paths: bool,
    pub origin: InjectedOrigin,
    pub tags: TagSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformSection {
    pub tags: Vec<String>,
    pub paths: Vec<PathEntry>,
    pub shells: BTreeMap<Shell, SystemPathsDirective>,
}

impl PlatformSection {
    /// The enabled directive for `shell`, if any.
    pub fn system_paths_for(&self, shell: Shell) -> Option<&SystemPathsDirective> {
        self.shells.get(&shell).filter(|d| d.include_system_paths)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }

    fn name(self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub all: PlatformSection,
    pub linux: PlatformSection,
    pub macos: PlatformSection,
}

impl Config {
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, ConfigFormat::from_path(path))
    }

    pub fn parse(text: &str, format: ConfigFormat) -> Result<Self> {
        if is_blank_document(text) {
            return Ok(Self::default());
        }

        let syntax = |message: String| Error::Syntax {
            format: format.name(),
            message,
        };

        let root: serde_json::Value = match format {
            ConfigFormat::Yaml => serde_yaml_ng::from_str(text).map_err(|e| syntax(e.to_string()))?,
            ConfigFormat::Toml => toml::from_str(text).map_err(|e| syntax(e.to_string()))?,
        };

        Ok(parse::config_from_value(&root)?)
    }

    pub fn platform_section(&self, platform: Platform) -> &PlatformSection {
        match platform {
            Platform::MacOs => &self.macos,
            Platform::Linux => &self.linux,
        }
    }
}

fn is_blank_document(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .all(|l| l.is_empty() || l.starts_with('#'))
}
