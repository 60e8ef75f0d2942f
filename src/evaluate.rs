use std::{fs, path::Path};

use crate::{
    config::{Config, InjectedOrigin, PathEntry, PlatformSection, SystemPathsDirective},
    context::EvaluationContext,
    resolve::resolve_path,
    system_paths::read_system_paths,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStatus {
    pub raw_path: String,
    pub path: String,
    /// Tags after inheritance.
    pub tags: Vec<String>,
    pub explicitly_tagged: bool,
    pub exists: bool,
    pub passes_filter: bool,
    pub filter_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Included,
    NotFound,
    FilteredByTags(String),
}

impl PathStatus {
    pub fn is_included(&self) -> bool {
        self.exists && self.passes_filter
    }

    /// A missing directory is reported as not found even when the filter
    /// would also have rejected it.
    pub fn classification(&self) -> Classification {
        if !self.exists {
            Classification::NotFound
        } else if !self.passes_filter {
            Classification::FilteredByTags(self.filter_reason.clone().unwrap_or_default())
        } else {
            Classification::Included
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub statuses: Vec<PathStatus>,
    /// System paths injected with environment origin, in file order.
    pub environment_injected: Vec<String>,
    /// Injected system paths (either origin) that exist on disk.
    pub injected_existing: usize,
}

impl Evaluation {
    /// `(included, skipped)` resolved paths.
    pub fn split(&self) -> (Vec<String>, Vec<String>) {
        let (included, skipped): (Vec<&PathStatus>, Vec<&PathStatus>) =
            self.statuses.iter().partition(|s| s.is_included());
        (
            included.into_iter().map(|s| s.path.clone()).collect(),
            skipped.into_iter().map(|s| s.path.clone()).collect(),
        )
    }
}

pub fn evaluate_entry(
    entry: &PathEntry,
    section_tags: &[String],
    ctx: &EvaluationContext,
) -> PathStatus {
    let path = resolve_path(&entry.raw_path, ctx.vars());
    let exists = dir_exists(&path);

    let tags = entry.tags.effective(section_tags).to_vec();
    let explicitly_tagged = entry.tags.is_explicit();
    let filter_reason = ctx.filter().skip_reason(&tags, explicitly_tagged);

    let status = PathStatus {
        raw_path: entry.raw_path.clone(),
        path,
        tags,
        explicitly_tagged,
        exists,
        passes_filter: filter_reason.is_none(),
        filter_reason,
    };

    tracing::debug!(
        path = %status.path,
        exists = status.exists,
        passes_filter = status.passes_filter,
        "evaluated entry"
    );
    status
}

/// Global section (unless platform-only), then the platform section, then
/// system paths injected with config origin.
pub fn evaluate_config(config: &Config, ctx: &EvaluationContext) -> Evaluation {
    let mut sections: Vec<&PlatformSection> = Vec::with_capacity(2);
    if !ctx.platform_only() {
        sections.push(&config.all);
    }
    sections.push(config.platform_section(ctx.platform()));

    let mut eval = Evaluation::default();

    for section in &sections {
        for entry in &section.paths {
            eval.statuses.push(evaluate_entry(entry, &section.tags, ctx));
        }
    }

    if let Some((section, directive)) = injection_directive(&sections, ctx) {
        let system_paths = read_system_paths(ctx.system_root());

        match directive.origin {
            InjectedOrigin::System => {
                for raw in &system_paths {
                    let path = resolve_path(raw, ctx.vars());
                    if dir_exists(&path) {
                        eval.injected_existing += 1;
                    }
                    eval.environment_injected.push(path);
                }
            }
            InjectedOrigin::Config => {
                for raw in &system_paths {
                    let entry = PathEntry {
                        raw_path: raw.clone(),
                        tags: directive.tags.clone(),
                    };
                    let status = evaluate_entry(&entry, &section.tags, ctx);
                    if status.exists {
                        eval.injected_existing += 1;
                    }
                    eval.statuses.push(status);
                }
            }
        }
    }

    tracing::info!(
        entries = eval.statuses.len(),
        injected = eval.environment_injected.len(),
        "evaluated config"
    );
    eval
}

/// The enabled directive for the active shell. The platform section's wins
/// over the global one; system paths are injected at most once.
fn injection_directive<'a>(
    sections: &[&'a PlatformSection],
    ctx: &EvaluationContext,
) -> Option<(&'a PlatformSection, &'a SystemPathsDirective)> {
    sections
        .iter()
        .rev()
        .find_map(|&s| s.system_paths_for(ctx.shell()).map(|d| (s, d)))
}

/// Any stat error counts as missing.
fn dir_exists(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    fs::metadata(Path::new(path))
        .map(|m| m.is_dir())
        .unwrap_or(false)
}
