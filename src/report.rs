use clap::ValueEnum;
use std::{collections::BTreeMap, path::Path};

use crate::{
    context::EvaluationContext,
    emit::Emitter,
    error::{Error, Result},
    evaluate::Evaluation,
    scope::{Origin, Resolution, SkipReason, SkippedPath},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DumpFormat {
    /// One path per line
    #[default]
    Plain,
    /// {"PATH": [...]}
    Json,
    /// PATH: [...]
    Yaml,
}

pub fn dump(paths: &[String], format: DumpFormat) -> Result<String> {
    let doc = BTreeMap::from([("PATH", paths)]);
    match format {
        DumpFormat::Plain => Ok(paths.iter().map(|p| format!("{p}\n")).collect()),
        DumpFormat::Json => serde_json::to_string(&doc)
            .map(|s| s + "\n")
            .map_err(|e| Error::Dump {
                format: "json",
                message: e.to_string(),
            }),
        DumpFormat::Yaml => serde_yaml_ng::to_string(&doc).map_err(|e| Error::Dump {
            format: "yaml",
            message: e.to_string(),
        }),
    }
}

/// The human-readable "what would happen and why" report.
pub fn dry_run_report(
    config_path: &Path,
    ctx: &EvaluationContext,
    evaluation: &Evaluation,
    resolution: &Resolution,
) -> String {
    let mut out = String::new();

    push_line(&mut out, &format!("Evaluating: {}\n", config_path.display()));
    let os = format!("OS    : {} ({})", ctx.platform(), label(ctx.platform_inferred()));
    push_line(&mut out, &os);
    let shell = format!("Shell : {} ({})", ctx.shell(), label(ctx.shell_inferred()));
    push_line(&mut out, &shell);
    push_line(&mut out, &format!("Flags : {}\n", flags_line(ctx)));

    let included = resolution.paths.len();
    if included > 0 {
        let heading = plural(included, "Included Path", "Included Paths");
        push_line(&mut out, &format!("{included} {heading}:"));
        for p in &resolution.paths {
            push_line(&mut out, &format!("  {} {}", included_marker(p.origin), p.path));
        }
        out.push('\n');
    }

    let skipped = resolution.skipped.len();
    if skipped > 0 {
        let heading = plural(skipped, "Skipped Path", "Skipped Paths");
        push_line(&mut out, &format!("{skipped} {heading}:"));
        for s in &resolution.skipped {
            out.push_str(&render_skipped(s));
            out.push('\n');
        }
        out.push('\n');
    }

    push_line(
        &mut out,
        &format!("{included} {} included in total", plural(included, "path", "paths")),
    );
    push_breakdown(
        &mut out,
        resolution.included_from(Origin::Config),
        resolution.included_from(Origin::Environment),
    );

    if evaluation.injected_existing > 0 {
        push_line(
            &mut out,
            &format!(
                "* Including {} system {} due to include_system_paths setting",
                evaluation.injected_existing,
                plural(evaluation.injected_existing, "path", "paths")
            ),
        );
    }

    out.push_str(&format!("{skipped} skipped in total"));
    if ctx.platform_only() {
        out.push_str(" *\n* Not including paths from 'all' section due to --platform-only\n");
    } else {
        out.push('\n');
    }
    push_breakdown(
        &mut out,
        resolution.skipped_from(Origin::Config),
        resolution.skipped_from(Origin::Environment),
    );

    if included > 0 || resolution.deferred {
        let line = Emitter::new(ctx.shell()).path_export(&resolution.values(), resolution.deferred);
        out.push_str(&format!("\nOutput would be:\n  {line}\n"));
    }

    out
}

/// Tree rendering of one skipped entry.
pub fn render_skipped(s: &SkippedPath) -> String {
    match (&s.reason, s.origin) {
        (SkipReason::NotFound, Origin::Config) => format!("  [!] {} (not found)", s.path),
        (SkipReason::NotFound, Origin::Environment) => format!("  [?] {} (not found)", s.path),
        (SkipReason::Tags(reason), _) => {
            let mut out = format!("  [-] {}", s.path);
            out.push_str(&reason_tree(std::slice::from_ref(reason)));
            out
        }
    }
}

fn reason_tree(reasons: &[String]) -> String {
    let mut out = String::new();
    for (i, reason) in reasons.iter().enumerate() {
        let branch = if i + 1 == reasons.len() { '└' } else { '├' };
        out.push_str(&format!("\n       {branch}{reason}"));
    }
    out
}

fn included_marker(origin: Origin) -> &'static str {
    match origin {
        Origin::Config => "[+]",
        Origin::Environment => "[.]",
    }
}

fn flags_line(ctx: &EvaluationContext) -> String {
    let opts = ctx.scope_options();
    let mut flags = vec![format!("scope={}", opts.scope), format!("prune={}", opts.prune)];
    if opts.defer_env {
        flags.push("defer-env".to_string());
    }
    if ctx.platform_only() {
        flags.push("platform-only".to_string());
    }
    let filter = ctx.filter();
    if !filter.include.is_empty() {
        flags.push(format!("include={}", filter.include));
    }
    if !filter.exclude.is_empty() {
        flags.push(format!("exclude={}", filter.exclude));
    }
    flags.join(" ")
}

/// Per-origin lines, only when both origins contribute.
fn push_breakdown(out: &mut String, config: usize, environment: usize) {
    if config == 0 || environment == 0 {
        return;
    }
    push_line(out, &format!("  {config} from config"));
    push_line(out, &format!("  {environment} from environment"));
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn label(inferred: bool) -> &'static str {
    if inferred {
        "inferred"
    } else {
        "specified"
    }
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}
