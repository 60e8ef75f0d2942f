use anyhow::{Context as _, Result};

use crate::{
    cli::{Args, Command},
    config::Config,
    context::ContextEnv,
    emit::Emitter,
    evaluate::evaluate_config,
    report::{dry_run_report, dump},
    scope::resolve,
};

/// Runs the selected command and returns what should go to stdout.
///
/// Selection flags are validated before the config is read.
pub fn run(args: &Args, env: &ContextEnv) -> Result<String> {
    let ctx = env.evaluation_context(&args.overrides())?;
    let config_path = env.locate_config(args.config.as_deref())?;

    let config = Config::load_from_path(&config_path)
        .with_context(|| format!("while loading {}", config_path.display()))?;
    tracing::info!(path = %config_path.display(), "loaded config");

    let evaluation = evaluate_config(&config, &ctx);
    let resolution = resolve(&evaluation, ctx.path_var(), ctx.scope_options());

    let out = match args.selected_command() {
        Command::Init => {
            let line = Emitter::new(ctx.shell()).path_export(&resolution.values(), resolution.deferred);
            format!("{line}\n")
        }
        Command::DryRun => dry_run_report(&config_path, &ctx, &evaluation, &resolution),
        Command::Dump { format } => dump(&resolution.values(), format)?,
    };
    Ok(out)
}
