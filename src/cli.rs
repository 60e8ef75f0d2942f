use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::{
    context::Overrides,
    report::DumpFormat,
    scope::{Prune, Scope},
};

#[derive(Parser, Debug)]
#[command(
    name = "pathuni",
    version,
    about = "Cross-platform PATH management for dotfiles",
    after_help = "Apply to the current shell with: eval \"$(pathuni)\""
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the config file (overrides PATHUNI_CONFIG and the XDG default)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Shell to render for: bash, zsh, sh, fish, powershell (default: from $SHELL)
    #[arg(long, global = true)]
    pub shell: Option<String>,

    /// Platform section to use: macos, linux (default: this machine)
    #[arg(long = "os", global = true)]
    pub os: Option<String>,

    /// Keep tagged paths matching this expression, e.g. "dev+work,audio"
    #[arg(long, global = true, value_name = "EXPR")]
    pub tags_include: Option<String>,

    /// Drop tagged paths matching this expression
    #[arg(long, global = true, value_name = "EXPR")]
    pub tags_exclude: Option<String>,

    /// Which paths to operate on
    #[arg(long, global = true, value_enum, default_value_t = Scope::Config)]
    pub scope: Scope,

    /// Which sources drop directories that do not exist
    #[arg(long, global = true, value_enum, default_value_t = Prune::DropMissingConfig)]
    pub prune: Prune,

    /// Reference the runtime PATH instead of expanding it (needs --scope merged)
    #[arg(long, global = true)]
    pub defer_env: bool,

    /// Skip the `all` section
    #[arg(long, global = true)]
    pub platform_only: bool,

    /// Debug logging on stderr (PATHUNI_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the PATH export line for the shell (default)
    Init,

    /// Show what would be included or skipped, and why
    #[command(name = "dry-run", alias = "eval")]
    DryRun,

    /// Print the resolved path list
    Dump {
        #[arg(long, value_enum, default_value_t = DumpFormat::Plain)]
        format: DumpFormat,
    },
}

impl Args {
    pub fn selected_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Init)
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            shell: self.shell.clone(),
            os: self.os.clone(),
            tags_include: self.tags_include.clone(),
            tags_exclude: self.tags_exclude.clone(),
            scope: self.scope,
            prune: self.prune,
            defer_env: self.defer_env,
            platform_only: self.platform_only,
        }
    }
}
