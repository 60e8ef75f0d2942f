pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod emit;
pub mod error;
pub mod evaluate;
pub mod logging;
pub mod report;
pub mod resolve;
pub mod scope;
pub mod system_paths;
pub mod tags;

pub use config::{Config, Platform, Shell};
pub use context::{ContextEnv, EvaluationContext, Overrides};
pub use emit::Emitter;
pub use error::{Error, Result};
pub use evaluate::{evaluate_config, Evaluation, PathStatus};
pub use scope::{resolve, Origin, Prune, Resolution, Scope};
pub use tags::TagFilter;
