use anyhow::Result;
use clap::Parser;

use pathuni::{cli::Args, logging, ContextEnv};

fn main() -> Result<()> {
    let args = Args::parse();
    let env = ContextEnv::from_process();

    logging::setup_logging(env.var(logging::LOG_ENV), args.verbose);

    let out = pathuni::commands::run(&args, &env)?;
    print!("{out}");
    Ok(())
}
