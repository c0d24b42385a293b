use std::fs::File;

use anyhow::{Context, Result};
use clap::Parser;

use amberbars::{app::App, cli::Args, ui};

fn main() -> Result<()> {
    let args = Args::parse();

    // The terminal belongs to the UI, so logs go to a file.
    let log_path = args.log_path();
    let log_file = File::create(&log_path)
        .with_context(|| format!("creating log file {}", log_path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    log::info!("starting in {}", args.dir.display());

    let config = args.config();
    let app = App::new(args.dir.clone(), &config)?;
    ui::run(app)
}
