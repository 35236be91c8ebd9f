use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pbx::cli;
use pbx::config::ConfigurationLoader;

#[derive(Parser, Debug)]
#[command(name = "pbx", version)]
#[command(about = "PayloadBuilder X - profile-driven interactive build shell")]
struct Args {
    /// Configuration file (default: ~/.pbx/config.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// History log to use instead of the configured one
    #[arg(long)]
    history_file: Option<PathBuf>,

    /// Diagnostic level for stderr logging and the transcript
    #[arg(long)]
    log_level: Option<String>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut loader = ConfigurationLoader::new(args.config.as_deref())?;
    if let Some(path) = &args.history_file {
        loader.config.paths.history_file = path.to_string_lossy().into_owned();
    }
    if let Some(level) = &args.log_level {
        loader.config.logging.log_level = level.clone();
    }

    let level = loader.config.logging.log_level.to_lowercase();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if args.no_color {
        colored::control::set_override(false);
    }

    cli::run(&loader)
}
