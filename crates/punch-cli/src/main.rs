use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use punch_cli::{Cli, Commands, Config, render_chart, render_estimates};
use punch_core::Session;

/// Scan the repository, merge in configured clock markers, and build the
/// session timeline.
fn build_session(cli: &Cli) -> Result<Session> {
    let config = Config::load_from(&cli.path, cli.config.as_deref())
        .context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let filter = punch_git::DiffFilter::new(
        config.include_files.as_deref(),
        config.ignore_files.as_deref(),
    )
    .context("invalid file filter pattern")?;

    let commits = punch_git::scan_commits(&cli.path, &filter)
        .with_context(|| format!("failed to read repository at {}", cli.path.display()))?;
    tracing::debug!(commits = commits.len(), "scanned repository");

    let (clock_ins, clock_outs) = config.clock_marks();
    Ok(punch_core::run_pipeline(
        commits,
        clock_ins,
        clock_outs,
        cli.author.as_deref(),
        &config.session(),
    ))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let session = build_session(&cli)?;

    match cli.command {
        Some(Commands::Estimates) => print!("{}", render_estimates(&session)),
        Some(Commands::Chart { json: true, .. }) => {
            let rendered =
                serde_json::to_string_pretty(&session).context("failed to serialize session")?;
            println!("{rendered}");
        }
        Some(Commands::Chart { condensed, .. }) => {
            print!("{}", render_chart(&session, condensed));
        }
        None => print!("{}", render_chart(&session, false)),
    }

    Ok(())
}
