use clap::{ArgAction, Parser, Subcommand};
use commands::{check, probe, state, test_email, AppContext};
use showtime_config::PathManager;
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "showtime-watch")]
#[command(about = "Watch a cinema listing and send one email when showtimes open")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// State file, overriding the one named in the config
    #[arg(long, global = true, value_name = "PATH")]
    state_file: Option<PathBuf>,

    /// Also write logs to a daily-rotated file; `--log-file` alone uses the log directory
    #[arg(long, global = true, value_name = "PATH", num_args = 0..=1, require_equals = true)]
    log_file: Option<Option<PathBuf>>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the listing, notify on the unavailable -> available edge, save state
    #[command(long_about = "Run one monitoring cycle: load the saved status, probe the cinema listing in headless Chromium, send an email if showtimes just became available, and save the new status. Exits 0 whatever the probe or mail outcome so a scheduler keeps calling it.")]
    Check,

    /// Run the probe only and print its report (no state, no email)
    Probe,

    /// Show the saved state
    State {
        /// Reset to "unavailable, never seen"
        #[arg(long, action = ArgAction::SetTrue)]
        reset: bool,
    },

    /// Send a test message through the configured SMTP relay
    TestEmail,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = cli
        .log_file
        .clone()
        .map(|path| path.unwrap_or_else(|| PathManager::default().log_file()));
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);
    let ctx = AppContext::load(cli.config.as_deref(), cli.state_file.as_deref())?;

    match cli.command.unwrap_or(Commands::Check) {
        Commands::Check => check::run_check(&ctx, &output).await,
        Commands::Probe => probe::run_probe(&ctx, &output).await,
        Commands::State { reset } => state::run_state(&ctx, reset, &output),
        Commands::TestEmail => test_email::run_test_email(&ctx, &output).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_is_the_default_command() {
        let cli = Cli::try_parse_from(["showtime-watch"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(cli.command.unwrap_or(Commands::Check), Commands::Check));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "showtime-watch",
            "state",
            "--reset",
            "--state-file",
            "/tmp/state.json",
            "--output",
            "json-pretty",
            "-vv",
        ])
        .unwrap();

        assert!(matches!(cli.command, Some(Commands::State { reset: true })));
        assert_eq!(cli.state_file, Some(PathBuf::from("/tmp/state.json")));
        assert_eq!(cli.output, output::OutputFormat::JsonPretty);
        assert_eq!(cli.verbose, 2);
        assert!(cli.log_file.is_none());
    }

    #[test]
    fn test_log_file_without_value() {
        let cli = Cli::try_parse_from(["showtime-watch", "--log-file", "check"]).unwrap();
        assert_eq!(cli.log_file, Some(None));
        assert!(matches!(cli.command, Some(Commands::Check)));
    }
}
