mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use ridedesk_core::Console;

use crate::cli::{Cli, Command, NotificationsCommand};
use crate::error::CliError;

/// Takes precedence over `RUST_LOG`.
const LOG_ENV: &str = "RIDEDESK_LOG";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Logs go to stderr so `-o json` output stays pipeable. `-v` raises only
/// the workspace crates; HTTP internals stay at `warn` unless asked for.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "warn,ridedesk={level},ridedesk_core={level},ridedesk_api={level},ridedesk_config={level}"
            ))
        });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity > 1)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let global = cli.global;
    match cli.command {
        Command::Config(args) => commands::config_cmd::handle(args, &global),
        Command::Logout => commands::account::logout(&global),
        Command::Completions(args) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "ridedesk", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let (profile, console_config) = config::build_console_config(&global)?;
            let console = Console::new(console_config)?;
            console.start().await;
            tracing::debug!(command = ?cmd, %profile, "dispatching");

            // `notifications watch` ends on Ctrl-C by itself. Anything else
            // is abandoned, but the console is still shut down.
            let watching = matches!(
                &cmd,
                Command::Notifications(args) if matches!(args.command, NotificationsCommand::Watch)
            );
            let work = commands::dispatch(cmd, &console, &profile, &global);
            let result = if watching {
                work.await
            } else {
                tokio::select! {
                    result = work => result,
                    _ = tokio::signal::ctrl_c() => Err(CliError::Interrupted),
                }
            };
            console.shutdown().await;
            result
        }
    }
}
