//! Command dispatch: bridges CLI args -> console screens and mutations ->
//! output formatting.

pub mod account;
pub mod commissions;
pub mod config_cmd;
pub mod drivers;
pub mod notifications;
pub mod promo;
pub mod rides;
pub mod services;
pub mod stats;
pub mod users;
pub mod util;
pub mod vehicles;

use ridedesk_core::Console;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an API-bound command to the appropriate handler.
///
/// `profile` names the profile the console was built from; login stores
/// its token under it.
pub async fn dispatch(
    cmd: Command,
    console: &Console,
    profile: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if requires_session(&cmd) && !console.is_signed_in() {
        return Err(CliError::NoCredentials {
            profile: profile.to_owned(),
        });
    }

    match cmd {
        Command::Login(args) => account::login(console, args, profile, global).await,
        Command::Password(args) => account::password(console, args, global).await,
        Command::Stats => stats::handle(console, global).await,
        Command::Drivers(args) => drivers::handle(console, args, global).await,
        Command::Requests(args) => drivers::handle_requests(console, args, global).await,
        Command::Vehicles(args) => vehicles::handle(console, args, global).await,
        Command::Services(args) => services::handle(console, args, global).await,
        Command::Promo(args) => promo::handle(console, args, global).await,
        Command::Commissions(args) => commissions::handle(console, args, global).await,
        Command::Rides(args) => rides::handle(console, args, global).await,
        Command::Users(args) => users::handle(console, args, global).await,
        Command::Notifications(args) => notifications::handle(console, args, global).await,
        // Handled before a console is built
        Command::Logout | Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

/// Everything except sign-in and password recovery needs a token.
fn requires_session(cmd: &Command) -> bool {
    use crate::cli::PasswordCommand;

    match cmd {
        Command::Login(_) => false,
        Command::Password(args) => matches!(args.command, PasswordCommand::Change),
        _ => true,
    }
}
