//! Sign-in, sign-out and password command handlers.

use dialoguer::Input;
use secrecy::{ExposeSecret, SecretString};

use ridedesk_core::Console;
use ridedesk_core::models::{ApiMessage, OtpPurpose, PasswordChange};

use crate::cli::{GlobalOpts, LoginArgs, OtpKind, PasswordArgs, PasswordCommand};
use crate::config;
use crate::error::{CliError, prompt_err};

use super::util;

fn prompt_secret(label: &str) -> Result<SecretString, CliError> {
    let raw = rpassword::prompt_password(label).map_err(prompt_err)?;
    Ok(SecretString::from(raw))
}

fn print_message(reply: &ApiMessage, fallback: &str, global: &GlobalOpts) {
    if !global.quiet {
        eprintln!("✓ {}", reply.message.as_deref().unwrap_or(fallback));
    }
}

// ── Login / logout ──────────────────────────────────────────────────

pub async fn login(
    console: &Console,
    args: LoginArgs,
    profile: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let remembered = config::load_config_or_default()
        .profiles
        .get(profile)
        .and_then(|p| p.email_or_phone.clone());

    let who = match args.email_or_phone.or(remembered) {
        Some(who) => who,
        None => Input::new()
            .with_prompt("Email or phone")
            .interact_text()
            .map_err(prompt_err)?,
    };
    let password = prompt_secret("Password: ")?;

    let session = console.login(&who, &password).await?;

    if args.print_token {
        println!("{}", session.token.expose_secret());
    } else {
        config::store_token(profile, &session.token)?;
    }
    if !global.quiet {
        let name = session
            .user
            .full_name
            .as_deref()
            .or(session.user.email.as_deref())
            .unwrap_or(&who);
        eprintln!("✓ Signed in as {name} (profile '{profile}')");
    }
    Ok(())
}

/// Remove the keyring token for the active profile.
pub fn logout(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let profile = config::active_profile_name(global, &cfg);
    config::clear_token(&profile)?;
    if !global.quiet {
        eprintln!("✓ Signed out of profile '{profile}'");
    }
    Ok(())
}

// ── Password ────────────────────────────────────────────────────────

pub async fn password(
    console: &Console,
    args: PasswordArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PasswordCommand::Change => {
            let change = PasswordChange {
                current_password: prompt_secret("Current password: ")?,
                new_password: prompt_secret("New password: ")?,
            };
            let confirm = prompt_secret("Confirm new password: ")?;
            if confirm.expose_secret() != change.new_password.expose_secret() {
                return Err(CliError::Validation {
                    field: "newPassword".into(),
                    reason: "passwords do not match".into(),
                });
            }
            util::submit(console, &console.change_password(), change, global).await?;
            Ok(())
        }

        PasswordCommand::Forgot { email_or_phone } => {
            let reply = console.request_password_reset(&email_or_phone).await?;
            print_message(&reply, "Verification code sent", global);
            Ok(())
        }

        PasswordCommand::VerifyOtp {
            email,
            otp,
            purpose,
        } => {
            let purpose = match purpose {
                OtpKind::PasswordReset => OtpPurpose::PasswordReset,
                OtpKind::EmailVerification => OtpPurpose::EmailVerification,
            };
            let reply = console.verify_otp(&email, &otp, purpose).await?;
            print_message(&reply, "Code verified", global);
            Ok(())
        }

        PasswordCommand::Reset { email_or_phone } => {
            let new_password = prompt_secret("New password: ")?;
            let reply = console
                .reset_password(&email_or_phone, &new_password)
                .await?;
            print_message(&reply, "Password reset", global);
            Ok(())
        }
    }
}
