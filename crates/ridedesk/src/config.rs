//! Per-invocation configuration: the stored profile with `GlobalOpts`
//! flags (`--api-url`, `--token`, `--insecure`, `--timeout`) on top.

use secrecy::SecretString;

use ridedesk_core::{ConsoleConfig, TlsMode};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use ridedesk_config::{
    Config, Profile, clear_token, config_path, load_config, load_config_or_default,
    save_config, store_token,
};

/// `--profile`, else the config's default.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

/// Build the `ConsoleConfig` for this invocation and name the profile it
/// came from.
///
/// An explicit `--profile` must exist. Without one, a missing default
/// profile is fine as long as `--api-url` says where the backend is.
pub fn build_console_config(global: &GlobalOpts) -> Result<(String, ConsoleConfig), CliError> {
    let cfg = load_config()?;
    let name = active_profile_name(global, &cfg);

    let profile = match cfg.profile(&name) {
        Ok(profile) => profile.clone(),
        Err(err) if global.profile.is_some() => return Err(err.into()),
        Err(_) => {
            let raw = global.api_url.as_deref().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?;
            Profile::new(raw)
        }
    };
    let mut console = ridedesk_config::profile_to_console_config(&profile, &name, &cfg.defaults)?;

    if let Some(raw) = &global.api_url {
        console.api_url = raw.parse().map_err(|e| CliError::Validation {
            field: "--api-url".into(),
            reason: format!("'{raw}': {e}"),
        })?;
    }
    if let Some(token) = &global.token {
        console.token = Some(SecretString::from(token.clone()));
    }
    if global.insecure {
        console.transport.tls = TlsMode::DangerAcceptInvalid;
    }
    if let Some(raw) = &global.timeout {
        let current = console.transport.timeout;
        let timeout = ridedesk_config::parse_duration("--timeout", Some(raw.as_str()), current)?;
        console.transport = console.transport.with_timeout(timeout);
    }

    Ok((name, console))
}
