//! `ridedesk config`: edit profiles without touching the backend.

use std::fmt::Write;

use dialoguer::{Confirm, Input};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::{CliError, prompt_err};
use crate::output;

fn describe(cfg: &Config) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Config file:      {}", config::config_path().display());
    let _ = writeln!(out, "Default profile:  {}", cfg.default_profile_name());
    let _ = writeln!(
        out,
        "Defaults:         output={} color={} timeout={}",
        cfg.defaults.output, cfg.defaults.color, cfg.defaults.timeout
    );
    for name in cfg.profile_names() {
        let _ = writeln!(out, "\n[{name}]");
        for (key, value) in cfg.profiles[&name].entries() {
            let _ = writeln!(out, "  {key:<17} = {value}");
        }
    }
    out.trim_end().to_owned()
}

fn say(global: &GlobalOpts, line: &str) {
    if !global.quiet {
        eprintln!("✓ {line}");
    }
}

/// Ask for a profile name, backend URL and optional login. `None` when the
/// user declines to overwrite an existing profile.
fn wizard(cfg: &Config) -> Result<Option<(String, Profile)>, CliError> {
    let name: String = Input::new()
        .with_prompt("Profile name")
        .default(cfg.default_profile_name().to_owned())
        .interact_text()
        .map_err(prompt_err)?;

    let existing = cfg.profiles.get(&name);
    if existing.is_some()
        && !Confirm::new()
            .with_prompt(format!("Replace profile '{name}'?"))
            .default(false)
            .interact()
            .map_err(prompt_err)?
    {
        return Ok(None);
    }

    let mut profile = Profile::default();
    loop {
        let url: String = Input::new()
            .with_prompt("Admin API URL")
            .default(existing.map_or_else(|| "http://localhost:5000".into(), |p| p.api_url.clone()))
            .interact_text()
            .map_err(prompt_err)?;
        match profile.set("api_url", url.trim()) {
            Ok(()) => break,
            Err(e) => eprintln!("  {e}"),
        }
    }

    let login: String = Input::new()
        .with_prompt("Admin email or phone (optional)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    if !login.trim().is_empty() {
        profile.set("email_or_phone", login.trim())?;
    }
    Ok(Some((name, profile)))
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();

    match args.command {
        ConfigCommand::Init => {
            eprintln!("Writing {}\n", config::config_path().display());
            let Some((name, profile)) = wizard(&cfg)? else {
                return Ok(());
            };
            cfg.profiles.insert(name.clone(), profile);
            if cfg.profiles.len() == 1 || cfg.default_profile.is_none() {
                cfg.default_profile = Some(name.clone());
            }
            config::save_config(&cfg)?;
            say(global, &format!("Profile '{name}' saved. Sign in with: ridedesk login -p {name}"));
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = cfg.redacted();
            let out = output::render_single(global.output, &cfg, describe, |c| {
                c.default_profile_name().to_owned()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let name = config::active_profile_name(global, &cfg);
            let is_url = matches!(key.as_str(), "api_url" | "api-url");
            // A profile comes into existence with its URL.
            if !is_url {
                cfg.profile(&name)?;
            }
            cfg.profiles.entry(name.clone()).or_default().set(&key, &value)?;
            config::save_config(&cfg)?;
            say(global, &format!("Set {key} on profile '{name}'"));
            Ok(())
        }

        ConfigCommand::Profiles => {
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: ridedesk config init");
                return Ok(());
            }
            let default = cfg.default_profile_name();
            for name in cfg.profile_names() {
                let marker = if name == default { " *" } else { "" };
                println!("{name}{marker}");
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            cfg.profile(&name)?;
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            say(global, &format!("Default profile set to '{name}'"));
            Ok(())
        }
    }
}
