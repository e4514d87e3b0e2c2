//! Shared configuration for the ridedesk CLI.
//!
//! TOML profiles, token resolution (env + keyring + plaintext), and
//! translation to `ridedesk_core::ConsoleConfig`. Core never reads files;
//! the CLI layers its global flags on top of what this crate resolves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use ridedesk_core::{CacheConfig, ConsoleConfig, TlsMode, TransportConfig};

/// Keyring service name; entries are `<profile>/token`.
const KEYRING_SERVICE: &str = "ridedesk";

/// Fallback token variable consulted for every profile.
pub const TOKEN_ENV: &str = "RIDEDESK_TOKEN";

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "RIDEDESK_CONFIG";

/// Shown in place of plaintext tokens.
pub const REDACTED: &str = "********";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile {
        name: String,
        /// Configured profile names, sorted.
        known: Vec<String>,
    },

    #[error("no token stored for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("cannot read {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        source: Box<figment::Error>,
    },

    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot encode config: {0}")]
    Encode(#[from] toml::ser::Error),
}

impl From<keyring::Error> for ConfigError {
    fn from(err: keyring::Error) -> Self {
        Self::Keyring(err.to_string())
    }
}

// ── Config file ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    pub fn default_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    /// Configured profile names in display order.
    pub fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles.get(name).ok_or_else(|| ConfigError::UnknownProfile {
            name: name.into(),
            known: self.profile_names(),
        })
    }

    /// Copy safe to print: plaintext tokens are masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        for token in cfg.profiles.values_mut().filter_map(|p| p.token.as_mut()) {
            REDACTED.clone_into(token);
        }
        cfg
    }
}

/// Settings shared by every profile. Missing keys take the built-in value.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Defaults {
    /// `table`, `json`, `json-compact`, `yaml` or `plain`.
    pub output: String,
    /// `auto`, `always` or `never`.
    pub color: String,
    /// Request timeout as a humantime string (`30s`, `1m`).
    pub timeout: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: "table".into(),
            color: "auto".into(),
            timeout: "30s".into(),
        }
    }
}

/// One admin backend: where it lives, how to sign in, how to cache.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL; endpoint paths are joined onto it.
    pub api_url: String,

    /// Login suggested by `ridedesk login`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_or_phone: Option<String>,

    /// Plaintext bearer token. The keyring or an env var is preferred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable holding the bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// How long a fetched list counts as fresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_time: Option<String>,

    /// How long a list nobody watches stays cached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gc_time: Option<String>,

    /// Inbox refetch period for `notifications watch`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_poll: Option<String>,
}

impl Profile {
    /// Keys accepted by [`Profile::set`], in `config show` order.
    pub const KEYS: &'static [&'static str] = &[
        "api_url",
        "email_or_phone",
        "token_env",
        "ca_cert",
        "insecure",
        "timeout",
        "stale_time",
        "gc_time",
        "notification_poll",
    ];

    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Set one key from its string form, validating URLs, booleans and
    /// durations before anything is stored. Dashes and underscores are
    /// interchangeable in `key`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let key = key.replace('-', "_");
        let duration = |field: &str| -> Result<Option<String>, ConfigError> {
            parse_duration(field, Some(value), Duration::ZERO)?;
            Ok(Some(value.to_owned()))
        };
        match key.as_str() {
            "api_url" => {
                url::Url::parse(value).map_err(|e| ConfigError::Validation {
                    field: key.clone(),
                    reason: format!("'{value}': {e}"),
                })?;
                value.clone_into(&mut self.api_url);
            }
            "email_or_phone" => self.email_or_phone = Some(value.to_owned()),
            "token_env" => self.token_env = Some(value.to_owned()),
            "ca_cert" => self.ca_cert = Some(PathBuf::from(value)),
            "insecure" => {
                let flag = value.parse().map_err(|_| ConfigError::Validation {
                    field: key.clone(),
                    reason: format!("'{value}' is not true or false"),
                })?;
                self.insecure = Some(flag);
            }
            "timeout" => self.timeout = duration(&key)?,
            "stale_time" => self.stale_time = duration(&key)?,
            "gc_time" => self.gc_time = duration(&key)?,
            "notification_poll" => self.notification_poll = duration(&key)?,
            _ => {
                return Err(ConfigError::Validation {
                    field: key.clone(),
                    reason: format!("unknown key; expected one of {}", Self::KEYS.join(", ")),
                });
            }
        }
        Ok(())
    }

    /// `(key, value)` for every key that is set, in [`Profile::KEYS`] order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let values = [
            Some(self.api_url.clone()),
            self.email_or_phone.clone(),
            self.token_env.clone(),
            self.ca_cert.as_ref().map(|p| p.display().to_string()),
            self.insecure.map(|b| b.to_string()),
            self.timeout.clone(),
            self.stale_time.clone(),
            self.gc_time.clone(),
            self.notification_poll.clone(),
        ];
        let mut out: Vec<_> = Self::KEYS
            .iter()
            .zip(values)
            .filter_map(|(k, v)| Some((*k, v?)))
            .collect();
        if let Some(token) = &self.token {
            out.insert(1, ("token", token.clone()));
        }
        out
    }
}

// ── Load / save ─────────────────────────────────────────────────────

/// `$RIDEDESK_CONFIG`, else `config.toml` in the platform config dir
/// (`~/.config/ridedesk` on Linux).
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "ridedesk", "ridedesk").map_or_else(
        || PathBuf::from(".ridedesk.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path`, layered under `RIDEDESK_*` environment variables
/// (`RIDEDESK_DEFAULTS__OUTPUT=json`). A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("RIDEDESK_").split("__").ignore(&["token", "config", "log"]))
        .extract()
        .map_err(|e| ConfigError::Load {
            path: path.to_owned(),
            source: Box::new(e),
        })
}

/// [`load_config`], or defaults if the file is unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Write `cfg` as TOML. On Unix the file is created owner-only, since
/// profiles may carry plaintext tokens.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let written = |source: std::io::Error| ConfigError::Write {
        path: path.to_owned(),
        source,
    };
    let body = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(written)?;
    }
    std::fs::write(path, body).map_err(written)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(written)?;
    }
    debug!(path = %path.display(), "config saved");
    Ok(())
}

// ── Token storage ───────────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/token"),
    )?)
}

/// Token stored in the system keyring for this profile, if any.
pub fn keyring_token(profile_name: &str) -> Option<String> {
    keyring_entry(profile_name).ok()?.get_password().ok()
}

/// Store a bearer token in the system keyring.
pub fn store_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(token.expose_secret())?;
    debug!(profile = profile_name, "token stored in keyring");
    Ok(())
}

/// Remove the keyring token. Succeeds when nothing was stored.
pub fn clear_token(profile_name: &str) -> Result<(), ConfigError> {
    match keyring_entry(profile_name)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

// ── Token resolution ────────────────────────────────────────────────

/// Resolve the bearer token: the profile's `token_env` variable, then
/// `RIDEDESK_TOKEN`, then the keyring, then the plaintext `token`.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_token_from(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        keyring_token,
    )
}

/// [`resolve_token`] with the environment and keyring lookups supplied by
/// the caller.
pub fn resolve_token_from(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's token_env → env var lookup
    if let Some(val) = profile.token_env.as_deref().and_then(&env) {
        return Ok(SecretString::from(val));
    }

    // 2. Shared env var
    if let Some(val) = env(TOKEN_ENV) {
        return Ok(SecretString::from(val));
    }

    // 3. System keyring
    if let Some(val) = keyring(profile_name) {
        return Ok(SecretString::from(val));
    }

    // 4. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Translation ─────────────────────────────────────────────────────

/// Parse an optional humantime field, falling back to `default`.
pub fn parse_duration(
    field: &str,
    value: Option<&str>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    value.map_or(Ok(default), |raw| {
        humantime::parse_duration(raw).map_err(|e| ConfigError::Validation {
            field: field.into(),
            reason: format!("'{raw}': {e}"),
        })
    })
}

/// Build a `ConsoleConfig` from a profile, without CLI flag overrides.
///
/// A missing token is not an error: `ridedesk login` runs without one.
pub fn profile_to_console_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ConsoleConfig, ConfigError> {
    let api_url: url::Url = profile
        .api_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL: {}", profile.api_url),
        })?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let cache_defaults = CacheConfig::default();
    let timeout = parse_duration(
        "timeout",
        profile.timeout.as_deref(),
        parse_duration("defaults.timeout", Some(&defaults.timeout), Duration::ZERO)?,
    )?;

    let mut config = ConsoleConfig::new(api_url);
    config.transport = TransportConfig::default().with_tls(tls).with_timeout(timeout);
    config.cache = CacheConfig {
        stale_time: parse_duration(
            "stale_time",
            profile.stale_time.as_deref(),
            cache_defaults.stale_time,
        )?,
        gc_time: parse_duration(
            "gc_time",
            profile.gc_time.as_deref(),
            cache_defaults.gc_time,
        )?,
        ..cache_defaults
    };
    config.notification_poll = parse_duration(
        "notification_poll",
        profile.notification_poll.as_deref(),
        config.notification_poll,
    )?;
    config.token = resolve_token(profile, profile_name).ok();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn token_env_wins_over_everything() {
        let profile = Profile {
            token: Some("plain".into()),
            token_env: Some("STAGING_TOKEN".into()),
            ..Profile::new("https://api.example.com")
        };
        let token = resolve_token_from(
            &profile,
            "staging",
            |name| (name == "STAGING_TOKEN").then(|| "from-env".to_string()),
            |_| Some("from-keyring".into()),
        )
        .expect("token");
        assert_eq!(token.expose_secret(), "from-env");
    }

    #[test]
    fn shared_env_then_keyring_then_plaintext() {
        let profile = Profile {
            token: Some("plain".into()),
            ..Profile::new("https://api.example.com")
        };

        let shared = resolve_token_from(
            &profile,
            "default",
            |name| (name == TOKEN_ENV).then(|| "shared".to_string()),
            |_| Some("from-keyring".into()),
        )
        .expect("token");
        assert_eq!(shared.expose_secret(), "shared");

        let keyring = resolve_token_from(&profile, "default", no_env, |p| {
            (p == "default").then(|| "from-keyring".to_string())
        })
        .expect("token");
        assert_eq!(keyring.expose_secret(), "from-keyring");

        let plain = resolve_token_from(&profile, "default", no_env, no_env).expect("token");
        assert_eq!(plain.expose_secret(), "plain");
    }

    #[test]
    fn missing_token_names_the_profile() {
        let profile = Profile::new("https://api.example.com");
        let err = resolve_token_from(&profile, "prod", no_env, no_env).expect_err("no token");
        assert_eq!(err.to_string(), "no token stored for profile 'prod'");
    }

    #[test]
    fn durations_use_humantime() {
        assert_eq!(
            parse_duration("gc_time", Some("5m"), Duration::ZERO).expect("parse"),
            Duration::from_secs(300)
        );
        assert_eq!(
            parse_duration("gc_time", None, Duration::from_secs(1)).expect("default"),
            Duration::from_secs(1)
        );
        let err = parse_duration("gc_time", Some("soon"), Duration::ZERO).expect_err("bad value");
        assert!(err.to_string().starts_with("invalid gc_time"));
    }

    #[test]
    fn profile_translates_to_console_config() {
        let profile = Profile {
            insecure: Some(true),
            timeout: Some("10s".into()),
            stale_time: Some("30s".into()),
            notification_poll: Some("2m".into()),
            ..Profile::new("https://api.example.com/backend")
        };
        let config =
            profile_to_console_config(&profile, "default", &Defaults::default()).expect("config");

        assert_eq!(config.api_url.as_str(), "https://api.example.com/backend");
        assert!(matches!(config.transport.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(config.transport.timeout, Duration::from_secs(10));
        assert_eq!(config.cache.stale_time, Duration::from_secs(30));
        assert_eq!(config.cache.gc_time, CacheConfig::default().gc_time);
        assert_eq!(config.notification_poll, Duration::from_secs(120));
    }

    #[test]
    fn set_accepts_dashed_keys_and_validates_values() {
        let mut profile = Profile::new("http://localhost:5000");
        profile.set("stale-time", "45s").expect("duration");
        profile.set("insecure", "true").expect("bool");
        assert_eq!(profile.stale_time.as_deref(), Some("45s"));
        assert_eq!(profile.insecure, Some(true));

        let err = profile.set("gc_time", "soon").expect_err("bad duration");
        assert!(err.to_string().starts_with("invalid gc_time"));
        let err = profile.set("insecure", "yes").expect_err("bad bool");
        assert!(err.to_string().contains("not true or false"));
        let err = profile.set("api_url", "localhost").expect_err("relative url");
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "api_url"));
        assert_eq!(profile.api_url, "http://localhost:5000");
    }

    #[test]
    fn unknown_key_lists_the_valid_ones() {
        let err = Profile::default().set("colour", "red").expect_err("unknown key");
        let message = err.to_string();
        assert!(message.starts_with("invalid colour"));
        assert!(message.contains("notification_poll"));
    }

    #[test]
    fn entries_follow_key_order_and_redaction_masks_tokens() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                token: Some("secret".into()),
                gc_time: Some("10m".into()),
                ..Profile::new("http://localhost:5000")
            },
        );

        let shown = cfg.redacted();
        let entries = shown.profiles["default"].entries();
        let keys: Vec<&str> = entries.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, ["api_url", "token", "gc_time"]);
        assert_eq!(entries[1].1, REDACTED);
        assert_eq!(cfg.profiles["default"].token.as_deref(), Some("secret"));
    }

    #[test]
    fn unknown_profile_lists_known_names() {
        let mut cfg = Config::default();
        cfg.profiles.insert("prod".into(), Profile::new("https://api.example.com"));
        cfg.profiles.insert("dev".into(), Profile::new("http://localhost:5000"));

        let err = cfg.profile("staging").expect_err("missing");
        assert!(matches!(
            err,
            ConfigError::UnknownProfile { ref known, .. } if known == &["dev", "prod"]
        ));
    }

    #[test]
    fn bad_url_is_a_validation_error() {
        let err = profile_to_console_config(
            &Profile::new("not a url"),
            "default",
            &Defaults::default(),
        )
        .expect_err("bad url");
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "api_url"));
    }
}
