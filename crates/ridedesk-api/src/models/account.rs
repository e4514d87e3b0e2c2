use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use strum::{Display, EnumString};

use super::common::{EntityId, ValidationError, require};

/// Minimum length the backend accepts for new passwords.
pub const MIN_PASSWORD_LEN: usize = 6;

fn expose<S: Serializer>(secret: &SecretString, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(secret.expose_secret())
}

// ── Login ────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest<'a> {
    pub email_or_phone: &'a str,
    #[serde(serialize_with = "expose")]
    pub password: &'a SecretString,
}

/// Raw `POST /api/auth/login` body. `success: false` can arrive with 200.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<LoginData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginData {
    pub user: AccountUser,
    pub token: SecretString,
    #[serde(default)]
    pub refresh_token: Option<SecretString>,
}

/// The signed-in account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUser {
    #[serde(alias = "_id")]
    pub id: EntityId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl AccountUser {
    pub fn is_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case("admin")
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: AccountUser,
    pub token: SecretString,
    pub refresh_token: Option<SecretString>,
}

// ── Password recovery ────────────────────────────────────────────────

/// Purpose of a one-time code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OtpPurpose {
    #[default]
    PasswordReset,
    EmailVerification,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EmailOrPhone<'a> {
    pub email_or_phone: &'a str,
}

#[derive(Serialize)]
pub(crate) struct VerifyOtp<'a> {
    pub email: &'a str,
    pub otp: &'a str,
    #[serde(rename = "type")]
    pub purpose: OtpPurpose,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResetPassword<'a> {
    pub email_or_phone: &'a str,
    #[serde(serialize_with = "expose")]
    pub new_password: &'a SecretString,
}

/// Body of `POST /api/auth/change-password`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    #[serde(serialize_with = "expose")]
    pub current_password: SecretString,
    #[serde(serialize_with = "expose")]
    pub new_password: SecretString,
}

impl PasswordChange {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("currentPassword", self.current_password.expose_secret())?;
        validate_new_password(&self.new_password)
    }
}

impl std::fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordChange").finish_non_exhaustive()
    }
}

/// Check a new password against the backend's minimum length.
pub fn validate_new_password(password: &SecretString) -> Result<(), ValidationError> {
    if password.expose_secret().chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::new(
            "newPassword",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

/// One-time codes are six digits.
pub fn validate_otp(otp: &str) -> Result<(), ValidationError> {
    if otp.len() == 6 && otp.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("otp", "must be 6 digits"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    #[test]
    fn short_new_password_is_rejected() {
        let change = PasswordChange {
            current_password: secret("old-pass"),
            new_password: secret("12345"),
        };
        assert_eq!(change.validate().map_err(|e| e.field), Err("newPassword"));
    }

    #[test]
    fn password_change_serializes_plaintext_fields() {
        let change = PasswordChange {
            current_password: secret("old-pass"),
            new_password: secret("new-pass"),
        };
        let json = serde_json::to_value(&change).expect("serialize");
        assert_eq!(json["currentPassword"], "old-pass");
        assert_eq!(json["newPassword"], "new-pass");
        assert!(!format!("{change:?}").contains("old-pass"));
    }

    #[test]
    fn otp_must_be_six_digits() {
        assert!(validate_otp("123456").is_ok());
        assert!(validate_otp("12345").is_err());
        assert!(validate_otp("12a456").is_err());
    }

    #[test]
    fn admin_role_check_ignores_case() {
        let user = AccountUser {
            id: "a1".into(),
            email: None,
            full_name: None,
            profile_image: None,
            role: "Admin".into(),
            phone_number: None,
        };
        assert!(user.is_admin());
    }
}
