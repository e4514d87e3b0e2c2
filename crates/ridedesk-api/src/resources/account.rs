// Account endpoints: sign-in and password management.
//
// Everything except `change_password` runs before a session exists and
// goes through `post_anonymous`, so a rejected credential never fires the
// session's sign-out hook.

use secrecy::SecretString;
use tracing::{debug, info};

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::account::{
    EmailOrPhone, LoginRequest, LoginResponse, OtpPurpose, PasswordChange, ResetPassword,
    VerifyOtp,
};
use crate::models::{ApiMessage, LoginSession};

/// Account calls report `success: false` with HTTP 200 for bad codes.
fn ensure_success(msg: ApiMessage, fallback: &str) -> Result<ApiMessage, Error> {
    if msg.success == Some(false) {
        return Err(Error::Authentication {
            message: msg.message.unwrap_or_else(|| fallback.to_owned()),
        });
    }
    Ok(msg)
}

/// Login failures of any HTTP status are credential problems.
fn as_auth_error(err: Error) -> Error {
    match err {
        Error::Api { message, .. } => Error::Authentication { message },
        other => other,
    }
}

impl ApiClient {
    /// Exchange credentials for a bearer token.
    ///
    /// `POST /api/auth/login` with `{emailOrPhone, password}`. The session
    /// is not touched; callers decide whether to install the token.
    pub async fn login(
        &self,
        email_or_phone: &str,
        password: &SecretString,
    ) -> Result<LoginSession, Error> {
        debug!(email_or_phone, "logging in");
        let resp: LoginResponse = self
            .post_anonymous(
                "api/auth/login",
                &LoginRequest {
                    email_or_phone,
                    password,
                },
            )
            .await
            .map_err(as_auth_error)?;

        match resp {
            LoginResponse {
                success: true,
                data: Some(data),
                ..
            } => {
                info!(role = %data.user.role, "login accepted");
                Ok(LoginSession {
                    user: data.user,
                    token: data.token,
                    refresh_token: data.refresh_token,
                })
            }
            LoginResponse { message, .. } => Err(Error::Authentication {
                message: message.unwrap_or_else(|| "Login failed".to_owned()),
            }),
        }
    }

    /// `POST /api/auth/request-password-reset`: sends a one-time code.
    pub async fn request_password_reset(&self, email_or_phone: &str) -> Result<ApiMessage, Error> {
        debug!(email_or_phone, "requesting password reset");
        let msg = self
            .post_anonymous(
                "api/auth/request-password-reset",
                &EmailOrPhone { email_or_phone },
            )
            .await?;
        ensure_success(msg, "Failed to send reset code")
    }

    /// `POST /api/auth/verify-otp`.
    pub async fn verify_otp(
        &self,
        email: &str,
        otp: &str,
        purpose: OtpPurpose,
    ) -> Result<ApiMessage, Error> {
        debug!(email, %purpose, "verifying one-time code");
        let msg = self
            .post_anonymous("api/auth/verify-otp", &VerifyOtp { email, otp, purpose })
            .await
            .map_err(as_auth_error)?;
        ensure_success(msg, "Invalid OTP")
    }

    /// `POST /api/auth/reset-password` after a verified code.
    pub async fn reset_password(
        &self,
        email_or_phone: &str,
        new_password: &SecretString,
    ) -> Result<ApiMessage, Error> {
        debug!(email_or_phone, "resetting password");
        let msg = self
            .post_anonymous(
                "api/auth/reset-password",
                &ResetPassword {
                    email_or_phone,
                    new_password,
                },
            )
            .await?;
        ensure_success(msg, "Failed to reset password")
    }

    /// `POST /api/auth/change-password` for the signed-in account.
    pub async fn change_password(&self, change: &PasswordChange) -> Result<ApiMessage, Error> {
        debug!("changing password");
        self.post("api/auth/change-password", change).await
    }
}
