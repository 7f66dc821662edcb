//! Authentication, registration and password-recovery endpoints.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError, expect_success, parse_json};

/// Access/refresh pair returned by `POST /api/token/`.
#[derive(Debug, Deserialize)]
struct TokenPair {
    access: String,
    #[allow(dead_code)]
    refresh: String,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Registration form payload for `POST /register/`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile_number: String,
}

#[derive(Debug, Serialize)]
struct OtpRequest<'a> {
    identifier: &'a str,
    otp: &'a str,
}

#[derive(Debug, Serialize)]
struct IdentifierRequest<'a> {
    identifier: &'a str,
}

#[derive(Debug, Serialize)]
struct ResetPasswordRequest<'a> {
    identifier: &'a str,
    new_password: &'a str,
}

impl ApiClient {
    /// Exchange credentials for a session.
    ///
    /// Cookie-based deployments set the session cookie on this response; the
    /// bearer pair, when present, is held in memory for later requests.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success status (wrong
    /// credentials included; the backend does not distinguish).
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let response = self
            .post_json("api/token/", &LoginRequest { username, password })
            .await?;
        let tokens: TokenPair = parse_json(response).await?;
        self.set_bearer_token(SecretString::from(tokens.access));
        Ok(())
    }

    /// Silent session probe (`GET /auth/me/`).
    ///
    /// # Errors
    ///
    /// Any failure - network error or non-2xx - means "not logged in".
    pub async fn probe_session(&self) -> Result<(), ApiError> {
        let response = self.get("auth/me/").await?;
        expect_success(response).await?;
        Ok(())
    }

    /// Best-effort session invalidation (`POST /auth/logout/`).
    ///
    /// Callers clear local session state regardless of this outcome.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success status.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let response = self.post_json("auth/logout/", &serde_json::json!({})).await?;
        expect_success(response).await?;
        Ok(())
    }

    /// Register a new account (`POST /register/`). The account becomes usable
    /// after OTP verification.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success status.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        let response = self.post_json("register/", request).await?;
        expect_success(response).await?;
        Ok(())
    }

    /// Confirm a registration OTP (`POST /verify-otp/`).
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success status.
    pub async fn verify_otp(&self, identifier: &str, otp: &str) -> Result<(), ApiError> {
        let response = self
            .post_json("verify-otp/", &OtpRequest { identifier, otp })
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    /// Start password recovery (`POST /forgot-password/`).
    ///
    /// The backend responds success whether or not the account exists.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success status.
    pub async fn forgot_password(&self, identifier: &str) -> Result<(), ApiError> {
        let response = self
            .post_json("forgot-password/", &IdentifierRequest { identifier })
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    /// Confirm a password-reset OTP (`POST /verify-otp-password-reset/`).
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success status.
    pub async fn verify_otp_password_reset(
        &self,
        identifier: &str,
        otp: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .post_json(
                "verify-otp-password-reset/",
                &OtpRequest { identifier, otp },
            )
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    /// Set a new password after OTP confirmation (`POST /reset-password/`).
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success status.
    pub async fn reset_password(
        &self,
        identifier: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .post_json(
                "reset-password/",
                &ResetPasswordRequest {
                    identifier,
                    new_password,
                },
            )
            .await?;
        expect_success(response).await?;
        Ok(())
    }
}
