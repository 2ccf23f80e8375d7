//! Error types for csrfseal

use csrfseal_codec::CodecError;
use thiserror::Error;

/// Errors returned by a [`TokenStore`](crate::TokenStore).
///
/// `NotFound` and `InvalidToken` are client-side conditions and are meant to
/// be handled the same way: mint a new secret. The remaining variants mean the
/// server cannot write a CSRF cookie at all and must fail the response.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request carries no CSRF cookie.
    #[error("no CSRF cookie present")]
    NotFound,

    /// The request carries a CSRF cookie that failed verification.
    #[error("CSRF cookie is invalid")]
    InvalidToken,

    /// The secret could not be sealed.
    #[error("failed to seal CSRF cookie: {0}")]
    Encoding(#[source] CodecError),

    /// The cookie could not be represented as a `Set-Cookie` header value.
    #[error("CSRF cookie is not a valid header value")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),
}

impl StoreError {
    /// Whether the caller should recover by minting a fresh secret.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound | Self::InvalidToken)
    }
}

/// Reasons a submitted token is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// No token was submitted with the request.
    #[error("CSRF token missing")]
    MissingToken,

    /// The submitted token does not match the stored secret.
    #[error("CSRF token invalid")]
    BadToken,
}

/// Errors raised while loading CSRF configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variables could not be deserialized.
    #[error("Configuration error: {0}")]
    Env(#[from] envy::Error),

    /// No signing key was configured.
    #[error("Missing required CSRF signing key")]
    MissingSigningKey,

    /// The signing key is not valid base64.
    #[error("CSRF signing key is not valid base64")]
    InvalidSigningKey,

    /// The decoded signing key is too short.
    #[error("CSRF signing key must be at least {min} bytes, got {len}")]
    SigningKeyTooShort {
        /// Decoded key length.
        len: usize,
        /// Minimum accepted length.
        min: usize,
    },

    /// The configured header name is not a valid HTTP header name.
    #[error("Invalid CSRF header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),
}
