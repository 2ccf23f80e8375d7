//! Configuration from environment variables
//!
//! [`CsrfSettings`] is deserialized with `envy`; every field has a default
//! except the signing key.
//!
//! # Example
//!
//! ```ignore
//! use csrfseal_core::config::{load_dotenv, CsrfSettings};
//!
//! // CSRF_SIGNING_KEY=<base64>, CSRF_MAX_AGE=3600, ...
//! load_dotenv();
//! let guard = CsrfSettings::from_env()?.build_guard()?;
//! ```

use crate::error::ConfigError;
use crate::guard::{CsrfGuard, DEFAULT_HEADER_NAME};
use crate::options::{CookieOptions, SameSiteMode, DEFAULT_COOKIE_NAME, DEFAULT_MAX_AGE};
use crate::store::CookieStore;
use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use csrfseal_codec::HmacCodec;
use http::header::HeaderName;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Prefix of every environment variable read by [`CsrfSettings::from_env`].
pub const ENV_PREFIX: &str = "CSRF";

/// Minimum decoded signing key length in bytes.
pub const MIN_KEY_LENGTH: usize = 32;

/// How long a sealed session cookie (`max_age <= 0`) keeps verifying: 30 days.
pub const SESSION_MAX_AGE: Duration = csrfseal_codec::DEFAULT_MAX_AGE;

fn default_cookie_name() -> String {
    DEFAULT_COOKIE_NAME.to_string()
}

fn default_max_age() -> i64 {
    DEFAULT_MAX_AGE
}

fn default_true() -> bool {
    true
}

fn default_path() -> String {
    "/".to_string()
}

fn default_same_site() -> SameSiteMode {
    SameSiteMode::Lax
}

fn default_header_name() -> String {
    DEFAULT_HEADER_NAME.to_string()
}

/// CSRF protection settings.
///
/// | variable                   | default        |
/// |----------------------------|----------------|
/// | `CSRF_COOKIE_NAME`         | `_csrf`        |
/// | `CSRF_MAX_AGE`             | `43200`        |
/// | `CSRF_SECURE`              | `true`         |
/// | `CSRF_HTTP_ONLY`           | `true`         |
/// | `CSRF_PATH`                | `/`            |
/// | `CSRF_DOMAIN`              | unset          |
/// | `CSRF_SAME_SITE`           | `lax`          |
/// | `CSRF_SIGNING_KEY`         | required       |
/// | `CSRF_OLDER_SIGNING_KEYS`  | empty          |
/// | `CSRF_HEADER_NAME`         | `x-csrf-token` |
///
/// Keys are base64, standard or URL-safe alphabet. Older keys are a comma
/// separated list and are only used to verify cookies issued before a key
/// rotation.
#[derive(Clone, Deserialize)]
pub struct CsrfSettings {
    /// Cookie name.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Cookie lifetime in seconds; `<= 0` for a session cookie.
    #[serde(default = "default_max_age")]
    pub max_age: i64,
    /// `Secure` flag.
    #[serde(default = "default_true")]
    pub secure: bool,
    /// `HttpOnly` flag.
    #[serde(default = "default_true")]
    pub http_only: bool,
    /// Cookie path.
    #[serde(default = "default_path")]
    pub path: String,
    /// Cookie domain.
    #[serde(default)]
    pub domain: Option<String>,
    /// `SameSite` policy: `default`, `lax`, `strict`, or `none`.
    #[serde(default = "default_same_site")]
    pub same_site: SameSiteMode,
    /// Base64 signing key.
    #[serde(default)]
    pub signing_key: Option<String>,
    /// Base64 keys accepted for verification only.
    #[serde(default)]
    pub older_signing_keys: Vec<String>,
    /// Request header carrying the submitted token.
    #[serde(default = "default_header_name")]
    pub header_name: String,
}

impl fmt::Debug for CsrfSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfSettings")
            .field("cookie_name", &self.cookie_name)
            .field("max_age", &self.max_age)
            .field("secure", &self.secure)
            .field("http_only", &self.http_only)
            .field("path", &self.path)
            .field("domain", &self.domain)
            .field("same_site", &self.same_site)
            .field("signing_key", &self.signing_key.as_ref().map(|_| "***"))
            .field("older_signing_keys", &self.older_signing_keys.len())
            .field("header_name", &self.header_name)
            .finish()
    }
}

fn decode_key(encoded: &str) -> Result<Vec<u8>, ConfigError> {
    let encoded = encoded.trim();
    let key = STANDARD
        .decode(encoded)
        .or_else(|_| URL_SAFE.decode(encoded))
        .or_else(|_| URL_SAFE_NO_PAD.decode(encoded))
        .map_err(|_| ConfigError::InvalidSigningKey)?;

    if key.len() < MIN_KEY_LENGTH {
        return Err(ConfigError::SigningKeyTooShort {
            len: key.len(),
            min: MIN_KEY_LENGTH,
        });
    }

    Ok(key)
}

impl CsrfSettings {
    /// Load settings from `CSRF_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_prefixed(ENV_PREFIX)
    }

    /// Load settings from `<prefix>_*` environment variables.
    pub fn from_env_prefixed(prefix: &str) -> Result<Self, ConfigError> {
        let settings = envy::prefixed(format!("{}_", prefix)).from_env::<Self>()?;
        tracing::debug!(
            cookie = %settings.cookie_name,
            max_age = settings.max_age,
            secure = settings.secure,
            "Loaded CSRF settings"
        );
        Ok(settings)
    }

    /// The cookie attributes described by these settings.
    pub fn cookie_options(&self) -> CookieOptions {
        CookieOptions {
            name: self.cookie_name.clone(),
            max_age: self.max_age,
            secure: self.secure,
            http_only: self.http_only,
            path: self.path.clone(),
            domain: self.domain.clone().filter(|d| !d.is_empty()),
            same_site: self.same_site,
        }
    }

    /// The decoded signing key.
    pub fn signing_key(&self) -> Result<Vec<u8>, ConfigError> {
        let encoded = self
            .signing_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingSigningKey)?;
        decode_key(encoded)
    }

    /// How long the codec accepts a sealed value: the cookie lifetime, or
    /// [`SESSION_MAX_AGE`] for session cookies.
    pub fn codec_max_age(&self) -> Duration {
        match u64::try_from(self.max_age) {
            Ok(seconds) if seconds > 0 => Duration::from_secs(seconds),
            _ => SESSION_MAX_AGE,
        }
    }

    /// A codec holding the current and older signing keys, expiring sealed
    /// values after [`CsrfSettings::codec_max_age`].
    pub fn codec(&self) -> Result<HmacCodec, ConfigError> {
        let older = self
            .older_signing_keys
            .iter()
            .filter(|k| !k.trim().is_empty())
            .map(|k| decode_key(k))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(HmacCodec::new(self.signing_key()?)
            .with_older_keys(&older)
            .with_max_age(Some(self.codec_max_age())))
    }

    /// A cookie store configured from these settings.
    pub fn build_store(&self) -> Result<CookieStore, ConfigError> {
        Ok(CookieStore::new(self.cookie_options(), Arc::new(self.codec()?)))
    }

    /// A guard around [`CsrfSettings::build_store`], reading the configured header.
    pub fn build_guard(&self) -> Result<CsrfGuard<CookieStore>, ConfigError> {
        let header_name = HeaderName::try_from(self.header_name.as_str())?;
        Ok(CsrfGuard::new(self.build_store()?).with_header_name(header_name))
    }
}

/// Load environment variables from a `.env` file in the current directory.
///
/// A missing file is not an error; variables already set are not overridden.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Load environment variables from a specific file.
pub fn load_dotenv_from<P: AsRef<std::path::Path>>(path: P) {
    let _ = dotenvy::from_path(path);
}
