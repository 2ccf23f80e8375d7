//! Persistence of the CSRF secret between requests

use crate::error::StoreError;
use crate::options::CookieOptions;
use crate::token::Secret;
use cookie::time::OffsetDateTime;
use cookie::Cookie;
use csrfseal_codec::TokenCodec;
use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue};
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroize;

/// Where the CSRF secret lives between requests.
///
/// `get` reads from the incoming request's headers, `save` writes to the
/// outgoing response's headers. Implementations hold no per-request state.
/// A store backed by server-side storage would keep only a lookup key in the
/// cookie and implement the same two operations.
pub trait TokenStore: Send + Sync {
    /// Recover the secret carried by the request.
    ///
    /// Fails with [`StoreError::NotFound`] when the request carries nothing
    /// and [`StoreError::InvalidToken`] when what it carries does not verify.
    fn get(&self, request: &HeaderMap) -> Result<Secret, StoreError>;

    /// Persist `secret` and attach whatever the client needs to the response.
    fn save(&self, secret: &Secret, response: &mut HeaderMap) -> Result<(), StoreError>;
}

impl<T: TokenStore + ?Sized> TokenStore for Arc<T> {
    fn get(&self, request: &HeaderMap) -> Result<Secret, StoreError> {
        (**self).get(request)
    }

    fn save(&self, secret: &Secret, response: &mut HeaderMap) -> Result<(), StoreError> {
        (**self).save(secret, response)
    }
}

/// Keeps the secret entirely client-side in a sealed cookie.
#[derive(Clone)]
pub struct CookieStore {
    options: CookieOptions,
    codec: Arc<dyn TokenCodec>,
}

impl CookieStore {
    /// Create a store writing cookies with `options`, sealed by `codec`.
    pub fn new(options: CookieOptions, codec: Arc<dyn TokenCodec>) -> Self {
        Self { options, codec }
    }

    /// The cookie attributes this store writes.
    pub fn options(&self) -> &CookieOptions {
        &self.options
    }

    fn find_cookie(&self, request: &HeaderMap) -> Option<String> {
        request
            .get_all(COOKIE)
            .iter()
            .filter_map(|header| header.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == self.options.name)
            .map(|cookie| cookie.value().to_string())
    }
}

impl fmt::Debug for CookieStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieStore")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl TokenStore for CookieStore {
    fn get(&self, request: &HeaderMap) -> Result<Secret, StoreError> {
        let name = &self.options.name;
        let sealed = self.find_cookie(request).ok_or(StoreError::NotFound)?;

        let mut bytes = self.codec.decode(name, &sealed).map_err(|e| {
            tracing::debug!(cookie = %name, error = %e, "Discarding CSRF cookie that failed to open");
            StoreError::InvalidToken
        })?;

        let len = bytes.len();
        take_secret(&mut bytes).ok_or_else(|| {
            tracing::debug!(cookie = %name, len, "Discarding CSRF cookie with wrong secret length");
            StoreError::InvalidToken
        })
    }

    fn save(&self, secret: &Secret, response: &mut HeaderMap) -> Result<(), StoreError> {
        let name = &self.options.name;
        let sealed = self.codec.encode(name, secret.as_bytes()).map_err(|e| {
            tracing::error!(cookie = %name, error = %e, "Failed to seal CSRF cookie");
            StoreError::Encoding(e)
        })?;

        // expiry is relative to this response, never to store construction
        let cookie = self.options.cookie_at(sealed, OffsetDateTime::now_utc());
        let value = HeaderValue::from_str(&cookie.to_string()).map_err(|e| {
            tracing::error!(cookie = %name, "CSRF cookie is not a valid header value");
            StoreError::from(e)
        })?;

        response.append(SET_COOKIE, value);
        Ok(())
    }
}

/// Copy the secret out of a decoded buffer, wiping the buffer either way.
fn take_secret(bytes: &mut [u8]) -> Option<Secret> {
    let secret = Secret::from_slice(bytes);
    bytes.zeroize();
    secret
}
