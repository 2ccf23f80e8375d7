//! Request-cycle helper around a [`TokenStore`]
//!
//! Decides nothing about which requests need checking; it only bundles the
//! steps the surrounding middleware performs once it has decided.

use crate::error::{StoreError, VerifyError};
use crate::store::TokenStore;
use crate::token::{self, Secret};
use http::header::HeaderName;
use http::HeaderMap;

/// Default request header carrying the submitted token.
pub const DEFAULT_HEADER_NAME: &str = "x-csrf-token";

/// The secret in effect for the current request.
#[derive(Debug)]
pub struct TokenState {
    /// The secret to render and to save with the response.
    pub secret: Secret,
    /// `true` when the request carried no usable secret and a new one was minted.
    pub minted: bool,
}

/// Drives a [`TokenStore`] through one request/response cycle.
#[derive(Debug, Clone)]
pub struct CsrfGuard<S> {
    store: S,
    header_name: HeaderName,
}

impl<S: TokenStore> CsrfGuard<S> {
    /// Create a guard reading submitted tokens from [`DEFAULT_HEADER_NAME`].
    pub fn new(store: S) -> Self {
        Self {
            store,
            header_name: HeaderName::from_static(DEFAULT_HEADER_NAME),
        }
    }

    /// Read submitted tokens from `header_name` instead.
    pub fn with_header_name(mut self, header_name: HeaderName) -> Self {
        self.header_name = header_name;
        self
    }

    /// The wrapped store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The header submitted tokens are read from.
    pub fn header_name(&self) -> &HeaderName {
        &self.header_name
    }

    /// Recover the request's secret, minting a new one when it is missing or invalid.
    ///
    /// Missing and invalid cookies are handled identically. Other store
    /// errors are returned.
    pub fn load_or_mint(&self, request: &HeaderMap) -> Result<TokenState, StoreError> {
        match self.store.get(request) {
            Ok(secret) => Ok(TokenState {
                secret,
                minted: false,
            }),
            Err(e) if e.is_recoverable() => {
                tracing::debug!(reason = %e, "Minting new CSRF secret");
                Ok(TokenState {
                    secret: Secret::generate(),
                    minted: true,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// A masked token for embedding in a form or header. Differs on every call.
    pub fn masked_token(&self, secret: &Secret) -> String {
        token::mask(secret)
    }

    /// Check a submitted masked token against `secret`.
    pub fn verify(&self, secret: &Secret, submitted: Option<&str>) -> Result<(), VerifyError> {
        let submitted = submitted
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(VerifyError::MissingToken)?;

        if token::verify(secret, submitted) {
            Ok(())
        } else {
            tracing::debug!("Rejecting request with mismatched CSRF token");
            Err(VerifyError::BadToken)
        }
    }

    /// Check the token submitted in the configured request header.
    pub fn verify_request(&self, secret: &Secret, request: &HeaderMap) -> Result<(), VerifyError> {
        let submitted = request
            .get(&self.header_name)
            .and_then(|value| value.to_str().ok());
        self.verify(secret, submitted)
    }

    /// Save `secret` with the response. Failures are returned, never dropped.
    pub fn commit(&self, secret: &Secret, response: &mut HeaderMap) -> Result<(), StoreError> {
        self.store.save(secret, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CookieOptions;
    use crate::store::CookieStore;
    use csrfseal_codec::HmacCodec;
    use http::header::{COOKIE, SET_COOKIE};
    use http::HeaderValue;
    use std::sync::{Arc, Mutex};

    fn guard() -> CsrfGuard<CookieStore> {
        let codec = Arc::new(HmacCodec::new(b"0123456789abcdef0123456789abcdef"));
        CsrfGuard::new(CookieStore::new(
            CookieOptions::new().name("csrf_token"),
            codec,
        ))
    }

    /// Server-side store keeping a single secret in memory.
    #[derive(Default)]
    struct MemoryStore {
        secret: Mutex<Option<[u8; token::TOKEN_LENGTH]>>,
    }

    impl TokenStore for MemoryStore {
        fn get(&self, _request: &HeaderMap) -> Result<Secret, StoreError> {
            let stored = *self.secret.lock().unwrap();
            stored.map(Secret::from_bytes).ok_or(StoreError::NotFound)
        }

        fn save(&self, secret: &Secret, _response: &mut HeaderMap) -> Result<(), StoreError> {
            *self.secret.lock().unwrap() = Some(*secret.as_bytes());
            Ok(())
        }
    }

    struct FailingStore;

    impl TokenStore for FailingStore {
        fn get(&self, _request: &HeaderMap) -> Result<Secret, StoreError> {
            Err(StoreError::Encoding(csrfseal_codec::CodecError::MissingKey))
        }

        fn save(&self, _secret: &Secret, _response: &mut HeaderMap) -> Result<(), StoreError> {
            Err(StoreError::Encoding(csrfseal_codec::CodecError::MissingKey))
        }
    }

    #[test]
    fn test_mints_when_cookie_missing() {
        let state = guard().load_or_mint(&HeaderMap::new()).unwrap();
        assert!(state.minted);
    }

    #[test]
    fn test_mints_when_cookie_invalid() {
        let mut request = HeaderMap::new();
        request.insert(COOKIE, HeaderValue::from_static("csrf_token=tampered"));

        let state = guard().load_or_mint(&request).unwrap();
        assert!(state.minted);
    }

    #[test]
    fn test_full_cycle() {
        let guard = guard();

        // first visit: mint, render, commit
        let first = guard.load_or_mint(&HeaderMap::new()).unwrap();
        let rendered = guard.masked_token(&first.secret);
        let mut response = HeaderMap::new();
        guard.commit(&first.secret, &mut response).unwrap();

        // form submission carries the cookie back plus the rendered token
        let cookie = cookie::Cookie::parse(
            response
                .get(SET_COOKIE)
                .unwrap()
                .to_str()
                .unwrap()
                .to_string(),
        )
        .unwrap();
        let mut request = HeaderMap::new();
        request.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{}={}", cookie.name(), cookie.value())).unwrap(),
        );
        request.insert(
            guard.header_name().clone(),
            HeaderValue::from_str(&rendered).unwrap(),
        );

        let second = guard.load_or_mint(&request).unwrap();
        assert!(!second.minted);
        assert_eq!(second.secret, first.secret);
        assert_eq!(guard.verify_request(&second.secret, &request), Ok(()));
    }

    #[test]
    fn test_verify_missing_and_bad() {
        let guard = guard();
        let secret = Secret::generate();

        assert_eq!(guard.verify(&secret, None), Err(VerifyError::MissingToken));
        assert_eq!(
            guard.verify(&secret, Some("  ")),
            Err(VerifyError::MissingToken)
        );
        assert_eq!(
            guard.verify(&secret, Some("bogus")),
            Err(VerifyError::BadToken)
        );
        assert_eq!(
            guard.verify(&secret, Some(guard.masked_token(&Secret::generate()).as_str())),
            Err(VerifyError::BadToken)
        );
        assert_eq!(
            guard.verify_request(&secret, &HeaderMap::new()),
            Err(VerifyError::MissingToken)
        );
    }

    #[test]
    fn test_custom_header_name() {
        let guard = guard().with_header_name(HeaderName::from_static("x-xsrf-token"));
        let secret = Secret::generate();

        let mut request = HeaderMap::new();
        request.insert(
            "x-xsrf-token",
            HeaderValue::from_str(&guard.masked_token(&secret)).unwrap(),
        );
        assert_eq!(guard.verify_request(&secret, &request), Ok(()));
    }

    #[test]
    fn test_server_side_store() {
        let guard = CsrfGuard::new(MemoryStore::default());

        let first = guard.load_or_mint(&HeaderMap::new()).unwrap();
        assert!(first.minted);
        guard.commit(&first.secret, &mut HeaderMap::new()).unwrap();

        let second = guard.load_or_mint(&HeaderMap::new()).unwrap();
        assert!(!second.minted);
        assert_eq!(second.secret, first.secret);
    }

    #[test]
    fn test_hard_errors_propagate() {
        let guard = CsrfGuard::new(FailingStore);
        assert!(matches!(
            guard.load_or_mint(&HeaderMap::new()),
            Err(StoreError::Encoding(_))
        ));
        assert!(guard
            .commit(&Secret::generate(), &mut HeaderMap::new())
            .is_err());
    }
}
