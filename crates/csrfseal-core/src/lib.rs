//! # csrfseal-core
//!
//! The storage and verification half of CSRF protection.
//!
//! - [`Secret`]: the 32-byte per-session secret, plus [`token::mask`],
//!   [`token::unmask`], and constant-time [`token::compare`] / [`token::verify`]
//! - [`TokenStore`]: where the secret lives between requests
//! - [`CookieStore`]: a [`TokenStore`] keeping the secret in a sealed cookie
//! - [`CsrfGuard`]: load-or-mint, verify, and commit for one request cycle
//! - [`config`]: settings from `CSRF_*` environment variables
//!
//! Deciding which requests must be checked and rendering the masked token into
//! pages are left to the surrounding framework.
//!
//! ## Example
//!
//! ```rust
//! use csrfseal_codec::HmacCodec;
//! use csrfseal_core::{CookieOptions, CsrfGuard, CookieStore, SameSiteMode};
//! use http::HeaderMap;
//! use std::sync::Arc;
//!
//! let store = CookieStore::new(
//!     CookieOptions::new()
//!         .name("csrf_token")
//!         .max_age(3600)
//!         .same_site(SameSiteMode::Lax),
//!     Arc::new(HmacCodec::new(b"0123456789abcdef0123456789abcdef")),
//! );
//! let guard = CsrfGuard::new(store);
//!
//! let request = HeaderMap::new();
//! let state = guard.load_or_mint(&request).unwrap();
//! let form_token = guard.masked_token(&state.secret);
//!
//! let mut response = HeaderMap::new();
//! guard.commit(&state.secret, &mut response).unwrap();
//! # assert!(response.contains_key(http::header::SET_COOKIE));
//! # assert!(guard.verify(&state.secret, Some(&*form_token)).is_ok());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
mod error;
mod guard;
mod options;
mod store;
pub mod token;

pub use config::CsrfSettings;
pub use error::{ConfigError, StoreError, VerifyError};
pub use guard::{CsrfGuard, TokenState, DEFAULT_HEADER_NAME};
pub use options::{CookieOptions, SameSiteMode, DEFAULT_COOKIE_NAME, DEFAULT_MAX_AGE};
pub use store::{CookieStore, TokenStore};
pub use token::{Secret, TOKEN_LENGTH};

pub use cookie;
pub use csrfseal_codec as codec;
