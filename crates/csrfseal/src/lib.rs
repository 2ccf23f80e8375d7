//! # csrfseal
//!
//! Cross-site request forgery protection built around a per-session secret
//! kept in a sealed cookie.
//!
//! - The secret is 32 random bytes, minted when a request carries none.
//! - It travels to the client only inside a cookie sealed with HMAC-SHA256,
//!   bound to the cookie's name and stamped with its issuance time.
//! - Pages and headers carry a masked rendering that changes on every render.
//! - Submitted tokens are compared in constant time.
//!
//! ## Quick Start
//!
//! ```rust
//! use csrfseal::prelude::*;
//! use std::sync::Arc;
//!
//! let guard = CsrfGuard::new(CookieStore::new(
//!     CookieOptions::new().name("csrf_token").max_age(3600),
//!     Arc::new(HmacCodec::new(b"0123456789abcdef0123456789abcdef")),
//! ));
//!
//! // incoming request
//! let state = guard.load_or_mint(&HeaderMap::new()).unwrap();
//! let token_for_form = guard.masked_token(&state.secret);
//!
//! // outgoing response
//! let mut headers = HeaderMap::new();
//! guard.commit(&state.secret, &mut headers).unwrap();
//! # let _ = token_for_form;
//! ```
//!
//! Settings can also come from the environment, see [`CsrfSettings`].

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub use csrfseal_codec::{CodecError, HmacCodec, TokenCodec};
pub use csrfseal_core::*;

/// Prelude module - import everything you need with `use csrfseal::prelude::*`
pub mod prelude {
    pub use csrfseal_codec::{CodecError, HmacCodec, TokenCodec};
    pub use csrfseal_core::{
        ConfigError, CookieOptions, CookieStore, CsrfGuard, CsrfSettings, SameSiteMode, Secret,
        StoreError, TokenState, TokenStore, VerifyError,
    };

    pub use http::HeaderMap;
}
