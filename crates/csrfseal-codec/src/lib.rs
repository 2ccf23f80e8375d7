//! # csrfseal-codec
//!
//! Authenticated encoding of small binary values into cookie-safe strings.
//!
//! A [`TokenCodec`] turns raw bytes into an opaque, tamper-evident string that
//! is bound to the name it was sealed under, and back. Any modification of the
//! sealed string, a different signing key, or a different name makes
//! [`TokenCodec::decode`] fail.
//!
//! [`HmacCodec`] is the bundled implementation, signing with HMAC-SHA256.
//!
//! ## Example
//!
//! ```rust
//! use csrfseal_codec::{HmacCodec, TokenCodec};
//!
//! let codec = HmacCodec::new(b"a very long and very secret signing key!");
//! let sealed = codec.encode("csrf_token", b"raw secret").unwrap();
//!
//! assert_eq!(codec.decode("csrf_token", &sealed).unwrap(), b"raw secret");
//! assert!(codec.decode("other_cookie", &sealed).is_err());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod hmac_codec;

pub use error::CodecError;
pub use hmac_codec::{HmacCodec, DEFAULT_MAX_AGE, DEFAULT_MAX_LENGTH};

/// Authenticated, name-bound encoding of a byte value.
///
/// Implementations must be safe to share across request-handling threads and
/// must not keep any per-call state.
pub trait TokenCodec: Send + Sync {
    /// Seal `value` under `name`.
    ///
    /// The output is printable and safe to place in a cookie value.
    fn encode(&self, name: &str, value: &[u8]) -> Result<String, CodecError>;

    /// Recover the value sealed under `name`.
    ///
    /// Fails closed: on any integrity, expiry, or format problem an error is
    /// returned and no data is produced.
    fn decode(&self, name: &str, sealed: &str) -> Result<Vec<u8>, CodecError>;
}

impl<T: TokenCodec + ?Sized> TokenCodec for std::sync::Arc<T> {
    fn encode(&self, name: &str, value: &[u8]) -> Result<String, CodecError> {
        (**self).encode(name, value)
    }

    fn decode(&self, name: &str, sealed: &str) -> Result<Vec<u8>, CodecError> {
        (**self).decode(name, sealed)
    }
}
