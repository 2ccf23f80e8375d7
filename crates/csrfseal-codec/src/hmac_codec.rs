//! HMAC-SHA256 implementation of [`TokenCodec`]
//!
//! Sealed layout, before the outer base64 step:
//!
//! ```text
//! <unix timestamp>|<base64url(value)>|<base64url(mac)>
//! ```
//!
//! where the MAC covers `<name>|<unix timestamp>|<base64url(value)>`. The
//! name is not transmitted; it is supplied again on decode, which is what
//! binds a sealed value to a single cookie name.

use crate::{CodecError, TokenCodec};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use std::iter;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha256 = Hmac<Sha256>;

/// Default maximum age a sealed value is accepted for: 30 days.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60 * 60 * 24 * 30);

/// Default maximum length of a sealed value, in bytes.
pub const DEFAULT_MAX_LENGTH: usize = 4096;

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
struct SigningKey(Vec<u8>);

impl SigningKey {
    fn mac(&self, name: &str, timestamp: &str, payload: &str) -> Result<HmacSha256, CodecError> {
        let mut mac = HmacSha256::new_from_slice(&self.0).map_err(|_| CodecError::InvalidKey)?;
        mac.update(name.as_bytes());
        mac.update(b"|");
        mac.update(timestamp.as_bytes());
        mac.update(b"|");
        mac.update(payload.as_bytes());
        Ok(mac)
    }

    fn verify(&self, name: &str, timestamp: &str, payload: &str, tag: &[u8]) -> bool {
        if self.0.is_empty() {
            return false;
        }

        match self.mac(name, timestamp, payload) {
            // `verify_slice` compares in constant time
            Ok(mac) => mac.verify_slice(tag).is_ok(),
            Err(_) => false,
        }
    }
}

/// Codec sealing values with HMAC-SHA256.
///
/// Values carry their issuance time; values older than the configured
/// maximum age are rejected on decode. Older signing keys can be registered
/// with [`HmacCodec::with_older_keys`] so that values sealed before a key
/// rotation keep verifying; new values are always signed with the current
/// key.
#[derive(Clone)]
pub struct HmacCodec {
    key: SigningKey,
    older_keys: Vec<SigningKey>,
    max_age: Option<Duration>,
    max_length: usize,
}

impl HmacCodec {
    /// Create a codec signing with `key`.
    ///
    /// An empty key is accepted here but makes every `encode` fail with
    /// [`CodecError::MissingKey`].
    pub fn new(key: impl AsRef<[u8]>) -> Self {
        Self {
            key: SigningKey(key.as_ref().to_vec()),
            older_keys: Vec::new(),
            max_age: Some(DEFAULT_MAX_AGE),
            max_length: DEFAULT_MAX_LENGTH,
        }
    }

    /// Keys that are still accepted for verification but never used to sign.
    pub fn with_older_keys<K: AsRef<[u8]>>(mut self, keys: &[K]) -> Self {
        self.older_keys = keys
            .iter()
            .map(|key| SigningKey(key.as_ref().to_vec()))
            .collect();
        self
    }

    /// Maximum age of accepted values; `None` disables the check.
    pub fn with_max_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_age = max_age;
        self
    }

    /// Maximum length of a sealed value; `0` disables the check.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// The configured maximum age.
    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    fn check_length(&self, sealed: &str) -> Result<(), CodecError> {
        if self.max_length != 0 && sealed.len() > self.max_length {
            return Err(CodecError::TooLong {
                max: self.max_length,
            });
        }
        Ok(())
    }

    fn seal_at(&self, name: &str, value: &[u8], now: u64) -> Result<String, CodecError> {
        if self.key.0.is_empty() {
            return Err(CodecError::MissingKey);
        }

        let timestamp = now.to_string();
        let payload = URL_SAFE_NO_PAD.encode(value);
        let tag = self
            .key
            .mac(name, &timestamp, &payload)?
            .finalize()
            .into_bytes();

        let inner = format!("{}|{}|{}", timestamp, payload, URL_SAFE_NO_PAD.encode(tag));
        let sealed = URL_SAFE_NO_PAD.encode(inner);
        self.check_length(&sealed)?;

        Ok(sealed)
    }

    fn open_at(&self, name: &str, sealed: &str, now: u64) -> Result<Vec<u8>, CodecError> {
        self.check_length(sealed)?;

        let inner = URL_SAFE_NO_PAD
            .decode(sealed)
            .map_err(|_| CodecError::Malformed)?;
        let inner = std::str::from_utf8(&inner).map_err(|_| CodecError::Malformed)?;

        let mut parts = inner.splitn(3, '|');
        let (Some(timestamp), Some(payload), Some(tag)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(CodecError::Malformed);
        };
        let tag = URL_SAFE_NO_PAD
            .decode(tag)
            .map_err(|_| CodecError::Malformed)?;

        let verified = iter::once(&self.key)
            .chain(self.older_keys.iter())
            .any(|key| key.verify(name, timestamp, payload, &tag));
        if !verified {
            return Err(CodecError::InvalidMac);
        }

        let issued: u64 = timestamp.parse().map_err(|_| CodecError::Malformed)?;
        if let Some(max_age) = self.max_age {
            if issued.saturating_add(max_age.as_secs()) < now {
                return Err(CodecError::Expired);
            }
        }

        URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| CodecError::Malformed)
    }
}

impl fmt::Debug for HmacCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacCodec")
            .field("key", &"***")
            .field("older_keys", &self.older_keys.len())
            .field("max_age", &self.max_age)
            .field("max_length", &self.max_length)
            .finish()
    }
}

fn unix_now() -> Result<u64, CodecError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .map_err(|_| CodecError::Clock)
}

impl TokenCodec for HmacCodec {
    fn encode(&self, name: &str, value: &[u8]) -> Result<String, CodecError> {
        self.seal_at(name, value, unix_now()?)
    }

    fn decode(&self, name: &str, sealed: &str) -> Result<Vec<u8>, CodecError> {
        let result = self.open_at(name, sealed, unix_now()?);
        if let Err(ref e) = result {
            tracing::trace!(cookie = %name, error = %e, "Sealed value rejected");
        }
        result
    }
}
