//! Secret generation, masking, and constant-time comparison
//!
//! The secret never leaves the server in the clear. Pages and headers carry a
//! masked rendering instead: a fresh one-time pad followed by the pad XORed
//! with the secret. Each render therefore looks different while still
//! unmasking to the same secret.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of a CSRF secret in bytes.
pub const TOKEN_LENGTH: usize = 32;

/// Length of a masked token in bytes, before base64 encoding.
pub const MASKED_LENGTH: usize = TOKEN_LENGTH * 2;

/// The per-session CSRF secret.
///
/// Equality is constant time. `Debug` output is redacted and the bytes are
/// wiped when the value is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret([u8; TOKEN_LENGTH]);

impl Secret {
    /// Generate a new secret from the operating system's CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Wrap existing secret bytes.
    pub fn from_bytes(bytes: [u8; TOKEN_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Wrap a slice, which must be exactly [`TOKEN_LENGTH`] bytes long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; TOKEN_LENGTH] = bytes.try_into().ok()?;
        Some(Self(bytes))
    }

    /// The raw secret bytes.
    pub fn as_bytes(&self) -> &[u8; TOKEN_LENGTH] {
        &self.0
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        compare(&self.0, &other.0)
    }
}

impl Eq for Secret {}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Secret").field(&"***").finish()
    }
}

/// Compare two byte strings in constant time.
///
/// Slices of different lengths compare unequal without looking at their
/// contents.
pub fn compare(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Render `secret` as a masked, URL-safe token.
pub fn mask(secret: &Secret) -> String {
    let mut masked = [0u8; MASKED_LENGTH];
    let (pad, xored) = masked.split_at_mut(TOKEN_LENGTH);
    OsRng.fill_bytes(pad);

    for ((out, p), s) in xored.iter_mut().zip(pad.iter()).zip(secret.0.iter()) {
        *out = p ^ s;
    }

    let encoded = URL_SAFE_NO_PAD.encode(masked);
    masked.zeroize();
    encoded
}

/// Recover the secret from a masked token.
///
/// Returns `None` for anything that is not base64url of exactly
/// [`MASKED_LENGTH`] bytes.
pub fn unmask(masked: &str) -> Option<Secret> {
    let mut decoded = URL_SAFE_NO_PAD.decode(masked.trim()).ok()?;
    if decoded.len() != MASKED_LENGTH {
        decoded.zeroize();
        return None;
    }

    let (pad, xored) = decoded.split_at(TOKEN_LENGTH);
    let mut secret = [0u8; TOKEN_LENGTH];
    for ((out, p), x) in secret.iter_mut().zip(pad.iter()).zip(xored.iter()) {
        *out = p ^ x;
    }
    decoded.zeroize();

    Some(Secret(secret))
}

/// Check a submitted masked token against the stored secret.
pub fn verify(secret: &Secret, submitted: &str) -> bool {
    match unmask(submitted) {
        Some(candidate) => candidate == *secret,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_generate_is_random() {
        let a = Secret::generate();
        let b = Secret::generate();
        assert_ne!(a, b);
        assert_ne!(a.as_bytes(), &[0u8; TOKEN_LENGTH]);
    }

    #[test]
    fn test_from_slice_requires_exact_length() {
        assert!(Secret::from_slice(&[1u8; TOKEN_LENGTH]).is_some());
        assert!(Secret::from_slice(&[1u8; TOKEN_LENGTH - 1]).is_none());
        assert!(Secret::from_slice(&[1u8; TOKEN_LENGTH + 1]).is_none());
        assert!(Secret::from_slice(&[]).is_none());
    }

    #[test]
    fn test_debug_is_redacted() {
        let secret = Secret::from_bytes([0xab; TOKEN_LENGTH]);
        let rendered = format!("{:?}", secret);
        assert_eq!(rendered, "Secret(\"***\")");
    }

    #[test]
    fn test_mask_differs_per_render() {
        let secret = Secret::generate();
        let first = mask(&secret);
        let second = mask(&secret);

        assert_ne!(first, second);
        assert!(verify(&secret, &first));
        assert!(verify(&secret, &second));
    }

    #[test]
    fn test_mask_does_not_contain_secret() {
        let secret = Secret::from_bytes([0x42; TOKEN_LENGTH]);
        let masked = mask(&secret);
        assert!(!masked.contains(&URL_SAFE_NO_PAD.encode(secret.as_bytes())));
    }

    #[test]
    fn test_verify_rejects_foreign_token() {
        let secret = Secret::generate();
        let other = Secret::generate();
        assert!(!verify(&secret, &mask(&other)));
    }

    #[test]
    fn test_verify_rejects_unmasked_and_garbage() {
        let secret = Secret::generate();

        // the raw secret is only half the expected length
        assert!(!verify(&secret, &URL_SAFE_NO_PAD.encode(secret.as_bytes())));
        assert!(!verify(&secret, ""));
        assert!(!verify(&secret, "not base64 at all!"));
        assert!(!verify(&secret, &URL_SAFE_NO_PAD.encode([0u8; MASKED_LENGTH + 1])));
    }

    #[test]
    fn test_compare() {
        assert!(compare(b"abc", b"abc"));
        assert!(!compare(b"abc", b"abd"));
        assert!(!compare(b"abc", b"abcd"));
        assert!(!compare(b"", b"a"));
        assert!(compare(b"", b""));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_mask_unmask(bytes in prop::array::uniform32(any::<u8>())) {
            let secret = Secret::from_bytes(bytes);
            let recovered = unmask(&mask(&secret));
            prop_assert_eq!(recovered, Some(secret));
        }

        #[test]
        fn prop_compare_matches_eq(
            a in prop::collection::vec(any::<u8>(), 0..48),
            b in prop::collection::vec(any::<u8>(), 0..48),
        ) {
            prop_assert_eq!(compare(&a, &b), a == b);
        }
    }
}
