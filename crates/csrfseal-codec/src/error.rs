//! Codec error types

use thiserror::Error;

/// Errors produced while sealing or opening a value.
///
/// Messages are deliberately coarse: they never say which byte or which part
/// of a MAC failed to match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// No signing key is configured.
    #[error("no signing key configured")]
    MissingKey,

    /// The signing key was rejected by the MAC implementation.
    #[error("signing key rejected")]
    InvalidKey,

    /// The sealed value is longer than the codec accepts or produces.
    #[error("sealed value exceeds the maximum length of {max} bytes")]
    TooLong {
        /// Configured maximum length.
        max: usize,
    },

    /// The sealed value is not in the expected format.
    #[error("sealed value is malformed")]
    Malformed,

    /// The MAC did not verify under any known key.
    #[error("sealed value failed verification")]
    InvalidMac,

    /// The sealed value is older than the codec's maximum age.
    #[error("sealed value has expired")]
    Expired,

    /// The system clock reports a time before the unix epoch.
    #[error("system clock is before the unix epoch")]
    Clock,
}

impl CodecError {
    /// Whether this error means the codec itself is misconfigured, as opposed
    /// to the sealed input being bad.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(self, Self::MissingKey | Self::InvalidKey | Self::Clock)
    }
}
