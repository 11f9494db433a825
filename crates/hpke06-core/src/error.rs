//! Error types

use core::fmt;

use hpke06_crypto::CryptoError;

/// Protocol-level HPKE failures.
///
/// Primitive-layer failures are carried through in [`Error::Crypto`]; the
/// predicate helpers classify the cases callers usually dispatch on
/// without destructuring the provider error.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// `psk` and `psk_id` must either both be empty or both be set.
    InconsistentPsk,

    /// The selected mode requires a pre-shared key but none was provided.
    MissingPsk,

    /// The pre-shared key is shorter than the 32-byte entropy floor.
    InsecurePsk,

    /// The nonce sequence is spent; no further message may be sealed or
    /// opened with this context.
    MessageLimitReached,

    /// Failure of the underlying primitive layer.
    Crypto(CryptoError),
}

impl Error {
    /// True for an AEAD authentication failure on `Open` (tag mismatch,
    /// wrong associated data, out-of-order message).
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Crypto(CryptoError::AeadOpen))
    }

    /// True when key encapsulation or decapsulation failed: malformed key
    /// material, a point off the curve, or a KEM the provider cannot
    /// serve.
    pub const fn is_kem_failure(&self) -> bool {
        matches!(
            self,
            Self::Crypto(
                CryptoError::KemMalformedSkX
                    | CryptoError::KemMalformedPkX
                    | CryptoError::KemDeriveKeyPair
                    | CryptoError::KemUnsupported
            )
        )
    }

    /// True when a requested KDF output length exceeds `255 * Nh` or
    /// `2^16 - 1`.
    pub const fn is_output_too_long(&self) -> bool {
        matches!(self, Self::Crypto(CryptoError::KdfExpandInvalidOutputLen))
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Error::Crypto(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InconsistentPsk => write!(f, "inconsistent PSK inputs"),
            Error::MissingPsk => write!(f, "missing required PSK input"),
            Error::InsecurePsk => {
                write!(f, "PSK is too short (needs at least 32 bytes)")
            }
            Error::MessageLimitReached => {
                write!(f, "message limit reached for this AEAD key and nonce")
            }
            Error::Crypto(e) => write!(f, "crypto error: {e}"),
        }
    }
}

impl From<CryptoError> for Error {
    fn from(e: CryptoError) -> Self {
        Error::Crypto(e)
    }
}
