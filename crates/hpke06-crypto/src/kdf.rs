//! The labeled KDF of draft-06 section 4: `LabeledExtract` and
//! `LabeledExpand`.
//!
//! Every derivation in the protocol is bound to the HPKE version tag and a
//! suite ID. The suite ID is the 10-byte [`Suite::suite_id`] for the key
//! schedule and the exporter, and the 5-byte [`KemId::suite_id`] for all
//! KEM-internal derivations; mixing the two breaks interoperability.
//!
//! [`Suite::suite_id`]: crate::Suite::suite_id
//! [`KemId::suite_id`]: crate::KemId::suite_id

use crate::{CryptoError, CryptoProvider, IkmRef, KdfId, Okm, Prk, PrkRef};

/// The draft-06 version tag prepended to every labeled derivation.
pub const VERSION_LABEL: &[u8] = b"HPKE-06";

/// `LabeledExtract(salt, label, ikm)`:
///
/// ```text
/// labeled_ikm = concat("HPKE-06", suite_id, label, ikm)
/// return Extract(salt, labeled_ikm)
/// ```
///
/// # Errors
///
/// See [`CryptoError`].
pub fn labeled_extract<P: CryptoProvider>(
    provider: &P,
    alg: KdfId,
    suite_id: &[u8],
    salt: &[u8],
    label: &str,
    ikm: IkmRef<'_>,
) -> Result<Prk, CryptoError> {
    provider.kdf_extract_concated(
        alg,
        salt,
        &[
            IkmRef::from(VERSION_LABEL),
            IkmRef::from(suite_id),
            IkmRef::from(label.as_bytes()),
            ikm,
        ],
    )
}

/// `LabeledExpand(prk, label, info, L)`:
///
/// ```text
/// labeled_info = concat("HPKE-06", I2OSP(L, 2), suite_id, label, info)
/// return Expand(prk, labeled_info, L)
/// ```
///
/// # Errors
///
/// [`CryptoError::KdfExpandInvalidOutputLen`] when `len` does not fit in
/// 16 bits or exceeds the HKDF bound of `255 * Nh`; otherwise see
/// [`CryptoError`].
pub fn labeled_expand<'a, P, K>(
    provider: &P,
    alg: KdfId,
    suite_id: &[u8],
    prk: K,
    label: &'static str,
    info: &[u8],
    len: usize,
) -> Result<Okm, CryptoError>
where
    P: CryptoProvider,
    K: Into<PrkRef<'a>>,
{
    if len > usize::from(u16::MAX) || len > 255 * alg.n_hash() {
        return Err(CryptoError::KdfExpandInvalidOutputLen);
    }

    #[allow(clippy::cast_possible_truncation)]
    let len_prefix = (len as u16).to_be_bytes();

    provider.kdf_expand_multi_info(
        alg,
        prk.into(),
        &[
            VERSION_LABEL,
            &len_prefix,
            suite_id,
            label.as_bytes(),
            info,
        ],
        len,
    )
}
