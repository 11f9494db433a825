//! Labeled KDF known answers and output-length bounds.

use hpke06_crypto::provider::RustCryptoProvider;
use hpke06_crypto::{kdf, CryptoError, IkmRef, KdfId};

// suite_id of (DHKEM_X25519_HKDF_SHA256, HKDF_SHA256, AES_128_GCM)
const SUITE_ID: [u8; 10] = [b'H', b'P', b'K', b'E', 0x00, 0x20, 0x00, 0x01, 0x00, 0x01];

const EXTRACTED: [u8; 32] = [
    22, 155, 198, 210, 237, 123, 222, 18, 193, 137, 153, 114, 62, 196, 224, 113, 184, 223, 231,
    73, 176, 117, 133, 251, 235, 159, 177, 247, 253, 204, 94, 245,
];

const EXPANDED: [u8; 32] = [
    220, 167, 184, 139, 100, 72, 37, 61, 145, 158, 139, 210, 67, 44, 235, 164, 174, 228, 175,
    145, 3, 15, 239, 206, 92, 143, 79, 63, 41, 53, 154, 157,
];

#[test]
fn labeled_kdf_known_answer() {
    let provider = RustCryptoProvider::new().unwrap();

    let prk = kdf::labeled_extract(
        &provider,
        KdfId::HKDF_SHA256,
        &SUITE_ID,
        b"kat salt",
        "kat",
        IkmRef::from(b"kat input keying material".as_slice()),
    )
    .unwrap();

    assert_eq!(&*prk, &EXTRACTED);

    let okm = kdf::labeled_expand(
        &provider,
        KdfId::HKDF_SHA256,
        &SUITE_ID,
        &prk,
        "kat",
        b"kat info",
        32,
    )
    .unwrap();

    assert_eq!(&*okm, &EXPANDED);
}

#[test]
fn labeled_kdf_separates_labels_and_suites() {
    let provider = RustCryptoProvider::new().unwrap();
    let ikm = IkmRef::from(b"shared ikm".as_slice());

    let base = kdf::labeled_extract(&provider, KdfId::HKDF_SHA256, &SUITE_ID, b"", "one", ikm)
        .unwrap();
    let other_label =
        kdf::labeled_extract(&provider, KdfId::HKDF_SHA256, &SUITE_ID, b"", "two", ikm).unwrap();

    let mut other_suite_id = SUITE_ID;
    other_suite_id[9] = 0x03;
    let other_suite =
        kdf::labeled_extract(&provider, KdfId::HKDF_SHA256, &other_suite_id, b"", "one", ikm)
            .unwrap();

    assert_ne!(base, other_label);
    assert_ne!(base, other_suite);
}

#[test_case::test_matrix([KdfId::HKDF_SHA256, KdfId::HKDF_SHA384, KdfId::HKDF_SHA512])]
fn labeled_expand_length_bounds(alg: KdfId) {
    let provider = RustCryptoProvider::new().unwrap();

    let prk = kdf::labeled_extract(
        &provider,
        alg,
        &SUITE_ID,
        b"",
        "bounds",
        IkmRef::from(b"bounds ikm".as_slice()),
    )
    .unwrap();

    let max = 255 * alg.n_hash();

    let okm = kdf::labeled_expand(&provider, alg, &SUITE_ID, &prk, "bounds", b"", max).unwrap();
    assert_eq!(okm.len(), max);

    assert_eq!(
        kdf::labeled_expand(&provider, alg, &SUITE_ID, &prk, "bounds", b"", max + 1).unwrap_err(),
        CryptoError::KdfExpandInvalidOutputLen
    );

    assert_eq!(
        kdf::labeled_expand(&provider, alg, &SUITE_ID, &prk, "bounds", b"", 0x1_0000).unwrap_err(),
        CryptoError::KdfExpandInvalidOutputLen
    );
}

#[test]
fn expand_rejects_short_prk() {
    let provider = RustCryptoProvider::new().unwrap();

    let short = hpke06_crypto::Prk::from_bytes(&[0u8; 16]);

    assert_eq!(
        kdf::labeled_expand(
            &provider,
            KdfId::HKDF_SHA256,
            &SUITE_ID,
            &short,
            "bounds",
            b"",
            32,
        )
        .unwrap_err(),
        CryptoError::KdfExpandInvalidPrkLen
    );
}
