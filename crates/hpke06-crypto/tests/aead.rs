//! AEAD seal/open behaviour of the RustCrypto provider.

use hpke06_crypto::provider::RustCryptoProvider;
use hpke06_crypto::{AeadKey, CryptoError, CryptoProvider};

const KEY_16: [u8; 16] = [
    0x5b, 0x96, 0x04, 0xfe, 0x14, 0xea, 0xdb, 0xa9, 0x31, 0xb0, 0xcc, 0xf3, 0x48, 0x43, 0xda,
    0xb9,
];
const KEY_32: [u8; 32] = [
    0x5b, 0x96, 0x04, 0xfe, 0x14, 0xea, 0xdb, 0xa9, 0x31, 0xb0, 0xcc, 0xf3, 0x48, 0x43, 0xda,
    0xb9, 0x07, 0x1f, 0x33, 0xce, 0xa1, 0x44, 0x6c, 0x0b, 0xac, 0x2d, 0x21, 0x68, 0xfa, 0x7c,
    0xe4, 0x4d,
];
const NONCE: [u8; 12] = [
    0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c,
];

fn materials() -> [AeadKey; 3] {
    [
        AeadKey::Aes128Gcm {
            key: KEY_16,
            base_nonce: NONCE,
        },
        AeadKey::Aes256Gcm {
            key: KEY_32,
            base_nonce: NONCE,
        },
        AeadKey::ChaCha20Poly1305 {
            key: KEY_32,
            base_nonce: NONCE,
        },
    ]
}

#[test]
fn seal_open_roundtrip() {
    let provider = RustCryptoProvider::new().unwrap();
    let aad = [0x03, 0x04, 0x05];
    let plaintext = b"test message";

    for material in materials() {
        let ct = provider
            .aead_seal(&material, &aad, plaintext)
            .unwrap();

        assert_eq!(ct.len(), plaintext.len() + material.aead_id().n_tag());

        assert_eq!(
            &provider
                .aead_open(&material, &aad, &ct)
                .unwrap(),
            plaintext
        );
    }
}

#[test]
fn open_rejects_tampering() {
    let provider = RustCryptoProvider::new().unwrap();
    let aad = b"binding";
    let plaintext = b"test message";

    for material in materials() {
        let ct = provider
            .aead_seal(&material, aad, plaintext)
            .unwrap();

        let mut flipped = ct.clone();
        flipped[0] ^= 0x01;
        assert_eq!(
            provider
                .aead_open(&material, aad, &flipped)
                .unwrap_err(),
            CryptoError::AeadOpen
        );

        assert_eq!(
            provider
                .aead_open(&material, b"other aad", &ct)
                .unwrap_err(),
            CryptoError::AeadOpen
        );
    }
}

#[test]
fn open_rejects_truncated_ciphertext() {
    let provider = RustCryptoProvider::new().unwrap();

    for material in materials() {
        let short = vec![0u8; material.aead_id().n_tag() - 1];

        assert_eq!(
            provider
                .aead_open(&material, b"", &short)
                .unwrap_err(),
            CryptoError::AeadInvalidCt
        );
    }
}

#[test]
fn nonce_update_copies_material() {
    let material = AeadKey::Aes128Gcm {
        key: KEY_16,
        base_nonce: NONCE,
    };

    let bumped = material.clone_with_nonce(|nonce| nonce[11] ^= 0xff);

    assert_eq!(material.base_nonce(), &NONCE);
    assert_eq!(bumped.base_nonce()[11], NONCE[11] ^ 0xff);
    assert_eq!(bumped.key(), material.key());
}
