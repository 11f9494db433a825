//! Round-trip smoke tests over the full mode x suite matrix.

use hpke06_core::*;
use hpke06_crypto::provider::RustCryptoProvider;

#[test_case::test_matrix(
    [
        Mode::Base,
        Mode::Psk,
        Mode::Auth,
        Mode::AuthPsk
    ],
    [
        KemId::DHKEM_P256_HKDF_SHA256,
        KemId::DHKEM_P384_HKDF_SHA384,
        KemId::DHKEM_P521_HKDF_SHA512,
        KemId::DHKEM_X25519_HKDF_SHA256,
        KemId::DHKEM_X448_HKDF_SHA512
    ],
    [
        KdfId::HKDF_SHA256,
        KdfId::HKDF_SHA384,
        KdfId::HKDF_SHA512
    ],
    [
        AeadId::AES_128_GCM,
        AeadId::AES_256_GCM,
        AeadId::CHACHA20_POLY1305
    ]
)]
fn roundtrip(mode: Mode, kem_id: KemId, kdf_id: KdfId, aead_id: AeadId) {
    let hpke = Hpke::prepare(Suite::new(kem_id, kdf_id, aead_id));

    let mut provider = RustCryptoProvider::new().unwrap();

    if !provider.is_kem_supported(kem_id) {
        // The provider cannot serve this KEM; setup must refuse cleanly.
        let junk_pk = vec![0u8; kem_id.n_pk()];
        let err = hpke
            .setup_base_s(
                RustCryptoProvider::new().unwrap(),
                PublicKeyRef::from(junk_pk.as_slice()),
                b"info",
            )
            .unwrap_err();
        assert!(err.is_kem_failure());
        return;
    }

    let (sk_r, pk_r) = kem::generate_key_pair(&mut provider, kem_id).unwrap();
    let (sk_s, pk_s) = kem::generate_key_pair(&mut provider, kem_id).unwrap();

    let mut psk = [0u8; 32];
    provider.secure_random_fill(&mut psk).unwrap();
    let psk_id = b"roundtrip psk id";

    let info = b"roundtrip info";

    let sender_mode = match mode {
        Mode::Base => SenderMode::Base,
        Mode::Psk => SenderMode::Psk { psk: &psk, psk_id },
        Mode::Auth => SenderMode::Auth {
            sk_s: (&sk_s).into(),
        },
        Mode::AuthPsk => SenderMode::AuthPsk {
            sk_s: (&sk_s).into(),
            psk: &psk,
            psk_id,
        },
    };

    let receiver_mode = match mode {
        Mode::Base => ReceiverMode::Base,
        Mode::Psk => ReceiverMode::Psk { psk: &psk, psk_id },
        Mode::Auth => ReceiverMode::Auth {
            pk_s: (&pk_s).into(),
        },
        Mode::AuthPsk => ReceiverMode::AuthPsk {
            pk_s: (&pk_s).into(),
            psk: &psk,
            psk_id,
        },
    };

    let (enc, mut sealer) = hpke
        .setup_sender(
            RustCryptoProvider::new().unwrap(),
            (&pk_r).into(),
            info,
            sender_mode,
        )
        .unwrap();

    assert_eq!(enc.len(), kem_id.n_enc());

    let mut opener = hpke
        .setup_receiver(provider, (&enc).into(), (&sk_r).into(), info, receiver_mode)
        .unwrap();

    // A short ordered conversation with varying aad.
    for i in 0..8u8 {
        let pt = [b"message ".as_slice(), &[b'0' + i][..]].concat();
        let aad = [b"aad ".as_slice(), &[i][..]].concat();

        let ct = sealer.seal(&pt, &aad).unwrap();
        assert_eq!(ct.len(), pt.len() + aead_id.n_tag());

        assert_eq!(opener.open(&ct, &aad).unwrap(), pt);
    }

    // Export symmetry, including an Nh-sized and a one-byte output.
    for (ctx, len) in [(b"roundtrip exporter".as_slice(), 32), (b"".as_slice(), 1)] {
        assert_eq!(
            sealer.export(ctx, len).unwrap(),
            opener.export(ctx, len).unwrap(),
        );
    }
}
