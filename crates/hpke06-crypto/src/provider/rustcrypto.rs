//! [`CryptoProvider`] implementation built on the RustCrypto crates.
//!
//! Requires the `provider-rustcrypto` feature (enabled by default).
//!
//! # Supported algorithms
//!
//! | KEM | Supported |
//! |:-:|:-:|
//! | DHKEM_P256_HKDF_SHA256 | yes |
//! | DHKEM_P384_HKDF_SHA384 | yes |
//! | DHKEM_P521_HKDF_SHA512 | no |
//! | DHKEM_X25519_HKDF_SHA256 | yes |
//! | DHKEM_X448_HKDF_SHA512 | no |
//!
//! All registered KDFs and AEADs are supported. Unsupported KEMs fail
//! with [`CryptoError::KemUnsupported`] at setup.

use alloc::vec::Vec;

use aead::{AeadInPlace, KeyInit};
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

use crate::{
    AeadId, AeadKey, CryptoError, CryptoProvider, IkmRef, KdfId, KemId, Okm, PrivateKey,
    PrivateKeyRef, Prk, PrkRef, PublicKey, PublicKeyRef, SharedSecret,
};

#[derive(Debug, Clone)]
/// See [module-level](self) documentation.
pub struct RustCryptoProvider {
    rng: ChaCha20Rng,
}

impl RustCryptoProvider {
    /// Prepare a provider, seeding its deterministic random stream from
    /// the operating system.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InsufficientRandomness`] when the operating system
    /// randomness source is unavailable.
    pub fn new() -> Result<Self, CryptoError> {
        let mut seed = <ChaCha20Rng as SeedableRng>::Seed::default();

        getrandom::getrandom(&mut seed).map_err(|_| CryptoError::InsufficientRandomness)?;

        Ok(Self {
            rng: ChaCha20Rng::from_seed(seed),
        })
    }
}

impl CryptoProvider for RustCryptoProvider {
    fn secure_random_fill(&mut self, buf: &mut [u8]) -> Result<(), CryptoError> {
        self.rng.fill_bytes(buf);

        Ok(())
    }

    fn is_kem_supported(&self, alg: KemId) -> bool {
        matches!(
            alg,
            KemId::DHKEM_P256_HKDF_SHA256
                | KemId::DHKEM_P384_HKDF_SHA384
                | KemId::DHKEM_X25519_HKDF_SHA256
        )
    }

    fn is_kdf_supported(&self, alg: KdfId) -> bool {
        matches!(
            alg,
            KdfId::HKDF_SHA256 | KdfId::HKDF_SHA384 | KdfId::HKDF_SHA512
        )
    }

    fn is_aead_supported(&self, alg: AeadId) -> bool {
        matches!(
            alg,
            AeadId::AES_128_GCM | AeadId::AES_256_GCM | AeadId::CHACHA20_POLY1305
        )
    }

    fn kdf_extract(&self, alg: KdfId, salt: &[u8], ikm: IkmRef<'_>) -> Result<Prk, CryptoError> {
        macro_rules! extract {
            ($hash:ty) => {{
                let (prk, _) = hkdf::Hkdf::<$hash>::extract(Some(salt), &ikm);
                Ok(Prk::from_bytes(prk.as_slice()))
            }};
        }

        match alg {
            KdfId::HKDF_SHA256 => extract!(sha2::Sha256),
            KdfId::HKDF_SHA384 => extract!(sha2::Sha384),
            KdfId::HKDF_SHA512 => extract!(sha2::Sha512),
        }
    }

    fn kdf_expand(
        &self,
        alg: KdfId,
        prk: PrkRef<'_>,
        info: &[u8],
        len: usize,
    ) -> Result<Okm, CryptoError> {
        macro_rules! expand {
            ($hash:ty) => {{
                let hkdf = hkdf::Hkdf::<$hash>::from_prk(&prk)
                    .map_err(|_| CryptoError::KdfExpandInvalidPrkLen)?;
                let mut okm = Okm::empty();
                hkdf.expand(info, okm.as_mut_buffer(len))
                    .map_err(|_| CryptoError::KdfExpandInvalidOutputLen)?;
                Ok(okm)
            }};
        }

        match alg {
            KdfId::HKDF_SHA256 => expand!(sha2::Sha256),
            KdfId::HKDF_SHA384 => expand!(sha2::Sha384),
            KdfId::HKDF_SHA512 => expand!(sha2::Sha512),
        }
    }

    fn kdf_expand_multi_info(
        &self,
        alg: KdfId,
        prk: PrkRef<'_>,
        infos: &[&[u8]],
        len: usize,
    ) -> Result<Okm, CryptoError> {
        macro_rules! expand {
            ($hash:ty) => {{
                let hkdf = hkdf::Hkdf::<$hash>::from_prk(&prk)
                    .map_err(|_| CryptoError::KdfExpandInvalidPrkLen)?;
                let mut okm = Okm::empty();
                hkdf.expand_multi_info(infos, okm.as_mut_buffer(len))
                    .map_err(|_| CryptoError::KdfExpandInvalidOutputLen)?;
                Ok(okm)
            }};
        }

        match alg {
            KdfId::HKDF_SHA256 => expand!(sha2::Sha256),
            KdfId::HKDF_SHA384 => expand!(sha2::Sha384),
            KdfId::HKDF_SHA512 => expand!(sha2::Sha512),
        }
    }

    fn aead_seal_in_place(
        &self,
        material: &AeadKey,
        aad: &[u8],
        buffer: &mut Vec<u8>,
    ) -> Result<(), CryptoError> {
        macro_rules! seal {
            ($cipher:ty, $key:expr, $nonce:expr) => {{
                let cipher = <$cipher>::new($key.into());
                cipher
                    .encrypt_in_place($nonce.into(), aad, buffer)
                    .map_err(|_| CryptoError::AeadSeal)
            }};
        }

        match material {
            AeadKey::Aes128Gcm { key, base_nonce } => {
                seal!(aes_gcm::Aes128Gcm, key, base_nonce)
            }
            AeadKey::Aes256Gcm { key, base_nonce } => {
                seal!(aes_gcm::Aes256Gcm, key, base_nonce)
            }
            AeadKey::ChaCha20Poly1305 { key, base_nonce } => {
                seal!(chacha20poly1305::ChaCha20Poly1305, key, base_nonce)
            }
        }
    }

    fn aead_open_in_place(
        &self,
        material: &AeadKey,
        aad: &[u8],
        buffer: &mut Vec<u8>,
    ) -> Result<(), CryptoError> {
        let _ = buffer
            .len()
            .checked_sub(material.aead_id().n_tag())
            .ok_or(CryptoError::AeadInvalidCt)?;

        macro_rules! open {
            ($cipher:ty, $key:expr, $nonce:expr) => {{
                let cipher = <$cipher>::new($key.into());
                cipher
                    .decrypt_in_place($nonce.into(), aad, buffer)
                    .map_err(|_| CryptoError::AeadOpen)
            }};
        }

        match material {
            AeadKey::Aes128Gcm { key, base_nonce } => {
                open!(aes_gcm::Aes128Gcm, key, base_nonce)
            }
            AeadKey::Aes256Gcm { key, base_nonce } => {
                open!(aes_gcm::Aes256Gcm, key, base_nonce)
            }
            AeadKey::ChaCha20Poly1305 { key, base_nonce } => {
                open!(chacha20poly1305::ChaCha20Poly1305, key, base_nonce)
            }
        }
    }

    fn sk(&self, alg: KemId, candidate: &[u8]) -> Result<PrivateKey, CryptoError> {
        if candidate.len() != alg.n_sk() {
            return Err(CryptoError::KemMalformedSkX);
        }

        macro_rules! sk {
            ($curve:ident) => {{
                let sk = $curve::SecretKey::from_bytes($curve::FieldBytes::from_slice(candidate))
                    .map_err(|_| CryptoError::KemMalformedSkX)?;

                PrivateKey::new(alg, sk.to_bytes().as_slice())
            }};
        }

        match alg {
            KemId::DHKEM_P256_HKDF_SHA256 => sk!(p256),
            KemId::DHKEM_P384_HKDF_SHA384 => sk!(p384),
            // Any 32-byte string is a valid X25519 scalar; clamping happens
            // inside the group operation.
            KemId::DHKEM_X25519_HKDF_SHA256 => PrivateKey::new(alg, candidate),
            KemId::DHKEM_P521_HKDF_SHA512 | KemId::DHKEM_X448_HKDF_SHA512 => {
                Err(CryptoError::KemUnsupported)
            }
        }
    }

    fn pk(&self, alg: KemId, sk: PrivateKeyRef<'_>) -> Result<PublicKey, CryptoError> {
        macro_rules! pk {
            ($curve:ident) => {{
                use elliptic_curve::sec1::ToEncodedPoint as _;

                if sk.len() != alg.n_sk() {
                    return Err(CryptoError::KemMalformedSkX);
                }

                let sk = $curve::SecretKey::from_bytes($curve::FieldBytes::from_slice(&sk))
                    .map_err(|_| CryptoError::KemMalformedSkX)?;

                PublicKey::new(
                    alg,
                    sk.public_key()
                        .to_encoded_point(false)
                        .as_bytes(),
                )
            }};
        }

        match alg {
            KemId::DHKEM_P256_HKDF_SHA256 => pk!(p256),
            KemId::DHKEM_P384_HKDF_SHA384 => pk!(p384),
            KemId::DHKEM_X25519_HKDF_SHA256 => {
                let sk = x25519_dalek::StaticSecret::from(
                    <[u8; 32]>::try_from(sk.as_ref()).map_err(|_| CryptoError::KemMalformedSkX)?,
                );
                let pk = x25519_dalek::PublicKey::from(&sk);

                PublicKey::new(alg, pk.as_bytes())
            }
            KemId::DHKEM_P521_HKDF_SHA512 | KemId::DHKEM_X448_HKDF_SHA512 => {
                Err(CryptoError::KemUnsupported)
            }
        }
    }

    fn dh(
        &self,
        alg: KemId,
        sk_x: PrivateKeyRef<'_>,
        pk_y: PublicKeyRef<'_>,
    ) -> Result<SharedSecret, CryptoError> {
        macro_rules! dh {
            ($curve:ident) => {{
                if sk_x.len() != alg.n_sk() {
                    return Err(CryptoError::KemMalformedSkX);
                }

                let sk = $curve::SecretKey::from_bytes($curve::FieldBytes::from_slice(&sk_x))
                    .map_err(|_| CryptoError::KemMalformedSkX)?;
                let pk = $curve::PublicKey::from_sec1_bytes(&pk_y)
                    .map_err(|_| CryptoError::KemMalformedPkX)?;

                Ok(SharedSecret::new(
                    elliptic_curve::ecdh::diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine())
                        .raw_secret_bytes()
                        .as_slice(),
                ))
            }};
        }

        match alg {
            KemId::DHKEM_P256_HKDF_SHA256 => dh!(p256),
            KemId::DHKEM_P384_HKDF_SHA384 => dh!(p384),
            KemId::DHKEM_X25519_HKDF_SHA256 => {
                let sk = x25519_dalek::StaticSecret::from(
                    <[u8; 32]>::try_from(sk_x.as_ref())
                        .map_err(|_| CryptoError::KemMalformedSkX)?,
                );
                let pk = x25519_dalek::PublicKey::from(
                    <[u8; 32]>::try_from(pk_y.as_ref())
                        .map_err(|_| CryptoError::KemMalformedPkX)?,
                );

                Ok(SharedSecret::new(sk.diffie_hellman(&pk).as_bytes()))
            }
            KemId::DHKEM_P521_HKDF_SHA512 | KemId::DHKEM_X448_HKDF_SHA512 => {
                Err(CryptoError::KemUnsupported)
            }
        }
    }
}
