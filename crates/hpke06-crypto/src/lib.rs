#![doc = include_str!("../README.md")]
#![no_std]
#![forbid(unsafe_code, unused_must_use, unstable_features)]
#![deny(
    trivial_casts,
    trivial_numeric_casts,
    missing_docs,
    unused_import_braces,
    unused_extern_crates,
    unused_qualifications
)]
#![allow(clippy::must_use_candidate)]

pub mod kdf;
pub mod provider;

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use alloc::vec::Vec;
use core::fmt;

use smallvec::SmallVec;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// Raw cryptographic operations consumed by the HPKE machinery.
///
/// A provider supplies the KDF `Extract`/`Expand` pair, the AEAD
/// `Seal`/`Open` pair and the Diffie-Hellman group operations of the
/// registered DHKEMs. The DHKEM construction itself (encapsulation, key
/// derivation) is built on top of this trait in `hpke06-core`; providers
/// never see HPKE labels or suite IDs.
///
/// Provider support may be partial: the `is_*_supported` probes report
/// which registry entries a provider can serve, and unsupported algorithms
/// fail with the corresponding [`CryptoError`] variant.
pub trait CryptoProvider: fmt::Debug + Send + Sync {
    /// Fill `buf` with cryptographically secure random bytes.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InsufficientRandomness`] when the randomness source
    /// fails.
    fn secure_random_fill(&mut self, buf: &mut [u8]) -> Result<(), CryptoError>;

    /// Whether this provider can serve the given KEM.
    fn is_kem_supported(&self, alg: KemId) -> bool;

    /// Whether this provider can serve the given KDF.
    fn is_kdf_supported(&self, alg: KdfId) -> bool;

    /// Whether this provider can serve the given AEAD.
    fn is_aead_supported(&self, alg: AeadId) -> bool;

    /// `Extract(salt, ikm)`: extract a pseudorandom key of `Nh` bytes from
    /// input keying material `ikm` and an optional `salt`.
    ///
    /// # Errors
    ///
    /// See [`CryptoError`].
    fn kdf_extract(&self, alg: KdfId, salt: &[u8], ikm: IkmRef<'_>) -> Result<Prk, CryptoError>;

    /// [`kdf_extract`](Self::kdf_extract) over the concatenation of several
    /// input keying materials.
    ///
    /// The default implementation concatenates into a scratch buffer.
    /// Providers whose HKDF accepts segmented input may override it to
    /// avoid the copy.
    ///
    /// # Errors
    ///
    /// See [`CryptoError`].
    fn kdf_extract_concated(
        &self,
        alg: KdfId,
        salt: &[u8],
        ikms: &[IkmRef<'_>],
    ) -> Result<Prk, CryptoError> {
        let mut concated = Vec::new();

        for ikm in ikms {
            concated.extend_from_slice(ikm);
        }

        let prk = self.kdf_extract(alg, salt, IkmRef::from(concated.as_slice()));

        concated.zeroize();

        prk
    }

    /// `Expand(prk, info, L)`: expand the pseudorandom key `prk` with the
    /// context string `info` into `len` bytes of output keying material.
    ///
    /// # Errors
    ///
    /// [`CryptoError::KdfExpandInvalidPrkLen`] when `prk` is shorter than
    /// `Nh`, [`CryptoError::KdfExpandInvalidOutputLen`] when `len` exceeds
    /// `255 * Nh`.
    fn kdf_expand(
        &self,
        alg: KdfId,
        prk: PrkRef<'_>,
        info: &[u8],
        len: usize,
    ) -> Result<Okm, CryptoError>;

    /// [`kdf_expand`](Self::kdf_expand) over the concatenation of several
    /// info segments.
    ///
    /// # Errors
    ///
    /// See [`kdf_expand`](Self::kdf_expand).
    fn kdf_expand_multi_info(
        &self,
        alg: KdfId,
        prk: PrkRef<'_>,
        infos: &[&[u8]],
        len: usize,
    ) -> Result<Okm, CryptoError> {
        self.kdf_expand(alg, prk, &infos.concat(), len)
    }

    /// `Seal(key, nonce, aad, pt)`: encrypt and authenticate `plaintext`
    /// with associated data `aad`, returning ciphertext with the
    /// authentication tag appended.
    ///
    /// # Errors
    ///
    /// See [`CryptoError`].
    fn aead_seal(
        &self,
        material: &AeadKey,
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let mut buffer = plaintext.to_vec();
        self.aead_seal_in_place(material, aad, &mut buffer)?;
        Ok(buffer)
    }

    /// In-place [`aead_seal`](Self::aead_seal): on entry `buffer` holds the
    /// plaintext, on success it holds ciphertext plus tag.
    ///
    /// # Errors
    ///
    /// See [`CryptoError`].
    fn aead_seal_in_place(
        &self,
        material: &AeadKey,
        aad: &[u8],
        buffer: &mut Vec<u8>,
    ) -> Result<(), CryptoError>;

    /// `Open(key, nonce, aad, ct)`: decrypt and verify `ciphertext`
    /// (which carries the tag) with associated data `aad`.
    ///
    /// # Errors
    ///
    /// [`CryptoError::AeadOpen`] on tag mismatch.
    fn aead_open(
        &self,
        material: &AeadKey,
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let mut buffer = ciphertext.to_vec();
        self.aead_open_in_place(material, aad, &mut buffer)?;
        Ok(buffer)
    }

    /// In-place [`aead_open`](Self::aead_open): on entry `buffer` holds
    /// ciphertext plus tag, on success it holds the plaintext.
    ///
    /// Implementations may clear the buffer on failure.
    ///
    /// # Errors
    ///
    /// See [`aead_open`](Self::aead_open).
    fn aead_open_in_place(
        &self,
        material: &AeadKey,
        aad: &[u8],
        buffer: &mut Vec<u8>,
    ) -> Result<(), CryptoError>;

    /// Validate `candidate` as a private key for the KEM's group and wrap
    /// it in a [`PrivateKey`].
    ///
    /// # Errors
    ///
    /// [`CryptoError::KemMalformedSkX`] when the bytes do not encode a
    /// valid scalar (zero, or not below the group order).
    fn sk(&self, alg: KemId, candidate: &[u8]) -> Result<PrivateKey, CryptoError>;

    /// `pk(skX)`: compute the serialized public key corresponding to `sk`.
    ///
    /// # Errors
    ///
    /// See [`CryptoError`].
    fn pk(&self, alg: KemId, sk: PrivateKeyRef<'_>) -> Result<PublicKey, CryptoError>;

    /// `DH(skX, pkY)`: non-interactive Diffie-Hellman exchange producing a
    /// shared secret of length `Ndh`.
    ///
    /// # Errors
    ///
    /// See [`CryptoError`].
    fn dh(
        &self,
        alg: KemId,
        sk_x: PrivateKeyRef<'_>,
        pk_y: PublicKeyRef<'_>,
    ) -> Result<SharedSecret, CryptoError>;
}

#[derive(Debug, PartialEq, Eq)]
/// Failures of the raw primitive layer.
pub enum CryptoError {
    /// `Expand()` was given a PRK shorter than `Nh`.
    KdfExpandInvalidPrkLen,

    /// `Expand()` output length exceeds `255 * Nh` or `2^16 - 1`.
    KdfExpandInvalidOutputLen,

    /// No valid private key could be derived from the input keying
    /// material within 256 rejection-sampling rounds.
    KemDeriveKeyPair,

    /// The bytes do not encode a valid private key for the KEM.
    KemMalformedSkX,

    /// The bytes do not encode a valid public key for the KEM (wrong
    /// length, or a point off the curve).
    KemMalformedPkX,

    /// The KEM is not supported by this provider.
    KemUnsupported,

    /// Invalid key length for the AEAD.
    AeadInvalidKey,

    /// Invalid nonce length for the AEAD.
    AeadInvalidNonce,

    /// The ciphertext is shorter than the authentication tag.
    AeadInvalidCt,

    /// AEAD encryption failed.
    AeadSeal,

    /// AEAD tag verification failed.
    AeadOpen,

    /// The randomness source failed.
    InsufficientRandomness,
}

impl core::error::Error for CryptoError {}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KdfExpandInvalidPrkLen => write!(f, "KDF expand: invalid PRK length"),
            Self::KdfExpandInvalidOutputLen => write!(f, "KDF expand: invalid output length"),
            Self::KemDeriveKeyPair => write!(f, "KEM key pair derivation failed"),
            Self::KemMalformedSkX => write!(f, "KEM malformed private key"),
            Self::KemMalformedPkX => write!(f, "KEM malformed public key"),
            Self::KemUnsupported => write!(f, "KEM unsupported by this provider"),
            Self::AeadInvalidKey => write!(f, "AEAD invalid key"),
            Self::AeadInvalidNonce => write!(f, "AEAD invalid nonce"),
            Self::AeadInvalidCt => write!(f, "AEAD invalid ciphertext"),
            Self::AeadSeal => write!(f, "AEAD seal error"),
            Self::AeadOpen => write!(f, "AEAD open error"),
            Self::InsufficientRandomness => write!(f, "insufficient randomness"),
        }
    }
}

// === Algorithm registries ===

macro_rules! registry {
    (
        type Error = $error:ident;
        #[repr($uint:ty)]
        $(#[$enum_meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[doc = $doc:literal])*
                $variant:ident = $value:literal,
            )+
        }
    ) => {
        #[non_exhaustive]
        #[allow(non_camel_case_types)]
        #[derive(PartialEq, Eq, Clone, Copy, Hash)]
        #[repr($uint)]
        $(#[$enum_meta])*
        $vis enum $name {
            $(
                $(#[doc = $doc])*
                $variant = $value,
            )+
        }

        impl $name {
            #[inline]
            /// Registry lookup from the wire-format code point.
            ///
            /// # Errors
            ///
            /// Unknown code points are rejected.
            $vis const fn try_from_int(x: $uint) -> Result<Self, $error> {
                match x {
                    $( $value => Ok(Self::$variant), )+
                    other => Err($error(other)),
                }
            }

            #[inline]
            /// The wire-format code point of this algorithm.
            $vis const fn to_int(self) -> $uint {
                self as $uint
            }

            #[inline]
            /// The big-endian encoding of the code point.
            $vis const fn to_be_bytes(self) -> [u8; core::mem::size_of::<$uint>()] {
                self.to_int().to_be_bytes()
            }
        }

        impl From<$name> for $uint {
            fn from(value: $name) -> Self {
                value.to_int()
            }
        }

        impl TryFrom<$uint> for $name {
            type Error = $error;

            fn try_from(x: $uint) -> Result<Self, Self::Error> {
                Self::try_from_int(x)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $( Self::$variant => f.write_str(stringify!($variant)), )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{self:?}")
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                self.to_int().serialize(serializer)
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let v = <$uint>::deserialize(deserializer)?;

                Self::try_from(v).map_err(serde::de::Error::custom)
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// An unknown KEM code point.
pub struct UnknownKemId(pub u16);

impl core::error::Error for UnknownKemId {}

impl fmt::Display for UnknownKemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown KEM ID: {:#06x}", self.0)
    }
}

registry!(
    type Error = UnknownKemId;

    #[repr(u16)]
    /// Key Encapsulation Mechanism identifiers, draft-06 section 7.1.
    pub enum KemId {
        /// DHKEM(P-256, HKDF-SHA256)
        DHKEM_P256_HKDF_SHA256 = 0x0010,

        /// DHKEM(P-384, HKDF-SHA384)
        DHKEM_P384_HKDF_SHA384 = 0x0011,

        /// DHKEM(P-521, HKDF-SHA512)
        DHKEM_P521_HKDF_SHA512 = 0x0012,

        /// DHKEM(X25519, HKDF-SHA256)
        DHKEM_X25519_HKDF_SHA256 = 0x0020,

        /// DHKEM(X448, HKDF-SHA512)
        DHKEM_X448_HKDF_SHA512 = 0x0021,
    }
);

impl KemId {
    #[inline]
    /// The KDF paired with this DHKEM for its internal derivations.
    pub const fn kdf_id(self) -> KdfId {
        match self {
            Self::DHKEM_P256_HKDF_SHA256 | Self::DHKEM_X25519_HKDF_SHA256 => KdfId::HKDF_SHA256,
            Self::DHKEM_P384_HKDF_SHA384 => KdfId::HKDF_SHA384,
            Self::DHKEM_P521_HKDF_SHA512 | Self::DHKEM_X448_HKDF_SHA512 => KdfId::HKDF_SHA512,
        }
    }

    /// The 5-byte `"KEM" || I2OSP(kem_id, 2)` tag scoping all KEM-internal
    /// labeled derivations.
    ///
    /// # Example
    ///
    /// ```
    /// # use hpke06_crypto::KemId;
    /// assert_eq!(
    ///     KemId::DHKEM_X25519_HKDF_SHA256.suite_id(),
    ///     [b'K', b'E', b'M', 0x00, 0x20]
    /// );
    /// ```
    pub const fn suite_id(self) -> [u8; 5] {
        let id = self.to_be_bytes();

        [b'K', b'E', b'M', id[0], id[1]]
    }

    #[inline]
    /// Length in bytes of the KEM shared secret (`Nsecret`).
    pub const fn n_secret(self) -> usize {
        match self {
            Self::DHKEM_P256_HKDF_SHA256 | Self::DHKEM_X25519_HKDF_SHA256 => 32,
            Self::DHKEM_P384_HKDF_SHA384 => 48,
            Self::DHKEM_P521_HKDF_SHA512 | Self::DHKEM_X448_HKDF_SHA512 => 64,
        }
    }

    #[inline]
    /// Length in bytes of the encapsulated key (`Nenc`).
    pub const fn n_enc(self) -> usize {
        self.n_pk()
    }

    #[inline]
    /// Length in bytes of a serialized public key (`Npk`).
    pub const fn n_pk(self) -> usize {
        match self {
            Self::DHKEM_P256_HKDF_SHA256 => 65,
            Self::DHKEM_P384_HKDF_SHA384 => 97,
            Self::DHKEM_P521_HKDF_SHA512 => 133,
            Self::DHKEM_X25519_HKDF_SHA256 => 32,
            Self::DHKEM_X448_HKDF_SHA512 => 56,
        }
    }

    #[inline]
    /// Length in bytes of a serialized private key (`Nsk`).
    pub const fn n_sk(self) -> usize {
        match self {
            Self::DHKEM_P256_HKDF_SHA256 | Self::DHKEM_X25519_HKDF_SHA256 => 32,
            Self::DHKEM_P384_HKDF_SHA384 => 48,
            Self::DHKEM_P521_HKDF_SHA512 => 66,
            Self::DHKEM_X448_HKDF_SHA512 => 56,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// An unknown KDF code point.
pub struct UnknownKdfId(pub u16);

impl core::error::Error for UnknownKdfId {}

impl fmt::Display for UnknownKdfId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown KDF ID: {:#06x}", self.0)
    }
}

registry!(
    type Error = UnknownKdfId;

    #[repr(u16)]
    /// Key Derivation Function identifiers, draft-06 section 7.2.
    pub enum KdfId {
        /// HKDF-SHA256
        HKDF_SHA256 = 0x0001,

        /// HKDF-SHA384
        HKDF_SHA384 = 0x0002,

        /// HKDF-SHA512
        HKDF_SHA512 = 0x0003,
    }
);

impl KdfId {
    #[inline]
    /// Length in bytes of the KDF hash output (`Nh`).
    pub const fn n_hash(self) -> usize {
        match self {
            Self::HKDF_SHA256 => 32,
            Self::HKDF_SHA384 => 48,
            Self::HKDF_SHA512 => 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// An unknown AEAD code point.
pub struct UnknownAeadId(pub u16);

impl core::error::Error for UnknownAeadId {}

impl fmt::Display for UnknownAeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown AEAD ID: {:#06x}", self.0)
    }
}

registry!(
    type Error = UnknownAeadId;

    #[repr(u16)]
    /// AEAD identifiers, draft-06 section 7.3.
    pub enum AeadId {
        /// AES-128-GCM
        AES_128_GCM = 0x0001,

        /// AES-256-GCM
        AES_256_GCM = 0x0002,

        /// ChaCha20Poly1305
        CHACHA20_POLY1305 = 0x0003,
    }
);

impl AeadId {
    #[inline]
    /// Length in bytes of the AEAD key (`Nk`).
    pub const fn n_key(self) -> usize {
        match self {
            Self::AES_128_GCM => 16,
            Self::AES_256_GCM | Self::CHACHA20_POLY1305 => 32,
        }
    }

    #[inline]
    /// Length in bytes of the AEAD nonce (`Nn`).
    pub const fn n_nonce(self) -> usize {
        match self {
            Self::AES_128_GCM | Self::AES_256_GCM | Self::CHACHA20_POLY1305 => 12,
        }
    }

    #[inline]
    /// Length in bytes of the authentication tag (`Nt`).
    pub const fn n_tag(self) -> usize {
        match self {
            Self::AES_128_GCM | Self::AES_256_GCM | Self::CHACHA20_POLY1305 => 16,
        }
    }

    /// Bind an expanded `key` and `base_nonce` into the AEAD key material
    /// for this algorithm.
    ///
    /// # Errors
    ///
    /// [`CryptoError::AeadInvalidKey`] / [`CryptoError::AeadInvalidNonce`]
    /// when the lengths do not match `Nk` / `Nn`.
    pub fn key_material(self, key: &[u8], base_nonce: &[u8]) -> Result<AeadKey, CryptoError> {
        let base_nonce = base_nonce
            .try_into()
            .map_err(|_| CryptoError::AeadInvalidNonce)?;

        Ok(match self {
            Self::AES_128_GCM => AeadKey::Aes128Gcm {
                key: key
                    .try_into()
                    .map_err(|_| CryptoError::AeadInvalidKey)?,
                base_nonce,
            },
            Self::AES_256_GCM => AeadKey::Aes256Gcm {
                key: key
                    .try_into()
                    .map_err(|_| CryptoError::AeadInvalidKey)?,
                base_nonce,
            },
            Self::CHACHA20_POLY1305 => AeadKey::ChaCha20Poly1305 {
                key: key
                    .try_into()
                    .map_err(|_| CryptoError::AeadInvalidKey)?,
                base_nonce,
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// A ciphersuite: the (KEM, KDF, AEAD) triple parameterising one HPKE
/// instantiation.
pub struct Suite {
    /// KEM algorithm identifier.
    pub kem_id: KemId,

    /// KDF algorithm identifier.
    pub kdf_id: KdfId,

    /// AEAD algorithm identifier.
    pub aead_id: AeadId,
}

impl Suite {
    #[inline]
    /// Assembles a suite from already-validated identifiers.
    pub const fn new(kem_id: KemId, kdf_id: KdfId, aead_id: AeadId) -> Self {
        Self {
            kem_id,
            kdf_id,
            aead_id,
        }
    }

    /// Registry lookup from wire-format code points.
    ///
    /// This is the only way an unknown algorithm can reach this library;
    /// every [`Suite`] value is valid by construction.
    ///
    /// # Errors
    ///
    /// [`InvalidSuite`] naming the offending code point.
    pub const fn try_from_ids(kem: u16, kdf: u16, aead: u16) -> Result<Self, InvalidSuite> {
        let kem_id = match KemId::try_from_int(kem) {
            Ok(v) => v,
            Err(UnknownKemId(x)) => return Err(InvalidSuite::Kem(x)),
        };
        let kdf_id = match KdfId::try_from_int(kdf) {
            Ok(v) => v,
            Err(UnknownKdfId(x)) => return Err(InvalidSuite::Kdf(x)),
        };
        let aead_id = match AeadId::try_from_int(aead) {
            Ok(v) => v,
            Err(UnknownAeadId(x)) => return Err(InvalidSuite::Aead(x)),
        };

        Ok(Self::new(kem_id, kdf_id, aead_id))
    }

    /// Whether this suite is a valid (KEM, KDF, AEAD) combination.
    ///
    /// Every identifier a [`Suite`] can hold names a registered algorithm
    /// (unknown code points never get past [`try_from_ids`]), and every
    /// registered KEM is a DHKEM carrying the authenticated variants, so
    /// this holds for all representable values. It is the registry's
    /// validity query for a suite held after construction; whether a
    /// *provider* can serve the suite is a separate question, answered by
    /// the `is_*_supported` probes on [`CryptoProvider`].
    ///
    /// [`try_from_ids`]: Self::try_from_ids
    pub const fn is_valid(&self) -> bool {
        matches!(
            self.kem_id,
            KemId::DHKEM_P256_HKDF_SHA256
                | KemId::DHKEM_P384_HKDF_SHA384
                | KemId::DHKEM_P521_HKDF_SHA512
                | KemId::DHKEM_X25519_HKDF_SHA256
                | KemId::DHKEM_X448_HKDF_SHA512
        ) && matches!(
            self.kdf_id,
            KdfId::HKDF_SHA256 | KdfId::HKDF_SHA384 | KdfId::HKDF_SHA512
        ) && matches!(
            self.aead_id,
            AeadId::AES_128_GCM | AeadId::AES_256_GCM | AeadId::CHACHA20_POLY1305
        )
    }

    /// The 10-byte `"HPKE" || kem || kdf || aead` tag scoping the key
    /// schedule and exporter derivations to this suite.
    ///
    /// # Example
    ///
    /// ```
    /// # use hpke06_crypto::{AeadId, KdfId, KemId, Suite};
    /// let suite = Suite::new(
    ///     KemId::DHKEM_P256_HKDF_SHA256,
    ///     KdfId::HKDF_SHA256,
    ///     AeadId::CHACHA20_POLY1305,
    /// );
    /// assert_eq!(suite.suite_id(), *b"HPKE\x00\x10\x00\x01\x00\x03");
    /// ```
    pub fn suite_id(&self) -> [u8; 10] {
        let mut suite_id = [0u8; 10];

        suite_id[0..4].copy_from_slice(b"HPKE");
        suite_id[4..6].copy_from_slice(&self.kem_id.to_be_bytes());
        suite_id[6..8].copy_from_slice(&self.kdf_id.to_be_bytes());
        suite_id[8..10].copy_from_slice(&self.aead_id.to_be_bytes());

        suite_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A (KEM, KDF, AEAD) triple containing an unknown code point.
pub enum InvalidSuite {
    /// Unknown KEM code point.
    Kem(u16),

    /// Unknown KDF code point.
    Kdf(u16),

    /// Unknown AEAD code point.
    Aead(u16),
}

impl core::error::Error for InvalidSuite {}

impl fmt::Display for InvalidSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kem(x) => write!(f, "invalid suite: unknown KEM ID {x:#06x}"),
            Self::Kdf(x) => write!(f, "invalid suite: unknown KDF ID {x:#06x}"),
            Self::Aead(x) => write!(f, "invalid suite: unknown AEAD ID {x:#06x}"),
        }
    }
}

// === AEAD key material ===

#[non_exhaustive]
/// Expanded AEAD key material: the secret key and the base nonce bound to
/// one HPKE context.
///
/// Zeroized on drop. The per-message nonce is produced by
/// [`clone_with_nonce`](Self::clone_with_nonce) so the base nonce itself is
/// never mutated.
pub enum AeadKey {
    /// AES-128-GCM
    Aes128Gcm {
        /// The AEAD key.
        key: [u8; AeadId::AES_128_GCM.n_key()],

        /// The base nonce.
        base_nonce: [u8; AeadId::AES_128_GCM.n_nonce()],
    },

    /// AES-256-GCM
    Aes256Gcm {
        /// The AEAD key.
        key: [u8; AeadId::AES_256_GCM.n_key()],

        /// The base nonce.
        base_nonce: [u8; AeadId::AES_256_GCM.n_nonce()],
    },

    /// ChaCha20Poly1305
    ChaCha20Poly1305 {
        /// The AEAD key.
        key: [u8; AeadId::CHACHA20_POLY1305.n_key()],

        /// The base nonce.
        base_nonce: [u8; AeadId::CHACHA20_POLY1305.n_nonce()],
    },
}

impl AeadKey {
    #[inline]
    /// The AEAD algorithm this material belongs to.
    pub const fn aead_id(&self) -> AeadId {
        match self {
            Self::Aes128Gcm { .. } => AeadId::AES_128_GCM,
            Self::Aes256Gcm { .. } => AeadId::AES_256_GCM,
            Self::ChaCha20Poly1305 { .. } => AeadId::CHACHA20_POLY1305,
        }
    }

    /// Copies the key material, passing a mutable copy of the base nonce
    /// to `update_nonce` and returning the result for a single AEAD
    /// operation.
    pub fn clone_with_nonce<F>(&self, update_nonce: F) -> Self
    where
        F: FnOnce(&mut [u8]),
    {
        match self {
            Self::Aes128Gcm { key, base_nonce } => {
                let mut nonce = *base_nonce;

                update_nonce(&mut nonce);

                Self::Aes128Gcm {
                    key: *key,
                    base_nonce: nonce,
                }
            }
            Self::Aes256Gcm { key, base_nonce } => {
                let mut nonce = *base_nonce;

                update_nonce(&mut nonce);

                Self::Aes256Gcm {
                    key: *key,
                    base_nonce: nonce,
                }
            }
            Self::ChaCha20Poly1305 { key, base_nonce } => {
                let mut nonce = *base_nonce;

                update_nonce(&mut nonce);

                Self::ChaCha20Poly1305 {
                    key: *key,
                    base_nonce: nonce,
                }
            }
        }
    }

    #[inline]
    /// The AEAD key.
    pub const fn key(&self) -> &[u8] {
        match self {
            Self::Aes128Gcm { key, .. } => key,
            Self::Aes256Gcm { key, .. } => key,
            Self::ChaCha20Poly1305 { key, .. } => key,
        }
    }

    #[inline]
    /// The base nonce.
    pub const fn base_nonce(&self) -> &[u8] {
        match self {
            Self::Aes128Gcm { base_nonce, .. } => base_nonce,
            Self::Aes256Gcm { base_nonce, .. } => base_nonce,
            Self::ChaCha20Poly1305 { base_nonce, .. } => base_nonce,
        }
    }
}

impl fmt::Debug for AeadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AeadKey")
            .field(&self.aead_id())
            .finish_non_exhaustive()
    }
}

impl Zeroize for AeadKey {
    fn zeroize(&mut self) {
        match self {
            Self::Aes128Gcm { key, base_nonce } => {
                key.zeroize();
                base_nonce.zeroize();
            }
            Self::Aes256Gcm { key, base_nonce } | Self::ChaCha20Poly1305 { key, base_nonce } => {
                key.zeroize();
                base_nonce.zeroize();
            }
        }
    }
}

impl Drop for AeadKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl zeroize::ZeroizeOnDrop for AeadKey {}

// === Byte-wrapper types ===

macro_rules! owned_bytes {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident[$cap:literal];
    ) => {
        $(#[$meta])*
        $vis struct $name {
            inner: SmallVec<[u8; $cap]>,
        }

        impl $name {
            #[inline]
            /// Copies `bytes` into a fresh value.
            $vis fn from_slice(bytes: &[u8]) -> Self {
                Self {
                    inner: SmallVec::from_slice(bytes),
                }
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.inner
            }
        }

        impl core::ops::Deref for $name {
            type Target = [u8];

            fn deref(&self) -> &[u8] {
                &self.inner
            }
        }
    };
}

macro_rules! borrowed_bytes {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident<'a>;
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy)]
        $vis struct $name<'a> {
            inner: &'a [u8],
        }

        impl<'a> $name<'a> {
            #[inline]
            /// Wraps a borrowed byte slice.
            $vis const fn new(bytes: &'a [u8]) -> Self {
                Self { inner: bytes }
            }
        }

        impl<'a> From<&'a [u8]> for $name<'a> {
            fn from(bytes: &'a [u8]) -> Self {
                Self::new(bytes)
            }
        }

        impl AsRef<[u8]> for $name<'_> {
            fn as_ref(&self) -> &[u8] {
                self.inner
            }
        }

        impl core::ops::Deref for $name<'_> {
            type Target = [u8];

            fn deref(&self) -> &[u8] {
                self.inner
            }
        }
    };
}

macro_rules! hex_debug {
    ($name:ty) => {
        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name))
                    .field(&const_hex::encode(&self.inner).as_str())
                    .finish()
            }
        }
    };
}

macro_rules! redacted_debug {
    ($name:ty) => {
        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name))
                    .finish_non_exhaustive()
            }
        }
    };
}

owned_bytes!(
    #[derive(Clone, PartialEq, Eq)]
    /// A serialized KEM public key (pkX).
    ///
    /// The wrapper validates length only; cryptographic validation happens
    /// in the provider when the key is used.
    pub struct PublicKey[133];
);

hex_debug!(PublicKey);

impl PublicKey {
    /// Length-validated constructor for the given KEM.
    ///
    /// # Errors
    ///
    /// [`CryptoError::KemMalformedPkX`] on a length mismatch.
    pub fn new(alg: KemId, bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != alg.n_pk() {
            return Err(CryptoError::KemMalformedPkX);
        }

        Ok(Self::from_slice(bytes))
    }
}

borrowed_bytes!(
    /// A borrowed serialized KEM public key (pkX).
    pub struct PublicKeyRef<'a>;
);

hex_debug!(PublicKeyRef<'_>);

impl<'a> From<&'a PublicKey> for PublicKeyRef<'a> {
    fn from(value: &'a PublicKey) -> Self {
        Self::new(&value.inner)
    }
}

impl PublicKeyRef<'_> {
    #[inline]
    /// Copies into an owned [`PublicKey`].
    pub fn to_owned(&self) -> PublicKey {
        PublicKey::from_slice(self.inner)
    }
}

owned_bytes!(
    #[derive(Eq)]
    /// A serialized KEM private key (skX).
    ///
    /// Compared in constant time, zeroized on drop, redacted in debug
    /// output.
    pub struct PrivateKey[66];
);

redacted_debug!(PrivateKey);

impl PrivateKey {
    /// Length-validated constructor for the given KEM.
    ///
    /// # Errors
    ///
    /// [`CryptoError::KemMalformedSkX`] on a length mismatch.
    pub fn new(alg: KemId, bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != alg.n_sk() {
            return Err(CryptoError::KemMalformedSkX);
        }

        Ok(Self::from_slice(bytes))
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.inner
            .ct_eq(other.inner.as_ref())
            .into()
    }
}

impl Zeroize for PrivateKey {
    fn zeroize(&mut self) {
        self.inner.as_mut_slice().zeroize();
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl zeroize::ZeroizeOnDrop for PrivateKey {}

borrowed_bytes!(
    #[derive(Eq)]
    /// A borrowed serialized KEM private key (skX).
    pub struct PrivateKeyRef<'a>;
);

redacted_debug!(PrivateKeyRef<'_>);

impl PartialEq for PrivateKeyRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.inner
            .ct_eq(other.inner)
            .into()
    }
}

impl<'a> From<&'a PrivateKey> for PrivateKeyRef<'a> {
    fn from(value: &'a PrivateKey) -> Self {
        Self::new(&value.inner)
    }
}

owned_bytes!(
    #[derive(Clone, PartialEq, Eq)]
    /// The encapsulated key (`enc`) transmitted from sender to receiver,
    /// `Nenc` bytes of opaque wire data.
    pub struct EncappedKey[133];
);

hex_debug!(EncappedKey);

impl EncappedKey {
    #[inline]
    /// Wraps encapsulated-key bytes received from a sender.
    pub fn new(bytes: &[u8]) -> Self {
        Self::from_slice(bytes)
    }

    #[inline]
    /// For DHKEMs `enc` is the serialized ephemeral public key.
    pub fn from_ephemeral_pk(pk: PublicKey) -> Self {
        Self { inner: pk.inner }
    }
}

borrowed_bytes!(
    #[derive(PartialEq, Eq)]
    /// A borrowed encapsulated key (`enc`).
    pub struct EncappedKeyRef<'a>;
);

hex_debug!(EncappedKeyRef<'_>);

impl<'a> From<&'a EncappedKey> for EncappedKeyRef<'a> {
    fn from(value: &'a EncappedKey) -> Self {
        Self::new(&value.inner)
    }
}

owned_bytes!(
    #[derive(Clone, PartialEq, Eq)]
    /// A KEM shared secret, or a raw Diffie-Hellman output feeding
    /// `ExtractAndExpand`.
    pub struct SharedSecret[66];
);

hex_debug!(SharedSecret);

impl SharedSecret {
    #[inline]
    /// Wraps shared-secret bytes.
    pub fn new(bytes: &[u8]) -> Self {
        Self::from_slice(bytes)
    }

    #[inline]
    /// Re-wraps output keying material as a shared secret.
    pub fn from_okm(okm: Okm) -> Self {
        Self::from_slice(&okm.inner)
    }
}

impl Zeroize for SharedSecret {
    fn zeroize(&mut self) {
        self.inner.as_mut_slice().zeroize();
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl zeroize::ZeroizeOnDrop for SharedSecret {}

borrowed_bytes!(
    #[derive(PartialEq, Eq)]
    /// A borrowed KEM shared secret.
    pub struct SharedSecretRef<'a>;
);

hex_debug!(SharedSecretRef<'_>);

impl<'a> From<&'a SharedSecret> for SharedSecretRef<'a> {
    fn from(value: &'a SharedSecret) -> Self {
        Self::new(&value.inner)
    }
}

borrowed_bytes!(
    #[derive(PartialEq, Eq)]
    /// Borrowed input keying material (IKM) for `Extract`.
    pub struct IkmRef<'a>;
);

hex_debug!(IkmRef<'_>);

owned_bytes!(
    #[derive(Clone, PartialEq, Eq)]
    /// A pseudorandom key (PRK), the output of `Extract`.
    pub struct Prk[64];
);

hex_debug!(Prk);

impl Prk {
    #[inline]
    /// Wraps raw PRK bytes produced by a provider's `Extract`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_slice(bytes)
    }
}

impl Zeroize for Prk {
    fn zeroize(&mut self) {
        self.inner.as_mut_slice().zeroize();
    }
}

impl Drop for Prk {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl zeroize::ZeroizeOnDrop for Prk {}

borrowed_bytes!(
    #[derive(PartialEq, Eq)]
    /// A borrowed pseudorandom key (PRK).
    pub struct PrkRef<'a>;
);

hex_debug!(PrkRef<'_>);

impl<'a> From<&'a Prk> for PrkRef<'a> {
    fn from(value: &'a Prk) -> Self {
        Self::new(&value.inner)
    }
}

owned_bytes!(
    #[derive(Clone, PartialEq, Eq)]
    /// Output keying material (OKM), the output of `Expand`.
    pub struct Okm[64];
);

hex_debug!(Okm);

impl<'a> From<&'a Okm> for PrkRef<'a> {
    /// Output keying material may seed further expansion; the exporter
    /// interface does exactly this.
    fn from(value: &'a Okm) -> Self {
        Self::new(&value.inner)
    }
}

impl Okm {
    #[inline]
    /// An empty buffer, for providers to fill via
    /// [`as_mut_buffer`](Self::as_mut_buffer).
    pub const fn empty() -> Self {
        Self {
            inner: SmallVec::new_const(),
        }
    }

    /// A zero-filled mutable buffer of `len` bytes for the provider's
    /// `Expand` to write into.
    pub fn as_mut_buffer(&mut self, len: usize) -> &mut [u8] {
        self.inner.resize(len, 0);
        &mut self.inner
    }
}

impl Zeroize for Okm {
    fn zeroize(&mut self) {
        self.inner.as_mut_slice().zeroize();
    }
}

impl Drop for Okm {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl zeroize::ZeroizeOnDrop for Okm {}
