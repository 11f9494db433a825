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

pub mod error;
pub mod kem;

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;

pub use hpke06_crypto::*;

pub use crate::error::Error;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The HPKE variant in use, draft-06 section 5.
///
/// | Mode | Value |
/// |:-:|:-:|
/// | Base | 0x00 |
/// | PSK | 0x01 |
/// | Auth | 0x02 |
/// | AuthPSK | 0x03 |
pub enum Mode {
    /// Hybrid public-key encryption to a public key.
    Base = 0x00,

    /// Base plus sender authentication through a pre-shared key.
    Psk = 0x01,

    /// Base plus sender authentication through the sender's KEM key pair.
    Auth = 0x02,

    /// Both authentication mechanisms combined.
    AuthPsk = 0x03,
}

impl Mode {
    #[inline]
    /// Lookup from the one-byte mode identifier.
    ///
    /// # Errors
    ///
    /// [`UnknownMode`] for anything outside `0x00..=0x03`.
    pub const fn try_from(value: u8) -> Result<Self, UnknownMode> {
        match value {
            v if v == Self::Base as u8 => Ok(Self::Base),
            v if v == Self::Psk as u8 => Ok(Self::Psk),
            v if v == Self::Auth as u8 => Ok(Self::Auth),
            v if v == Self::AuthPsk as u8 => Ok(Self::AuthPsk),
            other => Err(UnknownMode(other)),
        }
    }
}

impl TryFrom<u8> for Mode {
    type Error = UnknownMode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_from(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// An unknown mode identifier.
pub struct UnknownMode(pub u8);

impl core::error::Error for UnknownMode {}

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown HPKE mode: {:#04x}", self.0)
    }
}

#[derive(Debug, Clone, Copy)]
/// Sender-side mode parameters.
///
/// The variant selects the HPKE mode and carries exactly the material
/// that mode needs, so a PSK cannot be combined with Base mode and Auth
/// mode cannot be entered without the sender's private key.
pub enum SenderMode<'a> {
    /// Base mode.
    Base,

    /// PSK mode. Both values must be non-empty and `psk` must carry at
    /// least 32 bytes.
    Psk {
        /// The pre-shared key.
        psk: &'a [u8],

        /// The identifier naming which pre-shared key is in use.
        psk_id: &'a [u8],
    },

    /// Auth mode.
    Auth {
        /// The sender's long-term private key.
        sk_s: PrivateKeyRef<'a>,
    },

    /// AuthPSK mode.
    AuthPsk {
        /// The sender's long-term private key.
        sk_s: PrivateKeyRef<'a>,

        /// The pre-shared key.
        psk: &'a [u8],

        /// The identifier naming which pre-shared key is in use.
        psk_id: &'a [u8],
    },
}

impl SenderMode<'_> {
    #[inline]
    /// The mode identifier these parameters select.
    pub const fn mode(&self) -> Mode {
        match self {
            Self::Base => Mode::Base,
            Self::Psk { .. } => Mode::Psk,
            Self::Auth { .. } => Mode::Auth,
            Self::AuthPsk { .. } => Mode::AuthPsk,
        }
    }

    const fn psk_inputs(&self) -> (&[u8], &[u8]) {
        match self {
            Self::Base | Self::Auth { .. } => (&[], &[]),
            Self::Psk { psk, psk_id } | Self::AuthPsk { psk, psk_id, .. } => (psk, psk_id),
        }
    }
}

#[derive(Debug, Clone, Copy)]
/// Receiver-side mode parameters, mirroring [`SenderMode`] with the
/// sender's *public* key in the authenticated modes.
pub enum ReceiverMode<'a> {
    /// Base mode.
    Base,

    /// PSK mode.
    Psk {
        /// The pre-shared key.
        psk: &'a [u8],

        /// The identifier naming which pre-shared key is in use.
        psk_id: &'a [u8],
    },

    /// Auth mode.
    Auth {
        /// The sender's long-term public key.
        pk_s: PublicKeyRef<'a>,
    },

    /// AuthPSK mode.
    AuthPsk {
        /// The sender's long-term public key.
        pk_s: PublicKeyRef<'a>,

        /// The pre-shared key.
        psk: &'a [u8],

        /// The identifier naming which pre-shared key is in use.
        psk_id: &'a [u8],
    },
}

impl ReceiverMode<'_> {
    #[inline]
    /// The mode identifier these parameters select.
    pub const fn mode(&self) -> Mode {
        match self {
            Self::Base => Mode::Base,
            Self::Psk { .. } => Mode::Psk,
            Self::Auth { .. } => Mode::Auth,
            Self::AuthPsk { .. } => Mode::AuthPsk,
        }
    }

    const fn psk_inputs(&self) -> (&[u8], &[u8]) {
        match self {
            Self::Base | Self::Auth { .. } => (&[], &[]),
            Self::Psk { psk, psk_id } | Self::AuthPsk { psk, psk_id, .. } => (psk, psk_id),
        }
    }
}

#[derive(Debug, Clone, Copy)]
/// An HPKE configuration: one ciphersuite, generic over the crypto
/// provider.
///
/// Every [`Suite`] value is valid by construction (unknown code points
/// are rejected at [`Suite::try_from_ids`]), so `prepare` is infallible.
pub struct Hpke<P> {
    suite: Suite,

    _provider: PhantomData<P>,
}

impl<P: CryptoProvider> Hpke<P> {
    /// Fixes the ciphersuite for subsequent setup operations.
    pub const fn prepare(suite: Suite) -> Self {
        Self {
            suite,
            _provider: PhantomData,
        }
    }

    #[inline]
    /// The configured ciphersuite.
    pub const fn suite(&self) -> Suite {
        self.suite
    }

    /// Creates the sender side of an encryption context, draft-06
    /// section 5.1: encapsulates a fresh shared secret to `pk_r` and runs
    /// the key schedule over it.
    ///
    /// Returns the encapsulated key to transmit alongside the ciphertexts
    /// and the [`Sealer`] holding the derived AEAD state.
    ///
    /// # Errors
    ///
    /// KEM failures ([`Error::is_kem_failure`]) and PSK validation
    /// failures; nothing is returned on error.
    pub fn setup_sender(
        &self,
        mut provider: P,
        pk_r: PublicKeyRef<'_>,
        info: &[u8],
        mode: SenderMode<'_>,
    ) -> Result<(EncappedKey, Sealer<P>), Error> {
        let (shared_secret, enc) = match mode {
            SenderMode::Base | SenderMode::Psk { .. } => {
                kem::encap(&mut provider, self.suite.kem_id, pk_r)?
            }
            SenderMode::Auth { sk_s } | SenderMode::AuthPsk { sk_s, .. } => {
                kem::auth_encap(&mut provider, self.suite.kem_id, pk_r, sk_s)?
            }
        };

        let (psk, psk_id) = mode.psk_inputs();

        let context = self.key_schedule(
            provider,
            mode.mode(),
            SharedSecretRef::from(&shared_secret),
            info,
            psk,
            psk_id,
        )?;

        Ok((enc, context))
    }

    /// [`setup_sender`](Self::setup_sender) with a caller-supplied
    /// ephemeral seed in place of fresh randomness.
    ///
    /// A testing seam for reproducing known-answer vectors; see
    /// [`kem::encap_deterministically`]. Production callers use
    /// [`setup_sender`](Self::setup_sender).
    ///
    /// # Errors
    ///
    /// See [`setup_sender`](Self::setup_sender).
    pub fn setup_sender_deterministically(
        &self,
        provider: P,
        pk_r: PublicKeyRef<'_>,
        info: &[u8],
        mode: SenderMode<'_>,
        ikm_e: IkmRef<'_>,
    ) -> Result<(EncappedKey, Sealer<P>), Error> {
        let (shared_secret, enc) = match mode {
            SenderMode::Base | SenderMode::Psk { .. } => {
                kem::encap_deterministically(&provider, self.suite.kem_id, pk_r, ikm_e)?
            }
            SenderMode::Auth { sk_s } | SenderMode::AuthPsk { sk_s, .. } => {
                kem::auth_encap_deterministically(&provider, self.suite.kem_id, pk_r, sk_s, ikm_e)?
            }
        };

        let (psk, psk_id) = mode.psk_inputs();

        let context = self.key_schedule(
            provider,
            mode.mode(),
            SharedSecretRef::from(&shared_secret),
            info,
            psk,
            psk_id,
        )?;

        Ok((enc, context))
    }

    /// Creates the receiver side of an encryption context, draft-06
    /// section 5.1: decapsulates `enc` with `sk_r` and runs the identical
    /// key schedule.
    ///
    /// The mode and every parameter (`info`, PSK material, sender key)
    /// must match the sender's exactly; any divergence yields a context
    /// whose `open` calls fail authentication.
    ///
    /// # Errors
    ///
    /// See [`setup_sender`](Self::setup_sender).
    pub fn setup_receiver(
        &self,
        provider: P,
        enc: EncappedKeyRef<'_>,
        sk_r: PrivateKeyRef<'_>,
        info: &[u8],
        mode: ReceiverMode<'_>,
    ) -> Result<Opener<P>, Error> {
        let shared_secret = match mode {
            ReceiverMode::Base | ReceiverMode::Psk { .. } => {
                kem::decap(&provider, self.suite.kem_id, enc, sk_r)?
            }
            ReceiverMode::Auth { pk_s } | ReceiverMode::AuthPsk { pk_s, .. } => {
                kem::auth_decap(&provider, self.suite.kem_id, enc, sk_r, pk_s)?
            }
        };

        let (psk, psk_id) = mode.psk_inputs();

        self.key_schedule(
            provider,
            mode.mode(),
            SharedSecretRef::from(&shared_secret),
            info,
            psk,
            psk_id,
        )
    }

    /// `SetupBaseS()`, draft-06 section 5.1.1.
    ///
    /// # Errors
    ///
    /// See [`setup_sender`](Self::setup_sender).
    pub fn setup_base_s(
        &self,
        provider: P,
        pk_r: PublicKeyRef<'_>,
        info: &[u8],
    ) -> Result<(EncappedKey, Sealer<P>), Error> {
        self.setup_sender(provider, pk_r, info, SenderMode::Base)
    }

    /// `SetupBaseR()`, draft-06 section 5.1.1.
    ///
    /// # Errors
    ///
    /// See [`setup_receiver`](Self::setup_receiver).
    pub fn setup_base_r(
        &self,
        provider: P,
        enc: EncappedKeyRef<'_>,
        sk_r: PrivateKeyRef<'_>,
        info: &[u8],
    ) -> Result<Opener<P>, Error> {
        self.setup_receiver(provider, enc, sk_r, info, ReceiverMode::Base)
    }

    /// `SetupPSKS()`, draft-06 section 5.1.2: the recipient can verify
    /// that the sender held the pre-shared key `psk` identified by
    /// `psk_id`.
    ///
    /// # Errors
    ///
    /// See [`setup_sender`](Self::setup_sender); additionally the PSK
    /// validation errors of [`Error`].
    pub fn setup_psk_s(
        &self,
        provider: P,
        pk_r: PublicKeyRef<'_>,
        info: &[u8],
        psk: &[u8],
        psk_id: &[u8],
    ) -> Result<(EncappedKey, Sealer<P>), Error> {
        self.setup_sender(provider, pk_r, info, SenderMode::Psk { psk, psk_id })
    }

    /// `SetupPSKR()`, draft-06 section 5.1.2.
    ///
    /// # Errors
    ///
    /// See [`setup_psk_s`](Self::setup_psk_s).
    pub fn setup_psk_r(
        &self,
        provider: P,
        enc: EncappedKeyRef<'_>,
        sk_r: PrivateKeyRef<'_>,
        info: &[u8],
        psk: &[u8],
        psk_id: &[u8],
    ) -> Result<Opener<P>, Error> {
        self.setup_receiver(provider, enc, sk_r, info, ReceiverMode::Psk { psk, psk_id })
    }

    /// `SetupAuthS()`, draft-06 section 5.1.3: `AuthEncap` binds the
    /// sender's key pair into the shared secret, so only the holder of
    /// `sk_s` can have produced `enc`.
    ///
    /// This authenticates the key pair, nothing else. Binding a
    /// higher-level sender identity to the context belongs in `info`.
    ///
    /// # Errors
    ///
    /// See [`setup_sender`](Self::setup_sender).
    pub fn setup_auth_s(
        &self,
        provider: P,
        pk_r: PublicKeyRef<'_>,
        info: &[u8],
        sk_s: PrivateKeyRef<'_>,
    ) -> Result<(EncappedKey, Sealer<P>), Error> {
        self.setup_sender(provider, pk_r, info, SenderMode::Auth { sk_s })
    }

    /// `SetupAuthR()`, draft-06 section 5.1.3.
    ///
    /// # Errors
    ///
    /// See [`setup_receiver`](Self::setup_receiver).
    pub fn setup_auth_r(
        &self,
        provider: P,
        enc: EncappedKeyRef<'_>,
        sk_r: PrivateKeyRef<'_>,
        info: &[u8],
        pk_s: PublicKeyRef<'_>,
    ) -> Result<Opener<P>, Error> {
        self.setup_receiver(provider, enc, sk_r, info, ReceiverMode::Auth { pk_s })
    }

    /// `SetupAuthPSKS()`, draft-06 section 5.1.4: both authentication
    /// mechanisms combined.
    ///
    /// # Errors
    ///
    /// See [`setup_auth_s`](Self::setup_auth_s) and
    /// [`setup_psk_s`](Self::setup_psk_s).
    pub fn setup_auth_psk_s(
        &self,
        provider: P,
        pk_r: PublicKeyRef<'_>,
        info: &[u8],
        psk: &[u8],
        psk_id: &[u8],
        sk_s: PrivateKeyRef<'_>,
    ) -> Result<(EncappedKey, Sealer<P>), Error> {
        self.setup_sender(provider, pk_r, info, SenderMode::AuthPsk { sk_s, psk, psk_id })
    }

    /// `SetupAuthPSKR()`, draft-06 section 5.1.4.
    ///
    /// # Errors
    ///
    /// See [`setup_auth_psk_s`](Self::setup_auth_psk_s).
    pub fn setup_auth_psk_r(
        &self,
        provider: P,
        enc: EncappedKeyRef<'_>,
        sk_r: PrivateKeyRef<'_>,
        info: &[u8],
        psk: &[u8],
        psk_id: &[u8],
        pk_s: PublicKeyRef<'_>,
    ) -> Result<Opener<P>, Error> {
        self.setup_receiver(
            provider,
            enc,
            sk_r,
            info,
            ReceiverMode::AuthPsk { pk_s, psk, psk_id },
        )
    }

    /// ```text
    /// def VerifyPSKInputs(mode, psk, psk_id):
    ///   got_psk = (psk != default_psk)
    ///   got_psk_id = (psk_id != default_psk_id)
    ///   if got_psk != got_psk_id:
    ///     raise Exception("Inconsistent PSK inputs")
    ///   if (not got_psk) and (mode in [mode_psk, mode_auth_psk]):
    ///     raise Exception("Missing required PSK input")
    /// ```
    ///
    /// The mode parameters make a PSK structurally impossible in Base and
    /// Auth mode, so only the PSK modes are checked here. On top of the
    /// draft's check, a PSK shorter than 32 bytes is rejected (the
    /// draft's minimum-entropy floor, section 9.5).
    const fn verify_psk_inputs(mode: Mode, psk: &[u8], psk_id: &[u8]) -> Result<(), Error> {
        let got_psk = !psk.is_empty();
        let got_psk_id = !psk_id.is_empty();

        if got_psk != got_psk_id {
            return Err(Error::InconsistentPsk);
        }

        if matches!(mode, Mode::Psk | Mode::AuthPsk) {
            if !got_psk {
                return Err(Error::MissingPsk);
            }

            if psk.len() < 32 {
                return Err(Error::InsecurePsk);
            }
        }

        Ok(())
    }

    /// ```text
    /// psk_id_hash = LabeledExtract("", "psk_id_hash", psk_id)
    /// info_hash = LabeledExtract("", "info_hash", info)
    /// key_schedule_context = concat(mode, psk_id_hash, info_hash)
    /// ```
    ///
    /// (Split out so known-answer tests can check the intermediate.)
    fn key_schedule_context(
        &self,
        provider: &P,
        mode: Mode,
        info: &[u8],
        psk_id: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let suite_id = self.suite.suite_id();

        let psk_id_hash = kdf::labeled_extract(
            provider,
            self.suite.kdf_id,
            &suite_id,
            &[],
            "psk_id_hash",
            IkmRef::from(psk_id),
        )?;

        let info_hash = kdf::labeled_extract(
            provider,
            self.suite.kdf_id,
            &suite_id,
            &[],
            "info_hash",
            IkmRef::from(info),
        )?;

        let mode_id = [mode as u8];

        Ok([mode_id.as_slice(), psk_id_hash.as_ref(), info_hash.as_ref()].concat())
    }

    /// `secret = LabeledExtract(shared_secret, "secret", psk)`
    ///
    /// The draft fixes the argument order: the KEM shared secret is the
    /// salt and the PSK is the input keying material, so that an absent
    /// PSK reduces to extraction over the empty string.
    fn key_schedule_secret(
        &self,
        provider: &P,
        shared_secret: SharedSecretRef<'_>,
        psk: &[u8],
    ) -> Result<Prk, Error> {
        kdf::labeled_extract(
            provider,
            self.suite.kdf_id,
            &self.suite.suite_id(),
            &shared_secret,
            "secret",
            IkmRef::from(psk),
        )
        .map_err(Into::into)
    }

    /// The key schedule of draft-06 section 5.1: turns the KEM shared
    /// secret and the mode parameters into an initialised context.
    ///
    /// ```text
    /// def KeySchedule<ROLE>(mode, shared_secret, info, psk, psk_id):
    ///   VerifyPSKInputs(mode, psk, psk_id)
    ///
    ///   psk_id_hash = LabeledExtract("", "psk_id_hash", psk_id)
    ///   info_hash = LabeledExtract("", "info_hash", info)
    ///   key_schedule_context = concat(mode, psk_id_hash, info_hash)
    ///
    ///   secret = LabeledExtract(shared_secret, "secret", psk)
    ///
    ///   key = LabeledExpand(secret, "key", key_schedule_context, Nk)
    ///   base_nonce = LabeledExpand(secret, "base_nonce",
    ///                              key_schedule_context, Nn)
    ///   exporter_secret = LabeledExpand(secret, "exp",
    ///                                   key_schedule_context, Nh)
    ///
    ///   return Context<ROLE>(key, base_nonce, 0, exporter_secret)
    /// ```
    fn key_schedule<Role>(
        &self,
        provider: P,
        mode: Mode,
        shared_secret: SharedSecretRef<'_>,
        info: &[u8],
        psk: &[u8],
        psk_id: &[u8],
    ) -> Result<Context<P, Role>, Error> {
        Self::verify_psk_inputs(mode, psk, psk_id)?;

        let suite_id = self.suite.suite_id();

        let key_schedule_context = self.key_schedule_context(&provider, mode, info, psk_id)?;

        let secret = self.key_schedule_secret(&provider, shared_secret, psk)?;

        let key = kdf::labeled_expand(
            &provider,
            self.suite.kdf_id,
            &suite_id,
            &secret,
            "key",
            &key_schedule_context,
            self.suite.aead_id.n_key(),
        )?;

        let base_nonce = kdf::labeled_expand(
            &provider,
            self.suite.kdf_id,
            &suite_id,
            &secret,
            "base_nonce",
            &key_schedule_context,
            self.suite.aead_id.n_nonce(),
        )?;

        let exporter_secret = kdf::labeled_expand(
            &provider,
            self.suite.kdf_id,
            &suite_id,
            &secret,
            "exp",
            &key_schedule_context,
            self.suite.kdf_id.n_hash(),
        )?;

        Ok(Context {
            suite: self.suite,
            aead: self.suite.aead_id.key_material(&key, &base_nonce)?,
            seq: 0,
            exhausted: false,
            exporter_secret,
            provider,
            _role: PhantomData,
        })
    }
}

#[derive(Debug)]
/// Marker for the sealing (sender) direction of a [`Context`].
pub struct Sealing;

#[derive(Debug)]
/// Marker for the opening (receiver) direction of a [`Context`].
pub struct Opening;

/// The sender's encryption context.
pub type Sealer<P> = Context<P, Sealing>;

/// The receiver's decryption context.
pub type Opener<P> = Context<P, Opening>;

/// One direction of an established HPKE channel.
///
/// A context owns the AEAD key material, the base nonce, the exporter
/// secret and the message sequence counter derived by one setup
/// transaction. The direction is pinned in the type: a [`Sealer`] only
/// seals, an [`Opener`] only opens, and both export. Key material is
/// zeroized when the context is dropped.
///
/// Both sides advance their counter independently; message `k` of the
/// sealer is sealed under nonce `base_nonce ^ k` and must be the `k`-th
/// message the opener processes. There is no tolerance for reordering:
/// a skipped or swapped message fails authentication.
#[derive(Debug)]
pub struct Context<P, Role> {
    suite: Suite,

    aead: AeadKey,

    /// Invariant: `seq < 2^(8 * Nn)`.
    seq: u128,

    /// Set once the nonce at `2^(8 * Nn) - 1` has been consumed; the
    /// context is permanently spent from then on.
    exhausted: bool,

    exporter_secret: Okm,

    provider: P,

    _role: PhantomData<Role>,
}

/// XOR the big-endian encoding of `seq`, left-padded to the nonce width,
/// into `nonce`.
fn compute_nonce(nonce: &mut [u8], seq: u128) {
    for (o, i) in nonce
        .iter_mut()
        .rev()
        .zip(seq.to_be_bytes().into_iter().rev())
    {
        *o ^= i;
    }
}

impl<P: CryptoProvider> Context<P, Sealing> {
    /// Encrypts `plaintext` with associated data `aad` at the current
    /// sequence position, draft-06 section 5.2.
    ///
    /// The returned ciphertext is `plaintext.len() + Nt` bytes.
    ///
    /// # Errors
    ///
    /// See [`seal_in_place`](Self::seal_in_place).
    pub fn seal(&mut self, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>, Error> {
        let mut buffer = plaintext.to_vec();

        self.seal_in_place(&mut buffer, aad)?;

        Ok(buffer)
    }

    /// In-place [`seal`](Self::seal): `buffer` holds the plaintext on
    /// entry and ciphertext plus tag on success.
    ///
    /// ```text
    /// def Context.Seal(aad, pt):
    ///   ct = Seal(self.key, self.ComputeNonce(self.seq), aad, pt)
    ///   self.IncrementSeq()
    ///   return ct
    /// ```
    ///
    /// The final admissible sequence number is used and its ciphertext
    /// returned; the exhaustion surfaces on the call after it.
    ///
    /// # Errors
    ///
    /// [`Error::MessageLimitReached`] once the nonce sequence is spent,
    /// provider failures otherwise. The counter does not advance on
    /// error.
    pub fn seal_in_place(&mut self, buffer: &mut Vec<u8>, aad: &[u8]) -> Result<(), Error> {
        if self.exhausted {
            return Err(Error::MessageLimitReached);
        }

        let seq = self.seq;

        self.provider.aead_seal_in_place(
            &self
                .aead
                .clone_with_nonce(|nonce| compute_nonce(nonce, seq)),
            aad,
            buffer,
        )?;

        self.increment_seq();

        Ok(())
    }
}

impl<P: CryptoProvider> Context<P, Opening> {
    /// Decrypts `ciphertext` (which carries the tag) with associated data
    /// `aad` at the current sequence position, draft-06 section 5.2.
    ///
    /// # Errors
    ///
    /// See [`open_in_place`](Self::open_in_place).
    pub fn open(&mut self, ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>, Error> {
        let mut buffer = ciphertext.to_vec();

        self.open_in_place(&mut buffer, aad)?;

        Ok(buffer)
    }

    /// In-place [`open`](Self::open): `buffer` holds ciphertext plus tag
    /// on entry and the plaintext on success.
    ///
    /// ```text
    /// def Context.Open(aad, ct):
    ///   pt = Open(self.key, self.ComputeNonce(self.seq), aad, ct)
    ///   if pt == OpenError:
    ///     raise OpenError
    ///   self.IncrementSeq()
    ///   return pt
    /// ```
    ///
    /// # Errors
    ///
    /// An authentication failure ([`Error::is_auth_failure`]) leaves the
    /// sequence counter untouched, so the correct in-order message can
    /// still be opened afterwards. [`Error::MessageLimitReached`] once
    /// the nonce sequence is spent.
    pub fn open_in_place(&mut self, buffer: &mut Vec<u8>, aad: &[u8]) -> Result<(), Error> {
        if self.exhausted {
            return Err(Error::MessageLimitReached);
        }

        let seq = self.seq;

        self.provider.aead_open_in_place(
            &self
                .aead
                .clone_with_nonce(|nonce| compute_nonce(nonce, seq)),
            aad,
            buffer,
        )?;

        self.increment_seq();

        Ok(())
    }
}

impl<P: CryptoProvider, Role> Context<P, Role> {
    /// The secret-export interface, draft-06 section 5.3:
    ///
    /// ```text
    /// def Context.Export(exporter_context, L):
    ///   return LabeledExpand(self.exporter_secret, "sec",
    ///                        exporter_context, L)
    /// ```
    ///
    /// Pure with respect to the context: the exporter secret is immutable
    /// after setup and the sequence counter is not involved, so exports
    /// may be interleaved freely with seal/open traffic and both roles
    /// derive identical values.
    ///
    /// # Errors
    ///
    /// [`Error::is_output_too_long`] when `len` exceeds `255 * Nh` or
    /// does not fit in 16 bits.
    pub fn export(&self, exporter_context: &[u8], len: usize) -> Result<Okm, Error> {
        kdf::labeled_expand(
            &self.provider,
            self.suite.kdf_id,
            &self.suite.suite_id(),
            &self.exporter_secret,
            "sec",
            exporter_context,
            len,
        )
        .map_err(Into::into)
    }

    /// ```text
    /// def Context.IncrementSeq():
    ///   if self.seq >= (1 << (8*Nn)) - 1:
    ///     raise MessageLimitReached
    ///   self.seq += 1
    /// ```
    ///
    /// Expressed as a latch: the operation at the maximum sequence number
    /// completes and the context is marked spent afterwards.
    fn increment_seq(&mut self) {
        if self.seq >= self.max_seq() {
            self.exhausted = true;
        } else {
            self.seq += 1;
        }
    }

    /// `2^(8 * Nn) - 1`, the last usable sequence number.
    fn max_seq(&self) -> u128 {
        u128::MAX >> (128 - 8 * self.suite.aead_id.n_nonce() as u32)
    }
}

#[cfg(test)]
mod kat_tests {
    use alloc::vec::Vec;

    use hpke06_crypto::provider::RustCryptoProvider;
    use serde::Deserialize;

    use super::*;
    use crate::kem;

    #[derive(Debug, Clone)]
    struct Hex {
        bytes: Vec<u8>,
    }

    impl<'de> Deserialize<'de> for Hex {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let hex_str = <&str>::deserialize(deserializer)?;
            let bytes = const_hex::decode(hex_str).map_err(serde::de::Error::custom)?;
            Ok(Hex { bytes })
        }
    }

    impl core::ops::Deref for Hex {
        type Target = [u8];

        fn deref(&self) -> &Self::Target {
            &self.bytes
        }
    }

    #[derive(Debug, Clone, Deserialize)]
    struct TestVector {
        mode: u8,
        kem_id: u16,
        kdf_id: u16,
        aead_id: u16,
        info: Hex,
        #[serde(rename = "ikmR")]
        ikm_r: Hex,
        #[serde(rename = "ikmE")]
        ikm_e: Hex,
        #[serde(default)]
        #[serde(rename = "ikmS")]
        ikm_s: Option<Hex>,
        #[serde(rename = "skRm")]
        sk_rm: Hex,
        #[serde(rename = "skEm")]
        sk_em: Hex,
        #[serde(default)]
        #[serde(rename = "skSm")]
        sk_sm: Option<Hex>,
        #[serde(default)]
        psk: Option<Hex>,
        #[serde(default)]
        psk_id: Option<Hex>,
        #[serde(rename = "pkRm")]
        pk_rm: Hex,
        #[serde(rename = "pkEm")]
        pk_em: Hex,
        #[serde(default)]
        #[serde(rename = "pkSm")]
        pk_sm: Option<Hex>,
        enc: Hex,
        shared_secret: Hex,
        key_schedule_context: Hex,
        secret: Hex,
        key: Hex,
        base_nonce: Hex,
        exporter_secret: Hex,
        encryptions: Vec<TestEncryption>,
        exports: Vec<TestExport>,
    }

    #[derive(Debug, Clone, Deserialize)]
    struct TestEncryption {
        aad: Hex,
        ciphertext: Hex,
        nonce: Hex,
        plaintext: Hex,
    }

    #[derive(Debug, Clone, Deserialize)]
    struct TestExport {
        #[serde(rename = "exportContext")]
        exporter_context: Hex,
        #[serde(rename = "exportLength")]
        length: usize,
        #[serde(rename = "exportValue")]
        value: Hex,
    }

    fn vectors() -> Vec<TestVector> {
        serde_json::from_str(include_str!("../tests/test-vectors.json"))
            .expect("malformed test vector corpus")
    }

    fn provider() -> RustCryptoProvider {
        RustCryptoProvider::new().unwrap()
    }

    fn hpke_of(v: &TestVector) -> Hpke<RustCryptoProvider> {
        Hpke::prepare(
            Suite::try_from_ids(v.kem_id, v.kdf_id, v.aead_id).expect("unknown suite in corpus"),
        )
    }

    fn sender_mode(v: &TestVector) -> SenderMode<'_> {
        match Mode::try_from(v.mode).unwrap() {
            Mode::Base => SenderMode::Base,
            Mode::Psk => SenderMode::Psk {
                psk: v.psk.as_deref().unwrap(),
                psk_id: v.psk_id.as_deref().unwrap(),
            },
            Mode::Auth => SenderMode::Auth {
                sk_s: PrivateKeyRef::from(v.sk_sm.as_deref().unwrap()),
            },
            Mode::AuthPsk => SenderMode::AuthPsk {
                sk_s: PrivateKeyRef::from(v.sk_sm.as_deref().unwrap()),
                psk: v.psk.as_deref().unwrap(),
                psk_id: v.psk_id.as_deref().unwrap(),
            },
        }
    }

    fn receiver_mode(v: &TestVector) -> ReceiverMode<'_> {
        match Mode::try_from(v.mode).unwrap() {
            Mode::Base => ReceiverMode::Base,
            Mode::Psk => ReceiverMode::Psk {
                psk: v.psk.as_deref().unwrap(),
                psk_id: v.psk_id.as_deref().unwrap(),
            },
            Mode::Auth => ReceiverMode::Auth {
                pk_s: PublicKeyRef::from(v.pk_sm.as_deref().unwrap()),
            },
            Mode::AuthPsk => ReceiverMode::AuthPsk {
                pk_s: PublicKeyRef::from(v.pk_sm.as_deref().unwrap()),
                psk: v.psk.as_deref().unwrap(),
                psk_id: v.psk_id.as_deref().unwrap(),
            },
        }
    }

    fn sealer(v: &TestVector) -> (EncappedKey, Sealer<RustCryptoProvider>) {
        hpke_of(v)
            .setup_sender_deterministically(
                provider(),
                PublicKeyRef::from(&v.pk_rm[..]),
                &v.info,
                sender_mode(v),
                IkmRef::from(&v.ikm_e[..]),
            )
            .unwrap()
    }

    fn opener(v: &TestVector) -> Opener<RustCryptoProvider> {
        hpke_of(v)
            .setup_receiver(
                provider(),
                EncappedKeyRef::from(&v.enc[..]),
                PrivateKeyRef::from(&v.sk_rm[..]),
                &v.info,
                receiver_mode(v),
            )
            .unwrap()
    }

    #[test]
    fn derived_key_pairs_match() {
        let provider = provider();

        for (idx, v) in vectors().iter().enumerate() {
            let kem_id = KemId::try_from_int(v.kem_id).unwrap();

            for (ikm, want_sk, want_pk) in [
                (&v.ikm_r, &v.sk_rm, &v.pk_rm),
                (&v.ikm_e, &v.sk_em, &v.pk_em),
            ] {
                let (sk, pk) =
                    kem::derive_key_pair(&provider, kem_id, IkmRef::from(&ikm[..])).unwrap();

                assert_eq!(&*sk, &want_sk[..], "sk mismatch in vector {idx}");
                assert_eq!(&*pk, &want_pk[..], "pk mismatch in vector {idx}");
            }

            if let Some(ikm_s) = &v.ikm_s {
                let (sk, pk) =
                    kem::derive_key_pair(&provider, kem_id, IkmRef::from(&ikm_s[..])).unwrap();

                assert_eq!(&*sk, &v.sk_sm.as_deref().unwrap()[..]);
                assert_eq!(&*pk, &v.pk_sm.as_deref().unwrap()[..]);
            }
        }
    }

    #[test]
    fn key_schedule_intermediates_match() {
        let provider = provider();

        for (idx, v) in vectors().iter().enumerate() {
            let hpke = hpke_of(v);
            let mode = Mode::try_from(v.mode).unwrap();

            let context = hpke
                .key_schedule_context(
                    &provider,
                    mode,
                    &v.info,
                    v.psk_id.as_deref().unwrap_or_default(),
                )
                .unwrap();
            assert_eq!(
                context, &v.key_schedule_context[..],
                "key_schedule_context mismatch in vector {idx}"
            );

            let secret = hpke
                .key_schedule_secret(
                    &provider,
                    SharedSecretRef::from(&v.shared_secret[..]),
                    v.psk.as_deref().unwrap_or_default(),
                )
                .unwrap();
            assert_eq!(&*secret, &v.secret[..], "secret mismatch in vector {idx}");
        }
    }

    #[test]
    fn sender_setup_matches() {
        for (idx, v) in vectors().iter().enumerate() {
            let (enc, ctx) = sealer(v);

            assert_eq!(enc.as_ref(), &v.enc[..], "enc mismatch in vector {idx}");
            assert_eq!(ctx.aead.key(), &v.key[..], "key mismatch in vector {idx}");
            assert_eq!(
                ctx.aead.base_nonce(),
                &v.base_nonce[..],
                "base_nonce mismatch in vector {idx}"
            );
            assert_eq!(
                ctx.exporter_secret.as_ref(),
                &v.exporter_secret[..],
                "exporter_secret mismatch in vector {idx}"
            );
            assert_eq!(ctx.seq, 0);
            assert!(!ctx.exhausted);
        }
    }

    #[test]
    fn receiver_setup_matches() {
        for (idx, v) in vectors().iter().enumerate() {
            let ctx = opener(v);

            assert_eq!(ctx.aead.key(), &v.key[..], "key mismatch in vector {idx}");
            assert_eq!(
                ctx.aead.base_nonce(),
                &v.base_nonce[..],
                "base_nonce mismatch in vector {idx}"
            );
            assert_eq!(
                ctx.exporter_secret.as_ref(),
                &v.exporter_secret[..],
                "exporter_secret mismatch in vector {idx}"
            );
        }
    }

    #[test]
    fn encryptions_match() {
        for (idx, v) in vectors().iter().enumerate() {
            let (_, mut sealer) = sealer(v);
            let mut opener = opener(v);

            for (seq, encryption) in v.encryptions.iter().enumerate() {
                let mut nonce = v.base_nonce.to_vec();
                compute_nonce(&mut nonce, seq as u128);
                assert_eq!(nonce, &encryption.nonce[..]);

                let ct = sealer
                    .seal(&encryption.plaintext, &encryption.aad)
                    .unwrap();
                assert_eq!(
                    ct, &encryption.ciphertext[..],
                    "ciphertext mismatch in vector {idx} at seq {seq}"
                );

                let pt = opener.open(&ct, &encryption.aad).unwrap();
                assert_eq!(pt, &encryption.plaintext[..]);
            }
        }
    }

    #[test]
    fn exports_match() {
        for (idx, v) in vectors().iter().enumerate() {
            let (_, sealer) = sealer(v);
            let opener = opener(v);

            for export in &v.exports {
                for ctx_export in [
                    sealer
                        .export(&export.exporter_context, export.length)
                        .unwrap(),
                    opener
                        .export(&export.exporter_context, export.length)
                        .unwrap(),
                ] {
                    assert_eq!(
                        ctx_export.as_ref(),
                        &export.value[..],
                        "export mismatch in vector {idx}"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod sequence_tests {
    use hpke06_crypto::provider::RustCryptoProvider;

    use super::*;

    const SUITE: Suite = Suite::new(
        KemId::DHKEM_X25519_HKDF_SHA256,
        KdfId::HKDF_SHA256,
        AeadId::AES_128_GCM,
    );

    fn context<Role>() -> Context<RustCryptoProvider, Role> {
        Hpke::prepare(SUITE)
            .key_schedule(
                RustCryptoProvider::new().unwrap(),
                Mode::Base,
                SharedSecretRef::from(&[0x42u8; 32][..]),
                b"sequence tests",
                &[],
                &[],
            )
            .unwrap()
    }

    #[test]
    fn nonces_are_distinct_per_seq() {
        let ctx = context::<Sealing>();

        let mut seen = std::collections::HashSet::new();

        for seq in 0..1024u128 {
            let mut nonce = ctx.aead.base_nonce().to_vec();
            compute_nonce(&mut nonce, seq);
            assert!(seen.insert(nonce), "nonce repeated at seq {seq}");
        }

        // seq 0 leaves the base nonce untouched
        let mut nonce = ctx.aead.base_nonce().to_vec();
        compute_nonce(&mut nonce, 0);
        assert_eq!(nonce, ctx.aead.base_nonce());
    }

    #[test]
    fn final_seal_succeeds_then_context_is_spent() {
        let mut ctx = context::<Sealing>();
        ctx.seq = ctx.max_seq();

        // The seal at the maximum nonce still succeeds.
        let ct = ctx.seal(b"last message", b"").unwrap();
        assert_eq!(ct.len(), b"last message".len() + SUITE.aead_id.n_tag());
        assert!(ctx.exhausted);
        assert_eq!(ctx.seq, ctx.max_seq());

        // Everything after it fails, permanently.
        assert_eq!(
            ctx.seal(b"one too many", b"").unwrap_err(),
            Error::MessageLimitReached
        );
        assert_eq!(
            ctx.seal(b"still spent", b"").unwrap_err(),
            Error::MessageLimitReached
        );
    }

    #[test]
    fn open_limit_mirrors_seal_limit() {
        let mut sealer = context::<Sealing>();
        sealer.seq = sealer.max_seq();
        let ct = sealer.seal(b"last message", b"").unwrap();

        let mut opener = context::<Opening>();
        opener.seq = opener.max_seq();
        assert_eq!(opener.open(&ct, b"").unwrap(), b"last message");
        assert!(opener.exhausted);

        assert_eq!(
            opener.open(&ct, b"").unwrap_err(),
            Error::MessageLimitReached
        );
    }

    #[test]
    fn failed_open_does_not_advance_seq() {
        let mut sealer = context::<Sealing>();
        let mut opener = context::<Opening>();

        let ct0 = sealer.seal(b"first", b"aad-0").unwrap();
        let ct1 = sealer.seal(b"second", b"aad-1").unwrap();

        let err = opener.open(&ct0, b"wrong aad").unwrap_err();
        assert!(err.is_auth_failure());
        assert_eq!(opener.seq, 0);

        // The in-order messages still open after the failure.
        assert_eq!(opener.open(&ct0, b"aad-0").unwrap(), b"first");
        assert_eq!(opener.open(&ct1, b"aad-1").unwrap(), b"second");
        assert_eq!(opener.seq, 2);
    }

    #[test]
    fn out_of_order_messages_fail() {
        let mut sealer = context::<Sealing>();
        let mut opener = context::<Opening>();

        let _ct0 = sealer.seal(b"first", b"").unwrap();
        let ct1 = sealer.seal(b"second", b"").unwrap();

        // Skipping ct0 means ct1 is tried under the wrong nonce.
        assert!(opener.open(&ct1, b"").unwrap_err().is_auth_failure());
    }
}
