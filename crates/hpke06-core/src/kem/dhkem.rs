//! The DH-based KEM construction of draft-06 section 4.1.

use hpke06_crypto::{
    kdf, CryptoError, CryptoProvider, EncappedKey, EncappedKeyRef, IkmRef, KemId, PrivateKey,
    PrivateKeyRef, PublicKey, PublicKeyRef, SharedSecret,
};
use zeroize::Zeroize;

use crate::error::Error;

/// `GenerateKeyPair()`: randomized key pair generation, realized as
/// `DeriveKeyPair(random(Nsk))` per draft-06 section 7.1.2.
///
/// # Errors
///
/// See [`derive_key_pair`].
pub fn generate_key_pair<P: CryptoProvider>(
    provider: &mut P,
    alg: KemId,
) -> Result<(PrivateKey, PublicKey), Error> {
    let mut ikm = [0u8; 66];
    let ikm_len = alg.n_sk();

    provider.secure_random_fill(&mut ikm[..ikm_len])?;

    let pair = derive_key_pair(provider, alg, IkmRef::from(&ikm[..ikm_len]));

    ikm.zeroize();

    pair
}

/// `DeriveKeyPair(ikm)`: deterministic key pair derivation from input
/// keying material with at least `Nsk` bytes of entropy.
///
/// For X25519 and X448 the private key is a single labeled expansion:
///
/// ```text
/// dkp_prk = LabeledExtract("", "dkp_prk", ikm)
/// sk = LabeledExpand(dkp_prk, "sk", "", Nsk)
/// ```
///
/// For the NIST curves the draft prescribes rejection sampling over
/// `"candidate"` expansions with an 8-bit counter, masking the top byte
/// (0xFF for P-256/P-384, 0x01 for P-521) and discarding scalars that are
/// zero or not below the group order.
///
/// # Errors
///
/// [`CryptoError::KemDeriveKeyPair`] when no valid scalar is found within
/// 256 rounds; otherwise errors of the provider.
pub fn derive_key_pair<P: CryptoProvider>(
    provider: &P,
    alg: KemId,
    ikm: IkmRef<'_>,
) -> Result<(PrivateKey, PublicKey), Error> {
    let suite_id = alg.suite_id();

    let dkp_prk = kdf::labeled_extract(provider, alg.kdf_id(), &suite_id, &[], "dkp_prk", ikm)?;

    let sk = match alg {
        KemId::DHKEM_X25519_HKDF_SHA256 | KemId::DHKEM_X448_HKDF_SHA512 => {
            let sk = kdf::labeled_expand(
                provider,
                alg.kdf_id(),
                &suite_id,
                &dkp_prk,
                "sk",
                &[],
                alg.n_sk(),
            )?;

            provider.sk(alg, &sk)?
        }
        KemId::DHKEM_P256_HKDF_SHA256
        | KemId::DHKEM_P384_HKDF_SHA384
        | KemId::DHKEM_P521_HKDF_SHA512 => {
            let bitmask: u8 = match alg {
                KemId::DHKEM_P521_HKDF_SHA512 => 0x01,
                _ => 0xff,
            };

            let mut counter = 0u8;

            loop {
                let mut candidate = kdf::labeled_expand(
                    provider,
                    alg.kdf_id(),
                    &suite_id,
                    &dkp_prk,
                    "candidate",
                    &counter.to_be_bytes(),
                    alg.n_sk(),
                )?;

                candidate.as_mut_buffer(alg.n_sk())[0] &= bitmask;

                // The provider rejects scalars that are zero or not below
                // the group order.
                match provider.sk(alg, &candidate) {
                    Ok(sk) => break sk,
                    Err(CryptoError::KemMalformedSkX) => {}
                    Err(e) => return Err(e.into()),
                }

                counter = counter
                    .checked_add(1)
                    .ok_or(Error::Crypto(CryptoError::KemDeriveKeyPair))?;
            }
        }
        _ => return Err(Error::Crypto(CryptoError::KemUnsupported)),
    };

    let pk = provider.pk(alg, (&sk).into())?;

    Ok((sk, pk))
}

/// `Encap(pkR)`:
///
/// ```text
/// skE, pkE = GenerateKeyPair()
/// dh = DH(skE, pkR)
/// enc = SerializePublicKey(pkE)
/// kem_context = concat(enc, SerializePublicKey(pkR))
/// shared_secret = ExtractAndExpand(dh, kem_context)
/// return shared_secret, enc
/// ```
///
/// # Errors
///
/// Any provider failure surfaces unchanged.
pub fn encap<P: CryptoProvider>(
    provider: &mut P,
    alg: KemId,
    pk_r: PublicKeyRef<'_>,
) -> Result<(SharedSecret, EncappedKey), Error> {
    let (sk_e, pk_e) = generate_key_pair(provider, alg)?;

    encap_with_ephemeral(provider, alg, pk_r, &sk_e, pk_e)
}

/// [`encap`] with a caller-supplied ephemeral seed instead of fresh
/// randomness: the ephemeral key pair is `DeriveKeyPair(ikm_e)`.
///
/// This is a testing seam for reproducing known-answer vectors.
/// Production callers use [`encap`]; reusing an ephemeral seed across
/// messages voids every security property of the scheme.
///
/// # Errors
///
/// See [`encap`].
pub fn encap_deterministically<P: CryptoProvider>(
    provider: &P,
    alg: KemId,
    pk_r: PublicKeyRef<'_>,
    ikm_e: IkmRef<'_>,
) -> Result<(SharedSecret, EncappedKey), Error> {
    let (sk_e, pk_e) = derive_key_pair(provider, alg, ikm_e)?;

    encap_with_ephemeral(provider, alg, pk_r, &sk_e, pk_e)
}

fn encap_with_ephemeral<P: CryptoProvider>(
    provider: &P,
    alg: KemId,
    pk_r: PublicKeyRef<'_>,
    sk_e: &PrivateKey,
    pk_e: PublicKey,
) -> Result<(SharedSecret, EncappedKey), Error> {
    let dh = provider.dh(alg, sk_e.into(), pk_r)?;

    let enc = EncappedKey::from_ephemeral_pk(pk_e);

    // kem_context = concat(enc, pkRm)
    let kem_context = [enc.as_ref(), pk_r.as_ref()].concat();

    let shared_secret = extract_and_expand(provider, alg, &dh, &kem_context)?;

    Ok((shared_secret, enc))
}

/// `Decap(enc, skR)`: recover the KEM shared secret from its
/// encapsulation.
///
/// # Errors
///
/// Any provider failure (including a malformed `enc`) surfaces unchanged.
pub fn decap<P: CryptoProvider>(
    provider: &P,
    alg: KemId,
    enc: EncappedKeyRef<'_>,
    sk_r: PrivateKeyRef<'_>,
) -> Result<SharedSecret, Error> {
    // For DHKEMs the encapsulated key is the serialized ephemeral public
    // key.
    let pk_e = PublicKeyRef::new(enc.as_ref());

    let dh = provider.dh(alg, sk_r, pk_e)?;

    let pk_rm = provider.pk(alg, sk_r)?;

    let kem_context = [enc.as_ref(), pk_rm.as_ref()].concat();

    extract_and_expand(provider, alg, &dh, &kem_context)
}

/// `AuthEncap(pkR, skS)`: encapsulation binding the sender's long-term
/// key into the shared secret.
///
/// ```text
/// dh = concat(DH(skE, pkR), DH(skS, pkR))
/// kem_context = concat(enc, pkRm, pkSm)
/// ```
///
/// # Errors
///
/// See [`encap`].
pub fn auth_encap<P: CryptoProvider>(
    provider: &mut P,
    alg: KemId,
    pk_r: PublicKeyRef<'_>,
    sk_s: PrivateKeyRef<'_>,
) -> Result<(SharedSecret, EncappedKey), Error> {
    let (sk_e, pk_e) = generate_key_pair(provider, alg)?;

    auth_encap_with_ephemeral(provider, alg, pk_r, sk_s, &sk_e, pk_e)
}

/// [`auth_encap`] with a caller-supplied ephemeral seed; the same testing
/// seam as [`encap_deterministically`].
///
/// # Errors
///
/// See [`auth_encap`].
pub fn auth_encap_deterministically<P: CryptoProvider>(
    provider: &P,
    alg: KemId,
    pk_r: PublicKeyRef<'_>,
    sk_s: PrivateKeyRef<'_>,
    ikm_e: IkmRef<'_>,
) -> Result<(SharedSecret, EncappedKey), Error> {
    let (sk_e, pk_e) = derive_key_pair(provider, alg, ikm_e)?;

    auth_encap_with_ephemeral(provider, alg, pk_r, sk_s, &sk_e, pk_e)
}

fn auth_encap_with_ephemeral<P: CryptoProvider>(
    provider: &P,
    alg: KemId,
    pk_r: PublicKeyRef<'_>,
    sk_s: PrivateKeyRef<'_>,
    sk_e: &PrivateKey,
    pk_e: PublicKey,
) -> Result<(SharedSecret, EncappedKey), Error> {
    let dh_e = provider.dh(alg, sk_e.into(), pk_r)?;
    let dh_s = provider.dh(alg, sk_s, pk_r)?;
    let mut dh = [dh_e.as_ref(), dh_s.as_ref()].concat();

    let enc = EncappedKey::from_ephemeral_pk(pk_e);

    let pk_sm = provider.pk(alg, sk_s)?;

    // kem_context = concat(enc, pkRm, pkSm)
    let kem_context = [enc.as_ref(), pk_r.as_ref(), pk_sm.as_ref()].concat();

    let shared_secret = extract_and_expand(provider, alg, &dh, &kem_context);

    dh.zeroize();

    Ok((shared_secret?, enc))
}

/// `AuthDecap(enc, skR, pkS)`: decapsulation checking that `enc` was
/// produced with the private key matching `pkS`.
///
/// A mismatch is not observable here; it yields a different shared secret
/// and every subsequent `Open` fails authentication.
///
/// # Errors
///
/// See [`decap`].
pub fn auth_decap<P: CryptoProvider>(
    provider: &P,
    alg: KemId,
    enc: EncappedKeyRef<'_>,
    sk_r: PrivateKeyRef<'_>,
    pk_s: PublicKeyRef<'_>,
) -> Result<SharedSecret, Error> {
    let pk_e = PublicKeyRef::new(enc.as_ref());

    let dh_e = provider.dh(alg, sk_r, pk_e)?;
    let dh_s = provider.dh(alg, sk_r, pk_s)?;
    let mut dh = [dh_e.as_ref(), dh_s.as_ref()].concat();

    let pk_rm = provider.pk(alg, sk_r)?;

    let kem_context = [enc.as_ref(), pk_rm.as_ref(), pk_s.as_ref()].concat();

    let shared_secret = extract_and_expand(provider, alg, &dh, &kem_context);

    dh.zeroize();

    shared_secret
}

/// `ExtractAndExpand(dh, kem_context)` under the KEM's own suite ID:
///
/// ```text
/// eae_prk = LabeledExtract("", "eae_prk", dh)
/// shared_secret = LabeledExpand(eae_prk, "shared_secret",
///                               kem_context, Nsecret)
/// ```
fn extract_and_expand<P: CryptoProvider>(
    provider: &P,
    alg: KemId,
    dh: &[u8],
    kem_context: &[u8],
) -> Result<SharedSecret, Error> {
    let suite_id = alg.suite_id();

    let eae_prk = kdf::labeled_extract(
        provider,
        alg.kdf_id(),
        &suite_id,
        &[],
        "eae_prk",
        IkmRef::from(dh),
    )?;

    let okm = kdf::labeled_expand(
        provider,
        alg.kdf_id(),
        &suite_id,
        &eae_prk,
        "shared_secret",
        kem_context,
        alg.n_secret(),
    )?;

    Ok(SharedSecret::from_okm(okm))
}
