//! Key Encapsulation Mechanisms.
//!
//! Every KEM in the draft-06 registry is a DHKEM: a Diffie-Hellman group
//! wrapped into `Encap`/`Decap` (and the authenticated variants) through
//! `ExtractAndExpand`. The group operations come from the
//! [`CryptoProvider`](hpke06_crypto::CryptoProvider); everything above
//! them lives here.

mod dhkem;

pub use dhkem::{
    auth_decap, auth_encap, auth_encap_deterministically, decap, derive_key_pair, encap,
    encap_deterministically, generate_key_pair,
};
