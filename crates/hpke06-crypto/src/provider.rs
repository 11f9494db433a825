//! Concrete [`CryptoProvider`](crate::CryptoProvider) implementations.

#[cfg(feature = "provider-rustcrypto")]
pub mod rustcrypto;

#[cfg(feature = "provider-rustcrypto")]
pub use rustcrypto::RustCryptoProvider;
