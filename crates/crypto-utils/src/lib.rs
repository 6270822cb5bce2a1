//! # crypto-utils
//!
//! Entropy for mnemonic generation and zeroizing containers for seed
//! phrases and private keys.

pub mod error;
pub mod random;
pub mod zeroizing;

pub use error::CryptoError;
pub use random::EntropyStrength;
pub use zeroizing::{SecretBytes32, SecretString};
