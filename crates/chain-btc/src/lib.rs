//! Bitcoin Taproot support for the sweeper.
//!
//! Provides P2TR (BIP-86 single key) address encoding, UTXO selection,
//! sweep transaction building, and BIP-340 key-path signing. Nothing in
//! this crate performs I/O.

pub mod address;
pub mod error;
pub mod network;
pub mod signer;
pub mod transaction;
pub mod utxo;
