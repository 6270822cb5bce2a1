//! Key management for the Taproot sweeper.
//!
//! Mnemonic handling, BIP-86 derivation, the `TapTweak` on private keys, and
//! facade functions that tie derivation to `chain-btc`'s address encoder,
//! sweep builder and signer. No I/O happens here.

pub mod address;
pub mod error;
pub mod hd_derivation;
pub mod mnemonic;
pub mod tweak;
pub mod types;

use chain_btc::error::BtcError;
use chain_btc::network::BtcNetwork;
use chain_btc::utxo::Utxo;
use crypto_utils::SecretString;

use error::WalletError;
use types::{SweepTransaction, TaprootWallet};

/// Generate a new 12- or 24-word mnemonic.
pub fn generate_mnemonic(word_count: usize) -> Result<SecretString, WalletError> {
    mnemonic::generate_mnemonic(word_count)
}

/// Validate a mnemonic phrase
pub fn validate_mnemonic(phrase: &str) -> bool {
    mnemonic::validate_mnemonic(phrase)
}

/// Derive the wallet at `index` for a mnemonic (empty BIP-39 passphrase).
pub fn wallet_from_mnemonic(
    phrase: &str,
    network: BtcNetwork,
    index: u32,
) -> Result<TaprootWallet, WalletError> {
    let seed = mnemonic::mnemonic_to_seed(phrase, "")?;
    address::derive_taproot_wallet(seed.as_slice(), network, index)
}

/// Derive `count` consecutive wallets for a mnemonic, starting at `start`.
pub fn wallets_from_mnemonic(
    phrase: &str,
    network: BtcNetwork,
    start: u32,
    count: u32,
) -> Result<Vec<TaprootWallet>, WalletError> {
    let seed = mnemonic::mnemonic_to_seed(phrase, "")?;
    address::derive_taproot_wallets(seed.as_slice(), network, start, count)
}

/// Build and sign a sweep of `utxos` held by `wallet` to `destination`.
///
/// Errors keep the `BtcError` kind so callers can tell an empty or dusty
/// address from a signing failure.
pub fn build_signed_sweep(
    wallet: &TaprootWallet,
    utxos: &[Utxo],
    destination: &str,
    fee_rate: u64,
    network: BtcNetwork,
) -> Result<SweepTransaction, BtcError> {
    let draft =
        chain_btc::transaction::build_sweep_transaction(utxos, destination, fee_rate, network)?;
    let signed = chain_btc::signer::sign_sweep(&draft, &wallet.signing_key())?;

    Ok(SweepTransaction {
        summary: draft.summary,
        signed,
    })
}
