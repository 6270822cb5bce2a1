use chain_btc::network::BtcNetwork;
use crypto_utils::SecretBytes32;

use crate::error::WalletError;
use crate::hd_derivation::{self, DerivedTaprootKey};
use crate::tweak;
use crate::types::TaprootWallet;

/// Derive the Taproot wallet at `index` from seed bytes.
pub fn derive_taproot_wallet(
    seed: &[u8],
    network: BtcNetwork,
    index: u32,
) -> Result<TaprootWallet, WalletError> {
    let key = hd_derivation::derive_taproot_key(seed, network, index)?;
    wallet_from_key(&key, network)
}

/// Derive `count` consecutive Taproot wallets starting at `start`.
pub fn derive_taproot_wallets(
    seed: &[u8],
    network: BtcNetwork,
    start: u32,
    count: u32,
) -> Result<Vec<TaprootWallet>, WalletError> {
    hd_derivation::derive_taproot_keys(seed, network, start, count)?
        .iter()
        .map(|key| wallet_from_key(key, network))
        .collect()
}

fn wallet_from_key(
    key: &DerivedTaprootKey,
    network: BtcNetwork,
) -> Result<TaprootWallet, WalletError> {
    let internal_key = key.internal_key();
    let encoded = chain_btc::address::internal_key_to_p2tr(&internal_key, network)?;
    let tweaked = tweak::tweak_private_key(&key.private_key)?;
    let tweaked_public = tweak::tweak_public_key(&internal_key)?;

    // Each output key is computed independently; all must agree.
    check_output_key(
        &encoded.output_key,
        &tweaked_public,
        &tweaked.output_key,
        &key.derivation_path,
    )?;

    Ok(TaprootWallet {
        index: key.child_number,
        derivation_path: key.derivation_path.clone(),
        address: encoded.address,
        internal_key,
        output_key: encoded.output_key,
        script_pubkey: encoded.script_pubkey,
        private_key: SecretBytes32::new(key.private_key),
        tweaked_private_key: SecretBytes32::new(tweaked.private_key),
    })
}

fn check_output_key(
    encoded: &[u8; 32],
    from_public: &[u8; 32],
    from_private: &[u8; 32],
    path: &str,
) -> Result<(), WalletError> {
    if from_public != encoded {
        return Err(WalletError::DerivationFailed(format!(
            "tweaked public key does not match address output key at {path}"
        )));
    }
    if from_private != encoded {
        return Err(WalletError::DerivationFailed(format!(
            "tweaked private key does not match address output key at {path}"
        )));
    }
    Ok(())
}
