use bip32::{ChildNumber, DerivationPath, XPrv};
use chain_btc::network::BtcNetwork;
use k256::ecdsa::SigningKey;
use zeroize::Zeroize;

use crate::error::WalletError;

/// BIP-86 purpose field for single-key P2TR outputs.
pub const BIP86_PURPOSE: u32 = 86;

/// Path of the receive chain: m/86'/coin_type'/account'/0
fn receive_chain_path(network: BtcNetwork, account: u32) -> String {
    format!("m/{BIP86_PURPOSE}'/{}'/{account}'/0", network.coin_type())
}

/// Full BIP-86 path: m/86'/coin_type'/account'/0/address_index
pub fn bip86_path(network: BtcNetwork, account: u32, index: u32) -> String {
    format!("{}/{index}", receive_chain_path(network, account))
}

/// Derive the BIP-86 key for one address index of account 0.
pub fn derive_taproot_key(
    seed: &[u8],
    network: BtcNetwork,
    index: u32,
) -> Result<DerivedTaprootKey, WalletError> {
    let mut keys = derive_taproot_keys(seed, network, index, 1)?;
    keys.pop()
        .ok_or_else(|| WalletError::DerivationFailed("no key derived".into()))
}

/// Derive `count` consecutive receive keys starting at `start`.
///
/// The hardened prefix is walked once; each index is then a single
/// non-hardened child step.
pub fn derive_taproot_keys(
    seed: &[u8],
    network: BtcNetwork,
    start: u32,
    count: u32,
) -> Result<Vec<DerivedTaprootKey>, WalletError> {
    if seed.len() < 16 || seed.len() > 64 {
        return Err(WalletError::InvalidSeed(format!(
            "seed must be 16..=64 bytes, got {}",
            seed.len()
        )));
    }

    let chain_path_str = receive_chain_path(network, 0);
    let chain_path: DerivationPath = chain_path_str
        .parse()
        .map_err(|e: bip32::Error| WalletError::DerivationFailed(e.to_string()))?;
    let receive_chain = XPrv::derive_from_path(seed, &chain_path)
        .map_err(|e| WalletError::DerivationFailed(e.to_string()))?;

    let mut keys = Vec::with_capacity(count as usize);
    for offset in 0..count {
        let index = start.checked_add(offset).ok_or_else(|| {
            WalletError::DerivationFailed("address index overflows u32".into())
        })?;
        let child_number = ChildNumber::new(index, false)
            .map_err(|e| WalletError::DerivationFailed(e.to_string()))?;
        let child = receive_chain
            .derive_child(child_number)
            .map_err(|e| WalletError::DerivationFailed(e.to_string()))?;

        keys.push(DerivedTaprootKey::from_xprv(
            &child,
            format!("{chain_path_str}/{index}"),
        )?);
    }
    Ok(keys)
}

/// A BIP-32 node on the BIP-86 receive chain.
pub struct DerivedTaprootKey {
    pub private_key: [u8; 32],
    pub public_key_compressed: [u8; 33],
    pub chain_code: [u8; 32],
    pub depth: u8,
    /// Non-hardened child index, i.e. the address index.
    pub child_number: u32,
    pub derivation_path: String,
}

impl DerivedTaprootKey {
    fn from_xprv(xprv: &XPrv, derivation_path: String) -> Result<Self, WalletError> {
        let private_key: [u8; 32] = xprv.to_bytes().into();
        let signing_key = SigningKey::from_bytes(&private_key.into())
            .map_err(|e| WalletError::DerivationFailed(e.to_string()))?;

        let public_key_compressed: [u8; 33] = signing_key
            .verifying_key()
            .to_sec1_bytes()
            .as_ref()
            .try_into()
            .map_err(|_| WalletError::DerivationFailed("Invalid public key length".into()))?;

        let attrs = xprv.attrs();
        Ok(Self {
            private_key,
            public_key_compressed,
            chain_code: attrs.chain_code,
            depth: attrs.depth,
            child_number: attrs.child_number.index(),
            derivation_path,
        })
    }

    /// x-only internal key: the compressed public key without its parity byte.
    pub fn internal_key(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.public_key_compressed[1..]);
        out
    }
}

impl Drop for DerivedTaprootKey {
    fn drop(&mut self) {
        self.private_key.zeroize();
        self.chain_code.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mnemonic::mnemonic_to_seed;

    // BIP-39 test vector: "abandon" x11 + "about"
    const TEST_MNEMONIC: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon \
         about";

    fn test_seed() -> zeroize::Zeroizing<[u8; 64]> {
        mnemonic_to_seed(TEST_MNEMONIC, "").unwrap()
    }

    #[test]
    fn test_bip86_paths() {
        assert_eq!(bip86_path(BtcNetwork::Mainnet, 0, 0), "m/86'/0'/0'/0/0");
        assert_eq!(bip86_path(BtcNetwork::Testnet, 0, 7), "m/86'/1'/0'/0/7");
    }

    #[test]
    fn test_bip86_internal_keys() {
        let seed = test_seed();
        let key0 = derive_taproot_key(seed.as_slice(), BtcNetwork::Mainnet, 0).unwrap();
        let key1 = derive_taproot_key(seed.as_slice(), BtcNetwork::Mainnet, 1).unwrap();

        assert_eq!(
            hex::encode(key0.internal_key()),
            "cc8a4bc64d897bddc5fbc2f670f7a8ba0b386779106cf1223c6fc5d7cd6fc115"
        );
        assert_eq!(
            hex::encode(key1.internal_key()),
            "83dfe85a3151d2517290da461fe2815591ef69f2b18a2ce63f01697a8b313145"
        );
    }

    #[test]
    fn test_bip86_private_key() {
        let seed = test_seed();
        let key0 = derive_taproot_key(seed.as_slice(), BtcNetwork::Mainnet, 0).unwrap();
        assert_eq!(
            hex::encode(key0.private_key),
            "41f41d69260df4cf277826a9b65a3717e4eeddbeedf637f212ca096576479361"
        );
    }

    #[test]
    fn test_node_metadata() {
        let seed = test_seed();
        let key = derive_taproot_key(seed.as_slice(), BtcNetwork::Mainnet, 3).unwrap();
        assert_eq!(key.derivation_path, "m/86'/0'/0'/0/3");
        assert_eq!(key.depth, 5);
        assert_eq!(key.child_number, 3);
        assert!(key.public_key_compressed[0] == 0x02 || key.public_key_compressed[0] == 0x03);
    }

    #[test]
    fn test_derivation_deterministic() {
        let seed = test_seed();
        let a = derive_taproot_key(seed.as_slice(), BtcNetwork::Mainnet, 0).unwrap();
        let b = derive_taproot_key(seed.as_slice(), BtcNetwork::Mainnet, 0).unwrap();
        assert_eq!(a.private_key, b.private_key);
        assert_eq!(a.chain_code, b.chain_code);
    }

    #[test]
    fn test_range_matches_single_derivation() {
        let seed = test_seed();
        let range = derive_taproot_keys(seed.as_slice(), BtcNetwork::Mainnet, 2, 3).unwrap();
        assert_eq!(range.len(), 3);
        for (offset, key) in range.iter().enumerate() {
            let index = 2 + offset as u32;
            let single = derive_taproot_key(seed.as_slice(), BtcNetwork::Mainnet, index).unwrap();
            assert_eq!(key.private_key, single.private_key);
            assert_eq!(key.derivation_path, single.derivation_path);
        }
    }

    #[test]
    fn test_networks_use_different_coin_types() {
        let seed = test_seed();
        let main = derive_taproot_key(seed.as_slice(), BtcNetwork::Mainnet, 0).unwrap();
        let test = derive_taproot_key(seed.as_slice(), BtcNetwork::Testnet, 0).unwrap();
        assert_ne!(main.private_key, test.private_key);
    }

    #[test]
    fn test_short_seed_rejected() {
        assert!(matches!(
            derive_taproot_key(&[0u8; 8], BtcNetwork::Mainnet, 0),
            Err(WalletError::InvalidSeed(_))
        ));
    }

    #[test]
    fn test_index_overflow_rejected() {
        let seed = test_seed();
        assert!(derive_taproot_keys(seed.as_slice(), BtcNetwork::Mainnet, u32::MAX, 2).is_err());
    }
}
