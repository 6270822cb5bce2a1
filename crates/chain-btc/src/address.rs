use bitcoin::address::{Address, AddressType, NetworkUnchecked};
use bitcoin::key::{TapTweak, XOnlyPublicKey};
use bitcoin::secp256k1::Secp256k1;

use crate::error::BtcError;
use crate::network::BtcNetwork;

/// Length of a bech32m-encoded witness v1 program with a 2-character HRP.
pub const P2TR_ADDRESS_LEN: usize = 62;

/// A key-path-only Taproot output derived from an internal key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaprootAddress {
    /// Bech32m address string (`bc1p...` on mainnet).
    pub address: String,
    /// Tweaked x-only output key, i.e. the 32-byte witness program.
    pub output_key: [u8; 32],
    /// Locking script: `OP_1 <output_key>`.
    pub script_pubkey: Vec<u8>,
}

/// Encode a P2TR address for an x-only internal key with no script tree.
///
/// The output key is `lift_x(internal) + H_TapTweak(internal)·G`, as BIP-86
/// prescribes for single-key wallets.
pub fn internal_key_to_p2tr(
    internal_key: &[u8; 32],
    network: BtcNetwork,
) -> Result<TaprootAddress, BtcError> {
    let secp = Secp256k1::verification_only();
    let internal = XOnlyPublicKey::from_slice(internal_key).map_err(|e| {
        BtcError::InvalidPublicKey(format!("not a valid x-only coordinate: {e}"))
    })?;

    let (output_key, _parity) = internal.tap_tweak(&secp, None);
    let address = Address::p2tr_tweaked(output_key, network.to_bitcoin_network());

    Ok(TaprootAddress {
        address: address.to_string(),
        output_key: output_key.to_inner().serialize(),
        script_pubkey: address.script_pubkey().to_bytes(),
    })
}

/// Validate a sweep destination before any funds move.
///
/// The address must carry the network's P2TR prefix, have the full length
/// of a witness v1 program, pass the bech32m checksum, and decode as P2TR
/// for `network`.
pub fn validate_destination(address: &str, network: BtcNetwork) -> Result<Address, BtcError> {
    let prefix = network.p2tr_prefix();
    if !address.to_ascii_lowercase().starts_with(prefix) {
        return Err(BtcError::InvalidAddress(format!(
            "destination must start with {prefix}"
        )));
    }
    if address.len() < P2TR_ADDRESS_LEN {
        return Err(BtcError::InvalidAddress(format!(
            "destination is {} characters, expected at least {P2TR_ADDRESS_LEN}",
            address.len()
        )));
    }

    let parsed = address
        .parse::<Address<NetworkUnchecked>>()
        .map_err(|e| BtcError::InvalidAddress(format!("failed to parse address: {e}")))?
        .require_network(network.to_bitcoin_network())
        .map_err(|e| BtcError::InvalidAddress(format!("address is for another network: {e}")))?;

    if parsed.address_type() != Some(AddressType::P2tr) {
        return Err(BtcError::InvalidAddress(
            "destination is not a taproot address".into(),
        ));
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    // BIP-86 reference vector for m/86'/0'/0'/0/0 of the all-"abandon" mnemonic.
    const INTERNAL_KEY: &str = "cc8a4bc64d897bddc5fbc2f670f7a8ba0b386779106cf1223c6fc5d7cd6fc115";
    const OUTPUT_KEY: &str = "a60869f0dbcf1dc659c9cecbaf8050135ea9e8cdc487053f1dc6880949dc684c";
    const ADDRESS: &str = "bc1p5cyxnuxmeuwuvkwfem96lqzszd02n6xdcjrs20cac6yqjjwudpxqkedrcr";

    fn internal_key() -> [u8; 32] {
        hex::decode(INTERNAL_KEY).unwrap().try_into().unwrap()
    }

    #[test]
    fn bip86_reference_vector() {
        let tr = internal_key_to_p2tr(&internal_key(), BtcNetwork::Mainnet).unwrap();
        assert_eq!(tr.address, ADDRESS);
        assert_eq!(hex::encode(tr.output_key), OUTPUT_KEY);
        assert_eq!(hex::encode(&tr.script_pubkey), format!("5120{OUTPUT_KEY}"));
    }

    #[test]
    fn testnet_address_uses_tb1p() {
        let tr = internal_key_to_p2tr(&internal_key(), BtcNetwork::Testnet).unwrap();
        assert!(tr.address.starts_with("tb1p"), "got {}", tr.address);
        // Same output key regardless of network.
        assert_eq!(hex::encode(tr.output_key), OUTPUT_KEY);
    }

    #[test]
    fn encoding_is_deterministic() {
        let a = internal_key_to_p2tr(&internal_key(), BtcNetwork::Mainnet).unwrap();
        let b = internal_key_to_p2tr(&internal_key(), BtcNetwork::Mainnet).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn off_curve_x_coordinate_is_rejected() {
        // x = 0 has no matching y on secp256k1.
        let result = internal_key_to_p2tr(&[0u8; 32], BtcNetwork::Mainnet);
        assert!(matches!(result, Err(BtcError::InvalidPublicKey(_))));
    }

    #[test]
    fn destination_accepts_reference_address() {
        let addr = validate_destination(ADDRESS, BtcNetwork::Mainnet).unwrap();
        assert_eq!(addr.to_string(), ADDRESS);
    }

    #[test]
    fn destination_rejects_segwit_v0() {
        let result = validate_destination(
            "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4",
            BtcNetwork::Mainnet,
        );
        assert!(matches!(result, Err(BtcError::InvalidAddress(_))));
    }

    #[test]
    fn destination_rejects_short_address() {
        let result = validate_destination("bc1p5cyxnuxmeuwuvkwfem96", BtcNetwork::Mainnet);
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("expected at least 62"), "got {msg}");
    }

    #[test]
    fn destination_rejects_bad_checksum() {
        let mut tampered = ADDRESS.to_string();
        tampered.pop();
        tampered.push('q');
        assert!(validate_destination(&tampered, BtcNetwork::Mainnet).is_err());
    }

    #[test]
    fn destination_rejects_other_network() {
        let testnet = internal_key_to_p2tr(&internal_key(), BtcNetwork::Testnet).unwrap();
        assert!(validate_destination(&testnet.address, BtcNetwork::Mainnet).is_err());
    }
}
