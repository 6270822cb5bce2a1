use chain_btc::signer::{SignedTransaction, TaprootSigningKey};
use chain_btc::transaction::DraftSummary;
use crypto_utils::SecretBytes32;

/// Everything needed to watch and spend one BIP-86 address.
#[derive(Debug, Clone)]
pub struct TaprootWallet {
    /// Address index on the receive chain.
    pub index: u32,
    pub derivation_path: String,
    pub address: String,
    /// x-only internal key `P`.
    pub internal_key: [u8; 32],
    /// x-only output key `Q`, the witness program.
    pub output_key: [u8; 32],
    /// `OP_1 <output_key>`
    pub script_pubkey: Vec<u8>,
    /// BIP-32 private key of the node.
    pub private_key: SecretBytes32,
    /// Private key for `Q`.
    pub tweaked_private_key: SecretBytes32,
}

impl TaprootWallet {
    /// Key material for the transaction signer.
    pub fn signing_key(&self) -> TaprootSigningKey {
        TaprootSigningKey::new(
            *self.private_key.as_bytes(),
            *self.tweaked_private_key.as_bytes(),
        )
    }

    /// Untweaked private key as hex, as written to reports.
    pub fn private_key_hex(&self) -> String {
        self.private_key.to_hex()
    }
}

/// A built and signed sweep.
#[derive(Debug, Clone)]
pub struct SweepTransaction {
    pub summary: DraftSummary,
    pub signed: SignedTransaction,
}
