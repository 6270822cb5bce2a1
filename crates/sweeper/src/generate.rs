use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crypto_utils::SecretString;
use tracing::info;
use wallet_core::types::TaprootWallet;

use crate::config::GenerateConfig;
use crate::error::SweepError;

/// A fresh mnemonic and its index-0 wallet.
#[derive(Debug)]
pub struct GeneratedWallet {
    pub mnemonic: SecretString,
    pub wallet: TaprootWallet,
}

impl GeneratedWallet {
    /// `mnemonic,private_key_hex,address`
    pub fn line(&self) -> SecretString {
        SecretString::new(format!(
            "{},{},{}",
            self.mnemonic.as_str(),
            self.wallet.private_key_hex(),
            self.wallet.address
        ))
    }
}

/// Generate `config.count` mnemonics and derive the first address of each.
pub fn generate_wallets(config: &GenerateConfig) -> Result<Vec<GeneratedWallet>, SweepError> {
    config.validate()?;

    let mnemonics = wallet_core::mnemonic::generate_mnemonics(config.count, config.word_count)?;
    mnemonics
        .into_iter()
        .map(|mnemonic| -> Result<GeneratedWallet, SweepError> {
            let wallet = wallet_core::wallet_from_mnemonic(&mnemonic, config.network, 0)?;
            Ok(GeneratedWallet { mnemonic, wallet })
        })
        .collect()
}

/// Append one line per wallet to `path`, creating the file if needed.
pub fn append_generated(path: &Path, wallets: &[GeneratedWallet]) -> Result<(), SweepError> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for wallet in wallets {
        writeln!(file, "{}", wallet.line().as_str())?;
    }
    file.flush()?;
    info!(path = %path.display(), count = wallets.len(), "generated wallets saved");
    Ok(())
}
