use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Address encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Transaction build failed: {0}")]
    TransactionFailed(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error(transparent)]
    Crypto(#[from] crypto_utils::CryptoError),
}

impl From<chain_btc::error::BtcError> for WalletError {
    fn from(e: chain_btc::error::BtcError) -> Self {
        use chain_btc::error::BtcError;
        match e {
            BtcError::InvalidPublicKey(msg) => WalletError::EncodingFailed(msg),
            BtcError::SigningError(msg) => WalletError::SigningFailed(msg),
            other => WalletError::TransactionFailed(format!("BTC: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_btc::error::BtcError;

    #[test]
    fn encoding_errors_keep_their_kind() {
        let err: WalletError = BtcError::InvalidPublicKey("x".into()).into();
        assert!(matches!(err, WalletError::EncodingFailed(_)));
    }

    #[test]
    fn signing_errors_keep_their_kind() {
        let err: WalletError = BtcError::SigningError("bad".into()).into();
        assert_eq!(err.to_string(), "Signing failed: bad");
    }

    #[test]
    fn build_errors_are_prefixed() {
        let err: WalletError = BtcError::NoFunds.into();
        assert!(err.to_string().starts_with("Transaction build failed: BTC:"));
    }

    #[test]
    fn crypto_errors_are_transparent() {
        let err: WalletError = crypto_utils::CryptoError::UnsupportedWordCount(15).into();
        assert_eq!(
            err.to_string(),
            crypto_utils::CryptoError::UnsupportedWordCount(15).to_string()
        );
    }
}
