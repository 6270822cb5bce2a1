use std::path::PathBuf;

use chain_btc::error::BtcError;
use ledger_client::LedgerError;
use thiserror::Error;
use wallet_core::error::WalletError;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("invalid destination: {0}")]
    InvalidDestination(String),

    /// The drain was not explicitly confirmed.
    #[error("drain not confirmed; pass --yes or type YES at the prompt")]
    NotConfirmed,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("seed file {}: {reason}", path.display())]
    Seeds { path: PathBuf, reason: String },

    #[error("report: {0}")]
    Report(String),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Btc(BtcError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<BtcError> for SweepError {
    fn from(e: BtcError) -> Self {
        match e {
            BtcError::InvalidAddress(msg) => SweepError::InvalidDestination(msg),
            other => SweepError::Btc(other),
        }
    }
}

impl From<serde_json::Error> for SweepError {
    fn from(e: serde_json::Error) -> Self {
        SweepError::Report(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_address_becomes_invalid_destination() {
        let err: SweepError = BtcError::InvalidAddress("bad checksum".into()).into();
        assert!(matches!(err, SweepError::InvalidDestination(ref m) if m == "bad checksum"));
    }

    #[test]
    fn other_btc_errors_pass_through() {
        let err: SweepError = BtcError::NoFunds.into();
        assert!(matches!(err, SweepError::Btc(BtcError::NoFunds)));
        assert_eq!(err.to_string(), "no unspent outputs to spend");
    }

    #[test]
    fn seeds_error_names_path() {
        let err = SweepError::Seeds {
            path: PathBuf::from("seeds.txt"),
            reason: "file is empty".into(),
        };
        assert_eq!(err.to_string(), "seed file seeds.txt: file is empty");
    }
}
