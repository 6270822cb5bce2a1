use thiserror::Error;

/// Bitcoin chain operation errors.
#[derive(Debug, Error)]
pub enum BtcError {
    /// The input is not a usable x-only public key (address encoding failed).
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("no unspent outputs to spend")]
    NoFunds,

    /// The remainder after fees would not exceed the 546 sat dust threshold.
    #[error(
        "insufficient funds: {total_sat} sat in, fee {fee_sat} sat leaves {remaining_sat} sat \
         (must exceed 546 sat)"
    )]
    InsufficientFunds {
        total_sat: u64,
        fee_sat: u64,
        remaining_sat: u64,
    },

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_public_key() {
        let err = BtcError::InvalidPublicKey("not on curve".into());
        assert_eq!(err.to_string(), "invalid public key: not on curve");
    }

    #[test]
    fn display_invalid_address() {
        let err = BtcError::InvalidAddress("bad checksum".into());
        assert_eq!(err.to_string(), "invalid address: bad checksum");
    }

    #[test]
    fn display_no_funds() {
        assert_eq!(BtcError::NoFunds.to_string(), "no unspent outputs to spend");
    }

    #[test]
    fn display_insufficient_funds() {
        let err = BtcError::InsufficientFunds {
            total_sat: 500,
            fee_sat: 111,
            remaining_sat: 389,
        };
        assert_eq!(
            err.to_string(),
            "insufficient funds: 500 sat in, fee 111 sat leaves 389 sat (must exceed 546 sat)"
        );
    }

    #[test]
    fn display_signing_error() {
        let err = BtcError::SigningError("sighash failed".into());
        assert_eq!(err.to_string(), "signing error: sighash failed");
    }

    #[test]
    fn debug_format_works() {
        let err = BtcError::TransactionBuildError("fail".into());
        let debug = format!("{:?}", err);
        assert!(debug.contains("TransactionBuildError"));
    }
}
