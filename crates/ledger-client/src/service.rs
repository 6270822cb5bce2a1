use async_trait::async_trait;

use crate::error::LedgerError;
use crate::models::{AddressBalance, FeeEstimates, LedgerUtxo};

/// A read/write view of the Bitcoin ledger.
///
/// Implemented by each HTTP adapter and by [`crate::FallbackLedger`], so
/// orchestrators can take `&dyn LedgerService` and tests can substitute an
/// in-memory ledger.
#[async_trait]
pub trait LedgerService: Send + Sync {
    /// Short name used in logs and failure reports.
    fn name(&self) -> &str;

    async fn address_balance(&self, address: &str) -> Result<AddressBalance, LedgerError>;

    async fn address_utxos(&self, address: &str) -> Result<Vec<LedgerUtxo>, LedgerError>;

    /// Submit a fully signed transaction; returns its txid.
    async fn broadcast(&self, raw_tx_hex: &str) -> Result<String, LedgerError>;

    async fn fee_estimates(&self) -> Result<FeeEstimates, LedgerError>;
}
