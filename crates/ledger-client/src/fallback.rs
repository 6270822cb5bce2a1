use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{LedgerError, ServiceFailure};
use crate::models::{AddressBalance, FeeEstimates, LedgerUtxo};
use crate::service::LedgerService;

/// Tries each service once, in priority order, and returns the first success.
///
/// When every service fails the result is `ServiceUnavailable` carrying each
/// service's reason.
pub struct FallbackLedger {
    services: Vec<Box<dyn LedgerService>>,
}

impl FallbackLedger {
    pub fn new(services: Vec<Box<dyn LedgerService>>) -> Self {
        Self { services }
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    fn record(
        failures: &mut Vec<ServiceFailure>,
        service: &dyn LedgerService,
        op: &str,
        e: LedgerError,
    ) {
        warn!(service = service.name(), operation = op, error = %e, "ledger service failed");
        failures.push(ServiceFailure {
            service: service.name().to_string(),
            reason: e.to_string(),
        });
    }
}

#[async_trait]
impl LedgerService for FallbackLedger {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn address_balance(&self, address: &str) -> Result<AddressBalance, LedgerError> {
        let mut failures = Vec::new();
        for service in &self.services {
            match service.address_balance(address).await {
                Ok(balance) => {
                    debug!(service = service.name(), address, "balance fetched");
                    return Ok(balance);
                }
                Err(e) => Self::record(&mut failures, service.as_ref(), "address_balance", e),
            }
        }
        Err(LedgerError::ServiceUnavailable {
            operation: "address_balance",
            failures,
        })
    }

    async fn address_utxos(&self, address: &str) -> Result<Vec<LedgerUtxo>, LedgerError> {
        let mut failures = Vec::new();
        for service in &self.services {
            match service.address_utxos(address).await {
                Ok(utxos) => {
                    debug!(service = service.name(), address, count = utxos.len(), "utxos fetched");
                    return Ok(utxos);
                }
                Err(e) => Self::record(&mut failures, service.as_ref(), "address_utxos", e),
            }
        }
        Err(LedgerError::ServiceUnavailable {
            operation: "address_utxos",
            failures,
        })
    }

    async fn broadcast(&self, raw_tx_hex: &str) -> Result<String, LedgerError> {
        let mut failures = Vec::new();
        for service in &self.services {
            match service.broadcast(raw_tx_hex).await {
                Ok(txid) => {
                    debug!(service = service.name(), %txid, "transaction broadcast");
                    return Ok(txid);
                }
                Err(e) => Self::record(&mut failures, service.as_ref(), "broadcast", e),
            }
        }
        Err(LedgerError::ServiceUnavailable {
            operation: "broadcast",
            failures,
        })
    }

    async fn fee_estimates(&self) -> Result<FeeEstimates, LedgerError> {
        let mut failures = Vec::new();
        for service in &self.services {
            match service.fee_estimates().await {
                Ok(fees) => return Ok(fees),
                Err(e) => Self::record(&mut failures, service.as_ref(), "fee_estimates", e),
            }
        }
        Err(LedgerError::ServiceUnavailable {
            operation: "fee_estimates",
            failures,
        })
    }
}

/// Fee estimates from `ledger`, or the built-in defaults if it fails.
pub async fn fee_estimates_or_default(ledger: &dyn LedgerService) -> FeeEstimates {
    match ledger.fee_estimates().await {
        Ok(fees) => fees,
        Err(e) => {
            warn!(error = %e, "using default fee rates");
            FeeEstimates::default()
        }
    }
}
