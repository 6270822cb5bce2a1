//! # ledger-client
//!
//! Balance, UTXO, fee and broadcast queries against public Bitcoin ledger
//! services, behind the [`LedgerService`] trait.
//!
//! [`FallbackLedger`] chains several services in priority order; the
//! concrete adapters speak the Esplora and BlockCypher REST APIs.

pub mod blockcypher;
pub mod error;
pub mod esplora;
pub mod fallback;
pub mod http;
pub mod models;
pub mod service;

pub use blockcypher::BlockCypherService;
pub use error::{LedgerError, ServiceFailure};
pub use esplora::EsploraService;
pub use fallback::{fee_estimates_or_default, FallbackLedger};
pub use models::{AddressBalance, FeeEstimates, LedgerUtxo};
pub use service::LedgerService;

/// The default chain: Esplora first, BlockCypher second.
pub fn esplora_then_blockcypher(
    client: reqwest::Client,
    esplora_url: &str,
    blockcypher_url: &str,
) -> FallbackLedger {
    FallbackLedger::new(vec![
        Box::new(EsploraService::new(client.clone(), esplora_url)),
        Box::new(BlockCypherService::new(client, blockcypher_url)),
    ])
}
