//! Scan, drain and generate BIP-86 Taproot wallets from seed phrase files.
//!
//! The orchestrators take a `&dyn LedgerService` so they can run against
//! the public Esplora/BlockCypher chain or an in-process fake.

pub mod config;
pub mod drain;
pub mod error;
pub mod generate;
pub mod report;
pub mod scan;
pub mod schedule;
pub mod seeds;

pub use config::{DrainConfig, FeeRateChoice, GenerateConfig, ScanConfig, ServiceConfig};
pub use drain::{drain_wallets, DrainRecord, DrainSummary};
pub use error::SweepError;
pub use generate::{append_generated, generate_wallets, GeneratedWallet};
pub use scan::{address_balance, scan_balances, BalanceRecord, ScanSummary};
pub use schedule::{Pacer, WorkItem, WorkQueue};
pub use seeds::read_seeds;
