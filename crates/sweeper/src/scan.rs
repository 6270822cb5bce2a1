//! Balance scan over every seed in a seed file.

use crypto_utils::SecretString;
use ledger_client::{AddressBalance, LedgerService};
use serde::Serialize;
use tracing::{debug, info, warn};
use wallet_core::types::TaprootWallet;

use crate::config::ScanConfig;
use crate::error::SweepError;
use crate::report::expose_secret;
use crate::schedule::{Pacer, WorkQueue};
use crate::seeds::preview;

/// A funded address found by the scan.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRecord {
    /// 1-based position of the seed among the non-blank lines of the seed
    /// file, so blank lines do not shift it.
    pub seed_index: usize,
    #[serde(serialize_with = "expose_secret")]
    pub seed: SecretString,
    pub address: String,
    pub derivation_path: String,
    pub balance_sat: u64,
    pub tx_count: u64,
    pub total_received_sat: u64,
    pub total_sent_sat: u64,
    /// Untweaked private key of the derivation node, hex.
    #[serde(serialize_with = "expose_secret")]
    pub private_key: SecretString,
}

#[derive(Debug, Default)]
pub struct ScanSummary {
    pub seeds_total: usize,
    /// Seeds skipped because they failed validation or derivation.
    pub invalid_seeds: usize,
    /// Balance queries issued, successful or not.
    pub addresses_checked: usize,
    pub lookup_failures: usize,
    pub total_balance_sat: u64,
    pub records: Vec<BalanceRecord>,
}

impl ScanSummary {
    pub fn funded_addresses(&self) -> usize {
        self.records.len()
    }
}

/// Check the derived addresses of every seed, one query at a time.
///
/// Unless `full_scan` is set, a seed's remaining addresses are skipped once
/// one of them holds funds. Bad seeds and failed lookups are logged and
/// counted, never fatal.
pub async fn scan_balances(
    ledger: &dyn LedgerService,
    seeds: &[SecretString],
    config: &ScanConfig,
    pacer: &mut Pacer,
) -> Result<ScanSummary, SweepError> {
    config.validate()?;

    let mut summary = ScanSummary {
        seeds_total: seeds.len(),
        ..ScanSummary::default()
    };
    let mut queue = WorkQueue::new(seeds.len(), config.addresses_per_seed);
    let mut current: Option<(usize, Vec<TaprootWallet>)> = None;

    while let Some(item) = queue.pop() {
        let phrase = &seeds[item.seed_index];
        let seed_no = item.seed_index + 1;

        if current.as_ref().map(|(i, _)| *i) != Some(item.seed_index) {
            info!(seed = seed_no, of = seeds.len(), phrase = %preview(phrase), "checking seed");
            let count = config.addresses_per_seed;
            match wallet_core::wallets_from_mnemonic(phrase, config.network, 0, count) {
                Ok(wallets) => current = Some((item.seed_index, wallets)),
                Err(e) => {
                    warn!(seed = seed_no, error = %e, "skipping seed");
                    summary.invalid_seeds += 1;
                    queue.skip_seed(item.seed_index);
                    current = None;
                    continue;
                }
            }
        }

        let Some(wallet) = current
            .as_ref()
            .and_then(|(_, wallets)| wallets.get(item.address_index as usize))
        else {
            continue;
        };

        pacer.wait().await;
        summary.addresses_checked += 1;

        match ledger.address_balance(&wallet.address).await {
            Ok(balance) if balance.has_funds() => {
                info!(
                    seed = seed_no,
                    index = item.address_index,
                    address = %wallet.address,
                    balance_sat = balance.balance_sat,
                    tx_count = balance.tx_count,
                    "funded address"
                );
                summary.total_balance_sat += balance.balance_sat;
                summary.records.push(record(seed_no, phrase, wallet, &balance));

                if !config.full_scan {
                    let skipped = queue.skip_seed(item.seed_index);
                    debug!(seed = seed_no, skipped, "moving to next seed");
                }
            }
            Ok(balance) => {
                debug!(
                    seed = seed_no,
                    index = item.address_index,
                    address = %wallet.address,
                    used = balance.has_history(),
                    "empty address"
                );
            }
            Err(e) => {
                warn!(
                    seed = seed_no,
                    index = item.address_index,
                    address = %wallet.address,
                    error = %e,
                    "balance lookup failed"
                );
                summary.lookup_failures += 1;
            }
        }
    }

    info!(
        seeds = summary.seeds_total,
        checked = summary.addresses_checked,
        funded = summary.funded_addresses(),
        total_sat = summary.total_balance_sat,
        "scan finished"
    );
    Ok(summary)
}

fn record(
    seed_index: usize,
    phrase: &SecretString,
    wallet: &TaprootWallet,
    balance: &AddressBalance,
) -> BalanceRecord {
    BalanceRecord {
        seed_index,
        seed: phrase.clone(),
        address: wallet.address.clone(),
        derivation_path: wallet.derivation_path.clone(),
        balance_sat: balance.balance_sat,
        tx_count: balance.tx_count,
        total_received_sat: balance.total_received_sat,
        total_sent_sat: balance.total_sent_sat,
        private_key: SecretString::new(wallet.private_key_hex()),
    }
}

/// Balance of a single Taproot address.
pub async fn address_balance(
    ledger: &dyn LedgerService,
    address: &str,
    config: &ScanConfig,
) -> Result<AddressBalance, SweepError> {
    chain_btc::address::validate_destination(address, config.network)?;
    Ok(ledger.address_balance(address).await?)
}
