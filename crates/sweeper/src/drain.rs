//! Sweep every funded seed to one destination.

use chain_btc::error::BtcError;
use chain_btc::utxo::Utxo;
use crypto_utils::SecretString;
use ledger_client::{fee_estimates_or_default, LedgerService, LedgerUtxo};
use serde::Serialize;
use tracing::{info, warn};
use wallet_core::types::TaprootWallet;

use crate::config::DrainConfig;
use crate::error::SweepError;
use crate::schedule::{Pacer, WorkQueue};
use crate::seeds::preview;

/// One sweep transaction, broadcast or (in a dry run) only signed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrainRecord {
    /// 1-based position among the non-blank seed lines.
    pub seed_index: usize,
    pub txid: String,
    pub from_address: String,
    pub to_address: String,
    /// Value of the single output.
    pub amount_sat: u64,
    pub fee_sat: u64,
    pub input_count: usize,
    pub vsize: usize,
    /// Funds were left behind by the input cap.
    pub partial: bool,
    pub left_behind_count: usize,
    pub left_behind_sat: u64,
    pub broadcast: bool,
    /// Signed transaction hex, kept for dry runs only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_tx: Option<String>,
}

#[derive(Debug, Default)]
pub struct DrainSummary {
    pub destination: String,
    pub fee_rate: u64,
    pub dry_run: bool,
    pub seeds_total: usize,
    pub invalid_seeds: usize,
    pub addresses_visited: usize,
    /// Addresses without any outputs.
    pub empty: usize,
    /// Addresses holding only unconfirmed outputs while those are excluded.
    pub pending: usize,
    /// Addresses whose value would not survive the fee.
    pub dust: usize,
    pub failed: usize,
    pub records: Vec<DrainRecord>,
}

impl DrainSummary {
    pub fn total_drained_sat(&self) -> u64 {
        self.records.iter().map(|r| r.amount_sat).sum()
    }

    pub fn total_fees_sat(&self) -> u64 {
        self.records.iter().map(|r| r.fee_sat).sum()
    }
}

enum Outcome {
    Swept(DrainRecord),
    Empty,
    Pending,
    Dust,
    Failed,
}

/// Drain every seed's addresses to `config.destination`.
///
/// The destination and the confirmation gate are checked before the first
/// network call. Per-address failures are logged and counted; one seed's
/// failure does not stop the run.
pub async fn drain_wallets(
    ledger: &dyn LedgerService,
    seeds: &[SecretString],
    config: &DrainConfig,
    pacer: &mut Pacer,
) -> Result<DrainSummary, SweepError> {
    config.validate()?;

    let fee_rate = if config.fee_rate.needs_estimates() {
        config.fee_rate.resolve(&fee_estimates_or_default(ledger).await)
    } else {
        config.fee_rate.resolve(&Default::default())
    };
    info!(
        destination = %config.destination,
        fee_rate,
        choice = %config.fee_rate,
        dry_run = config.dry_run,
        seeds = seeds.len(),
        "starting drain"
    );

    let mut summary = DrainSummary {
        destination: config.destination.clone(),
        fee_rate,
        dry_run: config.dry_run,
        seeds_total: seeds.len(),
        ..DrainSummary::default()
    };
    let mut queue = WorkQueue::new(seeds.len(), config.addresses_per_seed);
    let mut current: Option<(usize, Vec<TaprootWallet>)> = None;

    while let Some(item) = queue.pop() {
        let phrase = &seeds[item.seed_index];
        let seed_no = item.seed_index + 1;

        if current.as_ref().map(|(i, _)| *i) != Some(item.seed_index) {
            info!(seed = seed_no, of = seeds.len(), phrase = %preview(phrase), "draining seed");
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
        summary.addresses_visited += 1;

        match drain_address(ledger, seed_no, wallet, config, fee_rate).await {
            Outcome::Swept(record) => summary.records.push(record),
            Outcome::Empty => summary.empty += 1,
            Outcome::Pending => summary.pending += 1,
            Outcome::Dust => summary.dust += 1,
            Outcome::Failed => summary.failed += 1,
        }
    }

    info!(
        transactions = summary.records.len(),
        drained_sat = summary.total_drained_sat(),
        fees_sat = summary.total_fees_sat(),
        pending = summary.pending,
        failed = summary.failed,
        "drain finished"
    );
    Ok(summary)
}

async fn drain_address(
    ledger: &dyn LedgerService,
    seed_no: usize,
    wallet: &TaprootWallet,
    config: &DrainConfig,
    fee_rate: u64,
) -> Outcome {
    let address = wallet.address.as_str();

    let ledger_utxos = match ledger.address_utxos(address).await {
        Ok(utxos) => utxos,
        Err(e) => {
            warn!(seed = seed_no, address, error = %e, "utxo lookup failed");
            return Outcome::Failed;
        }
    };
    let utxos = spendable(&ledger_utxos, &wallet.script_pubkey, config.include_unconfirmed);
    let (pending_count, pending_sat) = pending(&ledger_utxos, config.include_unconfirmed);
    if pending_count > 0 {
        warn!(
            seed = seed_no,
            address,
            pending = pending_count,
            pending_sat,
            "unconfirmed outputs skipped, rerun once confirmed or pass --include-unconfirmed"
        );
    }

    let sweep = match wallet_core::build_signed_sweep(
        wallet,
        &utxos,
        &config.destination,
        fee_rate,
        config.network,
    ) {
        Ok(sweep) => sweep,
        Err(BtcError::NoFunds) if pending_count > 0 => return Outcome::Pending,
        Err(BtcError::NoFunds) => {
            info!(seed = seed_no, address, "nothing to sweep");
            return Outcome::Empty;
        }
        Err(e @ BtcError::InsufficientFunds { .. }) => {
            info!(seed = seed_no, address, reason = %e, "balance does not cover the fee");
            return Outcome::Dust;
        }
        Err(e) => {
            warn!(seed = seed_no, address, error = %e, "could not build sweep");
            return Outcome::Failed;
        }
    };

    let summary = &sweep.summary;
    if summary.is_partial() {
        warn!(
            seed = seed_no,
            address,
            spent = summary.input_count,
            left_behind = summary.left_behind,
            left_behind_sat = summary.left_behind_sat,
            "input cap reached, run the drain again for the rest"
        );
    }

    let txid = if config.dry_run {
        info!(
            seed = seed_no,
            address,
            txid = %sweep.signed.txid,
            amount_sat = summary.output_sat,
            fee_sat = summary.fee_sat,
            "dry run, not broadcasting"
        );
        sweep.signed.txid.clone()
    } else {
        match ledger.broadcast(&sweep.signed.raw_hex).await {
            Ok(txid) => {
                if txid != sweep.signed.txid {
                    warn!(
                        returned = %txid,
                        computed = %sweep.signed.txid,
                        "service returned a different txid"
                    );
                }
                info!(
                    seed = seed_no,
                    address,
                    %txid,
                    amount_sat = summary.output_sat,
                    fee_sat = summary.fee_sat,
                    "sweep broadcast"
                );
                txid
            }
            Err(e) => {
                warn!(seed = seed_no, address, error = %e, "broadcast failed");
                return Outcome::Failed;
            }
        }
    };

    Outcome::Swept(DrainRecord {
        seed_index: seed_no,
        txid,
        from_address: wallet.address.clone(),
        to_address: config.destination.clone(),
        amount_sat: summary.output_sat,
        fee_sat: summary.fee_sat,
        input_count: summary.input_count,
        vsize: sweep.signed.vsize,
        partial: summary.is_partial(),
        left_behind_count: summary.left_behind,
        left_behind_sat: summary.left_behind_sat,
        broadcast: !config.dry_run,
        raw_tx: config.dry_run.then(|| sweep.signed.raw_hex.clone()),
    })
}

/// Ledger outputs the wallet can spend, tagged with its locking script.
fn spendable(utxos: &[LedgerUtxo], script_pubkey: &[u8], include_unconfirmed: bool) -> Vec<Utxo> {
    utxos
        .iter()
        .filter(|u| include_unconfirmed || u.confirmed)
        .map(|u| Utxo {
            txid: u.txid.clone(),
            vout: u.vout,
            amount_sat: u.value_sat,
            script_pubkey: script_pubkey.to_vec(),
        })
        .collect()
}

/// Count and value of the unconfirmed outputs a run will leave untouched.
fn pending(utxos: &[LedgerUtxo], include_unconfirmed: bool) -> (usize, u64) {
    if include_unconfirmed {
        return (0, 0);
    }
    utxos
        .iter()
        .filter(|u| !u.confirmed)
        .fold((0, 0), |(n, sat), u| (n + 1, sat + u.value_sat))
}
