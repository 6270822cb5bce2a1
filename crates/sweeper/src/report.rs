//! JSON reports written at the end of a scan or drain.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use crypto_utils::SecretString;
use serde::{Serialize, Serializer};
use tracing::info;

use crate::drain::{DrainRecord, DrainSummary};
use crate::error::SweepError;
use crate::scan::{BalanceRecord, ScanSummary};

const SATS_PER_BTC: u64 = 100_000_000;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BalanceReport<'a> {
    timestamp: String,
    seeds_total: usize,
    addresses_checked: usize,
    funded_addresses: usize,
    total_balance_sat: u64,
    total_balance_btc: String,
    results: &'a [BalanceRecord],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DrainReport<'a> {
    timestamp: String,
    target_address: &'a str,
    fee_rate: u64,
    dry_run: bool,
    total_transactions: usize,
    total_amount_drained: u64,
    total_fees_paid: u64,
    transactions: &'a [DrainRecord],
}

/// Serialize a secret as a plain string. Reports are the one place seeds
/// and keys leave their zeroizing wrapper.
pub(crate) fn expose_secret<S: Serializer>(secret: &SecretString, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(secret.as_str())
}

/// `12345678` sat as `0.12345678`.
pub fn format_btc(sat: u64) -> String {
    format!("{}.{:08}", sat / SATS_PER_BTC, sat % SATS_PER_BTC)
}

/// ISO-8601 timestamp with `:` and `.` replaced so it is safe in file names.
pub fn file_timestamp(at: DateTime<Utc>) -> String {
    iso(at).replace([':', '.'], "-")
}

fn iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Write `balance_results_<timestamp>.json` into `dir`. Nothing is written
/// when the scan found no funded address.
pub fn write_balance_report(
    dir: &Path,
    summary: &ScanSummary,
    at: DateTime<Utc>,
) -> Result<Option<PathBuf>, SweepError> {
    if summary.records.is_empty() {
        return Ok(None);
    }
    let report = BalanceReport {
        timestamp: iso(at),
        seeds_total: summary.seeds_total,
        addresses_checked: summary.addresses_checked,
        funded_addresses: summary.funded_addresses(),
        total_balance_sat: summary.total_balance_sat,
        total_balance_btc: format_btc(summary.total_balance_sat),
        results: &summary.records,
    };
    let path = dir.join(format!("balance_results_{}.json", file_timestamp(at)));
    write_json(&path, &report)?;
    Ok(Some(path))
}

/// Write `drain_results_<timestamp>.json` into `dir` when at least one
/// transaction was produced.
pub fn write_drain_report(
    dir: &Path,
    summary: &DrainSummary,
    at: DateTime<Utc>,
) -> Result<Option<PathBuf>, SweepError> {
    if summary.records.is_empty() {
        return Ok(None);
    }
    let report = DrainReport {
        timestamp: iso(at),
        target_address: &summary.destination,
        fee_rate: summary.fee_rate,
        dry_run: summary.dry_run,
        total_transactions: summary.records.len(),
        total_amount_drained: summary.total_drained_sat(),
        total_fees_paid: summary.total_fees_sat(),
        transactions: &summary.records,
    };
    let path = dir.join(format!("drain_results_{}.json", file_timestamp(at)));
    write_json(&path, &report)?;
    Ok(Some(path))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SweepError> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), "report saved");
    Ok(())
}
