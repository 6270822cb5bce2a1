use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::LedgerError;
use crate::http::{check_status, join_url};
use crate::models::{ceil_rate, AddressBalance, FeeEstimates, LedgerUtxo};
use crate::service::LedgerService;

pub const BLOCKSTREAM_MAINNET: &str = "https://blockstream.info/api";

/// Adapter for the Esplora REST API (Blockstream, mempool.space, self-hosted).
pub struct EsploraService {
    client: Client,
    base_url: String,
}

impl EsploraService {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn get_text(&self, path: &str) -> Result<String, LedgerError> {
        let url = join_url(&self.base_url, path);
        debug!(service = "esplora", %url, "GET");
        let resp = check_status(self.client.get(&url).send().await?).await?;
        Ok(resp.text().await?)
    }
}

#[derive(Debug, Deserialize)]
struct AddressStats {
    funded_txo_sum: u64,
    spent_txo_sum: u64,
    tx_count: u64,
}

#[derive(Debug, Deserialize)]
struct AddressInfo {
    chain_stats: AddressStats,
}

#[derive(Debug, Deserialize)]
struct UtxoStatus {
    confirmed: bool,
}

#[derive(Debug, Deserialize)]
struct Utxo {
    txid: String,
    vout: u32,
    value: u64,
    status: UtxoStatus,
}

pub(crate) fn parse_balance(body: &str) -> Result<AddressBalance, LedgerError> {
    let info: AddressInfo = serde_json::from_str(body)?;
    let stats = info.chain_stats;
    Ok(AddressBalance {
        balance_sat: stats.funded_txo_sum.saturating_sub(stats.spent_txo_sum),
        tx_count: stats.tx_count,
        total_received_sat: stats.funded_txo_sum,
        total_sent_sat: stats.spent_txo_sum,
    })
}

pub(crate) fn parse_utxos(body: &str) -> Result<Vec<LedgerUtxo>, LedgerError> {
    let utxos: Vec<Utxo> = serde_json::from_str(body)?;
    Ok(utxos
        .into_iter()
        .map(|u| LedgerUtxo {
            txid: u.txid,
            vout: u.vout,
            value_sat: u.value,
            confirmed: u.status.confirmed,
        })
        .collect())
}

/// Map confirmation targets 144/6/3/1 to slow/normal/fast/fastest.
pub(crate) fn parse_fee_estimates(body: &str) -> Result<FeeEstimates, LedgerError> {
    let targets: HashMap<String, f64> = serde_json::from_str(body)?;
    let rate = |target: &str| {
        targets
            .get(target)
            .copied()
            .map(ceil_rate)
            .ok_or_else(|| LedgerError::Decode(format!("no estimate for {target}-block target")))
    };
    Ok(FeeEstimates {
        slow: rate("144")?,
        normal: rate("6")?,
        fast: rate("3")?,
        fastest: rate("1")?,
    })
}

/// The body of a successful broadcast is the bare txid.
pub(crate) fn parse_broadcast(body: &str) -> Result<String, LedgerError> {
    let txid = body.trim();
    if txid.len() == 64 && txid.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(txid.to_string())
    } else {
        Err(LedgerError::Decode(format!("unexpected broadcast response: {txid}")))
    }
}

#[async_trait]
impl LedgerService for EsploraService {
    fn name(&self) -> &str {
        "esplora"
    }

    async fn address_balance(&self, address: &str) -> Result<AddressBalance, LedgerError> {
        parse_balance(&self.get_text(&format!("address/{address}")).await?)
    }

    async fn address_utxos(&self, address: &str) -> Result<Vec<LedgerUtxo>, LedgerError> {
        parse_utxos(&self.get_text(&format!("address/{address}/utxo")).await?)
    }

    async fn broadcast(&self, raw_tx_hex: &str) -> Result<String, LedgerError> {
        let url = join_url(&self.base_url, "tx");
        debug!(service = "esplora", %url, bytes = raw_tx_hex.len() / 2, "POST");
        let resp = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(raw_tx_hex.to_string())
            .send()
            .await?;
        let resp = check_status(resp).await?;
        parse_broadcast(&resp.text().await?)
    }

    async fn fee_estimates(&self) -> Result<FeeEstimates, LedgerError> {
        parse_fee_estimates(&self.get_text("fee-estimates").await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_address_stats() {
        let body = r#"{
            "address": "bc1p5cyxnuxmeuwuvkwfem96lqzszd02n6xdcjrs20cac6yqjjwudpxqkedrcr",
            "chain_stats": {"funded_txo_count": 3, "funded_txo_sum": 150000,
                            "spent_txo_count": 1, "spent_txo_sum": 50000, "tx_count": 4},
            "mempool_stats": {"funded_txo_count": 1, "funded_txo_sum": 999,
                              "spent_txo_count": 0, "spent_txo_sum": 0, "tx_count": 1}
        }"#;
        let balance = parse_balance(body).unwrap();
        assert_eq!(balance.balance_sat, 100_000);
        assert_eq!(balance.tx_count, 4);
        assert_eq!(balance.total_received_sat, 150_000);
        assert_eq!(balance.total_sent_sat, 50_000);
    }

    #[test]
    fn parse_utxo_list() {
        let body = r#"[
            {"txid": "aa00000000000000000000000000000000000000000000000000000000000000",
             "vout": 1, "value": 5000,
             "status": {"confirmed": true, "block_height": 800000}},
            {"txid": "bb00000000000000000000000000000000000000000000000000000000000000",
             "vout": 0, "value": 700, "status": {"confirmed": false}}
        ]"#;
        let utxos = parse_utxos(body).unwrap();
        assert_eq!(utxos.len(), 2);
        assert_eq!(utxos[0].vout, 1);
        assert_eq!(utxos[0].value_sat, 5_000);
        assert!(utxos[0].confirmed);
        assert!(!utxos[1].confirmed);
    }

    #[test]
    fn parse_empty_utxo_list() {
        assert!(parse_utxos("[]").unwrap().is_empty());
    }

    #[test]
    fn parse_fee_targets() {
        let body = r#"{"1": 48.2, "2": 40.1, "3": 30.0, "6": 12.5, "144": 1.02, "1008": 1.0}"#;
        let fees = parse_fee_estimates(body).unwrap();
        assert_eq!(fees.fastest, 49);
        assert_eq!(fees.fast, 30);
        assert_eq!(fees.normal, 13);
        assert_eq!(fees.slow, 2);
    }

    #[test]
    fn missing_fee_target_is_decode_error() {
        assert!(matches!(
            parse_fee_estimates(r#"{"1": 5.0}"#),
            Err(LedgerError::Decode(_))
        ));
    }

    #[test]
    fn broadcast_response_is_txid() {
        let txid = "f".repeat(64);
        assert_eq!(parse_broadcast(&format!("{txid}\n")).unwrap(), txid);
        assert!(parse_broadcast("error: bad-txns").is_err());
    }

    #[test]
    fn garbage_is_decode_error() {
        assert!(matches!(parse_balance("<html>"), Err(LedgerError::Decode(_))));
    }
}
