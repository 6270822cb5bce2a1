use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::LedgerError;
use crate::http::{check_status, join_url};
use crate::models::{ceil_rate, AddressBalance, FeeEstimates, LedgerUtxo};
use crate::service::LedgerService;

pub const BLOCKCYPHER_MAINNET: &str = "https://api.blockcypher.com/v1/btc/main";

/// Adapter for the BlockCypher v1 API.
pub struct BlockCypherService {
    client: Client,
    base_url: String,
}

impl BlockCypherService {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn get_text(&self, path: &str) -> Result<String, LedgerError> {
        let url = join_url(&self.base_url, path);
        debug!(service = "blockcypher", %url, "GET");
        let resp = check_status(self.client.get(&url).send().await?).await?;
        Ok(resp.text().await?)
    }
}

#[derive(Debug, Deserialize)]
struct Balance {
    balance: i64,
    n_tx: u64,
    total_received: u64,
    total_sent: u64,
}

#[derive(Debug, Deserialize)]
struct TxRef {
    tx_hash: String,
    tx_output_n: u32,
    value: u64,
    #[serde(default)]
    confirmations: u64,
}

#[derive(Debug, Deserialize)]
struct UnspentAddress {
    #[serde(default)]
    txrefs: Vec<TxRef>,
    #[serde(default)]
    unconfirmed_txrefs: Vec<TxRef>,
}

#[derive(Debug, Deserialize)]
struct ChainInfo {
    low_fee_per_kb: f64,
    medium_fee_per_kb: f64,
    high_fee_per_kb: f64,
}

#[derive(Debug, Deserialize)]
struct PushedTx {
    hash: String,
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    tx: PushedTx,
}

pub(crate) fn parse_balance(body: &str) -> Result<AddressBalance, LedgerError> {
    let b: Balance = serde_json::from_str(body)?;
    Ok(AddressBalance {
        balance_sat: u64::try_from(b.balance).unwrap_or(0),
        tx_count: b.n_tx,
        total_received_sat: b.total_received,
        total_sent_sat: b.total_sent,
    })
}

pub(crate) fn parse_utxos(body: &str) -> Result<Vec<LedgerUtxo>, LedgerError> {
    let addr: UnspentAddress = serde_json::from_str(body)?;
    let confirmed = addr.txrefs.into_iter().map(|r| LedgerUtxo {
        confirmed: r.confirmations > 0,
        txid: r.tx_hash,
        vout: r.tx_output_n,
        value_sat: r.value,
    });
    let pending = addr.unconfirmed_txrefs.into_iter().map(|r| LedgerUtxo {
        txid: r.tx_hash,
        vout: r.tx_output_n,
        value_sat: r.value,
        confirmed: false,
    });
    Ok(confirmed.chain(pending).collect())
}

/// Per-kilobyte rates converted to sat/byte. BlockCypher has no
/// next-block tier, so `fastest` doubles the high rate.
pub(crate) fn parse_fee_estimates(body: &str) -> Result<FeeEstimates, LedgerError> {
    let info: ChainInfo = serde_json::from_str(body)?;
    let high = ceil_rate(info.high_fee_per_kb / 1000.0);
    Ok(FeeEstimates {
        slow: ceil_rate(info.low_fee_per_kb / 1000.0),
        normal: ceil_rate(info.medium_fee_per_kb / 1000.0),
        fast: high,
        fastest: high.saturating_mul(2),
    })
}

pub(crate) fn parse_broadcast(body: &str) -> Result<String, LedgerError> {
    let pushed: PushResponse = serde_json::from_str(body)?;
    Ok(pushed.tx.hash)
}

#[async_trait]
impl LedgerService for BlockCypherService {
    fn name(&self) -> &str {
        "blockcypher"
    }

    async fn address_balance(&self, address: &str) -> Result<AddressBalance, LedgerError> {
        parse_balance(&self.get_text(&format!("addrs/{address}/balance")).await?)
    }

    async fn address_utxos(&self, address: &str) -> Result<Vec<LedgerUtxo>, LedgerError> {
        parse_utxos(&self.get_text(&format!("addrs/{address}?unspentOnly=true")).await?)
    }

    async fn broadcast(&self, raw_tx_hex: &str) -> Result<String, LedgerError> {
        let url = join_url(&self.base_url, "txs/push");
        debug!(service = "blockcypher", %url, bytes = raw_tx_hex.len() / 2, "POST");
        let resp = self
            .client
            .post(&url)
            .json(&json!({ "tx": raw_tx_hex }))
            .send()
            .await?;
        let resp = check_status(resp).await?;
        parse_broadcast(&resp.text().await?)
    }

    async fn fee_estimates(&self) -> Result<FeeEstimates, LedgerError> {
        parse_fee_estimates(&self.get_text("").await?)
    }
}
