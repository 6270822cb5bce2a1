use crate::error::BtcError;

/// Most inputs a single sweep transaction will spend.
pub const MAX_SWEEP_INPUTS: usize = 5;

/// A single unspent transaction output (UTXO).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    /// Transaction ID as a hex string (big-endian / display order).
    pub txid: String,
    /// Output index within the transaction.
    pub vout: u32,
    /// Value in satoshis.
    pub amount_sat: u64,
    /// The locking script (scriptPubKey) serialized bytes.
    pub script_pubkey: Vec<u8>,
}

/// Result of sweep selection.
#[derive(Debug, Clone)]
pub struct UtxoSelection {
    /// Chosen UTXOs, largest first.
    pub selected: Vec<Utxo>,
    /// Total value of the selected UTXOs in satoshis.
    pub total_sat: u64,
    /// UTXOs that did not fit under the input cap.
    pub left_behind: usize,
    /// Value held by the UTXOs that were left behind.
    pub left_behind_sat: u64,
}

/// Pick the `max_inputs` largest UTXOs for a sweep.
///
/// Ties keep their original order. Anything past the cap is reported
/// through `left_behind` / `left_behind_sat` rather than dropped silently.
pub fn select_for_sweep(utxos: &[Utxo], max_inputs: usize) -> Result<UtxoSelection, BtcError> {
    if utxos.is_empty() || max_inputs == 0 {
        return Err(BtcError::NoFunds);
    }

    // Sort by value descending (largest first).
    let mut sorted: Vec<&Utxo> = utxos.iter().collect();
    sorted.sort_by(|a, b| b.amount_sat.cmp(&a.amount_sat));

    let take = sorted.len().min(max_inputs);
    let selected: Vec<Utxo> = sorted[..take].iter().map(|u| (*u).clone()).collect();
    let total_sat = selected.iter().map(|u| u.amount_sat).sum();
    let left_behind_sat = sorted[take..].iter().map(|u| u.amount_sat).sum();

    Ok(UtxoSelection {
        selected,
        total_sat,
        left_behind: sorted.len() - take,
        left_behind_sat,
    })
}
