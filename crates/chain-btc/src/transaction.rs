use bitcoin::absolute::LockTime;
use bitcoin::script::ScriptBuf;
use bitcoin::transaction::Version;
use bitcoin::{Address, Amount, OutPoint, Sequence, Transaction, TxIn, TxOut, Txid, Witness};

use crate::address::validate_destination;
use crate::error::BtcError;
use crate::network::BtcNetwork;
use crate::utxo::{select_for_sweep, Utxo, MAX_SWEEP_INPUTS};

/// Estimated bytes contributed by each key-path P2TR input.
pub const INPUT_BYTES: u64 = 58;

/// Estimated bytes of the single P2TR output.
pub const OUTPUT_BYTES: u64 = 43;

/// Fixed overhead: version, locktime, marker/flag and counts.
pub const TX_OVERHEAD_BYTES: u64 = 10;

/// Outputs at or below this value are dust and will not relay.
pub const DUST_THRESHOLD_SAT: u64 = 546;

/// Estimated size of a one-output sweep spending `num_inputs` P2TR inputs.
///
/// A real key-path input is about 57.5 vbytes, so this never underpays.
pub fn estimate_sweep_size(num_inputs: usize) -> u64 {
    num_inputs as u64 * INPUT_BYTES + OUTPUT_BYTES + TX_OVERHEAD_BYTES
}

/// Fee for a sweep of `num_inputs` inputs at `fee_rate` sat/byte.
pub fn estimate_fee(num_inputs: usize, fee_rate: u64) -> u64 {
    estimate_sweep_size(num_inputs).saturating_mul(fee_rate)
}

/// Book-keeping for a built sweep, used for logs and reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSummary {
    pub input_count: usize,
    /// UTXOs that were offered to the builder.
    pub available_count: usize,
    pub total_input_sat: u64,
    pub estimated_size: u64,
    pub fee_rate: u64,
    pub fee_sat: u64,
    pub output_sat: u64,
    /// UTXOs not spent because of the input cap.
    pub left_behind: usize,
    pub left_behind_sat: u64,
}

impl DraftSummary {
    /// True when the input cap left spendable outputs behind.
    pub fn is_partial(&self) -> bool {
        self.left_behind > 0
    }
}

/// An unsigned sweep transaction ready for signing.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    /// The transaction with empty witnesses.
    pub tx: Transaction,
    /// The outputs being spent, in input order. Every Taproot sighash
    /// commits to all of them.
    pub prevouts: Vec<TxOut>,
    pub summary: DraftSummary,
}

/// Build a one-output sweep of `utxos` to `destination`.
///
/// Takes at most [`MAX_SWEEP_INPUTS`] inputs, largest first, and sends
/// everything minus the fee to the destination. Fails with
/// [`BtcError::InsufficientFunds`] when the remainder would not exceed the
/// dust threshold.
pub fn build_sweep_transaction(
    utxos: &[Utxo],
    destination: &str,
    fee_rate: u64,
    network: BtcNetwork,
) -> Result<TransactionDraft, BtcError> {
    if fee_rate == 0 {
        return Err(BtcError::TransactionBuildError(
            "fee rate must be at least 1 sat/byte".into(),
        ));
    }
    let destination: Address = validate_destination(destination, network)?;
    let selection = select_for_sweep(utxos, MAX_SWEEP_INPUTS)?;

    let estimated_size = estimate_sweep_size(selection.selected.len());
    let fee_sat = estimate_fee(selection.selected.len(), fee_rate);
    let remaining_sat = selection.total_sat.saturating_sub(fee_sat);
    if fee_sat >= selection.total_sat || remaining_sat <= DUST_THRESHOLD_SAT {
        return Err(BtcError::InsufficientFunds {
            total_sat: selection.total_sat,
            fee_sat,
            remaining_sat,
        });
    }

    let mut inputs = Vec::with_capacity(selection.selected.len());
    let mut prevouts = Vec::with_capacity(selection.selected.len());

    for utxo in &selection.selected {
        let txid: Txid = utxo
            .txid
            .parse()
            .map_err(|e| BtcError::TransactionBuildError(format!("invalid txid: {e}")))?;

        inputs.push(TxIn {
            previous_output: OutPoint::new(txid, utxo.vout),
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::default(),
        });

        prevouts.push(TxOut {
            value: Amount::from_sat(utxo.amount_sat),
            script_pubkey: ScriptBuf::from(utxo.script_pubkey.clone()),
        });
    }

    let tx = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: inputs,
        output: vec![TxOut {
            value: Amount::from_sat(remaining_sat),
            script_pubkey: destination.script_pubkey(),
        }],
    };

    Ok(TransactionDraft {
        tx,
        prevouts,
        summary: DraftSummary {
            input_count: selection.selected.len(),
            available_count: utxos.len(),
            total_input_sat: selection.total_sat,
            estimated_size,
            fee_rate,
            fee_sat,
            output_sat: remaining_sat,
            left_behind: selection.left_behind,
            left_behind_sat: selection.left_behind_sat,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEST: &str = "bc1p5cyxnuxmeuwuvkwfem96lqzszd02n6xdcjrs20cac6yqjjwudpxqkedrcr";

    fn make_test_utxo(vout: u32, amount_sat: u64) -> Utxo {
        Utxo {
            txid: "ab".repeat(32),
            vout,
            amount_sat,
            script_pubkey: hex::decode(format!("5120{}", "44".repeat(32))).unwrap(),
        }
    }

    #[test]
    fn size_estimate_single_input() {
        assert_eq!(estimate_sweep_size(1), 111);
        assert_eq!(estimate_sweep_size(5), 343);
    }

    #[test]
    fn fee_scales_with_inputs() {
        let fee_1 = estimate_fee(1, 10);
        let fee_2 = estimate_fee(2, 10);
        assert_eq!(fee_2 - fee_1, INPUT_BYTES * 10);
    }

    #[test]
    fn single_input_sweep_amounts() {
        let draft =
            build_sweep_transaction(&[make_test_utxo(0, 100_000)], DEST, 10, BtcNetwork::Mainnet)
                .unwrap();

        assert_eq!(draft.summary.estimated_size, 111);
        assert_eq!(draft.summary.fee_sat, 1_110);
        assert_eq!(draft.summary.output_sat, 98_890);
        assert_eq!(draft.tx.output.len(), 1);
        assert_eq!(draft.tx.output[0].value.to_sat(), 98_890);
        assert!(!draft.summary.is_partial());
    }

    #[test]
    fn outputs_plus_fee_equal_inputs() {
        let utxos = vec![
            make_test_utxo(0, 12_345),
            make_test_utxo(1, 67_890),
            make_test_utxo(2, 5_000),
        ];
        let draft = build_sweep_transaction(&utxos, DEST, 3, BtcNetwork::Mainnet).unwrap();

        let out: u64 = draft.tx.output.iter().map(|o| o.value.to_sat()).sum();
        let inp: u64 = draft.prevouts.iter().map(|p| p.value.to_sat()).sum();
        assert_eq!(out + draft.summary.fee_sat, inp);
        assert_eq!(draft.summary.fee_sat, estimate_sweep_size(3) * 3);
    }

    #[test]
    fn transaction_shape() {
        let draft =
            build_sweep_transaction(&[make_test_utxo(7, 50_000)], DEST, 1, BtcNetwork::Mainnet)
                .unwrap();

        assert_eq!(draft.tx.version, Version::TWO);
        assert_eq!(draft.tx.lock_time, LockTime::ZERO);
        assert_eq!(draft.tx.input[0].sequence, Sequence::MAX);
        assert_eq!(draft.tx.input[0].previous_output.vout, 7);
        assert!(draft.tx.input[0].witness.is_empty());
        assert_eq!(
            hex::encode(draft.tx.output[0].script_pubkey.as_bytes()),
            "5120a60869f0dbcf1dc659c9cecbaf8050135ea9e8cdc487053f1dc6880949dc684c"
        );
    }

    #[test]
    fn small_balance_is_insufficient() {
        let result =
            build_sweep_transaction(&[make_test_utxo(0, 500)], DEST, 1, BtcNetwork::Mainnet);
        assert!(matches!(result, Err(BtcError::InsufficientFunds { .. })));
    }

    #[test]
    fn remainder_at_dust_threshold_is_insufficient() {
        // 111 bytes at 1 sat/byte leaves exactly 546.
        let result =
            build_sweep_transaction(&[make_test_utxo(0, 657)], DEST, 1, BtcNetwork::Mainnet);
        assert!(matches!(
            result,
            Err(BtcError::InsufficientFunds { remaining_sat: 546, .. })
        ));

        let ok = build_sweep_transaction(&[make_test_utxo(0, 658)], DEST, 1, BtcNetwork::Mainnet)
            .unwrap();
        assert_eq!(ok.summary.output_sat, 547);
    }

    #[test]
    fn fee_above_total_is_insufficient() {
        let result =
            build_sweep_transaction(&[make_test_utxo(0, 1_000)], DEST, 50, BtcNetwork::Mainnet);
        assert!(matches!(
            result,
            Err(BtcError::InsufficientFunds { remaining_sat: 0, .. })
        ));
    }

    #[test]
    fn empty_utxos_is_no_funds() {
        let result = build_sweep_transaction(&[], DEST, 1, BtcNetwork::Mainnet);
        assert!(matches!(result, Err(BtcError::NoFunds)));
    }

    #[test]
    fn zero_fee_rate_rejected() {
        let result =
            build_sweep_transaction(&[make_test_utxo(0, 100_000)], DEST, 0, BtcNetwork::Mainnet);
        assert!(matches!(result, Err(BtcError::TransactionBuildError(_))));
    }

    #[test]
    fn invalid_destination_rejected() {
        let result = build_sweep_transaction(
            &[make_test_utxo(0, 100_000)],
            "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4",
            1,
            BtcNetwork::Mainnet,
        );
        assert!(matches!(result, Err(BtcError::InvalidAddress(_))));
    }

    #[test]
    fn caps_inputs_and_reports_left_behind() {
        let utxos: Vec<Utxo> = (0..8).map(|i| make_test_utxo(i, 10_000 + u64::from(i))).collect();
        let draft = build_sweep_transaction(&utxos, DEST, 2, BtcNetwork::Mainnet).unwrap();

        assert_eq!(draft.tx.input.len(), MAX_SWEEP_INPUTS);
        assert_eq!(draft.summary.available_count, 8);
        assert_eq!(draft.summary.left_behind, 3);
        assert_eq!(draft.summary.left_behind_sat, 10_000 + 10_001 + 10_002);
        assert!(draft.summary.is_partial());
        // Largest first.
        assert_eq!(draft.tx.input[0].previous_output.vout, 7);
    }

    #[test]
    fn malformed_txid_rejected() {
        let mut utxo = make_test_utxo(0, 100_000);
        utxo.txid = "zz".into();
        let result = build_sweep_transaction(&[utxo], DEST, 1, BtcNetwork::Mainnet);
        assert!(matches!(result, Err(BtcError::TransactionBuildError(_))));
    }
}
