use bitcoin::hashes::Hash;
use bitcoin::key::{Keypair, TapTweak, XOnlyPublicKey};
use bitcoin::secp256k1::{schnorr, All, Message, Secp256k1};
use bitcoin::sighash::{Prevouts, SighashCache, TapSighashType};
use bitcoin::{taproot, Transaction, Witness};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::BtcError;
use crate::transaction::TransactionDraft;

/// Private material for one key-path Taproot output.
///
/// Holds both the untweaked BIP-32 scalar and the scalar already tweaked
/// with `TapTweak`, so signing can fall back to the raw tweaked key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct TaprootSigningKey {
    internal_private_key: [u8; 32],
    tweaked_private_key: [u8; 32],
}

impl TaprootSigningKey {
    pub fn new(internal_private_key: [u8; 32], tweaked_private_key: [u8; 32]) -> Self {
        Self {
            internal_private_key,
            tweaked_private_key,
        }
    }
}

impl std::fmt::Debug for TaprootSigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TaprootSigningKey(<redacted>)")
    }
}

/// A fully signed transaction ready for broadcast.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub tx: Transaction,
    /// Consensus serialization, lowercase hex.
    pub raw_hex: String,
    pub txid: String,
    pub vsize: usize,
    /// Inputs that needed the raw tweaked key instead of the tweaked keypair.
    pub fallback_inputs: usize,
}

/// Sign every input of `draft` with a single key.
pub fn sign_sweep(
    draft: &TransactionDraft,
    key: &TaprootSigningKey,
) -> Result<SignedTransaction, BtcError> {
    sign_transaction(draft, std::slice::from_ref(key))
}

/// Sign every input of `draft` with BIP-340 key-path signatures.
///
/// For each input the keys are tried in order until one matches the output
/// key locked in the prevout. Every signature is verified before it is
/// attached. Either all inputs end up signed or an error is returned and
/// the draft is left untouched.
pub fn sign_transaction(
    draft: &TransactionDraft,
    keys: &[TaprootSigningKey],
) -> Result<SignedTransaction, BtcError> {
    if draft.prevouts.len() != draft.tx.input.len() {
        return Err(BtcError::SigningError(format!(
            "{} prevouts for {} inputs",
            draft.prevouts.len(),
            draft.tx.input.len()
        )));
    }
    if keys.is_empty() {
        return Err(BtcError::SigningError("no signing keys supplied".into()));
    }

    let secp = Secp256k1::new();
    let mut sighash_cache = SighashCache::new(&draft.tx);
    let mut witnesses = Vec::with_capacity(draft.tx.input.len());
    let mut fallback_inputs = 0;

    for (input_index, prevout) in draft.prevouts.iter().enumerate() {
        let output_key = p2tr_output_key(prevout.script_pubkey.as_bytes()).ok_or_else(|| {
            BtcError::SigningError(format!("input {input_index} does not spend a P2TR output"))
        })?;

        let sighash = sighash_cache
            .taproot_key_spend_signature_hash(
                input_index,
                &Prevouts::All(draft.prevouts.as_slice()),
                TapSighashType::Default,
            )
            .map_err(|e| BtcError::SigningError(format!("sighash computation failed: {e}")))?;
        let msg = Message::from_digest(sighash.to_byte_array());

        let (signature, used_fallback) = keys
            .iter()
            .find_map(|key| sign_input(&secp, &msg, &output_key, key))
            .ok_or_else(|| {
                BtcError::SigningError(format!(
                    "no key produced a valid signature for input {input_index}"
                ))
            })?;
        if used_fallback {
            fallback_inputs += 1;
        }

        witnesses.push(Witness::p2tr_key_spend(&taproot::Signature {
            signature,
            sighash_type: TapSighashType::Default,
        }));
    }

    let mut tx = draft.tx.clone();
    for (input, witness) in tx.input.iter_mut().zip(witnesses) {
        input.witness = witness;
    }

    Ok(SignedTransaction {
        raw_hex: bitcoin::consensus::encode::serialize_hex(&tx),
        txid: tx.compute_txid().to_string(),
        vsize: tx.vsize(),
        fallback_inputs,
        tx,
    })
}

/// Try the tweaked keypair first, then the raw tweaked scalar.
/// Returns the signature and whether the fallback was needed.
fn sign_input(
    secp: &Secp256k1<All>,
    msg: &Message,
    output_key: &XOnlyPublicKey,
    key: &TaprootSigningKey,
) -> Option<(schnorr::Signature, bool)> {
    let primary = Keypair::from_seckey_slice(secp, &key.internal_private_key)
        .ok()
        .map(|kp| kp.tap_tweak(secp, None).to_inner())
        .and_then(|kp| sign_and_verify(secp, msg, output_key, &kp));
    if let Some(sig) = primary {
        return Some((sig, false));
    }

    Keypair::from_seckey_slice(secp, &key.tweaked_private_key)
        .ok()
        .and_then(|kp| sign_and_verify(secp, msg, output_key, &kp))
        .map(|sig| (sig, true))
}

fn sign_and_verify(
    secp: &Secp256k1<All>,
    msg: &Message,
    output_key: &XOnlyPublicKey,
    keypair: &Keypair,
) -> Option<schnorr::Signature> {
    if keypair.x_only_public_key().0 != *output_key {
        return None;
    }
    let sig = secp.sign_schnorr_no_aux_rand(msg, keypair);
    secp.verify_schnorr(&sig, msg, output_key).ok().map(|()| sig)
}

/// Extract the output key from an `OP_1 <32 bytes>` script.
fn p2tr_output_key(script: &[u8]) -> Option<XOnlyPublicKey> {
    match script {
        [0x51, 0x20, key @ ..] if key.len() == 32 => XOnlyPublicKey::from_slice(key).ok(),
        _ => None,
    }
}
