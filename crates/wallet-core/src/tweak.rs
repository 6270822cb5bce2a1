//! BIP-341 `TapTweak` for key-path-only outputs (no script tree).
//!
//! `t = H_TapTweak(P)`, output key `Q = P + t·G` where `P` is the even-y
//! lift of the internal key, and tweaked secret `d' = ±d + t`.

use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::{Field, PrimeField};
use k256::{AffinePoint, FieldBytes, ProjectivePoint, PublicKey, Scalar, SecretKey};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::WalletError;

const TAP_TWEAK_TAG: &str = "TapTweak";

/// BIP-340 tagged hash: `SHA256(SHA256(tag) || SHA256(tag) || msg)`.
pub fn tagged_hash(tag: &str, msg: &[u8]) -> [u8; 32] {
    let tag_hash = Sha256::digest(tag.as_bytes());
    let mut hasher = Sha256::new();
    hasher.update(&tag_hash);
    hasher.update(&tag_hash);
    hasher.update(msg);
    hasher.finalize().into()
}

/// Result of tweaking a private key.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct TweakedKey {
    /// `d'`, the secret for the output key.
    pub private_key: [u8; 32],
    /// x coordinate of `Q`.
    pub output_key: [u8; 32],
    /// Whether `Q` has an odd y coordinate.
    pub output_parity_odd: bool,
}

/// The tweak scalar for an x-only internal key.
///
/// Fails if the hash is not below the curve order.
fn tap_tweak_scalar(internal_key: &[u8; 32]) -> Result<Scalar, WalletError> {
    let hash = tagged_hash(TAP_TWEAK_TAG, internal_key);
    Option::<Scalar>::from(Scalar::from_repr(FieldBytes::from(hash)))
        .ok_or_else(|| WalletError::DerivationFailed("tap tweak exceeds curve order".into()))
}

/// Compressed SEC1 encoding: (is_odd_y, x).
fn split_point(point: &AffinePoint) -> (bool, [u8; 32]) {
    let encoded = point.to_encoded_point(true);
    let bytes = encoded.as_bytes();
    let mut x = [0u8; 32];
    x.copy_from_slice(&bytes[1..33]);
    (bytes[0] == 0x03, x)
}

/// Tweak a BIP-32 private key for a key-path-only Taproot output.
pub fn tweak_private_key(private_key: &[u8; 32]) -> Result<TweakedKey, WalletError> {
    let secret = SecretKey::from_slice(private_key)
        .map_err(|e| WalletError::InvalidPrivateKey(e.to_string()))?;
    let d = *secret.to_nonzero_scalar();

    let (odd_y, internal_key) = split_point(&(ProjectivePoint::GENERATOR * d).to_affine());
    // BIP-340 keys are x-only; use the secret whose point has even y.
    let d_even = if odd_y { -d } else { d };

    let tweaked = d_even + tap_tweak_scalar(&internal_key)?;
    if bool::from(tweaked.is_zero()) {
        return Err(WalletError::DerivationFailed("tweaked key is zero".into()));
    }

    let (output_parity_odd, output_key) =
        split_point(&(ProjectivePoint::GENERATOR * tweaked).to_affine());

    let mut private_key = [0u8; 32];
    private_key.copy_from_slice(&tweaked.to_bytes());
    Ok(TweakedKey {
        private_key,
        output_key,
        output_parity_odd,
    })
}

/// Compute the output key `x(Q)` for an x-only internal key.
pub fn tweak_public_key(internal_key: &[u8; 32]) -> Result<[u8; 32], WalletError> {
    let mut sec1 = [0u8; 33];
    sec1[0] = 0x02;
    sec1[1..].copy_from_slice(internal_key);
    let p = PublicKey::from_sec1_bytes(&sec1)
        .map_err(|_| WalletError::EncodingFailed("internal key is not on the curve".into()))?;

    let q = p.to_projective() + ProjectivePoint::GENERATOR * tap_tweak_scalar(internal_key)?;
    if q == ProjectivePoint::IDENTITY {
        return Err(WalletError::DerivationFailed("tweaked point is infinity".into()));
    }
    Ok(split_point(&q.to_affine()).1)
}
