use rand::RngCore;
use rand_core::OsRng;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Entropy sizes accepted for BIP-39 mnemonic generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntropyStrength {
    /// 128 bits, encoded as 12 words.
    Bits128,
    /// 256 bits, encoded as 24 words.
    Bits256,
}

impl EntropyStrength {
    /// Map a mnemonic word count (12 or 24) to its entropy size.
    pub fn from_word_count(words: usize) -> Result<Self, CryptoError> {
        match words {
            12 => Ok(EntropyStrength::Bits128),
            24 => Ok(EntropyStrength::Bits256),
            other => Err(CryptoError::UnsupportedWordCount(other)),
        }
    }

    pub fn byte_len(self) -> usize {
        match self {
            EntropyStrength::Bits128 => 16,
            EntropyStrength::Bits256 => 32,
        }
    }

    pub fn word_count(self) -> usize {
        match self {
            EntropyStrength::Bits128 => 12,
            EntropyStrength::Bits256 => 24,
        }
    }
}

/// Draw fresh entropy from the operating system RNG.
///
/// The buffer is wiped when the returned value is dropped.
pub fn fresh_entropy(strength: EntropyStrength) -> Zeroizing<Vec<u8>> {
    let mut buf = Zeroizing::new(vec![0u8; strength.byte_len()]);
    OsRng.fill_bytes(&mut buf);
    buf
}
