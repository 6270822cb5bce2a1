use bip39::{Language, Mnemonic};
use crypto_utils::random::{fresh_entropy, EntropyStrength};
use crypto_utils::SecretString;
use zeroize::Zeroizing;

use crate::error::WalletError;

/// Generate a new English BIP-39 mnemonic of 12 or 24 words.
pub fn generate_mnemonic(word_count: usize) -> Result<SecretString, WalletError> {
    let strength = EntropyStrength::from_word_count(word_count)?;
    let entropy = fresh_entropy(strength);
    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
    Ok(SecretString::new(mnemonic.to_string()))
}

/// Generate `count` independent mnemonics.
pub fn generate_mnemonics(
    count: usize,
    word_count: usize,
) -> Result<Vec<SecretString>, WalletError> {
    (0..count).map(|_| generate_mnemonic(word_count)).collect()
}

/// Validate a mnemonic phrase
pub fn validate_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse_in_normalized(Language::English, phrase).is_ok()
}

/// Derive the 64-byte BIP-39 seed from mnemonic + passphrase.
///
/// The seed is wiped when the returned value is dropped.
pub fn mnemonic_to_seed(
    phrase: &str,
    passphrase: &str,
) -> Result<Zeroizing<[u8; 64]>, WalletError> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;

    Ok(Zeroizing::new(mnemonic.to_seed(passphrase)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABANDON: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon \
         about";

    #[test]
    fn test_generate_mnemonic_12_words() {
        let mnemonic = generate_mnemonic(12).unwrap();
        assert_eq!(mnemonic.word_count(), 12);
        assert!(validate_mnemonic(&mnemonic));
    }

    #[test]
    fn test_generate_mnemonic_24_words() {
        let mnemonic = generate_mnemonic(24).unwrap();
        assert_eq!(mnemonic.word_count(), 24);
        assert!(validate_mnemonic(&mnemonic));
    }

    #[test]
    fn test_generate_rejects_other_lengths() {
        assert!(matches!(generate_mnemonic(18), Err(WalletError::Crypto(_))));
    }

    #[test]
    fn test_generated_mnemonics_differ() {
        let batch = generate_mnemonics(3, 12).unwrap();
        assert_eq!(batch.len(), 3);
        assert_ne!(batch[0].as_str(), batch[1].as_str());
        assert_ne!(batch[1].as_str(), batch[2].as_str());
    }

    #[test]
    fn test_validate_invalid_mnemonic() {
        assert!(!validate_mnemonic("invalid mnemonic phrase here"));
        // Valid words, bad checksum.
        assert!(!validate_mnemonic(
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon \
             abandon abandon"
        ));
    }

    #[test]
    fn test_invalid_mnemonic_has_no_seed() {
        assert!(matches!(
            mnemonic_to_seed("not a seed", ""),
            Err(WalletError::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_bip39_test_vector() {
        // Official BIP-39 test vector (12 words, no passphrase)
        let seed = mnemonic_to_seed(ABANDON, "").unwrap();
        assert_eq!(
            hex::encode(seed.as_slice()),
            "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc1\
             9a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4"
        );
    }

    #[test]
    fn test_passphrase_changes_seed() {
        let seed_no_pass = mnemonic_to_seed(ABANDON, "").unwrap();
        let seed_with_pass = mnemonic_to_seed(ABANDON, "mypassphrase").unwrap();
        assert_ne!(seed_no_pass.as_slice(), seed_with_pass.as_slice());
    }
}
