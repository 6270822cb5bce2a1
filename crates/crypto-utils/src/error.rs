use thiserror::Error;

/// Entropy and secret-handling errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("unsupported mnemonic word count: {0} (expected 12 or 24)")]
    UnsupportedWordCount(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unsupported_word_count() {
        let err = CryptoError::UnsupportedWordCount(15);
        assert_eq!(
            err.to_string(),
            "unsupported mnemonic word count: 15 (expected 12 or 24)"
        );
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(CryptoError::UnsupportedWordCount(3));
        assert!(err.to_string().contains("3"));
    }
}
