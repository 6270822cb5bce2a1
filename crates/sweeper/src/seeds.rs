use std::path::Path;

use crypto_utils::SecretString;
use tracing::info;

use crate::error::SweepError;

/// Load one mnemonic per line. Lines are trimmed and blank lines skipped.
///
/// Phrases are not validated here; each orchestrator checks its seeds
/// individually so one bad line does not stop a run.
pub fn read_seeds(path: &Path) -> Result<Vec<SecretString>, SweepError> {
    if !path.exists() {
        return Err(SweepError::Seeds {
            path: path.to_path_buf(),
            reason: "file not found".into(),
        });
    }

    let content = SecretString::new(std::fs::read_to_string(path).map_err(|e| SweepError::Seeds {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?);

    let seeds = parse_seeds(&content);
    if seeds.is_empty() {
        return Err(SweepError::Seeds {
            path: path.to_path_buf(),
            reason: "file contains no seed phrases".into(),
        });
    }

    info!(path = %path.display(), count = seeds.len(), "seed phrases loaded");
    Ok(seeds)
}

fn parse_seeds(content: &str) -> Vec<SecretString> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| SecretString::new(line.to_string()))
        .collect()
}

/// First words of a phrase for status lines; never the whole seed.
pub fn preview(phrase: &str) -> String {
    let words: Vec<&str> = phrase.split_whitespace().take(3).collect();
    format!("{} ...", words.join(" "))
}
