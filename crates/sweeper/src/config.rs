//! Run configuration.
//!
//! [`ServiceConfig`] comes from the environment; the per-command configs are
//! built from CLI arguments and checked with `validate()` before any work
//! starts.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chain_btc::network::BtcNetwork;
use ledger_client::blockcypher::BLOCKCYPHER_MAINNET;
use ledger_client::esplora::BLOCKSTREAM_MAINNET;
use ledger_client::FeeEstimates;

use crate::error::SweepError;

pub const DEFAULT_SEEDS_FILE: &str = "seeds.txt";
pub const DEFAULT_GENERATED_FILE: &str = "generated.txt";
pub const DEFAULT_SCAN_ADDRESSES: u32 = 10;
pub const DEFAULT_GENERATE_COUNT: usize = 5;
pub const DEFAULT_WORD_COUNT: usize = 12;

/// Upper bound on addresses derived per seed in one run.
pub const MAX_ADDRESSES_PER_SEED: u32 = 1000;

/// Ledger endpoints and pacing.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub esplora_url: String,
    pub blockcypher_url: String,
    pub http_timeout: Duration,
    /// Minimum gap between address checks during a scan.
    pub scan_interval: Duration,
    /// Minimum gap between drain transactions.
    pub drain_interval: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            esplora_url: BLOCKSTREAM_MAINNET.to_string(),
            blockcypher_url: BLOCKCYPHER_MAINNET.to_string(),
            http_timeout: Duration::from_secs(10),
            scan_interval: Duration::from_millis(1000),
            drain_interval: Duration::from_millis(3000),
        }
    }
}

impl ServiceConfig {
    /// Read `SWEEP_*` variables, falling back to defaults for unset ones.
    pub fn from_env() -> Result<Self, SweepError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, SweepError> {
        let defaults = Self::default();

        let millis = |key: &str, default: Duration| -> Result<Duration, SweepError> {
            match get(key) {
                None => Ok(default),
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|_| {
                        SweepError::Config(format!("{key} must be a whole number of milliseconds"))
                    }),
            }
        };

        let http_timeout = match get("SWEEP_HTTP_TIMEOUT_SECS") {
            None => defaults.http_timeout,
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    SweepError::Config(
                        "SWEEP_HTTP_TIMEOUT_SECS must be a whole number of seconds".into(),
                    )
                })?;
                if secs == 0 {
                    return Err(SweepError::Config(
                        "SWEEP_HTTP_TIMEOUT_SECS must be positive".into(),
                    ));
                }
                Duration::from_secs(secs)
            }
        };

        Ok(Self {
            esplora_url: get("SWEEP_ESPLORA_URL").unwrap_or(defaults.esplora_url),
            blockcypher_url: get("SWEEP_BLOCKCYPHER_URL").unwrap_or(defaults.blockcypher_url),
            http_timeout,
            scan_interval: millis("SWEEP_SCAN_INTERVAL_MS", defaults.scan_interval)?,
            drain_interval: millis("SWEEP_DRAIN_INTERVAL_MS", defaults.drain_interval)?,
        })
    }
}

/// Parameters of a balance scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub seeds_path: PathBuf,
    pub addresses_per_seed: u32,
    /// Keep checking a seed's addresses after the first funded one.
    pub full_scan: bool,
    pub network: BtcNetwork,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            seeds_path: PathBuf::from(DEFAULT_SEEDS_FILE),
            addresses_per_seed: DEFAULT_SCAN_ADDRESSES,
            full_scan: false,
            network: BtcNetwork::Mainnet,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), SweepError> {
        check_address_count(self.addresses_per_seed)
    }
}

/// How the drain picks its fee rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeeRateChoice {
    /// An explicit rate in sat/byte.
    Fixed(u64),
    Slow,
    #[default]
    Normal,
    Fast,
    Fastest,
}

impl FeeRateChoice {
    /// Whether resolving this choice needs fee estimates from the ledger.
    pub fn needs_estimates(&self) -> bool {
        !matches!(self, FeeRateChoice::Fixed(_))
    }

    pub fn resolve(&self, fees: &FeeEstimates) -> u64 {
        match *self {
            FeeRateChoice::Fixed(rate) => rate,
            FeeRateChoice::Slow => fees.slow,
            FeeRateChoice::Normal => fees.normal,
            FeeRateChoice::Fast => fees.fast,
            FeeRateChoice::Fastest => fees.fastest,
        }
    }
}

impl FromStr for FeeRateChoice {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slow" => Ok(FeeRateChoice::Slow),
            "normal" => Ok(FeeRateChoice::Normal),
            "fast" => Ok(FeeRateChoice::Fast),
            "fastest" => Ok(FeeRateChoice::Fastest),
            other => match other.parse::<u64>() {
                Ok(0) => Err(SweepError::Config("fee rate must be at least 1 sat/byte".into())),
                Ok(rate) => Ok(FeeRateChoice::Fixed(rate)),
                Err(_) => Err(SweepError::Config(format!(
                    "fee rate must be a number or one of slow, normal, fast, fastest (got {s:?})"
                ))),
            },
        }
    }
}

impl fmt::Display for FeeRateChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeRateChoice::Fixed(rate) => write!(f, "{rate} sat/byte"),
            FeeRateChoice::Slow => f.write_str("slow"),
            FeeRateChoice::Normal => f.write_str("normal"),
            FeeRateChoice::Fast => f.write_str("fast"),
            FeeRateChoice::Fastest => f.write_str("fastest"),
        }
    }
}

/// Parameters of a drain run.
#[derive(Debug, Clone)]
pub struct DrainConfig {
    pub destination: String,
    pub fee_rate: FeeRateChoice,
    pub seeds_path: PathBuf,
    /// Addresses swept per seed, starting at index 0.
    pub addresses_per_seed: u32,
    pub include_unconfirmed: bool,
    /// Build and sign but never broadcast.
    pub dry_run: bool,
    /// The operator explicitly agreed to move funds.
    pub confirmed: bool,
    pub network: BtcNetwork,
}

impl DrainConfig {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            fee_rate: FeeRateChoice::default(),
            seeds_path: PathBuf::from(DEFAULT_SEEDS_FILE),
            addresses_per_seed: 1,
            include_unconfirmed: false,
            dry_run: false,
            confirmed: false,
            network: BtcNetwork::Mainnet,
        }
    }

    /// Checks the destination first, then the confirmation gate. A dry run
    /// moves nothing and needs no confirmation.
    pub fn validate(&self) -> Result<(), SweepError> {
        chain_btc::address::validate_destination(&self.destination, self.network)?;
        check_address_count(self.addresses_per_seed)?;
        if self.fee_rate == FeeRateChoice::Fixed(0) {
            return Err(SweepError::Config("fee rate must be at least 1 sat/byte".into()));
        }
        if !self.confirmed && !self.dry_run {
            return Err(SweepError::NotConfirmed);
        }
        Ok(())
    }
}

/// Parameters of mnemonic generation.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub count: usize,
    pub word_count: usize,
    pub output_path: PathBuf,
    pub network: BtcNetwork,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_GENERATE_COUNT,
            word_count: DEFAULT_WORD_COUNT,
            output_path: PathBuf::from(DEFAULT_GENERATED_FILE),
            network: BtcNetwork::Mainnet,
        }
    }
}

impl GenerateConfig {
    pub fn validate(&self) -> Result<(), SweepError> {
        if self.count == 0 {
            return Err(SweepError::Config("count must be at least 1".into()));
        }
        if !matches!(self.word_count, 12 | 24) {
            return Err(SweepError::Config(format!(
                "word count must be 12 or 24, got {}",
                self.word_count
            )));
        }
        Ok(())
    }
}

fn check_address_count(n: u32) -> Result<(), SweepError> {
    if n == 0 || n > MAX_ADDRESSES_PER_SEED {
        return Err(SweepError::Config(format!(
            "addresses per seed must be between 1 and {MAX_ADDRESSES_PER_SEED}, got {n}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const DEST: &str = "bc1p4qhjn9zdvkux4e44uhx8tc55attvtyu358kutcqkudyccelu0was9fqzwh";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn service_defaults() {
        let cfg = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.esplora_url, "https://blockstream.info/api");
        assert_eq!(cfg.blockcypher_url, "https://api.blockcypher.com/v1/btc/main");
        assert_eq!(cfg.http_timeout, Duration::from_secs(10));
        assert_eq!(cfg.scan_interval, Duration::from_secs(1));
        assert_eq!(cfg.drain_interval, Duration::from_secs(3));
    }

    #[test]
    fn service_overrides() {
        let cfg = ServiceConfig::from_lookup(lookup(&[
            ("SWEEP_ESPLORA_URL", "https://mempool.space/api"),
            ("SWEEP_SCAN_INTERVAL_MS", "250"),
            ("SWEEP_HTTP_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(cfg.esplora_url, "https://mempool.space/api");
        assert_eq!(cfg.scan_interval, Duration::from_millis(250));
        assert_eq!(cfg.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn service_rejects_bad_numbers() {
        let bad = |key: &str, value: &str| {
            ServiceConfig::from_lookup(lookup(&[(key, value)])).is_err()
        };
        assert!(bad("SWEEP_DRAIN_INTERVAL_MS", "soon"));
        assert!(bad("SWEEP_HTTP_TIMEOUT_SECS", "0"));
    }

    #[test]
    fn fee_rate_parsing() {
        assert_eq!("fast".parse::<FeeRateChoice>().unwrap(), FeeRateChoice::Fast);
        assert_eq!("FASTEST".parse::<FeeRateChoice>().unwrap(), FeeRateChoice::Fastest);
        assert_eq!("12".parse::<FeeRateChoice>().unwrap(), FeeRateChoice::Fixed(12));
        assert!("0".parse::<FeeRateChoice>().is_err());
        assert!("-3".parse::<FeeRateChoice>().is_err());
        assert!("quick".parse::<FeeRateChoice>().is_err());
    }

    #[test]
    fn fee_rate_resolution() {
        let fees = FeeEstimates::default();
        assert_eq!(FeeRateChoice::Slow.resolve(&fees), 1);
        assert_eq!(FeeRateChoice::Normal.resolve(&fees), 10);
        assert_eq!(FeeRateChoice::Fixed(7).resolve(&fees), 7);
        assert!(!FeeRateChoice::Fixed(7).needs_estimates());
        assert!(FeeRateChoice::Fast.needs_estimates());
    }

    #[test]
    fn drain_requires_confirmation() {
        let cfg = DrainConfig::new(DEST);
        assert!(matches!(cfg.validate(), Err(SweepError::NotConfirmed)));

        let confirmed = DrainConfig {
            confirmed: true,
            ..DrainConfig::new(DEST)
        };
        assert!(confirmed.validate().is_ok());

        let dry = DrainConfig {
            dry_run: true,
            ..DrainConfig::new(DEST)
        };
        assert!(dry.validate().is_ok());
    }

    #[test]
    fn drain_checks_destination_before_confirmation() {
        let cfg = DrainConfig::new("bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq");
        assert!(matches!(cfg.validate(), Err(SweepError::InvalidDestination(_))));
    }

    #[test]
    fn scan_address_bounds() {
        assert!(ScanConfig::default().validate().is_ok());
        let zero = ScanConfig {
            addresses_per_seed: 0,
            ..ScanConfig::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn generate_word_counts() {
        assert!(GenerateConfig::default().validate().is_ok());
        let bad = GenerateConfig {
            word_count: 15,
            ..GenerateConfig::default()
        };
        assert!(bad.validate().is_err());
        let none = GenerateConfig {
            count: 0,
            ..GenerateConfig::default()
        };
        assert!(none.validate().is_err());
    }
}
