//! taproot-sweeper: balance scanner and sweeper for BIP-86 Taproot wallets.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chain_btc::network::BtcNetwork;
use clap::{Args, Parser, Subcommand};
use ledger_client::http::build_client;
use ledger_client::{esplora_then_blockcypher, FallbackLedger, LedgerService};
use sweeper::config::{
    DEFAULT_GENERATED_FILE, DEFAULT_GENERATE_COUNT, DEFAULT_SCAN_ADDRESSES, DEFAULT_SEEDS_FILE,
    DEFAULT_WORD_COUNT,
};
use sweeper::report::{format_btc, write_balance_report, write_drain_report};
use sweeper::{
    DrainConfig, DrainSummary, FeeRateChoice, GenerateConfig, Pacer, ScanConfig, ScanSummary,
    ServiceConfig,
};

#[derive(Parser)]
#[command(name = "taproot-sweeper")]
#[command(version, about = "Scan and sweep BIP-86 Taproot wallets derived from seed phrases.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check balances of the addresses derived from every seed in a file.
    Scan(ScanArgs),
    /// Check the balance of one Taproot address.
    Balance {
        /// A bc1p... address.
        address: String,
    },
    /// Generate new mnemonics and append them to a file.
    Generate(GenerateArgs),
    /// Sweep every funded seed to one destination address.
    Drain(DrainArgs),
    /// Show recommended fee rates.
    Fees,
}

#[derive(Args)]
struct ScanArgs {
    /// Seed file, one mnemonic per line.
    #[arg(long, default_value = DEFAULT_SEEDS_FILE)]
    seeds: PathBuf,

    /// Addresses to check per seed.
    #[arg(long, default_value_t = DEFAULT_SCAN_ADDRESSES)]
    addresses: u32,

    /// Keep scanning a seed after its first funded address.
    #[arg(long)]
    full_scan: bool,
}

#[derive(Args)]
struct GenerateArgs {
    /// Number of mnemonics.
    #[arg(long, default_value_t = DEFAULT_GENERATE_COUNT)]
    count: usize,

    /// Words per mnemonic (12 or 24).
    #[arg(long, default_value_t = DEFAULT_WORD_COUNT)]
    words: usize,

    /// File the `mnemonic,private_key,address` lines are appended to.
    #[arg(long, default_value = DEFAULT_GENERATED_FILE)]
    output: PathBuf,
}

#[derive(Args)]
struct DrainArgs {
    /// Destination Taproot address.
    #[arg(long)]
    to: String,

    /// sat/byte, or one of slow, normal, fast, fastest.
    #[arg(long, default_value = "normal")]
    fee_rate: FeeRateChoice,

    /// Seed file, one mnemonic per line.
    #[arg(long, default_value = DEFAULT_SEEDS_FILE)]
    seeds: PathBuf,

    /// Addresses to sweep per seed, from index 0.
    #[arg(long, default_value_t = 1)]
    addresses: u32,

    /// Also spend outputs that are not confirmed yet.
    #[arg(long)]
    include_unconfirmed: bool,

    /// Build and sign, but do not broadcast.
    #[arg(long)]
    dry_run: bool,

    /// Skip the confirmation prompt.
    #[arg(long)]
    yes: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let services = ServiceConfig::from_env().context("invalid SWEEP_* environment")?;

    match cli.command {
        Commands::Scan(args) => cmd_scan(&services, args).await,
        Commands::Balance { address } => cmd_balance(&services, &address).await,
        Commands::Generate(args) => cmd_generate(args),
        Commands::Drain(args) => cmd_drain(&services, args).await,
        Commands::Fees => cmd_fees(&services).await,
    }
}

fn ledger(services: &ServiceConfig) -> Result<FallbackLedger> {
    let client = build_client(services.http_timeout).context("failed to build HTTP client")?;
    Ok(esplora_then_blockcypher(
        client,
        &services.esplora_url,
        &services.blockcypher_url,
    ))
}

async fn cmd_scan(services: &ServiceConfig, args: ScanArgs) -> Result<()> {
    let config = ScanConfig {
        seeds_path: args.seeds,
        addresses_per_seed: args.addresses,
        full_scan: args.full_scan,
        network: BtcNetwork::Mainnet,
    };
    config.validate()?;
    let seeds = sweeper::read_seeds(&config.seeds_path)?;
    let ledger = ledger(services)?;
    let mut pacer = Pacer::new(services.scan_interval);

    let summary = sweeper::scan_balances(&ledger, &seeds, &config, &mut pacer).await?;
    print_scan_summary(&summary);

    if let Some(path) = write_balance_report(Path::new("."), &summary, chrono::Utc::now())
        .context("failed to write balance report")?
    {
        println!("Results saved to {}", path.display());
    }
    Ok(())
}

async fn cmd_balance(services: &ServiceConfig, address: &str) -> Result<()> {
    let ledger = ledger(services)?;
    let balance = sweeper::address_balance(&ledger, address, &ScanConfig::default())
        .await
        .with_context(|| format!("balance lookup for {address} failed"))?;

    println!("Address:        {address}");
    println!("Balance:        {} BTC", format_btc(balance.balance_sat));
    println!("Transactions:   {}", balance.tx_count);
    println!("Total received: {} BTC", format_btc(balance.total_received_sat));
    println!("Total sent:     {} BTC", format_btc(balance.total_sent_sat));
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let config = GenerateConfig {
        count: args.count,
        word_count: args.words,
        output_path: args.output,
        network: BtcNetwork::Mainnet,
    };
    let wallets = sweeper::generate_wallets(&config)?;

    for (i, generated) in wallets.iter().enumerate() {
        println!("{}. {}", i + 1, generated.wallet.address);
    }
    sweeper::append_generated(&config.output_path, &wallets)
        .with_context(|| format!("failed to write {}", config.output_path.display()))?;
    println!(
        "{} wallets appended to {}",
        wallets.len(),
        config.output_path.display()
    );
    Ok(())
}

async fn cmd_drain(services: &ServiceConfig, args: DrainArgs) -> Result<()> {
    let mut config = DrainConfig {
        destination: args.to,
        fee_rate: args.fee_rate,
        seeds_path: args.seeds,
        addresses_per_seed: args.addresses,
        include_unconfirmed: args.include_unconfirmed,
        dry_run: args.dry_run,
        confirmed: args.yes,
        network: BtcNetwork::Mainnet,
    };

    // The destination is checked before the operator is asked anything.
    chain_btc::address::validate_destination(&config.destination, config.network)
        .map_err(sweeper::SweepError::from)?;
    let seeds = sweeper::read_seeds(&config.seeds_path)?;

    if !config.confirmed && !config.dry_run {
        config.confirmed = prompt_confirmation(&config, seeds.len())?;
    }
    config.validate()?;

    let ledger = ledger(services)?;
    let mut pacer = Pacer::new(services.drain_interval);
    let summary = sweeper::drain_wallets(&ledger, &seeds, &config, &mut pacer).await?;
    print_drain_summary(&summary);

    if let Some(path) = write_drain_report(Path::new("."), &summary, chrono::Utc::now())
        .context("failed to write drain report")?
    {
        println!("Results saved to {}", path.display());
    }
    Ok(())
}

async fn cmd_fees(services: &ServiceConfig) -> Result<()> {
    let ledger = ledger(services)?;
    let fees = match ledger.fee_estimates().await {
        Ok(fees) => fees,
        Err(e) => {
            println!("Fee estimates unavailable ({e}); showing defaults.");
            Default::default()
        }
    };
    println!("slow     {:>4} sat/byte  (~1 day)", fees.slow);
    println!("normal   {:>4} sat/byte  (~1 hour)", fees.normal);
    println!("fast     {:>4} sat/byte  (~30 minutes)", fees.fast);
    println!("fastest  {:>4} sat/byte  (next block)", fees.fastest);
    Ok(())
}

fn prompt_confirmation(config: &DrainConfig, seed_count: usize) -> Result<bool> {
    println!();
    println!("About to sweep {seed_count} seed(s) to {}", config.destination);
    println!("Fee rate: {}", config.fee_rate);
    println!("Broadcast transactions cannot be reversed.");
    print!("Type YES to continue: ");
    io::stdout().flush().context("failed to flush stdout")?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(answer.trim() == "YES")
}

fn print_scan_summary(summary: &ScanSummary) {
    println!();
    if !summary.records.is_empty() {
        println!("Funded addresses:");
        for (i, r) in summary.records.iter().enumerate() {
            println!("{}. seed {}  {}  {}", i + 1, r.seed_index, r.derivation_path, r.address);
            println!(
                "   balance {} BTC, {} transactions",
                format_btc(r.balance_sat),
                r.tx_count
            );
        }
        println!();
    }
    println!("{:<24}{}", "Seeds:", summary.seeds_total);
    println!("{:<24}{}", "Invalid seeds:", summary.invalid_seeds);
    println!("{:<24}{}", "Addresses checked:", summary.addresses_checked);
    println!("{:<24}{}", "Failed lookups:", summary.lookup_failures);
    println!("{:<24}{}", "Funded addresses:", summary.funded_addresses());
    println!(
        "{:<24}{} BTC",
        "Total balance:",
        format_btc(summary.total_balance_sat)
    );
}

fn print_drain_summary(summary: &DrainSummary) {
    println!();
    for r in &summary.records {
        let status = if r.broadcast { "sent" } else { "signed" };
        println!(
            "{status:<7}{}  {} BTC  fee {} sat  {} input(s){}",
            r.txid,
            format_btc(r.amount_sat),
            r.fee_sat,
            r.input_count,
            if r.partial { "  PARTIAL" } else { "" }
        );
    }
    println!("{:<24}{}", "Seeds:", summary.seeds_total);
    println!("{:<24}{}", "Invalid seeds:", summary.invalid_seeds);
    println!("{:<24}{}", "Transactions:", summary.records.len());
    println!("{:<24}{}", "Empty addresses:", summary.empty);
    println!("{:<24}{}", "Awaiting confirmation:", summary.pending);
    println!("{:<24}{}", "Below fee + dust:", summary.dust);
    println!("{:<24}{}", "Failures:", summary.failed);
    println!("{:<24}{} sat/byte", "Fee rate:", summary.fee_rate);
    println!(
        "{:<24}{} BTC",
        "Total drained:",
        format_btc(summary.total_drained_sat())
    );
    println!("{:<24}{} sat", "Total fees:", summary.total_fees_sat());
    println!("{:<24}{}", "Destination:", summary.destination);
    if summary.dry_run {
        println!("Dry run: nothing was broadcast.");
    }
}
