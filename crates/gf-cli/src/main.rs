//! GachaForge CLI
//!
//! Usage:
//!   gachaforge pull 10          - Spend currency on 10 pulls
//!   gachaforge rates            - Show per-item and per-tier odds
//!   gachaforge stats dragon     - Print an item's stat sheet
//!   gachaforge pity             - Show the stored pity counter

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use gf_core::{ItemId, format_stats};
use gf_gacha::{Catalog, CatalogFile, GachaConfig, GachaEngine, GachaSession, Pool, StaticCatalog};
use gf_state::{JsonCounterStore, MemoryInventory, MemoryWallet, Wallet};

#[derive(Parser)]
#[command(name = "gachaforge", about = "Weighted character pulls with a pity guarantee")]
struct Cli {
    /// Catalog file (.json/.yaml); built-in demo banner if omitted
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Engine config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Counter store file; platform data dir if omitted
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// RNG seed for reproducible pulls
    #[arg(long)]
    seed: Option<u64>,

    /// Player whose pity counter is used
    #[arg(short, long)]
    player: Option<String>,

    /// Reject extreme configuration instead of accepting it
    #[arg(long)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spend currency and pull
    Pull {
        /// Number of pulls
        #[arg(default_value_t = 1)]
        count: u32,

        /// Starting wallet balance
        #[arg(short, long, default_value_t = 16_000)]
        balance: u64,
    },
    /// Show draw odds
    Rates,
    /// Print an item's stat sheet
    Stats {
        /// Item id
        id: String,
    },
    /// Show the stored pity counter
    Pity,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let catalog = load_catalog(cli.catalog.as_ref())?;

    match &cli.command {
        Commands::Pull { count, balance } => run_pull(&cli, config, &catalog, *count, *balance),
        Commands::Rates => show_rates(&catalog),
        Commands::Stats { id } => show_stats(&catalog, id),
        Commands::Pity => show_pity(&cli, config, &catalog),
    }
}

fn load_config(cli: &Cli) -> Result<GachaConfig> {
    let mut config = match &cli.config {
        Some(path) => GachaConfig::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GachaConfig::default(),
    };

    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if let Some(player) = &cli.player {
        config = config.with_player(player.clone());
    }
    if cli.strict {
        config.validate()?;
    }
    Ok(config)
}

fn load_catalog(path: Option<&PathBuf>) -> Result<StaticCatalog> {
    let file = match path {
        Some(path) => CatalogFile::load(path)
            .with_context(|| format!("loading catalog {}", path.display()))?,
        None => CatalogFile::sample(),
    };
    log::info!("Catalog '{}' with {} entries", file.name, file.entries.len());
    Ok(file.into_catalog()?)
}

fn build_engine(cli: &Cli, config: GachaConfig, catalog: &StaticCatalog) -> Result<GachaEngine> {
    let path = cli.store.clone().unwrap_or_else(JsonCounterStore::default_path);
    let store = JsonCounterStore::open(&path)
        .with_context(|| format!("opening counter store {}", path.display()))?;
    Ok(GachaEngine::new(Pool::from_catalog(catalog), Arc::new(store), config))
}

fn run_pull(
    cli: &Cli,
    config: GachaConfig,
    catalog: &StaticCatalog,
    count: u32,
    balance: u64,
) -> Result<()> {
    if count == 0 {
        bail!("count must be at least 1");
    }

    let engine = build_engine(cli, config, catalog)?;
    let mut session = GachaSession::new(engine, MemoryWallet::new(balance), MemoryInventory::new());
    let result = session.pull(count)?;

    println!("{} ({} pulls)", result.pull_id, result.len());
    for (i, draw) in result.draws.iter().enumerate() {
        let label = match &draw.item {
            Some(item) => format!("{} {}", "*".repeat(item.rarity.stars() as usize), item),
            None => "(nothing)".to_string(),
        };
        let marker = if draw.forced { "  <- guaranteed" } else { "" };
        println!("{:>3}. {}{}", i + 1, label, marker);
    }

    println!(
        "pity {} -> {} | balance {}",
        result.pity_before,
        result.pity_counter,
        session.wallet().balance()
    );
    if let Some(err) = &result.persist_error {
        eprintln!("warning: pity counter not saved: {}", err);
    }
    Ok(())
}

fn show_rates(catalog: &StaticCatalog) -> Result<()> {
    let pool = Pool::from_catalog(catalog);

    for (item, p) in pool.probabilities() {
        println!("{:<24} {:>10} {:>8.3}%", item.name, item.rarity.name(), p * 100.0);
    }
    println!();
    for (rarity, p) in pool.rarity_rates() {
        println!("{:<10} {:>8.3}%", rarity.name(), p * 100.0);
    }
    Ok(())
}

fn show_stats(catalog: &StaticCatalog, id: &str) -> Result<()> {
    let Some(item) = catalog.find(&ItemId::from(id)) else {
        bail!("no item '{}' in catalog", id);
    };
    println!("{}", item.name);
    println!("{}", format_stats(&item.character_stats()));
    Ok(())
}

fn show_pity(cli: &Cli, config: GachaConfig, catalog: &StaticCatalog) -> Result<()> {
    let engine = build_engine(cli, config, catalog)?;
    println!(
        "{}: {} pulls since last {} ({} more until guaranteed)",
        engine.config().player_id,
        engine.pity_counter(),
        engine.guaranteed_rarity(),
        engine.pulls_until_guarantee()
    );
    if let Some(err) = engine.last_store_error() {
        eprintln!("warning: {}", err);
    }
    Ok(())
}
