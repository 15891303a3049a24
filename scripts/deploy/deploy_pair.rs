//! Pair deployment walkthrough - in-memory registry, router and ledger
//!
//! Usage:
//!   deploy_pair
//!   deploy_pair --config config/amm.toml --environment local
//!   deploy_pair --amount-a 1000 --amount-b 4000 --swap-in 10 --json-logs

use amm::{
    pair_for, AddLiquidityParams, InMemoryLedger, PairRegistry, Router,
    SwapExactTokensForTokensParams, TokenLedger,
};
use anyhow::{Context, Result};
use clap::Parser;
use protocol_config::ProtocolConfig;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};
use types::{parse_address, Address, CallContext, LogEntry, U256};

#[derive(Parser, Debug)]
#[command(name = "deploy_pair")]
#[command(about = "Create a pair, seed it with liquidity and run one swap")]
#[command(version)]
struct Args {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment overrides to apply on top of the configuration file
    #[arg(short, long)]
    environment: Option<String>,

    /// First token of the pair
    #[arg(long, default_value = "0x00000000000000000000000000000000000000a1", value_parser = parse_address)]
    token_a: Address,

    /// Second token of the pair
    #[arg(long, default_value = "0x00000000000000000000000000000000000000b2", value_parser = parse_address)]
    token_b: Address,

    /// Liquidity seeded on the A side, whole units of 18 decimals
    #[arg(long, default_value_t = 100)]
    amount_a: u64,

    /// Liquidity seeded on the B side, whole units of 18 decimals
    #[arg(long, default_value_t = 100)]
    amount_b: u64,

    /// Amount of token A sold after seeding, whole units of 18 decimals
    #[arg(long, default_value_t = 1)]
    swap_in: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let config = match &args.config {
        Some(path) => ProtocolConfig::load(Some(path.as_path()), args.environment.as_deref())?,
        None => {
            info!("No configuration file given, using defaults");
            ProtocolConfig::default()
        }
    };

    let mut registry = PairRegistry::from_config(&config);
    let router = Router::from_config(&config);
    let mut ledger = InMemoryLedger::new();
    let deployer = config.registry.fee_to_setter;

    info!("Deploying with account: {:#x}", deployer);
    info!("Registry: {:#x}", registry.address());
    info!("Router: {:#x}", router.address());
    info!("FeeToSetter: {:#x}", registry.fee_to_setter());

    let amount_a = units(args.amount_a);
    let amount_b = units(args.amount_b);
    let swap_in = units(args.swap_in);

    // fund the deployer with both demo tokens and let the router spend them
    ledger.mint(args.token_a, deployer, amount_a + swap_in)?;
    ledger.mint(args.token_b, deployer, amount_b)?;
    ledger.approve(args.token_a, deployer, router.address(), U256::MAX);
    ledger.approve(args.token_b, deployer, router.address(), U256::MAX);

    let created = registry.create_pair(args.token_a, args.token_b)?;
    report(&created.events)?;

    let derived = pair_for(
        registry.address(),
        args.token_a,
        args.token_b,
        registry.pair_code_hash(),
    )?;
    info!("Pair (registry): {:#x}", created.value);
    info!("Pair (derived):  {:#x}", derived);
    if derived == created.value {
        info!("Derived address matches");
    } else {
        warn!("Derived address does not match the registry");
    }

    let now = now_secs()?;
    let ctx = CallContext::new(deployer, now);
    let deadline = now + config.router.deadline_secs;

    let added = router.add_liquidity(
        &ctx,
        &mut registry,
        &mut ledger,
        &AddLiquidityParams {
            token_a: args.token_a,
            token_b: args.token_b,
            amount_a_desired: amount_a,
            amount_b_desired: amount_b,
            amount_a_min: U256::zero(),
            amount_b_min: U256::zero(),
            to: deployer,
            deadline,
        },
    )?;
    let (used_a, used_b, liquidity) = added.value;
    info!(%used_a, %used_b, %liquidity, "Liquidity added");
    report(&added.events)?;

    let path = vec![args.token_a, args.token_b];
    let quoted = router.get_amounts_out(&registry, swap_in, &path)?;
    let swapped = router.swap_exact_tokens_for_tokens(
        &ctx,
        &mut registry,
        &mut ledger,
        &SwapExactTokensForTokensParams {
            amount_in: swap_in,
            amount_out_min: quoted[quoted.len() - 1],
            path,
            to: deployer,
            deadline,
        },
    )?;
    info!(amounts = ?swapped.value, "Swap executed");
    report(&swapped.events)?;

    if let Some(pair) = registry.pair(created.value) {
        let (reserve0, reserve1, timestamp) = pair.get_reserves();
        info!(%reserve0, %reserve1, timestamp, "Final reserves");
    }

    Ok(())
}

fn units(whole: u64) -> U256 {
    U256::from(whole) * U256::exp10(18)
}

fn now_secs() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock before unix epoch")?
        .as_secs())
}

fn report(events: &[LogEntry]) -> Result<()> {
    for entry in events {
        let event = serde_json::to_string(&entry.event).context("Failed to encode event")?;
        info!(emitter = ?entry.emitter, "{}", event);
    }
    Ok(())
}

fn init_logging(args: &Args) {
    let log_level = match args.log_level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    if args.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(log_level)
            .init();
    } else {
        tracing_subscriber::fmt().with_max_level(log_level).init();
    }
}
