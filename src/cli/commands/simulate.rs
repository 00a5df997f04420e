//! Scripted trading session command.

use anyhow::Result;
use chrono::Utc;
use desk_core::traits::SnapshotStore;
use desk_core::types::MarketSnapshot;
use std::path::Path;
use tracing::{info, warn};

use crate::cli::SimulateArgs;

pub async fn run(args: SimulateArgs, config_path: &Path) -> Result<()> {
    let config = super::load_config(config_path)?;
    let (desk, store, feed) = super::build_desk(&config);

    if let Some(feed) = &feed {
        match feed.is_open().await {
            Ok(open) => info!(open, "market status"),
            Err(err) => warn!(error = %err, "market status check failed"),
        }
    }

    // Offline runs can seed today's snapshot instead of hitting a feed.
    if !args.seed.is_empty() {
        let mut snapshot = MarketSnapshot::new();
        for pair in &args.seed {
            let (symbol, price) = super::parse_seed(pair)?;
            snapshot.insert(symbol, price);
        }
        let today = Utc::now().date_naive();
        SnapshotStore::write(store.as_ref(), today, &snapshot).await?;
        info!(symbols = snapshot.len(), "seeded today's snapshot");
    }

    info!(trader = %args.trader, symbol = %args.symbol, "starting session");

    let account = desk.get_or_create(&args.trader).await?;
    info!(balance = %account.balance, "account ready");

    let account = desk
        .buy(&args.trader, &args.symbol, args.quantity, &args.rationale)
        .await?;
    info!(balance = %account.balance, "bought {} {}", args.quantity, args.symbol);

    let sell_back = args.quantity / 2;
    if sell_back > 0 {
        let account = desk
            .sell(&args.trader, &args.symbol, sell_back, &args.rationale)
            .await?;
        info!(balance = %account.balance, "sold {} {}", sell_back, args.symbol);
    }

    let report = desk.report(&args.trader).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
