//! Validate configuration command.

use anyhow::Result;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    match desk_config::load_config(config_path) {
        Ok(config) => {
            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Log level: {}", config.logging.level);
            println!("Feed plan: {}", config.market.plan);
            println!("Initial balance: {}", config.limits.initial_balance);
            println!("Spread: {}", config.limits.spread);
            println!("Max order size: {} shares", config.limits.max_order_size);
            println!("Daily trade limit: {}", config.limits.daily_trade_limit);
            println!("Store root: {}", config.store.root);
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
