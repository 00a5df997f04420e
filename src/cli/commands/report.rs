//! Account report command.

use anyhow::Result;
use std::path::Path;

use crate::cli::ReportArgs;

pub async fn run(args: ReportArgs, config_path: &Path) -> Result<()> {
    let config = super::load_config(config_path)?;
    let (desk, _store, _feed) = super::build_desk(&config);

    let report = desk.report(&args.name).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
