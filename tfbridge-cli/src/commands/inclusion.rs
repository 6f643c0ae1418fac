use anyhow::{Context, Result};
use colored::Colorize;
use tfbridge_sdk::TfBridgeClient;

/// Inclusion state lives in the daemon's fileset, so this command talks to
/// the running bridge instead of constructing a local core.
pub async fn run(path: String, included: bool, server: String) -> Result<()> {
    let client = TfBridgeClient::new(&server);

    let result = tokio::task::spawn_blocking(move || client.set_inclusion(&path, included))
        .await?
        .context("is the bridge daemon running? Start it with: tfbridge start")?;

    let marker = if result.included {
        "included in".green()
    } else {
        "excluded from".yellow()
    };
    println!("{} {} the next checkin", result.path.bold(), marker);

    Ok(())
}
