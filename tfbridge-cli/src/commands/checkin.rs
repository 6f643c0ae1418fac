use anyhow::Result;
use colored::Colorize;

pub async fn run(message: String, paths: Vec<String>) -> Result<()> {
    let root = super::workspace_root()?;
    let bridge = super::open_local(&root)?;

    // With no explicit paths the checkin covers the included fileset, so it
    // has to be populated first.
    if paths.is_empty() {
        bridge.client.refresh_pending_changes().await?;
        if bridge.fileset.all_files().is_empty() {
            println!("{}", "No pending changes to check in".yellow());
            return Ok(());
        }
    }

    println!("{}", "Checking in...".bold());
    let result = bridge.client.checkin(&paths, &message).await?;

    println!("{}", "✓ Checked in successfully!".green().bold());
    println!("  {}: {}", "Comment".bold(), message);
    let output = result.stdout.trim();
    if !output.is_empty() {
        println!();
        println!("{}", output.dimmed());
    }

    Ok(())
}
