use crate::display;
use anyhow::Result;
use colored::Colorize;
use indicatif::ProgressBar;
use std::time::Duration;

pub async fn run() -> Result<()> {
    let root = super::workspace_root()?;
    let bridge = super::open_local(&root)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Querying pending changes...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    let refreshed = bridge.client.refresh_pending_changes().await;
    spinner.finish_and_clear();
    refreshed?;

    let changes = bridge.fileset.all_files();

    println!("{}", "Workspace Status".bold().cyan());
    println!("  {}: {}", "Root".bold(), root.display());
    println!("  {}: {}", "Tool".bold(), bridge.config.tool_path);
    println!();

    if changes.is_empty() {
        println!("{}", "No pending changes".green());
        return Ok(());
    }

    println!(
        "{} {}",
        "Pending changes:".bold(),
        format!("({})", changes.len()).yellow()
    );
    println!();

    for change in &changes {
        println!(
            "  {} {} {}",
            display::inclusion_marker(change.is_included),
            display::status_icon(change.status),
            change.path
        );
    }

    println!();
    println!(
        "Run {} to check in the included changes",
        "tfbridge checkin -m \"message\"".cyan()
    );

    Ok(())
}
