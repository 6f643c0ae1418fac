use crate::display;
use anyhow::Result;
use colored::Colorize;

pub async fn run(path: String, limit: Option<usize>) -> Result<()> {
    let root = super::workspace_root()?;
    let bridge = super::open_local(&root)?;

    let items = bridge.client.history(&path).await?;

    if items.is_empty() {
        println!("{}", "No history found".yellow());
        return Ok(());
    }

    println!("{} {}", "History for".bold().cyan(), path.bold());
    println!();

    let to_show = limit.unwrap_or(items.len()).min(items.len());
    for item in items.iter().take(to_show) {
        display::print_history_item(item);
    }

    if items.len() > to_show {
        println!(
            "{}",
            format!("... and {} more changesets", items.len() - to_show).dimmed()
        );
        println!("Use {} to see more", "--limit N".cyan());
    }

    Ok(())
}
