use anyhow::Result;
use colored::Colorize;

pub async fn run() -> Result<()> {
    let root = super::workspace_root()?;
    let bridge = super::open_local(&root)?;

    let branches = bridge.client.branches().await?;

    if branches.is_empty() {
        println!("{}", "No branches found".yellow());
        return Ok(());
    }

    println!("{}", "Branches".bold().cyan());
    println!();
    for branch in &branches {
        println!("  {}", branch);
    }

    Ok(())
}
