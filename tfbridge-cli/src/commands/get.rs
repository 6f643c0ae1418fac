use anyhow::Result;
use colored::Colorize;

pub async fn run() -> Result<()> {
    let root = super::workspace_root()?;
    let bridge = super::open_local(&root)?;

    println!("{}", "Getting latest version...".bold());
    let result = bridge.client.get_latest().await?;

    println!("{}", "✓ Workspace is up to date".green().bold());
    let output = result.stdout.trim();
    if !output.is_empty() {
        println!();
        println!("{}", output.dimmed());
    }

    Ok(())
}
