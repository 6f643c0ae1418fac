use anyhow::Result;
use colored::Colorize;

pub async fn run(path: String) -> Result<()> {
    let root = super::workspace_root()?;
    let bridge = super::open_local(&root)?;

    bridge.client.checkout(&path).await?;
    println!("{} {}", "✓ Checked out".green().bold(), path);

    Ok(())
}
