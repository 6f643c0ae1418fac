use anyhow::Result;
use colored::Colorize;

pub async fn run(name: String, message: String, paths: Vec<String>) -> Result<()> {
    let root = super::workspace_root()?;
    let bridge = super::open_local(&root)?;

    if paths.is_empty() {
        bridge.client.refresh_pending_changes().await?;
        if bridge.fileset.all_files().is_empty() {
            println!("{}", "No pending changes to shelve".yellow());
            return Ok(());
        }
    }

    println!("{}", "Shelving...".bold());
    bridge.client.create_shelveset(&name, &message, &paths).await?;

    println!("{}", "✓ Shelveset created!".green().bold());
    println!("  {}: {}", "Name".bold(), name);
    println!("  {}: {}", "Comment".bold(), message);

    Ok(())
}
