use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use tfbridge_server::TfBridgeServer;

pub async fn run(path: PathBuf, port: u16) -> Result<()> {
    let abs_path = std::fs::canonicalize(&path)?;

    println!("{}", "Starting tfbridge daemon...".bold().cyan());
    println!("   {}: {:?}", "Workspace".bold(), abs_path);

    let server = TfBridgeServer::new(abs_path)?;

    println!("   {}: {}", "Tool".bold(), server.config().tool_path);
    println!(
        "   {}: {}",
        "Editor API".bold(),
        format!("http://localhost:{}", port).green()
    );
    println!();
    println!("{}", "Press Ctrl+C to stop".dimmed());
    println!();

    let addr = format!("0.0.0.0:{}", port).parse()?;
    server.serve(addr).await?;

    Ok(())
}
