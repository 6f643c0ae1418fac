use tfbridge_sdk::TfBridgeClient;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Editor integration example - driving a tfbridge daemon\n");

    // Connect to the bridge daemon
    let client = TfBridgeClient::new("http://localhost:3030");

    // Check if the daemon is running
    if !client.health_check()? {
        eprintln!("Error: tfbridge daemon is not running!");
        eprintln!("Start it with: tfbridge start .");
        return Ok(());
    }

    println!("✓ Connected to tfbridge daemon");
    println!();

    // Simulate the editor saving a tracked file; the bridge checks it out
    // automatically if it is not checked out yet.
    println!("Saving file: src/main.rs");
    client.document_saved("src/main.rs")?;
    println!("✓ Save signal relayed");
    println!();

    // Refresh and inspect the pending changes
    println!("Refreshing pending changes...");
    let changes = client.refresh()?;
    println!("✓ Found {} pending change(s)", changes.len());
    println!();

    // Exclude a file from the next checkin
    println!("Excluding docs/notes.txt from the next checkin");
    let state = client.set_inclusion("docs/notes.txt", false)?;
    println!(
        "✓ {} is now {}",
        state.path,
        if state.included { "included" } else { "excluded" }
    );
    println!();

    // Check in everything still included
    println!("Checking in included changes...");
    client.checkin(&[], "Applied editor changes")?;
    println!("✓ Checked in");
    println!();

    // Pull the diagnostics report
    println!("Fetching diagnostics...");
    let report = client.diagnostics()?;
    println!("✓ Report is {} bytes", report.len());
    println!();

    println!("Example completed successfully!");
    println!();
    println!("Try these commands:");
    println!("  tfbridge status       - View pending changes");
    println!("  tfbridge branches     - List branches");
    println!("  tfbridge diagnostics  - Print the full report");

    Ok(())
}
