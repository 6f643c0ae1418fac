use anyhow::Result;
use std::sync::Arc;
use tfbridge_core::DiagnosticsReporter;

pub async fn run() -> Result<()> {
    let root = super::workspace_root()?;
    let bridge = super::open_local(&root)?;

    // Best-effort refresh so the pending-change section reflects live state.
    let _ = bridge.client.refresh_pending_changes().await;

    let reporter = DiagnosticsReporter::new(
        bridge.config.clone(),
        Arc::clone(&bridge.client),
        Arc::clone(&bridge.fileset),
        Arc::clone(&bridge.history),
    );

    print!("{}", reporter.generate().await);

    Ok(())
}
