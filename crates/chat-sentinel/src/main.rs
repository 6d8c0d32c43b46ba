mod bootstrap;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sentinel_core::settings::Settings;
use sentinel_runtime::platform::{LogNotifier, Notifier};
use sentinel_runtime::registry::SessionRegistry;
use sentinel_runtime::supervisor;
use sentinel_store::OwnerStore;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    // Fatal startup errors abort here, before any loop begins.
    let data_dir = settings.resolve_data_dir()?;
    bootstrap::ensure_directories(&data_dir)?;
    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Chat Sentinel v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        data_dir = %data_dir.display(),
        tick_secs = settings.tick_secs,
        "configuration loaded"
    );

    let backoff = Duration::from_secs(settings.restart_backoff_secs);

    // Supervisory restart loop: on a fatal runtime failure, wait a fixed
    // interval and reinitialise every component from durable state. Ctrl+C
    // breaks out cleanly; an in-flight broadcast may be left partially sent.
    loop {
        let store = Arc::new(OwnerStore::new(&data_dir)?);
        let registry = Arc::new(SessionRegistry::new());
        let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

        tokio::select! {
            result = supervisor::run(store, registry, notifier, settings.tick_secs) => {
                match result {
                    Ok(()) => break,
                    Err(e) => {
                        tracing::error!(error = %e, "runtime failed");
                        tracing::info!(
                            backoff_secs = backoff.as_secs(),
                            "restarting after backoff"
                        );
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received; shutting down");
                break;
            }
        }
    }

    Ok(())
}
