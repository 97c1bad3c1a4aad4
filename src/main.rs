use std::sync::Arc;
use anyhow::Result;
use tracing::{error, info};
use tokio::signal::ctrl_c;
use lift_adapter::init::{initialize, AppContext};
use lift_adapter::state_management::CancelSignal;

/// The main entry point of the lift adapter
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}

/// Runs the adapter until Ctrl-C
///
/// 1. Initializes settings, logging, the lift connection and the bus (see `init::initialize`)
/// 2. Spawns the state synchronizer, the coordinator's completion watcher and the request controller
/// 3. On shutdown, stops all three, cancels any in-flight request and waits for the tasks to finish
async fn run() -> Result<()> {
    let AppContext {
        settings,
        synchronizer,
        coordinator,
        controller,
        bus: _bus,
        requests,
        consumer,
        log_guard: _log_guard,
    } = initialize().await?;

    let shutdown = CancelSignal::new();

    let synchronizer_task = {
        let synchronizer = Arc::clone(&synchronizer);
        let shutdown = shutdown.clone();
        tokio::spawn(async move { synchronizer.run(shutdown).await })
    };

    let completion_task = {
        let coordinator = Arc::clone(&coordinator);
        let shutdown = shutdown.clone();
        tokio::spawn(async move { coordinator.watch_completion(shutdown).await })
    };

    let controller_task = {
        let controller = Arc::clone(&controller);
        let shutdown = shutdown.clone();
        tokio::spawn(async move { controller.run(requests, shutdown).await })
    };

    info!("Running lift adapter for {}", settings.lift.name);
    ctrl_c().await?;
    info!("Received shutdown signal. Shutting down gracefully...");

    shutdown.cancel();
    coordinator.reset();
    consumer.abort();

    for (name, task) in [
        ("state synchronizer", synchronizer_task),
        ("completion watcher", completion_task),
        ("request controller", controller_task),
    ] {
        if let Err(e) = task.await {
            error!("{} task failed: {:?}", name, e);
        }
    }

    info!("Lift adapter stopped");
    Ok(())
}
