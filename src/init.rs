use std::sync::Arc;
use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use crate::config::Settings;
use crate::controllers::LiftController;
use crate::models::LiftRequestMessage;
use crate::services::bus::{LiftStatePublisher, RabbitMqBus};
use crate::services::device::{LiftClientApi, LiftDevice};
use crate::state_management::{RequestCoordinator, RequestSlot, StateSynchronizer};
use crate::utils::logging;

const REQUEST_CHANNEL_CAPACITY: usize = 32;

pub struct AppContext {
    pub settings: Arc<Settings>,
    pub synchronizer: Arc<StateSynchronizer>,
    pub coordinator: Arc<RequestCoordinator>,
    pub controller: Arc<LiftController>,
    pub bus: Arc<RabbitMqBus>,
    pub requests: mpsc::Receiver<LiftRequestMessage>,
    pub consumer: JoinHandle<()>,
    pub log_guard: Option<WorkerGuard>,
}

/// Loads settings, installs logging, connects to the lift and the bus, and wires the components.
///
/// Fails if the lift does not answer the startup handshake or the broker cannot be reached.
pub async fn initialize() -> Result<AppContext> {
    let settings = Arc::new(Settings::new()?);
    let log_guard = logging::init_logger(&settings.logging.level, settings.logging.path.clone())?;
    info!("Starting lift adapter for {}", settings.lift);

    let api = LiftClientApi::connect(&settings.lift).await?;
    let device = LiftDevice::new(Arc::new(api), settings.lift.timeout());

    let bus = Arc::new(RabbitMqBus::connect(&settings.rabbitmq).await?);
    let (requests, consumer) = bus.subscribe_requests(REQUEST_CHANNEL_CAPACITY).await?;

    let slot = Arc::new(RequestSlot::new());
    let publisher: Arc<dyn LiftStatePublisher> = bus.clone();
    let synchronizer = Arc::new(StateSynchronizer::new(
        &settings.lift.name,
        device.clone(),
        Arc::clone(&slot),
        publisher,
        settings.timing.poll_interval(),
    ));

    let coordinator = Arc::new(RequestCoordinator::new(
        device,
        slot,
        synchronizer.subscribe(),
        &settings.timing,
    ));
    let controller = Arc::new(LiftController::new(&settings.lift.name, Arc::clone(&coordinator)));

    Ok(AppContext {
        settings,
        synchronizer,
        coordinator,
        controller,
        bus,
        requests,
        consumer,
        log_guard,
    })
}
