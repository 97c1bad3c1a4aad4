#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;

use lift_adapter::config::TimingSettings;
use lift_adapter::errors::{DeviceError, DeviceResult};
use lift_adapter::models::{DoorState, LiftState, MotionState};
use lift_adapter::services::bus::ChannelPublisher;
use lift_adapter::services::device::{DeviceGateway, LiftDevice};
use lift_adapter::state_management::{RequestCoordinator, RequestSlot, StateSynchronizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    AvailableFloors,
    CurrentFloor,
    DestinationFloor,
    DoorState,
    MotionState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Query(Query),
    CommandLift(String),
    OpenDoor,
    CloseDoor,
}

struct FakeLift {
    floors: Vec<String>,
    current_floor: String,
    destination_floor: String,
    door: DoorState,
    motion: MotionState,
    failing: HashSet<Query>,
    lift_results: VecDeque<DeviceResult<()>>,
    door_results: VecDeque<DeviceResult<()>>,
    calls: Vec<(Call, Instant)>,
}

/// Scripted lift. Queries answer from the current fields, commands pop scripted results and
/// succeed once the script is exhausted. Every call is recorded with its (virtual) time.
pub struct FakeGateway {
    lift: Mutex<FakeLift>,
}

impl FakeGateway {
    pub fn new(floors: &[&str], current_floor: &str) -> Arc<Self> {
        Arc::new(Self {
            lift: Mutex::new(FakeLift {
                floors: floors.iter().map(|f| f.to_string()).collect(),
                current_floor: current_floor.to_string(),
                destination_floor: current_floor.to_string(),
                door: DoorState::Closed,
                motion: MotionState::Stopped,
                failing: HashSet::new(),
                lift_results: VecDeque::new(),
                door_results: VecDeque::new(),
                calls: Vec::new(),
            }),
        })
    }

    pub fn set_current_floor(&self, floor: &str) {
        self.lift.lock().current_floor = floor.to_string();
    }

    pub fn set_destination_floor(&self, floor: &str) {
        self.lift.lock().destination_floor = floor.to_string();
    }

    pub fn set_door(&self, door: DoorState) {
        self.lift.lock().door = door;
    }

    pub fn set_motion(&self, motion: MotionState) {
        self.lift.lock().motion = motion;
    }

    pub fn fail_query(&self, query: Query) {
        self.lift.lock().failing.insert(query);
    }

    pub fn restore_queries(&self) {
        self.lift.lock().failing.clear();
    }

    pub fn script_lift_results(&self, results: Vec<DeviceResult<()>>) {
        self.lift.lock().lift_results.extend(results);
    }

    pub fn script_door_results(&self, results: Vec<DeviceResult<()>>) {
        self.lift.lock().door_results.extend(results);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lift.lock().calls.iter().map(|(call, _)| call.clone()).collect()
    }

    pub fn lift_command_times(&self) -> Vec<Instant> {
        self.lift.lock().calls.iter()
            .filter(|(call, _)| matches!(call, Call::CommandLift(_)))
            .map(|(_, at)| *at)
            .collect()
    }

    pub fn door_commands(&self) -> Vec<(Call, Instant)> {
        self.lift.lock().calls.iter()
            .filter(|(call, _)| matches!(call, Call::OpenDoor | Call::CloseDoor))
            .cloned()
            .collect()
    }

    pub fn lift_command_count(&self) -> usize {
        self.lift_command_times().len()
    }

    fn record(&self, call: Call) {
        self.lift.lock().calls.push((call, Instant::now()));
    }

    fn answer<T>(&self, query: Query, read: impl FnOnce(&FakeLift) -> T) -> DeviceResult<T> {
        self.record(Call::Query(query));
        let lift = self.lift.lock();
        if lift.failing.contains(&query) {
            return Err(DeviceError::Unreachable(format!("{:?} failed", query)));
        }
        Ok(read(&lift))
    }
}

#[async_trait]
impl DeviceGateway for FakeGateway {
    async fn check_connection(&self) -> DeviceResult<()> {
        Ok(())
    }

    async fn available_floors(&self) -> DeviceResult<Vec<String>> {
        self.answer(Query::AvailableFloors, |l| l.floors.clone())
    }

    async fn current_floor(&self) -> DeviceResult<String> {
        self.answer(Query::CurrentFloor, |l| l.current_floor.clone())
    }

    async fn destination_floor(&self) -> DeviceResult<String> {
        self.answer(Query::DestinationFloor, |l| l.destination_floor.clone())
    }

    async fn door_state(&self) -> DeviceResult<DoorState> {
        self.answer(Query::DoorState, |l| l.door)
    }

    async fn motion_state(&self) -> DeviceResult<MotionState> {
        self.answer(Query::MotionState, |l| l.motion)
    }

    async fn command_lift(&self, floor: &str) -> DeviceResult<()> {
        self.record(Call::CommandLift(floor.to_string()));
        self.lift.lock().lift_results.pop_front().unwrap_or(Ok(()))
    }

    async fn open_door(&self) -> DeviceResult<()> {
        self.record(Call::OpenDoor);
        self.lift.lock().door_results.pop_front().unwrap_or(Ok(()))
    }

    async fn close_door(&self) -> DeviceResult<()> {
        self.record(Call::CloseDoor);
        self.lift.lock().door_results.pop_front().unwrap_or(Ok(()))
    }
}

pub const LIFT_NAME: &str = "lift_1";

/// A wired adapter around a `FakeGateway`, without any background tasks running.
pub struct Harness {
    pub gateway: Arc<FakeGateway>,
    pub device: LiftDevice,
    pub slot: Arc<RequestSlot>,
    pub synchronizer: Arc<StateSynchronizer>,
    pub coordinator: Arc<RequestCoordinator>,
    pub published: mpsc::UnboundedReceiver<LiftState>,
}

impl Harness {
    pub fn new(floors: &[&str], current_floor: &str) -> Self {
        let gateway = FakeGateway::new(floors, current_floor);
        let device = LiftDevice::new(gateway.clone(), Duration::from_secs(1));
        let slot = Arc::new(RequestSlot::new());
        let (publisher, published) = ChannelPublisher::new();
        let timing = TimingSettings::default();

        let synchronizer = Arc::new(StateSynchronizer::new(
            LIFT_NAME,
            device.clone(),
            Arc::clone(&slot),
            Arc::new(publisher),
            timing.poll_interval(),
        ));
        let coordinator = Arc::new(RequestCoordinator::new(
            device.clone(),
            Arc::clone(&slot),
            synchronizer.subscribe(),
            &timing,
        ));

        Self { gateway, device, slot, synchronizer, coordinator, published }
    }

    /// Runs one poll cycle and returns what it published, if anything.
    pub async fn poll(&mut self) -> Option<LiftState> {
        self.synchronizer.run_cycle().await;
        let mut last = None;
        while let Ok(state) = self.published.try_recv() {
            last = Some(state);
        }
        last
    }
}
