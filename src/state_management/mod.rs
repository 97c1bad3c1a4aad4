pub mod cancel_signal;
pub mod request_coordinator;
pub mod request_slot;
pub mod synchronizer;

pub use cancel_signal::CancelSignal;
pub use request_coordinator::{RequestCoordinator, SubmitOutcome};
pub use request_slot::{ActiveRequest, RequestSlot};
pub use synchronizer::{CycleOutcome, StateSynchronizer};
