use parking_lot::Mutex;
use crate::errors::RequestRejection;
use crate::models::{LiftRequest, LiftState, RequestMode, RequestPhase, SessionInfo};
use crate::state_management::cancel_signal::CancelSignal;

/// The request currently owning the lift.
#[derive(Clone)]
pub struct ActiveRequest {
    /// Distinguishes this request from any earlier one with the same session id
    pub ticket: u64,
    pub request: LiftRequest,
    pub phase: RequestPhase,
    /// Stops the executor driving this request
    pub cancel: CancelSignal,
}

impl ActiveRequest {
    /// The lift is at the destination and, in human mode, the requested door transition has been
    /// acknowledged by the device and confirmed by the reported door state.
    pub fn is_complete(&self, state: &LiftState) -> bool {
        if !state.is_at(&self.request.destination_floor) {
            return false;
        }
        match self.request.mode {
            RequestMode::Agv => true,
            RequestMode::Human { door } => {
                self.phase == RequestPhase::HumanDone && state.door_state == door.confirming_state()
            }
        }
    }
}

#[derive(Default)]
struct SlotInner {
    active: Option<ActiveRequest>,
    next_ticket: u64,
}

/// Single mutually exclusive slot holding the active request, if any.
///
/// Shared by the coordinator (which fills and clears it), the executors (which advance its phase) and
/// the synchronizer (which reads the session to publish). Lock hold times are a few field copies; the
/// lock is never held across an await.
#[derive(Default)]
pub struct RequestSlot {
    inner: Mutex<SlotInner>,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `request` as active unless another request already is.
    ///
    /// Returns the new request's ticket and the signal that cancels its executor.
    pub fn try_claim(&self, request: LiftRequest, phase: RequestPhase) -> Result<(u64, CancelSignal), RequestRejection> {
        let mut inner = self.inner.lock();
        if let Some(active) = &inner.active {
            return Err(RequestRejection::Busy { active_session: active.request.session_id.clone() });
        }
        inner.next_ticket += 1;
        let ticket = inner.next_ticket;
        let cancel = CancelSignal::new();
        inner.active = Some(ActiveRequest { ticket, request, phase, cancel: cancel.clone() });
        Ok((ticket, cancel))
    }

    /// Moves the request identified by `ticket` to `phase`. A stale ticket changes nothing.
    pub fn advance(&self, ticket: u64, phase: RequestPhase) -> bool {
        let mut inner = self.inner.lock();
        match inner.active.as_mut() {
            Some(active) if active.ticket == ticket => {
                active.phase = phase;
                true
            }
            _ => false,
        }
    }

    pub fn phase(&self) -> RequestPhase {
        self.inner.lock().active.as_ref().map_or(RequestPhase::Idle, |a| a.phase)
    }

    pub fn active_session_id(&self) -> Option<String> {
        self.inner.lock().active.as_ref().map(|a| a.request.session_id.clone())
    }

    /// Session to report in the published state.
    pub fn session(&self) -> Option<SessionInfo> {
        self.inner.lock().active.as_ref().map(|a| SessionInfo {
            session_id: a.request.session_id.clone(),
            mode: a.request.lift_mode(),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.inner.lock().active.is_some()
    }

    /// Removes the active request if it belongs to `session_id`.
    pub fn take_session(&self, session_id: &str) -> Option<ActiveRequest> {
        let mut inner = self.inner.lock();
        match &inner.active {
            Some(active) if active.request.session_id == session_id => inner.active.take(),
            _ => None,
        }
    }

    /// Removes the active request if it is the one identified by `ticket`.
    pub fn take_ticket(&self, ticket: u64) -> Option<ActiveRequest> {
        let mut inner = self.inner.lock();
        match &inner.active {
            Some(active) if active.ticket == ticket => inner.active.take(),
            _ => None,
        }
    }

    /// Removes the active request if `state` shows it has completed.
    pub fn take_if_complete(&self, state: &LiftState) -> Option<ActiveRequest> {
        let mut inner = self.inner.lock();
        match &inner.active {
            Some(active) if active.is_complete(state) => inner.active.take(),
            _ => None,
        }
    }

    pub fn take(&self) -> Option<ActiveRequest> {
        self.inner.lock().active.take()
    }
}
