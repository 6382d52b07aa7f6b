//! Explicit tracking of an outstanding external request.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

/// Identifies one request. Completions carrying a stale ticket are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

/// At most one request in flight; cancellation invalidates its ticket.
#[derive(Debug, Default)]
pub struct RequestTracker {
    state: RequestState,
    generation: u64,
}

impl RequestTracker {
    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn is_in_flight(&self) -> bool {
        self.state == RequestState::InFlight
    }

    /// Start a request, or `None` while one is already outstanding.
    pub fn begin(&mut self) -> Option<RequestTicket> {
        if self.is_in_flight() {
            return None;
        }
        self.generation += 1;
        self.state = RequestState::InFlight;
        Some(RequestTicket(self.generation))
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.is_in_flight() && ticket.0 == self.generation
    }

    /// Settle the request. Returns false (and changes nothing) for a stale ticket.
    pub fn finish(&mut self, ticket: RequestTicket, succeeded: bool) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.state = if succeeded {
            RequestState::Succeeded
        } else {
            RequestState::Failed
        };
        true
    }

    pub fn cancel(&mut self) {
        if self.is_in_flight() {
            self.generation += 1;
            self.state = RequestState::Idle;
        }
    }
}
