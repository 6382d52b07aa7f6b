//! Insight trigger policy and request-state tracking.

mod policy;
mod request;

pub use policy::{InsightPolicy, InsightReply, InsightSource, INSIGHT_TRIGGER_THRESHOLD};
pub use request::{RequestState, RequestTicket, RequestTracker};
