//! When to ask the AI service for a fresh actionable insight.
//!
//! The trigger is level-based: as long as enough slips have piled up since
//! the last recorded insight and nothing is outstanding, a request may go out.

use chrono::TimeZone;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::request::{RequestState, RequestTicket, RequestTracker};
use crate::account::Plan;
use crate::habit::{HabitState, ProgressEngine};

/// Give-ins since the last insight that make a new one due.
pub const INSIGHT_TRIGGER_THRESHOLD: u32 = 3;

/// Where an insight text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightSource {
    /// Produced by the AI service.
    Generated,
    /// Too few annotated slips to analyze; no call was made.
    NotEnoughData,
    /// The service failed; a canned line stands in.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightReply {
    pub text: String,
    pub source: InsightSource,
}

impl InsightReply {
    pub fn is_recordable(&self) -> bool {
        self.source != InsightSource::Fallback
    }
}

#[derive(Debug)]
pub struct InsightPolicy {
    threshold: u32,
    tracker: RequestTracker,
}

impl Default for InsightPolicy {
    fn default() -> Self {
        Self::new(INSIGHT_TRIGGER_THRESHOLD)
    }
}

impl InsightPolicy {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            tracker: RequestTracker::default(),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn request_state(&self) -> RequestState {
        self.tracker.state()
    }

    pub fn is_due(&self, state: &HabitState) -> bool {
        state.give_ins_since_last_insight >= self.threshold
    }

    /// Insights are a paid feature.
    pub fn should_request(&self, state: &HabitState, plan: Plan) -> bool {
        plan.is_paid() && self.is_due(state) && !self.tracker.is_in_flight()
    }

    /// Claim the request slot if an insight is due.
    pub fn begin(&mut self, state: &HabitState, plan: Plan) -> Option<RequestTicket> {
        if !self.should_request(state, plan) {
            return None;
        }
        let ticket = self.tracker.begin();
        debug!(
            pending = state.give_ins_since_last_insight,
            "insight request started"
        );
        ticket
    }

    /// Settle a request. Recordable replies are stored (resetting the
    /// counter); a fallback leaves the counter so the next pass retries.
    ///
    /// Returns true when the reply was recorded.
    pub fn complete<Tz: TimeZone>(
        &mut self,
        engine: &ProgressEngine<Tz>,
        state: &mut HabitState,
        ticket: RequestTicket,
        reply: &InsightReply,
        now_ms: i64,
    ) -> bool {
        let recordable = reply.is_recordable();
        if !self.tracker.finish(ticket, recordable) {
            debug!("ignoring stale insight completion");
            return false;
        }
        if !recordable {
            warn!("insight generation failed; will retry on next trigger");
            return false;
        }
        engine.record_insight(state, reply.text.clone(), now_ms);
        true
    }

    pub fn cancel(&mut self) {
        self.tracker.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::GiveInDetails;
    use chrono::Utc;

    fn generated(text: &str) -> InsightReply {
        InsightReply {
            text: text.into(),
            source: InsightSource::Generated,
        }
    }

    fn slip(engine: &ProgressEngine<Utc>, state: &mut HabitState, n: i64) {
        engine.apply_give_in(state, GiveInDetails::new("Bored", "couch", n), n);
    }

    #[test]
    fn fires_when_counter_reaches_three() {
        let engine = ProgressEngine::with_timezone(Utc);
        let policy = InsightPolicy::default();
        let mut state = HabitState::default();

        slip(&engine, &mut state, 1);
        slip(&engine, &mut state, 2);
        assert!(!policy.should_request(&state, Plan::Monthly));
        slip(&engine, &mut state, 3);
        assert!(policy.should_request(&state, Plan::Monthly));
    }

    #[test]
    fn free_plan_never_requests() {
        let policy = InsightPolicy::default();
        let state = HabitState {
            give_ins_since_last_insight: 9,
            ..HabitState::default()
        };
        assert!(!policy.should_request(&state, Plan::Free));
    }

    #[test]
    fn success_records_and_resets() {
        let engine = ProgressEngine::with_timezone(Utc);
        let mut policy = InsightPolicy::default();
        let mut state = HabitState {
            give_ins_since_last_insight: 3,
            ..HabitState::default()
        };

        let ticket = policy.begin(&state, Plan::Lifetime).unwrap();
        assert!(policy.begin(&state, Plan::Lifetime).is_none());
        assert!(policy.complete(&engine, &mut state, ticket, &generated("Walk it off."), 99));

        assert_eq!(state.give_ins_since_last_insight, 0);
        assert_eq!(state.ai_insight.text, "Walk it off.");
        assert_eq!(policy.request_state(), RequestState::Succeeded);
        assert!(!policy.should_request(&state, Plan::Lifetime));
    }

    #[test]
    fn fallback_keeps_counter_for_retry() {
        let engine = ProgressEngine::with_timezone(Utc);
        let mut policy = InsightPolicy::default();
        let mut state = HabitState {
            give_ins_since_last_insight: 4,
            ..HabitState::default()
        };
        let ticket = policy.begin(&state, Plan::Monthly).unwrap();
        let reply = InsightReply {
            text: "later".into(),
            source: InsightSource::Fallback,
        };
        assert!(!policy.complete(&engine, &mut state, ticket, &reply, 1));
        assert_eq!(state.give_ins_since_last_insight, 4);
        assert_eq!(policy.request_state(), RequestState::Failed);
        assert!(policy.should_request(&state, Plan::Monthly));
    }

    #[test]
    fn stale_completion_after_cancel_is_ignored() {
        let engine = ProgressEngine::with_timezone(Utc);
        let mut policy = InsightPolicy::default();
        let mut state = HabitState {
            give_ins_since_last_insight: 3,
            ..HabitState::default()
        };
        let ticket = policy.begin(&state, Plan::Monthly).unwrap();
        policy.cancel();
        assert!(!policy.complete(&engine, &mut state, ticket, &generated("x"), 1));
        assert_eq!(state.give_ins_since_last_insight, 3);
        assert!(state.ai_insight.text.is_empty());
    }
}
