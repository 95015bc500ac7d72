use aegis_core::policy::{Action, Decision};
use tracing::info;

/// Policy Enforcement Point: executes the action and obligation mandated by
/// a decision. Returns whether enforcement succeeded.
pub trait Pep: Send + Sync {
    fn enforce(&self, decision: Decision, action: &Action, obligation: &str) -> bool;
}

/// Reference enforcement point that logs what it would execute.
pub struct LogPep;

impl Pep for LogPep {
    fn enforce(&self, decision: Decision, action: &Action, obligation: &str) -> bool {
        info!(
            decision = decision.as_u8(),
            action = %action.value,
            start_time = action.start_time,
            stop_time = action.stop_time,
            obligation,
            "enforcing decision"
        );
        true
    }
}
