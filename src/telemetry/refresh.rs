use tracing::{Level, event};
use uuid::Uuid;

/// Structured events describing one refresh cycle, correlated by a cycle id.
#[derive(Clone, Debug)]
pub struct RefreshTelemetry {
    cycle_id: Uuid,
    context: String,
}

impl RefreshTelemetry {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            cycle_id: Uuid::new_v4(),
            context: context.into(),
        }
    }

    pub fn cycle_id(&self) -> Uuid {
        self.cycle_id
    }

    pub fn emit_start(&self) {
        event!(
            Level::INFO,
            cycle_id = %self.cycle_id,
            context = %self.context,
            "refresh.start"
        );
    }

    pub fn emit_success(&self, waiters: usize) {
        event!(
            Level::INFO,
            cycle_id = %self.cycle_id,
            context = %self.context,
            waiters,
            "refresh.success"
        );
    }

    pub fn emit_failure(&self, reason: &str, waiters: usize) {
        event!(
            Level::ERROR,
            cycle_id = %self.cycle_id,
            context = %self.context,
            waiters,
            reason,
            "refresh.failure"
        );
    }

    pub fn emit_teardown(&self) {
        event!(
            Level::WARN,
            cycle_id = %self.cycle_id,
            context = %self.context,
            "session.teardown"
        );
    }
}
