use tracing::{debug, warn};

use crate::models::{AppointmentState, SchedulingError};

/// The appointment state machine.
///
/// Pending is the only entry state (set by `try_reserve`). Attended and
/// Cancelled are terminal: any attempted transition out of them fails with
/// `InvalidTransition` rather than silently succeeding, because the admin UI
/// relies on that error to show "already cancelled" / "cannot modify a
/// completed appointment" messaging.
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    pub fn valid_transitions(&self, current: AppointmentState) -> &'static [AppointmentState] {
        match current {
            AppointmentState::Pending => {
                &[AppointmentState::Confirmed, AppointmentState::Cancelled]
            }
            AppointmentState::Confirmed => {
                &[AppointmentState::Attended, AppointmentState::Cancelled]
            }
            AppointmentState::Attended | AppointmentState::Cancelled => &[],
        }
    }

    pub fn validate_transition(
        &self,
        current: AppointmentState,
        target: AppointmentState,
    ) -> Result<(), SchedulingError> {
        debug!("Validating state transition {} -> {}", current, target);

        if !self.valid_transitions(current).contains(&target) {
            warn!("Invalid state transition attempted: {} -> {}", current, target);
            return Err(SchedulingError::InvalidTransition {
                from: current,
                to: target,
            });
        }

        Ok(())
    }

    /// Cancellation is the only transition carrying a payload; the reason
    /// must not be blank. The longer minimum the admin UI applies is
    /// enforced at the HTTP boundary.
    pub fn validate_cancellation_reason(&self, reason: Option<&str>) -> Result<String, SchedulingError> {
        match reason.map(str::trim) {
            Some(r) if !r.is_empty() => Ok(r.to_string()),
            _ => Err(SchedulingError::Validation(
                "A cancellation reason is required".to_string(),
            )),
        }
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
