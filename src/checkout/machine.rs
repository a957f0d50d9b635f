use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::audit::Artifacts;
use crate::browser::PageSession;
use crate::errors::RestockError;
use crate::models::{CustomerProfile, StepResult, StepStatus};
use crate::notify::Milestones;

use super::context::CheckoutContext;
use super::step::Step;

/// Drive an ordered step sequence to completion.
///
/// Steps advance strictly in order; the first failure halts the machine and
/// surfaces as a `Step` error naming the step. There is no retry and no
/// rollback: partially filled forms are abandoned as-is, and a re-run is
/// only safe from a fresh page load.
///
/// Cancellation is honored between steps, never mid-step: once a step has
/// started its sub-interactions it runs to completion.
pub async fn run_checkout(
    session: &dyn PageSession,
    profile: &CustomerProfile,
    steps: &[Step],
    milestones: &Milestones,
    artifacts: &Artifacts,
    cancel: &CancellationToken,
) -> Result<Vec<StepResult>, RestockError> {
    let mut context = CheckoutContext::new();
    let mut trail = Vec::with_capacity(steps.len());

    for step in steps {
        if cancel.is_cancelled() {
            return Err(RestockError::Cancelled(format!(
                "before step '{}'",
                step.name
            )));
        }

        if step.final_submission {
            milestones.final_details().await;
            artifacts.capture(session, "final_payment").await;
        }

        info!(step = step.name, "Running checkout step");
        match step.execute(session, profile, &mut context).await {
            Ok(StepStatus::Completed) => {
                trail.push(StepResult {
                    step: step.name.to_string(),
                    outcome: "completed".to_string(),
                });
            }
            Ok(StepStatus::Skipped) => {
                info!(step = step.name, "Step skipped");
                trail.push(StepResult {
                    step: step.name.to_string(),
                    outcome: "skipped".to_string(),
                });
            }
            Err(RestockError::Step { step, reason }) => {
                warn!(step = %step, reason = %reason, "Checkout step failed");
                return Err(RestockError::Step { step, reason });
            }
            Err(e) => {
                warn!(step = step.name, error = %e, "Checkout step failed");
                return Err(RestockError::step(step.name, e.to_string()));
            }
        }
    }

    Ok(trail)
}
