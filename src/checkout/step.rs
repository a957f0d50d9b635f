use std::future::Future;
use std::pin::Pin;

use crate::browser::PageSession;
use crate::errors::RestockError;
use crate::models::{CustomerProfile, StepStatus};

use super::context::CheckoutContext;

pub type StepFuture<'a> = Pin<Box<dyn Future<Output = Result<StepStatus, RestockError>> + Send + 'a>>;

/// Body of one checkout step. Plain function pointers keep site definitions
/// static data; everything a step needs arrives through its arguments.
pub type StepFn = for<'a> fn(
    &'a dyn PageSession,
    &'a CustomerProfile,
    &'a mut CheckoutContext,
) -> StepFuture<'a>;

/// One unit of checkout progress with a single pass/fail outcome. A step may
/// perform several sub-interactions but reports one aggregate result.
pub struct Step {
    pub name: &'static str,
    /// Marks the step that submits payment; the pre-submission milestone
    /// fires immediately before it runs.
    pub final_submission: bool,
    run: StepFn,
}

impl Step {
    pub fn new(name: &'static str, run: StepFn) -> Self {
        Self {
            name,
            final_submission: false,
            run,
        }
    }

    pub fn final_submission(name: &'static str, run: StepFn) -> Self {
        Self {
            name,
            final_submission: true,
            run,
        }
    }

    pub async fn execute(
        &self,
        session: &dyn PageSession,
        profile: &CustomerProfile,
        context: &mut CheckoutContext,
    ) -> Result<StepStatus, RestockError> {
        (self.run)(session, profile, context).await
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("final_submission", &self.final_submission)
            .finish()
    }
}
