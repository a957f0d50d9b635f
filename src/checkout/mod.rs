pub mod context;
pub mod machine;
pub mod payment;
pub mod step;

pub use context::CheckoutContext;
pub use machine::run_checkout;
pub use payment::{split_expiry, Expiry};
pub use step::{Step, StepFn, StepFuture};
