/// Interval iteration over one wrapped day.
pub mod clock;
pub mod metrics;
pub mod orchestrator;
pub mod stepper;
pub mod types;
/// Conservation and capacity checks for proposed decisions.
pub mod validator;
