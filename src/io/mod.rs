/// CSV trace export.
pub mod export;
/// JSON comparison export.
pub mod json;
