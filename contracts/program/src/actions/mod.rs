//! Instruction handlers of the coordinator.

pub mod deposit;
pub mod handle_ops;
pub mod stake;

pub use handle_ops::OperationOutcome;
