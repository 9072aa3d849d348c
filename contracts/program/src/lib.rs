//! AAKit Program - EntryPoint
//!
//! The coordinator that accepts batches of operations, drives account and
//! sponsor validation, escrows prefunds, executes the operations and
//! settles fees. It also keeps the deposit and stake ledger sponsors and
//! accounts pay from.

pub mod actions;
pub mod config;
pub mod entry_point;
pub mod error;
pub mod events;
pub mod instruction;
pub mod processor;
pub mod stake_manager;

pub use actions::OperationOutcome;
pub use config::EntryPointConfig;
pub use entry_point::EntryPoint;
pub use error::EntryPointError;
pub use events::Event;
pub use instruction::EntryPointInstruction;
pub use processor::process_instruction;
pub use stake_manager::StakeManager;
