pub mod account;
pub mod actions;
pub mod operation;
pub mod policy;
pub mod session;
pub mod sponsor;
