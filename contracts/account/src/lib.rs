//! AAKit Account
//!
//! `PluginAccount` validates operations for its coordinator in one of three
//! modes (owner signature, delegated module, registered plugin) and executes
//! owner-authorized calls. `AccountFactory` deploys accounts at
//! counterfactual addresses; `OwnerSetModule` is a multi-owner validation
//! module.

pub mod account;
pub mod error;
pub mod factory;
pub mod module;
pub mod processor;
pub mod validation;

pub use account::PluginAccount;
pub use error::AccountError;
pub use factory::AccountFactory;
pub use module::OwnerSetModule;
