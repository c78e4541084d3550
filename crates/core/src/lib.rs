//! Core types and policy for order-guard
//!
//! This crate contains the domain types shared across all other crates and the
//! pure recovery-policy functions evaluated over them.

mod classify;
mod clock;
pub mod constants;
mod env_config;
mod error;
mod error_kind;
mod pattern;
pub mod policy;
mod record;
mod snapshot;

pub use classify::classify_failure;
pub use clock::{Clock, ManualClock, SystemClock};
pub use env_config::env_parse_with_default;
pub use error::*;
pub use error_kind::ErrorKind;
pub use pattern::{ErrorPattern, PatternKey};
pub use policy::RetryDecision;
pub use record::{ErrorRecord, generate_error_id};
pub use snapshot::{PersistedSnapshot, SNAPSHOT_VERSION};
