//! Service layer for order-guard
//!
//! Owns the admin order-update error store: records, the persistent-error
//! index, the pattern index, and the recovery queries evaluated over them.

#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod config;
mod error;
mod error_store;
mod shared;

pub use config::ErrorStoreConfig;
pub use error::ServiceError;
pub use error_store::{ErrorStats, ErrorStore};
pub use shared::SharedErrorStore;
