//! Failure classification enum.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Kind of failure observed by the admin order-update workflow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Transport failure before a response arrived
    Network,
    /// Optimistic-lock or version mismatch
    Conflict,
    /// Request exceeded its deadline
    Timeout,
    /// Operator lacks a valid session or permission
    Auth,
    /// Backend reported an internal failure
    Server,
    /// Anything the caller could not classify
    Unknown,
}

impl ErrorKind {
    pub const ALL_VARIANTS_STR: &'static str = "network|conflict|timeout|auth|server|unknown";

    pub const ALL_VARIANTS: &'static [ErrorKind] = &[
        ErrorKind::Network,
        ErrorKind::Conflict,
        ErrorKind::Timeout,
        ErrorKind::Auth,
        ErrorKind::Server,
        ErrorKind::Unknown,
    ];

    /// Returns the string representation of the error kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Network => "network",
            Self::Conflict => "conflict",
            Self::Timeout => "timeout",
            Self::Auth => "auth",
            Self::Server => "server",
            Self::Unknown => "unknown",
        }
    }

    /// Kinds that need human attention and must survive a restart until resolved.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        matches!(*self, Self::Conflict | Self::Auth)
    }

    /// Kinds caused by the environment rather than the request itself.
    /// Only these are ever eligible for automatic retry.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(*self, Self::Network | Self::Timeout)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "network" => Ok(Self::Network),
            "conflict" => Ok(Self::Conflict),
            "timeout" => Ok(Self::Timeout),
            "auth" => Ok(Self::Auth),
            "server" => Ok(Self::Server),
            "unknown" => Ok(Self::Unknown),
            other => Err(CoreError::InvalidErrorKind(other.to_owned())),
        }
    }
}
