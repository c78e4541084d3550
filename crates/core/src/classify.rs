//! Map an observed transport/backend failure onto an [`ErrorKind`].
//!
//! An explicit HTTP status wins; otherwise a status embedded in the message
//! ("status 503", "HTTP/1.1 401") is used; otherwise message wording decides.

use std::sync::LazyLock;

use regex::Regex;

use crate::error_kind::ErrorKind;

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static EMBEDDED_STATUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:status(?:\s+code)?|http(?:/\d(?:\.\d)?)?|code)\s*[:=]?\s*([1-5]\d{2})\b")
        .unwrap()
});

const AUTH_MARKERS: &[&str] = &[
    "unauthorized",
    "forbidden",
    "jwt expired",
    "invalid token",
    "session expired",
    "not authenticated",
    "permission denied",
];

const CONFLICT_MARKERS: &[&str] = &[
    "conflict",
    "version mismatch",
    "optimistic lock",
    "stale version",
    "was modified by another",
    "concurrent update",
];

const TIMEOUT_MARKERS: &[&str] = &["timed out", "timeout", "deadline exceeded"];

const SERVER_MARKERS: &[&str] =
    &["internal server error", "bad gateway", "service unavailable", "server error"];

const NETWORK_MARKERS: &[&str] = &[
    "network",
    "connection refused",
    "connection reset",
    "connection closed",
    "dns",
    "fetch failed",
    "failed to fetch",
    "unreachable",
    "offline",
];

fn kind_for_status(status: u16) -> Option<ErrorKind> {
    match status {
        401 | 403 => Some(ErrorKind::Auth),
        409 | 412 => Some(ErrorKind::Conflict),
        408 | 504 => Some(ErrorKind::Timeout),
        500..=599 => Some(ErrorKind::Server),
        _ => None,
    }
}

fn embedded_status(message: &str) -> Option<u16> {
    EMBEDDED_STATUS.captures(message).and_then(|c| c.get(1)).and_then(|m| m.as_str().parse().ok())
}

/// Classify a failure reported by the order-update workflow.
#[must_use]
pub fn classify_failure(message: &str, http_status: Option<u16>) -> ErrorKind {
    if let Some(kind) = http_status.or_else(|| embedded_status(message)).and_then(kind_for_status)
    {
        return kind;
    }

    let lower = message.to_lowercase();
    let has_any = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));

    if has_any(AUTH_MARKERS) {
        ErrorKind::Auth
    // Timeout before conflict: "lock wait timeout" is still a timeout.
    } else if has_any(TIMEOUT_MARKERS) {
        ErrorKind::Timeout
    } else if has_any(CONFLICT_MARKERS) {
        ErrorKind::Conflict
    } else if has_any(SERVER_MARKERS) {
        ErrorKind::Server
    } else if has_any(NETWORK_MARKERS) {
        ErrorKind::Network
    } else {
        ErrorKind::Unknown
    }
}
