// SPDX-License-Identifier: MIT OR Apache-2.0
//! The closed error-code vocabulary and its HTTP projection.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Machine-readable twirk error code.
///
/// Most codes follow gRPC status semantics. Each variant serialises to a
/// `snake_case` string that generated clients, servers and peers in other
/// languages match on literally, so the spellings never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The operation was cancelled, typically by the caller.
    Canceled,
    /// Unknown error, e.g. raised by an API that does not return enough
    /// information to classify it.
    Unknown,
    /// The client specified an argument that is invalid regardless of the
    /// state of the system (malformed file name, required argument, number
    /// out of range).
    InvalidArgument,
    /// The client's request could not be decoded, either because it was
    /// encoded improperly or because client and server disagree on the
    /// message format.
    Malformed,
    /// The operation expired before completion. For state-changing
    /// operations this may be returned even if the operation completed.
    DeadlineExceeded,
    /// Some requested entity was not found.
    NotFound,
    /// The requested URL path was not routable to a service and method.
    ///
    /// Returned by the generated server. Applications should use
    /// [`ErrorCode::NotFound`] or [`ErrorCode::Unimplemented`] instead.
    BadRoute,
    /// An attempt to create an entity failed because one already exists.
    AlreadyExists,
    /// The caller is identified but not allowed to run the operation. Use
    /// [`ErrorCode::Unauthenticated`] when the caller cannot be identified.
    PermissionDenied,
    /// The request lacks valid authentication credentials.
    Unauthenticated,
    /// Some resource has been exhausted, such as a per-user quota or disk
    /// space.
    ResourceExhausted,
    /// The system is not in the state required for the operation, e.g.
    /// `rmdir` on a non-empty directory.
    FailedPrecondition,
    /// The operation was aborted, typically because of a concurrency issue
    /// such as a sequencer check failure or a transaction abort.
    Aborted,
    /// The operation was attempted past the valid range, e.g. reading past
    /// the end of a paginated collection.
    ///
    /// Unlike [`ErrorCode::InvalidArgument`] this may be fixed by a change in
    /// system state. Prefer it over [`ErrorCode::FailedPrecondition`] when
    /// both apply, so callers iterating a space can detect the end.
    OutOfRange,
    /// The operation is not implemented, supported or enabled.
    Unimplemented,
    /// An invariant of the underlying system was broken. This can also
    /// happen on the client, e.g. when a response fails to parse.
    Internal,
    /// The service is currently unavailable. Most likely transient and may
    /// be corrected by retrying with a backoff.
    Unavailable,
    /// Unrecoverable data loss or corruption.
    DataLoss,
    /// The zero value. Recognised by the status table but must not be used
    /// to build an error.
    #[serde(rename = "")]
    NoError,
}

impl ErrorCode {
    /// Every named code in declaration order. [`ErrorCode::NoError`] is not
    /// included.
    pub const ALL: &'static [ErrorCode] = &[
        Self::Canceled,
        Self::Unknown,
        Self::InvalidArgument,
        Self::Malformed,
        Self::DeadlineExceeded,
        Self::NotFound,
        Self::BadRoute,
        Self::AlreadyExists,
        Self::PermissionDenied,
        Self::Unauthenticated,
        Self::ResourceExhausted,
        Self::FailedPrecondition,
        Self::Aborted,
        Self::OutOfRange,
        Self::Unimplemented,
        Self::Internal,
        Self::Unavailable,
        Self::DataLoss,
    ];

    /// Wire spelling of the code (e.g. `"not_found"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Canceled => "canceled",
            Self::Unknown => "unknown",
            Self::InvalidArgument => "invalid_argument",
            Self::Malformed => "malformed",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::NotFound => "not_found",
            Self::BadRoute => "bad_route",
            Self::AlreadyExists => "already_exists",
            Self::PermissionDenied => "permission_denied",
            Self::Unauthenticated => "unauthenticated",
            Self::ResourceExhausted => "resource_exhausted",
            Self::FailedPrecondition => "failed_precondition",
            Self::Aborted => "aborted",
            Self::OutOfRange => "out_of_range",
            Self::Unimplemented => "unimplemented",
            Self::Internal => "internal",
            Self::Unavailable => "unavailable",
            Self::DataLoss => "data_loss",
            Self::NoError => "",
        }
    }

    /// Parse a wire spelling. Returns `None` for strings outside the table.
    pub fn parse(code: &str) -> Option<Self> {
        let parsed = match code {
            "canceled" => Self::Canceled,
            "unknown" => Self::Unknown,
            "invalid_argument" => Self::InvalidArgument,
            "malformed" => Self::Malformed,
            "deadline_exceeded" => Self::DeadlineExceeded,
            "not_found" => Self::NotFound,
            "bad_route" => Self::BadRoute,
            "already_exists" => Self::AlreadyExists,
            "permission_denied" => Self::PermissionDenied,
            "unauthenticated" => Self::Unauthenticated,
            "resource_exhausted" => Self::ResourceExhausted,
            "failed_precondition" => Self::FailedPrecondition,
            "aborted" => Self::Aborted,
            "out_of_range" => Self::OutOfRange,
            "unimplemented" => Self::Unimplemented,
            "internal" => Self::Internal,
            "unavailable" => Self::Unavailable,
            "data_loss" => Self::DataLoss,
            "" => Self::NoError,
            _ => return None,
        };
        Some(parsed)
    }

    /// HTTP response status the server uses for this code.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Canceled => 408, // Request Timeout
            Self::Unknown => 500, // Internal Server Error
            Self::InvalidArgument => 400, // Bad Request
            Self::Malformed => 400, // Bad Request
            Self::DeadlineExceeded => 408, // Request Timeout
            Self::NotFound => 404, // Not Found
            Self::BadRoute => 404, // Not Found
            Self::AlreadyExists => 409, // Conflict
            Self::PermissionDenied => 403, // Forbidden
            Self::Unauthenticated => 401, // Unauthorized
            Self::ResourceExhausted => 403, // Forbidden
            Self::FailedPrecondition => 412, // Precondition Failed
            Self::Aborted => 409, // Conflict
            Self::OutOfRange => 400, // Bad Request
            Self::Unimplemented => 501, // Not Implemented
            Self::Internal => 500, // Internal Server Error
            Self::Unavailable => 503, // Service Unavailable
            Self::DataLoss => 500, // Internal Server Error
            Self::NoError => 200, // OK
        }
    }

    /// Code a client assigns to an HTTP response that did not come from a
    /// twirk server, e.g. an error page from a proxy or load balancer.
    pub fn from_intermediary_status(status: u16) -> Self {
        if is_http_redirect(status) {
            // Redirects are never followed by clients.
            return Self::Internal;
        }
        match status {
            400 => Self::Internal,
            401 => Self::Unauthenticated,
            403 => Self::PermissionDenied,
            404 => Self::BadRoute,
            429 | 502 | 503 | 504 => Self::Unavailable,
            _ => Self::Unknown,
        }
    }
}

pub(crate) fn is_http_redirect(status: u16) -> bool {
    (300..400).contains(&status)
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for ErrorCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Returned by [`ErrorCode::from_str`] for strings outside the code table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown twirk error code {0:?}")]
pub struct UnknownErrorCode(pub String);

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownErrorCode(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Status table over arbitrary strings
// ---------------------------------------------------------------------------

/// Map any code string to the HTTP status a server responds with.
///
/// Total over all strings: the sentinel `""` maps to 200, every named code
/// maps to its fixed status, and anything else maps to 0.
pub fn server_http_status(code: impl AsRef<str>) -> u16 {
    ErrorCode::parse(code.as_ref()).map_or(0, |c| c.http_status())
}

/// `true` if the status table recognises `code`.
///
/// The sentinel `""` is recognised, so it is valid here even though it must
/// not be used to construct an error.
pub fn is_valid_error_code(code: impl AsRef<str>) -> bool {
    server_http_status(code) != 0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
