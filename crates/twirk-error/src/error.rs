// SPDX-License-Identifier: MIT OR Apache-2.0
//! The twirk error value and its constructors.

use crate::code::ErrorCode;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Prefix of the canonical display form.
pub const NAMESPACE: &str = "twirk";

/// Metadata key holding the argument name on invalid-argument errors.
pub const META_ARGUMENT: &str = "argument";

/// Metadata key holding the cause's type name on wrapped internal errors.
pub const META_CAUSE: &str = "cause";

static EMPTY_META: BTreeMap<String, String> = BTreeMap::new();

type Cause = Arc<dyn StdError + Send + Sync + 'static>;

// ---------------------------------------------------------------------------
// TwirkError
// ---------------------------------------------------------------------------

/// An error returned from, or received by, a twirk service call.
///
/// Values are immutable once built. [`TwirkError::with_meta`] derives a new
/// value and leaves the receiver untouched, so one error can be shared by
/// many threads that each attach their own metadata.
///
/// Only the code, message and metadata are portable. An error built with
/// [`TwirkError::internal_with`] also carries the original cause for local
/// diagnostics; it is reachable through [`TwirkError::cause`] and nothing
/// else.
///
/// ```
/// use twirk_error::{ErrorCode, TwirkError};
///
/// let err = TwirkError::invalid_argument("order", "must be ASC or DESC")
///     .with_meta("request_id", "r-42");
/// assert_eq!(err.code(), ErrorCode::InvalidArgument);
/// assert_eq!(err.meta("argument"), "order");
/// assert_eq!(err.to_string(), "twirk error invalid_argument: order must be ASC or DESC");
/// ```
#[derive(Clone)]
pub struct TwirkError {
    code: ErrorCode,
    msg: String,
    meta: Option<Arc<BTreeMap<String, String>>>,
    cause: Option<Cause>,
}

impl TwirkError {
    /// Generic constructor.
    ///
    /// `code` may be an [`ErrorCode`] or any string. A string outside the
    /// code table produces an [`ErrorCode::Internal`] error with message
    /// `"invalid error type {code}"` instead; construction never fails.
    pub fn new(code: impl AsRef<str>, msg: impl Into<String>) -> Self {
        let raw = code.as_ref();
        match ErrorCode::parse(raw) {
            Some(code) => Self {
                code,
                msg: msg.into(),
                meta: None,
                cause: None,
            },
            None => {
                warn!(code = %raw, "invalid twirk error code, substituting internal");
                Self {
                    code: ErrorCode::Internal,
                    msg: format!("invalid error type {raw}"),
                    meta: None,
                    cause: None,
                }
            }
        }
    }

    /// A [`ErrorCode::NotFound`] error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, msg)
    }

    /// A [`ErrorCode::InvalidArgument`] error for an argument with a bad
    /// format, an out-of-range number, a bad option and so on.
    ///
    /// The message reads `"{argument} {validation_msg}"` and the argument
    /// name is also stored under the `argument` metadata key.
    pub fn invalid_argument(argument: &str, validation_msg: &str) -> Self {
        Self::new(
            ErrorCode::InvalidArgument,
            format!("{argument} {validation_msg}"),
        )
        .with_meta(META_ARGUMENT, argument)
    }

    /// An invalid-argument error for an argument that must have a non-zero
    /// value.
    pub fn required_argument(argument: &str) -> Self {
        Self::invalid_argument(argument, "is required")
    }

    /// A [`ErrorCode::Internal`] error: something bad or unexpected happened.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }

    /// Wrap an unexpected error from another API as an internal error.
    ///
    /// The message is the cause's `Display` output and the cause's type name
    /// is stored under the `cause` metadata key. The cause itself never
    /// leaves the process; use [`TwirkError::cause`] to inspect it locally.
    ///
    /// `E` must be a concrete error type. A `Box<dyn Error + Send + Sync>`
    /// does not implement [`std::error::Error`] itself; wrap it in a named
    /// error type first, or the `cause` key records the wrapper's name.
    pub fn internal_with<E>(cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let wrapped = Self::new(ErrorCode::Internal, cause.to_string())
            .with_meta(META_CAUSE, std::any::type_name::<E>());
        Self {
            cause: Some(Arc::new(cause)),
            ..wrapped
        }
    }

    /// Client-side error for an HTTP response that came from an intermediary
    /// (proxy, load balancer) rather than a twirk server.
    ///
    /// `body_or_location` is stored as `location` for redirects and as
    /// `body` otherwise.
    pub fn from_intermediary(status: u16, msg: impl Into<String>, body_or_location: &str) -> Self {
        let err = Self::new(ErrorCode::from_intermediary_status(status), msg)
            .with_meta("http_error_from_intermediary", "true")
            .with_meta("status_code", status.to_string());
        if crate::code::is_http_redirect(status) {
            err.with_meta("location", body_or_location)
        } else {
            err.with_meta("body", body_or_location)
        }
    }

    /// The error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable, unstructured message.
    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// HTTP status a server responds with for this error.
    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Return a copy of this error with `key` set to `val`, overwriting any
    /// previous value. The receiver is not modified.
    #[must_use]
    pub fn with_meta(&self, key: impl Into<String>, val: impl Into<String>) -> Self {
        let mut meta = self.meta.as_deref().cloned().unwrap_or_default();
        meta.insert(key.into(), val.into());
        Self {
            code: self.code,
            msg: self.msg.clone(),
            meta: Some(Arc::new(meta)),
            cause: self.cause.clone(),
        }
    }

    pub(crate) fn with_meta_map(self, meta: Arc<BTreeMap<String, String>>) -> Self {
        Self {
            meta: Some(meta),
            ..self
        }
    }

    /// Stored metadata value for `key`, or `""` if unset.
    ///
    /// An unset key and a key explicitly set to `""` are indistinguishable.
    pub fn meta(&self, key: &str) -> &str {
        self.meta_map().get(key).map_or("", String::as_str)
    }

    /// All metadata attached to the error. Empty if none was attached.
    pub fn meta_map(&self) -> &BTreeMap<String, String> {
        self.meta.as_deref().unwrap_or(&EMPTY_META)
    }

    /// The original error wrapped by [`TwirkError::internal_with`].
    ///
    /// Local only: the cause is never serialised, so an error received from
    /// a remote peer never has one.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

impl fmt::Display for TwirkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{NAMESPACE} error {}: {}", self.code, self.msg)
    }
}

impl fmt::Debug for TwirkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("TwirkError");
        d.field("code", &self.code);
        d.field("msg", &self.msg);
        if !self.meta_map().is_empty() {
            d.field("meta", self.meta_map());
        }
        if let Some(ref cause) = self.cause {
            d.field("cause", &cause.to_string());
        }
        d.finish()
    }
}

// `source` stays `None`: error-chain reporters must not reach the cause.
impl StdError for TwirkError {}

/// Compares the portable projection. The cause is ignored.
impl PartialEq for TwirkError {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.msg == other.msg && self.meta_map() == other.meta_map()
    }
}

impl Eq for TwirkError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
