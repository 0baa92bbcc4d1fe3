// SPDX-License-Identifier: MIT OR Apache-2.0
//! Facade over the twirk error taxonomy and server hooks.
//!
//! Generated servers and clients depend on this crate; the error types are
//! re-exported at the root and the instrumentation lives under [`hooks`].
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub use twirk_error::{
    ErrorBody, ErrorCode, META_ARGUMENT, META_CAUSE, NAMESPACE, TwirkError, UnknownErrorCode,
    is_valid_error_code, server_http_status,
};

/// Server hooks and statsd instrumentation.
pub use twirk_hooks as hooks;
