// SPDX-License-Identifier: MIT OR Apache-2.0
//! Portable error codes and error values for twirk RPC services.
//!
//! Service implementations return a [`TwirkError`]; the generated server
//! maps its [`ErrorCode`] to an HTTP status with [`server_http_status`] and
//! writes the code, message and metadata as an [`ErrorBody`]. Generated
//! clients decode the same body back into a [`TwirkError`], so callers can
//! branch on [`TwirkError::code`]:
//!
//! ```
//! use twirk_error::{ErrorCode, TwirkError};
//!
//! fn check_order(order: &str) -> Result<(), TwirkError> {
//!     if order != "ASC" && order != "DESC" {
//!         return Err(TwirkError::invalid_argument("order", "must be ASC or DESC"));
//!     }
//!     Ok(())
//! }
//!
//! match check_order("SIDEWAYS") {
//!     Err(err) if err.code() == ErrorCode::InvalidArgument => {
//!         assert_eq!(err.meta("argument"), "order");
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```
//!
//! Clients may also produce [`ErrorCode::Internal`] errors when something
//! fails on the server, the network, or in the client itself (e.g. a
//! response that does not parse).
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod code;
mod error;
mod wire;

pub use code::{ErrorCode, UnknownErrorCode, is_valid_error_code, server_http_status};
pub use error::{META_ARGUMENT, META_CAUSE, NAMESPACE, TwirkError};
pub use wire::ErrorBody;
