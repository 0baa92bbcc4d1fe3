// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-request data visible to server hooks.

use std::time::{Duration, Instant};
use twirk_error::TwirkError;

/// What a server knows about one request while it is being served.
///
/// The method is filled in once the request is routed, and the status once
/// a response has been chosen.
#[derive(Debug, Clone)]
pub struct RequestContext {
    package: String,
    service: String,
    method: Option<String>,
    status_code: Option<u16>,
    started_at: Instant,
}

impl RequestContext {
    /// Start tracking a request to `package.service`.
    pub fn new(package: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            service: service.into(),
            method: None,
            status_code: None,
            started_at: Instant::now(),
        }
    }

    /// Protobuf package of the service.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Method name, once routed.
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// HTTP status of the response, once chosen.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Time since the request was received.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Record the routed method name.
    pub fn set_method(&mut self, method: impl Into<String>) {
        self.method = Some(method.into());
    }

    /// Record the response status.
    pub fn set_status(&mut self, status: u16) {
        self.status_code = Some(status);
    }

    /// Record the status the server answers `err` with.
    pub fn set_error(&mut self, err: &TwirkError) {
        self.set_status(err.http_status());
    }
}
