// SPDX-License-Identifier: MIT OR Apache-2.0
//! Server hooks that report request counts and latencies to a statsd sink.

use crate::config::HooksConfig;
use crate::context::RequestContext;
use crate::hooks::ServerHooks;
use std::time::Duration;
use tracing::warn;
use twirk_error::TwirkError;

/// Metric name prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "twirk";

/// Method segment used when a response is sent for an unrouted request.
const UNKNOWN_METHOD: &str = "unknown";

// ---------------------------------------------------------------------------
// Statter
// ---------------------------------------------------------------------------

/// Errors a [`Statter`] can report.
#[derive(Debug, thiserror::Error)]
pub enum StatterError {
    /// The datagram or write could not be sent.
    #[error("statsd send failed: {0}")]
    Io(#[from] std::io::Error),

    /// The sink refused the metric.
    #[error("metric {metric:?} rejected: {reason}")]
    Rejected {
        /// Metric name.
        metric: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// A sink for counters and timings.
pub trait Statter: Send + Sync {
    /// Add `val` to the counter `metric`.
    fn inc(&self, metric: &str, val: i64, rate: f32) -> Result<(), StatterError>;

    /// Record one timing sample for `metric`.
    fn timing_duration(&self, metric: &str, val: Duration, rate: f32)
    -> Result<(), StatterError>;
}

// ---------------------------------------------------------------------------
// sanitize
// ---------------------------------------------------------------------------

/// Make `s` safe to embed as one segment of a statsd metric name.
///
/// Every char outside `[A-Za-z0-9]` becomes `_`, one `_` per char.
pub fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

// ---------------------------------------------------------------------------
// StatsdServerHooks
// ---------------------------------------------------------------------------

/// [`ServerHooks`] that count requests and responses per method and per
/// response status, and time each response.
///
/// Metric names, with the default `twirk` prefix:
///
/// | When | Counters | Timings |
/// |---|---|---|
/// | received | `twirk.total.requests` | |
/// | routed | `twirk.<method>.requests` | |
/// | sent | `twirk.total.responses`, `twirk.<method>.responses`, `twirk.status_codes.total.<status>`, `twirk.status_codes.<method>.<status>` | `twirk.all_methods.response`, `twirk.<method>.response`, `twirk.status_codes.all_methods.<status>`, `twirk.status_codes.<method>.<status>` |
///
/// Sink failures are logged and dropped; metrics never fail a request.
#[derive(Debug, Clone)]
pub struct StatsdServerHooks<S> {
    statter: S,
    prefix: String,
    rate: f32,
}

impl<S: Statter> StatsdServerHooks<S> {
    /// Hooks with the default prefix and a sample rate of 1.
    pub fn new(statter: S) -> Self {
        Self {
            statter,
            prefix: DEFAULT_PREFIX.to_owned(),
            rate: 1.0,
        }
    }

    /// Hooks using the prefix and sample rate from `config`.
    ///
    /// Run [`validate_config`](crate::config::validate_config) first. A
    /// sample rate outside `(0, 1]` (including NaN) is replaced by 1.
    pub fn from_config(config: &HooksConfig, statter: S) -> Self {
        let rate = if config.sample_rate > 0.0 && config.sample_rate <= 1.0 {
            config.sample_rate
        } else {
            warn!(sample_rate = config.sample_rate, "sample rate out of range, using 1");
            1.0
        };
        Self {
            statter,
            prefix: config.prefix.clone(),
            rate,
        }
    }

    /// The underlying sink.
    pub fn statter(&self) -> &S {
        &self.statter
    }

    fn inc(&self, name: &str) {
        let metric = format!("{}.{name}", self.prefix);
        if let Err(e) = self.statter.inc(&metric, 1, self.rate) {
            warn!(metric = %metric, error = %e, "statsd increment dropped");
        }
    }

    fn timing(&self, name: &str, val: Duration) {
        let metric = format!("{}.{name}", self.prefix);
        if let Err(e) = self.statter.timing_duration(&metric, val, self.rate) {
            warn!(metric = %metric, error = %e, "statsd timing dropped");
        }
    }
}

impl<S: Statter> ServerHooks for StatsdServerHooks<S> {
    fn request_received(&self, _ctx: &mut RequestContext) -> Result<(), TwirkError> {
        self.inc("total.requests");
        Ok(())
    }

    fn request_routed(&self, ctx: &mut RequestContext) -> Result<(), TwirkError> {
        if let Some(method) = ctx.method() {
            self.inc(&format!("{}.requests", sanitize(method)));
        }
        Ok(())
    }

    fn response_sent(&self, ctx: &RequestContext) {
        let method = ctx.method().map_or_else(|| UNKNOWN_METHOD.to_owned(), sanitize);
        let status = ctx.status_code().unwrap_or(0);
        let elapsed = ctx.elapsed();

        self.inc("total.responses");
        self.inc(&format!("{method}.responses"));
        self.inc(&format!("status_codes.total.{status}"));
        self.inc(&format!("status_codes.{method}.{status}"));

        self.timing("all_methods.response", elapsed);
        self.timing(&format!("{method}.response"), elapsed);
        self.timing(&format!("status_codes.all_methods.{status}"), elapsed);
        self.timing(&format!("status_codes.{method}.{status}"), elapsed);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
