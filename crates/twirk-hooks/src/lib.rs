// SPDX-License-Identifier: MIT OR Apache-2.0
//! Server hooks for twirk services.
//!
//! A twirk server calls a [`ServerHooks`] value at fixed points of every
//! request. Hooks only observe the method name and the HTTP status chosen
//! from the error code; they never build or alter errors.
//! [`StatsdServerHooks`] turns those observations into statsd counters and
//! timings.
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Hooks configuration.
pub mod config;
/// Per-request context.
pub mod context;
/// The hook trait, chaining and the serving driver.
pub mod hooks;
/// Statsd hooks and the statter trait.
pub mod statsd;
/// Statter sinks.
pub mod statter;

pub use config::{ConfigError, ConfigWarning, HooksConfig};
pub use context::RequestContext;
pub use hooks::{ChainHooks, NoopHooks, ServerHooks, chain_hooks, serve_call};
pub use statsd::{Statter, StatterError, StatsdServerHooks, sanitize};
pub use statter::{Increment, MemoryStatter, Timing, UdpStatter};
