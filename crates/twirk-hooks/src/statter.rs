// SPDX-License-Identifier: MIT OR Apache-2.0
//! Statter sinks: an in-process recorder and a UDP statsd client.

use crate::config::{ConfigError, HooksConfig};
use crate::statsd::{Statter, StatterError};
use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

// ---------------------------------------------------------------------------
// MemoryStatter
// ---------------------------------------------------------------------------

/// One recorded counter increment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Increment {
    /// Metric name.
    pub metric: String,
    /// Amount added.
    pub val: i64,
    /// Sample rate.
    pub rate: f32,
}

/// One recorded timing sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    /// Metric name.
    pub metric: String,
    /// Measured duration.
    pub val: Duration,
    /// Sample rate.
    pub rate: f32,
}

#[derive(Debug, Default)]
struct Recorded {
    incs: Vec<Increment>,
    timings: Vec<Timing>,
}

/// Thread-safe statter that keeps everything it receives in memory.
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStatter {
    inner: Arc<Mutex<Recorded>>,
}

impl MemoryStatter {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All increments so far, in arrival order.
    pub fn increments(&self) -> Vec<Increment> {
        let data = self.inner.lock().expect("statter lock poisoned");
        data.incs.clone()
    }

    /// All timings so far, in arrival order.
    pub fn timings(&self) -> Vec<Timing> {
        let data = self.inner.lock().expect("statter lock poisoned");
        data.timings.clone()
    }

    /// Whether `metric` was incremented at least once.
    pub fn received_inc(&self, metric: &str) -> bool {
        let data = self.inner.lock().expect("statter lock poisoned");
        data.incs.iter().any(|i| i.metric == metric)
    }

    /// Whether a timing for `metric` was recorded at least once.
    pub fn received_timing(&self, metric: &str) -> bool {
        let data = self.inner.lock().expect("statter lock poisoned");
        data.timings.iter().any(|t| t.metric == metric)
    }

    /// Sum of all increments to `metric`.
    pub fn counter(&self, metric: &str) -> i64 {
        let data = self.inner.lock().expect("statter lock poisoned");
        data.incs
            .iter()
            .filter(|i| i.metric == metric)
            .map(|i| i.val)
            .sum()
    }

    /// Drop everything recorded so far.
    pub fn clear(&self) {
        let mut data = self.inner.lock().expect("statter lock poisoned");
        data.incs.clear();
        data.timings.clear();
    }
}

impl Statter for MemoryStatter {
    fn inc(&self, metric: &str, val: i64, rate: f32) -> Result<(), StatterError> {
        let mut data = self.inner.lock().expect("statter lock poisoned");
        data.incs.push(Increment {
            metric: metric.to_owned(),
            val,
            rate,
        });
        Ok(())
    }

    fn timing_duration(&self, metric: &str, val: Duration, rate: f32) -> Result<(), StatterError> {
        let mut data = self.inner.lock().expect("statter lock poisoned");
        data.timings.push(Timing {
            metric: metric.to_owned(),
            val,
            rate,
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// UdpStatter
// ---------------------------------------------------------------------------

/// Statsd client sending one plain-text datagram per metric.
///
/// Datagrams are fire-and-forget: a send error is reported, but nothing is
/// retried or buffered.
#[derive(Debug)]
pub struct UdpStatter {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpStatter {
    /// Bind an ephemeral local socket that sends to `target`.
    pub fn connect(target: SocketAddr) -> Result<Self, StatterError> {
        let bind: SocketAddr = if target.is_ipv4() {
            ([0u8; 4], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(bind)?;
        debug!(%target, local = ?socket.local_addr().ok(), "statsd socket bound");
        Ok(Self { socket, target })
    }

    /// Build from `config.statsd_addr`. A hostname is resolved once; an IPv4
    /// address is preferred when it has several.
    pub fn from_config(config: &HooksConfig) -> Result<Self, ConfigError> {
        let addr = config
            .statsd_addr
            .as_deref()
            .ok_or_else(|| ConfigError::ValidationError {
                reasons: vec!["statsd_addr is not set".into()],
            })?;
        let resolved: Vec<SocketAddr> = addr
            .to_socket_addrs()
            .map_err(|e| ConfigError::ValidationError {
                reasons: vec![format!("statsd_addr '{addr}' cannot be resolved: {e}")],
            })?
            .collect();
        let target = resolved
            .iter()
            .find(|a| a.is_ipv4())
            .or_else(|| resolved.first())
            .copied()
            .ok_or_else(|| ConfigError::ValidationError {
                reasons: vec![format!("statsd_addr '{addr}' resolved to no address")],
            })?;
        Self::connect(target).map_err(|e| ConfigError::Io {
            reason: e.to_string(),
        })
    }

    /// Address datagrams are sent to.
    pub fn target(&self) -> SocketAddr {
        self.target
    }

    fn send(&self, line: &str) -> Result<(), StatterError> {
        self.socket.send_to(line.as_bytes(), self.target)?;
        Ok(())
    }
}

impl Statter for UdpStatter {
    fn inc(&self, metric: &str, val: i64, rate: f32) -> Result<(), StatterError> {
        self.send(&format_line(metric, &val.to_string(), "c", rate))
    }

    fn timing_duration(&self, metric: &str, val: Duration, rate: f32) -> Result<(), StatterError> {
        self.send(&format_line(metric, &val.as_millis().to_string(), "ms", rate))
    }
}

/// Render one statsd line, e.g. `twirk.total.requests:1|c|@0.5`.
pub(crate) fn format_line(metric: &str, value: &str, kind: &str, rate: f32) -> String {
    if rate < 1.0 {
        format!("{metric}:{value}|{kind}|@{rate}")
    } else {
        format!("{metric}:{value}|{kind}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
