// SPDX-License-Identifier: MIT OR Apache-2.0
//! Loading and validation of the hooks configuration.

use crate::statsd::{DEFAULT_PREFIX, sanitize};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or validating a [`HooksConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file or an override could not be parsed.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },

    /// A resource named by the config could not be opened.
    #[error("config resource unavailable: {reason}")]
    Io {
        /// Underlying I/O failure.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory issues that do not prevent operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A prefix segment contains characters statsd sinks may mangle.
    UnsanitizedPrefix {
        /// The configured prefix.
        prefix: String,
        /// What the prefix looks like once each segment is sanitized.
        suggestion: String,
    },
    /// No statsd address is configured, so only in-process sinks can be used.
    MissingStatsdAddr,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::UnsanitizedPrefix { prefix, suggestion } => {
                write!(f, "prefix '{prefix}' will be emitted as-is; consider '{suggestion}'")
            }
            ConfigWarning::MissingStatsdAddr => {
                write!(f, "statsd_addr is not set; metrics stay in-process")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// HooksConfig
// ---------------------------------------------------------------------------

/// Settings for the statsd server hooks.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HooksConfig {
    /// Metric name prefix. Dots separate segments.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Statsd sample rate in `(0, 1]`.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f32,

    /// `host:port` of the statsd daemon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statsd_addr: Option<String>,
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_owned()
}

fn default_sample_rate() -> f32 {
    1.0
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            sample_rate: default_sample_rate(),
            statsd_addr: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a [`HooksConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, starts from [`HooksConfig::default()`].
///
/// Environment variable overrides are applied on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<HooksConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Like [`load_config`], but overrides are read through `lookup`.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<HooksConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)?
        }
        None => HooksConfig::default(),
    };
    apply_overrides_with(&mut config, lookup)?;
    Ok(config)
}

/// Parse a TOML string into a [`HooksConfig`].
pub fn parse_toml(content: &str) -> Result<HooksConfig, ConfigError> {
    toml::from_str::<HooksConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Env overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides.
///
/// Recognised variables:
/// - `TWIRK_METRICS_PREFIX`
/// - `TWIRK_STATSD_ADDR`
/// - `TWIRK_SAMPLE_RATE`
pub fn apply_env_overrides(config: &mut HooksConfig) -> Result<(), ConfigError> {
    apply_overrides_with(config, |key| std::env::var(key).ok())
}

/// Apply overrides read through `lookup` instead of the process environment.
pub fn apply_overrides_with<F>(config: &mut HooksConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("TWIRK_METRICS_PREFIX") {
        config.prefix = val;
    }
    if let Some(val) = lookup("TWIRK_STATSD_ADDR") {
        config.statsd_addr = Some(val);
    }
    if let Some(val) = lookup("TWIRK_SAMPLE_RATE") {
        config.sample_rate = val.trim().parse().map_err(|_| ConfigError::ParseError {
            reason: format!("TWIRK_SAMPLE_RATE '{val}' is not a number"),
        })?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a parsed configuration, returning advisory warnings.
///
/// Hard errors (empty prefix, sample rate out of range, bad address) are
/// returned as a [`ConfigError::ValidationError`].
pub fn validate_config(config: &HooksConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    if config.prefix.trim().is_empty() {
        errors.push("prefix must not be empty".into());
    } else {
        let suggestion = config
            .prefix
            .split('.')
            .map(sanitize)
            .collect::<Vec<_>>()
            .join(".");
        if suggestion != config.prefix {
            warnings.push(ConfigWarning::UnsanitizedPrefix {
                prefix: config.prefix.clone(),
                suggestion,
            });
        }
    }

    // Written this way round so NaN is rejected too.
    if !(config.sample_rate > 0.0 && config.sample_rate <= 1.0) {
        errors.push(format!(
            "sample_rate {} out of range (0, 1]",
            config.sample_rate
        ));
    }

    match config.statsd_addr {
        Some(ref addr) => {
            if !is_host_port(addr) {
                errors.push(format!("statsd_addr '{addr}' is not host:port"));
            }
        }
        None => warnings.push(ConfigWarning::MissingStatsdAddr),
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

/// Syntactic `host:port` check. Hostnames are not resolved here.
fn is_host_port(addr: &str) -> bool {
    match addr.rsplit_once(':') {
        Some((host, port)) => !host.trim().is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn reasons(err: ConfigError) -> Vec<String> {
        match err {
            ConfigError::ValidationError { reasons } => reasons,
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn default_config_is_valid_with_warning() {
        let warnings = validate_config(&HooksConfig::default()).unwrap();
        assert_eq!(warnings, vec![ConfigWarning::MissingStatsdAddr]);
    }

    #[test]
    fn parse_full_toml() {
        let cfg = parse_toml(
            r#"
            prefix = "shop.rpc"
            sample_rate = 0.25
            statsd_addr = "127.0.0.1:8125"
        "#,
        )
        .unwrap();
        assert_eq!(cfg.prefix, "shop.rpc");
        assert_eq!(cfg.sample_rate, 0.25);
        assert_eq!(cfg.statsd_addr.as_deref(), Some("127.0.0.1:8125"));
        assert!(validate_config(&cfg).unwrap().is_empty());
    }

    #[test]
    fn empty_toml_uses_defaults() {
        assert_eq!(parse_toml("").unwrap(), HooksConfig::default());
    }

    #[test]
    fn unknown_field_is_a_parse_error() {
        let err = parse_toml(r#"prefx = "typo""#).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        let err = parse_toml("sample_rate = \"often\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn empty_prefix_rejected() {
        let cfg = HooksConfig {
            prefix: "  ".into(),
            ..Default::default()
        };
        let r = reasons(validate_config(&cfg).unwrap_err());
        assert!(r.iter().any(|m| m.contains("prefix")));
    }

    #[test]
    fn sample_rate_bounds() {
        for bad in [0.0, -1.0, 1.5, f32::NAN] {
            let cfg = HooksConfig {
                sample_rate: bad,
                ..Default::default()
            };
            let r = reasons(validate_config(&cfg).unwrap_err());
            assert!(r.iter().any(|m| m.contains("sample_rate")), "rate {bad}");
        }
        let cfg = HooksConfig {
            sample_rate: 1.0,
            ..Default::default()
        };
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn bad_statsd_addr_rejected() {
        for bad in ["statsd", "host:notaport", ":8125", "host:70000", ""] {
            let cfg = HooksConfig {
                statsd_addr: Some(bad.into()),
                ..Default::default()
            };
            let r = reasons(validate_config(&cfg).unwrap_err());
            assert!(r.iter().any(|m| m.contains("statsd_addr")), "addr {bad:?}");
        }
    }

    #[test]
    fn hostname_statsd_addr_accepted() {
        for good in ["localhost:8125", "statsd.internal:8125", "10.0.0.1:8125", "[::1]:8125"] {
            let cfg = HooksConfig {
                statsd_addr: Some(good.into()),
                ..Default::default()
            };
            assert!(validate_config(&cfg).unwrap().is_empty(), "addr {good:?}");
        }
    }

    #[test]
    fn unsanitized_prefix_warns() {
        let cfg = HooksConfig {
            prefix: "my app.rpc".into(),
            statsd_addr: Some("127.0.0.1:8125".into()),
            ..Default::default()
        };
        let warnings = validate_config(&cfg).unwrap();
        assert_eq!(
            warnings,
            vec![ConfigWarning::UnsanitizedPrefix {
                prefix: "my app.rpc".into(),
                suggestion: "my_app.rpc".into(),
            }]
        );
        assert!(warnings[0].to_string().contains("my_app.rpc"));
    }

    #[test]
    fn overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("TWIRK_METRICS_PREFIX", "edge"),
            ("TWIRK_STATSD_ADDR", "10.0.0.1:8125"),
            ("TWIRK_SAMPLE_RATE", " 0.1 "),
        ]
        .into_iter()
        .collect();
        let mut cfg = HooksConfig::default();
        apply_overrides_with(&mut cfg, |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.prefix, "edge");
        assert_eq!(cfg.statsd_addr.as_deref(), Some("10.0.0.1:8125"));
        assert_eq!(cfg.sample_rate, 0.1);
    }

    #[test]
    fn bad_rate_override_is_a_parse_error() {
        let mut cfg = HooksConfig::default();
        let err = apply_overrides_with(&mut cfg, |k| {
            (k == "TWIRK_SAMPLE_RATE").then(|| "sometimes".to_owned())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "prefix = \"filed\"").unwrap();
        writeln!(f, "statsd_addr = \"127.0.0.1:8125\"").unwrap();
        let cfg = load_config_with(Some(f.path()), |_| None).unwrap();
        assert_eq!(cfg.prefix, "filed");
        assert_eq!(cfg.statsd_addr.as_deref(), Some("127.0.0.1:8125"));
        assert_eq!(cfg.sample_rate, 1.0);
    }

    #[test]
    fn load_from_file_then_override() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "prefix = \"filed\"").unwrap();
        let cfg = load_config_with(Some(f.path()), |k| {
            (k == "TWIRK_SAMPLE_RATE").then(|| "0.5".to_owned())
        })
        .unwrap();
        assert_eq!(cfg.prefix, "filed");
        assert_eq!(cfg.sample_rate, 0.5);
        assert_eq!(cfg.statsd_addr, None);
    }

    #[test]
    fn load_missing_file() {
        let err = load_config(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
