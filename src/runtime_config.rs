//! # Runtime Configuration Module
//!
//! Server settings loaded from an optional YAML file, then overridden by
//! `SPRINT_*` environment variables, then by CLI flags.
//!
//! ## Environment Variables
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `SPRINT_HOST` | `host` | `127.0.0.1` |
//! | `SPRINT_PORT` | `port` | `8000` |
//! | `SPRINT_STACK_SIZE` | `stack_size` | `0x10000` |
//! | `SPRINT_FRAMING` | `framing` | `content-length` |
//! | `SPRINT_READ_CHUNK_SIZE` | `read_chunk_size` | `1024` |
//! | `SPRINT_MAX_REQUEST_BYTES` | `max_request_bytes` | `1048576` |
//! | `SPRINT_READ_TIMEOUT_MS` | `read_timeout_ms` | unset (no timeout) |
//!
//! `SPRINT_STACK_SIZE` accepts decimal (`65536`) or hexadecimal (`0x10000`).
//! Values that fail to parse are ignored and the previous value kept.
//!
//! Every connection runs in its own coroutine with `stack_size` bytes of
//! stack, so total reserved memory is `stack_size × concurrent connections`.
//!
//! ## Usage
//!
//! ```rust
//! use sprint::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Listening on {}", config.address());
//! ```
//!
//! ## Example YAML
//!
//! ```yaml
//! host: 0.0.0.0
//! port: 8080
//! framing: legacy
//! read_timeout_ms: 5000
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;

use crate::server::framing::FramingMode;

pub const DEFAULT_STACK_SIZE: usize = 0x10000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    pub host: String,
    pub port: u16,
    /// Stack size for connection coroutines in bytes
    pub stack_size: usize,
    pub framing: FramingMode,
    /// Bytes requested per socket read
    pub read_chunk_size: usize,
    /// Upper bound on head plus body; larger requests are rejected
    pub max_request_bytes: usize,
    /// Socket read timeout; `None` waits forever
    pub read_timeout_ms: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            stack_size: DEFAULT_STACK_SIZE,
            framing: FramingMode::ContentLength,
            read_chunk_size: 1024,
            max_request_bytes: 1024 * 1024,
            read_timeout_ms: None,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by the process environment
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Read a YAML file; missing keys keep their defaults
    pub fn from_yaml_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Load `path` if given, then apply the environment
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_vars(|key| env::var(key).ok());
    }

    /// Apply `SPRINT_*` overrides from an arbitrary lookup
    pub fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SPRINT_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("SPRINT_PORT").and_then(|v| v.trim().parse().ok()) {
            self.port = port;
        }
        if let Some(size) = lookup("SPRINT_STACK_SIZE").and_then(|v| parse_size(&v)) {
            self.stack_size = size;
        }
        if let Some(mode) = lookup("SPRINT_FRAMING").and_then(|v| FramingMode::parse(&v)) {
            self.framing = mode;
        }
        if let Some(size) = lookup("SPRINT_READ_CHUNK_SIZE").and_then(|v| parse_size(&v)) {
            self.read_chunk_size = size;
        }
        if let Some(size) = lookup("SPRINT_MAX_REQUEST_BYTES").and_then(|v| parse_size(&v)) {
            self.max_request_bytes = size;
        }
        if let Some(ms) = lookup("SPRINT_READ_TIMEOUT_MS").and_then(|v| v.trim().parse().ok()) {
            self.read_timeout_ms = Some(ms);
        }
    }

    /// `host:port`
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }
}

fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
}
