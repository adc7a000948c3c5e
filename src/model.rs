#[cfg(feature = "cli")]
use clap::ValueEnum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 443;
pub const DEFAULT_TIMEOUT_SECS: u64 = 2;

/// A `(host, port)` pair parsed from `host` or `host:port`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    Empty,
    InvalidPort(String),
    Malformed(String),
}

impl fmt::Display for EndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointError::Empty => write!(f, "empty host specification"),
            EndpointError::InvalidPort(port) => write!(f, "invalid port {port:?}"),
            EndpointError::Malformed(spec) => write!(f, "malformed host specification {spec:?}"),
        }
    }
}

impl std::error::Error for EndpointError {}

impl Endpoint {
    /// Splits `spec` at its port separator. Specifications that cannot be
    /// split (no colon, or a bare IPv6 literal) use the default port.
    pub fn parse(spec: &str) -> Result<Self, EndpointError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(EndpointError::Empty);
        }

        if let Some(rest) = spec.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| EndpointError::Malformed(spec.to_string()))?;
            if host.is_empty() {
                return Err(EndpointError::Empty);
            }
            return match tail.strip_prefix(':') {
                Some(port) => Ok(Self {
                    host: host.to_string(),
                    port: parse_port(port)?,
                }),
                None if tail.is_empty() => Ok(Self::with_default_port(host)),
                None => Err(EndpointError::Malformed(spec.to_string())),
            };
        }

        match spec.rsplit_once(':') {
            Some((host, port)) if !host.contains(':') => {
                if host.is_empty() {
                    return Err(EndpointError::Empty);
                }
                Ok(Self {
                    host: host.to_string(),
                    port: parse_port(port)?,
                })
            }
            _ => Ok(Self::with_default_port(spec)),
        }
    }

    fn with_default_port(host: &str) -> Self {
        Self {
            host: host.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

fn parse_port(port: &str) -> Result<u16, EndpointError> {
    port.parse()
        .map_err(|_| EndpointError::InvalidPort(port.to_string()))
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TlsVersion {
    Tls10,
    Tls11,
    Tls12,
    Tls13,
}

impl TlsVersion {
    /// Probe order.
    pub const ALL: [TlsVersion; 4] = [
        TlsVersion::Tls10,
        TlsVersion::Tls11,
        TlsVersion::Tls12,
        TlsVersion::Tls13,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TlsVersion::Tls10 => "TLS1.0",
            TlsVersion::Tls11 => "TLS1.1",
            TlsVersion::Tls12 => "TLS1.2",
            TlsVersion::Tls13 => "TLS1.3",
        }
    }
}

impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classification of a single handshake attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    ConnectionFailed(String),
    NotSupported,
    Supported,
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::ConnectionFailed(err) => write!(f, "connection failed: {err}"),
            ProbeOutcome::NotSupported => write!(f, "not supported"),
            ProbeOutcome::Supported => write!(f, "supported"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Support {
    Supported,
    NotSupported,
    #[default]
    Inconclusive,
}

impl Support {
    pub fn symbol(self) -> &'static str {
        match self {
            Support::Supported => "Y",
            Support::NotSupported => "N",
            Support::Inconclusive => "-",
        }
    }
}

impl From<&ProbeOutcome> for Support {
    fn from(outcome: &ProbeOutcome) -> Self {
        match outcome {
            ProbeOutcome::ConnectionFailed(_) => Support::Inconclusive,
            ProbeOutcome::NotSupported => Support::NotSupported,
            ProbeOutcome::Supported => Support::Supported,
        }
    }
}

/// Per-host record, filled in one version at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostResult {
    pub host: String,
    pub tls10: Support,
    pub tls11: Support,
    pub tls12: Support,
    pub tls13: Support,
    /// Most recent connection error seen for this host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HostResult {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            tls10: Support::Inconclusive,
            tls11: Support::Inconclusive,
            tls12: Support::Inconclusive,
            tls13: Support::Inconclusive,
            error: None,
        }
    }

    /// A record for a host whose probing task never completed.
    pub fn failed(host: impl Into<String>, error: impl Into<String>) -> Self {
        let mut result = Self::new(host);
        result.error = Some(error.into());
        result
    }

    pub fn record(&mut self, version: TlsVersion, outcome: ProbeOutcome) {
        *self.slot_mut(version) = Support::from(&outcome);
        if let ProbeOutcome::ConnectionFailed(err) = outcome {
            self.error = Some(err);
        }
    }

    pub fn support(&self, version: TlsVersion) -> Support {
        match version {
            TlsVersion::Tls10 => self.tls10,
            TlsVersion::Tls11 => self.tls11,
            TlsVersion::Tls12 => self.tls12,
            TlsVersion::Tls13 => self.tls13,
        }
    }

    fn slot_mut(&mut self, version: TlsVersion) -> &mut Support {
        match version {
            TlsVersion::Tls10 => &mut self.tls10,
            TlsVersion::Tls11 => &mut self.tls11,
            TlsVersion::Tls12 => &mut self.tls12,
            TlsVersion::Tls13 => &mut self.tls13,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResults {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub hosts: Vec<HostResult>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub hosts: Vec<String>,
    pub timeout: Duration,
    pub concurrency: Option<usize>,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Table,
    Json,
    Jsonl,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}
