use std::fmt::Display;
use std::net::IpAddr;
use std::path::PathBuf;

use clap::ValueEnum;
use serde_derive::{Deserialize, Serialize};

use crate::core::konst::{
    CURRENT_DIR, DNS_PORT, LOGFILE_NAME, LOGGING_JSON, LOGGING_QUIET, LOOKUP_TIMEOUT, MAX_INPUT_SOURCES, QUEUE_CAPACITY,
    RESOLVER_WORKERS,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IpProtocol {
    All,
    #[default]
    V4,
    V6,
}

impl IpProtocol {
    /// Whether an address belongs to this protocol family.
    pub fn matches(&self, addr: &IpAddr) -> bool {
        match self {
            IpProtocol::All => true,
            IpProtocol::V4 => addr.is_ipv4(),
            IpProtocol::V6 => addr.is_ipv6(),
        }
    }
}

impl Display for IpProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IpProtocol::All => write!(f, "all"),
            IpProtocol::V4 => write!(f, "v4"),
            IpProtocol::V6 => write!(f, "v6"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Tcp,
    #[default]
    Udp,
}

impl Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Tcp => write!(f, "tcp"),
            Transport::Udp => write!(f, "udp"),
        }
    }
}

/// Sizing of one pipeline run. Immutable once workers start.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PipelineOptions {
    pub resolvers: usize,
    pub queue_capacity: usize,
    pub max_sources: usize,
    pub sequential: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            resolvers: RESOLVER_WORKERS,
            queue_capacity: QUEUE_CAPACITY,
            max_sources: MAX_INPUT_SOURCES,
            sequential: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LookupOptions {
    /// Lookup timeout (in milliseconds)
    pub timeout: u16,
    pub ip_protocol: IpProtocol,
    pub nameserver: Option<IpAddr>,
    /// Port of `nameserver`
    pub port: u16,
    pub transport: Transport,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            timeout: LOOKUP_TIMEOUT,
            ip_protocol: IpProtocol::default(),
            nameserver: None,
            port: DNS_PORT,
            transport: Transport::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingOptions {
    pub dir: String,
    pub file: String,
    pub json: bool,
    pub quiet: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            dir: CURRENT_DIR.to_owned(),
            file: LOGFILE_NAME.to_owned(),
            json: LOGGING_JSON,
            quiet: LOGGING_QUIET,
        }
    }
}

/// Everything a run needs besides the resolver itself.
#[derive(Clone, Debug)]
pub struct RunOptions {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub pipeline: PipelineOptions,
}

/// What one requester did with its input source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequesterStats {
    pub source: PathBuf,
    pub opened: bool,
    pub enqueued: usize,
    pub skipped: usize,
    /// Stopped by an abort before the source was exhausted.
    pub interrupted: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolverStats {
    pub resolved: usize,
    pub unresolved: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunMode {
    #[default]
    Concurrent,
    Sequential,
}

impl Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Concurrent => write!(f, "concurrent"),
            RunMode::Sequential => write!(f, "sequential"),
        }
    }
}

/// Totals of a finished run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    pub mode: RunMode,
    pub sources: usize,
    pub sources_skipped: usize,
    pub hostnames: usize,
    pub tokens_skipped: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub failure_percent: f64,
    pub elapsed_ms: f64,
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, Ipv6Addr};

    use super::*;

    #[test]
    fn ip_protocol_matches_family() {
        let v4 = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1));
        let v6 = IpAddr::V6(Ipv6Addr::LOCALHOST);

        assert!(IpProtocol::V4.matches(&v4));
        assert!(!IpProtocol::V4.matches(&v6));
        assert!(IpProtocol::V6.matches(&v6));
        assert!(!IpProtocol::V6.matches(&v4));
        assert!(IpProtocol::All.matches(&v4));
        assert!(IpProtocol::All.matches(&v6));
    }

    #[test]
    fn pipeline_defaults_are_expected() {
        let options = PipelineOptions::default();
        assert_eq!(options.queue_capacity, 5);
        assert_eq!(options.max_sources, 10);
        assert_eq!(options.resolvers, 10);
        assert!(!options.sequential);
    }
}
