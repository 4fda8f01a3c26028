use hickory_resolver::config::{LookupIpStrategy, NameServerConfig, ResolverConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::ProtoErrorKind;
use hickory_resolver::proto::xfer::Protocol;
use hickory_resolver::{ResolveError, Resolver};

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use tokio::runtime::Handle;
use tracing::{Level, event};

use crate::core::common::{IpProtocol, LookupOptions, Transport};
use crate::core::konst::APP_NAME;
use crate::util::time::{calc_elapsed_ms, time_now_us};

/// Per-hostname lookup failures. Never fatal to a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("{0} did not resolve to an IP address")]
    NotFound(String),

    #[error("{hostname} lookup timed out after {timeout:?}")]
    Timeout { hostname: String, timeout: Duration },

    #[error("{hostname} lookup failed: {reason}")]
    Failed { hostname: String, reason: String },
}

/// The external name resolution service.
///
/// Implementations are called concurrently from every resolver worker and
/// must block the calling thread until an answer, a failure or a timeout.
pub trait NameResolver: Send + Sync {
    fn resolve(&self, hostname: &str) -> Result<IpAddr, LookupError>;
}

/// DNS backed resolver driven on the tokio runtime.
pub struct DnsClient {
    resolver: Resolver<TokioConnectionProvider>,
    handle: Handle,
    lookup_options: LookupOptions,
}

impl DnsClient {
    /// Uses the system resolver configuration unless a nameserver is set.
    pub fn new(lookup_options: LookupOptions, handle: Handle) -> Result<DnsClient, ResolveError> {
        let mut builder = match lookup_options.nameserver {
            Some(nameserver) => {
                // Map to symbol used by Hickory resolver.
                let transport_protocol = match lookup_options.transport {
                    Transport::Tcp => Protocol::Tcp,
                    Transport::Udp => Protocol::Udp,
                };
                let ns_config = NameServerConfig {
                    socket_addr: SocketAddr::new(nameserver, lookup_options.port),
                    protocol: transport_protocol,
                    http_endpoint: None,
                    tls_dns_name: None,
                    trust_negative_responses: false,
                    bind_addr: None,
                };
                let mut config = ResolverConfig::new();
                config.add_name_server(ns_config);
                Resolver::builder_with_config(config, TokioConnectionProvider::default())
            }
            None => Resolver::builder_tokio()?,
        };

        let options = builder.options_mut();
        options.timeout = Duration::from_millis(lookup_options.timeout.into());
        options.ip_strategy = match lookup_options.ip_protocol {
            IpProtocol::All => LookupIpStrategy::Ipv4AndIpv6,
            IpProtocol::V4 => LookupIpStrategy::Ipv4Only,
            IpProtocol::V6 => LookupIpStrategy::Ipv6Only,
        };

        Ok(DnsClient {
            resolver: builder.build(),
            handle,
            lookup_options,
        })
    }
}

impl NameResolver for DnsClient {
    fn resolve(&self, hostname: &str) -> Result<IpAddr, LookupError> {
        let timeout = Duration::from_millis(self.lookup_options.timeout.into());
        let pre_lookup_timestamp = time_now_us();

        // The resolver has its own per-query timeout, but retries and
        // multiple nameservers can stack up. Bound the whole lookup.
        let result = self
            .handle
            .block_on(async { tokio::time::timeout(timeout, self.resolver.lookup_ip(hostname)).await });

        let lookup_ms = calc_elapsed_ms(pre_lookup_timestamp, time_now_us());
        event!(target: APP_NAME, Level::DEBUG, "lookup {hostname} took {lookup_ms}ms");

        match result {
            Ok(Ok(lookup)) => first_matching(lookup.iter(), self.lookup_options.ip_protocol)
                .ok_or_else(|| LookupError::NotFound(hostname.to_owned())),
            Ok(Err(e)) if e.is_no_records_found() => Err(LookupError::NotFound(hostname.to_owned())),
            // The per-query timeout can fire just ahead of the outer one.
            Ok(Err(e)) if e.proto().is_some_and(|p| matches!(p.kind(), ProtoErrorKind::Timeout)) => {
                Err(LookupError::Timeout {
                    hostname: hostname.to_owned(),
                    timeout,
                })
            }
            Ok(Err(e)) => Err(LookupError::Failed {
                hostname: hostname.to_owned(),
                reason: e.to_string(),
            }),
            Err(_) => Err(LookupError::Timeout {
                hostname: hostname.to_owned(),
                timeout,
            }),
        }
    }
}

/// Primary address: the first one of the wanted protocol family.
pub fn first_matching(addrs: impl IntoIterator<Item = IpAddr>, ip_protocol: IpProtocol) -> Option<IpAddr> {
    addrs.into_iter().find(|addr| ip_protocol.matches(addr))
}
