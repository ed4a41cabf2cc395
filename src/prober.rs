use std::net::IpAddr;
use std::time::Duration;
use surge_ping::{Client, Config, ICMP, PingIdentifier, PingSequence, SurgeError};
use thiserror::Error;
use crate::dns_cache::DnsCache;
use crate::ping::ProbeOutcome;

const PAYLOAD: [u8; 32] = [0; 32];

/// Issues one reachability probe to one host.
///
/// Implementations must not retry: a failed probe is simply reported and the next
/// cycle tries again.
pub trait Prober {
    fn probe(&mut self, host: &str) -> impl Future<Output = ProbeOutcome>;
}

/// Why a probe failed. Only logged; callers see `ProbeOutcome::Failure`.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid host name: {0:?}")]
    InvalidHost(String),

    #[error("could not resolve {host}: {reason}")]
    Resolve { host: String, reason: String },

    #[error("could not open ICMP socket: {0}")]
    Client(#[source] std::io::Error),

    #[error("ping failed: {0}")]
    Ping(#[from] SurgeError),
}

/// Sanitize hostname by keeping only valid characters (alphanumeric, dots, hyphens)
/// Returns None if the result is empty
fn sanitize_hostname(hostname: &str) -> Option<String> {
    // Also handle case where user included port like "example.com:8080"
    let hostname = hostname.split(':').next().unwrap_or(hostname);

    let sanitized: String = hostname
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '.' || *c == '-')
        .collect();

    if sanitized.is_empty() {
        None
    } else {
        Some(sanitized)
    }
}

/// ICMP echo prober backed by `surge-ping`.
pub struct IcmpProber {
    timeout: Duration,
    identifier: PingIdentifier,
    sequence: u16,
    dns_cache: DnsCache,
    v4_client: Option<Client>,
    v6_client: Option<Client>,
}

impl IcmpProber {
    pub fn new(timeout: Duration, dns_ttl: Duration) -> Self {
        Self {
            timeout,
            identifier: PingIdentifier(std::process::id() as u16),
            sequence: 0,
            dns_cache: DnsCache::new(dns_ttl),
            v4_client: None,
            v6_client: None,
        }
    }

    /// Resolve hostname to IP address
    async fn resolve_target(&mut self, target: &str) -> Result<IpAddr, ProbeError> {
        // IP literals, including bare IPv6 which the sanitizer below would mangle
        if let Ok(ip) = target.parse::<IpAddr>() {
            return Ok(ip);
        }

        if let Some(ip) = self.dns_cache.get_valid_ip(target) {
            log::trace!("DNS cache hit for {target}: {ip}");
            return Ok(ip);
        }

        let sanitized =
            sanitize_hostname(target).ok_or_else(|| ProbeError::InvalidHost(target.to_string()))?;

        log::trace!("DNS cache miss for {target}, resolving {sanitized}");
        let mut addrs = tokio::net::lookup_host(format!("{sanitized}:0"))
            .await
            .map_err(|e| ProbeError::Resolve {
                host: target.to_string(),
                reason: e.to_string(),
            })?;
        let ip = addrs.next().map(|addr| addr.ip()).ok_or_else(|| ProbeError::Resolve {
            host: target.to_string(),
            reason: "no addresses returned".to_string(),
        })?;

        self.dns_cache.insert(target, ip);
        Ok(ip)
    }

    fn client_for(&mut self, ip: IpAddr) -> Result<Client, ProbeError> {
        let (slot, kind) = match ip {
            IpAddr::V4(_) => (&mut self.v4_client, ICMP::V4),
            IpAddr::V6(_) => (&mut self.v6_client, ICMP::V6),
        };
        if let Some(client) = slot {
            return Ok(client.clone());
        }
        let config = Config::builder().kind(kind).build();
        let client = Client::new(&config).map_err(ProbeError::Client)?;
        *slot = Some(client.clone());
        Ok(client)
    }

    /// Execute the actual ping operation
    async fn execute_ping(&mut self, target: &str) -> Result<f64, ProbeError> {
        let target_ip = self.resolve_target(target).await?;
        let client = self.client_for(target_ip)?;

        self.sequence = self.sequence.wrapping_add(1);
        let mut pinger = client.pinger(target_ip, self.identifier).await;
        pinger.timeout(self.timeout);

        let (_, duration) = pinger.ping(PingSequence(self.sequence), &PAYLOAD).await?;
        Ok(duration.as_secs_f64() * 1000.0)
    }
}

impl Prober for IcmpProber {
    async fn probe(&mut self, host: &str) -> ProbeOutcome {
        match self.execute_ping(host).await {
            Ok(latency_ms) => ProbeOutcome::success(latency_ms),
            Err(e) => {
                log::debug!("probe to {host} failed: {e}");
                // Force re-resolution next cycle in case the address moved.
                self.dns_cache.remove(host);
                ProbeOutcome::Failure
            }
        }
    }
}
