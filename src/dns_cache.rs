use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct DnsCacheEntry {
    ip_address: IpAddr,
    cached_at: Instant,
}

impl DnsCacheEntry {
    pub fn new(ip_address: IpAddr) -> Self {
        Self {
            ip_address,
            cached_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() > ttl
    }

    pub fn ip_address(&self) -> IpAddr {
        self.ip_address
    }
}

/// Hostname to address cache shared by all probes of one prober.
pub struct DnsCache {
    ttl: Duration,
    cache: HashMap<String, DnsCacheEntry>,
}

impl DnsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            cache: HashMap::new(),
        }
    }

    pub fn insert(&mut self, hostname: &str, ip_address: IpAddr) {
        self.cache.insert(hostname.to_string(), DnsCacheEntry::new(ip_address));
    }

    pub fn remove(&mut self, hostname: &str) {
        self.cache.remove(hostname);
    }

    /// Cached address for `hostname`; expired entries are dropped.
    pub fn get_valid_ip(&mut self, hostname: &str) -> Option<IpAddr> {
        let entry = self.cache.get(hostname)?;
        if entry.is_expired(self.ttl) {
            log::trace!("DNS cache entry for {hostname} expired");
            self.cache.remove(hostname);
            return None;
        }
        Some(entry.ip_address())
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
