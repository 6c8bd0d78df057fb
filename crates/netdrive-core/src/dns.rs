use crate::error::DnsError;
use std::net::IpAddr;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing::{debug, trace};

/// Name resolution used to vet servers before they enter the catalog.
pub trait NameResolver {
    /// Resolve `host` and return its fully qualified name.
    fn resolve_fqdn(&self, host: &str) -> Result<String, DnsError>;
}

/// Everything after the first label of a fully qualified name.
pub fn domain_of(fqdn: &str) -> String {
    let fqdn = fqdn.trim_end_matches('.');
    if fqdn.parse::<IpAddr>().is_ok() {
        return String::new();
    }
    fqdn.split_once('.')
        .map(|(_, domain)| domain.to_string())
        .unwrap_or_default()
}

/// Resolver backed by the system resolver (`getaddrinfo` / `getnameinfo`).
///
/// The blocking lookup runs on a helper thread; when `timeout` elapses the
/// thread is abandoned and the lookup reported as timed out.
#[derive(Debug, Clone)]
pub struct SystemResolver {
    timeout: Duration,
}

impl SystemResolver {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

fn lookup(host: &str) -> Result<String, DnsError> {
    let addrs = dns_lookup::lookup_host(host).map_err(|source| DnsError::Lookup {
        host: host.to_string(),
        source,
    })?;
    let Some(addr) = addrs.first() else {
        return Err(DnsError::NotFound(host.to_string()));
    };
    trace!("{} resolved to {}", host, addr);

    // A missing PTR record still leaves a resolvable host.
    match dns_lookup::lookup_addr(addr) {
        Ok(name) if !name.is_empty() && name.parse::<IpAddr>().is_err() => Ok(name),
        _ => Ok(host.to_string()),
    }
}

impl NameResolver for SystemResolver {
    fn resolve_fqdn(&self, host: &str) -> Result<String, DnsError> {
        let (tx, rx) = mpsc::channel();
        let owned = host.to_string();
        thread::spawn(move || {
            let _ = tx.send(lookup(&owned));
        });

        match rx.recv_timeout(self.timeout) {
            Ok(result) => {
                if let Ok(fqdn) = &result {
                    debug!("DNS verified {} as {}", host, fqdn);
                }
                result
            }
            Err(_) => Err(DnsError::Timeout {
                host: host.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}
