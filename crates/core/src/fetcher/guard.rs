//! Outbound URL policy.
//!
//! The image URL comes from the caller and the request is issued from the
//! server, so every target is checked against a scheme allow-list, an
//! optional host allow-list, and (unless disabled) a block-list of
//! non-public address ranges.
//!
//! Host names are vetted by [`PublicOnlyResolver`], installed as the HTTP
//! client's resolver. The addresses it checks are the ones the client
//! connects to, for the first request and for every redirect hop.

use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use thiserror::Error;
use url::{Host, Url};

use super::config::FetcherConfig;

/// Schemes the fetcher will request.
const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

/// Checks outbound image URLs.
#[derive(Debug, Clone)]
pub struct UrlGuard {
    allow_private_networks: bool,
    allowed_hosts: Vec<String>,
}

impl UrlGuard {
    pub fn new(config: &FetcherConfig) -> Self {
        Self {
            allow_private_networks: config.allow_private_networks,
            allowed_hosts: config
                .allowed_hosts
                .iter()
                .map(|h| h.trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    /// Checks that need no I/O: scheme, host allow-list and literal
    /// addresses. Applied to the request URL and every redirect hop.
    pub fn check_static(&self, url: &Url) -> Result<(), String> {
        if !ALLOWED_SCHEMES.contains(&url.scheme()) {
            return Err(format!("scheme {:?} is not allowed", url.scheme()));
        }

        let host = url.host().ok_or_else(|| "URL has no host".to_string())?;

        if !self.allowed_hosts.is_empty() {
            let name = match &host {
                Host::Domain(d) => d.to_ascii_lowercase(),
                Host::Ipv4(ip) => ip.to_string(),
                Host::Ipv6(ip) => ip.to_string(),
            };
            if !self.host_allowed(&name) {
                return Err(format!("host {} is not in the allow-list", name));
            }
        }

        if !self.allow_private_networks {
            let literal = match host {
                Host::Ipv4(ip) => Some(IpAddr::V4(ip)),
                Host::Ipv6(ip) => Some(IpAddr::V6(ip)),
                Host::Domain(d) if d.eq_ignore_ascii_case("localhost") => {
                    return Err("localhost is not allowed".to_string());
                }
                Host::Domain(_) => None,
            };
            if let Some(ip) = literal.filter(|ip| is_blocked_ip(*ip)) {
                return Err(format!("non-public address {} is not allowed", ip));
            }
        }

        Ok(())
    }

    fn host_allowed(&self, host: &str) -> bool {
        self.allowed_hosts.iter().any(|pattern| {
            match pattern.strip_prefix("*.") {
                Some(suffix) => host
                    .strip_suffix(suffix)
                    .is_some_and(|rest| rest.ends_with('.') && rest.len() > 1),
                None => pattern == host,
            }
        })
    }
}

/// Why a host name was refused by [`PublicOnlyResolver`].
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{host} resolves to non-public address {ip}")]
    NonPublic { host: String, ip: IpAddr },

    #[error("{host} has no addresses")]
    NoAddresses { host: String },

    #[error("failed to resolve {host}: {source}")]
    Lookup {
        host: String,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves `host`, refusing it if any address is non-public.
pub async fn resolve_public(host: &str) -> Result<Vec<SocketAddr>, ResolveError> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|source| ResolveError::Lookup {
            host: host.to_string(),
            source,
        })?
        .collect();

    if addrs.is_empty() {
        return Err(ResolveError::NoAddresses {
            host: host.to_string(),
        });
    }
    if let Some(addr) = addrs.iter().find(|a| is_blocked_ip(a.ip())) {
        return Err(ResolveError::NonPublic {
            host: host.to_string(),
            ip: addr.ip(),
        });
    }
    Ok(addrs)
}

/// DNS resolver for the image client that only yields public addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicOnlyResolver;

impl Resolve for PublicOnlyResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(async move {
            let addrs = resolve_public(name.as_str()).await?;
            Ok(Box::new(addrs.into_iter()) as Addrs)
        })
    }
}

/// Whether an address is outside the public unicast space.
pub fn is_blocked_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_blocked_v4(v4),
        IpAddr::V6(v6) => is_blocked_v6(v6),
    }
}

fn is_blocked_v4(ip: Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();
    ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_documentation()
        || ip.is_unspecified()
        || ip.is_multicast()
        || a == 0
        // 100.64.0.0/10 carrier-grade NAT
        || (a == 100 && (b & 0xc0) == 64)
        // 192.0.0.0/24 protocol assignments
        || (a == 192 && b == 0 && c == 0)
        // 198.18.0.0/15 benchmarking
        || (a == 198 && (b & 0xfe) == 18)
        // 240.0.0.0/4 reserved
        || a >= 240
}

fn is_blocked_v6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_blocked_v4(v4);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_multicast()
        // fc00::/7 unique local
        || (first & 0xfe00) == 0xfc00
        // fe80::/10 link local
        || (first & 0xffc0) == 0xfe80
        // 2001:db8::/32 documentation
        || (first == 0x2001 && ip.segments()[1] == 0x0db8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard(allow_private: bool, hosts: &[&str]) -> UrlGuard {
        let mut config = FetcherConfig::default();
        config.allow_private_networks = allow_private;
        config.allowed_hosts = hosts.iter().map(|h| h.to_string()).collect();
        UrlGuard::new(&config)
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_blocked_ipv4_ranges() {
        for ip in [
            "127.0.0.1",
            "10.1.2.3",
            "172.16.0.1",
            "192.168.1.1",
            "169.254.169.254",
            "100.64.0.1",
            "0.0.0.0",
            "255.255.255.255",
            "224.0.0.1",
            "198.18.0.1",
            "192.0.2.10",
        ] {
            assert!(is_blocked_ip(ip.parse().unwrap()), "{} should be blocked", ip);
        }
    }

    #[test]
    fn test_public_ipv4_allowed() {
        for ip in ["8.8.8.8", "1.1.1.1", "93.184.216.34", "100.128.0.1"] {
            assert!(!is_blocked_ip(ip.parse().unwrap()), "{} should be allowed", ip);
        }
    }

    #[test]
    fn test_blocked_ipv6_ranges() {
        for ip in ["::1", "::", "fe80::1", "fd00::1", "ff02::1", "2001:db8::1", "::ffff:127.0.0.1"] {
            assert!(is_blocked_ip(ip.parse().unwrap()), "{} should be blocked", ip);
        }
        assert!(!is_blocked_ip("2606:4700::1111".parse().unwrap()));
    }

    #[test]
    fn test_scheme_must_be_http() {
        let g = guard(true, &[]);
        assert!(g.check_static(&url("ftp://example.com/a.png")).is_err());
        assert!(g.check_static(&url("file:///etc/passwd")).is_err());
        assert!(g.check_static(&url("https://example.com/a.png")).is_ok());
    }

    #[test]
    fn test_literal_private_address_blocked() {
        let g = guard(false, &[]);
        assert!(g.check_static(&url("http://127.0.0.1:8080/a.png")).is_err());
        assert!(g.check_static(&url("http://[::1]/a.png")).is_err());
        assert!(g.check_static(&url("http://localhost/a.png")).is_err());
        assert!(g.check_static(&url("http://8.8.8.8/a.png")).is_ok());
    }

    #[test]
    fn test_private_allowed_when_configured() {
        let g = guard(true, &[]);
        assert!(g.check_static(&url("http://127.0.0.1:8080/a.png")).is_ok());
    }

    #[test]
    fn test_allow_list() {
        let g = guard(true, &["images.example.com", "*.cdn.example.net"]);
        assert!(g.check_static(&url("https://images.example.com/a.png")).is_ok());
        assert!(g.check_static(&url("https://IMAGES.example.com/a.png")).is_ok());
        assert!(g.check_static(&url("https://eu.cdn.example.net/a.png")).is_ok());
        assert!(g.check_static(&url("https://cdn.example.net/a.png")).is_err());
        assert!(g.check_static(&url("https://evilcdn.example.net/a.png")).is_err());
        assert!(g.check_static(&url("https://other.example.com/a.png")).is_err());
    }

    #[tokio::test]
    async fn test_resolve_public_refuses_loopback_name() {
        let result = resolve_public("localhost").await;
        assert!(matches!(result, Err(ResolveError::NonPublic { .. })));
    }

    #[tokio::test]
    async fn test_resolver_refuses_loopback_name() {
        let name: Name = "localhost".parse().unwrap();
        let err = match PublicOnlyResolver.resolve(name).await {
            Ok(_) => panic!("localhost must not resolve"),
            Err(e) => e,
        };
        assert!(err.downcast_ref::<ResolveError>().is_some());
    }
}
