//! Configuration for the fetcher module.

use serde::{Deserialize, Serialize};

/// Configuration for the HTTP image fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Deadline for the whole fetch (download and validation) in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// TCP connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Largest accepted image body in bytes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// Maximum redirects followed.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Allow URLs resolving to loopback, private or link-local addresses.
    #[serde(default)]
    pub allow_private_networks: bool,

    /// If non-empty, only these hosts may be fetched. Entries are exact host
    /// names or `*.suffix` wildcards.
    #[serde(default)]
    pub allowed_hosts: Vec<String>,

    /// User agent sent with image requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_bytes() -> u64 {
    20 * 1024 * 1024
}

fn default_max_redirects() -> usize {
    5
}

fn default_user_agent() -> String {
    format!("vidspeak/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            max_bytes: default_max_bytes(),
            max_redirects: default_max_redirects(),
            allow_private_networks: false,
            allowed_hosts: Vec::new(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetcherConfig {
    /// Allows private network targets (local test servers).
    pub fn allowing_private_networks(mut self) -> Self {
        self.allow_private_networks = true;
        self
    }

    /// Sets the body size limit.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Sets the host allow-list.
    pub fn with_allowed_hosts(mut self, hosts: Vec<String>) -> Self {
        self.allowed_hosts = hosts;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FetcherConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_bytes, 20 * 1024 * 1024);
        assert!(!config.allow_private_networks);
        assert!(config.allowed_hosts.is_empty());
        assert!(config.user_agent.starts_with("vidspeak/"));
    }

    #[test]
    fn test_config_builder() {
        let config = FetcherConfig::default()
            .allowing_private_networks()
            .with_max_bytes(1024)
            .with_allowed_hosts(vec!["example.com".to_string()]);

        assert!(config.allow_private_networks);
        assert_eq!(config.max_bytes, 1024);
        assert_eq!(config.allowed_hosts, vec!["example.com".to_string()]);
    }
}
