//! Configuration types for the ring cache.

use crate::error::{Error, NetworkError, Result};
use crate::partitioning::DEFAULT_VIRTUAL_NODES;
use std::collections::HashSet;
use std::net::SocketAddr;

/// Default address for the HTTP façade.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Configuration for a [`DistributedCache`](crate::DistributedCache).
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Number of ring positions each owner occupies.
    pub virtual_nodes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            virtual_nodes: DEFAULT_VIRTUAL_NODES,
        }
    }
}

impl CacheConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of virtual positions per owner.
    pub fn with_virtual_nodes(mut self, virtual_nodes: usize) -> Self {
        self.virtual_nodes = virtual_nodes;
        self
    }

    /// Check that the configuration can build a usable ring.
    pub fn validate(&self) -> Result<()> {
        if self.virtual_nodes == 0 {
            return Err(Error::Config(
                "virtual_nodes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the HTTP server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind_addr: SocketAddr,

    /// Owners attached before the first request is served.
    pub initial_owners: Vec<String>,

    /// Cache settings.
    pub cache: CacheConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            initial_owners: (0..3).map(|i| format!("node{}", i)).collect(),
            cache: CacheConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a server configuration bound to the given address.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }

    /// Parse a bind address.
    pub fn parse_bind_addr(addr: &str) -> Result<SocketAddr> {
        addr.parse()
            .map_err(|_| NetworkError::InvalidAddress(addr.to_string()).into())
    }

    /// Replace the initial owner set.
    pub fn with_initial_owners<I, S>(mut self, owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.initial_owners = owners.into_iter().map(Into::into).collect();
        self
    }

    /// Set the cache configuration.
    pub fn with_cache_config(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Set the number of virtual positions per owner.
    pub fn with_virtual_nodes(mut self, virtual_nodes: usize) -> Self {
        self.cache.virtual_nodes = virtual_nodes;
        self
    }

    /// Validate the cache settings and the initial owner names.
    pub fn validate(&self) -> Result<()> {
        self.cache.validate()?;

        let mut seen = HashSet::new();
        for name in &self.initial_owners {
            if name.trim().is_empty() {
                return Err(Error::Config("initial owner names must not be blank".to_string()));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::Config(format!("duplicate initial owner: {}", name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cache_config() {
        let config = CacheConfig::default();
        assert_eq!(config.virtual_nodes, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_virtual_nodes_rejected() {
        let config = CacheConfig::new().with_virtual_nodes(0);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.initial_owners, vec!["node0", "node1", "node2"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_config_rejects_bad_owners() {
        let blank = ServerConfig::default().with_initial_owners(["a", "  "]);
        assert!(matches!(blank.validate(), Err(Error::Config(_))));

        let dup = ServerConfig::default().with_initial_owners(["a", "b", "a"]);
        assert!(matches!(dup.validate(), Err(Error::Config(_))));

        let empty = ServerConfig::default().with_initial_owners(Vec::<String>::new());
        assert!(empty.validate().is_ok());
    }

    #[test]
    fn test_parse_bind_addr() {
        assert!(ServerConfig::parse_bind_addr("0.0.0.0:9000").is_ok());
        assert!(matches!(
            ServerConfig::parse_bind_addr("not-an-addr"),
            Err(Error::Network(NetworkError::InvalidAddress(_)))
        ));
    }
}
