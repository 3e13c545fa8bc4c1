//! Replica-set endpoint resolution.
//!
//! This module parses a replica-set seed specification of the form
//! `host1:port1,host2,host3:port3` into individual endpoints, and decides
//! between replica-set and single-host addressing for a connection attempt.
//!
//! Resolution stops at string parsing: no DNS lookups, no retries, no
//! duplicate elimination. An unknown host surfaces later, when the
//! connection manager opens the client.

use std::fmt;

use mongodb::options::ServerAddress;

use crate::config::ConnectionSettings;
use crate::error::{ConfigError, Result};

/// A single host (and optional port) candidate for a connection.
///
/// Constructed once per connection attempt, never mutated, and discarded
/// after the client is opened. An absent port means the driver default
/// (27017).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Hostname or address.
    pub host: String,

    /// Optional port; `None` selects the driver's standard port.
    pub port: Option<u16>,
}

impl Endpoint {
    /// Create an endpoint from a host and optional port.
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Convert into a driver [`ServerAddress`].
    pub fn to_server_address(&self) -> ServerAddress {
        ServerAddress::Tcp {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => write!(f, "{}", self.host),
        }
    }
}

/// Parse a comma-separated replica-set seed string into ordered endpoints.
///
/// Each token splits on the first colon into a host and an optional port;
/// both sides are trimmed. An empty port after the colon (`host:`) selects
/// the default port. A token with an empty or whitespace-only host is a
/// configuration error, as is a non-numeric port.
///
/// # Arguments
/// * `seeds` - The raw seed string, e.g. `"db1:27017,db2,db3:27018"`
///
/// # Returns
/// * `Result<Vec<Endpoint>>` - Endpoints in input order, or a configuration error
pub fn parse_replica_set(seeds: &str) -> Result<Vec<Endpoint>> {
    let mut endpoints = Vec::new();

    for token in seeds.split(',') {
        let (host_part, port_part) = match token.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (token, None),
        };

        let host = host_part.trim();
        if host.is_empty() {
            return Err(ConfigError::EmptySeedHost {
                token: token.to_string(),
            }
            .into());
        }

        let port = match port_part.map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<u16>().map_err(|_| {
                ConfigError::InvalidSeedPort {
                    token: token.to_string(),
                }
            })?),
        };

        endpoints.push(Endpoint::new(host, port));
    }

    Ok(endpoints)
}

/// Resolve the addressing mode for a connection attempt.
///
/// Replica-set mode wins whenever the seed string yields at least one
/// endpoint; otherwise `None` signals single-host mode, which uses the
/// settings' `hostname`/`port` (hostname presence is validated earlier, at
/// settings-check time).
pub fn resolve_endpoints(settings: &ConnectionSettings) -> Result<Option<Vec<Endpoint>>> {
    match settings.replica_set.as_deref().map(str::trim) {
        Some(seeds) if !seeds.is_empty() => {
            let endpoints = parse_replica_set(seeds)?;
            if endpoints.is_empty() {
                Ok(None)
            } else {
                Ok(Some(endpoints))
            }
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BatchError;

    #[test]
    fn test_parse_mixed_seeds_in_order() {
        let endpoints = parse_replica_set("h1:1234,h2,h3:4321").unwrap();
        assert_eq!(
            endpoints,
            vec![
                Endpoint::new("h1", Some(1234)),
                Endpoint::new("h2", None),
                Endpoint::new("h3", Some(4321)),
            ]
        );
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let endpoints = parse_replica_set(" db1 : 27017 , db2 ").unwrap();
        assert_eq!(
            endpoints,
            vec![
                Endpoint::new("db1", Some(27017)),
                Endpoint::new("db2", None),
            ]
        );
    }

    #[test]
    fn test_parse_empty_port_means_default() {
        let endpoints = parse_replica_set("db1:").unwrap();
        assert_eq!(endpoints, vec![Endpoint::new("db1", None)]);
    }

    #[test]
    fn test_parse_rejects_empty_host() {
        let err = parse_replica_set("db1,:27017").unwrap_err();
        assert!(matches!(
            err,
            BatchError::Config(ConfigError::EmptySeedHost { .. })
        ));

        // A trailing comma produces an empty token, which is rejected too.
        let err = parse_replica_set("db1,").unwrap_err();
        assert!(matches!(
            err,
            BatchError::Config(ConfigError::EmptySeedHost { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_non_numeric_port() {
        let err = parse_replica_set("db1:abc").unwrap_err();
        assert!(matches!(
            err,
            BatchError::Config(ConfigError::InvalidSeedPort { .. })
        ));
    }

    #[test]
    fn test_resolve_prefers_replica_set() {
        let settings = ConnectionSettings {
            hostname: Some("ignored".to_string()),
            replica_set: Some("db1,db2".to_string()),
            ..ConnectionSettings::for_database("test")
        };
        let endpoints = resolve_endpoints(&settings).unwrap().unwrap();
        assert_eq!(endpoints.len(), 2);
    }

    #[test]
    fn test_resolve_blank_replica_set_is_single_host() {
        let settings = ConnectionSettings {
            hostname: Some("localhost".to_string()),
            replica_set: Some("   ".to_string()),
            ..ConnectionSettings::for_database("test")
        };
        assert!(resolve_endpoints(&settings).unwrap().is_none());

        let settings = ConnectionSettings::for_database("test");
        assert!(resolve_endpoints(&settings).unwrap().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Endpoint::new("db1", Some(27017)).to_string(), "db1:27017");
        assert_eq!(Endpoint::new("db1", None).to_string(), "db1");
    }

    #[test]
    fn test_server_address_conversion() {
        let addr = Endpoint::new("db1", Some(27018)).to_server_address();
        match addr {
            ServerAddress::Tcp { host, port } => {
                assert_eq!(host, "db1");
                assert_eq!(port, Some(27018));
            }
            _ => panic!("expected TCP address"),
        }
    }
}
