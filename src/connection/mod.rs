//! Connection management for the batch runner
//!
//! This module owns the single client used by a batch run:
//! - Endpoint selection (replica set or single host) via the resolver
//! - Optional driver tunables applied onto the client options
//! - Credential attachment (named store entry or inline settings)
//! - A post-open ping so unknown hosts fail the batch at open time
//!
//! One manager is opened per batch invocation and reused for every script
//! in every directory. It is never closed explicitly; process teardown
//! closes the client.

use bson::doc;
use mongodb::{Client, Database, options::ClientOptions, options::Credential};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{ConnectionSettings, Credentials, DriverOptions};
use crate::endpoint::{Endpoint, resolve_endpoints};
use crate::error::{ConfigError, ConnectionError, Result, extract_error_info};

/// Owns the MongoDB client for the lifetime of one batch run.
pub struct ConnectionManager {
    /// MongoDB client instance, present after a successful `connect`
    client: Option<Client>,

    /// Connection settings
    settings: ConnectionSettings,

    /// Credentials resolved at construction time (store entry or inline)
    credentials: Option<Credentials>,
}

impl ConnectionManager {
    /// Create a new connection manager.
    ///
    /// # Arguments
    /// * `settings` - Connection settings (already validated by `check_settings`)
    /// * `credentials` - Resolved credentials, or `None` for unauthenticated access
    pub fn new(settings: ConnectionSettings, credentials: Option<Credentials>) -> Self {
        Self {
            client: None,
            settings,
            credentials,
        }
    }

    /// Open the client and verify the deployment is reachable.
    ///
    /// Replica-set mode is used when the seed string yields endpoints,
    /// single-host mode otherwise. Unknown hosts and server-selection
    /// failures surface here as a fatal connection error; the batch is
    /// aborted with no partial fallback.
    pub async fn connect(&mut self) -> Result<()> {
        let endpoints = self.addressing()?;
        info!(
            endpoints = %endpoints
                .iter()
                .map(Endpoint::to_string)
                .collect::<Vec<_>>()
                .join(","),
            database = %self.settings.database,
            "opening connection"
        );

        let mut options = ClientOptions::builder()
            .hosts(endpoints.iter().map(Endpoint::to_server_address).collect::<Vec<_>>())
            .build();

        if let Some(driver_options) = &self.settings.options {
            apply_driver_options(&mut options, driver_options);
        }
        options.credential = self.build_credential();

        let client = Client::with_options(options)?;

        // The driver connects lazily; ping now so an unresolvable host is
        // reported at open time instead of at the first script.
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| {
                let message = extract_error_info(&e).summary();
                if matches!(e.kind.as_ref(), mongodb::error::ErrorKind::ServerSelection { .. }) {
                    ConnectionError::ConnectionFailed(message)
                } else {
                    ConnectionError::PingFailed(message)
                }
            })?;

        self.client = Some(client);
        Ok(())
    }

    /// Endpoints for this connection attempt: the parsed replica-set seeds,
    /// or the single configured host.
    fn addressing(&self) -> Result<Vec<Endpoint>> {
        if let Some(endpoints) = resolve_endpoints(&self.settings)? {
            return Ok(endpoints);
        }

        let hostname = self
            .settings
            .hostname
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ConfigError::NoAddress {
                settings: "connection".to_string(),
            })?;

        Ok(vec![Endpoint::new(hostname, self.settings.port)])
    }

    /// Build the driver credential, if authentication applies.
    ///
    /// Authentication requires both a username and a password; a username
    /// alone silently skips authentication (long-standing behavior, kept).
    fn build_credential(&self) -> Option<Credential> {
        let creds = self.credentials.as_ref()?;
        match &creds.password {
            Some(password) => Some(
                Credential::builder()
                    .username(creds.username.clone())
                    .password(password.clone())
                    .build(),
            ),
            None => {
                debug!(
                    username = %creds.username,
                    "username configured without password, skipping authentication"
                );
                None
            }
        }
    }

    /// Get the MongoDB client.
    ///
    /// # Returns
    /// * `Result<&Client>` - Reference to the client, or an error if not connected
    pub fn client(&self) -> Result<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| ConnectionError::ConnectionFailed("not connected".to_string()).into())
    }

    /// Get the handle for the configured target database.
    pub fn database(&self) -> Result<Database> {
        Ok(self.client()?.database(&self.settings.database))
    }

    /// Drop the configured database.
    ///
    /// Destructive tooling operation outside the batch-execution path.
    /// No confirmation, no undo.
    pub async fn drop_database(&self) -> Result<()> {
        warn!(database = %self.settings.database, "dropping database");
        self.database()?.drop().await?;
        Ok(())
    }

    /// Whether `connect` has completed successfully.
    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }
}

/// Apply the optional driver tunables onto the client options.
fn apply_driver_options(options: &mut ClientOptions, driver: &DriverOptions) {
    if let Some(secs) = driver.connect_timeout_secs {
        options.connect_timeout = Some(Duration::from_secs(secs));
    }
    if let Some(secs) = driver.server_selection_timeout_secs {
        options.server_selection_timeout = Some(Duration::from_secs(secs));
    }
    if let Some(size) = driver.max_pool_size {
        options.max_pool_size = Some(size);
    }
    if let Some(direct) = driver.direct_connection {
        options.direct_connection = Some(direct);
    }
    if let Some(name) = &driver.app_name {
        options.app_name = Some(name.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::options::ServerAddress;

    fn manager(settings: ConnectionSettings, creds: Option<Credentials>) -> ConnectionManager {
        ConnectionManager::new(settings, creds)
    }

    #[test]
    fn test_addressing_single_host() {
        let settings = ConnectionSettings {
            hostname: Some("db.internal".to_string()),
            port: Some(27018),
            ..ConnectionSettings::for_database("app")
        };
        let endpoints = manager(settings, None).addressing().unwrap();
        assert_eq!(endpoints, vec![Endpoint::new("db.internal", Some(27018))]);
    }

    #[test]
    fn test_addressing_replica_set_wins() {
        let settings = ConnectionSettings {
            hostname: Some("single".to_string()),
            replica_set: Some("db1:27017,db2".to_string()),
            ..ConnectionSettings::for_database("app")
        };
        let endpoints = manager(settings, None).addressing().unwrap();
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0], Endpoint::new("db1", Some(27017)));
    }

    #[test]
    fn test_addressing_fails_without_hostname() {
        let settings = ConnectionSettings::for_database("app");
        assert!(manager(settings, None).addressing().is_err());
    }

    #[test]
    fn test_credential_requires_password() {
        let settings = ConnectionSettings::for_database("app");
        let creds = Credentials {
            username: "svc".to_string(),
            password: None,
        };
        // Username without password: no credential, authentication skipped.
        assert!(manager(settings.clone(), Some(creds)).build_credential().is_none());

        let creds = Credentials {
            username: "svc".to_string(),
            password: Some("secret".to_string()),
        };
        let credential = manager(settings, Some(creds)).build_credential().unwrap();
        assert_eq!(credential.username.as_deref(), Some("svc"));
    }

    #[test]
    fn test_no_credentials_no_auth() {
        let settings = ConnectionSettings::for_database("app");
        assert!(manager(settings, None).build_credential().is_none());
    }

    #[test]
    fn test_apply_driver_options() {
        let mut options = ClientOptions::builder()
            .hosts(vec![ServerAddress::Tcp {
                host: "localhost".to_string(),
                port: None,
            }])
            .build();
        let driver = DriverOptions {
            connect_timeout_secs: Some(5),
            server_selection_timeout_secs: Some(7),
            max_pool_size: Some(3),
            direct_connection: Some(true),
            app_name: Some("loader".to_string()),
        };
        apply_driver_options(&mut options, &driver);
        assert_eq!(options.connect_timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.server_selection_timeout, Some(Duration::from_secs(7)));
        assert_eq!(options.max_pool_size, Some(3));
        assert_eq!(options.direct_connection, Some(true));
        assert_eq!(options.app_name.as_deref(), Some("loader"));
    }

    #[test]
    fn test_client_before_connect_errors() {
        let settings = ConnectionSettings::for_database("app");
        let manager = manager(settings, None);
        assert!(!manager.is_connected());
        assert!(manager.client().is_err());
        assert!(manager.database().is_err());
    }
}
