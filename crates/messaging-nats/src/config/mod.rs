use crate::connection::Error;

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(2);

const fn default_is_test() -> bool {
    true
}

/// Configuration for a [`NatsConnection`](crate::NatsConnection).
///
/// ```yaml
/// hosts: ["nats://127.0.0.1:4222"]
/// nkey: SUAM...
/// IsTest: false
/// natsSubjects:
///   userEventSubject: users.events
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct NatsConnectionConfig {
    /// Server URLs to connect to.
    pub hosts: Vec<String>,

    /// NKey seed used to authenticate. Required unless `is_test` is set.
    #[serde(default)]
    pub nkey: Option<String>,

    /// Skips NKey authentication (local and test servers). Defaults to `true`.
    #[serde(default = "default_is_test", rename = "IsTest", alias = "isTest")]
    pub is_test: bool,

    /// Named subjects the application consumes, keyed by purpose.
    #[serde(default, rename = "natsSubjects")]
    pub subjects: BTreeMap<String, String>,

    /// Bound on a single handler invocation, in milliseconds. Defaults to 2 seconds.
    #[serde(default, rename = "handlerTimeoutMs")]
    pub handler_timeout_ms: Option<u64>,

    /// Timeout for establishing a connection, in milliseconds. Defaults to 2 seconds.
    #[serde(default, rename = "connectionTimeoutMs")]
    pub connection_timeout_ms: Option<u64>,
}

impl NatsConnectionConfig {
    /// Config for an unauthenticated server at `host`.
    pub fn test(host: impl Into<String>) -> Self {
        Self {
            hosts: vec![host.into()],
            nkey: None,
            is_test: true,
            subjects: BTreeMap::new(),
            handler_timeout_ms: None,
            connection_timeout_ms: None,
        }
    }

    /// Parses a config from YAML.
    ///
    /// # Errors
    /// Returns an error if the document does not describe a valid config.
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads and parses a YAML config file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| Error::ReadConfig {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml(&yaml)
    }

    /// Looks up a named subject.
    ///
    /// # Errors
    /// Returns an error if no subject is configured under `name`.
    pub fn subject(&self, name: &str) -> Result<&str, Error> {
        self.subjects
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| Error::MissingSubject(name.to_string()))
    }

    pub(crate) fn handler_timeout(&self) -> Option<Duration> {
        self.handler_timeout_ms.map(Duration::from_millis)
    }

    pub(crate) fn connection_timeout(&self) -> Duration {
        self.connection_timeout_ms
            .map_or(DEFAULT_CONNECTION_TIMEOUT, Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_matches::assert_matches;

    #[test]
    fn test_parse_full_config() {
        let config = NatsConnectionConfig::from_yaml(
            r"
hosts:
  - nats://10.0.0.1:4222
  - nats://10.0.0.2:4222
nkey: SUACSSL3UAHUDXKFSNVUZRF5UHPMWZ6BFDTJ7M6USDXIEDNPPQYYYCU3VY
IsTest: false
natsSubjects:
  userEventSubject: users.events
handlerTimeoutMs: 500
",
        )
        .unwrap();

        assert_eq!(config.hosts.len(), 2);
        assert!(!config.is_test);
        assert!(config.nkey.is_some());
        assert_eq!(config.subject("userEventSubject").unwrap(), "users.events");
        assert_eq!(config.handler_timeout(), Some(Duration::from_millis(500)));
        assert_eq!(config.connection_timeout(), DEFAULT_CONNECTION_TIMEOUT);
    }

    #[test]
    fn test_defaults() {
        let config = NatsConnectionConfig::from_yaml("hosts: [nats://127.0.0.1:4222]").unwrap();

        assert!(config.is_test);
        assert!(config.nkey.is_none());
        assert!(config.subjects.is_empty());
        assert_eq!(config.handler_timeout(), None);
        assert_matches!(
            config.subject("userEventSubject"),
            Err(Error::MissingSubject(name)) if name == "userEventSubject"
        );
    }

    #[test]
    fn test_missing_hosts_is_rejected() {
        assert_matches!(
            NatsConnectionConfig::from_yaml("nkey: abc"),
            Err(Error::ParseConfig(_))
        );
    }

    #[test]
    fn test_missing_file() {
        assert_matches!(
            NatsConnectionConfig::from_file("/definitely/not/here.yaml"),
            Err(Error::ReadConfig { .. })
        );
    }
}
