//! Broker client configuration
//!
//! Properties come from a properties file (explicit path or `KAFKA_PROPERTIES`)
//! or, failing that, from `KAFKA_BOOTSTRAP_SERVERS`. Consumer and producer
//! overrides are layered on top when a client is built.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use shared::{SharedError, SharedResult};

pub const PROPERTIES_ENV: &str = "KAFKA_PROPERTIES";
pub const BOOTSTRAP_SERVERS_ENV: &str = "KAFKA_BOOTSTRAP_SERVERS";
pub const DEFAULT_BOOTSTRAP_SERVERS: &str = "localhost:9092";
pub const CONSUMER_GROUP_ID: &str = "scenario-runner";
/// Topic the connectivity probe publishes its marker message to
pub const PROBE_TOPIC: &str = "scenario-runner";

/// Where the base properties were read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    PropertiesFile(PathBuf),
    Environment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    properties: BTreeMap<String, String>,
    source: ConfigSource,
}

impl BrokerConfig {
    /// Resolve configuration from the process environment
    pub fn from_env(explicit_path: Option<&Path>) -> SharedResult<Self> {
        Self::resolve(explicit_path, |key| std::env::var(key).ok())
    }

    /// Resolve configuration with an injectable environment lookup
    pub fn resolve<F>(explicit_path: Option<&Path>, lookup: F) -> SharedResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = explicit_path {
            return Self::from_properties_file(path);
        }
        if let Some(path) = lookup(PROPERTIES_ENV).filter(|p| !p.trim().is_empty()) {
            return Self::from_properties_file(Path::new(path.trim()));
        }

        let bootstrap = lookup(BOOTSTRAP_SERVERS_ENV)
            .filter(|servers| !servers.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BOOTSTRAP_SERVERS.to_string());
        let mut properties = BTreeMap::new();
        properties.insert("bootstrap.servers".to_string(), bootstrap);
        Ok(Self {
            properties,
            source: ConfigSource::Environment,
        })
    }

    pub fn from_properties_file(path: &Path) -> SharedResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| SharedError::InvalidConfig {
            field: PROPERTIES_ENV.to_string(),
            value: format!("{} ({e})", path.display()),
        })?;
        Ok(Self {
            properties: parse_properties(&source)?,
            source: ConfigSource::PropertiesFile(path.to_path_buf()),
        })
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn bootstrap_servers(&self) -> Option<&str> {
        self.properties.get("bootstrap.servers").map(String::as_str)
    }

    /// Consumer settings: dedicated group, read from the earliest offset
    pub fn consumer_properties(&self) -> BTreeMap<String, String> {
        self.with_overrides(&[
            ("group.id", CONSUMER_GROUP_ID),
            ("auto.offset.reset", "earliest"),
            ("enable.partition.eof", "false"),
        ])
    }

    /// Producer settings: idempotent, one retry, bounded delivery time
    pub fn producer_properties(&self) -> BTreeMap<String, String> {
        self.with_overrides(&[
            ("max.in.flight.requests.per.connection", "1"),
            ("enable.idempotence", "true"),
            ("retries", "1"),
            ("delivery.timeout.ms", "30000"),
        ])
    }

    /// Producer settings for the connectivity probe, which must fail fast
    pub fn probe_producer_properties(&self) -> BTreeMap<String, String> {
        let mut properties = self.producer_properties();
        properties.insert("delivery.timeout.ms".to_string(), "3000".to_string());
        properties
    }

    fn with_overrides(&self, overrides: &[(&str, &str)]) -> BTreeMap<String, String> {
        let mut properties = self.properties.clone();
        for (key, value) in overrides {
            properties.insert((*key).to_string(), (*value).to_string());
        }
        properties
    }
}

/// Parse `key=value` / `key: value` lines; `#`, `!` and `;` start comments
pub fn parse_properties(source: &str) -> SharedResult<BTreeMap<String, String>> {
    let mut properties = BTreeMap::new();
    for (index, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(['#', '!', ';']) {
            continue;
        }
        let Some(split) = line.find(['=', ':']) else {
            return Err(SharedError::InvalidConfig {
                field: format!("properties line {}", index + 1),
                value: line.to_string(),
            });
        };
        let key = line[..split].trim();
        let value = line[split + 1..].trim();
        if key.is_empty() {
            return Err(SharedError::InvalidConfig {
                field: format!("properties line {}", index + 1),
                value: line.to_string(),
            });
        }
        properties.insert(key.to_string(), value.to_string());
    }
    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_to_localhost() {
        let config = BrokerConfig::resolve(None, no_env).unwrap();
        assert_eq!(config.bootstrap_servers(), Some(DEFAULT_BOOTSTRAP_SERVERS));
        assert_eq!(config.source(), &ConfigSource::Environment);
    }

    #[test]
    fn test_bootstrap_servers_from_env() {
        let config = BrokerConfig::resolve(None, |key| {
            (key == BOOTSTRAP_SERVERS_ENV).then(|| "broker-1:9092,broker-2:9092".to_string())
        })
        .unwrap();
        assert_eq!(config.bootstrap_servers(), Some("broker-1:9092,broker-2:9092"));
    }

    #[test]
    fn test_properties_file_from_env_wins_over_bootstrap() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "# cluster\nbootstrap.servers = kafka:29092\nsecurity.protocol: PLAINTEXT"
        )
        .unwrap();
        let path = file.path().display().to_string();

        let config = BrokerConfig::resolve(None, |key| match key {
            PROPERTIES_ENV => Some(path.clone()),
            BOOTSTRAP_SERVERS_ENV => Some("ignored:9092".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.bootstrap_servers(), Some("kafka:29092"));
        assert_eq!(
            config.properties().get("security.protocol").map(String::as_str),
            Some("PLAINTEXT")
        );
    }

    #[test]
    fn test_missing_properties_file() {
        assert_matches!(
            BrokerConfig::resolve(Some(Path::new("/no/such/file.properties")), no_env),
            Err(SharedError::InvalidConfig { .. })
        );
    }

    #[test]
    fn test_line_without_separator_is_rejected() {
        let error = parse_properties("bootstrap.servers=a:1\njunk\n").unwrap_err();
        assert!(error.to_string().contains("properties line 2"));
    }

    #[test]
    fn test_consumer_overrides() {
        let properties = BrokerConfig::resolve(None, no_env).unwrap().consumer_properties();
        assert_eq!(properties["group.id"], CONSUMER_GROUP_ID);
        assert_eq!(properties["auto.offset.reset"], "earliest");
        assert_eq!(properties["bootstrap.servers"], DEFAULT_BOOTSTRAP_SERVERS);
    }

    #[test]
    fn test_producer_is_idempotent_and_probe_fails_fast() {
        let config = BrokerConfig::resolve(None, no_env).unwrap();
        let producer = config.producer_properties();
        assert_eq!(producer["enable.idempotence"], "true");
        assert_eq!(producer["retries"], "1");
        assert_eq!(producer["delivery.timeout.ms"], "30000");
        assert_eq!(config.probe_producer_properties()["delivery.timeout.ms"], "3000");
    }
}
