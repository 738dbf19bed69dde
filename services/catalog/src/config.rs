use crate::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL, InvalidationPolicy};
use crate::model::CarPayload;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_BIND: &str = "0.0.0.0:3000";
const DEFAULT_METRICS_BIND: &str = "0.0.0.0:9090";

// Catalog service configuration sourced from environment variables.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub cache_ttl: Duration,
    pub cache_invalidation: InvalidationPolicy,
    pub cache_max_entries: usize,
    pub seed_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    cache_ttl_ms: Option<u64>,
    cache_invalidation: Option<InvalidationPolicy>,
    cache_max_entries: Option<usize>,
    seed_file: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            metrics_bind: SocketAddr::from(([0, 0, 0, 0], 9090)),
            cache_ttl: DEFAULT_TTL,
            cache_invalidation: InvalidationPolicy::default(),
            cache_max_entries: DEFAULT_MAX_ENTRIES,
            seed_file: None,
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = env_or("CATALOG_BIND", DEFAULT_BIND)
            .parse()
            .with_context(|| "parse CATALOG_BIND")?;
        let metrics_bind = env_or("CATALOG_METRICS_BIND", DEFAULT_METRICS_BIND)
            .parse()
            .with_context(|| "parse CATALOG_METRICS_BIND")?;
        let cache_ttl = match std::env::var("CATALOG_CACHE_TTL_MS") {
            Ok(value) => Duration::from_millis(
                value
                    .trim()
                    .parse()
                    .with_context(|| "parse CATALOG_CACHE_TTL_MS")?,
            ),
            Err(_) => DEFAULT_TTL,
        };
        let cache_invalidation = match std::env::var("CATALOG_CACHE_INVALIDATION") {
            Ok(value) => value
                .parse()
                .map_err(anyhow::Error::msg)
                .with_context(|| "parse CATALOG_CACHE_INVALIDATION")?,
            Err(_) => InvalidationPolicy::default(),
        };
        let cache_max_entries = match std::env::var("CATALOG_CACHE_MAX_ENTRIES") {
            Ok(value) => value
                .trim()
                .parse()
                .with_context(|| "parse CATALOG_CACHE_MAX_ENTRIES")?,
            Err(_) => DEFAULT_MAX_ENTRIES,
        };
        let seed_file = std::env::var_os("CATALOG_SEED_FILE")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Ok(Self {
            bind_addr,
            metrics_bind,
            cache_ttl,
            cache_invalidation,
            cache_max_entries,
            seed_file,
        })
    }

    /// Environment configuration, then the YAML file named by
    /// `CATALOG_CONFIG` (if set) on top of it.
    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("CATALOG_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read CATALOG_CONFIG: {path}"))?;
            config.apply_yaml(&contents)?;
        }
        Ok(config)
    }

    fn apply_yaml(&mut self, contents: &str) -> Result<()> {
        let override_cfg: CatalogConfigOverride =
            serde_yaml::from_str(contents).with_context(|| "parse catalog config yaml")?;
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = override_cfg.metrics_bind {
            self.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
        }
        if let Some(value) = override_cfg.cache_ttl_ms {
            self.cache_ttl = Duration::from_millis(value);
        }
        if let Some(value) = override_cfg.cache_invalidation {
            self.cache_invalidation = value;
        }
        if let Some(value) = override_cfg.cache_max_entries {
            self.cache_max_entries = value;
        }
        if let Some(value) = override_cfg.seed_file {
            self.seed_file = Some(value);
        }
        Ok(())
    }
}

/// Load the startup seed: a JSON array of car payloads.
///
/// Records are validated later, one by one, when they are inserted.
pub fn read_seed_file(path: &Path) -> Result<Vec<CarPayload>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read seed file: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parse seed file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const VARS: [&str; 7] = [
        "CATALOG_BIND",
        "CATALOG_METRICS_BIND",
        "CATALOG_CACHE_TTL_MS",
        "CATALOG_CACHE_INVALIDATION",
        "CATALOG_CACHE_MAX_ENTRIES",
        "CATALOG_SEED_FILE",
        "CATALOG_CONFIG",
    ];

    struct EnvGuard {
        saved: Vec<(&'static str, Option<String>)>,
    }

    impl EnvGuard {
        fn clean() -> Self {
            let saved = VARS
                .iter()
                .map(|key| (*key, std::env::var(key).ok()))
                .collect();
            for key in VARS {
                unsafe { std::env::remove_var(key) };
            }
            Self { saved }
        }

        fn set(&self, key: &str, value: &str) {
            unsafe { std::env::set_var(key, value) };
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.saved {
                match value {
                    Some(value) => unsafe { std::env::set_var(key, value) },
                    None => unsafe { std::env::remove_var(key) },
                }
            }
        }
    }

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[test]
    #[serial]
    fn defaults_without_env() {
        let _guard = EnvGuard::clean();
        let config = CatalogConfig::from_env().expect("config");
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.metrics_bind.port(), 9090);
        assert_eq!(config.cache_ttl, Duration::from_millis(600_000));
        assert_eq!(config.cache_invalidation, InvalidationPolicy::All);
        assert_eq!(config.cache_max_entries, 10_000);
        assert!(config.seed_file.is_none());
    }

    #[test]
    #[serial]
    fn env_values_are_parsed() {
        let guard = EnvGuard::clean();
        guard.set("CATALOG_BIND", "127.0.0.1:4000");
        guard.set("CATALOG_METRICS_BIND", "127.0.0.1:4001");
        guard.set("CATALOG_CACHE_TTL_MS", "1500");
        guard.set("CATALOG_CACHE_INVALIDATION", "listing");
        guard.set("CATALOG_CACHE_MAX_ENTRIES", "64");
        guard.set("CATALOG_SEED_FILE", "/tmp/cars.json");
        let config = CatalogConfig::from_env().expect("config");
        assert_eq!(config.cache_max_entries, 64);
        assert_eq!(config.bind_addr, "127.0.0.1:4000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.metrics_bind, "127.0.0.1:4001".parse::<SocketAddr>().unwrap());
        assert_eq!(config.cache_ttl, Duration::from_millis(1500));
        assert_eq!(config.cache_invalidation, InvalidationPolicy::Listing);
        assert_eq!(config.seed_file, Some(PathBuf::from("/tmp/cars.json")));
    }

    #[test]
    #[serial]
    fn invalid_env_values_are_errors() {
        let guard = EnvGuard::clean();
        guard.set("CATALOG_BIND", "not-an-addr");
        let err = CatalogConfig::from_env().expect_err("bad bind");
        assert!(err.to_string().contains("CATALOG_BIND"));

        guard.set("CATALOG_BIND", "127.0.0.1:4000");
        guard.set("CATALOG_CACHE_INVALIDATION", "sometimes");
        let err = CatalogConfig::from_env().expect_err("bad policy");
        assert!(err.to_string().contains("CATALOG_CACHE_INVALIDATION"));
    }

    #[test]
    #[serial]
    fn yaml_overrides_env() {
        let guard = EnvGuard::clean();
        guard.set("CATALOG_BIND", "127.0.0.1:4000");
        let file = write_temp(
            "bind_addr: \"127.0.0.1:5000\"\ncache_ttl_ms: 250\ncache_invalidation: listing\ncache_max_entries: 32\n",
        );
        guard.set("CATALOG_CONFIG", file.path().to_str().expect("utf8 path"));
        let config = CatalogConfig::from_env_or_yaml().expect("config");
        assert_eq!(config.bind_addr, "127.0.0.1:5000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.metrics_bind.port(), 9090);
        assert_eq!(config.cache_ttl, Duration::from_millis(250));
        assert_eq!(config.cache_max_entries, 32);
        assert_eq!(config.cache_invalidation, InvalidationPolicy::Listing);
    }

    #[test]
    #[serial]
    fn missing_yaml_file_is_an_error() {
        let guard = EnvGuard::clean();
        guard.set("CATALOG_CONFIG", "/definitely/not/here.yaml");
        let err = CatalogConfig::from_env_or_yaml().expect_err("missing file");
        assert!(err.to_string().contains("CATALOG_CONFIG"));
    }

    #[test]
    fn unknown_yaml_keys_are_rejected() {
        let mut config = CatalogConfig::default();
        assert!(config.apply_yaml("region_id: eu\n").is_err());
    }

    #[test]
    fn seed_file_is_a_json_array_of_payloads() {
        let file = write_temp(
            r#"[{"id": "A", "make": "Mazda", "year": 2020}, {"description": "no id"}]"#,
        );
        let payloads = read_seed_file(file.path()).expect("seed");
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].id.as_deref(), Some("A"));
        assert!(payloads[1].id.is_none());

        let bad = write_temp("{\"not\": \"a list\"}");
        assert!(read_seed_file(bad.path()).is_err());
    }
}
