use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Runtime configuration for an Ent server.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listen address.
    pub bind_addr: SocketAddr,
    /// Root directory of the disk storage engine.
    pub fs_root: PathBuf,
    /// Directory holding `.entpolicy` bucket policies.
    pub provider_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 5555)),
            fs_root: PathBuf::from("/tmp"),
            provider_dir: PathBuf::from("/tmp"),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(input: &str) -> ServerResult<Self> {
        toml::from_str(input).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let input = fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "0.0.0.0:5555".parse::<SocketAddr>().unwrap());
        assert_eq!(c.fs_root, PathBuf::from("/tmp"));
        assert_eq!(c.provider_dir, PathBuf::from("/tmp"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ServerConfig::from_toml_str("fs_root = \"/var/lib/ent\"\n").unwrap();
        assert_eq!(c.fs_root, PathBuf::from("/var/lib/ent"));
        assert_eq!(c.bind_addr, ServerConfig::default().bind_addr);
    }

    #[test]
    fn full_toml() {
        let c = ServerConfig::from_toml_str(
            r#"
            bind_addr = "127.0.0.1:8080"
            fs_root = "/data"
            provider_dir = "/etc/ent"
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 8080);
        assert_eq!(c.provider_dir, PathBuf::from("/etc/ent"));
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = ServerConfig::from_toml_str("bind_addr = 5").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ent.toml");
        fs::write(&path, "provider_dir = \"/policies\"").unwrap();
        assert_eq!(ServerConfig::load(&path).unwrap().provider_dir, PathBuf::from("/policies"));
        assert!(ServerConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
