use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

use prov_engine::EngineConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Service configuration, usually read from a TOML file.
///
/// ```toml
/// bind_addr = "0.0.0.0:5000"
///
/// [engine]
/// cache_ttl_secs = 60
///
/// [engine.retry]
/// max_attempts = 5
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub engine: EngineConfig,
}

impl ServiceConfig {
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 5000)),
            engine: EngineConfig::default(),
        }
    }
}
