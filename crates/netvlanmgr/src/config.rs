//! Configuration file support for netvlanmgr
//!
//! Loads and validates netvlanmgr configuration from TOML files.
//! Default location: /etc/netvlanmgr/netvlanmgr.toml
//!
//! ```toml
//! [connection]
//! hostname = "cluster1.example.com"
//! username = "admin"
//! password = "secret"
//!
//! [vlan]
//! state = "present"
//! parent_interface = "e0a"
//! vlanid = "13"
//! node = "node1"
//! ```

use ontap_cfgmgr_common::{CfgMgrError, CfgMgrResult, ConnectionConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::types::{VlanConfig, VlanDescriptor};

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/netvlanmgr/netvlanmgr.toml";

/// Complete netvlanmgr configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetVlanConfig {
    /// Controller connection
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// VLAN interface to reconcile
    #[serde(default)]
    pub vlan: VlanConfig,
}

impl NetVlanConfig {
    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> CfgMgrResult<Self> {
        toml::from_str(content)
            .map_err(|e| CfgMgrError::invalid_config("config", format!("invalid TOML: {}", e)))
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> CfgMgrResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CfgMgrError::invalid_config(
                "config",
                format!("Failed to read {}: {}", path.display(), e),
            )
        })?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_toml(&content)
    }

    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> CfgMgrResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> CfgMgrResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| {
            CfgMgrError::invalid_config("config", format!("Failed to serialize: {}", e))
        })?;

        fs::write(path, content).map_err(|e| {
            CfgMgrError::invalid_config(
                "config",
                format!("Failed to write {}: {}", path.display(), e),
            )
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> CfgMgrResult<()> {
        VlanDescriptor::try_from(&self.vlan)?;
        self.connection.validate()
    }
}
