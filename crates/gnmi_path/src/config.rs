//! Rendering configuration.
//!
//! Alias tables are built from unprefixed identifiers, the same form the
//! renderer produces when it is given the rendered notification prefix.
//!
//! #### Example config:
//!
//! ```rust
//! let yaml = r#"---
//!
//! ## Explicit measurement names for encoding paths.
//! aliases:
//!   ifcounters: openconfig-interfaces:/interfaces/interface/state/counters
//!
//! ## Subscriptions also register their rendered path as an alias, named
//! ## after `name` or, failing that, the last path element.
//! subscriptions:
//!   - name: ifcounters
//!     origin: openconfig-interfaces
//!     path: /interfaces/interface/state/counters
//!   - origin: DME
//!     path: /sys/intf/phys-[eth1/1]
//! "#;
//!
//! use gnmi_path::config::RenderConfig;
//!
//! let config = RenderConfig::from_yaml(yaml).unwrap();
//! let aliases = config.alias_table().unwrap();
//! assert_eq!(aliases["DME:/sys/intf/phys-[eth1/1]"], "phys-[eth1/1]");
//! ```

use std::collections::BTreeMap;
use std::path::{Path as FsPath, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::PathError;
use crate::parse::parse_path;
use crate::render::PathRenderer;

/// Encoding path (as rendered, origin included) to alias name.
pub type AliasTable = BTreeMap<String, String>;

#[allow(missing_docs)]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No config found at this path: {0}")]
    ConfigMissing(PathBuf),

    #[error("Config deserialization error: {0}")]
    SerializationError(#[from] serde_yaml::Error),

    #[error("Error while reading the config: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid path in subscription '{name}': {source}")]
    InvalidSubscription {
        name: String,
        #[source]
        source: PathError,
    },
}

/// Result of loading a [`RenderConfig`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// One subscribed path.
#[derive(Clone, Deserialize, Serialize, Debug, PartialEq, Eq)]
pub struct SubscriptionConfig {
    /// Measurement name for this subscription. Defaults to the name of the
    /// last path element.
    #[serde(default)]
    pub name: Option<String>,

    /// Origin of the path; `DME` switches to the DME dialect.
    #[serde(default)]
    pub origin: Option<String>,

    /// The subscribed path.
    pub path: String,
}

/// Everything needed to render paths into metric identifiers.
#[derive(Clone, Default, Deserialize, Serialize, Debug, PartialEq, Eq)]
pub struct RenderConfig {
    /// Alias name to encoding path.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,

    /// Subscribed paths, each of which also registers an alias.
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionConfig>,
}

impl RenderConfig {
    /// Load a config from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        serde_yaml::from_str(yaml).map_err(ConfigError::SerializationError)
    }

    /// Load a config from a YAML file.
    pub fn load_yaml(path: &FsPath) -> ConfigResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|err| match err {
            e @ std::io::Error { .. } if e.kind() == std::io::ErrorKind::NotFound => {
                ConfigError::ConfigMissing(path.into())
            }
            _ => err.into(),
        })?;
        Self::from_yaml(&yaml)
    }

    /// Build the encoding path to alias name table.
    ///
    /// Subscriptions are rendered without prefix or keys and registered
    /// first, named after the subscription or its last element. Explicit
    /// `aliases` are applied afterwards and replace any subscription entry
    /// for the same path.
    pub fn alias_table(&self) -> ConfigResult<AliasTable> {
        let mut table = AliasTable::new();
        let renderer = PathRenderer::default();

        for sub in &self.subscriptions {
            let path = parse_path(sub.origin.as_deref(), &sub.path, None).map_err(|source| {
                ConfigError::InvalidSubscription {
                    name: sub.name.clone().unwrap_or_else(|| sub.path.clone()),
                    source,
                }
            })?;
            // DME names may contain `/`, so use the element name
            let name = match &sub.name {
                Some(name) if !name.is_empty() => Some(name.clone()),
                _ => path.elem.last().map(|e| e.name.clone()),
            };
            let Some(name) = name else {
                tracing::debug!(path = %sub.path, "subscription has no usable alias name");
                continue;
            };
            table.insert(renderer.render(&path, None).path, name);
        }

        for (alias, encoding_path) in &self.aliases {
            table.insert(encoding_path.clone(), alias.clone());
        }

        tracing::debug!(aliases = table.len(), "built alias table");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use pretty_assertions::assert_eq;

    const YAML: &str = r#"---
aliases:
  counters: /interfaces/interface/state/counters
subscriptions:
  - name: ifcounters
    origin: openconfig-interfaces
    path: /interfaces/interface[name=eth0]/state/counters
  - path: /network-instances/network-instance/protocols/protocol/bgp/neighbors
  - origin: DME
    path: /sys/intf/phys-[eth1/1]
  - name: ""
    path: /system/state
"#;

    #[test]
    fn parses_yaml() {
        let config = RenderConfig::from_yaml(YAML).unwrap();
        assert_eq!(config.aliases.len(), 1);
        assert_eq!(config.subscriptions.len(), 4);
        assert_eq!(config.subscriptions[2].origin.as_deref(), Some("DME"));
        assert_eq!(config.subscriptions[1].name, None);
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(RenderConfig::from_yaml("{}").unwrap(), RenderConfig::default());
    }

    #[test]
    fn builds_alias_table() {
        gnmi_path_trace::test_run().ok();
        let config = RenderConfig::from_yaml(YAML).unwrap();
        assert_eq!(
            config.alias_table().unwrap(),
            btreemap! {
                "openconfig-interfaces:/interfaces/interface/state/counters".to_string() => "ifcounters".to_string(),
                "/network-instances/network-instance/protocols/protocol/bgp/neighbors".to_string() => "neighbors".to_string(),
                "DME:/sys/intf/phys-[eth1/1]".to_string() => "phys-[eth1/1]".to_string(),
                "/system/state".to_string() => "state".to_string(),
                "/interfaces/interface/state/counters".to_string() => "counters".to_string(),
            }
        );
    }

    #[test]
    fn explicit_alias_wins() {
        let config = RenderConfig {
            aliases: btreemap! {"explicit".to_string() => "/a/b".to_string()},
            subscriptions: vec![SubscriptionConfig {
                name: Some("from_sub".into()),
                origin: None,
                path: "/a/b".into(),
            }],
        };
        assert_eq!(
            config.alias_table().unwrap(),
            btreemap! {"/a/b".to_string() => "explicit".to_string()}
        );
    }

    #[test]
    fn empty_subscription_path_registers_nothing() {
        let config = RenderConfig {
            subscriptions: vec![SubscriptionConfig {
                name: None,
                origin: None,
                path: String::new(),
            }],
            ..Default::default()
        };
        assert!(config.alias_table().unwrap().is_empty());
    }

    #[test]
    fn invalid_subscription_path() {
        let config = RenderConfig {
            subscriptions: vec![SubscriptionConfig {
                name: Some("broken".into()),
                origin: None,
                path: "/a[k=v".into(),
            }],
            ..Default::default()
        };
        match config.alias_table() {
            Err(ConfigError::InvalidSubscription { name, source }) => {
                assert_eq!(name, "broken");
                assert_eq!(source, PathError::Invalid("/a[k=v".into()));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn load_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("gnmi.yaml");
        std::fs::write(&file, YAML).unwrap();
        let config = RenderConfig::load_yaml(&file).unwrap();
        assert_eq!(config.aliases.len(), 1);
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("missing.yaml");
        assert!(matches!(
            RenderConfig::load_yaml(&file),
            Err(ConfigError::ConfigMissing(p)) if p == file
        ));
    }
}
