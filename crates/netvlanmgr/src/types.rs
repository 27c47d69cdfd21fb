//! Type definitions for netvlanmgr

use ontap_cfgmgr_common::{CfgMgrError, CfgMgrResult, DesiredState, ZapiElement};
use serde::{Deserialize, Serialize};

/// Lowest valid VLAN ID
pub const MIN_VLAN_ID: u16 = 1;

/// Highest valid VLAN ID
pub const MAX_VLAN_ID: u16 = 4094;

/// Declared VLAN configuration, as loaded from file or command line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanConfig {
    /// Whether the VLAN interface should exist
    #[serde(default)]
    pub state: DesiredState,
    /// Interface hosting the VLAN interface
    #[serde(default)]
    pub parent_interface: String,
    /// VLAN ID (1-4094)
    #[serde(default)]
    pub vlanid: String,
    /// Node name of the VLAN interface
    #[serde(default)]
    pub node: String,
    /// Name of the VLAN interface, `<parent-interface>-<vlanid>`
    #[serde(default)]
    pub interface_name: Option<String>,
    /// GVRP is deprecated and ignored by the controller in cluster mode
    #[serde(default)]
    pub gvrp_enabled: bool,
    /// Report what would change without touching the controller
    #[serde(default)]
    pub check_mode: bool,
}

/// Validated VLAN interface descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VlanDescriptor {
    parent_interface: String,
    vlanid: String,
    node: String,
    interface_name: Option<String>,
    gvrp_enabled: bool,
}

impl VlanDescriptor {
    /// Create a descriptor, validating every field
    pub fn new(
        parent_interface: impl Into<String>,
        vlanid: impl Into<String>,
        node: impl Into<String>,
        interface_name: Option<String>,
        gvrp_enabled: bool,
    ) -> CfgMgrResult<Self> {
        let parent_interface = required("parent_interface", parent_interface.into())?;
        let vlanid = required("vlanid", vlanid.into())?;
        let node = required("node", node.into())?;

        match parse_vlanid(&vlanid) {
            Some(id) if (MIN_VLAN_ID..=MAX_VLAN_ID).contains(&id) => {}
            _ => {
                return Err(CfgMgrError::invalid_config(
                    "vlanid",
                    format!(
                        "'{}' is not a VLAN ID between {} and {}",
                        vlanid, MIN_VLAN_ID, MAX_VLAN_ID
                    ),
                ))
            }
        }

        let interface_name = interface_name.filter(|name| !name.is_empty());

        Ok(Self {
            parent_interface,
            vlanid,
            node,
            interface_name,
            gvrp_enabled,
        })
    }

    /// Physical parent interface
    pub fn parent_interface(&self) -> &str {
        &self.parent_interface
    }

    /// VLAN ID as configured
    pub fn vlanid(&self) -> &str {
        &self.vlanid
    }

    /// Node hosting the interface
    pub fn node(&self) -> &str {
        &self.node
    }

    /// Explicitly configured interface name, if any
    pub fn interface_name(&self) -> Option<&str> {
        self.interface_name.as_deref()
    }

    /// GVRP flag
    pub fn gvrp_enabled(&self) -> bool {
        self.gvrp_enabled
    }

    /// `<parent-interface>-<vlanid>`
    pub fn composite_name(&self) -> String {
        format!("{}-{}", self.parent_interface, self.vlanid)
    }

    /// Key used to look the interface up on the controller.
    ///
    /// Always built from the composite name; an explicit `interface_name`
    /// is not consulted.
    pub fn identity(&self) -> VlanIdentity {
        VlanIdentity {
            node: self.node.clone(),
            interface_name: self.composite_name(),
        }
    }
}

impl TryFrom<&VlanConfig> for VlanDescriptor {
    type Error = CfgMgrError;

    fn try_from(config: &VlanConfig) -> Result<Self, Self::Error> {
        Self::new(
            config.parent_interface.clone(),
            config.vlanid.clone(),
            config.node.clone(),
            config.interface_name.clone(),
            config.gvrp_enabled,
        )
    }
}

/// Only the canonical decimal form is accepted: the controller names the
/// interface `<parent>-<vlanid>` with no sign or leading zeros.
fn parse_vlanid(vlanid: &str) -> Option<u16> {
    if vlanid.starts_with('0') || !vlanid.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    vlanid.parse().ok()
}

fn required(field: &str, value: String) -> CfgMgrResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CfgMgrError::invalid_config(field, "is required"));
    }
    Ok(value.to_string())
}

/// Identity key of a VLAN interface
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VlanIdentity {
    /// Node hosting the interface
    pub node: String,
    /// Composite interface name
    pub interface_name: String,
}

/// Result of probing the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The interface exists; carries the `vlan-info` record
    Found(ZapiElement),
    /// The interface does not exist
    NotFound,
}

impl ProbeOutcome {
    /// Returns true for [`ProbeOutcome::Found`]
    pub fn exists(&self) -> bool {
        matches!(self, ProbeOutcome::Found(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(interface_name: Option<&str>) -> VlanDescriptor {
        VlanDescriptor::new("e0a", "13", "node1", interface_name.map(String::from), false)
            .unwrap()
    }

    #[test]
    fn test_descriptor_new() {
        let desc = descriptor(None);
        assert_eq!(desc.parent_interface(), "e0a");
        assert_eq!(desc.vlanid(), "13");
        assert_eq!(desc.node(), "node1");
        assert_eq!(desc.interface_name(), None);
        assert!(!desc.gvrp_enabled());
        assert_eq!(desc.composite_name(), "e0a-13");
    }

    #[test]
    fn test_identity_ignores_interface_name() {
        let plain = descriptor(None);
        let named = descriptor(Some("custom-vlan"));

        assert_eq!(named.interface_name(), Some("custom-vlan"));
        assert_eq!(plain.identity(), named.identity());
        assert_eq!(
            plain.identity(),
            VlanIdentity {
                node: "node1".to_string(),
                interface_name: "e0a-13".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_interface_name_is_absent() {
        assert_eq!(descriptor(Some("")).interface_name(), None);
    }

    #[test]
    fn test_interface_name_kept_verbatim() {
        assert_eq!(descriptor(Some(" e0a-13 ")).interface_name(), Some(" e0a-13 "));
        assert_eq!(descriptor(Some(" e0a-13 ")).composite_name(), "e0a-13");
    }

    #[test]
    fn test_required_fields() {
        for (parent, vlanid, node, field) in [
            ("", "13", "node1", "parent_interface"),
            ("e0a", "", "node1", "vlanid"),
            ("e0a", "13", " ", "node"),
        ] {
            match VlanDescriptor::new(parent, vlanid, node, None, false) {
                Err(CfgMgrError::InvalidConfig { field: f, .. }) => assert_eq!(f, field),
                other => panic!("Expected InvalidConfig for {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_vlanid_range() {
        assert!(VlanDescriptor::new("e0a", "1", "node1", None, false).is_ok());
        assert!(VlanDescriptor::new("e0a", "4094", "node1", None, false).is_ok());

        for bad in ["0", "4095", "-1", "abc", "13a", "+13", "013", "00013"] {
            let err = VlanDescriptor::new("e0a", bad, "node1", None, false).unwrap_err();
            assert_eq!(err.kind(), "ValidationError", "vlanid {}", bad);
        }
    }

    #[test]
    fn test_try_from_config() {
        let config = VlanConfig {
            parent_interface: "a0a".to_string(),
            vlanid: "100".to_string(),
            node: "cluster1-01".to_string(),
            gvrp_enabled: true,
            ..Default::default()
        };
        let desc = VlanDescriptor::try_from(&config).unwrap();
        assert_eq!(desc.composite_name(), "a0a-100");
        assert!(desc.gvrp_enabled());
        assert_eq!(config.state, DesiredState::Present);
    }

    #[test]
    fn test_probe_outcome() {
        assert!(ProbeOutcome::Found(ZapiElement::new("vlan-info")).exists());
        assert!(!ProbeOutcome::NotFound.exists());
    }
}
