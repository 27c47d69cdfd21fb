//! ZAPI names used by netvlanmgr

/// Look up a VLAN interface by node and name
pub const VLAN_GET_API: &str = "net-vlan-get";

/// Create a VLAN interface
pub const VLAN_CREATE_API: &str = "net-vlan-create";

/// Delete a VLAN interface
pub const VLAN_DELETE_API: &str = "net-vlan-delete";

/// Element wrapping a VLAN record in requests and responses
pub const VLAN_INFO: &str = "vlan-info";

/// Element wrapping the located record in `net-vlan-get` results
pub const ATTRIBUTES: &str = "attributes";

/// Field names
pub mod fields {
    /// VLAN interface name (`<parent>-<vlanid>`)
    pub const INTERFACE_NAME: &str = "interface-name";

    /// Node hosting the interface
    pub const NODE: &str = "node";

    /// Physical parent interface
    pub const PARENT_INTERFACE: &str = "parent-interface";

    /// VLAN ID
    pub const VLAN_ID: &str = "vlanid";

    /// GVRP flag, "true" or "false"
    pub const GVRP_ENABLED: &str = "gvrp-enabled";
}
