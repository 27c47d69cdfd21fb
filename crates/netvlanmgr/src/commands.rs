//! ZAPI request builders for VLAN operations

use ontap_cfgmgr_common::ZapiElement;

use crate::tables::{fields, VLAN_CREATE_API, VLAN_DELETE_API, VLAN_GET_API, VLAN_INFO};
use crate::types::VlanDescriptor;

/// Render a flag the way ZAPI expects it
pub fn zapi_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Build the lookup request for a VLAN interface
///
/// Looks up the composite `<parent>-<vlanid>` name on the descriptor's node.
pub fn build_vlan_get_request(desc: &VlanDescriptor) -> ZapiElement {
    let identity = desc.identity();
    let mut request = ZapiElement::new(VLAN_GET_API);
    request.add_new_child(fields::INTERFACE_NAME, identity.interface_name);
    request.add_new_child(fields::NODE, identity.node);
    request
}

/// Build the `vlan-info` payload shared by create and delete
pub fn build_vlan_info(desc: &VlanDescriptor) -> ZapiElement {
    let mut info = ZapiElement::new(VLAN_INFO);
    info.add_new_child(fields::PARENT_INTERFACE, desc.parent_interface());
    info.add_new_child(fields::VLAN_ID, desc.vlanid());
    if !desc.node().is_empty() {
        info.add_new_child(fields::NODE, desc.node());
    }
    if let Some(name) = desc.interface_name() {
        info.add_new_child(fields::INTERFACE_NAME, name);
    }
    info.add_new_child(fields::GVRP_ENABLED, zapi_bool(desc.gvrp_enabled()));
    info
}

/// Build the create request
pub fn build_vlan_create_request(desc: &VlanDescriptor) -> ZapiElement {
    let mut request = ZapiElement::new(VLAN_CREATE_API);
    request.add_child_elem(build_vlan_info(desc));
    request
}

/// Build the delete request
pub fn build_vlan_delete_request(desc: &VlanDescriptor) -> ZapiElement {
    let mut request = ZapiElement::new(VLAN_DELETE_API);
    request.add_child_elem(build_vlan_info(desc));
    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn descriptor(interface_name: Option<&str>, gvrp: bool) -> VlanDescriptor {
        VlanDescriptor::new("e0a", "13", "node1", interface_name.map(String::from), gvrp)
            .unwrap()
    }

    fn fields_of(elem: &ZapiElement) -> Vec<(&str, &str)> {
        elem.children()
            .iter()
            .map(|c| (c.name(), c.content()))
            .collect()
    }

    #[test]
    fn test_zapi_bool() {
        assert_eq!(zapi_bool(true), "true");
        assert_eq!(zapi_bool(false), "false");
    }

    #[test]
    fn test_build_get_request() {
        let request = build_vlan_get_request(&descriptor(None, false));
        assert_eq!(
            request.to_xml(),
            "<net-vlan-get><interface-name>e0a-13</interface-name><node>node1</node></net-vlan-get>"
        );
    }

    #[test]
    fn test_get_request_uses_composite_name() {
        let request = build_vlan_get_request(&descriptor(Some("custom"), false));
        assert_eq!(request.child_content("interface-name"), Some("e0a-13"));
    }

    #[test]
    fn test_build_vlan_info_minimal() {
        let info = build_vlan_info(&descriptor(None, false));
        assert_eq!(info.name(), "vlan-info");
        assert_eq!(
            fields_of(&info),
            vec![
                ("parent-interface", "e0a"),
                ("vlanid", "13"),
                ("node", "node1"),
                ("gvrp-enabled", "false"),
            ]
        );
    }

    #[test]
    fn test_build_vlan_info_full() {
        let info = build_vlan_info(&descriptor(Some("e0a-13"), true));
        assert_eq!(
            fields_of(&info),
            vec![
                ("parent-interface", "e0a"),
                ("vlanid", "13"),
                ("node", "node1"),
                ("interface-name", "e0a-13"),
                ("gvrp-enabled", "true"),
            ]
        );
    }

    #[test]
    fn test_create_and_delete_share_payload() {
        let desc = descriptor(None, false);
        let create = build_vlan_create_request(&desc);
        let delete = build_vlan_delete_request(&desc);

        assert_eq!(create.name(), "net-vlan-create");
        assert_eq!(delete.name(), "net-vlan-delete");
        assert_eq!(create.children(), delete.children());
        assert_eq!(create.children().len(), 1);
    }
}
