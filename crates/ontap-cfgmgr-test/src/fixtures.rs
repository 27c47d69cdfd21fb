//! Test fixtures for common cfgmgr patterns
//!
//! Provides an in-memory ZAPI endpoint that durably applies the VLAN calls
//! it receives, plus reusable response shapes.

use async_trait::async_trait;
use ontap_cfgmgr_common::{CfgMgrError, CfgMgrResult, RemoteSession, ZapiElement};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Failure injected for a given API
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedFailure {
    /// Controller answers with `status="failed"`
    Api {
        /// ZAPI errno
        errno: String,
        /// ZAPI reason
        reason: String,
    },
    /// Controller reports the entry as missing
    NotFound {
        /// ZAPI reason
        reason: String,
    },
    /// Controller cannot be reached
    Transport {
        /// Error message
        message: String,
    },
}

impl ScriptedFailure {
    fn to_error(&self, api: &str) -> CfgMgrError {
        match self {
            ScriptedFailure::Api { errno, reason } => CfgMgrError::remote_api(api, errno, reason),
            ScriptedFailure::NotFound { reason } => CfgMgrError::entry_not_found(api, reason),
            ScriptedFailure::Transport { message } => {
                CfgMgrError::transport("mock://controller", message)
            }
        }
    }
}

#[derive(Default)]
struct MockState {
    invocations: Vec<ZapiElement>,
    /// (node, interface-name) -> vlan-info record
    vlans: BTreeMap<(String, String), ZapiElement>,
    failures: HashMap<String, ScriptedFailure>,
    responses: HashMap<String, ZapiElement>,
}

/// In-memory ZAPI endpoint
///
/// Clones share state, so a test can hand one clone to the manager under
/// test and inspect the other afterwards.
#[derive(Clone, Default)]
pub struct MockSession {
    state: Arc<Mutex<MockState>>,
}

impl MockSession {
    /// Create an endpoint with no VLANs
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a VLAN named `<parent>-<vlanid>` on `node`
    pub fn with_vlan(self, node: &str, parent_interface: &str, vlanid: &str) -> Self {
        let name = vlan_fixtures::composite_name(parent_interface, vlanid);
        let record = vlan_fixtures::vlan_info_record(node, parent_interface, vlanid, &name);
        self.state
            .lock()
            .vlans
            .insert((node.to_string(), name), record);
        self
    }

    /// Make every call to `api` fail with a ZAPI error
    pub fn fail_api(self, api: &str, errno: &str, reason: &str) -> Self {
        self.script_failure(
            api,
            ScriptedFailure::Api {
                errno: errno.to_string(),
                reason: reason.to_string(),
            },
        )
    }

    /// Make every call to `api` fail with a transport error
    pub fn fail_transport(self, api: &str, message: &str) -> Self {
        self.script_failure(
            api,
            ScriptedFailure::Transport {
                message: message.to_string(),
            },
        )
    }

    /// Inject an arbitrary failure for `api`
    pub fn script_failure(self, api: &str, failure: ScriptedFailure) -> Self {
        self.state.lock().failures.insert(api.to_string(), failure);
        self
    }

    /// Answer every call to `api` with `results`, bypassing the VLAN store
    pub fn respond_with(self, api: &str, results: ZapiElement) -> Self {
        self.state.lock().responses.insert(api.to_string(), results);
        self
    }

    /// All requests received, in order
    pub fn invocations(&self) -> Vec<ZapiElement> {
        self.state.lock().invocations.clone()
    }

    /// Names of the APIs invoked, in order
    pub fn invoked_apis(&self) -> Vec<String> {
        self.state
            .lock()
            .invocations
            .iter()
            .map(|r| r.name().to_string())
            .collect()
    }

    /// Check whether a VLAN interface exists on `node`
    pub fn has_vlan(&self, node: &str, interface_name: &str) -> bool {
        self.state
            .lock()
            .vlans
            .contains_key(&(node.to_string(), interface_name.to_string()))
    }

    /// Number of VLAN interfaces on the endpoint
    pub fn vlan_count(&self) -> usize {
        self.state.lock().vlans.len()
    }

    fn handle(state: &mut MockState, request: &ZapiElement) -> CfgMgrResult<ZapiElement> {
        let api = request.name();
        match api {
            vlan_fixtures::VLAN_GET => {
                let key = (
                    request.child_content("node").unwrap_or_default().to_string(),
                    request
                        .child_content("interface-name")
                        .unwrap_or_default()
                        .to_string(),
                );
                match state.vlans.get(&key) {
                    Some(record) => Ok(vlan_fixtures::vlan_get_results(record.clone())),
                    None => Err(CfgMgrError::entry_not_found(api, "entry doesn't exist")),
                }
            }
            vlan_fixtures::VLAN_CREATE => {
                let info = Self::vlan_info(api, request)?;
                let key = Self::record_key(info);
                if state.vlans.contains_key(&key) {
                    return Err(CfgMgrError::remote_api(api, "13130", "Duplicate entry"));
                }
                let record = vlan_fixtures::vlan_info_record(
                    &key.0,
                    info.child_content("parent-interface").unwrap_or_default(),
                    info.child_content("vlanid").unwrap_or_default(),
                    &key.1,
                );
                state.vlans.insert(key, record);
                Ok(vlan_fixtures::passed_results())
            }
            vlan_fixtures::VLAN_DELETE => {
                let info = Self::vlan_info(api, request)?;
                match state.vlans.remove(&Self::record_key(info)) {
                    Some(_) => Ok(vlan_fixtures::passed_results()),
                    None => Err(CfgMgrError::entry_not_found(api, "entry doesn't exist")),
                }
            }
            _ => Err(CfgMgrError::remote_api(api, "13005", "Unable to find API")),
        }
    }

    fn vlan_info<'a>(api: &str, request: &'a ZapiElement) -> CfgMgrResult<&'a ZapiElement> {
        request
            .child("vlan-info")
            .ok_or_else(|| CfgMgrError::remote_api(api, "13115", "Missing input: vlan-info"))
    }

    /// Explicit interface-name wins, otherwise `<parent>-<vlanid>`
    fn record_key(info: &ZapiElement) -> (String, String) {
        let node = info.child_content("node").unwrap_or_default().to_string();
        let name = match info.child_content("interface-name") {
            Some(name) => name.to_string(),
            None => vlan_fixtures::composite_name(
                info.child_content("parent-interface").unwrap_or_default(),
                info.child_content("vlanid").unwrap_or_default(),
            ),
        };
        (node, name)
    }

    fn invoke_locked(&self, request: &ZapiElement) -> CfgMgrResult<ZapiElement> {
        let mut state = self.state.lock();
        state.invocations.push(request.clone());
        debug!("Mock invoke: {}", request.to_xml());

        let api = request.name();
        if let Some(failure) = state.failures.get(api) {
            return Err(failure.to_error(api));
        }
        if let Some(results) = state.responses.get(api) {
            return Ok(results.clone());
        }

        Self::handle(&mut state, request)
    }
}

#[async_trait]
impl RemoteSession for MockSession {
    async fn invoke(&self, request: &ZapiElement) -> CfgMgrResult<ZapiElement> {
        self.invoke_locked(request)
    }
}

/// Common VLAN response fixtures
pub mod vlan_fixtures {
    use super::*;

    /// Probe API
    pub const VLAN_GET: &str = "net-vlan-get";

    /// Create API
    pub const VLAN_CREATE: &str = "net-vlan-create";

    /// Delete API
    pub const VLAN_DELETE: &str = "net-vlan-delete";

    /// `<parent>-<vlanid>`
    pub fn composite_name(parent_interface: &str, vlanid: &str) -> String {
        format!("{}-{}", parent_interface, vlanid)
    }

    /// Empty passed results
    pub fn passed_results() -> ZapiElement {
        let mut results = ZapiElement::new("results");
        results.set_attr("status", "passed");
        results
    }

    /// A `vlan-info` record as returned by `net-vlan-get`
    pub fn vlan_info_record(
        node: &str,
        parent_interface: &str,
        vlanid: &str,
        interface_name: &str,
    ) -> ZapiElement {
        let mut info = ZapiElement::new("vlan-info");
        info.add_new_child("interface-name", interface_name);
        info.add_new_child("node", node);
        info.add_new_child("parent-interface", parent_interface);
        info.add_new_child("vlanid", vlanid);
        info.add_new_child("gvrp-enabled", "false");
        info
    }

    /// Passed `net-vlan-get` results wrapping `record`
    pub fn vlan_get_results(record: ZapiElement) -> ZapiElement {
        let mut attributes = ZapiElement::new("attributes");
        attributes.add_child_elem(record);

        let mut results = passed_results();
        results.add_child_elem(attributes);
        results
    }

    /// Passed results whose `attributes` element is empty
    pub fn empty_get_results() -> ZapiElement {
        let mut results = passed_results();
        results.add_child_elem(ZapiElement::new("attributes"));
        results
    }
}

#[cfg(test)]
mod tests {
    use super::vlan_fixtures::*;
    use super::*;

    fn get_request(node: &str, name: &str) -> ZapiElement {
        let mut request = ZapiElement::new(VLAN_GET);
        request.add_new_child("interface-name", name);
        request.add_new_child("node", node);
        request
    }

    fn mutate_request(api: &str, node: &str, parent: &str, vlanid: &str) -> ZapiElement {
        let mut info = ZapiElement::new("vlan-info");
        info.add_new_child("parent-interface", parent);
        info.add_new_child("vlanid", vlanid);
        info.add_new_child("node", node);
        let mut request = ZapiElement::new(api);
        request.add_child_elem(info);
        request
    }

    #[tokio::test]
    async fn test_get_seeded_vlan() {
        let session = MockSession::new().with_vlan("node1", "e0a", "13");

        let results = session.invoke(&get_request("node1", "e0a-13")).await.unwrap();
        assert_eq!(
            results
                .child_path(&["attributes", "vlan-info", "interface-name"])
                .map(|e| e.content()),
            Some("e0a-13")
        );

        let err = session
            .invoke(&get_request("node2", "e0a-13"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_then_delete() {
        let session = MockSession::new();

        session
            .invoke(&mutate_request(VLAN_CREATE, "node1", "e0a", "13"))
            .await
            .unwrap();
        assert!(session.has_vlan("node1", "e0a-13"));

        let dup = session
            .invoke(&mutate_request(VLAN_CREATE, "node1", "e0a", "13"))
            .await
            .unwrap_err();
        assert_eq!(dup.kind(), "RemoteApiError");

        session
            .invoke(&mutate_request(VLAN_DELETE, "node1", "e0a", "13"))
            .await
            .unwrap();
        assert_eq!(session.vlan_count(), 0);
        assert_eq!(
            session.invoked_apis(),
            vec![VLAN_CREATE, VLAN_CREATE, VLAN_DELETE]
        );
    }

    #[tokio::test]
    async fn test_scripted_failures() {
        let session = MockSession::new()
            .fail_api(VLAN_CREATE, "13003", "Insufficient privileges")
            .fail_transport(VLAN_GET, "connection reset");

        let err = session
            .invoke(&mutate_request(VLAN_CREATE, "node1", "e0a", "13"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Insufficient privileges"));

        let err = session.invoke(&get_request("node1", "e0a-13")).await.unwrap_err();
        assert_eq!(err.kind(), "TransportError");
        assert_eq!(session.invocations().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_api() {
        let session = MockSession::new();
        let err = session
            .invoke(&ZapiElement::new("system-get-version"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "ZAPI system-get-version failed (errno 13005): Unable to find API"
        );
    }
}
