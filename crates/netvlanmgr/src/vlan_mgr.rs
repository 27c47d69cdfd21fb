//! VlanMgr - Core VLAN interface configuration manager implementation

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use ontap_cfgmgr_common::zapi::EOBJECTNOTFOUND;
use ontap_cfgmgr_common::{CfgMgr, CfgMgrError, CfgMgrResult, RemoteSession};

use crate::commands::{build_vlan_create_request, build_vlan_delete_request, build_vlan_get_request};
use crate::tables::{fields, ATTRIBUTES, VLAN_INFO};
use crate::types::{ProbeOutcome, VlanDescriptor};

/// VlanMgr manages one VLAN interface on a controller
///
/// Reconciliation flow:
/// 1. `net-vlan-get` on the composite name → exists or not
/// 2. `net-vlan-create` / `net-vlan-delete` with the `vlan-info` payload
pub struct VlanMgr<S> {
    /// Session to the controller
    session: S,

    /// Interface being managed
    descriptor: VlanDescriptor,
}

impl<S: RemoteSession> VlanMgr<S> {
    /// Creates a new VlanMgr instance
    pub fn new(session: S, descriptor: VlanDescriptor) -> Self {
        if let Some(name) = descriptor.interface_name() {
            if name != descriptor.composite_name() {
                warn!(
                    "interface_name '{}' differs from '{}'; existence is checked with the latter",
                    name,
                    descriptor.composite_name()
                );
            }
        }
        Self {
            session,
            descriptor,
        }
    }

    /// Interface being managed
    pub fn descriptor(&self) -> &VlanDescriptor {
        &self.descriptor
    }

    /// Look the VLAN interface up on the controller
    #[instrument(skip(self), fields(node = %self.descriptor.node(), vlan = %self.descriptor.composite_name()))]
    pub async fn probe(&self) -> CfgMgrResult<ProbeOutcome> {
        let request = build_vlan_get_request(&self.descriptor);

        match self.session.invoke(&request).await {
            Ok(results) => match results.child_path(&[ATTRIBUTES, VLAN_INFO]) {
                Some(record) if record.child(fields::INTERFACE_NAME).is_some() => {
                    debug!("VLAN interface found");
                    Ok(ProbeOutcome::Found(record.clone()))
                }
                _ => {
                    debug!("Lookup passed without a vlan-info record");
                    Ok(ProbeOutcome::NotFound)
                }
            },
            Err(e) if e.is_not_found() => {
                debug!("VLAN interface not found: {}", e);
                Ok(ProbeOutcome::NotFound)
            }
            Err(e) => Err(e),
        }
    }

    /// Create the VLAN interface
    #[instrument(skip(self), fields(node = %self.descriptor.node(), vlan = %self.descriptor.composite_name()))]
    pub async fn create_vlan(&self) -> CfgMgrResult<()> {
        let request = build_vlan_create_request(&self.descriptor);
        self.session.invoke(&request).await.map_err(mutation_error)?;

        info!(
            "Created VLAN {} on {} ({})",
            self.descriptor.vlanid(),
            self.descriptor.parent_interface(),
            self.descriptor.node()
        );
        Ok(())
    }

    /// Delete the VLAN interface
    #[instrument(skip(self), fields(node = %self.descriptor.node(), vlan = %self.descriptor.composite_name()))]
    pub async fn delete_vlan(&self) -> CfgMgrResult<()> {
        let request = build_vlan_delete_request(&self.descriptor);
        self.session.invoke(&request).await.map_err(mutation_error)?;

        info!(
            "Deleted VLAN {} on {} ({})",
            self.descriptor.vlanid(),
            self.descriptor.parent_interface(),
            self.descriptor.node()
        );
        Ok(())
    }
}

/// Not-found is only meaningful to the probe; a mutation that hits it failed.
fn mutation_error(err: CfgMgrError) -> CfgMgrError {
    match err {
        CfgMgrError::EntryNotFound { api, reason } => {
            CfgMgrError::remote_api(api, EOBJECTNOTFOUND, reason)
        }
        other => other,
    }
}

/// CfgMgr trait implementation
#[async_trait]
impl<S: RemoteSession> CfgMgr for VlanMgr<S> {
    fn daemon_name(&self) -> &str {
        "netvlanmgr"
    }

    async fn exists(&self) -> CfgMgrResult<bool> {
        Ok(self.probe().await?.exists())
    }

    async fn create(&self) -> CfgMgrResult<()> {
        self.create_vlan().await
    }

    async fn delete(&self) -> CfgMgrResult<()> {
        self.delete_vlan().await
    }
}
