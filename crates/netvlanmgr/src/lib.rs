//! netvlanmgr - VLAN interface configuration manager for ONTAP
//!
//! Converges one VLAN interface (parent port + VLAN ID on a node) towards a
//! declared `present`/`absent` state through the controller's ZAPI.

mod commands;
pub mod config;
mod tables;
mod types;
mod vlan_mgr;

pub use commands::*;
pub use config::NetVlanConfig;
pub use tables::*;
pub use types::*;
pub use vlan_mgr::VlanMgr;

use ontap_cfgmgr_common::{CfgMgr, CfgMgrResult, RemoteSession, RunReport};
use tracing::info;

/// Reconcile one VLAN interface
///
/// Validates `config` before touching `session`, then probes, decides and
/// (outside check mode) creates or deletes the interface.
pub async fn reconcile<S: RemoteSession>(
    session: S,
    config: &VlanConfig,
) -> CfgMgrResult<RunReport> {
    let descriptor = VlanDescriptor::try_from(config)?;
    let mgr = VlanMgr::new(session, descriptor);

    let report = mgr.apply(config.state, config.check_mode).await?;
    info!(
        "VLAN {} on {}: state={} action={:?} changed={}",
        mgr.descriptor().composite_name(),
        mgr.descriptor().node(),
        config.state,
        report.action,
        report.changed
    );
    Ok(report)
}
