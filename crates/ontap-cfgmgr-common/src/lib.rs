//! Common infrastructure for ONTAP configuration managers.
//!
//! This crate provides shared functionality for the cfgmgr binaries that
//! converge a single ONTAP object (VLAN interfaces today) towards a declared
//! state:
//!
//! - [`zapi`]: ZAPI element model with XML encoding and decoding
//! - [`session`]: The [`RemoteSession`] trait and the HTTP(S) ZAPI session
//! - [`CfgMgr`]: Probe/create/delete trait with the reconciliation driver
//! - [`error`]: Error types for cfgmgr operations
//!
//! # Architecture
//!
//! Configuration managers follow this pattern:
//!
//! 1. Build a validated descriptor of the managed object from configuration
//! 2. Probe the controller for the object's identity key
//! 3. Select `noop`, `create` or `delete` from the desired and actual state
//! 4. Issue the mutating call unless running in check mode
//!
//! # Example
//!
//! ```ignore
//! use ontap_cfgmgr_common::{
//!     CfgMgr, DesiredState,
//!     session::{ConnectionConfig, ZapiHttpSession},
//!     error::CfgMgrResult,
//! };
//!
//! async fn converge<M: CfgMgr>(mgr: &M) -> CfgMgrResult<bool> {
//!     let report = mgr.apply(DesiredState::Present, false).await?;
//!     Ok(report.changed)
//! }
//! ```

pub mod error;
pub mod manager;
pub mod session;
pub mod zapi;

// Re-export commonly used items at crate root
pub use error::{CfgMgrError, CfgMgrResult, ErrorReport};
pub use manager::{select_action, Action, CfgMgr, DesiredState, RunReport};
pub use session::{ConnectionConfig, RemoteSession, ZapiHttpSession};
pub use zapi::ZapiElement;
