//! Configuration manager trait and reconciliation primitives.
//!
//! A configuration manager owns one object on the controller. It knows how
//! to probe for the object and how to create or delete it; [`CfgMgr::apply`]
//! turns that into a single convergence step towards a [`DesiredState`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{CfgMgrError, CfgMgrResult};

/// Declared state of the managed object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    /// The object must exist.
    #[default]
    Present,
    /// The object must not exist.
    Absent,
}

impl DesiredState {
    /// Returns the state name as used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            DesiredState::Present => "present",
            DesiredState::Absent => "absent",
        }
    }
}

impl FromStr for DesiredState {
    type Err = CfgMgrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(DesiredState::Present),
            "absent" => Ok(DesiredState::Absent),
            other => Err(CfgMgrError::invalid_config(
                "state",
                format!("expected 'present' or 'absent', got '{}'", other),
            )),
        }
    }
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutation selected by the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Actual state already matches.
    Noop,
    /// Object is missing and must be created.
    Create,
    /// Object exists and must be deleted.
    Delete,
}

impl Action {
    /// Returns true if the action mutates the controller.
    pub fn is_change(&self) -> bool {
        !matches!(self, Action::Noop)
    }
}

/// Selects the action that converges `exists` towards `desired`.
///
/// | actual \ desired | present | absent |
/// |------------------|---------|--------|
/// | present          | noop    | delete |
/// | absent           | create  | noop   |
pub fn select_action(exists: bool, desired: DesiredState) -> Action {
    match (exists, desired) {
        (true, DesiredState::Absent) => Action::Delete,
        (false, DesiredState::Present) => Action::Create,
        (true, DesiredState::Present) | (false, DesiredState::Absent) => Action::Noop,
    }
}

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// True if the object was (or in check mode, would be) mutated.
    pub changed: bool,
    /// Selected action.
    pub action: Action,
    /// Extra data for the caller. Currently always empty.
    pub meta: Option<serde_json::Value>,
}

impl RunReport {
    /// Builds the report for a selected action.
    pub fn for_action(action: Action) -> Self {
        Self {
            changed: action.is_change(),
            action,
            meta: None,
        }
    }
}

/// Base trait for configuration managers.
///
/// Implementors provide the three remote operations; the provided
/// [`apply`](CfgMgr::apply) runs probe, decide and mutate in sequence.
///
/// # Example
///
/// ```ignore
/// use ontap_cfgmgr_common::{CfgMgr, CfgMgrResult};
///
/// struct MyMgr {
///     // ... session, descriptor
/// }
///
/// #[async_trait]
/// impl CfgMgr for MyMgr {
///     fn daemon_name(&self) -> &str { "mymgr" }
///     async fn exists(&self) -> CfgMgrResult<bool> { /* ... */ }
///     async fn create(&self) -> CfgMgrResult<()> { /* ... */ }
///     async fn delete(&self) -> CfgMgrResult<()> { /* ... */ }
/// }
/// ```
#[async_trait]
pub trait CfgMgr: Send + Sync {
    /// Returns the manager name (e.g., "netvlanmgr").
    ///
    /// This is used for logging.
    fn daemon_name(&self) -> &str;

    /// Returns true if the managed object currently exists.
    async fn exists(&self) -> CfgMgrResult<bool>;

    /// Creates the managed object.
    async fn create(&self) -> CfgMgrResult<()>;

    /// Deletes the managed object.
    async fn delete(&self) -> CfgMgrResult<()>;

    /// Converges the managed object towards `desired`.
    ///
    /// With `check_mode` set the action is selected and reported but never
    /// executed.
    async fn apply(&self, desired: DesiredState, check_mode: bool) -> CfgMgrResult<RunReport> {
        let exists = self.exists().await?;
        let action = select_action(exists, desired);
        debug!(
            manager = self.daemon_name(),
            exists,
            desired = %desired,
            ?action,
            "Selected action"
        );

        if check_mode {
            if action.is_change() {
                info!(manager = self.daemon_name(), ?action, "Check mode, skipping");
            }
            return Ok(RunReport::for_action(action));
        }

        match action {
            Action::Create => self.create().await?,
            Action::Delete => self.delete().await?,
            Action::Noop => {}
        }

        Ok(RunReport::for_action(action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct FakeMgr {
        exists: AtomicBool,
        creates: AtomicUsize,
        deletes: AtomicUsize,
    }

    impl FakeMgr {
        fn new(exists: bool) -> Self {
            Self {
                exists: AtomicBool::new(exists),
                creates: AtomicUsize::new(0),
                deletes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CfgMgr for FakeMgr {
        fn daemon_name(&self) -> &str {
            "fakemgr"
        }

        async fn exists(&self) -> CfgMgrResult<bool> {
            Ok(self.exists.load(Ordering::SeqCst))
        }

        async fn create(&self) -> CfgMgrResult<()> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            self.exists.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn delete(&self) -> CfgMgrResult<()> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.exists.store(false, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_select_action_table() {
        assert_eq!(select_action(true, DesiredState::Present), Action::Noop);
        assert_eq!(select_action(true, DesiredState::Absent), Action::Delete);
        assert_eq!(select_action(false, DesiredState::Present), Action::Create);
        assert_eq!(select_action(false, DesiredState::Absent), Action::Noop);
    }

    #[test]
    fn test_desired_state_parse() {
        assert_eq!("present".parse::<DesiredState>().unwrap(), DesiredState::Present);
        assert_eq!("absent".parse::<DesiredState>().unwrap(), DesiredState::Absent);
        assert_eq!(DesiredState::default(), DesiredState::Present);

        let err = "gone".parse::<DesiredState>().unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
    }

    #[test]
    fn test_run_report_json() {
        let report = RunReport::for_action(Action::Create);
        assert!(report.changed);
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"changed":true,"action":"create","meta":null}"#
        );
        assert!(!RunReport::for_action(Action::Noop).changed);
    }

    #[tokio::test]
    async fn test_apply_is_idempotent() {
        let mgr = FakeMgr::new(false);

        let first = mgr.apply(DesiredState::Present, false).await.unwrap();
        let second = mgr.apply(DesiredState::Present, false).await.unwrap();

        assert!(first.changed);
        assert!(!second.changed);
        assert_eq!(mgr.creates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_apply_check_mode_skips_mutation() {
        let mgr = FakeMgr::new(true);

        let report = mgr.apply(DesiredState::Absent, true).await.unwrap();

        assert!(report.changed);
        assert_eq!(report.action, Action::Delete);
        assert_eq!(mgr.deletes.load(Ordering::SeqCst), 0);
        assert!(mgr.exists.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_apply_delete() {
        let mgr = FakeMgr::new(true);
        let report = mgr.apply(DesiredState::Absent, false).await.unwrap();
        assert_eq!(report.action, Action::Delete);
        assert_eq!(mgr.deletes.load(Ordering::SeqCst), 1);
        assert_eq!(mgr.creates.load(Ordering::SeqCst), 0);
    }
}
