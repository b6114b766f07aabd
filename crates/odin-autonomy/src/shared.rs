use odin_config::GovernorConfig;
use odin_core::{ActionId, MissionPhase};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::action::AutonomousAction;
use crate::governor::{AutonomyGovernor, AutonomyStatus};

/// Thread-safe handle to one governor.
///
/// Every call takes the same lock, so an override's deadline check and its
/// status transition can never interleave with the expiry sweep.
#[derive(Debug, Clone)]
pub struct SharedGovernor {
    inner: Arc<Mutex<AutonomyGovernor>>,
}

impl SharedGovernor {
    pub fn new(governor: AutonomyGovernor) -> Self {
        Self {
            inner: Arc::new(Mutex::new(governor)),
        }
    }

    /// Lock the governor for a sequence of calls that must see one state.
    pub fn lock(&self) -> MutexGuard<'_, AutonomyGovernor> {
        self.inner.lock()
    }

    /// Run `f` with exclusive access to the governor.
    pub fn with<R>(&self, f: impl FnOnce(&mut AutonomyGovernor) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn process_human_override(
        &self,
        action_id: ActionId,
        operator_id: &str,
        override_reason: &str,
        alternative_action: Option<&str>,
    ) -> bool {
        self.inner.lock().process_human_override(
            action_id,
            operator_id,
            override_reason,
            alternative_action,
        )
    }

    pub fn mark_executed(&self, action_id: ActionId) -> bool {
        self.inner.lock().mark_executed(action_id)
    }

    pub fn activate_emergency_mode(&self, reason: &str) -> Vec<ActionId> {
        self.inner.lock().activate_emergency_mode(reason)
    }

    pub fn deactivate_emergency_mode(&self) {
        self.inner.lock().deactivate_emergency_mode();
    }

    pub fn update_mission_phase(&self, phase: MissionPhase) {
        self.inner.lock().update_mission_phase(phase);
    }

    pub fn expire_stale_actions(&self) -> Vec<ActionId> {
        self.inner.lock().expire_stale_actions()
    }

    pub fn get_pending_actions(&self) -> Vec<AutonomousAction> {
        self.inner.lock().get_pending_actions()
    }

    pub fn get_autonomy_status(&self) -> AutonomyStatus {
        self.inner.lock().get_autonomy_status()
    }

    /// Spawn a background task that expires stale pending actions every
    /// `interval`. Abort the returned handle to stop it. A zero interval
    /// spawns nothing.
    pub fn spawn_expiry_sweep(&self, interval: Duration) -> Option<JoinHandle<()>> {
        if interval.is_zero() {
            warn!("expiry sweep interval is zero, sweep not started");
            return None;
        }
        let governor = self.clone();
        info!(?interval, "expiry sweep started");
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let expired = governor.expire_stale_actions();
                if !expired.is_empty() {
                    debug!(count = expired.len(), "expiry sweep expired stale actions");
                }
            }
        }))
    }

    /// Start the sweep at the configured interval, or not at all when
    /// `expiry_sweep_interval_secs` is 0. The first pass runs immediately.
    pub fn spawn_configured_sweep(&self, config: &GovernorConfig) -> Option<JoinHandle<()>> {
        self.spawn_expiry_sweep(Duration::from_secs(config.expiry_sweep_interval_secs))
    }
}
