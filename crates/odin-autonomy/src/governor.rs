use chrono::{DateTime, Duration, Utc};
use odin_config::{GovernorConfig, OdinConfig};
use odin_core::{
    ActionId, ActionStatus, AutonomyLevel, BoundaryId, Event, EventBus, MissionPhase, Subsystem,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::action::{AutonomousAction, HumanOverride};
use crate::boundary::{DecisionBoundary, default_boundaries};
use crate::clock::{Clock, SystemClock};
use crate::level::{ConfidenceTier, FULL_AUTONOMY_EXECUTION_SECS};
use crate::verdict::{Denial, SystemHealthSummary, Verdict};

/// Operator id recorded when emergency mode cancels an action.
pub const EMERGENCY_OPERATOR_ID: &str = "SYSTEM_EMERGENCY";

/// Threshold increase applied to non-routine boundaries in critical phases.
pub const CRITICAL_PHASE_THRESHOLD_INCREASE: u8 = 5;

/// Tunables that do not belong to any single boundary.
#[derive(Debug, Clone)]
pub struct GovernorSettings {
    pub max_override_history: usize,
    pub urgent_window: Duration,
    pub override_window: Duration,
    pub restore_thresholds_on_phase_exit: bool,
}

impl Default for GovernorSettings {
    fn default() -> Self {
        Self::from(&GovernorConfig::default())
    }
}

impl From<&GovernorConfig> for GovernorSettings {
    fn from(config: &GovernorConfig) -> Self {
        Self {
            max_override_history: config.max_override_history,
            urgent_window: secs(config.urgent_window_secs),
            override_window: secs(config.override_window_hours.saturating_mul(3600)),
            restore_thresholds_on_phase_exit: config.restore_thresholds_on_phase_exit,
        }
    }
}

fn secs(s: u64) -> Duration {
    i64::try_from(s)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

/// Aggregate view for dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutonomyStatus {
    pub mission_phase: MissionPhase,
    pub emergency_mode: bool,
    pub operator_present: bool,
    pub pending_actions: usize,
    /// Pending actions whose deadline falls inside the urgent window.
    pub urgent_actions: usize,
    /// Overrides recorded inside the override window.
    pub recent_overrides: usize,
    pub total_boundaries: usize,
    /// Boundaries not disabled by the current mission phase.
    pub active_boundaries: usize,
}

/// Threshold and confirmation values captured before a critical-phase tightening.
#[derive(Debug, Clone, Copy)]
struct BoundarySnapshot {
    confidence_threshold: u8,
    requires_human_confirmation: bool,
}

/// Central policy oracle: maps a proposed action and its context to an
/// authorization verdict, and keeps the books on action lifecycles and
/// human overrides.
///
/// All methods are synchronous. Wrap in [`crate::SharedGovernor`] when
/// several tasks need it.
#[derive(Debug)]
pub struct AutonomyGovernor {
    boundaries: HashMap<BoundaryId, DecisionBoundary>,
    boundary_index: HashMap<(Subsystem, String), BoundaryId>,
    active_actions: HashMap<ActionId, AutonomousAction>,
    /// Creation order of `active_actions`, used to break deadline ties.
    action_order: Vec<ActionId>,
    override_history: VecDeque<HumanOverride>,
    current_phase: MissionPhase,
    emergency_mode: bool,
    operator_present: bool,
    /// Present while a critical phase has tightened the table.
    phase_snapshot: Option<HashMap<BoundaryId, BoundarySnapshot>>,
    settings: GovernorSettings,
    clock: Arc<dyn Clock>,
    events: Option<EventBus>,
}

impl Default for AutonomyGovernor {
    fn default() -> Self {
        Self::new()
    }
}

impl AutonomyGovernor {
    /// A governor seeded with the built-in boundary table.
    pub fn new() -> Self {
        let mut governor = Self::empty();
        let now = governor.clock.now();
        for boundary in default_boundaries(now) {
            governor.insert_boundary(boundary);
        }
        governor
    }

    /// A governor with no boundaries at all.
    pub fn empty() -> Self {
        Self {
            boundaries: HashMap::new(),
            boundary_index: HashMap::new(),
            active_actions: HashMap::new(),
            action_order: Vec::new(),
            override_history: VecDeque::new(),
            current_phase: MissionPhase::default(),
            emergency_mode: false,
            operator_present: true,
            phase_snapshot: None,
            settings: GovernorSettings::default(),
            clock: Arc::new(SystemClock),
            events: None,
        }
    }

    /// Build a governor from `odin.toml`: seed table, `[[boundaries]]`
    /// rows on top, then the configured phase and modes.
    pub fn from_config(config: &OdinConfig) -> odin_core::Result<Self> {
        let mut governor = if config.governor.seed_defaults {
            Self::new()
        } else {
            Self::empty()
        };
        governor.settings = GovernorSettings::from(&config.governor);

        let now = governor.clock.now();
        for row in &config.boundaries {
            governor.upsert_boundary(DecisionBoundary::from_config(row, now))?;
        }

        governor.update_mission_phase(config.governor.initial_phase);
        governor.emergency_mode = config.governor.emergency_mode;
        governor.operator_present = config.governor.operator_present;

        info!(
            boundaries = governor.boundaries.len(),
            phase = %governor.current_phase,
            emergency = governor.emergency_mode,
            "autonomy governor initialized"
        );
        Ok(governor)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_settings(mut self, settings: GovernorSettings) -> Self {
        self.settings = settings;
        self.trim_history();
        self
    }

    // ── Evaluation ─────────────────────────────────────────────

    /// Decide whether `action` on `subsystem` may run autonomously at the
    /// given confidence. Pure: never mutates governor state.
    pub fn evaluate_autonomous_action(
        &self,
        action: &str,
        subsystem: Subsystem,
        confidence: u8,
        reasoning: &[String],
        system_health: &SystemHealthSummary,
    ) -> Verdict {
        let confidence = confidence.min(100);
        let tier = ConfidenceTier::from_confidence(confidence);
        let mut rationale: Vec<String> = reasoning.to_vec();

        let Some(boundary) = self.boundary_for(subsystem, action) else {
            rationale.push(format!("{}: {subsystem}/{action}", Denial::NoBoundary));
            debug!(%subsystem, action, "no decision boundary");
            return Verdict::deny(Denial::NoBoundary, tier, rationale);
        };

        let denied = |denial: Denial, mut rationale: Vec<String>| {
            rationale.push(denial.reason().to_string());
            let mut verdict = Verdict::deny(denial, tier, rationale);
            verdict.boundary_id = Some(boundary.id.clone());
            verdict.safety_classification = Some(boundary.safety_classification);
            verdict.boundary_requires_confirmation = boundary.requires_human_confirmation;
            verdict.meets_boundary_threshold = confidence >= boundary.confidence_threshold;
            verdict
        };

        if boundary.is_restricted_in(self.current_phase) {
            debug!(boundary = %boundary.id, phase = %self.current_phase, "boundary restricted");
            return denied(Denial::PhaseRestricted, rationale);
        }

        if self.emergency_mode && !boundary.is_critical() {
            debug!(boundary = %boundary.id, "emergency mode suppresses non-critical action");
            return denied(Denial::EmergencyMode, rationale);
        }

        let subsystem_health = system_health.status_of(subsystem);
        if subsystem_health.is_impaired() {
            rationale.push(format!("{subsystem} health is {subsystem_health}"));
        }

        let meets_threshold = confidence >= boundary.confidence_threshold;
        if !meets_threshold {
            rationale.push(format!(
                "confidence {confidence}% is below boundary threshold {}%",
                boundary.confidence_threshold
            ));
        }

        let granted = tier.grant(boundary.autonomy_level);
        let verdict = match granted {
            AutonomyLevel::Manual => {
                let denial = if tier == ConfidenceTier::Low {
                    Denial::InsufficientConfidence
                } else {
                    Denial::ManualOnly
                };
                denied(denial, rationale)
            }
            level => {
                let full = level == AutonomyLevel::Full;
                rationale.push(format!(
                    "{tier} confidence ({confidence}%) grants {level} autonomy under {}",
                    boundary.id
                ));
                if boundary.requires_human_confirmation {
                    rationale.push("boundary requires human confirmation".to_string());
                }
                Verdict {
                    can_execute: true,
                    autonomy_level: level,
                    requires_confirmation: !full,
                    boundary_requires_confirmation: boundary.requires_human_confirmation,
                    time_to_execution_secs: Some(if full {
                        FULL_AUTONOMY_EXECUTION_SECS
                    } else {
                        boundary.time_constraint_secs
                    }),
                    boundary_id: Some(boundary.id.clone()),
                    safety_classification: Some(boundary.safety_classification),
                    tier,
                    meets_boundary_threshold: meets_threshold,
                    denial: None,
                    reasoning: rationale,
                }
            }
        };

        debug!(
            boundary = %boundary.id,
            confidence,
            can_execute = verdict.can_execute,
            level = %verdict.autonomy_level,
            "evaluated autonomous action"
        );
        verdict
    }

    // ── Action lifecycle ───────────────────────────────────────

    /// Register a pending action under its boundary. Does not re-evaluate;
    /// returns `None` only when no boundary governs the pair.
    pub fn create_autonomous_action(
        &mut self,
        action: &str,
        subsystem: Subsystem,
        confidence: u8,
        reasoning: Vec<String>,
        execution_plan: serde_json::Value,
        correlation_id: impl Into<String>,
    ) -> Option<AutonomousAction> {
        let boundary = self.boundary_for(subsystem, action)?;
        let now = self.clock.now();
        let deadline = now
            .checked_add_signed(boundary.time_constraint())
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let created = AutonomousAction {
            id: Uuid::new_v4(),
            decision_boundary_id: boundary.id.clone(),
            action: action.to_string(),
            subsystem,
            safety_classification: boundary.safety_classification,
            confidence: confidence.min(100),
            reasoning,
            execution_plan,
            human_override_deadline: deadline,
            status: ActionStatus::Pending,
            correlation_id: correlation_id.into(),
            created_at: now,
        };

        info!(
            action_id = %created.id,
            boundary = %created.decision_boundary_id,
            %subsystem,
            action,
            %deadline,
            "autonomous action pending"
        );
        self.emit(Event::ActionCreated {
            action_id: created.id,
            boundary_id: created.decision_boundary_id.clone(),
            subsystem,
            action: created.action.clone(),
            deadline,
        });

        self.action_order.push(created.id);
        self.active_actions.insert(created.id, created.clone());
        Some(created)
    }

    /// Cancel a pending action. Returns `false` when the action is unknown,
    /// no longer pending, or past its override deadline; nothing changes then.
    pub fn process_human_override(
        &mut self,
        action_id: ActionId,
        operator_id: &str,
        override_reason: &str,
        alternative_action: Option<&str>,
    ) -> bool {
        let now = self.clock.now();
        let Some(action) = self.active_actions.get(&action_id) else {
            debug!(%action_id, "override for unknown action");
            return false;
        };
        if !action.is_pending() {
            debug!(%action_id, status = %action.status, "override for non-pending action");
            return false;
        }
        if action.is_past_deadline(now) {
            warn!(%action_id, deadline = %action.human_override_deadline, "override arrived after deadline");
            return false;
        }

        let needs_second_operator = action.is_critical() && !self.emergency_mode;

        let record = HumanOverride {
            id: Uuid::new_v4(),
            autonomous_action_id: action_id,
            operator_id: operator_id.to_string(),
            override_reason: override_reason.to_string(),
            alternative_action: alternative_action.map(str::to_string),
            timestamp: now,
            confirmed_by_second_operator: needs_second_operator.then_some(false),
        };

        if let Some(action) = self.active_actions.get_mut(&action_id) {
            action.status = ActionStatus::Overridden;
        }

        info!(
            %action_id,
            operator = operator_id,
            reason = override_reason,
            needs_second_operator,
            "autonomous action overridden"
        );
        self.emit(Event::ActionOverridden {
            action_id,
            override_id: record.id,
            operator_id: record.operator_id.clone(),
            reason: record.override_reason.clone(),
            needs_second_operator,
        });

        self.override_history.push_back(record);
        self.trim_history();
        true
    }

    /// Record that a pending action ran. Same preconditions as an override.
    pub fn mark_executed(&mut self, action_id: ActionId) -> bool {
        let now = self.clock.now();
        match self.active_actions.get_mut(&action_id) {
            Some(action) if action.is_pending() && !action.is_past_deadline(now) => {
                action.status = ActionStatus::Executed;
                info!(%action_id, "autonomous action executed");
                self.emit(Event::ActionExecuted { action_id });
                true
            }
            _ => false,
        }
    }

    /// Move every pending action past its deadline to `expired`.
    pub fn expire_stale_actions(&mut self) -> Vec<ActionId> {
        let now = self.clock.now();
        let mut expired = Vec::new();
        for id in &self.action_order {
            let Some(action) = self.active_actions.get_mut(id) else {
                continue;
            };
            if action.is_pending() && action.is_past_deadline(now) {
                action.status = ActionStatus::Expired;
                expired.push((*id, action.human_override_deadline));
            }
        }
        for (action_id, deadline) in &expired {
            info!(%action_id, %deadline, "autonomous action expired");
            self.emit(Event::ActionExpired {
                action_id: *action_id,
                deadline: *deadline,
            });
        }
        expired.into_iter().map(|(id, _)| id).collect()
    }

    /// Drop finished (non-pending) actions created more than `older_than` ago.
    pub fn prune_finished_actions(&mut self, older_than: Duration) -> usize {
        let cutoff = self
            .clock
            .now()
            .checked_sub_signed(older_than)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let before = self.active_actions.len();
        self.active_actions
            .retain(|_, a| a.is_pending() || a.created_at >= cutoff);
        let actions = &self.active_actions;
        self.action_order.retain(|id| actions.contains_key(id));
        before - self.active_actions.len()
    }

    // ── Governor modes ─────────────────────────────────────────

    /// Enter emergency mode and cancel every pending non-critical action as
    /// [`EMERGENCY_OPERATOR_ID`]. Returns the ids that were overridden.
    pub fn activate_emergency_mode(&mut self, reason: &str) -> Vec<ActionId> {
        self.emergency_mode = true;
        warn!(reason, "emergency mode activated");

        let targets: Vec<ActionId> = self
            .action_order
            .iter()
            .filter(|id| {
                self.active_actions
                    .get(id)
                    .is_some_and(|a| a.is_pending() && !a.is_critical())
            })
            .copied()
            .collect();

        let overridden: Vec<ActionId> = targets
            .into_iter()
            .filter(|id| self.process_human_override(*id, EMERGENCY_OPERATOR_ID, reason, None))
            .collect();

        self.emit(Event::EmergencyModeActivated {
            reason: reason.to_string(),
            overridden: overridden.len(),
        });
        overridden
    }

    /// Leave emergency mode. Cancelled actions are not replayed.
    pub fn deactivate_emergency_mode(&mut self) {
        if self.emergency_mode {
            self.emergency_mode = false;
            info!("emergency mode deactivated");
            self.emit(Event::EmergencyModeDeactivated);
        }
    }

    /// Switch mission phase. Entering launch, landing, or emergency from a
    /// non-critical phase raises every non-routine threshold by 5 (capped at
    /// 100) and forces human confirmation on those boundaries. Leaving the
    /// critical phases restores the previous values when configured to.
    pub fn update_mission_phase(&mut self, phase: MissionPhase) {
        let previous = self.current_phase;
        self.current_phase = phase;
        if previous != phase {
            info!(from = %previous, to = %phase, "mission phase changed");
            self.emit(Event::MissionPhaseChanged {
                from: previous,
                to: phase,
            });
        }

        match (previous.is_critical(), phase.is_critical()) {
            (false, true) => self.tighten_boundaries(phase),
            (true, false) => self.restore_boundaries(phase),
            _ => {}
        }
    }

    pub fn set_operator_present(&mut self, present: bool) {
        self.operator_present = present;
    }

    // ── Boundary table ─────────────────────────────────────────

    /// Insert or replace a boundary. A row with the same `(subsystem,
    /// action)` pair is displaced and returned.
    pub fn upsert_boundary(
        &mut self,
        mut boundary: DecisionBoundary,
    ) -> odin_core::Result<Option<DecisionBoundary>> {
        boundary.validate()?;
        boundary.last_updated = self.clock.now();

        let (id, subsystem, action) = (
            boundary.id.clone(),
            boundary.subsystem,
            boundary.action.clone(),
        );
        let replaced = self.insert_boundary(boundary);
        if let Some(snapshot) = self.phase_snapshot.as_mut() {
            snapshot.remove(&id);
            if let Some(old) = &replaced {
                snapshot.remove(&old.id);
            }
        }

        info!(boundary = %id, %subsystem, action = %action, "decision boundary updated");
        self.emit(Event::BoundaryUpdated {
            boundary_id: id,
            subsystem,
            action,
            replaced: replaced.as_ref().map(|b| b.id.clone()),
        });
        Ok(replaced)
    }

    pub fn remove_boundary(&mut self, id: &str) -> Option<DecisionBoundary> {
        let removed = self.boundaries.remove(id)?;
        self.boundary_index
            .remove(&(removed.subsystem, removed.action.clone()));
        if let Some(snapshot) = self.phase_snapshot.as_mut() {
            snapshot.remove(id);
        }
        info!(boundary = id, "decision boundary removed");
        self.emit(Event::BoundaryRemoved {
            boundary_id: id.to_string(),
        });
        Some(removed)
    }

    pub fn boundary_for(&self, subsystem: Subsystem, action: &str) -> Option<&DecisionBoundary> {
        self.boundary_index
            .get(&(subsystem, action.to_string()))
            .and_then(|id| self.boundaries.get(id))
    }

    pub fn boundary(&self, id: &str) -> Option<&DecisionBoundary> {
        self.boundaries.get(id)
    }

    /// All boundaries ordered by subsystem, then action.
    pub fn boundaries(&self) -> Vec<&DecisionBoundary> {
        let mut rows: Vec<_> = self.boundaries.values().collect();
        rows.sort_by(|a, b| (a.subsystem, &a.action).cmp(&(b.subsystem, &b.action)));
        rows
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn get_action(&self, id: ActionId) -> Option<&AutonomousAction> {
        self.active_actions.get(&id)
    }

    /// Pending actions, soonest deadline first; ties keep creation order.
    pub fn get_pending_actions(&self) -> Vec<AutonomousAction> {
        let mut pending: Vec<AutonomousAction> = self
            .action_order
            .iter()
            .filter_map(|id| self.active_actions.get(id))
            .filter(|a| a.is_pending())
            .cloned()
            .collect();
        pending.sort_by_key(|a| a.human_override_deadline);
        pending
    }

    /// Override records, oldest first.
    pub fn override_history(&self) -> impl Iterator<Item = &HumanOverride> {
        self.override_history.iter()
    }

    pub fn get_autonomy_status(&self) -> AutonomyStatus {
        let now = self.clock.now();
        let urgent_cutoff = now
            .checked_add_signed(self.settings.urgent_window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let recent_cutoff = now
            .checked_sub_signed(self.settings.override_window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let pending = self.active_actions.values().filter(|a| a.is_pending());
        let (pending_actions, urgent_actions) = pending.fold((0, 0), |(p, u), a| {
            (p + 1, u + usize::from(a.human_override_deadline <= urgent_cutoff))
        });

        AutonomyStatus {
            mission_phase: self.current_phase,
            emergency_mode: self.emergency_mode,
            operator_present: self.operator_present,
            pending_actions,
            urgent_actions,
            recent_overrides: self
                .override_history
                .iter()
                .filter(|o| o.timestamp >= recent_cutoff)
                .count(),
            total_boundaries: self.boundaries.len(),
            active_boundaries: self
                .boundaries
                .values()
                .filter(|b| !b.is_restricted_in(self.current_phase))
                .count(),
        }
    }

    pub fn current_phase(&self) -> MissionPhase {
        self.current_phase
    }

    pub fn emergency_mode(&self) -> bool {
        self.emergency_mode
    }

    pub fn operator_present(&self) -> bool {
        self.operator_present
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ── Internals ──────────────────────────────────────────────

    fn insert_boundary(&mut self, boundary: DecisionBoundary) -> Option<DecisionBoundary> {
        let key = (boundary.subsystem, boundary.action.clone());
        let mut replaced = self
            .boundary_index
            .insert(key, boundary.id.clone())
            .filter(|old_id| *old_id != boundary.id)
            .and_then(|old_id| self.boundaries.remove(&old_id));

        // Same id re-pointed at a different pair: drop its old index entry.
        if let Some(old) = self.boundaries.insert(boundary.id.clone(), boundary) {
            let new = &self.boundaries[&old.id];
            let old_key = (old.subsystem, old.action.clone());
            if old_key != (new.subsystem, new.action.clone()) {
                self.boundary_index.remove(&old_key);
            }
            replaced.get_or_insert(old);
        }
        replaced
    }

    fn tighten_boundaries(&mut self, phase: MissionPhase) {
        let record = self.settings.restore_thresholds_on_phase_exit;
        let mut snapshot = HashMap::new();
        for boundary in self.boundaries.values_mut() {
            if boundary.safety_classification.is_routine() {
                continue;
            }
            if record {
                snapshot.insert(
                    boundary.id.clone(),
                    BoundarySnapshot {
                        confidence_threshold: boundary.confidence_threshold,
                        requires_human_confirmation: boundary.requires_human_confirmation,
                    },
                );
            }
            boundary.confidence_threshold = boundary
                .confidence_threshold
                .saturating_add(CRITICAL_PHASE_THRESHOLD_INCREASE)
                .min(100);
            boundary.requires_human_confirmation = true;
        }

        let count = self
            .boundaries
            .values()
            .filter(|b| !b.safety_classification.is_routine())
            .count();
        if record {
            self.phase_snapshot = Some(snapshot);
        }
        warn!(%phase, count, "critical phase: tightened decision boundaries");
        self.emit(Event::BoundariesTightened { phase, count });
    }

    fn restore_boundaries(&mut self, phase: MissionPhase) {
        let Some(snapshot) = self.phase_snapshot.take() else {
            return;
        };
        let mut count = 0;
        for (id, saved) in snapshot {
            if let Some(boundary) = self.boundaries.get_mut(&id) {
                boundary.confidence_threshold = saved.confidence_threshold;
                boundary.requires_human_confirmation = saved.requires_human_confirmation;
                count += 1;
            }
        }
        info!(%phase, count, "restored decision boundaries after critical phase");
        self.emit(Event::BoundariesRestored { phase, count });
    }

    fn trim_history(&mut self) {
        while self.override_history.len() > self.settings.max_override_history {
            self.override_history.pop_front();
        }
    }

    fn emit(&self, event: Event) {
        if let Some(events) = &self.events {
            events.publish(event);
        }
    }
}
