#[cfg(test)]
mod tests {
    use odin_autonomy::*;
    use odin_core::{AutonomyLevel, MissionPhase, Subsystem};
    use std::sync::Arc;

    fn governor() -> (AutonomyGovernor, ManualClock) {
        let clock = ManualClock::starting_now();
        let governor = AutonomyGovernor::new().with_clock(Arc::new(clock.clone()));
        (governor, clock)
    }

    fn create(governor: &mut AutonomyGovernor, subsystem: Subsystem, action: &str) -> AutonomousAction {
        governor
            .create_autonomous_action(
                action,
                subsystem,
                97,
                vec!["telemetry trend".to_string()],
                serde_json::json!({ "command": action }),
                "corr-1",
            )
            .expect("boundary exists")
    }

    fn reasons(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    // ── Confidence tiers ───────────────────────────────────────

    mod level {
        use odin_autonomy::ConfidenceTier;
        use odin_core::AutonomyLevel;

        #[test]
        fn test_tier_edges() {
            assert_eq!(ConfidenceTier::from_confidence(100), ConfidenceTier::High);
            assert_eq!(ConfidenceTier::from_confidence(95), ConfidenceTier::High);
            assert_eq!(ConfidenceTier::from_confidence(94), ConfidenceTier::Moderate);
            assert_eq!(ConfidenceTier::from_confidence(80), ConfidenceTier::Moderate);
            assert_eq!(ConfidenceTier::from_confidence(79), ConfidenceTier::Low);
            assert_eq!(ConfidenceTier::from_confidence(0), ConfidenceTier::Low);
        }

        #[test]
        fn test_grant_is_capped_by_boundary() {
            assert_eq!(ConfidenceTier::High.grant(AutonomyLevel::Full), AutonomyLevel::Full);
            assert_eq!(
                ConfidenceTier::High.grant(AutonomyLevel::Advisory),
                AutonomyLevel::Advisory
            );
            assert_eq!(ConfidenceTier::High.grant(AutonomyLevel::Manual), AutonomyLevel::Manual);
            assert_eq!(
                ConfidenceTier::Moderate.grant(AutonomyLevel::Full),
                AutonomyLevel::Advisory
            );
            assert_eq!(ConfidenceTier::Low.grant(AutonomyLevel::Full), AutonomyLevel::Manual);
        }
    }

    // ── Boundary table ─────────────────────────────────────────

    mod boundary {
        use super::*;
        use odin_core::SafetyClassification;
        use std::collections::HashSet;

        #[test]
        fn test_default_table() {
            let rows = default_boundaries(chrono::Utc::now());
            assert_eq!(rows.len(), 9);

            let subsystems: HashSet<_> = rows.iter().map(|b| b.subsystem).collect();
            for s in [
                Subsystem::Power,
                Subsystem::Thermal,
                Subsystem::Comms,
                Subsystem::Navigation,
                Subsystem::Propulsion,
            ] {
                assert!(subsystems.contains(&s), "missing {s}");
            }

            let pairs: HashSet<_> = rows.iter().map(|b| (b.subsystem, b.action.clone())).collect();
            assert_eq!(pairs.len(), rows.len());
            let ids: HashSet<_> = rows.iter().map(|b| b.id.clone()).collect();
            assert_eq!(ids.len(), rows.len());
            assert!(rows.iter().all(|b| b.validate().is_ok()));
        }

        #[test]
        fn test_validate_rejects_bad_rows() {
            let ok = DecisionBoundary::new(
                "x",
                Subsystem::Power,
                "a",
                AutonomyLevel::Full,
                90,
                10,
                SafetyClassification::Routine,
            );
            assert!(ok.validate().is_ok());

            let mut b = ok.clone();
            b.confidence_threshold = 101;
            assert!(b.validate().is_err());

            let mut b = ok.clone();
            b.time_constraint_secs = 0;
            assert!(b.validate().is_err());

            let mut b = ok;
            b.action = "  ".into();
            assert!(b.validate().is_err());
        }

        #[test]
        fn test_upsert_is_last_write_wins() {
            let (mut gov, _clock) = governor();
            let replacement = DecisionBoundary::new(
                "power-load-shed-v2",
                Subsystem::Power,
                "shed_non_critical_loads",
                AutonomyLevel::Advisory,
                90,
                45,
                SafetyClassification::Warning,
            );
            let replaced = gov.upsert_boundary(replacement).unwrap().unwrap();
            assert_eq!(replaced.id, "power-load-shed");

            let current = gov.boundary_for(Subsystem::Power, "shed_non_critical_loads").unwrap();
            assert_eq!(current.id, "power-load-shed-v2");
            assert!(gov.boundary("power-load-shed").is_none());
            assert_eq!(gov.boundaries().len(), 9);
        }

        #[test]
        fn test_upsert_same_id_to_new_pair_frees_old_pair() {
            let (mut gov, _clock) = governor();
            let mut moved = gov.boundary("power-load-shed").unwrap().clone();
            moved.action = "shed_all_loads".into();
            gov.upsert_boundary(moved).unwrap();

            assert!(gov.boundary_for(Subsystem::Power, "shed_non_critical_loads").is_none());
            assert_eq!(
                gov.boundary_for(Subsystem::Power, "shed_all_loads").unwrap().id,
                "power-load-shed"
            );
        }

        #[test]
        fn test_upsert_rejects_invalid() {
            let (mut gov, _clock) = governor();
            let bad = DecisionBoundary::new(
                "bad",
                Subsystem::Thermal,
                "overheat",
                AutonomyLevel::Full,
                150,
                10,
                SafetyClassification::Routine,
            );
            assert!(gov.upsert_boundary(bad).is_err());
            assert!(gov.boundary("bad").is_none());
        }

        #[test]
        fn test_remove_boundary() {
            let (mut gov, _clock) = governor();
            let removed = gov.remove_boundary("comms-emergency-beacon").unwrap();
            assert_eq!(removed.action, "enable_emergency_beacon");
            assert!(gov.boundary_for(Subsystem::Comms, "enable_emergency_beacon").is_none());
            assert!(gov.remove_boundary("comms-emergency-beacon").is_none());
        }
    }

    // ── Evaluation ─────────────────────────────────────────────

    mod evaluate {
        use super::*;

        fn eval(gov: &AutonomyGovernor, subsystem: Subsystem, action: &str, confidence: u8) -> Verdict {
            gov.evaluate_autonomous_action(
                action,
                subsystem,
                confidence,
                &[],
                &SystemHealthSummary::nominal(),
            )
        }

        #[test]
        fn test_high_confidence_full_boundary() {
            let (gov, _clock) = governor();
            let v = eval(&gov, Subsystem::Power, "shed_non_critical_loads", 97);
            assert!(v.can_execute);
            assert_eq!(v.autonomy_level, AutonomyLevel::Full);
            assert!(!v.requires_confirmation);
            assert_eq!(v.time_to_execution_secs, Some(5));
            assert_eq!(v.boundary_id.as_deref(), Some("power-load-shed"));
        }

        #[test]
        fn test_moderate_confidence_requires_confirmation() {
            let (gov, _clock) = governor();
            let v = eval(&gov, Subsystem::Power, "shed_non_critical_loads", 82);
            assert!(v.can_execute);
            assert_eq!(v.autonomy_level, AutonomyLevel::Advisory);
            assert!(v.requires_confirmation);
            assert_eq!(v.time_to_execution_secs, Some(30));
        }

        #[test]
        fn test_full_tier_property_over_full_boundaries() {
            let (gov, _clock) = governor();
            let full: Vec<_> = gov
                .boundaries()
                .into_iter()
                .filter(|b| b.autonomy_level == AutonomyLevel::Full && !b.requires_human_confirmation)
                .map(|b| (b.subsystem, b.action.clone()))
                .collect();
            assert!(!full.is_empty());
            for (subsystem, action) in full {
                for confidence in 95..=100 {
                    let v = eval(&gov, subsystem, &action, confidence);
                    assert!(v.can_execute, "{subsystem}/{action} at {confidence}");
                    assert!(!v.requires_confirmation);
                    assert_eq!(v.autonomy_level, AutonomyLevel::Full);
                }
            }
        }

        #[test]
        fn test_full_tier_ignores_boundary_confirmation_flag() {
            let (mut gov, _clock) = governor();
            let flagged = DecisionBoundary::new(
                "power-load-shed-confirm",
                Subsystem::Power,
                "shed_non_critical_loads",
                AutonomyLevel::Full,
                90,
                30,
                odin_core::SafetyClassification::Caution,
            )
            .with_confirmation();
            gov.upsert_boundary(flagged).unwrap();

            let v = eval(&gov, Subsystem::Power, "shed_non_critical_loads", 99);
            assert!(v.can_execute);
            assert_eq!(v.autonomy_level, AutonomyLevel::Full);
            assert!(!v.requires_confirmation);
            assert!(v.boundary_requires_confirmation);
            assert!(v.reasoning.iter().any(|r| r.contains("requires human confirmation")));

            let v = eval(&gov, Subsystem::Power, "shed_non_critical_loads", 85);
            assert!(v.requires_confirmation);
            assert!(v.boundary_requires_confirmation);
        }

        #[test]
        fn test_moderate_tier_property() {
            let (gov, _clock) = governor();
            let rows: Vec<_> = gov
                .boundaries()
                .into_iter()
                .map(|b| (b.subsystem, b.action.clone(), b.autonomy_level))
                .collect();
            for (subsystem, action, level) in rows {
                for confidence in 80..95 {
                    let v = eval(&gov, subsystem, &action, confidence);
                    assert!(v.requires_confirmation);
                    assert_eq!(v.can_execute, level != AutonomyLevel::Manual);
                }
            }
        }

        #[test]
        fn test_low_confidence_is_always_manual() {
            let (gov, _clock) = governor();
            let rows: Vec<_> = gov
                .boundaries()
                .into_iter()
                .map(|b| (b.subsystem, b.action.clone()))
                .collect();
            for (subsystem, action) in rows {
                for confidence in [0, 40, 79] {
                    let v = eval(&gov, subsystem, &action, confidence);
                    assert!(!v.can_execute);
                    assert_eq!(v.autonomy_level, AutonomyLevel::Manual);
                    assert!(v.requires_confirmation);
                    assert_eq!(v.denial, Some(Denial::InsufficientConfidence));
                }
            }
        }

        #[test]
        fn test_manual_boundary_denies_high_confidence() {
            let (gov, _clock) = governor();
            let v = eval(&gov, Subsystem::Propulsion, "main_engine_burn", 100);
            assert!(!v.can_execute);
            assert_eq!(v.autonomy_level, AutonomyLevel::Manual);
            assert_eq!(v.denial, Some(Denial::ManualOnly));
        }

        #[test]
        fn test_high_confidence_advisory_boundary() {
            let (gov, _clock) = governor();
            let v = eval(&gov, Subsystem::Power, "switch_to_backup_battery", 99);
            assert!(v.can_execute);
            assert_eq!(v.autonomy_level, AutonomyLevel::Advisory);
            assert!(v.requires_confirmation);
            assert_eq!(v.time_to_execution_secs, Some(60));
        }

        #[test]
        fn test_no_boundary() {
            let (gov, _clock) = governor();
            let v = eval(&gov, Subsystem::LifeSupport, "vent_cabin", 99);
            assert!(!v.can_execute);
            assert_eq!(v.autonomy_level, AutonomyLevel::Manual);
            assert!(v.requires_confirmation);
            assert_eq!(v.denial, Some(Denial::NoBoundary));
            assert!(v.reasoning.iter().any(|r| r.contains("no boundary defined")));
            assert!(v.boundary_id.is_none());
        }

        #[test]
        fn test_phase_restriction() {
            let (mut gov, _clock) = governor();
            gov.update_mission_phase(MissionPhase::Landing);
            let v = eval(&gov, Subsystem::Navigation, "trajectory_correction", 99);
            assert!(!v.can_execute);
            assert_eq!(v.denial, Some(Denial::PhaseRestricted));
            assert_eq!(
                v.reasoning.last().map(String::as_str),
                Some("restricted in current mission phase")
            );
        }

        #[test]
        fn test_emergency_mode_denies_non_critical_only() {
            let (mut gov, _clock) = governor();
            gov.activate_emergency_mode("hull breach drill");

            let v = eval(&gov, Subsystem::Power, "shed_non_critical_loads", 99);
            assert!(!v.can_execute);
            assert_eq!(v.denial, Some(Denial::EmergencyMode));
            assert!(v.reasoning.iter().any(|r| r == "emergency mode active"));

            let v = eval(&gov, Subsystem::Navigation, "collision_avoidance_maneuver", 99);
            assert!(v.can_execute);
            assert_eq!(v.autonomy_level, AutonomyLevel::Full);
        }

        #[test]
        fn test_reasoning_keeps_caller_lines_first() {
            let (gov, _clock) = governor();
            let v = gov.evaluate_autonomous_action(
                "shed_non_critical_loads",
                Subsystem::Power,
                96,
                &reasons(&["bus voltage dropping", "solar array shadowed"]),
                &SystemHealthSummary::nominal(),
            );
            assert_eq!(v.reasoning[0], "bus voltage dropping");
            assert_eq!(v.reasoning[1], "solar array shadowed");
            assert!(v.reasoning.len() > 2);
        }

        #[test]
        fn test_below_boundary_threshold_is_reported() {
            let (gov, _clock) = governor();
            let v = eval(&gov, Subsystem::Power, "shed_non_critical_loads", 91);
            assert!(!v.meets_boundary_threshold);
            assert!(v.reasoning.iter().any(|r| r.contains("below boundary threshold 95%")));
            assert!(v.can_execute);

            let v = eval(&gov, Subsystem::Power, "shed_non_critical_loads", 95);
            assert!(v.meets_boundary_threshold);
        }

        #[test]
        fn test_impaired_health_adds_rationale() {
            let (gov, _clock) = governor();
            let health = SystemHealthSummary::nominal()
                .with_subsystem(Subsystem::Power, HealthStatus::Critical);
            let v = gov.evaluate_autonomous_action(
                "shed_non_critical_loads",
                Subsystem::Power,
                97,
                &[],
                &health,
            );
            assert!(v.reasoning.iter().any(|r| r == "power health is critical"));
        }

        #[test]
        fn test_evaluation_does_not_mutate() {
            let (gov, _clock) = governor();
            let before = gov.get_autonomy_status();
            for confidence in [10, 85, 99] {
                eval(&gov, Subsystem::Power, "shed_non_critical_loads", confidence);
            }
            assert_eq!(gov.get_autonomy_status(), before);
            assert!(gov.get_pending_actions().is_empty());
        }
    }

    // ── Action lifecycle ───────────────────────────────────────

    mod lifecycle {
        use super::*;
        use chrono::Duration;
        use odin_core::ActionStatus;

        #[test]
        fn test_create_without_boundary_returns_none() {
            let (mut gov, _clock) = governor();
            let created = gov.create_autonomous_action(
                "vent_cabin",
                Subsystem::LifeSupport,
                99,
                vec![],
                serde_json::Value::Null,
                "corr",
            );
            assert!(created.is_none());
            assert!(gov.get_pending_actions().is_empty());
        }

        #[test]
        fn test_create_sets_deadline_and_status() {
            let (mut gov, clock) = governor();
            let now = clock.now();
            let action = create(&mut gov, Subsystem::Power, "shed_non_critical_loads");
            assert_eq!(action.status, ActionStatus::Pending);
            assert_eq!(action.decision_boundary_id, "power-load-shed");
            assert_eq!(action.human_override_deadline, now + Duration::seconds(30));
            assert_eq!(action.created_at, now);
            assert_eq!(action.correlation_id, "corr-1");
            assert!(gov.get_action(action.id).is_some());
        }

        #[test]
        fn test_create_does_not_reevaluate() {
            let (mut gov, _clock) = governor();
            gov.activate_emergency_mode("drill");
            let created = gov.create_autonomous_action(
                "shed_non_critical_loads",
                Subsystem::Power,
                10,
                vec![],
                serde_json::Value::Null,
                "corr",
            );
            assert!(created.is_some());
        }

        #[test]
        fn test_override_success() {
            let (mut gov, _clock) = governor();
            let action = create(&mut gov, Subsystem::Power, "shed_non_critical_loads");
            assert!(gov.process_human_override(
                action.id,
                "flight-director",
                "loads needed for experiment",
                Some("reduce heater duty cycle"),
            ));

            assert_eq!(gov.get_action(action.id).unwrap().status, ActionStatus::Overridden);
            let history: Vec<_> = gov.override_history().collect();
            assert_eq!(history.len(), 1);
            assert_eq!(history[0].operator_id, "flight-director");
            assert_eq!(
                history[0].alternative_action.as_deref(),
                Some("reduce heater duty cycle")
            );
            assert!(!history[0].needs_second_operator());
            assert_eq!(history[0].confirmed_by_second_operator, None);
        }

        #[test]
        fn test_override_of_critical_action_needs_second_operator() {
            let (mut gov, _clock) = governor();
            let action = create(&mut gov, Subsystem::Comms, "enable_emergency_beacon");
            assert!(gov.process_human_override(action.id, "capcom", "false alarm", None));
            let record = gov.override_history().last().unwrap();
            assert!(record.needs_second_operator());
            assert_eq!(record.confirmed_by_second_operator, Some(false));
        }

        #[test]
        fn test_override_after_deadline_fails_without_mutation() {
            let (mut gov, clock) = governor();
            let action = create(&mut gov, Subsystem::Power, "shed_non_critical_loads");
            clock.advance_secs(31);
            assert!(!gov.process_human_override(action.id, "capcom", "too late", None));
            assert_eq!(gov.get_action(action.id).unwrap().status, ActionStatus::Pending);
            assert_eq!(gov.override_history().count(), 0);
        }

        #[test]
        fn test_override_at_exact_deadline_succeeds() {
            let (mut gov, clock) = governor();
            let action = create(&mut gov, Subsystem::Power, "shed_non_critical_loads");
            clock.advance_secs(30);
            assert!(gov.process_human_override(action.id, "capcom", "just in time", None));
        }

        #[test]
        fn test_override_twice_fails() {
            let (mut gov, _clock) = governor();
            let action = create(&mut gov, Subsystem::Power, "shed_non_critical_loads");
            assert!(gov.process_human_override(action.id, "a", "first", None));
            assert!(!gov.process_human_override(action.id, "b", "second", None));
            assert_eq!(gov.override_history().count(), 1);
        }

        #[test]
        fn test_override_unknown_action() {
            let (mut gov, _clock) = governor();
            assert!(!gov.process_human_override(uuid::Uuid::new_v4(), "a", "b", None));
        }

        #[test]
        fn test_pending_sorted_by_deadline() {
            let (mut gov, _clock) = governor();
            // 30s deadline created first, 10s deadline second.
            let slow = create(&mut gov, Subsystem::Power, "shed_non_critical_loads");
            let fast = create(&mut gov, Subsystem::Comms, "enable_emergency_beacon");
            let pending = gov.get_pending_actions();
            assert_eq!(pending.len(), 2);
            assert_eq!(pending[0].id, fast.id);
            assert_eq!(pending[1].id, slow.id);
        }

        #[test]
        fn test_pending_ties_keep_insertion_order() {
            let (mut gov, _clock) = governor();
            let ids: Vec<_> = (0..5)
                .map(|_| create(&mut gov, Subsystem::Power, "shed_non_critical_loads").id)
                .collect();
            let pending: Vec<_> = gov.get_pending_actions().into_iter().map(|a| a.id).collect();
            assert_eq!(pending, ids);
        }

        #[test]
        fn test_pending_excludes_finished_actions() {
            let (mut gov, _clock) = governor();
            let a = create(&mut gov, Subsystem::Power, "shed_non_critical_loads");
            let b = create(&mut gov, Subsystem::Thermal, "adjust_heater_setpoints");
            assert!(gov.mark_executed(a.id));
            let pending = gov.get_pending_actions();
            assert_eq!(pending.len(), 1);
            assert_eq!(pending[0].id, b.id);
        }

        #[test]
        fn test_mark_executed() {
            let (mut gov, clock) = governor();
            let action = create(&mut gov, Subsystem::Power, "shed_non_critical_loads");
            assert!(gov.mark_executed(action.id));
            assert_eq!(gov.get_action(action.id).unwrap().status, ActionStatus::Executed);
            assert!(!gov.mark_executed(action.id));

            let late = create(&mut gov, Subsystem::Power, "shed_non_critical_loads");
            clock.advance_secs(31);
            assert!(!gov.mark_executed(late.id));
        }

        #[test]
        fn test_expire_stale_actions() {
            let (mut gov, clock) = governor();
            let beacon = create(&mut gov, Subsystem::Comms, "enable_emergency_beacon");
            let shed = create(&mut gov, Subsystem::Power, "shed_non_critical_loads");
            let burn = create(&mut gov, Subsystem::Propulsion, "main_engine_burn");

            clock.advance_secs(31);
            let expired = gov.expire_stale_actions();
            assert_eq!(expired, vec![beacon.id, shed.id]);
            assert_eq!(gov.get_action(beacon.id).unwrap().status, ActionStatus::Expired);
            assert_eq!(gov.get_action(burn.id).unwrap().status, ActionStatus::Pending);
            assert!(gov.expire_stale_actions().is_empty());
            assert!(!gov.process_human_override(beacon.id, "a", "b", None));
        }

        #[test]
        fn test_prune_finished_actions() {
            let (mut gov, clock) = governor();
            let done = create(&mut gov, Subsystem::Power, "shed_non_critical_loads");
            let waiting = create(&mut gov, Subsystem::Propulsion, "main_engine_burn");
            gov.mark_executed(done.id);

            clock.advance_secs(120);
            assert_eq!(gov.prune_finished_actions(Duration::seconds(60)), 1);
            assert!(gov.get_action(done.id).is_none());
            assert!(gov.get_action(waiting.id).is_some());
        }

        #[test]
        fn test_prune_with_huge_age_keeps_everything() {
            let (mut gov, _clock) = governor();
            let done = create(&mut gov, Subsystem::Power, "shed_non_critical_loads");
            gov.mark_executed(done.id);

            assert_eq!(gov.prune_finished_actions(Duration::MAX), 0);
            assert!(gov.get_action(done.id).is_some());
        }

        #[test]
        fn test_override_history_is_bounded() {
            let settings = GovernorSettings {
                max_override_history: 2,
                ..GovernorSettings::default()
            };
            let (gov, _clock) = governor();
            let mut gov = gov.with_settings(settings);
            let ids: Vec<_> = (0..3)
                .map(|_| create(&mut gov, Subsystem::Power, "shed_non_critical_loads").id)
                .collect();
            for id in &ids {
                assert!(gov.process_human_override(*id, "op", "r", None));
            }
            let kept: Vec<_> = gov.override_history().map(|o| o.autonomous_action_id).collect();
            assert_eq!(kept, vec![ids[1], ids[2]]);
        }
    }

    // ── Emergency mode ─────────────────────────────────────────

    mod emergency {
        use super::*;
        use odin_core::ActionStatus;

        #[test]
        fn test_emergency_overrides_only_non_critical() {
            let (mut gov, _clock) = governor();
            let critical = create(&mut gov, Subsystem::Comms, "enable_emergency_beacon");
            let caution = create(&mut gov, Subsystem::Power, "shed_non_critical_loads");

            let overridden = gov.activate_emergency_mode("test");
            assert_eq!(overridden, vec![caution.id]);
            assert!(gov.emergency_mode());

            assert_eq!(gov.get_action(caution.id).unwrap().status, ActionStatus::Overridden);
            assert_eq!(gov.get_action(critical.id).unwrap().status, ActionStatus::Pending);

            let record = gov.override_history().next().unwrap();
            assert_eq!(record.operator_id, EMERGENCY_OPERATOR_ID);
            assert_eq!(record.operator_id, "SYSTEM_EMERGENCY");
            assert_eq!(record.override_reason, "test");
            assert_eq!(record.autonomous_action_id, caution.id);
        }

        #[test]
        fn test_emergency_partitions_many_actions() {
            let (mut gov, _clock) = governor();
            let mut critical = Vec::new();
            let mut other = Vec::new();
            for _ in 0..3 {
                critical.push(create(&mut gov, Subsystem::Navigation, "collision_avoidance_maneuver").id);
                other.push(create(&mut gov, Subsystem::Thermal, "adjust_heater_setpoints").id);
                other.push(create(&mut gov, Subsystem::Power, "switch_to_backup_battery").id);
            }
            gov.activate_emergency_mode("debris field");

            let pending: Vec<_> = gov.get_pending_actions().into_iter().map(|a| a.id).collect();
            assert_eq!(pending.len(), critical.len());
            assert!(critical.iter().all(|id| pending.contains(id)));
            for id in other {
                assert_eq!(gov.get_action(id).unwrap().status, ActionStatus::Overridden);
            }
        }

        #[test]
        fn test_critical_override_during_emergency_needs_no_second_operator() {
            let (mut gov, _clock) = governor();
            let critical = create(&mut gov, Subsystem::Comms, "enable_emergency_beacon");
            gov.activate_emergency_mode("drill");
            assert!(gov.process_human_override(critical.id, "commander", "manual beacon", None));
            assert!(!gov.override_history().last().unwrap().needs_second_operator());
        }

        #[test]
        fn test_critical_action_survives_boundary_replacement() {
            let (mut gov, _clock) = governor();
            let critical = create(&mut gov, Subsystem::Navigation, "collision_avoidance_maneuver");
            assert_eq!(critical.safety_classification, odin_core::SafetyClassification::Critical);

            let replacement = DecisionBoundary::new(
                "nav-ca-v2",
                Subsystem::Navigation,
                "collision_avoidance_maneuver",
                AutonomyLevel::Full,
                92,
                15,
                odin_core::SafetyClassification::Critical,
            );
            gov.upsert_boundary(replacement).unwrap();
            assert!(gov.boundary(&critical.decision_boundary_id).is_none());

            assert!(gov.activate_emergency_mode("test").is_empty());
            assert_eq!(gov.get_action(critical.id).unwrap().status, ActionStatus::Pending);
        }

        #[test]
        fn test_second_operator_flag_survives_boundary_removal() {
            let (mut gov, _clock) = governor();
            let critical = create(&mut gov, Subsystem::Comms, "enable_emergency_beacon");
            gov.remove_boundary("comms-emergency-beacon").unwrap();

            assert!(gov.process_human_override(critical.id, "capcom", "beacon not needed", None));
            assert!(gov.override_history().last().unwrap().needs_second_operator());
        }

        #[test]
        fn test_deactivate_does_not_replay() {
            let (mut gov, _clock) = governor();
            let caution = create(&mut gov, Subsystem::Power, "shed_non_critical_loads");
            gov.activate_emergency_mode("drill");
            gov.deactivate_emergency_mode();
            assert!(!gov.emergency_mode());
            assert_eq!(gov.get_action(caution.id).unwrap().status, ActionStatus::Overridden);

            let v = gov.evaluate_autonomous_action(
                "shed_non_critical_loads",
                Subsystem::Power,
                99,
                &[],
                &SystemHealthSummary::nominal(),
            );
            assert!(v.can_execute);
        }
    }

    // ── Mission phases ─────────────────────────────────────────

    mod phase {
        use super::*;

        fn threshold(gov: &AutonomyGovernor, id: &str) -> u8 {
            gov.boundary(id).unwrap().confidence_threshold
        }

        #[test]
        fn test_critical_phase_tightens_non_routine() {
            let (mut gov, _clock) = governor();
            gov.update_mission_phase(MissionPhase::Landing);
            assert_eq!(gov.current_phase(), MissionPhase::Landing);

            // caution 95 -> 100
            assert_eq!(threshold(&gov, "power-load-shed"), 100);
            // warning 85 -> 90
            assert_eq!(threshold(&gov, "power-backup-battery"), 90);
            // critical 99 -> capped at 100
            assert_eq!(threshold(&gov, "propulsion-main-engine-burn"), 100);
            // routine untouched
            assert_eq!(threshold(&gov, "thermal-heater-setpoint"), 85);
            assert!(!gov.boundary("thermal-heater-setpoint").unwrap().requires_human_confirmation);

            for b in gov.boundaries() {
                if !b.safety_classification.is_routine() {
                    assert!(b.requires_human_confirmation, "{}", b.id);
                }
            }
        }

        #[test]
        fn test_critical_phase_flags_boundary_confirmation_on_full_tier() {
            let (mut gov, _clock) = governor();
            gov.update_mission_phase(MissionPhase::Launch);
            let v = gov.evaluate_autonomous_action(
                "shed_non_critical_loads",
                Subsystem::Power,
                100,
                &[],
                &SystemHealthSummary::nominal(),
            );
            assert!(v.can_execute);
            assert_eq!(v.autonomy_level, AutonomyLevel::Full);
            assert!(!v.requires_confirmation);
            assert!(v.boundary_requires_confirmation);
        }

        #[test]
        fn test_leaving_critical_phase_restores() {
            let (mut gov, _clock) = governor();
            gov.update_mission_phase(MissionPhase::Launch);
            gov.update_mission_phase(MissionPhase::Cruise);
            assert_eq!(threshold(&gov, "power-load-shed"), 95);
            assert_eq!(threshold(&gov, "propulsion-main-engine-burn"), 99);
            assert!(!gov.boundary("power-load-shed").unwrap().requires_human_confirmation);
            assert!(gov.boundary("power-backup-battery").unwrap().requires_human_confirmation);
        }

        #[test]
        fn test_critical_to_critical_does_not_stack() {
            let (mut gov, _clock) = governor();
            gov.update_mission_phase(MissionPhase::Launch);
            gov.update_mission_phase(MissionPhase::Emergency);
            gov.update_mission_phase(MissionPhase::Emergency);
            assert_eq!(threshold(&gov, "power-backup-battery"), 90);
            gov.update_mission_phase(MissionPhase::Orbit);
            assert_eq!(threshold(&gov, "power-backup-battery"), 85);
        }

        #[test]
        fn test_irreversible_mode_keeps_tightening() {
            let settings = GovernorSettings {
                restore_thresholds_on_phase_exit: false,
                ..GovernorSettings::default()
            };
            let (gov, _clock) = governor();
            let mut gov = gov.with_settings(settings);
            gov.update_mission_phase(MissionPhase::Launch);
            gov.update_mission_phase(MissionPhase::Cruise);
            assert_eq!(threshold(&gov, "power-backup-battery"), 90);
            gov.update_mission_phase(MissionPhase::Landing);
            assert_eq!(threshold(&gov, "power-backup-battery"), 95);
        }

        #[test]
        fn test_boundary_replaced_during_critical_phase_is_kept() {
            let (mut gov, _clock) = governor();
            gov.update_mission_phase(MissionPhase::Landing);
            let mut b = gov.boundary("power-backup-battery").unwrap().clone();
            b.confidence_threshold = 70;
            b.requires_human_confirmation = false;
            gov.upsert_boundary(b).unwrap();
            gov.update_mission_phase(MissionPhase::SurfaceOperations);
            assert_eq!(threshold(&gov, "power-backup-battery"), 70);
        }
    }

    // ── Status ─────────────────────────────────────────────────

    mod status {
        use super::*;

        #[test]
        fn test_status_counts() {
            let (mut gov, clock) = governor();
            create(&mut gov, Subsystem::Comms, "enable_emergency_beacon");
            create(&mut gov, Subsystem::Propulsion, "main_engine_burn");
            let shed = create(&mut gov, Subsystem::Power, "shed_non_critical_loads");
            assert!(gov.process_human_override(shed.id, "op", "r", None));

            let status = gov.get_autonomy_status();
            assert_eq!(status.pending_actions, 2);
            assert_eq!(status.urgent_actions, 1);
            assert_eq!(status.recent_overrides, 1);
            assert_eq!(status.total_boundaries, 9);
            assert_eq!(status.active_boundaries, 9);
            assert_eq!(status.mission_phase, MissionPhase::Cruise);
            assert!(!status.emergency_mode);
            assert!(status.operator_present);

            clock.advance_secs(25 * 3600);
            let status = gov.get_autonomy_status();
            assert_eq!(status.recent_overrides, 0);
        }

        #[test]
        fn test_active_boundaries_follow_phase() {
            let (mut gov, _clock) = governor();
            gov.update_mission_phase(MissionPhase::Launch);
            let status = gov.get_autonomy_status();
            assert_eq!(status.total_boundaries, 9);
            // radiator deploy, trajectory correction, main engine burn
            assert_eq!(status.active_boundaries, 6);
        }

        #[test]
        fn test_operator_presence() {
            let (mut gov, _clock) = governor();
            gov.set_operator_present(false);
            assert!(!gov.get_autonomy_status().operator_present);
        }
    }

    // ── Configuration ──────────────────────────────────────────

    mod config {
        use super::*;
        use odin_config::{BoundaryConfig, OdinConfig};
        use odin_core::SafetyClassification;

        #[test]
        fn test_from_config_without_seed() {
            let mut config = OdinConfig::default();
            config.governor.seed_defaults = false;
            config.governor.initial_phase = MissionPhase::Landing;
            config.boundaries.push(BoundaryConfig {
                id: "ls-scrubber".into(),
                subsystem: Subsystem::LifeSupport,
                action: "swap_co2_scrubber".into(),
                autonomy_level: AutonomyLevel::Full,
                confidence_threshold: 90,
                time_constraint_secs: 45,
                requires_human_confirmation: false,
                safety_classification: SafetyClassification::Warning,
                mission_phase_restrictions: vec![],
            });

            let gov = AutonomyGovernor::from_config(&config).unwrap();
            assert_eq!(gov.boundaries().len(), 1);
            assert_eq!(gov.current_phase(), MissionPhase::Landing);
            let b = gov.boundary("ls-scrubber").unwrap();
            assert_eq!(b.confidence_threshold, 95);
            assert!(b.requires_human_confirmation);
        }

        #[test]
        fn test_from_config_overrides_seed_row() {
            let mut config = OdinConfig::default();
            config.governor.emergency_mode = true;
            config.boundaries.push(BoundaryConfig {
                id: "custom-load-shed".into(),
                subsystem: Subsystem::Power,
                action: "shed_non_critical_loads".into(),
                autonomy_level: AutonomyLevel::Advisory,
                confidence_threshold: 90,
                time_constraint_secs: 20,
                requires_human_confirmation: true,
                safety_classification: SafetyClassification::Critical,
                mission_phase_restrictions: vec![],
            });

            let gov = AutonomyGovernor::from_config(&config).unwrap();
            assert_eq!(gov.boundaries().len(), 9);
            assert!(gov.emergency_mode());
            let b = gov.boundary_for(Subsystem::Power, "shed_non_critical_loads").unwrap();
            assert_eq!(b.id, "custom-load-shed");
        }
    }

    // ── Events ─────────────────────────────────────────────────

    mod events {
        use super::*;
        use odin_core::{Event, EventBus};

        #[test]
        fn test_transitions_are_published() {
            let bus = EventBus::new(32);
            let mut rx = bus.subscribe();
            let (gov, _clock) = governor();
            let mut gov = gov.with_event_bus(bus);

            let action = create(&mut gov, Subsystem::Power, "shed_non_critical_loads");
            gov.activate_emergency_mode("drill");

            match rx.try_recv().unwrap() {
                Event::ActionCreated { action_id, boundary_id, .. } => {
                    assert_eq!(action_id, action.id);
                    assert_eq!(boundary_id, "power-load-shed");
                }
                other => panic!("expected ActionCreated, got {other:?}"),
            }
            match rx.try_recv().unwrap() {
                Event::ActionOverridden { operator_id, .. } => {
                    assert_eq!(operator_id, EMERGENCY_OPERATOR_ID);
                }
                other => panic!("expected ActionOverridden, got {other:?}"),
            }
            match rx.try_recv().unwrap() {
                Event::EmergencyModeActivated { overridden, .. } => assert_eq!(overridden, 1),
                other => panic!("expected EmergencyModeActivated, got {other:?}"),
            }
        }
    }

    // ── Shared handle ──────────────────────────────────────────

    mod shared {
        use super::*;
        use odin_core::ActionStatus;

        #[test]
        fn test_concurrent_overrides_only_one_wins() {
            let (mut gov, _clock) = governor();
            let action_id = create(&mut gov, Subsystem::Power, "shed_non_critical_loads").id;
            let shared = SharedGovernor::new(gov);

            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let shared = shared.clone();
                    std::thread::spawn(move || {
                        shared.process_human_override(action_id, &format!("op-{i}"), "race", None)
                    })
                })
                .collect();
            let wins = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|won| *won)
                .count();
            assert_eq!(wins, 1);
            assert_eq!(shared.lock().override_history().count(), 1);
        }

        #[tokio::test]
        async fn test_expiry_sweep_expires_stale_actions() {
            let (mut gov, clock) = governor();
            let action = create(&mut gov, Subsystem::Power, "shed_non_critical_loads");
            let shared = SharedGovernor::new(gov);

            clock.advance_secs(31);
            let handle = shared
                .spawn_expiry_sweep(std::time::Duration::from_millis(10))
                .expect("sweep spawned");
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            handle.abort();

            let status = shared.with(|g| g.get_action(action.id).map(|a| a.status));
            assert_eq!(status, Some(ActionStatus::Expired));
            assert_eq!(shared.get_autonomy_status().pending_actions, 0);
        }

        #[tokio::test]
        async fn test_configured_sweep_disabled_at_zero() {
            let (gov, _clock) = governor();
            let shared = SharedGovernor::new(gov);
            let mut config = odin_config::GovernorConfig::default();
            config.expiry_sweep_interval_secs = 0;
            assert!(shared.spawn_configured_sweep(&config).is_none());

            config.expiry_sweep_interval_secs = 5;
            let handle = shared.spawn_configured_sweep(&config).expect("sweep spawned");
            handle.abort();
        }

        #[tokio::test]
        async fn test_zero_interval_sweep_is_not_spawned() {
            let (gov, _clock) = governor();
            let shared = SharedGovernor::new(gov);
            assert!(shared.spawn_expiry_sweep(std::time::Duration::ZERO).is_none());
        }
    }
}
