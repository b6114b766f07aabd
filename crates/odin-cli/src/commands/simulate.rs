//! Scripted mission pass: drives the governor through a cruise, a landing,
//! an emergency, and the expiry sweep, printing every event it publishes.

use std::sync::Arc;
use std::time::Duration;

use odin_autonomy::{
    AutonomyGovernor, ManualClock, SharedGovernor, SystemHealthSummary, Verdict,
};
use odin_config::OdinConfig;
use odin_core::{Event, EventBus, MissionPhase, Subsystem};
use tokio::sync::broadcast;

pub(super) async fn cmd_simulate(config: &OdinConfig, json: bool) -> odin_core::Result<()> {
    let clock = ManualClock::starting_now();
    let bus = EventBus::new(config.governor.event_capacity.max(64));
    let mut events = bus.subscribe();

    let governor = AutonomyGovernor::from_config(config)?
        .with_clock(Arc::new(clock.clone()))
        .with_event_bus(bus);
    let governor = SharedGovernor::new(governor);
    let health = SystemHealthSummary::nominal();

    step("T+0s cruise: analysis proposes three actions", json);
    governor.update_mission_phase(MissionPhase::Cruise);
    let proposals = [
        (Subsystem::Power, "shed_non_critical_loads", 97, "bus voltage trending low"),
        (Subsystem::Comms, "switch_to_backup_antenna", 86, "primary antenna SNR degraded"),
        (Subsystem::Comms, "enable_emergency_beacon", 92, "ground contact lost for 40 min"),
    ];
    let mut created = Vec::new();
    for (subsystem, action, confidence, why) in proposals {
        let reasoning = vec![why.to_string()];
        let verdict = governor.with(|g| {
            g.evaluate_autonomous_action(action, subsystem, confidence, &reasoning, &health)
        });
        print_verdict(subsystem, action, confidence, &verdict, json);
        if verdict.can_execute {
            let correlation = format!("sim-{action}");
            let plan = serde_json::json!({ "command": action, "confidence": confidence });
            if let Some(a) = governor.with(|g| {
                g.create_autonomous_action(action, subsystem, confidence, reasoning, plan, correlation)
            }) {
                created.push(a);
            }
        }
    }
    drain(&mut events, json);

    step("T+3s operator overrides the antenna switch", json);
    clock.advance_secs(3);
    if let Some(antenna) = created.iter().find(|a| a.action == "switch_to_backup_antenna") {
        let accepted = governor.process_human_override(
            antenna.id,
            "capcom",
            "antenna realignment scheduled",
            Some("repoint primary antenna"),
        );
        if !accepted && !json {
            println!("  override rejected: action no longer pending");
        }
    }
    drain(&mut events, json);

    step("T+4s landing phase begins", json);
    clock.advance_secs(1);
    governor.update_mission_phase(MissionPhase::Landing);
    drain(&mut events, json);

    step("T+5s micrometeoroid strike: emergency mode", json);
    clock.advance_secs(1);
    governor.activate_emergency_mode("micrometeoroid strike on radiator");
    drain(&mut events, json);

    step("T+20s expiry sweep runs", json);
    clock.advance_secs(15);
    match governor.spawn_configured_sweep(&config.governor) {
        Some(sweep) => {
            tokio::time::sleep(Duration::from_millis(50)).await;
            sweep.abort();
        }
        None => {
            governor.expire_stale_actions();
        }
    }
    drain(&mut events, json);

    step("T+60s emergency cleared, surface operations", json);
    clock.advance_secs(40);
    governor.deactivate_emergency_mode();
    governor.update_mission_phase(MissionPhase::SurfaceOperations);
    drain(&mut events, json);

    let status = governor.get_autonomy_status();
    if json {
        println!("{}", serde_json::to_string(&status)?);
    } else {
        step("final status", json);
        println!("{}", serde_json::to_string_pretty(&status)?);
    }
    Ok(())
}

fn step(title: &str, json: bool) {
    if !json {
        println!("\n\x1b[1m== {title}\x1b[0m");
    }
}

fn print_verdict(subsystem: Subsystem, action: &str, confidence: u8, verdict: &Verdict, json: bool) {
    if json {
        let line = serde_json::json!({
            "kind": "verdict",
            "subsystem": subsystem,
            "action": action,
            "confidence": confidence,
            "verdict": verdict,
        });
        println!("{line}");
        return;
    }
    println!(
        "  verdict {subsystem}/{action} @ {confidence}%: can_execute={} level={} confirm={} boundary_confirm={}",
        verdict.can_execute,
        verdict.autonomy_level,
        verdict.requires_confirmation,
        verdict.boundary_requires_confirmation
    );
}

fn drain(events: &mut broadcast::Receiver<Event>, json: bool) {
    loop {
        match events.try_recv() {
            Ok(event) => print_event(&event, json),
            Err(broadcast::error::TryRecvError::Lagged(n)) => {
                println!("  ... {n} events dropped");
            }
            Err(_) => break,
        }
    }
}

fn print_event(event: &Event, json: bool) {
    if json {
        if let Ok(line) = serde_json::to_string(event) {
            println!("{line}");
        }
        return;
    }
    let line = match event {
        Event::ActionCreated {
            action, subsystem, deadline, ..
        } => format!("created   {subsystem}/{action}, override by {}", deadline.format("%H:%M:%S")),
        Event::ActionOverridden {
            operator_id,
            reason,
            needs_second_operator,
            ..
        } => format!(
            "override  by {operator_id}: {reason}{}",
            if *needs_second_operator { " (second operator required)" } else { "" }
        ),
        Event::ActionExecuted { action_id } => format!("executed  {action_id}"),
        Event::ActionExpired { action_id, .. } => format!("expired   {action_id}"),
        Event::EmergencyModeActivated { reason, overridden } => {
            format!("\x1b[31mEMERGENCY\x1b[0m {reason} ({overridden} actions cancelled)")
        }
        Event::EmergencyModeDeactivated => "emergency mode cleared".to_string(),
        Event::MissionPhaseChanged { from, to } => format!("phase     {from} -> {to}"),
        Event::BoundariesTightened { phase, count } => {
            format!("tightened {count} boundaries for {phase}")
        }
        Event::BoundariesRestored { phase, count } => {
            format!("restored  {count} boundaries entering {phase}")
        }
        Event::BoundaryUpdated { boundary_id, .. } => format!("boundary  {boundary_id} updated"),
        Event::BoundaryRemoved { boundary_id } => format!("boundary  {boundary_id} removed"),
    };
    println!("  {line}");
}
