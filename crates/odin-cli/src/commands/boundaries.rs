use odin_config::OdinConfig;
use odin_core::MissionPhase;

use super::build_governor;

pub(super) fn cmd_boundaries(
    config: &OdinConfig,
    phase: Option<MissionPhase>,
    json: bool,
) -> odin_core::Result<()> {
    let governor = build_governor(config, phase)?;
    let rows = governor.boundaries();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let current = governor.current_phase();
    println!(
        "\x1b[1mDecision Boundaries\x1b[0m ({} rows, phase {current})",
        rows.len()
    );
    println!("{}", "-".repeat(96));
    println!(
        "{:<30} {:<36} {:<9} {:>5} {:>6}  {:<8} {}",
        "ID", "SUBSYSTEM/ACTION", "AUTONOMY", "THR", "WINDOW", "SAFETY", "FLAGS"
    );

    for b in rows {
        let mut flags = Vec::new();
        if b.requires_human_confirmation {
            flags.push("confirm".to_string());
        }
        if b.is_restricted_in(current) {
            flags.push("\x1b[33mrestricted\x1b[0m".to_string());
        }
        let color = match b.safety_classification {
            odin_core::SafetyClassification::Critical => "\x1b[31m",
            odin_core::SafetyClassification::Warning => "\x1b[33m",
            odin_core::SafetyClassification::Caution => "\x1b[36m",
            odin_core::SafetyClassification::Routine => "\x1b[37m",
        };
        println!(
            "{:<30} {:<36} {:<9} {:>4}% {:>5}s  {color}{:<8}\x1b[0m {}",
            b.id,
            format!("{}/{}", b.subsystem, b.action),
            b.autonomy_level.as_str(),
            b.confidence_threshold,
            b.time_constraint_secs,
            b.safety_classification.as_str(),
            flags.join(",")
        );
    }
    Ok(())
}
