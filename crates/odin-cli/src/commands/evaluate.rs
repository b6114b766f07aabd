use odin_autonomy::{HealthStatus, SystemHealthSummary};
use odin_config::OdinConfig;
use odin_core::{MissionPhase, Subsystem};

use super::build_governor;

pub(super) struct EvaluateArgs {
    pub subsystem: Subsystem,
    pub action: String,
    pub confidence: u8,
    pub phase: Option<MissionPhase>,
    pub emergency: bool,
    pub reasons: Vec<String>,
    pub health: HealthStatus,
    pub json: bool,
}

pub(super) fn cmd_evaluate(config: &OdinConfig, args: EvaluateArgs) -> odin_core::Result<()> {
    let mut governor = build_governor(config, args.phase)?;
    if args.emergency {
        governor.activate_emergency_mode("requested on the command line");
    }

    let health = SystemHealthSummary::nominal().with_subsystem(args.subsystem, args.health);
    let verdict = governor.evaluate_autonomous_action(
        &args.action,
        args.subsystem,
        args.confidence,
        &args.reasons,
        &health,
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
        return Ok(());
    }

    let headline = if !verdict.can_execute {
        "\x1b[31mMANUAL CONTROL REQUIRED\x1b[0m"
    } else if verdict.requires_confirmation || verdict.boundary_requires_confirmation {
        "\x1b[33mEXECUTE AFTER CONFIRMATION\x1b[0m"
    } else {
        "\x1b[32mAUTONOMOUS EXECUTION\x1b[0m"
    };

    println!(
        "{}/{} at {}% ({} phase): {headline}",
        args.subsystem,
        args.action,
        args.confidence,
        governor.current_phase()
    );
    println!("  autonomy level     {}", verdict.autonomy_level);
    println!("  confidence tier    {}", verdict.tier);
    if let Some(ref id) = verdict.boundary_id {
        println!("  boundary           {id}");
    }
    if let Some(secs) = verdict.time_to_execution_secs {
        println!("  executes in        {secs}s");
    }
    if let Some(denial) = verdict.denial {
        println!("  denied because     {denial}");
    }
    println!("  reasoning:");
    for line in &verdict.reasoning {
        println!("    - {line}");
    }
    Ok(())
}
