use clap::{Parser, Subcommand};
use expedition_wasm::api::dto::{ExpeditionReport, ExpeditionRequest};
use expedition_wasm::api::runner;
use expedition_wasm::config::game_data;
use expedition_wasm::report;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "expedition_cli")]
#[command(about = "CLI tools for expedition risk analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full calculation for an expedition file
    Calculate {
        /// Path to the expedition JSON file
        expedition: PathBuf,
        /// Output file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the full JSON report instead of the summary
        #[arg(long)]
        json: bool,
    },
    /// Per-sector event table and worst-case attribution
    Breakdown {
        /// Path to the expedition JSON file
        expedition: PathBuf,
    },
    /// Compare two expedition files side-by-side
    Compare {
        /// First expedition file (baseline)
        expedition_a: PathBuf,
        /// Second expedition file (variant)
        expedition_b: PathBuf,
    },
    /// Sensitivity sweep: vary a stat across a range
    Sweep {
        /// Path to the expedition JSON file
        expedition: PathBuf,
        /// Stat to vary: "movement" or "health"
        #[arg(short, long)]
        stat: String,
        /// Range in "start..end" format (e.g., "3..13")
        #[arg(short, long)]
        range: String,
    },
    /// Validate an expedition JSON for common errors
    Validate {
        /// Path to the expedition JSON file
        expedition: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Calculate {
            expedition,
            output,
            json,
        } => run_calculate(&expedition, output.as_deref(), json),
        Commands::Breakdown { expedition } => run_breakdown(&expedition),
        Commands::Compare {
            expedition_a,
            expedition_b,
        } => run_compare(&expedition_a, &expedition_b),
        Commands::Sweep {
            expedition,
            stat,
            range,
        } => run_sweep(&expedition, &stat, &range),
        Commands::Validate { expedition } => run_validate(&expedition),
    }
}

// --- Helper Functions ---

fn load_expedition(path: &PathBuf) -> (ExpeditionRequest, String) {
    let content = fs::read_to_string(path).expect("Failed to read expedition file");
    let data: serde_json::Value = serde_json::from_str(&content).expect("Failed to parse JSON");

    let name = data
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown")
        .to_string();
    let request: ExpeditionRequest =
        serde_json::from_value(data).expect("Failed to parse expedition request");
    (request, name)
}

fn calculate_or_exit(request: &ExpeditionRequest) -> ExpeditionReport {
    match runner::calculate(request) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("[ERROR] {}", err);
            std::process::exit(1);
        }
    }
}

// --- Calculate Subcommand ---

fn run_calculate(path: &PathBuf, output: Option<&std::path::Path>, json: bool) {
    let (request, name) = load_expedition(path);
    let report = calculate_or_exit(&request);

    if json {
        let text = serde_json::to_string_pretty(&report).expect("Failed to serialize report");
        if let Some(path) = output {
            fs::write(path, &text).expect("Failed to write output file");
            println!("Wrote report to {:?}", path);
        } else {
            println!("{}", text);
        }
        return;
    }

    print!("{}", report::render_summary(&name, &report));
    if let Some(path) = output {
        let text = serde_json::to_string_pretty(&report).expect("Failed to serialize report");
        fs::write(path, &text).expect("Failed to write output file");
        println!("\nWrote full report to {:?}", path);
    }
}

// --- Breakdown Subcommand ---

fn run_breakdown(path: &PathBuf) {
    let (request, name) = load_expedition(path);
    let report = calculate_or_exit(&request);

    println!("=== Sector Breakdown: {} ===\n", name);
    for (sector, entry) in &report.sector_breakdown {
        println!(
            "Sector: {} (count {}, expected {:.2})",
            sector, entry.count, entry.expected_count
        );
        let mut events: Vec<_> = entry.events.iter().collect();
        events.sort_by(|a, b| b.1.total_cmp(a.1));
        for (event, probability) in events {
            println!("  {:<24} {:>6.1}%", event.wire_name(), probability * 100.0);
        }
        println!();
    }

    println!("Worst-case damage attribution:");
    for instance in report
        .combat
        .damage_instances
        .worst_case
        .iter()
        .chain(report.event_damage.damage_instances.worst_case.iter())
    {
        for source in &instance.sources {
            if source.zero_damage {
                continue;
            }
            println!(
                "  sector {:>2} ({}) -> {} damage {} (p={:.3})",
                source.sector_index,
                source.sector_type,
                serde_json::to_string(&instance.event_type).unwrap_or_default(),
                instance.damage_per_instance,
                source.probability
            );
        }
    }
}

// --- Compare Subcommand ---

fn run_compare(path_a: &PathBuf, path_b: &PathBuf) {
    println!("=== Expedition Comparison ===\n");

    let (request_a, name_a) = load_expedition(path_a);
    let (request_b, name_b) = load_expedition(path_b);
    let report_a = calculate_or_exit(&request_a);
    let report_b = calculate_or_exit(&request_b);

    println!(
        "{:<18} | {:>12} | {:>12} | {:>10}",
        "Metric", &name_a, &name_b, "Diff"
    );
    println!("-------------------|--------------|--------------|----------");

    let rows = [
        (
            "Avg fight dmg",
            report_a.combat.damage.average,
            report_b.combat.damage.average,
        ),
        (
            "Worst fight dmg",
            report_a.combat.damage.worst_case,
            report_b.combat.damage.worst_case,
        ),
        (
            "Avg event dmg",
            report_a.event_damage.damage.average,
            report_b.event_damage.damage.average,
        ),
        (
            "Avg fruits",
            report_a.resources.fruits.average,
            report_b.resources.fruits.average,
        ),
        (
            "Avg fuel",
            report_a.resources.fuel.average,
            report_b.resources.fuel.average,
        ),
    ];
    for (label, a, b) in rows {
        println!(
            "{:<18} | {:>12.2} | {:>12.2} | {:>+10.2}",
            label,
            a,
            b,
            b - a
        );
    }

    let damage_diff = (report_b.combat.damage.worst_case + report_b.event_damage.damage.worst_case)
        - (report_a.combat.damage.worst_case + report_a.event_damage.damage.worst_case);
    println!();
    if damage_diff < -1.0 {
        println!("{} is safer (worst-case damage {:+.1})", name_b, damage_diff);
    } else if damage_diff > 1.0 {
        println!(
            "{} is riskier (worst-case damage {:+.1})",
            name_b, damage_diff
        );
    } else {
        println!("Both expeditions carry similar risk.");
    }
}

// --- Sweep Subcommand ---

fn run_sweep(path: &PathBuf, stat: &str, range_str: &str) {
    let (request, name) = load_expedition(path);

    let parts: Vec<&str> = range_str.split("..").collect();
    if parts.len() != 2 {
        println!("Error: Invalid range format. Use 'start..end' (e.g., '3..13')");
        return;
    }
    let start: i32 = parts[0].parse().expect("Invalid start value");
    let end: i32 = parts[1].parse().expect("Invalid end value");

    println!("=== Sensitivity Sweep: {} ===", name);
    println!("Stat: {}, Range: {}..{}\n", stat, start, end);
    println!(
        "{:>8} | {:>10} | {:>10} | {:>10}",
        stat, "Worst dmg", "Avg dmg", "Avg fruits"
    );
    println!("---------|------------|------------|----------");

    for value in start..=end {
        let mut modified = request.clone();
        match stat.to_lowercase().as_str() {
            "movement" => modified.movement_capacity = Some(value.max(0) as u32),
            "health" => {
                for player in &mut modified.team {
                    player.max_health = value;
                }
            }
            _ => {
                println!("[WARN] Unknown stat: {}", stat);
                return;
            }
        }

        let report = calculate_or_exit(&modified);
        let worst = report.combat.damage.worst_case + report.event_damage.damage.worst_case;
        let average = report.combat.damage.average + report.event_damage.damage.average;

        let bar_len = (worst / 2.0).max(0.0) as usize;
        let bar: String = "█".repeat(bar_len.min(40));

        println!(
            "{:>8} | {:>10.1} | {:>10.1} | {:>10.2} {}",
            value, worst, average, report.resources.fruits.average, bar
        );
    }
}

// --- Validate Subcommand ---

fn run_validate(path: &PathBuf) {
    println!("=== Validating Expedition ===\n");

    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            println!("[ERROR] Failed to read file: {}", e);
            return;
        }
    };

    let data: serde_json::Value = match serde_json::from_str(&content) {
        Ok(d) => d,
        Err(e) => {
            println!("[ERROR] Invalid JSON: {}", e);
            return;
        }
    };

    let mut errors = 0;
    let mut warnings = 0;

    if data.get("sectors").is_none() {
        println!("[ERROR] Missing 'sectors' array");
        errors += 1;
    }
    if data.get("team").is_none() {
        println!("[WARN] Missing 'team' array (calculation will assume an empty crew)");
        warnings += 1;
    }

    if let Some(sectors) = data.get("sectors").and_then(|s| s.as_array()) {
        for (i, sector) in sectors.iter().enumerate() {
            match sector.as_str() {
                Some(name) => {
                    if name.parse::<expedition_wasm::SectorType>().is_err() {
                        println!("[ERROR] sectors[{}] unknown sector type '{}'", i, name);
                        errors += 1;
                    }
                }
                None => {
                    println!("[ERROR] sectors[{}] is not a string", i);
                    errors += 1;
                }
            }
        }
    }

    if let Some(team) = data.get("team").and_then(|t| t.as_array()) {
        for (i, member) in team.iter().enumerate() {
            if member.get("id").and_then(|v| v.as_u64()).is_none() {
                println!("[ERROR] team[{}] missing numeric 'id'", i);
                errors += 1;
            }
            if let Some(health) = member.get("maxHealth").and_then(|v| v.as_i64()) {
                if health < 0 {
                    println!("[ERROR] team[{}] has negative maxHealth ({})", i, health);
                    errors += 1;
                }
            }
            for slot_field in ["abilities", "items"] {
                if let Some(slots) = member.get(slot_field).and_then(|v| v.as_array()) {
                    for (j, slot) in slots.iter().enumerate() {
                        if !slot.is_string() {
                            println!("[ERROR] team[{}].{}[{}] is not a string", i, slot_field, j);
                            errors += 1;
                        }
                    }
                }
            }
        }
    }

    // Structural checks passed; run the full request validation too.
    if errors == 0 {
        match serde_json::from_value::<ExpeditionRequest>(data) {
            Ok(request) => {
                if let Err(err) =
                    expedition_wasm::validation::validate_request(game_data(), &request)
                {
                    println!("[ERROR] {}", err);
                    errors += 1;
                }
            }
            Err(e) => {
                println!("[ERROR] Failed to parse request: {}", e);
                errors += 1;
            }
        }
    }

    println!();
    if errors == 0 && warnings == 0 {
        println!("[INFO] Expedition is valid. Ready to run.");
    } else {
        println!(
            "[INFO] Validation complete: {} errors, {} warnings",
            errors, warnings
        );
    }
}
