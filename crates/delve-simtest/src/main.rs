//! Delve Headless Generation Harness
//!
//! Validates the dungeon generator against its structural guarantees across
//! many seeds. Runs entirely in-process without an engine or renderer.
//!
//! Usage:
//!   cargo run -p delve-simtest
//!   cargo run -p delve-simtest -- --verbose --seeds 200
//!   cargo run -p delve-simtest -- --size 31
//!   cargo run -p delve-simtest -- --config path/to/dungeon.json
//!   cargo run -p delve-simtest -- --json > results.json

use delve_logic::config::{validate_config, ConfigError, DungeonConfig};
use delve_logic::decay::DecayPolicy;
use delve_logic::error::GenerationError;
use delve_logic::frontier::PlacementOrder;
use delve_logic::generator::{DungeonGenerator, GeneratorState};
use delve_logic::layout::DungeonLayout;
use delve_logic::persistence::{layout_to_bytes, load_layout};
use delve_logic::room::PrototypeRef;
use delve_logic::service::{NullPlacement, RecordingPlacement};
use delve_logic::validation::{hard_errors, validate_layout};
use log::LevelFilter;
use serde::Serialize;

// ── Reference configuration (same JSON a host would ship) ───────────────
const DEFAULT_DUNGEON_JSON: &str = include_str!("../../../data/default_dungeon.json");

// ── Logging ─────────────────────────────────────────────────────────────

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new().filter_level(level).init();
}

// ── Test harness ────────────────────────────────────────────────────────

struct Options {
    verbose: bool,
    json: bool,
    seeds: u64,
    size: Option<i32>,
    config_path: Option<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Options {
    let mut options = Options {
        verbose: false,
        json: false,
        seeds: 100,
        size: None,
        config_path: None,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" => options.verbose = true,
            "--json" => options.json = true,
            "--seeds" => match args.next().map(|v| (v.parse::<u64>(), v)) {
                Some((Ok(n), _)) => options.seeds = n,
                Some((Err(_), v)) => {
                    eprintln!("ignoring --seeds '{v}': not a count, keeping {}", options.seeds)
                }
                None => eprintln!("--seeds needs a value, keeping {}", options.seeds),
            },
            "--size" => match args.next().map(|v| (v.parse::<i32>(), v)) {
                Some((Ok(n), _)) => options.size = Some(n),
                Some((Err(_), v)) => eprintln!("ignoring --size '{v}': not a number"),
                None => eprintln!("--size needs a value"),
            },
            "--config" => options.config_path = args.next(),
            other => eprintln!("ignoring unknown argument '{other}'"),
        }
    }
    options
}

#[derive(Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let options = parse_args(std::env::args().skip(1));
    init_logging(options.verbose);
    println!("=== Delve Generation Harness ===\n");

    let text = match &options.config_path {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("could not read {path}: {e}");
                std::process::exit(2);
            }
        },
        None => DEFAULT_DUNGEON_JSON.to_string(),
    };

    let mut results = Vec::new();

    // 1. Configuration parsing and validation
    let config = validate_configuration(&text, options.size, &mut results);

    if let Some(config) = config {
        // 2. Seed sweep, both placement orders
        results.extend(validate_seed_sweep(&config, options.seeds, options.verbose));

        // 3. Decay schedule
        results.extend(validate_decay(&config));

        // 4. Placement service agreement
        results.extend(validate_placement_service(&config));

        // 5. Persistence
        results.extend(validate_persistence(&config));
    }

    // 6. Retry ceiling
    results.extend(validate_retry_ceiling());

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || options.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if options.json {
        match serde_json::to_string_pretty(&results) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("could not encode results: {e}"),
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

fn seeded(config: &DungeonConfig, seed: u64) -> DungeonConfig {
    DungeonConfig {
        seed: Some(seed),
        ..config.clone()
    }
}

fn generate(config: DungeonConfig) -> Result<DungeonLayout, GenerationError> {
    DungeonGenerator::new(config)?.generate(&mut NullPlacement)
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn validate_configuration(
    text: &str,
    size: Option<i32>,
    results: &mut Vec<TestResult>,
) -> Option<DungeonConfig> {
    println!("--- Configuration ---");

    let mut config = match DungeonConfig::from_json(text) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "config_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return None;
        }
    };
    if let Some(requested) = size {
        let snapped = config.set_dungeon_size(requested);
        if snapped != requested as u32 {
            log::warn!("Requested size {requested} snapped to {snapped}");
        }
    }
    results.push(TestResult {
        name: "config_parse".into(),
        passed: true,
        detail: format!(
            "{}×{} grid, {} rooms, {} connectors",
            config.dungeon_size,
            config.dungeon_size,
            config.catalog.rooms.len(),
            config.catalog.connectors.len()
        ),
    });

    let errors = validate_config(&config);
    results.push(TestResult {
        name: "config_valid".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            "no validation errors".into()
        } else {
            format!("{:?}", errors)
        },
    });

    // A broken copy must be rejected before any placement
    let mut broken = config.clone();
    broken.dungeon_size += 1;
    broken.decay_steps.reverse();
    let rejected = match DungeonGenerator::new(broken) {
        Err(GenerationError::InvalidConfig(errs)) => errs
            .iter()
            .any(|e| matches!(e, ConfigError::EvenDungeonSize(_))),
        _ => false,
    };
    results.push(TestResult {
        name: "config_rejects_broken".into(),
        passed: rejected,
        detail: "even size + reversed decay steps → InvalidConfig".into(),
    });

    errors.is_empty().then_some(config)
}

// ── 2. Seed sweep ───────────────────────────────────────────────────────

#[derive(Default)]
struct SweepStats {
    successes: u64,
    invalid: u64,
    total_rooms: usize,
    total_attempts: u32,
    deepest: u32,
}

fn sweep(config: &DungeonConfig, seeds: u64, verbose: bool) -> (SweepStats, Vec<String>) {
    let mut stats = SweepStats::default();
    let mut failures = Vec::new();

    for seed in 0..seeds {
        match generate(seeded(config, seed)) {
            Ok(layout) => {
                stats.successes += 1;
                stats.total_rooms += layout.rooms.len();
                stats.total_attempts += layout.attempts;
                stats.deepest = stats.deepest.max(layout.max_distance());

                let errors = validate_layout(&layout, config.chain_length);
                let hard = hard_errors(&errors);
                if !hard.is_empty() {
                    stats.invalid += 1;
                    failures.push(format!("seed {seed}: {}", hard[0].message));
                }
                if verbose && seed == 0 {
                    println!("seed 0 ({:?}):\n{}", config.placement_order, layout);
                }
            }
            Err(e) => failures.push(format!("seed {seed}: {e}")),
        }
    }
    (stats, failures)
}

fn validate_seed_sweep(config: &DungeonConfig, seeds: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Seed Sweep ---");
    let mut results = Vec::new();

    for order in [PlacementOrder::Queue, PlacementOrder::Stack] {
        let config = DungeonConfig {
            placement_order: order,
            ..config.clone()
        };
        let (stats, failures) = sweep(&config, seeds, verbose);
        let label = format!("{order:?}").to_lowercase();

        results.push(TestResult {
            name: format!("sweep_{label}_generates"),
            passed: stats.successes == seeds,
            detail: if failures.is_empty() {
                format!("{}/{} seeds generated", stats.successes, seeds)
            } else {
                failures.join("; ")
            },
        });

        let avg_rooms = stats.total_rooms as f64 / stats.successes.max(1) as f64;
        let avg_attempts = stats.total_attempts as f64 / stats.successes.max(1) as f64;
        results.push(TestResult {
            name: format!("sweep_{label}_valid"),
            passed: stats.invalid == 0,
            detail: format!(
                "avg {:.1} instances, avg {:.2} attempts, deepest chain {}",
                avg_rooms, avg_attempts, stats.deepest
            ),
        });
    }

    results
}

// ── 3. Decay schedule ───────────────────────────────────────────────────

fn validate_decay(config: &DungeonConfig) -> Vec<TestResult> {
    println!("--- Decay Schedule ---");
    let mut results = Vec::new();
    let policy = DecayPolicy::new(config.decay_steps.clone());

    // Each step's range applies strictly below its decay_at
    let mut previous = 0;
    let mut consistent = true;
    for step in policy.steps() {
        for placed in [previous, step.decay_at.saturating_sub(1)] {
            if policy.select_range(placed) != (step.lower_index, step.upper_index) {
                consistent = false;
            }
        }
        previous = step.decay_at;
    }
    results.push(TestResult {
        name: "decay_steps_apply".into(),
        passed: consistent,
        detail: format!("{} steps", policy.steps().len()),
    });

    let last = policy.steps().last().map(|s| (s.lower_index, s.upper_index));
    results.push(TestResult {
        name: "decay_fallback_last_step".into(),
        passed: last == Some(policy.select_range(u32::MAX)),
        detail: "counts past every decay_at keep the final range".into(),
    });

    // Sampled rooms never leave their step's range
    let mut in_range = true;
    for seed in 0..20 {
        let Ok(layout) = generate(seeded(config, seed)) else {
            continue;
        };
        for room in &layout.rooms {
            if let PrototypeRef::Room(index) = room.prototype {
                let placed_before = room.id - 1;
                let (lower, upper) = policy.select_range(placed_before);
                if index < lower || index > upper {
                    in_range = false;
                }
            }
        }
    }
    results.push(TestResult {
        name: "decay_samples_in_range".into(),
        passed: in_range,
        detail: "room indices respect the active step over 20 seeds".into(),
    });

    results
}

// ── 4. Placement service ────────────────────────────────────────────────

fn validate_placement_service(config: &DungeonConfig) -> Vec<TestResult> {
    println!("--- Placement Service ---");
    let mut results = Vec::new();
    let mut scene = RecordingPlacement::new();

    let layout = DungeonGenerator::new(seeded(config, 7)).and_then(|mut g| g.generate(&mut scene));
    let Ok(layout) = layout else {
        results.push(TestResult {
            name: "service_generation".into(),
            passed: false,
            detail: "seed 7 failed to generate".into(),
        });
        return results;
    };

    let matches = scene.live.iter().all(|record| {
        layout.get(record.id).is_some_and(|room| {
            room.position == record.position && (room.yaw - record.yaw).abs() < 0.01
        })
    });
    results.push(TestResult {
        name: "service_scene_matches_layout".into(),
        passed: matches && scene.live.len() == layout.rooms.len() - 1,
        detail: format!(
            "{} live, {} spawned in total, {} teardowns",
            scene.live.len(),
            scene.total_spawned,
            scene.clears
        ),
    });

    results
}

// ── 5. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(config: &DungeonConfig) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();

    let outcome = generate(seeded(config, 3))
        .map_err(|e| e.to_string())
        .and_then(|layout| {
            let bytes = layout_to_bytes(&layout).map_err(|e| e.to_string())?;
            let loaded = load_layout(bytes.as_slice()).map_err(|e| e.to_string())?;
            Ok((layout == loaded, bytes.len()))
        });

    results.push(TestResult {
        name: "persistence_round_trip".into(),
        passed: matches!(outcome, Ok((true, _))),
        detail: match outcome {
            Ok((_, size)) => format!("{size} bytes"),
            Err(e) => e,
        },
    });

    results
}

// ── 6. Retry ceiling ────────────────────────────────────────────────────

fn validate_retry_ceiling() -> Vec<TestResult> {
    println!("--- Retry Ceiling ---");
    let mut results = Vec::new();

    // 3×3 grid can never hold a chain of 20
    let config = DungeonConfig {
        dungeon_size: 3,
        chain_length: 20,
        retry_limit: 5,
        seed: Some(1),
        ..DungeonConfig::default()
    };
    let mut scene = RecordingPlacement::new();
    let Ok(mut generator) = DungeonGenerator::new(config) else {
        results.push(TestResult {
            name: "retry_ceiling".into(),
            passed: false,
            detail: "3×3 configuration rejected".into(),
        });
        return results;
    };
    let outcome = generator.generate(&mut scene);

    results.push(TestResult {
        name: "retry_ceiling_fails".into(),
        passed: matches!(outcome, Err(GenerationError::RetriesExhausted { attempts: 5 }))
            && generator.state() == GeneratorState::Failed,
        detail: "unreachable ending → RetriesExhausted after 5 attempts".into(),
    });
    results.push(TestResult {
        name: "retry_leaves_nothing".into(),
        passed: scene.live.is_empty(),
        detail: format!("{} instances left in scene", scene.live.len()),
    });

    results.push(TestResult {
        name: "retry_clears_each_attempt".into(),
        passed: scene.clears == 1 + 5 && scene.total_spawned > 0,
        detail: format!(
            "{} clears, {} instances spawned across attempts",
            scene.clears, scene.total_spawned
        ),
    });

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Options {
        parse_args(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn flags_are_read() {
        let options = parse(&["--verbose", "--seeds", "12", "--config", "d.json", "--json"]);
        assert!(options.verbose);
        assert!(options.json);
        assert_eq!(options.seeds, 12);
        assert_eq!(options.config_path.as_deref(), Some("d.json"));
        assert_eq!(options.size, None);
    }

    #[test]
    fn size_override_is_snapped() {
        let options = parse(&["--size", "20"]);
        assert_eq!(options.size, Some(20));

        let mut results = Vec::new();
        let config = validate_configuration(DEFAULT_DUNGEON_JSON, options.size, &mut results)
            .expect("embedded config is valid");
        assert_eq!(config.dungeon_size, 19);
        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn bad_seed_count_keeps_default() {
        assert_eq!(parse(&["--seeds", "many"]).seeds, 100);
        assert_eq!(parse(&["--seeds", "-3"]).seeds, 100);
        assert_eq!(parse(&["--seeds"]).seeds, 100);
    }

    #[test]
    fn bad_seed_count_does_not_swallow_next_flag() {
        // The malformed value is consumed, later flags still apply
        let options = parse(&["--seeds", "x", "--verbose"]);
        assert_eq!(options.seeds, 100);
        assert!(options.verbose);
    }
}
