//! Gameplay balance simulator CLI.
//!
//! Usage:
//!   cargo run --bin simulate -- [OPTIONS]
//!
//! Examples:
//!   cargo run --bin simulate                        # Every mode and level
//!   cargo run --bin simulate -- -n 50 --mode hard   # 50 hard games per level
//!   cargo run --bin simulate -- --seed 42           # Reproducible run

use snake_arcade::game::{GameMode, Level};
use snake_arcade::simulator::{run_simulation, SimConfig};
use std::env;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let config = parse_args(&args);

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║              SNAKE ARCADE SIMULATOR                           ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Configuration:");
    println!("  Runs:           {} per mode/level", config.num_runs);
    println!("  Grid:           {}x{}", config.grid_width, config.grid_height);
    println!("  Max Ticks:      {}", config.max_ticks_per_run);
    println!(
        "  Modes:          {}",
        config.modes.iter().map(|m| m.name()).collect::<Vec<_>>().join(", ")
    );
    println!(
        "  Levels:         {}",
        config.levels.iter().map(|l| l.name()).collect::<Vec<_>>().join(", ")
    );
    if let Some(seed) = config.seed {
        println!("  Seed:           {}", seed);
    }
    println!();
    println!("Running simulation...");
    println!();

    let report = run_simulation(&config);

    println!("{}", report.to_text());

    if args.iter().any(|a| a == "--json") {
        let json = report.to_json();
        let filename = format!(
            "sim_report_{}.json",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        );
        match std::fs::write(&filename, json) {
            Ok(()) => println!("JSON report saved to: {}", filename),
            Err(e) => eprintln!("Failed to write JSON report: {}", e),
        }
    }
}

fn parse_args(args: &[String]) -> SimConfig {
    let mut config = SimConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-n" | "--runs" => {
                if i + 1 < args.len() {
                    config.num_runs = args[i + 1].parse().unwrap_or(config.num_runs);
                    i += 1;
                }
            }
            "-s" | "--seed" => {
                if i + 1 < args.len() {
                    config.seed = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "-t" | "--ticks" => {
                if i + 1 < args.len() {
                    config.max_ticks_per_run =
                        args[i + 1].parse().unwrap_or(config.max_ticks_per_run);
                    i += 1;
                }
            }
            "-m" | "--mode" => {
                if let Some(mode) = args.get(i + 1).and_then(|s| GameMode::parse(s)) {
                    config.modes = vec![mode];
                    i += 1;
                }
            }
            "-l" | "--level" => {
                if let Some(level) = args
                    .get(i + 1)
                    .and_then(|s| s.parse().ok())
                    .and_then(Level::from_number)
                {
                    config.levels = vec![level];
                    i += 1;
                }
            }
            "--grid" => {
                if let Some((w, h)) = args.get(i + 1).and_then(|s| s.split_once('x')) {
                    if let (Ok(w), Ok(h)) = (w.parse(), h.parse()) {
                        config.grid_width = w;
                        config.grid_height = h;
                    }
                    i += 1;
                }
            }
            "-v" | "--verbose" => {
                config.verbosity = 2;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "--quick" => {
                config = SimConfig::quick();
            }
            _ => {}
        }
        i += 1;
    }

    config
}

fn print_help() {
    println!("Snake Arcade Simulator");
    println!();
    println!("USAGE:");
    println!("    cargo run --bin simulate -- [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -n, --runs <N>      Games per mode/level (default: 200)");
    println!("    -s, --seed <S>      Random seed for reproducibility");
    println!("    -t, --ticks <T>     Max ticks per game (default: 20,000)");
    println!("    -m, --mode <M>      Only this mode (easy, normal, hard)");
    println!("    -l, --level <L>     Only this level (1, 2, 3)");
    println!("    --grid <WxH>        Board size (default: 20x30)");
    println!("    -v, --verbose       Print every game");
    println!("    --json              Save JSON report");
    println!("    --quick             Quick test (20 games, 5,000 ticks)");
    println!("    -h, --help          Show this help");
}
