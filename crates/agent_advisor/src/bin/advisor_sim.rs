use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use agent_advisor::{
    AdvisorConfig, AdvisorRuntime, AgentEvent, AgentReading, CellPos, DamageCause, Dimension,
    GameTick, InMemoryEnvironment, ItemStack, MessageSink, Vec3,
};
use tracing_subscriber::EnvFilter;

const AGENT_ID: &str = "scout";
const RAIDER_ID: &str = "zombie-1";

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    ticks: u64,
    config_path: Option<PathBuf>,
    realtime: bool,
    json_report: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            ticks: 1200,
            config_path: None,
            realtime: false,
            json_report: false,
        }
    }
}

/// Prints every advisor message to stdout.
struct StdoutSink;

impl MessageSink for StdoutSink {
    fn send_message(&mut self, agent_id: &str, text: &str) {
        println!("[{agent_id}] {text}");
    }

    fn log_diagnostic(&mut self, text: &str) {
        println!("[diagnostic] {text}");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let options = match parse_options(args.iter().skip(1).map(|arg| arg.as_str())) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}");
            print_help();
            process::exit(1);
        }
    };

    let config = match options.config_path.as_deref() {
        Some(path) => AdvisorConfig::from_config_file(path),
        None => AdvisorConfig::from_default_sources(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load advisor config: {err}");
            process::exit(1);
        }
    };

    let stop = Arc::new(AtomicBool::new(false));
    if options.realtime {
        let stop = Arc::clone(&stop);
        if let Err(err) = ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst)) {
            eprintln!("failed to install ctrl-c handler: {err}");
            process::exit(1);
        }
    }

    let tick_duration_ms = config.tick_duration_ms;
    let mut env = scripted_world();
    let mut sink = StdoutSink;
    let mut runtime = AdvisorRuntime::new(config, 0);
    runtime.handle_event(
        &AgentEvent::AgentJoined {
            agent_id: AGENT_ID.to_string(),
            initial_spawn: true,
        },
        &mut sink,
    );

    let mut ran = 0u64;
    for tick in 0..options.ticks {
        if stop.load(Ordering::SeqCst) {
            break;
        }
        for event in advance_script(&mut env, tick) {
            runtime.handle_event(&event, &mut sink);
        }
        runtime.step(&env, &mut sink, tick, tick.saturating_mul(tick_duration_ms));
        ran += 1;
        if options.realtime {
            thread::sleep(Duration::from_millis(tick_duration_ms));
        }
    }

    println!("ticks: {ran}");
    println!("tracked_agents: {}", runtime.context().tracked_agents());
    let report = runtime.context().performance_report();
    if options.json_report {
        match report.to_json() {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("failed to encode report: {err}");
                process::exit(1);
            }
        }
    } else {
        for line in report.lines() {
            println!("{line}");
        }
    }
}

/// One agent with some wood and an iron ingot, a lava pool nearby, a diamond
/// vein under the walking route and a zombie closing in.
fn scripted_world() -> InMemoryEnvironment {
    let mut env = InMemoryEnvironment::new();
    let mut reading = AgentReading::new(AGENT_ID, Vec3::new(0.5, 64.0, 0.5));
    if let Some(inventory) = reading.inventory.as_mut() {
        inventory.push(ItemStack::new("minecraft:oak_log"));
        inventory.push(ItemStack::new("minecraft:iron_ingot"));
    }
    env.put_agent(reading);
    env.set_terrain(Dimension::Overworld, CellPos::new(1, 63, 1), "minecraft:lava");
    env.set_terrain(Dimension::Overworld, CellPos::new(40, 60, 0), "minecraft:diamond_ore");
    env.set_region(Dimension::Overworld, Vec3::new(80.0, 64.0, 0.0), "minecraft:desert");
    env.spawn_actor(
        Dimension::Overworld,
        RAIDER_ID,
        "minecraft:zombie",
        Vec3::new(-14.5, 64.0, 0.5),
    );
    env
}

/// Moves the world one tick forward and returns the host events it raised.
fn advance_script(env: &mut InMemoryEnvironment, tick: GameTick) -> Vec<AgentEvent> {
    let mut events = Vec::new();
    let walking = (200..600).contains(&tick);
    if let Some(agent) = env.agent_mut(AGENT_ID) {
        if walking {
            agent.position.x += 0.2;
        }
        if tick == 700 {
            agent.health = Some(12.0);
            events.push(AgentEvent::AgentDamaged {
                agent_id: AGENT_ID.to_string(),
                cause: DamageCause::Fall,
                amount: 8.0,
            });
        }
    }
    if tick < 150 {
        let x = -14.5 + tick as f64 * 0.06;
        env.move_actor(RAIDER_ID, Vec3::new(x, 64.0, 0.5));
    }
    if tick == 150 {
        env.despawn_actor(RAIDER_ID);
        events.push(AgentEvent::ActorKilled {
            killer: AGENT_ID.to_string(),
            victim_kind: "minecraft:zombie".to_string(),
        });
    }
    if tick == 1000 {
        env.set_time_of_day(14_000);
    }
    events
}

fn parse_options<'a>(args: impl Iterator<Item = &'a str>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut iter = args.peekable();
    while let Some(arg) = iter.next() {
        match arg {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--ticks" => {
                let raw = iter
                    .next()
                    .ok_or_else(|| "--ticks requires a positive integer".to_string())?;
                options.ticks = raw
                    .parse::<u64>()
                    .ok()
                    .filter(|value| *value > 0)
                    .ok_or_else(|| "--ticks requires a positive integer".to_string())?;
            }
            "--config" => {
                let path = iter
                    .next()
                    .ok_or_else(|| "--config requires a file path".to_string())?;
                options.config_path = Some(PathBuf::from(path));
            }
            "--realtime" => options.realtime = true,
            "--json-report" => options.json_report = true,
            _ => return Err(format!("unexpected argument: {arg}")),
        }
    }
    Ok(options)
}

fn print_help() {
    println!("Usage: advisor_sim [--ticks <n>] [--config <path>] [--realtime] [--json-report]");
    println!("Options:");
    println!("  --ticks <n>        Host ticks to simulate (default: 1200)");
    println!("  --config <path>    Advisor TOML config (default: ./advisor.toml if present)");
    println!("  --realtime         Sleep one tick duration per tick; ctrl-c stops early");
    println!("  --json-report      Print the final performance report as JSON");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_options_defaults() {
        let options = parse_options([].into_iter()).expect("defaults");
        assert_eq!(options, CliOptions::default());
    }

    #[test]
    fn parse_options_accepts_all_flags() {
        let options = parse_options(
            ["--ticks", "40", "--config", "custom.toml", "--realtime", "--json-report"].into_iter(),
        )
        .expect("flags");
        assert_eq!(options.ticks, 40);
        assert_eq!(options.config_path, Some(PathBuf::from("custom.toml")));
        assert!(options.realtime);
        assert!(options.json_report);
    }

    #[test]
    fn parse_options_rejects_zero_ticks_and_unknown_flags() {
        assert!(parse_options(["--ticks", "0"].into_iter()).is_err());
        assert!(parse_options(["--fast"].into_iter()).is_err());
    }

    #[test]
    fn scripted_world_raises_kill_and_fall_events() {
        let mut env = scripted_world();
        let mut kinds = Vec::new();
        for tick in 0..800 {
            for event in advance_script(&mut env, tick) {
                kinds.push(event.kind());
            }
        }
        assert_eq!(kinds, vec!["actor_killed", "agent_damaged"]);
    }
}
