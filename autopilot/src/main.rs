use anyhow::{anyhow, Context, Result};
use asteroid_autopilot::benchmark::{run_benchmark, BenchmarkConfig};
use asteroid_autopilot::client::{connect_and_run, spawn_quit_listener};
use asteroid_autopilot::config::{load_config, AutopilotConfig};
use asteroid_autopilot::protocol::{action_key, WorldSnapshot};
use asteroid_autopilot::runner::{run, write_trace};
use asteroid_autopilot::util::{parse_seed, resolve_seeds, seed_to_hex};
use asteroid_planner_core::Planner;
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "asteroid-autopilot")]
#[command(about = "Look-ahead autopilot for the Asteroids game: live client, headless runs and benchmarks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct ConfigArgs {
    /// Autopilot config JSON (takes precedence over --preset)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Named preset: default, quick, deep, open-field
    #[arg(long)]
    preset: Option<String>,
}

impl ConfigArgs {
    fn load(&self) -> Result<AutopilotConfig> {
        load_config(self.config.as_deref(), self.preset.as_deref())
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect to a running game and fly the ship until it disconnects or `q` is typed
    Connect {
        #[command(flatten)]
        cfg: ConfigArgs,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Play one headless game and print its metrics
    Run {
        #[command(flatten)]
        cfg: ConfigArgs,
        #[arg(long, default_value = "0xDEADBEEF")]
        seed: String,
        #[arg(long, default_value_t = 3_600)]
        max_frames: u32,
        /// Write the per-frame key trace here
        #[arg(long)]
        trace: Option<PathBuf>,
    },
    /// Run many seeds per preset in parallel and rank the presets
    Bench {
        /// Comma-separated presets to compare
        #[arg(long, default_value = "default")]
        presets: String,
        /// Extra config files to include
        #[arg(long)]
        config: Vec<PathBuf>,
        #[arg(long)]
        seeds: Option<String>,
        #[arg(long)]
        seed_start: Option<String>,
        #[arg(long, default_value_t = 12)]
        seed_count: u32,
        #[arg(long, default_value_t = 3_600)]
        max_frames: u32,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long, default_value_t = 3)]
        save_top: usize,
        #[arg(long)]
        jobs: Option<usize>,
    },
    /// Plan once for a snapshot line read from a file (or stdin) and print the report
    Plan {
        #[command(flatten)]
        cfg: ConfigArgs,
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Print the resolved config as JSON
    ShowConfig {
        #[command(flatten)]
        cfg: ConfigArgs,
    },
}

/// `RUST_LOG` directives when present and valid, otherwise `info`.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Connect { cfg, host, port } => {
            let mut config = cfg.load()?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            let stop = Arc::new(AtomicBool::new(false));
            let _listener = spawn_quit_listener(stop.clone());
            let summary = connect_and_run(&config, &stop)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Run {
            cfg,
            seed,
            max_frames,
            trace,
        } => {
            let config = cfg.load()?;
            let seed = parse_seed(&seed)?;
            let artifact = run(&config, seed, max_frames)?;
            if let Some(path) = &trace {
                write_trace(path, &artifact.keys)?;
            }

            let m = &artifact.metrics;
            println!("config={}", m.config_id);
            println!("seed={}", seed_to_hex(m.seed));
            println!("frames={}", m.frame_count);
            println!("lives_lost={}", m.lives_lost);
            println!("game_over={}", m.game_over);
            println!("decisions={}", m.decisions);
            println!("thrust/left/right={}/{}/{}", m.thrust_frames, m.left_frames, m.right_frames);
            println!("min_clearance={:.2}", m.min_clearance);
            if let Some(path) = trace {
                println!("trace={}", path.display());
            }
        }
        Commands::Bench {
            presets,
            config,
            seeds,
            seed_start,
            seed_count,
            max_frames,
            out_dir,
            save_top,
            jobs,
        } => {
            let mut configs = Vec::new();
            for name in presets.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                configs.push(load_config(None, Some(name))?);
            }
            for path in &config {
                configs.push(load_config(Some(path), None)?);
            }
            if configs.is_empty() {
                return Err(anyhow!("no presets or configs to benchmark"));
            }
            let seeds = resolve_seeds(seeds.as_deref(), seed_start.as_deref(), seed_count)?;
            let out_dir = out_dir.unwrap_or_else(|| {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs();
                PathBuf::from(format!("benchmarks/bench-{now}"))
            });

            let report = run_benchmark(BenchmarkConfig {
                configs,
                seeds,
                max_frames,
                out_dir: out_dir.clone(),
                save_top,
                jobs,
            })?;

            println!("runs={}", report.run_count);
            for (idx, row) in report.rankings.iter().enumerate() {
                println!(
                    "{:>2}. {:20} survival={:.2} avg_frames={:.1} min_frames={} collisions={} avg_nodes={:.0}",
                    idx + 1,
                    row.config_id,
                    row.survival_rate,
                    row.avg_frames,
                    row.min_frames,
                    row.total_collisions,
                    row.avg_nodes
                );
            }
            println!("out_dir={}", out_dir.display());
        }
        Commands::Plan { cfg, input } => {
            let config = cfg.load()?;
            let text = match &input {
                Some(path) => fs::read_to_string(path)
                    .with_context(|| format!("failed reading {}", path.display()))?,
                None => {
                    let mut text = String::new();
                    io::stdin()
                        .read_to_string(&mut text)
                        .context("failed reading stdin")?;
                    text
                }
            };
            let line = text
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .ok_or_else(|| anyhow!("no snapshot in input"))?;
            let snapshot = WorldSnapshot::from_json(line)?;

            let mut planner = Planner::new(config.planner)?;
            let physics = config.planner.physics;
            let report =
                planner.plan_snapshot(&snapshot.ship(&physics), &snapshot.asteroids(&physics));
            let out = serde_json::json!({
                "key": (action_key(report.action) as char).to_string(),
                "report": report,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::ShowConfig { cfg } => {
            let config = cfg.load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn log_filter_honours_rust_log_level() {
        assert_eq!(log_filter(Some("trace")).max_level_hint(), Some(LevelFilter::TRACE));
        assert_eq!(
            log_filter(Some("asteroid_planner_core=trace")).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            log_filter(Some("core=notalevel")).max_level_hint(),
            Some(LevelFilter::INFO)
        );
    }
}
