use crate::config::AutopilotConfig;
use crate::runner::{run, write_trace, RunMetrics};
use crate::util::seed_to_hex;
use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    pub configs: Vec<AutopilotConfig>,
    pub seeds: Vec<u32>,
    pub max_frames: u32,
    pub out_dir: PathBuf,
    pub save_top: usize,
    pub jobs: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRecord {
    #[serde(flatten)]
    pub metrics: RunMetrics,
    pub seed_hex: String,
    pub survived: bool,
    pub wall_ms: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConfigAggregate {
    pub config_id: String,
    pub horizon: usize,
    pub runs: usize,
    pub avg_frames: f64,
    pub min_frames: u32,
    pub survival_rate: f64,
    pub total_collisions: u32,
    pub avg_decisions: f64,
    pub avg_nodes: f64,
    pub avg_decision_us: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavedTraceRecord {
    pub rank: usize,
    pub config_id: String,
    pub seed: u32,
    pub seed_hex: String,
    pub frames: u32,
    pub lives_lost: u32,
    pub path: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub generated_unix_s: u64,
    pub max_frames: u32,
    pub jobs: Option<usize>,
    pub configs: Vec<String>,
    pub seeds: Vec<u32>,
    pub run_count: usize,
    pub rankings: Vec<ConfigAggregate>,
    pub runs: Vec<RunRecord>,
    pub saved_traces: Vec<SavedTraceRecord>,
}

struct TimedRun {
    /// Position in `BenchmarkConfig::configs`; ids need not be unique.
    config_index: usize,
    record: RunRecord,
    horizon: usize,
    keys: Vec<u8>,
}

pub fn run_benchmark(config: BenchmarkConfig) -> Result<BenchmarkReport> {
    if config.seeds.is_empty() {
        return Err(anyhow!("benchmark requires at least one seed"));
    }
    if config.configs.is_empty() {
        return Err(anyhow!("benchmark requires at least one autopilot config"));
    }
    if config.jobs == Some(0) {
        return Err(anyhow!("benchmark --jobs must be >= 1 when provided"));
    }
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed creating {}", config.out_dir.display()))?;

    let work: Vec<(usize, &AutopilotConfig, u32)> = config
        .configs
        .iter()
        .enumerate()
        .flat_map(|(index, cfg)| config.seeds.iter().map(move |seed| (index, cfg, *seed)))
        .collect();
    tracing::info!(
        runs = work.len(),
        max_frames = config.max_frames,
        "starting benchmark"
    );

    let run_one = |(index, cfg, seed): &(usize, &AutopilotConfig, u32)| -> Result<TimedRun> {
        let started = Instant::now();
        let artifact = run(cfg, *seed, config.max_frames)
            .with_context(|| format!("benchmark run failed for config={} seed={seed:#x}", cfg.id))?;
        let wall_ms = started.elapsed().as_millis() as u64;
        let survived = !artifact.metrics.game_over && artifact.metrics.lives_lost == 0;
        Ok(TimedRun {
            config_index: *index,
            record: RunRecord {
                seed_hex: seed_to_hex(*seed),
                survived,
                wall_ms,
                metrics: artifact.metrics,
            },
            horizon: cfg.planner.horizon,
            keys: artifact.keys,
        })
    };

    let results: Vec<Result<TimedRun>> = match config.jobs {
        Some(jobs) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .context("failed to build rayon threadpool")?;
            pool.install(|| work.par_iter().map(run_one).collect())
        }
        None => work.par_iter().map(run_one).collect(),
    };
    let runs = results.into_iter().collect::<Result<Vec<_>>>()?;

    let rankings = rank_configs(&config.configs, &runs);
    let saved_traces = if config.save_top > 0 {
        save_top_traces(&config.out_dir, &runs, config.save_top)?
    } else {
        Vec::new()
    };

    let mut records: Vec<RunRecord> = runs.into_iter().map(|run| run.record).collect();
    records.sort_by(|a, b| {
        b.metrics
            .frame_count
            .cmp(&a.metrics.frame_count)
            .then_with(|| a.metrics.lives_lost.cmp(&b.metrics.lives_lost))
            .then_with(|| a.metrics.seed.cmp(&b.metrics.seed))
    });
    write_runs_csv(&config.out_dir.join("runs.csv"), &records)?;

    let report = BenchmarkReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        max_frames: config.max_frames,
        jobs: config.jobs,
        configs: config.configs.iter().map(|c| c.id.clone()).collect(),
        seeds: config.seeds,
        run_count: records.len(),
        rankings,
        runs: records,
        saved_traces,
    };

    let report_path = config.out_dir.join("summary.json");
    fs::write(
        &report_path,
        serde_json::to_vec_pretty(&report).context("failed to serialize summary json")?,
    )
    .with_context(|| format!("failed writing {}", report_path.display()))?;
    tracing::info!(path = %report_path.display(), "benchmark summary written");

    Ok(report)
}

fn rank_configs(configs: &[AutopilotConfig], runs: &[TimedRun]) -> Vec<ConfigAggregate> {
    let mut rankings: Vec<ConfigAggregate> = configs
        .iter()
        .enumerate()
        .filter_map(|(index, cfg)| {
            let mine: Vec<&TimedRun> = runs
                .iter()
                .filter(|run| run.config_index == index)
                .collect();
            if mine.is_empty() {
                return None;
            }
            let n = mine.len() as f64;
            let sum = |f: fn(&TimedRun) -> f64| mine.iter().map(|run| f(run)).sum::<f64>();
            let decisions = sum(|run| run.record.metrics.decisions as f64);
            let wall_us = sum(|run| run.record.wall_ms as f64 * 1000.0);
            Some(ConfigAggregate {
                config_id: cfg.id.clone(),
                horizon: mine[0].horizon,
                runs: mine.len(),
                avg_frames: sum(|run| run.record.metrics.frame_count as f64) / n,
                min_frames: mine
                    .iter()
                    .map(|run| run.record.metrics.frame_count)
                    .min()
                    .unwrap_or_default(),
                survival_rate: mine.iter().filter(|run| run.record.survived).count() as f64 / n,
                total_collisions: mine.iter().map(|run| run.record.metrics.lives_lost).sum(),
                avg_decisions: decisions / n,
                avg_nodes: sum(|run| run.record.metrics.avg_nodes) / n,
                avg_decision_us: if decisions > 0.0 { wall_us / decisions } else { 0.0 },
            })
        })
        .collect();

    rankings.sort_by(|a, b| {
        b.survival_rate
            .total_cmp(&a.survival_rate)
            .then_with(|| b.avg_frames.total_cmp(&a.avg_frames))
            .then_with(|| a.total_collisions.cmp(&b.total_collisions))
    });
    rankings
}

fn save_top_traces(out_dir: &Path, runs: &[TimedRun], count: usize) -> Result<Vec<SavedTraceRecord>> {
    let mut order: Vec<&TimedRun> = runs.iter().collect();
    order.sort_by(|a, b| {
        let (a, b) = (&a.record.metrics, &b.record.metrics);
        b.frame_count
            .cmp(&a.frame_count)
            .then_with(|| a.lives_lost.cmp(&b.lives_lost))
            .then_with(|| a.seed.cmp(&b.seed))
    });

    let save_dir = out_dir.join("top-survival");
    let mut saved = Vec::new();
    for (idx, run) in order.into_iter().take(count).enumerate() {
        let rank = idx + 1;
        let m = &run.record.metrics;
        let base = format!(
            "rank{rank:02}-{}-seed{:08x}-frames{}",
            m.config_id, m.seed, m.frame_count
        );
        let trace_path = save_dir.join(format!("{base}.keys"));
        write_trace(&trace_path, &run.keys)?;

        let meta_path = save_dir.join(format!("{base}.json"));
        fs::write(
            &meta_path,
            serde_json::to_vec_pretty(&run.record).context("failed to serialize trace metadata")?,
        )
        .with_context(|| format!("failed writing {}", meta_path.display()))?;

        saved.push(SavedTraceRecord {
            rank,
            config_id: m.config_id.clone(),
            seed: m.seed,
            seed_hex: run.record.seed_hex.clone(),
            frames: m.frame_count,
            lives_lost: m.lives_lost,
            path: trace_path.to_string_lossy().into_owned(),
        });
    }
    Ok(saved)
}

fn write_runs_csv(path: &Path, rows: &[RunRecord]) -> Result<()> {
    let mut csv = String::from(
        "config_id,seed_hex,frame_count,lives_lost,game_over,survived,decisions,thrust_frames,left_frames,right_frames,min_clearance,avg_nodes,wall_ms\n",
    );
    for row in rows {
        let m = &row.metrics;
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{:.3},{:.1},{}\n",
            m.config_id,
            row.seed_hex,
            m.frame_count,
            m.lives_lost,
            m.game_over,
            row.survived,
            m.decisions,
            m.thrust_frames,
            m.left_frames,
            m.right_frames,
            m.min_clearance,
            m.avg_nodes,
            row.wall_ms
        ));
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}
