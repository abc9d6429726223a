use crate::config::AutopilotConfig;
use crate::protocol::{action_key, WorldSnapshot};
use crate::sim::World;
use anyhow::{anyhow, Context, Result};
use asteroid_planner_core::{Action, Planner};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunMetrics {
    pub config_id: String,
    pub seed: u32,
    pub max_frames: u32,
    pub frame_count: u32,
    pub lives_lost: u32,
    pub final_lives: u32,
    pub waves: u32,
    pub game_over: bool,
    pub decisions: u32,
    pub thrust_frames: u32,
    pub left_frames: u32,
    pub right_frames: u32,
    /// Smallest root clearance the planner saw over the run.
    pub min_clearance: f64,
    pub avg_nodes: f64,
}

#[derive(Clone, Debug)]
pub struct RunArtifact {
    pub metrics: RunMetrics,
    /// One key byte per frame, as the live client would have sent them.
    pub keys: Vec<u8>,
}

/// Plays one headless game. The planner is consulted every
/// `decision_interval` frames and its action held in between.
pub fn run(config: &AutopilotConfig, seed: u32, max_frames: u32) -> Result<RunArtifact> {
    if max_frames == 0 {
        return Err(anyhow!("max_frames must be > 0"));
    }
    let mut planner = Planner::new(config.planner)
        .with_context(|| format!("invalid planner config in '{}'", config.id))?;
    let physics = config.planner.physics;
    let interval = config.decision_interval.max(1);

    let mut world = World::new(seed, config.lives, physics);
    let mut keys = Vec::with_capacity(max_frames as usize);
    let mut action = Action::Thrust;
    let mut decisions = 0u32;
    let mut total_nodes = 0u64;
    let mut min_clearance = f64::INFINITY;

    while world.frame_count() < max_frames && !world.is_game_over() {
        if world.frame_count() % interval == 0 {
            // Same conversion the live client applies to the game's JSON.
            let snapshot = WorldSnapshot::from_state(world.ship(), world.asteroids());
            let report =
                planner.plan_snapshot(&snapshot.ship(&physics), &snapshot.asteroids(&physics));
            action = report.action;
            decisions += 1;
            total_nodes += report.nodes_used as u64;
            min_clearance = min_clearance.min(report.root_clearance);
        }
        keys.push(action_key(action));
        world.step(action);
    }

    let count = |key: Action| keys.iter().filter(|k| **k == action_key(key)).count() as u32;
    let metrics = RunMetrics {
        config_id: config.id.clone(),
        seed,
        max_frames,
        frame_count: world.frame_count(),
        lives_lost: world.lives_lost(),
        final_lives: world.lives(),
        waves: world.waves(),
        game_over: world.is_game_over(),
        decisions,
        thrust_frames: count(Action::Thrust),
        left_frames: count(Action::RotateLeft),
        right_frames: count(Action::RotateRight),
        min_clearance,
        avg_nodes: if decisions == 0 {
            0.0
        } else {
            total_nodes as f64 / decisions as f64
        },
    };
    tracing::debug!(
        seed = %crate::util::seed_to_hex(seed),
        frames = metrics.frame_count,
        lives_lost = metrics.lives_lost,
        "run finished"
    );

    Ok(RunArtifact { metrics, keys })
}

pub fn write_trace(path: &Path, keys: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, keys).with_context(|| format!("failed writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use asteroid_planner_core::PlannerConfig;

    fn quick_config() -> AutopilotConfig {
        AutopilotConfig {
            planner: PlannerConfig {
                horizon: 4,
                ..PlannerConfig::default()
            },
            decision_interval: 6,
            ..AutopilotConfig::default()
        }
    }

    #[test]
    fn zero_frames_is_rejected() {
        assert!(run(&quick_config(), 1, 0).is_err());
    }

    #[test]
    fn keys_cover_every_frame() -> Result<()> {
        let artifact = run(&quick_config(), 0xC0FF_EE11, 240)?;
        let m = &artifact.metrics;
        assert_eq!(artifact.keys.len() as u32, m.frame_count);
        assert_eq!(m.thrust_frames + m.left_frames + m.right_frames, m.frame_count);
        assert_eq!(m.decisions, m.frame_count.div_ceil(6));
        assert!(artifact.keys.iter().all(|k| b"wad".contains(k)));
        Ok(())
    }

    #[test]
    fn runs_are_reproducible() -> Result<()> {
        let a = run(&quick_config(), 99, 180)?;
        let b = run(&quick_config(), 99, 180)?;
        assert_eq!(a.keys, b.keys);
        assert_eq!(a.metrics.lives_lost, b.metrics.lives_lost);
        Ok(())
    }

    #[test]
    fn invalid_planner_config_surfaces_as_error() {
        let mut config = quick_config();
        config.planner.physics.dt = -1.0;
        let err = run(&config, 1, 10).unwrap_err();
        assert!(format!("{err:#}").contains("invalid planner config"));
    }

    #[test]
    fn trace_is_written_with_parents() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested/run.keys");
        write_trace(&path, b"wwad")?;
        assert_eq!(fs::read(path)?, b"wwad");
        Ok(())
    }
}
