use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::arena::{NodeId, ShipState, StateArena};
use crate::config::PlannerConfig;
use crate::error::PlannerError;
use crate::geometry::{wrap, Asteroid, Ship};
use crate::obstacles::AsteroidTrajectories;
use crate::score::score_subtree;
use crate::tree::{Tree, TreeBuilder};

/// Outcome of one planning call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    pub action: Action,
    /// Score of each root branch, indexed by [`Action::index`]. `None` when
    /// the root was terminal and the branch was never built.
    pub branch_scores: [Option<f64>; 3],
    pub root_clearance: f64,
    pub nodes_used: usize,
}

/// Picks the highest-scoring branch. The running best starts at thrust with
/// score 0 and is replaced whenever a later branch scores at least as much,
/// so exact ties go to the action declared last.
pub fn select_action(branch_scores: &[Option<f64>; 3]) -> Action {
    let mut best = Action::Thrust;
    let mut max_score = 0.0;
    for action in Action::ALL {
        if let Some(score) = branch_scores[action.index()] {
            if score >= max_score {
                best = action;
                max_score = score;
            }
        }
    }
    best
}

/// Owns the node arena and runs one search per call. Not reentrant: each
/// call reuses the arena, invalidating the previous tree.
#[derive(Clone, Debug)]
pub struct Planner {
    config: PlannerConfig,
    arena: StateArena,
    last_plan: Option<PlanReport>,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Result<Self, PlannerError> {
        config.validate()?;
        Ok(Self {
            arena: StateArena::for_horizon(config.horizon),
            config,
            last_plan: None,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn horizon(&self) -> usize {
        self.config.horizon
    }

    /// Predicts `asteroids` over this planner's horizon, using its physics.
    pub fn trajectories(&self, asteroids: &[Asteroid]) -> AsteroidTrajectories {
        AsteroidTrajectories::new(&self.config.physics, asteroids, self.config.horizon)
    }

    pub fn best_move(&mut self, ship: &Ship, trajectories: &AsteroidTrajectories) -> Action {
        self.plan(ship, trajectories).action
    }

    /// Builds and scores the full tree for `ship`. Panics if `trajectories`
    /// covers fewer layers than the planner's horizon.
    pub fn plan(&mut self, ship: &Ship, trajectories: &AsteroidTrajectories) -> PlanReport {
        assert!(
            trajectories.horizon() >= self.config.horizon,
            "asteroid trajectories cover {} layers, planner needs {}",
            trajectories.horizon(),
            self.config.horizon
        );

        let physics = &self.config.physics;
        self.arena.reset();
        let root = self.arena.allocate();
        *self.arena.get_mut(root) = ShipState::new(Ship {
            x: wrap(ship.x, physics.world_width),
            y: wrap(ship.y, physics.world_height),
            ..*ship
        });

        TreeBuilder {
            arena: &mut self.arena,
            trajectories,
            physics,
            empty_field: self.config.empty_field,
            horizon: self.config.horizon,
        }
        .expand(root, 0);

        let root_state = *self.arena.get(root);
        let branch_scores = root_state
            .children
            .map(|child| child.map(|id| score_subtree(&self.arena, id)));
        let action = select_action(&branch_scores);

        let report = PlanReport {
            action,
            branch_scores,
            root_clearance: root_state.clearance,
            nodes_used: self.arena.len(),
        };
        tracing::trace!(
            action = %report.action,
            nodes = report.nodes_used,
            root_clearance = report.root_clearance,
            "planned move"
        );
        self.last_plan = Some(report);
        report
    }

    /// Convenience for callers holding raw asteroid states.
    pub fn plan_snapshot(&mut self, ship: &Ship, asteroids: &[Asteroid]) -> PlanReport {
        let trajectories = self.trajectories(asteroids);
        self.plan(ship, &trajectories)
    }

    /// Report from the most recent call, if any.
    pub fn last_plan(&self) -> Option<&PlanReport> {
        self.last_plan.as_ref()
    }

    /// Tree from the most recent call, if any.
    pub fn tree(&self) -> Option<Tree<'_>> {
        if self.arena.is_empty() {
            None
        } else {
            Some(Tree::new(&self.arena, NodeId::FIRST))
        }
    }
}
