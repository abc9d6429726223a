//! Look-ahead collision avoidance for a ship on a wrap-around plane.
//!
//! Each call expands every thrust / rotate-left / rotate-right sequence over a
//! fixed number of layers against predicted asteroid positions, then picks the
//! first action whose best continuation keeps the largest worst-case gap.

pub mod action;
pub mod arena;
pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod obstacles;
pub mod planner;
pub mod rng;
pub mod score;
pub mod tree;

pub use action::Action;
pub use arena::{tree_node_count, NodeId, ShipState, StateArena};
pub use config::{EmptyFieldPolicy, Physics, PlannerConfig};
pub use error::PlannerError;
pub use geometry::{Asteroid, Ship};
pub use obstacles::AsteroidTrajectories;
pub use planner::{select_action, PlanReport, Planner};
