//! Default world and ship constants, matching the Python game the bot plays.

// World dimensions (pixels)
pub const WORLD_WIDTH: f64 = 450.0;
pub const WORLD_HEIGHT: f64 = 450.0;

// Planner time step: one tree layer = 150 ms of game time.
pub const PLAN_DT: f64 = 0.15;

// Ship
pub const SHIP_THRUST: f64 = 200.0; // px/s^2
pub const SHIP_FRICTION: f64 = 10.0; // px/s^2, linear
pub const SHIP_ROT_SPEED: f64 = 220.0; // degrees/s
pub const SHIP_RADIUS: f64 = 12.0;
// The game forgives 3 px of overlap before registering a hit.
pub const SHIP_COLLISION_SLACK: f64 = 3.0;
pub const SHIP_COLLISION_RADIUS: f64 = SHIP_RADIUS - SHIP_COLLISION_SLACK;

// Search tree
pub const NUM_BRANCHES: usize = 3;
pub const DEFAULT_HORIZON: usize = 10;
// 3^13 nodes is ~800k records; anything deeper is a misconfiguration.
pub const MAX_HORIZON: usize = 12;

// Headless game rules
pub const FRAMES_PER_SECOND: u32 = 60;
pub const ASTEROID_RADIUS_LARGE: f64 = 40.0;
pub const ASTEROID_MIN_SPEED: f64 = 10.0;
pub const ASTEROID_MAX_SPEED: f64 = 60.0;
pub const START_ASTEROIDS: usize = 20;
pub const SPAWN_SAFE_DISTANCE: f64 = 120.0;
pub const SPAWN_PUSH: f64 = 200.0;
pub const SHIP_START_ANGLE: f64 = 90.0;
pub const INVULNERABLE_SECONDS: f64 = 2.0;
