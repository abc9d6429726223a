//! Autopilot for the Python Asteroids game: a live TCP client plus a headless
//! copy of the game for benchmarking planner settings across seeds.

pub mod benchmark;
pub mod client;
pub mod config;
pub mod protocol;
pub mod runner;
pub mod sim;
pub mod util;
