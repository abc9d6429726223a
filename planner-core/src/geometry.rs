use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::config::Physics;

const DEG_TO_RAD: f64 = core::f64::consts::TAU / 360.0;

// ── State types ─────────────────────────────────────────────────────

/// Ship kinematics at one instant. `angle` is in degrees, 0 pointing
/// along +x and increasing counter-clockwise on screen (y grows down).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub angle: f64,
}

/// A circular obstacle drifting at constant velocity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Asteroid {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
}

// ── Toroidal math ───────────────────────────────────────────────────

/// Floating-point remainder folded into `[0, modulus)`.
#[inline]
pub fn wrap(x: f64, modulus: f64) -> f64 {
    let mut r = x % modulus;
    if r < 0.0 {
        r += modulus;
    }
    // -1e-17 + 450.0 rounds to 450.0
    if r >= modulus {
        r = 0.0;
    }
    r
}

/// Shortest separation along one wrapped axis.
#[inline]
pub fn torus_delta(a: f64, b: f64, modulus: f64) -> f64 {
    let d = wrap(a - b, modulus);
    d.min(modulus - d)
}

pub fn torus_distance(physics: &Physics, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = torus_delta(x1, x2, physics.world_width);
    let dy = torus_delta(y1, y2, physics.world_height);
    dx.hypot(dy)
}

/// Gap between the ship hull and the asteroid rim. Zero or below is contact.
pub fn clearance(physics: &Physics, ship: &Ship, asteroid: &Asteroid) -> f64 {
    torus_distance(physics, ship.x, ship.y, asteroid.x, asteroid.y)
        - asteroid.radius
        - physics.ship_radius
}

// ── Ship transitions ────────────────────────────────────────────────

pub fn step_thrust(physics: &Physics, ship: &Ship) -> Ship {
    let rad = ship.angle * DEG_TO_RAD;
    let dv = physics.ship_thrust * physics.dt;
    let vx = ship.vx + rad.cos() * dv;
    let vy = ship.vy - rad.sin() * dv;
    drift(physics, ship, vx, vy, ship.angle)
}

pub fn step_rotate_left(physics: &Physics, ship: &Ship) -> Ship {
    let angle = wrap(ship.angle - physics.ship_rot_speed * physics.dt, 360.0);
    drift(physics, ship, ship.vx, ship.vy, angle)
}

pub fn step_rotate_right(physics: &Physics, ship: &Ship) -> Ship {
    let angle = wrap(ship.angle + physics.ship_rot_speed * physics.dt, 360.0);
    drift(physics, ship, ship.vx, ship.vy, angle)
}

#[inline]
pub fn step(physics: &Physics, ship: &Ship, action: Action) -> Ship {
    match action {
        Action::Thrust => step_thrust(physics, ship),
        Action::RotateLeft => step_rotate_left(physics, ship),
        Action::RotateRight => step_rotate_right(physics, ship),
    }
}

/// Applies linear friction to the post-input velocity and integrates the
/// position. Friction larger than the speed stops the ship where it is.
fn drift(physics: &Physics, ship: &Ship, vx: f64, vy: f64, angle: f64) -> Ship {
    let speed = vx.hypot(vy);
    let decel = physics.ship_friction * physics.dt;
    if decel > speed {
        return Ship {
            x: ship.x,
            y: ship.y,
            vx: 0.0,
            vy: 0.0,
            angle,
        };
    }

    let (vx, vy) = if speed > 0.0 {
        (vx - vx * decel / speed, vy - vy * decel / speed)
    } else {
        (vx, vy)
    };
    Ship {
        x: wrap(ship.x + vx * physics.dt, physics.world_width),
        y: wrap(ship.y + vy * physics.dt, physics.world_height),
        vx,
        vy,
        angle,
    }
}

// ── Asteroid transition ─────────────────────────────────────────────

pub fn advance_asteroid(physics: &Physics, asteroid: &Asteroid) -> Asteroid {
    Asteroid {
        x: wrap(asteroid.x + asteroid.vx * physics.dt, physics.world_width),
        y: wrap(asteroid.y + asteroid.vy * physics.dt, physics.world_height),
        ..*asteroid
    }
}
