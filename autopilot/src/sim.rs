//! Headless copy of the game's rules, enough to score a pilot offline:
//! drifting asteroids, a wrapping ship, lives and respawns. No bullets.

use asteroid_planner_core::constants::{
    ASTEROID_MAX_SPEED, ASTEROID_MIN_SPEED, ASTEROID_RADIUS_LARGE, FRAMES_PER_SECOND,
    INVULNERABLE_SECONDS, SHIP_COLLISION_RADIUS, SHIP_START_ANGLE, SPAWN_PUSH,
    SPAWN_SAFE_DISTANCE, START_ASTEROIDS,
};
use asteroid_planner_core::geometry::{advance_asteroid, step};
use asteroid_planner_core::rng::SeededRng;
use asteroid_planner_core::{Action, Asteroid, Physics, Ship};

#[derive(Clone, Debug)]
pub struct World {
    /// Same physics as the planner but with one frame as the time step.
    frame_physics: Physics,
    rng: SeededRng,
    ship: Ship,
    asteroids: Vec<Asteroid>,
    invulnerable_timer: f64,
    lives: u32,
    lives_lost: u32,
    waves: u32,
    frame_count: u32,
    game_over: bool,
}

impl World {
    pub fn new(seed: u32, lives: u32, physics: Physics) -> Self {
        let frame_physics = physics.with_dt(1.0 / FRAMES_PER_SECOND as f64);
        let mut world = Self {
            frame_physics,
            rng: SeededRng::new(seed),
            ship: fresh_ship(&frame_physics),
            asteroids: Vec::with_capacity(START_ASTEROIDS + 1),
            invulnerable_timer: INVULNERABLE_SECONDS,
            lives: lives.max(1),
            lives_lost: 0,
            waves: 0,
            frame_count: 0,
            game_over: false,
        };
        world.spawn_wave(START_ASTEROIDS);
        world
    }

    pub fn ship(&self) -> &Ship {
        &self.ship
    }

    pub fn asteroids(&self) -> &[Asteroid] {
        &self.asteroids
    }

    pub fn physics(&self) -> &Physics {
        &self.frame_physics
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_timer > 0.0
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn lives_lost(&self) -> u32 {
        self.lives_lost
    }

    pub fn waves(&self) -> u32 {
        self.waves
    }

    pub fn rng_state(&self) -> u32 {
        self.rng.state()
    }

    /// Advances one frame with `action` held. No-op once the game is over.
    pub fn step(&mut self, action: Action) {
        if self.game_over {
            return;
        }
        self.frame_count += 1;

        self.ship = step(&self.frame_physics, &self.ship, action);
        if self.invulnerable_timer > 0.0 {
            self.invulnerable_timer -= self.frame_physics.dt;
        }
        for asteroid in &mut self.asteroids {
            *asteroid = advance_asteroid(&self.frame_physics, asteroid);
        }

        if !self.is_invulnerable() {
            self.resolve_collision();
        }

        if self.asteroids.is_empty() {
            self.spawn_wave(START_ASTEROIDS + 1);
        }
    }

    /// The game only checks plain distance here, not the wrapped one, and
    /// at most one hit counts per frame.
    fn resolve_collision(&mut self) {
        let ship = self.ship;
        let hit = self.asteroids.iter().position(|a| {
            (ship.x - a.x).hypot(ship.y - a.y) < a.radius + SHIP_COLLISION_RADIUS
        });
        let Some(index) = hit else {
            return;
        };

        self.lives -= 1;
        self.lives_lost += 1;
        tracing::debug!(
            frame = self.frame_count,
            lives = self.lives,
            "ship destroyed"
        );
        if self.lives == 0 {
            self.game_over = true;
        } else {
            self.ship = fresh_ship(&self.frame_physics);
            self.invulnerable_timer = INVULNERABLE_SECONDS;
        }
        self.asteroids.remove(index);
    }

    fn spawn_wave(&mut self, count: usize) {
        self.waves += 1;
        for _ in 0..count {
            let mut asteroid = self.edge_asteroid(ASTEROID_RADIUS_LARGE);
            let near = (asteroid.x - self.ship.x).hypot(asteroid.y - self.ship.y);
            if near < SPAWN_SAFE_DISTANCE {
                asteroid.x += SPAWN_PUSH;
                asteroid.y += SPAWN_PUSH;
            }
            self.asteroids.push(asteroid);
        }
    }

    /// New asteroid just outside a random screen edge. Its position stays
    /// unwrapped until the first frame moves it.
    fn edge_asteroid(&mut self, radius: f64) -> Asteroid {
        let width = self.frame_physics.world_width;
        let height = self.frame_physics.world_height;
        let offset = radius * 2.0;
        let (x, y) = match self.rng.next_int(4) {
            0 => (-offset, self.rng.uniform(0.0, height)),
            1 => (width + offset, self.rng.uniform(0.0, height)),
            2 => (self.rng.uniform(0.0, width), -offset),
            _ => (self.rng.uniform(0.0, width), height + offset),
        };
        let heading = self.rng.uniform(0.0, 360.0).to_radians();
        let speed = self.rng.uniform(ASTEROID_MIN_SPEED, ASTEROID_MAX_SPEED);
        Asteroid {
            x,
            y,
            vx: heading.cos() * speed,
            vy: -heading.sin() * speed,
            radius,
        }
    }
}

fn fresh_ship(physics: &Physics) -> Ship {
    Ship {
        x: physics.world_width / 2.0,
        y: physics.world_height / 2.0,
        vx: 0.0,
        vy: 0.0,
        angle: SHIP_START_ANGLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_world_spawns_first_wave_off_screen() {
        let world = World::new(0xDEAD_BEEF, 1, Physics::default());
        assert_eq!(world.asteroids().len(), START_ASTEROIDS);
        assert_eq!(world.waves(), 1);
        assert_eq!(world.ship().angle, SHIP_START_ANGLE);
        assert!(world.is_invulnerable());

        for a in world.asteroids() {
            assert_eq!(a.radius, ASTEROID_RADIUS_LARGE);
            let speed = a.vx.hypot(a.vy);
            assert!(speed > ASTEROID_MIN_SPEED - 1e-9 && speed < ASTEROID_MAX_SPEED + 1e-9);
            let outside = a.x < 0.0 || a.y < 0.0 || a.x > 450.0 || a.y > 450.0;
            assert!(outside, "spawned on screen at ({}, {})", a.x, a.y);
        }
    }

    #[test]
    fn same_seed_replays_identically() {
        let mut a = World::new(42, 3, Physics::default());
        let mut b = World::new(42, 3, Physics::default());
        let script = [Action::Thrust, Action::RotateLeft, Action::RotateRight];
        for frame in 0..900 {
            let action = script[frame % 3];
            a.step(action);
            b.step(action);
        }
        assert_eq!(a.ship(), b.ship());
        assert_eq!(a.asteroids(), b.asteroids());
        assert_eq!(a.rng_state(), b.rng_state());
        assert_eq!(a.lives_lost(), b.lives_lost());
    }

    #[test]
    fn invulnerability_expires_after_two_seconds() {
        let mut world = World::new(7, 1, Physics::default());
        world.asteroids.clear();
        world.asteroids.push(Asteroid {
            x: 10.0,
            y: 10.0,
            radius: 12.0,
            ..Asteroid::default()
        });
        for _ in 0..119 {
            world.step(Action::RotateLeft);
        }
        assert!(world.is_invulnerable());
        world.step(Action::RotateLeft);
        world.step(Action::RotateLeft);
        assert!(!world.is_invulnerable());
    }

    #[test]
    fn collision_costs_a_life_and_respawns() {
        let mut world = World::new(9, 2, Physics::default());
        world.invulnerable_timer = 0.0;
        world.asteroids.clear();
        let rock = Asteroid {
            x: 225.0,
            y: 200.0,
            radius: 24.0,
            ..Asteroid::default()
        };
        let spare = Asteroid {
            x: 20.0,
            y: 20.0,
            radius: 12.0,
            ..Asteroid::default()
        };
        world.asteroids.extend([rock, spare]);

        world.step(Action::RotateRight);
        assert_eq!(world.lives(), 1);
        assert_eq!(world.lives_lost(), 1);
        assert!(!world.is_game_over());
        assert!(world.is_invulnerable());
        assert_eq!(world.asteroids(), &[spare]);
        assert_eq!((world.ship().x, world.ship().y), (225.0, 225.0));
    }

    #[test]
    fn last_life_ends_the_game() {
        let mut world = World::new(9, 1, Physics::default());
        world.invulnerable_timer = 0.0;
        world.asteroids.clear();
        world.asteroids.push(Asteroid {
            x: 230.0,
            y: 225.0,
            radius: 40.0,
            ..Asteroid::default()
        });
        world.step(Action::Thrust);
        assert!(world.is_game_over());
        let frames = world.frame_count();
        world.step(Action::Thrust);
        assert_eq!(world.frame_count(), frames);
    }

    #[test]
    fn cleared_field_spawns_a_bigger_wave() {
        let mut world = World::new(11, 1, Physics::default());
        world.asteroids.clear();
        world.step(Action::RotateLeft);
        assert_eq!(world.asteroids().len(), START_ASTEROIDS + 1);
        assert_eq!(world.waves(), 2);
    }

    #[test]
    fn ship_wraps_around_edges() {
        let mut world = World::new(5, 1, Physics::default());
        world.asteroids.clear();
        world.asteroids.push(Asteroid {
            x: 100.0,
            y: 400.0,
            radius: 12.0,
            ..Asteroid::default()
        });
        world.ship = Ship {
            x: 225.0,
            y: 1.0,
            vx: 0.0,
            vy: -120.0,
            angle: 90.0,
        };
        world.step(Action::Thrust);
        assert!(world.ship().y > 440.0);
    }
}
