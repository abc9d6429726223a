//! Wire format of the Python game: one JSON world snapshot per line from the
//! game, one key byte per decision back to it.

use anyhow::{Context, Result};
use asteroid_planner_core::geometry::wrap;
use asteroid_planner_core::{Action, Asteroid, Physics, Ship};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShipRecord {
    pub pos: [f64; 2],
    pub vel: [f64; 2],
    pub angle: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AsteroidRecord {
    pub pos: [f64; 2],
    pub vel: [f64; 2],
    pub radius: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub ship: ShipRecord,
    #[serde(default)]
    pub asteroids: Vec<AsteroidRecord>,
}

impl WorldSnapshot {
    pub fn from_json(line: &str) -> Result<Self> {
        serde_json::from_str(line.trim()).context("malformed world snapshot")
    }

    pub fn to_json_line(&self) -> Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    pub fn ship(&self, physics: &Physics) -> Ship {
        Ship {
            x: wrap(self.ship.pos[0], physics.world_width),
            y: wrap(self.ship.pos[1], physics.world_height),
            vx: self.ship.vel[0],
            vy: self.ship.vel[1],
            angle: self.ship.angle,
        }
    }

    pub fn asteroids(&self, physics: &Physics) -> Vec<Asteroid> {
        self.asteroids
            .iter()
            .map(|a| Asteroid {
                x: wrap(a.pos[0], physics.world_width),
                y: wrap(a.pos[1], physics.world_height),
                vx: a.vel[0],
                vy: a.vel[1],
                radius: a.radius,
            })
            .collect()
    }

    pub fn from_state(ship: &Ship, asteroids: &[Asteroid]) -> Self {
        Self {
            ship: ShipRecord {
                pos: [ship.x, ship.y],
                vel: [ship.vx, ship.vy],
                angle: ship.angle,
            },
            asteroids: asteroids
                .iter()
                .map(|a| AsteroidRecord {
                    pos: [a.x, a.y],
                    vel: [a.vx, a.vy],
                    radius: a.radius,
                })
                .collect(),
        }
    }
}

// ── Key mapping ─────────────────────────────────────────────────────

#[inline]
pub fn action_key(action: Action) -> u8 {
    match action {
        Action::Thrust => b'w',
        Action::RotateLeft => b'a',
        Action::RotateRight => b'd',
    }
}

pub fn action_from_key(key: u8) -> Option<Action> {
    match key.to_ascii_lowercase() {
        b'w' => Some(Action::Thrust),
        b'a' => Some(Action::RotateLeft),
        b'd' => Some(Action::RotateRight),
        _ => None,
    }
}

// ── Line framing ────────────────────────────────────────────────────

/// Accumulates socket reads. The game streams faster than the planner may
/// answer, so only the newest complete line matters; older ones are dropped.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Bytes after the last newline, still waiting for their terminator.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Newest non-blank complete line. Everything up to and including the
    /// last newline is consumed even when all complete lines are blank.
    pub fn latest_complete(&mut self) -> Option<String> {
        let last_newline = self.pending.iter().rposition(|b| *b == b'\n')?;
        let complete: Vec<u8> = self.pending.drain(..=last_newline).collect();
        complete
            .split(|b| *b == b'\n')
            .rev()
            .map(|line| String::from_utf8_lossy(line).trim().to_string())
            .find(|line| !line.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{"ship": {"pos": [225.0, 225.0], "vel": [0.0, -3.5], "angle": 90.0}, "asteroids": [{"pos": [-80.0, 12.5], "vel": [31.2, -4.0], "radius": 40}, {"pos": [100.0, 460.0], "vel": [0.0, 0.0], "radius": 12}]}"#;

    #[test]
    fn decodes_game_snapshot() {
        let physics = Physics::default();
        let snapshot = WorldSnapshot::from_json(SAMPLE).unwrap();
        let ship = snapshot.ship(&physics);
        assert_eq!((ship.x, ship.y, ship.vy, ship.angle), (225.0, 225.0, -3.5, 90.0));

        let rocks = snapshot.asteroids(&physics);
        assert_eq!(rocks.len(), 2);
        assert_eq!((rocks[0].x, rocks[0].y), (370.0, 12.5));
        assert_eq!(rocks[0].radius, 40.0);
        assert!((rocks[1].y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn missing_asteroid_list_is_empty_field() {
        let snapshot = WorldSnapshot::from_json(
            r#"{"ship": {"pos": [1, 2], "vel": [0, 0], "angle": 0}}"#,
        )
        .unwrap();
        assert!(snapshot.asteroids.is_empty());
    }

    #[test]
    fn rejects_malformed_snapshot() {
        assert!(WorldSnapshot::from_json(r#"{"ship": {"pos": [1]}}"#).is_err());
        assert!(WorldSnapshot::from_json("not json").is_err());
    }

    #[test]
    fn state_roundtrips_through_json_line() {
        let physics = Physics::default();
        let ship = Ship {
            x: 10.0,
            y: 20.0,
            vx: 1.0,
            vy: -1.0,
            angle: 45.0,
        };
        let rock = Asteroid {
            x: 300.0,
            y: 40.0,
            vx: 5.0,
            vy: 6.0,
            radius: 24.0,
        };
        let line = WorldSnapshot::from_state(&ship, &[rock]).to_json_line().unwrap();
        assert!(line.ends_with('\n'));
        let back = WorldSnapshot::from_json(&line).unwrap();
        assert_eq!(back.ship(&physics), ship);
        assert_eq!(back.asteroids(&physics), vec![rock]);
    }

    #[test]
    fn keys_match_game_bindings() {
        assert_eq!(action_key(Action::Thrust), b'w');
        assert_eq!(action_key(Action::RotateLeft), b'a');
        assert_eq!(action_key(Action::RotateRight), b'd');
        for action in Action::ALL {
            assert_eq!(action_from_key(action_key(action)), Some(action));
        }
        assert_eq!(action_from_key(b'D'), Some(Action::RotateRight));
        assert_eq!(action_from_key(b'q'), None);
    }

    #[test]
    fn line_buffer_keeps_only_newest_line() {
        let mut buf = LineBuffer::new();
        buf.push(b"first\nsecond\nthi");
        assert_eq!(buf.latest_complete().as_deref(), Some("second"));
        assert_eq!(buf.pending_len(), 3);
        assert_eq!(buf.latest_complete(), None);

        buf.push(b"rd\n");
        assert_eq!(buf.latest_complete().as_deref(), Some("third"));
        assert_eq!(buf.pending_len(), 0);
    }

    #[test]
    fn line_buffer_skips_blank_lines() {
        let mut buf = LineBuffer::new();
        buf.push(b"snap\n\n  \n");
        assert_eq!(buf.latest_complete().as_deref(), Some("snap"));

        buf.push(b"\n\n");
        assert_eq!(buf.latest_complete(), None);
        assert_eq!(buf.pending_len(), 0);
    }
}
