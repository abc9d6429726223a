use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_HORIZON, MAX_HORIZON, PLAN_DT, SHIP_COLLISION_RADIUS, SHIP_FRICTION, SHIP_ROT_SPEED,
    SHIP_THRUST, WORLD_HEIGHT, WORLD_WIDTH,
};
use crate::error::PlannerError;

/// World and ship parameters shared by the kinematics kernel and the
/// obstacle predictor. One step of either model advances time by `dt`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Physics {
    pub world_width: f64,
    pub world_height: f64,
    pub dt: f64,
    pub ship_thrust: f64,
    pub ship_friction: f64,
    /// Degrees per second.
    pub ship_rot_speed: f64,
    pub ship_radius: f64,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            dt: PLAN_DT,
            ship_thrust: SHIP_THRUST,
            ship_friction: SHIP_FRICTION,
            ship_rot_speed: SHIP_ROT_SPEED,
            ship_radius: SHIP_COLLISION_RADIUS,
        }
    }
}

impl Physics {
    /// Same world, different step length. The headless game advances by
    /// frames while the planner looks ahead in coarser layers.
    pub fn with_dt(self, dt: f64) -> Self {
        Self { dt, ..self }
    }

    pub fn validate(&self) -> Result<(), PlannerError> {
        let named = [
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("dt", self.dt),
            ("ship_thrust", self.ship_thrust),
            ("ship_friction", self.ship_friction),
            ("ship_rot_speed", self.ship_rot_speed),
            ("ship_radius", self.ship_radius),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                return Err(PlannerError::NonFiniteParameter { name, value });
            }
        }
        if self.world_width <= 0.0 || self.world_height <= 0.0 {
            return Err(PlannerError::InvalidWorldSize {
                width: self.world_width,
                height: self.world_height,
            });
        }
        if self.dt <= 0.0 {
            return Err(PlannerError::InvalidTimeStep { dt: self.dt });
        }
        Ok(())
    }
}

/// Clearance reported for a layer when there is nothing to collide with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyFieldPolicy {
    /// Zero clearance: an empty field is scored like contact and never expanded.
    #[default]
    Cautious,
    /// Infinite clearance: an empty field places no constraint on the ship.
    Unconstrained,
}

impl EmptyFieldPolicy {
    pub fn clearance(self) -> f64 {
        match self {
            Self::Cautious => 0.0,
            Self::Unconstrained => f64::INFINITY,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub physics: Physics,
    /// Number of layers looked ahead past the current state.
    pub horizon: usize,
    #[serde(default)]
    pub empty_field: EmptyFieldPolicy,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            physics: Physics::default(),
            horizon: DEFAULT_HORIZON,
            empty_field: EmptyFieldPolicy::default(),
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.horizon > MAX_HORIZON {
            return Err(PlannerError::HorizonTooDeep {
                horizon: self.horizon,
                max: MAX_HORIZON,
            });
        }
        self.physics.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(PlannerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_deep_horizon() {
        let cfg = PlannerConfig {
            horizon: MAX_HORIZON + 1,
            ..PlannerConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(PlannerError::HorizonTooDeep { .. })
        ));
    }

    #[test]
    fn rejects_degenerate_physics() {
        let flat = Physics {
            world_height: 0.0,
            ..Physics::default()
        };
        assert!(matches!(
            flat.validate(),
            Err(PlannerError::InvalidWorldSize { .. })
        ));

        assert!(matches!(
            Physics::default().with_dt(-0.1).validate(),
            Err(PlannerError::InvalidTimeStep { .. })
        ));

        let nan = Physics {
            ship_thrust: f64::NAN,
            ..Physics::default()
        };
        assert!(matches!(
            nan.validate(),
            Err(PlannerError::NonFiniteParameter { name: "ship_thrust", .. })
        ));
    }

    #[test]
    fn empty_field_policy_clearances() {
        assert_eq!(EmptyFieldPolicy::Cautious.clearance(), 0.0);
        assert!(EmptyFieldPolicy::Unconstrained.clearance().is_infinite());
    }

    #[test]
    fn config_json_fills_defaults() {
        let cfg: PlannerConfig = serde_json::from_str(r#"{"horizon": 6}"#).unwrap();
        assert_eq!(cfg.horizon, 6);
        assert_eq!(cfg.physics, Physics::default());
        assert_eq!(cfg.empty_field, EmptyFieldPolicy::Cautious);

        let cfg: PlannerConfig =
            serde_json::from_str(r#"{"horizon": 4, "empty_field": "unconstrained"}"#).unwrap();
        assert_eq!(cfg.empty_field, EmptyFieldPolicy::Unconstrained);
    }
}
