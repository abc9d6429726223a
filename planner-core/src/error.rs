use core::fmt;

/// Rejected planner configurations. Raised once, when a [`crate::Planner`] is
/// built; a planner that constructed successfully never fails a call.
#[derive(Clone, Debug, PartialEq)]
pub enum PlannerError {
    HorizonTooDeep { horizon: usize, max: usize },
    InvalidWorldSize { width: f64, height: f64 },
    InvalidTimeStep { dt: f64 },
    NonFiniteParameter { name: &'static str, value: f64 },
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HorizonTooDeep { horizon, max } => {
                write!(f, "horizon too deep: {horizon} layers (allowed 0..={max})")
            }
            Self::InvalidWorldSize { width, height } => {
                write!(f, "world size must be positive: {width}x{height}")
            }
            Self::InvalidTimeStep { dt } => write!(f, "time step must be positive: {dt}"),
            Self::NonFiniteParameter { name, value } => {
                write!(f, "parameter {name} is not finite: {value}")
            }
        }
    }
}

impl std::error::Error for PlannerError {}
