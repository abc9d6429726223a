use core::fmt;
use serde::{Deserialize, Serialize};

/// The three controls the planner chooses between. Declaration order is the
/// search and tie-break order: a later action wins an exact tie.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Thrust,
    RotateLeft,
    RotateRight,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Thrust, Action::RotateLeft, Action::RotateRight];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::Thrust => 0,
            Self::RotateLeft => 1,
            Self::RotateRight => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thrust => write!(f, "thrust"),
            Self::RotateLeft => write!(f, "rotate-left"),
            Self::RotateRight => write!(f, "rotate-right"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_declaration_order() {
        for (i, action) in Action::ALL.iter().enumerate() {
            assert_eq!(action.index(), i);
            assert_eq!(Action::from_index(i), Some(*action));
        }
        assert_eq!(Action::from_index(3), None);
    }

    #[test]
    fn serializes_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&Action::RotateLeft).unwrap(),
            "\"rotate_left\""
        );
    }
}
