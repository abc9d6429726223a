use crate::config::Physics;
use crate::geometry::{advance_asteroid, Asteroid};

/// Predicted asteroid states for layers `0..=horizon`, stored layer-major:
/// entry `layer * num_asteroids + index`.
#[derive(Clone, Debug)]
pub struct AsteroidTrajectories {
    states: Vec<Asteroid>,
    num_asteroids: usize,
    horizon: usize,
}

impl AsteroidTrajectories {
    pub fn new(physics: &Physics, asteroids: &[Asteroid], horizon: usize) -> Self {
        let num_asteroids = asteroids.len();
        let mut states = Vec::with_capacity(num_asteroids * (horizon + 1));
        states.extend_from_slice(asteroids);

        for layer in 1..=horizon {
            let prev = (layer - 1) * num_asteroids;
            for index in 0..num_asteroids {
                let next = advance_asteroid(physics, &states[prev + index]);
                states.push(next);
            }
        }

        Self {
            states,
            num_asteroids,
            horizon,
        }
    }

    pub fn num_asteroids(&self) -> usize {
        self.num_asteroids
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// All asteroids at one layer. Panics if `layer > horizon`.
    pub fn layer(&self, layer: usize) -> &[Asteroid] {
        assert!(
            layer <= self.horizon,
            "layer {layer} beyond predicted horizon {}",
            self.horizon
        );
        let start = layer * self.num_asteroids;
        &self.states[start..start + self.num_asteroids]
    }

    pub fn get(&self, layer: usize, index: usize) -> Option<&Asteroid> {
        if layer > self.horizon || index >= self.num_asteroids {
            return None;
        }
        self.states.get(layer * self.num_asteroids + index)
    }
}
