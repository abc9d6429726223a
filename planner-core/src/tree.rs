use crate::action::Action;
use crate::arena::{NodeId, ShipState, StateArena};
use crate::config::{EmptyFieldPolicy, Physics};
use crate::geometry::{clearance, step, Asteroid, Ship};
use crate::obstacles::AsteroidTrajectories;
use crate::score::score_subtree;

/// Smallest clearance from `ship` to any asteroid, or the policy value when
/// the field is empty.
pub fn nearest_clearance(
    physics: &Physics,
    ship: &Ship,
    asteroids: &[Asteroid],
    empty_field: EmptyFieldPolicy,
) -> f64 {
    let mut gaps = asteroids.iter().map(|asteroid| clearance(physics, ship, asteroid));
    let Some(first) = gaps.next() else {
        return empty_field.clearance();
    };
    gaps.fold(first, |min, gap| if gap < min { gap } else { min })
}

/// Expands ship states layer by layer into the arena. A node is terminal
/// when it is in contact with an asteroid or sits on the last layer;
/// otherwise it gets exactly one child per [`Action`].
pub struct TreeBuilder<'a> {
    pub arena: &'a mut StateArena,
    pub trajectories: &'a AsteroidTrajectories,
    pub physics: &'a Physics,
    pub empty_field: EmptyFieldPolicy,
    pub horizon: usize,
}

impl TreeBuilder<'_> {
    /// Fills in `node` (already holding its ship state) at `layer` and
    /// everything below it.
    pub fn expand(&mut self, node: NodeId, layer: usize) {
        let ship = self.arena.get(node).ship;
        let gap = nearest_clearance(
            self.physics,
            &ship,
            self.trajectories.layer(layer),
            self.empty_field,
        );

        let state = self.arena.get_mut(node);
        state.clearance = gap;
        state.children = [None; 3];
        if gap <= 0.0 || layer + 1 > self.horizon {
            return;
        }

        for action in Action::ALL {
            let child = self.arena.allocate();
            *self.arena.get_mut(child) = ShipState::new(step(self.physics, &ship, action));
            self.arena.get_mut(node).children[action.index()] = Some(child);
            self.expand(child, layer + 1);
        }
    }
}

/// Read-only view of the most recently built tree.
#[derive(Clone, Copy)]
pub struct Tree<'a> {
    arena: &'a StateArena,
    root: NodeId,
}

impl<'a> Tree<'a> {
    pub(crate) fn new(arena: &'a StateArena, root: NodeId) -> Self {
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &'a ShipState {
        self.arena.get(id)
    }

    pub fn child(&self, id: NodeId, action: Action) -> Option<NodeId> {
        self.arena.get(id).children[action.index()]
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Layers below the root on the longest surviving path.
    pub fn depth(&self) -> usize {
        fn walk(arena: &StateArena, id: NodeId) -> usize {
            arena
                .get(id)
                .children
                .iter()
                .flatten()
                .map(|child| 1 + walk(arena, *child))
                .max()
                .unwrap_or(0)
        }
        walk(self.arena, self.root)
    }

    pub fn nodes(&self) -> &'a [ShipState] {
        self.arena.live()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        self.arena.ids()
    }

    pub fn score(&self, id: NodeId) -> f64 {
        score_subtree(self.arena, id)
    }
}
