use crate::constants::NUM_BRANCHES;
use crate::geometry::Ship;

/// Index of a node inside a [`StateArena`]. Only meaningful until the arena
/// is reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// First slot handed out after a reset; the planner seeds its root here.
    pub const FIRST: NodeId = NodeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node of the trajectory tree: the ship after some sequence of
/// actions, its clearance at that layer, and the follow-up states indexed by
/// [`crate::Action::index`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ShipState {
    pub ship: Ship,
    pub clearance: f64,
    pub children: [Option<NodeId>; NUM_BRANCHES],
}

impl ShipState {
    pub fn new(ship: Ship) -> Self {
        Self {
            ship,
            ..Self::default()
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }
}

/// Nodes in a complete tree of the given horizon: layers `0..=horizon`,
/// i.e. `(3^(horizon+1) - 1) / 2` for three branches. Saturates at
/// `usize::MAX` once `3^(horizon+1)` no longer fits (horizon 40 on 64-bit).
pub fn tree_node_count(horizon: usize) -> usize {
    u32::try_from(horizon.saturating_add(1))
        .ok()
        .and_then(|depth| NUM_BRANCHES.checked_pow(depth))
        .map_or(usize::MAX, |leaves| (leaves - 1) / (NUM_BRANCHES - 1))
}

/// Fixed-capacity pool of tree nodes with a bump cursor. `reset` rewinds the
/// cursor without clearing storage; every allocated slot is rewritten by its
/// new owner before it is read.
#[derive(Clone, Debug)]
pub struct StateArena {
    nodes: Vec<ShipState>,
    cursor: usize,
}

impl StateArena {
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(
            capacity <= u32::MAX as usize,
            "arena capacity {capacity} exceeds node id range"
        );
        Self {
            nodes: vec![ShipState::default(); capacity],
            cursor: 0,
        }
    }

    /// Sized to hold exactly one complete tree of `horizon`.
    pub fn for_horizon(horizon: usize) -> Self {
        Self::with_capacity(tree_node_count(horizon))
    }

    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes handed out since the last reset.
    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn try_allocate(&mut self) -> Option<NodeId> {
        if self.cursor >= self.nodes.len() {
            return None;
        }
        let id = NodeId(self.cursor as u32);
        self.cursor += 1;
        Some(id)
    }

    /// Panics when the arena is full. Capacity is derived from the horizon,
    /// so running out means the tree builder and the sizing disagree.
    #[track_caller]
    pub fn allocate(&mut self) -> NodeId {
        match self.try_allocate() {
            Some(id) => id,
            None => panic!("ship state arena exhausted: capacity {}", self.capacity()),
        }
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &ShipState {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut ShipState {
        &mut self.nodes[id.index()]
    }

    /// Nodes allocated since the last reset, in allocation order.
    pub fn live(&self) -> &[ShipState] {
        &self.nodes[..self.cursor]
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.cursor as u32).map(NodeId)
    }
}
