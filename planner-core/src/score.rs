use crate::arena::{NodeId, StateArena};

/// Worst clearance along the best surviving path below `node`.
///
/// A node in contact scores 0 whatever lies beneath it. Otherwise the score
/// is the node's own clearance capped by its best child: pessimistic along a
/// path, optimistic about which action gets taken at each branch.
pub fn score_subtree(arena: &StateArena, node: NodeId) -> f64 {
    let state = arena.get(node);
    if state.clearance <= 0.0 {
        return 0.0;
    }

    let mut best_child = 0.0;
    let mut has_child = false;
    for child in state.children.iter().flatten() {
        has_child = true;
        let child_score = score_subtree(arena, *child);
        if child_score > best_child {
            best_child = child_score;
        }
    }

    if has_child {
        state.clearance.min(best_child)
    } else {
        state.clearance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ShipState;
    use crate::geometry::Ship;

    fn node(arena: &mut StateArena, clearance: f64) -> NodeId {
        let id = arena.allocate();
        *arena.get_mut(id) = ShipState {
            clearance,
            ..ShipState::new(Ship::default())
        };
        id
    }

    fn link(arena: &mut StateArena, parent: NodeId, children: [NodeId; 3]) {
        arena.get_mut(parent).children = children.map(Some);
    }

    #[test]
    fn leaf_scores_its_own_clearance() {
        let mut arena = StateArena::with_capacity(1);
        let leaf = node(&mut arena, 17.5);
        assert_eq!(score_subtree(&arena, leaf), 17.5);
    }

    #[test]
    fn contact_scores_zero_regardless_of_children() {
        let mut arena = StateArena::with_capacity(4);
        let root = node(&mut arena, -3.0);
        let kids = [
            node(&mut arena, 50.0),
            node(&mut arena, 60.0),
            node(&mut arena, 70.0),
        ];
        link(&mut arena, root, kids);
        assert_eq!(score_subtree(&arena, root), 0.0);

        arena.get_mut(root).clearance = 0.0;
        assert_eq!(score_subtree(&arena, root), 0.0);
    }

    #[test]
    fn parent_caps_best_child() {
        let mut arena = StateArena::with_capacity(4);
        let root = node(&mut arena, 30.0);
        let kids = [
            node(&mut arena, 10.0),
            node(&mut arena, 45.0),
            node(&mut arena, 0.0),
        ];
        link(&mut arena, root, kids);
        // best child is 45, capped by the parent's own 30
        assert_eq!(score_subtree(&arena, root), 30.0);

        arena.get_mut(root).clearance = 80.0;
        assert_eq!(score_subtree(&arena, root), 45.0);
    }

    #[test]
    fn all_children_colliding_scores_zero() {
        let mut arena = StateArena::with_capacity(4);
        let root = node(&mut arena, 30.0);
        let kids = [
            node(&mut arena, -1.0),
            node(&mut arena, 0.0),
            node(&mut arena, -20.0),
        ];
        link(&mut arena, root, kids);
        assert_eq!(score_subtree(&arena, root), 0.0);
    }

    #[test]
    fn score_never_exceeds_clearance_on_deep_chain() {
        let mut arena = StateArena::with_capacity(13);
        let root = node(&mut arena, 25.0);
        let mid = [
            node(&mut arena, 40.0),
            node(&mut arena, 12.0),
            node(&mut arena, 20.0),
        ];
        link(&mut arena, root, mid);
        for (i, parent) in mid.into_iter().enumerate() {
            let base = 5.0 * (i as f64 + 1.0);
            let leaves = [
                node(&mut arena, base),
                node(&mut arena, base * 3.0),
                node(&mut arena, -base),
            ];
            link(&mut arena, parent, leaves);
        }

        for id in arena.ids() {
            let state = arena.get(id);
            let score = score_subtree(&arena, id);
            if state.clearance <= 0.0 {
                assert_eq!(score, 0.0);
            } else {
                assert!(score <= state.clearance);
            }
        }
        // thrust branch: min(40, max(5, 15, 0)) = 15; left: min(12, 30) = 12;
        // right: min(20, 45) = 20 -> root min(25, 20) = 20
        assert_eq!(score_subtree(&arena, root), 20.0);
    }
}
