//! Hit-testing module for finding nodes at specific positions
//!
//! Frames are parent-relative, so the walk accumulates each ancestor's origin
//! while descending. Collapsed nodes and their subtrees never hit.

use crate::geometry::{Point, Rect};
use crate::tree::{LayoutTree, NodeId};

/// Result of a hit test against a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTestResult {
    /// The node that was hit
    pub node: NodeId,
    /// Position relative to the node's top-left corner
    pub local_pos: Point,
    /// The node's frame in root coordinates
    pub node_rect: Rect,
}

impl LayoutTree {
    /// Hit-test a point against the subtree under `root`
    ///
    /// Returns all nodes that contain the point, ordered from root to leaf
    /// (shallow to deep). Children are only tested when their parent contains
    /// the point.
    ///
    /// # Arguments
    /// * `root` - The node to test against
    /// * `point` - The point in the coordinate space `root` was arranged in
    pub fn hit_test(&self, root: NodeId, point: Point) -> Vec<HitTestResult> {
        let mut results = Vec::new();
        self.hit_test_recursive(root, point, Point::ZERO, &mut results);
        results
    }

    /// Find the deepest node at a given point
    pub fn hit_test_deepest(&self, root: NodeId, point: Point) -> Option<HitTestResult> {
        self.hit_test(root, point).pop()
    }

    fn hit_test_recursive(
        &self,
        id: NodeId,
        point: Point,
        origin: Point,
        results: &mut Vec<HitTestResult>,
    ) {
        let Some(node) = self.node(id) else {
            return;
        };
        if node.is_collapsed() {
            return;
        }

        let frame = node.frame();
        let node_rect = frame.translate(origin.x, origin.y);
        if !node_rect.contains(point) {
            return; // Point is outside this node, skip it and its children
        }

        results.push(HitTestResult {
            node: id,
            local_pos: Point::new(point.x - node_rect.x, point.y - node_rect.y),
            node_rect,
        });

        // Later children are on top; the first one that hits wins
        let child_origin = node_rect.origin();
        for &child in node.children().iter().rev() {
            let before = results.len();
            self.hit_test_recursive(child, point, child_origin, results);
            if results.len() > before {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::layout::Visibility;
    use crate::testing::RecordingPeer;
    use crate::Canvas;

    fn scene() -> (LayoutTree, NodeId, NodeId, NodeId) {
        let mut tree = LayoutTree::new();
        let root = tree.create(Canvas::new());
        let inner = tree.create(Canvas::new());
        let leaf = tree.create_leaf(RecordingPeer::new(10.0, 10.0));
        tree.add_child(root, inner).unwrap();
        tree.add_child(inner, leaf).unwrap();
        tree.set_width(inner, 50.0).unwrap();
        tree.set_height(inner, 50.0).unwrap();
        Canvas::set_left(&mut tree, inner, 20.0).unwrap();
        Canvas::set_top(&mut tree, inner, 20.0).unwrap();
        Canvas::set_left(&mut tree, leaf, 5.0).unwrap();
        Canvas::set_top(&mut tree, leaf, 5.0).unwrap();
        tree.update_layout(root, Size::new(100.0, 100.0)).unwrap();
        (tree, root, inner, leaf)
    }

    #[test]
    fn test_chain_from_root_to_leaf() {
        let (tree, root, inner, leaf) = scene();

        let hits = tree.hit_test(root, Point::new(27.0, 28.0));
        let ids: Vec<NodeId> = hits.iter().map(|hit| hit.node).collect();
        assert_eq!(ids, vec![root, inner, leaf]);

        let deepest = hits.last().unwrap();
        assert_eq!(deepest.node_rect, Rect::new(25.0, 25.0, 10.0, 10.0));
        assert_eq!(deepest.local_pos, Point::new(2.0, 3.0));
        assert_eq!(tree.absolute_frame(leaf), Some(deepest.node_rect));
    }

    #[test]
    fn test_miss_and_partial_hit() {
        let (tree, root, inner, _) = scene();

        assert!(tree.hit_test(root, Point::new(150.0, 10.0)).is_empty());
        assert_eq!(
            tree.hit_test_deepest(root, Point::new(60.0, 60.0)).map(|hit| hit.node),
            Some(inner)
        );
    }

    #[test]
    fn test_collapsed_subtree_is_skipped() {
        let (mut tree, root, inner, _) = scene();
        tree.set_visibility(inner, Visibility::Collapsed).unwrap();
        tree.update_layout(root, Size::new(100.0, 100.0)).unwrap();

        let hits = tree.hit_test(root, Point::new(27.0, 28.0));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].node, root);
    }
}
