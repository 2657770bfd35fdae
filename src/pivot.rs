//! Head pivot resolution.
//!
//! The rotation pivot is the model-space position of the head joint,
//! obtained by summing the local translations of the joint and all of its
//! ancestors. Rotations and scales of ancestors are ignored; VRM humanoid
//! rigs keep their bind-pose bones unrotated.

use crate::scene::SceneGraph;
use log::{info, warn};
use nalgebra::Vector3;

/// Resolved head pivot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigPivot {
    /// Model-space pivot position
    pub position: Vector3<f32>,
    /// Index of the joint the pivot was resolved from, `None` if it was not found
    pub joint: Option<usize>,
}

impl RigPivot {
    /// Zero pivot used when the joint is missing
    #[must_use]
    pub fn degenerate() -> Self {
        Self {
            position: Vector3::zeros(),
            joint: None,
        }
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.joint.is_none()
    }
}

/// Resolve the pivot of the named joint.
///
/// A missing joint is not an error: the pivot degrades to the origin and a
/// warning is logged.
#[must_use]
pub fn resolve_pivot(graph: &SceneGraph, joint_name: &str) -> RigPivot {
    let Some(joint) = graph.find_node(joint_name) else {
        warn!("{joint_name} node not found, head pivot remains (0, 0, 0)");
        return RigPivot::degenerate();
    };

    let position = std::iter::once(joint)
        .chain(graph.ancestors(joint))
        .filter_map(|index| graph.node(index))
        .fold(Vector3::zeros(), |acc, node| acc + node.local_translation());

    info!(
        "Resolved head pivot at ({:.4}, {:.4}, {:.4}) from node {} ('{}')",
        position.x, position.y, position.z, joint, joint_name
    );

    RigPivot {
        position,
        joint: Some(joint),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneNode;

    #[test]
    fn test_pivot_sums_ancestor_chain() {
        let nodes = vec![
            SceneNode::with_translation("root", Vector3::zeros()).with_children([1]),
            SceneNode::with_translation("child", Vector3::new(0.0, 1.0, 0.0)).with_children([2]),
            SceneNode::with_translation("head", Vector3::new(0.0, 0.5, 0.0)),
        ];
        let graph = SceneGraph::new(nodes, Vec::new()).unwrap();

        let pivot = resolve_pivot(&graph, "head");
        assert_eq!(pivot.position, Vector3::new(0.0, 1.5, 0.0));
        assert_eq!(pivot.joint, Some(2));
        assert!(!pivot.is_degenerate());
    }

    #[test]
    fn test_missing_joint_degrades_to_origin() {
        let graph = SceneGraph::new(vec![SceneNode::default()], Vec::new()).unwrap();

        let pivot = resolve_pivot(&graph, "J_Bip_C_Head");
        assert_eq!(pivot, RigPivot::degenerate());
        assert!(pivot.is_degenerate());
    }

    #[test]
    fn test_root_joint_uses_own_translation() {
        let nodes = vec![SceneNode::with_translation("head", Vector3::new(1.0, 2.0, 3.0))];
        let graph = SceneGraph::new(nodes, Vec::new()).unwrap();

        assert_eq!(resolve_pivot(&graph, "head").position, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_ignores_unrelated_branches() {
        let nodes = vec![
            SceneNode::with_translation("hips", Vector3::new(0.0, 1.0, 0.0)).with_children([1, 2]),
            SceneNode::with_translation("leg", Vector3::new(0.2, -0.5, 0.0)),
            SceneNode::with_translation("spine", Vector3::new(0.0, 0.3, 0.0)).with_children([3]),
            SceneNode::with_translation("head", Vector3::new(0.0, 0.25, 0.05)),
        ];
        let graph = SceneGraph::new(nodes, Vec::new()).unwrap();

        let pivot = resolve_pivot(&graph, "head");
        assert!((pivot.position - Vector3::new(0.0, 1.55, 0.05)).norm() < 1e-6);
    }
}
