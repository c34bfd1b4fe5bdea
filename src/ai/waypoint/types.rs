use serde::{Deserialize, Serialize};

use crate::ai::fixed_math::{FixedNum, FixedVec3};
use super::collection::WaypointCollection;

/// Identifier shared by waypoints and collections.
///
/// Allocated by the owning [`WaypointGraph`](crate::ai::graph::WaypointGraph)
/// from a monotonic counter and never reused while the graph lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaypointId(pub u32);

impl std::fmt::Display for WaypointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A concrete, level-0 waypoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: WaypointId,
    pub position: FixedVec3,
}

impl Waypoint {
    pub fn new(id: WaypointId, position: FixedVec3) -> Self {
        Self { id, position }
    }
}

/// One directed traversal from the owning waypoint to `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSegment {
    pub to: WaypointId,
    pub cost: FixedNum,
}

/// Leaf waypoint or super-node grouping nodes of the level below.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum NodeKind {
    Leaf(FixedVec3),
    Collection(WaypointCollection),
}

/// A node stored in the graph arena, at any search level.
///
/// `parent` is the collection one level up that contains this node, if any.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WaypointNode {
    pub id: WaypointId,
    pub level: u32,
    pub parent: Option<WaypointId>,
    pub kind: NodeKind,
}

impl WaypointNode {
    pub fn leaf(waypoint: Waypoint) -> Self {
        Self {
            id: waypoint.id,
            level: 0,
            parent: None,
            kind: NodeKind::Leaf(waypoint.position),
        }
    }

    pub fn collection(collection: WaypointCollection, level: u32) -> Self {
        Self {
            id: collection.id(),
            level,
            parent: None,
            kind: NodeKind::Collection(collection),
        }
    }

    /// Waypoint position, or the centroid of the children for a collection.
    pub fn position(&self) -> FixedVec3 {
        match &self.kind {
            NodeKind::Leaf(position) => *position,
            NodeKind::Collection(c) => c.position(),
        }
    }

    /// Bounding radius; zero for leaves.
    pub fn radius(&self) -> FixedNum {
        match &self.kind {
            NodeKind::Leaf(_) => FixedNum::ZERO,
            NodeKind::Collection(c) => c.radius(),
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.kind, NodeKind::Collection(_))
    }

    pub fn as_collection(&self) -> Option<&WaypointCollection> {
        match &self.kind {
            NodeKind::Collection(c) => Some(c),
            NodeKind::Leaf(_) => None,
        }
    }

    pub(crate) fn as_collection_mut(&mut self) -> Option<&mut WaypointCollection> {
        match &mut self.kind {
            NodeKind::Collection(c) => Some(c),
            NodeKind::Leaf(_) => None,
        }
    }

    /// Returns `false` for collections, which are positioned by their children.
    pub(crate) fn set_leaf_position(&mut self, position: FixedVec3) -> bool {
        match &mut self.kind {
            NodeKind::Leaf(current) => {
                *current = position;
                true
            }
            NodeKind::Collection(_) => false,
        }
    }
}

// ============================================================================
// Plain-data navmesh input
// ============================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct WaypointData {
    pub id: u32,
    pub position: [f32; 3],
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct EdgeData {
    pub from: u32,
    pub to: u32,
    /// Defaults to the straight-line distance between the endpoints.
    #[serde(default)]
    pub cost: Option<f32>,
    /// One-way edges only allow `from -> to`.
    #[serde(default)]
    pub one_way: bool,
}

/// Navigation mesh as produced by upstream geometry processing.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NavMeshData {
    pub waypoints: Vec<WaypointData>,
    pub edges: Vec<EdgeData>,
}
