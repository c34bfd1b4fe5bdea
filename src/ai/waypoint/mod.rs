mod types;
mod nav_mesh;
mod collection;

#[cfg(test)]
mod tests;

pub use types::{
    EdgeData, NavMeshData, NodeKind, PathSegment, Waypoint, WaypointData, WaypointId,
    WaypointNode,
};
pub use nav_mesh::{NavMesh, Segments};
pub use collection::{ChildRef, WaypointCollection};
