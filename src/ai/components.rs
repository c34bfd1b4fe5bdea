use bevy::prelude::*;

use super::builder::BuildReport;
use super::search::{FoundPath, PathFindResult, ResourceLimit};
use super::waypoint::WaypointId;

/// Asks for a path between two waypoints. The result is inserted on `entity`
/// as a [`WaypointPath`].
#[derive(Event, Message, Debug, Clone)]
pub struct PathRequest {
    pub entity: Entity,
    pub start: WaypointId,
    pub goal: WaypointId,
}

/// Rebuilds every search level above the navmesh with the current
/// [`AiConfig`](super::config::AiConfig).
#[derive(Event, Message, Debug, Clone, Default)]
pub struct RebuildHierarchy;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathFailure {
    NoPath,
    LimitExceeded(ResourceLimit),
    /// Unknown waypoint, or endpoints on different levels.
    InvalidRequest,
}

#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub enum WaypointPath {
    Found(FoundPath<WaypointId>),
    Failed(PathFailure),
}

impl WaypointPath {
    pub fn waypoints(&self) -> &[WaypointId] {
        match self {
            WaypointPath::Found(found) => &found.path,
            WaypointPath::Failed(_) => &[],
        }
    }
}

impl From<PathFindResult<WaypointId>> for WaypointPath {
    fn from(result: PathFindResult<WaypointId>) -> Self {
        match result {
            PathFindResult::Found(found) => WaypointPath::Found(found),
            PathFindResult::NoPathFound => WaypointPath::Failed(PathFailure::NoPath),
            PathFindResult::ResourceLimitExceeded(limit) => WaypointPath::Failed(PathFailure::LimitExceeded(limit)),
        }
    }
}

/// Outcome of the most recent hierarchy build, if any.
#[derive(Resource, Debug, Default, Clone)]
pub struct HierarchyStatus {
    pub last_build: Option<BuildReport>,
    pub builds: u32,
}
