//! Error types for waypoint graph construction and state machines.
//!
//! Structural and configuration errors are programmer errors and are returned
//! immediately. "No path" and "search limit hit" are NOT errors: they are
//! ordinary [`PathFindResult`](crate::ai::search::PathFindResult) values.

use thiserror::Error;

use super::fixed_math::FixedVec3;
use super::waypoint::WaypointId;

/// Result type alias for graph and builder operations.
pub type GraphResult<T> = Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    /// An operation referenced an ID that is not in the expected graph or level.
    #[error("invalid reference to waypoint {id}: {reason}")]
    InvalidReference { id: WaypointId, reason: String },

    /// A node with this ID already exists somewhere in the graph.
    #[error("waypoint {0} already exists in the graph")]
    DuplicateId(WaypointId),

    /// A coordinate lies outside the range distances can be computed over.
    #[error("position {0:?} is outside the supported coordinate range")]
    PositionOutOfRange(FixedVec3),

    #[error("edge {from} -> {to} has negative cost {cost}")]
    NegativeCost { from: WaypointId, to: WaypointId, cost: f32 },

    /// A structural precondition was violated.
    #[error("invalid graph state: {0}")]
    InvalidState(String),

    /// The builder was configured with an unusable parameter.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("navmesh parse failed: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("graph file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("graph file encoding failed: {0}")]
    Encode(#[from] bincode::Error),

    #[error("unsupported graph file version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

impl GraphError {
    pub(crate) fn invalid_reference(id: WaypointId, reason: impl Into<String>) -> Self {
        GraphError::InvalidReference { id, reason: reason.into() }
    }

    pub(crate) fn unknown(id: WaypointId) -> Self {
        Self::invalid_reference(id, "not present in the graph")
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsmError {
    #[error("state {0} is not registered with the state machine")]
    UnknownState(String),

    /// A second, different target for an existing (event, from-state) pair.
    #[error("transition on {event} from {from} already leads to {existing}, refusing {requested}")]
    ConflictingTransition {
        event: String,
        from: String,
        existing: String,
        requested: String,
    },
}
