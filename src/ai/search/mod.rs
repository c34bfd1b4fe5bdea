mod astar;
mod waypoint_search;


pub use astar::{AStar, AStarConfig, FoundPath, PathFindResult, ResourceLimit, SearchGraph, SearchNode};
pub use waypoint_search::{LevelView, WaypointAStar};
