use bevy::prelude::*;
use rustc_hash::FxHashSet;
use std::time::Instant;

use crate::ai::error::{GraphError, GraphResult};
use crate::ai::fixed_math::FixedNum;
use crate::ai::graph::WaypointGraph;
use crate::ai::waypoint::WaypointId;
use super::astar::{AStar, AStarConfig, FoundPath, PathFindResult, SearchGraph};

/// One search level of a [`WaypointGraph`], optionally restricted to a node set.
///
/// Heuristic is the straight-line distance between node positions, which is
/// admissible as long as edge costs are at least the distance they span.
pub struct LevelView<'a> {
    graph: &'a WaypointGraph,
    level: u32,
    allowed: Option<&'a FxHashSet<WaypointId>>,
}

impl<'a> LevelView<'a> {
    pub fn new(graph: &'a WaypointGraph, level: u32) -> Self {
        Self { graph, level, allowed: None }
    }

    pub fn restricted(graph: &'a WaypointGraph, level: u32, allowed: &'a FxHashSet<WaypointId>) -> Self {
        Self { graph, level, allowed: Some(allowed) }
    }
}

impl SearchGraph for LevelView<'_> {
    type Node = WaypointId;

    fn neighbors(&self, node: WaypointId, out: &mut Vec<WaypointId>) {
        let Some(level) = self.graph.level(self.level) else { return };
        for seg in level.nav_mesh().segments(node) {
            if self.allowed.map_or(true, |set| set.contains(&seg.to)) {
                out.push(seg.to);
            }
        }
    }

    fn cost(&self, from: WaypointId, to: WaypointId) -> FixedNum {
        self.graph
            .edge_cost(from, to)
            .unwrap_or_else(|| self.heuristic(from, to))
    }

    fn heuristic(&self, node: WaypointId, goal: WaypointId) -> FixedNum {
        match (self.graph.position(node), self.graph.position(goal)) {
            (Some(a), Some(b)) => a.distance(b),
            _ => FixedNum::ZERO,
        }
    }
}

/// Node and time spending of one hierarchical query, across all its phases.
struct Budget {
    started: Instant,
    explored: usize,
}

/// Path queries over a built waypoint graph.
pub struct WaypointAStar<'g> {
    graph: &'g WaypointGraph,
    config: AStarConfig,
}

impl<'g> WaypointAStar<'g> {
    pub fn new(graph: &'g WaypointGraph, config: AStarConfig) -> Self {
        Self { graph, config }
    }

    /// Flat A* on the level both nodes live on.
    pub fn find_path(&self, start: WaypointId, goal: WaypointId) -> GraphResult<PathFindResult<WaypointId>> {
        let level = self.common_level(start, goal)?;
        let view = LevelView::new(self.graph, level);
        Ok(AStar::new(&view, self.config.clone()).find_path(start, goal))
    }

    /// Coarse-to-fine search.
    ///
    /// Finds a corridor on the highest level where both nodes have ancestors,
    /// then refines it one level at a time, searching only the children of
    /// the corridor. If a corridor turns out too narrow the level is searched
    /// unrestricted. Paths are usually, not always, optimal.
    ///
    /// The node and time limits cover the whole query, not each level.
    pub fn hierarchical_find_path(&self, start: WaypointId, goal: WaypointId) -> GraphResult<PathFindResult<WaypointId>> {
        let base = self.common_level(start, goal)?;
        let Some(top) = (base..self.graph.num_levels()).rev().find(|&l| {
            self.graph.ancestor_at_level(start, l).is_some() && self.graph.ancestor_at_level(goal, l).is_some()
        }) else {
            return self.find_path(start, goal);
        };
        if top == base {
            return self.find_path(start, goal);
        }

        let (Some(top_start), Some(top_goal)) = (
            self.graph.ancestor_at_level(start, top),
            self.graph.ancestor_at_level(goal, top),
        ) else {
            return self.find_path(start, goal);
        };
        let mut budget = Budget { started: Instant::now(), explored: 0 };
        let view = LevelView::new(self.graph, top);
        let mut corridor = match self.phase(&view, top_start, top_goal, &mut budget) {
            PathFindResult::Found(found) => found,
            other => return Ok(other),
        };

        for level in (base..top).rev() {
            let allowed: FxHashSet<WaypointId> = corridor
                .path
                .iter()
                .flat_map(|&c| self.graph.children(c))
                .collect();
            let (Some(from), Some(to)) = (
                self.graph.ancestor_at_level(start, level),
                self.graph.ancestor_at_level(goal, level),
            ) else {
                return Err(GraphError::InvalidState(format!("hierarchy is missing level {}", level)));
            };

            let restricted = LevelView::restricted(self.graph, level, &allowed);
            let result = match self.phase(&restricted, from, to, &mut budget) {
                PathFindResult::NoPathFound => {
                    debug!("[ASTAR] Corridor on level {} too narrow, searching whole level", level);
                    let view = LevelView::new(self.graph, level);
                    self.phase(&view, from, to, &mut budget)
                }
                other => other,
            };
            corridor = match result {
                PathFindResult::Found(found) => found,
                other => return Ok(other),
            };
        }

        Ok(PathFindResult::Found(FoundPath {
            path: corridor.path,
            cost: corridor.cost,
            nodes_explored: budget.explored,
        }))
    }

    /// One A* run limited to what is left of the query's budget.
    fn phase<G: SearchGraph<Node = WaypointId>>(
        &self,
        graph: &G,
        from: WaypointId,
        to: WaypointId,
        budget: &mut Budget,
    ) -> PathFindResult<WaypointId> {
        let config = AStarConfig {
            max_nodes_explored: self.config.max_nodes_explored.map(|max| max.saturating_sub(budget.explored)),
            max_time: self.config.max_time.map(|max| max.saturating_sub(budget.started.elapsed())),
            max_cost: self.config.max_cost,
        };
        let (result, explored) = AStar::new(graph, config).search(from, to);
        budget.explored += explored;
        result
    }

    fn common_level(&self, start: WaypointId, goal: WaypointId) -> GraphResult<u32> {
        let ls = self.graph.search_level_of(start).ok_or_else(|| GraphError::unknown(start))?;
        let lg = self.graph.search_level_of(goal).ok_or_else(|| GraphError::unknown(goal))?;
        if ls != lg {
            return Err(GraphError::invalid_reference(
                goal,
                format!("goal is on level {}, start on level {}", lg, ls),
            ));
        }
        Ok(ls)
    }
}
