use bevy::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::{Duration, Instant};

use crate::ai::fixed_math::FixedNum;

/// What A* needs to know about a graph.
///
/// The heuristic must never overestimate the true remaining cost, otherwise
/// returned paths are not guaranteed to be optimal. Costs must be non-negative.
pub trait SearchGraph {
    type Node: Copy + Eq + Hash + Debug;

    /// Appends the successors of `node` to `out`.
    fn neighbors(&self, node: Self::Node, out: &mut Vec<Self::Node>);

    fn cost(&self, from: Self::Node, to: Self::Node) -> FixedNum;

    fn heuristic(&self, node: Self::Node, goal: Self::Node) -> FixedNum;
}

/// Optional safety valves. `None` means unbounded.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AStarConfig {
    pub max_nodes_explored: Option<usize>,
    pub max_time: Option<Duration>,
    pub max_cost: Option<FixedNum>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceLimit {
    NodesExplored,
    Time,
    Cost,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FoundPath<N> {
    /// Start and goal included.
    pub path: Vec<N>,
    pub cost: FixedNum,
    pub nodes_explored: usize,
}

/// Outcome of one query. "No path" is an ordinary answer, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathFindResult<N> {
    Found(FoundPath<N>),
    NoPathFound,
    ResourceLimitExceeded(ResourceLimit),
}

impl<N> PathFindResult<N> {
    pub fn is_found(&self) -> bool {
        matches!(self, PathFindResult::Found(_))
    }

    pub fn found(self) -> Option<FoundPath<N>> {
        match self {
            PathFindResult::Found(p) => Some(p),
            _ => None,
        }
    }
}

/// Per-node bookkeeping for one query.
#[derive(Clone, Copy, Debug)]
pub struct SearchNode<N> {
    pub node: N,
    pub parent: Option<N>,
    pub g: FixedNum,
    pub h: FixedNum,
    closed: bool,
}

impl<N> SearchNode<N> {
    pub fn f(&self) -> FixedNum {
        self.g + self.h
    }
}

/// Open-set entry. Ordered so the max-heap pops lowest f, then lowest h,
/// then the earliest push.
struct OpenState<N> {
    f: FixedNum,
    h: FixedNum,
    seq: u64,
    node: N,
}

impl<N> PartialEq for OpenState<N> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<N> Eq for OpenState<N> {}

impl<N> Ord for OpenState<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<N> PartialOrd for OpenState<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Best-first search over any [`SearchGraph`].
///
/// The open set is a binary heap ordered by f, then h, then insertion order.
/// Relaxed nodes are pushed again and stale heap entries are skipped on pop.
pub struct AStar<'g, G: SearchGraph> {
    graph: &'g G,
    config: AStarConfig,
}

impl<'g, G: SearchGraph> AStar<'g, G> {
    pub fn new(graph: &'g G, config: AStarConfig) -> Self {
        Self { graph, config }
    }

    pub fn find_path(&self, start: G::Node, goal: G::Node) -> PathFindResult<G::Node> {
        self.search(start, goal).0
    }

    /// Like [`find_path`](Self::find_path), also returning the number of
    /// expansions whatever the outcome.
    pub(crate) fn search(&self, start: G::Node, goal: G::Node) -> (PathFindResult<G::Node>, usize) {
        let started = Instant::now();
        let mut records: FxHashMap<G::Node, SearchNode<G::Node>> = FxHashMap::default();
        let mut open: BinaryHeap<OpenState<G::Node>> = BinaryHeap::new();
        let mut seq: u64 = 0;
        let mut explored: usize = 0;
        let mut successors = Vec::new();

        let h0 = self.graph.heuristic(start, goal);
        records.insert(start, SearchNode { node: start, parent: None, g: FixedNum::ZERO, h: h0, closed: false });
        open.push(OpenState { f: h0, h: h0, seq, node: start });

        while let Some(OpenState { f, node: current, .. }) = open.pop() {
            let Some(record) = records.get(&current).copied() else { continue };
            if record.closed || record.f() != f {
                continue;
            }

            if let Some(max) = self.config.max_cost {
                if record.g > max {
                    debug!("[ASTAR] Cost limit {} passed ({:?} -> {:?})", max, start, goal);
                    return (PathFindResult::ResourceLimitExceeded(ResourceLimit::Cost), explored);
                }
            }

            if current == goal {
                let path = reconstruct_path(&records, goal);
                debug!("[ASTAR] Found path of {} nodes, cost {}, {} explored", path.len(), record.g, explored);
                return (PathFindResult::Found(FoundPath { path, cost: record.g, nodes_explored: explored }), explored);
            }

            if let Some(limit) = self.limit_hit(explored, started) {
                debug!("[ASTAR] {:?} limit hit after {} nodes ({:?} -> {:?})", limit, explored, start, goal);
                return (PathFindResult::ResourceLimitExceeded(limit), explored);
            }

            if let Some(r) = records.get_mut(&current) {
                r.closed = true;
            }
            explored += 1;
            crate::profile_log!(explored, "[ASTAR] {} nodes explored, open set {}", explored, open.len());

            successors.clear();
            self.graph.neighbors(current, &mut successors);
            for &next in &successors {
                let tentative = record.g + self.graph.cost(current, next);
                let improved = match records.get(&next) {
                    Some(existing) => !existing.closed && tentative < existing.g,
                    None => true,
                };
                if !improved {
                    continue;
                }
                let h = self.graph.heuristic(next, goal);
                records.insert(next, SearchNode { node: next, parent: Some(current), g: tentative, h, closed: false });
                seq += 1;
                open.push(OpenState { f: tentative + h, h, seq, node: next });
            }
        }

        debug!("[ASTAR] No path {:?} -> {:?} after {} nodes", start, goal, explored);
        (PathFindResult::NoPathFound, explored)
    }

    /// Checked before expanding a node that is not the goal. A zero time
    /// budget is spent before the first expansion.
    fn limit_hit(&self, explored: usize, started: Instant) -> Option<ResourceLimit> {
        if let Some(max) = self.config.max_nodes_explored {
            if explored >= max {
                return Some(ResourceLimit::NodesExplored);
            }
        }
        if let Some(max) = self.config.max_time {
            if started.elapsed() >= max {
                return Some(ResourceLimit::Time);
            }
        }
        None
    }
}

fn reconstruct_path<N: Copy + Eq + Hash>(records: &FxHashMap<N, SearchNode<N>>, goal: N) -> Vec<N> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(parent) = records.get(&current).and_then(|r| r.parent) {
        path.push(parent);
        current = parent;
    }
    path.reverse();
    path
}
