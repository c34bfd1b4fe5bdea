use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

use crate::ai::fixed_math::FixedNum;
use super::types::{PathSegment, WaypointId};

pub type Segments = SmallVec<[PathSegment; 8]>;

/// Directed adjacency of one search level.
///
/// Every node of the level has an entry, possibly empty. Segment lists keep
/// insertion order; iteration over nodes is by ascending ID.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NavMesh {
    segments: BTreeMap<WaypointId, Segments>,
}

impl NavMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_node(&mut self, id: WaypointId) {
        self.segments.entry(id).or_default();
    }

    /// Drops `id` and every segment pointing at it.
    pub(crate) fn remove_node(&mut self, id: WaypointId) -> bool {
        if self.segments.remove(&id).is_none() {
            return false;
        }
        for list in self.segments.values_mut() {
            list.retain(|s| s.to != id);
        }
        true
    }

    pub fn contains(&self, id: WaypointId) -> bool {
        self.segments.contains_key(&id)
    }

    /// Adds `from -> to`, or updates its cost if the segment already exists.
    /// Returns true when a new segment was created.
    pub(crate) fn insert_segment(&mut self, from: WaypointId, to: WaypointId, cost: FixedNum) -> bool {
        let list = self.segments.entry(from).or_default();
        if let Some(existing) = list.iter_mut().find(|s| s.to == to) {
            existing.cost = cost;
            false
        } else {
            list.push(PathSegment { to, cost });
            true
        }
    }

    pub(crate) fn remove_segment(&mut self, from: WaypointId, to: WaypointId) -> bool {
        match self.segments.get_mut(&from) {
            Some(list) => {
                let before = list.len();
                list.retain(|s| s.to != to);
                list.len() != before
            }
            None => false,
        }
    }

    /// Removes every segment leaving or entering `id`, keeping the node.
    pub(crate) fn clear_node(&mut self, id: WaypointId) {
        if let Some(list) = self.segments.get_mut(&id) {
            list.clear();
        }
        for list in self.segments.values_mut() {
            list.retain(|s| s.to != id);
        }
    }

    pub(crate) fn clear_segments(&mut self) {
        for list in self.segments.values_mut() {
            list.clear();
        }
    }

    pub fn segments(&self, id: WaypointId) -> &[PathSegment] {
        self.segments.get(&id).map(|l| l.as_slice()).unwrap_or(&[])
    }

    pub fn cost(&self, from: WaypointId, to: WaypointId) -> Option<FixedNum> {
        self.segments(from).iter().find(|s| s.to == to).map(|s| s.cost)
    }

    /// True when there is a segment in either direction.
    pub fn connected(&self, a: WaypointId, b: WaypointId) -> bool {
        self.cost(a, b).is_some() || self.cost(b, a).is_some()
    }

    pub fn nodes(&self) -> impl Iterator<Item = WaypointId> + '_ {
        self.segments.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WaypointId, &[PathSegment])> + '_ {
        self.segments.iter().map(|(id, l)| (*id, l.as_slice()))
    }

    pub fn node_count(&self) -> usize {
        self.segments.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.values().map(|l| l.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
