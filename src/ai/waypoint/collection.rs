use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::ai::fixed_math::{FixedNum, FixedVec3};
use super::types::WaypointId;

/// What a collection remembers about one child.
///
/// The graph owns the child node; this is a cached view refreshed through
/// [`WaypointCollection::update_child`] whenever the child moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRef {
    pub id: WaypointId,
    pub position: FixedVec3,
    pub radius: FixedNum,
}

/// A super-node grouping nodes of the level directly below.
///
/// Position is the centroid of the children, recomputed on every insert and
/// removal. The radius bounds every child: `distance(centroid, child) + child.radius`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WaypointCollection {
    id: WaypointId,
    max_size: usize,
    children: SmallVec<[ChildRef; 8]>,
    position: FixedVec3,
    radius: FixedNum,
}

impl WaypointCollection {
    pub fn new(id: WaypointId, max_size: usize) -> Self {
        Self {
            id,
            max_size,
            children: SmallVec::new(),
            position: FixedVec3::ZERO,
            radius: FixedNum::ZERO,
        }
    }

    pub fn id(&self) -> WaypointId {
        self.id
    }

    pub fn position(&self) -> FixedVec3 {
        self.position
    }

    pub fn radius(&self) -> FixedNum {
        self.radius
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.children.len() >= self.max_size
    }

    pub fn contains(&self, id: WaypointId) -> bool {
        self.children.iter().any(|c| c.id == id)
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[ChildRef] {
        &self.children
    }

    pub fn child_ids(&self) -> impl Iterator<Item = WaypointId> + '_ {
        self.children.iter().map(|c| c.id)
    }

    /// Returns false without mutating when full or when the child is already present.
    pub fn insert(&mut self, child: ChildRef) -> bool {
        if self.is_full() || self.contains(child.id) {
            return false;
        }
        self.children.push(child);
        self.recompute();
        true
    }

    pub fn remove(&mut self, id: WaypointId) -> bool {
        let Some(index) = self.children.iter().position(|c| c.id == id) else {
            return false;
        };
        self.children.remove(index);
        self.recompute();
        true
    }

    /// Refreshes the cached position/radius of a child. Returns false if absent.
    pub fn update_child(&mut self, child: ChildRef) -> bool {
        let Some(slot) = self.children.iter_mut().find(|c| c.id == child.id) else {
            return false;
        };
        *slot = child;
        self.recompute();
        true
    }

    pub(crate) fn clear(&mut self) {
        self.children.clear();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.position = FixedVec3::centroid(self.children.iter().map(|c| c.position));
        let center = self.position;
        self.radius = self
            .children
            .iter()
            .map(|c| center.distance(c.position) + c.radius)
            .max()
            .unwrap_or(FixedNum::ZERO);
    }
}
