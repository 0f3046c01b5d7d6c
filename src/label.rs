use crate::constants::EPS;
use crate::nodeset::NodeSet;

/// Parent sentinel for root labels.
pub const ROOT: usize = usize::MAX;

/// Partial path state. `time` is the earliest service start at `node_id` in
/// the forward search and the latest admissible service start in the
/// backward search. Dominated labels are tombstoned via `active`, never
/// removed, so arena indices stay valid.
#[derive(Debug, Clone)]
pub struct Label {
    pub node_id: usize,
    pub parent_index: usize,
    pub cost: f64,
    pub time: f64,
    pub load: i64,
    pub visited_mask: NodeSet,
    pub active: bool,
}

impl Label {
    pub fn root(node_id: usize, time: f64) -> Self {
        let mut visited_mask = NodeSet::new();
        visited_mask.insert(node_id);
        Label {
            node_id,
            parent_index: ROOT,
            cost: 0.0,
            time,
            load: 0,
            visited_mask,
            active: true,
        }
    }

    /// Forward dominance: weakly better on cost, time and load, and a visit
    /// memory that forbids no more successors than `other`'s. The subset test
    /// is what keeps ng-relaxed dominance sound: a smaller memory can only
    /// reach more.
    pub fn dominates(&self, other: &Label) -> bool {
        self.cost <= other.cost + EPS
            && self.time <= other.time + EPS
            && self.load <= other.load
            && self.visited_mask.is_subset_of(&other.visited_mask)
    }

    /// Backward dominance mirrors the forward rule with the time inequality
    /// reversed: a later admissible start dominates an earlier one.
    pub fn dominates_backward(&self, other: &Label) -> bool {
        self.cost <= other.cost + EPS
            && self.time >= other.time - EPS
            && self.load <= other.load
            && self.visited_mask.is_subset_of(&other.visited_mask)
    }
}

/// Append-only label pool. Indices are stable for the lifetime of a solve;
/// parent references are always indices, never pointers.
pub struct LabelArena {
    labels: Vec<Label>,
}

impl LabelArena {
    pub fn with_capacity(capacity: usize) -> Self {
        LabelArena { labels: Vec::with_capacity(capacity) }
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }

    pub fn push(&mut self, label: Label) -> usize {
        self.labels.push(label);
        self.labels.len() - 1
    }

    pub fn get(&self, index: usize) -> &Label {
        &self.labels[index]
    }

    pub fn deactivate(&mut self, index: usize) {
        self.labels[index].active = false;
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Node sequence from the root to `index`. Parents are strictly older
    /// than their children, so the walk terminates.
    pub fn path_from_root(&self, index: usize) -> Vec<usize> {
        let mut path = Vec::new();
        let mut curr = index;
        while curr != ROOT {
            path.push(self.labels[curr].node_id);
            curr = self.labels[curr].parent_index;
        }
        path.reverse();
        path
    }
}
