use anyhow::{bail, Result};

use crate::constants::MAX_NODES;
use crate::nodeset::NodeSet;

/// Immutable VRPTW instance as handed over by the caller. Node 0 is the
/// depot; parsing and matrix construction happen upstream.
#[derive(Debug, Clone)]
pub struct ProblemData {
    pub num_nodes: usize,
    pub vehicle_capacity: i64,
    pub demands: Vec<i64>,
    pub service_times: Vec<f64>,
    pub tw_start: Vec<f64>,
    pub tw_end: Vec<f64>,
    pub dist_matrix: Vec<Vec<f64>>,
    pub time_matrix: Vec<Vec<f64>>,
    /// Candidate adjacency per node, self excluded.
    pub neighbors: Vec<Vec<usize>>,
    /// ng memory sets per node. An empty outer list degenerates to full
    /// memory, i.e. strict ESPPRC.
    pub ng_neighbor_lists: Vec<Vec<usize>>,
}

impl ProblemData {
    pub fn validate(&self) -> Result<()> {
        let n = self.num_nodes;
        if n < 2 {
            bail!("instance needs a depot and at least one customer, got {} nodes", n);
        }
        if n > MAX_NODES {
            bail!("instance has {} nodes, bitset width allows at most {}", n, MAX_NODES);
        }
        if self.demands.len() != n {
            bail!("demands has length {}, expected {}", self.demands.len(), n);
        }
        if self.service_times.len() != n {
            bail!("service_times has length {}, expected {}", self.service_times.len(), n);
        }
        if self.tw_start.len() != n || self.tw_end.len() != n {
            bail!("time windows have length {}/{}, expected {}", self.tw_start.len(), self.tw_end.len(), n);
        }
        if self.vehicle_capacity < 0 {
            bail!("vehicle capacity is negative: {}", self.vehicle_capacity);
        }
        if self.demands[0] != 0 {
            bail!("depot demand must be 0, got {}", self.demands[0]);
        }
        for i in 0..n {
            if self.demands[i] < 0 {
                bail!("demand of node {} is negative: {}", i, self.demands[i]);
            }
            if self.demands[i] > self.vehicle_capacity {
                bail!("demand of node {} exceeds vehicle capacity ({} > {})", i, self.demands[i], self.vehicle_capacity);
            }
            if self.service_times[i] < 0.0 {
                bail!("service time of node {} is negative: {}", i, self.service_times[i]);
            }
            if self.tw_start[i] < 0.0 {
                bail!("time window of node {} starts before 0: {}", i, self.tw_start[i]);
            }
            if self.tw_start[i] > self.tw_end[i] {
                bail!("time window of node {} is inverted: [{}, {}]", i, self.tw_start[i], self.tw_end[i]);
            }
        }
        Self::check_matrix(&self.dist_matrix, n, "distance")?;
        Self::check_matrix(&self.time_matrix, n, "time")?;
        if self.neighbors.len() != n {
            bail!("neighbors has length {}, expected {}", self.neighbors.len(), n);
        }
        for (i, list) in self.neighbors.iter().enumerate() {
            for &j in list {
                if j >= n {
                    bail!("neighbor {} of node {} is out of range", j, i);
                }
                if j == i {
                    bail!("node {} lists itself as a neighbor", i);
                }
            }
        }
        if !self.ng_neighbor_lists.is_empty() {
            if self.ng_neighbor_lists.len() != n {
                bail!("ng_neighbor_lists has length {}, expected {} or 0", self.ng_neighbor_lists.len(), n);
            }
            for (i, list) in self.ng_neighbor_lists.iter().enumerate() {
                for &j in list {
                    if j >= n {
                        bail!("ng neighbor {} of node {} is out of range", j, i);
                    }
                }
            }
        }
        Ok(())
    }

    fn check_matrix(matrix: &[Vec<f64>], n: usize, name: &str) -> Result<()> {
        if matrix.len() != n {
            bail!("{} matrix has {} rows, expected {}", name, matrix.len(), n);
        }
        for (i, row) in matrix.iter().enumerate() {
            if row.len() != n {
                bail!("{} matrix row {} has length {}, expected {}", name, i, row.len(), n);
            }
            for (j, &v) in row.iter().enumerate() {
                if v < 0.0 {
                    bail!("{} matrix entry ({}, {}) is negative: {}", name, i, j, v);
                }
            }
            if row[i] != 0.0 {
                bail!("{} matrix diagonal entry {} is nonzero: {}", name, i, row[i]);
            }
        }
        Ok(())
    }

    /// Per-node ng memory masks. Each mask always contains the node itself;
    /// an empty outer list yields universe masks, so no visit is ever
    /// forgotten.
    pub fn ng_masks(&self) -> Vec<NodeSet> {
        if self.ng_neighbor_lists.is_empty() {
            return vec![NodeSet::universe(); self.num_nodes];
        }
        (0..self.num_nodes)
            .map(|i| {
                let mut mask: NodeSet = self.ng_neighbor_lists[i].iter().copied().collect();
                mask.insert(i);
                mask
            })
            .collect()
    }

    pub fn horizon(&self) -> f64 {
        self.tw_end[0]
    }
}
