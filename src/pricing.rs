use std::collections::HashSet;

use anyhow::{bail, Result};
use itertools::Itertools;
use log::debug;

use crate::constants::{
    BACKWARD_PASS_MARK, BUCKET_MARGIN, EPS, FORWARD_PASS_MARK, LABEL_POOL_RESERVE,
    MAX_ROUTES_RETURNED, NEG_RC_EPS,
};
use crate::data::ProblemData;
use crate::graph::BucketGraph;
use crate::label::{Label, LabelArena, ROOT};
use crate::nodeset::NodeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Forward labeling only, routes closed at the depot. Always correct.
    Monodirectional,
    /// Forward and backward labeling with halfway pruning, joined at
    /// intermediate nodes.
    Bidirectional,
}

/// Counters from the most recent solve.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolveStats {
    pub forward_labels: usize,
    pub backward_labels: usize,
    pub dominated: usize,
    pub columns: usize,
}

/// ESPPRC pricer over a fixed instance. Graph topology and ng masks are
/// built once; every `solve` starts from cleared arenas and is fully
/// deterministic for identical inputs.
pub struct Pricer {
    data: ProblemData,
    fwd_graph: BucketGraph,
    bwd_graph: BucketGraph,
    ng_masks: Vec<NodeSet>,
    bucket_step: f64,
    num_buckets: usize,

    pub mode: SearchMode,
    pub forward_pass_mark: f64,
    pub backward_pass_mark: f64,
    pub max_routes: usize,
    /// Per-route fixed charge added to every candidate's reduced cost.
    pub vehicle_fixed_cost: f64,

    fwd_labels: LabelArena,
    bwd_labels: LabelArena,
    fwd_store: Vec<Vec<usize>>,
    bwd_store: Vec<Vec<usize>>,
    fwd_buckets: Vec<Vec<usize>>,
    bwd_buckets: Vec<Vec<usize>>,
    forbidden_mask: Vec<bool>,
    stats: SolveStats,
}

impl Pricer {
    pub fn new(data: ProblemData, bucket_step: f64) -> Result<Self> {
        data.validate()?;
        if !(bucket_step > 0.0) {
            bail!("bucket step must be positive, got {}", bucket_step);
        }

        let fwd_graph = BucketGraph::build_forward(&data);
        let bwd_graph = BucketGraph::build_backward(&data);
        let ng_masks = data.ng_masks();
        let max_tw_end = data.tw_end.iter().cloned().fold(0.0, f64::max);
        let num_buckets = (max_tw_end / bucket_step).ceil() as usize + BUCKET_MARGIN;

        debug!(
            "graphs built: {} forward arcs, {} backward arcs, {} buckets",
            fwd_graph.num_arcs(),
            bwd_graph.num_arcs(),
            num_buckets
        );

        let num_nodes = data.num_nodes;
        Ok(Pricer {
            data,
            fwd_graph,
            bwd_graph,
            ng_masks,
            bucket_step,
            num_buckets,
            mode: SearchMode::Bidirectional,
            forward_pass_mark: FORWARD_PASS_MARK,
            backward_pass_mark: BACKWARD_PASS_MARK,
            max_routes: MAX_ROUTES_RETURNED,
            vehicle_fixed_cost: 0.0,
            fwd_labels: LabelArena::with_capacity(LABEL_POOL_RESERVE),
            bwd_labels: LabelArena::with_capacity(LABEL_POOL_RESERVE),
            fwd_store: vec![Vec::new(); num_nodes],
            bwd_store: vec![Vec::new(); num_nodes],
            fwd_buckets: vec![Vec::new(); num_buckets],
            bwd_buckets: vec![Vec::new(); num_buckets],
            forbidden_mask: vec![false; num_nodes * num_nodes],
            stats: SolveStats::default(),
        })
    }

    /// Prices one round: runs the configured search against `duals` and
    /// returns up to `max_routes` depot-to-depot routes with reduced cost
    /// below `-NEG_RC_EPS`, best first. An empty result means no improving
    /// column exists.
    pub fn solve(&mut self, duals: &[f64], forbidden_arcs: &[(usize, usize)]) -> Result<Vec<Vec<usize>>> {
        if duals.len() != self.data.num_nodes {
            bail!("duals has length {}, expected {}", duals.len(), self.data.num_nodes);
        }
        for &(u, v) in forbidden_arcs {
            if u >= self.data.num_nodes || v >= self.data.num_nodes {
                bail!("forbidden arc ({}, {}) is out of range", u, v);
            }
        }

        self.reset(forbidden_arcs);
        self.run_forward_labeling(duals);

        let candidates = match self.mode {
            SearchMode::Bidirectional => {
                self.run_backward_labeling(duals);
                self.merge_and_collect(duals)
            }
            SearchMode::Monodirectional => self.close_at_depot(duals),
        };

        // The same route can surface from several join nodes; keep its best
        // (first after the stable sort) occurrence.
        let mut seen: HashSet<Vec<usize>> = HashSet::new();
        let routes: Vec<Vec<usize>> = candidates
            .into_iter()
            .sorted_by(|a, b| a.0.partial_cmp(&b.0).unwrap())
            .filter(|(_, path)| seen.insert(path.clone()))
            .map(|(_, path)| path)
            .take(self.max_routes)
            .collect();

        self.stats.forward_labels = self.fwd_labels.len();
        self.stats.backward_labels = self.bwd_labels.len();
        self.stats.columns = routes.len();
        debug!(
            "pricing round: {} forward labels, {} backward labels, {} dominated, {} columns",
            self.stats.forward_labels, self.stats.backward_labels, self.stats.dominated, self.stats.columns
        );

        Ok(routes)
    }

    pub fn stats(&self) -> SolveStats {
        self.stats
    }

    fn reset(&mut self, forbidden_arcs: &[(usize, usize)]) {
        let n = self.data.num_nodes;
        self.fwd_labels.clear();
        self.bwd_labels.clear();
        self.fwd_store.iter_mut().for_each(Vec::clear);
        self.bwd_store.iter_mut().for_each(Vec::clear);
        self.fwd_buckets = vec![Vec::new(); self.num_buckets];
        self.bwd_buckets = vec![Vec::new(); self.num_buckets];
        self.forbidden_mask.iter_mut().for_each(|x| *x = false);
        for &(u, v) in forbidden_arcs {
            self.forbidden_mask[u * n + v] = true;
        }
        self.stats = SolveStats::default();
    }

    fn is_arc_forbidden(&self, u: usize, v: usize) -> bool {
        self.forbidden_mask[u * self.data.num_nodes + v]
    }

    fn bucket_index(&self, time: f64) -> usize {
        (time / self.bucket_step) as usize
    }

    fn push_bucket(buckets: &mut Vec<Vec<usize>>, bucket: usize, index: usize) {
        if bucket >= buckets.len() {
            buckets.resize_with(bucket + 1, Vec::new);
        }
        buckets[bucket].push(index);
    }

    fn run_forward_labeling(&mut self, duals: &[f64]) {
        let root = Label::root(0, self.data.tw_start[0]);
        let root_bucket = self.bucket_index(root.time);
        let root_idx = self.fwd_labels.push(root);
        self.fwd_store[0].push(root_idx);
        Self::push_bucket(&mut self.fwd_buckets, root_bucket, root_idx);

        // In bidirectional mode labels past the mark stay mergeable but are
        // not extended further.
        let cutoff = match self.mode {
            SearchMode::Bidirectional => self.forward_pass_mark * self.data.horizon(),
            SearchMode::Monodirectional => f64::INFINITY,
        };

        let mut b = 0;
        while b < self.fwd_buckets.len() {
            // Positional iteration: extensions may append to this bucket but
            // never invalidate already-recorded indices.
            let mut k = 0;
            while k < self.fwd_buckets[b].len() {
                let curr_idx = self.fwd_buckets[b][k];
                k += 1;
                let curr = self.fwd_labels.get(curr_idx).clone();
                if !curr.active || curr.time > cutoff {
                    continue;
                }
                self.extend_forward(curr_idx, &curr, duals);
            }
            b += 1;
        }
    }

    fn extend_forward(&mut self, curr_idx: usize, curr: &Label, duals: &[f64]) {
        for a in 0..self.fwd_graph.outgoing[curr.node_id].len() {
            let arc = self.fwd_graph.outgoing[curr.node_id][a];
            let next = arc.target;
            if next == 0 {
                continue; // closing at the depot is the collector's job
            }
            if curr.visited_mask.contains(next) {
                continue;
            }
            if self.is_arc_forbidden(curr.node_id, next) {
                continue;
            }
            let new_load = curr.load + arc.demand;
            if new_load > self.data.vehicle_capacity {
                continue;
            }
            let arrival = curr.time + arc.duration;
            let start_time = arrival.max(self.data.tw_start[next]);
            if start_time > self.data.tw_end[next] {
                continue;
            }

            let new_label = Label {
                node_id: next,
                parent_index: curr_idx,
                cost: curr.cost + arc.cost - duals[next],
                time: start_time,
                load: new_load,
                visited_mask: curr.visited_mask.apply_ng_relaxation(&self.ng_masks[next], next),
                active: true,
            };

            if self.check_and_update_dominance(next, &new_label, false) {
                self.stats.dominated += 1;
                continue;
            }

            let bucket = self.bucket_index(new_label.time);
            let new_idx = self.fwd_labels.push(new_label);
            self.fwd_store[next].push(new_idx);
            Self::push_bucket(&mut self.fwd_buckets, bucket, new_idx);
        }
    }

    fn run_backward_labeling(&mut self, duals: &[f64]) {
        let root = Label::root(0, self.data.tw_end[0]);
        let root_bucket = self.bucket_index(root.time);
        let root_idx = self.bwd_labels.push(root);
        self.bwd_store[0].push(root_idx);
        Self::push_bucket(&mut self.bwd_buckets, root_bucket, root_idx);

        let cutoff = self.backward_pass_mark * self.data.horizon();

        // Time runs backward, so buckets are drained in descending order.
        let mut b = self.bwd_buckets.len();
        while b > 0 {
            b -= 1;
            let mut k = 0;
            while k < self.bwd_buckets[b].len() {
                let curr_idx = self.bwd_buckets[b][k];
                k += 1;
                let curr = self.bwd_labels.get(curr_idx).clone();
                if !curr.active || curr.time < cutoff {
                    continue;
                }
                self.extend_backward(curr_idx, &curr, duals);
            }
        }
    }

    fn extend_backward(&mut self, curr_idx: usize, curr: &Label, duals: &[f64]) {
        for a in 0..self.bwd_graph.outgoing[curr.node_id].len() {
            let arc = self.bwd_graph.outgoing[curr.node_id][a];
            let prev = arc.target;
            if prev == 0 {
                continue;
            }
            if curr.visited_mask.contains(prev) {
                continue;
            }
            // the physical arc runs prev -> current
            if self.is_arc_forbidden(prev, curr.node_id) {
                continue;
            }
            let new_load = curr.load + arc.demand;
            if new_load > self.data.vehicle_capacity {
                continue;
            }
            // latest admissible service start at prev
            let new_time = (curr.time - arc.duration).min(self.data.tw_end[prev]);
            if new_time < self.data.tw_start[prev] {
                continue;
            }

            let new_label = Label {
                node_id: prev,
                parent_index: curr_idx,
                cost: curr.cost + arc.cost - duals[prev],
                time: new_time,
                load: new_load,
                visited_mask: curr.visited_mask.apply_ng_relaxation(&self.ng_masks[prev], prev),
                active: true,
            };

            if self.check_and_update_dominance(prev, &new_label, true) {
                self.stats.dominated += 1;
                continue;
            }

            let bucket = self.bucket_index(new_label.time);
            let new_idx = self.bwd_labels.push(new_label);
            self.bwd_store[prev].push(new_idx);
            Self::push_bucket(&mut self.bwd_buckets, bucket, new_idx);
        }
    }

    /// Dominance against every surviving label at `node`. Returns true if an
    /// incumbent weakly dominates `new_label`; otherwise tombstones every
    /// incumbent the candidate dominates. Incumbents win ties.
    fn check_and_update_dominance(&mut self, node: usize, new_label: &Label, backward: bool) -> bool {
        let (arena, store) = if backward {
            (&mut self.bwd_labels, &self.bwd_store[node])
        } else {
            (&mut self.fwd_labels, &self.fwd_store[node])
        };

        for &idx in store {
            let old = arena.get(idx);
            if !old.active {
                continue;
            }
            let old_wins = if backward {
                old.dominates_backward(new_label)
            } else {
                old.dominates(new_label)
            };
            if old_wins {
                return true;
            }
        }

        for &idx in store {
            let old = arena.get(idx);
            if !old.active {
                continue;
            }
            let new_wins = if backward {
                new_label.dominates_backward(old)
            } else {
                new_label.dominates(old)
            };
            if new_wins {
                arena.deactivate(idx);
            }
        }

        false
    }

    /// Monodirectional collection: close every surviving label back to the
    /// depot over the raw matrices.
    fn close_at_depot(&self, duals: &[f64]) -> Vec<(f64, Vec<usize>)> {
        let mut completions = Vec::new();
        for v in 1..self.data.num_nodes {
            if self.is_arc_forbidden(v, 0) {
                continue;
            }
            for &idx in &self.fwd_store[v] {
                let label = self.fwd_labels.get(idx);
                if !label.active {
                    continue;
                }
                let arrival = label.time + self.data.service_times[v] + self.data.time_matrix[v][0];
                if arrival > self.data.tw_end[0] {
                    continue;
                }
                let total = label.cost + self.data.dist_matrix[v][0] - duals[0] + self.vehicle_fixed_cost;
                if total < -NEG_RC_EPS {
                    let mut path = self.fwd_labels.path_from_root(idx);
                    path.push(0);
                    completions.push((total, path));
                }
            }
        }
        completions
    }

    /// Bidirectional collection: join forward and backward labels at every
    /// non-depot node.
    fn merge_and_collect(&self, duals: &[f64]) -> Vec<(f64, Vec<usize>)> {
        let mut completions = Vec::new();
        for m in 1..self.data.num_nodes {
            for &f_idx in &self.fwd_store[m] {
                let fwd = self.fwd_labels.get(f_idx);
                if !fwd.active {
                    continue;
                }
                for &b_idx in &self.bwd_store[m] {
                    let bwd = self.bwd_labels.get(b_idx);
                    if !bwd.active {
                        continue;
                    }
                    // m is on both sides, so its demand is counted twice
                    if fwd.load + bwd.load - self.data.demands[m] > self.data.vehicle_capacity {
                        continue;
                    }
                    if fwd.time > bwd.time + EPS {
                        continue;
                    }
                    if fwd.visited_mask.intersects_excluding(&bwd.visited_mask, m) {
                        continue;
                    }
                    // m's dual was deducted on both sides, put one back
                    let total = fwd.cost + bwd.cost + duals[m] + self.vehicle_fixed_cost;
                    if total < -NEG_RC_EPS {
                        let mut path = self.fwd_labels.path_from_root(f_idx);
                        let mut curr = bwd.parent_index;
                        while curr != ROOT {
                            path.push(self.bwd_labels.get(curr).node_id);
                            curr = self.bwd_labels.get(curr).parent_index;
                        }
                        completions.push((total, path));
                    }
                }
            }
        }
        completions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_instances::{five_node_line, reduced_cost, simulate_route, three_node_line};

    fn pricer(data: ProblemData, mode: SearchMode) -> Pricer {
        let mut pricer = Pricer::new(data, 1.0).unwrap();
        pricer.mode = mode;
        pricer
    }

    fn as_set(routes: &[Vec<usize>]) -> HashSet<Vec<usize>> {
        routes.iter().cloned().collect()
    }

    #[test]
    fn test_trivial_three_node_monodirectional() {
        let data = three_node_line(2);
        let duals = [0.0, 10.0, 10.0];
        let mut pricer = pricer(data.clone(), SearchMode::Monodirectional);
        let routes = pricer.solve(&duals, &[]).unwrap();

        assert_eq!(routes.len(), 4);
        // the two-customer tours tie at -16 and come first
        assert_eq!(
            as_set(&routes[..2]),
            as_set(&[vec![0, 1, 2, 0], vec![0, 2, 1, 0]])
        );
        assert_eq!(routes[2], vec![0, 1, 0]);
        assert_eq!(routes[3], vec![0, 2, 0]);

        for route in &routes {
            assert!(simulate_route(&data, route).is_some());
            assert!(reduced_cost(&data, &duals, route) < -NEG_RC_EPS);
        }
    }

    #[test]
    fn test_trivial_three_node_bidirectional() {
        let data = three_node_line(2);
        let duals = [0.0, 10.0, 10.0];
        let mut pricer = pricer(data.clone(), SearchMode::Bidirectional);
        let routes = pricer.solve(&duals, &[]).unwrap();

        assert_eq!(routes.len(), 4);
        assert_eq!(
            as_set(&routes[..2]),
            as_set(&[vec![0, 1, 2, 0], vec![0, 2, 1, 0]])
        );
        assert_eq!(routes[2], vec![0, 1, 0]);
        assert_eq!(routes[3], vec![0, 2, 0]);

        for route in &routes {
            assert!(simulate_route(&data, route).is_some());
            assert!(reduced_cost(&data, &duals, route) < -NEG_RC_EPS);
        }
    }

    #[test]
    fn test_capacity_one_single_customer_routes() {
        let duals = [0.0, 10.0, 10.0];
        for mode in [SearchMode::Monodirectional, SearchMode::Bidirectional] {
            let mut pricer = pricer(three_node_line(1), mode);
            let routes = pricer.solve(&duals, &[]).unwrap();
            assert_eq!(
                as_set(&routes),
                as_set(&[vec![0, 1, 0], vec![0, 2, 0]]),
                "mode {:?}",
                mode
            );
        }
    }

    #[test]
    fn test_zero_duals_no_columns() {
        let duals = [0.0, 0.0, 0.0];
        for mode in [SearchMode::Monodirectional, SearchMode::Bidirectional] {
            let mut pricer = pricer(three_node_line(2), mode);
            assert!(pricer.solve(&duals, &[]).unwrap().is_empty(), "mode {:?}", mode);
        }
    }

    #[test]
    fn test_forbidden_arc_honored() {
        let duals = [0.0, 10.0, 10.0];
        for mode in [SearchMode::Monodirectional, SearchMode::Bidirectional] {
            let mut pricer = pricer(three_node_line(2), mode);
            let routes = pricer.solve(&duals, &[(0, 1)]).unwrap();
            assert!(!routes.is_empty());
            for route in &routes {
                for pair in route.windows(2) {
                    assert_ne!((pair[0], pair[1]), (0, 1), "mode {:?}", mode);
                }
            }
            assert_eq!(
                as_set(&routes),
                as_set(&[vec![0, 2, 0], vec![0, 2, 1, 0]]),
                "mode {:?}",
                mode
            );
        }
    }

    #[test]
    fn test_forbidden_closing_arc() {
        let duals = [0.0, 10.0, 10.0];
        for mode in [SearchMode::Monodirectional, SearchMode::Bidirectional] {
            let mut pricer = pricer(three_node_line(2), mode);
            let routes = pricer.solve(&duals, &[(1, 0)]).unwrap();
            assert_eq!(
                as_set(&routes),
                as_set(&[vec![0, 2, 0], vec![0, 1, 2, 0]]),
                "mode {:?}",
                mode
            );
        }
    }

    #[test]
    fn test_solve_is_deterministic() {
        let duals = [0.0, 10.0, 10.0];
        let mut pricer = pricer(three_node_line(2), SearchMode::Bidirectional);
        let first = pricer.solve(&duals, &[]).unwrap();
        let second = pricer.solve(&duals, &[]).unwrap();
        assert_eq!(first, second);

        // a forbidden-arc solve in between leaves no residue
        pricer.solve(&duals, &[(0, 1)]).unwrap();
        let third = pricer.solve(&duals, &[]).unwrap();
        assert_eq!(first, third);
    }

    #[test]
    fn test_unreachable_node_contributes_nothing() {
        let mut data = three_node_line(2);
        data.tw_end[2] = 0.5; // shut before anyone can arrive
        let duals = [0.0, 10.0, 10.0];
        let mut pricer = pricer(data, SearchMode::Monodirectional);
        let routes = pricer.solve(&duals, &[]).unwrap();
        assert_eq!(routes, vec![vec![0, 1, 0]]);
        assert!(pricer.fwd_store[2].is_empty());
    }

    #[test]
    fn test_service_times_enter_propagation() {
        let mut data = three_node_line(2);
        data.service_times = vec![0.0, 5.0, 5.0];
        // reaching 2 after serving 1 arrives at 1 + 5 + 1 = 7, too late
        data.tw_end[2] = 6.9;
        let duals = [0.0, 10.0, 10.0];
        let mut pricer = pricer(data, SearchMode::Monodirectional);
        let routes = pricer.solve(&duals, &[]).unwrap();
        assert_eq!(
            as_set(&routes),
            as_set(&[vec![0, 1, 0], vec![0, 2, 0], vec![0, 2, 1, 0]])
        );
    }

    #[test]
    fn test_ng_memory_admits_short_cycle() {
        // singleton ng masks forget every visit on departure
        let mut data = three_node_line(3);
        data.demands = vec![0, 1, 1];
        data.ng_neighbor_lists = vec![vec![], vec![], vec![]];
        let duals = [0.0, 10.0, 10.0];
        let mut pricer1 = pricer(data, SearchMode::Monodirectional);
        let routes = pricer1.solve(&duals, &[]).unwrap();
        assert!(routes.contains(&vec![0, 1, 2, 1, 0]));

        // full memory forbids the revisit
        let mut data = three_node_line(3);
        data.demands = vec![0, 1, 1];
        let mut pricer2 = pricer(data, SearchMode::Monodirectional);
        let routes = pricer2.solve(&duals, &[]).unwrap();
        assert!(!routes.iter().any(|r| r.contains(&1) && r.iter().filter(|&&v| v == 1).count() > 1));
    }

    #[test]
    fn test_route_cap_respected() {
        let duals = [0.0, 10.0, 10.0];
        let mut pricer = pricer(three_node_line(2), SearchMode::Bidirectional);
        assert_eq!(pricer.max_routes, MAX_ROUTES_RETURNED);
        pricer.max_routes = 1;
        let routes = pricer.solve(&duals, &[]).unwrap();
        assert_eq!(routes.len(), 1);
        assert!(routes[0] == vec![0, 1, 2, 0] || routes[0] == vec![0, 2, 1, 0]);
    }

    #[test]
    fn test_vehicle_fixed_cost_filters_columns() {
        let duals = [0.0, 10.0, 10.0];
        let mut pricer = pricer(three_node_line(2), SearchMode::Monodirectional);
        // -16 is the best reduced cost on this instance; a fixed charge of 20
        // prices every route out
        pricer.vehicle_fixed_cost = 20.0;
        assert!(pricer.solve(&duals, &[]).unwrap().is_empty());
        pricer.vehicle_fixed_cost = 10.0;
        let routes = pricer.solve(&duals, &[]).unwrap();
        assert_eq!(
            as_set(&routes),
            as_set(&[vec![0, 1, 2, 0], vec![0, 2, 1, 0]])
        );
    }

    #[test]
    fn test_modes_agree_on_larger_instance() {
        // Dominance may keep different representatives of equally good
        // partial paths in the two modes, so the full route sets can differ.
        // Both must be sound, and both must find the optimal column.
        let data = five_node_line(3);
        let duals = [0.0, 8.0, 8.0, 8.0, 8.0];
        let mut mono = pricer(data.clone(), SearchMode::Monodirectional);
        let mut bidi = pricer(data.clone(), SearchMode::Bidirectional);
        let mono_routes = mono.solve(&duals, &[]).unwrap();
        let bidi_routes = bidi.solve(&duals, &[]).unwrap();

        assert!(!mono_routes.is_empty());
        assert!(!bidi_routes.is_empty());
        for route in mono_routes.iter().chain(bidi_routes.iter()) {
            assert!(simulate_route(&data, route).is_some());
            assert!(reduced_cost(&data, &duals, route) < -NEG_RC_EPS);
        }
        let mono_best = reduced_cost(&data, &duals, &mono_routes[0]);
        let bidi_best = reduced_cost(&data, &duals, &bidi_routes[0]);
        assert!((mono_best - bidi_best).abs() < 1e-9);
    }

    #[test]
    fn test_wider_pass_marks_do_not_change_result() {
        let data = three_node_line(2);
        let duals = [0.0, 10.0, 10.0];
        let mut pricer = pricer(data, SearchMode::Bidirectional);
        let narrow = pricer.solve(&duals, &[]).unwrap();
        pricer.forward_pass_mark = 1.0;
        pricer.backward_pass_mark = 0.0;
        let wide = pricer.solve(&duals, &[]).unwrap();
        assert_eq!(as_set(&narrow), as_set(&wide));
    }

    #[test]
    fn test_dominance_store_keeps_incumbent() {
        let mut pricer = pricer(three_node_line(2), SearchMode::Monodirectional);
        let cheap = Label {
            node_id: 2,
            parent_index: ROOT,
            cost: 1.0,
            time: 5.0,
            load: 1,
            visited_mask: vec![0usize, 2].into_iter().collect(),
            active: true,
        };
        let dear = Label { cost: 2.0, time: 6.0, ..cheap.clone() };

        let idx = pricer.fwd_labels.push(cheap.clone());
        pricer.fwd_store[2].push(idx);
        // the worse candidate is rejected outright
        assert!(pricer.check_and_update_dominance(2, &dear, false));
        assert!(pricer.fwd_labels.get(idx).active);
    }

    #[test]
    fn test_dominance_store_tombstones_dominated() {
        let mut pricer = pricer(three_node_line(2), SearchMode::Monodirectional);
        let dear = Label {
            node_id: 2,
            parent_index: ROOT,
            cost: 2.0,
            time: 6.0,
            load: 1,
            visited_mask: vec![0usize, 2].into_iter().collect(),
            active: true,
        };
        let cheap = Label { cost: 1.0, time: 5.0, ..dear.clone() };

        let idx = pricer.fwd_labels.push(dear);
        pricer.fwd_store[2].push(idx);
        // the better candidate survives and kills the incumbent
        assert!(!pricer.check_and_update_dominance(2, &cheap, false));
        assert!(!pricer.fwd_labels.get(idx).active);
    }

    #[test]
    fn test_dominance_store_respects_mask_subset() {
        let mut pricer = pricer(three_node_line(2), SearchMode::Monodirectional);
        let small_mask = Label {
            node_id: 2,
            parent_index: ROOT,
            cost: 1.0,
            time: 6.0,
            load: 0,
            visited_mask: vec![0usize, 2].into_iter().collect(),
            active: true,
        };
        let better_but_bigger_mask = Label {
            cost: 0.0,
            time: 5.0,
            visited_mask: vec![0usize, 2, 1].into_iter().collect(),
            ..small_mask.clone()
        };

        let idx = pricer.fwd_labels.push(better_but_bigger_mask);
        pricer.fwd_store[2].push(idx);
        assert!(!pricer.check_and_update_dominance(2, &small_mask, false));
        assert!(pricer.fwd_labels.get(idx).active);
    }

    #[test]
    fn test_duals_length_mismatch_is_error() {
        let mut pricer = pricer(three_node_line(2), SearchMode::Bidirectional);
        assert!(pricer.solve(&[0.0, 10.0], &[]).is_err());
        // the failed call leaves the engine usable
        let routes = pricer.solve(&[0.0, 10.0, 10.0], &[]).unwrap();
        assert_eq!(routes.len(), 4);
    }

    #[test]
    fn test_forbidden_arc_out_of_range_is_error() {
        let mut pricer = pricer(three_node_line(2), SearchMode::Bidirectional);
        assert!(pricer.solve(&[0.0, 10.0, 10.0], &[(0, 7)]).is_err());
        assert!(pricer.solve(&[0.0, 10.0, 10.0], &[(9, 1)]).is_err());
        let routes = pricer.solve(&[0.0, 10.0, 10.0], &[]).unwrap();
        assert_eq!(routes.len(), 4);
    }

    #[test]
    fn test_invalid_bucket_step_is_error() {
        assert!(Pricer::new(three_node_line(2), 0.0).is_err());
        assert!(Pricer::new(three_node_line(2), -1.0).is_err());
    }

    #[test]
    fn test_stats_reflect_last_solve() {
        let duals = [0.0, 10.0, 10.0];
        let mut pricer = pricer(three_node_line(2), SearchMode::Bidirectional);
        let routes = pricer.solve(&duals, &[]).unwrap();
        let stats = pricer.stats();
        assert_eq!(stats.columns, routes.len());
        assert!(stats.forward_labels > 0);
        assert!(stats.backward_labels > 0);

        pricer.mode = SearchMode::Monodirectional;
        pricer.solve(&duals, &[]).unwrap();
        assert_eq!(pricer.stats().backward_labels, 0);
    }
}
