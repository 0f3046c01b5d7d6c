//! Hand-built instances and route checks shared across test modules.

use crate::data::ProblemData;

fn line_instance(num_nodes: usize, capacity: i64) -> ProblemData {
    let dist: Vec<Vec<f64>> = (0..num_nodes)
        .map(|i| (0..num_nodes).map(|j| (i as f64 - j as f64).abs()).collect())
        .collect();
    let neighbors = (0..num_nodes)
        .map(|i| (0..num_nodes).filter(|&j| j != i).collect())
        .collect();
    let mut demands = vec![1; num_nodes];
    demands[0] = 0;

    ProblemData {
        num_nodes,
        vehicle_capacity: capacity,
        demands,
        service_times: vec![0.0; num_nodes],
        tw_start: vec![0.0; num_nodes],
        tw_end: vec![100.0; num_nodes],
        dist_matrix: dist.clone(),
        time_matrix: dist,
        neighbors,
        ng_neighbor_lists: vec![],
    }
}

/// Depot plus two unit-demand customers at distances 1 and 2 on a line.
pub fn three_node_line(capacity: i64) -> ProblemData {
    line_instance(3, capacity)
}

/// Depot plus four unit-demand customers at distances 1 through 4.
pub fn five_node_line(capacity: i64) -> ProblemData {
    line_instance(5, capacity)
}

/// Replays `route` against the instance; returns its total distance if the
/// standard VRPTW simulation accepts it (load within capacity throughout,
/// every service inside its window, closure by the depot deadline).
pub fn simulate_route(data: &ProblemData, route: &[usize]) -> Option<f64> {
    if route.len() < 3 || route[0] != 0 || *route.last().unwrap() != 0 {
        return None;
    }
    let mut time = data.tw_start[0];
    let mut load = 0;
    let mut dist = 0.0;
    for pair in route.windows(2) {
        let (i, j) = (pair[0], pair[1]);
        dist += data.dist_matrix[i][j];
        let arrival = time + data.service_times[i] + data.time_matrix[i][j];
        time = arrival.max(data.tw_start[j]);
        if time > data.tw_end[j] {
            return None;
        }
        load += data.demands[j];
        if load > data.vehicle_capacity {
            return None;
        }
    }
    Some(dist)
}

/// Reduced cost of a complete route: total distance minus the duals of its
/// interior visits.
pub fn reduced_cost(data: &ProblemData, duals: &[f64], route: &[usize]) -> f64 {
    let dist: f64 = route.windows(2).map(|pair| data.dist_matrix[pair[0]][pair[1]]).sum();
    let dual_sum: f64 = route[1..route.len() - 1].iter().map(|&v| duals[v]).sum();
    dist - dual_sum
}
