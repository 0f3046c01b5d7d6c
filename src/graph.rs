use crate::data::ProblemData;

/// Precomputed arc of the pruned search graph. `cost` is the static distance
/// component of the reduced cost; duals enter only during label propagation.
#[derive(Debug, Clone, Copy)]
pub struct Arc {
    pub target: usize,
    pub cost: f64,
    /// service_time(from) + travel_time(from -> to)
    pub duration: f64,
    /// demand(to) in the forward graph, demand(from) in the backward graph
    pub demand: i64,
    pub distance: f64,
}

/// Static adjacency after capacity and time-window pruning. The forward
/// variant stores physical arcs i -> j under `outgoing[i]`; the backward
/// variant re-indexes the same physical arcs under `outgoing[j]` so that a
/// label at j can retreat to i.
#[derive(Debug, Clone)]
pub struct BucketGraph {
    pub outgoing: Vec<Vec<Arc>>,
}

impl BucketGraph {
    pub fn build_forward(data: &ProblemData) -> Self {
        let mut outgoing: Vec<Vec<Arc>> = vec![Vec::new(); data.num_nodes];

        for i in 0..data.num_nodes {
            for &j in &data.neighbors[i] {
                if i == j || !Self::arc_is_viable(data, i, j) {
                    continue;
                }
                outgoing[i].push(Arc {
                    target: j,
                    cost: data.dist_matrix[i][j],
                    duration: data.service_times[i] + data.time_matrix[i][j],
                    demand: data.demands[j],
                    distance: data.dist_matrix[i][j],
                });
            }
        }

        BucketGraph { outgoing }
    }

    pub fn build_backward(data: &ProblemData) -> Self {
        let mut outgoing: Vec<Vec<Arc>> = vec![Vec::new(); data.num_nodes];

        for i in 0..data.num_nodes {
            for &j in &data.neighbors[i] {
                if i == j || !Self::arc_is_viable(data, i, j) {
                    continue;
                }
                // Physical arc i -> j, searched from j back to i. Time runs
                // backward: a label at j loses `duration` when it retreats.
                outgoing[j].push(Arc {
                    target: i,
                    cost: data.dist_matrix[i][j],
                    duration: data.service_times[i] + data.time_matrix[i][j],
                    demand: data.demands[i],
                    distance: data.dist_matrix[i][j],
                });
            }
        }

        BucketGraph { outgoing }
    }

    /// Instance-static cuts on the physical arc i -> j. Dynamic duals never
    /// enter the graph build.
    fn arc_is_viable(data: &ProblemData, i: usize, j: usize) -> bool {
        if data.demands[i] + data.demands[j] > data.vehicle_capacity {
            return false;
        }
        // Even leaving i at its earliest, j's window is already shut.
        let earliest = data.tw_start[i] + data.service_times[i] + data.time_matrix[i][j];
        if earliest > data.tw_end[j] {
            return false;
        }
        true
    }

    pub fn num_arcs(&self) -> usize {
        self.outgoing.iter().map(|arcs| arcs.len()).sum()
    }
}
