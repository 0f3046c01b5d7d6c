/// Tolerance for floating comparisons in dominance checks.
pub const EPS: f64 = 1e-6;
/// A route only counts as improving if its reduced cost is below this.
pub const NEG_RC_EPS: f64 = 1e-5;

/// Hard cap on instance size, fixed by the bitset width.
pub const MAX_NODES: usize = 256;

// Halfway pruning marks for bidirectional search, as fractions of the depot
// closing time. Forward labels past the first mark and backward labels below
// the second are kept for merging but no longer extended. The two must
// overlap or the join set can be empty.
pub const FORWARD_PASS_MARK: f64 = 0.6;
pub const BACKWARD_PASS_MARK: f64 = 0.4;

pub const MAX_ROUTES_RETURNED: usize = 50;
pub const LABEL_POOL_RESERVE: usize = 200_000;
pub const BUCKET_MARGIN: usize = 2;
