//! Exact nearest neighbour search in feature space, using a k-d tree.
//!
//! One index is built per brain region over the standardized feature vectors of its vertices. The index owns a copy
//! of the coordinates and is read-only after construction, so it can be shared between threads.

use ndarray::ArrayView2;

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

/// Maximal number of points stored in a leaf of the tree.
pub const LEAF_SIZE: usize = 16;


/// A neighbour found by a query: the row index of the point in the indexed point set, and its Euclidean distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
}


#[derive(Debug, Clone)]
enum Node {
    Leaf { start: usize, end: usize },
    Split { dim: usize, value: f64, left: usize, right: usize },
}


/// A k-d tree over a set of points of equal dimension.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    coords: Vec<f64>,
    dim: usize,
    num_points: usize,
    order: Vec<usize>,
    nodes: Vec<Node>,
}


// Max-heap entry: the worst of the current k candidates is on top.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    dist2: f64,
    index: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist2.total_cmp(&other.dist2).then(self.index.cmp(&other.index))
    }
}


impl SpatialIndex {

    /// Build the index over the rows of `points` (points x dimensions).
    ///
    /// Construction is deterministic: the same points always yield the same tree.
    pub fn build(points: ArrayView2<f64>) -> SpatialIndex {
        let (num_points, dim) = points.dim();
        let mut index = SpatialIndex {
            coords: points.iter().cloned().collect(),
            dim,
            num_points,
            order: (0..num_points).collect(),
            nodes: Vec::new(),
        };
        if num_points > 0 {
            index.build_node(0, num_points);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.num_points
    }

    pub fn is_empty(&self) -> bool {
        self.num_points == 0
    }

    /// The dimension of the indexed points.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The coordinates of the point with the given row index.
    pub fn point(&self, index: usize) -> &[f64] {
        &self.coords[index * self.dim..(index + 1) * self.dim]
    }


    /// Find the `k` nearest neighbours of `query`, sorted by increasing distance (ties by increasing index).
    ///
    /// A query point that is itself part of the index is returned as its own neighbour at distance `0`. Duplicate
    /// points are all reported, each at distance `0`. If `k` exceeds the number of points, all points are returned.
    ///
    /// # Panics
    ///
    /// If the dimension of `query` does not match the index.
    pub fn nearest(&self, query: &[f64], k: usize) -> Vec<Neighbor> {
        assert_eq!(query.len(), self.dim, "Query dimension must match the index dimension.");
        if k == 0 || self.num_points == 0 {
            return Vec::new();
        }

        let mut heap = BinaryHeap::with_capacity(k + 1);
        self.search(0, query, k, &mut heap);

        heap.into_sorted_vec()
            .into_iter()
            .map(|c| Neighbor { index: c.index, distance: c.dist2.sqrt() })
            .collect()
    }


    /// Distance from `query` to its `k`-th nearest neighbour (1-based), if the index holds at least `k` points.
    pub fn kth_distance(&self, query: &[f64], k: usize) -> Option<f64> {
        k.checked_sub(1).and_then(|i| self.nearest(query, k).get(i).map(|n| n.distance))
    }


    fn build_node(&mut self, start: usize, end: usize) -> usize {
        let node_idx = self.nodes.len();
        self.nodes.push(Node::Leaf { start, end });

        if end - start <= LEAF_SIZE {
            return node_idx;
        }

        let dim = match self.widest_dimension(start, end) {
            Some(d) => d,
            None => return node_idx, // all points identical
        };

        let mid = (end - start) / 2;
        {
            let coords = &self.coords;
            let stride = self.dim;
            self.order[start..end].select_nth_unstable_by(mid, |&a, &b| {
                coords[a * stride + dim]
                    .total_cmp(&coords[b * stride + dim])
                    .then(a.cmp(&b))
            });
        }
        let value = self.coords[self.order[start + mid] * self.dim + dim];

        let left = self.build_node(start, start + mid);
        let right = self.build_node(start + mid, end);
        self.nodes[node_idx] = Node::Split { dim, value, left, right };
        node_idx
    }


    fn widest_dimension(&self, start: usize, end: usize) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for d in 0..self.dim {
            let mut lo = f64::INFINITY;
            let mut hi = f64::NEG_INFINITY;
            for &p in &self.order[start..end] {
                let v = self.coords[p * self.dim + d];
                lo = lo.min(v);
                hi = hi.max(v);
            }
            let spread = hi - lo;
            if spread > 0.0 && best.map_or(true, |(_, s)| spread > s) {
                best = Some((d, spread));
            }
        }
        best.map(|(d, _)| d)
    }


    fn search(&self, node_idx: usize, query: &[f64], k: usize, heap: &mut BinaryHeap<Candidate>) {
        match self.nodes[node_idx] {
            Node::Leaf { start, end } => {
                for &p in &self.order[start..end] {
                    let dist2 = squared_distance(query, self.point(p));
                    let candidate = Candidate { dist2, index: p };
                    if heap.len() < k {
                        heap.push(candidate);
                    } else if let Some(worst) = heap.peek() {
                        if candidate < *worst {
                            heap.pop();
                            heap.push(candidate);
                        }
                    }
                }
            }
            Node::Split { dim, value, left, right } => {
                let diff = query[dim] - value;
                let (near, far) = if diff <= 0.0 { (left, right) } else { (right, left) };
                self.search(near, query, k, heap);

                let must_visit_far = match heap.peek() {
                    Some(worst) if heap.len() >= k => diff * diff <= worst.dist2,
                    _ => true,
                };
                if must_visit_far {
                    self.search(far, query, k, heap);
                }
            }
        }
    }
}


impl fmt::Display for SpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Spatial index over {} points of dimension {} ({} nodes).", self.num_points, self.dim, self.nodes.len())
    }
}


fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
