//! Synthetic vertex tables for the integration tests.

use mindnet::VertexTable;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// Deterministic RNG for reproducible tests.
pub fn make_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// A region of `n` vertices with independent normally distributed features around `mean`.
pub struct SyntheticRegion {
    pub name: &'static str,
    pub n: usize,
    pub mean: f64,
}

/// Build a vertex table with the features `names`, drawing each region's vertices from a standard normal
/// distribution shifted by the region's mean in every dimension.
pub fn normal_table(regions: &[SyntheticRegion], names: &[&str], seed: u64) -> VertexTable {
    let mut rng = make_rng(seed);
    let mut labels = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    for region in regions {
        for _ in 0..region.n {
            labels.push(region.name.to_string());
            for column in columns.iter_mut() {
                let z: f64 = rng.sample(StandardNormal);
                column.push(region.mean + z);
            }
        }
    }
    let named = names.iter().map(|n| n.to_string()).zip(columns).collect();
    VertexTable::from_columns(labels, named).unwrap()
}

pub fn region_names(regions: &[SyntheticRegion]) -> Vec<String> {
    regions.iter().map(|r| r.name.to_string()).collect()
}
