//! Assembly of the Morphometric Inverse Divergence (MIND) network: the symmetric region x region matrix of
//! similarities `1 / (1 + KL)`, where `KL` is the symmetrized divergence between the feature distributions of two regions.

use log::{debug, info};
use ndarray::Array2;
use rayon::prelude::*;

use std::fmt;

use crate::divergence::symmetric_divergence;
use crate::error::{MindError, Result};
use crate::region::{build_indices, group_by_region, IndexedRegion};
use crate::standardize::{standardize, StandardizeOptions};
use crate::table::VertexTable;


/// Settings for [`compute_network`].
#[derive(Debug, Clone, PartialEq)]
pub struct MindOptions {
    pub standardize: StandardizeOptions,
    /// Compute the region pairs on the rayon thread pool. The result is identical to the sequential computation.
    pub parallel: bool,
}

impl Default for MindOptions {
    fn default() -> MindOptions {
        MindOptions {
            standardize: StandardizeOptions::default(),
            parallel: true,
        }
    }
}

impl MindOptions {
    pub fn with_degenerate_filter(mut self, enabled: bool) -> MindOptions {
        self.standardize.filter_degenerate_vertices = enabled;
        self
    }

    pub fn with_outlier_threshold(mut self, threshold: Option<f64>) -> MindOptions {
        self.standardize.outlier_threshold = threshold;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> MindOptions {
        self.parallel = parallel;
        self
    }
}


/// A MIND network: similarities in `[0, 1]` between all pairs of regions, with rows and columns in region list order.
///
/// The matrix is symmetric and its diagonal is zero, as regions are not compared to themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct MindNetwork {
    regions: Vec<String>,
    similarity: Array2<f64>,
}

impl MindNetwork {
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    pub fn num_regions(&self) -> usize {
        self.regions.len()
    }

    /// The region x region similarity matrix.
    pub fn similarity(&self) -> &Array2<f64> {
        &self.similarity
    }

    pub fn into_matrix(self) -> Array2<f64> {
        self.similarity
    }

    /// Get the position of the region in the rows and columns of the matrix.
    pub fn region_index(&self, region: &str) -> Option<usize> {
        self.regions.iter().position(|r| r == region)
    }

    /// Get the similarity between two regions by name.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # let network: mindnet::MindNetwork = unimplemented!();
    /// let s = network.get("lh_insula", "rh_insula").unwrap();
    /// assert!(s > 0.0 && s <= 1.0);
    /// ```
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.region_index(a)?;
        let j = self.region_index(b)?;
        Some(self.similarity[[i, j]])
    }
}

impl fmt::Display for MindNetwork {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MIND network over {} brain regions.", self.num_regions())
    }
}


/// Convert a symmetrized divergence into a similarity in `(0, 1]`.
pub fn similarity_from_divergence(kl: f64) -> f64 {
    1.0 / (1.0 + kl)
}


/// All unordered pairs `(i, j)` with `i < j` of `n` regions, in row-major order.
pub fn region_pairs(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |i| (i + 1..n).map(move |j| (i, j)))
}


/// Compute the MIND network over already indexed regions, in the order given.
///
/// Every unordered pair is computed exactly once and written into both symmetric cells. If the divergence of any
/// pair is undefined, the whole computation fails with the error of the first such pair in pair order.
pub fn calculate_mind_network(regions: &[IndexedRegion], parallel: bool) -> Result<MindNetwork> {
    let n = regions.len();
    let pairs: Vec<(usize, usize)> = region_pairs(n).collect();

    let pair_kl = |&(i, j): &(usize, usize)| symmetric_divergence(&regions[i], &regions[j]);
    let divergences: Vec<Result<f64>> = if parallel {
        pairs.par_iter().map(pair_kl).collect()
    } else {
        pairs.iter().map(pair_kl).collect()
    };

    let mut similarity = Array2::zeros((n, n));
    for (&(i, j), kl) in pairs.iter().zip(divergences) {
        let s = similarity_from_divergence(kl?);
        similarity[[i, j]] = s;
        similarity[[j, i]] = s;
    }

    Ok(MindNetwork {
        regions: regions.iter().map(|r| r.name.clone()).collect(),
        similarity,
    })
}


/// Compute the MIND network of a vertex table.
///
/// The requested `features` are filtered and standardized (see [`standardize`]), the vertices are grouped into the
/// listed `regions`, one nearest neighbour index is built per region, and the similarity of every pair of regions is
/// estimated. Rows and columns of the result follow the order of `regions`.
///
/// # Errors
///
/// * [`MindError::UnknownFeature`] if a requested feature is not in the table.
/// * A data error (see [`MindError::is_data_error`]) if a region has no vertices or filtering removes all vertices.
/// * [`MindError::DivergenceUndefined`] if a region is too small to estimate a divergence.
///
/// # Examples
///
/// ```no_run
/// use mindnet::{compute_network, MindOptions, VertexTable};
/// # let table: VertexTable = unimplemented!();
/// # let regions: Vec<String> = unimplemented!();
/// let options = MindOptions::default().with_degenerate_filter(true);
/// let network = compute_network(&table, &["CT", "MC", "Vol", "SD", "SA"], &regions, &options).unwrap();
/// println!("{}", network);
/// ```
pub fn compute_network<F, R>(table: &VertexTable, features: &[F], regions: &[R], options: &MindOptions) -> Result<MindNetwork>
where
    F: AsRef<str>,
    R: AsRef<str>,
{
    info!("Computing MIND network over {} regions from {} vertices and {} features.", regions.len(), table.num_vertices(), features.len());

    let standardized = standardize(table, features, &options.standardize)?;
    let groups = group_by_region(&standardized, regions)?;
    for group in groups.iter() {
        debug!("{}", group);
    }

    let indexed = build_indices(groups);
    let network = calculate_mind_network(&indexed, options.parallel)?;

    info!("Computed MIND network from {} retained vertices.", standardized.num_vertices());
    Ok(network)
}
