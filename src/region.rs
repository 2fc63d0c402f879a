//! Grouping of vertices into brain regions, and the per-region spatial indices.

use log::debug;
use ndarray::{Array2, Axis};

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::{MindError, Result};
use crate::spatial::SpatialIndex;
use crate::table::VertexTable;


/// The feature vectors of all vertices of one brain region. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionGroup {
    pub name: String,
    /// Vertices x features.
    pub points: Array2<f64>,
}

impl RegionGroup {
    pub fn num_vertices(&self) -> usize {
        self.points.nrows()
    }

    /// Build the nearest neighbour index of this region. The index takes over the region's points.
    pub fn into_indexed(self) -> IndexedRegion {
        let index = SpatialIndex::build(self.points.view());
        IndexedRegion { name: self.name, index }
    }
}

impl fmt::Display for RegionGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Region '{}' with {} vertices.", self.name, self.num_vertices())
    }
}


/// A brain region together with the nearest neighbour index over its feature vectors.
#[derive(Debug, Clone)]
pub struct IndexedRegion {
    pub name: String,
    pub index: SpatialIndex,
}

impl IndexedRegion {
    pub fn num_vertices(&self) -> usize {
        self.index.len()
    }
}


/// Partition the vertices of the table into one group per listed region, in the order of `regions`.
///
/// Vertices whose label is not in `regions` are ignored.
///
/// # Errors
///
/// [`MindError::DuplicateRegion`] if `regions` lists a region twice, [`MindError::EmptyRegion`] if a listed region
/// has no vertices.
pub fn group_by_region<S: AsRef<str>>(table: &VertexTable, regions: &[S]) -> Result<Vec<RegionGroup>> {
    let mut region_pos: HashMap<&str, usize> = HashMap::with_capacity(regions.len());
    for (pos, region) in regions.iter().enumerate() {
        if region_pos.insert(region.as_ref(), pos).is_some() {
            return Err(MindError::DuplicateRegion { region: region.as_ref().to_string() });
        }
    }

    let mut rows: Vec<Vec<usize>> = vec![Vec::new(); regions.len()];
    let mut ignored: HashSet<&str> = HashSet::new();
    for (row_idx, label) in table.labels().iter().enumerate() {
        match region_pos.get(label.as_str()) {
            Some(&pos) => rows[pos].push(row_idx),
            None => {
                ignored.insert(label.as_str());
            }
        }
    }
    if !ignored.is_empty() {
        debug!("Ignoring vertices of {} labels not in the region list.", ignored.len());
    }

    let mut groups = Vec::with_capacity(regions.len());
    for (region, region_rows) in regions.iter().zip(rows) {
        if region_rows.is_empty() {
            return Err(MindError::EmptyRegion { region: region.as_ref().to_string() });
        }
        groups.push(RegionGroup {
            name: region.as_ref().to_string(),
            points: table.values().select(Axis(0), &region_rows),
        });
    }
    Ok(groups)
}


/// Build the nearest neighbour index of every region, keeping the region order.
pub fn build_indices(groups: Vec<RegionGroup>) -> Vec<IndexedRegion> {
    groups.into_iter().map(RegionGroup::into_indexed).collect()
}
