//! Brain surface parcellations: the assignment of each vertex of a hemisphere mesh to exactly one brain region.
//!
//! A so-called colortable contains data on the regions, including the region's name, an RGBA display color, and a
//! unique label code computed from the color. The per-vertex assignment uses the label code.

use std::collections::HashSet;
use std::fmt;


/// One region of a colortable.
#[derive(Debug, Clone, PartialEq)]
pub struct ColortableEntry {
    pub name: String,
    pub r: i32,
    pub g: i32,
    pub b: i32,
    pub a: i32,
}

impl ColortableEntry {
    /// The unique label code of the region, computed from its color as `r + g*2^8 + b*2^16 + a*2^24`.
    pub fn label(&self) -> i32 {
        self.r + self.g * (2 as i32).pow(8) + self.b * (2 as i32).pow(16) + self.a * (2 as i32).pow(24)
    }
}


/// The regions of a parcellation, in atlas order.
#[derive(Debug, Clone, PartialEq)]
pub struct Colortable {
    pub entries: Vec<ColortableEntry>,
}

impl Colortable {
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    pub fn labels(&self) -> Vec<i32> {
        self.entries.iter().map(ColortableEntry::label).collect()
    }

    /// Get the colortable index of the region with the given label code.
    pub fn index_of_label(&self, label: i32) -> Option<usize> {
        self.entries.iter().position(|e| e.label() == label)
    }
}

impl fmt::Display for Colortable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Colortable for {} brain regions.", self.entries.len())
    }
}


/// A brain surface parcellation of one hemisphere. The `vertex_labels` field contains the mesh vertices in order, and
/// assigns to each vertex a brain region using the label code of a [`ColortableEntry`].
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceParcellation {
    pub vertex_labels: Vec<i32>,
    pub colortable: Colortable,
}

impl SurfaceParcellation {

    pub fn num_vertices(&self) -> usize {
        self.vertex_labels.len()
    }

    /// Get the region names contained in the colortable, including regions without vertices.
    pub fn regions(&self) -> Vec<String> {
        self.colortable.names()
    }

    pub fn num_regions(&self) -> usize {
        self.colortable.entries.len()
    }


    /// Get the indices of all vertices which are part of the given brain region.
    ///
    /// Returns `None` if the region is not in the colortable, and an empty vector if no vertices are assigned to it.
    pub fn region_vertices(&self, region: &str) -> Option<Vec<usize>> {
        let entry = self.colortable.entries.iter().find(|e| e.name == region)?;
        let region_label = entry.label();
        Some(
            self.vertex_labels
                .iter()
                .enumerate()
                .filter_map(|(idx, &vlabel)| if vlabel == region_label { Some(idx) } else { None })
                .collect(),
        )
    }


    /// Get the colortable indices of the regions that have at least one vertex, in colortable order.
    pub fn used_regions(&self) -> Vec<usize> {
        let present: HashSet<i32> = self.vertex_labels.iter().copied().collect();
        self.colortable
            .entries
            .iter()
            .enumerate()
            .filter_map(|(idx, e)| if present.contains(&e.label()) { Some(idx) } else { None })
            .collect()
    }
}

impl fmt::Display for SurfaceParcellation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Surface parcellation assigning {} vertices to {} brain regions.", self.num_vertices(), self.num_regions())
    }
}
