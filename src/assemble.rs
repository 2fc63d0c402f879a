//! Assembly of the vertex table of a subject from the per-hemisphere parcellations and feature values.
//!
//! Region names of both hemispheres are made distinct by prefixing them with `lh_` and `rh_`. Regions which do not
//! describe cortex (the `unknown` region, the medial wall and unnamed entries) are left out of the region list. Their
//! vertices stay in the table, so they still count towards the feature statistics used for standardization.

use log::debug;

use std::collections::HashMap;
use std::fmt;

use crate::error::{MindError, Result};
use crate::parcellation::SurfaceParcellation;
use crate::table::VertexTable;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    Left,
    Right,
}

impl Hemisphere {
    pub fn prefix(&self) -> &'static str {
        match self {
            Hemisphere::Left => "lh",
            Hemisphere::Right => "rh",
        }
    }

    /// The region name as used in the vertex table, e.g. `lh_insula`.
    pub fn region_name(&self, region: &str) -> String {
        format!("{}_{}", self.prefix(), region)
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}


/// The parcellation of one hemisphere and the values of each requested feature, one per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct HemisphereData {
    pub parcellation: SurfaceParcellation,
    /// One vector per feature, in the order of the feature names.
    pub features: Vec<Vec<f64>>,
}


/// Whether a parcellation region is a placeholder rather than a cortical region.
pub fn is_excluded_region(name: &str) -> bool {
    name.is_empty()
        || name.contains('?')
        || name.contains("unknown")
        || name.contains("Unknown")
        || name.contains("Medial_Wall")
}


/// Merge the data of both hemispheres into a vertex table, and list the regions in matrix order.
///
/// Rows are the left hemisphere vertices followed by the right hemisphere vertices, restricted to vertices with a
/// label present in the colortable. The region list holds the left hemisphere regions followed by the right hemisphere regions, each in
/// colortable order, restricted to regions with at least one vertex and without placeholder regions.
///
/// # Errors
///
/// [`MindError::ShapeMismatch`] if a hemisphere does not provide one feature vector per feature name, or a feature
/// vector does not have one value per vertex of its parcellation.
pub fn assemble_vertex_table<S: AsRef<str>>(feature_names: &[S], lh: &HemisphereData, rh: &HemisphereData) -> Result<(VertexTable, Vec<String>)> {
    let mut labels = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); feature_names.len()];
    let mut regions = Vec::new();

    for &(hemi, data) in [(Hemisphere::Left, lh), (Hemisphere::Right, rh)].iter() {
        check_hemisphere_shape(hemi, feature_names.len(), data)?;

        let parcellation = &data.parcellation;
        let mut used: HashMap<i32, String> = HashMap::new();
        for ct_idx in parcellation.used_regions() {
            let entry = &parcellation.colortable.entries[ct_idx];
            let name = hemi.region_name(&entry.name);
            if is_excluded_region(&entry.name) {
                debug!("Excluding region '{}' of hemisphere {} from the region list.", entry.name, hemi);
            } else {
                regions.push(name.clone());
            }
            used.insert(entry.label(), name);
        }

        for (vertex, vlabel) in parcellation.vertex_labels.iter().enumerate() {
            if let Some(name) = used.get(vlabel) {
                labels.push(name.clone());
                for (column, values) in columns.iter_mut().zip(data.features.iter()) {
                    column.push(values[vertex]);
                }
            }
        }
    }

    let named_columns = feature_names.iter().map(|n| n.as_ref().to_string()).zip(columns).collect();
    let table = VertexTable::from_columns(labels, named_columns)?;
    Ok((table, regions))
}


fn check_hemisphere_shape(hemi: Hemisphere, num_features: usize, data: &HemisphereData) -> Result<()> {
    if data.features.len() != num_features {
        return Err(MindError::ShapeMismatch {
            what: format!("number of features of hemisphere {}", hemi),
            expected: num_features,
            found: data.features.len(),
        });
    }
    let num_vertices = data.parcellation.num_vertices();
    for (feat_idx, values) in data.features.iter().enumerate() {
        if values.len() != num_vertices {
            return Err(MindError::ShapeMismatch {
                what: format!("vertex count of feature {} of hemisphere {}", feat_idx, hemi),
                expected: num_vertices,
                found: values.len(),
            });
        }
    }
    Ok(())
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::parcellation::test::demo_parcellation;

    fn demo_hemisphere(offset: f64) -> HemisphereData {
        let parcellation = demo_parcellation();
        let n = parcellation.num_vertices();
        HemisphereData {
            parcellation,
            features: vec![
                (0..n).map(|i| offset + i as f64).collect(),
                (0..n).map(|i| offset - i as f64).collect(),
            ],
        }
    }

    #[test]
    fn placeholder_regions_are_excluded() {
        assert!(is_excluded_region("unknown"));
        assert!(is_excluded_region("Medial_Wall"));
        assert!(is_excluded_region("???"));
        assert!(is_excluded_region(""));
        assert!(!is_excluded_region("insula"));
    }

    #[test]
    fn hemispheres_are_merged_with_prefixed_region_names() {
        let (table, regions) = assemble_vertex_table(&["CT", "MC"], &demo_hemisphere(0.0), &demo_hemisphere(100.0)).unwrap();

        assert_eq!(vec!["lh_bankssts", "lh_cuneus", "rh_bankssts", "rh_cuneus"], regions);
        assert_eq!(14, table.num_vertices());
        assert_eq!(vec!["CT", "MC"], table.feature_names());
        assert_eq!("lh_bankssts", table.labels()[1]);
        assert_eq!(1.0, table.values()[[1, 0]]);
        assert_eq!("rh_cuneus", table.labels()[12]);
        assert_eq!(105.0, table.values()[[12, 0]]);
        assert_eq!(95.0, table.values()[[12, 1]]);
    }

    #[test]
    fn vertices_of_placeholder_regions_stay_in_the_table() {
        let (table, regions) = assemble_vertex_table(&["CT", "MC"], &demo_hemisphere(0.0), &demo_hemisphere(100.0)).unwrap();

        assert_eq!(4, regions.len());
        assert!(!regions.iter().any(|r| r.ends_with("unknown")));
        let labels = table.labels();
        assert_eq!(2, labels.iter().filter(|l| *l == "lh_unknown").count());
        assert_eq!(2, labels.iter().filter(|l| *l == "rh_unknown").count());
        assert_eq!("lh_unknown", labels[0]);
        assert_eq!("rh_unknown", labels[13]);
        assert_eq!(106.0, table.values()[[13, 0]]);
    }

    #[test]
    fn vertices_with_labels_missing_from_the_colortable_are_dropped() {
        let mut lh = demo_hemisphere(0.0);
        lh.parcellation.vertex_labels[3] = 12345;
        let (table, _) = assemble_vertex_table(&["CT", "MC"], &lh, &demo_hemisphere(100.0)).unwrap();
        assert_eq!(13, table.num_vertices());
        assert_eq!(4.0, table.values()[[3, 0]]);
    }

    #[test]
    fn feature_vectors_must_cover_all_vertices() {
        let mut rh = demo_hemisphere(0.0);
        rh.features[1].pop();
        let res = assemble_vertex_table(&["CT", "MC"], &demo_hemisphere(0.0), &rh);
        assert!(matches!(res, Err(MindError::ShapeMismatch { expected: 7, found: 6, .. })));
    }

    #[test]
    fn each_feature_name_needs_a_feature_vector() {
        let res = assemble_vertex_table(&["CT", "MC", "SD"], &demo_hemisphere(0.0), &demo_hemisphere(0.0));
        assert!(matches!(res, Err(MindError::ShapeMismatch { expected: 3, found: 2, .. })));
    }
}
