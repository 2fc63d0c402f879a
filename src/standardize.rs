//! Feature standardization: quality control filtering of vertices and z-scoring of each feature across the brain.
//!
//! Vertices with zero cortical thickness, volume or surface area are anatomically meaningless and can be removed
//! before z-scoring. A very lenient outlier rejection based on the median absolute deviation is available, but
//! off by default: the divergence estimator does not assume normality, and removing moderate outliers risks
//! removing signal from specific regions.

use log::debug;
use ndarray::{Array2, Axis};
use ndarray_stats::SummaryStatisticsExt;

use crate::error::{MindError, Result};
use crate::feature_spec::Morphometry;
use crate::table::VertexTable;
use crate::util::outlier_mask;

/// The modified z-score above which a vertex is considered an outlier, if outlier rejection is enabled.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 7.0;


/// Settings for [`standardize`].
#[derive(Debug, Clone, PartialEq)]
pub struct StandardizeOptions {
    /// Drop vertices with a value of exactly zero in any requested degenerate-when-zero measure (`CT`, `Vol`, `SA`).
    pub filter_degenerate_vertices: bool,
    /// Drop vertices with a modified z-score above this threshold in any requested feature. `None` disables the test.
    pub outlier_threshold: Option<f64>,
}

impl Default for StandardizeOptions {
    fn default() -> StandardizeOptions {
        StandardizeOptions {
            filter_degenerate_vertices: false,
            outlier_threshold: None,
        }
    }
}


/// Filter and z-score the requested features of a vertex table.
///
/// The result contains only the requested features, in request order. Each of its columns has mean 0 and
/// (population) standard deviation 1 over all retained vertices, irrespective of region membership.
///
/// # Errors
///
/// * [`MindError::UnknownFeature`] if a requested feature is not in the table. Nothing is computed in that case.
/// * [`MindError::NoVerticesRemaining`] if filtering removes all vertices.
/// * [`MindError::ConstantFeature`] if a feature has no variance over the retained vertices.
///
/// # Examples
///
/// ```
/// use mindnet::{standardize, StandardizeOptions, VertexTable};
/// let table = VertexTable::from_columns(
///     vec![String::from("a"); 4],
///     vec![(String::from("CT"), vec![0.0, 1.0, 2.0, 3.0])],
/// ).unwrap();
/// let options = StandardizeOptions { filter_degenerate_vertices: true, ..Default::default() };
/// let z = standardize(&table, &["CT"], &options).unwrap();
/// assert_eq!(3, z.num_vertices());
/// ```
pub fn standardize<S: AsRef<str>>(table: &VertexTable, features: &[S], options: &StandardizeOptions) -> Result<VertexTable> {
    let mut selected = table.select_features(features)?;

    if options.filter_degenerate_vertices {
        let keep = non_degenerate_mask(&selected);
        let num_dropped = keep.iter().filter(|&&k| !k).count();
        debug!("Dropping {} of {} vertices with zero thickness, volume or area.", num_dropped, selected.num_vertices());
        selected = selected.filter_rows(&keep);
    }

    if let Some(threshold) = options.outlier_threshold {
        let keep = inlier_mask(&selected, threshold)?;
        let num_dropped = keep.iter().filter(|&&k| !k).count();
        debug!("Dropping {} of {} vertices with a modified z-score above {}.", num_dropped, selected.num_vertices(), threshold);
        selected = selected.filter_rows(&keep);
    }

    if selected.num_vertices() == 0 {
        return Err(MindError::NoVerticesRemaining);
    }

    let values = z_scores(&selected)?;
    selected.with_values(values)
}


/// Mask of the vertices whose value is non-zero in every degenerate-when-zero measure present in the table.
pub fn non_degenerate_mask(table: &VertexTable) -> Vec<bool> {
    let mut keep = vec![true; table.num_vertices()];
    for (col_idx, name) in table.feature_names().iter().enumerate() {
        let degenerate = Morphometry::from_code(name).map_or(false, |m| m.is_degenerate_when_zero());
        if !degenerate {
            continue;
        }
        for (k, &value) in keep.iter_mut().zip(table.values().column(col_idx).iter()) {
            if value == 0.0 {
                *k = false;
            }
        }
    }
    keep
}


/// Mask of the vertices which are not an outlier in any feature of the table, using the univariate modified z-score.
pub fn inlier_mask(table: &VertexTable, threshold: f64) -> Result<Vec<bool>> {
    let mut keep = vec![true; table.num_vertices()];
    if table.num_vertices() == 0 {
        return Ok(keep);
    }
    for column in table.values().axis_iter(Axis(1)) {
        let outliers = outlier_mask(column.insert_axis(Axis(1)), threshold)?;
        for (k, o) in keep.iter_mut().zip(outliers) {
            if o {
                *k = false;
            }
        }
    }
    Ok(keep)
}


fn z_scores(table: &VertexTable) -> Result<Array2<f64>> {
    let mut values = table.values().clone();
    for (col_idx, mut column) in values.axis_iter_mut(Axis(1)).enumerate() {
        let mean = SummaryStatisticsExt::mean(&column).map_err(|_| MindError::NoVerticesRemaining)?;
        let std_dev = column
            .central_moment(2)
            .map_err(|_| MindError::NoVerticesRemaining)?
            .sqrt();

        if !(std_dev > 0.0) {
            return Err(MindError::ConstantFeature { name: table.feature_names()[col_idx].clone() });
        }
        column.mapv_inplace(|x| (x - mean) / std_dev);
    }
    Ok(values)
}


#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn demo_table() -> VertexTable {
        let labels = vec!["a", "a", "a", "b", "b", "b", "b", "c", "c", "c"]
            .into_iter()
            .map(String::from)
            .collect();
        VertexTable::from_columns(
            labels,
            vec![
                (String::from("CT"), vec![2.1, 0.0, 2.5, 3.0, 2.2, 2.8, 0.0, 1.9, 2.4, 2.6]),
                (String::from("MC"), vec![0.1, 0.3, -0.2, 0.0, 0.5, -0.4, 0.2, 0.1, 0.0, -0.1]),
                (String::from("SD"), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn standardized_columns_have_zero_mean_and_unit_variance() {
        let z = standardize(&demo_table(), &["CT", "MC", "SD"], &StandardizeOptions::default()).unwrap();
        for column in z.values().axis_iter(Axis(1)) {
            let n = column.len() as f64;
            let mean = column.sum() / n;
            let var = column.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
            assert_abs_diff_eq!(0.0, mean, epsilon = 1e-6);
            assert_abs_diff_eq!(1.0, var.sqrt(), epsilon = 1e-6);
        }
    }

    #[test]
    fn only_requested_features_are_kept_in_request_order() {
        let z = standardize(&demo_table(), &["SD", "CT"], &StandardizeOptions::default()).unwrap();
        assert_eq!(vec!["SD", "CT"], z.feature_names());
        assert_eq!(10, z.num_vertices());
    }

    #[test]
    fn degenerate_vertices_are_dropped_when_requested() {
        let options = StandardizeOptions { filter_degenerate_vertices: true, ..Default::default() };
        let z = standardize(&demo_table(), &["CT", "SD"], &options).unwrap();
        assert_eq!(8, z.num_vertices());
        assert_eq!(vec!["a", "a", "b", "b", "b", "c", "c", "c"], z.labels());
    }

    #[test]
    fn degenerate_filter_ignores_unrequested_measures() {
        let options = StandardizeOptions { filter_degenerate_vertices: true, ..Default::default() };
        let z = standardize(&demo_table(), &["MC", "SD"], &options).unwrap();
        assert_eq!(10, z.num_vertices());
    }

    #[test]
    fn outliers_are_dropped_when_a_threshold_is_set() {
        let mut sd: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        sd[7] = 1000.0;
        let table = VertexTable::from_columns(vec![String::from("a"); 20], vec![(String::from("SD"), sd)]).unwrap();

        let options = StandardizeOptions { outlier_threshold: Some(DEFAULT_OUTLIER_THRESHOLD), ..Default::default() };
        let z = standardize(&table, &["SD"], &options).unwrap();
        assert_eq!(19, z.num_vertices());

        let unfiltered = standardize(&table, &["SD"], &StandardizeOptions::default()).unwrap();
        assert_eq!(20, unfiltered.num_vertices());
    }

    #[test]
    fn a_feature_with_zero_mad_keeps_only_the_vertices_at_its_median() {
        let mut sd = vec![1.0; 12];
        sd.extend_from_slice(&[1.1, 0.9, 1.2, 0.8, 50.0, 1.3, 0.7, 1.05]);
        let table = VertexTable::from_columns(vec![String::from("a"); 20], vec![(String::from("SD"), sd)]).unwrap();

        let options = StandardizeOptions { outlier_threshold: Some(DEFAULT_OUTLIER_THRESHOLD), ..Default::default() };
        let kept = inlier_mask(&table, DEFAULT_OUTLIER_THRESHOLD).unwrap();
        assert!(!kept[16]);
        assert_eq!(12, kept.iter().filter(|&&k| k).count());

        // Every retained value is 1.0, which leaves nothing to standardize.
        assert!(matches!(standardize(&table, &["SD"], &options), Err(MindError::ConstantFeature { .. })));
    }

    #[test]
    fn unknown_features_are_reported_before_any_computation() {
        match standardize(&demo_table(), &["CT", "LGI"], &StandardizeOptions::default()) {
            Err(MindError::UnknownFeature { name }) => assert_eq!("LGI", name),
            other => panic!("Expected UnknownFeature, got {:?}", other),
        }
    }

    #[test]
    fn removing_every_vertex_is_a_data_error() {
        let table = VertexTable::from_columns(vec![String::from("a"); 3], vec![(String::from("SA"), vec![0.0; 3])]).unwrap();
        let options = StandardizeOptions { filter_degenerate_vertices: true, ..Default::default() };
        let err = standardize(&table, &["SA"], &options).unwrap_err();
        assert!(matches!(err, MindError::NoVerticesRemaining));
        assert!(err.is_data_error());
    }

    #[test]
    fn constant_features_cannot_be_standardized() {
        let table = VertexTable::from_columns(vec![String::from("a"); 3], vec![(String::from("MC"), vec![0.5; 3])]).unwrap();
        assert!(matches!(
            standardize(&table, &["MC"], &StandardizeOptions::default()),
            Err(MindError::ConstantFeature { .. })
        ));
    }
}
