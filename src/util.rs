//! Robust statistics used by the standardization step.

use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use ndarray_stats::interpolate::Midpoint;
use ndarray_stats::Quantile1dExt;
use noisy_float::types::n64;

use crate::error::{MindError, Result};

/// Scale factor that makes the median absolute deviation consistent with the standard deviation of a normal distribution.
pub const MAD_CONSISTENCY: f64 = 0.6745;


/// Compute the median of the values, averaging the two middle values for even lengths.
///
/// The values must be finite.
pub fn median(values: ArrayView1<f64>) -> Result<f64> {
    let mut sortable = values.mapv(n64);
    sortable
        .quantile_mut(n64(0.5), &Midpoint)
        .map(|m| m.raw())
        .map_err(|_| MindError::NoVerticesRemaining)
}


/// Compute the modified z-score `0.6745 * |x - median| / MAD` of every value.
///
/// If the median absolute deviation is zero, values at the median score `0.0` and all other values score infinity.
pub fn modified_z_scores(values: ArrayView1<f64>) -> Result<Array1<f64>> {
    let center = median(values)?;
    let deviations = values.mapv(|x| (x - center).abs());
    deviation_scores(deviations)
}


/// Flag the rows of `points` (observations x dimensions) whose modified z-score exceeds `threshold`.
///
/// Each row is first reduced to its Euclidean distance from the per-column median. For a single column this
/// is the classic univariate test of Iglewicz and Hoaglin.
pub fn outlier_mask(points: ArrayView2<f64>, threshold: f64) -> Result<Vec<bool>> {
    let mut centers = Vec::with_capacity(points.ncols());
    for column in points.axis_iter(Axis(1)) {
        centers.push(median(column)?);
    }

    let distances: Array1<f64> = points
        .outer_iter()
        .map(|row| {
            row.iter()
                .zip(centers.iter())
                .map(|(x, c)| (x - c) * (x - c))
                .sum::<f64>()
                .sqrt()
        })
        .collect();

    let scores = deviation_scores(distances)?;
    Ok(scores.iter().map(|&s| s > threshold).collect())
}


fn deviation_scores(deviations: Array1<f64>) -> Result<Array1<f64>> {
    let mad = median(deviations.view())?;
    if mad == 0.0 {
        return Ok(deviations.mapv(|d| if d > 0.0 { f64::INFINITY } else { 0.0 }));
    }
    Ok(deviations.mapv(|d| MAD_CONSISTENCY * d / mad))
}


#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    #[test]
    fn median_of_odd_length_is_the_middle_value() {
        let values = array![3.0, 1.0, 2.0, 9.0, 4.0];
        assert_abs_diff_eq!(3.0, median(values.view()).unwrap());
    }

    #[test]
    fn median_of_even_length_is_the_midpoint() {
        let values = array![4.0, 1.0, 2.0, 3.0];
        assert_abs_diff_eq!(2.5, median(values.view()).unwrap());
    }

    #[test]
    fn median_of_empty_input_is_an_error() {
        let values: Array1<f64> = Array1::zeros(0);
        assert!(median(values.view()).is_err());
    }

    #[test]
    fn modified_z_scores_are_computed_correctly() {
        // median 3, absolute deviations [2, 1, 0, 1, 97], MAD 1
        let values = array![1.0, 2.0, 3.0, 4.0, 100.0];
        let scores = modified_z_scores(values.view()).unwrap();
        assert_abs_diff_eq!(scores, array![1.349, 0.6745, 0.0, 0.6745, 65.4265], epsilon = 1e-9);
    }

    #[test]
    fn outlier_mask_flags_only_the_far_point() {
        let values = array![[1.0], [2.0], [3.0], [4.0], [100.0]];
        let mask = outlier_mask(values.view(), 7.0).unwrap();
        assert_eq!(vec![false, false, false, false, true], mask);
    }

    #[test]
    fn outlier_mask_reduces_rows_to_distances_from_the_median() {
        let points = Array2::from_shape_vec(
            (5, 2),
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, -1.0, 0.0, 30.0, 40.0],
        )
        .unwrap();
        // Column medians are (0, 0); distances [0, 1, 1, 1, 50], MAD 1.
        let mask = outlier_mask(points.view(), 7.0).unwrap();
        assert_eq!(vec![false, false, false, false, true], mask);
    }

    #[test]
    fn zero_mad_flags_every_value_off_the_median() {
        let values = array![[5.0], [5.0], [5.0], [6.0], [5.0], [40.0]];
        let mask = outlier_mask(values.view(), 7.0).unwrap();
        assert_eq!(vec![false, false, false, true, false, true], mask);

        let scores = modified_z_scores(values.column(0)).unwrap();
        assert_eq!(0.0, scores[0]);
        assert_eq!(f64::INFINITY, scores[5]);
    }
}
