//! Nonparametric estimation of the Kullback-Leibler divergence between the feature distributions of two regions.
//!
//! The estimator follows Pérez-Cruz (2008), "Kullback-Leibler divergence estimation of continuous distributions",
//! using the distance of each sample to its nearest neighbour within its own region and within the other region.
//! Eq. 14 of the paper misses a negative sign on the first term of its right hand side; the sign is corrected here.

use log::{debug, trace};

use crate::error::{MindError, Result};
use crate::region::IndexedRegion;


/// Estimate the directed divergence `D(source -> target)`.
///
/// For each of the `n` points of `source`, `r` is the distance to its nearest other point in `source` and `s` the
/// distance to its nearest point in `target` (`m` points). Ratios `r/s` which are zero, infinite or NaN are
/// discarded: they result from vertices with exactly identical feature values. With the remaining ratios and
/// feature dimension `d`, the estimate is `-(d/n) * sum(ln(r/s)) + ln(m/(n-1))`, floored at zero.
///
/// # Errors
///
/// [`MindError::DivergenceUndefined`] if `source` has fewer than 2 points or fewer than 2 ratios are usable,
/// [`MindError::DimensionMismatch`] if the regions have different feature dimensions.
pub fn directed_divergence(source: &IndexedRegion, target: &IndexedRegion) -> Result<f64> {
    let x = &source.index;
    let y = &target.index;

    if x.dim() != y.dim() {
        return Err(MindError::DimensionMismatch { expected: x.dim(), found: y.dim() });
    }

    let n = x.len();
    let m = y.len();
    if n <= 1 || m == 0 {
        return Err(undefined(source, target, 0));
    }

    let mut log_ratio_sum = 0.0;
    let mut valid_ratios = 0;
    for i in 0..n {
        let point = x.point(i);
        // The first neighbour within the own region is the point itself.
        let r = x.kth_distance(point, 2);
        let s = y.kth_distance(point, 1);
        if let (Some(r), Some(s)) = (r, s) {
            let ratio = r / s;
            if ratio.is_finite() && ratio != 0.0 {
                log_ratio_sum += ratio.ln();
                valid_ratios += 1;
            }
        }
    }

    if valid_ratios < 2 {
        return Err(undefined(source, target, valid_ratios));
    }
    if valid_ratios < n {
        debug!("Discarded {} of {} neighbour ratios for '{}' -> '{}' due to coinciding feature vectors.", n - valid_ratios, n, source.name, target.name);
    }

    let d = x.dim() as f64;
    let kl = -log_ratio_sum * d / n as f64 + (m as f64 / (n as f64 - 1.0)).ln();
    Ok(kl.max(0.0))
}


/// Estimate the symmetrized divergence `D(a -> b) + D(b -> a)`.
pub fn symmetric_divergence(a: &IndexedRegion, b: &IndexedRegion) -> Result<f64> {
    let kl = directed_divergence(a, b)? + directed_divergence(b, a)?;
    trace!("Divergence between '{}' and '{}': {}", a.name, b.name, kl);
    Ok(kl)
}


fn undefined(source: &IndexedRegion, target: &IndexedRegion, valid_ratios: usize) -> MindError {
    MindError::DivergenceUndefined {
        source_region: source.name.clone(),
        target_region: target.name.clone(),
        valid_ratios,
    }
}
