//! Contrast-weighted pair distance distribution p(r).
//!
//! Every unordered pair `i < j` contributes `2·Δρ_i·Δρ_j` to the bin holding its
//! distance, which equals histogramming the full N×N matrix without the diagonal.
//! Distances are rounded to `f32` before binning.
//!
//! With polydispersity σ > 0 the histogram is averaged over ten size factors
//! `f ∈ [1 − 3σ, 1 + 3σ]` weighted by `exp(−((1 − f)/σ)²/2)·f⁶`. All factors are
//! binned in the same pass over the pairs.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::domain::{PairDistribution, PointCloud};
use crate::error::AppError;

/// Size factors in the polydispersity average.
pub const POLYDISPERSITY_FACTORS: usize = 10;

/// Margin on the largest pair distance for the histogram range.
const RANGE_MARGIN: f64 = 1.05;

/// A size factor this close to 1 reuses the unscaled bin index.
const UNIT_FACTOR_TOL: f64 = 1e-12;

/// Relative size factors and their weights.
pub fn polydispersity_factors(polydispersity: f64) -> Vec<(f64, f64)> {
    if polydispersity <= 0.0 {
        return vec![(1.0, 1.0)];
    }
    let lo = 1.0 - 3.0 * polydispersity;
    let hi = 1.0 + 3.0 * polydispersity;
    let step = (hi - lo) / (POLYDISPERSITY_FACTORS - 1) as f64;
    (0..POLYDISPERSITY_FACTORS)
        .map(|i| {
            let factor = lo + step * i as f64;
            let weight = (-0.5 * ((1.0 - factor) / polydispersity).powi(2)).exp() * factor.powi(6);
            (factor, weight)
        })
        .collect()
}

/// Largest pairwise distance in the cloud.
pub fn max_pair_distance(cloud: &PointCloud) -> f64 {
    let pts = cloud.positions();
    (0..pts.len())
        .into_par_iter()
        .map(|i| {
            pts[i + 1..]
                .iter()
                .map(|q| (q - pts[i]).norm())
                .fold(0.0, f64::max)
        })
        .reduce(|| 0.0, f64::max)
}

/// Bin index for a distance on `[0, r_max]`; the right edge belongs to the last bin.
fn bin_index(d: f64, dr: f64, r_max: f64, n_bins: usize) -> Option<usize> {
    if !(d >= 0.0 && d <= r_max) {
        return None;
    }
    Some(((d / dr) as usize).min(n_bins - 1))
}

/// Compute p(r) on `n_bins` bins and the radius of gyration.
pub fn compute_pr(
    cloud: &PointCloud,
    n_bins: usize,
    polydispersity: f64,
) -> Result<PairDistribution, AppError> {
    if n_bins == 0 {
        return Err(AppError::new(2, "Number of p(r) bins must be > 0."));
    }
    if !(polydispersity.is_finite() && polydispersity >= 0.0) {
        return Err(AppError::new(
            2,
            format!("Polydispersity must be finite and >= 0, got {polydispersity}."),
        ));
    }
    let n = cloud.len();
    if n < 2 {
        return Err(AppError::new(
            4,
            format!("p(r): at least two points are needed, the model has {n}."),
        ));
    }

    let d_max = max_pair_distance(cloud);
    if !(d_max.is_finite() && d_max > 0.0) {
        return Err(AppError::new(
            4,
            format!("p(r): degenerate point cloud (largest distance {d_max})."),
        ));
    }

    let inflation = if polydispersity > 0.0 {
        1.0 + 3.0 * polydispersity
    } else {
        1.0
    };
    let r_max = RANGE_MARGIN * d_max * inflation;
    let dr = r_max / n_bins as f64;
    let r: Vec<f64> = (0..n_bins).map(|i| (i as f64 + 0.5) * dr).collect();

    let factors = polydispersity_factors(polydispersity);
    let unit: Vec<bool> = factors
        .iter()
        .map(|(f, _)| (f - 1.0).abs() < UNIT_FACTOR_TOL)
        .collect();

    let pts = cloud.positions();
    let contrasts = cloud.contrasts();
    let empty = || vec![vec![0.0f64; n_bins]; factors.len()];

    let hists = (0..n)
        .into_par_iter()
        .fold(empty, |mut acc, i| {
            for j in (i + 1)..n {
                let d = (pts[j] - pts[i]).norm() as f32 as f64;
                if d == 0.0 {
                    continue;
                }
                let w = 2.0 * (contrasts[i] * contrasts[j]) as f32 as f64;
                let base = bin_index(d, dr, r_max, n_bins);
                for (k, (factor, _)) in factors.iter().enumerate() {
                    let idx = if unit[k] {
                        base
                    } else {
                        bin_index(d * factor, dr, r_max, n_bins)
                    };
                    if let Some(b) = idx {
                        acc[k][b] += w;
                    }
                }
            }
            acc
        })
        .reduce(empty, |mut a, b| {
            for (ha, hb) in a.iter_mut().zip(b) {
                for (x, y) in ha.iter_mut().zip(hb) {
                    *x += y;
                }
            }
            a
        });

    let weight_sum: f64 = factors.iter().map(|(_, w)| w).sum();
    let mut hist = vec![0.0; n_bins];
    for (h, (_, w)) in hists.iter().zip(&factors) {
        for (acc, v) in hist.iter_mut().zip(h) {
            *acc += w * v;
        }
    }
    for v in &mut hist {
        *v /= weight_sum;
    }

    let scale = normalisation_scale(&hist);
    let n2 = (n as f64).powi(2);
    let pr: Vec<f64> = hist.iter().map(|h| h / n2).collect();
    let pr_norm: Vec<f64> = hist.iter().map(|h| h / scale).collect();

    if pr_norm.iter().sum::<f64>() == 0.0 {
        warn!("p(r) sums to zero (contrasts cancel), reporting Rg = 0");
    }
    let rg = radius_of_gyration(&r, &pr_norm);
    if !rg.is_finite() {
        return Err(AppError::new(4, "p(r): radius of gyration is not finite."));
    }

    debug!(points = n, d_max, r_max, rg, "pair distribution computed");

    Ok(PairDistribution {
        r,
        pr,
        pr_norm,
        dr,
        r_max,
        d_max,
        rg,
    })
}

/// Divisor for `pr_norm`: the histogram peak, or its largest magnitude when no bin
/// is positive. An all-zero histogram is left as is.
fn normalisation_scale(hist: &[f64]) -> f64 {
    let peak = hist.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if peak > 0.0 {
        return peak;
    }
    let magnitude = hist.iter().fold(0.0f64, |m, h| m.max(h.abs()));
    if magnitude > 0.0 {
        warn!(peak, "p(r) has no positive bin, normalising by its largest magnitude");
        magnitude
    } else {
        warn!("p(r) is zero everywhere (all contrast products vanish)");
        1.0
    }
}

/// `Rg = sqrt(|Σ p(r)·r² / Σ p(r)| / 2)`; a vanishing `Σ p(r)` gives 0.
pub fn radius_of_gyration(r: &[f64], pr: &[f64]) -> f64 {
    let num: f64 = r.iter().zip(pr).map(|(r, p)| p * r * r).sum();
    let den: f64 = pr.iter().sum();
    if den == 0.0 {
        return 0.0;
    }
    ((num / den).abs() / 2.0).sqrt()
}
