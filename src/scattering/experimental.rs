//! Simulated measurement noise after Sedlak et al.
//!
//! The variance at each q combines the sample counts with a constant background
//! referenced to the counts at `q = 0.3 Å⁻¹`, divided by an effective count
//! proxy `N(q)` that grows linearly up to `q = 1.4 Å⁻¹` and falls off beyond.
//! Counts enter through their magnitude: contrast cancellation can drive I(q)
//! negative, and the variance must stay positive.

use rand::RngCore;
use rand_distr::{Distribution, Normal};

use crate::domain::SimulatedData;
use crate::error::AppError;

const COUNT_SLOPE: f64 = 4500.0;
const Q_THRESHOLD: f64 = 1.4;
const FALLOFF_POWER: f64 = 3.0;
const FALLOFF_WIDTH: f64 = 0.6;
const BACKGROUND_FRACTION: f64 = 0.85;
const Q_REFERENCE: f64 = 0.3;

/// Effective photon-count proxy `N(q)`.
pub fn count_proxy(q: f64) -> f64 {
    if q <= Q_THRESHOLD {
        COUNT_SLOPE * q
    } else {
        COUNT_SLOPE
            * Q_THRESHOLD
            * (-0.5 * ((q - Q_THRESHOLD) / FALLOFF_WIDTH).powf(FALLOFF_POWER)).exp()
    }
}

/// Index of the reference intensity: first `q >= 0.3`, else the second-to-last point.
pub fn reference_index(q: &[f64]) -> usize {
    q.iter()
        .position(|&v| v >= Q_REFERENCE)
        .unwrap_or_else(|| q.len().saturating_sub(2))
}

/// Draw a noisy dataset `I_sim ~ N(I0·I_norm, σ)` with the empirical σ(q).
pub fn simulate(
    q: &[f64],
    i0: f64,
    i_norm: &[f64],
    exposure: f64,
    rng: &mut dyn RngCore,
) -> Result<SimulatedData, AppError> {
    if q.is_empty() {
        return Err(AppError::new(2, "noise: q grid is empty."));
    }
    if q.len() != i_norm.len() {
        return Err(AppError::new(
            4,
            format!("noise: q has {} values but I(q) has {}.", q.len(), i_norm.len()),
        ));
    }

    let counts: Vec<f64> = i_norm.iter().map(|i| (exposure * i0 * i).abs()).collect();
    let i_arb = counts[reference_index(q)];
    let background = 2.0 * BACKGROUND_FRACTION * i_arb / (1.0 - BACKGROUND_FRACTION);

    let mut intensity = Vec::with_capacity(q.len());
    let mut sigma = Vec::with_capacity(q.len());
    for (k, (&qv, &count)) in q.iter().zip(&counts).enumerate() {
        let variance = (count + background) / count_proxy(qv);
        if !variance.is_finite() {
            return Err(AppError::new(
                4,
                format!("noise: variance {variance} at q = {qv} (index {k}) is not usable."),
            ));
        }
        let s = variance.sqrt() / exposure;
        let mean = i0 * i_norm[k];
        let normal = Normal::new(mean, s).map_err(|e| {
            AppError::new(4, format!("noise: cannot sample at q = {qv} (σ = {s}): {e}"))
        })?;
        intensity.push(normal.sample(&mut *rng));
        sigma.push(s);
    }

    Ok(SimulatedData {
        q: q.to_vec(),
        intensity,
        sigma,
    })
}
