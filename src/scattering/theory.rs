//! Debye transform of p(r) into P(q), I(0) and I(q).

use rayon::prelude::*;
use tracing::warn;

use crate::domain::{PairDistribution, TheoreticalCurve};
use crate::error::AppError;
use crate::math::sinc;

/// Stand-in for an exactly zero forward scattering.
pub const I0_EPSILON: f64 = 1e-5;

/// Converts `Σp(r)·c·V` to intensities of order unity.
pub const I0_SCALE: f64 = 1e-4;

/// Forward scattering `I0` and normalised form factor `P(q)`.
///
/// `P(q) = Σ p(r)·sinc(q·r) / Σ p(r)`, so `P(0) = 1` for any p(r). A zero `Σ p(r)`
/// is replaced by [`I0_EPSILON`]; a negative one is kept for `P(q)` and its magnitude
/// used for the absolute scale.
pub fn compute_pq_i0(
    q: &[f64],
    r: &[f64],
    pr: &[f64],
    concentration: f64,
    total_volume: f64,
) -> Result<(f64, Vec<f64>), AppError> {
    if r.len() != pr.len() {
        return Err(AppError::new(
            4,
            format!("theory: r has {} values but p(r) has {}.", r.len(), pr.len()),
        ));
    }

    let mut i0: f64 = pr.iter().sum();
    if i0 == 0.0 {
        warn!(epsilon = I0_EPSILON, "forward scattering is zero, substituting epsilon");
        i0 = I0_EPSILON;
    } else if i0 < 0.0 {
        warn!(i0, "forward scattering is negative, using its magnitude");
    }

    let pq: Vec<f64> = q
        .par_iter()
        .map(|&qv| {
            r.iter()
                .zip(pr)
                .map(|(&rv, &p)| p * sinc(qv * rv))
                .sum::<f64>()
                / i0
        })
        .collect();

    let scaled = i0.abs() * concentration * total_volume * I0_SCALE;
    if !scaled.is_finite() {
        return Err(AppError::new(4, format!("theory: I0 is not finite ({scaled}).")));
    }
    Ok((scaled, pq))
}

/// `I(q) = P(q)·S(q)`, damped by `exp(−(q·σ)²/2)` when `σ > 0`.
///
/// `structure_factor = None` means `S(q) = 1`.
pub fn compute_iq(
    q: &[f64],
    pq: &[f64],
    structure_factor: Option<&[f64]>,
    sigma_roughness: f64,
) -> Result<Vec<f64>, AppError> {
    if q.len() != pq.len() {
        return Err(AppError::new(
            4,
            format!("theory: q has {} values but P(q) has {}.", q.len(), pq.len()),
        ));
    }
    if let Some(s) = structure_factor {
        if s.len() != pq.len() {
            return Err(AppError::new(
                2,
                format!(
                    "Structure factor has {} values but the q grid has {}.",
                    s.len(),
                    pq.len()
                ),
            ));
        }
    }
    if !(sigma_roughness.is_finite() && sigma_roughness >= 0.0) {
        return Err(AppError::new(
            2,
            format!("Interface roughness must be finite and >= 0, got {sigma_roughness}."),
        ));
    }

    let iq = pq
        .iter()
        .enumerate()
        .map(|(k, &p)| {
            let s = structure_factor.map_or(1.0, |s| s[k]);
            let mut i = p * s;
            if sigma_roughness > 0.0 {
                i *= (-0.5 * (q[k] * sigma_roughness).powi(2)).exp();
            }
            i
        })
        .collect();
    Ok(iq)
}

/// Full theoretical curve for a pair distribution.
pub fn theoretical_curve(
    q: &[f64],
    pair: &PairDistribution,
    concentration: f64,
    total_volume: f64,
    structure_factor: Option<&[f64]>,
    sigma_roughness: f64,
) -> Result<TheoreticalCurve, AppError> {
    let (i0, pq) = compute_pq_i0(q, &pair.r, &pair.pr, concentration, total_volume)?;
    let iq = compute_iq(q, &pq, structure_factor, sigma_roughness)?;
    let s_eff = structure_factor.map_or_else(|| vec![1.0; q.len()], <[f64]>::to_vec);
    Ok(TheoreticalCurve {
        q: q.to_vec(),
        i0,
        pq,
        s_eff,
        iq,
    })
}
