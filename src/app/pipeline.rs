//! The simulation pipeline shared by the CLI and library callers.
//!
//! assemble -> p(r) -> theory -> noise, in that fixed order. Each run owns all of
//! its arrays; nothing is cached between runs.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, instrument};

use crate::domain::{AssembledModel, PairDistribution, SimConfig, SimulatedData, TheoreticalCurve};
use crate::error::AppError;
use crate::models::ShapeRegistry;
use crate::points::assemble;
use crate::scattering::{QGrid, compute_pr, simulate, theoretical_curve};

/// Offset separating the noise stream from the point stream.
const NOISE_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// All outputs of one simulation run.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub model: AssembledModel,
    pub pair: PairDistribution,
    pub theory: TheoreticalCurve,
    pub simulated: SimulatedData,
}

/// Execute the full pipeline for one configuration.
#[instrument(skip_all, fields(subunits = config.model.subunits.len(), points = config.total_points))]
pub fn run_simulation(config: &SimConfig, registry: &ShapeRegistry) -> Result<SimulationRun, AppError> {
    // Validate the q grid before the expensive stages.
    let q = QGrid::from_source(&config.q)?;
    if let Some(s) = &config.structure_factor {
        if s.len() != q.len() {
            return Err(AppError::new(
                2,
                format!("Structure factor has {} values but the q grid has {}.", s.len(), q.len()),
            ));
        }
    }

    let mut point_rng = StdRng::seed_from_u64(config.seed);
    let mut noise_rng = StdRng::seed_from_u64(config.seed ^ NOISE_STREAM);

    let model = assemble(
        &config.model.subunits,
        config.total_points,
        config.exclude_overlap,
        registry,
        &mut point_rng,
    )?;
    info!(
        points = model.cloud.len(),
        total_volume = model.total_volume,
        "model assembled"
    );

    let pair = compute_pr(&model.cloud, config.n_bins, config.polydispersity)?;
    info!(d_max = pair.d_max, rg = pair.rg, "pair distribution done");

    let theory = theoretical_curve(
        q.values(),
        &pair,
        config.concentration,
        model.total_volume,
        config.structure_factor.as_deref(),
        config.sigma_roughness,
    )?;
    info!(i0 = theory.i0, "theoretical curve done");

    let simulated = simulate(q.values(), theory.i0, &theory.iq, config.exposure, &mut noise_rng)?;
    info!(q_points = simulated.q.len(), "simulated data done");

    Ok(SimulationRun {
        model,
        pair,
        theory,
        simulated,
    })
}
