//! Model assembly: volume-proportional point allocation and overlap exclusion.
//!
//! Subunits are processed in declaration order. With exclusion enabled, the points
//! of subunit `i` are tested against every earlier subunit `j < i` in turn and the
//! ones inside `j` are dropped, so later subunits carve into earlier ones and never
//! the other way round.

use rand::RngCore;
use rayon::prelude::*;
use tracing::debug;

use crate::domain::{AssembledModel, PointCloud, SubunitDescriptor, SubunitReport};
use crate::error::AppError;
use crate::math::Placement;
use crate::models::{ShapeProvider, ShapeRegistry};
use crate::points::generate;

/// Build the point cloud for a composite model.
pub fn assemble(
    subunits: &[SubunitDescriptor],
    total_points: usize,
    exclude_overlap: bool,
    registry: &ShapeRegistry,
    rng: &mut dyn RngCore,
) -> Result<AssembledModel, AppError> {
    if subunits.is_empty() {
        return Err(AppError::new(2, "Model has no subunits."));
    }
    if total_points == 0 {
        return Err(AppError::new(2, "Number of points must be > 0."));
    }

    let mut providers: Vec<&dyn ShapeProvider> = Vec::with_capacity(subunits.len());
    let mut volumes = Vec::with_capacity(subunits.len());
    for (i, subunit) in subunits.iter().enumerate() {
        let provider = registry.resolve(&subunit.shape)?;
        let context =
            |e: AppError| AppError::new(e.exit_code(), format!("Subunit {i} ({}): {e}", subunit.shape));
        provider.validate(&subunit.dimensions).map_err(context)?;
        let volume = provider.volume(&subunit.dimensions).map_err(context)?;
        if !subunit.contrast.is_finite() {
            return Err(AppError::new(
                2,
                format!("Subunit {i} ({}): contrast must be finite.", subunit.shape),
            ));
        }
        providers.push(provider);
        volumes.push(volume);
    }

    let volume_sum: f64 = volumes.iter().sum();
    let placements: Vec<Placement> = subunits.iter().map(SubunitDescriptor::placement).collect();

    let mut cloud = PointCloud::default();
    let mut reports = Vec::with_capacity(subunits.len());
    let mut total_volume = 0.0;

    for (i, subunit) in subunits.iter().enumerate() {
        let volume = volumes[i];
        let requested = (total_points as f64 * volume / volume_sum).floor() as usize;

        let points = generate(subunit, providers[i], requested, rng)?;
        if let Some(bad) = points.iter().position(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(AppError::new(
                4,
                format!(
                    "points: subunit {i} ({}) produced a non-finite coordinate at index {bad}.",
                    subunit.shape
                ),
            ));
        }

        let mut keep = vec![true; points.len()];
        let mut excluded = 0usize;

        if exclude_overlap {
            for j in 0..i {
                if excluded == points.len() || volume <= 0.0 {
                    break;
                }
                let kept: Vec<usize> = (0..points.len()).filter(|&k| keep[k]).collect();
                let local: Vec<_> = kept
                    .par_iter()
                    .map(|&k| placements[j].to_local(&points[k]))
                    .collect();
                let inside = providers[j].check_overlap(&subunits[j].dimensions, &local)?;
                for idx in inside {
                    let k = kept[idx];
                    if keep[k] {
                        keep[k] = false;
                        excluded += 1;
                    }
                }
            }
        }

        let remaining = points.len() - excluded;
        let contributed_volume = if requested > 0 {
            volume * remaining as f64 / requested as f64
        } else {
            0.0
        };
        total_volume += contributed_volume;

        let density = remaining as f64 / volume;
        debug!(
            subunit = i,
            shape = %subunit.shape,
            requested,
            excluded,
            remaining,
            density,
            "subunit assembled"
        );

        cloud.extend_uniform(
            points
                .into_iter()
                .zip(&keep)
                .filter_map(|(p, &k)| k.then_some(p)),
            subunit.contrast,
        );
        reports.push(SubunitReport {
            shape: subunit.shape.clone(),
            volume,
            requested,
            excluded,
            remaining,
            density,
            scattering_density: density * subunit.contrast,
            contributed_volume,
        });
    }

    Ok(AssembledModel {
        cloud,
        subunits: reports,
        total_volume,
    })
}
