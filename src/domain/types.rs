//! Shared domain types.
//!
//! Inputs (`SubunitDescriptor`, `ModelProfile`, `SimConfig`) are serde-friendly so
//! model files can be read straight into them. Outputs are plain owned arrays,
//! produced once per run and never mutated afterwards.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::math::Placement;

/// One geometric primitive of a composite model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubunitDescriptor {
    /// Shape tag resolved against the `ShapeRegistry`.
    pub shape: String,
    pub dimensions: Vec<f64>,
    /// Excess scattering length density Δρ.
    #[serde(default = "default_contrast")]
    pub contrast: f64,
    /// Centre-of-mass offset in Å.
    #[serde(default)]
    pub com: [f64; 3],
    /// Euler angles (α, β, γ) in degrees.
    #[serde(default)]
    pub rotation: [f64; 3],
    #[serde(default)]
    pub rotation_point: [f64; 3],
}

fn default_contrast() -> f64 {
    1.0
}

impl SubunitDescriptor {
    /// Subunit at the origin with no rotation and unit contrast.
    pub fn new(shape: impl Into<String>, dimensions: Vec<f64>) -> Self {
        Self {
            shape: shape.into(),
            dimensions,
            contrast: default_contrast(),
            com: [0.0; 3],
            rotation: [0.0; 3],
            rotation_point: [0.0; 3],
        }
    }

    pub fn with_contrast(mut self, contrast: f64) -> Self {
        self.contrast = contrast;
        self
    }

    pub fn with_com(mut self, com: [f64; 3]) -> Self {
        self.com = com;
        self
    }

    pub fn with_rotation(mut self, rotation: [f64; 3], rotation_point: [f64; 3]) -> Self {
        self.rotation = rotation;
        self.rotation_point = rotation_point;
        self
    }

    /// Local-to-model placement of this subunit.
    pub fn placement(&self) -> Placement {
        Placement::new(self.rotation, self.rotation_point, self.com)
    }
}

/// A composite model as stored in a model file.
///
/// The optional sample settings override the command-line values for this model only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProfile {
    #[serde(default)]
    pub name: Option<String>,
    pub subunits: Vec<SubunitDescriptor>,
    #[serde(default)]
    pub exclude_overlap: Option<bool>,
    #[serde(default)]
    pub polydispersity: Option<f64>,
    #[serde(default, alias = "conc")]
    pub concentration: Option<f64>,
    #[serde(default, alias = "sigma_r")]
    pub sigma_roughness: Option<f64>,
}

impl Default for ModelProfile {
    /// One sphere of radius 50 Å with unit contrast.
    fn default() -> Self {
        Self {
            name: None,
            subunits: vec![SubunitDescriptor::new("sphere", vec![50.0])],
            exclude_overlap: None,
            polydispersity: None,
            concentration: None,
            sigma_roughness: None,
        }
    }
}

/// Where the q values come from.
#[derive(Debug, Clone, PartialEq)]
pub enum QSource {
    Uniform { qmin: f64, qmax: f64, n: usize },
    Sampled(Vec<f64>),
}

/// Everything a simulation run needs, independent of the CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub model: ModelProfile,
    pub total_points: usize,
    pub n_bins: usize,
    pub q: QSource,
    pub exposure: f64,
    /// Relative σ on overall size; 0 disables polydispersity.
    pub polydispersity: f64,
    pub concentration: f64,
    /// Interface roughness σ in Å; 0 disables damping.
    pub sigma_roughness: f64,
    pub exclude_overlap: bool,
    pub seed: u64,
    /// Precomputed structure factor aligned to the q grid (`None` means all ones).
    pub structure_factor: Option<Vec<f64>>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            model: ModelProfile::default(),
            total_points: 3000,
            n_bins: 100,
            q: QSource::Uniform {
                qmin: 0.001,
                qmax: 0.5,
                n: 400,
            },
            exposure: 500.0,
            polydispersity: 0.0,
            concentration: 0.02,
            sigma_roughness: 0.0,
            exclude_overlap: true,
            seed: 42,
            structure_factor: None,
        }
    }
}

/// Points of an assembled model with one contrast value per point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    positions: Vec<Point3<f64>>,
    contrasts: Vec<f64>,
}

impl PointCloud {
    pub fn new(positions: Vec<Point3<f64>>, contrasts: Vec<f64>) -> Result<Self, AppError> {
        if positions.len() != contrasts.len() {
            return Err(AppError::new(
                4,
                format!(
                    "Point cloud has {} positions but {} contrasts.",
                    positions.len(),
                    contrasts.len()
                ),
            ));
        }
        Ok(Self {
            positions,
            contrasts,
        })
    }

    /// Append points that all share one contrast.
    pub fn extend_uniform(&mut self, points: impl IntoIterator<Item = Point3<f64>>, contrast: f64) {
        for p in points {
            self.positions.push(p);
            self.contrasts.push(contrast);
        }
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn contrasts(&self) -> &[f64] {
        &self.contrasts
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Per-subunit bookkeeping from model assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct SubunitReport {
    pub shape: String,
    pub volume: f64,
    pub requested: usize,
    pub excluded: usize,
    pub remaining: usize,
    /// Remaining points per Å³.
    pub density: f64,
    /// `density × Δρ`.
    pub scattering_density: f64,
    /// Volume share left after exclusion.
    pub contributed_volume: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssembledModel {
    pub cloud: PointCloud,
    pub subunits: Vec<SubunitReport>,
    pub total_volume: f64,
}

impl AssembledModel {
    pub fn requested_points(&self) -> usize {
        self.subunits.iter().map(|s| s.requested).sum()
    }

    pub fn remaining_points(&self) -> usize {
        self.subunits.iter().map(|s| s.remaining).sum()
    }
}

/// Contrast-weighted pair distance distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct PairDistribution {
    /// Bin centres, `r[i] = (i + 0.5)·dr`.
    pub r: Vec<f64>,
    /// Histogram divided by N² (absolute scale).
    pub pr: Vec<f64>,
    /// Histogram divided by its maximum.
    pub pr_norm: Vec<f64>,
    pub dr: f64,
    pub r_max: f64,
    pub d_max: f64,
    pub rg: f64,
}

/// Form factor and intensity on a q grid.
#[derive(Debug, Clone, PartialEq)]
pub struct TheoreticalCurve {
    pub q: Vec<f64>,
    /// Absolute forward scattering.
    pub i0: f64,
    pub pq: Vec<f64>,
    /// Effective structure factor applied to `P(q)`.
    pub s_eff: Vec<f64>,
    /// `P(q)·S(q)` with optional roughness damping, normalised to the form factor at q = 0.
    pub iq: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedData {
    pub q: Vec<f64>,
    pub intensity: Vec<f64>,
    pub sigma: Vec<f64>,
}
