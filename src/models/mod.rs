//! Subunit shape providers and the registry that resolves shape tags.
//!
//! Every subunit type (sphere, cylinder, ...) is a stateless provider that answers
//! three questions for a given dimension vector:
//!
//! - its volume
//! - a uniform random point distribution inside its local, origin-centred frame
//! - which of a set of local-frame points lie strictly inside it
//!
//! The registry is an explicit tag -> provider map built once and handed to the
//! point assembler. Unknown tags are a configuration error.

use std::collections::BTreeMap;
use std::sync::Arc;

use nalgebra::Point3;
use rand::RngCore;

use crate::error::AppError;

pub mod shapes;

pub use shapes::*;

/// Contract between the point assembler and one kind of subunit.
pub trait ShapeProvider: Send + Sync {
    /// Canonical shape name (used in diagnostics).
    fn name(&self) -> &'static str;

    /// Labels for each dimension, in order (e.g. `["R", "L"]`).
    fn dimension_labels(&self) -> &'static [&'static str];

    /// Check the dimension vector (count, sign, ordering constraints).
    fn validate(&self, dims: &[f64]) -> Result<(), AppError>;

    /// Volume of the shape for the given dimensions.
    fn volume(&self, dims: &[f64]) -> Result<f64, AppError>;

    /// `n` points uniformly distributed inside the shape (local frame).
    fn point_distribution(
        &self,
        dims: &[f64],
        n: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Point3<f64>>, AppError>;

    /// Indices of `points` (local frame) that lie strictly inside the shape.
    fn check_overlap(&self, dims: &[f64], points: &[Point3<f64>]) -> Result<Vec<usize>, AppError>;
}

/// Tag -> provider lookup.
#[derive(Clone, Default)]
pub struct ShapeRegistry {
    providers: BTreeMap<String, Arc<dyn ShapeProvider>>,
}

impl ShapeRegistry {
    /// Empty registry (no shapes known).
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with all built-in shapes under their canonical tags and aliases.
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        let sphere: Arc<dyn ShapeProvider> = Arc::new(Sphere);
        let hollow_sphere: Arc<dyn ShapeProvider> = Arc::new(HollowSphere);
        let elliptical_cylinder: Arc<dyn ShapeProvider> = Arc::new(EllipticalCylinder);
        let hollow_cube: Arc<dyn ShapeProvider> = Arc::new(HollowCube);
        let cylinder_ring: Arc<dyn ShapeProvider> = Arc::new(CylinderRing);
        let disc_ring: Arc<dyn ShapeProvider> = Arc::new(DiscRing);

        registry.register_arc("sphere", sphere.clone());
        registry.register_arc("ball", sphere);
        registry.register_arc("hollow_sphere", hollow_sphere.clone());
        registry.register_arc("Hollow sphere", hollow_sphere);
        registry.register("cylinder", Cylinder);
        registry.register("ellipsoid", Ellipsoid);
        registry.register_arc("elliptical_cylinder", elliptical_cylinder.clone());
        registry.register_arc("Elliptical cylinder", elliptical_cylinder);
        registry.register("disc", Disc);
        registry.register("cube", Cube);
        registry.register_arc("hollow_cube", hollow_cube.clone());
        registry.register_arc("Hollow cube", hollow_cube);
        registry.register("cuboid", Cuboid);
        registry.register_arc("cyl_ring", cylinder_ring.clone());
        registry.register_arc("Cylinder ring", cylinder_ring);
        registry.register_arc("disc_ring", disc_ring.clone());
        registry.register_arc("Disc ring", disc_ring);
        registry.register("superellipsoid", SuperEllipsoid);

        registry
    }

    /// Register (or replace) a provider under `tag`.
    pub fn register(&mut self, tag: impl Into<String>, provider: impl ShapeProvider + 'static) {
        self.providers.insert(tag.into(), Arc::new(provider));
    }

    pub fn register_arc(&mut self, tag: impl Into<String>, provider: Arc<dyn ShapeProvider>) {
        self.providers.insert(tag.into(), provider);
    }

    /// Look up a provider; unknown tags fail fast.
    pub fn resolve(&self, tag: &str) -> Result<&dyn ShapeProvider, AppError> {
        self.providers.get(tag).map(|p| p.as_ref()).ok_or_else(|| {
            AppError::new(
                2,
                format!(
                    "Unknown subunit shape '{tag}'. Known shapes: {}.",
                    self.tags().collect::<Vec<_>>().join(", ")
                ),
            )
        })
    }

    /// Registered tags in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ShapeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeRegistry")
            .field("tags", &self.tags().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_resolves_aliases_to_same_shape() {
        let registry = ShapeRegistry::builtin();
        assert_eq!(registry.resolve("sphere").unwrap().name(), "sphere");
        assert_eq!(registry.resolve("ball").unwrap().name(), "sphere");
        assert_eq!(registry.resolve("Hollow cube").unwrap().name(), "hollow_cube");
        assert_eq!(registry.resolve("Disc ring").unwrap().name(), "disc_ring");
        assert_eq!(registry.len(), 18);
    }

    #[test]
    fn unknown_tag_is_configuration_error() {
        let registry = ShapeRegistry::builtin();
        let err = registry.resolve("dodecahedron").err().unwrap();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("dodecahedron"));
    }

    #[test]
    fn custom_provider_can_be_injected() {
        let mut registry = ShapeRegistry::new();
        assert!(registry.is_empty());
        registry.register("blob", Sphere);
        assert!(registry.resolve("blob").is_ok());
        assert!(registry.resolve("sphere").is_err());
    }
}
