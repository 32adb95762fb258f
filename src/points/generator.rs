use nalgebra::Point3;
use rand::RngCore;

use crate::domain::SubunitDescriptor;
use crate::error::AppError;
use crate::models::ShapeProvider;

/// Points of one subunit in model space.
///
/// The provider samples `n_points` in the subunit's local frame; each point is then
/// rotated about the pivot and translated by the centre of mass.
pub fn generate(
    subunit: &SubunitDescriptor,
    provider: &dyn ShapeProvider,
    n_points: usize,
    rng: &mut dyn RngCore,
) -> Result<Vec<Point3<f64>>, AppError> {
    if n_points == 0 {
        return Ok(Vec::new());
    }
    let local = provider.point_distribution(&subunit.dimensions, n_points, rng)?;
    let placement = subunit.placement();
    Ok(local.iter().map(|p| placement.to_model(p)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cuboid, Sphere};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn zero_points_gives_empty_output() {
        let mut rng = StdRng::seed_from_u64(3);
        let subunit = SubunitDescriptor::new("sphere", vec![10.0]);
        assert!(generate(&subunit, &Sphere, 0, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn translation_moves_centroid() {
        let mut rng = StdRng::seed_from_u64(5);
        let subunit = SubunitDescriptor::new("sphere", vec![10.0]).with_com([100.0, -20.0, 5.0]);
        let points = generate(&subunit, &Sphere, 4000, &mut rng).unwrap();
        let n = points.len() as f64;
        let cx = points.iter().map(|p| p.x).sum::<f64>() / n;
        let cy = points.iter().map(|p| p.y).sum::<f64>() / n;
        let cz = points.iter().map(|p| p.z).sum::<f64>() / n;
        assert!((cx - 100.0).abs() < 0.5, "cx = {cx}");
        assert!((cy + 20.0).abs() < 0.5, "cy = {cy}");
        assert!((cz - 5.0).abs() < 0.5, "cz = {cz}");
    }

    #[test]
    fn rotation_reorients_long_axis() {
        // Long cuboid along z, tipped 90° about y, ends up along x.
        let mut rng = StdRng::seed_from_u64(9);
        let subunit =
            SubunitDescriptor::new("cuboid", vec![2.0, 2.0, 100.0]).with_rotation([0.0, 90.0, 0.0], [0.0; 3]);
        let points = generate(&subunit, &Cuboid, 2000, &mut rng).unwrap();
        let max_x = points.iter().map(|p| p.x.abs()).fold(0.0, f64::max);
        let max_z = points.iter().map(|p| p.z.abs()).fold(0.0, f64::max);
        assert!(max_x > 40.0, "max |x| = {max_x}");
        assert!(max_z < 1.0 + 1e-9, "max |z| = {max_z}");
    }
}
