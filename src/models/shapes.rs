//! Built-in subunit shapes.
//!
//! All built-ins reduce to a handful of solids (ellipsoids, shells, elliptical
//! cylinders, rings, boxes, superellipsoids). Each shape type only knows how to
//! turn its dimension vector into a `Solid`; volume, sampling and containment are
//! shared.
//!
//! Points are sampled by rejection inside the axis-aligned bounding box until
//! exactly `n` points have been accepted, which gives a uniform density.

use std::f64::consts::PI;

use nalgebra::Point3;
use rand::RngCore;
use rand::distributions::{Distribution, Uniform};

use crate::error::AppError;
use crate::math::beta;
use crate::models::ShapeProvider;

/// Upper bound on rejection-sampling draws per accepted point.
const MAX_DRAWS_PER_POINT: usize = 10_000;

/// Geometric primitive behind a built-in shape, in its local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Solid {
    Ellipsoid { a: f64, b: f64, c: f64 },
    Shell { outer: f64, inner: f64 },
    EllipticalCylinder { a: f64, b: f64, half_length: f64 },
    Ring { outer: f64, inner: f64, half_length: f64 },
    Box { half: [f64; 3] },
    HollowBox { outer_half: f64, inner_half: f64 },
    SuperEllipsoid { radius: f64, eps: f64, t: f64, s: f64 },
}

impl Solid {
    pub fn volume(&self) -> f64 {
        match *self {
            Solid::Ellipsoid { a, b, c } => 4.0 / 3.0 * PI * a * b * c,
            Solid::Shell { outer, inner } => 4.0 / 3.0 * PI * (outer.powi(3) - inner.powi(3)),
            Solid::EllipticalCylinder { a, b, half_length } => PI * a * b * 2.0 * half_length,
            Solid::Ring {
                outer,
                inner,
                half_length,
            } => PI * (outer * outer - inner * inner) * 2.0 * half_length,
            Solid::Box { half } => 8.0 * half[0] * half[1] * half[2],
            Solid::HollowBox {
                outer_half,
                inner_half,
            } => 8.0 * (outer_half.powi(3) - inner_half.powi(3)),
            Solid::SuperEllipsoid { radius, eps, t, s } => {
                8.0 / (3.0 * t * s)
                    * eps
                    * radius.powi(3)
                    * beta(1.0 / s, 1.0 / s)
                    * beta(2.0 / t, 1.0 / t)
            }
        }
    }

    /// Half side lengths of the axis-aligned bounding box.
    pub fn half_extents(&self) -> [f64; 3] {
        match *self {
            Solid::Ellipsoid { a, b, c } => [a, b, c],
            Solid::Shell { outer, .. } => [outer; 3],
            Solid::EllipticalCylinder { a, b, half_length } => [a, b, half_length],
            Solid::Ring {
                outer, half_length, ..
            } => [outer, outer, half_length],
            Solid::Box { half } => half,
            Solid::HollowBox { outer_half, .. } => [outer_half; 3],
            Solid::SuperEllipsoid { radius, eps, .. } => [radius, radius, eps * radius],
        }
    }

    /// Strict interior test.
    pub fn contains(&self, p: &Point3<f64>) -> bool {
        let (x, y, z) = (p.x, p.y, p.z);
        match *self {
            Solid::Ellipsoid { a, b, c } => {
                (x / a).powi(2) + (y / b).powi(2) + (z / c).powi(2) < 1.0
            }
            Solid::Shell { outer, inner } => {
                let r2 = x * x + y * y + z * z;
                r2 < outer * outer && r2 > inner * inner
            }
            Solid::EllipticalCylinder { a, b, half_length } => {
                (x / a).powi(2) + (y / b).powi(2) < 1.0 && z.abs() < half_length
            }
            Solid::Ring {
                outer,
                inner,
                half_length,
            } => {
                let r2 = x * x + y * y;
                r2 < outer * outer && r2 > inner * inner && z.abs() < half_length
            }
            Solid::Box { half } => x.abs() < half[0] && y.abs() < half[1] && z.abs() < half[2],
            Solid::HollowBox {
                outer_half,
                inner_half,
            } => {
                let m = x.abs().max(y.abs()).max(z.abs());
                m < outer_half && m > inner_half
            }
            Solid::SuperEllipsoid { radius, eps, t, s } => {
                let xy = (x / radius).abs().powf(s) + (y / radius).abs().powf(s);
                xy.powf(t / s) + (z / (eps * radius)).abs().powf(t) < 1.0
            }
        }
    }

    /// Draw `n` uniformly distributed interior points.
    pub fn sample(&self, n: usize, rng: &mut dyn RngCore) -> Result<Vec<Point3<f64>>, AppError> {
        let mut out = Vec::with_capacity(n);
        if n == 0 {
            return Ok(out);
        }

        let [hx, hy, hz] = self.half_extents();
        let ux = Uniform::new_inclusive(-hx, hx);
        let uy = Uniform::new_inclusive(-hy, hy);
        let uz = Uniform::new_inclusive(-hz, hz);

        let max_draws = n.saturating_mul(MAX_DRAWS_PER_POINT);
        let mut draws = 0usize;
        while out.len() < n {
            if draws >= max_draws {
                return Err(AppError::new(
                    4,
                    format!(
                        "Rejection sampling accepted only {} of {n} points after {draws} draws.",
                        out.len()
                    ),
                ));
            }
            draws += 1;
            let p = Point3::new(ux.sample(&mut *rng), uy.sample(&mut *rng), uz.sample(&mut *rng));
            if self.contains(&p) {
                out.push(p);
            }
        }
        Ok(out)
    }
}

/// A shape whose geometry is fully described by a `Solid`.
pub trait SolidShape: Send + Sync {
    const NAME: &'static str;
    const LABELS: &'static [&'static str];

    fn solid(dims: &[f64]) -> Result<Solid, AppError>;
}

impl<T: SolidShape> ShapeProvider for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn dimension_labels(&self) -> &'static [&'static str] {
        T::LABELS
    }

    fn validate(&self, dims: &[f64]) -> Result<(), AppError> {
        T::solid(dims).map(|_| ())
    }

    fn volume(&self, dims: &[f64]) -> Result<f64, AppError> {
        Ok(T::solid(dims)?.volume())
    }

    fn point_distribution(
        &self,
        dims: &[f64],
        n: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Point3<f64>>, AppError> {
        T::solid(dims)?.sample(n, rng)
    }

    fn check_overlap(&self, dims: &[f64], points: &[Point3<f64>]) -> Result<Vec<usize>, AppError> {
        let solid = T::solid(dims)?;
        Ok(points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| solid.contains(p).then_some(i))
            .collect())
    }
}

/// Parse a fixed-size, strictly positive dimension vector.
fn positive_dims<const N: usize>(
    name: &str,
    labels: &[&str],
    dims: &[f64],
) -> Result<[f64; N], AppError> {
    let arr: [f64; N] = dims.try_into().map_err(|_| {
        AppError::new(
            2,
            format!(
                "Shape '{name}' expects {N} dimension(s) ({}), got {}.",
                labels.join(", "),
                dims.len()
            ),
        )
    })?;
    for (value, label) in arr.iter().zip(labels) {
        if !(value.is_finite() && *value > 0.0) {
            return Err(AppError::new(
                2,
                format!("Shape '{name}': dimension {label} must be finite and > 0, got {value}."),
            ));
        }
    }
    Ok(arr)
}

fn require_inner_smaller(name: &str, outer: f64, inner: f64) -> Result<(), AppError> {
    if inner >= outer {
        return Err(AppError::new(
            2,
            format!("Shape '{name}': inner size {inner} must be smaller than outer size {outer}."),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sphere;

impl SolidShape for Sphere {
    const NAME: &'static str = "sphere";
    const LABELS: &'static [&'static str] = &["R"];

    fn solid(dims: &[f64]) -> Result<Solid, AppError> {
        let [r] = positive_dims(Self::NAME, Self::LABELS, dims)?;
        Ok(Solid::Ellipsoid { a: r, b: r, c: r })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HollowSphere;

impl SolidShape for HollowSphere {
    const NAME: &'static str = "hollow_sphere";
    const LABELS: &'static [&'static str] = &["R", "r"];

    fn solid(dims: &[f64]) -> Result<Solid, AppError> {
        let [outer, inner] = positive_dims(Self::NAME, Self::LABELS, dims)?;
        require_inner_smaller(Self::NAME, outer, inner)?;
        Ok(Solid::Shell { outer, inner })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Cylinder;

impl SolidShape for Cylinder {
    const NAME: &'static str = "cylinder";
    const LABELS: &'static [&'static str] = &["R", "L"];

    fn solid(dims: &[f64]) -> Result<Solid, AppError> {
        let [r, length] = positive_dims(Self::NAME, Self::LABELS, dims)?;
        Ok(Solid::EllipticalCylinder {
            a: r,
            b: r,
            half_length: length / 2.0,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ellipsoid;

impl SolidShape for Ellipsoid {
    const NAME: &'static str = "ellipsoid";
    const LABELS: &'static [&'static str] = &["a", "b", "c"];

    fn solid(dims: &[f64]) -> Result<Solid, AppError> {
        let [a, b, c] = positive_dims(Self::NAME, Self::LABELS, dims)?;
        Ok(Solid::Ellipsoid { a, b, c })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EllipticalCylinder;

impl SolidShape for EllipticalCylinder {
    const NAME: &'static str = "elliptical_cylinder";
    const LABELS: &'static [&'static str] = &["a", "b", "l"];

    fn solid(dims: &[f64]) -> Result<Solid, AppError> {
        let [a, b, length] = positive_dims(Self::NAME, Self::LABELS, dims)?;
        Ok(Solid::EllipticalCylinder {
            a,
            b,
            half_length: length / 2.0,
        })
    }
}

/// Thin elliptical cylinder; same geometry as `EllipticalCylinder`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disc;

impl SolidShape for Disc {
    const NAME: &'static str = "disc";
    const LABELS: &'static [&'static str] = &["a", "b", "l"];

    fn solid(dims: &[f64]) -> Result<Solid, AppError> {
        let [a, b, length] = positive_dims(Self::NAME, Self::LABELS, dims)?;
        Ok(Solid::EllipticalCylinder {
            a,
            b,
            half_length: length / 2.0,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Cube;

impl SolidShape for Cube {
    const NAME: &'static str = "cube";
    const LABELS: &'static [&'static str] = &["a"];

    fn solid(dims: &[f64]) -> Result<Solid, AppError> {
        let [a] = positive_dims(Self::NAME, Self::LABELS, dims)?;
        Ok(Solid::Box { half: [a / 2.0; 3] })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HollowCube;

impl SolidShape for HollowCube {
    const NAME: &'static str = "hollow_cube";
    const LABELS: &'static [&'static str] = &["a", "b"];

    fn solid(dims: &[f64]) -> Result<Solid, AppError> {
        let [outer, inner] = positive_dims(Self::NAME, Self::LABELS, dims)?;
        require_inner_smaller(Self::NAME, outer, inner)?;
        Ok(Solid::HollowBox {
            outer_half: outer / 2.0,
            inner_half: inner / 2.0,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Cuboid;

impl SolidShape for Cuboid {
    const NAME: &'static str = "cuboid";
    const LABELS: &'static [&'static str] = &["a", "b", "c"];

    fn solid(dims: &[f64]) -> Result<Solid, AppError> {
        let [a, b, c] = positive_dims(Self::NAME, Self::LABELS, dims)?;
        Ok(Solid::Box {
            half: [a / 2.0, b / 2.0, c / 2.0],
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CylinderRing;

impl SolidShape for CylinderRing {
    const NAME: &'static str = "cyl_ring";
    const LABELS: &'static [&'static str] = &["R", "r", "l"];

    fn solid(dims: &[f64]) -> Result<Solid, AppError> {
        let [outer, inner, length] = positive_dims(Self::NAME, Self::LABELS, dims)?;
        require_inner_smaller(Self::NAME, outer, inner)?;
        Ok(Solid::Ring {
            outer,
            inner,
            half_length: length / 2.0,
        })
    }
}

/// Thin cylinder ring; same geometry as `CylinderRing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscRing;

impl SolidShape for DiscRing {
    const NAME: &'static str = "disc_ring";
    const LABELS: &'static [&'static str] = &["R", "r", "l"];

    fn solid(dims: &[f64]) -> Result<Solid, AppError> {
        let [outer, inner, length] = positive_dims(Self::NAME, Self::LABELS, dims)?;
        require_inner_smaller(Self::NAME, outer, inner)?;
        Ok(Solid::Ring {
            outer,
            inner,
            half_length: length / 2.0,
        })
    }
}

/// `(|x/R|^s + |y/R|^s)^(t/s) + |z/(εR)|^t < 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuperEllipsoid;

impl SolidShape for SuperEllipsoid {
    const NAME: &'static str = "superellipsoid";
    const LABELS: &'static [&'static str] = &["R", "eps", "t", "s"];

    fn solid(dims: &[f64]) -> Result<Solid, AppError> {
        let [radius, eps, t, s] = positive_dims(Self::NAME, Self::LABELS, dims)?;
        Ok(Solid::SuperEllipsoid { radius, eps, t, s })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn all_shapes() -> Vec<(Box<dyn ShapeProvider>, Vec<f64>)> {
        vec![
            (Box::new(Sphere), vec![50.0]),
            (Box::new(HollowSphere), vec![50.0, 25.0]),
            (Box::new(Cylinder), vec![20.0, 100.0]),
            (Box::new(Ellipsoid), vec![30.0, 40.0, 60.0]),
            (Box::new(EllipticalCylinder), vec![20.0, 35.0, 80.0]),
            (Box::new(Disc), vec![50.0, 40.0, 10.0]),
            (Box::new(Cube), vec![40.0]),
            (Box::new(HollowCube), vec![50.0, 25.0]),
            (Box::new(Cuboid), vec![10.0, 20.0, 30.0]),
            (Box::new(CylinderRing), vec![50.0, 30.0, 40.0]),
            (Box::new(DiscRing), vec![50.0, 40.0, 5.0]),
            (Box::new(SuperEllipsoid), vec![40.0, 1.5, 2.5, 3.0]),
        ]
    }

    #[test]
    fn analytic_volumes() {
        assert!((Sphere.volume(&[50.0]).unwrap() - 4.0 / 3.0 * PI * 125_000.0).abs() < 1e-6);
        assert!((Cylinder.volume(&[10.0, 20.0]).unwrap() - PI * 100.0 * 20.0).abs() < 1e-9);
        assert!((Cube.volume(&[3.0]).unwrap() - 27.0).abs() < 1e-12);
        assert!((HollowCube.volume(&[4.0, 2.0]).unwrap() - 56.0).abs() < 1e-12);
        assert!((Cuboid.volume(&[1.0, 2.0, 3.0]).unwrap() - 6.0).abs() < 1e-12);
        let ring = CylinderRing.volume(&[2.0, 1.0, 10.0]).unwrap();
        assert!((ring - PI * 3.0 * 10.0).abs() < 1e-9);
    }

    #[test]
    fn superellipsoid_with_quadratic_exponents_is_an_ellipsoid() {
        let v = SuperEllipsoid.volume(&[10.0, 2.0, 2.0, 2.0]).unwrap();
        let expected = Ellipsoid.volume(&[10.0, 10.0, 20.0]).unwrap();
        assert!((v - expected).abs() / expected < 1e-9, "{v} vs {expected}");
    }

    #[test]
    fn sampled_points_are_inside_and_exact_in_count() {
        let mut rng = StdRng::seed_from_u64(7);
        for (shape, dims) in all_shapes() {
            let points = shape.point_distribution(&dims, 500, &mut rng).unwrap();
            assert_eq!(points.len(), 500, "{}", shape.name());
            let inside = shape.check_overlap(&dims, &points).unwrap();
            assert_eq!(inside.len(), 500, "{}", shape.name());
        }
    }

    #[test]
    fn volumes_agree_with_monte_carlo_fraction() {
        let mut rng = StdRng::seed_from_u64(11);
        let solids = [
            HollowSphere::solid(&[50.0, 25.0]),
            Cylinder::solid(&[20.0, 100.0]),
            Ellipsoid::solid(&[30.0, 40.0, 60.0]),
            HollowCube::solid(&[50.0, 25.0]),
            CylinderRing::solid(&[50.0, 30.0, 40.0]),
            SuperEllipsoid::solid(&[40.0, 1.5, 2.5, 3.0]),
        ];
        for solid in solids {
            let solid = solid.unwrap();
            // Pad the probe box so the bounding surface itself is covered.
            let probe = Solid::Box {
                half: solid.half_extents().map(|h| h * 1.05),
            };
            let points = probe.sample(200_000, &mut rng).unwrap();
            let hits = points.iter().filter(|p| solid.contains(p)).count();
            let estimate = probe.volume() * hits as f64 / points.len() as f64;
            let rel = (estimate - solid.volume()).abs() / solid.volume();
            assert!(rel < 0.03, "{solid:?}: estimate {estimate}, analytic {}", solid.volume());
        }
    }

    #[test]
    fn hollow_shapes_exclude_their_cavity() {
        let inside = HollowSphere
            .check_overlap(&[50.0, 25.0], &[Point3::origin(), Point3::new(30.0, 0.0, 0.0)])
            .unwrap();
        assert_eq!(inside, vec![1]);

        let inside = HollowCube
            .check_overlap(&[50.0, 25.0], &[Point3::new(5.0, 5.0, 5.0), Point3::new(20.0, 0.0, 0.0)])
            .unwrap();
        assert_eq!(inside, vec![1]);
    }

    #[test]
    fn boundary_points_are_not_inside() {
        let inside = Sphere
            .check_overlap(&[10.0], &[Point3::new(10.0, 0.0, 0.0), Point3::new(9.999, 0.0, 0.0)])
            .unwrap();
        assert_eq!(inside, vec![1]);
    }

    #[test]
    fn invalid_dimensions_are_configuration_errors() {
        assert_eq!(Sphere.validate(&[]).unwrap_err().exit_code(), 2);
        assert_eq!(Sphere.validate(&[50.0, 1.0]).unwrap_err().exit_code(), 2);
        assert_eq!(Cylinder.validate(&[-1.0, 10.0]).unwrap_err().exit_code(), 2);
        assert_eq!(Cube.validate(&[f64::NAN]).unwrap_err().exit_code(), 2);
        assert_eq!(HollowSphere.validate(&[10.0, 20.0]).unwrap_err().exit_code(), 2);
        assert_eq!(CylinderRing.validate(&[10.0, 10.0, 5.0]).unwrap_err().exit_code(), 2);
        assert!(Ellipsoid.validate(&[1.0, 2.0, 3.0]).is_ok());
    }

    #[test]
    fn zero_points_requested_gives_empty_distribution() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(Sphere.point_distribution(&[5.0], 0, &mut rng).unwrap().is_empty());
    }
}
