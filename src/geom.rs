//////////////////////////////////////////////////////////////////////
// points, vectors and the bits of complex-number arithmetic the
// tiling needs (polar construction, argument, magnitude)

pub type Vec2d = nalgebra::Vector2<f64>;
pub type Vec3d = nalgebra::Vector3<f64>;
pub type Point2d = nalgebra::geometry::Point2<f64>;

//////////////////////////////////////////////////////////////////////
// constants for Penrose tiles

pub const PHI: f64 = 1.618033988749895;
pub const PI: f64 = std::f64::consts::PI;

// all coordinates produced by subdivision get rounded to this many
// decimal places so that shared vertices come out bit-identical
pub const COORD_DECIMALS: i32 = 5;

//////////////////////////////////////////////////////////////////////
// rounding helpers

// round x to the given number of decimal places
pub fn round_to(x: f64, decimals: i32) -> f64 {
    let scl = 10f64.powi(decimals);
    (x * scl).round() / scl
}

// round both coordinates of a point to COORD_DECIMALS
pub fn round_point(p: &Point2d) -> Point2d {
    Point2d::new(round_to(p.x, COORD_DECIMALS),
                 round_to(p.y, COORD_DECIMALS))
}

//////////////////////////////////////////////////////////////////////
// complex-style helpers on vectors

// vector with magnitude r pointing at angle theta
pub fn polar(r: f64, theta: f64) -> Vec2d {
    Vec2d::new(r * theta.cos(), r * theta.sin())
}

// angle of vector in (-pi, pi]
pub fn arg(v: &Vec2d) -> f64 {
    v.y.atan2(v.x)
}

// angle of p as seen from origin
pub fn arg_from(origin: &Point2d, p: &Point2d) -> f64 {
    arg(&(p - origin))
}

//////////////////////////////////////////////////////////////////////
// quantized identity of a point: (round(x*10^k), round(y*10^k))
//
// this is what nodes are keyed on, raw floats are never compared
// for identity

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct PointKey(pub i64, pub i64);

impl PointKey {

    pub fn new(p: &Point2d) -> Self {
        let scl = 10f64.powi(COORD_DECIMALS);
        PointKey((p.x * scl).round() as i64,
                 (p.y * scl).round() as i64)
    }

}

impl From<&Point2d> for PointKey {
    fn from(p: &Point2d) -> Self {
        PointKey::new(p)
    }
}

//////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {

    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rounding_is_to_five_places() {
        assert_relative_eq!(round_to(0.123456789, 5), 0.12346);
        assert_relative_eq!(round_to(-0.5877852522924731, 5), -0.58779);
        let p = round_point(&Point2d::new(0.30901699437494745, 0.9510565162951535));
        assert_relative_eq!(p.x, 0.30902);
        assert_relative_eq!(p.y, 0.95106);
    }

    #[test]
    fn polar_and_arg_agree() {
        let v = polar(2.0, 0.75);
        assert_relative_eq!(v.norm(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(arg(&v), 0.75, epsilon = 1e-12);
        assert_relative_eq!(arg(&Vec2d::new(-1.0, 0.0)), PI);
    }

    #[test]
    fn keys_absorb_float_drift() {
        let a = Point2d::new(0.1 + 0.2, 0.7);
        let b = Point2d::new(0.3, 0.1 * 7.0);
        assert_ne!(a.x, b.x);
        assert_eq!(PointKey::new(&a), PointKey::new(&b));
        assert_ne!(PointKey::new(&a), PointKey::new(&Point2d::new(0.30001, 0.7)));
    }

}
