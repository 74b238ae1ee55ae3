//////////////////////////////////////////////////////////////////////
// recursive subdivision of Robinson half-tiles
//
// red half-tiles are the 36 degree golden triangles, blue ones the
// 108 degree golden gnomons. every new coordinate gets rounded as
// soon as it is computed so that vertices shared between neighboring
// half-tiles agree exactly.

use crate::geom::*;

#[derive(Debug, PartialEq, PartialOrd, Eq, Ord, Clone, Copy, Hash)]
pub enum HalfTileType {
    Red,
    Blue
}

// number of red triangles in the seed wheel
pub const SUN_SPOKES: usize = 10;

//////////////////////////////////////////////////////////////////////
// a half-tile as produced by subdivision: no deformation state yet

#[derive(Debug, PartialEq, Clone)]
pub struct HalfTile {
    pub ttype: HalfTileType,
    pub verts: [Point2d; 3]  // A, B, C
}

impl HalfTile {

    pub fn new(ttype: HalfTileType, a: Point2d, b: Point2d, c: Point2d) -> Self {
        HalfTile { ttype: ttype, verts: [a, b, c] }
    }

    // split into the next generation, appending children to output
    fn split_into(&self, output: &mut Vec<HalfTile>) {

        let [a, b, c] = self.verts;

        match self.ttype {

            HalfTileType::Red => {

                let p = round_point(&(a + (b - a) / PHI));

                output.push(HalfTile::new(HalfTileType::Red, c, p, b));
                output.push(HalfTile::new(HalfTileType::Blue, p, c, a));

            }

            HalfTileType::Blue => {

                let q = round_point(&(b + (a - b) / PHI));
                let r = round_point(&(b + (c - b) / PHI));

                output.push(HalfTile::new(HalfTileType::Blue, r, c, a));
                output.push(HalfTile::new(HalfTileType::Blue, q, r, b));
                output.push(HalfTile::new(HalfTileType::Red, r, q, a));

            }

        }

    }

}

//////////////////////////////////////////////////////////////////////
// wheel of red half-tiles around the origin with unit radius

pub fn sun_wheel() -> Vec<HalfTile> {

    let origin = Point2d::origin();

    (0..SUN_SPOKES).map(|i| {

        let lo = round_point(&(origin + polar(1.0, (2.0 * i as f64 - 1.0) * PI / 10.0)));
        let hi = round_point(&(origin + polar(1.0, (2.0 * i as f64 + 1.0) * PI / 10.0)));

        // alternate orientation so neighboring spokes mirror each other
        let (b, c) = if i % 2 == 1 { (lo, hi) } else { (hi, lo) };

        HalfTile::new(HalfTileType::Red, origin, b, c)

    }).collect()

}

//////////////////////////////////////////////////////////////////////
// one round of subdivision

pub fn subdivide_once(htiles: &[HalfTile]) -> Vec<HalfTile> {

    let mut result = Vec::with_capacity(3 * htiles.len());

    for tile in htiles {
        tile.split_into(&mut result);
    }

    result

}

// seed wheel subdivided depth times
pub fn subdivide(depth: usize) -> Vec<HalfTile> {

    let mut htiles = sun_wheel();

    for _ in 0..depth {
        htiles = subdivide_once(&htiles);
    }

    htiles

}

//////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {

    use super::*;
    use approx::assert_relative_eq;

    // (red, blue) counts after depth rounds, from the inflation recurrence
    fn expected_counts(depth: usize) -> (usize, usize) {

        let (mut red, mut blue) = (SUN_SPOKES, 0);

        for _ in 0..depth {
            let next_red = red + blue;
            let next_blue = red + 2 * blue;
            red = next_red;
            blue = next_blue;
        }

        (red, blue)

    }

    fn count(htiles: &[HalfTile]) -> (usize, usize) {
        let red = htiles.iter().filter(|t| t.ttype == HalfTileType::Red).count();
        (red, htiles.len() - red)
    }

    #[test]
    fn seed_wheel_is_ten_red_spokes() {

        let wheel = sun_wheel();

        assert_eq!(wheel.len(), 10);

        for t in &wheel {
            assert_eq!(t.ttype, HalfTileType::Red);
            assert_eq!(t.verts[0], Point2d::origin());
            assert_relative_eq!(t.verts[1].coords.norm(), 1.0, epsilon = 1e-4);
            assert_relative_eq!(t.verts[2].coords.norm(), 1.0, epsilon = 1e-4);
        }

        // spoke 0 has B at +pi/10 and C at -pi/10
        assert_relative_eq!(arg(&wheel[0].verts[1].coords), PI / 10.0, epsilon = 1e-4);
        assert_relative_eq!(arg(&wheel[0].verts[2].coords), -PI / 10.0, epsilon = 1e-4);

        // spoke 1 has B at pi/10 and C at 3pi/10
        assert_relative_eq!(arg(&wheel[1].verts[1].coords), PI / 10.0, epsilon = 1e-4);
        assert_relative_eq!(arg(&wheel[1].verts[2].coords), 3.0 * PI / 10.0, epsilon = 1e-4);

    }

    #[test]
    fn counts_follow_inflation() {

        let expected = [10, 20, 50, 130, 340];

        for (depth, &total) in expected.iter().enumerate() {
            let htiles = subdivide(depth);
            assert_eq!(htiles.len(), total, "depth {}", depth);
            assert_eq!(count(&htiles), expected_counts(depth), "depth {}", depth);
        }

        assert_eq!(expected_counts(4), (130, 210));

    }

    #[test]
    fn red_split_uses_golden_section() {

        let tile = HalfTile::new(HalfTileType::Red,
                                 Point2d::origin(),
                                 Point2d::new(1.0, 0.0),
                                 Point2d::new(0.80902, 0.58779));

        let children = subdivide_once(&[tile.clone()]);

        assert_eq!(children.len(), 2);
        assert_eq!(children[0].ttype, HalfTileType::Red);
        assert_eq!(children[1].ttype, HalfTileType::Blue);

        let p = children[0].verts[1];
        assert_relative_eq!(p.x, 0.61803);
        assert_relative_eq!(p.y, 0.0);

        assert_eq!(children[0].verts, [tile.verts[2], p, tile.verts[1]]);
        assert_eq!(children[1].verts, [p, tile.verts[2], tile.verts[0]]);

    }

    #[test]
    fn blue_split_makes_three_children() {

        let tile = HalfTile::new(HalfTileType::Blue,
                                 Point2d::new(1.0, 0.0),
                                 Point2d::origin(),
                                 Point2d::new(0.0, 1.0));

        let children = subdivide_once(&[tile]);

        let kinds: Vec<HalfTileType> = children.iter().map(|t| t.ttype).collect();
        assert_eq!(kinds, vec![HalfTileType::Blue, HalfTileType::Blue, HalfTileType::Red]);

        let r = children[0].verts[0];
        let q = children[1].verts[0];

        assert_relative_eq!(q.x, 0.61803);
        assert_relative_eq!(r.y, 0.61803);
        assert_eq!(children[2].verts[0], r);
        assert_eq!(children[2].verts[1], q);

    }

    #[test]
    fn subdivision_is_deterministic() {
        assert_eq!(subdivide(3), subdivide(3));
    }

}
