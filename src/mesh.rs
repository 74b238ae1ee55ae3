//////////////////////////////////////////////////////////////////////
// the mesh: triangles with live + original vertex positions, and
// the unique nodes where triangle corners meet

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::errors::*;
use crate::geom::*;
use crate::tiling::{self, HalfTile, HalfTileType};

// deepest subdivision we are willing to build (~1.2M triangles)
pub const MAX_DEPTH: usize = 12;

//////////////////////////////////////////////////////////////////////
// triangle record owned by the mesh
//
// verts are the live (possibly displaced) positions, original is the
// snapshot taken when the mesh was built and is never touched again

#[derive(Debug, PartialEq, Clone)]
pub struct Triangle {
    pub ttype: HalfTileType,
    verts:     [Point2d; 3],
    original:  [Point2d; 3]
}

impl Triangle {

    fn from_half_tile(htile: &HalfTile) -> Self {
        Triangle {
            ttype: htile.ttype,
            verts: htile.verts,
            original: htile.verts
        }
    }

    pub fn verts(&self) -> &[Point2d; 3] {
        &self.verts
    }

    pub fn original(&self) -> &[Point2d; 3] {
        &self.original
    }

    // index of the corner whose original position has the given key
    pub fn corner_at(&self, key: PointKey) -> Option<usize> {
        self.original.iter().position(|p| PointKey::new(p) == key)
    }

    // place corner i at original + offset
    pub(crate) fn displace_corner(&mut self, i: usize, offset: Vec2d) {
        self.verts[i] = self.original[i] + offset;
    }

    // the first of my original vertices that is also one of other's,
    // skipping the excluded key
    pub fn shared_vertex(&self, other: &Triangle, exclude: PointKey) -> Option<Point2d> {

        let other_keys: Vec<PointKey> = other.original.iter().map(PointKey::new).collect();

        self.original.iter()
            .find(|p| {
                let k = PointKey::new(p);
                k != exclude && other_keys.contains(&k)
            })
            .cloned()

    }

}

//////////////////////////////////////////////////////////////////////
// node types, determined by how many red/blue triangles meet there

#[derive(Debug, PartialEq, PartialOrd, Eq, Ord, Clone, Copy, Hash)]
pub enum NodeType {
    Unclassified,
    Boundary,
    Type1,
    Type2,
    Type3,
    Type4,
    Type5,
    Type6,
    Type7
}

pub const DEFORMABLE_TYPES: [NodeType; 6] = [
    NodeType::Type1,
    NodeType::Type2,
    NodeType::Type4,
    NodeType::Type5,
    NodeType::Type6,
    NodeType::Type7
];

impl NodeType {

    pub fn is_deformable(self) -> bool {
        DEFORMABLE_TYPES.contains(&self)
    }

    // 1-7 for classified nodes, None otherwise
    pub fn number(self) -> Option<usize> {
        match self {
            NodeType::Type1 => Some(1),
            NodeType::Type2 => Some(2),
            NodeType::Type3 => Some(3),
            NodeType::Type4 => Some(4),
            NodeType::Type5 => Some(5),
            NodeType::Type6 => Some(6),
            NodeType::Type7 => Some(7),
            NodeType::Boundary | NodeType::Unclassified => None
        }
    }

}

//////////////////////////////////////////////////////////////////////
// a unique vertex of the mesh

#[derive(Debug, Clone)]
pub struct Node {
    pub origin:       Point2d,                       // canonical position
    pub key:          PointKey,                      // quantized origin
    pub destinations: BTreeMap<PointKey, Point2d>,   // neighbors along triangle edges
    pub red:          BTreeSet<usize>,               // incident red triangle indices
    pub blue:         BTreeSet<usize>,               // incident blue triangle indices
    pub node_type:    NodeType,
    pub angle:        Option<f64>,                   // deformation direction, radians
    pub offset:       f64                            // last applied displacement
}

impl Node {

    fn new(origin: Point2d, key: PointKey) -> Self {
        Node {
            origin: origin,
            key: key,
            destinations: BTreeMap::new(),
            red: BTreeSet::new(),
            blue: BTreeSet::new(),
            node_type: NodeType::Unclassified,
            angle: None,
            offset: 0.0
        }
    }

    pub fn num_red(&self) -> usize {
        self.red.len()
    }

    pub fn num_blue(&self) -> usize {
        self.blue.len()
    }

    // all incident triangle indices, red first
    pub fn triangles<'a>(&'a self) -> impl Iterator<Item=usize> + 'a {
        self.red.iter().chain(self.blue.iter()).cloned()
    }

    // destinations sorted by their angle around the origin
    pub fn sorted_destinations(&self) -> Vec<(f64, Point2d)> {

        let mut sorted: Vec<(f64, Point2d)> = self.destinations.values()
            .map(|p| (arg_from(&self.origin, p), *p))
            .collect();

        sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        sorted

    }

}

//////////////////////////////////////////////////////////////////////
// the mesh owns every triangle and node record

#[derive(Debug, Clone)]
pub struct Mesh {
    pub depth: usize,
    triangles: Vec<Triangle>,
    nodes:     BTreeMap<PointKey, Node>
}

impl Mesh {

    // register triangles and merge their corners into nodes; nodes
    // come out unclassified
    pub fn from_half_tiles(depth: usize, htiles: &[HalfTile]) -> Self {

        let triangles: Vec<Triangle> = htiles.iter().map(Triangle::from_half_tile).collect();

        let mut nodes: BTreeMap<PointKey, Node> = BTreeMap::new();

        for (tidx, tri) in triangles.iter().enumerate() {

            for i0 in 0..3 {

                let p0 = tri.verts[i0];
                let k0 = PointKey::new(&p0);

                let node = nodes.entry(k0).or_insert_with(|| Node::new(p0, k0));

                for i1 in 0..3 {
                    if i1 != i0 {
                        let p1 = tri.verts[i1];
                        node.destinations.entry(PointKey::new(&p1)).or_insert(p1);
                    }
                }

                match tri.ttype {
                    HalfTileType::Red => node.red.insert(tidx),
                    HalfTileType::Blue => node.blue.insert(tidx)
                };

            }

        }

        debug!(triangles = triangles.len(), nodes = nodes.len(), "merged triangle corners");

        Mesh {
            depth: depth,
            triangles: triangles,
            nodes: nodes
        }

    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn nodes(&self) -> &BTreeMap<PointKey, Node> {
        &self.nodes
    }

    pub fn node(&self, key: PointKey) -> Option<&Node> {
        self.nodes.get(&key)
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut BTreeMap<PointKey, Node> {
        &mut self.nodes
    }

    // split borrow for the deformation pass: nodes read-mostly,
    // triangles with live vertices writable
    pub(crate) fn parts_mut(&mut self) -> (&mut BTreeMap<PointKey, Node>, &mut Vec<Triangle>) {
        (&mut self.nodes, &mut self.triangles)
    }

    // how many nodes have each type
    pub fn type_histogram(&self) -> BTreeMap<NodeType, usize> {

        let mut counts = BTreeMap::new();

        for node in self.nodes.values() {
            *counts.entry(node.node_type).or_insert(0) += 1;
        }

        counts

    }

}

//////////////////////////////////////////////////////////////////////
// subdivide, merge, classify and resolve angles in one go

pub fn build_mesh(depth: usize) -> Result<(Mesh, crate::angles::EdgeLengths)> {

    if depth > MAX_DEPTH {
        bail!(ErrorKind::DepthTooLarge(depth, MAX_DEPTH));
    }

    let htiles = tiling::subdivide(depth);

    let mut mesh = Mesh::from_half_tiles(depth, &htiles);

    crate::classify::classify(&mut mesh);

    let lengths = crate::angles::resolve_angles(&mut mesh);

    info!(depth = depth,
          triangles = mesh.triangles.len(),
          nodes = mesh.nodes.len(),
          short = lengths.short,
          long = lengths.long,
          "built mesh");

    Ok((mesh, lengths))

}

//////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {

    use super::*;
    use std::collections::HashSet;

    #[test]
    fn depth_zero_is_the_seed_wheel() {

        let (mesh, _) = build_mesh(0).unwrap();

        assert_eq!(mesh.triangles().len(), 10);
        assert!(mesh.triangles().iter().all(|t| t.ttype == HalfTileType::Red));

        let center = mesh.node(PointKey(0, 0)).unwrap();

        assert_eq!(center.num_red(), 10);
        assert_eq!(center.num_blue(), 0);
        assert_eq!(center.node_type, NodeType::Boundary);
        assert_eq!(center.angle, None);
        assert_eq!(center.destinations.len(), 10);

        // center plus ten rim points
        assert_eq!(mesh.nodes().len(), 11);

    }

    #[test]
    fn every_corner_maps_to_one_node() {

        let (mesh, _) = build_mesh(4).unwrap();

        let mut seen: HashSet<PointKey> = HashSet::new();

        for (tidx, tri) in mesh.triangles().iter().enumerate() {
            for p in tri.verts() {
                let key = PointKey::new(p);
                let node = mesh.node(key).expect("corner without node");
                assert_eq!(node.key, key);
                assert!(node.red.contains(&tidx) || node.blue.contains(&tidx));
                seen.insert(key);
            }
        }

        assert_eq!(seen.len(), mesh.nodes().len());

        for node in mesh.nodes().values() {
            assert!(!node.destinations.contains_key(&node.key));
            assert_eq!(PointKey::new(&node.origin), node.key);
        }

    }

    #[test]
    fn incidence_matches_triangle_colors() {

        let (mesh, _) = build_mesh(3).unwrap();

        for node in mesh.nodes().values() {
            for &t in &node.red {
                assert_eq!(mesh.triangles()[t].ttype, HalfTileType::Red);
            }
            for &t in &node.blue {
                assert_eq!(mesh.triangles()[t].ttype, HalfTileType::Blue);
            }
        }

        let incidences: usize = mesh.nodes().values().map(|n| n.num_red() + n.num_blue()).sum();
        assert_eq!(incidences, 3 * mesh.triangles().len());

    }

    #[test]
    fn original_snapshot_matches_build_positions() {

        let (mesh, _) = build_mesh(2).unwrap();

        for tri in mesh.triangles() {
            assert_eq!(tri.verts(), tri.original());
        }

    }

    #[test]
    fn rebuild_is_reproducible() {

        let (a, la) = build_mesh(4).unwrap();
        let (b, lb) = build_mesh(4).unwrap();

        assert_eq!(a.nodes().len(), b.nodes().len());
        assert_eq!(a.type_histogram(), b.type_histogram());
        assert_eq!(la, lb);

        for (ka, kb) in a.nodes().keys().zip(b.nodes().keys()) {
            assert_eq!(ka, kb);
            assert_eq!(a.nodes()[ka].node_type, b.nodes()[kb].node_type);
            assert_eq!(a.nodes()[ka].angle, b.nodes()[kb].angle);
        }

    }

    #[test]
    fn rejects_excessive_depth() {

        match build_mesh(MAX_DEPTH + 1) {
            Err(Error(ErrorKind::DepthTooLarge(d, max), _)) => {
                assert_eq!(d, MAX_DEPTH + 1);
                assert_eq!(max, MAX_DEPTH);
            }
            other => panic!("unexpected result {:?}", other.map(|_| ()))
        }

    }

    #[test]
    fn shared_vertex_skips_excluded_key() {

        let (mesh, _) = build_mesh(0).unwrap();

        let t0 = &mesh.triangles()[0];
        let t1 = &mesh.triangles()[1];

        // neighboring spokes share the center and one rim point
        let rim = t0.shared_vertex(t1, PointKey(0, 0)).unwrap();
        assert!((rim.coords.norm() - 1.0).abs() < 1e-4);

        let center = t0.shared_vertex(t1, PointKey::new(&rim)).unwrap();
        assert_eq!(PointKey::new(&center), PointKey(0, 0));

    }

    #[test]
    fn deformable_types_exclude_type_three_and_unclassified() {

        let all = [NodeType::Unclassified, NodeType::Boundary,
                   NodeType::Type1, NodeType::Type2, NodeType::Type3, NodeType::Type4,
                   NodeType::Type5, NodeType::Type6, NodeType::Type7];

        let deformable: Vec<NodeType> = all.iter().cloned().filter(|t| t.is_deformable()).collect();

        assert_eq!(deformable, DEFORMABLE_TYPES.to_vec());
        assert!(!NodeType::Type3.is_deformable());
        assert!(!NodeType::Boundary.is_deformable());

    }

}
