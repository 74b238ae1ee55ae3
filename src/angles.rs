//////////////////////////////////////////////////////////////////////
// deformation angles
//
// each classified node gets the direction along which a positive
// displacement darkens the tiling around it. how that direction is
// found depends on the node type:
//
//   1        anchor between the two blue triangles
//   2, 4, 7  anchor between the two red triangles, reversed
//   5        first wide gap after a narrow one going around the node
//   6        end of the short/long spoke length sequence SSLSSSLS
//
// nodes where none of this works out are on the edge of the diagram
// and get demoted to Boundary.

use tracing::{debug, warn};

use crate::classify::node_type_for_counts;
use crate::geom::*;
use crate::mesh::{Mesh, Node, NodeType, Triangle};
use crate::tiling::HalfTileType;

// angular gap between neighbors of a type 5 node on the narrow side,
// pi/5 at two decimals
const NARROW_GAP_CENTI: i64 = 63;

// anything wider than this (radians) counts as a wide gap
const WIDE_GAP: f64 = 1.0;

// spoke lengths around a type 6 node are compared at this precision
const LENGTH_DECIMALS: i32 = 3;

#[derive(Debug, PartialEq, Clone, Copy)]
enum Spoke {
    Short,
    Long
}

const TYPE6_SEQUENCE: [Spoke; 8] = [
    Spoke::Short, Spoke::Short, Spoke::Long, Spoke::Short,
    Spoke::Short, Spoke::Short, Spoke::Long, Spoke::Short
];

//////////////////////////////////////////////////////////////////////
// the two edge lengths of the tiling, accumulated over type 6 nodes
// and later used to scale displacements

#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct EdgeLengths {
    pub short: f64,
    pub long:  f64
}

impl EdgeLengths {

    // running maximum for long, running secondary maximum for short
    pub fn observe(&mut self, dist: f64) {

        if dist > self.long {
            self.long = dist;
        }

        if dist > self.short && dist < self.long {
            self.short = dist;
        }

    }

    fn spoke(&self, dist: f64) -> Option<Spoke> {

        let d = milli(dist);

        if d == milli(self.short) {
            Some(Spoke::Short)
        } else if d == milli(self.long) {
            Some(Spoke::Long)
        } else {
            None
        }

    }

}

fn milli(x: f64) -> i64 {
    (x * 10f64.powi(LENGTH_DECIMALS)).round() as i64
}

//////////////////////////////////////////////////////////////////////
// types 1, 2, 4, 7: find the vertex shared by the node's first two
// triangles of the given color, other than the node itself

fn anchor_angle(node: &Node,
                triangles: &[Triangle],
                color: HalfTileType,
                reverse: bool) -> Option<f64> {

    let incident = match color {
        HalfTileType::Red => &node.red,
        HalfTileType::Blue => &node.blue
    };

    let mut it = incident.iter();

    let t0 = &triangles[*it.next()?];
    let t1 = &triangles[*it.next()?];

    let anchor = t0.shared_vertex(t1, node.key)?;

    let angle = arg_from(&node.origin, &anchor);

    if reverse {
        Some(angle + PI)
    } else {
        Some(angle)
    }

}

//////////////////////////////////////////////////////////////////////
// type 5: going around the node, neighbors are separated by narrow
// (pi/5) and wide (3pi/5) gaps. the neighbor that closes the first
// wide gap after a narrow one is the fat side of the cluster.

fn gap_angle(node: &Node) -> Option<f64> {

    let sorted = node.sorted_destinations();

    let &(first, _) = sorted.first()?;
    let &(last, _) = sorted.last()?;

    // wrap the final neighbor around so the first delta is cyclic
    let mut prev = last - 2.0 * PI;
    let mut seen_narrow = false;

    for &(angle, _) in &sorted {

        let delta = angle - prev;

        if seen_narrow && delta > WIDE_GAP {
            return Some(angle);
        } else if (delta * 100.0).round() as i64 == NARROW_GAP_CENTI {
            seen_narrow = true;
        }

        prev = angle;

    }

    // narrow gap was last, so the wide one closes at the first neighbor
    Some(first)

}

//////////////////////////////////////////////////////////////////////
// type 6: spokes to the ten neighbors come in two lengths; the
// neighbor ending the cyclic sequence SSLSSSLS marks the direction.
//
// the search is bounded by one traversal of the neighbors, each step
// checking the window of 8 spokes ending there (wrapping around).

fn sequence_angle(node: &Node, lengths: &mut EdgeLengths) -> Option<f64> {

    let sorted = node.sorted_destinations();

    let dists: Vec<f64> = sorted.iter()
        .map(|(_, p)| round_to((p - node.origin).norm(), LENGTH_DECIMALS))
        .collect();

    for &d in &dists {
        lengths.observe(d);
    }

    let n = dists.len();
    let w = TYPE6_SEQUENCE.len();

    if n < w {
        return None;
    }

    let spokes: Vec<Option<Spoke>> = dists.iter().map(|&d| lengths.spoke(d)).collect();

    for i in 0..n {

        let matched = (0..w).all(|j| {
            let idx = (i + n + j + 1 - w) % n;
            spokes[idx] == Some(TYPE6_SEQUENCE[j])
        });

        if matched {
            return Some(sorted[i].0);
        }

    }

    None

}

//////////////////////////////////////////////////////////////////////
// resolve angles of every node; returns the edge lengths seen on the
// way. safe to call again on the same mesh: types demoted by an
// earlier pass are re-derived from incidence counts first.

pub fn resolve_angles(mesh: &mut Mesh) -> EdgeLengths {

    let mut lengths = EdgeLengths::default();
    let mut demoted = 0;

    let (nodes, triangles) = mesh.parts_mut();

    for node in nodes.values_mut() {

        node.node_type = node_type_for_counts(node.num_red(), node.num_blue());
        node.angle = None;

        let angle = match node.node_type {
            NodeType::Type1 =>
                anchor_angle(node, triangles, HalfTileType::Blue, false),
            NodeType::Type2 | NodeType::Type4 | NodeType::Type7 =>
                anchor_angle(node, triangles, HalfTileType::Red, true),
            NodeType::Type5 =>
                gap_angle(node),
            NodeType::Type6 =>
                sequence_angle(node, &mut lengths),
            NodeType::Type3 | NodeType::Boundary | NodeType::Unclassified =>
                None
        };

        match angle {
            Some(angle) => {
                node.angle = Some(angle);
            }
            None if node.node_type.is_deformable() => {
                node.node_type = NodeType::Boundary;
                demoted += 1;
            }
            None => {}
        }

    }

    if lengths.short == 0.0 || lengths.long == 0.0 {
        warn!(short = lengths.short, long = lengths.long,
              "no complete type 6 cluster, displacement scale is degenerate");
    }

    debug!(demoted = demoted, short = lengths.short, long = lengths.long,
           "resolved node angles");

    lengths

}

//////////////////////////////////////////////////////////////////////
