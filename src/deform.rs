//////////////////////////////////////////////////////////////////////
// displacing nodes along their resolved angles
//
// every call starts from the original triangle snapshot, so
// displacements do not accumulate and a magnitude of zero puts a
// node back where it started

use std::collections::BTreeMap;

use image::{imageops, Pixel};
use tracing::debug;

use crate::angles::EdgeLengths;
use crate::geom::*;
use crate::mesh::{Mesh, NodeType, DEFORMABLE_TYPES};

//////////////////////////////////////////////////////////////////////
// per-type displacement magnitudes for manual mode

#[derive(Debug, PartialEq, Clone, Default)]
pub struct PhiByType {
    phis: BTreeMap<NodeType, f64>
}

impl PhiByType {

    pub fn new() -> Self {
        Default::default()
    }

    pub fn set(&mut self, ntype: NodeType, phi: f64) {
        self.phis.insert(ntype, phi);
    }

    pub fn with(mut self, ntype: NodeType, phi: f64) -> Self {
        self.set(ntype, phi);
        self
    }

    // unset types don't move
    pub fn get(&self, ntype: NodeType) -> f64 {
        self.phis.get(&ntype).cloned().unwrap_or(0.0)
    }

    // map factors in [-1, 1] to magnitudes in [-short, short],
    // optionally clamping them against each other so that neighboring
    // clusters don't fold over. types 4 and 5 win any conflict.
    pub fn from_factors(factors: &BTreeMap<NodeType, f64>,
                        short: f64,
                        clamp: bool) -> Self {

        let f = |t: NodeType| factors.get(&t).cloned().unwrap_or(0.0) * short;

        let mut p1 = f(NodeType::Type1);
        let mut p2 = f(NodeType::Type2);
        let mut p4 = f(NodeType::Type4);
        let mut p5 = f(NodeType::Type5);
        let mut p6 = f(NodeType::Type6);
        let mut p7 = f(NodeType::Type7);

        if clamp {

            let s = short * (PI / 10.0).sin();

            p4 = p4.min(2.0 * s);
            p5 = p5.min(2.0 * s);

            // full -2s darkens the whole image to nothing
            p4 = p4.max(-s);

            p6 = p6.min(short - p5);

            p1 = p1.max(-short - p7);
            p1 = p1.max((-0.9 * 2.0 * s - p4) / (3.0 * PI / 5.0).sin());
            p1 = p1.max(-short + 3.0 * (PI / 10.0).sin() * p6.abs());

            p2 = p2.max(-2.0 * s - p4);
            p2 = p2.min((short - p4) / 2.0);

            p7 = p7.min((short - p5) * 0.5);
            p7 = p7.max((-short + p5) * 0.5);

        }

        PhiByType::new()
            .with(NodeType::Type1, p1)
            .with(NodeType::Type2, p2)
            .with(NodeType::Type4, p4)
            .with(NodeType::Type5, p5)
            .with(NodeType::Type6, p6)
            .with(NodeType::Type7, p7)

    }

}

//////////////////////////////////////////////////////////////////////
// per-type (min, max) factors of short that black..white brightness
// maps onto in image mode

#[derive(Debug, PartialEq, Clone)]
pub struct RangeByType {
    ranges: BTreeMap<NodeType, (f64, f64)>
}

impl Default for RangeByType {

    // full white opens up types 4 and 5 by one short length, full
    // black closes them by two thirds; everything else stays put
    fn default() -> Self {
        let mut ranges = BTreeMap::new();
        ranges.insert(NodeType::Type4, (-2.0 / 3.0, 1.0));
        ranges.insert(NodeType::Type5, (-2.0 / 3.0, 1.0));
        RangeByType { ranges: ranges }
    }

}

impl RangeByType {

    // no type moves
    pub fn empty() -> Self {
        RangeByType { ranges: BTreeMap::new() }
    }

    pub fn set(&mut self, ntype: NodeType, min: f64, max: f64) {
        self.ranges.insert(ntype, (min, max));
    }

    pub fn get(&self, ntype: NodeType) -> (f64, f64) {
        self.ranges.get(&ntype).cloned().unwrap_or((0.0, 0.0))
    }

    // linear map of brightness 0..255 onto [min, max] * short
    pub fn phi(&self, ntype: NodeType, brightness: u8, short: f64) -> f64 {
        let (lo, hi) = self.get(ntype);
        let u = brightness as f64 / 255.0;
        (lo + u * (hi - lo)) * short
    }

}

//////////////////////////////////////////////////////////////////////
// source of grayscale values in canvas pixel coordinates

pub trait BrightnessSampler {
    fn brightness(&self, x: i64, y: i64) -> u8;
}

// out-of-range coordinates read the nearest edge pixel
impl BrightnessSampler for image::GrayImage {

    fn brightness(&self, x: i64, y: i64) -> u8 {

        let (w, h) = self.dimensions();

        if w == 0 || h == 0 {
            return 0;
        }

        let x = x.max(0).min(w as i64 - 1) as u32;
        let y = y.max(0).min(h as i64 - 1) as u32;

        self.get_pixel(x, y).channels()[0]

    }

}

impl<F: Fn(i64, i64) -> u8> BrightnessSampler for F {
    fn brightness(&self, x: i64, y: i64) -> u8 {
        self(x, y)
    }
}

// scale a reference image so its larger side spans the canvas; pixel
// coordinates then coincide with canvas coordinates
pub fn fit_to_canvas(img: image::GrayImage, canvas_size: u32) -> image::GrayImage {

    let (w, h) = img.dimensions();
    let largest = w.max(h);

    if largest == 0 || largest == canvas_size {
        return img;
    }

    let scl = canvas_size as f64 / largest as f64;
    let nw = ((w as f64 * scl).round() as u32).max(1);
    let nh = ((h as f64 * scl).round() as u32).max(1);

    debug!(from_width = w, from_height = h, width = nw, height = nh,
           "resized reference image to canvas");

    imageops::resize(&img, nw, nh, imageops::FilterType::Triangle)

}

// normalized coordinate in [-1, 1] to canvas pixel
pub fn canvas_coord(v: f64, canvas_size: u32) -> i64 {
    (canvas_size as f64 * (v + 1.0) / 2.0).floor() as i64
}

//////////////////////////////////////////////////////////////////////
// the applicator: phi_for gets each deformable node's type and
// origin and returns its displacement magnitude

fn deform_with<F>(mesh: &mut Mesh, mut phi_for: F)
where F: FnMut(NodeType, &Point2d) -> f64 {

    let (nodes, triangles) = mesh.parts_mut();

    let mut moved = 0;

    for node in nodes.values_mut() {

        if !node.node_type.is_deformable() {
            continue;
        }

        let angle = match node.angle {
            Some(angle) => angle,
            None => continue
        };

        let phi = phi_for(node.node_type, &node.origin);
        let offset = polar(phi, angle);

        node.offset = phi;

        for tidx in node.triangles() {
            let tri = &mut triangles[tidx];
            if let Some(i) = tri.corner_at(node.key) {
                tri.displace_corner(i, offset);
            }
        }

        if phi != 0.0 {
            moved += 1;
        }

    }

    debug!(moved = moved, "deformed nodes");

}

// manual mode: one magnitude per node type
pub fn deform_manual(mesh: &mut Mesh, phis: &PhiByType) {
    deform_with(mesh, |ntype, _| phis.get(ntype));
}

// image mode: sample brightness under each node and map it through
// the per-type range, scaled by the short edge length
pub fn deform_image<S: BrightnessSampler + ?Sized>(mesh: &mut Mesh,
                                                   sampler: &S,
                                                   ranges: &RangeByType,
                                                   lengths: &EdgeLengths,
                                                   canvas_size: u32) {

    deform_with(mesh, |ntype, origin| {
        let x = canvas_coord(origin.x, canvas_size);
        let y = canvas_coord(origin.y, canvas_size);
        ranges.phi(ntype, sampler.brightness(x, y), lengths.short)
    });

}

// put every triangle back to its original snapshot
pub fn reset(mesh: &mut Mesh) {
    deform_manual(mesh, &PhiByType::new());
}

// types that have a nonzero range, for logging
pub fn active_types(ranges: &RangeByType) -> Vec<NodeType> {
    DEFORMABLE_TYPES.iter()
        .cloned()
        .filter(|&t| ranges.get(t) != (0.0, 0.0))
        .collect()
}

//////////////////////////////////////////////////////////////////////
