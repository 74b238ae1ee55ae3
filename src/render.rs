//////////////////////////////////////////////////////////////////////
// drawing a (possibly deformed) mesh with cairo
//
// node coordinates live in [-1, 1]; the canvas maps that square onto
// [0, size] with y increasing downward

use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::errors::*;
use crate::geom::*;
use crate::mesh::Mesh;
use crate::tiling::HalfTileType;

//////////////////////////////////////////////////////////////////////

#[derive(Debug, PartialEq, Clone)]
pub struct Style {
    pub red_fill:    Vec3d,
    pub blue_fill:   Vec3d,
    pub line_color:  Vec3d,  // also the background
    pub line_width:  f64,    // 0 = no outlines
    pub crop:        bool,   // keep only a centered disc
    pub debug:       bool    // offsets, origins and node types on top
}

impl Default for Style {
    fn default() -> Self {
        Style {
            red_fill: Vec3d::new(191.0, 109.0, 70.0) / 255.0,
            blue_fill: Vec3d::new(241.0, 171.0, 134.0) / 255.0,
            line_color: Vec3d::new(191.0, 109.0, 70.0) / 255.0,
            line_width: 2.0,
            crop: true,
            debug: false
        }
    }
}

// radius of the crop disc as a fraction of the canvas size
pub const CROP_RADIUS: f64 = 0.45;

// debug view node marker, in pixels
const ORIGIN_DOT_RADIUS: f64 = 2.5;

// normalized point to canvas point
pub fn to_canvas(p: &Point2d, size: f64) -> Point2d {
    Point2d::new(size * (p.x + 1.0) / 2.0,
                 size * (p.y + 1.0) / 2.0)
}

//////////////////////////////////////////////////////////////////////

trait CairoVecOps {

    fn moveto(&self, p: &Point2d);
    fn lineto(&self, p: &Point2d);
    fn setcolor(&self, v: &Vec3d);
    fn drawtri(&self, p0: &Point2d, p1: &Point2d, p2: &Point2d);
    fn centertext(&self, p: &Point2d, text: &str);

}

impl CairoVecOps for cairo::Context {

    fn setcolor(&self, v: &Vec3d) {
        self.set_source_rgb(v[0], v[1], v[2]);
    }

    fn moveto(&self, p: &Point2d) {
        self.move_to(p.x, p.y);
    }

    fn lineto(&self, p: &Point2d) {
        self.line_to(p.x, p.y);
    }

    fn drawtri(&self, p0: &Point2d, p1: &Point2d, p2: &Point2d) {
        self.move_to(p0[0], p0[1]);
        self.line_to(p1[0], p1[1]);
        self.line_to(p2[0], p2[1]);
        self.close_path();
    }

    // text path centered on p
    fn centertext(&self, p: &Point2d, text: &str) {

        let extents = self.text_extents(text);

        let xoffs = 0.5 * (extents.width + 2.0 * extents.x_bearing);
        let yoffs = 0.5 * (extents.height + 2.0 * extents.y_bearing);

        self.moveto(&(p + Vec2d::new(-xoffs, -yoffs)));
        self.text_path(text);

    }

}

macro_rules! with_save_restore {

    ($ctx:ident, { $($tree:tt)* }) => {

        $ctx.save();

        {

            $($tree)*

        }

        $ctx.restore();

    }

}

//////////////////////////////////////////////////////////////////////
// paint the mesh onto ctx

pub fn draw_mesh(ctx: &cairo::Context, mesh: &Mesh, size: f64, style: &Style) {

    with_save_restore!(ctx, {

        // everything outside the disc stays transparent
        if style.crop {
            ctx.arc(0.5 * size, 0.5 * size, CROP_RADIUS * size, 0.0, 2.0 * PI);
            ctx.clip();
        }

        ctx.setcolor(&style.line_color);
        ctx.paint();

        for tri in mesh.triangles() {

            let [a, b, c] = tri.verts();

            ctx.drawtri(&to_canvas(a, size), &to_canvas(b, size), &to_canvas(c, size));

            match tri.ttype {
                HalfTileType::Red => ctx.setcolor(&style.red_fill),
                HalfTileType::Blue => ctx.setcolor(&style.blue_fill)
            }

            if style.line_width > 0.0 {
                ctx.fill_preserve();
                ctx.setcolor(&style.line_color);
                ctx.set_line_width(style.line_width);
                ctx.set_line_join(cairo::LineJoin::Round);
                ctx.stroke();
            } else {
                ctx.fill();
            }

        }

        if style.debug {
            draw_offsets(ctx, mesh, size);
            draw_origins(ctx, mesh, size);
            label_nodes(ctx, mesh, size);
        }

    });

}

// green line from each resolved node's origin along its last offset
fn draw_offsets(ctx: &cairo::Context, mesh: &Mesh, size: f64) {

    with_save_restore!(ctx, {

        ctx.set_source_rgb(0.0, 1.0, 0.0);
        ctx.set_line_width(1.0);

        for node in mesh.nodes().values() {
            if let Some(angle) = node.angle {
                let tip = node.origin + polar(node.offset, angle);
                ctx.moveto(&to_canvas(&node.origin, size));
                ctx.lineto(&to_canvas(&tip, size));
            }
        }

        ctx.stroke();

    });

}

// red dot on every node origin
fn draw_origins(ctx: &cairo::Context, mesh: &Mesh, size: f64) {

    with_save_restore!(ctx, {

        ctx.set_source_rgb(1.0, 0.0, 0.0);

        for node in mesh.nodes().values() {
            let p = to_canvas(&node.origin, size);
            ctx.new_sub_path();
            ctx.arc(p.x, p.y, ORIGIN_DOT_RADIUS, 0.0, 2.0 * PI);
        }

        ctx.fill();

    });

}

// "t<type>" on every deformable node, black on a white halo
fn label_nodes(ctx: &cairo::Context, mesh: &Mesh, size: f64) {

    // node spacing in pixels is roughly the short edge on the canvas
    let spacing = size / 2.0 * PHI.powi(-(mesh.depth as i32) - 1);

    with_save_restore!(ctx, {

        ctx.set_font_size((0.6 * spacing).max(4.0).min(16.0));
        ctx.set_line_width((0.15 * spacing).max(1.0).min(3.0));
        ctx.set_line_join(cairo::LineJoin::Round);

        for node in mesh.nodes().values() {

            let number = match node.node_type.number() {
                Some(n) if node.node_type.is_deformable() => n,
                _ => continue
            };

            let text = format!("t{:}", number);
            let p = to_canvas(&node.origin, size);

            ctx.centertext(&p, text.as_str());
            ctx.set_source_rgb(1.0, 1.0, 1.0);
            ctx.stroke_preserve();
            ctx.set_source_rgb(0.0, 0.0, 0.0);
            ctx.fill();

        }

    });

}

//////////////////////////////////////////////////////////////////////
// write the mesh to a square PNG or PDF, chosen by file extension

pub fn write_mesh(mesh: &Mesh, size: u32, style: &Style, filename: &str) -> Result<()> {

    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {

        Some("pdf") => {

            let surface = cairo::PdfSurface::new(size as f64, size as f64, filename)?;
            let ctx = cairo::Context::new(&surface);

            draw_mesh(&ctx, mesh, size as f64, style);
            ctx.show_page();

        }

        Some("png") => {

            let surface = cairo::ImageSurface::create(cairo::Format::ARgb32,
                                                      size as i32, size as i32)?;

            {
                let ctx = cairo::Context::new(&surface);
                draw_mesh(&ctx, mesh, size as f64, style);
            }

            let mut file = File::create(filename).chain_err(|| format!("creating {:}", filename))?;

            surface.write_to_png(&mut file).map_err(
                |e| format!("writing {:}: {:?}", filename, e))?;

        }

        _ => {
            bail!("don't know how to write {:}, expected .png or .pdf", filename);
        }

    }

    info!(filename = filename, size = size, "wrote rendering");

    Ok(())

}

//////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {

    use super::*;
    use crate::deform::{deform_manual, PhiByType};
    use crate::mesh::{build_mesh, NodeType, DEFORMABLE_TYPES};

    #[test]
    fn canvas_maps_unit_square() {
        assert_eq!(to_canvas(&Point2d::new(-1.0, -1.0), 200.0), Point2d::new(0.0, 0.0));
        assert_eq!(to_canvas(&Point2d::new(0.0, 0.0), 200.0), Point2d::new(100.0, 100.0));
        assert_eq!(to_canvas(&Point2d::new(1.0, 0.5), 200.0), Point2d::new(200.0, 150.0));
    }

    // render to a fresh ARGB surface, returning pixels and stride
    fn render(mesh: &Mesh, size: i32, style: &Style) -> (Vec<u8>, usize) {

        let mut surface = cairo::ImageSurface::create(cairo::Format::ARgb32, size, size).unwrap();

        {
            let ctx = cairo::Context::new(&surface);
            draw_mesh(&ctx, mesh, size as f64, style);
        }

        surface.flush();

        let stride = surface.get_stride() as usize;
        let data = surface.get_data().unwrap().to_vec();

        (data, stride)

    }

    // (r, g, b, a) of one pixel
    fn rgba(pixels: &(Vec<u8>, usize), x: usize, y: usize) -> (u8, u8, u8, u8) {

        let (data, stride) = pixels;
        let i = y * stride + 4 * x;
        let argb = u32::from_ne_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]]);

        ((argb >> 16) as u8, (argb >> 8) as u8, argb as u8, (argb >> 24) as u8)

    }

    #[test]
    fn default_view_is_cropped_to_a_disc() {

        let (mesh, _) = build_mesh(2).unwrap();

        let cropped = render(&mesh, 64, &Style::default());
        assert_eq!(rgba(&cropped, 0, 0).3, 0);
        assert_eq!(rgba(&cropped, 63, 63).3, 0);
        assert_eq!(rgba(&cropped, 32, 32).3, 255);
        assert_eq!(rgba(&cropped, 32, 6).3, 255);

        let full = render(&mesh, 64, &Style { crop: false, ..Default::default() });
        assert_eq!(rgba(&full, 0, 0).3, 255);
        assert_eq!(rgba(&full, 63, 63).3, 255);

    }

    #[test]
    fn debug_view_marks_origins() {

        // the center of the depth 1 wheel is a type 3 node, so it gets
        // a dot but no label
        let (mesh, _) = build_mesh(1).unwrap();
        assert_eq!(mesh.node(PointKey(0, 0)).unwrap().node_type, NodeType::Type3);

        let plain = render(&mesh, 256, &Style { crop: false, ..Default::default() });
        assert_ne!(rgba(&plain, 128, 128), (255, 0, 0, 255));

        let debug = render(&mesh, 256, &Style { crop: false, debug: true, ..Default::default() });
        assert_eq!(rgba(&debug, 128, 128), (255, 0, 0, 255));

    }

    #[test]
    fn debug_view_draws_offsets() {

        let (mut mesh, _) = build_mesh(3).unwrap();

        let mut phis = PhiByType::new();
        for &t in &DEFORMABLE_TYPES {
            phis.set(t, 0.1);
        }

        deform_manual(&mut mesh, &phis);

        let size = 512;
        let style = Style { crop: false, debug: true, ..Default::default() };
        let pixels = render(&mesh, size, &style);

        let node = mesh.nodes().values()
            .find(|n| n.node_type.is_deformable() && n.origin.coords.norm() < 0.5)
            .unwrap();

        // partway along the offset, clear of the dot and label at the origin
        let p = to_canvas(&(node.origin + polar(0.06, node.angle.unwrap())), size as f64);

        let (x, y) = (p.x as usize, p.y as usize);

        let greenish = (y - 1..=y + 1).any(|yy| {
            (x - 1..=x + 1).any(|xx| {
                let (r, g, b, _) = rgba(&pixels, xx, yy);
                g as i32 > r as i32 + 40 && g as i32 > b as i32 + 40
            })
        });

        assert!(greenish, "no offset line near {:?}", p);

    }

    #[test]
    fn rejects_unknown_extension() {
        let (mesh, _) = build_mesh(0).unwrap();
        assert!(write_mesh(&mesh, 32, &Style::default(), "mesh.bmp").is_err());
    }

}
