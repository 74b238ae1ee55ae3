//! Deformed Penrose tilings.
//!
//! A sun wheel of Robinson half-tiles is subdivided to the requested
//! depth, the corners are merged into nodes, every node is classified
//! by the red/blue triangles meeting there and given a deformation
//! angle, and finally nodes are pushed along their angles either by
//! fixed per-type amounts or by the brightness of a reference image.
//!
//! ```no_run
//! use deformed_penrose::{build_mesh, deform_manual, NodeType, PhiByType};
//!
//! let (mut mesh, lengths) = build_mesh(5)?;
//! deform_manual(&mut mesh, &PhiByType::new().with(NodeType::Type4, 0.5 * lengths.short));
//! # Ok::<(), deformed_penrose::errors::Error>(())
//! ```

//////////////////////////////////////////////////////////////////////
// use error chain so we can use Result<> everywhere
// for error handling

#[macro_use]
extern crate error_chain;

pub mod errors {

    error_chain!{

        errors {
            DepthTooLarge(depth: usize, max: usize) {
                description("subdivision depth too large")
                display("subdivision depth {} exceeds the maximum of {}", depth, max)
            }
        }

        foreign_links {
            Fmt(::std::fmt::Error);
            Io(::std::io::Error);
            Cairo(::cairo::Error);
            Image(::image::ImageError);
        }

    }

}

pub mod geom;
pub mod tiling;
pub mod mesh;
pub mod classify;
pub mod angles;
pub mod deform;
pub mod render;
pub mod settings;

pub use angles::{resolve_angles, EdgeLengths};
pub use classify::classify;
pub use deform::{deform_image, deform_manual, BrightnessSampler, PhiByType, RangeByType};
pub use mesh::{build_mesh, Mesh, Node, NodeType, Triangle};
pub use tiling::{subdivide, HalfTile, HalfTileType};
