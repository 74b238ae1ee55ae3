//////////////////////////////////////////////////////////////////////
// settings files: one keyword per line, space separated tokens,
// '#' starts a comment. see SettingsFile::parse_keyword for the list
// of keywords.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

use phf::phf_map;

use crate::deform::{PhiByType, RangeByType};
use crate::errors::*;
use crate::geom::Vec3d;
use crate::mesh::NodeType;
use crate::render::Style;

// how displacement magnitudes are chosen
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Mode {
    Manual, // fixed magnitude per node type
    Image   // brightness of the reference image under each node
}

// only the deformable types can be given magnitudes or ranges
static NODE_TYPE_LOOKUP: phf::Map<&'static str, NodeType> = phf_map! {
    "t1" => NodeType::Type1,
    "t2" => NodeType::Type2,
    "t4" => NodeType::Type4,
    "t5" => NodeType::Type5,
    "t6" => NodeType::Type6,
    "t7" => NodeType::Type7,
};

static MODE_LOOKUP: phf::Map<&'static str, Mode> = phf_map! {
    "manual" => Mode::Manual,
    "image" => Mode::Image,
};

static SWITCH_LOOKUP: phf::Map<&'static str, bool> = phf_map! {
    "on" => true,
    "off" => false,
};

// canvas size when neither the file nor an image gives one
pub const DEFAULT_CANVAS_SIZE: u32 = 800;

//////////////////////////////////////////////////////////////////////
// macro for pulling typed values out of a line's tokens

macro_rules! parse_tokens {

    // finalizer - no more input to match, just error if remaining
    // input or return collected outputs
    ($it:ident { } -> { $($tuple:ident,)* } ) => (
        match $it.next() {
            Some(value) => Err(format!("found extra token(s) starting with \"{:}\"", value)),
            None => Ok(($($tuple),*))
        }
    );

    // string map
    ($it:ident { $name:ident from $map:expr, $($ts:tt)* } -> { $($tuple:ident,)* } ) => (
        match $it.next() {
            None => Err(format!("missing token for {:}", stringify!($name)) ),
            Some(&value) => {
                if let Some(&k) = $map.get(value) {
                    let $name = k;
                    parse_tokens!( $it { $($ts)* } -> { $($tuple,)* $name, } )
                } else {
                    let mut extended: Vec<&str> = Vec::new();
                    extended.extend($map.keys());
                    extended.sort();
                    Err(format!("unexpected value \"{:}\" for {:}, expected one of: {{\"{:}\"}}",
                                value, stringify!($name), extended.join("\", \"") ))
                }
            }
        }
    );

    // name, type pair
    ($it:ident { $name:ident : $type:ident, $($ts:tt)* } -> { $($tuple:ident,)* } ) => (
        match $it.next() {
            None => Err(format!("missing token for {:}", stringify!($name)) ),
            Some(value) => if let Ok($name) = value.parse::<$type>() {
                parse_tokens!( $it { $($ts)* } -> { $($tuple,)* $name, } )
            } else {
                Err(format!("error parsing {:} as type {:}",
                            value, stringify!($type)))
            }
        }
    );

    // entry point
    ($a:expr, { $($ts:tt)+ }) => (
        {
            let mut it = $a.iter();
            parse_tokens!( it { $($ts)* , } -> { } )
        }
    );

}

//////////////////////////////////////////////////////////////////////
// refuse to set the same thing twice

macro_rules! copy_field {

    ($dst:ident, $src:ident, $field:ident) => (
        if $src.$field.is_some() {
            if $dst.$field.is_some() {
                bail!("{:} is already set", stringify!($field));
            }
            $dst.$field = $src.$field;
        }
    )

}

macro_rules! copy_entries {

    ($dst:ident, $src:ident, $field:ident) => (
        for (k, v) in $src.$field {
            if $dst.$field.insert(k, v).is_some() {
                bail!("{:} for {:?} is already set", stringify!($field), k);
            }
        }
    )

}

//////////////////////////////////////////////////////////////////////

fn rel_path(orig_filename: &str, child_filename: String) -> String {

    let orig_filename = Path::new(orig_filename);

    match orig_filename.parent() {
        None => child_filename,
        Some(parent) => parent.join(child_filename).to_string_lossy().into_owned()
    }

}

fn rgb(r: u8, g: u8, b: u8) -> Vec3d {
    Vec3d::new(r as f64, g as f64, b as f64) / 255.0
}

//////////////////////////////////////////////////////////////////////
// everything a settings file can say; unset fields fall back to
// defaults in the accessors below

#[derive(Debug, Default)]
pub struct SettingsFile {
    pub depth:       Option<usize>,                 // subdivision depth
    pub output:      Option<String>,                // .png or .pdf
    pub size:        Option<u32>,                   // canvas size in pixels
    pub mode:        Option<Mode>,
    pub image:       Option<String>,                // reference image path
    pub factors:     BTreeMap<NodeType, f64>,       // manual magnitudes, in units of short
    pub clamp:       Option<bool>,                  // keep manual magnitudes from colliding
    pub ranges:      BTreeMap<NodeType, (f64, f64)>,// image mode brightness ranges
    pub red_fill:    Option<Vec3d>,
    pub blue_fill:   Option<Vec3d>,
    pub line_color:  Option<Vec3d>,
    pub line_width:  Option<f64>,
    pub crop:        Option<bool>,                  // clip to a disc, default unless debugging
    pub debug:       Option<bool>                   // draw offsets, origins and node types
}

impl SettingsFile {

    pub fn new() -> SettingsFile {
        Default::default()
    }

    fn update(&mut self, other: SettingsFile) -> Result<()> {

        copy_field!(self, other, depth);
        copy_field!(self, other, output);
        copy_field!(self, other, size);
        copy_field!(self, other, mode);
        copy_field!(self, other, image);
        copy_entries!(self, other, factors);
        copy_field!(self, other, clamp);
        copy_entries!(self, other, ranges);
        copy_field!(self, other, red_fill);
        copy_field!(self, other, blue_fill);
        copy_field!(self, other, line_color);
        copy_field!(self, other, line_width);
        copy_field!(self, other, crop);
        copy_field!(self, other, debug);

        Ok(())

    }

    fn parse_keyword(filename: &str,
                     keyword: &str,
                     rest: &[&str]) -> Result<SettingsFile> {

        let mut update = SettingsFile::new();

        match keyword {

            "depth" => {
                update.depth = Some(parse_tokens!(rest, { depth: usize })?);
            }

            "output" => {
                let ofilename = parse_tokens!(rest, { path: String })?;
                update.output = Some(rel_path(filename, ofilename));
            }

            "size" => {
                let size = parse_tokens!(rest, { pixels: u32 })?;
                if size == 0 {
                    bail!("canvas size must be positive");
                }
                update.size = Some(size);
            }

            "mode" => {
                update.mode = Some(parse_tokens!(rest, { mode from MODE_LOOKUP })?);
            }

            "image" => {
                let ifilename = parse_tokens!(rest, { path: String })?;
                update.image = Some(rel_path(filename, ifilename));
            }

            "phi" => {
                let (ntype, factor) = parse_tokens!(rest, {
                    ntype from NODE_TYPE_LOOKUP,
                    factor: f64
                })?;
                update.factors.insert(ntype, factor);
            }

            "clamp" => {
                update.clamp = Some(parse_tokens!(rest, { clamp from SWITCH_LOOKUP })?);
            }

            "range" => {
                let (ntype, min, max) = parse_tokens!(rest, {
                    ntype from NODE_TYPE_LOOKUP,
                    min: f64,
                    max: f64
                })?;
                update.ranges.insert(ntype, (min, max));
            }

            "red_fill" | "blue_fill" | "line_color" => {

                let (r, g, b) = parse_tokens!(rest, { r: u8, g: u8, b: u8 })?;
                let color = Some(rgb(r, g, b));

                match keyword {
                    "red_fill" => update.red_fill = color,
                    "blue_fill" => update.blue_fill = color,
                    _ => update.line_color = color
                }

            }

            "line_width" => {
                let width = parse_tokens!(rest, { width: f64 })?;
                if width < 0.0 {
                    bail!("line width can't be negative");
                }
                update.line_width = Some(width);
            }

            "crop" => {
                update.crop = Some(parse_tokens!(rest, { crop from SWITCH_LOOKUP })?);
            }

            "debug" => {
                update.debug = Some(parse_tokens!(rest, { debug from SWITCH_LOOKUP })?);
            }

            _ => {
                bail!("unrecognized keyword");
            }

        };

        Ok(update)

    }

    fn update_from(&mut self, filename: &str, line: &str) -> Result<()> {

        let mut trimmed = line.trim();

        if let Some(pos) = trimmed.find('#') {
            trimmed = &trimmed[0..pos];
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();

        if tokens.is_empty() {
            return Ok(());
        }

        let keyword = tokens[0];
        let rest = &tokens[1..];

        let update = Self::parse_keyword(filename, keyword, rest).chain_err(
            || format!("while parsing keyword {:}", keyword))?;

        self.update(update)

    }

    pub fn parse(filename: &str, istr: &mut impl BufRead) -> Result<SettingsFile> {

        let mut settings = SettingsFile::new();
        let mut lineno = 0;

        loop {

            let mut line = String::new();

            lineno += 1;

            let len = istr.read_line(&mut line).chain_err(|| format!("{:}:{:}: read error", filename, lineno))?;

            if len == 0 {
                break;
            }

            settings.update_from(filename, line.as_str()).chain_err(|| format!("{:}:{:}: parse error", filename, lineno))?;

        }

        if settings.depth.is_none() {
            bail!("{:}: the following field(s) were unset: depth", filename);
        }

        if settings.mode == Some(Mode::Image) && settings.image.is_none() {
            bail!("{:}: image mode needs an image", filename);
        }

        Ok(settings)

    }

    //////////////////////////////////////////////////
    // resolved values

    pub fn mode(&self) -> Mode {
        match (self.mode, &self.image) {
            (Some(mode), _) => mode,
            (None, Some(_)) => Mode::Image,
            (None, None) => Mode::Manual
        }
    }

    pub fn clamp(&self) -> bool {
        self.clamp.unwrap_or(true)
    }

    // manual magnitudes for a mesh with the given short edge length
    pub fn phis(&self, short: f64) -> PhiByType {
        PhiByType::from_factors(&self.factors, short, self.clamp())
    }

    // defaults overridden type by type
    pub fn ranges(&self) -> RangeByType {

        let mut ranges = RangeByType::default();

        for (&ntype, &(min, max)) in &self.ranges {
            ranges.set(ntype, min, max);
        }

        ranges

    }

    pub fn style(&self) -> Style {

        let mut style = Style::default();

        if let Some(c) = self.red_fill { style.red_fill = c; }
        if let Some(c) = self.blue_fill { style.blue_fill = c; }
        if let Some(c) = self.line_color { style.line_color = c; }
        if let Some(w) = self.line_width { style.line_width = w; }
        if let Some(d) = self.debug { style.debug = d; }

        // the debug view shows the ragged rim unless asked otherwise
        style.crop = self.crop.unwrap_or(!style.debug);

        style

    }

    // output path, defaulting to the settings file's name with .png
    pub fn output_for(&self, filename: &str) -> String {

        if let Some(output) = &self.output {
            return output.clone();
        }

        let path = Path::new(filename);

        let stem = match path.file_stem() {
            None => "output",
            Some(os_str) => os_str.to_str().unwrap_or("output")
        };

        rel_path(filename, stem.to_owned() + ".png")

    }

}

//////////////////////////////////////////////////////////////////////
