// bunch of standard library stuff
use std::fs::File;
use std::io::BufReader;

use image::io::Reader as ImageReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[macro_use]
extern crate error_chain;

use deformed_penrose::errors::*;
use deformed_penrose::settings::{Mode, SettingsFile, DEFAULT_CANVAS_SIZE};
use deformed_penrose::deform::fit_to_canvas;
use deformed_penrose::{build_mesh, deform_image, deform_manual, render};

//////////////////////////////////////////////////////////////////////

fn run() -> Result<()> {

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() != 2 {
        eprintln!("usage: {:?} SETTINGSFILE", args[0]);
        std::process::exit(1);
    }

    let filename = &args[1];

    let f = File::open(filename).chain_err(|| format!("opening {:}", filename))?;
    let mut reader = BufReader::new(f);

    let settings = SettingsFile::parse(filename, &mut reader)?;

    // grayscale reference image, if any
    let reference = match &settings.image {
        None => None,
        Some(ifilename) => {
            let img = ImageReader::open(ifilename).chain_err(
                || format!("reference image not found: {:}", ifilename))?
                .decode()?
                .to_luma8();
            info!(filename = ifilename.as_str(),
                  width = img.width(), height = img.height(),
                  "loaded reference image");
            Some(img)
        }
    };

    let size = match (settings.size, &reference) {
        (Some(size), _) => size,
        (None, Some(img)) => img.width().max(img.height()),
        (None, None) => DEFAULT_CANVAS_SIZE
    };

    let reference = reference.map(|img| fit_to_canvas(img, size));

    let depth = settings.depth.ok_or("depth is unset")?;

    let (mut mesh, lengths) = build_mesh(depth)?;

    match (settings.mode(), &reference) {

        (Mode::Manual, _) => {
            deform_manual(&mut mesh, &settings.phis(lengths.short));
        }

        (Mode::Image, Some(img)) => {
            let ranges = settings.ranges();
            info!(types = ?deformed_penrose::deform::active_types(&ranges),
                  "deforming from image");
            deform_image(&mut mesh, img, &ranges, &lengths, size);
        }

        (Mode::Image, None) => {
            bail!("image mode needs an image");
        }

    }

    let output = settings.output_for(filename);

    render::write_mesh(&mesh, size, &settings.style(), &output)?;

    println!("wrote {:}", output);

    Ok(())

}

quick_main!(run);
