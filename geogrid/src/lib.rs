//! Helpers behind the `geogrid` command line tool

use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};
use image::codecs::png::PngEncoder;
use image::ImageEncoder;
use libgeogrid::key::IntegerKey;
use libgeogrid::read::{read_raster, ReadRaster};
use libgeogrid::Raster;
use tracing::{debug, info, instrument};

/// Prints a summary of a raster file: size, cell type, georeferencing
/// and whether it carries a colour key.
#[instrument]
pub fn info(file: &Path) -> Result<()> {
    let raster = read_raster(file)?;
    println!("file:      {}", file.display());
    println!("size:      {} rows x {} columns", raster.rows(), raster.cols());
    println!("cell type: {}", raster.cell_type());
    println!(
        "origin:    ({}, {}), cell size {}",
        raster.origin_x(),
        raster.origin_y(),
        raster.cell_size()
    );
    println!("keyed:     {}", if raster.is_keyed() { "yes" } else { "no" });
    Ok(())
}

/// Renders a raster file to a PNG
///
/// Keyed rasters render through their own key; plain integer rasters fall
/// back to the packed-colour key. Plain double and text rasters have no
/// colours to render with.
#[instrument]
pub fn render(file: &Path, output: &Path, zoom: u32) -> Result<()> {
    let raster = read_raster(file)?;
    debug!("read {} raster", raster.cell_type());
    let image = match raster {
        ReadRaster::KeyedInt(keyed) => keyed.to_image_zoomed(zoom)?,
        ReadRaster::KeyedDouble(keyed) => keyed.to_image_zoomed(zoom)?,
        ReadRaster::KeyedText(keyed) => keyed.to_image_zoomed(zoom)?,
        ReadRaster::Int(raster) => raster.into_keyed(IntegerKey).to_image_zoomed(zoom)?,
        ReadRaster::Double(_) | ReadRaster::Text(_) => {
            bail!(
                "{} has no colour key to render with; only keyed and integer rasters can become images",
                file.display()
            );
        }
    };

    let out = File::options()
        .create(true)
        .write(true)
        .truncate(true)
        .open(output)
        .with_context(|| format!("open {}", output.display()))?;
    let encoder = PngEncoder::new(out);
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    info!("wrote {}", output.display());
    Ok(())
}

/// Writes the raster as `x,y,value` triples to stdout, one populated
/// cell per line, using cell-centre coordinates.
#[instrument]
pub fn dump(file: &Path) -> Result<()> {
    match read_raster(file)? {
        ReadRaster::Int(raster) => dump_cells(&raster),
        ReadRaster::Double(raster) => dump_cells(&raster),
        ReadRaster::Text(raster) => dump_cells(&raster),
        ReadRaster::KeyedInt(keyed) => dump_cells(keyed.raster()),
        ReadRaster::KeyedDouble(keyed) => dump_cells(keyed.raster()),
        ReadRaster::KeyedText(keyed) => dump_cells(keyed.raster()),
    }
    Ok(())
}

fn dump_cells<T: PartialEq + std::fmt::Display>(raster: &Raster<T>) {
    for row in 0..raster.rows() {
        for col in 0..raster.cols() {
            if let Ok(Some(value)) = raster.at_rc(row, col) {
                println!(
                    "{},{},{value}",
                    raster.x_of_column(col),
                    raster.y_of_row(row)
                );
            }
        }
    }
}
