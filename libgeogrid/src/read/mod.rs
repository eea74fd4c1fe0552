//! Readers turning raster files into in-memory rasters
//!
//! Two text formats are understood: ARC ASCII grids and XPM pixel maps
//! carrying georeferencing in their extension section. Both readers
//! detect the narrowest cell type the file supports, trying integers
//! first, then doubles, then falling back to text, and both either build
//! the whole raster or fail without returning anything partial.

pub mod arc;
pub mod scan;
pub mod xpm;

use crate::error::Error;
use crate::keyed::KeyedRaster;
use crate::raster::Raster;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A raster read from a file, tagged by its detected cell type
///
/// Files whose legend covers every populated cell come back keyed; the
/// rest come back as plain rasters. The union is closed: these six are
/// the only shapes a reader produces.
#[derive(Debug)]
pub enum ReadRaster {
    /// Every cell parsed as a 32-bit integer
    Int(Raster<i32>),
    /// Every cell parsed as a double
    Double(Raster<f64>),
    /// Cells kept as text
    Text(Raster<String>),
    /// Integer cells with a legend
    KeyedInt(KeyedRaster<i32>),
    /// Double cells with a legend
    KeyedDouble(KeyedRaster<f64>),
    /// Text cells with a legend
    KeyedText(KeyedRaster<String>),
}

macro_rules! with_raster {
    ($self:ident, $r:ident => $e:expr) => {
        match $self {
            Self::Int($r) => $e,
            Self::Double($r) => $e,
            Self::Text($r) => $e,
            Self::KeyedInt(keyed) => {
                let $r = keyed.raster();
                $e
            }
            Self::KeyedDouble(keyed) => {
                let $r = keyed.raster();
                $e
            }
            Self::KeyedText(keyed) => {
                let $r = keyed.raster();
                $e
            }
        }
    };
}

impl ReadRaster {
    /// Number of rows
    #[must_use]
    pub fn rows(&self) -> usize {
        with_raster!(self, r => r.rows())
    }

    /// Number of columns
    #[must_use]
    pub fn cols(&self) -> usize {
        with_raster!(self, r => r.cols())
    }

    /// Eastings of the origin
    #[must_use]
    pub fn origin_x(&self) -> f64 {
        with_raster!(self, r => r.origin_x())
    }

    /// Northings of the origin
    #[must_use]
    pub fn origin_y(&self) -> f64 {
        with_raster!(self, r => r.origin_y())
    }

    /// Length of one side of the square cells
    #[must_use]
    pub fn cell_size(&self) -> f64 {
        with_raster!(self, r => r.cell_size())
    }

    /// Name of the detected cell type
    #[must_use]
    pub const fn cell_type(&self) -> &'static str {
        match self {
            Self::Int(_) | Self::KeyedInt(_) => "integer",
            Self::Double(_) | Self::KeyedDouble(_) => "double",
            Self::Text(_) | Self::KeyedText(_) => "text",
        }
    }

    /// Whether the raster carries a colour key
    #[must_use]
    pub const fn is_keyed(&self) -> bool {
        matches!(
            self,
            Self::KeyedInt(_) | Self::KeyedDouble(_) | Self::KeyedText(_)
        )
    }
}

/// Reads a raster file, picking the format by file extension
///
/// Files ending in `.xpm` are read as XPM pixel maps; everything else is
/// read as an ARC ASCII grid.
///
/// # Errors
/// Fails if the file cannot be opened or does not conform to its format.
pub fn read_raster(path: impl AsRef<Path>) -> Result<ReadRaster, Error> {
    let path = path.as_ref();
    let filename = path.display().to_string();
    let reader = BufReader::new(File::open(path)?);
    let is_xpm = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("xpm"));
    if is_xpm {
        xpm::read_xpm_from_reader(reader, &filename)
    } else {
        arc::read_arc_from_reader(reader, &filename)
    }
}
