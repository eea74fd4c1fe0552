//! ARC ASCII grid reader
//!
//! The format is a six-line header of ordered key/value pairs followed by
//! the cell body, one line per row:
//!
//! ```text
//! nrows 2
//! ncols 2
//! xllcorner 0.0
//! yllcorner 0.0
//! cellsize 1.0
//! nodata_value -9999
//! 1 2
//! -9999 4
//! ```
//!
//! `xllcenter`/`yllcenter` may replace the corner keys, in which case half
//! a cell is subtracted to recover the corner. `nodata_value` is optional.

use crate::error::Error;
use crate::raster::Raster;
use crate::read::scan::Scanner;
use crate::read::ReadRaster;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

const FORMAT: &str = "ARC ASCII grid";

const HEADER_KEYS: [&str; 6] = [
    "nrows",
    "ncols",
    "xllcorner|xllcenter",
    "yllcorner|yllcenter",
    "cellsize",
    "?nodata_value",
];

/// Reads an ARC ASCII grid file
///
/// # Errors
/// Fails if the file cannot be opened or does not conform to the format.
pub fn read_arc(path: impl AsRef<Path>) -> Result<ReadRaster, Error> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    read_arc_from_reader(reader, &path.display().to_string())
}

/// Reads an ARC ASCII grid from a buffered reader
///
/// The narrowest cell type covering the whole body and the no-data token
/// is detected automatically: integer, then double, then text.
///
/// # Errors
/// Fails if the header keys are missing, out of order or unparseable, or
/// if the body does not hold exactly the declared number of cells.
pub fn read_arc_from_reader(reader: impl BufRead, filename: &str) -> Result<ReadRaster, Error> {
    let mut scanner = Scanner::new(reader, filename, FORMAT);
    let header = scanner.read_ordered_key_value_pairs(&HEADER_KEYS)?;

    let nrows: usize = header_number(&scanner, &header, "nrows", "an integer for nrows")?;
    let ncols: usize = header_number(&scanner, &header, "ncols", "an integer for ncols")?;
    let cellsize: f64 = header_number(&scanner, &header, "cellsize", "a double for cellsize")?;
    let xllcorner = corner(&scanner, &header, "xllcorner", "xllcenter", cellsize)?;
    let yllcorner = corner(&scanner, &header, "yllcorner", "yllcenter", cellsize)?;

    let grid = scanner.read_rows(nrows, ncols)?;
    let nodata = header.get("nodata_value");

    let raster = match nodata {
        Some(token) => {
            if let (Ok(sentinel), Ok(cells)) = (token.parse::<i32>(), grid.parse_as::<i32>()) {
                ReadRaster::Int(Raster::from_grid(
                    cells,
                    xllcorner,
                    yllcorner,
                    cellsize,
                    Some(sentinel),
                )?)
            } else if let (Ok(sentinel), Ok(cells)) =
                (token.parse::<f64>(), grid.parse_as::<f64>())
            {
                ReadRaster::Double(Raster::from_grid(
                    cells,
                    xllcorner,
                    yllcorner,
                    cellsize,
                    Some(sentinel),
                )?)
            } else {
                let sentinel = Some(token.clone());
                ReadRaster::Text(Raster::from_grid(
                    grid, xllcorner, yllcorner, cellsize, sentinel,
                )?)
            }
        }
        None => {
            if let Ok(cells) = grid.parse_as::<i32>() {
                ReadRaster::Int(Raster::from_grid(cells, xllcorner, yllcorner, cellsize, None)?)
            } else if let Ok(cells) = grid.parse_as::<f64>() {
                ReadRaster::Double(Raster::from_grid(
                    cells, xllcorner, yllcorner, cellsize, None,
                )?)
            } else {
                ReadRaster::Text(Raster::from_grid(grid, xllcorner, yllcorner, cellsize, None)?)
            }
        }
    };

    debug!(
        "read {}x{} {} raster from {filename}",
        raster.rows(),
        raster.cols(),
        raster.cell_type()
    );
    Ok(raster)
}

fn header_number<N: FromStr, R: BufRead>(
    scanner: &Scanner<R>,
    header: &HashMap<String, String>,
    key: &str,
    wanted: &str,
) -> Result<N, Error> {
    let value = header
        .get(key)
        .ok_or_else(|| scanner.refuse(format!("key \"{key}\""), None))?;
    value
        .parse()
        .map_err(|_| scanner.refuse(wanted, Some(value.clone())).into())
}

/// Resolves a corner coordinate from its corner or centre variant
fn corner<R: BufRead>(
    scanner: &Scanner<R>,
    header: &HashMap<String, String>,
    corner_key: &str,
    center_key: &str,
    cellsize: f64,
) -> Result<f64, Error> {
    let wanted = format!("a double for {corner_key} or {center_key}");
    if header.contains_key(corner_key) {
        return header_number(scanner, header, corner_key, &wanted);
    }
    let center: f64 = header_number(scanner, header, center_key, &wanted)?;
    Ok(center - cellsize / 2.0)
}

#[cfg(test)]
mod tests {
    use super::read_arc_from_reader;
    use crate::read::ReadRaster;

    fn read(text: &str) -> Result<ReadRaster, crate::error::Error> {
        read_arc_from_reader(text.as_bytes(), "test.asc")
    }

    const BASIC: &str = "\
nrows 2
ncols 2
xllcorner 0
yllcorner 0
cellsize 1
nodata_value -9999
1 2
-9999 4
";

    #[test]
    fn reads_an_integer_grid_with_a_no_data_sentinel() {
        let ReadRaster::Int(raster) = read(BASIC).unwrap() else {
            panic!("expected an integer raster");
        };
        assert_eq!((raster.rows(), raster.cols()), (2, 2));
        assert_eq!(raster.at_rc(0, 0).unwrap(), Some(&1));
        assert_eq!(raster.at_rc(0, 1).unwrap(), Some(&2));
        assert_eq!(raster.at_rc(1, 0).unwrap(), None);
        assert_eq!(raster.at_rc(1, 1).unwrap(), Some(&4));
    }

    #[test]
    fn center_variants_shift_the_origin_by_half_a_cell() {
        let input = "\
nrows 1
ncols 1
xllcenter 5
yllcenter 5
cellsize 10
7
";
        let raster = read(input).unwrap();
        assert_eq!(raster.origin_x(), 0.0);
        assert_eq!(raster.origin_y(), 0.0);
    }

    #[test]
    fn header_keys_match_case_insensitively() {
        let input = "\
NROWS 1
NCols 1
XLLCORNER 0
yllcorner 0
CellSize 1
8
";
        assert_eq!(read(input).unwrap().rows(), 1);
    }

    #[test]
    fn type_detection_widens_as_needed() {
        let double = "\
nrows 1
ncols 2
xllcorner 0
yllcorner 0
cellsize 1
1.5 2
";
        assert!(matches!(read(double).unwrap(), ReadRaster::Double(_)));
        let text = "\
nrows 1
ncols 2
xllcorner 0
yllcorner 0
cellsize 1
1.5 pine
";
        assert!(matches!(read(text).unwrap(), ReadRaster::Text(_)));
    }

    #[test]
    fn a_double_no_data_token_forces_doubles() {
        let input = "\
nrows 1
ncols 2
xllcorner 0
yllcorner 0
cellsize 1
nodata_value -9999.5
1 2
";
        let ReadRaster::Double(raster) = read(input).unwrap() else {
            panic!("expected a double raster");
        };
        assert_eq!(raster.no_data_value(), Some(&-9999.5));
    }

    #[test]
    fn missing_header_keys_are_refused() {
        let input = "\
nrows 1
cellsize 1
1
";
        let err = read(input).unwrap_err();
        assert!(err.to_string().contains("ncols"), "{err}");
    }

    #[test]
    fn short_bodies_are_refused() {
        let input = "\
nrows 2
ncols 2
xllcorner 0
yllcorner 0
cellsize 1
1 2
";
        let err = read(input).unwrap_err();
        assert!(err.to_string().contains("2 columns"), "{err}");
    }

    #[test]
    fn a_two_column_body_survives_the_optional_no_data_key() {
        let input = "\
nrows 2
ncols 2
xllcorner 0
yllcorner 0
cellsize 1
1 2
3 4
";
        let ReadRaster::Int(raster) = read(input).unwrap() else {
            panic!("expected an integer raster");
        };
        assert_eq!(raster.at_rc(0, 0).unwrap(), Some(&1));
        assert_eq!(raster.at_rc(1, 1).unwrap(), Some(&4));
    }
}
