//! # libgeogrid
//!
//! This library provides datatypes and i/o functionality for georeferenced
//! raster grids: 2D grids of typed cells with a real-world origin and cell
//! size, colour keys mapping cell values to colours and back, and readers
//! for two text raster formats (ARC ASCII grids and XPM pixel maps with
//! georeferencing extensions).
//!
//! ### Data model
//!
//! A [`Grid`] is a fixed-size 2D container of optional cells. A [`Raster`]
//! adds georeferencing and 'no data' handling: a cell holds no data when
//! it is empty, equals the configured no-data value, or has been marked
//! explicitly, and the raster keeps those representations consistent for
//! you. A [`KeyedRaster`] binds a raster to a [`key::ColorKey`], which
//! makes it renderable as an image.
//!
//! Keys come in four shapes: [`key::ScaledKey`] places a numeric range on
//! a straight line through RGB or HSB colour space, linearly or
//! logarithmically; [`key::MultiScaleKey`] combines several
//! non-overlapping scaled keys; [`key::MappedKey`] is an explicit
//! one-to-one legend; [`key::IntegerKey`] treats an integer and its packed
//! colour as the same 32 bits.
//!
//! ### Reading raster files
//!
//! ```no_run
//! use libgeogrid::read::{read_raster, ReadRaster};
//!
//! fn main() -> Result<(), libgeogrid::Error> {
//!     match read_raster("elevation.asc")? {
//!         ReadRaster::Int(raster) => {
//!             println!("{} x {} integer cells", raster.rows(), raster.cols());
//!         }
//!         ReadRaster::KeyedText(keyed) => {
//!             let image = keyed.to_image()?;
//!             println!("rendered {} x {}", image.width(), image.height());
//!         }
//!         other => println!("read a {} raster", other.cell_type()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Cell types are detected, not declared: a reader tries integers first,
//! then doubles, then falls back to text, each over the whole body, so a
//! single stray token widens the whole raster.
//!
//! ### Building a key by hand
//!
//! ```
//! use libgeogrid::key::{ColorKey, ScaledKey};
//! use libgeogrid::Color;
//!
//! fn main() -> Result<(), libgeogrid::Error> {
//!     let key = ScaledKey::<i32>::builder()
//!         .min(0)
//!         .max(255)
//!         .min_color(Color::rgb(0, 0, 0))
//!         .max_color(Color::rgb(255, 255, 255))
//!         .build()?;
//!     assert_eq!(key.color_of(&128)?, Color::rgb(128, 128, 128));
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::module_name_repetitions
)]

mod color;
mod error;
mod grid;
pub mod key;
mod keyed;
mod raster;
pub mod read;
mod xcolor;

pub use color::Color;
pub use error::{
    CellSizeError, Error, FormatError, IndexError, KeyError, MappingError, OverlapError,
    ParseError, ScaleError,
};
pub use grid::Grid;
pub use keyed::KeyedRaster;
pub use raster::Raster;
pub use xcolor::{XColorError, XColorTable};
