//! A raster bound to a colour key

use crate::color::Color;
use crate::error::{Error, KeyError};
use crate::key::ColorKey;
use crate::raster::Raster;
use image::RgbaImage;
use tracing::trace;

/// A [`Raster`] composed with a key mapping its entries to colours
///
/// The key makes the raster renderable: each cell becomes a pixel, no-data
/// cells become fully transparent ones. The keyed raster has no lifetime
/// of its own; it owns the raster it was built around.
pub struct KeyedRaster<T> {
    raster: Raster<T>,
    key: Box<dyn ColorKey<T> + Send + Sync>,
}

impl<T: PartialEq> KeyedRaster<T> {
    /// Binds a key to an existing raster
    pub fn new(raster: Raster<T>, key: impl ColorKey<T> + Send + Sync + 'static) -> Self {
        Self {
            raster,
            key: Box::new(key),
        }
    }

    /// The wrapped raster
    #[must_use]
    pub const fn raster(&self) -> &Raster<T> {
        &self.raster
    }

    /// Mutable access to the wrapped raster
    pub fn raster_mut(&mut self) -> &mut Raster<T> {
        &mut self.raster
    }

    /// Unwraps the raster, dropping the key
    #[must_use]
    pub fn into_raster(self) -> Raster<T> {
        self.raster
    }

    /// The key bound to this raster
    #[must_use]
    pub fn key(&self) -> &(dyn ColorKey<T> + Send + Sync) {
        self.key.as_ref()
    }

    /// The colour representing an entry
    ///
    /// # Errors
    /// Fails if the key holds no colour for the entry.
    pub fn color_of(&self, entry: &T) -> Result<Color, KeyError> {
        self.key.color_of(entry)
    }

    /// The entry a colour represents
    ///
    /// # Errors
    /// Fails if the key holds no entry for the colour.
    pub fn entry_of(&self, color: Color) -> Result<T, KeyError> {
        self.key.entry_of(color)
    }

    /// The colour of the cell at (x, y from bottom); transparent when the
    /// cell holds no data
    ///
    /// # Errors
    /// Fails if the coordinates are out of bounds or the key cannot
    /// convert the entry.
    pub fn color_at_xy(&self, x: usize, y: usize) -> Result<Color, Error> {
        match self.raster.at_xy(x, y)? {
            None => Ok(Color::TRANSPARENT),
            Some(entry) => Ok(self.key.color_of(entry)?),
        }
    }

    /// The colour of the cell under a real-world coordinate
    ///
    /// Transparent both for no-data cells and for points outside the
    /// raster.
    ///
    /// # Errors
    /// Fails if the key cannot convert the entry.
    pub fn color_at(&self, x: f64, y: f64) -> Result<Color, KeyError> {
        match self.raster.value_at(x, y) {
            None => Ok(Color::TRANSPARENT),
            Some(entry) => self.key.color_of(entry),
        }
    }

    /// Sets the cell at (x, y from bottom) from a colour
    ///
    /// # Errors
    /// Fails if the key holds no entry for the colour or the coordinates
    /// are out of bounds.
    pub fn set_color_xy(&mut self, x: usize, y: usize, color: Color) -> Result<(), Error> {
        let entry = self.key.entry_of(color)?;
        self.raster.set_xy(x, y, Some(entry))?;
        Ok(())
    }

    /// Sets the cell under a real-world coordinate from a colour
    ///
    /// # Errors
    /// Fails if the key holds no entry for the colour, or the coordinate
    /// is outside the raster.
    pub fn set_color_at(&mut self, x: f64, y: f64, color: Color) -> Result<(), Error> {
        let entry = self.key.entry_of(color)?;
        self.raster.set_value_at(x, y, Some(entry))?;
        Ok(())
    }

    /// Renders the raster to an image, one cell per pixel
    ///
    /// # Errors
    /// Fails if the key cannot convert some entry.
    pub fn to_image(&self) -> Result<RgbaImage, Error> {
        self.to_image_zoomed(1)
    }

    /// Renders the raster to an image with each cell replicated
    /// `zoom` x `zoom`
    ///
    /// A zoom factor of zero is treated as one. No-data cells render fully
    /// transparent.
    ///
    /// # Errors
    /// Fails if the key cannot convert some entry.
    pub fn to_image_zoomed(&self, zoom: u32) -> Result<RgbaImage, Error> {
        let zoom = zoom.max(1);
        let (rows, cols) = (self.raster.rows(), self.raster.cols());
        trace!("rendering {rows}x{cols} raster at zoom {zoom}");
        let mut image = RgbaImage::new(cols as u32 * zoom, rows as u32 * zoom);
        for row in 0..rows {
            for col in 0..cols {
                let color = match self.raster.at_rc(row, col)? {
                    None => Color::TRANSPARENT,
                    Some(entry) => self.key.color_of(entry)?,
                };
                let pixel = image::Rgba::from(color);
                for dy in 0..zoom {
                    for dx in 0..zoom {
                        image.put_pixel(col as u32 * zoom + dx, row as u32 * zoom + dy, pixel);
                    }
                }
            }
        }
        Ok(image)
    }

    /// Builds a keyed raster by decoding every pixel of an image
    ///
    /// Fully transparent pixels become no-data cells. Pixel row 0 becomes
    /// raster row 0, so the image and the raster share their top-down
    /// orientation.
    ///
    /// # Errors
    /// Fails if the cell size is not strictly positive, or the key holds
    /// no entry for some pixel's colour.
    pub fn from_image(
        image: &RgbaImage,
        key: impl ColorKey<T> + Send + Sync + 'static,
        origin_x: f64,
        origin_y: f64,
        cell_size: f64,
    ) -> Result<Self, Error> {
        let raster = Raster::new(
            image.height() as usize,
            image.width() as usize,
            origin_x,
            origin_y,
            cell_size,
        )?;
        let mut keyed = Self::new(raster, key);
        for (x, y, pixel) in image.enumerate_pixels() {
            let color = Color::from(*pixel);
            if color.is_transparent() {
                keyed
                    .raster
                    .mark_no_data(x as usize, image.height() as usize - 1 - y as usize)?;
            } else {
                let entry = keyed.key.entry_of(color)?;
                keyed
                    .raster
                    .set_rc(y as usize, x as usize, Some(entry))?;
            }
        }
        Ok(keyed)
    }
}

impl<T: PartialEq> Raster<T> {
    /// Converts the raster into a [`KeyedRaster`] using the given key
    #[must_use]
    pub fn into_keyed(self, key: impl ColorKey<T> + Send + Sync + 'static) -> KeyedRaster<T> {
        KeyedRaster::new(self, key)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for KeyedRaster<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedRaster")
            .field("raster", &self.raster)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::KeyedRaster;
    use crate::color::Color;
    use crate::key::MappedKey;
    use crate::raster::Raster;

    const BLACK: Color = Color::rgb(0, 0, 0);
    const WHITE: Color = Color::rgb(255, 255, 255);

    fn checkerboard() -> KeyedRaster<String> {
        let mut raster = Raster::new(2, 2, 0.0, 0.0, 1.0).unwrap();
        raster.set_rc(0, 0, Some("a".to_owned())).unwrap();
        raster.set_rc(0, 1, Some("b".to_owned())).unwrap();
        raster.set_rc(1, 0, Some("b".to_owned())).unwrap();
        raster.set_rc(1, 1, Some("a".to_owned())).unwrap();
        let key =
            MappedKey::from_pairs([("a".to_owned(), BLACK), ("b".to_owned(), WHITE)]).unwrap();
        KeyedRaster::new(raster, key)
    }

    #[test]
    fn renders_cells_to_pixels() {
        let keyed = checkerboard();
        let image = keyed.to_image().unwrap();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(Color::from(*image.get_pixel(0, 0)), BLACK);
        assert_eq!(Color::from(*image.get_pixel(1, 0)), WHITE);
        assert_eq!(Color::from(*image.get_pixel(0, 1)), WHITE);
        assert_eq!(Color::from(*image.get_pixel(1, 1)), BLACK);
    }

    #[test]
    fn zoom_replicates_cells() {
        let keyed = checkerboard();
        let image = keyed.to_image_zoomed(3).unwrap();
        assert_eq!(image.dimensions(), (6, 6));
        for dy in 0..3 {
            for dx in 0..3 {
                assert_eq!(Color::from(*image.get_pixel(dx, dy)), BLACK);
                assert_eq!(Color::from(*image.get_pixel(3 + dx, dy)), WHITE);
            }
        }
    }

    #[test]
    fn no_data_renders_transparent() {
        let mut keyed = checkerboard();
        keyed.raster_mut().mark_no_data(0, 1).unwrap();
        let image = keyed.to_image().unwrap();
        assert!(Color::from(*image.get_pixel(0, 0)).is_transparent());
    }

    #[test]
    fn image_round_trips_through_the_key() {
        let keyed = checkerboard();
        let image = keyed.to_image().unwrap();
        let key =
            MappedKey::from_pairs([("a".to_owned(), BLACK), ("b".to_owned(), WHITE)]).unwrap();
        let back = KeyedRaster::from_image(&image, key, 0.0, 0.0, 1.0).unwrap();
        assert_eq!(
            back.raster().at_rc(0, 0).unwrap(),
            Some(&"a".to_owned())
        );
        assert_eq!(
            back.raster().at_rc(1, 0).unwrap(),
            Some(&"b".to_owned())
        );
    }

    #[test]
    fn cells_can_be_written_through_colours() {
        let mut keyed = checkerboard();
        keyed.set_color_xy(0, 0, BLACK).unwrap();
        assert_eq!(keyed.raster().at_xy(0, 0).unwrap(), Some(&"a".to_owned()));
        // half a cell in from the origin lands in the same cell
        keyed.set_color_at(0.5, 0.5, WHITE).unwrap();
        assert_eq!(keyed.raster().at_xy(0, 0).unwrap(), Some(&"b".to_owned()));
        // a colour outside the key is refused
        assert!(keyed.set_color_xy(0, 0, Color::rgb(9, 9, 9)).is_err());
    }

    #[test]
    fn colours_read_back_by_coordinate() {
        let keyed = checkerboard();
        // row 0 is the top row, so (0.5, 1.5) is cell (0, 0)
        assert_eq!(keyed.color_at(0.5, 1.5).unwrap(), BLACK);
        assert_eq!(keyed.color_at(0.5, 0.5).unwrap(), WHITE);
        assert!(keyed.color_at(-1.0, 0.5).unwrap().is_transparent());
    }
}
