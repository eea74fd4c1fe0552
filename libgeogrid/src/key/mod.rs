//! Colour keys: bidirectional mappings between cell values and colours
//!
//! A key is fixed at construction and pure afterwards, so a raster can be
//! rendered from any number of threads once built. Conversion failures are
//! ordinary [`KeyError`] values; the error text states why the conversion
//! was refused.

mod integer;
mod mapped;
mod multi;
mod order;
mod scaled;

pub use integer::IntegerKey;
pub use mapped::MappedKey;
pub use multi::MultiScaleKey;
pub use order::RangeOrdering;
pub use scaled::{ColorSpace, Scale, ScaledKey, DEFAULT_TOLERANCE};

use crate::color::Color;
use crate::error::KeyError;

/// A bidirectional mapping between cell values and colours
pub trait ColorKey<T> {
    /// Returns the colour representing an entry
    ///
    /// # Errors
    /// Fails if the key holds no colour for the entry.
    fn color_of(&self, entry: &T) -> Result<Color, KeyError>;

    /// Returns the entry a colour represents
    ///
    /// # Errors
    /// Fails if the key holds no entry for the colour.
    fn entry_of(&self, color: Color) -> Result<T, KeyError>;
}

/// The closed family of cell value types a scaled key can carry
///
/// Scales work internally in `f64`; this trait supplies the conversion in
/// both directions. Reconstruction rounds to the nearest representable
/// value for the integer kinds and is exact for the floating kinds.
pub trait KeyNumber:
    Copy + PartialEq + PartialOrd + std::fmt::Display + Send + Sync + 'static
{
    /// The value as a double precision float
    fn to_f64(self) -> f64;

    /// The nearest representable value to a double precision float
    fn from_f64(value: f64) -> Self;
}

macro_rules! integer_key_number {
    ($($t:ty),*) => {$(
        impl KeyNumber for $t {
            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_f64(value: f64) -> Self {
                value.round_ties_even() as Self
            }
        }
    )*};
}

integer_key_number!(i8, i16, i32, i64);

impl KeyNumber for f32 {
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn from_f64(value: f64) -> Self {
        value as Self
    }
}

impl KeyNumber for f64 {
    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::KeyNumber;

    #[test]
    fn integer_reconstruction_rounds_to_nearest() {
        assert_eq!(i32::from_f64(3.4), 3);
        assert_eq!(i32::from_f64(3.6), 4);
        assert_eq!(i32::from_f64(-3.6), -4);
        assert_eq!(i8::from_f64(127.2), 127);
        assert_eq!(i64::from_f64(10.0), 10);
    }

    #[test]
    fn float_reconstruction_is_exact() {
        assert_eq!(f64::from_f64(3.25), 3.25);
        assert_eq!(f32::from_f64(0.5), 0.5);
    }
}
