use crate::color::Color;
use crate::error::KeyError;
use crate::key::ColorKey;

/// The trivial key: an integer entry and its packed colour are identical
///
/// No table is needed; the 32-bit signed entry is read as `0xAARRGGBB`
/// and back. Conversion in either direction cannot fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegerKey;

impl ColorKey<i32> for IntegerKey {
    fn color_of(&self, entry: &i32) -> Result<Color, KeyError> {
        Ok(Color::from_packed(*entry))
    }

    fn entry_of(&self, color: Color) -> Result<i32, KeyError> {
        Ok(color.packed())
    }
}

#[cfg(test)]
mod tests {
    use super::IntegerKey;
    use crate::color::Color;
    use crate::key::ColorKey;

    #[test]
    fn packing_is_the_identity() {
        let key = IntegerKey;
        for entry in [0, -1, 0x00ff_00ff, i32::MIN, i32::MAX] {
            let color = key.color_of(&entry).unwrap();
            assert_eq!(key.entry_of(color).unwrap(), entry);
        }
        assert_eq!(
            key.color_of(&Color::rgb(1, 2, 3).packed()).unwrap(),
            Color::rgb(1, 2, 3)
        );
    }
}
