use crate::color::Color;
use crate::error::{KeyError, MappingError};
use crate::key::ColorKey;

/// A key holding an explicit one-to-one table between entries and colours
///
/// Legends are small, so the table is a plain list of pairs searched
/// linearly; this also leaves the entry type free of hashing and total
/// ordering requirements.
#[derive(Debug, Clone, Default)]
pub struct MappedKey<T> {
    pairs: Vec<(T, Color)>,
}

impl<T> MappedKey<T>
where
    T: PartialEq + Clone + std::fmt::Display,
{
    /// Creates an empty key
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Creates a key from (entry, colour) pairs
    ///
    /// # Errors
    /// Fails if the pairs do not form a one-to-one mapping.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (T, Color)>,
    ) -> Result<Self, MappingError> {
        let mut key = Self::new();
        for (entry, color) in pairs {
            key.insert(entry, color)?;
        }
        Ok(key)
    }

    /// Adds an (entry, colour) pair to the key
    ///
    /// Re-inserting a pair that is already present is a no-op.
    ///
    /// # Errors
    /// Fails with a [`MappingError`] if either side is already bound to a
    /// different partner.
    pub fn insert(&mut self, entry: T, color: Color) -> Result<(), MappingError> {
        for (bound_entry, bound_color) in &self.pairs {
            let entry_taken = *bound_entry == entry && *bound_color != color;
            let color_taken = *bound_color == color && *bound_entry != entry;
            if entry_taken || color_taken {
                return Err(MappingError {
                    color: color.to_string(),
                    entry: entry.to_string(),
                });
            }
            if *bound_entry == entry && *bound_color == color {
                return Ok(());
            }
        }
        self.pairs.push((entry, color));
        Ok(())
    }

    /// The (entry, colour) pairs in insertion order
    #[must_use]
    pub fn pairs(&self) -> &[(T, Color)] {
        &self.pairs
    }

    /// Number of pairs in the key
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the key holds no pairs
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<T> ColorKey<T> for MappedKey<T>
where
    T: PartialEq + Clone + std::fmt::Display,
{
    fn color_of(&self, entry: &T) -> Result<Color, KeyError> {
        self.pairs
            .iter()
            .find(|(bound, _)| bound == entry)
            .map(|(_, color)| *color)
            .ok_or_else(|| KeyError::UnknownEntry {
                entry: entry.to_string(),
                key: self.to_string(),
            })
    }

    fn entry_of(&self, color: Color) -> Result<T, KeyError> {
        self.pairs
            .iter()
            .find(|(_, bound)| *bound == color)
            .map(|(entry, _)| entry.clone())
            .ok_or_else(|| KeyError::UnknownColor {
                color: color.to_string(),
                key: self.to_string(),
            })
    }
}

impl<T: std::fmt::Display> std::fmt::Display for MappedKey<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MappedKey{{")?;
        for (i, (entry, color)) in self.pairs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{entry} <-> {color}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::MappedKey;
    use crate::color::Color;
    use crate::key::ColorKey;

    const BLACK: Color = Color::rgb(0, 0, 0);
    const WHITE: Color = Color::rgb(255, 255, 255);

    #[test]
    fn maps_both_ways() {
        let key =
            MappedKey::from_pairs([("soil", BLACK), ("water", WHITE)]).unwrap();
        assert_eq!(key.color_of(&"water").unwrap(), WHITE);
        assert_eq!(key.entry_of(BLACK).unwrap(), "soil");
        assert!(key.color_of(&"air").is_err());
        assert!(key.entry_of(Color::rgb(1, 2, 3)).is_err());
    }

    #[test]
    fn reinsertion_of_the_same_pair_is_allowed() {
        let mut key = MappedKey::new();
        key.insert("soil", BLACK).unwrap();
        key.insert("soil", BLACK).unwrap();
        assert_eq!(key.len(), 1);
    }

    #[test]
    fn one_to_one_violations_are_refused_both_ways() {
        let mut key = MappedKey::new();
        key.insert("soil", BLACK).unwrap();
        assert!(key.insert("soil", WHITE).is_err());
        assert!(key.insert("water", BLACK).is_err());
    }
}
