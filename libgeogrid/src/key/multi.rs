use crate::color::Color;
use crate::error::{KeyError, OverlapError};
use crate::key::{ColorKey, KeyNumber, ScaledKey};
use itertools::Itertools;

/// Several scaled keys combined into one key
///
/// The scales are kept sorted by their range minimum and must not overlap;
/// an insertion that is not strictly ordered against both of its would-be
/// neighbours is refused and leaves the set unchanged. Encoding uses the
/// first scale whose range contains the value, which is unambiguous by
/// construction. Decoding still asks every scale and reports an ambiguity
/// if two of them disagree, since the scales are only known to be disjoint
/// on the value axis, not on the colour axis.
#[derive(Debug, Clone, Default)]
pub struct MultiScaleKey<T> {
    scales: Vec<ScaledKey<T>>,
}

impl<T: KeyNumber> MultiScaleKey<T> {
    /// Creates an empty key
    #[must_use]
    pub const fn new() -> Self {
        Self { scales: Vec::new() }
    }

    /// Creates a key from a collection of scales
    ///
    /// # Errors
    /// Fails if any two of the scales overlap.
    pub fn from_scales(
        scales: impl IntoIterator<Item = ScaledKey<T>>,
    ) -> Result<Self, OverlapError> {
        let mut key = Self::new();
        for scale in scales {
            key.add_scale(scale)?;
        }
        Ok(key)
    }

    /// Adds a scale, keeping the set sorted and non-overlapping
    ///
    /// # Errors
    /// Fails with an [`OverlapError`] if the scale's range is not strictly
    /// below or above each of its neighbours' ranges; sharing an endpoint
    /// counts as an overlap, and so does inserting a duplicate. On failure
    /// the set is left unchanged.
    pub fn add_scale(&mut self, scale: ScaledKey<T>) -> Result<(), OverlapError> {
        let pos = self
            .scales
            .iter()
            .position(|s| scale.range_min() < s.range_min())
            .unwrap_or(self.scales.len());
        if pos > 0 {
            let before = &self.scales[pos - 1];
            if !scale.range_cmp(before).is_more() {
                return Err(OverlapError {
                    scale: scale.to_string(),
                    neighbour: before.to_string(),
                });
            }
        }
        if let Some(after) = self.scales.get(pos) {
            if !scale.range_cmp(after).is_less() {
                return Err(OverlapError {
                    scale: scale.to_string(),
                    neighbour: after.to_string(),
                });
            }
        }
        self.scales.insert(pos, scale);
        debug_assert!(self
            .scales
            .iter()
            .tuple_windows()
            .all(|(a, b)| a.range_cmp(b).is_less()));
        Ok(())
    }

    /// The scales, sorted by range minimum
    #[must_use]
    pub fn scales(&self) -> &[ScaledKey<T>] {
        &self.scales
    }

    /// Number of scales in the key
    #[must_use]
    pub fn len(&self) -> usize {
        self.scales.len()
    }

    /// Whether the key holds no scales
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }
}

impl<T: KeyNumber> ColorKey<T> for MultiScaleKey<T> {
    fn color_of(&self, entry: &T) -> Result<Color, KeyError> {
        self.scales
            .iter()
            .find(|scale| scale.contains(*entry))
            .ok_or_else(|| KeyError::OutOfRange {
                entry: entry.to_string(),
                key: self.to_string(),
            })?
            .color_of(entry)
    }

    fn entry_of(&self, color: Color) -> Result<T, KeyError> {
        let mut found: Option<(T, &ScaledKey<T>)> = None;
        for scale in &self.scales {
            let Ok(entry) = scale.entry_of(color) else {
                continue;
            };
            if let Some((first, first_scale)) = &found {
                if *first != entry {
                    return Err(KeyError::Ambiguous {
                        color: color.to_string(),
                        first: first.to_string(),
                        first_key: first_scale.to_string(),
                        second: entry.to_string(),
                        second_key: scale.to_string(),
                    });
                }
            } else {
                found = Some((entry, scale));
            }
        }
        found.map(|(entry, _)| entry).ok_or_else(|| {
            KeyError::UnknownColor {
                color: color.to_string(),
                key: self.to_string(),
            }
        })
    }
}

impl<T: KeyNumber> std::fmt::Display for MultiScaleKey<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MultiScaleKey[{}]", self.scales.iter().join(", "))
    }
}
