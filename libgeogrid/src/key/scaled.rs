use crate::color::Color;
use crate::error::{KeyError, ScaleError};
use crate::key::{ColorKey, KeyNumber, RangeOrdering};
use bon::bon;
use std::marker::PhantomData;

/// Default tolerance for deciding whether a colour sits on the scale line
pub const DEFAULT_TOLERANCE: f64 = 16.0 * f64::EPSILON;

/// How entry values are placed along the scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    /// Values are used as they are
    #[default]
    Linear,
    /// Values are placed by their natural logarithm
    Log,
}

impl Scale {
    pub(crate) fn to_linear(self, value: f64) -> f64 {
        match self {
            Self::Linear => value,
            Self::Log => value.ln(),
        }
    }

    pub(crate) fn from_linear(self, value: f64) -> f64 {
        match self {
            Self::Linear => value,
            Self::Log => value.exp(),
        }
    }
}

/// The colour space the scale line runs through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
    /// Red, green, blue
    #[default]
    Rgb,
    /// Hue, saturation, brightness
    Hsb,
}

impl ColorSpace {
    pub(crate) fn components_of(self, color: Color) -> [f32; 3] {
        match self {
            Self::Rgb => color.rgb_components(),
            Self::Hsb => color.hsb_components(),
        }
    }

    pub(crate) fn color_of(self, components: [f32; 3]) -> Color {
        match self {
            Self::Rgb => Color::from_rgb_f32(components[0], components[1], components[2]),
            Self::Hsb => Color::from_hsb(components[0], components[1], components[2]),
        }
    }
}

/// A key mapping a single range of values onto a straight line through
/// colour space
///
/// The two endpoint colours anchor the line; intermediate values are
/// interpolated between them, either directly or on a logarithmic value
/// axis. Only the value axis is ever transformed, never the colour axis.
///
/// Converting a colour back to a value computes a candidate scale position
/// from every colour component that varies along the line. If the
/// candidates disagree by more than the tolerance, the colour is taken not
/// to be on the line and decoding fails; otherwise the component with the
/// largest span decides, as it carries the most accuracy.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledKey<T> {
    scale: Scale,
    space: ColorSpace,
    /// Linearised range, `min < max`
    min: f64,
    max: f64,
    min_c: [f32; 3],
    max_c: [f32; 3],
    tolerance: f64,
    _entry: PhantomData<T>,
}

#[bon]
impl<T: KeyNumber> ScaledKey<T> {
    /// Builds a scaled key from its endpoints
    ///
    /// # Errors
    /// Fails if an endpoint does not linearise to a finite number (for a
    /// log scale this covers zero and negative endpoints), if the maximum
    /// does not linearise strictly above the minimum, or if the two
    /// endpoint colours are equal.
    #[builder]
    pub fn new(
        min: T,
        max: T,
        min_color: Color,
        max_color: Color,
        #[builder(default)] scale: Scale,
        #[builder(default)] space: ColorSpace,
        #[builder(default = DEFAULT_TOLERANCE)] tolerance: f64,
    ) -> Result<Self, ScaleError> {
        let lin_min = scale.to_linear(min.to_f64());
        let lin_max = scale.to_linear(max.to_f64());
        if !lin_min.is_finite() {
            return Err(ScaleError::NonFinite {
                value: min.to_string(),
            });
        }
        if !lin_max.is_finite() {
            return Err(ScaleError::NonFinite {
                value: max.to_string(),
            });
        }
        if lin_max <= lin_min {
            return Err(ScaleError::EmptyRange {
                min: min.to_string(),
                max: max.to_string(),
                min_linear: lin_min,
                max_linear: lin_max,
            });
        }
        if min_color == max_color {
            return Err(ScaleError::EqualColors(min_color.to_string()));
        }
        Ok(Self {
            scale,
            space,
            min: lin_min,
            max: lin_max,
            min_c: space.components_of(min_color),
            max_c: space.components_of(max_color),
            tolerance,
            _entry: PhantomData,
        })
    }
}

impl<T: KeyNumber> ScaledKey<T> {
    /// Whether the entry lies within the range of this key, inclusive
    #[must_use]
    pub fn contains(&self, entry: T) -> bool {
        let lin = self.scale.to_linear(entry.to_f64());
        lin >= self.min && lin <= self.max
    }

    /// The minimum of the range, on the entry axis
    #[must_use]
    pub fn range_min(&self) -> f64 {
        self.scale.from_linear(self.min)
    }

    /// The maximum of the range, on the entry axis
    #[must_use]
    pub fn range_max(&self) -> f64 {
        self.scale.from_linear(self.max)
    }

    /// Compares the ranges of two keys
    ///
    /// Ranges that overlap without being identical are incomparable, and
    /// that includes ranges sharing only an endpoint.
    #[must_use]
    pub fn range_cmp(&self, other: &Self) -> RangeOrdering {
        if self.range_max() < other.range_min() {
            return RangeOrdering::Less;
        }
        if self.range_min() > other.range_max() {
            return RangeOrdering::More;
        }
        if self.range_min() == other.range_min() && self.range_max() == other.range_max() {
            return RangeOrdering::Equal;
        }
        RangeOrdering::Incomparable
    }
}

impl<T: KeyNumber> ColorKey<T> for ScaledKey<T> {
    fn color_of(&self, entry: &T) -> Result<Color, KeyError> {
        if !self.contains(*entry) {
            return Err(KeyError::OutOfRange {
                entry: entry.to_string(),
                key: self.to_string(),
            });
        }
        let lin = self.scale.to_linear(entry.to_f64());
        let t = (self.max - lin) / (self.max - self.min);
        let mut components = [0.0f32; 3];
        for (i, c) in components.iter_mut().enumerate() {
            let min_c = f64::from(self.min_c[i]);
            let max_c = f64::from(self.max_c[i]);
            *c = (t * (min_c - max_c) + max_c) as f32;
        }
        Ok(self.space.color_of(components))
    }

    fn entry_of(&self, color: Color) -> Result<T, KeyError> {
        let components = self.space.components_of(color);
        for i in 0..3 {
            let lo = self.min_c[i].min(self.max_c[i]);
            let hi = self.min_c[i].max(self.max_c[i]);
            if components[i] < lo || components[i] > hi {
                return Err(KeyError::ColorOutOfRange {
                    components,
                    min: self.min_c,
                    max: self.max_c,
                });
            }
        }
        let mut candidates: [Option<f64>; 3] = [None; 3];
        let mut best = 0.0f64;
        let mut widest_span = 0.0f64;
        for i in 0..3 {
            if self.min_c[i] == self.max_c[i] {
                continue;
            }
            let position = f64::from(components[i] - self.min_c[i])
                / f64::from(self.max_c[i] - self.min_c[i]);
            for earlier in candidates.iter().flatten() {
                if (position - earlier).abs() > self.tolerance {
                    return Err(KeyError::NotOnLine {
                        components,
                        min: self.min_c,
                        max: self.max_c,
                    });
                }
            }
            candidates[i] = Some(position);
            let span = f64::from((self.max_c[i] - self.min_c[i]).abs());
            if span > widest_span {
                widest_span = span;
                best = position;
            }
        }
        let lin = self.min + best * (self.max - self.min);
        Ok(T::from_f64(self.scale.from_linear(lin)))
    }
}

impl<T: KeyNumber> std::fmt::Display for ScaledKey<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ScaledKey<{}>[{}: {}, {}: {}]",
            std::any::type_name::<T>(),
            self.range_min(),
            self.space.color_of(self.min_c),
            self.range_max(),
            self.space.color_of(self.max_c),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorSpace, Scale, ScaledKey};
    use crate::color::Color;
    use crate::error::{KeyError, ScaleError};
    use crate::key::{ColorKey, RangeOrdering};

    const BLACK: Color = Color::rgb(0, 0, 0);
    const WHITE: Color = Color::rgb(255, 255, 255);
    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    fn grey_scale(min: i32, max: i32) -> ScaledKey<i32> {
        ScaledKey::builder()
            .min(min)
            .max(max)
            .min_color(BLACK)
            .max_color(WHITE)
            .tolerance(0.01)
            .build()
            .unwrap()
    }

    #[test]
    fn encode_hits_the_endpoints() {
        let key = grey_scale(0, 255);
        assert_eq!(key.color_of(&0).unwrap(), BLACK);
        assert_eq!(key.color_of(&255).unwrap(), WHITE);
        assert_eq!(key.color_of(&128).unwrap(), Color::rgb(128, 128, 128));
    }

    #[test]
    fn decode_inverts_encode_across_the_range() {
        let key = grey_scale(0, 255);
        for v in (0..=255).step_by(5) {
            let color = key.color_of(&v).unwrap();
            assert_eq!(key.entry_of(color).unwrap(), v);
        }
    }

    #[test]
    fn out_of_range_entries_are_refused_with_a_reason() {
        let key = grey_scale(0, 10);
        let err = key.color_of(&11).unwrap_err();
        assert!(matches!(err, KeyError::OutOfRange { .. }));
        assert!(err.to_string().contains("11"));
        assert!(key.color_of(&-1).is_err());
    }

    #[test]
    fn colors_off_the_line_are_refused() {
        let key = ScaledKey::<f64>::builder()
            .min(0.0)
            .max(1.0)
            .min_color(BLACK)
            .max_color(WHITE)
            .tolerance(0.01)
            .build()
            .unwrap();
        // equal components would be on the grey line; skew one channel
        let err = key.entry_of(Color::rgb(100, 200, 100)).unwrap_err();
        assert!(matches!(err, KeyError::NotOnLine { .. }));
    }

    #[test]
    fn colors_outside_the_band_are_refused() {
        let key = ScaledKey::<f64>::builder()
            .min(0.0)
            .max(1.0)
            .min_color(BLACK)
            .max_color(Color::rgb(128, 128, 128))
            .build()
            .unwrap();
        let err = key.entry_of(WHITE).unwrap_err();
        assert!(matches!(err, KeyError::ColorOutOfRange { .. }));
    }

    #[test]
    fn log_scales_linearise_the_value_axis_only() {
        let key = ScaledKey::<f64>::builder()
            .min(1.0)
            .max(100.0)
            .min_color(BLACK)
            .max_color(WHITE)
            .scale(Scale::Log)
            .tolerance(0.01)
            .build()
            .unwrap();
        // ten is the geometric midpoint, so it lands on the middle grey
        let mid = key.color_of(&10.0).unwrap();
        assert_eq!(mid, Color::rgb(128, 128, 128));
        let back = key.entry_of(mid).unwrap();
        assert!((back - 10.0).abs() / 10.0 < 0.05);
    }

    #[test]
    fn log_scales_refuse_non_positive_endpoints() {
        let err = ScaledKey::<f64>::builder()
            .min(0.0)
            .max(10.0)
            .min_color(BLACK)
            .max_color(WHITE)
            .scale(Scale::Log)
            .build()
            .unwrap_err();
        assert!(matches!(err, ScaleError::NonFinite { .. }));
    }

    #[test]
    fn degenerate_scales_are_refused() {
        let empty = ScaledKey::<i32>::builder()
            .min(5)
            .max(5)
            .min_color(BLACK)
            .max_color(WHITE)
            .build();
        assert!(matches!(empty, Err(ScaleError::EmptyRange { .. })));
        let flat = ScaledKey::<i32>::builder()
            .min(0)
            .max(1)
            .min_color(RED)
            .max_color(RED)
            .build();
        assert!(matches!(flat, Err(ScaleError::EqualColors(_))));
    }

    #[test]
    fn hsb_scales_run_through_hue_space() {
        let key = ScaledKey::<i32>::builder()
            .min(0)
            .max(100)
            .min_color(RED)
            .max_color(BLUE)
            .space(ColorSpace::Hsb)
            .tolerance(0.02)
            .build()
            .unwrap();
        assert_eq!(key.color_of(&0).unwrap(), RED);
        assert_eq!(key.color_of(&100).unwrap(), BLUE);
        // halfway through the hue sweep from red towards blue is green
        assert_eq!(key.color_of(&50).unwrap(), Color::rgb(0, 255, 0));
        for v in (0..=100).step_by(10) {
            let c = key.color_of(&v).unwrap();
            assert_eq!(key.entry_of(c).unwrap(), v);
        }
    }

    #[test]
    fn ranges_compare_by_partial_order() {
        let low = grey_scale(0, 10);
        let high = grey_scale(20, 30);
        assert_eq!(low.range_cmp(&high), RangeOrdering::Less);
        assert_eq!(high.range_cmp(&low), RangeOrdering::More);
        assert_eq!(low.range_cmp(&low.clone()), RangeOrdering::Equal);
        let overlapping = grey_scale(5, 15);
        assert_eq!(low.range_cmp(&overlapping), RangeOrdering::Incomparable);
        // sharing an endpoint is not a strict ordering either
        let touching = grey_scale(10, 20);
        assert_eq!(low.range_cmp(&touching), RangeOrdering::Incomparable);
    }
}
