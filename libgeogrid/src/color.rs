//! RGBA colour with the channel quantisation the keys depend on
//!
//! Scaled keys interpolate in floating point but colours are stored with
//! 8-bit channels, so every conversion here rounds to the nearest channel
//! step. Hue/saturation/brightness conversions use the classic hexcone
//! algorithm over those quantised channels.

/// An 8-bit RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl Color {
    /// Fully transparent black, used for cells with no data
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Creates an opaque colour from 8-bit channels
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Creates a colour from 8-bit channels including alpha
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque colour from floating point channels in `[0, 1]`
    ///
    /// Channels are clamped and rounded to the nearest 8-bit step.
    #[must_use]
    pub fn from_rgb_f32(r: f32, g: f32, b: f32) -> Self {
        Self::rgb(quantise(r), quantise(g), quantise(b))
    }

    /// Creates an opaque colour from hue, saturation and brightness
    ///
    /// Hue wraps around outside `[0, 1)`; saturation and brightness are
    /// clamped. This is the hexcone model, so greys (saturation 0) ignore
    /// the hue entirely.
    #[must_use]
    pub fn from_hsb(hue: f32, saturation: f32, brightness: f32) -> Self {
        let s = saturation.clamp(0.0, 1.0);
        let v = brightness.clamp(0.0, 1.0);
        if s == 0.0 {
            let level = quantise(v);
            return Self::rgb(level, level, level);
        }
        let h = (hue - hue.floor()) * 6.0;
        let f = h - h.floor();
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match h as u32 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Self::rgb(quantise(r), quantise(g), quantise(b))
    }

    /// Unpacks a colour from its 32-bit representation, `0xAARRGGBB`
    #[must_use]
    pub const fn from_packed(packed: i32) -> Self {
        let bits = packed as u32;
        Self {
            r: ((bits >> 16) & 0xff) as u8,
            g: ((bits >> 8) & 0xff) as u8,
            b: (bits & 0xff) as u8,
            a: ((bits >> 24) & 0xff) as u8,
        }
    }

    /// Packs the colour into 32 bits as `0xAARRGGBB`
    ///
    /// [`Self::from_packed`] is the exact inverse.
    #[must_use]
    pub const fn packed(self) -> i32 {
        (((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32)
            as i32
    }

    /// Red channel
    #[must_use]
    pub const fn red(self) -> u8 {
        self.r
    }

    /// Green channel
    #[must_use]
    pub const fn green(self) -> u8 {
        self.g
    }

    /// Blue channel
    #[must_use]
    pub const fn blue(self) -> u8 {
        self.b
    }

    /// Alpha channel, 0 meaning fully transparent
    #[must_use]
    pub const fn alpha(self) -> u8 {
        self.a
    }

    /// Whether the colour is fully transparent
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Red, green and blue as floating point values in `[0, 1]`
    #[must_use]
    pub fn rgb_components(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }

    /// Hue, saturation and brightness as floating point values in `[0, 1]`
    #[must_use]
    pub fn hsb_components(self) -> [f32; 3] {
        let (r, g, b) = (i32::from(self.r), i32::from(self.g), i32::from(self.b));
        let cmax = r.max(g).max(b);
        let cmin = r.min(g).min(b);
        let brightness = cmax as f32 / 255.0;
        let saturation = if cmax == 0 {
            0.0
        } else {
            (cmax - cmin) as f32 / cmax as f32
        };
        if saturation == 0.0 {
            return [0.0, saturation, brightness];
        }
        let span = (cmax - cmin) as f32;
        let redc = (cmax - r) as f32 / span;
        let greenc = (cmax - g) as f32 / span;
        let bluec = (cmax - b) as f32 / span;
        let sector = if r == cmax {
            bluec - greenc
        } else if g == cmax {
            2.0 + redc - bluec
        } else {
            4.0 + greenc - redc
        };
        let mut hue = sector / 6.0;
        if hue < 0.0 {
            hue += 1.0;
        }
        [hue, saturation, brightness]
    }
}

fn quantise(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

impl From<Color> for image::Rgba<u8> {
    fn from(c: Color) -> Self {
        Self([c.r, c.g, c.b, c.a])
    }
}

impl From<image::Rgba<u8>> for Color {
    fn from(p: image::Rgba<u8>) -> Self {
        Self::rgba(p.0[0], p.0[1], p.0[2], p.0[3])
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn packing_round_trips() {
        for c in [
            Color::rgb(0, 0, 0),
            Color::rgb(255, 255, 255),
            Color::rgba(1, 2, 3, 4),
            Color::rgba(200, 100, 50, 0),
        ] {
            assert_eq!(Color::from_packed(c.packed()), c);
        }
    }

    #[test]
    fn hsb_primaries() {
        assert_eq!(Color::from_hsb(0.0, 1.0, 1.0), Color::rgb(255, 0, 0));
        assert_eq!(
            Color::from_hsb(1.0 / 3.0, 1.0, 1.0),
            Color::rgb(0, 255, 0)
        );
        assert_eq!(
            Color::from_hsb(2.0 / 3.0, 1.0, 1.0),
            Color::rgb(0, 0, 255)
        );
        // hue wraps
        assert_eq!(Color::from_hsb(1.0, 1.0, 1.0), Color::rgb(255, 0, 0));
    }

    #[test]
    fn hsb_round_trips_on_saturated_hues() {
        for i in 0..=20 {
            let hue = i as f32 / 20.0;
            let c = Color::from_hsb(hue, 1.0, 1.0);
            let [h, s, b] = c.hsb_components();
            assert!((h - (hue - hue.floor())).abs() < 0.01, "hue {hue} -> {h}");
            assert!((s - 1.0).abs() < 0.01);
            assert!((b - 1.0).abs() < 0.01);
        }
    }

    #[test]
    fn greys_have_zero_saturation_and_hue() {
        let [h, s, b] = Color::rgb(128, 128, 128).hsb_components();
        assert_eq!(h, 0.0);
        assert_eq!(s, 0.0);
        assert!((b - 128.0 / 255.0).abs() < 1e-6);
    }
}
