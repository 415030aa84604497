//! Colour tokens and the sequential colour scale used to tell experiments apart.
//!
//! The default per-experiment colours are evenly spaced samples of the
//! ColorBrewer "Blues" scale, skipping its near-white low end so every
//! trace stays visible on the pale plot background.

use std::fmt;

/// Loading-indicator colour.
pub const LIGHT_BLUE: &str = "#77bee2";

/// Plot area background colour.
pub const PLOT_BACKGROUND_BLUE: &str = "#f1f8fd";

/// Lower end of the sampled range (fraction of the scale).
pub const SCALE_LOW: f32 = 0.33;

/// Upper end of the sampled range (fraction of the scale).
pub const SCALE_HIGH: f32 = 1.0;

/// ColorBrewer "Blues", light to dark.
const BLUES: [Rgb; 9] = [
    Rgb::new(247, 251, 255),
    Rgb::new(222, 235, 247),
    Rgb::new(198, 219, 239),
    Rgb::new(158, 202, 225),
    Rgb::new(107, 174, 214),
    Rgb::new(66, 146, 198),
    Rgb::new(33, 113, 181),
    Rgb::new(8, 81, 156),
    Rgb::new(8, 48, 107),
];

/// Opaque RGB colour with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
}

impl Rgb {
    /// Create a new colour.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear interpolation between two colours, rounded to nearest.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
        Self::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Colour at position `t` (0..=1) along the Blues scale.
#[must_use]
pub fn blues_at(t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let last = BLUES.len() - 1;
    let scaled = t * last as f32;
    let lo = (scaled.floor() as usize).min(last - 1);
    BLUES[lo].lerp(BLUES[lo + 1], scaled - lo as f32)
}

/// `num_colors` evenly spaced samples between [`SCALE_LOW`] and [`SCALE_HIGH`].
///
/// At least two colours are always produced so a single experiment still
/// gets the mid-scale shade rather than the pale end.
#[must_use]
pub fn experiment_colorscale(num_colors: usize) -> Vec<String> {
    let n = num_colors.max(2);
    let step = (SCALE_HIGH - SCALE_LOW) / (n - 1) as f32;
    (0..n)
        .map(|i| blues_at(SCALE_LOW + step * i as f32).to_string())
        .collect()
}
