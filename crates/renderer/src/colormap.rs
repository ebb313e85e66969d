//! Value to color mapping.
//!
//! Values are mapped linearly onto a fixed viridis ramp between the minimum
//! and maximum of the values being drawn. The scale is recomputed for every
//! image, so the same color in two images does not mean the same value.

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const WHITE: Color = Color::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

/// Viridis sampled at nine evenly spaced points.
const VIRIDIS: [Color; 9] = [
    Color::new(68, 1, 84, 255),
    Color::new(71, 44, 122, 255),
    Color::new(59, 81, 139, 255),
    Color::new(44, 113, 142, 255),
    Color::new(33, 144, 141, 255),
    Color::new(39, 173, 129, 255),
    Color::new(92, 200, 99, 255),
    Color::new(170, 220, 50, 255),
    Color::new(253, 231, 37, 255),
];

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    Color::new(
        ((color1.r as f32 * t_inv) + (color2.r as f32 * t)) as u8,
        ((color1.g as f32 * t_inv) + (color2.g as f32 * t)) as u8,
        ((color1.b as f32 * t_inv) + (color2.b as f32 * t)) as u8,
        ((color1.a as f32 * t_inv) + (color2.a as f32 * t)) as u8,
    )
}

/// Ramp color at `t` in `[0, 1]` (clamped).
pub fn ramp(t: f64) -> Color {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let segments = (VIRIDIS.len() - 1) as f64;
    let pos = t * segments;
    let idx = (pos.floor() as usize).min(VIRIDIS.len() - 2);
    interpolate_color(VIRIDIS[idx], VIRIDIS[idx + 1], (pos - idx as f64) as f32)
}

/// Linear mapping from a value range onto the ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    min: f64,
    max: f64,
}

impl ColorScale {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Scale spanning a `(min, max)` pair such as `FootprintSet::value_range`.
    pub fn from_range((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn mid(&self) -> f64 {
        self.min + (self.max - self.min) / 2.0
    }

    /// Position of `value` on the ramp; `None` for non-finite values.
    ///
    /// A degenerate range (`max <= min`) puts every value in the middle.
    pub fn normalize(&self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        if self.max <= self.min {
            return Some(0.5);
        }
        Some(((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0))
    }

    pub fn color(&self, value: f64) -> Option<Color> {
        self.normalize(value).map(ramp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_color_endpoints() {
        let a = Color::new(0, 0, 0, 255);
        let b = Color::new(200, 100, 50, 255);
        assert_eq!(interpolate_color(a, b, 0.0), a);
        assert_eq!(interpolate_color(a, b, 1.0), b);
        assert_eq!(interpolate_color(a, b, 2.0), b);
        assert_eq!(interpolate_color(a, b, 0.5), Color::new(100, 50, 25, 255));
    }

    #[test]
    fn test_ramp_ends() {
        assert_eq!(ramp(0.0), VIRIDIS[0]);
        assert_eq!(ramp(1.0), VIRIDIS[8]);
        assert_eq!(ramp(-3.0), VIRIDIS[0]);
        assert_eq!(ramp(0.5), VIRIDIS[4]);
    }

    #[test]
    fn test_degenerate_range_maps_to_middle() {
        let scale = ColorScale::from_range((2.0, 2.0));
        assert_eq!(scale.normalize(2.0), Some(0.5));
        assert_eq!(scale.normalize(f64::NAN), None);
        assert_eq!(ColorScale::from_range((0.0, 4.0)).normalize(1.0), Some(0.25));
    }
}
