//! Frequency-to-color mapping.
//!
//! Traversal counts are normalized to `[0, 1]` and mapped to a color by
//! piecewise linear interpolation across a named gradient scheme. The
//! scheme catalog is a process-wide constant table; there is nothing to
//! configure or mutate at runtime.

use serde::{Deserialize, Serialize};

/// An RGB color, rendered as `#rrggbb` hex for display layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Create a color from RGB components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Format as a lowercase `#rrggbb` hex string.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse a `#rrggbb` (or `rrggbb`) hex string.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 {
            return None;
        }
        let value = u32::from_str_radix(digits, 16).ok()?;
        Some(Self::new(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        ))
    }
}

/// A gradient stop: normalized position in `[0, 1]` and its color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub stop: f64,
    pub color: Color,
}

const fn stop(at: f64, r: u8, g: u8, b: u8) -> ColorStop {
    ColorStop {
        stop: at,
        color: Color::new(r, g, b),
    }
}

// The constant scheme catalog. Stops are ordered and span [0, 1].
const WARM: [ColorStop; 3] = [
    stop(0.0, 0xff, 0xff, 0xff),
    stop(0.5, 0xff, 0xb8, 0x6b),
    stop(1.0, 0xff, 0x4c, 0x02),
];
const COOL: [ColorStop; 3] = [
    stop(0.0, 0xff, 0xff, 0xff),
    stop(0.5, 0x9b, 0xe7, 0xff),
    stop(1.0, 0x00, 0x77, 0xff),
];
const FIRE: [ColorStop; 3] = [
    stop(0.0, 0xff, 0xff, 0xe0),
    stop(0.5, 0xff, 0xbf, 0x40),
    stop(1.0, 0xff, 0x00, 0x00),
];
const BLUE: [ColorStop; 3] = [
    stop(0.0, 0xf0, 0xf8, 0xff),
    stop(0.5, 0xa0, 0xc4, 0xff),
    stop(1.0, 0x00, 0x47, 0xab),
];
const MONO: [ColorStop; 2] = [stop(0.0, 0xf7, 0xf7, 0xf7), stop(1.0, 0x33, 0x33, 0x33)];

/// Named gradient schemes for heatmap rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum ColorScheme {
    Warm,
    Cool,
    Fire,
    Blue,
    Mono,
}

impl ColorScheme {
    /// All schemes, in catalog order. Display layers iterate this to
    /// offer a scheme picker.
    pub fn all() -> &'static [ColorScheme] {
        &[
            ColorScheme::Warm,
            ColorScheme::Cool,
            ColorScheme::Fire,
            ColorScheme::Blue,
            ColorScheme::Mono,
        ]
    }

    /// The scheme's catalog name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Warm => "warm",
            ColorScheme::Cool => "cool",
            ColorScheme::Fire => "fire",
            ColorScheme::Blue => "blue",
            ColorScheme::Mono => "mono",
        }
    }

    /// Look up a scheme by name; unknown names fall back to `Warm`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "cool" => ColorScheme::Cool,
            "fire" => ColorScheme::Fire,
            "blue" => ColorScheme::Blue,
            "mono" => ColorScheme::Mono,
            _ => ColorScheme::Warm,
        }
    }

    /// The scheme's ordered gradient stops.
    pub fn stops(&self) -> &'static [ColorStop] {
        match self {
            ColorScheme::Warm => &WARM,
            ColorScheme::Cool => &COOL,
            ColorScheme::Fire => &FIRE,
            ColorScheme::Blue => &BLUE,
            ColorScheme::Mono => &MONO,
        }
    }
}

/// Linearly scale a traversal count into `[0, 1]` over `[min, max]`.
///
/// When every segment is traversed equally (`min == max`) there is no
/// gradient to spread over, so the result is fully saturated `1.0`.
///
/// # Example
///
/// ```rust
/// use trace_heatmap::color::normalize_count;
///
/// assert_eq!(normalize_count(1, 1, 5), 0.0);
/// assert_eq!(normalize_count(5, 1, 5), 1.0);
/// assert_eq!(normalize_count(3, 3, 3), 1.0);
/// ```
pub fn normalize_count(count: u32, min: u32, max: u32) -> f64 {
    if max == min {
        return 1.0;
    }
    (count as f64 - min as f64) / (max as f64 - min as f64)
}

/// Map a normalized value to a color by piecewise linear interpolation
/// over the scheme's stops.
///
/// Values at or below the first stop clamp to the first color; values at
/// or above the last stop clamp to the last color.
///
/// # Example
///
/// ```rust
/// use trace_heatmap::color::{color_for, ColorScheme};
///
/// let hottest = color_for(1.0, ColorScheme::Warm);
/// assert_eq!(hottest.to_hex(), "#ff4c02");
/// ```
pub fn color_for(t: f64, scheme: ColorScheme) -> Color {
    let stops = scheme.stops();

    if t <= stops[0].stop {
        return stops[0].color;
    }

    for pair in stops.windows(2) {
        let (lo, hi) = (&pair[0], &pair[1]);
        if t >= lo.stop && t <= hi.stop {
            let span = hi.stop - lo.stop;
            let frac = if span > 0.0 { (t - lo.stop) / span } else { 1.0 };
            return lerp(lo.color, hi.color, frac);
        }
    }

    stops[stops.len() - 1].color
}

fn lerp(from: Color, to: Color, frac: f64) -> Color {
    let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    Color::new(
        channel(from.r, to.r),
        channel(from.g, to.g),
        channel(from.b, to.b),
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_bounds() {
        for count in 1..=5 {
            let t = normalize_count(count, 1, 5);
            assert!((0.0..=1.0).contains(&t));
        }
        assert_eq!(normalize_count(1, 1, 5), 0.0);
        assert_eq!(normalize_count(5, 1, 5), 1.0);
    }

    #[test]
    fn test_normalize_equal_range_saturates() {
        assert_eq!(normalize_count(3, 3, 3), 1.0);
        assert_eq!(normalize_count(0, 7, 7), 1.0);
    }

    #[test]
    fn test_color_clamps_at_extremes() {
        assert_eq!(color_for(-0.5, ColorScheme::Warm).to_hex(), "#ffffff");
        assert_eq!(color_for(0.0, ColorScheme::Warm).to_hex(), "#ffffff");
        assert_eq!(color_for(1.0, ColorScheme::Warm).to_hex(), "#ff4c02");
        assert_eq!(color_for(1.5, ColorScheme::Warm).to_hex(), "#ff4c02");
    }

    #[test]
    fn test_color_hits_middle_stop_exactly() {
        assert_eq!(color_for(0.5, ColorScheme::Warm).to_hex(), "#ffb86b");
        assert_eq!(color_for(0.5, ColorScheme::Fire).to_hex(), "#ffbf40");
    }

    #[test]
    fn test_color_interpolates_between_stops() {
        // Halfway between white and #ffb86b
        let c = color_for(0.25, ColorScheme::Warm);
        assert_eq!(c, Color::new(255, 220, 181));
    }

    #[test]
    fn test_mono_two_stop_gradient() {
        let mid = color_for(0.5, ColorScheme::Mono);
        // Halfway between #f7f7f7 and #333333
        assert_eq!(mid, Color::new(149, 149, 149));
    }

    #[test]
    fn test_hex_round_trip() {
        for scheme in ColorScheme::all() {
            for s in scheme.stops() {
                let hex = s.color.to_hex();
                assert_eq!(Color::from_hex(&hex), Some(s.color));
            }
        }
    }

    #[test]
    fn test_from_hex_rejects_malformed() {
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("not-a-color"), None);
        assert_eq!(Color::from_hex("#ggxxyy"), None);
    }

    #[test]
    fn test_scheme_name_round_trip() {
        for scheme in ColorScheme::all() {
            assert_eq!(ColorScheme::from_name(scheme.as_str()), *scheme);
        }
        // Unknown names fall back to the default scheme
        assert_eq!(ColorScheme::from_name("neon"), ColorScheme::Warm);
    }

    #[test]
    fn test_catalog_has_five_schemes() {
        assert_eq!(ColorScheme::all().len(), 5);
    }
}
