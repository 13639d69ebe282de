//! Theme-dependent styling.
//!
//! Both themes share one rendering path; only palette, clear color and
//! material parameters differ. Switching themes swaps the [`ThemeStyle`]
//! in place without rebuilding the field.

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Light or dark appearance, supplied by whoever hosts the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme `{other}` (expected light or dark)")),
        }
    }
}

const DARK_PALETTE: [u32; 8] = [
    0x222222, 0x444444, 0x666666, 0x888888, 0xaaaaaa, 0xcccccc, 0xeeeeee, 0xbbbbbb,
];

const LIGHT_PALETTE: [u32; 8] = [
    0xe0e7ef, 0xb6c6e3, 0x8fa3c8, 0x6b7fa8, 0x415485, 0x2f3d66, 0xc9d6ea, 0x9db0d3,
];

/// Palette and material parameters for one theme. Colors are sRGB.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeStyle {
    pub theme: Theme,
    pub clear_color: Vec3,
    /// Base colors, assigned to objects by `index % len`.
    pub palette: Vec<Vec3>,
    /// Hue objects are recolored to once they have joined.
    pub target_hue: f32,
    pub emissive_intensity: f32,
    pub metalness: f32,
    pub roughness: f32,
}

impl ThemeStyle {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                theme,
                clear_color: rgb(0x1a1a1a),
                palette: DARK_PALETTE.iter().copied().map(rgb).collect(),
                target_hue: 0.6,
                emissive_intensity: 0.06,
                metalness: 0.08,
                roughness: 0.85,
            },
            Theme::Light => Self {
                theme,
                clear_color: rgb(0xe0e7ef),
                palette: LIGHT_PALETTE.iter().copied().map(rgb).collect(),
                target_hue: 0.58,
                emissive_intensity: 0.18,
                metalness: 0.25,
                roughness: 0.35,
            },
        }
    }

    /// Base color for the object at `index`.
    pub fn base_color(&self, index: u32) -> Vec3 {
        if self.palette.is_empty() {
            return Vec3::ONE;
        }
        self.palette[index as usize % self.palette.len()]
    }

    /// Color of a joined object: the base color shifted to the target hue
    /// (plus `hue_offset`), keeping its saturation and lightness.
    pub fn joined_color(&self, index: u32, hue_offset: f32) -> Vec3 {
        let (_, s, l) = rgb_to_hsl(self.base_color(index));
        hsl_to_rgb((self.target_hue + hue_offset).rem_euclid(1.0), s, l)
    }
}

/// Color from a `0xRRGGBB` literal.
pub fn rgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// Convert RGB in [0, 1] to (hue, saturation, lightness), all in [0, 1].
pub fn rgb_to_hsl(c: Vec3) -> (f32, f32, f32) {
    let max = c.max_element();
    let min = c.min_element();
    let l = (max + min) / 2.0;

    if max == min {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l <= 0.5 { d / (max + min) } else { d / (2.0 - max - min) };
    let h = if max == c.x {
        (c.y - c.z) / d + if c.y < c.z { 6.0 } else { 0.0 }
    } else if max == c.y {
        (c.z - c.x) / d + 2.0
    } else {
        (c.x - c.y) / d + 4.0
    };

    (h / 6.0, s, l)
}

/// Convert (hue, saturation, lightness) to RGB.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    if s == 0.0 {
        return Vec3::splat(l);
    }

    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    let channel = |t: f32| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * 6.0 * (2.0 / 3.0 - t)
        } else {
            p
        }
    };

    Vec3::new(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
}

/// sRGB transfer function to linear light, per channel.
pub fn srgb_to_linear(c: Vec3) -> Vec3 {
    let f = |v: f32| {
        if v <= 0.04045 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    };
    Vec3::new(f(c.x), f(c.y), f(c.z))
}
