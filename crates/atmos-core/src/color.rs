//! Colour mapping from spectral content and heatmap level.

use crate::snapshot::FrequencyBands;
use bytemuck::{Pod, Zeroable};

/// Linear RGBA, components in `[0, 1]`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Hue wraps; saturation and value are clamped.
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let h = hue.rem_euclid(1.0) * 6.0;
        let s = saturation.clamp(0.0, 1.0);
        let v = value.clamp(0.0, 1.0);
        let sector = h.floor();
        let f = h - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match sector as u32 % 6 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Self::rgb(r, g, b)
    }

    fn scaled(self, k: f32) -> Self {
        Self::rgb(
            (self.r * k).clamp(0.0, 1.0),
            (self.g * k).clamp(0.0, 1.0),
            (self.b * k).clamp(0.0, 1.0),
        )
    }
}

pub const WHITE: Rgba = Rgba::rgb(1.0, 1.0, 1.0);
pub const WHITESMOKE: Rgba = Rgba::rgb(0.961, 0.961, 0.961);
pub const DARK_SLATE_GREY: Rgba = Rgba::rgb(0.184, 0.31, 0.31);
pub const AXIS_X: Rgba = Rgba::rgb(1.0, 0.0, 0.0);
pub const AXIS_Y: Rgba = Rgba::rgb(0.0, 0.5, 0.0);
pub const AXIS_Z: Rgba = Rgba::rgb(0.0, 0.0, 1.0);

pub const LOW_BASE: Rgba = Rgba::rgb(0.0, 0.2, 1.0);
pub const MID_BASE: Rgba = Rgba::rgb(0.25, 1.0, 0.0);
pub const HIGH_BASE: Rgba = Rgba::rgb(1.0, 0.0, 0.0);
pub const LFE_COLOUR: Rgba = Rgba::rgb(1.0, 0.647, 0.0);

/// Relative influence of each band on the speaker colour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandWeights {
    pub low: f32,
    pub mid: f32,
    pub high: f32,
}

impl Default for BandWeights {
    fn default() -> Self {
        Self {
            low: 1.0,
            mid: 1.0,
            high: 1.0,
        }
    }
}

impl BandWeights {
    /// Negative or non-finite weights become zero; all-zero becomes unity.
    pub fn new(low: f32, mid: f32, high: f32) -> Self {
        let sanitise = |w: f32| if w.is_finite() { w.max(0.0) } else { 0.0 };
        let weights = Self {
            low: sanitise(low),
            mid: sanitise(mid),
            high: sanitise(high),
        };
        if weights.sum() <= f32::EPSILON {
            Self::default()
        } else {
            weights
        }
    }

    #[inline]
    pub fn sum(&self) -> f32 {
        self.low + self.mid + self.high
    }
}

/// Per-speaker display colour. Shares of weighted band energy blend the
/// three base colours; overall energy drives brightness.
pub fn colour_for_bands(bands: &FrequencyBands, weights: &BandWeights, is_lfe: bool) -> Rgba {
    if is_lfe {
        return LFE_COLOUR;
    }
    let low = bands.low.max(0.0) * weights.low;
    let mid = bands.mid.max(0.0) * weights.mid;
    let high = bands.high.max(0.0) * weights.high;
    let weighted = low + mid + high + 1.0e-4;
    let (sl, sm, sh) = (low / weighted, mid / weighted, high / weighted);
    let mixed = Rgba::rgb(
        LOW_BASE.r * sl + MID_BASE.r * sm + HIGH_BASE.r * sh,
        LOW_BASE.g * sl + MID_BASE.g * sm + HIGH_BASE.g * sh,
        LOW_BASE.b * sl + MID_BASE.b * sm + HIGH_BASE.b * sh,
    );
    let total = bands.total().max(0.0);
    mixed.scaled(0.45 + 0.55 * total / (total + 1.0))
}

/// Heatmap ramp: cold blue at 0, hot red at 1.
pub fn colour_for_level(level: f32) -> Rgba {
    let r = level.clamp(0.0, 1.0);
    let hue = 0.62 + (0.02 - 0.62) * r;
    let saturation = (0.45 + r * 0.5).clamp(0.4, 0.95);
    let brightness = (0.4 + r * 0.6).clamp(0.35, 1.0);
    Rgba::from_hsv(hue, saturation, brightness)
}
