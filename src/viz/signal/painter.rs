//! Color strategies mapping normalized sample values to RGB.
//!
//! Painters are injected into frames as shared strategy objects: the live
//! strip and every history row of one composite hold the same painter, so a
//! cutoff change is picked up by everything painted afterwards while rows
//! already painted keep their colors.

use std::cell::Cell;

/// An RGB color with each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Alert color used above the cutoff threshold.
    pub const RED: Rgb = Rgb {
        r: 1.0,
        g: 0.0,
        b: 0.0,
    };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Converts to 8-bit channels for terminal output.
    pub fn to_u8(self) -> (u8, u8, u8) {
        (
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
        )
    }

    /// Scales all channels toward black, used for depth fading.
    pub fn dimmed(self, factor: f32) -> Rgb {
        let f = factor.clamp(0.0, 1.0);
        Rgb::new(self.r * f, self.g * f, self.b * f)
    }
}

/// Strategy mapping a normalized value in `[0, 1]` to a color.
pub trait Painter {
    fn paint(&self, value: f32) -> Rgb;
}

/// Hue ramp with a hard threshold: louder points are brighter and shift
/// through the hue wheel (`hue = value`, fixed high saturation,
/// `lightness = value`), while values strictly above the cutoff return pure
/// red instead of the ramp. The cutoff is interior-mutable so that the
/// composite can retune it while frames keep a shared reference.
#[derive(Debug)]
pub struct SpectralPainter {
    cutoff: Cell<f32>,
    saturation: f32,
}

impl SpectralPainter {
    pub fn new(cutoff: f32) -> Self {
        Self {
            cutoff: Cell::new(cutoff),
            saturation: 0.9,
        }
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff.get()
    }

    /// Takes effect on the next paint call; already-painted points are
    /// not recolored.
    pub fn set_cutoff(&self, cutoff: f32) {
        self.cutoff.set(cutoff);
    }
}

impl Painter for SpectralPainter {
    fn paint(&self, value: f32) -> Rgb {
        // Strictly greater-than: a value exactly at the cutoff still ramps.
        if value > self.cutoff.get() {
            return Rgb::RED;
        }
        hsl_to_rgb(value, self.saturation, value)
    }
}

/// Paints every point in one fixed color (monochrome time-domain view).
#[derive(Debug, Clone, Copy)]
pub struct FixedPainter {
    color: Rgb,
}

impl FixedPainter {
    pub fn new(color: Rgb) -> Self {
        Self { color }
    }
}

impl Painter for FixedPainter {
    fn paint(&self, _value: f32) -> Rgb {
        self.color
    }
}

/// HSL to RGB conversion with hue wrapping.
///
/// Hue is a turn fraction in `[0, 1)`; out-of-range hues wrap. Output
/// channels stay within `[0, 1]` for any finite input.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Rgb {
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return Rgb::new(l, l, l);
    }

    let h = h.rem_euclid(1.0);
    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    Rgb::new(
        hue_channel(p, q, h + 1.0 / 3.0),
        hue_channel(p, q, h),
        hue_channel(p, q, h - 1.0 / 3.0),
    )
}

fn hue_channel(p: f32, q: f32, t: f32) -> f32 {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hue_ramp_channels_stay_in_range() {
        // Cutoff above the domain, so every value takes the ramp branch
        let painter = SpectralPainter::new(1.0);
        for i in 0..=1000 {
            let v = i as f32 / 1000.0;
            let c = painter.paint(v);
            assert!((0.0..=1.0).contains(&c.r), "r out of range at v={v}: {}", c.r);
            assert!((0.0..=1.0).contains(&c.g), "g out of range at v={v}: {}", c.g);
            assert!((0.0..=1.0).contains(&c.b), "b out of range at v={v}: {}", c.b);
        }
    }

    #[test]
    fn test_ramp_endpoints() {
        let painter = SpectralPainter::new(1.0);
        assert_eq!(painter.paint(0.0), Rgb::BLACK);
        // Lightness 1.0 saturates to white regardless of hue
        let c = painter.paint(1.0);
        assert_eq!(c, Rgb::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_cutoff_boundary() {
        let painter = SpectralPainter::new(0.8);
        assert_eq!(painter.paint(0.81), Rgb::RED);
        assert_ne!(painter.paint(0.79), Rgb::RED);
        // Exactly at the cutoff takes the ramp branch (strict greater-than)
        assert_ne!(painter.paint(0.8), Rgb::RED);
    }

    #[test]
    fn test_cutoff_retune_applies_to_next_paint() {
        let painter = SpectralPainter::new(0.8);
        assert_ne!(painter.paint(0.5), Rgb::RED);
        painter.set_cutoff(0.4);
        assert_eq!(painter.paint(0.5), Rgb::RED);
    }

    #[test]
    fn test_hue_wraps() {
        let a = hsl_to_rgb(0.25, 0.9, 0.5);
        let b = hsl_to_rgb(1.25, 0.9, 0.5);
        let c = hsl_to_rgb(-0.75, 0.9, 0.5);
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_to_u8_rounds() {
        assert_eq!(Rgb::RED.to_u8(), (255, 0, 0));
        assert_eq!(Rgb::new(0.5, 0.5, 0.5).to_u8(), (128, 128, 128));
    }
}
