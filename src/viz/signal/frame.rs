//! A single renderable strip of normalized sample points.

use std::rc::Rc;

use super::painter::{Painter, Rgb};

/// Vertical gain applied on top of the shared `scale_y`.
pub const VERTICAL_GAIN: f32 = 2.0;

/// Canonical normalization divisor for raw byte samples.
///
/// The prototypes this evolved from used /128, /255 and /256 in different
/// places; /256 is the one the surviving code path settled on. A full-scale
/// byte therefore normalizes to 255/256, never exactly 1.0.
const BYTE_DOMAIN: f32 = 256.0;

/// Maps a raw unsigned byte sample into the canonical `[0, 1)` float domain.
///
/// A missing sample (index out of range upstream) normalizes to `0.0`
/// rather than propagating as NaN.
pub fn normalize(raw: Option<u8>) -> f32 {
    match raw {
        Some(byte) => f32::from(byte) / BYTE_DOMAIN,
        None => 0.0,
    }
}

/// One rendered strip: a fixed-length run of normalized values with a
/// parallel per-point color buffer.
///
/// Point positions are implicit and evenly spaced: `x_i = i / length`.
/// Buffers are allocated once at construction and mutated in place by
/// [`SignalFrame::display`]; they are only released by [`SignalFrame::dispose`],
/// which consumes the frame so a double release cannot compile.
pub struct SignalFrame {
    length: usize,
    values: Vec<f32>,
    colors: Vec<Rgb>,
    painter: Rc<dyn Painter>,
    scale_x: f32,
    scale_y: f32,
    draw_range: usize,
    stretch_x: f32,
    stretch_y: f32,
    offset_y: f32,
    offset_z: f32,
}

impl SignalFrame {
    /// Creates a frame of `length` points, all initialized to zero.
    ///
    /// # Panics
    /// Panics if `length` is zero; that is a programming error, not a
    /// recoverable condition.
    pub fn new(length: usize, painter: Rc<dyn Painter>) -> Self {
        Self::with_buffers(length, painter, Vec::new(), Vec::new())
    }

    /// Creates a frame reusing previously released buffers, resizing and
    /// zeroing them as needed. Used by the history's eviction pool so that
    /// steady-state pushes do not allocate.
    pub fn with_buffers(
        length: usize,
        painter: Rc<dyn Painter>,
        mut values: Vec<f32>,
        mut colors: Vec<Rgb>,
    ) -> Self {
        assert!(length > 0, "SignalFrame length must be greater than zero");

        values.clear();
        values.resize(length, 0.0);
        colors.clear();
        colors.resize(length, Rgb::BLACK);

        let mut frame = Self {
            length,
            values,
            colors,
            painter,
            scale_x: 1.0,
            scale_y: 1.0,
            draw_range: length.saturating_sub(1),
            stretch_x: 1.0,
            stretch_y: VERTICAL_GAIN,
            offset_y: 0.0,
            offset_z: 0.0,
        };
        frame.resize();
        frame
    }

    /// Loads one tick of raw byte samples into the strip.
    ///
    /// Every point is normalized and painted through the shared painter.
    /// Short input pads with zeros, excess input is ignored.
    pub fn display(&mut self, data: &[u8]) {
        for i in 0..self.length {
            let normalized = normalize(data.get(i).copied());
            self.values[i] = normalized;
            self.colors[i] = self.painter.paint(normalized);
        }
    }

    /// Updates the horizontal/vertical scale and recomputes the draw range
    /// and the compensating visual transform.
    ///
    /// Shrinking `scale_x` truncates the visible tail of the strip while the
    /// horizontal stretch grows inversely, so the remaining points still
    /// span the full width (zoom by truncation, not by resampling).
    pub fn set_scale(&mut self, x: f32, y: f32) {
        self.scale_x = x;
        self.scale_y = y;
        self.resize();
    }

    fn resize(&mut self) {
        let zoomed = (self.length as f32 * self.scale_x).round() as usize;
        self.draw_range = zoomed.saturating_sub(1);
        self.stretch_x = if self.scale_x.abs() > f32::EPSILON {
            1.0 / self.scale_x
        } else {
            1.0
        };
        self.stretch_y = self.scale_y * VERTICAL_GAIN;
    }

    /// Accumulates one aging step along the two recession axes.
    pub fn translate(&mut self, dy: f32, dz: f32) {
        self.offset_y += dy;
        self.offset_z += dz;
    }

    /// Releases the frame's point and color buffers.
    ///
    /// Consumes the frame: ownership discipline (only the history that owns
    /// a frame may evict it) makes a second release unrepresentable.
    pub fn dispose(self) -> (Vec<f32>, Vec<Rgb>) {
        (self.values, self.colors)
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn scale_x(&self) -> f32 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f32 {
        self.scale_y
    }

    /// Index of the last visible point: only points `0..=draw_range` are
    /// rendered, implementing the zoom effect.
    pub fn draw_range(&self) -> usize {
        self.draw_range
    }

    pub fn stretch_x(&self) -> f32 {
        self.stretch_x
    }

    pub fn stretch_y(&self) -> f32 {
        self.stretch_y
    }

    pub fn offset_y(&self) -> f32 {
        self.offset_y
    }

    pub fn offset_z(&self) -> f32 {
        self.offset_z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viz::signal::painter::SpectralPainter;

    fn test_frame(length: usize) -> SignalFrame {
        SignalFrame::new(length, Rc::new(SpectralPainter::new(1.0)))
    }

    #[test]
    fn test_normalize_divisor_is_256() {
        // Pinned: /256, so a full-scale byte never reaches exactly 1.0.
        // (With the /255 divisor these would be 0.0, ~0.502, 1.0.)
        assert_eq!(normalize(Some(0)), 0.0);
        assert_eq!(normalize(Some(128)), 0.5);
        assert_eq!(normalize(Some(255)), 0.996_093_75);
        assert_eq!(normalize(None), 0.0);
    }

    #[test]
    fn test_display_normalizes_and_paints() {
        let mut frame = test_frame(3);
        frame.display(&[0, 128, 255]);
        assert_eq!(frame.values(), &[0.0, 0.5, 0.996_093_75]);
        assert_eq!(frame.colors().len(), 3);
    }

    #[test]
    fn test_display_pads_short_input_and_ignores_excess() {
        let mut frame = test_frame(4);
        frame.display(&[64, 64]);
        assert_eq!(frame.values(), &[0.25, 0.25, 0.0, 0.0]);

        frame.display(&[255, 255, 255, 255, 255, 255]);
        assert_eq!(frame.values().len(), 4);
        assert!(frame.values().iter().all(|&v| v == 0.996_093_75));
    }

    #[test]
    fn test_draw_range_halved() {
        let mut frame = test_frame(256);
        frame.set_scale(0.5, 1.0);
        assert_eq!(frame.draw_range(), 127);
        assert_eq!(frame.stretch_x(), 2.0);
    }

    #[test]
    fn test_set_scale_is_idempotent() {
        let mut frame = test_frame(256);
        frame.set_scale(0.3, 0.7);
        let once = (frame.draw_range(), frame.stretch_x(), frame.stretch_y());
        frame.set_scale(0.3, 0.7);
        let twice = (frame.draw_range(), frame.stretch_x(), frame.stretch_y());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_vertical_stretch_uses_gain() {
        let mut frame = test_frame(16);
        frame.set_scale(1.0, 0.5);
        assert_eq!(frame.stretch_y(), 1.0);
        frame.set_scale(1.0, 2.0);
        assert_eq!(frame.stretch_y(), 4.0);
    }

    #[test]
    fn test_translate_accumulates() {
        let mut frame = test_frame(8);
        frame.translate(0.05, -0.025);
        frame.translate(0.05, -0.025);
        assert!((frame.offset_y() - 0.1).abs() < 1e-6);
        assert!((frame.offset_z() + 0.05).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "length must be greater than zero")]
    fn test_zero_length_is_a_programming_error() {
        let _ = test_frame(0);
    }
}
