//! Composites wiring live strips, history, and shared configuration.

use std::rc::Rc;

use super::frame::SignalFrame;
use super::history::SignalHistory;
use super::painter::{FixedPainter, Painter, Rgb, SpectralPainter};

/// Vertical rise of the threshold indicator per unit of cutoff.
pub const CUTOFF_RISE: f32 = 3.0;

/// Default shared horizontal scale.
const DEFAULT_SCALE_X: f32 = 1.0;
/// Default shared vertical scale.
const DEFAULT_SCALE_Y: f32 = 0.5;

/// The spectral view: a live frequency strip, its rolling history, and a
/// threshold indicator, all sharing one painter and one scale.
///
/// The composite owns the shared configuration. Cutoff changes flow through
/// the shared painter and apply at display time only; scale changes fan out
/// to the live strip and retroactively to every resident history frame.
pub struct SpectralView {
    painter: Rc<SpectralPainter>,
    line: SignalFrame,
    history: SignalHistory,
    scale_x: f32,
    scale_y: f32,
    marker_y: f32,
}

impl SpectralView {
    /// Builds the composite with `points` per strip and a history window of
    /// `depth` frames.
    pub fn new(points: usize, depth: usize, cutoff: f32) -> Self {
        let painter = Rc::new(SpectralPainter::new(cutoff));

        let shared: Rc<dyn Painter> = painter.clone();
        let mut line = SignalFrame::new(points, Rc::clone(&shared));
        line.set_scale(DEFAULT_SCALE_X, DEFAULT_SCALE_Y);

        let mut history = SignalHistory::new(points, depth, shared);
        history.set_scale(DEFAULT_SCALE_X, DEFAULT_SCALE_Y);

        Self {
            painter,
            line,
            history,
            scale_x: DEFAULT_SCALE_X,
            scale_y: DEFAULT_SCALE_Y,
            marker_y: cutoff * CUTOFF_RISE,
        }
    }

    /// Stores a new cutoff and repositions the threshold indicator.
    ///
    /// The shared painter picks the value up on the next `display` tick for
    /// the live strip and all future history rows; rows already painted are
    /// not recolored.
    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.painter.set_cutoff(cutoff);
        self.marker_y = cutoff * CUTOFF_RISE;
    }

    pub fn cutoff(&self) -> f32 {
        self.painter.cutoff()
    }

    /// Vertical position of the threshold indicator in scene units.
    pub fn marker_y(&self) -> f32 {
        self.marker_y
    }

    /// Propagates a horizontal scale change to the live strip and the whole
    /// rolling window.
    pub fn set_scale_x(&mut self, x: f32) {
        self.scale_x = x;
        self.line.set_scale(x, self.scale_y);
        self.history.set_scale(x, self.scale_y);
    }

    /// Propagates a vertical scale change to the live strip and the whole
    /// rolling window.
    pub fn set_scale_y(&mut self, y: f32) {
        self.scale_y = y;
        self.line.set_scale(self.scale_x, y);
        self.history.set_scale(self.scale_x, y);
    }

    pub fn scale_x(&self) -> f32 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f32 {
        self.scale_y
    }

    /// Consumes one sampling tick of frequency bytes: the live strip first,
    /// then the history push.
    pub fn display(&mut self, data: &[u8]) {
        self.line.display(data);
        self.history.push(data);
    }

    pub fn line(&self) -> &SignalFrame {
        &self.line
    }

    pub fn history(&self) -> &SignalHistory {
        &self.history
    }
}

/// The time-domain view: a single monochrome amplitude strip.
pub struct WaveView {
    line: SignalFrame,
}

impl WaveView {
    pub fn new(points: usize) -> Self {
        // 0xdddddd light grey
        let painter = Rc::new(FixedPainter::new(Rgb::new(0.867, 0.867, 0.867)));
        Self {
            line: SignalFrame::new(points, painter),
        }
    }

    pub fn display(&mut self, data: &[u8]) {
        self.line.display(data);
    }

    pub fn line(&self) -> &SignalFrame {
        &self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viz::signal::painter::Rgb;

    #[test]
    fn test_display_feeds_line_and_history() {
        let mut view = SpectralView::new(4, 8, 0.8);
        view.display(&[128, 128, 128, 128]);
        view.display(&[64, 64, 64, 64]);
        assert_eq!(view.line().values()[0], 0.25);
        assert_eq!(view.history().len(), 2);
    }

    #[test]
    fn test_cutoff_marker_tracks_cutoff() {
        let mut view = SpectralView::new(4, 8, 0.8);
        assert!((view.marker_y() - 2.4).abs() < 1e-6);
        view.set_cutoff(0.5);
        assert!((view.marker_y() - 1.5).abs() < 1e-6);
        assert_eq!(view.cutoff(), 0.5);
    }

    #[test]
    fn test_cutoff_change_is_display_time_only() {
        let mut view = SpectralView::new(4, 8, 0.9);
        // 200/256 = 0.78125, below the 0.9 cutoff: ramp color
        view.display(&[200, 0, 0, 0]);
        let before: Vec<Rgb> = view.history().frames().map(|f| f.colors()[0]).collect();
        assert_ne!(before[0], Rgb::RED);

        view.set_cutoff(0.5);
        // Historical row keeps its ramp color...
        let after: Vec<Rgb> = view.history().frames().map(|f| f.colors()[0]).collect();
        assert_eq!(before[0], after[0]);

        // ...while the next tick paints above-cutoff points in the alert color
        view.display(&[200, 0, 0, 0]);
        assert_eq!(view.line().colors()[0], Rgb::RED);
    }

    #[test]
    fn test_scale_fans_out_to_live_and_history() {
        let mut view = SpectralView::new(256, 8, 0.8);
        view.display(&[0; 256]);
        view.display(&[0; 256]);
        view.set_scale_x(0.5);
        assert_eq!(view.line().draw_range(), 127);
        for frame in view.history().frames() {
            assert_eq!(frame.draw_range(), 127);
        }
    }

    #[test]
    fn test_default_scales_match_startup() {
        let view = SpectralView::new(8, 4, 0.8);
        assert_eq!(view.scale_x(), 1.0);
        assert_eq!(view.scale_y(), 0.5);
        // scale_y 0.5 with the 2x vertical gain is unity stretch
        assert_eq!(view.line().stretch_y(), 1.0);
    }

    #[test]
    fn test_wave_view_is_monochrome() {
        let mut view = WaveView::new(4);
        view.display(&[0, 64, 128, 255]);
        let colors = view.line().colors();
        assert!(colors.iter().all(|&c| c == colors[0]));
    }
}
