//! Bounded rolling window of signal frames forming the waterfall.

use std::collections::VecDeque;
use std::rc::Rc;

use super::frame::SignalFrame;
use super::painter::{Painter, Rgb};

/// Per-tick recession step toward the viewer.
pub const AGE_STEP_Y: f32 = 0.05;
/// Per-tick recession step into depth.
pub const AGE_STEP_Z: f32 = 0.025;

/// Insertion-ordered collection of past frames, oldest first.
///
/// Every push ages the resident frames by one fixed spatial step and, once
/// the window is full, evicts the oldest frame. The history is the sole
/// owner of its frames: eviction is the only code path that can dispose
/// one, and the released buffers are pooled for reuse by future pushes so a
/// long-running session allocates nothing per tick.
pub struct SignalHistory {
    length: usize,
    capacity: usize,
    frames: VecDeque<SignalFrame>,
    painter: Rc<dyn Painter>,
    scale_x: f32,
    scale_y: f32,
    value_pool: Vec<Vec<f32>>,
    color_pool: Vec<Vec<Rgb>>,
    disposed: u64,
}

impl SignalHistory {
    /// Creates an empty history for frames of `length` points.
    ///
    /// # Panics
    /// Panics if `capacity` is zero; a waterfall that can hold no frames is
    /// a programming error.
    pub fn new(length: usize, capacity: usize, painter: Rc<dyn Painter>) -> Self {
        assert!(capacity > 0, "SignalHistory capacity must be at least 1");
        Self {
            length,
            capacity,
            frames: VecDeque::with_capacity(capacity),
            painter,
            scale_x: 1.0,
            scale_y: 1.0,
            value_pool: Vec::new(),
            color_pool: Vec::new(),
            disposed: 0,
        }
    }

    /// Appends one tick of raw samples as the newest frame.
    ///
    /// Order of operations: evict the oldest frame if the window is full
    /// (so the bound holds after every push, with no observable overshoot),
    /// age every resident frame by one recession step, then build and
    /// append the new frame. The new frame starts untranslated and carries
    /// the history's current shared scale.
    pub fn push(&mut self, data: &[u8]) {
        if self.frames.len() == self.capacity {
            if let Some(oldest) = self.frames.pop_front() {
                self.recycle(oldest);
            }
        }

        for frame in &mut self.frames {
            frame.translate(AGE_STEP_Y, -AGE_STEP_Z);
        }

        let values = self.value_pool.pop().unwrap_or_default();
        let colors = self.color_pool.pop().unwrap_or_default();
        let mut frame =
            SignalFrame::with_buffers(self.length, Rc::clone(&self.painter), values, colors);
        frame.set_scale(self.scale_x, self.scale_y);
        frame.display(data);
        self.frames.push_back(frame);
    }

    /// Updates the shared scale for all resident frames and future pushes,
    /// retroactively re-scaling the whole rolling window.
    pub fn set_scale(&mut self, x: f32, y: f32) {
        self.scale_x = x;
        self.scale_y = y;
        for frame in &mut self.frames {
            frame.set_scale(x, y);
        }
    }

    fn recycle(&mut self, frame: SignalFrame) {
        let (values, colors) = frame.dispose();
        self.value_pool.push(values);
        self.color_pool.push(colors);
        self.disposed += 1;
        tracing::trace!(disposed = self.disposed, "Evicted oldest waterfall frame");
    }

    /// Resident frames, oldest first.
    pub fn frames(&self) -> impl Iterator<Item = &SignalFrame> {
        self.frames.iter()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total frames disposed through eviction since construction.
    pub fn disposed_frames(&self) -> u64 {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viz::signal::painter::SpectralPainter;

    fn test_history(capacity: usize) -> SignalHistory {
        SignalHistory::new(4, capacity, Rc::new(SpectralPainter::new(1.0)))
    }

    /// First value of each resident frame, oldest first.
    fn leading_values(history: &SignalHistory) -> Vec<f32> {
        history.frames().map(|f| f.values()[0]).collect()
    }

    #[test]
    fn test_len_never_exceeds_capacity() {
        for capacity in 1..=8 {
            let mut history = test_history(capacity);
            for i in 0..32u8 {
                history.push(&[i, 0, 0, 0]);
                assert!(
                    history.len() <= capacity,
                    "len {} exceeded capacity {capacity}",
                    history.len()
                );
            }
            assert_eq!(history.len(), capacity);
        }
    }

    #[test]
    fn test_fifo_retains_most_recent_in_order() {
        let mut history = test_history(3);
        for i in 1..=5u8 {
            history.push(&[i * 16, 0, 0, 0]);
        }
        let expected: Vec<f32> = [3u8, 4, 5].iter().map(|&i| f32::from(i * 16) / 256.0).collect();
        assert_eq!(leading_values(&history), expected);
    }

    #[test]
    fn test_one_push_past_capacity_disposes_exactly_once() {
        let mut history = test_history(100);
        for i in 0..101u8 {
            history.push(&[i, i, i, i]);
        }
        assert_eq!(history.disposed_frames(), 1);
        assert_eq!(history.len(), 100);
        // Frames #2..=#101 remain, in original order
        let expected: Vec<f32> = (1..101u8).map(|i| f32::from(i) / 256.0).collect();
        assert_eq!(leading_values(&history), expected);
    }

    #[test]
    fn test_aging_offsets_grow_with_age() {
        let mut history = test_history(4);
        for i in 0..3u8 {
            history.push(&[i, 0, 0, 0]);
        }
        let offsets: Vec<(f32, f32)> = history
            .frames()
            .map(|f| (f.offset_y(), f.offset_z()))
            .collect();
        // Oldest frame has aged twice, newest not at all
        assert!((offsets[0].0 - 2.0 * AGE_STEP_Y).abs() < 1e-6);
        assert!((offsets[0].1 + 2.0 * AGE_STEP_Z).abs() < 1e-6);
        assert!((offsets[1].0 - AGE_STEP_Y).abs() < 1e-6);
        assert_eq!(offsets[2], (0.0, 0.0));
    }

    #[test]
    fn test_set_scale_propagates_retroactively() {
        let mut history = test_history(4);
        history.push(&[10, 20, 30, 40]);
        history.push(&[10, 20, 30, 40]);
        history.set_scale(0.5, 2.0);
        for frame in history.frames() {
            assert_eq!(frame.scale_x(), 0.5);
            assert_eq!(frame.draw_range(), 1); // round(4 * 0.5) - 1
        }
        // And future pushes pick the shared scale up as well
        history.push(&[10, 20, 30, 40]);
        assert!(history.frames().all(|f| f.scale_x() == 0.5));
    }

    #[test]
    fn test_eviction_recycles_buffers() {
        let mut history = test_history(2);
        for i in 0..10u8 {
            history.push(&[i, 0, 0, 0]);
        }
        assert_eq!(history.disposed_frames(), 8);
        // Pool holds at most one spare buffer pair: each eviction is
        // followed by a push that takes it back out.
        assert!(history.value_pool.len() <= 1);
    }

    #[test]
    #[should_panic(expected = "capacity must be at least 1")]
    fn test_zero_capacity_is_a_programming_error() {
        let _ = test_history(0);
    }
}
