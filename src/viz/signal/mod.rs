//! Signal rendering pipeline: frames, history, painters, and composites.
//!
//! A `SignalFrame` is one renderable strip of points for a single sampling
//! tick. A `SignalHistory` is the bounded rolling window of past frames that
//! forms the waterfall. Composites wire the live strip, the history, and the
//! shared cutoff/scale configuration together.

pub mod composite;
pub mod frame;
pub mod history;
pub mod painter;

pub use composite::{SpectralView, WaveView};
pub use frame::SignalFrame;
pub use history::SignalHistory;
pub use painter::{FixedPainter, Painter, Rgb, SpectralPainter};
