//! Live audio visualization: capture, analysis, signal pipeline, and TUI.

pub mod analyser;
pub mod audio;
pub mod signal;
pub mod ui;

pub use analyser::Analyser;
pub use audio::AudioCapture;
pub use signal::{SpectralView, WaveView};
pub use ui::{VizCommand, VizTui};
