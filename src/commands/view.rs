//! Live waterfall visualization.
//!
//! Runs the capture-analyse-render loop: samples the microphone on a fixed
//! tick, pushes one frequency strip per tick into the scrolling waterfall,
//! and handles interactive cutoff/zoom adjustments.

use std::time::{Duration, Instant};

use crate::config::SpecfallConfig;
use crate::ui::ErrorScreen;
use crate::viz::{Analyser, AudioCapture, SpectralView, VizCommand, VizTui, WaveView};

/// Period of the cutoff demo oscillator in milliseconds.
const CUTOFF_OSC_PERIOD_MS: f32 = 1000.0;
/// Period of the zoom demo oscillator in milliseconds.
const ZOOM_OSC_PERIOD_MS: f32 = 1314.0;
/// Floor for oscillated zoom, keeping at least a few points visible.
const MIN_OSC_SCALE_X: f32 = 0.05;

/// Runs the live waterfall visualization until the user quits.
///
/// # Arguments
/// * `device_override` - Device name/index overriding the configured one
/// * `no_oscillate` - Disable the demo oscillators regardless of config
pub async fn handle_view(device_override: Option<String>, no_oscillate: bool) -> anyhow::Result<()> {
    tracing::info!("=== specfall Waterfall Started ===");

    let config_data = match SpecfallConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            let error_message = format!(
                "Configuration Error:\n\n{err}\n\nPlease check your ~/.config/specfall/specfall.toml file and try again."
            );
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error(&error_message)?;
            error_screen.cleanup()?;
            return Err(anyhow::anyhow!("Configuration error: {err}"));
        }
    };

    let device = device_override.unwrap_or_else(|| config_data.audio.device.clone());
    let mut oscillate = config_data.view.oscillate && !no_oscillate;
    let points = config_data.view.points;

    tracing::info!(
        "Configuration loaded: device={}, points={}, depth={}, tick={}ms, cutoff={}",
        device,
        points,
        config_data.view.history_depth,
        config_data.view.tick_ms,
        config_data.view.cutoff
    );

    let mut capture = AudioCapture::new(device);
    if let Err(e) = capture.start() {
        tracing::error!("Failed to start capture: {}", e);
        let error_message = format!(
            "Audio Capture Error:\n\n{e}\n\nPlease check your audio configuration and try again."
        );
        let mut error_screen = ErrorScreen::new()?;
        error_screen.show_error(&error_message)?;
        error_screen.cleanup()?;
        return Err(e);
    }
    tracing::info!("Capturing at {}Hz", capture.sample_rate());

    let mut analyser = Analyser::new(points, config_data.view.smoothing);
    let mut wave = WaveView::new(points);
    let mut fft = SpectralView::new(points, config_data.view.history_depth, config_data.view.cutoff);

    let mut tui = VizTui::new().map_err(|e| anyhow::anyhow!("Failed to initialize UI: {e}"))?;

    let tick_interval = Duration::from_millis(config_data.view.tick_ms);
    let start = Instant::now();
    let mut last_tick = Instant::now();
    let mut time_bytes = vec![0u8; points];
    let mut freq_bytes = vec![0u8; points];

    tracing::debug!("Entering visualization loop. Press 'q' or 'Escape' to quit.");

    loop {
        match tui.handle_input() {
            Ok(VizCommand::Continue) => {}
            Ok(VizCommand::Quit) => break,
            Ok(VizCommand::TogglePause) => capture.toggle_pause(),
            Ok(VizCommand::ToggleOscillator) => {
                oscillate = !oscillate;
                tracing::debug!("Oscillators {}", if oscillate { "enabled" } else { "disabled" });
            }
            Ok(VizCommand::AdjustCutoff(delta)) => {
                fft.set_cutoff((fft.cutoff() + delta).clamp(0.0, 1.0));
            }
            Ok(VizCommand::AdjustScaleX(delta)) => {
                fft.set_scale_x((fft.scale_x() + delta).clamp(MIN_OSC_SCALE_X, 1.0));
            }
            Ok(VizCommand::AdjustScaleY(delta)) => {
                fft.set_scale_y((fft.scale_y() + delta).clamp(0.05, 2.0));
            }
            Err(e) => {
                tracing::error!("Input handling error: {}", e);
                tui.cleanup()?;
                return Err(anyhow::anyhow!("Input handling error: {e}"));
            }
        }

        if last_tick.elapsed() >= tick_interval {
            last_tick = Instant::now();

            if oscillate {
                let t = start.elapsed().as_millis() as f32;
                fft.set_cutoff((t / CUTOFF_OSC_PERIOD_MS).sin().abs());
                fft.set_scale_x((t / ZOOM_OSC_PERIOD_MS).sin().abs().max(MIN_OSC_SCALE_X));
            }

            if !capture.is_paused() {
                let samples = capture.latest(analyser.fft_size());
                analyser.byte_time_domain_data(&samples, &mut time_bytes);
                wave.display(&time_bytes);
                analyser.byte_frequency_data(&samples, &mut freq_bytes);
                fft.display(&freq_bytes);
            }
        }

        tui.render(&wave, &fft, capture.is_paused(), oscillate)
            .map_err(|e| anyhow::anyhow!("Render failed: {e}"))?;
    }

    tui.cleanup()?;
    tracing::info!(
        "Visualization stopped after {:.1}s ({} frames disposed)",
        start.elapsed().as_secs_f32(),
        fft.history().disposed_frames()
    );
    Ok(())
}
