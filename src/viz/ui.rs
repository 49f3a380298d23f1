//! Terminal user interface for the live waterfall visualization.
//!
//! Renders three stacked panes: the time-domain wave strip, the scrolling
//! spectral waterfall, and the live spectrum with its cutoff marker, plus a
//! one-line status footer.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    style::{Color, Style},
    widgets::Sparkline,
};
use std::io::{stdout, Stdout};

use super::signal::history::AGE_STEP_Y;
use super::signal::{SpectralView, WaveView};

/// Scene-level vertical gain applied on top of per-frame stretch.
const SCENE_GAIN_Y: f32 = 4.0;
/// World-space height mapped onto the full spectrum pane.
const WORLD_SPAN_Y: f32 = 4.0;

/// Intensity ramp for waterfall cells, from silence to full scale.
const INTENSITY_GLYPHS: [&str; 9] = [" ", "▁", "▂", "▃", "▄", "▅", "▆", "▇", "█"];

/// User input command during visualization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VizCommand {
    /// Keep running (no key pressed)
    Continue,
    /// Exit the visualization (Escape, 'q' or Ctrl+C)
    Quit,
    /// Pause/resume sampling (Space key)
    TogglePause,
    /// Enable/disable the demo oscillators ('o' key)
    ToggleOscillator,
    /// Nudge the red cutoff threshold (Up/Down)
    AdjustCutoff(f32),
    /// Nudge the horizontal zoom (Left/Right)
    AdjustScaleX(f32),
    /// Nudge the vertical scale ('+'/'-')
    AdjustScaleY(f32),
}

/// Terminal UI for the waterfall visualization.
pub struct VizTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    start_time: std::time::Instant,
}

impl VizTui {
    /// Creates a new TUI instance and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    /// - If alternate screen cannot be entered
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(VizTui {
            terminal,
            start_time: std::time::Instant::now(),
        })
    }

    /// Processes user input and returns the appropriate command.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self) -> Result<VizCommand> {
        if event::poll(std::time::Duration::from_millis(10))? {
            if let Event::Key(key) = event::read()? {
                return Ok(match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        tracing::debug!("Escape or 'q' pressed: quitting");
                        VizCommand::Quit
                    }
                    KeyCode::Char('c')
                        if key
                            .modifiers
                            .contains(crossterm::event::KeyModifiers::CONTROL) =>
                    {
                        tracing::debug!("Ctrl+C pressed: quitting");
                        VizCommand::Quit
                    }
                    KeyCode::Char(' ') => {
                        tracing::debug!("Space pressed: toggling pause");
                        VizCommand::TogglePause
                    }
                    KeyCode::Char('o') => {
                        tracing::debug!("'o' pressed: toggling oscillators");
                        VizCommand::ToggleOscillator
                    }
                    KeyCode::Up => VizCommand::AdjustCutoff(0.05),
                    KeyCode::Down => VizCommand::AdjustCutoff(-0.05),
                    KeyCode::Left => VizCommand::AdjustScaleX(-0.05),
                    KeyCode::Right => VizCommand::AdjustScaleX(0.05),
                    KeyCode::Char('+') | KeyCode::Char('=') => VizCommand::AdjustScaleY(0.05),
                    KeyCode::Char('-') => VizCommand::AdjustScaleY(-0.05),
                    _ => VizCommand::Continue,
                });
            }
        }
        Ok(VizCommand::Continue)
    }

    /// Renders one frame of the full visualization.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render(
        &mut self,
        wave: &WaveView,
        fft: &SpectralView,
        paused: bool,
        oscillate: bool,
    ) -> Result<()> {
        let elapsed = self.start_time.elapsed();

        // Wave pane shows deviation from the 128-byte midpoint
        let wave_data: Vec<u64> = wave
            .line()
            .values()
            .iter()
            .map(|&v| ((v - 0.5).abs() * 200.0).min(100.0) as u64)
            .collect();

        self.terminal.draw(|frame| {
            let area = frame.area();

            let footer_height = 1;
            let content_height = area.height.saturating_sub(footer_height);
            let wave_height = content_height / 5;
            let spectrum_height = content_height / 4;
            let waterfall_height = content_height
                .saturating_sub(wave_height)
                .saturating_sub(spectrum_height);

            let wave_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: wave_height,
            };
            let waterfall_area = Rect {
                x: area.x,
                y: area.y + wave_height,
                width: area.width,
                height: waterfall_height,
            };
            let spectrum_area = Rect {
                x: area.x,
                y: area.y + wave_height + waterfall_height,
                width: area.width,
                height: spectrum_height,
            };
            let footer_area = Rect {
                x: area.x,
                y: area.y + content_height,
                width: area.width,
                height: footer_height,
            };

            let wave_sparkline = Sparkline::default().data(&wave_data).max(100).style(
                Style::default()
                    .bg(Color::Rgb(0, 0, 0))
                    .fg(Color::Rgb(221, 221, 221)),
            );
            frame.render_widget(wave_sparkline, wave_area);

            draw_waterfall(frame, waterfall_area, fft);
            draw_spectrum(frame, spectrum_area, fft);
            draw_footer(frame, footer_area, fft, paused, oscillate, elapsed);
        })?;

        Ok(())
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for VizTui {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Draws the scrolling waterfall: one terminal row per history frame, newest
/// at the bottom, older rows rising and fading with depth.
fn draw_waterfall(frame: &mut ratatui::Frame, area: Rect, fft: &SpectralView) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    for strip in fft.history().frames() {
        // Accumulated aging translation determines the row
        let age = (strip.offset_y() / AGE_STEP_Y).round() as u16;
        if age >= area.height {
            continue;
        }
        let y = area.y + area.height - 1 - age;

        // Depth recession fades older rows toward black
        let fade = (1.0 + strip.offset_z()).clamp(0.25, 1.0);

        let visible = strip.draw_range() + 1;
        for x in 0..area.width {
            let idx = (x as usize * visible) / area.width as usize;
            let value = strip.values()[idx];
            let color = strip.colors()[idx].dimmed(fade);

            let glyph_idx = ((value * 8.0).round() as usize).min(8);
            let (r, g, b) = color.to_u8();
            frame.buffer_mut().set_string(
                area.x + x,
                y,
                INTENSITY_GLYPHS[glyph_idx],
                Style::default()
                    .fg(Color::Rgb(r, g, b))
                    .bg(Color::Rgb(0, 0, 0)),
            );
        }
    }
}

/// Draws the live spectrum as vertical bars with the cutoff marker line.
fn draw_spectrum(frame: &mut ratatui::Frame, area: Rect, fft: &SpectralView) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    let strip = fft.line();
    let visible = strip.draw_range() + 1;

    // Row of the threshold indicator, measured from the pane floor
    let marker_fraction = (fft.marker_y() / WORLD_SPAN_Y).clamp(0.0, 1.0);
    let marker_rows = (marker_fraction * area.height as f32).round() as u16;

    for x in 0..area.width {
        let idx = (x as usize * visible) / area.width as usize;
        let value = strip.values()[idx];
        let color = strip.colors()[idx];
        let (r, g, b) = color.to_u8();

        let bar_fraction =
            (value * strip.stretch_y() * SCENE_GAIN_Y / WORLD_SPAN_Y).clamp(0.0, 1.0);
        let bar_rows = (bar_fraction * area.height as f32).round() as u16;

        for row in 0..area.height {
            let from_floor = area.height - 1 - row;
            let y = area.y + row;

            if from_floor < bar_rows {
                frame.buffer_mut().set_string(
                    area.x + x,
                    y,
                    "█",
                    Style::default()
                        .fg(Color::Rgb(r, g, b))
                        .bg(Color::Rgb(0, 0, 0)),
                );
            } else if from_floor == marker_rows {
                frame.buffer_mut().set_string(
                    area.x + x,
                    y,
                    "─",
                    Style::default()
                        .fg(Color::Rgb(255, 0, 0))
                        .bg(Color::Rgb(0, 0, 0)),
                );
            } else {
                frame.buffer_mut().set_string(
                    area.x + x,
                    y,
                    " ",
                    Style::default().bg(Color::Rgb(0, 0, 0)),
                );
            }
        }
    }
}

/// Draws the one-line status footer.
fn draw_footer(
    frame: &mut ratatui::Frame,
    area: Rect,
    fft: &SpectralView,
    paused: bool,
    oscillate: bool,
    elapsed: std::time::Duration,
) {
    let indicator = if paused {
        Span::styled("⏸ ", Style::default().fg(Color::Yellow))
    } else {
        Span::styled("● ", Style::default().fg(Color::Red))
    };

    let secs = elapsed.as_secs();
    let status = format!(
        "{}:{:02}  cutoff {:.2}  zoom {:.2}  scale {:.2}  osc {}  [q quit, space pause, o osc, arrows/+- adjust]",
        secs / 60,
        secs % 60,
        fft.cutoff(),
        fft.scale_x(),
        fft.scale_y(),
        if oscillate { "on" } else { "off" },
    );

    let line = Line::from(vec![indicator, Span::raw(status)]);
    let footer = ratatui::widgets::Paragraph::new(line).style(
        Style::default()
            .fg(Color::Rgb(185, 207, 212))
            .bg(Color::Rgb(0, 0, 0)),
    );
    frame.render_widget(footer, area);
}
