//! Full-screen error display.
//!
//! Shown when startup fails (bad config, missing audio device) so the user
//! sees the problem instead of a garbled terminal.

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::Paragraph};
use std::io::{self, Stdout};

/// Full-screen error display with a dismissal hint.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl ErrorScreen {
    /// Creates a new error screen and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    /// - If alternate screen cannot be entered
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(ErrorScreen { terminal })
    }

    /// Displays an error message centered on a dark screen with a red
    /// banner, then waits for any key press to dismiss.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn show_error(&mut self, error_message: &str) -> anyhow::Result<()> {
        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();
                let background = Style::default().bg(Color::Rgb(20, 0, 0));

                for y in area.y..area.y + area.height {
                    for x in area.x..area.x + area.width {
                        frame.buffer_mut().set_string(x, y, " ", background);
                    }
                }

                let padding_x = area.width / 10;
                let text_width = (area.width * 80) / 100;

                let banner = Paragraph::new(Line::from(Span::styled(
                    " ERROR ",
                    Style::default()
                        .fg(Color::Rgb(255, 255, 255))
                        .bg(Color::Rgb(200, 0, 0)),
                )))
                .alignment(Alignment::Center);

                let message = Paragraph::new(Line::from(Span::styled(
                    error_message,
                    Style::default().fg(Color::Rgb(255, 200, 200)).bg(Color::Rgb(20, 0, 0)),
                )))
                .alignment(Alignment::Center)
                .wrap(ratatui::widgets::Wrap { trim: true });

                let hint = Paragraph::new(Line::from(Span::styled(
                    "press any key to exit",
                    Style::default().fg(Color::Rgb(128, 96, 96)).bg(Color::Rgb(20, 0, 0)),
                )))
                .alignment(Alignment::Center);

                let banner_area = Rect {
                    x: area.x + padding_x,
                    y: area.y + area.height / 3,
                    width: text_width,
                    height: 1,
                };
                let message_area = Rect {
                    x: area.x + padding_x,
                    y: (area.y + area.height / 3).saturating_add(2),
                    width: text_width,
                    height: area.height / 3,
                };
                let hint_area = Rect {
                    x: area.x + padding_x,
                    y: area.y + area.height.saturating_sub(2),
                    width: text_width,
                    height: 1,
                };

                frame.render_widget(banner, banner_area);
                frame.render_widget(message, message_area);
                frame.render_widget(hint, hint_area);
            })?;

            if event::poll(std::time::Duration::from_millis(100))? {
                if let Event::Key(_) = event::read()? {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
