use std::io::{self, IsTerminal, Stdout};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use ratatui::backend::CrosstermBackend;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Gauge, Paragraph};
use ratatui::{Terminal, TerminalOptions, Viewport};
use tracing::warn;

const TICK: Duration = Duration::from_millis(100);
const LABEL: &str = "Converting";

/// Single-line progress display drawn below the current cursor position.
pub struct ProgressView {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    tick: u64,
}

impl ProgressView {
    pub fn new() -> io::Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::with_options(
            backend,
            TerminalOptions {
                viewport: Viewport::Inline(1),
            },
        )?;
        Ok(Self { terminal, tick: 0 })
    }

    /// `None` draws a bouncing bar for conversions without a known duration.
    pub fn draw(&mut self, percent: Option<f64>) -> io::Result<()> {
        self.tick = self.tick.wrapping_add(1);
        let tick = self.tick;

        self.terminal.draw(|frame| {
            let area = frame.size();
            match percent {
                Some(percent) => {
                    let gauge = Gauge::default()
                        .gauge_style(Style::default().fg(Color::Cyan))
                        .use_unicode(true)
                        .ratio((percent / 100.0).clamp(0.0, 1.0))
                        .label(format!("{LABEL} {percent:>5.1}%"));
                    frame.render_widget(gauge, area);
                }
                None => {
                    let bar_width = (area.width as usize).saturating_sub(LABEL.len() + 3).clamp(10, 40);
                    let line = format!("{LABEL} {}", render_indeterminate_bar(tick, bar_width));
                    frame.render_widget(Paragraph::new(Line::from(line)), area);
                }
            }
        })?;
        Ok(())
    }

    pub fn finish(mut self) -> io::Result<()> {
        self.terminal.clear()?;
        self.terminal.show_cursor()
    }
}

/// Renders progress from `updates` until the sender side hangs up.
///
/// Falls back to silently draining the channel when stdout is not a terminal.
pub fn show_progress(updates: Receiver<f64>, enabled: bool) {
    let mut view = if enabled && io::stdout().is_terminal() {
        match ProgressView::new() {
            Ok(view) => Some(view),
            Err(err) => {
                warn!(error = %err, "progress display unavailable");
                None
            }
        }
    } else {
        None
    };

    let mut last: Option<f64> = None;
    loop {
        match updates.recv_timeout(TICK) {
            Ok(percent) => last = Some(percent),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(current) = view.as_mut() {
            if let Err(err) = current.draw(last) {
                warn!(error = %err, "progress display failed");
                view = None;
            }
        }
    }

    if let Some(view) = view {
        if let Err(err) = view.finish() {
            warn!(error = %err, "failed to clear progress display");
        }
    }
}

fn render_indeterminate_bar(tick: u64, width: usize) -> String {
    let width = width.max(10);
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');

    let span = (width - 1) * 2;
    let step = (tick as usize) % span;
    let pos = if step < width { step } else { span - step };

    for idx in 0..width {
        if idx == pos {
            bar.push('>');
        } else if idx < pos {
            bar.push('=');
        } else {
            bar.push(' ');
        }
    }
    bar.push(']');
    bar
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;

    use super::*;

    #[test]
    fn indeterminate_bar_has_fixed_width() {
        for tick in 0..50 {
            let bar = render_indeterminate_bar(tick, 12);
            assert_eq!(bar.chars().count(), 14);
            assert_eq!(bar.matches('>').count(), 1);
        }
    }

    #[test]
    fn indeterminate_bar_bounces() {
        assert_eq!(render_indeterminate_bar(0, 10), "[>         ]");
        assert_eq!(render_indeterminate_bar(9, 10), "[=========>]");
        assert_eq!(render_indeterminate_bar(10, 10), "[========> ]");
        assert_eq!(render_indeterminate_bar(18, 10), "[>         ]");
    }

    #[test]
    fn show_progress_returns_once_sender_is_gone() {
        let (tx, rx) = mpsc::channel();
        let producer = thread::spawn(move || {
            for percent in [10.0, 55.0, 100.0] {
                tx.send(percent).unwrap();
            }
        });
        show_progress(rx, false);
        producer.join().unwrap();
    }
}
