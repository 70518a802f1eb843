//! Terminal presenter.
//!
//! Redraws a single status line on every engine update and prints
//! notification messages on their own line. Holds no timer state.

use std::io::{self, Write};

use pomoweb_core::timer::display::View;
use pomoweb_core::{Event, Snapshot};
use tokio::sync::broadcast;

const BAR_WIDTH: usize = 20;

pub struct TerminalPresenter<W: Write> {
    out: W,
    /// Also set the terminal window title via OSC 0.
    set_title: bool,
}

impl<W: Write + Send + 'static> TerminalPresenter<W> {
    pub fn new(out: W, set_title: bool) -> Self {
        Self { out, set_title }
    }

    pub fn render(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        let view = View::from_snapshot(snapshot);
        if self.set_title {
            write!(self.out, "\x1b]0;{}\x07", view.title)?;
        }
        write!(self.out, "\r{}\x1b[K", status_line(&view))?;
        self.out.flush()
    }

    pub fn announce(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "\r\x1b[K* {message}")?;
        self.out.flush()
    }

    pub fn finish(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        self.out.flush()
    }

    /// Render events until the channel closes, then hand the presenter back.
    pub async fn run(mut self, mut events: broadcast::Receiver<Event>) -> Self {
        loop {
            let result = match events.recv().await {
                Ok(Event::StateUpdated { snapshot, .. }) => self.render(&snapshot),
                Ok(Event::Notification { kind, message, .. }) => {
                    let message = message.unwrap_or_else(|| kind.default_message().to_string());
                    self.announce(&message)
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "presenter lagged");
                    Ok(())
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            if let Err(e) = result {
                tracing::warn!(error = %e, "failed to draw timer");
            }
        }
        self
    }
}

/// `Focus Time   24:59  [#-------------------]  session 1  (Pause)`
pub fn status_line(view: &View) -> String {
    let filled = ((view.progress * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    let bar: String = "#".repeat(filled) + &"-".repeat(BAR_WIDTH - filled);
    format!(
        "{:<11}  {}  [{}]  session {}  ({})",
        view.label, view.clock, bar, view.session_number, view.button_label
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomoweb_core::Mode;

    fn snapshot(remaining: u64, running: bool) -> Snapshot {
        Snapshot {
            mode: Mode::Work,
            remaining_seconds: remaining,
            running,
            session_number: 2,
            duration_secs: 1500,
            completed_work_intervals: 1,
        }
    }

    #[test]
    fn status_line_shows_clock_progress_and_button() {
        let line = status_line(&View::from_snapshot(&snapshot(750, true)));
        assert_eq!(
            line,
            "Focus Time   12:30  [##########----------]  session 2  (Pause)"
        );
    }

    #[test]
    fn render_writes_title_only_when_asked() {
        let mut presenter = TerminalPresenter::new(Vec::new(), false);
        presenter.render(&snapshot(1500, false)).unwrap();
        let text = String::from_utf8(presenter.out.clone()).unwrap();
        assert!(text.contains("25:00"));
        assert!(!text.contains("\x1b]0;"));

        let mut presenter = TerminalPresenter::new(Vec::new(), true);
        presenter.render(&snapshot(1500, false)).unwrap();
        let text = String::from_utf8(presenter.out).unwrap();
        assert!(text.contains("🍅 25:00 - Pomodoro Timer"));
    }

    #[tokio::test]
    async fn run_renders_updates_and_notifications() {
        let (tx, rx) = broadcast::channel(8);
        tx.send(Event::StateUpdated {
            snapshot: snapshot(1499, true),
            at: chrono::Utc::now(),
        })
        .unwrap();
        tx.send(Event::notification(
            pomoweb_core::NotificationKind::WorkComplete,
            Mode::Work,
            chrono::Utc::now(),
        ))
        .unwrap();
        drop(tx);

        let mut presenter = TerminalPresenter::new(Vec::new(), false).run(rx).await;
        presenter.finish().unwrap();
        let text = String::from_utf8(presenter.out).unwrap();
        assert!(text.contains("24:59"));
        assert!(text.contains("Work session complete! Time for a break."));
        assert!(text.ends_with('\n'));
    }
}
