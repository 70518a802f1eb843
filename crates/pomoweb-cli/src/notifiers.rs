use std::io::Write;

use notify_rust::Notification;
use pomoweb_core::{Mode, NotificationKind, Notifier, NotifyError};

const SUMMARY: &str = "Pomodoro Timer";

/// Desktop notification banner. Silent, so it fires even when sound is off.
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn name(&self) -> &'static str {
        "desktop"
    }

    fn audible(&self) -> bool {
        false
    }

    fn notify(&mut self, _kind: NotificationKind, mode: Mode, message: &str) -> Result<(), NotifyError> {
        Notification::new()
            .summary(&format!("{SUMMARY}: {}", mode.label()))
            .body(message)
            .appname("pomoweb")
            .show()
            .map(|_| ())
            .map_err(|e| NotifyError::Delivery {
                backend: "desktop",
                message: e.to_string(),
            })
    }
}

/// Terminal bell. A double ring marks a discarded interval so it sounds
/// different from a completion.
pub struct BellNotifier<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> BellNotifier<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> Notifier for BellNotifier<W> {
    fn name(&self) -> &'static str {
        "bell"
    }

    fn audible(&self) -> bool {
        true
    }

    fn notify(&mut self, kind: NotificationKind, _mode: Mode, _message: &str) -> Result<(), NotifyError> {
        let bell = match kind {
            NotificationKind::Discarded => "\x07\x07",
            NotificationKind::WorkComplete | NotificationKind::BreakComplete => "\x07",
        };
        self.out
            .write_all(bell.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|e| NotifyError::Delivery {
                backend: "bell",
                message: e.to_string(),
            })
    }
}
