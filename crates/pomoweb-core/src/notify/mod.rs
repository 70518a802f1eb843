//! Notification dispatch.
//!
//! Notifiers are fire-and-forget: the dispatcher logs a failed delivery and
//! moves on, so a denied permission or a missing sound device never reaches
//! the engine.

use tokio::sync::{broadcast, watch};

use crate::error::NotifyError;
use crate::events::{Event, NotificationKind};
use crate::storage::Settings;
use crate::timer::Mode;

/// A sink for completion/discard notifications.
pub trait Notifier: Send {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Audible notifiers are skipped while sound is disabled in settings.
    fn audible(&self) -> bool;

    fn notify(&mut self, kind: NotificationKind, mode: Mode, message: &str) -> Result<(), NotifyError>;
}

/// Subscriber that fans notification events out to every notifier.
pub struct NotificationDispatcher {
    notifiers: Vec<Box<dyn Notifier>>,
    settings: watch::Receiver<Settings>,
}

impl NotificationDispatcher {
    pub fn new(settings: watch::Receiver<Settings>) -> Self {
        Self {
            notifiers: Vec::new(),
            settings,
        }
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifiers.push(Box::new(notifier));
        self
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    /// Deliver one event. Returns how many notifiers accepted it.
    /// State updates are ignored.
    pub fn dispatch(&mut self, event: &Event) -> usize {
        let Event::Notification {
            kind,
            mode,
            message,
            ..
        } = event
        else {
            return 0;
        };
        let sound_enabled = self.settings.borrow().sound_enabled;
        let message = message
            .as_deref()
            .unwrap_or_else(|| kind.default_message());

        let mut delivered = 0;
        for notifier in &mut self.notifiers {
            if notifier.audible() && !sound_enabled {
                continue;
            }
            match notifier.notify(*kind, *mode, message) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(notifier = notifier.name(), error = %e, "notification dropped");
                }
            }
        }
        delivered
    }

    /// Consume engine events until the channel closes.
    ///
    /// Backends may block (a D-Bus round trip, an audio device), so each
    /// delivery runs on the blocking pool and never occupies a runtime worker.
    pub async fn run(mut self, mut events: broadcast::Receiver<Event>) {
        loop {
            match events.recv().await {
                Ok(event @ Event::Notification { .. }) => {
                    let delivery = tokio::task::spawn_blocking(move || {
                        self.dispatch(&event);
                        self
                    });
                    match delivery.await {
                        Ok(dispatcher) => self = dispatcher,
                        Err(e) => {
                            tracing::error!(error = %e, "notifier panicked, dispatcher stopped");
                            break;
                        }
                    }
                }
                Ok(Event::StateUpdated { .. }) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "notification dispatcher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}
