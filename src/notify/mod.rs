//! Transient error and toast messages.
//!
//! Each kind has one slot. Showing a message replaces the slot and re-arms a
//! single-shot dismissal timer; the timer of the message it replaced is
//! aborted so it cannot hide the newer one.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Error,
    Toast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub shown_at: DateTime<Utc>,
}

#[derive(Default)]
struct Slot {
    current: Option<Notification>,
    timer: Option<JoinHandle<()>>,
    generation: u64,
}

impl Slot {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Error banner and toast, each with its own auto-dismiss timer.
/// Must be used from within a tokio runtime.
pub struct NotificationCenter {
    error: Arc<Mutex<Slot>>,
    toast: Arc<Mutex<Slot>>,
    error_ttl: Duration,
    toast_ttl: Duration,
}

impl NotificationCenter {
    pub fn new(error_ttl: Duration, toast_ttl: Duration) -> Self {
        Self {
            error: Arc::default(),
            toast: Arc::default(),
            error_ttl,
            toast_ttl,
        }
    }

    pub fn show_error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.show(NotificationKind::Error, message);
    }

    pub fn show_toast(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.show(NotificationKind::Toast, message);
    }

    pub fn dismiss_error(&self) {
        let mut slot = lock(&self.error);
        slot.cancel_timer();
        slot.generation += 1;
        slot.current = None;
    }

    pub fn error(&self) -> Option<Notification> {
        lock(&self.error).current.clone()
    }

    pub fn toast(&self) -> Option<Notification> {
        lock(&self.toast).current.clone()
    }

    fn show(&self, kind: NotificationKind, message: String) {
        let (slot, ttl) = match kind {
            NotificationKind::Error => (&self.error, self.error_ttl),
            NotificationKind::Toast => (&self.toast, self.toast_ttl),
        };

        let mut guard = lock(slot);
        guard.cancel_timer();
        guard.generation += 1;
        let generation = guard.generation;
        guard.current = Some(Notification {
            kind,
            message,
            shown_at: Utc::now(),
        });

        let deadline = tokio::time::Instant::now() + ttl;
        let slot_ref = Arc::clone(slot);
        guard.timer = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let mut slot = lock(&slot_ref);
            if slot.generation == generation {
                slot.current = None;
                slot.timer = None;
            }
        }));
    }
}

impl Drop for NotificationCenter {
    fn drop(&mut self) {
        lock(&self.error).cancel_timer();
        lock(&self.toast).cancel_timer();
    }
}

fn lock(slot: &Mutex<Slot>) -> std::sync::MutexGuard<'_, Slot> {
    // A panic while holding the lock cannot leave a slot half-updated.
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center() -> NotificationCenter {
        NotificationCenter::new(Duration::from_secs(15), Duration::from_secs(3))
    }

    async fn advance(secs: u64) {
        tokio::time::advance(Duration::from_secs(secs)).await;
        // let woken timer tasks run
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_auto_dismisses() {
        let center = center();
        center.show_error("boom");
        assert_eq!(center.error().unwrap().message, "boom");

        advance(14).await;
        assert!(center.error().is_some());

        advance(2).await;
        assert!(center.error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_replacing_rearms_timer() {
        let center = center();
        center.show_toast("first");
        advance(2).await;

        center.show_toast("second");
        advance(2).await;
        assert_eq!(center.toast().unwrap().message, "second");

        advance(2).await;
        assert!(center.toast().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_kinds_are_independent() {
        let center = center();
        center.show_error("err");
        center.show_toast("toast");

        advance(4).await;
        assert!(center.toast().is_none());
        assert_eq!(center.error().unwrap().kind, NotificationKind::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_error() {
        let center = center();
        center.show_error("err");
        center.dismiss_error();
        assert!(center.error().is_none());

        center.show_error("again");
        advance(1).await;
        assert_eq!(center.error().unwrap().message, "again");
    }
}
