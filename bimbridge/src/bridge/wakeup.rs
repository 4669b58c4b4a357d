//! Coalesced wakeup signal for the execution loop.

use tokio::sync::Notify;

/// Idempotent, coalescible "work is pending" signal.
///
/// Built on [`Notify`]'s single-permit semantics: any number of
/// [`WakeupSignal::signal`] calls before the loop wakes collapse into
/// one stored permit, so redundant signals never cause redundant
/// drains, and a signal is never lost - at least one drain follows the
/// last signal. This mirrors the single-slot "dirty flag" wakeup the
/// host's own event mechanism provides.
#[derive(Debug, Default)]
pub struct WakeupSignal {
    notify: Notify,
}

impl WakeupSignal {
    /// Creates a new signal with no stored wakeup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals that work is pending. Never blocks.
    pub fn signal(&self) {
        self.notify.notify_one();
    }

    /// Waits for a signal. Consumes a stored permit immediately if one
    /// was raised before this call.
    pub async fn notified(&self) {
        self.notify.notified().await;
    }
}
