use tokio::sync::watch;

/// Stopper is the owning end of a peer's kill switch. Stopping is idempotent, and dropping the
/// Stopper stops as well.
pub(crate) struct Stopper {
    stop_signal: watch::Sender<bool>,
}

#[derive(Clone)]
pub(crate) struct StopCheck {
    stop_signal: watch::Receiver<bool>,
}

impl Stopper {
    pub(crate) fn stop(&self) {
        // Fails only if every StopCheck is gone, and then nobody is left to care.
        let _ = self.stop_signal.send(true);
    }
}

impl Drop for Stopper {
    fn drop(&mut self) {
        self.stop();
    }
}

impl StopCheck {
    pub(crate) fn should_stop(&self) -> bool {
        *self.stop_signal.borrow()
    }

    /// Resolves once the Stopper has stopped (or has been dropped).
    pub(crate) async fn stopped(&mut self) {
        loop {
            if self.should_stop() {
                return;
            }
            if self.stop_signal.changed().await.is_err() {
                return;
            }
        }
    }
}

pub(crate) fn new() -> (Stopper, StopCheck) {
    let (tx, rx) = watch::channel(false);

    (Stopper { stop_signal: tx }, StopCheck { stop_signal: rx })
}
