use crate::peer::StopCheck;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// RpcServerShutdownSignal resolves once the owning peer has been killed.
pub(crate) struct RpcServerShutdownSignal {
    stopped: Pin<Box<dyn Future<Output = ()> + Send>>,
}

impl RpcServerShutdownSignal {
    pub(crate) fn new(mut stop_check: StopCheck) -> Self {
        RpcServerShutdownSignal {
            stopped: Box::pin(async move { stop_check.stopped().await }),
        }
    }
}

impl Future for RpcServerShutdownSignal {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.stopped.as_mut().poll(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::new_stop_signal;
    use tokio::time::Duration;

    #[tokio::test]
    async fn resolves_on_stop() {
        let (stopper, stop_check) = new_stop_signal();
        let mut signal = RpcServerShutdownSignal::new(stop_check);

        let still_running = tokio::time::timeout(Duration::from_millis(20), &mut signal).await;
        assert!(still_running.is_err());

        stopper.stop();
        tokio::time::timeout(Duration::from_secs(1), signal)
            .await
            .expect("shutdown signal did not resolve");
    }
}
