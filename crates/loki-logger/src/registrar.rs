//! Deferred-completion capability for in-flight push requests.
//!
//! Short-lived host environments often provide a "wait until" hook that keeps
//! the execution context alive until registered background work finishes.
//! Rather than sniffing the host context for such a hook, the logger takes an
//! explicit [`DeferredTaskRegistrar`] at construction and hands it every
//! transport call made by `flush`.

use crate::transport::ShippingError;
use futures::future::BoxFuture;
use tracing::error;

/// A pending push operation produced by `flush`.
pub type ShippingTask = BoxFuture<'static, Result<(), ShippingError>>;

/// Registers a pending push operation and returns the completion signal that
/// `flush` awaits.
pub trait DeferredTaskRegistrar: Send + Sync {
    fn register(&self, task: ShippingTask) -> ShippingTask;
}

/// Default registrar: no host hook, `flush` awaits the transport call
/// directly and observes its outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineRegistrar;

impl DeferredTaskRegistrar for InlineRegistrar {
    fn register(&self, task: ShippingTask) -> ShippingTask {
        task
    }
}

/// Detaches the push onto the tokio runtime, the way a host "wait until"
/// hook would. `register` resolves immediately; a failure of the detached
/// task is only reported through the error log.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpawnRegistrar;

impl DeferredTaskRegistrar for SpawnRegistrar {
    fn register(&self, task: ShippingTask) -> ShippingTask {
        tokio::spawn(async move {
            if let Err(shipping_error) = task.await {
                error!("detached log push failed: {shipping_error}");
            }
        });
        Box::pin(futures::future::ready(Ok(())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_inline_registrar_propagates_outcome() {
        let registrar = InlineRegistrar;

        let ok = registrar.register(Box::pin(async { Ok(()) })).await;
        assert!(ok.is_ok());

        let failed = registrar
            .register(Box::pin(async {
                Err(ShippingError::Destination(
                    Some(StatusCode::INTERNAL_SERVER_ERROR),
                    "down".to_string(),
                ))
            }))
            .await;
        assert!(matches!(failed, Err(ShippingError::Destination(_, _))));
    }

    #[tokio::test]
    async fn test_spawn_registrar_resolves_before_task_completes() {
        let registrar = SpawnRegistrar;
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();

        let registration = registrar.register(Box::pin(async move {
            let _ = started_tx.send(());
            // Held open until the test releases it, proving registration
            // did not wait for completion
            let _ = release_rx.await;
            Ok(())
        }));

        registration.await.expect("registration should resolve");
        started_rx.await.expect("detached task should have started");
        let _ = release_tx.send(());
    }

    #[tokio::test]
    async fn test_spawn_registrar_swallows_task_failure() {
        let registrar = SpawnRegistrar;
        let (done_tx, done_rx) = oneshot::channel();

        let registration = registrar.register(Box::pin(async move {
            let _ = done_tx.send(());
            Err(ShippingError::Payload("unserializable".to_string()))
        }));

        assert!(registration.await.is_ok());
        done_rx.await.expect("detached task should have run");
    }
}
