//! Modal dialog results.
//!
//! Opening a modal splits into a [`ModalInstance`], owned by the dialog controller, and
//! a [`PendingModal`], awaited by whoever navigates. The controller closes the instance
//! with a value (confirm) or dismisses it (cancel); the navigator maps the outcome to
//! its next transition.

use tokio::sync::oneshot;

/// How a modal ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalResult<T> {
    Closed(T),
    Dismissed(String),
}

/// Outcome of a modal without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalOutcome {
    Confirmed,
    Cancelled,
}

impl<T> ModalResult<T> {
    pub fn outcome(&self) -> ModalOutcome {
        match self {
            ModalResult::Closed(_) => ModalOutcome::Confirmed,
            ModalResult::Dismissed(_) => ModalOutcome::Cancelled,
        }
    }
}

/// Open a modal.
pub fn open<T>() -> (ModalInstance<T>, PendingModal<T>) {
    let (sender, receiver) = oneshot::channel();
    (
        ModalInstance {
            sender: Some(sender),
        },
        PendingModal { receiver },
    )
}

/// Controller side of an open modal. Resolves at most once.
#[derive(Debug)]
pub struct ModalInstance<T> {
    sender: Option<oneshot::Sender<ModalResult<T>>>,
}

impl<T> ModalInstance<T> {
    pub fn is_open(&self) -> bool {
        self.sender.is_some()
    }

    /// Close with a result. Returns `false` if the modal was already resolved.
    pub fn close(&mut self, value: T) -> bool {
        self.resolve(ModalResult::Closed(value))
    }

    /// Dismiss without a result. Returns `false` if the modal was already resolved.
    pub fn dismiss(&mut self, reason: impl Into<String>) -> bool {
        self.resolve(ModalResult::Dismissed(reason.into()))
    }

    fn resolve(&mut self, result: ModalResult<T>) -> bool {
        match self.sender.take() {
            Some(sender) => {
                // The receiver may already be gone.
                let _ = sender.send(result);
                true
            }
            None => false,
        }
    }
}

/// Navigator side of an open modal.
#[derive(Debug)]
pub struct PendingModal<T> {
    receiver: oneshot::Receiver<ModalResult<T>>,
}

impl<T> PendingModal<T> {
    /// Wait for the modal to be resolved.
    ///
    /// A modal whose instance is dropped unresolved counts as dismissed.
    pub async fn result(self) -> ModalResult<T> {
        self.receiver
            .await
            .unwrap_or_else(|_| ModalResult::Dismissed("closed without result".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_close_delivers_value_once() {
        let (mut instance, pending) = open::<i64>();
        assert!(instance.is_open());
        assert!(instance.close(42));
        assert!(!instance.is_open());
        assert!(!instance.dismiss("cancel"), "second resolution is ignored");

        let result = pending.result().await;
        assert_eq!(result, ModalResult::Closed(42));
        assert_eq!(result.outcome(), ModalOutcome::Confirmed);
    }

    #[tokio::test]
    async fn test_dismiss_is_cancelled() {
        let (mut instance, pending) = open::<i64>();
        instance.dismiss("cancel");
        let result = pending.result().await;
        assert_eq!(result, ModalResult::Dismissed("cancel".into()));
        assert_eq!(result.outcome(), ModalOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_dropped_instance_counts_as_dismissed() {
        let (instance, pending) = open::<i64>();
        drop(instance);
        assert_eq!(pending.result().await.outcome(), ModalOutcome::Cancelled);
    }
}
