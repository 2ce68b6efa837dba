use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::runtime::Handle;
use tokio::sync::oneshot;

use super::error::OperationError;

/// Resolves exactly once. A task that dies before answering yields a transport error.
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<Result<T, OperationError>>,
}

pub fn spawn_on<T, F>(handle: &Handle, operation: F) -> Pending<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T, OperationError>> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    handle.spawn(async move {
        // receiver may be gone; nobody is left to tell
        let _ = tx.send(operation.await);
    });
    Pending { rx }
}

impl<T> Future for Pending<T> {
    type Output = Result<T, OperationError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(OperationError::transport(
                    "operation ended without delivering an outcome",
                ))
            })
        })
    }
}
