//! Pending credential requests.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::error::CredentialError;

/// Handle to a credential operation.
///
/// Resolves to the operation's result. Keyring operations run in the
/// background and keep running if the handle is dropped; local-file
/// operations are already complete when the handle is returned.
#[must_use = "dropping a request detaches it; await it to observe failures"]
pub struct SecretRequest<T> {
    state: RequestState<T>,
}

enum RequestState<T> {
    Ready(Option<Result<T, CredentialError>>),
    Running(JoinHandle<Result<T, CredentialError>>),
}

impl<T: Send + 'static> SecretRequest<T> {
    /// Runs `operation` on the tokio runtime.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn spawn<F>(operation: F) -> Self
    where
        F: Future<Output = Result<T, CredentialError>> + Send + 'static,
    {
        Self {
            state: RequestState::Running(tokio::spawn(operation)),
        }
    }
}

impl<T> SecretRequest<T> {
    /// A request that has already completed.
    pub(crate) fn ready(result: Result<T, CredentialError>) -> Self {
        Self {
            state: RequestState::Ready(Some(result)),
        }
    }

    /// Cancels the request. Awaiting it afterwards yields
    /// [`CredentialError::Cancelled`] unless it had already finished.
    pub fn cancel(&self) {
        if let RequestState::Running(handle) = &self.state {
            handle.abort();
        }
    }

    /// Returns true once the result is available.
    pub fn is_finished(&self) -> bool {
        match &self.state {
            RequestState::Ready(_) => true,
            RequestState::Running(handle) => handle.is_finished(),
        }
    }
}

// The result slot is never pinned structurally.
impl<T> Unpin for SecretRequest<T> {}

impl<T> Future for SecretRequest<T> {
    type Output = Result<T, CredentialError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            RequestState::Ready(slot) => Poll::Ready(slot.take().unwrap_or_else(|| {
                Err(CredentialError::Worker("request polled after completion".to_string()))
            })),
            RequestState::Running(handle) => match Pin::new(handle).poll(cx) {
                Poll::Ready(Ok(result)) => Poll::Ready(result),
                Poll::Ready(Err(e)) if e.is_cancelled() => Poll::Ready(Err(CredentialError::Cancelled)),
                Poll::Ready(Err(e)) => Poll::Ready(Err(CredentialError::Worker(e.to_string()))),
                Poll::Pending => Poll::Pending,
            },
        }
    }
}

impl<T> std::fmt::Debug for SecretRequest<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretRequest")
            .field("finished", &self.is_finished())
            .finish()
    }
}
