//! Handle for requests dispatched without blocking the caller.

use crate::{PusherError, Response, Result};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// An API call running in the background.
///
/// Resolves exactly once, to either the decoded [`Response`] or a
/// [`PusherError`]. Await it, or hand it two continuations with
/// [`on_complete`](Self::on_complete). Dropping the handle does not abort the
/// request.
#[must_use = "a pending request does nothing observable unless awaited or given continuations"]
pub struct PendingRequest {
    state: State,
}

enum State {
    Ready(Option<Result<Response>>),
    Spawned(Handle, JoinHandle<Result<Response>>),
}

impl PendingRequest {
    /// Run `future` on the current Tokio runtime.
    pub(crate) fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Result<Response>> + Send + 'static,
    {
        match Handle::try_current() {
            Ok(handle) => {
                let task = handle.spawn(future);
                Self {
                    state: State::Spawned(handle, task),
                }
            }
            Err(_) => Self::ready(Err(PusherError::request(
                "Asynchronous requests must be started from within a Tokio runtime",
            ))),
        }
    }

    /// A request that already has its outcome, e.g. one rejected before
    /// reaching the transport.
    pub(crate) fn ready(result: Result<Response>) -> Self {
        Self {
            state: State::Ready(Some(result)),
        }
    }

    /// Whether the outcome is available.
    pub fn is_finished(&self) -> bool {
        match &self.state {
            State::Ready(_) => true,
            State::Spawned(_, task) => task.is_finished(),
        }
    }

    /// Deliver the outcome to exactly one of two continuations.
    ///
    /// Runs on the runtime that executes the request; if the request was
    /// rejected before dispatch the matching continuation runs immediately.
    pub fn on_complete<S, F>(self, on_success: S, on_failure: F)
    where
        S: FnOnce(Response) + Send + 'static,
        F: FnOnce(PusherError) + Send + 'static,
    {
        match self.state {
            State::Ready(result) => deliver(result.unwrap_or_else(already_taken), on_success, on_failure),
            State::Spawned(handle, task) => {
                handle.spawn(async move {
                    deliver(join(task.await), on_success, on_failure);
                });
            }
        }
    }
}

impl Future for PendingRequest {
    type Output = Result<Response>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            State::Ready(result) => Poll::Ready(result.take().unwrap_or_else(already_taken)),
            State::Spawned(_, task) => Pin::new(task).poll(cx).map(join),
        }
    }
}

impl std::fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequest")
            .field("finished", &self.is_finished())
            .finish()
    }
}

fn join(result: std::result::Result<Result<Response>, tokio::task::JoinError>) -> Result<Response> {
    result.unwrap_or_else(|e| Err(PusherError::http(e)))
}

fn already_taken() -> Result<Response> {
    Err(PusherError::request("Pending request polled after completion"))
}

fn deliver<S, F>(result: Result<Response>, on_success: S, on_failure: F)
where
    S: FnOnce(Response),
    F: FnOnce(PusherError),
{
    match result {
        Ok(response) => on_success(response),
        Err(err) => on_failure(err),
    }
}
