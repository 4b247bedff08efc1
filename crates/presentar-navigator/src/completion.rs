//! Futures resolved with a route's result.

use futures::channel::oneshot;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

pub(crate) type Completer = oneshot::Sender<Option<Value>>;

/// Resolves with the value a route was popped with.
///
/// Routes that leave the navigator without a result, or whose navigator is
/// dropped, resolve with `None`.
#[derive(Debug)]
#[must_use = "a completion does nothing unless polled"]
pub struct RouteCompletion {
    receiver: oneshot::Receiver<Option<Value>>,
}

impl RouteCompletion {
    pub(crate) fn channel() -> (Completer, Self) {
        let (sender, receiver) = oneshot::channel();
        (sender, Self { receiver })
    }

    /// Take the result without waiting.
    ///
    /// Returns `None` while the route is still on the stack. The result is
    /// handed out once; polling afterwards resolves with `None`.
    pub fn try_result(&mut self) -> Option<Option<Value>> {
        match self.receiver.try_recv() {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(None),
        }
    }
}

impl Future for RouteCompletion {
    type Output = Option<Value>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or(None))
    }
}
