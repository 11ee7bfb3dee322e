//! Memoization primitives: the at-most-once wrap and the write-once slot
//!
//! Everything in this crate that looks like a lazy value is one of these two
//! things under the hood. `memoize` turns an arbitrary node computation into a
//! shared, cached one; `Slot` is the single-resolution cell the push adapter
//! advances through.

use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use std::future::Future;
use tokio::sync::oneshot;

use crate::error::{StreamError, StreamResult};
use crate::stream::{Stream, StreamNode};

/// The memoized node computation backing every `Stream` value.
pub(crate) type NodeFuture<T> = Shared<BoxFuture<'static, StreamResult<StreamNode<T>>>>;

/// Wrap a node computation so it evaluates at most once.
///
/// The first committing synchronization drives the future; the outcome
/// (value or failure) is cached and cloned out to every synchronizer,
/// concurrent or later. Subsequent synchronizations return from cache and
/// schedule no new work.
pub(crate) fn memoize<T, F>(fut: F) -> NodeFuture<T>
where
    T: Clone + Send + Sync + 'static,
    F: Future<Output = StreamResult<StreamNode<T>>> + Send + 'static,
{
    fut.boxed().shared()
}

/// A write-once cell holding the next resolution of a stream position.
///
/// Many waiters may synchronize on the slot's stream view; all of them observe
/// the single resolution. A second resolution is a contract violation and is
/// reported at the violation point, never swallowed; the first resolution is
/// structurally protected because the underlying sender is consumed by the
/// first write.
pub struct Slot<T> {
    sender: Option<oneshot::Sender<StreamResult<StreamNode<T>>>>,
    stream: Stream<T>,
}

impl<T> Slot<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        let (sender, receiver) = oneshot::channel();
        let stream = Stream::from_future(async move {
            match receiver.await {
                Ok(outcome) => outcome,
                Err(_) => Err(StreamError::Cancelled),
            }
        });
        Slot {
            sender: Some(sender),
            stream,
        }
    }

    /// The stream view of this slot. Synchronizing it suspends the caller
    /// until the slot is resolved.
    pub fn stream(&self) -> Stream<T> {
        self.stream.clone()
    }

    /// Resolve the slot to a node or a failure. Never blocks.
    pub fn resolve(&mut self, outcome: StreamResult<StreamNode<T>>) -> StreamResult<()> {
        match self.sender.take() {
            Some(sender) => {
                // The slot's own stream handle keeps the receiver alive, so
                // the send cannot fail while this slot exists.
                let _ = sender.send(outcome);
                Ok(())
            }
            None => {
                log::error!("write-once slot resolved twice; keeping first resolution");
                Err(StreamError::DuplicateResolution)
            }
        }
    }
}

impl<T> Default for Slot<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
