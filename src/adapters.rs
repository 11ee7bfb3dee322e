//! Producer adapters: iterator-driven sources, seed-driven generation, and
//! the push-source bridge
//!
//! Pull sources (`from_iter`, `from_try_iter`, `unfold`) advance one step per
//! synchronization of the current tail, each step memoized. The push bridge
//! inverts a callback-driven source into a stream by advancing a single
//! private write-once slot along the callback path.

use async_stream::stream;
use futures_core::Stream as PollStream;
use futures_util::StreamExt;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::error::{StreamError, StreamResult};
use crate::memo::Slot;
use crate::stream::{Stream, StreamNode};

// ================================
// Pull sources
// ================================

/// Build a stream from an iterator.
///
/// One item is pulled per synchronization of the current tail; each step is
/// memoized, so no item is pulled twice however many consumers share the
/// chain. On exhaustion the iterator is dropped and the stream ends.
pub fn from_iter<I>(iter: I) -> Stream<I::Item>
where
    I: IntoIterator,
    I::IntoIter: Send + 'static,
    I::Item: Clone + Send + Sync + 'static,
{
    iter_step(iter.into_iter())
}

fn iter_step<I>(mut iter: I) -> Stream<I::Item>
where
    I: Iterator + Send + 'static,
    I::Item: Clone + Send + Sync + 'static,
{
    Stream::suspend(move || match iter.next() {
        Some(item) => Ok(StreamNode::Value(item, iter_step(iter))),
        None => Ok(StreamNode::Empty),
    })
}

/// Build a stream from a fallible iterator.
///
/// An `Err` item becomes the failure outcome of that synchronization, cached
/// like any other resolution and replayed to every synchronizer.
pub fn from_try_iter<I, T, E>(iter: I) -> Stream<T>
where
    I: IntoIterator<Item = Result<T, E>>,
    I::IntoIter: Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: fmt::Display,
{
    try_iter_step(iter.into_iter())
}

fn try_iter_step<I, T, E>(mut iter: I) -> Stream<T>
where
    I: Iterator<Item = Result<T, E>> + Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: fmt::Display,
{
    Stream::suspend(move || match iter.next() {
        Some(Ok(item)) => Ok(StreamNode::Value(item, try_iter_step(iter))),
        Some(Err(error)) => Err(StreamError::Iterator(error.to_string())),
        None => Ok(StreamNode::Empty),
    })
}

/// Generate a stream from a seed, one step per synchronization.
pub fn unfold<S, T, F>(seed: S, f: F) -> Stream<T>
where
    S: Send + 'static,
    T: Clone + Send + Sync + 'static,
    F: FnMut(S) -> Option<(T, S)> + Send + 'static,
{
    Stream::suspend(move || {
        let mut step = f;
        match step(seed) {
            Some((item, next)) => Ok(StreamNode::Value(item, unfold(next, step))),
            None => Ok(StreamNode::Empty),
        }
    })
}

// ================================
// Push-source bridge
// ================================

/// A callback-driven source of elements.
///
/// `subscribe` wires the source's callbacks to the sink and returns the
/// unsubscribe capability; dropping the handle releases the source.
pub trait PushSource<T>: Send {
    type Handle: Send + 'static;

    fn subscribe(self, sink: StreamSink<T>) -> Self::Handle;
}

/// The producer side of a push-bridged stream.
///
/// Owns the single "current open slot" reference, advanced only along the
/// subscribing callback's execution path. This is the only mutable state in
/// the bridge, private to one sink instance.
pub struct StreamSink<T> {
    current: Slot<T>,
}

impl<T> StreamSink<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// A fresh sink and the stream view of its first slot.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (StreamSink<T>, Stream<T>) {
        let slot = Slot::new();
        let stream = slot.stream();
        (StreamSink { current: slot }, stream)
    }

    /// Publish the next element. Resolving the slot is a plain channel send,
    /// so the callback path never blocks.
    ///
    /// Emitting after `complete` or `fail` is a contract violation and
    /// surfaces as `DuplicateResolution`; the earlier resolution stands.
    pub fn emit(&mut self, value: T) -> StreamResult<()> {
        let next = Slot::new();
        let tail = next.stream();
        self.current.resolve(Ok(StreamNode::Value(value, tail)))?;
        self.current = next;
        Ok(())
    }

    /// End the stream.
    pub fn complete(&mut self) -> StreamResult<()> {
        self.current.resolve(Ok(StreamNode::Empty))
    }

    /// Fail the stream; every current and future synchronizer of the open
    /// position observes the same cached error.
    pub fn fail(&mut self, message: impl Into<String>) -> StreamResult<()> {
        self.current.resolve(Err(StreamError::Source(message.into())))
    }
}

/// An owned unsubscribe capability, released on drop.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Subscription {
            release: Some(Box::new(release)),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            log::debug!("releasing push source subscription");
            release();
        }
    }
}

/// Bridge a push source into a stream.
///
/// Returns the stream view of the source's first slot together with the
/// subscription guard; drop the guard to unsubscribe. Prefer
/// [`with_push_source`] when consumption is scoped.
pub fn from_push_source<T, S>(source: S) -> (Stream<T>, Subscription)
where
    T: Clone + Send + Sync + 'static,
    S: PushSource<T>,
{
    let (sink, stream) = StreamSink::new();
    let handle = source.subscribe(sink);
    (stream, Subscription::new(move || drop(handle)))
}

/// Subscribe to a push source for the duration of `use_fn`.
///
/// The subscription is released when the scope exits, normally or early; the
/// guard's drop runs on panic unwind as well.
pub async fn with_push_source<T, S, F, Fut, R>(source: S, use_fn: F) -> R
where
    T: Clone + Send + Sync + 'static,
    S: PushSource<T>,
    F: FnOnce(Stream<T>) -> Fut,
    Fut: Future<Output = R>,
{
    let (stream, subscription) = from_push_source(source);
    let result = use_fn(stream).await;
    drop(subscription);
    result
}

// ================================
// Interop
// ================================

/// View a memoized stream as a poll-driven `futures` stream.
///
/// A failure is yielded once as an `Err` item, after which the bridge ends.
pub fn into_futures_stream<T>(s: Stream<T>) -> Pin<Box<dyn PollStream<Item = StreamResult<T>> + Send>>
where
    T: Clone + Send + Sync + 'static,
{
    stream! {
        let mut current = s;
        loop {
            match current.sync().await {
                Ok(StreamNode::Empty) => break,
                Ok(StreamNode::Value(head, tail)) => {
                    yield Ok(head);
                    current = tail;
                }
                Err(error) => {
                    yield Err(error);
                    break;
                }
            }
        }
    }
    .boxed()
}
