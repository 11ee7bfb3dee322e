//! Core stream representation: nodes, the memoized stream handle, and the
//! synchronize-and-branch consumer loop
//!
//! A `Stream` is not a poll-driven pipeline stage; it is a value. Cloning one
//! is cheap, synchronizing it any number of times always yields the same
//! resolution, and the computation behind it runs at most once.

use futures::future;
use std::fmt;
use std::future::Future;

use crate::error::StreamResult;
use crate::memo::{self, NodeFuture};

/// One resolved step of a stream: either the end, or a head value paired with
/// the remaining stream. Tails form a forward-only chain, never a cycle.
#[derive(Clone, Debug)]
pub enum StreamNode<T> {
    Empty,
    Value(T, Stream<T>),
}

/// A suspension-capable, memoized computation yielding the next `StreamNode`.
///
/// Invariant: once resolved, every synchronization, concurrent or later,
/// observes the identical outcome (same head, same tail handle, or the same
/// cached failure).
pub struct Stream<T> {
    inner: NodeFuture<T>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Stream {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream").finish_non_exhaustive()
    }
}

impl<T> Stream<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wrap a node computation into a memoized stream value.
    pub(crate) fn from_future<F>(fut: F) -> Self
    where
        F: Future<Output = StreamResult<StreamNode<T>>> + Send + 'static,
    {
        Stream {
            inner: memo::memoize(fut),
        }
    }

    /// Defer a node computation; `f` runs at most once, on the first
    /// synchronization, and its outcome is cached.
    pub fn suspend<F>(f: F) -> Self
    where
        F: FnOnce() -> StreamResult<StreamNode<T>> + Send + 'static,
    {
        Stream::from_future(async move { f() })
    }

    /// Synchronize on this stream, suspending the calling task until the next
    /// node (or the cached failure) is available.
    pub async fn sync(&self) -> StreamResult<StreamNode<T>> {
        self.inner.clone().await
    }
}

/// The empty stream; resolves immediately to `Empty`.
pub fn nil<T>() -> Stream<T>
where
    T: Clone + Send + Sync + 'static,
{
    Stream::from_future(future::ready(Ok(StreamNode::Empty)))
}

/// Prepend a value onto a stream. The tail is not forced.
pub fn cons<T>(value: T, tail: Stream<T>) -> Stream<T>
where
    T: Clone + Send + Sync + 'static,
{
    Stream::from_future(future::ready(Ok(StreamNode::Value(value, tail))))
}

/// A single-element stream
pub fn emit<T>(value: T) -> Stream<T>
where
    T: Clone + Send + Sync + 'static,
{
    cons(value, nil())
}

/// Synchronize `s`, apply `f` to the resulting node, and memoize the
/// composite. `f` runs at most once per resolution of `s`; upstream failures
/// short-circuit past it untouched.
///
/// This is the building block for `map` and `append`.
pub fn bind_and_memo<T, U, F, Fut>(s: Stream<T>, f: F) -> Stream<U>
where
    T: Clone + Send + Sync + 'static,
    U: Clone + Send + Sync + 'static,
    F: FnOnce(StreamNode<T>) -> Fut + Send + 'static,
    Fut: Future<Output = StreamResult<StreamNode<U>>> + Send + 'static,
{
    Stream::from_future(async move {
        let node = s.sync().await?;
        f(node).await
    })
}

// ================================
// Consumer loop
// ================================
//
// Processing a stream is always the same shape: synchronize, stop on Empty,
// handle the head and continue on the tail. The helpers below are that loop;
// they work in plain sequential flow and inside spawned tasks alike, and many
// consumers may walk independently memoized positions of a shared chain.

/// Collect every element of a stream into a vector.
pub async fn collect<T>(s: Stream<T>) -> StreamResult<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
{
    let mut items = Vec::new();
    let mut current = s;
    loop {
        match current.sync().await? {
            StreamNode::Empty => return Ok(items),
            StreamNode::Value(head, tail) => {
                items.push(head);
                current = tail;
            }
        }
    }
}

/// Run `f` on every element in order.
pub async fn for_each<T, F>(s: Stream<T>, mut f: F) -> StreamResult<()>
where
    T: Clone + Send + Sync + 'static,
    F: FnMut(T),
{
    let mut current = s;
    loop {
        match current.sync().await? {
            StreamNode::Empty => return Ok(()),
            StreamNode::Value(head, tail) => {
                f(head);
                current = tail;
            }
        }
    }
}

/// Fold a stream into a single value.
pub async fn fold<T, B, F>(s: Stream<T>, init: B, mut f: F) -> StreamResult<B>
where
    T: Clone + Send + Sync + 'static,
    F: FnMut(B, T) -> B,
{
    let mut acc = init;
    let mut current = s;
    loop {
        match current.sync().await? {
            StreamNode::Empty => return Ok(acc),
            StreamNode::Value(head, tail) => {
                acc = f(acc, head);
                current = tail;
            }
        }
    }
}
