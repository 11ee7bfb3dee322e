//! Stream combinators: map, filter, append, merge, take
//!
//! Combinators are data transformations, not task spawns. Each derived stream
//! is memoized uniformly, so repeated synchronization of any result (merge
//! included) always yields the identical sequence.

use futures::future::{select, BoxFuture, Either};
use futures::FutureExt;

use crate::error::StreamResult;
use crate::stream::{bind_and_memo, Stream, StreamNode};

/// Transform every element of a stream. Lazy: nothing is forced until the
/// result is synchronized, one node per synchronization.
pub fn map<T, U, F>(s: Stream<T>, f: F) -> Stream<U>
where
    T: Clone + Send + Sync + 'static,
    U: Clone + Send + Sync + 'static,
    F: FnMut(T) -> U + Send + 'static,
{
    bind_and_memo(s, move |node| async move {
        match node {
            StreamNode::Empty => Ok(StreamNode::Empty),
            StreamNode::Value(head, tail) => {
                let mut f = f;
                let mapped = f(head);
                Ok(StreamNode::Value(mapped, map(tail, f)))
            }
        }
    })
}

/// Keep only elements satisfying `predicate`.
///
/// Non-matching nodes are skipped by walking their tails, so finding the k-th
/// match costs up to k internal synchronizations. The skip is unbounded: over
/// a source with no further matches that never terminates, synchronizing the
/// result suspends indefinitely. No step budget is imposed.
pub fn filter<T, P>(s: Stream<T>, predicate: P) -> Stream<T>
where
    T: Clone + Send + Sync + 'static,
    P: FnMut(&T) -> bool + Send + 'static,
{
    Stream::from_future(async move {
        let mut predicate = predicate;
        let mut current = s;
        loop {
            match current.sync().await? {
                StreamNode::Empty => return Ok(StreamNode::Empty),
                StreamNode::Value(head, tail) => {
                    if predicate(&head) {
                        return Ok(StreamNode::Value(head, filter(tail, predicate)));
                    }
                    current = tail;
                }
            }
        }
    })
}

/// Concatenate two streams.
///
/// When `ls` runs out the result continues with `rs`'s own nodes directly, so
/// reaching the boundary is an O(1) handoff with no per-node wrapping of the
/// right side. Introduces no non-determinism of its own.
pub fn append<T>(ls: Stream<T>, rs: Stream<T>) -> Stream<T>
where
    T: Clone + Send + Sync + 'static,
{
    bind_and_memo(ls, move |node| async move {
        match node {
            StreamNode::Empty => rs.sync().await,
            StreamNode::Value(head, tail) => Ok(StreamNode::Value(head, append(tail, rs))),
        }
    })
}

/// One asymmetric merge attempt: drain `first`'s next node, falling through to
/// `second` when `first` ends. The recursive call swaps the argument order so
/// no fixed priority can starve one source.
fn merge_step<T>(first: Stream<T>, second: Stream<T>) -> BoxFuture<'static, StreamResult<StreamNode<T>>>
where
    T: Clone + Send + Sync + 'static,
{
    async move {
        match first.sync().await? {
            StreamNode::Empty => second.sync().await,
            StreamNode::Value(head, tail) => Ok(StreamNode::Value(head, merge(second, tail))),
        }
    }
    .boxed()
}

/// Interleave two streams in order of availability.
///
/// Races the two swapped `merge_step` attempts and commits to whichever
/// resolves first; the loser is dropped without externally visible effect,
/// since all it ever did was wait on shared memoized nodes. The race outcome
/// is memoized, so it resolves at most once: every observer of the same merge
/// value sees the same head, no matter how often or how concurrently it is
/// synchronized.
///
/// Within one source, relative order is preserved exactly. Across sources only
/// "available first, observed first" plus the alternating tie-break is
/// guaranteed.
pub fn merge<T>(ls: Stream<T>, rs: Stream<T>) -> Stream<T>
where
    T: Clone + Send + Sync + 'static,
{
    let left = merge_step(ls.clone(), rs.clone());
    let right = merge_step(rs, ls);
    Stream::from_future(async move {
        match select(left, right).await {
            Either::Left((node, _)) => node,
            Either::Right((node, _)) => node,
        }
    })
}

/// Truncate a stream to at most `n` elements.
pub fn take<T>(s: Stream<T>, n: usize) -> Stream<T>
where
    T: Clone + Send + Sync + 'static,
{
    Stream::from_future(async move {
        if n == 0 {
            return Ok(StreamNode::Empty);
        }
        match s.sync().await? {
            StreamNode::Empty => Ok(StreamNode::Empty),
            StreamNode::Value(head, tail) => Ok(StreamNode::Value(head, take(tail, n - 1))),
        }
    })
}
