pub mod adapters;
pub mod combinators;
pub mod error;
pub mod memo;
pub mod stream;

// Re-export the whole combinator surface at the crate root
pub use adapters::{
    from_iter, from_push_source, from_try_iter, into_futures_stream, unfold, with_push_source,
    PushSource, StreamSink, Subscription,
};
pub use combinators::{append, filter, map, merge, take};
pub use error::{StreamError, StreamResult};
pub use memo::Slot;
pub use stream::{bind_and_memo, collect, cons, emit, fold, for_each, nil, Stream, StreamNode};
