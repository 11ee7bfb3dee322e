use memo_stream::*;
use tokio::runtime::Runtime;

#[test]
fn test_merge_preserves_order_within_each_source() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let merged = merge(from_iter(vec![1, 2, 3]), from_iter(vec![10, 20]));
        let out = collect(merged).await.unwrap();

        let mut sorted = out.clone();
        sorted.sort();
        assert_eq!(sorted, vec![1, 2, 3, 10, 20]);

        let pos = |v: i32| out.iter().position(|&x| x == v).unwrap();
        assert!(pos(1) < pos(2) && pos(2) < pos(3));
        assert!(pos(10) < pos(20));
    });
}

#[test]
fn test_merge_is_deterministic_once_resolved() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        // Which source wins the first race is unspecified, but the same merge
        // value must replay the identical sequence to every observer.
        let merged = merge(from_iter(vec![1, 2, 3]), from_iter(vec![10, 20]));
        let first = collect(merged.clone()).await.unwrap();
        for _ in 0..5 {
            assert_eq!(collect(merged.clone()).await.unwrap(), first);
        }
    });
}

#[test]
fn test_merge_with_empty_source() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let merged = merge(nil(), from_iter(vec![1, 2]));
        assert_eq!(collect(merged).await.unwrap(), vec![1, 2]);

        let both_empty = merge(nil::<i32>(), nil());
        assert_eq!(collect(both_empty).await.unwrap(), Vec::<i32>::new());
    });
}

#[tokio::test]
async fn test_merge_does_not_starve_either_infinite_source() {
    let left = unfold(0u64, |n| Some(((0u8, n), n + 1)));
    let right = unfold(0u64, |n| Some(((1u8, n), n + 1)));
    let prefix = collect(take(merge(left, right), 64)).await.unwrap();

    assert!(prefix.iter().any(|&(tag, _)| tag == 0));
    assert!(prefix.iter().any(|&(tag, _)| tag == 1));

    // Within each source the counters must still be strictly increasing.
    let mut last: [Option<u64>; 2] = [None, None];
    for (tag, n) in prefix {
        let slot = &mut last[tag as usize];
        assert!(slot.map_or(true, |previous| n > previous));
        *slot = Some(n);
    }
}

#[tokio::test]
async fn test_concurrent_consumers_see_identical_merged_prefix() {
    let left = unfold(0u64, |n| Some(((0u8, n), n + 1)));
    let right = unfold(0u64, |n| Some(((1u8, n), n + 1)));
    let prefix = take(merge(left, right), 10);

    let mut handles = Vec::new();
    for _ in 0..4 {
        let prefix = prefix.clone();
        handles.push(tokio::spawn(async move { collect(prefix).await.unwrap() }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }
    for pair in results.windows(2) {
        assert_eq!(pair[0], pair[1]);
    }
}

#[tokio::test]
async fn test_merge_propagates_failure() {
    // The right source never resolves, so the failing left attempt always
    // wins the race; the failure is cached and replayed.
    let (sink, pending) = StreamSink::<i32>::new();
    let failing: Stream<i32> = Stream::suspend(|| Err(StreamError::Custom("boom".into())));
    let merged = merge(failing, pending);

    let first = collect(merged.clone()).await.unwrap_err();
    let second = merged.sync().await.unwrap_err();
    assert_eq!(first, StreamError::Custom("boom".into()));
    assert_eq!(first, second);
    drop(sink);
}

#[tokio::test]
async fn test_merge_continues_after_one_source_ends() {
    let merged = merge(from_iter(vec![1]), from_iter(vec![10, 20, 30]));
    let out = collect(merged).await.unwrap();

    let mut sorted = out.clone();
    sorted.sort();
    assert_eq!(sorted, vec![1, 10, 20, 30]);

    let pos = |v: i32| out.iter().position(|&x| x == v).unwrap();
    assert!(pos(10) < pos(20) && pos(20) < pos(30));
}
