use anyhow::Result;
use ironspark::testing::*;
use ironspark::*;
use std::thread;

#[test]
fn datasets_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<KeyedDataset<i64, i64>>();
    assert_send_sync::<KeyedDataset<Value, Value>>();
    assert_send_sync::<OperationChain<String, char>>();
}

#[test]
fn one_dataset_evaluated_from_many_threads() -> Result<()> {
    let calls = InvocationCounter::new();
    let seen = calls.clone();
    let ds = from_vec(numbers_1_to_6(), parity_key)
        .map(move |x| {
            seen.tick();
            Ok(x * x)
        })
        .reduce_by_key(sum_reducer);

    let results: Vec<Vec<i64>> = thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|_| s.spawn(|| ds.collect())).collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("evaluation thread panicked"))
            .collect::<EvalResult<_>>()
    })?;

    for out in &results {
        assert_collections_equal(out, &[35, 56]);
    }
    assert_eq!(calls.count(), 4 * 6);
    Ok(())
}

#[test]
fn siblings_built_on_other_threads_stay_independent() -> Result<()> {
    let base = from_vec(numbers_1_to_6(), identity_key).map(|x| Ok(x + 100));

    let (low, high) = thread::scope(|s| {
        let low = s.spawn(|| base.filter(|x| *x < 103));
        let high = s.spawn(|| base.filter(|x| *x > 104));
        (low.join(), high.join())
    });
    let low = low.expect("builder thread panicked");
    let high = high.expect("builder thread panicked");

    assert_collections_equal(&low.collect()?, &[101, 102]);
    assert_collections_equal(&high.collect()?, &[105, 106]);
    assert_eq!(base.chain().len(), 1);
    assert!(low.shares_source_with(&high));
    Ok(())
}
