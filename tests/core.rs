use anyhow::Result;
use ironspark::testing::*;
use ironspark::*;

#[test]
fn end_to_end_map_filter_reduce_by_key_reduce() -> Result<()> {
    let data = from_vec(numbers_1_to_6(), identity_key);

    let doubled = data.map(|x| Ok(x * 2));
    assert_collections_equal(&doubled.collect()?, &[2, 4, 6, 8, 10, 12]);

    let big = doubled.filter(|x| *x > 4);
    assert_collections_equal(&big.collect()?, &[6, 8, 10, 12]);

    let counted = big.reduce_by_key(count_reducer);
    assert_collections_equal(&counted.collect()?, &[1, 1, 1, 1]);

    let total = counted.reduce(sum_reducer);
    assert_collections_equal(&total.collect()?, &[4]);
    Ok(())
}

#[test]
fn filter_then_map_preserves_order() -> Result<()> {
    let out = from_vec(numbers_1_to_6(), identity_key)
        .filter(|x| *x > 3)
        .map(|x| Ok(x * 2))
        .collect()?;
    assert_collections_equal(&out, &[8, 10, 12]);
    Ok(())
}

#[test]
fn operations_run_in_append_order() -> Result<()> {
    let data = from_vec(numbers_1_to_6(), identity_key);

    // (x * 2) + 1 on survivors of > 4
    let a = data
        .map(|x| Ok(x * 2))
        .filter(|x| *x > 4)
        .map(|x| Ok(x + 1))
        .collect()?;
    assert_collections_equal(&a, &[7, 9, 11, 13]);

    // Same operations, different order, different answer: nothing is reordered.
    let b = data
        .filter(|x| *x > 4)
        .map(|x| Ok(x * 2))
        .map(|x| Ok(x + 1))
        .collect()?;
    assert_collections_equal(&b, &[11, 13]);
    Ok(())
}

#[test]
fn empty_chain_returns_source_unchanged() -> Result<()> {
    let data = from_vec(vec![1i64, 2, 3], identity_key);
    let out = data.evaluate()?;
    assert_eq!(out, vec![1i64, 2, 3]);
    assert!(matches!(out, std::borrow::Cow::Borrowed(_)));
    assert!(std::ptr::eq(out.as_ptr(), data.source().as_ptr()));
    Ok(())
}

#[test]
fn empty_source_flows_through_every_operation() -> Result<()> {
    let out = from_vec(Vec::<i64>::new(), identity_key)
        .map(|x| Ok(x + 1))
        .filter(|_| true)
        .reduce_by_key(count_reducer)
        .collect()?;
    assert!(out.is_empty());
    Ok(())
}

#[test]
fn reduce_runs_once_even_on_empty_input() -> Result<()> {
    let out = from_vec(numbers_1_to_6(), identity_key)
        .filter(|_| false)
        .reduce(count_reducer)
        .collect()?;
    assert_collections_equal(&out, &[0]);
    Ok(())
}

#[test]
fn reduce_may_return_several_elements() -> Result<()> {
    let out = from_vec(numbers_1_to_6(), identity_key)
        .reduce(|xs| {
            let min = xs.iter().copied().min().unwrap_or_default();
            let max = xs.iter().copied().max().unwrap_or_default();
            Ok(vec![min, max])
        })
        .collect()?;
    assert_collections_equal(&out, &[1, 6]);
    Ok(())
}

#[test]
fn count_and_for_each_evaluate_the_chain() -> Result<()> {
    let ds = from_vec(numbers_1_to_6(), identity_key).filter(|x| x % 2 == 0);
    assert_eq!(ds.count()?, 3);

    let mut seen = Vec::new();
    ds.for_each(|x| {
        seen.push(*x);
        Ok(())
    })?;
    assert_collections_equal(&seen, &[2, 4, 6]);
    Ok(())
}

#[test]
fn for_each_stops_at_first_callback_error() {
    let ds = from_vec(numbers_1_to_6(), identity_key);
    let mut visited = 0;
    let res = ds.for_each(|x| {
        visited += 1;
        if *x == 2 {
            anyhow::bail!("stop at {x}");
        }
        Ok(())
    });
    assert!(res.is_err());
    assert_eq!(visited, 2);
}

#[test]
fn string_elements_with_string_keys() -> Result<()> {
    let words = vec!["apple", "avocado", "banana", "blueberry", "cherry"]
        .into_iter()
        .map(String::from)
        .collect::<Vec<_>>();

    let out = from_vec(words, |w: &String| Ok(w.chars().next().unwrap_or_default()))
        .map(|w| Ok(w.to_uppercase()))
        .reduce_by_key(|group| Ok(vec![group.join("+")]))
        .collect()?;

    assert_collections_equal(
        &out,
        &[
            "APPLE+AVOCADO".to_string(),
            "BANANA+BLUEBERRY".to_string(),
            "CHERRY".to_string(),
        ],
    );
    Ok(())
}
