#![cfg(feature = "metrics")]

use anyhow::Result;
use ironspark::testing::*;
use ironspark::*;

#[test]
fn one_metric_per_step_with_lengths() -> Result<()> {
    let ds = from_vec(numbers_1_to_6(), parity_key)
        .map(|x| Ok(x * 2))
        .filter(|x| *x > 4)
        .reduce_by_key(count_reducer);

    let (out, metrics) = ds.evaluate_with_metrics()?;
    assert_collections_equal(&out, &ds.collect()?);

    assert_eq!(metrics.source_len, 6);
    assert_eq!(metrics.steps.len(), 3);
    let lens: Vec<(usize, usize)> = metrics
        .steps
        .iter()
        .map(|s| (s.input_len, s.output_len))
        .collect();
    // doubled: [2..12]; > 4 keeps [6, 8, 10, 12]; all even -> one group
    assert_eq!(lens, vec![(6, 6), (6, 4), (4, 1)]);
    assert_eq!(metrics.output_len(), 1);
    assert_eq!(metrics.steps_of(OperationKind::Filter), 1);
    assert_eq!(metrics.steps_of(OperationKind::Reduce), 0);
    Ok(())
}

#[test]
fn empty_chain_reports_source_length() -> Result<()> {
    let (out, metrics) = from_vec(numbers_1_to_6(), identity_key).evaluate_with_metrics()?;
    assert_eq!(out.len(), 6);
    assert!(metrics.steps.is_empty());
    assert_eq!(metrics.output_len(), 6);
    Ok(())
}

#[test]
fn json_export_has_every_step() -> Result<()> {
    let (_, metrics) = from_vec(numbers_1_to_6(), identity_key)
        .reduce(sum_reducer)
        .evaluate_with_metrics()?;

    let json = metrics.to_json();
    assert_eq!(json["source_len"], 6);
    assert_eq!(json["output_len"], 1);
    assert_eq!(json["steps"][0]["kind"], "reduce");
    assert_eq!(json["steps"][0]["input_len"], 6);
    assert!(metrics.to_string().contains("#0 reduce: 6 -> 1"));
    Ok(())
}

#[test]
fn failed_evaluation_yields_no_metrics() {
    let res = from_vec(numbers_1_to_6(), identity_key)
        .map(|_| Err(anyhow::anyhow!("nope")))
        .evaluate_with_metrics();
    assert!(matches!(res, Err(EvalError::Element { index: 0, .. })));
}
