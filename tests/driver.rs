#![cfg(feature = "driver")]

use anyhow::{Context, Result};
use ironspark::testing::*;
use ironspark::*;
use std::io::{BufRead, BufReader, Read};
use std::net::TcpStream;
use std::thread;
use std::time::{Duration, Instant};

fn started_driver() -> Result<Driver> {
    let driver = Driver::new("127.0.0.1:0");
    driver.start()?;
    Ok(driver)
}

fn wait_for_workers(driver: &Driver, n: usize) -> Result<()> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while driver.worker_count() < n {
        anyhow::ensure!(Instant::now() < deadline, "workers never registered");
        thread::sleep(Duration::from_millis(10));
    }
    Ok(())
}

fn connect_worker(driver: &Driver) -> Result<BufReader<TcpStream>> {
    let stream = TcpStream::connect(driver.address()).context("worker connect")?;
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;
    Ok(BufReader::new(stream))
}

#[test]
fn address_before_start_is_the_configured_one() {
    let driver = Driver::new("127.0.0.1:0");
    assert_eq!(driver.address(), "127.0.0.1:0");
    assert_eq!(driver.worker_count(), 0);
}

#[test]
fn start_resolves_the_bound_port() -> Result<()> {
    let driver = started_driver()?;
    assert!(!driver.address().ends_with(":0"));
    driver.stop();
    Ok(())
}

#[test]
fn starting_twice_is_rejected() -> Result<()> {
    let driver = started_driver()?;
    assert!(matches!(driver.start(), Err(DriverError::AlreadyStarted(_))));
    Ok(())
}

#[test]
fn broadcast_without_workers_is_a_no_op() -> Result<()> {
    let driver = started_driver()?;
    driver.broadcast(&vec![1, 2, 3])?;
    Ok(())
}

#[test]
#[mark_flaky_tests::flaky]
fn every_worker_receives_the_evaluated_result() -> Result<()> {
    let driver = started_driver()?;
    let mut a = connect_worker(&driver)?;
    let mut b = connect_worker(&driver)?;
    wait_for_workers(&driver, 2)?;

    let result = from_vec(numbers_1_to_6(), parity_key)
        .reduce_by_key(sum_reducer)
        .collect()?;
    driver.broadcast(&result)?;

    for reader in [&mut a, &mut b] {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        let got: Vec<i64> = serde_json::from_str(&line)?;
        assert_eq!(got, vec![9, 12]);
    }
    Ok(())
}

#[test]
#[mark_flaky_tests::flaky]
fn frames_are_newline_delimited_values() -> Result<()> {
    let driver = started_driver()?;
    let mut worker = connect_worker(&driver)?;
    wait_for_workers(&driver, 1)?;

    driver.broadcast(&Value::from("first"))?;
    driver.broadcast(&vec![Value::from(1), Value::from(2.5)])?;

    let mut frames = Vec::new();
    for _ in 0..2 {
        let mut line = String::new();
        worker.read_line(&mut line)?;
        frames.push(serde_json::from_str::<Value>(&line)?);
    }
    assert_eq!(frames[0], Value::from("first"));
    assert_eq!(frames[1], Value::List(vec![Value::Int(1), Value::from(2.5)]));
    Ok(())
}

#[test]
#[mark_flaky_tests::flaky]
fn stop_closes_worker_connections() -> Result<()> {
    let driver = started_driver()?;
    let mut worker = connect_worker(&driver)?;
    wait_for_workers(&driver, 1)?;

    driver.stop();
    assert_eq!(driver.worker_count(), 0);

    let mut rest = Vec::new();
    let n = worker.read_to_end(&mut rest)?;
    assert_eq!(n, 0, "expected EOF after stop");

    // Idempotent.
    driver.stop();
    Ok(())
}

#[test]
#[mark_flaky_tests::flaky]
fn driver_can_restart_after_stop() -> Result<()> {
    let driver = started_driver()?;
    driver.stop();
    driver.start()?;
    let _worker = connect_worker(&driver)?;
    wait_for_workers(&driver, 1)?;
    Ok(())
}

#[test]
fn config_from_json_fills_defaults() -> Result<()> {
    let cfg = DriverConfig::from_json_str(r#"{"write_timeout_ms": 250}"#)?;
    assert_eq!(cfg.address, "127.0.0.1:0");
    assert!(cfg.nodelay);
    assert_eq!(cfg.write_timeout_ms, Some(250));
    Ok(())
}

#[test]
fn config_rejects_zero_timeout_and_bad_json() {
    assert!(matches!(
        DriverConfig::from_json_str(r#"{"write_timeout_ms": 0}"#),
        Err(DriverError::Config(_))
    ));
    assert!(matches!(
        DriverConfig::from_json_str("{\"address\": 7}"),
        Err(DriverError::Config(_))
    ));
}

#[test]
fn bind_failure_is_an_io_error() {
    let driver = Driver::new("not-an-address");
    assert!(matches!(driver.start(), Err(DriverError::Io(_))));
}

#[test]
#[mark_flaky_tests::flaky]
fn disconnected_workers_are_dropped_on_broadcast() -> Result<()> {
    let driver = started_driver()?;
    let mut live = connect_worker(&driver)?;
    let gone = connect_worker(&driver)?;
    wait_for_workers(&driver, 2)?;
    drop(gone);

    // The first write to a closed peer can still land in the kernel buffer; the
    // failure shows up on a following write.
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut sent = 0;
    while driver.worker_count() > 1 {
        anyhow::ensure!(Instant::now() < deadline, "dead worker never dropped");
        let _ = driver.broadcast(&sent);
        sent += 1;
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(driver.worker_count(), 1);

    // Once pruned, broadcasts succeed and still reach the live worker.
    driver.broadcast(&"after")?;
    let mut line = String::new();
    for _ in 0..=sent {
        line.clear();
        live.read_line(&mut line)?;
    }
    assert_eq!(serde_json::from_str::<String>(&line)?, "after");
    Ok(())
}

#[test]
fn non_finite_values_fail_to_encode() -> Result<()> {
    let driver = started_driver()?;
    assert!(matches!(
        driver.broadcast(&Value::from(f64::NAN)),
        Err(DriverError::Encode(_))
    ));
    Ok(())
}
