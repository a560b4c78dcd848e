//! Evaluate a dataset and broadcast the result to connected workers.
//!
//! Demonstrates:
//! - Loading a `DriverConfig` from JSON
//! - Starting a driver and attaching a worker
//! - Broadcasting an evaluated result as a JSON line
//! - Structured logging through `tracing`
//!
//! Run with: RUST_LOG=ironspark=debug cargo run --example broadcast_result

use anyhow::{Context, Result};
use ironspark::*;
use std::io::{BufRead, BufReader};
use std::net::TcpStream;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config =
        DriverConfig::from_json_str(r#"{"address": "127.0.0.1:0", "write_timeout_ms": 1000}"#)?;
    let driver = Driver::with_config(config);
    driver.start()?;

    let worker = TcpStream::connect(driver.address()).context("connecting worker")?;
    let reader = thread::spawn(move || -> Result<Vec<Value>> {
        let mut line = String::new();
        BufReader::new(worker).read_line(&mut line)?;
        Ok(serde_json::from_str(&line)?)
    });

    while driver.worker_count() == 0 {
        thread::sleep(Duration::from_millis(10));
    }

    // Average reading per sensor, as floats.
    let readings = vec![
        Value::List(vec![Value::from("a"), Value::from(3)]),
        Value::List(vec![Value::from("b"), Value::from(10)]),
        Value::List(vec![Value::from("a"), Value::from(5)]),
    ];
    let averages = from_vec(readings, |r: &Value| {
        let pair = r.as_list().context("reading must be a list")?;
        Ok(pair.first().cloned().unwrap_or(Value::Null))
    })
    .reduce_by_key(|group| {
        let mut total = 0.0;
        for r in group {
            let pair = r.as_list().context("reading must be a list")?;
            total += pair.get(1).context("missing value")?.try_float()?;
        }
        #[allow(clippy::cast_precision_loss)]
        let avg = total / group.len() as f64;
        let sensor = group[0].as_list().and_then(|p| p.first()).cloned().unwrap_or(Value::Null);
        Ok(vec![Value::List(vec![sensor, Value::from(avg)])])
    });

    driver.broadcast(&averages.collect()?)?;

    let received = reader
        .join()
        .map_err(|_| anyhow::anyhow!("worker thread panicked"))??;
    println!("worker received: {}", Value::List(received));

    driver.stop();
    Ok(())
}
