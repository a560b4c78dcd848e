//! Fan-out transport for evaluated results.
//!
//! A [`Driver`] listens for TCP connections from workers and can broadcast any
//! serializable value to all of them as one line of JSON (newline-delimited frames).
//! It knows nothing about datasets; a caller typically evaluates a
//! [`KeyedDataset`](crate::KeyedDataset) and hands the result to [`Driver::broadcast`].
//!
//! ```no_run
//! use ironspark::*;
//! use ironspark::driver::Driver;
//!
//! # fn main() -> anyhow::Result<()> {
//! let driver = Driver::new("127.0.0.1:7077");
//! driver.start()?;
//!
//! let totals = from_vec(vec![1i64, 2, 3], |x: &i64| Ok(*x))
//!     .reduce(|xs| Ok(vec![xs.iter().sum()]));
//! driver.broadcast(&totals.collect()?)?;
//! driver.stop();
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised by the driver.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("driver is already started on {0}")]
    AlreadyStarted(SocketAddr),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode broadcast value: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid driver config: {0}")]
    Config(String),
}

fn default_address() -> String {
    "127.0.0.1:0".to_string()
}

fn default_nodelay() -> bool {
    true
}

/// Listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Address to bind. Port `0` picks a free port; see [`Driver::address`].
    #[serde(default = "default_address")]
    pub address: String,
    /// Disable Nagle's algorithm on worker connections.
    #[serde(default = "default_nodelay")]
    pub nodelay: bool,
    /// Per-worker write timeout. `None` blocks until the write completes.
    #[serde(default)]
    pub write_timeout_ms: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            nodelay: default_nodelay(),
            write_timeout_ms: None,
        }
    }
}

impl DriverConfig {
    /// Parse a config from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// If `json` is not a valid config object, or a write timeout of zero is given.
    pub fn from_json_str(json: &str) -> Result<Self, DriverError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|e| DriverError::Config(e.to_string()))?;
        if cfg.write_timeout_ms == Some(0) {
            return Err(DriverError::Config(
                "write_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(cfg)
    }

    fn write_timeout(&self) -> Option<Duration> {
        self.write_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Default)]
struct DriverState {
    local_addr: Option<SocketAddr>,
    accept_thread: Option<JoinHandle<()>>,
}

struct Shared {
    workers: Mutex<Vec<Arc<TcpStream>>>,
    shutting_down: AtomicBool,
}

impl Shared {
    fn workers(&self) -> MutexGuard<'_, Vec<Arc<TcpStream>>> {
        // A panic while holding the lock cannot leave the list half-updated.
        self.workers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Accepts worker connections and broadcasts values to them.
pub struct Driver {
    config: DriverConfig,
    state: Mutex<DriverState>,
    shared: Arc<Shared>,
}

impl Driver {
    /// A driver that will bind `address` when started.
    pub fn new(address: impl Into<String>) -> Self {
        Self::with_config(DriverConfig {
            address: address.into(),
            ..Default::default()
        })
    }

    #[must_use]
    pub fn with_config(config: DriverConfig) -> Self {
        Self {
            config,
            state: Mutex::new(DriverState::default()),
            shared: Arc::new(Shared {
                workers: Mutex::new(Vec::new()),
                shutting_down: AtomicBool::new(false),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, DriverState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Bind the listener and start accepting workers on a background thread.
    ///
    /// # Errors
    ///
    /// If the driver is already running or the address cannot be bound.
    pub fn start(&self) -> Result<(), DriverError> {
        let mut state = self.state();
        if let Some(addr) = state.local_addr {
            return Err(DriverError::AlreadyStarted(addr));
        }

        let listener = TcpListener::bind(&self.config.address)?;
        let local_addr = listener.local_addr()?;
        self.shared.shutting_down.store(false, Ordering::SeqCst);

        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();
        let handle = thread::Builder::new()
            .name("ironspark-driver-accept".to_string())
            .spawn(move || accept_loop(&listener, &shared, &config))?;

        state.local_addr = Some(local_addr);
        state.accept_thread = Some(handle);
        drop(state);

        info!(address = %local_addr, "driver started");
        Ok(())
    }

    /// The bound address once started, otherwise the configured one.
    #[must_use]
    pub fn address(&self) -> String {
        self.state()
            .local_addr
            .map_or_else(|| self.config.address.clone(), |a| a.to_string())
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.shared.workers().len()
    }

    /// Send `value` as one JSON line to every connected worker.
    ///
    /// Every worker is attempted even when an earlier write fails. A worker whose write
    /// fails is considered disconnected and is dropped from the registry, so later
    /// broadcasts only reach workers that are still connected. With no workers this is
    /// a no-op.
    ///
    /// `Value::Float` payloads must be finite; NaN and infinities fail to encode.
    ///
    /// # Errors
    ///
    /// An encoding failure, or the first write error encountered.
    pub fn broadcast<V: Serialize + ?Sized>(&self, value: &V) -> Result<(), DriverError> {
        let mut frame = serde_json::to_vec(value)?;
        frame.push(b'\n');

        // Write outside the lock so a slow worker cannot stall registration.
        let workers: Vec<Arc<TcpStream>> = self.shared.workers().clone();

        let mut first_err: Option<io::Error> = None;
        let mut dead: Vec<Arc<TcpStream>> = Vec::new();
        for w in &workers {
            if let Err(e) = (&**w).write_all(&frame) {
                warn!(
                    peer = ?w.peer_addr().ok(),
                    error = %e,
                    "broadcast write failed, dropping worker"
                );
                first_err.get_or_insert(e);
                dead.push(Arc::clone(w));
            }
        }
        debug!(workers = workers.len(), bytes = frame.len(), "broadcast sent");

        if !dead.is_empty() {
            for w in &dead {
                if let Err(e) = w.shutdown(Shutdown::Both) {
                    debug!(error = %e, "shutdown of failed worker");
                }
            }
            let mut registry = self.shared.workers();
            registry.retain(|w| !dead.iter().any(|d| Arc::ptr_eq(w, d)));
            info!(dropped = dead.len(), workers = registry.len(), "pruned disconnected workers");
        }

        first_err.map_or(Ok(()), |e| Err(DriverError::Io(e)))
    }

    /// Stop accepting, close every worker connection and forget them.
    ///
    /// Safe to call more than once.
    pub fn stop(&self) {
        let mut state = self.state();
        let Some(addr) = state.local_addr.take() else {
            return;
        };
        let handle = state.accept_thread.take();
        drop(state);

        self.shared.shutting_down.store(true, Ordering::SeqCst);
        // Unblock the pending accept(); the loop sees the flag and exits.
        if let Err(e) = TcpStream::connect(wake_address(addr)) {
            debug!(error = %e, "wake-up connection failed");
        }
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("driver accept thread panicked");
            }
        }

        let workers = std::mem::take(&mut *self.shared.workers());
        for w in &workers {
            if let Err(e) = w.shutdown(Shutdown::Both) {
                debug!(peer = ?w.peer_addr().ok(), error = %e, "worker shutdown failed");
            }
        }
        info!(address = %addr, closed = workers.len(), "driver stopped");
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Wildcard binds cannot be connected to directly; use loopback instead.
fn wake_address(addr: SocketAddr) -> SocketAddr {
    if addr.ip().is_unspecified() {
        let loopback: std::net::IpAddr = match addr {
            SocketAddr::V4(_) => std::net::Ipv4Addr::LOCALHOST.into(),
            SocketAddr::V6(_) => std::net::Ipv6Addr::LOCALHOST.into(),
        };
        SocketAddr::new(loopback, addr.port())
    } else {
        addr
    }
}

fn accept_loop(listener: &TcpListener, shared: &Shared, config: &DriverConfig) {
    for conn in listener.incoming() {
        if shared.shutting_down.load(Ordering::SeqCst) {
            break;
        }
        let stream = match conn {
            Ok(s) => s,
            Err(e) => {
                debug!(error = %e, "accept failed");
                continue;
            }
        };
        if let Err(e) = configure(&stream, config) {
            warn!(error = %e, "failed to configure worker connection");
        }
        let peer = stream.peer_addr().ok();
        let mut workers = shared.workers();
        workers.push(Arc::new(stream));
        info!(peer = ?peer, workers = workers.len(), "worker registered");
    }
}

fn configure(stream: &TcpStream, config: &DriverConfig) -> io::Result<()> {
    stream.set_nodelay(config.nodelay)?;
    stream.set_write_timeout(config.write_timeout())
}
