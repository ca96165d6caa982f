//! Scripted counter port for testing the polling state machine.
//!
//! The port and its [`PortHandle`] share an inbox. Tests push bytes through the
//! handle to simulate a response trickling in, and inspect what the session
//! wrote.

use super::port::CounterPort;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Inner {
    inbox: Vec<u8>,
    written: Vec<u8>,
    fail_writes: usize,
    fail_availability: usize,
    fail_reads: usize,
}

/// In-memory stand-in for the counter's serial port.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPort {
    inner: Arc<Mutex<Inner>>,
}

/// Test-side handle to a [`ScriptedPort`].
#[derive(Debug, Clone)]
pub struct PortHandle {
    inner: Arc<Mutex<Inner>>,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedPort {
    /// Create a port and the handle that drives it.
    pub fn new() -> (Self, PortHandle) {
        let port = Self::default();
        let handle = PortHandle {
            inner: port.inner.clone(),
        };
        (port, handle)
    }
}

impl PortHandle {
    /// Make `bytes` available for reading.
    pub fn deliver(&self, bytes: &[u8]) {
        lock(&self.inner).inbox.extend_from_slice(bytes);
    }

    /// Everything written to the port so far.
    pub fn written(&self) -> Vec<u8> {
        lock(&self.inner).written.clone()
    }

    /// Bytes still waiting to be read.
    pub fn pending(&self) -> usize {
        lock(&self.inner).inbox.len()
    }

    /// Fail the next `count` writes.
    pub fn fail_writes(&self, count: usize) {
        lock(&self.inner).fail_writes = count;
    }

    /// Fail the next `count` availability queries.
    pub fn fail_availability(&self, count: usize) {
        lock(&self.inner).fail_availability = count;
    }

    /// Fail the next `count` reads. Failed reads consume nothing.
    pub fn fail_reads(&self, count: usize) {
        lock(&self.inner).fail_reads = count;
    }
}

impl CounterPort for ScriptedPort {
    fn bytes_available(&mut self) -> io::Result<usize> {
        let mut inner = lock(&self.inner);
        if inner.fail_availability > 0 {
            inner.fail_availability -= 1;
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "port went away"));
        }
        Ok(inner.inbox.len())
    }

    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut inner = lock(&self.inner);
        if inner.fail_reads > 0 {
            inner.fail_reads -= 1;
            return Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out"));
        }
        let n = buf.len().min(inner.inbox.len());
        buf[..n].copy_from_slice(&inner.inbox[..n]);
        inner.inbox = inner.inbox.split_off(n);
        Ok(n)
    }

    fn write_request(&mut self, request: &[u8]) -> io::Result<()> {
        let mut inner = lock(&self.inner);
        if inner.fail_writes > 0 {
            inner.fail_writes -= 1;
            return Err(io::Error::new(io::ErrorKind::TimedOut, "write timed out"));
        }
        inner.written.extend_from_slice(request);
        Ok(())
    }
}
