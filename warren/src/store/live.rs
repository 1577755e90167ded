//! Live-query handles.
//!
//! A live query owns a background watcher task that pushes the full matching
//! result set into a `tokio::sync::watch` channel after every change. The
//! handle is the unit of resource lifetime: dropping or cancelling it aborts
//! the watcher, which is the only teardown discipline the crate requires.

use std::marker::PhantomData;

use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::types::Record;

use super::decode_documents;

/// Aborts the watcher task when dropped.
#[derive(Debug)]
pub struct WatchGuard {
    handle: JoinHandle<()>,
}

impl WatchGuard {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A raw live query over JSON documents.
#[derive(Debug)]
pub struct LiveQuery {
    rx: watch::Receiver<Vec<Value>>,
    _guard: WatchGuard,
}

impl LiveQuery {
    pub(crate) fn new(rx: watch::Receiver<Vec<Value>>, guard: WatchGuard) -> Self {
        Self { rx, _guard: guard }
    }

    /// The most recently delivered result set.
    pub fn snapshot(&self) -> Vec<Value> {
        self.rx.borrow().clone()
    }

    /// Wait for the next delivery. Returns `None` once the backend side of
    /// the subscription has gone away.
    pub async fn changed(&mut self) -> Option<Vec<Value>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Tear the subscription down. Equivalent to dropping the handle.
    pub fn cancel(self) {}
}

/// A typed live query. Documents that fail to decode are dropped from the
/// delivered set (with a log line) rather than poisoning the stream.
#[derive(Debug)]
pub struct Live<T> {
    inner: LiveQuery,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> Live<T> {
    pub(crate) fn new(inner: LiveQuery) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    pub fn snapshot(&self) -> Vec<T> {
        decode_documents(&self.inner.rx.borrow())
    }

    pub async fn changed(&mut self) -> Option<Vec<T>> {
        self.inner.rx.changed().await.ok()?;
        let raw = self.inner.rx.borrow_and_update().clone();
        Some(decode_documents(&raw))
    }

    pub fn cancel(self) {}
}
