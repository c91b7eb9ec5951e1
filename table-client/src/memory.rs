//! In-memory order service
//!
//! Implements [`OrderApi`] over a shared map instead of the network, with
//! switches to make reads or writes fail. Clones share the same orders.

use crate::{ClientError, ClientResult, OrderApi};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared::{OrderSnapshot, TableNumber, TableOrderRecord};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, Default)]
struct Inner {
    orders: Mutex<BTreeMap<TableNumber, Vec<String>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderApi {
    inner: Arc<Inner>,
}

impl InMemoryOrderApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or overwrite a table's order directly, bypassing failure switches
    pub fn put(&self, table: TableNumber, items: Vec<String>) {
        self.inner.orders.lock().insert(table, items);
    }

    /// Order currently held for `table`
    pub fn orders(&self, table: TableNumber) -> Option<Vec<String>> {
        self.inner.orders.lock().get(&table).cloned()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of save/clear calls received, failed ones included
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    fn unavailable() -> ClientError {
        ClientError::Status {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            body: "order service unavailable".into(),
        }
    }

    fn begin_write(&self) -> ClientResult<()> {
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl OrderApi for InMemoryOrderApi {
    async fn fetch_orders(&self) -> ClientResult<OrderSnapshot> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(self
            .inner
            .orders
            .lock()
            .iter()
            .map(|(table, items)| TableOrderRecord::new(*table, items.clone()))
            .collect())
    }

    async fn save_order(&self, table: TableNumber, orders: &[String]) -> ClientResult<()> {
        self.begin_write()?;
        self.inner.orders.lock().insert(table, orders.to_vec());
        Ok(())
    }

    async fn clear_order(&self, table: TableNumber) -> ClientResult<()> {
        self.begin_write()?;
        self.inner.orders.lock().remove(&table);
        Ok(())
    }
}
