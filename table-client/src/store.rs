//! Table state store
//!
//! Committed, server-backed order state for every table. [`TableState`] is
//! the plain data; [`TableStore`] pairs it with an [`OrderApi`] and applies
//! the sync rules:
//!
//! - `load_all` and push updates replace the whole state from a snapshot
//! - `save_order` / `clear_order` touch one table, and only after the
//!   remote write succeeded
//! - failures leave the state exactly as it was

use crate::error::WriteOp;
use crate::{ClientError, ClientResult, OrderApi};
use shared::{OrderSnapshot, TableError, TableNumber, TableOrderRecord};
use tokio::sync::mpsc;

// ============================================================================
// Committed State
// ============================================================================

/// Order sequences for a fixed number of tables, indexed from 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    tables: Vec<Vec<String>>,
}

impl TableState {
    /// All tables empty
    pub fn new(count: usize) -> Self {
        Self {
            tables: vec![Vec::new(); count],
        }
    }

    /// Map a snapshot onto `count` tables.
    ///
    /// Records for unknown table numbers are skipped; tables without a record
    /// are empty. If a table appears twice, the first record wins.
    pub fn from_snapshot(snapshot: &[TableOrderRecord], count: usize) -> Self {
        let mut filled = vec![false; count];
        let mut state = Self::new(count);

        for record in snapshot {
            match record.index_in(count) {
                Some(index) if !filled[index] => {
                    state.tables[index] = record.orders.clone();
                    filled[index] = true;
                }
                Some(_) => {}
                None => {
                    tracing::debug!(
                        table = record.table_number,
                        "Ignoring snapshot record outside 1..={}",
                        count
                    );
                }
            }
        }
        state
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&[String]> {
        self.tables.get(index).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[String]> {
        self.tables.iter().map(Vec::as_slice)
    }

    /// Replace one table's order
    pub fn set(&mut self, index: usize, items: Vec<String>) -> Result<(), TableError> {
        let count = self.len();
        let slot = self
            .tables
            .get_mut(index)
            .ok_or(TableError::OutOfRange { index, count })?;
        *slot = items;
        Ok(())
    }

    /// Reset one table to empty
    pub fn clear(&mut self, index: usize) -> Result<(), TableError> {
        self.set(index, Vec::new())
    }

    fn check_index(&self, index: usize) -> Result<TableNumber, TableError> {
        if index < self.len() {
            Ok(TableNumber::from_index(index))
        } else {
            Err(TableError::OutOfRange {
                index,
                count: self.len(),
            })
        }
    }
}

// ============================================================================
// Write Outcomes
// ============================================================================

/// Result of a remote write, ready to be committed by [`TableStore::apply_write_outcome`]
#[derive(Debug)]
pub enum WriteOutcome {
    Saved { index: usize, items: Vec<String> },
    Cleared { index: usize },
    Failed {
        index: usize,
        op: WriteOp,
        error: ClientError,
    },
}

async fn perform_save<A: OrderApi>(api: &A, index: usize, items: Vec<String>) -> WriteOutcome {
    match api.save_order(TableNumber::from_index(index), &items).await {
        Ok(()) => WriteOutcome::Saved { index, items },
        Err(error) => WriteOutcome::Failed {
            index,
            op: WriteOp::Save,
            error,
        },
    }
}

async fn perform_clear<A: OrderApi>(api: &A, index: usize) -> WriteOutcome {
    match api.clear_order(TableNumber::from_index(index)).await {
        Ok(()) => WriteOutcome::Cleared { index },
        Err(error) => WriteOutcome::Failed {
            index,
            op: WriteOp::Clear,
            error,
        },
    }
}

// ============================================================================
// Store
// ============================================================================

/// Committed table state synchronized with the order service
#[derive(Debug)]
pub struct TableStore<A> {
    api: A,
    state: TableState,
}

impl<A> TableStore<A> {
    /// Create a store with `count` empty tables
    pub fn new(api: A, count: usize) -> Self {
        Self {
            api,
            state: TableState::new(count),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn table_count(&self) -> usize {
        self.state.len()
    }

    /// Committed order of one table
    pub fn table(&self, index: usize) -> Option<&[String]> {
        self.state.get(index)
    }
}

impl<A: OrderApi> TableStore<A> {
    /// Fetch the full snapshot and replace local state with it.
    ///
    /// On failure the previous state is kept and the error is returned.
    pub async fn load_all(&mut self) -> ClientResult<()> {
        match self.api.fetch_orders().await {
            Ok(snapshot) => {
                tracing::info!(records = snapshot.len(), "Fetched orders");
                self.replace(&snapshot);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error fetching orders: {}", e);
                Err(e)
            }
        }
    }

    /// Apply a snapshot received on the push channel.
    ///
    /// Anything other than a JSON array of table-order records is discarded
    /// and leaves the state untouched.
    pub fn apply_push_update(&mut self, payload: &str) -> ClientResult<()> {
        let value: serde_json::Value = serde_json::from_str(payload).map_err(|e| {
            tracing::error!("Error parsing push message: {}", e);
            ClientError::MalformedPush(e.to_string())
        })?;

        if !value.is_array() {
            tracing::error!("Push data is not an array: {}", value);
            return Err(ClientError::MalformedPush("expected a JSON array".into()));
        }

        let snapshot: OrderSnapshot = serde_json::from_value(value).map_err(|e| {
            tracing::error!("Push data is not a list of table orders: {}", e);
            ClientError::MalformedPush(e.to_string())
        })?;

        tracing::debug!(records = snapshot.len(), "Push update");
        self.replace(&snapshot);
        Ok(())
    }

    /// Send a table's order and commit it locally once the service accepts it
    pub async fn save_order(&mut self, index: usize, items: Vec<String>) -> ClientResult<()> {
        self.state.check_index(index)?;
        let outcome = perform_save(&self.api, index, items).await;
        self.apply_write_outcome(outcome)
    }

    /// Delete a table's order and clear it locally once the service accepts it
    pub async fn clear_order(&mut self, index: usize) -> ClientResult<()> {
        self.state.check_index(index)?;
        let outcome = perform_clear(&self.api, index).await;
        self.apply_write_outcome(outcome)
    }

    /// Commit a finished write.
    ///
    /// A failed write returns [`ClientError::WriteFailed`], whose message is
    /// meant for the user; the state is not touched.
    pub fn apply_write_outcome(&mut self, outcome: WriteOutcome) -> ClientResult<()> {
        match outcome {
            WriteOutcome::Saved { index, items } => {
                tracing::info!(table = %TableNumber::from_index(index), "Order saved: {:?}", items);
                self.state.set(index, items)?;
                Ok(())
            }
            WriteOutcome::Cleared { index } => {
                tracing::info!(table = %TableNumber::from_index(index), "Order cleared");
                self.state.clear(index)?;
                Ok(())
            }
            WriteOutcome::Failed { index, op, error } => {
                let table = TableNumber::from_index(index);
                tracing::error!(table = %table, "Order {} failed: {}", op, error);
                Err(ClientError::WriteFailed {
                    op,
                    table,
                    source: Box::new(error),
                })
            }
        }
    }

    fn replace(&mut self, snapshot: &[TableOrderRecord]) {
        self.state = TableState::from_snapshot(snapshot, self.state.len());
    }
}

impl<A: OrderApi + Clone + 'static> TableStore<A> {
    /// Run a save on a background task and report the outcome on `tx`.
    ///
    /// Local state changes only when the caller feeds the outcome back into
    /// [`apply_write_outcome`](Self::apply_write_outcome). Outcomes arriving
    /// after the receiver is gone are dropped.
    pub fn spawn_save(
        &self,
        index: usize,
        items: Vec<String>,
        tx: mpsc::Sender<WriteOutcome>,
    ) -> ClientResult<()> {
        self.state.check_index(index)?;
        let api = self.api.clone();
        tokio::spawn(async move {
            let outcome = perform_save(&api, index, items).await;
            if tx.send(outcome).await.is_err() {
                tracing::debug!("Dropping save outcome, receiver closed");
            }
        });
        Ok(())
    }

    /// Run a clear on a background task and report the outcome on `tx`
    pub fn spawn_clear(&self, index: usize, tx: mpsc::Sender<WriteOutcome>) -> ClientResult<()> {
        self.state.check_index(index)?;
        let api = self.api.clone();
        tokio::spawn(async move {
            let outcome = perform_clear(&api, index).await;
            if tx.send(outcome).await.is_err() {
                tracing::debug!("Dropping clear outcome, receiver closed");
            }
        });
        Ok(())
    }
}
