//! Order wire types
//!
//! Shapes exchanged with the order service over HTTP and the push channel.

use crate::table::TableNumber;
use serde::{Deserialize, Serialize};

/// One table's order as reported by the service
///
/// `table_number` is kept raw so that a record for a table that does not
/// exist locally does not invalidate the whole snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOrderRecord {
    pub table_number: i64,
    #[serde(default)]
    pub orders: Vec<String>,
}

impl TableOrderRecord {
    pub fn new(table_number: TableNumber, orders: Vec<String>) -> Self {
        Self {
            table_number: table_number.get() as i64,
            orders,
        }
    }

    /// Local index of the record's table, if it is one of `count` tables.
    pub fn index_in(&self, count: usize) -> Option<usize> {
        TableNumber::new(self.table_number)
            .ok()
            .and_then(|n| n.index_in(count))
    }
}

/// Full snapshot: `GET /orders` response and push channel frame
pub type OrderSnapshot = Vec<TableOrderRecord>;

/// `POST /orders` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOrderRequest {
    #[serde(rename = "tableNumber")]
    pub table_number: TableNumber,
    pub orders: Vec<String>,
}
