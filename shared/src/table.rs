//! Table numbering
//!
//! Tables are numbered from 1 on the wire and in the UI, but stored at
//! 0-based indices locally. Every crossing between the two goes through
//! [`TableNumber`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Table numbering errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Table numbers start at 1
    #[error("Invalid table number: {0}")]
    InvalidNumber(i64),

    /// Index does not address one of the configured tables
    #[error("Table index {index} out of range (table count {count})")]
    OutOfRange { index: usize, count: usize },
}

/// 1-based table number as used by the order service
///
/// Deserializing goes through [`TableNumber::new`], so `0` and negative
/// numbers are rejected on the wire as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct TableNumber(u32);

impl TableNumber {
    /// Create from a raw 1-based number.
    pub fn new(number: i64) -> Result<Self, TableError> {
        u32::try_from(number)
            .ok()
            .filter(|n| *n >= 1)
            .map(Self)
            .ok_or(TableError::InvalidNumber(number))
    }

    /// Table number for a 0-based local index.
    pub fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }

    /// 0-based local index of this table.
    pub fn to_index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// Local index if this table exists among `count` tables.
    pub fn index_in(self, count: usize) -> Option<usize> {
        let index = self.to_index();
        (index < count).then_some(index)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for TableNumber {
    type Error = TableError;

    fn try_from(number: i64) -> Result<Self, Self::Error> {
        Self::new(number)
    }
}

impl From<TableNumber> for u32 {
    fn from(table: TableNumber) -> Self {
        table.0
    }
}

impl fmt::Display for TableNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
