//! Shared types for the table order board
//!
//! Wire types exchanged with the order service, the table number/index
//! translation, and the static menu.

pub mod menu;
pub mod order;
pub mod table;

// Re-exports
pub use menu::MENU;
pub use order::{OrderSnapshot, SaveOrderRequest, TableOrderRecord};
pub use serde::{Deserialize, Serialize};
pub use table::{TableError, TableNumber};
