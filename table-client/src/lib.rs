//! Table Client - order service client and board state
//!
//! - [`OrderApi`] / [`NetworkOrderApi`]: HTTP calls to the order service
//! - [`PushSubscription`]: WebSocket snapshot feed
//! - [`TableStore`]: committed per-table orders
//! - [`TableCard`]: per-table transient selection

pub mod card;
pub mod config;
pub mod error;
pub mod http;
#[cfg(any(test, feature = "in-memory"))]
pub mod memory;
pub mod push;
pub mod store;

pub use card::{CardIntent, DialogState, TableCard};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, WriteOp};
pub use http::{NetworkOrderApi, OrderApi};
#[cfg(any(test, feature = "in-memory"))]
pub use memory::InMemoryOrderApi;
pub use push::PushSubscription;
pub use store::{TableState, TableStore, WriteOutcome};

// Re-export shared types for convenience
pub use shared::{MENU, OrderSnapshot, TableNumber, TableOrderRecord};
