//! SQLite backend for the GroupEats review store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. Live subscriptions are delivered
//! over an in-process broadcast channel: every successful write notifies
//! subscribers, which recompute and push a full snapshot.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{SqliteStore, SqliteSubscription};

#[cfg(test)]
mod tests;
