//! On-device persistence.
//!
//! Everything is stored as JSON text under a string key through
//! [`KeyValueStore`]; [`Database`] backs it with SQLite, [`MemoryStore`] keeps
//! it in process.

mod auth;
mod favorites;
mod kv;
mod schema;
mod types;

pub use auth::{AuthState, AuthStateStore, AUTH_KEY};
pub use favorites::{FavoritesStore, FAVORITES_KEY};
pub use kv::{KeyValueStore, MemoryStore};
pub use schema::Database;
pub use types::DatabaseError;
