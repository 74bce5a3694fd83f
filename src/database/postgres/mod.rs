//! PostgreSQL adapters for the storage traits.

mod contact;
mod guestbook;
mod post;
mod stats;

pub use contact::PostgresContactStore;
pub use guestbook::PostgresGuestbookStore;
pub use post::PostgresPostStore;
pub use stats::PostgresStatsStore;
