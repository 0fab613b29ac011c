pub mod event_store;
pub use event_store::{EventStore, StoreError};
pub mod memory_store;
pub use memory_store::InMemoryEventStore;
pub mod punch_repo;
pub use punch_repo::PgEventStore;
#[cfg(test)]
pub mod test_support;
