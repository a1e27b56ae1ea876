/// Persisted record definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
/// Timer repository trait and its backends.
pub mod timer_store;
