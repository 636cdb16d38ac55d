/// Connection pool management and migrations
pub mod connection;
/// Row types and their queries
pub mod models;
/// The query surface the notification scheduler depends on
pub mod store;
