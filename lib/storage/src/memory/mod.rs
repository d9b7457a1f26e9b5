//! An in-memory quad store whose consuming queries remove what they return.
mod store;
mod transaction;

pub use store::MemoryQuadStore;
pub use transaction::StoreTransaction;
