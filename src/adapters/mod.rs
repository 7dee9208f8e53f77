// Adapters layer: concrete implementations of the domain ports for the local
// filesystem and PostgreSQL.

pub mod postgres;
pub mod storage;
