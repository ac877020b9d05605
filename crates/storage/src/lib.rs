//! Storage abstraction and implementations for AgentOps.
//!
//! This crate provides the `DataStore` trait that request handlers and the
//! reporting service receive by injection, an in-memory implementation and a
//! JSON-file implementation.

#![warn(missing_docs)]

pub mod trait_;
pub mod memory;
pub mod json_storage;

pub use trait_::{DataStore, StorageError, Result};
pub use memory::MemoryStore;
pub use json_storage::JsonStore;
