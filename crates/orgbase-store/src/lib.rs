//! Document-store contract and in-memory implementation
//!
//! The lifecycle manager only needs a small surface from the underlying
//! cluster: named units of loose JSON documents with create/drop, a handful
//! of CRUD operations, and declared unique indexes. `StorageDriver` is that
//! seam; `MemoryStore` backs the server and the test suite.

pub mod driver;
pub mod error;
pub mod memory;

pub use driver::{Document, StorageDriver};
pub use error::StoreError;
pub use memory::MemoryStore;
