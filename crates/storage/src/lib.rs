pub mod conformance;
mod error;
mod memory;
mod record;
mod traits;

pub use error::StorageError;
pub use memory::{MemoryStore, StoreFixture};
pub use record::{BusinessRecord, ProfileRecord};
pub use traits::ProfileStore;
