pub mod conformance;
mod error;
mod memory;
mod record;
mod traits;

pub use error::StorageError;
pub use memory::MemoryFormStore;
pub use record::FormSubmission;
pub use traits::FormStore;
