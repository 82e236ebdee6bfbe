pub mod conformance;
mod error;
mod file;
mod memory;
mod overlay;
mod traits;
mod write_set;

pub use error::StateError;
pub use file::FileWorldState;
pub use memory::{MemoryIterator, MemoryWorldState};
pub use overlay::{OverlayIterator, TxWorldState};
pub use traits::{in_range, KeyValue, StateIterator, WorldState};
pub use write_set::{Write, WriteSet};
