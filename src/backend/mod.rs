mod interface;
mod memory_store;
mod json_store;
mod overlay;

pub use interface::{WorldState, StateEntry, BackendError, Result};
pub use memory_store::MemoryStore;
pub use json_store::JsonStore;
pub use overlay::Overlay;
