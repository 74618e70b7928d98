//! Per binding instance storage of bound resources, the descriptor handles they are bound through and the state
//! tracking needed to transition them.

mod descriptor_heap;
mod resource_cache;
mod resource_state;

pub use descriptor_heap::*;
pub use resource_cache::*;
pub use resource_state::*;
