pub mod recency_list;
pub mod slot_arena;

pub use recency_list::{Iter as RecencyIter, RecencyList};
pub use slot_arena::{SlotArena, SlotId};
