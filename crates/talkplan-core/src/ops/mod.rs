pub mod memory_store;
pub mod store;

pub use memory_store::{MemoryStore, SubmissionRecord};
pub use store::{ScheduleStore, SpeakerDirectory};
