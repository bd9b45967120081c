pub mod inventory;
pub mod publisher;
pub mod scheduler;

pub use publisher::{BatchPublisher, PushDisposition};
pub use scheduler::{Scheduler, FILLER_ARTIFACT};
