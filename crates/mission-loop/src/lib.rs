pub mod aggregator;
pub mod observer;
pub mod slot;

pub use aggregator::{MissionOutcome, SessionAggregator, SharedSession};
pub use observer::{MissionObserver, MissionUpdate};
pub use slot::{MissionHandle, SessionSlot};
