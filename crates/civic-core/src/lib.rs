pub mod error;
pub mod event_store;
pub mod events;
pub mod seed;

pub mod types;

pub use crate::error::CivicError;
pub use crate::event_store::EventStore;
pub use crate::events::EventRepository;
