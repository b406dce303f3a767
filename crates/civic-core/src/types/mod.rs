pub mod enums;
pub mod event;
pub mod ids;
pub mod io;

pub use enums::{Category, EventStatus};
pub use event::EventRecord;
pub use ids::{EventId, IdError};
pub use io::{CreateEventInput, EventFilter, EventSearch, UpdateEventInput};
