pub mod engine;
pub mod inventory;
pub mod store;

pub use engine::{BookingEngine, BookingError};
pub use inventory::Bookable;
pub use store::{CommitOutcome, InventoryStore, ReservationEntry};
