pub mod error;
pub mod flight;
pub mod hotel;
pub mod repository;
pub mod reservation;
pub mod support;
pub mod user;
pub mod visa;

pub use error::{StoreError, StoreResult};
