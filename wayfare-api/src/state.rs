use std::sync::Arc;

use wayfare_booking::BookingEngine;
use wayfare_core::repository::{FlightStore, HotelStore, SupportStore, UserStore, VisaStore};
use wayfare_store::{PgFlightInventory, PgHotelInventory};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub flights: Arc<dyn FlightStore>,
    pub hotels: Arc<dyn HotelStore>,
    pub visas: Arc<dyn VisaStore>,
    pub support: Arc<dyn SupportStore>,
    pub flight_bookings: Arc<BookingEngine<PgFlightInventory>>,
    pub hotel_bookings: Arc<BookingEngine<PgHotelInventory>>,
    pub auth: AuthConfig,
}
