use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::flight::{CabinClass, Flight};
use crate::hotel::Hotel;
use crate::support::SupportTicket;
use crate::user::{Role, User};
use crate::visa::{VisaApplication, VisaStatus};

/// Sort direction for price-ordered listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceOrder {
    LowToHigh,
    HighToLow,
}

/// Repository trait for user records
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: &User) -> StoreResult<()>;
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn email_exists(&self, email: &str) -> StoreResult<bool>;
    async fn update(&self, user: &User) -> StoreResult<()>;
    async fn delete(&self, id: Uuid) -> StoreResult<()>;
    async fn list(&self) -> StoreResult<Vec<User>>;
    async fn list_by_role(&self, role: Role) -> StoreResult<Vec<User>>;
}

/// Repository trait for flight records
#[async_trait]
pub trait FlightStore: Send + Sync {
    async fn create(&self, flight: &Flight) -> StoreResult<()>;
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Flight>>;
    async fn update(&self, flight: &Flight) -> StoreResult<()>;
    async fn delete(&self, id: Uuid) -> StoreResult<()>;
    async fn list(&self) -> StoreResult<Vec<Flight>>;
    async fn list_by_city(&self, city: &str) -> StoreResult<Vec<Flight>>;
    async fn list_by_departure_date(&self, date: NaiveDate) -> StoreResult<Vec<Flight>>;
    async fn list_by_class(&self, class: CabinClass) -> StoreResult<Vec<Flight>>;
    async fn list_direct(&self, direct: bool) -> StoreResult<Vec<Flight>>;
    async fn list_sorted_by_price(&self, order: PriceOrder) -> StoreResult<Vec<Flight>>;
    /// Flights the user currently holds an active booking on.
    async fn list_booked_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Flight>>;
}

/// Repository trait for hotel records
#[async_trait]
pub trait HotelStore: Send + Sync {
    async fn create(&self, hotel: &Hotel) -> StoreResult<()>;
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Hotel>>;
    async fn update(&self, hotel: &Hotel) -> StoreResult<()>;
    async fn delete(&self, id: Uuid) -> StoreResult<()>;
    async fn list(&self) -> StoreResult<Vec<Hotel>>;
    async fn list_by_city(&self, city: &str) -> StoreResult<Vec<Hotel>>;
    async fn list_by_check_in(&self, date: NaiveDate) -> StoreResult<Vec<Hotel>>;
    async fn list_by_check_out(&self, date: NaiveDate) -> StoreResult<Vec<Hotel>>;
    async fn list_free_cancellation(&self, free: bool) -> StoreResult<Vec<Hotel>>;
    async fn list_sorted_by_price(&self, order: PriceOrder) -> StoreResult<Vec<Hotel>>;
    /// Hotels the user currently holds an active booking at.
    async fn list_booked_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Hotel>>;
}

/// Repository trait for visa applications
#[async_trait]
pub trait VisaStore: Send + Sync {
    async fn create(&self, visa: &VisaApplication) -> StoreResult<()>;
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<VisaApplication>>;
    async fn update(&self, visa: &VisaApplication) -> StoreResult<()>;
    async fn delete(&self, id: Uuid) -> StoreResult<()>;
    async fn list(&self) -> StoreResult<Vec<VisaApplication>>;
    async fn list_by_user(&self, user_id: Uuid) -> StoreResult<Vec<VisaApplication>>;
    async fn list_by_status(&self, status: VisaStatus) -> StoreResult<Vec<VisaApplication>>;
    async fn list_by_destination(&self, destination: &str) -> StoreResult<Vec<VisaApplication>>;
}

/// Repository trait for support tickets
#[async_trait]
pub trait SupportStore: Send + Sync {
    async fn create(&self, ticket: &SupportTicket) -> StoreResult<()>;
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<SupportTicket>>;
    async fn update(&self, ticket: &SupportTicket) -> StoreResult<()>;
    async fn delete(&self, id: Uuid) -> StoreResult<()>;
    async fn list(&self) -> StoreResult<Vec<SupportTicket>>;
    async fn list_by_user(&self, user_id: Uuid) -> StoreResult<Vec<SupportTicket>>;
}
