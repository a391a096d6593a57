use wayfare_core::flight::Flight;
use wayfare_core::hotel::Hotel;
use wayfare_core::reservation::ItemRef;

/// Capability an inventory item exposes to the booking engine: a capacity
/// counter and a cancellation policy. The engine is written once against
/// this trait; flights and hotels differ only in field shape and the
/// free-cancellation guard.
pub trait Bookable {
    fn item_ref(&self) -> ItemRef;

    /// Seats or rooms left. Advisory at read time; the store re-checks this
    /// atomically when the booking commits.
    fn capacity_remaining(&self) -> i32;

    /// Whether a held booking may be cancelled at all.
    fn supports_cancellation(&self) -> bool {
        true
    }
}

impl Bookable for Flight {
    fn item_ref(&self) -> ItemRef {
        ItemRef::Flight(self.id)
    }

    fn capacity_remaining(&self) -> i32 {
        self.seats_available
    }
}

impl Bookable for Hotel {
    fn item_ref(&self) -> ItemRef {
        ItemRef::Hotel(self.id)
    }

    fn capacity_remaining(&self) -> i32 {
        self.available_rooms
    }

    fn supports_cancellation(&self) -> bool {
        self.free_cancellation
    }
}
