pub mod cities;
pub mod pricing;
pub mod ride;
pub mod seats;

pub use pricing::{PricingEngine, PricingError, PricingSettings, Quote};
pub use ride::{Ride, RideError, RideStatus, Vehicle};
pub use seats::{SeatError, SeatLedger};
