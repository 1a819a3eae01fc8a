pub mod manager;
pub mod models;
pub mod payment;
pub mod rating;

pub use manager::{BookingError, BookingManager};
pub use models::{Booking, BookingStatus, ReportStatus, ReportType, RideReport};
pub use payment::{
    DriverPayout, PaymentError, PaymentStatus, PaymentTransaction, PlatformFee, SettlementSplit,
};
pub use rating::{Rating, RatingBook, RatingCriterion, RatingError};
