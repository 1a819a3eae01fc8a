use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::identity::{Profile, User};
use crate::search::{RideFilter, RidePage};
use triq_booking::{
    Booking, BookingStatus, DriverPayout, PaymentTransaction, PlatformFee, Rating, RideReport,
};
use triq_rides::{Ride, RideStatus, Vehicle};

type RepoResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Repository trait for user and profile access
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &User, profile: &Profile) -> RepoResult<Uuid>;

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    async fn get_profile(&self, user_id: Uuid) -> RepoResult<Option<Profile>>;

    async fn update_profile(&self, profile: &Profile) -> RepoResult<()>;

    /// Overwrite the rating aggregate after a new rating lands.
    async fn update_rating_aggregate(
        &self,
        user_id: Uuid,
        average: f64,
        count: i32,
    ) -> RepoResult<()>;
}

/// Repository trait for a driver's vehicles
#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn create_vehicle(&self, vehicle: &Vehicle) -> RepoResult<Uuid>;

    async fn get_vehicle(&self, id: Uuid) -> RepoResult<Option<Vehicle>>;

    async fn list_vehicles(&self, driver_id: Uuid) -> RepoResult<Vec<Vehicle>>;

    async fn update_vehicle(&self, vehicle: &Vehicle) -> RepoResult<()>;

    async fn delete_vehicle(&self, id: Uuid) -> RepoResult<()>;
}

/// Repository trait for ride data access
#[async_trait]
pub trait RideRepository: Send + Sync {
    async fn create_ride(&self, ride: &Ride) -> RepoResult<Uuid>;

    async fn get_ride(&self, id: Uuid) -> RepoResult<Option<Ride>>;

    /// Confirmed, not-yet-departed rides matching the filter, paginated.
    async fn search_rides(&self, filter: &RideFilter, today: NaiveDate) -> RepoResult<RidePage>;

    async fn list_by_driver(&self, driver_id: Uuid) -> RepoResult<Vec<Ride>>;

    async fn update_status(&self, id: Uuid, status: RideStatus) -> RepoResult<()>;

    async fn delete_ride(&self, id: Uuid) -> RepoResult<()>;

    /// Vehicles stay around while a future ride references them.
    async fn count_future_rides_for_vehicle(
        &self,
        vehicle_id: Uuid,
        today: NaiveDate,
    ) -> RepoResult<i64>;

    /// Sweep: complete confirmed/in-progress rides whose departure date has
    /// passed. Returns the affected ride ids.
    async fn complete_departed(&self, today: NaiveDate) -> RepoResult<Vec<Uuid>>;
}

/// Repository trait for booking data access. Seat arithmetic runs inside a
/// transaction with a row-level guard on the ride.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create_booking(&self, booking: &Booking) -> RepoResult<Uuid>;

    async fn get_booking(&self, id: Uuid) -> RepoResult<Option<Booking>>;

    async fn find_for_ride_and_passenger(
        &self,
        ride_id: Uuid,
        passenger_id: Uuid,
    ) -> RepoResult<Option<Booking>>;

    async fn list_by_passenger(&self, passenger_id: Uuid) -> RepoResult<Vec<Booking>>;

    async fn list_pending_for_driver(&self, driver_id: Uuid) -> RepoResult<Vec<Booking>>;

    /// Confirm a pending booking, decrementing the ride's seats. Returns the
    /// remaining availability, or None when the guard found too few seats.
    async fn confirm_booking(&self, id: Uuid) -> RepoResult<Option<i32>>;

    /// Cancel a pending or confirmed booking. A confirmed one releases its
    /// seats; the new availability is returned in that case.
    async fn cancel_booking(&self, id: Uuid, to: BookingStatus) -> RepoResult<Option<i32>>;

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> RepoResult<()>;

    /// Flip the remaining confirmed bookings of a ride to COMPLETED.
    async fn complete_for_ride(&self, ride_id: Uuid) -> RepoResult<u64>;
}

/// Repository trait for the payment handshake and its settlement rows
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create_payment(&self, payment: &PaymentTransaction) -> RepoResult<Uuid>;

    async fn get_by_booking(&self, booking_id: Uuid) -> RepoResult<Option<PaymentTransaction>>;

    async fn update_payment(&self, payment: &PaymentTransaction) -> RepoResult<()>;

    /// Persist a validated payment atomically: the payment row, both
    /// settlement rows, and the booking completion.
    async fn settle(
        &self,
        payment: &PaymentTransaction,
        payout: &DriverPayout,
        fee: &PlatformFee,
    ) -> RepoResult<()>;
}

/// Repository trait for ratings
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Insert a rating. Returns false when the (rater, ratee, ride,
    /// criterion) key already exists.
    async fn insert_rating(&self, rating: &Rating) -> RepoResult<bool>;

    async fn list_received(&self, user_id: Uuid) -> RepoResult<Vec<Rating>>;

    /// All scores a user has received, for the profile aggregate.
    async fn scores_for(&self, user_id: Uuid) -> RepoResult<Vec<i32>>;
}

/// Repository trait for ride incident reports
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn insert_report(&self, report: &RideReport) -> RepoResult<Uuid>;

    async fn list_made_by(&self, user_id: Uuid) -> RepoResult<Vec<RideReport>>;

    async fn list_received_by(&self, user_id: Uuid) -> RepoResult<Vec<RideReport>>;
}
