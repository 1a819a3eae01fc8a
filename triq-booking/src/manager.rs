use triq_rides::seats::{SeatError, SeatLedger};

use crate::models::{Booking, BookingStatus};

/// Guards booking state transitions and keeps the seat ledger in step.
/// Persistence happens in the repository layer; this owns the rules.
pub struct BookingManager;

impl BookingManager {
    pub fn new() -> Self {
        Self
    }

    /// Driver accepts a pending request. The seat count is re-checked against
    /// the ledger at approval time; on success the seats are taken and the
    /// new availability is returned.
    pub fn confirm(
        &self,
        booking: &mut Booking,
        seats: &mut SeatLedger,
    ) -> Result<i32, BookingError> {
        self.expect_status(booking, BookingStatus::Pending, BookingStatus::Confirmed)?;

        let remaining = seats.reserve(booking.seats)?;
        booking.update_status(BookingStatus::Confirmed);
        Ok(remaining)
    }

    /// Driver declines a pending request. Seats were never taken.
    pub fn reject(&self, booking: &mut Booking) -> Result<(), BookingError> {
        self.expect_status(booking, BookingStatus::Pending, BookingStatus::Rejected)?;
        booking.update_status(BookingStatus::Rejected);
        Ok(())
    }

    /// Passenger backs out. A confirmed booking gives its seats back; the new
    /// availability is returned in that case.
    pub fn cancel_by_passenger(
        &self,
        booking: &mut Booking,
        seats: &mut SeatLedger,
    ) -> Result<Option<i32>, BookingError> {
        self.cancel(booking, seats, BookingStatus::CancelledByPassenger)
    }

    /// Driver cancels on the passenger, e.g. when the whole ride is scrapped.
    pub fn cancel_by_driver(
        &self,
        booking: &mut Booking,
        seats: &mut SeatLedger,
    ) -> Result<Option<i32>, BookingError> {
        self.cancel(booking, seats, BookingStatus::CancelledByDriver)
    }

    /// Transition: Confirmed -> Completed. Happens when the payment validates
    /// or when the ride itself completes.
    pub fn complete(&self, booking: &mut Booking) -> Result<(), BookingError> {
        self.expect_status(booking, BookingStatus::Confirmed, BookingStatus::Completed)?;
        booking.update_status(BookingStatus::Completed);
        Ok(())
    }

    fn cancel(
        &self,
        booking: &mut Booking,
        seats: &mut SeatLedger,
        to: BookingStatus,
    ) -> Result<Option<i32>, BookingError> {
        match booking.status {
            BookingStatus::Pending => {
                booking.update_status(to);
                Ok(None)
            }
            BookingStatus::Confirmed => {
                let remaining = seats.release(booking.seats)?;
                booking.update_status(to);
                Ok(Some(remaining))
            }
            other => Err(BookingError::invalid_transition(other, to)),
        }
    }

    fn expect_status(
        &self,
        booking: &Booking,
        expected: BookingStatus,
        target: BookingStatus,
    ) -> Result<(), BookingError> {
        if booking.status != expected {
            return Err(BookingError::invalid_transition(booking.status, target));
        }
        Ok(())
    }
}

impl Default for BookingManager {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Booking not found: {0}")]
    NotFound(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error(transparent)]
    Seats(#[from] SeatError),
}

impl BookingError {
    fn invalid_transition(from: BookingStatus, to: BookingStatus) -> Self {
        BookingError::InvalidTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn pending_booking(seats: i32) -> Booking {
        Booking::new(Uuid::new_v4(), Uuid::new_v4(), seats, None)
    }

    #[test]
    fn test_confirm_takes_seats() {
        let manager = BookingManager::new();
        let mut ledger = SeatLedger::new(4).unwrap();
        let mut booking = pending_booking(3);

        let remaining = manager.confirm(&mut booking, &mut ledger).unwrap();
        assert_eq!(remaining, 1);
        assert_eq!(booking.status, BookingStatus::Confirmed);
    }

    #[test]
    fn test_confirm_rechecks_availability() {
        let manager = BookingManager::new();
        let mut ledger = SeatLedger::new(2).unwrap();

        let mut first = pending_booking(2);
        manager.confirm(&mut first, &mut ledger).unwrap();

        // Request was made while seats were free, approval comes too late.
        let mut second = pending_booking(1);
        let err = manager.confirm(&mut second, &mut ledger).unwrap_err();
        assert!(matches!(
            err,
            BookingError::Seats(SeatError::NotEnoughSeats { .. })
        ));
        assert_eq!(second.status, BookingStatus::Pending);
        assert_eq!(ledger.available(), 0);
    }

    #[test]
    fn test_reject_leaves_ledger_alone() {
        let manager = BookingManager::new();
        let mut ledger = SeatLedger::new(4).unwrap();
        let mut booking = pending_booking(2);

        manager.reject(&mut booking).unwrap();
        assert_eq!(booking.status, BookingStatus::Rejected);
        assert_eq!(ledger.available(), 4);
    }

    #[test]
    fn test_cancel_confirmed_restores_seats() {
        let manager = BookingManager::new();
        let mut ledger = SeatLedger::new(4).unwrap();
        let mut booking = pending_booking(3);

        manager.confirm(&mut booking, &mut ledger).unwrap();
        let restored = manager
            .cancel_by_passenger(&mut booking, &mut ledger)
            .unwrap();

        assert_eq!(restored, Some(4));
        assert_eq!(booking.status, BookingStatus::CancelledByPassenger);
    }

    #[test]
    fn test_cancel_pending_restores_nothing() {
        let manager = BookingManager::new();
        let mut ledger = SeatLedger::new(4).unwrap();
        let mut booking = pending_booking(3);

        let restored = manager
            .cancel_by_passenger(&mut booking, &mut ledger)
            .unwrap();

        assert_eq!(restored, None);
        assert_eq!(ledger.available(), 4);
    }

    #[test]
    fn test_double_treatment_rejected() {
        let manager = BookingManager::new();
        let mut ledger = SeatLedger::new(4).unwrap();
        let mut booking = pending_booking(1);

        manager.confirm(&mut booking, &mut ledger).unwrap();
        assert!(manager.reject(&mut booking).is_err());
        assert!(manager.confirm(&mut booking, &mut ledger).is_err());
        // No double decrement
        assert_eq!(ledger.available(), 3);
    }

    #[test]
    fn test_complete_requires_confirmed() {
        let manager = BookingManager::new();
        let mut booking = pending_booking(1);
        assert!(manager.complete(&mut booking).is_err());

        let mut ledger = SeatLedger::new(2).unwrap();
        manager.confirm(&mut booking, &mut ledger).unwrap();
        manager.complete(&mut booking).unwrap();
        assert_eq!(booking.status, BookingStatus::Completed);
    }
}
