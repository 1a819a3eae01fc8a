use serde::{Deserialize, Serialize};

/// Seat accounting for a single ride. Invariants: `available` never goes
/// negative and never exceeds `capacity`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatLedger {
    capacity: i32,
    available: i32,
}

impl SeatLedger {
    pub fn new(capacity: i32) -> Result<Self, SeatError> {
        if capacity < 1 {
            return Err(SeatError::InvalidCapacity(capacity));
        }
        Ok(Self {
            capacity,
            available: capacity,
        })
    }

    /// Rebuild from persisted counts.
    pub fn from_parts(capacity: i32, available: i32) -> Result<Self, SeatError> {
        if capacity < 1 {
            return Err(SeatError::InvalidCapacity(capacity));
        }
        if available < 0 || available > capacity {
            return Err(SeatError::CorruptLedger {
                capacity,
                available,
            });
        }
        Ok(Self {
            capacity,
            available,
        })
    }

    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    pub fn available(&self) -> i32 {
        self.available
    }

    /// Take seats for an accepted booking. Fails when the request exceeds
    /// what is left; the ledger is untouched on failure.
    pub fn reserve(&mut self, seats: i32) -> Result<i32, SeatError> {
        if seats < 1 {
            return Err(SeatError::InvalidSeatCount(seats));
        }
        if seats > self.available {
            return Err(SeatError::NotEnoughSeats {
                requested: seats,
                available: self.available,
            });
        }
        self.available -= seats;
        Ok(self.available)
    }

    /// Give seats back after a confirmed booking is cancelled.
    pub fn release(&mut self, seats: i32) -> Result<i32, SeatError> {
        if seats < 1 {
            return Err(SeatError::InvalidSeatCount(seats));
        }
        if self.available + seats > self.capacity {
            return Err(SeatError::ExceedsCapacity {
                released: seats,
                available: self.available,
                capacity: self.capacity,
            });
        }
        self.available += seats;
        Ok(self.available)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeatError {
    #[error("Invalid capacity: {0}")]
    InvalidCapacity(i32),

    #[error("Invalid seat count: {0}")]
    InvalidSeatCount(i32),

    #[error("Not enough seats: requested {requested}, available {available}")]
    NotEnoughSeats { requested: i32, available: i32 },

    #[error("Release of {released} seats would exceed capacity ({available}/{capacity} free)")]
    ExceedsCapacity {
        released: i32,
        available: i32,
        capacity: i32,
    },

    #[error("Corrupt seat ledger: {available} available of {capacity}")]
    CorruptLedger { capacity: i32, available: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_release_cycle() {
        let mut ledger = SeatLedger::new(4).unwrap();

        assert_eq!(ledger.reserve(3).unwrap(), 1);
        assert_eq!(ledger.available(), 1);

        assert_eq!(ledger.release(3).unwrap(), 4);
        assert_eq!(ledger.available(), 4);
    }

    #[test]
    fn test_never_goes_negative() {
        let mut ledger = SeatLedger::new(2).unwrap();
        ledger.reserve(2).unwrap();

        let err = ledger.reserve(1).unwrap_err();
        assert!(matches!(
            err,
            SeatError::NotEnoughSeats {
                requested: 1,
                available: 0
            }
        ));
        assert_eq!(ledger.available(), 0);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut ledger = SeatLedger::new(3).unwrap();
        ledger.reserve(1).unwrap();

        assert!(ledger.release(2).is_err());
        assert_eq!(ledger.available(), 2);
    }

    #[test]
    fn test_rejects_corrupt_persisted_counts() {
        assert!(SeatLedger::from_parts(4, 5).is_err());
        assert!(SeatLedger::from_parts(4, -1).is_err());
        assert!(SeatLedger::from_parts(0, 0).is_err());
    }

    #[test]
    fn test_zero_seat_operations_rejected() {
        let mut ledger = SeatLedger::new(4).unwrap();
        assert!(ledger.reserve(0).is_err());
        assert!(ledger.release(-2).is_err());
    }
}
