use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const VALIDATION_CODE_LEN: usize = 6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Validated,
    Refunded,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Validated => "VALIDATED",
            PaymentStatus::Refunded => "REFUNDED",
            PaymentStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(PaymentStatus::Pending),
            "PAID" => Some(PaymentStatus::Paid),
            "VALIDATED" => Some(PaymentStatus::Validated),
            "REFUNDED" => Some(PaymentStatus::Refunded),
            "CANCELLED" => Some(PaymentStatus::Cancelled),
            _ => None,
        }
    }
}

/// One payment per booking. Settles through the code handshake: the
/// passenger receives the code by email and hands it to the driver after the
/// ride; the driver submits it to collect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount_cents: i32,
    pub status: PaymentStatus,
    pub validation_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How validated proceeds divide between the driver and the platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettlementSplit {
    pub driver_payout_cents: i32,
    pub platform_fee_cents: i32,
}

impl PaymentTransaction {
    pub fn new(booking_id: Uuid, amount_cents: i32) -> Result<Self, PaymentError> {
        if amount_cents <= 0 {
            return Err(PaymentError::InvalidAmount(amount_cents));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            booking_id,
            amount_cents,
            status: PaymentStatus::Pending,
            validation_code: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Issue a fresh numeric validation code. Re-initiating a pending payment
    /// rotates the code; anything past PAID keeps what it has.
    pub fn issue_code<R: Rng>(&mut self, rng: &mut R) -> Result<String, PaymentError> {
        if !matches!(self.status, PaymentStatus::Pending | PaymentStatus::Paid) {
            return Err(PaymentError::invalid_state("issue code", self.status));
        }
        let code = format!("{:06}", rng.gen_range(0..1_000_000u32));
        self.validation_code = Some(code.clone());
        self.updated_at = Utc::now();
        Ok(code)
    }

    /// Driver-side half of the handshake. On a code match the payment is
    /// validated and the proceeds split is returned; a wrong code changes
    /// nothing.
    pub fn validate(
        &mut self,
        code: &str,
        driver_share_percent: i32,
    ) -> Result<SettlementSplit, PaymentError> {
        if self.status == PaymentStatus::Validated {
            return Err(PaymentError::AlreadyValidated(self.id.to_string()));
        }
        if !matches!(self.status, PaymentStatus::Pending | PaymentStatus::Paid) {
            return Err(PaymentError::invalid_state("validate", self.status));
        }

        let expected = self
            .validation_code
            .as_deref()
            .ok_or(PaymentError::NoCodeIssued)?;
        if expected != code.trim() {
            return Err(PaymentError::CodeMismatch);
        }

        self.status = PaymentStatus::Validated;
        self.updated_at = Utc::now();
        Ok(split_amount(self.amount_cents, driver_share_percent))
    }
}

/// Driver share rounds half-up, platform keeps the remainder; the two always
/// sum to the amount.
pub fn split_amount(amount_cents: i32, driver_share_percent: i32) -> SettlementSplit {
    let driver = ((amount_cents as i64) * (driver_share_percent as i64) + 50) / 100;
    SettlementSplit {
        driver_payout_cents: driver as i32,
        platform_fee_cents: amount_cents - driver as i32,
    }
}

/// Settlement row owed to the driver after a validated payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverPayout {
    pub id: Uuid,
    pub payment_id: Uuid,
    pub driver_id: Uuid,
    pub amount_cents: i32,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
}

impl DriverPayout {
    pub fn new(payment_id: Uuid, driver_id: Uuid, amount_cents: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            payment_id,
            driver_id,
            amount_cents,
            is_paid: false,
            created_at: Utc::now(),
        }
    }
}

/// Commission row kept by the platform after a validated payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformFee {
    pub id: Uuid,
    pub payment_id: Uuid,
    pub amount_cents: i32,
    pub created_at: DateTime<Utc>,
}

impl PlatformFee {
    pub fn new(payment_id: Uuid, amount_cents: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            payment_id,
            amount_cents,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Invalid payment amount: {0}")]
    InvalidAmount(i32),

    #[error("Cannot {action} a payment in state {state}")]
    InvalidState { action: String, state: String },

    #[error("Payment already validated: {0}")]
    AlreadyValidated(String),

    #[error("No validation code has been issued")]
    NoCodeIssued,

    #[error("Validation code does not match")]
    CodeMismatch,
}

impl PaymentError {
    fn invalid_state(action: &str, state: PaymentStatus) -> Self {
        PaymentError::InvalidState {
            action: action.to_string(),
            state: state.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn payment(amount: i32) -> PaymentTransaction {
        PaymentTransaction::new(Uuid::new_v4(), amount).unwrap()
    }

    #[test]
    fn test_code_is_six_digits() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut p = payment(4350);
        let code = p.issue_code(&mut rng).unwrap();
        assert_eq!(code.len(), VALIDATION_CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(p.validation_code.as_deref(), Some(code.as_str()));
    }

    #[test]
    fn test_reinitiation_rotates_code() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut p = payment(4350);
        let first = p.issue_code(&mut rng).unwrap();
        let second = p.issue_code(&mut rng).unwrap();
        assert_ne!(first, second);
        assert!(p.validate(&first, 80).is_err());
        assert!(p.validate(&second, 80).is_ok());
    }

    #[test]
    fn test_handshake_validates_and_splits() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut p = payment(10000);
        let code = p.issue_code(&mut rng).unwrap();

        let split = p.validate(&code, 80).unwrap();
        assert_eq!(p.status, PaymentStatus::Validated);
        assert_eq!(split.driver_payout_cents, 8000);
        assert_eq!(split.platform_fee_cents, 2000);
    }

    #[test]
    fn test_wrong_code_changes_nothing() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut p = payment(10000);
        let code = p.issue_code(&mut rng).unwrap();
        let wrong = if code == "000000" { "000001" } else { "000000" };

        let err = p.validate(wrong, 80).unwrap_err();
        assert!(matches!(err, PaymentError::CodeMismatch));
        assert_eq!(p.status, PaymentStatus::Pending);
    }

    #[test]
    fn test_cannot_validate_twice() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut p = payment(10000);
        let code = p.issue_code(&mut rng).unwrap();
        p.validate(&code, 80).unwrap();

        let err = p.validate(&code, 80).unwrap_err();
        assert!(matches!(err, PaymentError::AlreadyValidated(_)));
    }

    #[test]
    fn test_validate_without_code() {
        let mut p = payment(10000);
        assert!(matches!(
            p.validate("123456", 80).unwrap_err(),
            PaymentError::NoCodeIssued
        ));
    }

    #[test]
    fn test_split_sums_to_amount_on_odd_values() {
        for amount in [1, 99, 101, 4350, 12345] {
            let split = split_amount(amount, 80);
            assert_eq!(split.driver_payout_cents + split.platform_fee_cents, amount);
        }
        // 4350 * 0.8 = 3480 exactly
        assert_eq!(split_amount(4350, 80).driver_payout_cents, 3480);
        // 101 * 0.8 = 80.8, rounds half-up to 81
        assert_eq!(split_amount(101, 80).driver_payout_cents, 81);
    }
}
