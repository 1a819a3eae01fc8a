use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::bookings::{confirmation_email_body, rejection_email_body};
use crate::payments::{code_email_body, payment_amount_cents, payout_email_body};
use crate::ratings::mask_rating;
use triq_booking::rating::{Rating, RatingCriterion};
use triq_rides::{PricingEngine, PricingSettings, Ride};

fn sample_ride() -> Ride {
    let engine = PricingEngine::new(PricingSettings::default()).unwrap();
    let quote = engine.quote_route("Casablanca", "Rabat").unwrap();
    Ride::new(
        Uuid::new_v4(),
        None,
        "Casablanca".to_string(),
        "Rabat".to_string(),
        NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
        NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
        quote,
        3,
        None,
    )
}

#[test]
fn test_payment_amount_is_price_times_seats() {
    assert_eq!(payment_amount_cents(4350, 3).unwrap(), 13050);
    assert_eq!(payment_amount_cents(2000, 1).unwrap(), 2000);
}

#[test]
fn test_payment_amount_overflow_rejected() {
    assert!(payment_amount_cents(i32::MAX, 2).is_err());
}

#[test]
fn test_code_email_carries_code_and_route() {
    let ride = sample_ride();
    let body = code_email_body(&ride, 13050, "042137");

    assert!(body.contains("042137"));
    assert!(body.contains("Casablanca -> Rabat"));
    assert!(body.contains("130.50 MAD"));
    assert!(body.contains("after the ride"));
}

#[test]
fn test_payout_email_shows_driver_share() {
    let ride = sample_ride();
    let body = payout_email_body(&ride, 10440);
    assert!(body.contains("104.40 MAD"));
}

#[test]
fn test_booking_emails_name_the_route() {
    let ride = sample_ride();
    assert!(confirmation_email_body(&ride).contains("confirmed"));
    assert!(rejection_email_body(&ride).contains("declined"));
    assert!(confirmation_email_body(&ride).contains("2025-06-14"));
}

#[test]
fn test_anonymous_rating_hides_rater() {
    let rating = Rating::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
        RatingCriterion::Driving,
        4,
        Some("Smooth ride".to_string()),
        true,
    )
    .unwrap();

    let masked = mask_rating(rating);
    assert!(masked.from_user_id.is_none());
    assert_eq!(masked.score, 4);

    let open = Rating::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
        RatingCriterion::Driving,
        4,
        None,
        false,
    )
    .unwrap();
    assert!(mask_rating(open).from_user_id.is_some());
}
