use std::sync::Arc;

use chrono::Utc;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use tokio::time::{interval, Duration};
use tracing::{error, info};

use triq_core::repository::{BookingRepository, RideRepository};
use triq_shared::models::events::{BookingCancelledEvent, BookingConfirmedEvent};
use triq_store::events::{TOPIC_BOOKING_CANCELLED, TOPIC_BOOKING_CONFIRMED};
use triq_store::RedisClient;

/// Keeps the Redis seat-availability cache in step with the booking stream.
/// A cache miss is fine: the decrement is skipped and the next search or
/// publish re-seeds the key from the database.
pub async fn start_availability_worker(brokers: String, group_id: String, redis: Arc<RedisClient>) {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", &brokers)
        .set("group.id", &group_id)
        .set("enable.auto.commit", "true")
        .set("auto.offset.reset", "earliest")
        .create()
        .expect("Consumer creation failed");

    consumer
        .subscribe(&[TOPIC_BOOKING_CONFIRMED, TOPIC_BOOKING_CANCELLED])
        .expect("Can't subscribe");

    info!("Availability worker started, listening to booking events...");

    loop {
        match consumer.recv().await {
            Err(e) => error!("Kafka error: {}", e),
            Ok(m) => {
                let Some(Ok(payload)) = m.payload_view::<str>() else {
                    continue;
                };

                match m.topic() {
                    TOPIC_BOOKING_CONFIRMED => {
                        match serde_json::from_str::<BookingConfirmedEvent>(payload) {
                            Ok(event) => {
                                apply_delta(&redis, &event.ride_id.to_string(), event.seats as i64)
                                    .await;
                            }
                            Err(e) => error!("Malformed booking.confirmed payload: {}", e),
                        }
                    }
                    TOPIC_BOOKING_CANCELLED => {
                        match serde_json::from_str::<BookingCancelledEvent>(payload) {
                            Ok(event) => {
                                // A negative delta puts the released seats back.
                                apply_delta(
                                    &redis,
                                    &event.ride_id.to_string(),
                                    -(event.seats_released as i64),
                                )
                                .await;
                            }
                            Err(e) => error!("Malformed booking.cancelled payload: {}", e),
                        }
                    }
                    other => error!("Unexpected topic: {}", other),
                }
            }
        }
    }
}

async fn apply_delta(redis: &RedisClient, ride_id: &str, seats: i64) {
    match redis.decr_ride_availability(ride_id, seats).await {
        Ok(Some(new_val)) => {
            info!("Availability for ride {} now {}", ride_id, new_val);
        }
        Ok(None) => {
            info!(
                "Cache miss for ride {}, skipping delta (re-seeded on next read)",
                ride_id
            );
        }
        Err(e) => {
            error!("Failed to adjust availability for ride {}: {}", ride_id, e);
        }
    }
}

/// Hourly sweep: rides whose departure date has passed are completed, their
/// remaining confirmed bookings flipped along with them.
pub async fn start_completion_sweep(
    ride_repo: Arc<dyn RideRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    redis: Arc<RedisClient>,
) {
    let mut ticker = interval(Duration::from_secs(3600));

    loop {
        ticker.tick().await;
        let today = Utc::now().date_naive();

        let ride_ids = match ride_repo.complete_departed(today).await {
            Ok(ids) => ids,
            Err(e) => {
                error!("Completion sweep failed: {}", e);
                continue;
            }
        };

        for ride_id in ride_ids {
            match booking_repo.complete_for_ride(ride_id).await {
                Ok(count) => {
                    info!("Swept ride {}: {} bookings completed", ride_id, count);
                }
                Err(e) => error!("Failed to complete bookings for ride {}: {}", ride_id, e),
            }
            let _ = redis.delete_ride_availability(&ride_id.to_string()).await;
        }
    }
}
