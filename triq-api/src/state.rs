use std::sync::Arc;

use tokio::sync::broadcast;

use triq_core::notifier::Mailer;
use triq_core::repository::{
    BookingRepository, PaymentRepository, RatingRepository, ReportRepository, RideRepository,
    UserRepository, VehicleRepository,
};
use triq_rides::{PricingEngine, PricingError, PricingSettings};
use triq_shared::models::events::SeatAvailabilityEvent;
use triq_store::app_config::BusinessRules;
use triq_store::{DbClient, EventProducer, RedisClient};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbClient>,
    pub redis: Arc<RedisClient>,
    pub kafka: Arc<EventProducer>,
    pub mailer: Arc<dyn Mailer>,
    pub user_repo: Arc<dyn UserRepository>,
    pub vehicle_repo: Arc<dyn VehicleRepository>,
    pub ride_repo: Arc<dyn RideRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub payment_repo: Arc<dyn PaymentRepository>,
    pub rating_repo: Arc<dyn RatingRepository>,
    pub report_repo: Arc<dyn ReportRepository>,
    pub seat_tx: broadcast::Sender<SeatAvailabilityEvent>,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
    pub admin_emails: Vec<String>,
}

impl AppState {
    /// Pricing engine built from the active business rules.
    pub fn pricing(&self) -> Result<PricingEngine, PricingError> {
        PricingEngine::new(PricingSettings {
            price_per_km_cents: self.business_rules.price_per_km_cents,
            min_price_cents: self.business_rules.min_price_cents,
            driver_share_percent: self.business_rules.driver_share_percent,
            platform_share_percent: self.business_rules.platform_share_percent,
        })
    }
}
