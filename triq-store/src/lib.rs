pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod events;
pub mod mailer;
pub mod payment_repo;
pub mod rating_repo;
pub mod redis_repo;
pub mod report_repo;
pub mod ride_repo;
pub mod user_repo;
pub mod vehicle_repo;

pub use database::DbClient;
pub use events::EventProducer;
pub use mailer::SmtpMailer;
pub use redis_repo::RedisClient;
