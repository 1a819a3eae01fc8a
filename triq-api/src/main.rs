use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use triq_api::{
    app,
    state::{AppState, AuthConfig},
    worker,
};
use triq_core::notifier::{Mailer, NoopMailer};
use triq_store::booking_repo::StoreBookingRepository;
use triq_store::payment_repo::StorePaymentRepository;
use triq_store::rating_repo::StoreRatingRepository;
use triq_store::report_repo::StoreReportRepository;
use triq_store::ride_repo::StoreRideRepository;
use triq_store::user_repo::StoreUserRepository;
use triq_store::vehicle_repo::StoreVehicleRepository;
use triq_store::SmtpMailer;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "triq_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = triq_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Triq API on port {}", config.server.port);

    // Postgres
    let db = triq_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");
    let db_arc = Arc::new(db);

    // Operator overrides layered onto the config defaults
    let business_rules = db_arc
        .fetch_business_rules(config.business_rules.clone())
        .await
        .expect("Failed to load business rules");

    // Redis
    let redis_client = triq_store::RedisClient::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");
    let redis_arc = Arc::new(redis_client);

    // Kafka
    let kafka_producer = triq_store::EventProducer::new(&config.kafka.brokers)
        .expect("Failed to create Kafka producer");
    let kafka_arc = Arc::new(kafka_producer);

    // Mail goes through SMTP when enabled, otherwise it is logged and dropped
    let mailer: Arc<dyn Mailer> = if config.email.enabled {
        Arc::new(SmtpMailer::new(&config.email).expect("Failed to build SMTP mailer"))
    } else {
        Arc::new(NoopMailer)
    };

    // SSE broadcast channel for seat availability
    let (seat_tx, _) = tokio::sync::broadcast::channel(100);

    let pool = db_arc.pool.clone();
    let app_state = AppState {
        db: db_arc,
        redis: redis_arc.clone(),
        kafka: kafka_arc,
        mailer,
        user_repo: Arc::new(StoreUserRepository::new(pool.clone())),
        vehicle_repo: Arc::new(StoreVehicleRepository::new(pool.clone())),
        ride_repo: Arc::new(StoreRideRepository::new(pool.clone())),
        booking_repo: Arc::new(StoreBookingRepository::new(pool.clone())),
        payment_repo: Arc::new(StorePaymentRepository::new(pool.clone())),
        rating_repo: Arc::new(StoreRatingRepository::new(pool.clone())),
        report_repo: Arc::new(StoreReportRepository::new(pool)),
        seat_tx,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        business_rules,
        admin_emails: config.email.admin_emails.clone(),
    };

    // Background workers: availability cache sync and the departure sweep
    tokio::spawn(worker::start_availability_worker(
        config.kafka.brokers.clone(),
        config.kafka.consumer_group.clone(),
        redis_arc,
    ));
    tokio::spawn(worker::start_completion_sweep(
        app_state.ride_repo.clone(),
        app_state.booking_repo.clone(),
        app_state.redis.clone(),
    ));

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
