//!
//! Sports-venue reservation and settlement service.
//! Reads configuration from TOML file (~/.config/courtbook/config.toml).

use std::sync::Arc;

use tracing::{error, info};

use courtbook::api::AppState;
use courtbook::application::services::{
    start_booking_expiry_task, BookingService, PaymentOrchestrator, RefundService,
    SlotAvailabilityResolver, VoucherValidator,
};
use courtbook::domain::{DepositPolicy, Slot, Venue, Voucher, VoucherKind};
use courtbook::infrastructure::{InMemoryStorage, PaymentGateway, SandboxGateway, Storage};
use courtbook::shared::shutdown::{listen_for_shutdown_signals, ShutdownSignal};
use courtbook::{create_api_router, default_config_path, AppConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("COURTBOOK_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting Courtbook reservation service...");

    // ── Prometheus metrics recorder (must be installed before any metrics calls) ──
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    info!("📊 Prometheus metrics recorder installed");

    // ── Storage ────────────────────────────────────────────────
    let memory = Arc::new(InMemoryStorage::new());
    if app_cfg.seed.demo_data {
        seed_demo_data(&memory).await;
    }
    let storage: Arc<dyn Storage> = memory;

    // ── Services ───────────────────────────────────────────────
    let availability = Arc::new(SlotAvailabilityResolver::new(storage.clone()));
    let bookings = Arc::new(BookingService::new(storage.clone()));
    let vouchers = Arc::new(VoucherValidator::new(storage.clone()));
    let gateway: Arc<dyn PaymentGateway> =
        Arc::new(SandboxGateway::new(app_cfg.payment.gateway_base_url.clone()));
    let payments = Arc::new(PaymentOrchestrator::new(
        storage.clone(),
        bookings.clone(),
        vouchers.clone(),
        gateway,
    ));
    let refunds = Arc::new(RefundService::new(storage.clone(), bookings.clone()));

    // ── Shutdown handling ──────────────────────────────────────
    let shutdown = ShutdownSignal::new();
    tokio::spawn(listen_for_shutdown_signals(shutdown.clone()));

    // ── Background expiry sweep ────────────────────────────────
    start_booking_expiry_task(
        storage.clone(),
        bookings.clone(),
        shutdown.clone(),
        app_cfg.payment.expiry_check_interval_secs,
        app_cfg.payment.pending_expiry_minutes,
    );

    // ── REST API server ────────────────────────────────────────
    let state = AppState {
        availability,
        bookings,
        payments,
        refunds,
        vouchers,
    };
    let router = create_api_router(state, prometheus_handle);

    let api_addr = app_cfg.server.address();
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("REST API server listening on http://{}", api_addr);
    info!("Swagger UI available at http://{}/docs/", api_addr);

    let api_shutdown = shutdown.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        })
        .await?;

    info!("👋 Courtbook shutdown complete");
    Ok(())
}

/// Seed a demo venue with one day of hourly slots and a couple of
/// vouchers, for local exploration via Swagger.
async fn seed_demo_data(storage: &Arc<InMemoryStorage>) {
    use chrono::{Duration, NaiveTime, Utc};

    info!("Seeding demo data...");

    let venue = Venue::new(
        "demo-arena",
        "Demo Arena",
        "owner-demo",
        20000,
        DepositPolicy::Percentage(30),
    );
    let date = Utc::now().date_naive() + Duration::days(2);

    for hour in venue.open_hour..venue.close_hour {
        let slot = Slot::new(
            format!("demo-arena-{}-{:02}", date, hour),
            venue.id.clone(),
            date,
            NaiveTime::from_hms_opt(u32::from(hour), 0, 0).unwrap(),
            NaiveTime::from_hms_opt(u32::from(hour) + 1, 0, 0).unwrap(),
            venue.hourly_price,
            10,
        );
        if let Err(e) = storage.save_slot(slot).await {
            error!("Failed to seed slot: {}", e);
        }
    }
    if let Err(e) = storage.save_venue(venue).await {
        error!("Failed to seed venue: {}", e);
    }

    storage.add_voucher(Voucher {
        code: "WELCOME10".to_string(),
        kind: VoucherKind::Percentage,
        value: 10,
        valid_from: None,
        valid_until: None,
        min_amount: None,
        per_user_limit: Some(1),
        max_uses: None,
    });
    storage.add_voucher(Voucher {
        code: "FULLCOURT".to_string(),
        kind: VoucherKind::Fixed,
        value: 20000,
        valid_from: None,
        valid_until: None,
        min_amount: None,
        per_user_limit: None,
        max_uses: Some(5),
    });

    info!("Demo data seeded: venue 'demo-arena' on {}", date);
}
