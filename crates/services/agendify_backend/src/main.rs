// File: services/agendify_backend/src/main.rs
use agendify_booking::routes::routes as booking_routes;
use agendify_booking::{BookingSettings, BookingState};
use agendify_common::logging;
use agendify_common::{AgendifyError, Context};
use agendify_config::load_config;
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

mod service_factory;
use service_factory::AgendifyServices;

#[tokio::main]
async fn main() -> Result<(), AgendifyError> {
    let config = Arc::new(load_config().context("Failed to load config")?);
    // Dropping the guard stops the file writer, so it lives as long as main.
    let _log_guard = logging::init_with_config(config.logging.as_ref());

    let settings = BookingSettings::from_config(&config.booking)?;
    info!(
        "Booking settings: time zone {}, horizon {} day(s), {:?}, at most {} occurrence(s)",
        settings.time_zone,
        settings.horizon_days,
        settings.conflict_policy,
        settings.max_occurrences
    );

    let services = logging::log_result(
        AgendifyServices::from_config(&config, settings.time_zone),
        "Scheduling services ready",
        "Failed to set up scheduling services",
    )?;
    let state = Arc::new(BookingState::new(
        settings,
        services.store,
        services.side_effects,
    ));

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to Agendify API!" }))
        .merge(booking_routes(state));

    #[allow(unused_mut)] // mutated only with the openapi feature
    let mut app = Router::new().nest("/api", api_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use agendify_booking::doc::BookingApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Agendify API",
                version = "0.1.0",
                description = "Appointment scheduling: availability, conflicts and booking",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(BookingApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    let app = app.layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")?;
    Ok(())
}
