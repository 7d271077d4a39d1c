use std::net::SocketAddr;

use axum::Router;
use formsg_core::config::SubmissionConfig;
use formsg_core::registry::FieldTypeRegistry;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod error;
mod extract;
mod middleware;
mod routes;
mod state;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FormSG Submission API",
        version = "0.1.0",
        description = "Validates email-mode form submissions and composes the email payloads."
    ),
    paths(
        routes::health::health_check,
        routes::field_types::list_field_types,
        routes::submissions::create_email_submission,
    ),
    components(schemas(
        HealthResponse,
        formsg_core::error::ApiError,
        formsg_core::fields::BasicField,
        formsg_core::fields::FieldDefinition,
        formsg_core::fields::ColumnDefinition,
        formsg_core::fields::ColumnType,
        formsg_core::fields::DateRule,
        formsg_core::fields::DateValidation,
        formsg_core::fields::LengthRule,
        formsg_core::fields::RatingOptions,
        formsg_core::fields::TextValidationOptions,
        formsg_core::responses::FieldResponse,
        formsg_core::responses::AnswerArray,
        formsg_core::responses::MyInfo,
        formsg_core::registry::FieldTypeInfo,
        formsg_core::email_data::EmailData,
        formsg_core::email_data::EmailJsonField,
        formsg_core::email_data::EmailAutoReplyField,
        formsg_core::email_data::EmailFormField,
        formsg_core::submission::SubmissionDigest,
        routes::field_types::FieldTypesResponse,
        routes::submissions::EmailSubmissionRequest,
        routes::submissions::EmailSubmissionResponse,
        routes::submissions::AttachmentSummary,
    ))
)]
struct ApiDoc;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "formsg_api=debug,formsg_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = SubmissionConfig::from_env();
    tracing::info!(
        timezone = %config.timezone,
        max_attachments_bytes = config.max_attachments_bytes,
        zip_max_depth = config.zip_max_depth,
        disallowed_extensions = config.disallowed_extensions.len(),
        "submission config loaded"
    );
    let app_state = state::AppState::new(FieldTypeRegistry::standard(), config);

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(routes::health::router())
        .merge(routes::field_types::router().layer(middleware::rate_limit::catalogue_layer()))
        .merge(routes::submissions::router().layer(middleware::rate_limit::submissions_layer()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(middleware::security_headers::apply))
                .layer(middleware::cors::build_cors_layer()),
        )
        .with_state(app_state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("FormSG submission API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server error");
}
