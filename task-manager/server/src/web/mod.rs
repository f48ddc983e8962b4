use axum::Router;
use axum::http::header;
use axum::middleware::from_fn;
use axum::routing::get;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{self, Config};
use crate::task::TaskState;
use crate::task::api::{TaskJson, TaskPayload};
use crate::web::api::ErrorResponse;
use crate::web::middleware::https_redirect_middleware;

pub mod api;
pub mod middleware;

/// OpenAPI document for the JSON API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Task Manager",
        version = "1.0",
        description = "Create, list, update and delete tasks"
    ),
    paths(
        health_check_handler,
        crate::task::api::list_tasks_handler,
        crate::task::api::get_task_handler,
        crate::task::api::create_task_handler,
        crate::task::api::replace_task_handler,
        crate::task::api::delete_task_handler,
    ),
    components(schemas(TaskJson, TaskPayload, ErrorResponse)),
    tags(
        (name = "Tasks", description = "Task management endpoints"),
        (name = "Health", description = "Liveness probe")
    )
)]
pub struct ApiDoc;

/// Assembles the application router on top of an open database connection.
pub fn build_app(config: &Config, db: DatabaseConnection) -> Router {
    let task_state = Arc::new(TaskState { db: Arc::new(db) });

    let mut app = Router::new()
        .merge(api::create_api_router(task_state))
        .route("/health", get(health_check_handler));

    if config.swagger_enabled {
        app = app.merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
    }

    if config.force_https {
        app = app.layer(from_fn(https_redirect_middleware));
    }

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::new().expose_headers([header::LOCATION])),
    )
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: config::Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let db = Database::connect(&config.db_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    if config.swagger_enabled {
        tracing::info!("Swagger UI available at http://{}/swagger-ui", server_address);
    }

    let app = build_app(&config, db);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Handler for GET /health - Liveness probe.
#[tracing::instrument]
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "The server is up", body = String)),
    tag = "Health"
)]
pub async fn health_check_handler() -> &'static str {
    "OK"
}
