use axum::middleware::from_fn;
use axum::{routing::get, routing::post, routing::put, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use linkup_api::config;
use linkup_api::database::{self, DatabaseManager};
use linkup_api::handlers;
use linkup_api::middleware::{ensure_user_middleware, jwt_auth_middleware};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting LinkUp API in {:?} mode", config.environment);

    if let Err(e) = database::schema::migrate().await {
        tracing::error!("failed to prepare database schema: {}", e);
        std::process::exit(1);
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("LINKUP_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3001);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 LinkUp API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    let cors = if config::config().security.enable_cors {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    // Everything under /api resolves the identity first, then lazily
    // materializes the local user row.
    let protected = Router::new()
        .merge(auth_routes())
        .merge(events_routes())
        .merge(contacts_routes())
        .merge(lead_groups_routes())
        .merge(emails_routes())
        .merge(uploads_routes())
        .merge(stats_routes())
        .layer(from_fn(ensure_user_middleware))
        .layer(from_fn(jwt_auth_middleware));

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(protected)
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn auth_routes() -> Router {
    use handlers::auth;

    Router::new().route("/api/auth/profile", get(auth::profile))
}

fn events_routes() -> Router {
    use handlers::events;

    Router::new()
        .route("/api/events", get(events::list).post(events::create))
        .route(
            "/api/events/:id",
            get(events::get).put(events::update).delete(events::delete),
        )
}

fn contacts_routes() -> Router {
    use handlers::contacts;

    Router::new()
        .route("/api/contacts", get(contacts::list).post(contacts::create))
        .route("/api/contacts/search", get(contacts::search))
        .route(
            "/api/contacts/:id",
            get(contacts::get)
                .put(contacts::update)
                .delete(contacts::delete),
        )
        .route("/api/contacts/:id/verify", post(contacts::verify))
}

fn lead_groups_routes() -> Router {
    use handlers::lead_groups;

    Router::new()
        .route(
            "/api/lead-groups",
            get(lead_groups::list).post(lead_groups::create),
        )
        .route(
            "/api/lead-groups/:id",
            get(lead_groups::get)
                .put(lead_groups::update)
                .delete(lead_groups::delete),
        )
        .route(
            "/api/lead-groups/:id/contacts/:contactId",
            post(lead_groups::add_contact).delete(lead_groups::remove_contact),
        )
}

fn emails_routes() -> Router {
    use handlers::emails;

    Router::new()
        .route(
            "/api/emails/templates",
            get(emails::list_templates).post(emails::create_template),
        )
        .route(
            "/api/emails/templates/:id",
            get(emails::get_template)
                .put(emails::update_template)
                .delete(emails::delete_template),
        )
        .route(
            "/api/emails/drafts",
            get(emails::list_drafts).post(emails::create_draft),
        )
        .route(
            "/api/emails/drafts/:id",
            get(emails::get_draft)
                .put(emails::update_draft)
                .delete(emails::delete_draft),
        )
        .route("/api/emails/drafts/:id/status", post(emails::transition_draft))
        .route(
            "/api/emails/gmail",
            get(emails::get_connection)
                .post(emails::upsert_connection)
                .delete(emails::disconnect),
        )
}

fn uploads_routes() -> Router {
    use handlers::uploads;

    Router::new()
        .route(
            "/api/uploads/business-card",
            get(uploads::list).post(uploads::upload),
        )
        .route("/api/uploads/business-card/:id", get(uploads::get))
        .route("/api/uploads/business-card/:id/status", put(uploads::set_status))
        .route("/api/uploads/business-card/:id/verify", post(uploads::verify))
}

fn stats_routes() -> Router {
    use handlers::stats;

    Router::new()
        .route("/api/stats/daily", get(stats::daily))
        .route("/api/activity", get(stats::activity))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "data": {
            "name": "LinkUp API",
            "version": version,
            "description": "Networking contact manager backend built with Rust (Axum)",
            "endpoints": {
                "health": "/health (public)",
                "auth": "/api/auth/profile (protected)",
                "events": "/api/events[/:id] (protected)",
                "contacts": "/api/contacts[/:id], /api/contacts/search?q= (protected)",
                "lead_groups": "/api/lead-groups[/:id][/contacts/:contactId] (protected)",
                "emails": "/api/emails/templates[/:id], /api/emails/drafts[/:id], /api/emails/gmail (protected)",
                "uploads": "/api/uploads/business-card[/:id] (protected)",
                "stats": "/api/stats/daily, /api/activity (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "OK",
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "error": "database unavailable",
                "detail": e.to_string()
            })),
        ),
    }
}
