pub mod dashboards;
pub mod domain;
pub mod handlers;
pub mod shared;
pub mod system;
pub mod usecases;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use axum::http::{header, Method};
    use axum::middleware;
    use axum::{
        routing::{delete, get, post},
        Router,
    };
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tower_http::cors::{Any, CorsLayer};

    system::tracing::initialize()?;

    let config = shared::config::load_config()?;

    // Initialize database (path from config.toml)
    let db_path = shared::config::get_database_path(&config)?;
    shared::data::db::initialize_database(db_path.to_str())
        .await
        .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;

    system::initialization::ensure_admin_user_exists().await?;
    system::initialization::ensure_seed_catalog().await?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // SYSTEM AUTH ROUTES (PUBLIC)
        // ========================================
        .route(
            "/api/system/auth/login",
            post(system::handlers::auth::login),
        )
        .route(
            "/api/system/auth/register",
            post(system::handlers::auth::register),
        )
        .route(
            "/api/system/auth/refresh",
            post(system::handlers::auth::refresh),
        )
        .route(
            "/api/system/auth/logout",
            post(system::handlers::auth::logout),
        )
        .route(
            "/api/system/auth/me",
            get(system::handlers::auth::current_user)
                .layer(middleware::from_fn(system::auth::middleware::require_auth)),
        )
        // System users management (admin only)
        .route(
            "/api/system/users",
            get(system::handlers::users::list)
                .post(system::handlers::users::create)
                .layer(middleware::from_fn(system::auth::middleware::require_admin)),
        )
        .route(
            "/api/system/users/:id",
            get(system::handlers::users::get_by_id)
                .put(system::handlers::users::update)
                .delete(system::handlers::users::delete)
                .layer(middleware::from_fn(system::auth::middleware::require_admin)),
        )
        .route(
            "/api/system/users/:id/change-password",
            post(system::handlers::users::change_password)
                .layer(middleware::from_fn(system::auth::middleware::require_auth)),
        )
        // ========================================
        // CATALOG
        // ========================================
        .route("/api/categories", get(handlers::a001_category::list_all))
        .route(
            "/api/categories/manage",
            post(handlers::a001_category::upsert)
                .layer(middleware::from_fn(system::auth::middleware::require_admin)),
        )
        .route(
            "/api/categories/manage/:id",
            delete(handlers::a001_category::delete)
                .layer(middleware::from_fn(system::auth::middleware::require_admin)),
        )
        .route(
            "/api/categories/:id",
            get(handlers::a001_category::get_by_id),
        )
        .route("/api/events", get(handlers::a002_event::list))
        .route(
            "/api/events/overview",
            get(handlers::a002_event::overview)
                .layer(middleware::from_fn(system::auth::middleware::require_admin)),
        )
        .route(
            "/api/events/manage",
            post(handlers::a002_event::upsert).layer(middleware::from_fn(
                system::auth::middleware::require_organizer,
            )),
        )
        .route(
            "/api/events/manage/:id",
            delete(handlers::a002_event::delete).layer(middleware::from_fn(
                system::auth::middleware::require_organizer,
            )),
        )
        .route("/api/events/:id", get(handlers::a002_event::get_by_id))
        // ========================================
        // CART AND CHECKOUT
        // ========================================
        .route(
            "/api/cart",
            get(handlers::cart::get).delete(handlers::cart::clear),
        )
        .route(
            "/api/cart/items",
            post(handlers::cart::add_item).put(handlers::cart::update_quantity),
        )
        .route(
            "/api/cart/items/:event_id",
            delete(handlers::cart::remove_item),
        )
        .route("/api/checkout/confirm", post(handlers::u101_checkout::confirm))
        // ========================================
        // PURCHASES
        // ========================================
        .route(
            "/api/purchases/history",
            get(handlers::a003_purchase::history)
                .layer(middleware::from_fn(system::auth::middleware::require_auth)),
        )
        .route("/api/purchases/:id", get(handlers::a003_purchase::get_by_id))
        .route(
            "/api/purchases/:id/rating",
            post(handlers::a003_purchase::rate)
                .layer(middleware::from_fn(system::auth::middleware::require_auth)),
        )
        // ========================================
        // DASHBOARDS
        // ========================================
        .route(
            "/api/dashboard",
            get(handlers::d401_user_dashboard::dashboard)
                .layer(middleware::from_fn(system::auth::middleware::require_auth)),
        )
        .route(
            "/api/d400/analytics",
            get(handlers::d400_sales_analytics::analytics).layer(middleware::from_fn(
                system::auth::middleware::require_organizer,
            )),
        )
        .layer(middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server listening on http://{}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    config.server.port
                );
            } else {
                tracing::error!("Failed to bind to port {}. Error: {}", config.server.port, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
