use axum::extract::DefaultBodyLimit;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tour_booking_backend::{
    config::{self, Config},
    database::pool::create_pool,
    middleware::{cors, rate_limit},
    routes, AppState,
};
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    config::install_run_mode(config.run_mode);

    let pool = create_pool(&config).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database connected");

    let state = AppState::new(pool, &config)?;
    let limiter =
        rate_limit::new_limiter_state(config.rate_limit_max, config.rate_limit_window_secs);

    let app = routes::app(state)
        .layer(axum::middleware::from_fn_with_state(
            limiter,
            rate_limit::limit_middleware,
        ))
        .layer(cors::permissive_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(10 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server running on {} ({:?} mode)", addr, config.run_mode);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
