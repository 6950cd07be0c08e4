use mimalloc::MiMalloc;
use qrgen::config::Config;
use qrgen::db::sqlite;
use qrgen::router::{QrgenState, cookie_key, qrgen_router};
use qrgen::service::{AdminCredential, AuthGate, SessionStore};
use tokio::net::TcpListener;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const SESSION_PURGE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        listen_addr = %cfg.listen_addr,
        loglevel = %cfg.loglevel,
        default_table = %cfg.default_table,
        api_table = %cfg.api_table,
        insecure_offline_auth = cfg.insecure_offline_auth
    );

    // Startup aborts if the datastore is unreachable.
    let pool = sqlite::connect(&cfg.database_url).await?;
    sqlite::init_schema(&pool, &cfg.default_table, &cfg.api_table).await?;

    let credential = AdminCredential::from_config(&cfg)?;
    let sessions = SessionStore::new(cfg.session_ttl()?);
    spawn_session_purge(sessions.clone());

    let auth = AuthGate::new(credential, sessions);
    let key = cookie_key(cfg.session_secret.as_deref())?;
    let state = QrgenState::new(pool, auth, key, &cfg);
    let app = qrgen_router(state);

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

fn spawn_session_purge(sessions: SessionStore) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            tick.tick().await;
            let removed = sessions.purge_expired().await;
            if removed > 0 {
                debug!(removed, "purged expired admin sessions");
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
