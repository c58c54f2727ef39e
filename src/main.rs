use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &vaxapi::config::CONFIG;

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
        loglevel = %cfg.loglevel
    );

    let storage = vaxapi::db::VaxStorage::connect(&cfg.database_url).await?;
    storage.init_schema().await?;

    if let Some(seed_path) = cfg.seed_path.as_ref() {
        match vaxapi::db::seed::load_seed_file(seed_path) {
            Ok(seeds) if !seeds.is_empty() => {
                let inserted = storage.seed_vaccines(&seeds).await?;
                info!(
                    path = %seed_path.display(),
                    parsed = seeds.len(),
                    inserted,
                    "vaccine catalog seeded"
                );
            }
            Ok(_) => {
                info!(path = %seed_path.display(), "no vaccine seed rows found");
            }
            Err(e) => {
                warn!(
                    path = %seed_path.display(),
                    error = %e,
                    "failed to load vaccine seed file"
                );
            }
        }
    }

    let state = vaxapi::router::VaxState::new(storage);
    let app = vaxapi::router::vax_router(state);

    let listener = TcpListener::bind(cfg.listen_addr.as_str()).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
