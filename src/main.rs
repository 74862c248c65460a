use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use hearth::api::{self, AppContext};
use hearth::config::Config;
use hearth::id::SnowflakeGenerator;
use hearth::ingest::PhotoService;
use hearth::logging;
use hearth::object_store::ObjectStore;
use hearth::store::wishlist::WishlistStore;
use hearth::store::wool::WoolStore;
use hearth::store::Db;

fn parse_args() -> Option<PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("hearth {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    config_path
}

fn print_help() {
    println!(
        r#"hearth - personal home-management web backend

USAGE:
    hearth [OPTIONS]

OPTIONS:
    --config, -c PATH   Path to config file
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    HEARTH_CONFIG       Path to config file (overrides default location)
    HEARTH_LOG          Log level (trace, debug, info, warn, error)

The config file must contain a [duplicates] section with non-zero
max_distance and limit values; see the repository README for a template."#
    );
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = parse_args()
        .or_else(|| std::env::var("HEARTH_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?;

    std::fs::create_dir_all(&config.server.data_dir)
        .with_context(|| format!("could not create {}", config.server.data_dir.display()))?;
    logging::init(&config.server.data_dir)?;

    let db = Db::open(&config.database.path)?;
    db.initialize()?;

    let ids = Arc::new(SnowflakeGenerator::new(
        config.snowflake.node,
        config.snowflake.worker,
    ));
    let blobs = Arc::new(ObjectStore::from_config(&config.object_store));
    let photos = PhotoService::new(Arc::clone(&ids), db.photos(), blobs, config.duplicates);
    let wool = Arc::new(WoolStore::open(
        config.server.data_dir.join("woolcatalogue.json"),
    )?);
    let wishlist = Arc::new(WishlistStore::open(
        config.server.data_dir.join("wishlist.json"),
    )?);

    let ctx = AppContext {
        ids,
        photos,
        people: db.people(),
        wool,
        wishlist,
    };
    let app = api::router(ctx);

    let listener = tokio::net::TcpListener::bind(&config.server.listen)
        .await
        .with_context(|| format!("could not bind {}", config.server.listen))?;
    tracing::info!("listening on {}", config.server.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
