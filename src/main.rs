use log::{info, warn};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};

use gpio_bridge::config::ENV_CONFIG_PATH;
use gpio_bridge::{AppConfig, AppState, GpioManager};

const DEFAULT_CONFIG_PATH: &str = "config.json";

fn load_config() -> AppConfig {
    let explicit = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(ENV_CONFIG_PATH).ok());

    let mut config = match &explicit {
        Some(path) => AppConfig::load_from_file(path)
            .unwrap_or_else(|e| panic!("Failed to load config {path}: {e}")),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            AppConfig::load_from_file(DEFAULT_CONFIG_PATH)
                .unwrap_or_else(|e| panic!("Failed to load config: {e}"))
        }
        None => {
            warn!("No {DEFAULT_CONFIG_PATH} found, using built-in defaults");
            AppConfig::default()
        }
    };
    config
        .apply_env_overrides()
        .unwrap_or_else(|e| panic!("Invalid environment override: {e}"));
    config
}

fn remove_stale_socket(path: &str) -> std::io::Result<()> {
    if Path::new(path).exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = Arc::new(load_config());

    let manager = Arc::new(GpioManager::new(config.clone()));
    let kind = manager
        .initialize()
        .await
        .unwrap_or_else(|e| panic!("Failed to initialize GPIO: {e}"));
    let app_state = AppState {
        manager: manager.clone(),
    };

    let scope_path = config.http.path.clone();
    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .service(app_state.api_scope(&scope_path))
    });

    let mut bound = Vec::new();
    if let Some(socket_path) = &config.http.unix_socket {
        remove_stale_socket(socket_path)?;
        server = server.bind_uds(socket_path)?;
        bound.push(socket_path.as_str());
    }
    if let Some(host) = &config.http.host {
        server = server.bind(host)?;
        bound.push(host.as_str());
    }
    if bound.is_empty() {
        panic!("Config error: either 'unix_socket' or 'host' must be specified");
    }

    info!("Serving {kind} GPIO on {}...", bound.join(" and "));

    let result = server.run().await;

    info!("Server stopped, releasing GPIO");
    manager.shutdown().await;

    result
}
