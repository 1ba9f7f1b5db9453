// src/main.rs
mod api;
mod config;
mod expander;
mod geometry;
mod metrics;
mod model;
mod packer;
mod vehicles;

use config::AppConfig;

#[tokio::main]
async fn main() {
    if let Err(err) = dotenvy::dotenv() {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("⚠️ Could not load .env: {}", err);
        }
    }

    let app_config = AppConfig::from_env();
    let api_config = app_config.api.clone();
    let planner_config = app_config.planner.clone();

    println!("🚛 Load planning service starting...");
    api::start_api_server(api_config, planner_config).await;
}
