// src/main.rs
use log::{error, info, warn};

use parcel_planner::config::AppConfig;
use parcel_planner::planner::ShipmentPlanner;

#[tokio::main]
async fn main() {
    let env_result = dotenvy::dotenv();

    let mut logger = env_logger::Builder::new();
    logger.filter_level(log::LevelFilter::Info);
    logger.parse_default_env();
    logger.init();

    if let Err(err) = env_result {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            warn!("⚠️ Could not load .env: {}", err);
        }
    }

    let app_config = AppConfig::from_env();

    let planner = match ShipmentPlanner::builtin() {
        Ok(planner) => planner,
        Err(err) => {
            error!("❌ Could not set up the planner: {}", err);
            std::process::exit(1);
        }
    };

    let optimizer = &app_config.optimizer;
    let planner = planner
        .with_packing_config(optimizer.packing_config())
        .with_strategy(optimizer.strategy())
        .with_parallel(optimizer.parallel())
        .with_weights(app_config.ranking.weights());

    info!("🚀 Parcel planner starting...");
    if let Err(err) = parcel_planner::api::start_api_server(app_config.api, planner).await {
        error!("❌ Server stopped: {}", err);
        std::process::exit(1);
    }
}
