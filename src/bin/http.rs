#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use health_records::{AppConfig, http_api, logging};

    let config = AppConfig::load()?;
    logging::init(&config.log_level)?;
    let addr: SocketAddr = config.http_addr.parse()?;

    #[cfg(feature = "sqlite")]
    let state = {
        let store = Arc::new(health_records::SqliteStore::new(&config.database_path)?);
        http_api::AppState::new(store.clone(), store)
    };
    #[cfg(not(feature = "sqlite"))]
    let state = http_api::AppState::new(
        Arc::new(health_records::MemoryStore::<health_records::HealthExamRecord>::new()),
        Arc::new(health_records::MemoryStore::<health_records::DeviceCalibration>::new()),
    );

    println!("health-records HTTP API listening on http://{addr}");
    http_api::serve(addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
