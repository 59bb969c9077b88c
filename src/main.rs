use config::CONFIG;
use controller::create_router;

use cyder_tools::log::{info, LocalLogger};

mod config;
mod controller;
mod database;
mod generation;
mod schema;
mod service;
mod utils;

#[tokio::main]
async fn main() {
    LocalLogger::init(&CONFIG.log_level);
    let addr = format!("{}:{}", &CONFIG.host, CONFIG.port);
    info!("server start at {}", &addr);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, create_router().into_make_service())
        .await
        .expect("failed to start server");
}
