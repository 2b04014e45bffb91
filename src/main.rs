use crate::config::ServerConfig;
use crate::session::SessionManager;
use crate::ws::accept_connection;
use anyhow::Context;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::net::TcpListener;

mod api;
mod client;
mod config;
mod error;
mod game;
mod session;
mod time;
mod ws;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::try_init().ok();

    let config = ServerConfig::from_env()?;
    let seed = config.seed.unwrap_or_else(rand::random);
    let manager: &'static SessionManager = Box::leak(Box::new(SessionManager::new(seed, config.lifetimes)));

    // Periodically evict finished and abandoned games
    let purge_interval = config.purge_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(purge_interval);
        loop {
            interval.tick().await;
            let evicted = manager.purge_games(Instant::now());
            if evicted > 0 {
                log::info!("Evicted {} games; {} remain", evicted, manager.num_games());
            }
        }
    });

    if let Some(api_port) = config.api_port {
        let addr = SocketAddr::new(config.bind_addr, api_port);
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("could not bind API to {addr}"))?;
        log::info!("API listening on: {:?}", addr);
        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, api::make_router(manager)).await {
                log::error!("API server stopped: {}", err);
            }
        });
    }

    let addr = SocketAddr::new(config.bind_addr, config.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind to {addr}"))?;
    log::info!("Listening on: {:?}", addr);

    while let Ok((stream, _)) = listener.accept().await {
        tokio::spawn(accept_connection(stream, manager));
    }

    Ok(())
}
