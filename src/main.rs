//! # Page Server - Entry Point
//! src/main.rs
//!
//! Arranca el servidor y lo detiene al presionar ENTER.

use anyhow::{anyhow, Context};
use page_server::config::Config;
use page_server::server::Server;
use page_server::{logging, store};
use std::io::BufRead;

fn main() -> anyhow::Result<()> {
    let config = Config::new();
    config.validate().map_err(|e| anyhow!(e))?;

    logging::init(&config.log_level);
    config.print_summary();

    let pages = store::open(config.backend, &config.data_file)
        .with_context(|| format!("opening {} store", config.backend.as_str()))?;

    if config.demo_pages {
        let added = store::seed_demo_pages(pages.as_ref()).context("seeding demo pages")?;
        tracing::info!(added, "demo pages loaded");
    }

    let mut server = Server::new(config, pages);
    let addr = server
        .start()
        .context("starting server")?;

    println!("Servidor escuchando en http://{}", addr);
    println!("Pulsa ENTER para parar...");

    let mut line = String::new();
    let read = std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading stdin")?;

    // Sin stdin (ej: servicio en background) se queda corriendo
    if read == 0 {
        tracing::info!("stdin closed, running until killed");
        loop {
            std::thread::park();
        }
    }

    server.close();
    Ok(())
}
