//! # Configuración del Servidor
//! src/config.rs
//!
//! Argumentos CLI con respaldo en variables de entorno. El núcleo
//! (`Server`, `Dispatcher`, almacenes) solo recibe valores ya resueltos.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./page_server --port 9000 \
//!   --workers 8 \
//!   --backend file \
//!   --data-file ./data/pages.json
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! PAGE_SERVER_PORT=9000 PAGE_SERVER_BACKEND=file ./page_server
//! ```

use crate::store::StoreBackend;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Configuración del servidor de páginas
#[derive(Debug, Clone, Parser)]
#[command(name = "page_server")]
#[command(about = "Servidor HTTP concurrente de páginas HTML")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor (0 = efímero)
    #[arg(short, long, default_value = "8888", env = "PAGE_SERVER_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "PAGE_SERVER_HOST")]
    pub host: String,

    // === Pool ===

    /// Workers del pool (0 = automático: 2 × núcleos, mínimo 2)
    #[arg(short, long, default_value = "0", env = "PAGE_SERVER_WORKERS")]
    pub workers: usize,

    /// Conexiones que pueden esperar en la cola del pool
    #[arg(long = "queue-capacity", default_value = "128", env = "PAGE_SERVER_QUEUE")]
    pub queue_capacity: usize,

    // === Almacenamiento ===

    /// Backend de almacenamiento
    #[arg(long, value_enum, default_value = "memory", env = "PAGE_SERVER_BACKEND")]
    pub backend: StoreBackend,

    /// Archivo del backend durable
    #[arg(long = "data-file", default_value = "./data/pages.json", env = "PAGE_SERVER_DATA_FILE")]
    pub data_file: PathBuf,

    /// Segmento de path de la colección
    #[arg(long, default_value = "html", env = "PAGE_SERVER_COLLECTION")]
    pub collection: String,

    /// Cargar páginas de ejemplo al iniciar
    #[arg(long = "demo-pages", env = "PAGE_SERVER_DEMO_PAGES")]
    pub demo_pages: bool,

    // === Tiempos ===

    /// Período de gracia del apagado en segundos
    #[arg(long = "grace-secs", default_value = "10", env = "PAGE_SERVER_GRACE_SECS")]
    pub grace_secs: u64,

    /// Timeout de lectura por conexión en milisegundos (0 = sin timeout)
    #[arg(long = "read-timeout-ms", default_value = "10000", env = "PAGE_SERVER_READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    // === Logging ===

    /// Filtro de logs por defecto (RUST_LOG tiene prioridad)
    #[arg(long = "log-level", default_value = "info", env = "PAGE_SERVER_LOG")]
    pub log_level: String,
}

impl Config {
    /// Parsea argumentos CLI y variables de entorno
    pub fn new() -> Self {
        Config::parse()
    }

    /// Dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use page_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8888");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Tamaño efectivo del pool
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }

        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        (cores * 2).max(2)
    }

    /// Período de gracia como `Duration`
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }

    /// Timeout de lectura, `None` si está deshabilitado
    pub fn read_timeout(&self) -> Option<Duration> {
        match self.read_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.collection.is_empty() {
            return Err("Collection name must not be empty".to_string());
        }
        if self.collection.contains('/') || self.collection.contains('?') {
            return Err("Collection name must be a single path segment".to_string());
        }
        if self.queue_capacity == 0 {
            return Err("Queue capacity must be >= 1".to_string());
        }
        if self.grace_secs == 0 {
            return Err("Grace period must be > 0".to_string());
        }
        if self.host.trim().is_empty() {
            return Err("Host must not be empty".to_string());
        }

        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn print_summary(&self) {
        tracing::info!(
            address = %self.address(),
            workers = self.worker_count(),
            queue_capacity = self.queue_capacity,
            "network"
        );
        tracing::info!(
            backend = self.backend.as_str(),
            data_file = %self.data_file.display(),
            collection = %self.collection,
            demo_pages = self.demo_pages,
            "storage"
        );
        tracing::info!(
            grace_secs = self.grace_secs,
            read_timeout_ms = self.read_timeout_ms,
            "timeouts"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8888,
            host: "127.0.0.1".to_string(),
            workers: 0,
            queue_capacity: 128,
            backend: StoreBackend::Memory,
            data_file: PathBuf::from("./data/pages.json"),
            collection: "html".to_string(),
            demo_pages: false,
            grace_secs: 10,
            read_timeout_ms: 10_000,
            log_level: "info".to_string(),
        }
    }
}
