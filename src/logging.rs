//! Inicialización de logs.

use tracing_subscriber::EnvFilter;

/// Instala el subscriber global
///
/// `RUST_LOG` tiene prioridad; si no está definido (o es inválido) se usa
/// `level`. Llamarlo dos veces no falla: el segundo intento se ignora.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_thread_names(true)
        .try_init();
}
