//! # Page Server
//! src/lib.rs
//!
//! Servidor HTTP concurrente que guarda y sirve documentos HTML por id.
//! Cada conexión transporta exactamente un request: se parsea, se despacha
//! contra el almacén de páginas, se escribe la respuesta y se cierra.
//!
//! ## Arquitectura
//!
//! - `http`: parser de requests, respuestas y escritura al socket
//! - `router`: dispatcher `(método, path, parámetros) → Response`
//! - `store`: trait `PageStore` y sus backends (memoria, archivo)
//! - `server`: acceptor, pool acotado de workers y apagado ordenado
//! - `html`: cuerpos HTML (bienvenida, listados, errores)
//! - `config` / `logging`: configuración CLI y logs
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use page_server::config::Config;
//! use page_server::server::Server;
//! use page_server::store::MemoryStore;
//! use std::sync::Arc;
//!
//! let mut server = Server::new(Config::default(), Arc::new(MemoryStore::new()));
//! let addr = server.start().expect("Error al iniciar servidor");
//! println!("Escuchando en http://{}", addr);
//! server.close();
//! ```

pub mod config;
pub mod html;
pub mod http;
pub mod ids;
pub mod logging;
pub mod router;
pub mod server;
pub mod store;
