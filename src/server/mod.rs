//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! - `tcp`: socket de escucha, thread acceptor y ciclo de vida
//! - `pool`: pool acotado de workers
//! - `connection`: lectura → dispatch → escritura → cierre de una conexión

pub mod connection;
pub mod pool;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use pool::{PoolClosed, WorkerPool};
pub use tcp::Server;
