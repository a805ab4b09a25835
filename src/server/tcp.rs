//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Un thread acceptor alimenta al pool de workers; cada worker atiende una
//! conexión completa (un request) y la cierra.
//!
//! ## Apagado
//!
//! 1. Se marca el flag de parada y el pool deja de aceptar tareas
//! 2. Una conexión local "dummy" desbloquea el `accept` pendiente
//! 3. Se espera al acceptor (el listener se cierra con él)
//! 4. El pool drena su cola durante el período de gracia; lo que quede se
//!    descarta

use super::connection::handle_connection;
use super::pool::WorkerPool;
use crate::config::Config;
use crate::router::Dispatcher;
use crate::store::PageStore;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Cuánto esperar la conexión que despierta al acceptor
const WAKE_TIMEOUT: Duration = Duration::from_secs(1);

/// Servidor de páginas
pub struct Server {
    config: Config,
    dispatcher: Arc<Dispatcher>,
    stop: Arc<AtomicBool>,
    local_addr: Option<SocketAddr>,
    acceptor: Option<JoinHandle<()>>,
    pool: Option<Arc<WorkerPool>>,
}

impl Server {
    /// Crea el servidor sin abrir el socket
    pub fn new(config: Config, store: Arc<dyn PageStore>) -> Self {
        let dispatcher = Dispatcher::new(&config.collection, store);

        Self {
            config,
            dispatcher: Arc::new(dispatcher),
            stop: Arc::new(AtomicBool::new(false)),
            local_addr: None,
            acceptor: None,
            pool: None,
        }
    }

    /// Abre el socket, arranca el pool y el thread acceptor
    ///
    /// Retorna la dirección real (útil con puerto 0).
    pub fn start(&mut self) -> io::Result<SocketAddr> {
        if self.acceptor.is_some() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "server already started",
            ));
        }

        let listener = TcpListener::bind(self.config.address())?;
        let addr = listener.local_addr()?;
        let pool = Arc::new(WorkerPool::new(
            self.config.worker_count(),
            self.config.queue_capacity,
        )?);

        self.stop.store(false, Ordering::SeqCst);

        let acceptor = {
            let pool = Arc::clone(&pool);
            let dispatcher = Arc::clone(&self.dispatcher);
            let stop = Arc::clone(&self.stop);
            let read_timeout = self.config.read_timeout();

            thread::Builder::new()
                .name("page-server-acceptor".to_string())
                .spawn(move || Self::accept_loop(listener, pool, dispatcher, stop, read_timeout))?
        };

        tracing::info!(
            %addr,
            workers = pool.size(),
            collection = %self.dispatcher.collection(),
            "server listening"
        );

        self.local_addr = Some(addr);
        self.acceptor = Some(acceptor);
        self.pool = Some(pool);

        Ok(addr)
    }

    /// Dirección en la que escucha, si está corriendo
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// ¿Está aceptando conexiones?
    pub fn is_running(&self) -> bool {
        self.acceptor.is_some()
    }

    /// Detiene el servidor
    ///
    /// Retorna `true` si todas las conexiones en curso terminaron dentro del
    /// período de gracia. Llamarlo sin haber arrancado (o dos veces) no
    /// tiene efecto.
    pub fn close(&mut self) -> bool {
        let acceptor = match self.acceptor.take() {
            Some(acceptor) => acceptor,
            None => return true,
        };

        tracing::info!("stopping server");
        self.stop.store(true, Ordering::SeqCst);

        // Con la cola llena el acceptor está bloqueado en `execute`, no en `accept`
        if let Some(pool) = &self.pool {
            pool.close_intake();
        }

        if let Some(addr) = self.local_addr.take() {
            // Si el acceptor ya salió por error, nadie acepta: no importa
            if let Err(e) = TcpStream::connect_timeout(&wake_address(addr), WAKE_TIMEOUT) {
                tracing::debug!(error = %e, "wake-up connection failed");
            }
        }

        if acceptor.join().is_err() {
            tracing::error!("acceptor thread panicked");
        }

        let finished = match self.pool.take() {
            Some(pool) => pool.shutdown(self.config.grace_period()),
            None => true,
        };

        tracing::info!(clean = finished, "server stopped");
        finished
    }

    fn accept_loop(
        listener: TcpListener,
        pool: Arc<WorkerPool>,
        dispatcher: Arc<Dispatcher>,
        stop: Arc<AtomicBool>,
        read_timeout: Option<Duration>,
    ) {
        for stream in listener.incoming() {
            if stop.load(Ordering::SeqCst) {
                break;
            }

            match stream {
                Ok(stream) => {
                    let dispatcher = Arc::clone(&dispatcher);
                    let submitted =
                        pool.execute(move || handle_connection(stream, &dispatcher, read_timeout));

                    if submitted.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to accept connection");
                }
            }
        }

        tracing::debug!("acceptor finished");
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.close();
    }
}

/// Dirección para conectarse a uno mismo (0.0.0.0 → loopback)
fn wake_address(addr: SocketAddr) -> SocketAddr {
    match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), addr.port())
        }
        IpAddr::V6(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), addr.port())
        }
        _ => addr,
    }
}
