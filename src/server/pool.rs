//! # Pool de Workers
//! src/server/pool.rs
//!
//! Cola FIFO acotada + N threads fijos que la consumen.
//!
//! ```text
//! acceptor ──execute()──▶ [ cola (capacity) ] ──▶ worker-0 .. worker-N
//! ```
//!
//! - `execute` bloquea mientras la cola está llena (backpressure hacia el
//!   acceptor y, de ahí, al backlog del sistema operativo)
//! - Un pánico dentro de una tarea no mata al worker
//! - `shutdown` deja de aceptar tareas, espera a que los workers vacíen la
//!   cola durante el período de gracia y luego descarta lo pendiente

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// La tarea llegó después de `shutdown`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolClosed;

impl std::fmt::Display for PoolClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Worker pool is shut down")
    }
}

impl std::error::Error for PoolClosed {}

struct State {
    tasks: VecDeque<Task>,
    closed: bool,
    /// Workers que todavía no salieron de su loop
    alive: usize,
}

struct Shared {
    state: Mutex<State>,
    /// Hay tareas nuevas (o se cerró el pool)
    available: Condvar,
    /// Se liberó lugar en la cola
    space: Condvar,
    /// Terminó un worker
    finished: Condvar,
    capacity: usize,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Pool de tamaño fijo con cola acotada
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
}

impl WorkerPool {
    /// Crea el pool e inicia `size` workers (mínimo 1)
    ///
    /// `capacity` es la cantidad de tareas que pueden esperar en la cola.
    pub fn new(size: usize, capacity: usize) -> std::io::Result<Self> {
        let size = size.max(1);
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                tasks: VecDeque::with_capacity(capacity.max(1)),
                closed: false,
                alive: 0,
            }),
            available: Condvar::new(),
            space: Condvar::new(),
            finished: Condvar::new(),
            capacity: capacity.max(1),
        });

        let pool = Self {
            shared,
            workers: Mutex::new(Vec::with_capacity(size)),
            size,
        };

        for i in 0..size {
            let shared = Arc::clone(&pool.shared);
            pool.shared.lock().alive += 1;

            let spawned = thread::Builder::new()
                .name(format!("page-worker-{}", i))
                .spawn(move || Self::worker_loop(shared));

            match spawned {
                Ok(handle) => pool.handles().push(handle),
                Err(e) => {
                    pool.shared.lock().alive -= 1;
                    pool.shutdown(Duration::ZERO);
                    return Err(e);
                }
            }
        }

        Ok(pool)
    }

    /// Encola una tarea
    ///
    /// Bloquea mientras la cola esté llena. Retorna `Err(PoolClosed)` si el
    /// pool ya se cerró (la tarea se descarta).
    pub fn execute<F>(&self, task: F) -> Result<(), PoolClosed>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.shared.lock();

        while !state.closed && state.tasks.len() >= self.shared.capacity {
            state = self
                .shared
                .space
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        if state.closed {
            return Err(PoolClosed);
        }

        state.tasks.push_back(Box::new(task));
        self.shared.available.notify_one();

        Ok(())
    }

    /// Número de workers
    pub fn size(&self) -> usize {
        self.size
    }

    /// Tareas esperando en la cola
    pub fn queued(&self) -> usize {
        self.shared.lock().tasks.len()
    }

    /// Deja de aceptar tareas sin esperar a los workers
    ///
    /// Los `execute` bloqueados por cola llena retornan `Err(PoolClosed)`.
    /// Lo ya encolado se sigue procesando.
    pub fn close_intake(&self) {
        self.shared.lock().closed = true;
        self.shared.available.notify_all();
        self.shared.space.notify_all();
    }

    /// Cierra el pool
    ///
    /// 1. No acepta más tareas (los `execute` bloqueados retornan error)
    /// 2. Los workers siguen consumiendo la cola hasta vaciarla
    /// 3. Si después de `grace` quedan workers ocupados, se descartan las
    ///    tareas que aún no empezaron y los workers restantes quedan
    ///    desacoplados (terminan solos cuando acabe su tarea actual)
    ///
    /// Retorna `true` si todos los workers terminaron a tiempo.
    /// Llamarlo más de una vez no tiene efecto.
    pub fn shutdown(&self, grace: Duration) -> bool {
        {
            let state = self.shared.lock();
            if state.closed && self.handles().is_empty() {
                return state.alive == 0;
            }
        }
        self.close_intake();

        let deadline = Instant::now() + grace;
        let mut state = self.shared.lock();
        while state.alive > 0 {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let (next, _) = self
                .shared
                .finished
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            state = next;
        }

        let all_done = state.alive == 0;
        let discarded: Vec<Task> = state.tasks.drain(..).collect();
        let stragglers = state.alive;
        drop(state);

        // Soltar las tareas fuera del lock (cierra sus conexiones)
        if !discarded.is_empty() {
            tracing::warn!(count = discarded.len(), "discarding queued tasks after grace period");
        }
        drop(discarded);

        let workers = std::mem::take(&mut *self.handles());
        if all_done {
            for handle in workers {
                let _ = handle.join();
            }
        } else {
            tracing::warn!(stragglers, "workers still busy after grace period, detaching");
        }

        all_done
    }

    fn handles(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn worker_loop(shared: Arc<Shared>) {
        loop {
            let task = {
                let mut state = shared.lock();
                loop {
                    if let Some(task) = state.tasks.pop_front() {
                        shared.space.notify_one();
                        break Some(task);
                    }
                    if state.closed {
                        break None;
                    }
                    state = shared
                        .available
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            };

            match task {
                Some(task) => {
                    if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                        tracing::error!("task panicked, worker continues");
                    }
                }
                None => break,
            }
        }

        let mut state = shared.lock();
        state.alive -= 1;
        shared.finished.notify_all();
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown(Duration::ZERO);
    }
}
