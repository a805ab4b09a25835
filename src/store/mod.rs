//! # Almacenamiento de Páginas
//! src/store/mod.rs
//!
//! El dispatcher solo conoce el trait [`PageStore`]: cuatro operaciones
//! atómicas sobre `id → contenido`. Hay dos implementaciones:
//!
//! - [`MemoryStore`]: mapa en memoria protegido por un `RwLock`
//! - [`FileStore`]: tabla durable de filas `(uuid, content)` en un archivo JSON
//!
//! Ninguna expone su contenedor interno.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::path::Path;
use std::sync::Arc;

/// Una página almacenada
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub id: String,
    pub content: String,
}

impl Page {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// Fallos de infraestructura del backend
///
/// "No encontrado" no es un error: las operaciones retornan `None`.
#[derive(Debug)]
pub enum StoreError {
    /// Falló la lectura o escritura del archivo
    Io(std::io::Error),

    /// El archivo no contiene filas válidas
    Serialization(serde_json::Error),

    /// Un thread entró en pánico con el lock tomado
    Poisoned,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "Storage I/O error: {}", e),
            StoreError::Serialization(e) => write!(f, "Storage format error: {}", e),
            StoreError::Poisoned => write!(f, "Storage lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Serialization(e) => Some(e),
            StoreError::Poisoned => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e)
    }
}

/// Operaciones del almacén de páginas
///
/// Cada operación es atómica respecto a las demás, sin importar cuántos
/// threads la llamen a la vez.
pub trait PageStore: Send + Sync {
    /// Contenido de la página, o `None` si no existe
    fn get(&self, id: &str) -> Result<Option<String>, StoreError>;

    /// Guarda (o reemplaza) una página
    ///
    /// Retorna `true` si el id ya existía.
    fn put(&self, id: &str, content: &str) -> Result<bool, StoreError>;

    /// Elimina una página y retorna su contenido anterior
    fn remove(&self, id: &str) -> Result<Option<String>, StoreError>;

    /// Copia de todas las páginas, ordenadas por id ascendente
    fn list(&self) -> Result<Vec<Page>, StoreError>;
}

/// Backend seleccionable desde la configuración
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StoreBackend {
    /// Mapa en memoria (se pierde al reiniciar)
    Memory,
    /// Archivo JSON durable
    File,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::File => "file",
        }
    }
}

/// Construye el backend elegido
///
/// `data_file` solo se usa con [`StoreBackend::File`].
pub fn open(backend: StoreBackend, data_file: &Path) -> Result<Arc<dyn PageStore>, StoreError> {
    match backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreBackend::File => Ok(Arc::new(FileStore::open(data_file)?)),
    }
}

/// Páginas de ejemplo para `--demo-pages`
pub const DEMO_PAGES: [(&str, &str); 2] = [
    (
        "demo-uuid",
        "<html><body><h1>Página de ejemplo</h1><p>Contenido generado en memoria</p></body></html>",
    ),
    (
        "abc123",
        "<html><body><h1>Hola desde el almacén</h1><p>Página de demostración</p></body></html>",
    ),
];

/// Carga [`DEMO_PAGES`] sin pisar páginas existentes
///
/// Retorna cuántas se agregaron.
pub fn seed_demo_pages(store: &dyn PageStore) -> Result<usize, StoreError> {
    let mut added = 0;
    for (id, content) in DEMO_PAGES {
        if store.get(id)?.is_none() {
            store.put(id, content)?;
            added += 1;
        }
    }
    Ok(added)
}

#[cfg(test)]
pub(crate) mod contract {
    //! Propiedades que toda implementación de `PageStore` debe cumplir.

    use super::*;
    use std::thread;

    pub fn put_then_get(store: &dyn PageStore) {
        assert!(!store.put("a", "<p>A</p>").unwrap());
        assert_eq!(store.get("a").unwrap(), Some("<p>A</p>".to_string()));
        // Lecturas repetidas sin cambios retornan lo mismo
        assert_eq!(store.get("a").unwrap(), store.get("a").unwrap());
    }

    pub fn put_reports_existing(store: &dyn PageStore) {
        assert!(!store.put("k", "v1").unwrap());
        assert!(store.put("k", "v2").unwrap());
        assert_eq!(store.get("k").unwrap(), Some("v2".to_string()));
    }

    pub fn remove_absent_is_noop(store: &dyn PageStore) {
        store.put("keep", "x").unwrap();
        let before = store.list().unwrap();

        assert_eq!(store.remove("missing").unwrap(), None);
        assert_eq!(store.list().unwrap(), before);
    }

    pub fn remove_returns_previous(store: &dyn PageStore) {
        store.put("gone", "bye").unwrap();
        assert_eq!(store.remove("gone").unwrap(), Some("bye".to_string()));
        assert_eq!(store.get("gone").unwrap(), None);
    }

    pub fn list_sorted_snapshot(store: &dyn PageStore) {
        for id in ["c", "a", "b"] {
            store.put(id, id).unwrap();
        }

        let snapshot = store.list().unwrap();
        let ids: Vec<&str> = snapshot.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        store.put("d", "d").unwrap();
        store.remove("a").unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0], Page::new("a", "a"));
    }

    pub fn concurrent_puts(store: Arc<dyn PageStore>) {
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..50 {
                        store.put(&format!("{:02}-{:03}", t, i), "x").unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let pages = store.list().unwrap();
        assert_eq!(pages.len(), 8 * 50);
        assert!(pages.windows(2).all(|w| w[0].id < w[1].id));
    }
}
