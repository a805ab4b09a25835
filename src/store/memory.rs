//! # Almacén en Memoria
//! src/store/memory.rs
//!
//! Backend por defecto (y el de los tests). Un `BTreeMap` mantiene las
//! claves ordenadas, así `list()` no necesita ordenar.

use super::{Page, PageStore, StoreError};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Mapa `id → contenido` compartido entre threads
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Crea un almacén vacío
    pub fn new() -> Self {
        Self::default()
    }

    /// Crea un almacén con páginas iniciales
    ///
    /// # Ejemplo
    /// ```
    /// use page_server::store::{MemoryStore, PageStore};
    ///
    /// let store = MemoryStore::with_pages([("abc", "<h1>Hola</h1>")]);
    /// assert_eq!(store.get("abc").unwrap(), Some("<h1>Hola</h1>".to_string()));
    /// ```
    pub fn with_pages<I, K, V>(pages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let pages = pages
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        Self {
            pages: RwLock::new(pages),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, String>>, StoreError> {
        self.pages.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, String>>, StoreError> {
        self.pages.write().map_err(|_| StoreError::Poisoned)
    }
}

impl PageStore for MemoryStore {
    fn get(&self, id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.get(id).cloned())
    }

    fn put(&self, id: &str, content: &str) -> Result<bool, StoreError> {
        let previous = self.write()?.insert(id.to_string(), content.to_string());
        Ok(previous.is_some())
    }

    fn remove(&self, id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.write()?.remove(id))
    }

    fn list(&self) -> Result<Vec<Page>, StoreError> {
        let pages = self.read()?;
        Ok(pages
            .iter()
            .map(|(id, content)| Page::new(id.as_str(), content.as_str()))
            .collect())
    }
}
