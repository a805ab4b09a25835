//! # Almacén Durable
//! src/store/file.rs
//!
//! Tabla de páginas persistida en un archivo JSON: una fila por id con sus
//! columnas `uuid` y `content`.
//!
//! ```json
//! [
//!   { "uuid": "0190f2c4-...", "content": "<h1>Hola</h1>" }
//! ]
//! ```
//!
//! Cada mutación reescribe el archivo (temporal + rename) mientras tiene
//! el lock de escritura. Si la escritura falla, el cambio en memoria se
//! deshace y la operación retorna error.
//!
//! Costo: como se reescribe la tabla completa, cada `put`/`remove` tarda
//! en proporción al total de páginas guardadas (no al tamaño del cambio) y
//! serializa a todos los escritores. Las lecturas (`get`/`list`) salen de
//! la copia en memoria y no tocan el disco. Pensado para colecciones
//! chicas.

use super::{Page, PageStore, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Fila persistida
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PageRow {
    uuid: String,
    content: String,
}

/// Backend durable sobre un archivo JSON
#[derive(Debug)]
pub struct FileStore {
    /// Ruta al archivo de persistencia
    path: PathBuf,

    /// Copia en memoria de la tabla
    pages: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Abre (o crea) el almacén en `path`
    ///
    /// Crea los directorios padre si hace falta. Un archivo existente con
    /// formato inválido es un error: no se descarta en silencio.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let pages = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), pages = pages.len(), "file store opened");

        Ok(Self {
            path,
            pages: RwLock::new(pages),
        })
    }

    /// Ruta del archivo
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_file(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
        let reader = BufReader::new(File::open(path)?);
        let rows: Vec<PageRow> = serde_json::from_reader(reader)?;

        Ok(rows.into_iter().map(|row| (row.uuid, row.content)).collect())
    }

    /// Escribe la tabla completa (atomic write)
    fn save_to_file(&self, pages: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let mut temp_path = self.path.clone().into_os_string();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);

        let rows: Vec<PageRow> = pages
            .iter()
            .map(|(uuid, content)| PageRow {
                uuid: uuid.clone(),
                content: content.clone(),
            })
            .collect();

        let mut writer = BufWriter::new(File::create(&temp_path)?);
        serde_json::to_writer_pretty(&mut writer, &rows)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;

        // Renombrar (atómico en sistemas Unix)
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, String>>, StoreError> {
        self.pages.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, String>>, StoreError> {
        self.pages.write().map_err(|_| StoreError::Poisoned)
    }
}

impl PageStore for FileStore {
    fn get(&self, id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.get(id).cloned())
    }

    fn put(&self, id: &str, content: &str) -> Result<bool, StoreError> {
        let mut pages = self.write()?;
        let previous = pages.insert(id.to_string(), content.to_string());

        if let Err(e) = self.save_to_file(&pages) {
            match previous {
                Some(old) => pages.insert(id.to_string(), old),
                None => pages.remove(id),
            };
            return Err(e);
        }

        Ok(previous.is_some())
    }

    fn remove(&self, id: &str) -> Result<Option<String>, StoreError> {
        let mut pages = self.write()?;
        let removed = match pages.remove(id) {
            Some(content) => content,
            None => return Ok(None),
        };

        if let Err(e) = self.save_to_file(&pages) {
            pages.insert(id.to_string(), removed);
            return Err(e);
        }

        Ok(Some(removed))
    }

    fn list(&self) -> Result<Vec<Page>, StoreError> {
        let pages = self.read()?;
        Ok(pages
            .iter()
            .map(|(id, content)| Page::new(id.as_str(), content.as_str()))
            .collect())
    }
}
