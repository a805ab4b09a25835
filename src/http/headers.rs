//! # Headers HTTP
//! src/http/headers.rs
//!
//! Mapa de headers que conserva el orden de inserción (para serializar)
//! y busca nombres sin distinguir mayúsculas de minúsculas.

/// Colección ordenada de headers `Name: Value`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Crea un mapa vacío
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserta o reemplaza un header
    ///
    /// Si ya existe un header con el mismo nombre (sin importar mayúsculas),
    /// se reemplaza su valor y conserva su posición original.
    /// Retorna el valor anterior, si lo había.
    pub fn insert(&mut self, name: &str, value: &str) -> Option<String> {
        match self.position(name) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value.to_string())),
            None => {
                self.entries.push((name.to_string(), value.to_string()));
                None
            }
        }
    }

    /// Obtiene el valor de un header
    ///
    /// # Ejemplo
    /// ```
    /// use page_server::http::Headers;
    ///
    /// let mut headers = Headers::new();
    /// headers.insert("Content-Length", "42");
    /// assert_eq!(headers.get("content-length"), Some("42"));
    /// ```
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.entries[idx].1.as_str())
    }

    /// Verifica si existe un header
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Elimina un header y retorna su valor
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    /// Itera en orden de inserción
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}
