//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! API para construir respuestas de forma programática y convertirlas a
//! bytes para enviar al cliente.
//!
//! ## Formato
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/html; charset=UTF-8\r\n
//! Content-Length: 13\r\n
//! \r\n
//! <h1>Hola</h1>
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use page_server::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "text/plain")
//!     .with_body("Hello");
//!
//! assert_eq!(response.header("Content-Length"), Some("5"));
//! ```

use super::{Headers, StatusCode};
use crate::html;
use std::io::{self, BufRead, Read};

/// Versión usada por defecto en la status line
pub const DEFAULT_VERSION: &str = "HTTP/1.1";

/// Content-Type de todas las páginas del servidor
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=UTF-8";

/// Representa una respuesta HTTP completa
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Versión de la status line (ej: "HTTP/1.1")
    version: String,

    /// Código de estado HTTP (200, 404, etc.)
    status: StatusCode,

    /// Headers en orden de inserción
    headers: Headers,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

impl Response {
    /// Crea una nueva respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Cambia la versión de la status line
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Agrega un header (si ya existe, se sobrescribe)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega un header a una respuesta existente (versión mutable)
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name, value);
    }

    /// Establece el cuerpo desde un string
    ///
    /// Recalcula `Content-Length`.
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece el cuerpo desde bytes
    ///
    /// Recalcula `Content-Length`.
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.set_body(body);
        self
    }

    /// Reemplaza el cuerpo de una respuesta existente
    ///
    /// Es el único punto que escribe `body`, así `Content-Length` nunca
    /// queda desactualizado.
    pub fn set_body(&mut self, body: Vec<u8>) {
        self.headers.insert("Content-Length", &body.len().to_string());
        self.body = body;
    }

    /// Crea una respuesta HTML
    pub fn html(status: StatusCode, body: &str) -> Self {
        Self::new(status)
            .with_header("Content-Type", HTML_CONTENT_TYPE)
            .with_body(body)
    }

    /// Crea una respuesta de error con la página HTML uniforme
    ///
    /// # Ejemplo
    /// ```
    /// use page_server::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::BadRequest, "Falta el parámetro uuid");
    /// let body = String::from_utf8(response.body().to_vec()).unwrap();
    ///
    /// assert!(body.contains("400 Bad Request"));
    /// assert!(body.contains("Falta el parámetro uuid"));
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::html(status, &html::error_page(status, message))
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// - Status line: `HTTP/1.1 200 OK\r\n`
    /// - Headers: `Header-Name: Value\r\n` en orden de inserción
    /// - Línea vacía: `\r\n`
    /// - Body: contenido tal cual
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(128 + self.body.len());

        let status_line = format!("{} {}\r\n", self.version, self.status);
        result.extend_from_slice(status_line.as_bytes());

        for (name, value) in self.headers.iter() {
            let header_line = format!("{}: {}\r\n", name, value);
            result.extend_from_slice(header_line.as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        result
    }

    /// Lee una respuesta serializada desde un stream
    ///
    /// Sirve a los clientes (y a los tests) para reparsear lo que escribe
    /// el servidor. El body se lee según `Content-Length`, o hasta el fin
    /// del stream si no viene.
    pub fn read_from<R: BufRead>(reader: &mut R) -> io::Result<Self> {
        let status_line = read_line(reader)?
            .ok_or_else(|| invalid_data("missing status line".to_string()))?;

        let mut parts = status_line.splitn(3, ' ');
        let version = parts.next().unwrap_or_default();
        let code = parts.next().unwrap_or_default();
        if !version.starts_with("HTTP/") {
            return Err(invalid_data(format!("invalid status line: {}", status_line)));
        }
        let status = code
            .parse::<u16>()
            .ok()
            .and_then(StatusCode::from_u16)
            .ok_or_else(|| invalid_data(format!("unknown status code: {}", code)))?;

        let mut response = Response::new(status).with_version(version);

        while let Some(line) = read_line(reader)? {
            if line.is_empty() {
                break;
            }
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| invalid_data(format!("invalid header: {}", line)))?;
            response.add_header(name.trim(), value.trim());
        }

        let mut body = Vec::new();
        match response.header("Content-Length") {
            Some(len) => {
                let len = len
                    .parse::<usize>()
                    .map_err(|_| invalid_data(format!("invalid Content-Length: {}", len)))?;
                body.resize(len, 0);
                reader.read_exact(&mut body)?;
            }
            None => {
                reader.read_to_end(&mut body)?;
            }
        }
        response.set_body(body);

        Ok(response)
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene la versión de la status line
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Obtiene una referencia a los headers
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Obtiene un header (sin distinguir mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body como texto (lossy)
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn read_line<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches('\n').trim_end_matches('\r');
    Ok(Some(trimmed.to_string()))
}

fn invalid_data(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}
