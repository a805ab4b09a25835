//! # Escritura de Respuestas
//! src/http/writer.rs
//!
//! Serializa una `Response` completa en un único buffer y la escribe de una
//! vez. `write_all` reintenta las escrituras parciales hasta terminar o
//! fallar; el llamador decide qué hacer con el error.

use super::Response;
use std::io::{self, Write};

/// Escritor de una respuesta ya serializada
pub struct ResponseWriter {
    buffer: Vec<u8>,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: response.to_bytes(),
        }
    }

    /// Bytes que se van a escribir
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Escribe la respuesta completa y hace flush
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&self.buffer)?;
        out.flush()
    }
}

/// Atajo: serializa y escribe `response` en `out`
pub fn write_response<W: Write>(out: &mut W, response: &Response) -> io::Result<()> {
    ResponseWriter::new(response).write_to(out)
}
