//! # Módulo HTTP
//!
//! Implementa el subconjunto de HTTP/1.x que usa el servidor, sin librerías
//! de alto nivel:
//!
//! - Parsing de requests (request line, headers, body de longitud fija)
//! - Construcción y serialización de responses
//! - Status codes y headers
//! - Percent-encoding de parámetros
//!
//! No hay chunked transfer encoding, multipart ni conexiones persistentes:
//! cada conexión lleva exactamente un request y una respuesta.
//!
//! ### Formato de Request
//!
//! ```text
//! GET /html?uuid=value HTTP/1.1\r\n
//! Header-Name: Header-Value\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/html; charset=UTF-8\r\n
//! Content-Length: 13\r\n
//! \r\n
//! <h1>Hola</h1>
//! ```

pub mod codec; // Percent-encoding
pub mod headers; // Mapa ordenado de headers
pub mod request; // Parsing de requests
pub mod response; // Construcción de responses
pub mod status; // Códigos de estado
pub mod writer; // Escritura al socket

// Re-exportamos los tipos principales para facilitar su uso
pub use headers::Headers;
pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
pub use writer::{write_response, ResponseWriter};
