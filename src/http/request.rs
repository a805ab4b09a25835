//! # Parsing de Requests HTTP
//! src/http/request.rs
//!
//! Parser que lee **exactamente un** request desde un stream de bytes.
//!
//! ## Formato de un Request
//!
//! ```text
//! POST /html?uuid=abc HTTP/1.1\r\n
//! Host: localhost:8888\r\n
//! Content-Length: 13\r\n
//! \r\n
//! content=Hola%21
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD /path?query HTTP/x.y`
//! 2. **Headers**: Pares `Name: Value` (uno por línea) hasta una línea vacía
//! 3. **Body**: Solo si `Content-Length` > 0; se lee exactamente esa cantidad
//!    de bytes y se mezcla con los parámetros de la query

use super::codec::{parse_pairs, percent_decode};
use super::Headers;
use std::collections::HashMap;
use std::io::{self, BufRead, Read};

/// Tamaño máximo de la request line
pub const MAX_REQUEST_LINE: usize = 8 * 1024;

/// Tamaño máximo del bloque de headers
pub const MAX_HEADER_BLOCK: usize = 64 * 1024;

/// Tamaño máximo del body declarado en `Content-Length`
pub const MAX_BODY: usize = 16 * 1024 * 1024;

/// Métodos HTTP reconocidos por el parser
///
/// El servidor solo atiende GET, POST y DELETE; el resto se parsea
/// correctamente pero el dispatcher responde 405.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    HEAD,
    GET,
    POST,
    PUT,
    DELETE,
    TRACE,
    OPTIONS,
    CONNECT,
}

impl Method {
    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::HEAD => "HEAD",
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::TRACE => "TRACE",
            Method::OPTIONS => "OPTIONS",
            Method::CONNECT => "CONNECT",
        }
    }
}

impl std::str::FromStr for Method {
    type Err = ParseError;

    /// Parsea un método sin distinguir mayúsculas (`get` == `GET`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HEAD" => Ok(Method::HEAD),
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            "TRACE" => Ok(Method::TRACE),
            "OPTIONS" => Ok(Method::OPTIONS),
            "CONNECT" => Ok(Method::CONNECT),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Representa un request HTTP parseado
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP
    method: Method,

    /// Path de la petición sin la query (ej: "/html")
    path: String,

    /// Target completo tal como llegó (ej: "/html?uuid=abc")
    target: String,

    /// Versión HTTP (ej: "HTTP/1.1")
    version: String,

    /// Query parameters decodificados
    query_params: HashMap<String, String>,

    /// Headers en orden de llegada
    headers: Headers,

    /// Body crudo, presente solo si se declaró `Content-Length` > 0
    body: Option<String>,

    /// Query + body; el body gana en claves repetidas
    params: HashMap<String, String>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// El peer cerró la conexión sin enviar nada
    EmptyRequest,

    /// La request line no tiene exactamente 3 partes
    MalformedRequestLine(String),

    /// Método HTTP desconocido
    UnsupportedMethod(String),

    /// La versión no empieza por "HTTP/"
    InvalidVersion(String),

    /// Header sin ':' o con nombre vacío
    MalformedHeader(String),

    /// Content-Length no es un entero no negativo
    InvalidContentLength(String),

    /// El stream terminó antes de completar el body
    UnexpectedEndOfStream { expected: usize },

    /// Request line o headers exceden los límites
    RequestTooLarge,

    /// Error de lectura del socket (timeout, reset, etc.)
    Io(io::ErrorKind),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::EmptyRequest => write!(f, "Empty request"),
            ParseError::MalformedRequestLine(l) => write!(f, "Malformed request line: {}", l),
            ParseError::UnsupportedMethod(m) => write!(f, "Unsupported HTTP method: {}", m),
            ParseError::InvalidVersion(v) => write!(f, "Invalid HTTP version: {}", v),
            ParseError::MalformedHeader(h) => write!(f, "Malformed header: {}", h),
            ParseError::InvalidContentLength(v) => write!(f, "Invalid Content-Length: {}", v),
            ParseError::UnexpectedEndOfStream { expected } => {
                write!(f, "Unexpected end of stream while reading {} body bytes", expected)
            }
            ParseError::RequestTooLarge => write!(f, "Request too large"),
            ParseError::Io(kind) => write!(f, "I/O error while reading request: {}", kind),
        }
    }
}

impl std::error::Error for ParseError {}

impl Request {
    /// Parsea un request completo desde un buffer en memoria
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use page_server::http::Request;
    ///
    /// let raw = b"GET /html?uuid=abc HTTP/1.1\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/html");
    /// assert_eq!(request.param("uuid"), Some("abc"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let mut reader = buffer;
        Self::read_from(&mut reader)
    }

    /// Lee un request desde un stream
    ///
    /// Bloquea hasta tener la request line, los headers y, si se declaró
    /// `Content-Length`, exactamente esa cantidad de bytes de body.
    /// No consume nada más allá del body.
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<Self, ParseError> {
        // 1. Request line
        let line = read_line(reader, MAX_REQUEST_LINE)?.ok_or(ParseError::EmptyRequest)?;
        let (method, target, version) = Self::parse_request_line(&line)?;
        let (path, query_params) = Self::parse_target(&target);

        // 2. Headers
        let headers = Self::parse_headers(reader)?;

        // 3. Body
        let content_length = match headers.get("Content-Length") {
            Some(value) => parse_content_length(value)?,
            None => 0,
        };

        if content_length > MAX_BODY {
            return Err(ParseError::RequestTooLarge);
        }

        let body = if content_length > 0 {
            Some(read_body(reader, content_length)?)
        } else {
            None
        };

        let mut params = query_params.clone();
        if let Some(raw) = &body {
            let decoded = percent_decode(raw);
            for (key, value) in parse_pairs(&decoded, str::to_string) {
                params.insert(key, value);
            }
        }

        Ok(Request {
            method,
            path,
            target,
            version,
            query_params,
            headers,
            body,
            params,
        })
    }

    /// Parsea la request line
    ///
    /// Formato: `GET /path?query HTTP/1.1`
    fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        // Debe tener exactamente 3 partes: METHOD TARGET VERSION
        if parts.len() != 3 {
            return Err(ParseError::MalformedRequestLine(line.to_string()));
        }

        let method = parts[0].parse::<Method>()?;

        let version = parts[2].to_string();
        if !version.starts_with("HTTP/") {
            return Err(ParseError::InvalidVersion(version));
        }

        Ok((method, parts[1].to_string(), version))
    }

    /// Separa el path de la query y decodifica los parámetros
    ///
    /// Ejemplo: "/html?uuid=a%20b" → ("/html", {"uuid": "a b"})
    fn parse_target(target: &str) -> (String, HashMap<String, String>) {
        match target.split_once('?') {
            Some((path, query)) => {
                let params = parse_pairs(query, percent_decode).into_iter().collect();
                (path.to_string(), params)
            }
            None => (target.to_string(), HashMap::new()),
        }
    }

    /// Lee headers hasta la línea vacía (o fin del stream)
    fn parse_headers<R: BufRead>(reader: &mut R) -> Result<Headers, ParseError> {
        let mut headers = Headers::new();
        let mut consumed = 0usize;

        loop {
            let remaining = MAX_HEADER_BLOCK.saturating_sub(consumed);
            if remaining == 0 {
                return Err(ParseError::RequestTooLarge);
            }

            let line = match read_line(reader, remaining)? {
                Some(line) => line,
                None => break,
            };
            consumed += line.len() + 2;

            if line.is_empty() {
                break;
            }

            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| ParseError::MalformedHeader(line.clone()))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(ParseError::MalformedHeader(line.clone()));
            }

            let mut value = value.trim();
            if name.eq_ignore_ascii_case("Host") {
                value = strip_port(value);
            }

            headers.insert(name, value);
        }

        Ok(headers)
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> Method {
        self.method
    }

    /// Obtiene el path del request (sin query)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Obtiene el target completo (path + query)
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Obtiene la versión HTTP
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Obtiene los parámetros de la query
    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    /// Obtiene un parámetro de la query
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(|s| s.as_str())
    }

    /// Obtiene todos los headers
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Obtiene un header (sin distinguir mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Obtiene el body crudo, sin decodificar
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Parámetros de query y body combinados
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Obtiene un parámetro combinado
    ///
    /// # Ejemplo
    /// ```
    /// use page_server::http::Request;
    ///
    /// let raw = b"POST /html?content=query HTTP/1.1\r\nContent-Length: 12\r\n\r\ncontent=body";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.query_param("content"), Some("query"));
    /// assert_eq!(request.param("content"), Some("body"));
    /// ```
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|s| s.as_str())
    }
}

/// Lee una línea terminada en `\n` (o `\r\n`) sin el terminador
///
/// Retorna `None` si el stream ya terminó.
fn read_line<R: BufRead>(reader: &mut R, limit: usize) -> Result<Option<String>, ParseError> {
    let mut buf = Vec::new();
    let n = reader
        .by_ref()
        .take(limit as u64 + 1)
        .read_until(b'\n', &mut buf)
        .map_err(|e| ParseError::Io(e.kind()))?;

    if n == 0 {
        return Ok(None);
    }

    if buf.ends_with(b"\n") {
        buf.pop();
        if buf.ends_with(b"\r") {
            buf.pop();
        }
    } else if n > limit {
        return Err(ParseError::RequestTooLarge);
    }

    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

/// `Content-Length`: solo dígitos ASCII (sin signo ni espacios internos)
fn parse_content_length(value: &str) -> Result<usize, ParseError> {
    let invalid = || ParseError::InvalidContentLength(value.to_string());

    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    // Un número con demasiados dígitos para usize también es "demasiado grande"
    value.parse::<usize>().or(Err(ParseError::RequestTooLarge))
}

/// Lee exactamente `len` bytes de body
///
/// El buffer crece a medida que llegan datos; no se reserva `len` de antemano.
fn read_body<R: BufRead>(reader: &mut R, len: usize) -> Result<String, ParseError> {
    let mut buf = Vec::new();
    let read = reader
        .take(len as u64)
        .read_to_end(&mut buf)
        .map_err(|e| ParseError::Io(e.kind()))?;

    if read < len {
        return Err(ParseError::UnexpectedEndOfStream { expected: len });
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Quita el `:puerto` final de un valor de `Host`
fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port))
            if !port.is_empty()
                && port.bytes().all(|b| b.is_ascii_digit())
                && (!name.contains(':') || name.ends_with(']')) =>
        {
            name.trim()
        }
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let raw = b"GET / HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.path(), "/");
        assert_eq!(request.version(), "HTTP/1.1");
        assert!(request.query_params().is_empty());
        assert!(request.body().is_none());
    }

    #[test]
    fn test_parse_with_query_params() {
        let raw = b"GET /html?uuid=abc-123&extra HTTP/1.0\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.path(), "/html");
        assert_eq!(request.target(), "/html?uuid=abc-123&extra");
        assert_eq!(request.query_param("uuid"), Some("abc-123"));
        assert_eq!(request.query_param("extra"), Some(""));
    }

    #[test]
    fn test_query_split_on_first_question_mark_and_equals() {
        let raw = b"GET /html?expr=a=b?c HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.path(), "/html");
        assert_eq!(request.query_param("expr"), Some("a=b?c"));
    }

    #[test]
    fn test_query_keys_and_values_decoded() {
        let raw = b"GET /html?t%C3%ADtulo=hola%20mundo HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.query_param("título"), Some("hola mundo"));
    }

    #[test]
    fn test_duplicate_query_key_last_wins() {
        let raw = b"GET /html?uuid=1&uuid=2 HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.query_param("uuid"), Some("2"));
    }

    #[test]
    fn test_parse_with_headers() {
        let raw = b"GET / HTTP/1.1\r\nUser-Agent: test\r\nAccept:  text/html  \r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.header("user-agent"), Some("test"));
        assert_eq!(request.header("ACCEPT"), Some("text/html"));
    }

    #[test]
    fn test_host_port_stripped() {
        let raw = b"GET / HTTP/1.1\r\nHost: localhost:8888\r\n\r\n";
        let request = Request::parse(raw).unwrap();
        assert_eq!(request.header("Host"), Some("localhost"));

        let raw = b"GET / HTTP/1.1\r\nhost: [::1]:8888\r\n\r\n";
        let request = Request::parse(raw).unwrap();
        assert_eq!(request.header("Host"), Some("[::1]"));

        let raw = b"GET / HTTP/1.1\r\nHost: example.org\r\n\r\n";
        let request = Request::parse(raw).unwrap();
        assert_eq!(request.header("Host"), Some("example.org"));
    }

    #[test]
    fn test_bare_newlines_accepted() {
        let raw = b"GET /html HTTP/1.1\nHost: a\n\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.path(), "/html");
        assert_eq!(request.header("Host"), Some("a"));
    }

    #[test]
    fn test_method_case_insensitive() {
        let raw = b"delete /html?uuid=x HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();
        assert_eq!(request.method(), Method::DELETE);
    }

    #[test]
    fn test_known_but_unserved_methods_parse() {
        let raw = b"PUT /html HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();
        assert_eq!(request.method(), Method::PUT);
    }

    #[test]
    fn test_unsupported_method() {
        let raw = b"BREW /pot HTTP/1.1\r\n\r\n";
        let result = Request::parse(raw);

        assert_eq!(result.unwrap_err(), ParseError::UnsupportedMethod("BREW".to_string()));
    }

    #[test]
    fn test_invalid_version() {
        let raw = b"GET / FTP/1.0\r\n\r\n";
        let result = Request::parse(raw);

        assert!(matches!(result, Err(ParseError::InvalidVersion(_))));
    }

    #[test]
    fn test_any_http_version_accepted() {
        let raw = b"GET / HTTP/2.0\r\n\r\n";
        assert!(Request::parse(raw).is_ok());
    }

    #[test]
    fn test_empty_request() {
        let result = Request::parse(b"");
        assert!(matches!(result, Err(ParseError::EmptyRequest)));
    }

    #[test]
    fn test_malformed_request_line() {
        let result = Request::parse(b"GET\r\n\r\n");
        assert!(matches!(result, Err(ParseError::MalformedRequestLine(_))));

        let result = Request::parse(b"GET / HTTP/1.1 extra\r\n\r\n");
        assert!(matches!(result, Err(ParseError::MalformedRequestLine(_))));
    }

    #[test]
    fn test_malformed_header() {
        let raw = b"GET / HTTP/1.1\r\nNoColonHere\r\n\r\n";
        let result = Request::parse(raw);
        assert!(matches!(result, Err(ParseError::MalformedHeader(_))));

        let raw = b"GET / HTTP/1.1\r\n: no-name\r\n\r\n";
        let result = Request::parse(raw);
        assert!(matches!(result, Err(ParseError::MalformedHeader(_))));
    }

    #[test]
    fn test_invalid_content_length() {
        for value in ["abc", "-1", "1.5", "+5", "5 5", "0x10"] {
            let raw = format!("POST /html HTTP/1.1\r\nContent-Length: {}\r\n\r\n", value);
            let result = Request::parse(raw.as_bytes());
            assert_eq!(
                result.unwrap_err(),
                ParseError::InvalidContentLength(value.to_string())
            );
        }
    }

    #[test]
    fn test_huge_content_length_rejected_before_reading() {
        let raw = b"POST /html HTTP/1.1\r\nContent-Length: 100000000000000\r\n\r\ncontent=x";
        assert_eq!(Request::parse(raw).unwrap_err(), ParseError::RequestTooLarge);

        // Más dígitos de los que entran en usize
        let raw = b"POST /html HTTP/1.1\r\nContent-Length: 999999999999999999999999999\r\n\r\n";
        assert_eq!(Request::parse(raw).unwrap_err(), ParseError::RequestTooLarge);
    }

    #[test]
    fn test_body_limit() {
        let over = format!("POST /html HTTP/1.1\r\nContent-Length: {}\r\n\r\n", MAX_BODY + 1);
        assert_eq!(
            Request::parse(over.as_bytes()).unwrap_err(),
            ParseError::RequestTooLarge
        );

        // Justo en el límite se acepta (y se espera el body completo)
        let at_limit = format!("POST /html HTTP/1.1\r\nContent-Length: {}\r\n\r\nab", MAX_BODY);
        assert_eq!(
            Request::parse(at_limit.as_bytes()).unwrap_err(),
            ParseError::UnexpectedEndOfStream { expected: MAX_BODY }
        );
    }

    #[test]
    fn test_body_read_exactly_and_merged() {
        let raw = b"POST /html?uuid=q&content=query HTTP/1.1\r\nContent-Length: 22\r\n\r\ncontent=Hola%20mundo&xTRAILING";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.body(), Some("content=Hola%20mundo&x"));
        assert_eq!(request.param("content"), Some("Hola mundo"));
        assert_eq!(request.param("uuid"), Some("q"));
        assert_eq!(request.param("x"), Some(""));
        assert_eq!(request.query_param("content"), Some("query"));
    }

    #[test]
    fn test_body_shorter_than_declared() {
        let raw = b"POST /html HTTP/1.1\r\nContent-Length: 50\r\n\r\ncontent=corto";
        let result = Request::parse(raw);

        assert_eq!(
            result.unwrap_err(),
            ParseError::UnexpectedEndOfStream { expected: 50 }
        );
    }

    #[test]
    fn test_zero_content_length_has_no_body() {
        let raw = b"POST /html HTTP/1.1\r\nContent-Length: 0\r\n\r\n";
        let request = Request::parse(raw).unwrap();
        assert!(request.body().is_none());
    }

    #[test]
    fn test_body_not_read_without_content_length() {
        let raw = b"POST /html HTTP/1.1\r\n\r\ncontent=ignored";
        let request = Request::parse(raw).unwrap();

        assert!(request.body().is_none());
        assert_eq!(request.param("content"), None);
    }

    #[test]
    fn test_read_from_leaves_trailing_bytes() {
        let raw = b"POST /html HTTP/1.1\r\nContent-Length: 3\r\n\r\na=1NEXT";
        let mut reader: &[u8] = raw;
        let request = Request::read_from(&mut reader).unwrap();

        assert_eq!(request.param("a"), Some("1"));
        assert_eq!(reader, b"NEXT");
    }

    #[test]
    fn test_request_line_too_long() {
        let raw = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(MAX_REQUEST_LINE + 10));
        let result = Request::parse(raw.as_bytes());
        assert_eq!(result.unwrap_err(), ParseError::RequestTooLarge);
    }

    #[test]
    fn test_header_block_too_large() {
        let mut raw = String::from("GET / HTTP/1.1\r\n");
        for i in 0..2_000 {
            raw.push_str(&format!("X-Filler-{}: {}\r\n", i, "v".repeat(40)));
        }
        raw.push_str("\r\n");

        let result = Request::parse(raw.as_bytes());
        assert_eq!(result.unwrap_err(), ParseError::RequestTooLarge);
    }

    #[test]
    fn test_headers_end_at_eof() {
        let raw = b"GET / HTTP/1.1\r\nHost: a";
        let request = Request::parse(raw).unwrap();
        assert_eq!(request.header("Host"), Some("a"));
    }
}
